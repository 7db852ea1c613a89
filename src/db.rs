use chrono::{NaiveDate, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{params, Connection, Result, Row, Transaction, TransactionBehavior};
use std::path::Path;
use std::time::Duration;

use crate::models::{Attempt, DailyAssignment, DailyEntry, Label, Problem};

// How long a connection waits on another writer's lock before giving up
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const PROBLEM_COLUMNS: &str =
    "p.id, p.title, p.url, p.label, p.last_reviewed, p.review_count, p.key_insight, p.created_at";

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self { conn })
    }

    pub fn init(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS problems (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL UNIQUE,
                url TEXT,
                label TEXT NOT NULL DEFAULT 'new' CHECK(label IN ('new', 'struggling', 'okay', 'mastered')),
                last_reviewed TEXT,
                review_count INTEGER NOT NULL DEFAULT 0,
                key_insight TEXT,
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );

            -- Append-only outcome history
            CREATE TABLE IF NOT EXISTS attempts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                problem_id INTEGER NOT NULL,
                outcome TEXT NOT NULL CHECK(outcome IN ('struggling', 'okay', 'mastered')),
                practice_date TEXT NOT NULL,
                attempted_at TEXT NOT NULL DEFAULT (datetime('now')),
                FOREIGN KEY (problem_id) REFERENCES problems(id) ON DELETE CASCADE
            );

            -- One row per problem chosen for a calendar date. Deleting the
            -- problem nulls problem_id; the row stays.
            CREATE TABLE IF NOT EXISTS daily_assignments (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                problem_id INTEGER,
                date TEXT NOT NULL,
                completed INTEGER NOT NULL DEFAULT 0,
                UNIQUE (problem_id, date),
                FOREIGN KEY (problem_id) REFERENCES problems(id) ON DELETE SET NULL
            );

            CREATE INDEX IF NOT EXISTS idx_problems_label ON problems(label);
            CREATE INDEX IF NOT EXISTS idx_attempts_problem ON attempts(problem_id);
            CREATE INDEX IF NOT EXISTS idx_assignments_date ON daily_assignments(date);
            "#,
        )
    }

    #[cfg(test)]
    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Run `f` inside a `BEGIN IMMEDIATE` transaction. Commits on `Ok`; any
    /// `Err` (or a panic) drops the transaction, which rolls it back.
    ///
    /// The write lock is taken at `BEGIN`, so two connections racing through
    /// a read-then-insert sequence serialize instead of both observing the
    /// "absent" state.
    pub fn with_transaction<T, E, F>(&self, f: F) -> std::result::Result<T, E>
    where
        F: FnOnce(&Self) -> std::result::Result<T, E>,
        E: From<rusqlite::Error>,
    {
        let tx = Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)?;
        let value = f(self)?;
        tx.commit()?;
        Ok(value)
    }

    // Problem operations
    pub fn add_problem(
        &self,
        title: &str,
        url: Option<&str>,
        key_insight: Option<&str>,
    ) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO problems (title, url, key_insight, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?4)",
            params![title, url, key_insight, Utc::now().to_rfc3339()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn get_problem(&self, id: i64) -> Result<Option<Problem>> {
        let sql = format!("SELECT {} FROM problems p WHERE p.id = ?1", PROBLEM_COLUMNS);
        let problem = self.conn.query_row(&sql, params![id], |row| problem_from_row(row, 0));

        match problem {
            Ok(p) => Ok(Some(p)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn list_problems(&self, label_filter: Option<Label>) -> Result<Vec<Problem>> {
        let (query, params_vec): (String, Vec<Box<dyn ToSql>>) = if let Some(label) = label_filter {
            (
                format!(
                    "SELECT {} FROM problems p WHERE p.label = ?1 ORDER BY p.id",
                    PROBLEM_COLUMNS
                ),
                vec![Box::new(label)],
            )
        } else {
            (
                format!("SELECT {} FROM problems p ORDER BY p.id", PROBLEM_COLUMNS),
                vec![],
            )
        };

        let mut stmt = self.conn.prepare(&query)?;
        let params_refs: Vec<&dyn ToSql> = params_vec.iter().map(|b| b.as_ref()).collect();

        let rows = stmt.query_map(params_refs.as_slice(), |row| problem_from_row(row, 0))?;
        rows.collect()
    }

    pub fn delete_problem(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM problems WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    pub fn set_key_insight(&self, id: i64, key_insight: Option<&str>) -> Result<bool> {
        let rows = self.conn.execute(
            "UPDATE problems SET key_insight = ?1, updated_at = ?2 WHERE id = ?3",
            params![key_insight, Utc::now().to_rfc3339(), id],
        )?;
        Ok(rows > 0)
    }

    /// Problems with a non-empty key insight, in id order.
    pub fn list_problems_with_insight(&self) -> Result<Vec<Problem>> {
        let sql = format!(
            "SELECT {} FROM problems p WHERE TRIM(COALESCE(p.key_insight, '')) != '' ORDER BY p.id",
            PROBLEM_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], |row| problem_from_row(row, 0))?;
        rows.collect()
    }

    /// Write a reviewed state and bump the attempt counter.
    pub fn record_problem_review(
        &self,
        id: i64,
        label: Label,
        last_reviewed: NaiveDate,
    ) -> Result<bool> {
        let rows = self.conn.execute(
            r#"
            UPDATE problems
            SET label = ?1,
                last_reviewed = ?2,
                review_count = review_count + 1,
                updated_at = ?3
            WHERE id = ?4
            "#,
            params![label, last_reviewed, Utc::now().to_rfc3339(), id],
        )?;
        Ok(rows > 0)
    }

    // Attempt operations

    /// `practice_date` is the calendar day the outcome counts for;
    /// `attempted_at` stays a wall-clock UTC stamp.
    pub fn add_attempt(
        &self,
        problem_id: i64,
        outcome: Label,
        practice_date: NaiveDate,
    ) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO attempts (problem_id, outcome, practice_date, attempted_at) VALUES (?1, ?2, ?3, ?4)",
            params![problem_id, outcome, practice_date, Utc::now().to_rfc3339()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn list_attempts(&self, problem_id: i64) -> Result<Vec<Attempt>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, problem_id, outcome, practice_date, attempted_at
            FROM attempts
            WHERE problem_id = ?1
            ORDER BY id DESC
            "#,
        )?;

        let rows = stmt.query_map(params![problem_id], |row| {
            Ok(Attempt {
                id: row.get(0)?,
                problem_id: row.get(1)?,
                outcome: row.get(2)?,
                practice_date: row.get(3)?,
                attempted_at: row.get(4)?,
            })
        })?;

        rows.collect()
    }

    // Daily assignment operations
    pub fn get_assignment(&self, problem_id: i64, date: NaiveDate) -> Result<Option<DailyAssignment>> {
        let assignment = self.conn.query_row(
            r#"
            SELECT id, problem_id, date, completed
            FROM daily_assignments
            WHERE problem_id = ?1 AND date = ?2
            "#,
            params![problem_id, date],
            assignment_from_row,
        );

        match assignment {
            Ok(a) => Ok(Some(a)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Assignments for `date` in creation order. Rows whose problem was
    /// deleted are skipped.
    pub fn list_assignments(&self, date: NaiveDate) -> Result<Vec<DailyAssignment>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, problem_id, date, completed
            FROM daily_assignments
            WHERE date = ?1 AND problem_id IS NOT NULL
            ORDER BY id ASC
            "#,
        )?;

        let rows = stmt.query_map(params![date], assignment_from_row)?;
        rows.collect()
    }

    /// Assignments for `date` joined with their problems, in creation order.
    pub fn list_daily_entries(&self, date: NaiveDate) -> Result<Vec<DailyEntry>> {
        let sql = format!(
            r#"
            SELECT a.id, a.date, a.completed, {}
            FROM daily_assignments a
            JOIN problems p ON p.id = a.problem_id
            WHERE a.date = ?1
            ORDER BY a.id ASC
            "#,
            PROBLEM_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;

        let rows = stmt.query_map(params![date], |row| {
            Ok(DailyEntry {
                assignment_id: row.get(0)?,
                date: row.get(1)?,
                completed: row.get(2)?,
                problem: problem_from_row(row, 3)?,
            })
        })?;

        rows.collect()
    }

    pub fn add_assignment(&self, problem_id: i64, date: NaiveDate) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO daily_assignments (problem_id, date, completed) VALUES (?1, ?2, 0)",
            params![problem_id, date],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn delete_assignment(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM daily_assignments WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    /// Remove the not-yet-completed rows for `date`. Completed rows stay.
    pub fn delete_pending_assignments(&self, date: NaiveDate) -> Result<usize> {
        self.conn.execute(
            "DELETE FROM daily_assignments WHERE date = ?1 AND completed = 0",
            params![date],
        )
    }

    pub fn mark_assignment_completed(&self, id: i64) -> Result<bool> {
        let rows = self.conn.execute(
            "UPDATE daily_assignments SET completed = 1 WHERE id = ?1 AND completed = 0",
            params![id],
        )?;
        Ok(rows > 0)
    }

    /// Per-date `(date, total, completed)` for every date strictly before
    /// `before`, newest first. Rows whose problem was deleted still count.
    pub fn assignment_days_before(&self, before: NaiveDate) -> Result<Vec<DayTally>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT date, COUNT(*), COALESCE(SUM(completed), 0)
            FROM daily_assignments
            WHERE date < ?1
            GROUP BY date
            ORDER BY date DESC
            "#,
        )?;

        let rows = stmt.query_map(params![before], |row| {
            Ok(DayTally {
                date: row.get(0)?,
                total: row.get(1)?,
                completed: row.get(2)?,
            })
        })?;

        rows.collect()
    }

    pub fn get_stats(&self) -> Result<Stats> {
        let total_problems: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM problems", [], |row| row.get(0))?;

        let total_attempts: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM attempts", [], |row| row.get(0))?;

        let mut stmt = self
            .conn
            .prepare("SELECT label, COUNT(*) FROM problems GROUP BY label")?;
        let counts = stmt
            .query_map([], |row| Ok((row.get::<_, Label>(0)?, row.get::<_, i64>(1)?)))?
            .collect::<Result<Vec<_>>>()?;

        let count_for = |label: Label| {
            counts
                .iter()
                .find(|(l, _)| *l == label)
                .map(|(_, n)| *n)
                .unwrap_or(0)
        };

        Ok(Stats {
            total_problems,
            total_attempts,
            new: count_for(Label::New),
            struggling: count_for(Label::Struggling),
            okay: count_for(Label::Okay),
            mastered: count_for(Label::Mastered),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayTally {
    pub date: NaiveDate,
    pub total: i64,
    pub completed: i64,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct Stats {
    pub total_problems: i64,
    pub total_attempts: i64,
    pub new: i64,
    pub struggling: i64,
    pub okay: i64,
    pub mastered: i64,
}

impl ToSql for Label {
    fn to_sql(&self) -> Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Label {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let s = value.as_str()?;
        Label::from_str(s).ok_or_else(|| FromSqlError::Other(format!("unknown label '{}'", s).into()))
    }
}

fn problem_from_row(row: &Row<'_>, offset: usize) -> Result<Problem> {
    Ok(Problem {
        id: row.get(offset)?,
        title: row.get(offset + 1)?,
        url: row.get(offset + 2)?,
        label: row.get(offset + 3)?,
        last_reviewed: row.get(offset + 4)?,
        review_count: row.get(offset + 5)?,
        key_insight: row.get(offset + 6)?,
        created_at: row.get(offset + 7)?,
    })
}

fn assignment_from_row(row: &Row<'_>) -> Result<DailyAssignment> {
    Ok(DailyAssignment {
        id: row.get(0)?,
        problem_id: row.get(1)?,
        date: row.get(2)?,
        completed: row.get(3)?,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn setup_db() -> Database {
        let db = Database::open(":memory:").expect("Failed to create in-memory database");
        db.init().expect("Failed to initialize database");
        db
    }

    pub(crate) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    mod init_tests {
        use super::*;

        #[test]
        fn init_creates_tables() {
            let db = setup_db();
            for table in ["problems", "attempts", "daily_assignments"] {
                let count: i64 = db
                    .conn
                    .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))
                    .expect("table should exist");
                assert_eq!(count, 0);
            }
        }

        #[test]
        fn init_is_idempotent() {
            let db = setup_db();
            db.add_problem("Two Sum", None, None).unwrap();

            db.init().expect("Re-init should succeed");

            let problems = db.list_problems(None).unwrap();
            assert_eq!(problems.len(), 1);
        }
    }

    mod problem_tests {
        use super::*;

        #[test]
        fn add_problem_starts_new() {
            let db = setup_db();
            let id = db
                .add_problem("Two Sum", Some("https://leetcode.com/problems/two-sum"), None)
                .unwrap();
            assert!(id > 0);

            let p = db.get_problem(id).unwrap().unwrap();
            assert_eq!(p.title, "Two Sum");
            assert_eq!(p.url.as_deref(), Some("https://leetcode.com/problems/two-sum"));
            assert_eq!(p.label, Label::New);
            assert_eq!(p.review_count, 0);
            assert!(p.last_reviewed.is_none());
            assert!(p.key_insight.is_none());
        }

        #[test]
        fn add_problem_duplicate_title_fails() {
            let db = setup_db();
            db.add_problem("Two Sum", None, None).unwrap();
            assert!(db.add_problem("Two Sum", None, None).is_err());
        }

        #[test]
        fn get_problem_not_found() {
            let db = setup_db();
            assert!(db.get_problem(999).unwrap().is_none());
        }

        #[test]
        fn list_problems_filters_by_label() {
            let db = setup_db();
            let a = db.add_problem("A", None, None).unwrap();
            db.add_problem("B", None, None).unwrap();
            db.record_problem_review(a, Label::Okay, date(2024, 1, 1))
                .unwrap();

            assert_eq!(db.list_problems(None).unwrap().len(), 2);
            let okay = db.list_problems(Some(Label::Okay)).unwrap();
            assert_eq!(okay.len(), 1);
            assert_eq!(okay[0].id, a);
            assert!(db.list_problems(Some(Label::Mastered)).unwrap().is_empty());
        }

        #[test]
        fn record_problem_review_updates_state() {
            let db = setup_db();
            let id = db.add_problem("A", None, None).unwrap();

            assert!(db
                .record_problem_review(id, Label::Struggling, date(2024, 5, 2))
                .unwrap());
            db.record_problem_review(id, Label::Okay, date(2024, 5, 6))
                .unwrap();

            let p = db.get_problem(id).unwrap().unwrap();
            assert_eq!(p.label, Label::Okay);
            assert_eq!(p.last_reviewed, Some(date(2024, 5, 6)));
            assert_eq!(p.review_count, 2);
        }

        #[test]
        fn record_problem_review_missing_problem() {
            let db = setup_db();
            assert!(!db
                .record_problem_review(42, Label::Okay, date(2024, 5, 6))
                .unwrap());
        }

        #[test]
        fn set_key_insight_and_list() {
            let db = setup_db();
            let a = db.add_problem("A", None, None).unwrap();
            let b = db.add_problem("B", None, Some("use a monotonic stack")).unwrap();
            db.add_problem("C", None, Some("   ")).unwrap();

            let with_insight = db.list_problems_with_insight().unwrap();
            assert_eq!(with_insight.len(), 1);
            assert_eq!(with_insight[0].id, b);

            assert!(db.set_key_insight(a, Some("two pointers")).unwrap());
            assert_eq!(db.list_problems_with_insight().unwrap().len(), 2);

            db.set_key_insight(b, None).unwrap();
            let with_insight = db.list_problems_with_insight().unwrap();
            assert_eq!(with_insight.len(), 1);
            assert_eq!(with_insight[0].id, a);
        }

        #[test]
        fn delete_problem_cascades_attempts_and_keeps_assignment_rows() {
            let db = setup_db();
            let id = db.add_problem("A", None, None).unwrap();
            db.add_attempt(id, Label::Okay, date(2024, 1, 1)).unwrap();
            let row = db.add_assignment(id, date(2024, 1, 1)).unwrap();
            db.mark_assignment_completed(row).unwrap();

            assert!(db.delete_problem(id).unwrap());
            assert!(db.get_problem(id).unwrap().is_none());
            assert!(db.list_attempts(id).unwrap().is_empty());
            assert!(db.list_assignments(date(2024, 1, 1)).unwrap().is_empty());
            assert!(db.list_daily_entries(date(2024, 1, 1)).unwrap().is_empty());

            let orphaned: Option<i64> = db
                .conn
                .query_row(
                    "SELECT problem_id FROM daily_assignments WHERE id = ?1",
                    params![row],
                    |r| r.get(0),
                )
                .unwrap();
            assert_eq!(orphaned, None);
            assert_eq!(
                db.assignment_days_before(date(2024, 1, 2)).unwrap(),
                vec![DayTally { date: date(2024, 1, 1), total: 1, completed: 1 }]
            );
        }

        #[test]
        fn delete_problem_not_found() {
            let db = setup_db();
            assert!(!db.delete_problem(999).unwrap());
        }
    }

    mod attempt_tests {
        use super::*;

        #[test]
        fn attempts_listed_newest_first() {
            let db = setup_db();
            let id = db.add_problem("A", None, None).unwrap();
            db.add_attempt(id, Label::Struggling, date(2024, 1, 1)).unwrap();
            db.add_attempt(id, Label::Mastered, date(2024, 1, 5)).unwrap();

            let attempts = db.list_attempts(id).unwrap();
            assert_eq!(attempts.len(), 2);
            assert_eq!(attempts[0].outcome, Label::Mastered);
            assert_eq!(attempts[0].practice_date, date(2024, 1, 5));
            assert_eq!(attempts[1].outcome, Label::Struggling);
            assert_eq!(attempts[1].practice_date, date(2024, 1, 1));
        }

        #[test]
        fn new_is_not_a_storable_outcome() {
            let db = setup_db();
            let id = db.add_problem("A", None, None).unwrap();
            assert!(db.add_attempt(id, Label::New, date(2024, 1, 1)).is_err());
        }
    }

    mod assignment_tests {
        use super::*;

        #[test]
        fn assignments_in_creation_order() {
            let db = setup_db();
            let a = db.add_problem("A", None, None).unwrap();
            let b = db.add_problem("B", None, None).unwrap();
            let c = db.add_problem("C", None, None).unwrap();
            let day = date(2024, 1, 1);

            db.add_assignment(c, day).unwrap();
            db.add_assignment(a, day).unwrap();
            db.add_assignment(b, day).unwrap();

            let ids: Vec<i64> = db
                .list_assignments(day)
                .unwrap()
                .iter()
                .map(|a| a.problem_id)
                .collect();
            assert_eq!(ids, vec![c, a, b]);

            let entries = db.list_daily_entries(day).unwrap();
            let titles: Vec<&str> = entries.iter().map(|e| e.problem.title.as_str()).collect();
            assert_eq!(titles, vec!["C", "A", "B"]);
        }

        #[test]
        fn duplicate_assignment_for_same_day_fails() {
            let db = setup_db();
            let a = db.add_problem("A", None, None).unwrap();
            db.add_assignment(a, date(2024, 1, 1)).unwrap();
            assert!(db.add_assignment(a, date(2024, 1, 1)).is_err());
            db.add_assignment(a, date(2024, 1, 2)).unwrap();
        }

        #[test]
        fn get_assignment_by_problem_and_date() {
            let db = setup_db();
            let a = db.add_problem("A", None, None).unwrap();
            db.add_assignment(a, date(2024, 1, 1)).unwrap();

            let found = db.get_assignment(a, date(2024, 1, 1)).unwrap().unwrap();
            assert_eq!(found.problem_id, a);
            assert!(!found.completed);
            assert!(db.get_assignment(a, date(2024, 1, 2)).unwrap().is_none());
        }

        #[test]
        fn mark_completed_only_once() {
            let db = setup_db();
            let a = db.add_problem("A", None, None).unwrap();
            let id = db.add_assignment(a, date(2024, 1, 1)).unwrap();

            assert!(db.mark_assignment_completed(id).unwrap());
            assert!(!db.mark_assignment_completed(id).unwrap());
            assert!(db.get_assignment(a, date(2024, 1, 1)).unwrap().unwrap().completed);
        }

        #[test]
        fn delete_pending_keeps_completed_rows() {
            let db = setup_db();
            let a = db.add_problem("A", None, None).unwrap();
            let b = db.add_problem("B", None, None).unwrap();
            let day = date(2024, 1, 1);
            let done = db.add_assignment(a, day).unwrap();
            db.add_assignment(b, day).unwrap();
            db.add_assignment(b, date(2024, 1, 2)).unwrap();
            db.mark_assignment_completed(done).unwrap();

            assert_eq!(db.delete_pending_assignments(day).unwrap(), 1);

            let left = db.list_assignments(day).unwrap();
            assert_eq!(left.len(), 1);
            assert_eq!(left[0].problem_id, a);
            assert_eq!(db.list_assignments(date(2024, 1, 2)).unwrap().len(), 1);
        }

        #[test]
        fn day_tallies_before_date() {
            let db = setup_db();
            let a = db.add_problem("A", None, None).unwrap();
            let b = db.add_problem("B", None, None).unwrap();

            let x = db.add_assignment(a, date(2024, 1, 1)).unwrap();
            db.add_assignment(b, date(2024, 1, 1)).unwrap();
            let y = db.add_assignment(a, date(2024, 1, 2)).unwrap();
            db.add_assignment(a, date(2024, 1, 3)).unwrap();
            db.mark_assignment_completed(x).unwrap();
            db.mark_assignment_completed(y).unwrap();

            let tallies = db.assignment_days_before(date(2024, 1, 3)).unwrap();
            assert_eq!(
                tallies,
                vec![
                    DayTally { date: date(2024, 1, 2), total: 1, completed: 1 },
                    DayTally { date: date(2024, 1, 1), total: 2, completed: 1 },
                ]
            );
        }
    }

    mod transaction_tests {
        use super::*;

        #[test]
        fn commits_on_ok() {
            let db = setup_db();
            let id: i64 = db
                .with_transaction(|db| db.add_problem("A", None, None))
                .unwrap();
            assert!(db.get_problem(id).unwrap().is_some());
        }

        #[test]
        fn rolls_back_on_err() {
            let db = setup_db();
            let result: std::result::Result<(), rusqlite::Error> = db.with_transaction(|db| {
                db.add_problem("A", None, None)?;
                // duplicate title violates UNIQUE
                db.add_problem("A", None, None)?;
                Ok(())
            });
            assert!(result.is_err());
            assert!(db.list_problems(None).unwrap().is_empty());
        }
    }

    mod stats_tests {
        use super::*;

        #[test]
        fn stats_empty_db() {
            let db = setup_db();
            let stats = db.get_stats().unwrap();
            assert_eq!(stats.total_problems, 0);
            assert_eq!(stats.total_attempts, 0);
            assert_eq!(stats.new, 0);
            assert_eq!(stats.mastered, 0);
        }

        #[test]
        fn stats_counts_by_label() {
            let db = setup_db();
            let a = db.add_problem("A", None, None).unwrap();
            let b = db.add_problem("B", None, None).unwrap();
            db.add_problem("C", None, None).unwrap();
            db.record_problem_review(a, Label::Mastered, date(2024, 1, 1))
                .unwrap();
            db.record_problem_review(b, Label::Struggling, date(2024, 1, 1))
                .unwrap();
            db.add_attempt(a, Label::Mastered, date(2024, 1, 1)).unwrap();

            let stats = db.get_stats().unwrap();
            assert_eq!(stats.total_problems, 3);
            assert_eq!(stats.total_attempts, 1);
            assert_eq!(stats.new, 1);
            assert_eq!(stats.struggling, 1);
            assert_eq!(stats.okay, 0);
            assert_eq!(stats.mastered, 1);
        }
    }
}
