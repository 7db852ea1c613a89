mod clock;
mod config;
mod db;
mod engine;
mod error;
mod models;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::Serialize;

use clock::{Clock, FixedClock, SystemClock};
use config::Config;
use db::{Database, Stats};
use engine::Engine;
use models::{DailyEntry, JsonOutput, Label, Problem, ProblemWithHistory};

#[derive(Parser)]
#[command(name = "grindstone")]
#[command(about = "Daily practice sets for coding-interview problems with spaced review")]
#[command(version)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Act as if today were this date (YYYY-MM-DD)
    #[arg(long, global = true)]
    date: Option<NaiveDate>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database
    Init,

    /// Manage problems
    #[command(subcommand)]
    Problem(ProblemCommands),

    /// Show today's practice set, creating it if needed
    Today {
        /// Problems per day (overrides config)
        #[arg(long, short)]
        count: Option<i64>,
    },

    /// Replace every open problem in today's set
    Refresh {
        /// Problems per day (overrides config)
        #[arg(long, short)]
        count: Option<i64>,
    },

    /// Swap one open problem in today's set for another
    Replace {
        /// Problem ID
        id: i64,
    },

    /// Record the outcome for a problem in today's set
    Done {
        /// Problem ID
        id: i64,

        /// Outcome: struggling/okay/mastered
        #[arg(long, short)]
        outcome: String,
    },

    /// Show practice statistics
    Stats,

    /// Show today's key insight
    Tip,
}

#[derive(Subcommand)]
enum ProblemCommands {
    /// List all problems
    List {
        /// Filter by label: new/struggling/okay/mastered
        #[arg(long, short)]
        label: Option<String>,
    },

    /// Add a new problem
    Add {
        /// Problem title
        title: String,

        /// Link to the problem
        #[arg(long, short)]
        url: Option<String>,

        /// The trick that unlocks it
        #[arg(long, short)]
        insight: Option<String>,
    },

    /// Show problem details and attempt history
    Show {
        /// Problem ID
        id: i64,
    },

    /// Delete a problem
    Delete {
        /// Problem ID
        id: i64,
    },

    /// Set or clear a problem's key insight
    Insight {
        /// Problem ID
        id: i64,

        /// New insight; omit to clear
        text: Option<String>,
    },
}

#[derive(Serialize)]
struct StatsReport<'a> {
    #[serde(flatten)]
    stats: &'a Stats,
    ready_for_review: usize,
    current_streak: u32,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let json = cli.json;

    if let Err(e) = run(cli) {
        if json {
            match serde_json::to_string(&JsonOutput::<()>::err(e.to_string())) {
                Ok(out) => println!("{}", out),
                Err(_) => eprintln!("Error: {}", e),
            }
        } else {
            eprintln!("Error: {}", e);
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let db = Database::open(&config.database_path)?;
    let today = match cli.date {
        Some(date) => FixedClock(date).today(),
        None => SystemClock.today(),
    };

    match cli.command {
        Commands::Init => {
            db.init()?;
            if cli.json {
                println!("{}", serde_json::to_string(&JsonOutput::<()>::ok(()))?);
            } else {
                println!("Database initialized at: {}", config.database_path.display());
            }
        }

        Commands::Problem(problem_cmd) => match problem_cmd {
            ProblemCommands::List { label } => {
                let label = label
                    .map(|l| {
                        Label::from_str(&l).ok_or_else(|| {
                            let names: Vec<&str> = Label::ALL.iter().map(|l| l.as_str()).collect();
                            format!("Unknown label '{}'. Use: {}", l, names.join(", "))
                        })
                    })
                    .transpose()?;
                let problems = db.list_problems(label)?;

                if cli.json {
                    println!("{}", serde_json::to_string(&JsonOutput::ok(&problems))?);
                } else if problems.is_empty() {
                    println!("No problems found.");
                } else {
                    println!("{:<5} {:<40} {:<11} {:<8} NEXT DUE", "ID", "TITLE", "LABEL", "REVIEWS");
                    println!("{}", "-".repeat(80));
                    for p in problems {
                        println!(
                            "{:<5} {:<40} {:<11} {:<8} {}",
                            p.id,
                            truncate(&p.title, 38),
                            p.label.display(),
                            p.review_count,
                            due_text(&p, today)
                        );
                    }
                }
            }

            ProblemCommands::Add { title, url, insight } => {
                let id = db.add_problem(&title, url.as_deref(), insight.as_deref())?;

                if cli.json {
                    println!(
                        "{}",
                        serde_json::to_string(&JsonOutput::ok(serde_json::json!({
                            "id": id,
                            "title": title
                        })))?
                    );
                } else {
                    println!("Added problem '{}' with ID: {}", title, id);
                }
            }

            ProblemCommands::Show { id } => {
                if let Some(problem) = db.get_problem(id)? {
                    let details = ProblemWithHistory {
                        next_due: problem.next_due(),
                        attempts: db.list_attempts(id)?,
                        problem,
                    };

                    if cli.json {
                        println!("{}", serde_json::to_string(&JsonOutput::ok(&details))?);
                    } else {
                        let p = &details.problem;
                        println!("Problem: {}", p.title);
                        println!("ID: {}", p.id);
                        if let Some(url) = &p.url {
                            println!("URL: {}", url);
                        }
                        println!("Label: {}", p.label.display());
                        println!("Reviews: {}", p.review_count);
                        if let Some(last) = p.last_reviewed {
                            println!("Last reviewed: {}", last);
                        }
                        println!("Next due: {}", due_text(p, today));
                        if let Some(insight) = &p.key_insight {
                            println!("Key insight: {}", insight);
                        }

                        if !details.attempts.is_empty() {
                            println!();
                            println!("--- Attempts ---");
                            for attempt in &details.attempts {
                                println!("{}  {}", attempt.practice_date, attempt.outcome.display());
                            }
                        }
                    }
                } else {
                    not_found(cli.json, "Problem not found")?;
                }
            }

            ProblemCommands::Delete { id } => {
                if db.delete_problem(id)? {
                    if cli.json {
                        println!("{}", serde_json::to_string(&JsonOutput::<()>::ok(()))?);
                    } else {
                        println!("Problem {} deleted.", id);
                    }
                } else {
                    not_found(cli.json, "Problem not found")?;
                }
            }

            ProblemCommands::Insight { id, text } => {
                let text = text.filter(|t| !t.trim().is_empty());
                if db.set_key_insight(id, text.as_deref())? {
                    if cli.json {
                        println!("{}", serde_json::to_string(&JsonOutput::<()>::ok(()))?);
                    } else if text.is_some() {
                        println!("Updated key insight for problem {}.", id);
                    } else {
                        println!("Cleared key insight for problem {}.", id);
                    }
                } else {
                    not_found(cli.json, "Problem not found")?;
                }
            }
        },

        Commands::Today { count } => {
            let config = config.with_daily_count(count)?;
            let mut engine = Engine::new(&db, rand::thread_rng(), config.daily_problem_count);
            let set = engine.get_or_create_today(today)?;
            print_set(cli.json, today, &set)?;
        }

        Commands::Refresh { count } => {
            let config = config.with_daily_count(count)?;
            let mut engine = Engine::new(&db, rand::thread_rng(), config.daily_problem_count);
            let set = engine.refresh_today(today)?;
            print_set(cli.json, today, &set)?;
        }

        Commands::Replace { id } => {
            let mut engine = Engine::new(&db, rand::thread_rng(), config.daily_problem_count);
            let entry = engine.replace_one(today, id)?;

            if cli.json {
                println!("{}", serde_json::to_string(&JsonOutput::ok(&entry))?);
            } else {
                println!(
                    "Replaced problem {} with '{}' (ID: {}).",
                    id, entry.problem.title, entry.problem.id
                );
            }
        }

        Commands::Done { id, outcome } => {
            let outcome = engine::mastery::parse_outcome(&outcome)?;
            let engine = Engine::new(&db, rand::thread_rng(), config.daily_problem_count);
            let problem = engine.complete(today, id, outcome)?;

            if cli.json {
                println!("{}", serde_json::to_string(&JsonOutput::ok(&problem))?);
            } else {
                println!("Recorded '{}' for {}.", problem.label.as_str(), problem.title);
                println!("Next due: {}", due_text(&problem, today));
            }
        }

        Commands::Stats => {
            let stats = db.get_stats()?;
            let engine = Engine::new(&db, rand::thread_rng(), config.daily_problem_count);
            let ready = engine.ready_for_review(today)?;
            let streak = engine.current_streak(today)?;

            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string(&JsonOutput::ok(StatsReport {
                        stats: &stats,
                        ready_for_review: ready,
                        current_streak: streak,
                    }))?
                );
            } else {
                println!("=== Practice Statistics ===");
                println!("Total problems: {}", stats.total_problems);
                println!("Total attempts: {}", stats.total_attempts);
                println!(
                    "New: {}  Struggling: {}  Okay: {}  Mastered: {}",
                    stats.new, stats.struggling, stats.okay, stats.mastered
                );
                println!("Ready for review: {}", ready);
                println!("Current streak: {} day(s)", streak);
            }
        }

        Commands::Tip => {
            let engine = Engine::new(&db, rand::thread_rng(), config.daily_problem_count);
            let tip = engine.tip_for(today)?;

            if cli.json {
                println!("{}", serde_json::to_string(&JsonOutput::ok(&tip))?);
            } else if let Some(tip) = tip {
                println!("{} (ID: {})", tip.title, tip.problem_id);
                println!("  {}", tip.insight);
            } else {
                println!("No key insights yet. Add one with: grindstone problem insight <id> <text>");
            }
        }
    }

    Ok(())
}

fn print_set(json: bool, today: NaiveDate, set: &[DailyEntry]) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string(&JsonOutput::ok(set))?);
        return Ok(());
    }

    if set.is_empty() {
        println!("Nothing is due for {}. Add problems or come back later.", today);
        return Ok(());
    }

    println!("=== Practice Set for {} ===", today);
    println!();
    for entry in set {
        println!(
            "[{}] {:<5} {:<40} {}",
            if entry.completed { "x" } else { " " },
            entry.problem.id,
            truncate(&entry.problem.title, 38),
            entry.problem.label.display()
        );
    }
    println!();
    println!("After solving, record the outcome with:");
    println!("  grindstone done <id> --outcome <struggling|okay|mastered>");
    Ok(())
}

fn not_found(json: bool, msg: &str) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string(&JsonOutput::<()>::err(msg))?);
    } else {
        println!("{}.", msg);
    }
    Ok(())
}

fn due_text(problem: &Problem, today: NaiveDate) -> String {
    match problem.next_due() {
        None => "now".to_string(),
        Some(due) if due <= today => "now".to_string(),
        Some(due) => due.to_string(),
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}
