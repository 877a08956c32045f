use std::fmt;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};

use services::{
    AnswerOutcome, ClockEvent, ClockPair, ModuleLoopService, ModuleSession, SessionConfig,
};
use storage::repository::Storage;
use tutor_core::Clock;
use tutor_core::model::{CourseModule, ModuleId, Operation, Phase, catalog, find_in_catalog};

//
// ─── ARGUMENTS ─────────────────────────────────────────────────────────────────
//

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidModuleId { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidModuleId { raw } => write!(f, "unknown --module value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

struct Args {
    db_url: Option<String>,
    module: CourseModule,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [--db <sqlite_url>] [--module <id>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db      (none: in-memory store, nothing persists)");
    eprintln!("  --module  subtraction-nikhilam");
    eprintln!();
    eprintln!("Modules:");
    for module in catalog() {
        eprintln!("  {:<24} {}", module.id().to_string(), module.title());
    }
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  TUTOR_DB_URL, TUTOR_MODULE_ID");
    eprintln!("  TUTOR_ENABLE_TIMER, TUTOR_QUESTION_TIME_LIMIT, TUTOR_QUESTION_COUNTS");
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("TUTOR_DB_URL").ok().map(normalize_sqlite_url);
        let mut module_raw = std::env::var("TUTOR_MODULE_ID")
            .unwrap_or_else(|_| "subtraction-nikhilam".to_owned());

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = Some(normalize_sqlite_url(value));
                }
                "--module" => {
                    module_raw = require_value(args, "--module")?;
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        let module = ModuleId::new(&module_raw)
            .ok()
            .and_then(|id| find_in_catalog(&id))
            .ok_or(ArgsError::InvalidModuleId { raw: module_raw })?;

        Ok(Self { db_url, module })
    }
}

/// Accepts bare paths, `sqlite:path` and full `sqlite://` URLs alike.
fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let path_str = raw.trim().strip_prefix("sqlite:").unwrap_or(raw.trim());
    let path = std::path::Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

/// sqlx will not create the database file itself; make sure it and its
/// parent directory exist before connecting.
fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" || db_url.contains("mode=memory") {
        return Ok(());
    }

    let invalid = || ArgsError::InvalidDbUrl {
        raw: db_url.to_string(),
    };
    let path = db_url.strip_prefix("sqlite://").ok_or_else(invalid)?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(invalid().into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }
    Ok(())
}

//
// ─── RENDERING ─────────────────────────────────────────────────────────────────
//

fn format_clock(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Worked example shown on the learn screen.
fn learn_text(operation: Operation) -> &'static str {
    match operation {
        Operation::Subtraction => concat!(
            "All from 9 and the last from 10.\n",
            "To subtract from a power of ten, complement each digit of the\n",
            "subtrahend to 9 and the final digit to 10. No borrowing needed.\n",
            "\n",
            "  1000 - 567:\n",
            "    9 - 5 = 4,  9 - 6 = 3,  10 - 7 = 3\n",
            "    1000 - 567 = 433",
        ),
        Operation::Addition => concat!(
            "Add vertically, column by column.\n",
            "Work right to left and carry whenever a column exceeds 9.\n",
            "\n",
            "  476 + 358:\n",
            "    6 + 8 = 14  (write 4, carry 1)\n",
            "    7 + 5 + 1 = 13  (write 3, carry 1)\n",
            "    4 + 3 + 1 = 8\n",
            "    476 + 358 = 834",
        ),
        Operation::Multiplication => concat!(
            "Vertically and crosswise (Urdhva-Tiryagbhyam).\n",
            "Multiply the units vertically, cross-multiply the middle,\n",
            "multiply the tens vertically, then sum with carries.\n",
            "\n",
            "  23 × 41:\n",
            "    3 × 1 = 3\n",
            "    2 × 1 + 3 × 4 = 14  (write 4, carry 1)\n",
            "    2 × 4 + 1 = 9\n",
            "    23 × 41 = 943",
        ),
        Operation::Division => concat!(
            "Transpose and apply (Paravartya Yojayet).\n",
            "Peel the dividend left to right, carrying the running\n",
            "remainder into the next digit. Every exercise here divides\n",
            "evenly, so the last remainder is always zero.\n",
            "\n",
            "  324 ÷ 4:\n",
            "    32 ÷ 4 = 8,  carry 0\n",
            "    04 ÷ 4 = 1\n",
            "    324 ÷ 4 = 81",
        ),
    }
}

fn render(session: &ModuleSession) {
    let state = session.state();
    println!();
    match state.phase() {
        Phase::Learn => {
            println!("=== {} : learn ===", session.module().title());
            println!("{}", learn_text(session.module().operation()));
            println!();
            if state.return_to_practice() {
                println!("(type `back` to return to your practice run)");
            } else {
                println!("(type `got-it` to start practicing)");
            }
        }
        Phase::Practice => {
            if state.practice_count().is_none() {
                println!("=== {} : practice ===", session.module().title());
                let menu: Vec<String> = session
                    .config()
                    .practice_counts()
                    .iter()
                    .map(u32::to_string)
                    .collect();
                println!("How many questions? `count N` with N in [{}]", menu.join(", "));
            } else if let Some(question) = session.current_question() {
                println!(
                    "Question {}/{}  {}",
                    state.question_index() + 1,
                    state.practice_count().unwrap_or(0),
                    timer_line(&state),
                );
                println!("  {}", question.prompt());
                for (i, option) in question.options().iter().enumerate() {
                    let marker = if state.selected_answer() == Some(option.as_str()) {
                        ">"
                    } else {
                        " "
                    };
                    println!("  {marker}{}. {option}", i + 1);
                }
                println!("(pick 1-4, then `submit`; also: `pause`, `example`, `quit`)");
            }
        }
        Phase::Understand => {
            println!("=== {} : nice work ===", session.module().title());
            if let Some(summary) = session.practice_summary() {
                println!(
                    "  {}/{} correct ({}%)",
                    summary.correct(),
                    summary.total(),
                    summary.accuracy_percent(),
                );
                println!(
                    "  time on questions: {} ({}s per question)",
                    format_clock(summary.time_spent_secs()),
                    summary.avg_secs_per_question(),
                );
                println!("  points earned: {}", summary.points_earned());
            }
            println!("(type `finish` to complete the module, or `example` to revisit)");
        }
        Phase::Completed => {
            println!("=== {} : completed ===", session.module().title());
        }
    }
}

fn timer_line(state: &services::SessionState) -> String {
    let question = if state.timer_enabled() {
        format!("[{}]", format_clock(state.time_left()))
    } else {
        "[--:--]".to_owned()
    };
    let session = if state.session_overtime() > 0 {
        format!("session +{}", format_clock(state.session_overtime()))
    } else {
        format!("session {}", format_clock(state.session_time_left()))
    };
    format!("{question} ({session})")
}

/// Holds the result on screen with both clocks torn down, then lets the
/// caller re-sync them against the advanced state.
async fn reveal(pair: &mut ClockPair, outcome: &AnswerOutcome) {
    pair.teardown();
    if outcome.timed_out() {
        println!("Time's up!");
    } else if outcome.correct() {
        println!("Correct!");
    } else {
        println!("Not quite.");
    }
    println!("Answer: {}", outcome.correct_answer());
    println!("  {}", outcome.explanation());
    tokio::time::sleep(Duration::from_millis(outcome.reveal_ms())).await;
}

//
// ─── SESSION LOOP ──────────────────────────────────────────────────────────────
//

async fn drive_session(
    service: &mut ModuleLoopService,
    session: &mut ModuleSession,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut pair = ClockPair::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    render(session);
    loop {
        pair.sync(&session.state());
        if session.phase() == Phase::Completed {
            if let Ok(total) = service.total_points().await {
                println!("Total points: {total}");
            }
            break;
        }

        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if handle_command(line.trim(), service, session, &mut pair).await? {
                    break;
                }
            }
            event = pair.next() => {
                match event {
                    Some(ClockEvent::Question) => {
                        match service.question_tick(session).await {
                            Ok(Some(answered)) => {
                                reveal(&mut pair, answered.outcome()).await;
                                render(session);
                            }
                            Ok(None) => {
                                let state = session.state();
                                println!("  {}", timer_line(&state));
                            }
                            Err(err) => println!("! {err}"),
                        }
                    }
                    Some(ClockEvent::Session) => session.session_tick(),
                    None => {}
                }
            }
        }
    }
    Ok(())
}

/// Dispatches one stdin line. Returns true to quit. Illegal transitions are
/// reported and the loop keeps going.
async fn handle_command(
    command: &str,
    service: &mut ModuleLoopService,
    session: &mut ModuleSession,
    pair: &mut ClockPair,
) -> Result<bool, Box<dyn std::error::Error>> {
    match command {
        "" => {}
        "quit" | "q" => {
            if service.pending_checkpoint().is_some() && !service.retry_checkpoint().await {
                println!("! a checkpoint is still unsaved; progress may be lost");
            }
            return Ok(true);
        }
        "got-it" => match service.start_practice(session).await {
            Ok(report) => {
                if report.checkpoint_failed() {
                    println!("! checkpoint not saved, will retry");
                }
                render(session);
            }
            Err(err) => println!("! {err}"),
        },
        "submit" => match service.submit_answer(session).await {
            Ok(answered) => {
                reveal(pair, answered.outcome()).await;
                if let Some(total) = answered.report().points_total() {
                    println!("Points: {total}");
                }
                render(session);
            }
            Err(err) => println!("! {err}"),
        },
        "pause" => match session.toggle_pause() {
            Ok(true) => println!("Paused. Type `pause` again to resume."),
            Ok(false) => println!("Resumed."),
            Err(err) => println!("! {err}"),
        },
        "example" => match session.view_example() {
            Ok(()) => render(session),
            Err(err) => println!("! {err}"),
        },
        "back" => match session.return_to_practice() {
            Ok(()) => render(session),
            Err(err) => println!("! {err}"),
        },
        "finish" => match service.complete_module(session).await {
            Ok(report) => {
                render(session);
                if let Some(total) = report.points_total() {
                    println!("Module reward banked. Points: {total}");
                }
            }
            Err(err) => println!("! {err}"),
        },
        other => {
            if let Some(raw) = other.strip_prefix("count ") {
                match raw.trim().parse::<u32>() {
                    Ok(count) => match session.select_practice_count(count, &mut rand::rng()) {
                        Ok(()) => render(session),
                        Err(err) => println!("! {err}"),
                    },
                    Err(_) => println!("! count takes a number, e.g. `count 10`"),
                }
            } else if let Ok(pick) = other.parse::<usize>() {
                let choice = session
                    .current_question()
                    .and_then(|q| q.options().get(pick.wrapping_sub(1)))
                    .cloned();
                match choice {
                    Some(choice) => match session.select_answer(&choice) {
                        Ok(()) => render(session),
                        Err(err) => println!("! {err}"),
                    },
                    None => println!("! pick a number between 1 and 4"),
                }
            } else {
                println!(
                    "! commands: got-it, count N, 1-4, submit, pause, example, back, finish, quit"
                );
            }
        }
    }
    Ok(false)
}

//
// ─── ENTRY POINT ───────────────────────────────────────────────────────────────
//

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let args = Args::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let storage = match &args.db_url {
        Some(url) => {
            prepare_sqlite_file(url)?;
            Storage::sqlite(url).await?
        }
        None => {
            log::info!("no --db given, using the in-memory store");
            Storage::in_memory()
        }
    };

    let config = SessionConfig::from_env();
    let mut service = ModuleLoopService::with_storage(&storage, Clock::default_clock());
    let mut session = service.mount(args.module, config).await;

    drive_session(&mut service, &mut session).await
}

#[tokio::main]
async fn main() {
    pretty_env_logger::init();
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
