use std::fmt;
use std::path::PathBuf;

use services::{AppServices, Clock};
use storage::catalog::{builtin_catalog, load_catalog_file};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tutor_core::model::{
    Catalog, LessonId, ParseIdError, QuizAnswers, QuizScore, SubjectId, UserId,
};
use tutor_core::recommend::RecommendationPolicy;

mod render;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingOperand { command: &'static str, operand: &'static str },
    UnknownArg(String),
    UnknownCommand(String),
    InvalidNumber { what: &'static str, raw: String },
    InvalidId(ParseIdError),
    InvalidDbUrl { raw: String },
    TooManyAnswers { given: usize, questions: usize },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingOperand { command, operand } => {
                write!(f, "{command} requires <{operand}>")
            }
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown subcommand: {cmd}"),
            ArgsError::InvalidNumber { what, raw } => write!(f, "invalid {what}: {raw}"),
            ArgsError::InvalidId(err) => write!(f, "{err}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::TooManyAnswers { given, questions } => {
                write!(f, "{given} answers given but the quiz has {questions} questions")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

impl From<ParseIdError> for ArgsError {
    fn from(err: ParseIdError) -> Self {
        ArgsError::InvalidId(err)
    }
}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  tutor [dashboard]                      [options]");
    eprintln!("  tutor lessons <subject-id>             [options]");
    eprintln!("  tutor lesson <lesson-id>               [options]");
    eprintln!("  tutor quiz <lesson-id> <answer>...     [options]");
    eprintln!("  tutor complete <lesson-id> <score>     [options]");
    eprintln!("  tutor profile                          [options]");
    eprintln!("  tutor seed                             [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>          default sqlite://tutor.sqlite3");
    eprintln!("  --user <id>                default 1");
    eprintln!("  --catalog <file.json>      default: built-in catalog");
    eprintln!("  --progression <a,b,...>    default calculus,programming,statistics,physics");
    eprintln!();
    eprintln!("Quiz answers are zero-based option indices, one for every question, in order.");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  TUTOR_DB_URL, TUTOR_USER_ID, TUTOR_CATALOG, TUTOR_PROGRESSION, RUST_LOG");
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Dashboard,
    Lessons(SubjectId),
    Lesson(LessonId),
    Quiz {
        lesson: LessonId,
        answers: Vec<usize>,
    },
    Complete {
        lesson: LessonId,
        score: u32,
    },
    Profile,
    Seed,
}

impl Command {
    fn from_operands(operands: Vec<String>) -> Result<Self, ArgsError> {
        let mut operands = operands.into_iter();
        let Some(name) = operands.next() else {
            return Ok(Self::Dashboard);
        };

        let cmd = match name.as_str() {
            "dashboard" => Self::Dashboard,
            "lessons" => {
                Self::Lessons(next_operand(&mut operands, "lessons", "subject-id")?.parse()?)
            }
            "lesson" => Self::Lesson(next_operand(&mut operands, "lesson", "lesson-id")?.parse()?),
            "quiz" => {
                let lesson = next_operand(&mut operands, "quiz", "lesson-id")?.parse()?;
                let answers = operands
                    .by_ref()
                    .map(|raw| {
                        raw.parse::<usize>().map_err(|_| ArgsError::InvalidNumber {
                            what: "answer index",
                            raw,
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Self::Quiz { lesson, answers }
            }
            "complete" => {
                let lesson = next_operand(&mut operands, "complete", "lesson-id")?.parse()?;
                let raw = next_operand(&mut operands, "complete", "score")?;
                let score = raw
                    .parse::<u32>()
                    .map_err(|_| ArgsError::InvalidNumber { what: "score", raw })?;
                Self::Complete { lesson, score }
            }
            "profile" => Self::Profile,
            "seed" => Self::Seed,
            _ => return Err(ArgsError::UnknownCommand(name)),
        };

        if let Some(extra) = operands.next() {
            return Err(ArgsError::UnknownArg(extra));
        }
        Ok(cmd)
    }
}

fn next_operand(
    operands: &mut impl Iterator<Item = String>,
    command: &'static str,
    operand: &'static str,
) -> Result<String, ArgsError> {
    operands
        .next()
        .ok_or(ArgsError::MissingOperand { command, operand })
}

struct Args {
    db_url: String,
    user_id: UserId,
    catalog: Option<PathBuf>,
    progression: Option<Vec<SubjectId>>,
    command: Command,
}

impl Args {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Option<Self>, ArgsError> {
        let mut db_url = std::env::var("TUTOR_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://tutor.sqlite3".into(), normalize_sqlite_url);
        let mut user_id = std::env::var("TUTOR_USER_ID")
            .ok()
            .and_then(|value| value.parse::<UserId>().ok())
            .unwrap_or_else(|| UserId::new("1"));
        let mut catalog = std::env::var_os("TUTOR_CATALOG").map(PathBuf::from);
        let mut progression = match std::env::var("TUTOR_PROGRESSION") {
            Ok(value) => Some(parse_progression(&value)?),
            Err(_) => None,
        };

        let mut operands = Vec::new();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--user" => {
                    user_id = require_value(&mut args, "--user")?.parse()?;
                }
                "--catalog" => {
                    catalog = Some(PathBuf::from(require_value(&mut args, "--catalog")?));
                }
                "--progression" => {
                    let value = require_value(&mut args, "--progression")?;
                    progression = Some(parse_progression(&value)?);
                }
                "--help" | "-h" => return Ok(None),
                flag if flag.starts_with("--") => return Err(ArgsError::UnknownArg(arg)),
                _ => operands.push(arg),
            }
        }

        Ok(Some(Self {
            db_url,
            user_id,
            catalog,
            progression,
            command: Command::from_operands(operands)?,
        }))
    }
}

fn parse_progression(raw: &str) -> Result<Vec<SubjectId>, ArgsError> {
    raw.split(',')
        .filter(|part| !part.trim().is_empty())
        .map(|part| part.parse().map_err(ArgsError::from))
        .collect()
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
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

fn load_catalog(path: Option<&PathBuf>) -> Result<Catalog, Box<dyn std::error::Error>> {
    let catalog = match path {
        Some(path) => load_catalog_file(path)?,
        None => builtin_catalog()?,
    };
    Ok(catalog)
}

fn quiz_answers(
    lesson: &tutor_core::model::Lesson,
    selected: &[usize],
) -> Result<QuizAnswers, ArgsError> {
    let questions = &lesson.quiz.questions;
    if selected.len() > questions.len() {
        return Err(ArgsError::TooManyAnswers {
            given: selected.len(),
            questions: questions.len(),
        });
    }
    Ok(questions
        .iter()
        .zip(selected)
        .map(|(question, index)| (question.id.clone(), *index))
        .collect())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tutor=info,services=info,storage=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let parsed = match Args::parse(std::env::args().skip(1)) {
        Ok(Some(parsed)) => parsed,
        Ok(None) => {
            print_usage();
            return Ok(());
        }
        Err(err) => {
            eprintln!("{err}");
            print_usage();
            return Err(err.into());
        }
    };

    tracing::debug!(db = %parsed.db_url, user_id = %parsed.user_id, command = ?parsed.command, "starting");
    let catalog = load_catalog(parsed.catalog.as_ref())?;
    let policy = match parsed.progression {
        Some(progression) => RecommendationPolicy::with_progression(progression)?,
        None => RecommendationPolicy::default(),
    };

    // Open + migrate SQLite at startup. Keep this in the binary glue so core/services stay pure.
    prepare_sqlite_file(&parsed.db_url)?;
    let app = AppServices::new_sqlite(
        &parsed.db_url,
        Clock::system(),
        catalog,
        policy,
        parsed.user_id,
    )
    .await?;
    if app.bootstrapped() {
        eprintln!("No saved progress for user {}; started from the demo profile.", app.user_id());
    }
    let user_id = app.user_id();
    let learning = app.learning();

    let output = match parsed.command {
        Command::Dashboard => render::dashboard(&learning.dashboard(user_id).await?),
        Command::Lessons(subject) => {
            render::lesson_list(&learning.lesson_list(user_id, &subject).await?)
        }
        Command::Lesson(lesson) => render::lesson(learning.lesson(&lesson)?),
        Command::Quiz { lesson, answers } => {
            let answers = quiz_answers(learning.lesson(&lesson)?, &answers)?;
            render::submission(&learning.submit_quiz(user_id, &lesson, &answers).await?)
        }
        Command::Complete { lesson, score } => {
            let score = QuizScore::new(score)?;
            render::completion(&learning.complete_lesson(user_id, &lesson, score).await?)
        }
        Command::Profile => render::profile(&learning.profile(user_id).await?),
        Command::Seed => {
            let user = app.users().seed(user_id).await?;
            format!("Seeded {} ({}).\n", user.name(), user.id())
        }
    };
    print!("{output}");
    Ok(())
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
