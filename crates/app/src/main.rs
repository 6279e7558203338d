use std::io::{self, Write};

use anyhow::{Context, Result, bail};
use clap::Parser;
use quiz_core::model::{OptionDraft, OptionEdit, QuestionDetail, QuestionId, Topic, TopicId};
use quiz_core::text::{option_index, option_label};
use serde::Serialize;
use services::sample::seed_sample_catalog;
use services::{AppServices, CatalogService, Clock, QuizService};
use storage::StorageConfig;

mod cli;
mod play;

use cli::{Cli, Commands, QuestionCommands, QuizArgs, TopicCommands};

/// Environment variable holding the log filter.
const LOG_ENV: &str = "QUIZ_LOG";

fn init_tracing(verbose: u8) {
    use tracing_subscriber::EnvFilter;

    // QUIZ_LOG wins over the verbosity flag.
    let filter = match std::env::var(LOG_ENV) {
        Ok(value) if !value.trim().is_empty() => EnvFilter::new(value),
        _ => match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            _ => EnvFilter::new("debug"),
        },
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn normalize_sqlite_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed == "sqlite::memory:"
        || trimmed.starts_with("sqlite://")
        || trimmed.contains("mode=memory")
    {
        return trimmed.to_string();
    }

    let path_str = trimmed.strip_prefix("sqlite:").unwrap_or(trimmed);
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

/// Make sure the directory holding the database file exists.
fn prepare_sqlite_dir(db_url: &str) -> Result<()> {
    let Some(path) = db_url.strip_prefix("sqlite://") else {
        return Ok(());
    };
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        bail!("invalid --db value: {db_url}");
    }
    if let Some(parent) = std::path::Path::new(path).parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_question(detail: &QuestionDetail) {
    println!("#{} {}", detail.id(), detail.text());
    for (i, option) in detail.options.iter().enumerate() {
        let mark = if option.is_correct { "  (correct)" } else { "" };
        println!("  {}. {}{mark}", option_label(i), option.text);
    }
}

fn correct_index(label: &str, options: usize) -> Result<usize> {
    match option_index(label) {
        Some(i) if i < options => Ok(i),
        _ => bail!(
            "--correct must be a letter between A and {}",
            option_label(options.saturating_sub(1))
        ),
    }
}

async fn resolve_topic(catalog: &CatalogService, name: &str) -> Result<Topic> {
    catalog
        .find_topic_by_name(name)
        .await?
        .with_context(|| format!("no topic named {:?}", name.trim()))
}

async fn run_topic(catalog: &CatalogService, command: TopicCommands, json: bool) -> Result<()> {
    match command {
        TopicCommands::List => {
            let topics = catalog.list_topics().await?;
            if json {
                return print_json(&topics);
            }
            if topics.is_empty() {
                println!("No topics yet.");
            }
            for topic in topics {
                println!("{:>4}  {}", topic.id(), topic.name());
            }
        }
        TopicCommands::Add { name } => {
            let topic = catalog.create_topic(&name).await?;
            if json {
                return print_json(&topic);
            }
            println!("Created topic #{} {}", topic.id(), topic.name());
        }
        TopicCommands::Rename { id, name } => {
            let topic = catalog.update_topic(TopicId::new(id), &name).await?;
            println!("Renamed topic #{} to {}", topic.id(), topic.name());
        }
        TopicCommands::Delete { id } => {
            catalog.delete_topic(TopicId::new(id)).await?;
            println!("Deleted topic #{id}");
        }
    }
    Ok(())
}

async fn run_question(
    catalog: &CatalogService,
    command: QuestionCommands,
    json: bool,
) -> Result<()> {
    match command {
        QuestionCommands::List { topic } => {
            let filter = match topic {
                Some(name) => Some(resolve_topic(catalog, &name).await?.id()),
                None => None,
            };
            let items: Vec<_> = catalog
                .list_questions()
                .await?
                .into_iter()
                .filter(|q| filter.is_none_or(|id| q.topic_id == id))
                .collect();
            if json {
                return print_json(&items);
            }
            if items.is_empty() {
                println!("No questions yet.");
            }
            for item in items {
                println!("{:>4}  [{}]  {}", item.id, item.topic_id, item.preview);
            }
        }
        QuestionCommands::Show { id } => {
            let detail = catalog
                .get_question(QuestionId::new(id))
                .await?
                .with_context(|| format!("question {id} not found"))?;
            if json {
                return print_json(&detail);
            }
            print_question(&detail);
        }
        QuestionCommands::Add(args) => {
            let topic = resolve_topic(catalog, &args.topic).await?;
            let correct = correct_index(&args.correct, args.options.len())?;
            let options = args
                .options
                .into_iter()
                .enumerate()
                .map(|(i, text)| OptionDraft::new(text, i == correct))
                .collect();
            let detail = catalog
                .create_question(topic.id(), &args.text, options)
                .await?;
            if json {
                return print_json(&detail);
            }
            println!("Created question #{} in {}", detail.id(), topic.name());
        }
        QuestionCommands::Edit(args) => {
            let id = QuestionId::new(args.id);
            let current = catalog
                .get_question(id)
                .await?
                .with_context(|| format!("question {id} not found"))?;
            if !args.options.is_empty() && args.options.len() != current.options.len() {
                bail!(
                    "question {id} has {} options; pass --option once for each",
                    current.options.len()
                );
            }
            let correct = match &args.correct {
                Some(label) => Some(correct_index(label, current.options.len())?),
                None => None,
            };

            let edits = current
                .options
                .iter()
                .enumerate()
                .map(|(i, stored)| {
                    let text = args.options.get(i).unwrap_or(&stored.text).clone();
                    let is_correct = correct.map_or(stored.is_correct, |c| c == i);
                    OptionEdit::new(stored.id, text, is_correct)
                })
                .collect();
            let text = args.text.as_deref().unwrap_or(current.text());
            let detail = catalog.update_question(id, text, edits).await?;
            if json {
                return print_json(&detail);
            }
            print_question(&detail);
        }
        QuestionCommands::Delete { id } => {
            catalog.delete_question(QuestionId::new(id)).await?;
            println!("Deleted question #{id}");
        }
    }
    Ok(())
}

async fn run_quiz(quiz: &QuizService, args: QuizArgs, json: bool) -> Result<()> {
    let quiz = match args.seed {
        Some(seed) => quiz.clone().with_seed(seed),
        None => quiz.clone(),
    };
    let mut session = quiz.start_session(&args.topic, args.count).await?;

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let Some(report) = play::play(&mut session, stdin.lock(), &mut stdout)? else {
        return Ok(());
    };

    if json {
        print_json(&report)
    } else {
        play::render_report(&report, &mut stdout)?;
        stdout.flush()?;
        Ok(())
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Open + migrate SQLite at startup. Keep this in the binary glue so services stay pure.
    let db_url = normalize_sqlite_url(&cli.db);
    prepare_sqlite_dir(&db_url)?;
    let services = AppServices::new_sqlite(&StorageConfig::new(db_url.as_str()), Clock::default())
        .await
        .with_context(|| format!("opening {db_url}"))?;
    tracing::debug!(db = %db_url, "services ready");

    match cli.command {
        Commands::Topic { command } => run_topic(&services.catalog(), command, cli.json).await,
        Commands::Question { command } => {
            run_question(&services.catalog(), command, cli.json).await
        }
        Commands::Quiz(args) => run_quiz(&services.quiz(), args, cli.json).await,
        Commands::Seed => {
            let seeded = seed_sample_catalog(&services.catalog()).await?;
            if seeded.questions_created == 0 {
                println!("Topic {} already exists, nothing to do.", seeded.topic.name());
            } else {
                println!(
                    "Created topic {} with {} questions.",
                    seeded.topic.name(),
                    seeded.questions_created
                );
            }
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("Error: {err:#}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_paths_become_absolute_urls() {
        let url = normalize_sqlite_url("data/quiz.db");
        assert!(url.starts_with("sqlite:///"));
        assert!(url.ends_with("data/quiz.db"));

        let url = normalize_sqlite_url("sqlite:quiz.db");
        assert!(url.starts_with("sqlite:///"));
        assert!(url.ends_with("/quiz.db"));
    }

    #[test]
    fn urls_and_memory_databases_pass_through() {
        assert_eq!(normalize_sqlite_url("sqlite://quiz.db"), "sqlite://quiz.db");
        assert_eq!(normalize_sqlite_url("sqlite::memory:"), "sqlite::memory:");
        assert_eq!(
            normalize_sqlite_url("sqlite:file:t?mode=memory&cache=shared"),
            "sqlite:file:t?mode=memory&cache=shared"
        );
    }

    #[test]
    fn correct_letter_must_name_an_option() {
        assert_eq!(correct_index("b", 4).unwrap(), 1);
        assert!(correct_index("E", 4).is_err());
        assert!(correct_index("1", 4).is_err());
    }
}
