//! Command-line definitions.

use clap::{Args, Parser, Subcommand};

use services::quiz::DEFAULT_QUIZ_LENGTH;
use storage::config::{DB_URL_ENV, DEFAULT_DB_URL};

/// Topic, question and quiz management over a local database.
#[derive(Parser, Debug)]
#[command(name = "quiz", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Database URL or path to the SQLite file
    #[arg(long, global = true, env = DB_URL_ENV, default_value = DEFAULT_DB_URL)]
    pub db: String,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Topic management
    Topic {
        #[command(subcommand)]
        command: TopicCommands,
    },

    /// Question management
    Question {
        #[command(subcommand)]
        command: QuestionCommands,
    },

    /// Take a quiz on a topic
    Quiz(QuizArgs),

    /// Create a sample "Geography" topic with questions
    Seed,
}

#[derive(Subcommand, Debug)]
pub enum TopicCommands {
    /// List all topics
    List,

    /// Create a topic
    Add {
        /// Topic name
        name: String,
    },

    /// Rename a topic
    Rename {
        /// Topic id
        id: u64,
        /// New name
        name: String,
    },

    /// Delete a topic without questions
    Delete {
        /// Topic id
        id: u64,
    },
}

#[derive(Subcommand, Debug)]
pub enum QuestionCommands {
    /// List questions
    List {
        /// Only questions of this topic
        #[arg(long)]
        topic: Option<String>,
    },

    /// Show a question with its options
    Show {
        /// Question id
        id: u64,
    },

    /// Create a question
    Add(AddQuestionArgs),

    /// Rewrite a question and its options in place
    Edit(EditQuestionArgs),

    /// Delete a question and its options
    Delete {
        /// Question id
        id: u64,
    },
}

#[derive(Args, Debug)]
pub struct AddQuestionArgs {
    /// Topic name
    #[arg(long)]
    pub topic: String,

    /// Question text
    pub text: String,

    /// Option text, repeat for each option (labelled A, B, C, ...)
    #[arg(long = "option", short = 'o', required = true)]
    pub options: Vec<String>,

    /// Letter of the correct option
    #[arg(long, short = 'c')]
    pub correct: String,
}

#[derive(Args, Debug)]
pub struct EditQuestionArgs {
    /// Question id
    pub id: u64,

    /// New question text (keeps the current text if omitted)
    #[arg(long)]
    pub text: Option<String>,

    /// New option texts, one per existing option, in order
    #[arg(long = "option", short = 'o')]
    pub options: Vec<String>,

    /// Letter of the correct option (keeps the current one if omitted)
    #[arg(long, short = 'c')]
    pub correct: Option<String>,
}

#[derive(Args, Debug)]
pub struct QuizArgs {
    /// Topic name
    #[arg(long)]
    pub topic: String,

    /// Number of questions (menu presets: 5, 10, 15)
    #[arg(long, short = 'n', default_value_t = DEFAULT_QUIZ_LENGTH)]
    pub count: usize,

    /// Seed for a repeatable question selection
    #[arg(long)]
    pub seed: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn quiz_defaults_to_five_questions() {
        let cli = Cli::parse_from(["quiz", "quiz", "--topic", "Geography"]);
        match cli.command {
            Commands::Quiz(args) => {
                assert_eq!(args.topic, "Geography");
                assert_eq!(args.count, 5);
                assert!(args.seed.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn question_add_collects_options() {
        let cli = Cli::parse_from([
            "quiz", "question", "add", "--topic", "Geography", "Capital of France?", "-o",
            "Paris", "-o", "Lyon", "--correct", "A",
        ]);
        let Commands::Question {
            command: QuestionCommands::Add(args),
        } = cli.command
        else {
            panic!("expected question add");
        };
        assert_eq!(args.options, ["Paris", "Lyon"]);
        assert_eq!(args.correct, "A");
    }
}
