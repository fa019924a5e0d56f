mod app;
mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use wortkarte::StudyMode;

#[derive(Parser)]
#[command(name = "wortkarte-cli", about = "German vocabulary trainer", version)]
struct Cli {
    /// Database file (default: platform data directory)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Output format for listings
    #[arg(long, global = true, default_value = "plain")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum ModeArg {
    /// Flip between the English and German sides
    Flashcard,
    /// Guess the noun's article
    Gender,
}

impl From<ModeArg> for StudyMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Flashcard => StudyMode::Flashcard,
            ModeArg::Gender => StudyMode::GenderQuiz,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Manage decks
    #[command(subcommand)]
    Deck(DeckCommand),

    /// Manage cards
    #[command(subcommand)]
    Card(CardCommand),

    /// Run an interactive study session
    Study {
        /// Deck name, name prefix, or id
        deck: String,
        /// Presentation mode
        #[arg(long, default_value = "flashcard")]
        mode: ModeArg,
        /// Target number of cards for the session
        #[arg(long, default_value = "20")]
        goal: usize,
        /// Seed the session shuffle for a reproducible card order
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Show card counts per deck
    Stats {
        /// Restrict to one deck
        deck: Option<String>,
    },

    /// Snapshot backup of all decks and cards
    #[command(subcommand)]
    Backup(BackupCommand),

    /// CSV exchange
    #[command(subcommand)]
    Csv(CsvCommand),

    /// Delete every deck and card
    Wipe {
        /// Confirm the wipe
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum DeckCommand {
    /// List all decks
    List,
    /// Create a deck
    Add { name: String },
    /// Rename a deck
    Rename { deck: String, name: String },
    /// Delete a deck and all its cards
    Rm {
        deck: String,
        /// Confirm the delete
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum CardCommand {
    /// Add a card to a deck
    Add {
        deck: String,
        #[arg(long)]
        english: String,
        #[arg(long)]
        german: String,
        /// der, die or das (nouns only)
        #[arg(long)]
        article: Option<String>,
        #[arg(long)]
        plural: Option<String>,
        #[arg(long)]
        example: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// List the cards of a deck
    List { deck: String },
    /// Edit a card's text fields
    Edit {
        id: String,
        #[arg(long)]
        english: Option<String>,
        #[arg(long)]
        german: Option<String>,
        #[arg(long)]
        article: Option<String>,
        #[arg(long)]
        plural: Option<String>,
        #[arg(long)]
        example: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Delete a card
    Rm { id: String },
}

#[derive(Subcommand)]
enum BackupCommand {
    /// Write all decks and cards to a JSON snapshot file
    Export { path: PathBuf },
    /// Replace all decks and cards with a snapshot's contents
    Import {
        path: PathBuf,
        /// Confirm replacing the current contents
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum CsvCommand {
    /// Import cards from a CSV file into a deck
    Import { deck: String, path: PathBuf },
    /// Export a deck's cards to a CSV file
    Export { deck: String, path: PathBuf },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let mut app = app::App::open(cli.db.as_deref())?;

    match cli.command {
        Command::Deck(subcmd) => match subcmd {
            DeckCommand::List => commands::deck::list(&app, cli.format)?,
            DeckCommand::Add { name } => commands::deck::add(&mut app, &name)?,
            DeckCommand::Rename { deck, name } => commands::deck::rename(&mut app, &deck, &name)?,
            DeckCommand::Rm { deck, yes } => commands::deck::rm(&mut app, &deck, yes)?,
        },
        Command::Card(subcmd) => match subcmd {
            CardCommand::Add {
                deck,
                english,
                german,
                article,
                plural,
                example,
                notes,
            } => commands::card::add(
                &mut app,
                &deck,
                wortkarte::vocab::models::CardFields {
                    english,
                    german,
                    article,
                    plural,
                    example,
                    notes,
                },
            )?,
            CardCommand::List { deck } => commands::card::list(&app, &deck, cli.format)?,
            CardCommand::Edit {
                id,
                english,
                german,
                article,
                plural,
                example,
                notes,
            } => commands::card::edit(
                &mut app, &id, english, german, article, plural, example, notes,
            )?,
            CardCommand::Rm { id } => commands::card::rm(&mut app, &id)?,
        },
        Command::Study {
            deck,
            mode,
            goal,
            seed,
        } => commands::study::run(&mut app, &deck, mode.into(), goal, seed)?,
        Command::Stats { deck } => commands::stats::run(&app, deck.as_deref(), cli.format)?,
        Command::Backup(subcmd) => match subcmd {
            BackupCommand::Export { path } => commands::transfer::backup_export(&mut app, &path)?,
            BackupCommand::Import { path, yes } => {
                commands::transfer::backup_import(&mut app, &path, yes)?
            }
        },
        Command::Csv(subcmd) => match subcmd {
            CsvCommand::Import { deck, path } => {
                commands::transfer::csv_import(&mut app, &deck, &path)?
            }
            CsvCommand::Export { deck, path } => {
                commands::transfer::csv_export(&app, &deck, &path)?
            }
        },
        Command::Wipe { yes } => {
            if !yes {
                anyhow::bail!("refusing to wipe without --yes");
            }
            app.store.wipe_all()?;
            println!("store wiped");
        }
    }

    Ok(())
}
