use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use hoshi_core::dictionary::DictionaryType;

#[derive(Parser)]
#[command(name = "hoshi", about = "Dictionary lookup for Japanese e-books")]
pub struct Cli {
    /// Data directory holding Dictionaries/ (overrides HOSHI_DATA_DIR)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,
    /// Print JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Kind {
    Term,
    Frequency,
    Pitch,
}

impl From<Kind> for DictionaryType {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Term => DictionaryType::Term,
            Kind::Frequency => DictionaryType::Frequency,
            Kind::Pitch => DictionaryType::Pitch,
        }
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Import a Yomitan dictionary archive
    Import {
        /// Zip archive
        archive: PathBuf,
        #[arg(long, value_enum, default_value = "term")]
        kind: Kind,
    },
    /// List imported dictionaries
    List {
        /// Only this type
        #[arg(long, value_enum)]
        kind: Option<Kind>,
    },
    /// Enable a dictionary
    Enable {
        #[arg(value_enum)]
        kind: Kind,
        order: usize,
    },
    /// Disable a dictionary without removing it
    Disable {
        #[arg(value_enum)]
        kind: Kind,
        order: usize,
    },
    /// Move a dictionary to another position
    Move {
        #[arg(value_enum)]
        kind: Kind,
        from: usize,
        to: usize,
    },
    /// Delete a dictionary and its files
    Delete {
        #[arg(value_enum)]
        kind: Kind,
        order: usize,
    },
    /// Look up the word at a character offset
    Lookup {
        text: String,
        /// Character offset into the text
        #[arg(long, default_value_t = 0)]
        offset: usize,
        /// Entries to return (defaults to HOSHI_MAX_RESULTS)
        #[arg(long)]
        max_results: Option<usize>,
    },
    /// Count readable characters of an XHTML chapter
    Count {
        file: PathBuf,
    },
    /// Show or replace the popup stylesheet
    Css {
        css: Option<String>,
    },
}
