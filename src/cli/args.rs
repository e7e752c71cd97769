//! Defines the command-line arguments for the Emo CLI.
//!
//! This module uses the `clap` crate with its "derive" feature to create a
//! declarative and type-safe argument parsing structure.

use clap::{Parser, ValueEnum};
use std::io::IsTerminal;
use std::path::PathBuf;
use termcolor::ColorChoice;

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "emo",
    version,
    about = "Run Emo programs: parse, normalize emoji tokens, evaluate."
)]
pub struct EmoArgs {
    /// The `.emo` files to run. With none, every `.emo` file under --batch-dir runs.
    pub files: Vec<PathBuf>,

    /// Directory scanned for the default batch.
    #[arg(long, default_value = "tests")]
    pub batch_dir: PathBuf,

    /// Print each normalized tree before it runs.
    #[arg(long, value_enum)]
    pub dump: Option<DumpFormat>,

    /// When to color status lines.
    #[arg(long, value_enum, default_value_t = ColorMode::Auto)]
    pub color: ColorMode,
}

/// How `--dump` renders a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DumpFormat {
    /// Indented rule/token listing.
    Pretty,
    /// The tree as JSON.
    Json,
    /// Line diff between the parsed and the normalized tree.
    Diff,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    /// termcolor's `Auto` only inspects the environment, so a piped stdout is
    /// checked here. `IsTerminal` is the std replacement for the deprecated
    /// `atty` crate.
    pub fn choice(self) -> ColorChoice {
        match self {
            ColorMode::Auto if std::io::stdout().is_terminal() => ColorChoice::Auto,
            ColorMode::Auto => ColorChoice::Never,
            ColorMode::Always => ColorChoice::Always,
            ColorMode::Never => ColorChoice::Never,
        }
    }
}
