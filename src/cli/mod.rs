//! The Emo Command-Line Interface.
//!
//! Runs a batch of `.emo` files through the engine, printing a `STATUS:` line
//! after each stage. Parse and file errors stop the whole batch; normalization
//! and runtime errors fail only the file they occur in.

use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;

use crate::cli::args::{DumpFormat, EmoArgs};
use crate::cli::output::{print_tree, Status, StdoutSink};
use crate::discovery::discover_sources;
use crate::engine::{load_source, Engine};
use crate::errors::{print_error, EmoError};

pub mod args;
pub mod output;

/// The main entry point for the CLI.
pub fn run() {
    let args = EmoArgs::parse();
    process::exit(run_batch(&args));
}

/// Runs every selected file and returns the process exit code.
pub fn run_batch(args: &EmoArgs) -> i32 {
    let mut status = Status::new(args.color.choice());

    let files = match select_files(args) {
        Ok(files) => files,
        Err(e) => {
            status.failed(&e.to_string());
            print_error(e);
            return 1;
        }
    };

    let engine = Engine::standard();
    status.ok("Parser Generated Successfully");
    status.separator();

    let mut failures = 0usize;
    for path in &files {
        let Err(e) = run_file(&engine, path, args, &mut status) else {
            continue;
        };
        let fatal = e.category().is_fatal();
        status.failed(&e.to_string());
        print_error(e);
        status.separator();
        if fatal {
            return 1;
        }
        failures += 1;
    }

    if failures > 0 {
        1
    } else {
        0
    }
}

fn select_files(args: &EmoArgs) -> Result<Vec<PathBuf>, EmoError> {
    if args.files.is_empty() {
        discover_sources(&args.batch_dir)
    } else {
        Ok(args.files.clone())
    }
}

fn run_file(
    engine: &Engine<'_>,
    path: &Path,
    args: &EmoArgs,
    status: &mut Status,
) -> Result<(), EmoError> {
    let source = load_source(path)?;
    let tree = engine.parse(&source)?;
    status.ok(&format!("{} Parsed Successfully", source.name));

    let parsed = (args.dump == Some(DumpFormat::Diff)).then(|| tree.clone());
    let tree = engine.normalize(tree, &source)?;
    if let Some(format) = args.dump {
        print_tree(&tree, format, parsed.as_ref(), args.color.choice());
    }

    engine.execute(&tree, &source, &mut StdoutSink)?;
    status.ok(&format!("{} ran without any interrupt", source.name));
    status.separator();
    Ok(())
}
