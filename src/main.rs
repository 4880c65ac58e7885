//! Gridboard command-line front end.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use gridboard::settings::Settings;
use gridboard::types::RawFile;
use gridboard::{Board, Item, ItemId, Position, TransferOutcome};
use std::path::PathBuf;

/// Spatial board of uploaded files and folders
#[derive(Debug, Parser)]
#[command(name = "gridboard", version, about, long_about = None)]
struct Cli {
    /// Settings file (defaults to the platform config directory)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Override the data directory from settings
    #[arg(long)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List every item, folders with their children
    List,
    /// Upload files onto the board
    Add {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        #[arg(long)]
        x: Option<f64>,
        #[arg(long)]
        y: Option<f64>,
    },
    /// Create an empty folder
    Folder {
        name: String,
        #[arg(long, default_value_t = 0.0)]
        x: f64,
        #[arg(long, default_value_t = 0.0)]
        y: f64,
    },
    /// Move an item on the canvas (takes it out of its folder if needed)
    Move {
        id: ItemId,
        #[arg(long)]
        x: f64,
        #[arg(long)]
        y: f64,
    },
    /// Put a top-level item into a folder
    Into { id: ItemId, folder: ItemId },
    /// Take a child out of its folder onto the canvas
    Out {
        folder: ItemId,
        child: ItemId,
        #[arg(long)]
        x: f64,
        #[arg(long)]
        y: f64,
    },
    /// Move a child from one folder to another
    Reparent {
        child: ItemId,
        from: ItemId,
        to: ItemId,
    },
    /// Remove an item (folders take their children with them)
    Rm { id: ItemId },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    gridboard::logging::init();
    let cli = Cli::parse();

    let mut settings = match &cli.settings {
        Some(path) => Settings::load_from(path).with_env_overrides(|key| std::env::var(key).ok()),
        None => Settings::load(),
    };
    if let Some(dir) = cli.data_dir {
        settings.data_dir = Some(dir);
    }

    let mut board = Board::from_settings(&settings);
    run(cli.command, &mut board, &settings).await
}

async fn run(command: Command, board: &mut Board, settings: &Settings) -> Result<()> {
    match command {
        Command::List => print_collection(board),
        Command::Add { paths, x, y } => {
            let files = paths
                .iter()
                .map(|path| {
                    RawFile::from_path(path).with_context(|| format!("reading {}", path.display()))
                })
                .collect::<Result<Vec<_>>>()?;
            let default = board.drop_origin();
            let origin = Position::new(x.unwrap_or(default.x), y.unwrap_or(default.y));

            let uploader = settings.uploader();
            let report = board.add_files(uploader.as_ref(), files, origin).await;
            for id in &report.added {
                println!("added {}", id);
            }
            for failure in &report.failed {
                eprintln!("failed {}: {}", failure.name, failure.error);
            }
            if report.added.is_empty() && !report.failed.is_empty() {
                bail!("no files were uploaded");
            }
        }
        Command::Folder { name, x, y } => {
            let id = board.create_folder(&name, Position::new(x, y));
            println!("{}", id);
        }
        Command::Move { id, x, y } => report(board.move_to_canvas(id, Position::new(x, y)))?,
        Command::Into { id, folder } => report(board.move_into_folder(id, folder))?,
        Command::Out { folder, child, x, y } => {
            report(board.take_child_out(folder, child, Position::new(x, y)))?
        }
        Command::Reparent { child, from, to } => report(board.reparent_child(from, child, to))?,
        Command::Rm { id } => {
            if !board.remove_item(id) {
                bail!("no item {}", id);
            }
        }
    }
    Ok(())
}

fn report(outcome: TransferOutcome) -> Result<()> {
    match outcome {
        TransferOutcome::Moved => Ok(()),
        TransferOutcome::Unchanged => {
            println!("nothing to do");
            Ok(())
        }
        TransferOutcome::Rejected(reason) => bail!("{}", reason),
    }
}

fn print_collection(board: &Board) {
    for item in board.collection().items {
        print_item(&item, 0);
        for child in &item.children {
            print_item(child, 1);
        }
    }
}

fn print_item(item: &Item, depth: usize) {
    let indent = "  ".repeat(depth);
    let position = item
        .position
        .map(|p| format!(" @ ({}, {})", p.x, p.y))
        .unwrap_or_default();
    println!(
        "{}{} {:6} {}{}",
        indent,
        item.id,
        item.kind.label(),
        item.name,
        position
    );
}
