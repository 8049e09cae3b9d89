use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::info;

use mpv_history::serialize::dump_json;
use mpv_history::{all_sessions, history, merge_files, ListenedFilter, ReconstructConfig};

#[derive(Parser)]
#[command(name = "mpv-history", version, about = "Reconstruct and archive mpv playback history")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print sessions reconstructed from event files as JSON
    Parse {
        /// Raw event files and/or merged history files
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Include sessions that fail the listened-to heuristic
        #[arg(long)]
        all: bool,
    },
    /// Merge raw event files and merged files into one store
    Merge {
        /// Raw event files and/or merged history files
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Write the merged store here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Skip raw files modified more recently than this many seconds
        #[arg(long, default_value_t = 3600.0)]
        mtime_seconds: f64,
    },
}

fn main() -> Result<()> {
    // Reads RUST_LOG for overrides.
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    match Cli::parse().command {
        Command::Parse { files, all } => {
            let config = ReconstructConfig::default();
            let sessions = if all {
                all_sessions(&files, &config)?
            } else {
                history(&files, &config, &ListenedFilter::default())?
            };
            info!("reconstructed {} sessions from {} files", sessions.len(), files.len());
            println!("{}", serde_json::to_string_pretty(&sessions)?);
        }
        Command::Merge {
            files,
            output,
            mtime_seconds,
        } => {
            let result = merge_files(&files, mtime_seconds)?;
            for path in &result.consumed {
                info!("consumed {}", path.display());
            }
            let encoded = dump_json(&result.merged)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, encoded)?;
                    info!("wrote merged store to {}", path.display());
                }
                None => println!("{encoded}"),
            }
        }
    }
    Ok(())
}
