use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use songfinder::{Config, SongFinder, Track};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "songfinder",
    about = "Search songs on online platforms and save them locally",
    long_about = "Search songs on online platforms and save their audio as mp3 files.\n\n\
    Examples:\n\
      songfinder search lofi                                      # Search YouTube\n\
      songfinder download 'https://www.youtube.com/watch?v=ID'    # Save audio\n\
      songfinder -d ./music download 'https://...watch?v=ID'      # Save to directory\n\
      songfinder --json search lofi                               # JSON output"
)]
struct Args {
    /// Platform to query
    #[arg(short = 'p', long, global = true, default_value = "youtube")]
    platform: String,

    /// TOML config file
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    /// Download to specified directory
    #[arg(short = 'd', long = "dir", global = true)]
    output_dir: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search songs by keyword
    Search { query: String },
    /// Extract the best audio stream of a song page and save it
    Download { locator: String },
    /// List registered platforms
    Platforms,
}

fn display_track(index: usize, track: &Track) {
    println!("[{}] {}", index + 1, track.title());
    println!("    URL: {}", track.source_url());
    if let Some(author) = track.author() {
        println!("    Author: {}", author);
    }
    if let Some(thumbnail) = track.thumbnail_url() {
        println!("    Thumbnail: {}", thumbnail);
    }
    if track.is_saved() {
        println!("    Saved as: {}", track.local_path());
    }
}

fn print_tracks(tracks: &[Track], json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(tracks)?);
        return Ok(());
    }
    if tracks.is_empty() {
        println!("No songs found.");
    }
    for (index, track) in tracks.iter().enumerate() {
        display_track(index, track);
    }
    Ok(())
}

async fn run(args: Args) -> anyhow::Result<()> {
    let mut config = Config::load(args.config.as_deref()).context("loading config")?;
    if let Some(dir) = args.output_dir {
        config.output_dir = dir;
    }
    let finder = SongFinder::from_config(&config)?;

    match args.command {
        Command::Search { query } => {
            let tracks = finder.find(&query, &args.platform).await?;
            print_tracks(&tracks, args.json)?;
        }
        Command::Download { locator } => {
            let track = finder.download(&locator, &args.platform).await?;
            print_tracks(std::slice::from_ref(&track), args.json)?;
            if !args.json {
                println!(
                    "✓ Saved to: {}",
                    config.output_dir.join(track.local_path()).display()
                );
            }
        }
        Command::Platforms => {
            for name in finder.registry().platforms() {
                println!("{}", name);
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("songfinder=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    if let Err(e) = run(args).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
