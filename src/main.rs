//! Demo CLI: exercises [`songfilter::SongFilter`] against a fixture of
//! songs loaded from JSON, the way `mpdhaj::main` wires `clap` +
//! `tracing` + `color-eyre` around its `System`. Not part of the
//! library surface.

use camino::Utf8PathBuf;
use clap::Parser;
use color_eyre::eyre::{Context, Result};
use tracing_subscriber::EnvFilter;

use songfilter::{Song, SongFilter, SongView};

#[derive(Debug, Parser)]
#[command(name = "songfilter", about = "Evaluate a song-filter expression against a library")]
struct Cli {
    /// Parenthesized filter expression, e.g. `(title contains "Rain")`.
    #[arg(short = 'f', long = "filter", conflicts_with = "tag")]
    filter: Option<String>,

    /// Legacy flat `tag value` pair, repeatable; `KEY=VALUE`.
    #[arg(long = "tag", value_parser = parse_tag_pair)]
    tag: Vec<(String, String)>,

    /// Fold case for operators that inherit the top-level flag.
    #[arg(long)]
    fold_case: bool,

    /// JSON file containing a `Vec<Song>` fixture to match against.
    #[arg(long)]
    songs: Option<Utf8PathBuf>,

    /// Optimize the parsed tree before matching and printing it.
    #[arg(long)]
    optimize: bool,
}

fn parse_tag_pair(s: &str) -> Result<(String, String), String> {
    let (tag, value) = s.split_once('=').ok_or_else(|| format!("expected KEY=VALUE, got {s:?}"))?;
    Ok((tag.to_string(), value.to_string()))
}

fn main() -> Result<()> {
    color_eyre::install()?;
    setup_tracing();

    let cli = Cli::parse();
    let mut filter = build_filter(&cli).wrap_err("failed to parse song filter")?;

    if cli.optimize {
        filter.optimize();
    }
    println!("{}", filter.to_expression());

    if let Some(songs_path) = &cli.songs {
        run_against_songs(&filter, songs_path)?;
    }

    Ok(())
}

#[tracing::instrument(skip(cli))]
fn build_filter(cli: &Cli) -> Result<SongFilter, songfilter::ParseError> {
    if let Some(expr) = &cli.filter {
        tracing::debug!(expr, "parsing filter expression");
        return SongFilter::parse(&[expr.clone()], cli.fold_case);
    }

    let args: Vec<String> = cli.tag.iter().flat_map(|(tag, value)| [tag.clone(), value.clone()]).collect();
    tracing::debug!(pairs = cli.tag.len(), "parsing flat tag/value pairs");
    SongFilter::parse(&args, cli.fold_case)
}

#[tracing::instrument(skip(filter))]
fn run_against_songs(filter: &SongFilter, path: &Utf8PathBuf) -> Result<()> {
    let contents = std::fs::read_to_string(path).wrap_err_with(|| format!("failed to read {path:?}"))?;
    let songs: Vec<Song> = serde_json::from_str(&contents).wrap_err_with(|| format!("failed to parse {path:?} as a song list"))?;

    let mut matched = 0;
    for song in &songs {
        if filter.matches(song) {
            matched += 1;
            println!("{}", song.uri());
        }
    }
    tracing::debug!(total = songs.len(), matched, "finished matching songs");
    Ok(())
}

fn setup_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).pretty().with_line_number(true).init();
}
