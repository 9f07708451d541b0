//! Command-line driver for the search core.
//!
//! Searches a position, counts perft nodes, or replays a move list and
//! searches the result.

mod config;

use anyhow::Context;
use chess_core::Fen;
use chess_search::{
    perft, perft_divide, MaterialEvaluator, Position, SearchConfig, SearchResult, Searcher,
};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "chess-search")]
#[command(about = "Chess move search and move generator checks")]
struct Cli {
    /// Path to the TOML config file
    #[arg(long, global = true, default_value_os_t = config::default_path())]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Overrides for the values read from the config file.
#[derive(Args, Debug, Default)]
struct SearchArgs {
    /// Search depth in plies
    #[arg(short, long)]
    depth: Option<u8>,
    /// Transposition table size in megabytes
    #[arg(long)]
    hash_mb: Option<usize>,
    /// Search without a transposition table
    #[arg(long)]
    no_tt: bool,
    /// Run a single fixed-depth search instead of iterative deepening
    #[arg(long)]
    fixed: bool,
}

impl SearchArgs {
    fn apply(&self, config: &mut SearchConfig) {
        if let Some(depth) = self.depth {
            config.depth = depth;
        }
        if let Some(hash_mb) = self.hash_mb {
            config.hash_mb = hash_mb;
        }
        if self.no_tt {
            config.use_tt = false;
        }
        if self.fixed {
            config.iterative = false;
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Search a position and print the best move
    Search {
        /// Position to search
        #[arg(long, default_value = Fen::STARTPOS)]
        fen: String,
        #[command(flatten)]
        args: SearchArgs,
    },
    /// Count leaf nodes of the legal move tree
    Perft {
        #[arg(long, default_value = Fen::STARTPOS)]
        fen: String,
        #[arg(short, long)]
        depth: u32,
        /// Print the count below each root move
        #[arg(long)]
        divide: bool,
    },
    /// Play a sequence of moves, then search the resulting position
    Play {
        #[arg(long, default_value = Fen::STARTPOS)]
        fen: String,
        /// Moves in UCI notation, e.g. e2e4 e7e5
        #[arg(long, num_args = 1..)]
        moves: Vec<String>,
        #[command(flatten)]
        args: SearchArgs,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Search { fen, args } => {
            let mut config = config::load(&cli.config)?;
            args.apply(&mut config);
            let mut position = parse_position(&fen)?;
            run_search(&mut position, &config);
        }
        Commands::Perft { fen, depth, divide } => {
            let mut position = parse_position(&fen)?;
            let started = Instant::now();
            let nodes = if divide {
                let results = perft_divide(&mut position, depth);
                for (mv, count) in &results {
                    println!("{}: {}", mv, count);
                }
                results.iter().map(|(_, count)| count).sum()
            } else {
                perft(&mut position, depth)
            };
            println!("nodes {}", nodes);
            tracing::info!(
                depth,
                nodes,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "perft done"
            );
        }
        Commands::Play { fen, moves, args } => {
            let mut config = config::load(&cli.config)?;
            args.apply(&mut config);
            let mut position = parse_position(&fen)?;
            play_moves(&mut position, &moves)?;
            println!("position {}", position.to_fen());
            run_search(&mut position, &config);
        }
    }

    Ok(())
}

fn parse_position(fen: &str) -> anyhow::Result<Position> {
    Position::from_fen(fen).with_context(|| format!("invalid position: {}", fen))
}

fn play_moves(position: &mut Position, moves: &[String]) -> anyhow::Result<()> {
    for (i, uci) in moves.iter().enumerate() {
        let _ = position
            .play_uci(uci)
            .with_context(|| format!("move {} ({})", i + 1, uci))?;
    }
    Ok(())
}

fn run_search(position: &mut Position, config: &SearchConfig) {
    tracing::info!(
        depth = config.depth,
        hash_mb = config.hash_mb,
        use_tt = config.use_tt,
        "searching"
    );
    let mut searcher = Searcher::from_config(MaterialEvaluator, config);
    let result = searcher.search_with(position, config);

    println!("{}", outcome_line(&result, position.is_in_check()));
    match result.mate_in() {
        Some(plies) => println!("score mate {} plies", plies),
        None => println!("score cp {}", result.score),
    }
    println!("nodes {} tt_hits {}", result.nodes, result.tt_hits);
}

/// First line of the search report. A depth-0 search has not generated
/// moves and reports neither mate nor stalemate.
fn outcome_line(result: &SearchResult, in_check: bool) -> String {
    match result.best_move {
        Some(m) => format!("bestmove {}", m),
        None if result.depth == 0 => "bestmove (none)".to_string(),
        None if in_check => "checkmate".to_string(),
        None => "stalemate".to_string(),
    }
}
