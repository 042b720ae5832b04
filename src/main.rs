use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use tern_engine::{Engine, EngineOptions, SearchConfig, SearchLimits, format_score};

/// Positions searched by `tern bench`.
const BENCH_FENS: &[&str] = &[
    tern_core::STARTING_FEN,
    "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
    "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
    "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
    "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
    "r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4",
];

#[derive(Parser)]
#[command(name = "tern", version, about = "Chess search engine core")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search a fixed set of positions and report node throughput.
    Bench {
        #[arg(short, long, default_value_t = 6)]
        depth: u8,
        #[command(flatten)]
        engine: EngineArgs,
    },
    /// Search one position and print the best move.
    Search {
        /// Position to search; the start position when omitted.
        #[arg(short, long)]
        fen: Option<String>,
        /// Long-algebraic moves to play from the position first.
        #[arg(short, long, num_args = 1..)]
        moves: Vec<String>,
        #[arg(short, long)]
        depth: Option<u8>,
        /// Time per move in milliseconds.
        #[arg(long)]
        movetime: Option<u64>,
        #[command(flatten)]
        engine: EngineArgs,
    },
}

#[derive(Args)]
struct EngineArgs {
    /// Search workers.
    #[arg(short, long, default_value_t = 1)]
    threads: usize,
    /// Transposition table size in MB.
    #[arg(long, default_value_t = 16)]
    hash: usize,
    /// Resolve captures below the horizon.
    #[arg(long)]
    quiescence: bool,
}

impl EngineArgs {
    fn build(&self) -> Result<Engine> {
        let options = EngineOptions {
            threads: self.threads,
            hash_mb: self.hash,
        };
        let mut engine = Engine::new(options).context("invalid engine options")?;
        engine.set_config(SearchConfig {
            quiescence: self.quiescence,
            ..engine.config()
        });
        Ok(engine)
    }
}

fn bench(depth: u8, args: &EngineArgs) -> Result<()> {
    let mut engine = args.build()?;
    let started = Instant::now();
    let mut nodes = 0u64;
    for fen in BENCH_FENS {
        engine.new_game();
        engine.set_position(fen)?;
        let result = engine.go(SearchLimits::depth(depth))?;
        println!(
            "{:>12} nodes  {:<6} {:<10} {fen}",
            result.nodes,
            result.best_move.to_uci(),
            format_score(result.score)
        );
        nodes += result.nodes;
    }
    let elapsed = started.elapsed();
    let nps = (u128::from(nodes) * 1000 / elapsed.as_millis().max(1)) as u64;
    println!("{nodes} nodes {nps} nps");
    info!(nodes, nps, elapsed_ms = elapsed.as_millis() as u64, "bench complete");
    Ok(())
}

fn search(
    fen: Option<&str>,
    moves: &[String],
    depth: Option<u8>,
    movetime: Option<u64>,
    args: &EngineArgs,
) -> Result<()> {
    let mut engine = args.build()?;
    if let Some(fen) = fen {
        engine.set_position(fen).with_context(|| format!("cannot load {fen:?}"))?;
    }
    let moves: Vec<&str> = moves.iter().map(String::as_str).collect();
    engine.play_moves(&moves)?;

    let mut limits = match movetime {
        Some(ms) => SearchLimits::move_time(Duration::from_millis(ms)),
        None => SearchLimits::default(),
    };
    limits.depth = depth.or(movetime.is_none().then_some(8));

    let result = engine.go(limits)?;
    let pv: Vec<String> = result.pv.iter().map(|mv| mv.to_uci()).collect();
    println!(
        "depth {} score {} nodes {} pv {}",
        result.depth,
        format_score(result.score),
        result.nodes,
        pv.join(" ")
    );
    println!("bestmove {}", result.best_move.to_uci());
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Command::Bench { depth, engine } => bench(depth, &engine),
        Command::Search {
            fen,
            moves,
            depth,
            movetime,
            engine,
        } => search(fen.as_deref(), &moves, depth, movetime, &engine),
    }
}
