//! Self-play match generation CLI.
//!
//! Plays computer-vs-computer matches on one map and writes one JSON record
//! per match.
//!
//! Usage:
//!   cargo run --release --bin selfplay -- --map FILE [OPTIONS]
//!
//! Options:
//!   --map FILE      Map definition, grid text or .json (required)
//!   --games N       Number of games to play (default: 10)
//!   --threads N     Number of parallel threads (default: 4)
//!   --seed N        Base random seed, 0 for entropy (default: 0)
//!   --max-turns N   Turn limit before a tie (default: 200)
//!   --output FILE   Output file path (default: stdout)
//!   --quiet         Suppress progress and summary output

use std::env;
use std::fs::File;
use std::io::{self, BufWriter};
use std::process;
use std::str::FromStr;
use std::time::Instant;

use tracing_subscriber::EnvFilter;

use andwars::protocol::load_map;
use andwars::selfplay::{self, SelfPlayConfig, Summary};

fn main() {
    let args: Vec<String> = env::args().collect();
    let mut config = SelfPlayConfig::default();
    let mut map_path: Option<String> = None;
    let mut output_path: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--map" => map_path = Some(value(&args, &mut i, "--map").to_string()),
            "--games" => config.num_games = parsed(&args, &mut i, "--games"),
            "--threads" => config.threads = parsed(&args, &mut i, "--threads"),
            "--seed" => config.seed = parsed(&args, &mut i, "--seed"),
            "--max-turns" => config.rules.max_turns = parsed(&args, &mut i, "--max-turns"),
            "--output" => output_path = Some(value(&args, &mut i, "--output").to_string()),
            "--quiet" => config.quiet = true,
            "--help" | "-h" => {
                print_usage();
                return;
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }

    let default_level = if config.quiet { "warn" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_writer(io::stderr)
        .init();

    let Some(map_path) = map_path else {
        eprintln!("--map is required");
        print_usage();
        process::exit(1);
    };
    if let Err(e) = config.rules.validate() {
        eprintln!("invalid rules: {}", e);
        process::exit(1);
    }
    let map = load_map(&map_path).unwrap_or_else(|e| {
        eprintln!("failed to load {}: {}", map_path, e);
        process::exit(1);
    });

    if !config.quiet {
        eprintln!(
            "Self-play: {} games on '{}', max {} turns, {} threads",
            config.num_games,
            map.name(),
            config.rules.max_turns,
            config.threads
        );
    }

    let start = Instant::now();
    let records = selfplay::run_self_play(&map, &config);
    let elapsed = start.elapsed();

    if !config.quiet {
        eprintln!(
            "Completed {} games in {:.1}s",
            records.len(),
            elapsed.as_secs_f64()
        );
        eprintln!("{}", Summary::from_records(&records));
    }

    let written = match &output_path {
        Some(path) => {
            let file = File::create(path).expect("failed to create output file");
            selfplay::write_jsonl(&records, &mut BufWriter::new(file))
        }
        None => selfplay::write_jsonl(&records, &mut BufWriter::new(io::stdout().lock())),
    };
    written.expect("failed to write output");

    if let (Some(path), false) = (output_path, config.quiet) {
        eprintln!("Wrote {} games to {}", records.len(), path);
    }
}

fn value<'a>(args: &'a [String], i: &mut usize, flag: &str) -> &'a str {
    *i += 1;
    match args.get(*i) {
        Some(v) => v.as_str(),
        None => {
            eprintln!("missing value for {}", flag);
            process::exit(1);
        }
    }
}

fn parsed<T: FromStr>(args: &[String], i: &mut usize, flag: &str) -> T {
    let raw = value(args, i, flag);
    raw.parse().unwrap_or_else(|_| {
        eprintln!("invalid {} value: {}", flag, raw);
        process::exit(1);
    })
}

fn print_usage() {
    eprintln!("Usage: selfplay --map FILE [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --map FILE       Map definition, grid text or .json (required)");
    eprintln!("  --games N        Number of games to play (default: 10)");
    eprintln!("  --threads N      Number of parallel threads (default: 4)");
    eprintln!("  --seed N         Base random seed, 0 for entropy (default: 0)");
    eprintln!("  --max-turns N    Turn limit before a tie (default: 200)");
    eprintln!("  --output FILE    Output file path (default: stdout)");
    eprintln!("  --quiet          Suppress progress and summary output");
    eprintln!("  --help           Show this help");
}
