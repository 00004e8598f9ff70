use clap::Parser;
use postflop_cfr::*;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::sync::Arc;

/// Heads-up post-flop CFR solver.
#[derive(Parser)]
#[command(name = "postflop-cfr", version, about)]
struct Args {
    /// Initial board cards, e.g. "Qs,Jh,2h" (3 = flop, 4 = turn, 5 = river)
    #[arg(long)]
    board: String,

    /// OOP (player 0) range string
    #[arg(long)]
    oop_range: String,

    /// IP (player 1) range string
    #[arg(long)]
    ip_range: String,

    /// Starting pot in chips
    #[arg(long, default_value_t = 50)]
    pot: i32,

    /// Effective remaining stack in chips
    #[arg(long, default_value_t = 200)]
    stack: i32,

    /// Bet sizes as pot fractions, e.g. "0.5,1.0" or "50%,100%"
    #[arg(long, default_value = "0.5,1.0")]
    bet_sizes: String,

    /// Raise sizes as fractions of the pot after a call
    #[arg(long, default_value = "1.0")]
    raise_sizes: String,

    /// Maximum raises per street
    #[arg(long, default_value_t = 3)]
    raise_cap: usize,

    /// Number of iterations
    #[arg(long, default_value_t = 300)]
    iteration_number: i32,

    /// Exploitability evaluation / snapshot cadence
    #[arg(long, default_value_t = 10)]
    print_interval: i32,

    /// Warm-up iterations with the sampled-suit chance estimator
    #[arg(long, default_value_t = 0)]
    warmup: i32,

    /// Stop when the exploitability (chips) drops to this value
    #[arg(long, default_value_t = 0.0)]
    accuracy: f32,

    /// Worker threads (0 = one per logical core)
    #[arg(long, default_value_t = 0)]
    num_threads: usize,

    /// "discounted_cfr" or "cfr_plus"
    #[arg(long, default_value = "discounted_cfr")]
    algorithm: String,

    /// Disable suit-isomorphism sub-tree reuse
    #[arg(long)]
    no_isomorphism: bool,

    /// Accumulate and dump per-hand equities
    #[arg(long)]
    enable_equity: bool,

    /// Dump per-node reach probabilities
    #[arg(long)]
    enable_range: bool,

    /// Dump depth in chance rounds
    #[arg(long, default_value_t = 2)]
    dump_depth: usize,

    /// Strategy output file (JSON)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Exploitability trajectory log (JSON lines)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn parse_sizes(s: &str) -> SolverResult<Vec<f32>> {
    s.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| {
            let (number, percent) = match token.strip_suffix('%') {
                Some(stripped) => (stripped, true),
                None => (token, false),
            };
            let value: f32 = number
                .parse()
                .map_err(|_| SolverError::InvalidConfig(format!("bad bet size: {token}")))?;
            Ok(if percent { value / 100.0 } else { value })
        })
        .collect()
}

fn run(args: Args) -> SolverResult<()> {
    let board = board_from_str(&args.board)?;
    let root_street = match board.len() {
        3 => Street::Flop,
        4 => Street::Turn,
        5 => Street::River,
        _ => return Err(SolverError::InvalidBoard(args.board.clone())),
    };

    let oop_range = parse_range(&args.oop_range)?;
    let ip_range = parse_range(&args.ip_range)?;
    let bet_sizes = parse_sizes(&args.bet_sizes)?;
    let raise_sizes = parse_sizes(&args.raise_sizes)?;

    let tree = GameTree::build(&TreeConfig {
        root_street,
        starting_pot: args.pot,
        effective_stack: args.stack,
        bet_sizes: [bet_sizes.clone(), bet_sizes],
        raise_sizes: [raise_sizes.clone(), raise_sizes],
        raise_cap: args.raise_cap,
        ..Default::default()
    })?;

    let config = SolverConfig {
        iteration_number: args.iteration_number,
        print_interval: args.print_interval,
        warmup: args.warmup,
        accuracy: args.accuracy,
        num_threads: args.num_threads,
        algorithm: args.algorithm.parse()?,
        use_isomorphism: !args.no_isomorphism,
        enable_equity: args.enable_equity,
        enable_range: args.enable_range,
        show_progress: true,
        log_file: args.log_file,
    };

    let solver = Solver::new(tree, [oop_range, ip_range], board, Arc::new(HandEvaluator), config)?;
    let exploitability = solver.train()?;
    println!(
        "final exploitability: {:.4} chips ({:.2}% of pot)",
        exploitability,
        100.0 * exploitability / args.pot as f32
    );

    if let Some(path) = &args.output {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(writer, &solver.dump(args.dump_depth))?;
        println!("strategy written to {}", path.display());
    }

    Ok(())
}

fn main() {
    let args = Args::parse();
    if let Err(error) = run(args) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}
