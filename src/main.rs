use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rsbcrypt::{Cost, DEFAULT_COST, HashParts, Hasher, LengthPolicy, MAX_COST, MIN_COST, Variant};
use std::process::ExitCode;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;
mod auth;

/// Password used by `bench`, same as the comparison harness it replaces.
const BENCH_PASSWORD: &str = "MyPassw0rd?";

#[derive(Debug, Parser)]
#[command(name = "rsbcrypt")]
#[command(version, about = "bcrypt password hashing from the command line.")]
struct Cli {
    /// Print debug logs to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Hashes a password read from RSBCRYPT_PASSWORD, stdin or a prompt
    Hash {
        /// Cost factor, 4 to 31
        #[arg(long, env = "RSBCRYPT_COST", default_value_t = DEFAULT_COST)]
        cost: u32,

        /// Variant tag written into the hash
        #[arg(long, default_value = "2b")]
        variant: Variant,

        /// Ignore bytes past 72 instead of failing
        #[arg(long, default_value_t = false)]
        truncate: bool,
    },

    /// Checks a password against a hash
    #[command(arg_required_else_help = true)]
    Verify {
        hash: String,

        /// Ignore bytes past 72 instead of failing
        #[arg(long, default_value_t = false)]
        truncate: bool,
    },

    /// Prints the variant, cost and salt of a hash as JSON
    #[command(arg_required_else_help = true)]
    Inspect { hash: String },

    /// Measures wall time per hash for each cost
    Bench {
        /// Cost to measure, may be repeated
        #[arg(long = "cost", default_values_t = [4u32, 6, 8, 10])]
        costs: Vec<u32>,

        /// Hashes per cost
        #[arg(short = 'n', long, default_value_t = 5)]
        iterations: u32,
    },

    /// Prints MIN_COST, MAX_COST and DEFAULT_COST
    Constants,
}

fn length_policy(truncate: bool) -> LengthPolicy {
    if truncate {
        LengthPolicy::Truncate
    } else {
        LengthPolicy::Reject
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn bench(costs: &[u32], iterations: u32) -> Result<()> {
    let iterations = iterations.max(1);

    println!("| library | op | n | cost | time |");
    println!("|---------|----|---|------|------|");

    let mut previous: Option<Duration> = None;
    for &cost in costs {
        let hasher = Hasher::new(Cost::new(cost)?);

        let start = Instant::now();
        let mut last = None;
        for _ in 0..iterations {
            last = Some(hasher.hash(BENCH_PASSWORD)?);
        }
        let per_hash = start.elapsed() / iterations;

        let hash = last.context("no hash produced")?.to_string();
        let start = Instant::now();
        for _ in 0..iterations {
            hasher.verify(BENCH_PASSWORD, &hash)?;
        }
        let per_verify = start.elapsed() / iterations;

        println!(
            "| rsbcrypt | hash | {iterations} | {cost} | {:.3} ms/hash |",
            per_hash.as_secs_f64() * 1e3
        );
        println!(
            "| rsbcrypt | verify | {iterations} | {cost} | {:.3} ms/verify |",
            per_verify.as_secs_f64() * 1e3
        );

        if let Some(prev) = previous {
            tracing::info!(
                cost,
                ratio = per_hash.as_secs_f64() / prev.as_secs_f64(),
                "time relative to previous cost"
            );
        }
        previous = Some(per_hash);
    }

    Ok(())
}

fn main() -> Result<ExitCode> {
    let args = Cli::parse();
    init_tracing(args.verbose);

    match args.command {
        Commands::Hash {
            cost,
            variant,
            truncate,
        } => {
            let hasher = Hasher::new(Cost::new(cost)?)
                .with_variant(variant)
                .with_length_policy(length_policy(truncate));
            let password = auth::read_new_password()?;
            let hash = hasher
                .hash(password.as_bytes())
                .context("failed to hash password")?;
            println!("{hash}");
        }
        Commands::Verify { hash, truncate } => {
            let expected = HashParts::parse(hash.trim())?;
            let hasher = Hasher::default().with_length_policy(length_policy(truncate));
            let password = auth::read_password()?;

            if hasher.verify_parts(password.as_bytes(), &expected)? {
                println!("match");
            } else {
                println!("mismatch");
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Inspect { hash } => {
            let parts = HashParts::parse(hash.trim())?;
            println!("{}", serde_json::to_string_pretty(&parts)?);
        }
        Commands::Bench { costs, iterations } => {
            bench(&costs, iterations)?;
        }
        Commands::Constants => {
            println!("MIN_COST={MIN_COST}");
            println!("MAX_COST={MAX_COST}");
            println!("DEFAULT_COST={DEFAULT_COST}");
        }
    }

    Ok(ExitCode::SUCCESS)
}
