use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use rand::{rngs::StdRng, SeedableRng};
use rpg_sage_dice::{roll_message, Channel, DiceError, RollConfig};

#[derive(Parser)]
#[clap(version, about = "Roll RPG Sage style dice expressions")]
struct CommandLineArgs {
    /// Chat message or dice expression, e.g. "[4d6dl1 + 2 Strength]".
    message: Vec<String>,

    /// TOML configuration file.
    #[clap(long, short = 'c')]
    config: Option<PathBuf>,

    /// Seed the generator for reproducible rolls.
    #[clap(long, short = 's')]
    seed: Option<u64>,

    /// Render as posted publicly, hiding the values of secret rolls.
    #[clap(long)]
    public: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = CommandLineArgs::parse();

    let config = match &args.config {
        Some(path) => match RollConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{}: {e}", path.display());
                return ExitCode::FAILURE;
            }
        },
        None => RollConfig::default(),
    };

    match run(&args, &config) {
        Ok(lines) => {
            for line in lines {
                println!("{line}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &CommandLineArgs, config: &RollConfig) -> Result<Vec<String>, DiceError> {
    let message = args.message.join(" ");
    let channel = if args.public {
        Channel::Public
    } else {
        Channel::Private
    };

    let rolls = match args.seed {
        Some(seed) => roll_message(&message, &mut StdRng::seed_from_u64(seed), config)?,
        None => roll_message(&message, &mut rand::thread_rng(), config)?,
    };
    Ok(rolls.iter().map(|rolled| rolled.output(channel)).collect())
}
