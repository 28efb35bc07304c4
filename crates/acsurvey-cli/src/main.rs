//! CLI for acsurvey, automatic channel selection against a simulated radio.

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "acsurvey")]
#[command(about = "acsurvey: survey-based automatic channel selection for access points")]
#[command(version = acsurvey_core::VERSION)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a full channel selection sweep against a simulated environment
    Simulate {
        /// Scenario JSON describing the band and per-channel traffic
        #[arg(long)]
        scenario: String,

        /// ACS config JSON (num_req_surveys, roc_duration_ms)
        #[arg(long)]
        config: Option<String>,

        /// Override the number of survey rounds
        #[arg(long)]
        rounds: Option<u32>,

        /// Override the off-channel dwell in milliseconds
        #[arg(long)]
        dwell_ms: Option<u32>,

        /// RNG seed for the simulated radio
        #[arg(long, default_value = "1")]
        seed: u64,

        /// Write the sweep report as JSON
        #[arg(long)]
        output: Option<String>,
    },

    /// List the channel plan of a band
    Plan {
        /// Band: 2g (also 2, 2.4, 2.4ghz) or 5g (also 5, 5ghz)
        #[arg(long, default_value = "2g")]
        band: String,
    },

    /// Compute the interference factor of a single survey sample
    Score {
        /// Busy time
        #[arg(long)]
        busy: u64,

        /// Own transmit time
        #[arg(long, default_value = "0")]
        tx: u64,

        /// Total dwell time
        #[arg(long)]
        total: u64,

        /// Sample noise floor (dBm)
        #[arg(long, allow_hyphen_values = true)]
        nf: i8,

        /// Lowest noise floor of the sweep (dBm); defaults to --nf
        #[arg(long, allow_hyphen_values = true)]
        min_nf: Option<i8>,
    },
}

fn main() {
    let cli = Cli::parse();
    commands::init_logging(cli.verbose);

    let code = match cli.command {
        Commands::Simulate {
            scenario,
            config,
            rounds,
            dwell_ms,
            seed,
            output,
        } => commands::simulate::run(commands::simulate::SimulateCommandConfig {
            scenario_path: &scenario,
            config_path: config.as_deref(),
            rounds,
            dwell_ms,
            seed,
            output_path: output.as_deref(),
        }),
        Commands::Plan { band } => commands::plan::run(&band),
        Commands::Score {
            busy,
            tx,
            total,
            nf,
            min_nf,
        } => commands::score::run(busy, tx, total, nf, min_nf),
    };

    std::process::exit(code);
}
