pub mod plan;
pub mod score;
pub mod simulate;

use acsurvey_core::Band;

/// Install env_logger. `RUST_LOG` wins over the `-v` count.
pub fn init_logging(verbose: u8) {
    let default_filter = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

/// Parse a band name into the enum.
pub fn parse_band(s: &str) -> Band {
    match s {
        "5g" | "5" | "5ghz" => Band::Ghz5,
        "2g" | "2" | "2.4" | "2.4ghz" => Band::Ghz2,
        _ => {
            eprintln!("Unknown band '{s}', using 2g");
            Band::Ghz2
        }
    }
}
