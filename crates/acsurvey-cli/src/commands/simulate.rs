//! `acsurvey simulate`: run a complete sweep against a scenario file.

use std::path::Path;

use acsurvey_core::{
    AcsConfig, AcsError, ChannelStatus, InterfaceContext, Orchestrator, Scenario, SelectionHooks,
    SweepOutcome, load_json,
};
use log::{info, warn};
use serde::Serialize;
use uuid::Uuid;

pub struct SimulateCommandConfig<'a> {
    pub scenario_path: &'a str,
    pub config_path: Option<&'a str>,
    pub rounds: Option<u32>,
    pub dwell_ms: Option<u32>,
    pub seed: u64,
    pub output_path: Option<&'a str>,
}

/// Per-channel survey summary captured before the sweep cleans up.
#[derive(Debug, Clone, Serialize)]
struct ChannelReport {
    chan: u8,
    freq: u32,
    disabled: bool,
    samples: u32,
    min_nf: Option<i8>,
    interference_factor: Option<f64>,
}

#[derive(Debug, Serialize)]
struct SweepReport {
    id: String,
    acsurvey_version: String,
    scenario: String,
    seed: u64,
    config: AcsConfig,
    selected_channel: Option<u8>,
    selected_freq: Option<u32>,
    error: Option<String>,
    channels: Vec<ChannelReport>,
}

/// Hooks that accept every selection and remember what the sweep saw.
#[derive(Default)]
struct ReportingHooks {
    channels: Vec<ChannelReport>,
}

impl SelectionHooks for ReportingHooks {
    fn selection_complete(&mut self, ctx: &InterfaceContext) -> ChannelStatus {
        self.channels = snapshot(ctx);
        ChannelStatus::Valid
    }

    fn selection_failed(&mut self, _ctx: &InterfaceContext, err: &AcsError) {
        warn!("ACS failed ({err}), the AP would fall back to its default channel");
    }
}

fn snapshot(ctx: &InterfaceContext) -> Vec<ChannelReport> {
    ctx.channels
        .iter()
        .map(|c| ChannelReport {
            chan: c.chan,
            freq: c.freq,
            disabled: c.disabled,
            samples: c.survey_count,
            min_nf: c.min_nf,
            interference_factor: c.interference_factor,
        })
        .collect()
}

/// File values, then flag overrides, validated once at the end.
fn load_config(cfg: &SimulateCommandConfig<'_>) -> Result<AcsConfig, String> {
    let mut config: AcsConfig = match cfg.config_path {
        Some(path) => load_json(Path::new(path)).map_err(|e| e.to_string())?,
        None => AcsConfig::default(),
    };
    if let Some(rounds) = cfg.rounds {
        config.num_req_surveys = rounds;
    }
    if let Some(dwell_ms) = cfg.dwell_ms {
        config.roc_duration_ms = dwell_ms;
    }
    config.validate().map_err(|e| e.to_string())?;
    Ok(config)
}

pub fn run(cfg: SimulateCommandConfig<'_>) -> i32 {
    let scenario = match Scenario::load_from_path(Path::new(cfg.scenario_path)) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {e}");
            return 2;
        }
    };
    let config = match load_config(&cfg) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            return 2;
        }
    };

    let mut ctx = scenario.interface(config);
    let mut radio = scenario.radio(cfg.seed);
    let mut orch = Orchestrator::new();
    let mut hooks = ReportingHooks::default();

    info!(
        "Simulating {} band sweep: {} rounds, {} ms dwell, seed {}",
        scenario.band, config.num_req_surveys, config.roc_duration_ms, cfg.seed
    );

    let outcome = match radio.run_sweep(&mut orch, &mut ctx, &mut hooks) {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("Error: {e}");
            return 1;
        }
    };

    let (selected, error) = match &outcome {
        SweepOutcome::Selected(s) => (Some(*s), None),
        SweepOutcome::Failed(e) => (None, Some(e.to_string())),
        SweepOutcome::InProgress => (None, Some("sweep did not finish".to_string())),
    };

    print_table(&hooks.channels, selected.map(|s| s.chan));
    match (&selected, &error) {
        (Some(s), _) => println!(
            "\nIdeal channel: {} ({} MHz), average interference factor {:.4}",
            s.chan, s.freq, s.interference_factor
        ),
        (None, Some(e)) => println!("\nChannel selection failed: {e}"),
        (None, None) => {}
    }

    if let Some(path) = cfg.output_path {
        let report = SweepReport {
            id: Uuid::new_v4().to_string(),
            acsurvey_version: acsurvey_core::VERSION.to_string(),
            scenario: cfg.scenario_path.to_string(),
            seed: cfg.seed,
            config,
            selected_channel: selected.map(|s| s.chan),
            selected_freq: selected.map(|s| s.freq),
            error,
            channels: hooks.channels,
        };
        match serde_json::to_string_pretty(&report) {
            Ok(json) => {
                if let Err(e) = std::fs::write(path, json) {
                    eprintln!("Failed to write {path}: {e}");
                    return 1;
                }
                println!("Report written to {path}");
            }
            Err(e) => {
                eprintln!("Failed to serialize report: {e}");
                return 1;
            }
        }
    }

    if selected.is_some() { 0 } else { 1 }
}

fn print_table(channels: &[ChannelReport], selected: Option<u8>) {
    if channels.is_empty() {
        return;
    }
    println!(
        "\n{:<2} {:>5} {:>7} {:>8} {:>7} {:>12}",
        "", "Chan", "Freq", "Samples", "Min NF", "Interference"
    );
    println!("{}", "-".repeat(48));
    for c in channels {
        let mark = if Some(c.chan) == selected { "*" } else { " " };
        let nf = c.min_nf.map_or("-".to_string(), |nf| nf.to_string());
        let factor = match (c.disabled, c.interference_factor) {
            (true, _) => "disabled".to_string(),
            (false, Some(f)) => format!("{f:.4}"),
            (false, None) => "-".to_string(),
        };
        println!(
            "{:<2} {:>5} {:>7} {:>8} {:>7} {:>12}",
            mark, c.chan, c.freq, c.samples, nf, factor
        );
    }
}
