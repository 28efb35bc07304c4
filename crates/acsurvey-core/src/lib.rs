//! # acsurvey-core
//!
//! Survey-based automatic channel selection (ACS) for wireless access points.
//!
//! When an AP is configured for automatic channel selection, its radio leaves
//! the operating channel to dwell briefly on every enabled channel, reads the
//! driver's survey counters (busy, transmit and total time plus noise floor),
//! and repeats that for a configured number of rounds. Each sample becomes an
//! interference factor; the channel with the lowest mean factor wins.
//!
//! ## Architecture
//!
//! Sample store → Interference scoring → Selector, driven by the Orchestrator.
//!
//! - [`survey`]: per-channel sample storage and cleanup.
//! - [`interference`]: per-sample factor, per-channel mean, ideal channel.
//! - [`orchestrator`]: the sweep state machine. It consumes [`Event`]s and
//!   returns [`Action`]s; it never calls the hardware itself.
//! - [`driver`]: the [`RadioDriver`] / [`SelectionHooks`] seams and the
//!   [`dispatch`] loop that executes actions against them.
//! - [`sim`]: a seeded, profile-driven [`SimulatedRadio`].
//!
//! ## Quick Start
//!
//! ```no_run
//! use acsurvey_core::{
//!     AcsConfig, AcsError, ChannelPlan, ChannelStatus, DriverCapabilities, InterfaceContext,
//!     Orchestrator, SelectionHooks, SimulatedRadio, TrafficProfile,
//! };
//!
//! struct Daemon;
//!
//! impl SelectionHooks for Daemon {
//!     fn selection_complete(&mut self, _ctx: &InterfaceContext) -> ChannelStatus {
//!         ChannelStatus::Valid
//!     }
//!     fn selection_failed(&mut self, _ctx: &InterfaceContext, err: &AcsError) {
//!         eprintln!("falling back to default channel: {err}");
//!     }
//! }
//!
//! let mut ctx = InterfaceContext::new(
//!     ChannelPlan::band_2ghz().channels,
//!     DriverCapabilities { offchannel_tx: true },
//!     AcsConfig::default(),
//! );
//! let mut radio = SimulatedRadio::new(1, TrafficProfile::default());
//! let mut orch = Orchestrator::new();
//! let outcome = radio.run_sweep(&mut orch, &mut ctx, &mut Daemon).unwrap();
//! println!("{outcome:?}, operating channel {:?}", ctx.configured_channel);
//! ```

pub mod channel;
pub mod config;
pub mod driver;
pub mod error;
pub mod interference;
pub mod orchestrator;
pub mod plan;
pub mod sim;
pub mod survey;

pub use channel::{Channel, DriverCapabilities, InterfaceContext, SurveySample};
pub use config::{AcsConfig, DEFAULT_NUM_REQ_SURVEYS, DEFAULT_ROC_DURATION_MS, load_json};
pub use driver::{RadioDriver, SelectionHooks, dispatch, start_sweep};
pub use error::{AcsError, ChannelStatusLabel, ConfigError, ConfigResult, DriverError};
pub use interference::{
    IDLE_FACTOR_FLOOR, chan_interference_factor, select_ideal, survey_interference_factor,
};
pub use orchestrator::{
    Action, ChannelStatus, Event, Orchestrator, SelectedChannel, SweepOutcome, SweepState,
};
pub use plan::{Band, ChannelPlan, chan_to_freq};
pub use sim::{Scenario, SimulatedRadio, TrafficProfile};
pub use survey::{add_sample, clear_all, clear_channel};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
