//! Error types for channel selection sweeps and configuration loading.
//!
//! Every [`AcsError`] is terminal for the sweep that produced it. The
//! orchestrator releases all survey samples before reporting one, so the
//! interface context is always reusable afterwards.

use std::path::PathBuf;

use thiserror::Error;

/// Why a sweep ended without a usable channel.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AcsError {
    /// A required capability or internal invariant did not hold.
    #[error("precondition unmet: {0}")]
    PreconditionUnmet(String),

    /// The driver refused an off-channel, kick-off scan or survey request.
    #[error("driver request failed: {0}")]
    DriverRequestFailed(#[from] DriverError),

    /// The hardware cancelled an outstanding off-channel request.
    #[error("off-channel request on {freq} MHz was cancelled (status {status})")]
    Cancelled { freq: u32, status: i32 },

    /// The sweep finished without a single channel producing a sample.
    #[error("unable to collect any useful survey data")]
    NoUsableData,

    /// Samples exist but no channel qualified for selection.
    #[error("survey data was collected but no ideal channel could be computed")]
    NoIdealChannel,

    /// The daemon rejected the channel it was handed.
    #[error("channel {chan} was selected but the interface rejected it ({status})")]
    UpstreamRejected { chan: u8, status: ChannelStatusLabel },

    /// `start` was called while a sweep was still running.
    #[error("a channel survey sweep is already in progress")]
    SweepInProgress,
}

/// Printable form of a non-valid upstream verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelStatusLabel {
    Invalid,
    InProgress,
}

impl std::fmt::Display for ChannelStatusLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invalid => write!(f, "invalid"),
            Self::InProgress => write!(f, "still in progress"),
        }
    }
}

/// A request the driver did not accept.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DriverError {
    #[error("initial scan request rejected: {0}")]
    KickoffScan(String),

    #[error("request to go off-channel on {freq} MHz rejected: {reason}")]
    OffChannel { freq: u32, reason: String },

    #[error("off-channel notification on {freq} MHz reported status {status}")]
    OffChannelStatus { freq: u32, status: i32 },

    #[error("failed to get survey data for {freq} MHz: {reason}")]
    Survey { freq: u32, reason: String },
}

/// Errors raised while loading configuration or scenario files.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
