//! Interface, channel and survey sample data model.
//!
//! An [`InterfaceContext`] is the single-writer state of one AP radio while it
//! is being configured. The channel list is created once from a band plan;
//! the sweep only touches per-channel survey state and the interface-wide
//! counters, and cleanup returns all of those to their initial values.

use serde::{Deserialize, Serialize};

use crate::config::AcsConfig;

/// One survey measurement taken while dwelling on a channel.
///
/// All times share one unit (the driver's, normally milliseconds). A
/// well-formed sample has `channel_time >= channel_time_busy >= channel_time_tx`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurveySample {
    /// Time the radio spent on the channel.
    pub channel_time: u64,
    /// Time the channel was sensed busy (our own tx included).
    pub channel_time_busy: u64,
    /// Time spent transmitting ourselves.
    pub channel_time_tx: u64,
    /// Noise floor reading in dBm.
    pub nf: i8,
}

impl SurveySample {
    pub fn new(channel_time: u64, channel_time_busy: u64, channel_time_tx: u64, nf: i8) -> Self {
        Self {
            channel_time,
            channel_time_busy,
            channel_time_tx,
            nf,
        }
    }
}

/// One RF channel the radio can operate on.
#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    /// IEEE channel number.
    pub chan: u8,
    /// Center frequency in MHz.
    pub freq: u32,
    /// Regulatory or driver-disabled channels are never surveyed.
    pub disabled: bool,
    /// Lowest noise floor seen on this channel during the current sweep.
    pub min_nf: Option<i8>,
    /// Number of samples accumulated during the current sweep.
    pub survey_count: u32,
    /// Samples in arrival order.
    pub samples: Vec<SurveySample>,
    /// Mean interference factor from the last selection pass.
    pub interference_factor: Option<f64>,
}

impl Channel {
    pub fn new(chan: u8, freq: u32) -> Self {
        Self {
            chan,
            freq,
            disabled: false,
            min_nf: None,
            survey_count: 0,
            samples: Vec::new(),
            interference_factor: None,
        }
    }

    /// Builder-style toggle for the disabled flag.
    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// A channel takes part in selection only when it is enabled and has data.
    pub fn is_usable(&self) -> bool {
        self.survey_count > 0 && !self.samples.is_empty() && !self.disabled
    }
}

/// Capabilities the driver advertises for this interface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverCapabilities {
    /// The driver can leave the operating channel and come back.
    pub offchannel_tx: bool,
}

/// The AP radio instance under configuration.
#[derive(Debug, Clone)]
pub struct InterfaceContext {
    /// Channels of the current hardware mode, in ascending order.
    pub channels: Vec<Channel>,
    pub capabilities: DriverCapabilities,
    pub config: AcsConfig,
    /// Lowest noise floor across every channel measured this sweep.
    pub lowest_nf: Option<i8>,
    /// Position in `channels` of the channel currently being measured.
    pub off_channel_idx: usize,
    /// Full rounds finished in the current sweep.
    pub completed_rounds: u32,
    /// Channels that produced at least one sample.
    pub chans_surveyed: usize,
    /// Operating channel written back once a sweep succeeds.
    pub configured_channel: Option<u8>,
}

impl InterfaceContext {
    pub fn new(
        channels: Vec<Channel>,
        capabilities: DriverCapabilities,
        config: AcsConfig,
    ) -> Self {
        Self {
            channels,
            capabilities,
            config,
            lowest_nf: None,
            off_channel_idx: 0,
            completed_rounds: 0,
            chans_surveyed: 0,
            configured_channel: None,
        }
    }

    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// Index of the channel with the given center frequency.
    pub fn channel_index(&self, freq: u32) -> Option<usize> {
        self.channels.iter().position(|c| c.freq == freq)
    }

    /// True when no channel holds samples and all sweep counters are reset.
    pub fn is_clean(&self) -> bool {
        self.lowest_nf.is_none()
            && self.off_channel_idx == 0
            && self.completed_rounds == 0
            && self.chans_surveyed == 0
            && self.channels.iter().all(|c| {
                c.samples.is_empty()
                    && c.survey_count == 0
                    && c.min_nf.is_none()
                    && c.interference_factor.is_none()
            })
    }
}
