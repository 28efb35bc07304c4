//! Simulated radio for running sweeps without hardware.
//!
//! Each frequency gets a [`TrafficProfile`]; surveys are drawn from it with a
//! seeded RNG so runs are reproducible. Notifications that real hardware
//! would deliver later are queued and handed out by [`SimulatedRadio::next_event`].

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::path::Path;

use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::channel::{DriverCapabilities, InterfaceContext, SurveySample};
use crate::config::{AcsConfig, load_json};
use crate::driver::{RadioDriver, SelectionHooks, dispatch, start_sweep};
use crate::error::{AcsError, ConfigError, ConfigResult, DriverError};
use crate::orchestrator::{Event, Orchestrator, SweepOutcome};
use crate::plan::{Band, ChannelPlan, chan_to_freq};

/// Status reported when the simulated hardware cancels an off-channel period.
pub const ECANCELED: i32 = -125;

/// Traffic conditions on one simulated channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrafficProfile {
    /// Fraction of the dwell the channel is sensed busy.
    pub busy_fraction: f64,
    /// Fraction of the dwell spent on our own transmissions.
    #[serde(default)]
    pub tx_fraction: f64,
    /// Mean noise floor in dBm.
    pub noise_floor: i8,
    /// Maximum +/- deviation of the noise floor per sample, in dB.
    #[serde(default)]
    pub noise_jitter: u8,
    /// Maximum +/- deviation of `busy_fraction` per sample.
    #[serde(default)]
    pub busy_jitter: f64,
}

impl TrafficProfile {
    /// Reject fractions that are not finite or fall outside `[0, 1]`.
    pub fn validate(&self) -> ConfigResult<()> {
        let fractions = [
            ("busy_fraction", self.busy_fraction),
            ("tx_fraction", self.tx_fraction),
            ("busy_jitter", self.busy_jitter),
        ];
        for (name, value) in fractions {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for TrafficProfile {
    fn default() -> Self {
        Self {
            busy_fraction: 0.3,
            tx_fraction: 0.0,
            noise_floor: -95,
            noise_jitter: 1,
            busy_jitter: 0.05,
        }
    }
}

/// Description of a simulated environment, loadable from JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub band: Band,
    /// Channel numbers to mark disabled.
    #[serde(default)]
    pub disabled: Vec<u8>,
    /// Profile for channels not listed in `channels`.
    #[serde(default)]
    pub default_profile: TrafficProfile,
    /// Per-channel-number profiles.
    #[serde(default)]
    pub channels: BTreeMap<u8, TrafficProfile>,
    #[serde(default = "default_offchannel_tx")]
    pub offchannel_tx: bool,
}

fn default_offchannel_tx() -> bool {
    true
}

impl Scenario {
    pub fn load_from_path(path: &Path) -> ConfigResult<Self> {
        let scenario: Self = load_json(path)?;
        scenario.default_profile.validate()?;
        for (chan, profile) in &scenario.channels {
            if let Err(ConfigError::Invalid(msg)) = profile.validate() {
                return Err(ConfigError::Invalid(format!("channel {chan}: {msg}")));
            }
        }
        for chan in scenario.channels.keys().chain(&scenario.disabled) {
            if chan_to_freq(scenario.band, *chan).is_none() {
                return Err(ConfigError::Invalid(format!(
                    "channel {chan} is not part of the {} band",
                    scenario.band
                )));
            }
        }
        Ok(scenario)
    }

    pub fn channel_plan(&self) -> ChannelPlan {
        ChannelPlan::for_band(self.band).disable(&self.disabled)
    }

    /// Interface context for this scenario's channel plan.
    pub fn interface(&self, config: AcsConfig) -> InterfaceContext {
        InterfaceContext::new(
            self.channel_plan().channels,
            DriverCapabilities {
                offchannel_tx: self.offchannel_tx,
            },
            config,
        )
    }

    pub fn radio(&self, seed: u64) -> SimulatedRadio {
        let mut radio = SimulatedRadio::new(seed, self.default_profile);
        radio.capabilities.offchannel_tx = self.offchannel_tx;
        for (&chan, profile) in &self.channels {
            if let Some(freq) = chan_to_freq(self.band, chan) {
                radio.set_profile(freq, *profile);
            }
        }
        radio
    }
}

/// A [`RadioDriver`] backed by traffic profiles and a seeded RNG.
pub struct SimulatedRadio {
    capabilities: DriverCapabilities,
    profiles: HashMap<u32, TrafficProfile>,
    default_profile: TrafficProfile,
    rng: StdRng,
    pending: VecDeque<Event>,
    dwell: HashMap<u32, u32>,
    reject_kickoff: bool,
    reject_off_channel: HashSet<u32>,
    reject_survey: HashSet<u32>,
    cancel_off_channel: HashSet<u32>,
    off_channel_log: Vec<u32>,
}

impl SimulatedRadio {
    pub fn new(seed: u64, default_profile: TrafficProfile) -> Self {
        Self {
            capabilities: DriverCapabilities {
                offchannel_tx: true,
            },
            profiles: HashMap::new(),
            default_profile,
            rng: StdRng::seed_from_u64(seed),
            pending: VecDeque::new(),
            dwell: HashMap::new(),
            reject_kickoff: false,
            reject_off_channel: HashSet::new(),
            reject_survey: HashSet::new(),
            cancel_off_channel: HashSet::new(),
            off_channel_log: Vec::new(),
        }
    }

    pub fn set_profile(&mut self, freq: u32, profile: TrafficProfile) {
        self.profiles.insert(freq, profile);
    }

    pub fn set_offchannel_tx(&mut self, supported: bool) {
        self.capabilities.offchannel_tx = supported;
    }

    pub fn reject_kickoff(&mut self) {
        self.reject_kickoff = true;
    }

    /// Refuse off-channel requests for `freq`.
    pub fn reject_off_channel(&mut self, freq: u32) {
        self.reject_off_channel.insert(freq);
    }

    /// Refuse survey reads for `freq`.
    pub fn reject_survey(&mut self, freq: u32) {
        self.reject_survey.insert(freq);
    }

    /// Have the hardware cancel the off-channel period on `freq`.
    pub fn cancel_off_channel(&mut self, freq: u32) {
        self.cancel_off_channel.insert(freq);
    }

    /// Frequencies the radio was asked to visit, in order.
    pub fn off_channel_log(&self) -> &[u32] {
        &self.off_channel_log
    }

    /// Next queued hardware notification.
    pub fn next_event(&mut self) -> Option<Event> {
        self.pending.pop_front()
    }

    /// Start a sweep and pump notifications until none are left.
    pub fn run_sweep<H: SelectionHooks + ?Sized>(
        &mut self,
        orch: &mut Orchestrator,
        ctx: &mut InterfaceContext,
        hooks: &mut H,
    ) -> Result<SweepOutcome, AcsError> {
        let mut outcome = start_sweep(orch, ctx, self, hooks)?;
        while let Some(event) = self.next_event() {
            outcome = dispatch(orch, ctx, self, hooks, event);
        }
        Ok(outcome)
    }

    fn sample(&mut self, freq: u32, duration_ms: u32) -> SurveySample {
        let profile = self.profiles.get(&freq).copied().unwrap_or(self.default_profile);
        let channel_time = u64::from(duration_ms.max(1)) * 1000;

        let mut busy_fraction = profile.busy_fraction;
        if profile.busy_jitter.is_finite() && profile.busy_jitter > 0.0 {
            let j = profile.busy_jitter.min(1.0);
            busy_fraction += self.rng.random_range(-j..=j);
        }
        let tx_fraction = profile.tx_fraction.clamp(0.0, 1.0);
        let busy_fraction = busy_fraction.clamp(tx_fraction, 1.0);

        let mut nf = i16::from(profile.noise_floor);
        if profile.noise_jitter > 0 {
            let j = i16::from(profile.noise_jitter);
            nf += self.rng.random_range(-j..=j);
        }

        let channel_time_busy = (channel_time as f64 * busy_fraction).round() as u64;
        let channel_time_tx =
            ((channel_time as f64 * tx_fraction).round() as u64).min(channel_time_busy);

        SurveySample::new(
            channel_time,
            channel_time_busy,
            channel_time_tx,
            nf.clamp(i16::from(i8::MIN), i16::from(i8::MAX)) as i8,
        )
    }
}

impl RadioDriver for SimulatedRadio {
    fn capabilities(&self) -> DriverCapabilities {
        self.capabilities
    }

    fn request_kickoff_scan(&mut self) -> Result<(), DriverError> {
        if self.reject_kickoff {
            return Err(DriverError::KickoffScan("simulated rejection".to_string()));
        }
        self.pending.push_back(Event::KickoffScanComplete);
        Ok(())
    }

    fn request_off_channel(&mut self, freq: u32, duration_ms: u32) -> Result<(), DriverError> {
        if self.reject_off_channel.contains(&freq) {
            return Err(DriverError::OffChannel {
                freq,
                reason: "simulated rejection".to_string(),
            });
        }
        self.off_channel_log.push(freq);
        self.dwell.insert(freq, duration_ms);

        let status = if self.cancel_off_channel.contains(&freq) {
            ECANCELED
        } else {
            0
        };
        self.pending.push_back(Event::OffChannelReady {
            freq,
            duration: duration_ms,
            status: 0,
        });
        self.pending.push_back(Event::OffChannelCancelled {
            freq,
            duration: duration_ms,
            status,
        });
        Ok(())
    }

    fn request_traffic_scan(&mut self, freq: u32) -> Result<Vec<SurveySample>, DriverError> {
        if self.reject_survey.contains(&freq) {
            return Err(DriverError::Survey {
                freq,
                reason: "simulated rejection".to_string(),
            });
        }
        let duration_ms = self.dwell.get(&freq).copied().unwrap_or(1);
        let sample = self.sample(freq, duration_ms);
        debug!(
            "sim: {freq} MHz total={} busy={} tx={} nf={}",
            sample.channel_time, sample.channel_time_busy, sample.channel_time_tx, sample.nf
        );
        Ok(vec![sample])
    }
}
