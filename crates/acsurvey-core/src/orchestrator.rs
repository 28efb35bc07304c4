//! Survey orchestration state machine.
//!
//! The orchestrator never talks to hardware. Each entry point consumes one
//! event, mutates the [`InterfaceContext`] it is handed, and returns the
//! [`Action`]s the caller must perform (see [`crate::driver::dispatch`]).
//! Results of those actions come back in as further events, so every
//! suspension point is explicit:
//!
//! ```text
//! Idle --start--> KickoffScan --scan done--> Scanning(i) --dwell over--> Surveying(i)
//!                                               ^                            |
//!                                               +------ next channel --------+
//!                                                                            |
//!                          RoundComplete <---- past last channel ------------+
//!                            |   |
//!          more rounds ------+   +-- select --> AwaitingUpstream --valid--> Done
//! ```
//!
//! Any request failure, cancellation or empty result leads to `Failed`. Both
//! `Done` and `Failed` release every stored sample on entry.

use log::{debug, error, info, trace, warn};

use crate::channel::{InterfaceContext, SurveySample};
use crate::error::{AcsError, ChannelStatusLabel, DriverError};
use crate::interference::select_ideal;
use crate::survey::{add_sample, clear_all};

/// Verdict returned by the daemon's "selection complete" hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelStatus {
    /// The interface accepted the channel and finished bring-up.
    Valid,
    /// The interface could not use the channel.
    Invalid,
    /// The interface has more work pending; treated as a rejection here.
    InProgress,
}

/// The channel a finished sweep settled on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectedChannel {
    pub chan: u8,
    pub freq: u32,
    /// Mean interference factor at the time of selection.
    pub interference_factor: f64,
}

/// Where the orchestrator currently is in a sweep.
#[derive(Debug, Clone, PartialEq)]
pub enum SweepState {
    Idle,
    /// Waiting for the initial kick-off scan to complete.
    KickoffScan,
    /// An off-channel request is outstanding for `channels[idx]`.
    Scanning { idx: usize, freq: u32 },
    /// A traffic survey was requested for `channels[idx]`.
    Surveying { idx: usize, freq: u32 },
    /// Every channel of the current round has been visited.
    RoundComplete,
    /// The chosen channel was handed upstream; waiting for its verdict.
    AwaitingUpstream(SelectedChannel),
    Done(SelectedChannel),
    Failed(AcsError),
}

impl SweepState {
    /// True while a sweep owns the interface context.
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Idle | Self::Done(_) | Self::Failed(_))
    }
}

/// Asynchronous inputs to the state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// The kick-off scan finished.
    KickoffScanComplete,
    /// The radio arrived on the requested channel (or failed to).
    OffChannelReady { freq: u32, duration: u32, status: i32 },
    /// The off-channel period ended. Zero status means the dwell completed.
    OffChannelCancelled { freq: u32, duration: u32, status: i32 },
    /// Survey counters gathered for `freq`.
    SurveyCollected { freq: u32, samples: Vec<SurveySample> },
    /// The driver refused a request the orchestrator asked for.
    RequestFailed(DriverError),
    /// Return value of the "selection complete" hook.
    SelectionVerdict(ChannelStatus),
}

/// Side effects the caller performs on behalf of the orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    RequestKickoffScan,
    RequestOffChannel { freq: u32, duration_ms: u32 },
    RequestTrafficScan { freq: u32 },
    /// Invoke the "selection complete" hook and feed back its verdict.
    ReportSelected(SelectedChannel),
    /// Invoke the "selection failed" hook.
    ReportFailed(AcsError),
}

/// Externally visible result of a sweep.
#[derive(Debug, Clone, PartialEq)]
pub enum SweepOutcome {
    InProgress,
    Selected(SelectedChannel),
    Failed(AcsError),
}

/// Drives one automatic channel selection sweep at a time.
#[derive(Debug)]
pub struct Orchestrator {
    state: SweepState,
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl Orchestrator {
    pub fn new() -> Self {
        Self {
            state: SweepState::Idle,
        }
    }

    pub fn state(&self) -> &SweepState {
        &self.state
    }

    /// Result so far, or `None` if no sweep was ever started.
    pub fn outcome(&self) -> Option<SweepOutcome> {
        match &self.state {
            SweepState::Idle => None,
            SweepState::Done(selected) => Some(SweepOutcome::Selected(*selected)),
            SweepState::Failed(err) => Some(SweepOutcome::Failed(err.clone())),
            _ => Some(SweepOutcome::InProgress),
        }
    }

    /// Forget a finished sweep. Has no effect while one is running.
    pub fn reset(&mut self) {
        if !self.state.is_active() {
            self.state = SweepState::Idle;
        }
    }

    /// Begin a sweep.
    ///
    /// Rejected with [`AcsError::SweepInProgress`] while another sweep runs;
    /// the running sweep is left alone in that case. Precondition failures
    /// are reported through the regular failure path.
    pub fn start(&mut self, ctx: &mut InterfaceContext) -> Result<Vec<Action>, AcsError> {
        if self.state.is_active() {
            warn!("ACS: ignoring start request, a sweep is already running");
            return Err(AcsError::SweepInProgress);
        }

        info!("ACS: automatic channel selection started, this may take a bit");

        if ctx.chans_surveyed != 0 {
            return Ok(self.fail(
                ctx,
                AcsError::PreconditionUnmet(
                    "survey data from a previous sweep is still present".to_string(),
                ),
            ));
        }
        if !ctx.capabilities.offchannel_tx {
            return Ok(self.fail(
                ctx,
                AcsError::PreconditionUnmet("offchannel TX support required".to_string()),
            ));
        }

        clear_all(ctx);
        debug!("ACS: initial scan just to kick off the hw a bit...");
        self.state = SweepState::KickoffScan;
        Ok(vec![Action::RequestKickoffScan])
    }

    /// Feed one event into the state machine.
    pub fn handle(&mut self, ctx: &mut InterfaceContext, event: Event) -> Vec<Action> {
        if !self.state.is_active() {
            debug!("ACS: no sweep running, ignoring {event:?}");
            return Vec::new();
        }

        match event {
            Event::KickoffScanComplete => self.on_kickoff_scan_complete(ctx),
            Event::OffChannelReady {
                freq,
                duration,
                status,
            } => self.on_off_channel_ready(ctx, freq, duration, status),
            Event::OffChannelCancelled {
                freq,
                duration,
                status,
            } => self.on_off_channel_cancelled(ctx, freq, duration, status),
            Event::SurveyCollected { freq, samples } => {
                self.on_survey_collected(ctx, freq, samples)
            }
            Event::RequestFailed(err) => self.on_driver_request_failed(ctx, err),
            Event::SelectionVerdict(status) => self.on_selection_verdict(ctx, status),
        }
    }

    fn on_kickoff_scan_complete(&mut self, ctx: &mut InterfaceContext) -> Vec<Action> {
        if self.state != SweepState::KickoffScan {
            warn!("ACS: unexpected kick-off scan completion in {:?}", self.state);
            return Vec::new();
        }

        debug!(
            "ACS: using survey based algorithm (acs_num_req_surveys={} acs_roc_duration_ms={})",
            ctx.config.num_req_surveys, ctx.config.roc_duration_ms
        );
        clear_all(ctx);

        let mut actions = self.advance_to_next_channel(ctx);
        if self.state == SweepState::RoundComplete {
            // Nothing to survey at all.
            actions.extend(self.fail(ctx, AcsError::NoUsableData));
        }
        actions
    }

    /// The radio reached the requested channel. Only a failure status matters.
    pub fn on_off_channel_ready(
        &mut self,
        ctx: &mut InterfaceContext,
        freq: u32,
        duration: u32,
        status: i32,
    ) -> Vec<Action> {
        if status != 0 {
            return self.on_driver_request_failed(
                ctx,
                DriverError::OffChannelStatus { freq, status },
            );
        }
        match self.state {
            SweepState::Scanning { freq: want, .. } if want == freq => {
                trace!("ACS: offchannel on freq {freq} MHz for {duration} ms");
            }
            _ => warn!("ACS: stale off-channel ready on {freq} MHz in {:?}", self.state),
        }
        Vec::new()
    }

    /// The off-channel period ended, either because the dwell elapsed
    /// (`status == 0`) or because the hardware cancelled it.
    pub fn on_off_channel_cancelled(
        &mut self,
        ctx: &mut InterfaceContext,
        freq: u32,
        duration: u32,
        status: i32,
    ) -> Vec<Action> {
        if !self.state.is_active() {
            return Vec::new();
        }
        if status != 0 {
            return self.fail(ctx, AcsError::Cancelled { freq, status });
        }

        match self.state {
            SweepState::Scanning { idx, freq: want } if want == freq => {
                trace!("ACS: dwell of {duration} ms on {freq} MHz done, requesting survey");
                self.state = SweepState::Surveying { idx, freq };
                vec![Action::RequestTrafficScan { freq }]
            }
            _ => {
                warn!("ACS: stale off-channel completion on {freq} MHz in {:?}", self.state);
                Vec::new()
            }
        }
    }

    fn on_survey_collected(
        &mut self,
        ctx: &mut InterfaceContext,
        freq: u32,
        samples: Vec<SurveySample>,
    ) -> Vec<Action> {
        let SweepState::Surveying { idx, freq: want } = self.state else {
            warn!("ACS: unexpected survey data for {freq} MHz in {:?}", self.state);
            return Vec::new();
        };
        if want != freq {
            warn!("ACS: survey data for {freq} MHz while surveying {want} MHz, ignoring");
            return Vec::new();
        }

        if samples.is_empty() {
            debug!("ACS: no survey data reported for {freq} MHz");
        }
        for sample in samples {
            add_sample(ctx, idx, sample);
        }

        trace!("ACS: going to next channel...");
        ctx.off_channel_idx = idx + 1;

        let mut actions = self.advance_to_next_channel(ctx);
        if self.state == SweepState::RoundComplete {
            actions.extend(self.on_round_complete(ctx));
        }
        actions
    }

    /// Request the next enabled channel at or after `ctx.off_channel_idx`.
    ///
    /// Moves to `Scanning` when one is found and to `RoundComplete` once the
    /// index runs past the last channel. An index beyond the channel count
    /// fails the sweep. Does nothing unless a sweep is running.
    pub fn advance_to_next_channel(&mut self, ctx: &mut InterfaceContext) -> Vec<Action> {
        if !self.state.is_active() {
            warn!("ACS: no sweep running, not advancing to the next channel");
            return Vec::new();
        }
        let num_channels = ctx.num_channels();
        if ctx.off_channel_idx > num_channels {
            return self.fail(
                ctx,
                AcsError::PreconditionUnmet("channel index out of bounds".to_string()),
            );
        }

        let next = ctx.channels[ctx.off_channel_idx..]
            .iter()
            .position(|c| !c.disabled)
            .map(|offset| ctx.off_channel_idx + offset);

        match next {
            Some(idx) => {
                let freq = ctx.channels[idx].freq;
                ctx.off_channel_idx = idx;
                self.state = SweepState::Scanning { idx, freq };
                vec![Action::RequestOffChannel {
                    freq,
                    duration_ms: ctx.config.roc_duration_ms,
                }]
            }
            None => {
                ctx.off_channel_idx = num_channels;
                self.state = SweepState::RoundComplete;
                Vec::new()
            }
        }
    }

    /// Close a round: start another one or pick the ideal channel.
    ///
    /// Only acts in [`SweepState::RoundComplete`].
    pub fn on_round_complete(&mut self, ctx: &mut InterfaceContext) -> Vec<Action> {
        if self.state != SweepState::RoundComplete {
            warn!("ACS: round completion in {:?}, ignoring", self.state);
            return Vec::new();
        }
        ctx.completed_rounds += 1;
        let target = ctx.config.num_req_surveys.max(1);

        if ctx.completed_rounds < target {
            debug!(
                "ACS: round {}/{} complete, starting another",
                ctx.completed_rounds, target
            );
            ctx.off_channel_idx = 0;
            let actions = self.advance_to_next_channel(ctx);
            if self.state == SweepState::RoundComplete {
                return self.fail(
                    ctx,
                    AcsError::PreconditionUnmet("no enabled channel left to survey".to_string()),
                );
            }
            return actions;
        }

        if ctx.chans_surveyed == 0 {
            return self.fail(ctx, AcsError::NoUsableData);
        }

        let Some(idx) = select_ideal(ctx) else {
            return self.fail(ctx, AcsError::NoIdealChannel);
        };

        let chan = &ctx.channels[idx];
        let selected = SelectedChannel {
            chan: chan.chan,
            freq: chan.freq,
            interference_factor: chan.interference_factor.unwrap_or_default(),
        };
        debug!("-------------------------------------------------------------------------");
        info!(
            "ACS: Ideal chan: {} ({} MHz) Average interference factor: {:.6}",
            selected.chan, selected.freq, selected.interference_factor
        );
        debug!("-------------------------------------------------------------------------");

        ctx.configured_channel = Some(selected.chan);
        self.state = SweepState::AwaitingUpstream(selected);
        vec![Action::ReportSelected(selected)]
    }

    /// A request submission was rejected by the driver.
    pub fn on_driver_request_failed(
        &mut self,
        ctx: &mut InterfaceContext,
        err: DriverError,
    ) -> Vec<Action> {
        if !self.state.is_active() {
            return Vec::new();
        }
        self.fail(ctx, AcsError::DriverRequestFailed(err))
    }

    fn on_selection_verdict(
        &mut self,
        ctx: &mut InterfaceContext,
        status: ChannelStatus,
    ) -> Vec<Action> {
        let SweepState::AwaitingUpstream(selected) = self.state else {
            warn!("ACS: unexpected selection verdict {status:?} in {:?}", self.state);
            return Vec::new();
        };

        let label = match status {
            ChannelStatus::Valid => {
                finish_sweep(ctx, "channel selection complete");
                self.state = SweepState::Done(selected);
                return Vec::new();
            }
            ChannelStatus::Invalid => ChannelStatusLabel::Invalid,
            ChannelStatus::InProgress => ChannelStatusLabel::InProgress,
        };
        self.fail(
            ctx,
            AcsError::UpstreamRejected {
                chan: selected.chan,
                status: label,
            },
        )
    }

    fn fail(&mut self, ctx: &mut InterfaceContext, err: AcsError) -> Vec<Action> {
        error!("ACS: {err}");
        finish_sweep(ctx, "sweep aborted");
        self.state = SweepState::Failed(err.clone());
        vec![Action::ReportFailed(err)]
    }
}

/// Common exit path for successful and failed sweeps.
fn finish_sweep(ctx: &mut InterfaceContext, reason: &str) {
    debug!("ACS: {reason}, releasing survey data");
    clear_all(ctx);
}
