//! Driver and daemon seams, and the loop that executes orchestrator actions.
//!
//! A [`RadioDriver`] accepts requests and answers asynchronously: off-channel
//! and kick-off scan completions arrive later as [`Event`]s that the daemon
//! passes to [`dispatch`]. Traffic surveys are acknowledged synchronously
//! with the counters the driver read.

use std::collections::VecDeque;

use log::trace;

use crate::channel::{DriverCapabilities, InterfaceContext, SurveySample};
use crate::error::{AcsError, DriverError};
use crate::orchestrator::{Action, ChannelStatus, Event, Orchestrator, SweepOutcome};

/// Hardware side of the survey.
pub trait RadioDriver {
    /// Capabilities advertised for this interface.
    fn capabilities(&self) -> DriverCapabilities;

    /// Request a scan to wake the hardware up. Completion arrives as
    /// [`Event::KickoffScanComplete`].
    fn request_kickoff_scan(&mut self) -> Result<(), DriverError>;

    /// Request to leave the operating channel for `duration_ms`. Progress
    /// arrives as [`Event::OffChannelReady`] then [`Event::OffChannelCancelled`].
    fn request_off_channel(&mut self, freq: u32, duration_ms: u32) -> Result<(), DriverError>;

    /// Read the survey counters for `freq`.
    fn request_traffic_scan(&mut self, freq: u32) -> Result<Vec<SurveySample>, DriverError>;
}

/// Daemon side of the survey.
pub trait SelectionHooks {
    /// Called once `ctx.configured_channel` holds the chosen channel.
    /// Only [`ChannelStatus::Valid`] counts as success.
    fn selection_complete(&mut self, ctx: &InterfaceContext) -> ChannelStatus;

    /// Called after a sweep failed, so the daemon can fall back to its own
    /// channel policy.
    fn selection_failed(&mut self, ctx: &InterfaceContext, err: &AcsError);
}

/// Start a sweep and execute its first actions.
///
/// Refreshes the context's driver capabilities before starting. A start
/// rejected with [`AcsError::SweepInProgress`] leaves `ctx` untouched.
pub fn start_sweep<D, H>(
    orch: &mut Orchestrator,
    ctx: &mut InterfaceContext,
    driver: &mut D,
    hooks: &mut H,
) -> Result<SweepOutcome, AcsError>
where
    D: RadioDriver + ?Sized,
    H: SelectionHooks + ?Sized,
{
    if orch.state().is_active() {
        return Err(AcsError::SweepInProgress);
    }
    ctx.capabilities = driver.capabilities();
    let actions = orch.start(ctx)?;
    Ok(run_actions(orch, ctx, driver, hooks, actions))
}

/// Deliver one driver notification and execute everything it triggers.
pub fn dispatch<D, H>(
    orch: &mut Orchestrator,
    ctx: &mut InterfaceContext,
    driver: &mut D,
    hooks: &mut H,
    event: Event,
) -> SweepOutcome
where
    D: RadioDriver + ?Sized,
    H: SelectionHooks + ?Sized,
{
    let actions = orch.handle(ctx, event);
    run_actions(orch, ctx, driver, hooks, actions)
}

fn run_actions<D, H>(
    orch: &mut Orchestrator,
    ctx: &mut InterfaceContext,
    driver: &mut D,
    hooks: &mut H,
    actions: Vec<Action>,
) -> SweepOutcome
where
    D: RadioDriver + ?Sized,
    H: SelectionHooks + ?Sized,
{
    let mut queue: VecDeque<Action> = actions.into();

    while let Some(action) = queue.pop_front() {
        trace!("ACS: executing {action:?}");
        let feedback = match action {
            Action::RequestKickoffScan => {
                driver.request_kickoff_scan().err().map(Event::RequestFailed)
            }
            Action::RequestOffChannel { freq, duration_ms } => driver
                .request_off_channel(freq, duration_ms)
                .err()
                .map(Event::RequestFailed),
            Action::RequestTrafficScan { freq } => Some(match driver.request_traffic_scan(freq) {
                Ok(samples) => Event::SurveyCollected { freq, samples },
                Err(err) => Event::RequestFailed(err),
            }),
            Action::ReportSelected(_) => {
                Some(Event::SelectionVerdict(hooks.selection_complete(ctx)))
            }
            Action::ReportFailed(err) => {
                hooks.selection_failed(ctx, &err);
                None
            }
        };

        if let Some(event) = feedback {
            queue.extend(orch.handle(ctx, event));
        }
    }

    orch.outcome().unwrap_or(SweepOutcome::InProgress)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::Channel;
    use crate::config::AcsConfig;
    use crate::orchestrator::SweepState;

    // -----------------------------------------------------------------------
    // Mocks
    // -----------------------------------------------------------------------

    /// Records requests and answers surveys from a fixed busy time.
    #[derive(Default)]
    struct MockDriver {
        offchannel_tx: bool,
        reject_off_channel: Option<u32>,
        reject_survey: bool,
        off_channel_requests: Vec<u32>,
        kickoff_requests: usize,
    }

    impl RadioDriver for MockDriver {
        fn capabilities(&self) -> DriverCapabilities {
            DriverCapabilities {
                offchannel_tx: self.offchannel_tx,
            }
        }
        fn request_kickoff_scan(&mut self) -> Result<(), DriverError> {
            self.kickoff_requests += 1;
            Ok(())
        }
        fn request_off_channel(&mut self, freq: u32, _duration_ms: u32) -> Result<(), DriverError> {
            if self.reject_off_channel == Some(freq) {
                return Err(DriverError::OffChannel {
                    freq,
                    reason: "mock rejection".to_string(),
                });
            }
            self.off_channel_requests.push(freq);
            Ok(())
        }
        fn request_traffic_scan(&mut self, freq: u32) -> Result<Vec<SurveySample>, DriverError> {
            if self.reject_survey {
                return Err(DriverError::Survey {
                    freq,
                    reason: "mock rejection".to_string(),
                });
            }
            // Higher frequencies are busier in this mock.
            let busy = 10 + u64::from(freq % 100);
            Ok(vec![SurveySample::new(200, busy, 10, -95)])
        }
    }

    struct MockHooks {
        verdict: ChannelStatus,
        completed: Vec<Option<u8>>,
        failed: Vec<AcsError>,
    }

    impl MockHooks {
        fn new(verdict: ChannelStatus) -> Self {
            Self {
                verdict,
                completed: Vec::new(),
                failed: Vec::new(),
            }
        }
    }

    impl SelectionHooks for MockHooks {
        fn selection_complete(&mut self, ctx: &InterfaceContext) -> ChannelStatus {
            assert!(ctx.chans_surveyed > 0, "samples still present when hook runs");
            self.completed.push(ctx.configured_channel);
            self.verdict
        }
        fn selection_failed(&mut self, _ctx: &InterfaceContext, err: &AcsError) {
            self.failed.push(err.clone());
        }
    }

    fn ctx() -> InterfaceContext {
        InterfaceContext::new(
            vec![Channel::new(1, 2412), Channel::new(6, 2437), Channel::new(11, 2462)],
            DriverCapabilities::default(),
            AcsConfig {
                num_req_surveys: 1,
                roc_duration_ms: 5,
            },
        )
    }

    /// Play the dwell notifications for whatever channel is being scanned.
    fn finish_dwell(
        orch: &mut Orchestrator,
        ctx: &mut InterfaceContext,
        driver: &mut MockDriver,
        hooks: &mut MockHooks,
    ) -> SweepOutcome {
        let SweepState::Scanning { freq, .. } = *orch.state() else {
            panic!("not scanning: {:?}", orch.state());
        };
        let ready = Event::OffChannelReady {
            freq,
            duration: 5,
            status: 0,
        };
        dispatch(orch, ctx, driver, hooks, ready);
        let cancelled = Event::OffChannelCancelled {
            freq,
            duration: 5,
            status: 0,
        };
        dispatch(orch, ctx, driver, hooks, cancelled)
    }

    // -----------------------------------------------------------------------
    // Tests
    // -----------------------------------------------------------------------

    #[test]
    fn test_full_sweep_through_dispatch() {
        let mut ctx = ctx();
        let mut orch = Orchestrator::new();
        let mut driver = MockDriver {
            offchannel_tx: true,
            ..Default::default()
        };
        let mut hooks = MockHooks::new(ChannelStatus::Valid);

        let outcome = start_sweep(&mut orch, &mut ctx, &mut driver, &mut hooks).unwrap();
        assert_eq!(outcome, SweepOutcome::InProgress);
        assert_eq!(driver.kickoff_requests, 1);

        dispatch(&mut orch, &mut ctx, &mut driver, &mut hooks, Event::KickoffScanComplete);
        let mut outcome = SweepOutcome::InProgress;
        while outcome == SweepOutcome::InProgress {
            outcome = finish_dwell(&mut orch, &mut ctx, &mut driver, &mut hooks);
        }

        assert_eq!(driver.off_channel_requests, vec![2412, 2437, 2462]);
        assert_eq!(hooks.completed, vec![Some(1)]);
        assert!(hooks.failed.is_empty());
        assert!(matches!(outcome, SweepOutcome::Selected(s) if s.chan == 1 && s.freq == 2412));
        assert!(ctx.is_clean());
    }

    #[test]
    fn test_missing_capability_reports_failure() {
        let mut ctx = ctx();
        let mut orch = Orchestrator::new();
        let mut driver = MockDriver::default();
        let mut hooks = MockHooks::new(ChannelStatus::Valid);

        let outcome = start_sweep(&mut orch, &mut ctx, &mut driver, &mut hooks).unwrap();
        assert!(matches!(outcome, SweepOutcome::Failed(AcsError::PreconditionUnmet(_))));
        assert_eq!(driver.kickoff_requests, 0);
        assert_eq!(hooks.failed.len(), 1);
    }

    #[test]
    fn test_rejected_off_channel_request_fails_sweep() {
        let mut ctx = ctx();
        let mut orch = Orchestrator::new();
        let mut driver = MockDriver {
            offchannel_tx: true,
            reject_off_channel: Some(2437),
            ..Default::default()
        };
        let mut hooks = MockHooks::new(ChannelStatus::Valid);

        start_sweep(&mut orch, &mut ctx, &mut driver, &mut hooks).unwrap();
        dispatch(&mut orch, &mut ctx, &mut driver, &mut hooks, Event::KickoffScanComplete);
        let outcome = finish_dwell(&mut orch, &mut ctx, &mut driver, &mut hooks);

        assert!(matches!(
            outcome,
            SweepOutcome::Failed(AcsError::DriverRequestFailed(DriverError::OffChannel {
                freq: 2437,
                ..
            }))
        ));
        assert_eq!(hooks.failed.len(), 1);
        assert!(ctx.is_clean());
    }

    #[test]
    fn test_rejected_survey_fails_sweep() {
        let mut ctx = ctx();
        let mut orch = Orchestrator::new();
        let mut driver = MockDriver {
            offchannel_tx: true,
            reject_survey: true,
            ..Default::default()
        };
        let mut hooks = MockHooks::new(ChannelStatus::Valid);

        start_sweep(&mut orch, &mut ctx, &mut driver, &mut hooks).unwrap();
        dispatch(&mut orch, &mut ctx, &mut driver, &mut hooks, Event::KickoffScanComplete);
        let outcome = finish_dwell(&mut orch, &mut ctx, &mut driver, &mut hooks);
        assert!(matches!(
            outcome,
            SweepOutcome::Failed(AcsError::DriverRequestFailed(DriverError::Survey { .. }))
        ));
    }

    #[test]
    fn test_upstream_invalid_reports_failure() {
        let mut ctx = ctx();
        let mut orch = Orchestrator::new();
        let mut driver = MockDriver {
            offchannel_tx: true,
            ..Default::default()
        };
        let mut hooks = MockHooks::new(ChannelStatus::Invalid);

        start_sweep(&mut orch, &mut ctx, &mut driver, &mut hooks).unwrap();
        dispatch(&mut orch, &mut ctx, &mut driver, &mut hooks, Event::KickoffScanComplete);
        let mut outcome = SweepOutcome::InProgress;
        while outcome == SweepOutcome::InProgress {
            outcome = finish_dwell(&mut orch, &mut ctx, &mut driver, &mut hooks);
        }

        assert_eq!(hooks.completed.len(), 1);
        assert!(matches!(
            hooks.failed.as_slice(),
            [AcsError::UpstreamRejected { chan: 1, .. }]
        ));
        assert!(matches!(outcome, SweepOutcome::Failed(_)));
    }

    #[test]
    fn test_second_start_is_rejected_without_side_effects() {
        let mut ctx = ctx();
        let mut orch = Orchestrator::new();
        let mut driver = MockDriver {
            offchannel_tx: true,
            ..Default::default()
        };
        let mut hooks = MockHooks::new(ChannelStatus::Valid);

        start_sweep(&mut orch, &mut ctx, &mut driver, &mut hooks).unwrap();
        driver.offchannel_tx = false;
        let err = start_sweep(&mut orch, &mut ctx, &mut driver, &mut hooks).unwrap_err();
        assert_eq!(err, AcsError::SweepInProgress);
        assert_eq!(driver.kickoff_requests, 1);
        assert!(hooks.failed.is_empty());
        assert!(ctx.capabilities.offchannel_tx);
        assert_eq!(*orch.state(), SweepState::KickoffScan);
    }
}
