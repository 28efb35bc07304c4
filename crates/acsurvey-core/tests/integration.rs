//! Integration tests for acsurvey-core.
//!
//! These drive complete sweeps through the public API:
//! interface context → orchestrator → simulated radio → selection hooks.

use acsurvey_core::{
    AcsConfig, AcsError, Channel, ChannelPlan, ChannelStatus, DriverCapabilities, Event,
    InterfaceContext, Orchestrator, SelectionHooks, SimulatedRadio, SurveySample, SweepOutcome,
    SweepState, TrafficProfile, add_sample, clear_all, dispatch, select_ideal, start_sweep,
};

#[derive(Default)]
struct RecordingHooks {
    reject: bool,
    completed: Vec<Option<u8>>,
    failed: Vec<AcsError>,
}

impl SelectionHooks for RecordingHooks {
    fn selection_complete(&mut self, ctx: &InterfaceContext) -> ChannelStatus {
        self.completed.push(ctx.configured_channel);
        if self.reject {
            ChannelStatus::Invalid
        } else {
            ChannelStatus::Valid
        }
    }

    fn selection_failed(&mut self, _ctx: &InterfaceContext, err: &AcsError) {
        self.failed.push(err.clone());
    }
}

fn quiet_profile(busy: f64, nf: i8) -> TrafficProfile {
    TrafficProfile {
        busy_fraction: busy,
        tx_fraction: 0.0,
        noise_floor: nf,
        noise_jitter: 0,
        busy_jitter: 0.0,
    }
}

fn config(rounds: u32) -> AcsConfig {
    AcsConfig {
        num_req_surveys: rounds,
        roc_duration_ms: 10,
    }
}

fn three_channels() -> InterfaceContext {
    InterfaceContext::new(
        vec![
            Channel::new(1, 2412),
            Channel::new(6, 2437).with_disabled(true),
            Channel::new(11, 2462),
        ],
        DriverCapabilities { offchannel_tx: true },
        config(2),
    )
}

#[test]
fn disabled_middle_channel_lower_mean_wins() {
    let mut ctx = three_channels();
    let mut radio = SimulatedRadio::new(1, quiet_profile(0.6, -95));
    radio.set_profile(2412, quiet_profile(0.1, -95));
    radio.set_profile(2462, quiet_profile(0.4, -95));

    let mut orch = Orchestrator::new();
    let mut hooks = RecordingHooks::default();
    let outcome = radio.run_sweep(&mut orch, &mut ctx, &mut hooks).unwrap();

    match outcome {
        SweepOutcome::Selected(selected) => {
            assert_eq!(selected.chan, 1);
            assert_eq!(selected.freq, 2412);
        }
        other => panic!("expected a selection, got {other:?}"),
    }
    // Two rounds over the two enabled channels; channel 6 never visited.
    assert_eq!(radio.off_channel_log(), &[2412, 2462, 2412, 2462]);
    assert_eq!(hooks.completed, vec![Some(1)]);
    assert_eq!(ctx.configured_channel, Some(1));
    assert!(ctx.is_clean());
}

#[test]
fn two_rounds_reenter_scanning_at_index_zero() {
    let mut ctx = three_channels();
    let mut radio = SimulatedRadio::new(1, quiet_profile(0.3, -95));
    let mut orch = Orchestrator::new();
    let mut hooks = RecordingHooks::default();

    start_sweep(&mut orch, &mut ctx, &mut radio, &mut hooks).unwrap();
    let mut rounds_seen = Vec::new();
    while let Some(event) = radio.next_event() {
        dispatch(&mut orch, &mut ctx, &mut radio, &mut hooks, event);
        if ctx.completed_rounds == 1 && rounds_seen.is_empty() {
            rounds_seen.push(orch.state().clone());
            assert_eq!(ctx.chans_surveyed, 2, "round one kept its data");
        }
    }

    assert_eq!(
        rounds_seen,
        vec![SweepState::Scanning { idx: 0, freq: 2412 }]
    );
    assert!(matches!(orch.state(), SweepState::Done(_)));
}

#[test]
fn cancellation_mid_sweep_fails_and_clears() {
    let mut ctx = InterfaceContext::new(
        ChannelPlan::band_2ghz().channels,
        DriverCapabilities { offchannel_tx: true },
        config(1),
    );
    let mut radio = SimulatedRadio::new(9, TrafficProfile::default());
    radio.cancel_off_channel(2437);

    let mut orch = Orchestrator::new();
    let mut hooks = RecordingHooks::default();
    start_sweep(&mut orch, &mut ctx, &mut radio, &mut hooks).unwrap();

    let mut saw_data = false;
    while let Some(event) = radio.next_event() {
        if ctx.chans_surveyed > 0 {
            saw_data = true;
        }
        dispatch(&mut orch, &mut ctx, &mut radio, &mut hooks, event);
    }

    assert!(saw_data, "channels before the cancelled one were surveyed");
    assert_eq!(
        orch.outcome(),
        Some(SweepOutcome::Failed(AcsError::Cancelled {
            freq: 2437,
            status: acsurvey_core::sim::ECANCELED
        }))
    );
    assert_eq!(hooks.failed.len(), 1);
    assert!(hooks.completed.is_empty());
    assert!(ctx.is_clean());
    assert_eq!(ctx.configured_channel, None);
}

#[test]
fn full_2ghz_sweep_picks_quiet_channel() {
    let mut ctx = InterfaceContext::new(
        ChannelPlan::band_2ghz().channels,
        DriverCapabilities { offchannel_tx: true },
        config(5),
    );
    let mut radio = SimulatedRadio::new(
        2024,
        TrafficProfile {
            busy_fraction: 0.55,
            tx_fraction: 0.05,
            noise_floor: -92,
            noise_jitter: 1,
            busy_jitter: 0.05,
        },
    );
    radio.set_profile(
        2462,
        TrafficProfile {
            busy_fraction: 0.08,
            tx_fraction: 0.05,
            noise_floor: -97,
            noise_jitter: 1,
            busy_jitter: 0.01,
        },
    );

    let mut orch = Orchestrator::new();
    let mut hooks = RecordingHooks::default();
    let outcome = radio.run_sweep(&mut orch, &mut ctx, &mut hooks).unwrap();

    assert!(matches!(outcome, SweepOutcome::Selected(s) if s.chan == 11));
    // 13 enabled channels, channel 14 disabled, five rounds.
    assert_eq!(radio.off_channel_log().len(), 13 * 5);
    assert!(!radio.off_channel_log().contains(&2484));
}

#[test]
fn same_seed_same_choice() {
    let run = |seed: u64| {
        let mut ctx = InterfaceContext::new(
            ChannelPlan::band_5ghz().channels,
            DriverCapabilities { offchannel_tx: true },
            config(3),
        );
        let mut radio = SimulatedRadio::new(seed, TrafficProfile::default());
        let mut orch = Orchestrator::new();
        let mut hooks = RecordingHooks::default();
        radio.run_sweep(&mut orch, &mut ctx, &mut hooks).unwrap()
    };
    assert_eq!(run(77), run(77));
}

#[test]
fn kickoff_rejection_fails_immediately() {
    let mut ctx = three_channels();
    let mut radio = SimulatedRadio::new(1, TrafficProfile::default());
    radio.reject_kickoff();
    let mut orch = Orchestrator::new();
    let mut hooks = RecordingHooks::default();

    let outcome = radio.run_sweep(&mut orch, &mut ctx, &mut hooks).unwrap();
    assert!(matches!(outcome, SweepOutcome::Failed(AcsError::DriverRequestFailed(_))));
    assert!(radio.off_channel_log().is_empty());
}

#[test]
fn missing_offchannel_support_fails() {
    let mut ctx = three_channels();
    let mut radio = SimulatedRadio::new(1, TrafficProfile::default());
    radio.set_offchannel_tx(false);
    let mut orch = Orchestrator::new();
    let mut hooks = RecordingHooks::default();

    let outcome = radio.run_sweep(&mut orch, &mut ctx, &mut hooks).unwrap();
    assert!(matches!(outcome, SweepOutcome::Failed(AcsError::PreconditionUnmet(_))));
    assert_eq!(hooks.failed.len(), 1);
}

#[test]
fn upstream_rejection_then_successful_rerun() {
    let mut ctx = three_channels();
    let mut radio = SimulatedRadio::new(5, TrafficProfile::default());
    let mut orch = Orchestrator::new();
    let mut hooks = RecordingHooks {
        reject: true,
        ..Default::default()
    };

    let outcome = radio.run_sweep(&mut orch, &mut ctx, &mut hooks).unwrap();
    assert!(matches!(
        outcome,
        SweepOutcome::Failed(AcsError::UpstreamRejected { .. })
    ));
    assert!(ctx.is_clean());

    hooks.reject = false;
    let outcome = radio.run_sweep(&mut orch, &mut ctx, &mut hooks).unwrap();
    assert!(matches!(outcome, SweepOutcome::Selected(_)));
}

#[test]
fn all_channels_disabled_fails_no_usable_data() {
    let mut ctx = InterfaceContext::new(
        ChannelPlan::band_2ghz()
            .disable(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13])
            .channels,
        DriverCapabilities { offchannel_tx: true },
        config(1),
    );
    let mut radio = SimulatedRadio::new(1, TrafficProfile::default());
    let mut orch = Orchestrator::new();
    let mut hooks = RecordingHooks::default();

    let outcome = radio.run_sweep(&mut orch, &mut ctx, &mut hooks).unwrap();
    assert_eq!(outcome, SweepOutcome::Failed(AcsError::NoUsableData));
}

#[test]
fn notifications_after_failure_are_ignored() {
    let mut ctx = three_channels();
    let mut radio = SimulatedRadio::new(1, TrafficProfile::default());
    radio.reject_off_channel(2412);
    let mut orch = Orchestrator::new();
    let mut hooks = RecordingHooks::default();

    radio.run_sweep(&mut orch, &mut ctx, &mut hooks).unwrap();
    let outcome = dispatch(
        &mut orch,
        &mut ctx,
        &mut radio,
        &mut hooks,
        Event::OffChannelCancelled {
            freq: 2412,
            duration: 10,
            status: 0,
        },
    );
    assert!(matches!(outcome, SweepOutcome::Failed(_)));
    assert_eq!(hooks.failed.len(), 1);
}

#[test]
fn clear_all_then_select_returns_none() {
    let mut ctx = three_channels();
    add_sample(&mut ctx, 0, SurveySample::new(1000, 200, 10, -95));
    add_sample(&mut ctx, 2, SurveySample::new(1000, 500, 10, -93));
    assert_eq!(select_ideal(&mut ctx), Some(0));
    clear_all(&mut ctx);
    assert_eq!(select_ideal(&mut ctx), None);
    assert!(ctx.is_clean());
}
