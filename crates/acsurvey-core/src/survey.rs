//! Per-channel survey sample store.
//!
//! Samples only live for the duration of one sweep. [`clear_all`] is the
//! single way back to a clean context and is safe to call any number of times.

use log::{debug, warn};

use crate::channel::{Channel, InterfaceContext, SurveySample};

/// Append a sample to the channel at `idx` and fold its noise floor into the
/// channel and interface minimums.
pub fn add_sample(ctx: &mut InterfaceContext, idx: usize, sample: SurveySample) {
    let Some(chan) = ctx.channels.get_mut(idx) else {
        warn!("ACS: dropping survey sample for unknown channel index {idx}");
        return;
    };

    if sample.channel_time_tx > sample.channel_time_busy
        || sample.channel_time_busy > sample.channel_time
    {
        debug!(
            "ACS: inconsistent survey times on {} MHz (total={} busy={} tx={})",
            chan.freq, sample.channel_time, sample.channel_time_busy, sample.channel_time_tx
        );
    }

    if chan.survey_count == 0 {
        ctx.chans_surveyed += 1;
    }
    chan.survey_count += 1;
    chan.min_nf = Some(chan.min_nf.map_or(sample.nf, |nf| nf.min(sample.nf)));
    chan.samples.push(sample);

    ctx.lowest_nf = Some(ctx.lowest_nf.map_or(sample.nf, |nf| nf.min(sample.nf)));
}

/// Drop every sample held by one channel and reset its survey fields.
pub fn clear_channel(chan: &mut Channel) {
    chan.samples.clear();
    chan.survey_count = 0;
    chan.min_nf = None;
    chan.interference_factor = None;
}

/// Clear every channel and reset the interface-wide sweep counters.
pub fn clear_all(ctx: &mut InterfaceContext) {
    for chan in &mut ctx.channels {
        clear_channel(chan);
    }
    ctx.lowest_nf = None;
    ctx.chans_surveyed = 0;
    ctx.off_channel_idx = 0;
    ctx.completed_rounds = 0;
}
