//! Interference scoring and ideal channel selection.
//!
//! For one sample, with `min_nf` the lowest noise floor seen on any channel
//! during the sweep:
//!
//! ```text
//! factor = log2( (busy - tx) / (total - tx) * 2^(nf - min_nf) )
//! ```
//!
//! Busy time caused by our own transmissions does not count against a
//! channel, and every dB of noise above the best floor doubles the penalty.
//! A channel's score is the mean factor over its samples; lower is better.
//!
//! # Numeric edge cases
//!
//! The raw formula is undefined for two kinds of samples. They are handled
//! explicitly instead of letting NaN or -inf reach the comparison:
//!
//! - `total <= tx` (zero or negative denominator) or `busy < tx` (negative
//!   numerator): the sample is degenerate. It is skipped when averaging. A
//!   channel whose samples are all degenerate gets no score and is not
//!   selectable.
//! - `busy == tx`: the channel was idle apart from our own traffic and
//!   `log2(0)` would be -inf. The factor is pinned to
//!   [`IDLE_FACTOR_FLOOR`], which also bounds every other factor from below.

use log::{debug, warn};

use crate::channel::{Channel, InterfaceContext, SurveySample};

/// Lowest factor a sample can produce. Marks a channel with no foreign traffic.
pub const IDLE_FACTOR_FLOOR: f64 = -64.0;

/// Interference factor of a single sample, or `None` if the sample is degenerate.
pub fn survey_interference_factor(sample: &SurveySample, min_nf: i8) -> Option<f64> {
    if sample.channel_time <= sample.channel_time_tx
        || sample.channel_time_busy < sample.channel_time_tx
    {
        return None;
    }

    let idle_or_rx = (sample.channel_time_busy - sample.channel_time_tx) as f64;
    let denominator = (sample.channel_time - sample.channel_time_tx) as f64;
    let noise_gain = 2f64.powi(i32::from(sample.nf) - i32::from(min_nf));

    let ratio = idle_or_rx / denominator * noise_gain;
    if ratio <= 0.0 {
        return Some(IDLE_FACTOR_FLOOR);
    }
    Some(ratio.log2().max(IDLE_FACTOR_FLOOR))
}

/// Lowest noise floor across the interface and every stored sample.
pub fn sweep_lowest_nf(ctx: &InterfaceContext) -> Option<i8> {
    ctx.channels
        .iter()
        .flat_map(|c| c.samples.iter().map(|s| s.nf))
        .chain(ctx.lowest_nf)
        .min()
}

/// Compute and store the mean interference factor for one channel.
///
/// Disabled channels and channels without samples are left untouched.
pub fn chan_interference_factor(chan: &mut Channel, min_nf: i8) -> Option<f64> {
    if chan.samples.is_empty() || chan.disabled {
        return None;
    }

    let mut sum = 0.0;
    let mut scored = 0usize;
    for (i, sample) in chan.samples.iter().enumerate() {
        match survey_interference_factor(sample, min_nf) {
            Some(factor) => {
                debug!(
                    "\tsurvey_id: {}\tchan_min_nf: {}\tsurvey_interference_factor: {:.6}",
                    i + 1,
                    chan.min_nf.unwrap_or(sample.nf),
                    factor
                );
                sum += factor;
                scored += 1;
            }
            None => {
                warn!(
                    "ACS: skipping degenerate survey {} on {} MHz (total={} busy={} tx={})",
                    i + 1,
                    chan.freq,
                    sample.channel_time,
                    sample.channel_time_busy,
                    sample.channel_time_tx
                );
            }
        }
    }

    chan.interference_factor = (scored > 0).then(|| sum / scored as f64);
    chan.interference_factor
}

/// Score every usable channel and return the index of the lowest score.
///
/// The first usable channel seeds the incumbent and only a strictly lower
/// score replaces it, so ties go to the lower channel index.
pub fn select_ideal(ctx: &mut InterfaceContext) -> Option<usize> {
    let min_nf = sweep_lowest_nf(ctx)?;
    let mut ideal: Option<(usize, f64)> = None;

    for (idx, chan) in ctx.channels.iter_mut().enumerate() {
        if !chan.is_usable() {
            continue;
        }

        debug!(
            "---------------- Survey analysis for channel {} ({} MHz) ----------------",
            chan.chan, chan.freq
        );

        let Some(score) = chan_interference_factor(chan, min_nf) else {
            debug!("\tChannel {} has no scorable surveys", chan.chan);
            continue;
        };

        debug!("\tChannel survey interference factor average: {score:.6}");

        match ideal {
            Some((_, best)) if score >= best => {}
            _ => ideal = Some((idx, score)),
        }
    }

    ideal.map(|(idx, _)| idx)
}
