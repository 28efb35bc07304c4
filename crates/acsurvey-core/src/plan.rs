//! Channel plans used to build an interface's channel list.

use serde::{Deserialize, Serialize};

use crate::channel::Channel;

/// Supported bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Band {
    #[serde(alias = "2g", alias = "2.4ghz")]
    Ghz2,
    #[serde(alias = "5g", alias = "5ghz")]
    Ghz5,
}

impl std::fmt::Display for Band {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ghz2 => write!(f, "2.4 GHz"),
            Self::Ghz5 => write!(f, "5 GHz"),
        }
    }
}

/// Center frequency of a channel number, if the band defines it.
pub fn chan_to_freq(band: Band, chan: u8) -> Option<u32> {
    match band {
        Band::Ghz2 => match chan {
            1..=13 => Some(2407 + 5 * u32::from(chan)),
            14 => Some(2484),
            _ => None,
        },
        Band::Ghz5 => match chan {
            36..=177 => Some(5000 + 5 * u32::from(chan)),
            _ => None,
        },
    }
}

/// 20 MHz channels of the 5 GHz UNII-1/2/2e/3 sub-bands.
const CHANNELS_5GHZ: &[u8] = &[
    36, 40, 44, 48, 52, 56, 60, 64, 100, 104, 108, 112, 116, 120, 124, 128, 132, 136, 140, 144,
    149, 153, 157, 161, 165,
];

/// An ordered channel list for one band.
#[derive(Debug, Clone)]
pub struct ChannelPlan {
    pub band: Band,
    pub channels: Vec<Channel>,
}

impl ChannelPlan {
    /// Channels 1-13, plus 14 which is disabled outside Japan.
    pub fn band_2ghz() -> Self {
        let channels = (1..=14u8)
            .filter_map(|chan| {
                chan_to_freq(Band::Ghz2, chan)
                    .map(|freq| Channel::new(chan, freq).with_disabled(chan == 14))
            })
            .collect();
        Self {
            band: Band::Ghz2,
            channels,
        }
    }

    pub fn band_5ghz() -> Self {
        let channels = CHANNELS_5GHZ
            .iter()
            .filter_map(|&chan| chan_to_freq(Band::Ghz5, chan).map(|freq| Channel::new(chan, freq)))
            .collect();
        Self {
            band: Band::Ghz5,
            channels,
        }
    }

    pub fn for_band(band: Band) -> Self {
        match band {
            Band::Ghz2 => Self::band_2ghz(),
            Band::Ghz5 => Self::band_5ghz(),
        }
    }

    /// Mark the listed channel numbers as disabled.
    pub fn disable(mut self, chans: &[u8]) -> Self {
        for chan in &mut self.channels {
            if chans.contains(&chan.chan) {
                chan.disabled = true;
            }
        }
        self
    }
}
