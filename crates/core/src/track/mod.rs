//! Tracks, channel names and the store pipelines read from and write to.

mod store;

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Result, StemshiftError};

pub use store::TrackStore;

/// One of the reserved stem names produced by the external splitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Bass,
    Drums,
    Other,
    Piano,
    Vocals,
}

impl Channel {
    pub const ALL: [Channel; 5] = [
        Channel::Bass,
        Channel::Drums,
        Channel::Other,
        Channel::Piano,
        Channel::Vocals,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Channel::Bass => "bass",
            Channel::Drums => "drums",
            Channel::Other => "other",
            Channel::Piano => "piano",
            Channel::Vocals => "vocals",
        }
    }

    /// Looks up a channel by its reserved name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|channel| channel.as_str() == name)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which stems a splitter run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StemLayout {
    /// Vocals and everything else.
    Two,
    Four,
    #[default]
    Five,
}

impl StemLayout {
    pub fn channels(self) -> &'static [Channel] {
        match self {
            StemLayout::Two => &[Channel::Other, Channel::Vocals],
            StemLayout::Four => &[Channel::Bass, Channel::Drums, Channel::Other, Channel::Vocals],
            StemLayout::Five => &Channel::ALL,
        }
    }
}

impl FromStr for StemLayout {
    type Err = StemshiftError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "two" | "2" => Ok(StemLayout::Two),
            "four" | "4" => Ok(StemLayout::Four),
            "five" | "5" => Ok(StemLayout::Five),
            other => Err(StemshiftError::Config(format!(
                "unknown stem layout `{other}` (expected two, four or five)"
            ))),
        }
    }
}

/// A named unit of audio moving through the pipelines.
///
/// Samples are interleaved (`[L0, R0, L1, R1, ..]` for stereo). The channel
/// count and sample rate are fixed at construction; transforms only replace
/// the sample data.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    samples: Vec<f32>,
    channels: u16,
    sample_rate: u32,
    save: bool,
}

impl Track {
    /// Builds an unsaved track from interleaved samples.
    pub fn from_interleaved(samples: Vec<f32>, channels: u16, sample_rate: u32) -> Result<Self> {
        if !(1..=2).contains(&channels) {
            return Err(StemshiftError::InvalidTrack {
                reason: format!("{channels} channels (only mono and stereo are supported)"),
            });
        }
        if sample_rate == 0 {
            return Err(StemshiftError::InvalidTrack {
                reason: "sample rate must be positive".to_string(),
            });
        }
        if samples.len() % channels as usize != 0 {
            return Err(StemshiftError::InvalidTrack {
                reason: format!(
                    "sample count {} is not divisible by channel count {channels}",
                    samples.len()
                ),
            });
        }

        Ok(Self {
            samples,
            channels,
            sample_rate,
            save: false,
        })
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn is_stereo(&self) -> bool {
        self.channels == 2
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of frames (samples per channel).
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    pub fn is_saved(&self) -> bool {
        self.save
    }

    /// Returns the same audio with the save flag replaced.
    pub fn with_save(mut self, save: bool) -> Self {
        self.save = save;
        self
    }

    /// Deep copy of the audio with the save flag cleared. This is the copy a
    /// pipeline mutates, so the store entry it came from is left untouched.
    pub fn clone_unsaved(&self) -> Self {
        Self {
            samples: self.samples.clone(),
            channels: self.channels,
            sample_rate: self.sample_rate,
            save: false,
        }
    }

    /// Copies one channel out of the interleaved buffer.
    pub fn channel_samples(&self, channel: usize) -> Vec<f32> {
        self.samples
            .iter()
            .skip(channel)
            .step_by(self.channels as usize)
            .copied()
            .collect()
    }

    /// Rewrites every channel independently. `f` must return as many samples
    /// as it was given; shorter output is padded with silence and longer
    /// output is truncated so the frame count never changes.
    pub fn map_channels<F>(mut self, mut f: F) -> Self
    where
        F: FnMut(&[f32]) -> Vec<f32>,
    {
        let stride = self.channels as usize;
        let frames = self.frames();
        for channel in 0..stride {
            let processed = f(&self.channel_samples(channel));
            for frame in 0..frames {
                self.samples[frame * stride + channel] = processed.get(frame).copied().unwrap_or(0.0);
            }
        }
        self
    }

    /// Rotates whole frames by `offset`; positive values move audio later,
    /// wrapping the tail around to the start.
    pub fn roll_frames(mut self, offset: isize) -> Self {
        let frames = self.frames();
        if frames == 0 {
            return self;
        }
        let stride = self.channels as usize;
        let shift = offset.rem_euclid(frames as isize) as usize;
        self.samples.rotate_right(shift * stride);
        self
    }
}
