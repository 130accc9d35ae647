//! Named track transforms available to recipes.
//!
//! Every action has the same shape, `Track -> Track`, and keeps the channel
//! count, sample rate and frame count of its input. The set is closed: the
//! registry is a fixed table keyed by [`Action`].

mod pitch;
mod time;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Track;

pub use pitch::{change_pitch, PitchShifter};
pub use time::time_shift;

/// Signature shared by every registered transform.
pub type TrackTransform = fn(Track) -> Track;

/// The reserved action keywords of the recipe language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Early,
    Flat,
    HalfFlat,
    HalfSharp,
    Late,
    OctaveDown,
    OctaveUp,
    Sharp,
}

impl Action {
    pub const ALL: [Action; 8] = [
        Action::Early,
        Action::Flat,
        Action::HalfFlat,
        Action::HalfSharp,
        Action::Late,
        Action::OctaveDown,
        Action::OctaveUp,
        Action::Sharp,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            Action::Early => "early",
            Action::Flat => "flat",
            Action::HalfFlat => "halfflat",
            Action::HalfSharp => "halfsharp",
            Action::Late => "late",
            Action::OctaveDown => "octavedown",
            Action::OctaveUp => "octaveup",
            Action::Sharp => "sharp",
        }
    }

    pub fn from_keyword(word: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|action| action.keyword() == word)
    }

    /// The transform this action runs.
    pub fn transform(self) -> TrackTransform {
        match self {
            Action::Early => early,
            Action::Flat => flat,
            Action::HalfFlat => half_flat,
            Action::HalfSharp => half_sharp,
            Action::Late => late,
            Action::OctaveDown => octave_down,
            Action::OctaveUp => octave_up,
            Action::Sharp => sharp,
        }
    }

    /// Applies the action to `track`.
    pub fn apply(self, track: Track) -> Track {
        (self.transform())(track)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Lookup table from action keyword to transform.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActionRegistry;

impl ActionRegistry {
    pub fn new() -> Self {
        Self
    }

    pub fn lookup(&self, name: &str) -> Option<TrackTransform> {
        Action::from_keyword(name).map(Action::transform)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> {
        Action::ALL.into_iter().map(Action::keyword)
    }
}

/// Moves the track a tenth of a second earlier.
pub fn early(track: Track) -> Track {
    let frames = tenth_of_second(&track);
    time_shift(track, -frames)
}

/// Moves the track a tenth of a second later.
pub fn late(track: Track) -> Track {
    let frames = tenth_of_second(&track);
    time_shift(track, frames)
}

/// One semitone down.
pub fn flat(track: Track) -> Track {
    change_pitch(track, -1, 12)
}

/// One semitone up.
pub fn sharp(track: Track) -> Track {
    change_pitch(track, 1, 12)
}

/// One quarter tone down.
pub fn half_flat(track: Track) -> Track {
    change_pitch(track, -1, 24)
}

/// One quarter tone up.
pub fn half_sharp(track: Track) -> Track {
    change_pitch(track, 1, 24)
}

pub fn octave_up(track: Track) -> Track {
    change_pitch(track, 12, 12)
}

pub fn octave_down(track: Track) -> Track {
    change_pitch(track, -12, 12)
}

fn tenth_of_second(track: &Track) -> isize {
    (track.sample_rate() / 10) as isize
}
