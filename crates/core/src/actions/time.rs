use crate::Track;

/// Shifts the track in time by `frames`, wrapping what falls off one end
/// back onto the other. Negative values move the audio earlier.
pub fn time_shift(track: Track, frames: isize) -> Track {
    if frames == 0 {
        return track;
    }
    track.roll_frames(frames)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mono(samples: &[f32]) -> Track {
        Track::from_interleaved(samples.to_vec(), 1, 4).unwrap()
    }

    #[test]
    fn forward_and_backward() {
        let track = mono(&[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(time_shift(track.clone(), 1).samples(), &[4.0, 1.0, 2.0, 3.0]);
        assert_eq!(time_shift(track, -1).samples(), &[2.0, 3.0, 4.0, 1.0]);
    }

    #[test]
    fn zero_shift_is_identity() {
        let track = mono(&[1.0, 2.0, 3.0]);
        assert_eq!(time_shift(track.clone(), 0), track);
    }

    #[test]
    fn empty_tracks_are_left_alone() {
        let track = mono(&[]);
        assert_eq!(time_shift(track.clone(), 7), track);
    }
}
