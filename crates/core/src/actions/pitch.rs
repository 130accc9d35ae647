use std::{f32::consts::PI, fmt, sync::Arc};

use realfft::{num_complex::Complex32, ComplexToReal, FftError, RealFftPlanner, RealToComplex};

use crate::Track;

const DEFAULT_FFT_SIZE: usize = 2048;
const DEFAULT_OVERSAMPLING: usize = 4;

/// Changes the pitch of every channel by `n_steps` out of `bins_per_octave`
/// without changing the track length.
pub fn change_pitch(track: Track, n_steps: i32, bins_per_octave: u32) -> Track {
    if n_steps == 0 || bins_per_octave == 0 || track.frames() == 0 {
        return track;
    }

    let ratio = 2f32.powf(n_steps as f32 / bins_per_octave as f32);
    let mut shifter = PitchShifter::new(DEFAULT_FFT_SIZE, DEFAULT_OVERSAMPLING);
    track.map_channels(|channel| match shifter.shift(channel, ratio) {
        Ok(shifted) => shifted,
        Err(err) => {
            tracing::warn!(%err, n_steps, bins_per_octave, "pitch shift failed, channel left unchanged");
            channel.to_vec()
        }
    })
}

/// Short-time Fourier pitch shifter.
///
/// Each analysis frame is converted to per-bin magnitude and true frequency,
/// bins are moved by the pitch ratio and the frame is resynthesised with
/// accumulated phase. Frames overlap by `oversampling` and are windowed with
/// a periodic Hann window on both analysis and synthesis.
pub struct PitchShifter {
    fft_size: usize,
    oversampling: usize,
    window: Vec<f32>,
    forward: Arc<dyn RealToComplex<f32>>,
    inverse: Arc<dyn ComplexToReal<f32>>,
}

impl PitchShifter {
    pub fn new(fft_size: usize, oversampling: usize) -> Self {
        let fft_size = fft_size.max(4);
        let oversampling = oversampling.clamp(1, fft_size);
        let mut planner = RealFftPlanner::<f32>::new();
        Self {
            fft_size,
            oversampling,
            window: (0..fft_size).map(|i| hann_value(i, fft_size)).collect(),
            forward: planner.plan_fft_forward(fft_size),
            inverse: planner.plan_fft_inverse(fft_size),
        }
    }

    /// Shifts a single channel by `ratio` (2.0 is an octave up). The output
    /// has exactly as many samples as `samples`.
    pub fn shift(&mut self, samples: &[f32], ratio: f32) -> Result<Vec<f32>, FftError> {
        let size = self.fft_size;
        let step = size / self.oversampling;
        let bins = size / 2 + 1;
        let expected = 2.0 * PI * step as f32 / size as f32;

        let mut padded = vec![0.0; samples.len() + 2 * size];
        padded[size..size + samples.len()].copy_from_slice(samples);
        let mut accum = vec![0.0; padded.len()];

        let mut input = self.forward.make_input_vec();
        let mut spectrum = self.forward.make_output_vec();
        let mut forward_scratch = self.forward.make_scratch_vec();
        let mut inverse_scratch = self.inverse.make_scratch_vec();
        let mut output = self.inverse.make_output_vec();

        let mut last_phase = vec![0.0f32; bins];
        let mut sum_phase = vec![0.0f32; bins];
        let mut analysis_mag = vec![0.0f32; bins];
        let mut analysis_freq = vec![0.0f32; bins];
        let mut synth_mag = vec![0.0f32; bins];
        let mut synth_freq = vec![0.0f32; bins];

        let overlap_gain: f32 = (0..self.oversampling)
            .map(|m| self.window[m * step].powi(2))
            .sum();
        let scale = 1.0 / (size as f32 * overlap_gain.max(f32::EPSILON));

        let mut start = 0;
        while start + size <= padded.len() {
            for (i, value) in input.iter_mut().enumerate() {
                *value = padded[start + i] * self.window[i];
            }
            self.forward
                .process_with_scratch(&mut input, &mut spectrum, &mut forward_scratch)?;

            for (k, bin) in spectrum.iter().enumerate() {
                let phase = bin.arg();
                let mut delta = phase - last_phase[k];
                last_phase[k] = phase;
                delta -= k as f32 * expected;
                delta = wrap_phase(delta);
                analysis_mag[k] = bin.norm();
                analysis_freq[k] = k as f32 + delta * self.oversampling as f32 / (2.0 * PI);
            }

            synth_mag.iter_mut().for_each(|v| *v = 0.0);
            synth_freq.iter_mut().for_each(|v| *v = 0.0);
            for k in 0..bins {
                let target = (k as f32 * ratio) as usize;
                if target < bins {
                    synth_mag[target] += analysis_mag[k];
                    synth_freq[target] = analysis_freq[k] * ratio;
                }
            }

            for (k, bin) in spectrum.iter_mut().enumerate() {
                let deviation = synth_freq[k] - k as f32;
                sum_phase[k] += 2.0 * PI * deviation / self.oversampling as f32 + k as f32 * expected;
                *bin = Complex32::from_polar(synth_mag[k], sum_phase[k]);
            }
            // The inverse transform needs purely real DC and Nyquist bins.
            spectrum[0].im = 0.0;
            spectrum[bins - 1].im = 0.0;

            self.inverse
                .process_with_scratch(&mut spectrum, &mut output, &mut inverse_scratch)?;

            for (i, value) in output.iter().enumerate() {
                accum[start + i] += value * self.window[i] * scale;
            }

            start += step;
        }

        Ok(accum[size..size + samples.len()].to_vec())
    }
}

impl fmt::Debug for PitchShifter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PitchShifter")
            .field("fft_size", &self.fft_size)
            .field("oversampling", &self.oversampling)
            .finish()
    }
}

fn wrap_phase(phase: f32) -> f32 {
    let wrapped = (phase + PI).rem_euclid(2.0 * PI) - PI;
    if wrapped < -PI {
        wrapped + 2.0 * PI
    } else {
        wrapped
    }
}

/// Periodic Hann window, so overlapped squares sum to a constant.
fn hann_value(index: usize, len: usize) -> f32 {
    0.5 - 0.5 * ((2.0 * PI * index as f32) / len as f32).cos()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn sine(frequency: f32, sample_rate: u32, seconds: f32) -> Vec<f32> {
        let count = (sample_rate as f32 * seconds) as usize;
        (0..count)
            .map(|i| 0.5 * (2.0 * PI * frequency * i as f32 / sample_rate as f32).sin())
            .collect()
    }

    fn zero_crossing_frequency(samples: &[f32], sample_rate: u32) -> f32 {
        let crossings = samples
            .windows(2)
            .filter(|pair| (pair[0] < 0.0) != (pair[1] < 0.0))
            .count();
        crossings as f32 / 2.0 / (samples.len() as f32 / sample_rate as f32)
    }

    fn middle(samples: &[f32]) -> &[f32] {
        let quarter = samples.len() / 4;
        &samples[quarter..samples.len() - quarter]
    }

    #[test]
    fn unity_ratio_reconstructs_input() {
        let input = sine(330.0, 16_000, 0.5);
        let mut shifter = PitchShifter::new(1024, 4);
        let output = shifter.shift(&input, 1.0).unwrap();

        assert_eq!(output.len(), input.len());
        for (a, b) in middle(&input).iter().zip(middle(&output)) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-2);
        }
    }

    #[test]
    fn octave_up_doubles_frequency() {
        let sample_rate = 22_050;
        let input = sine(220.0, sample_rate, 1.0);
        let mut shifter = PitchShifter::new(DEFAULT_FFT_SIZE, DEFAULT_OVERSAMPLING);
        let output = shifter.shift(&input, 2.0).unwrap();

        let frequency = zero_crossing_frequency(middle(&output), sample_rate);
        assert!((frequency - 440.0).abs() < 44.0, "measured {frequency} Hz");
    }

    #[test]
    fn octave_down_halves_frequency() {
        let sample_rate = 22_050;
        let input = sine(880.0, sample_rate, 1.0);
        let mut shifter = PitchShifter::new(DEFAULT_FFT_SIZE, DEFAULT_OVERSAMPLING);
        let output = shifter.shift(&input, 0.5).unwrap();

        let frequency = zero_crossing_frequency(middle(&output), sample_rate);
        assert!((frequency - 440.0).abs() < 44.0, "measured {frequency} Hz");
    }

    #[test]
    fn change_pitch_keeps_track_shape() {
        let left = sine(440.0, 8_000, 0.25);
        let mut interleaved = Vec::with_capacity(left.len() * 2);
        for sample in &left {
            interleaved.push(*sample);
            interleaved.push(-*sample);
        }
        let track = Track::from_interleaved(interleaved, 2, 8_000).unwrap();

        let shifted = change_pitch(track.clone(), 1, 12);
        assert_eq!(shifted.frames(), track.frames());
        assert_eq!(shifted.channels(), 2);
        assert_eq!(shifted.sample_rate(), 8_000);
        assert_ne!(shifted.samples(), track.samples());
    }

    #[test]
    fn zero_steps_is_identity() {
        let track = Track::from_interleaved(sine(100.0, 1_000, 0.1), 1, 1_000).unwrap();
        assert_eq!(change_pitch(track.clone(), 0, 12), track);
    }

    #[test]
    fn wrap_phase_stays_in_range() {
        for raw in [-10.0f32, -PI, 0.0, 3.0, PI, 12.5] {
            let wrapped = wrap_phase(raw);
            assert!((-PI..=PI).contains(&wrapped), "{raw} wrapped to {wrapped}");
        }
    }
}
