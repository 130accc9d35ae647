use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::{Result, StemshiftError, Track};

/// Bit depths accepted for integer PCM export.
pub const SUPPORTED_BIT_DEPTHS: [u16; 3] = [16, 24, 32];

/// Reads a mono or stereo WAV file into an unsaved track with samples
/// scaled to `[-1.0, 1.0]`.
pub fn read_wav(path: &Path) -> Result<Track> {
    if !path.exists() {
        return Err(StemshiftError::audio(path, "file not found"));
    }

    let mut reader = WavReader::open(path).map_err(|e| StemshiftError::audio(path, e))?;
    let spec = reader.spec();
    if spec.channels == 0 || spec.channels > 2 {
        return Err(StemshiftError::audio(
            path,
            format!("{}-channel audio (only mono and stereo are supported)", spec.channels),
        ));
    }

    let samples = match spec.sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| StemshiftError::audio(path, e))?,
        SampleFormat::Int => {
            let scale = int_scale(spec.bits_per_sample);
            reader
                .samples::<i32>()
                .map(|sample| sample.map(|value| value as f32 / scale))
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|e| StemshiftError::audio(path, e))?
        }
    };

    Track::from_interleaved(samples, spec.channels, spec.sample_rate)
}

/// Writes `track` as integer PCM, clipping samples outside `[-1.0, 1.0]`.
pub fn write_wav(path: &Path, track: &Track, bits_per_sample: u16) -> Result<()> {
    if !SUPPORTED_BIT_DEPTHS.contains(&bits_per_sample) {
        return Err(StemshiftError::Config(format!(
            "unsupported bit depth {bits_per_sample} (expected 16, 24 or 32)"
        )));
    }

    let spec = WavSpec {
        channels: track.channels(),
        sample_rate: track.sample_rate(),
        bits_per_sample,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec).map_err(|e| StemshiftError::audio(path, e))?;

    let scale = int_scale(bits_per_sample);
    let max = scale - 1.0;
    for &sample in track.samples() {
        let value = (sample.clamp(-1.0, 1.0) * scale).clamp(-scale, max);
        let written = if bits_per_sample == 16 {
            writer.write_sample(value as i16)
        } else {
            writer.write_sample(value as i32)
        };
        written.map_err(|e| StemshiftError::audio(path, e))?;
    }

    writer.finalize().map_err(|e| StemshiftError::audio(path, e))
}

fn int_scale(bits_per_sample: u16) -> f32 {
    (1u64 << (bits_per_sample.clamp(1, 32) - 1)) as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use tempfile::TempDir;

    fn stereo_ramp() -> Track {
        let samples = (0..64).map(|i| (i as f32 - 32.0) / 40.0).collect();
        Track::from_interleaved(samples, 2, 22_050).unwrap()
    }

    #[test]
    fn round_trips_through_every_bit_depth() {
        let dir = TempDir::new().unwrap();
        let track = stereo_ramp();
        for bits in SUPPORTED_BIT_DEPTHS {
            let path = dir.path().join(format!("ramp{bits}.wav"));
            write_wav(&path, &track, bits).unwrap();

            let loaded = read_wav(&path).unwrap();
            assert_eq!(loaded.channels(), 2);
            assert_eq!(loaded.sample_rate(), 22_050);
            assert_eq!(loaded.frames(), track.frames());
            for (a, b) in loaded.samples().iter().zip(track.samples()) {
                assert_abs_diff_eq!(a, b, epsilon = 1e-3);
            }
        }
    }

    #[test]
    fn reads_float_wav_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("float.wav");
        let spec = WavSpec {
            channels: 1,
            sample_rate: 8_000,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        let mut writer = WavWriter::create(&path, spec).unwrap();
        for value in [0.25f32, -0.5, 0.75] {
            writer.write_sample(value).unwrap();
        }
        writer.finalize().unwrap();

        let track = read_wav(&path).unwrap();
        assert_eq!(track.samples(), &[0.25, -0.5, 0.75]);
        assert!(!track.is_stereo());
    }

    #[test]
    fn clips_out_of_range_samples() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("loud.wav");
        let track = Track::from_interleaved(vec![2.0, -3.0], 1, 8_000).unwrap();
        write_wav(&path, &track, 16).unwrap();

        let loaded = read_wav(&path).unwrap();
        assert_abs_diff_eq!(loaded.samples()[0], 1.0, epsilon = 1e-3);
        assert_abs_diff_eq!(loaded.samples()[1], -1.0, epsilon = 1e-3);
    }

    #[test]
    fn rejects_missing_files_and_bad_depths() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.wav");
        assert_eq!(read_wav(&missing).unwrap_err().kind(), "AUDIO");
        assert_eq!(
            write_wav(&missing, &stereo_ramp(), 12).unwrap_err().kind(),
            "CONFIG"
        );
    }

    #[test]
    fn rejects_surround_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("surround.wav");
        let spec = WavSpec {
            channels: 6,
            sample_rate: 48_000,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(&path, spec).unwrap();
        for _ in 0..12 {
            writer.write_sample(0i16).unwrap();
        }
        writer.finalize().unwrap();

        assert_eq!(read_wav(&path).unwrap_err().kind(), "AUDIO");
    }
}
