//! Combines the exported, save-marked tracks into the final output.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::{
    audio::{read_wav, write_wav},
    Result, StemshiftError, Track,
};

/// Mixing backend: combine N persisted tracks into one and write it out.
pub trait Merger {
    fn merge(&self, files: &[PathBuf]) -> Result<Track>;

    fn write(&self, track: &Track, path: &Path) -> Result<()>;
}

/// Sequences the saved-file list through a [`Merger`]. An empty list is an
/// error, never a silent empty output.
pub fn merge_saved(merger: &dyn Merger, files: &[PathBuf], output: &Path) -> Result<Track> {
    if files.is_empty() {
        return Err(StemshiftError::NoSavedTracks);
    }

    info!(count = files.len(), "merging tracks");
    let merged = merger.merge(files).map_err(|err| as_merge_error(err, files))?;
    merger
        .write(&merged, output)
        .map_err(|err| as_merge_error(err, files))?;
    info!(output = %output.display(), "wrote merged output");
    Ok(merged)
}

/// Wraps a failure as a [`StemshiftError::Merge`] naming `files`, unless it
/// already is one.
pub(crate) fn as_merge_error(err: StemshiftError, files: &[PathBuf]) -> StemshiftError {
    match err {
        StemshiftError::Merge { .. } | StemshiftError::NoSavedTracks => err,
        other => StemshiftError::Merge {
            files: files.to_vec(),
            reason: other.to_string(),
        },
    }
}

/// Overlays WAV files on top of each other.
///
/// The first file fixes the length and sample rate; later files are summed
/// onto it and cut to that length. A mono layer mixed with stereo is copied
/// to both sides, and the mix turns stereo as soon as any layer is. The mix
/// is clamped to `[-1.0, 1.0]`.
#[derive(Debug, Clone)]
pub struct WavMerger {
    bits_per_sample: u16,
}

impl WavMerger {
    pub fn new(bits_per_sample: u16) -> Self {
        Self { bits_per_sample }
    }
}

impl Default for WavMerger {
    fn default() -> Self {
        Self::new(16)
    }
}

impl Merger for WavMerger {
    fn merge(&self, files: &[PathBuf]) -> Result<Track> {
        let (first, rest) = files.split_first().ok_or(StemshiftError::NoSavedTracks)?;

        let base = read_wav(first)?;
        let sample_rate = base.sample_rate();
        let mut channels = base.channels();
        let mut mix = base.samples().to_vec();
        for path in rest {
            let layer = read_wav(path)?;
            if layer.sample_rate() != sample_rate {
                return Err(StemshiftError::Merge {
                    files: files.to_vec(),
                    reason: format!(
                        "`{}` is {} Hz but `{}` is {} Hz",
                        path.display(),
                        layer.sample_rate(),
                        first.display(),
                        sample_rate
                    ),
                });
            }

            if layer.channels() > channels {
                mix = upmix(&mix);
                channels = layer.channels();
            }
            let upmixed;
            let samples = if layer.channels() < channels {
                upmixed = upmix(layer.samples());
                &upmixed[..]
            } else {
                layer.samples()
            };

            for (out, sample) in mix.iter_mut().zip(samples) {
                *out += sample;
            }
        }

        for sample in &mut mix {
            *sample = sample.clamp(-1.0, 1.0);
        }
        Track::from_interleaved(mix, channels, sample_rate)
    }

    fn write(&self, track: &Track, path: &Path) -> Result<()> {
        write_wav(path, track, self.bits_per_sample)
    }
}

/// Mono to stereo, one sample per side.
fn upmix(mono: &[f32]) -> Vec<f32> {
    mono.iter().flat_map(|&sample| [sample, sample]).collect()
}
