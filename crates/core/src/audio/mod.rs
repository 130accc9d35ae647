//! Boundary with the audio collaborators around the recipe core: the stem
//! splitter that seeds the store and the exporter that persists saved
//! tracks. Only WAV is handled here.

mod wav;

use std::{fs, path::PathBuf};

use tracing::debug;

use crate::{Channel, Result, StemLayout, Track};

pub use wav::{read_wav, write_wav, SUPPORTED_BIT_DEPTHS};

/// Supplies the initial channel tracks of a run.
pub trait TrackSource {
    /// Which channels [`TrackSource::load`] can produce.
    fn layout(&self) -> StemLayout;

    fn load(&self, channel: Channel) -> Result<Track>;
}

/// Persists a saved track and returns a handle the merger can read back.
pub trait TrackExporter {
    fn export(&mut self, name: &str, track: &Track) -> Result<PathBuf>;
}

/// Reads stems the external splitter left behind as `<dir>/<channel>.wav`.
#[derive(Debug, Clone)]
pub struct WavStemSource {
    dir: PathBuf,
    layout: StemLayout,
}

impl WavStemSource {
    pub fn new(dir: impl Into<PathBuf>, layout: StemLayout) -> Self {
        Self {
            dir: dir.into(),
            layout,
        }
    }

    pub fn path_for(&self, channel: Channel) -> PathBuf {
        self.dir.join(format!("{channel}.wav"))
    }
}

impl TrackSource for WavStemSource {
    fn layout(&self) -> StemLayout {
        self.layout
    }

    fn load(&self, channel: Channel) -> Result<Track> {
        read_wav(&self.path_for(channel))
    }
}

/// Writes saved tracks to `<dir>/<name>.wav`.
#[derive(Debug, Clone)]
pub struct WavExporter {
    dir: PathBuf,
    bits_per_sample: u16,
}

impl WavExporter {
    pub fn new(dir: impl Into<PathBuf>, bits_per_sample: u16) -> Self {
        Self {
            dir: dir.into(),
            bits_per_sample,
        }
    }
}

impl TrackExporter for WavExporter {
    fn export(&mut self, name: &str, track: &Track) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(format!("{name}.wav"));
        if let Err(err) = write_wav(&path, track, self.bits_per_sample) {
            // Never leave a truncated file behind.
            let _ = fs::remove_file(&path);
            return Err(err);
        }
        debug!(name, path = %path.display(), "exported track");
        Ok(path)
    }
}
