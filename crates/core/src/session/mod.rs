//! One end-to-end run: load stems, execute pipelines, export what was
//! saved, merge it into the output file and clean up.

use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::{info, warn};

use crate::{
    audio::{TrackExporter, TrackSource, WavExporter, WavStemSource},
    compile,
    merge::{merge_saved, Merger, WavMerger},
    AppConfig, Executor, Pipeline, Result,
};

/// What a finished session produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    pub pipelines_run: usize,
    /// Exported save-marked tracks, in merge order. They only still exist on
    /// disk when intermediates were preserved.
    pub saved: Vec<PathBuf>,
    pub output: PathBuf,
}

pub struct Session {
    source: Box<dyn TrackSource>,
    exporter: Box<dyn TrackExporter>,
    merger: Box<dyn Merger>,
    preserve_intermediates: bool,
}

impl Session {
    pub fn new(
        source: Box<dyn TrackSource>,
        exporter: Box<dyn TrackExporter>,
        merger: Box<dyn Merger>,
    ) -> Self {
        Self {
            source,
            exporter,
            merger,
            preserve_intermediates: false,
        }
    }

    /// WAV stems in, WAV intermediates and WAV output.
    pub fn from_config(config: &AppConfig) -> Self {
        let bits = config.export.bits_per_sample;
        Self::new(
            Box::new(WavStemSource::new(&config.stems.dir, config.stems.layout)),
            Box::new(WavExporter::new(&config.export.work_dir, bits)),
            Box::new(WavMerger::new(bits)),
        )
        .preserve_intermediates(config.export.preserve_intermediates)
    }

    pub fn preserve_intermediates(mut self, preserve: bool) -> Self {
        self.preserve_intermediates = preserve;
        self
    }

    /// Compiles `recipe` and runs it.
    pub fn run_recipe(&mut self, recipe: &str, output: &Path) -> Result<SessionReport> {
        let pipelines = compile(recipe)?;
        self.run(&pipelines, output)
    }

    /// Runs `pipelines` in order and writes the merged result to `output`.
    /// Any failure aborts the whole session; no partial output is written.
    pub fn run(&mut self, pipelines: &[Pipeline], output: &Path) -> Result<SessionReport> {
        let mut executor = Executor::from_source(self.source.as_ref())?;

        info!(count = pipelines.len(), "running pipelines");
        executor.run(pipelines)?;

        let mut saved = Vec::new();
        let merged = executor
            .export_saved(self.exporter.as_mut(), &mut saved)
            .and_then(|()| merge_saved(self.merger.as_ref(), &saved, output));
        if !self.preserve_intermediates {
            remove_intermediates(&saved);
        }
        merged?;

        Ok(SessionReport {
            pipelines_run: pipelines.len(),
            saved,
            output: output.to_path_buf(),
        })
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("layout", &self.source.layout())
            .field("preserve_intermediates", &self.preserve_intermediates)
            .finish()
    }
}

fn remove_intermediates(files: &[PathBuf]) {
    for file in files {
        if let Err(err) = fs::remove_file(file) {
            warn!(path = %file.display(), %err, "could not remove intermediate file");
        }
    }
}
