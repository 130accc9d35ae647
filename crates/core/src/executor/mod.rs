//! Runs compiled pipelines against the track store.

use std::path::PathBuf;

use tracing::{debug, info};

use crate::{
    audio::{TrackExporter, TrackSource},
    merge::as_merge_error,
    Pipeline, Result, StemshiftError, Track, TrackStore,
};

/// Owns the store for the length of a run and applies pipelines to it in
/// declaration order. Later pipelines see whatever earlier ones wrote.
#[derive(Debug, Default)]
pub struct Executor {
    store: TrackStore,
}

impl Executor {
    pub fn new(store: TrackStore) -> Self {
        Self { store }
    }

    /// Seeds a store with every channel the source's layout provides.
    pub fn from_source(source: &dyn TrackSource) -> Result<Self> {
        let layout = source.layout();
        let mut store = TrackStore::new();
        for &channel in layout.channels() {
            let track = source.load(channel)?;
            debug!(%channel, frames = track.frames(), channels = track.channels(), "loaded stem");
            store.insert(channel.as_str(), track);
        }
        info!(?layout, tracks = store.len(), "loaded split sources");
        Ok(Self::new(store))
    }

    pub fn store(&self) -> &TrackStore {
        &self.store
    }

    /// Runs every pipeline in order. The first failure stops the run.
    pub fn run(&mut self, pipelines: &[Pipeline]) -> Result<()> {
        for pipeline in pipelines {
            self.run_pipeline(pipeline)?;
        }
        Ok(())
    }

    /// Clones the source track, applies the actions to the clone and stores
    /// the result under the sink name, replacing any previous entry.
    pub fn run_pipeline(&mut self, pipeline: &Pipeline) -> Result<()> {
        let source = self
            .store
            .get(&pipeline.source)
            .ok_or_else(|| StemshiftError::MissingSource {
                name: pipeline.source.clone(),
                pipeline: pipeline.to_string(),
            })?;

        let mut track = source.clone_unsaved();
        for action in &pipeline.actions {
            track = action.apply(track);
        }

        debug!(%pipeline, "executed pipeline");
        self.store
            .insert(pipeline.sink.clone(), track.with_save(pipeline.save));
        Ok(())
    }

    /// Tracks marked for saving, in store order.
    pub fn saved_tracks(&self) -> Vec<(&str, &Track)> {
        self.store.saved()
    }

    /// Persists every saved track in store order, pushing each handle onto
    /// `exported` as soon as it exists. On failure `exported` still lists
    /// what was written, so the caller can clean it up.
    pub fn export_saved(
        &self,
        exporter: &mut dyn TrackExporter,
        exported: &mut Vec<PathBuf>,
    ) -> Result<()> {
        let saved = self.saved_tracks();
        info!(count = saved.len(), "exporting saved tracks");
        for (name, track) in saved {
            let path = exporter
                .export(name, track)
                .map_err(|err| as_merge_error(err, exported))?;
            exported.push(path);
        }
        Ok(())
    }
}
