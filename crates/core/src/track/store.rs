use std::collections::HashMap;

use super::Track;

/// Name-to-track table shared by every pipeline of a run.
///
/// Entries are only ever inserted or overwritten. Iteration follows the
/// order in which names were first inserted, so saved tracks come out in a
/// stable order.
#[derive(Debug, Default, Clone)]
pub struct TrackStore {
    tracks: HashMap<String, Track>,
    order: Vec<String>,
}

impl TrackStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces `name`, returning the previous track if any.
    /// A replaced name keeps its original position.
    pub fn insert(&mut self, name: impl Into<String>, track: Track) -> Option<Track> {
        let name = name.into();
        let previous = self.tracks.insert(name.clone(), track);
        if previous.is_none() {
            self.order.push(name);
        }
        previous
    }

    pub fn get(&self, name: &str) -> Option<&Track> {
        self.tracks.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tracks.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Track names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Track)> {
        self.order
            .iter()
            .filter_map(|name| self.tracks.get(name).map(|track| (name.as_str(), track)))
    }

    /// Every track whose save flag is set, in insertion order.
    pub fn saved(&self) -> Vec<(&str, &Track)> {
        self.iter().filter(|(_, track)| track.is_saved()).collect()
    }
}
