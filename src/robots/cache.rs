//! Host-keyed robots.txt cache
//!
//! Entries live until [`RobotsCache::clear`] is called; there is no expiry.

use crate::robots::ParsedRobots;
use dashmap::DashMap;
use std::sync::Arc;

/// Concurrent map from host key to parsed robots.txt
///
/// Backed by a sharded map so lookups for unrelated hosts do not contend.
#[derive(Debug, Default)]
pub struct RobotsCache {
    entries: DashMap<String, Arc<ParsedRobots>>,
}

impl RobotsCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached robots.txt for a host, if any
    pub fn get(&self, host: &str) -> Option<Arc<ParsedRobots>> {
        self.entries.get(host).map(|entry| Arc::clone(entry.value()))
    }

    /// Stores the robots.txt for a host, returning the shared handle
    pub fn insert(&self, host: &str, robots: ParsedRobots) -> Arc<ParsedRobots> {
        let robots = Arc::new(robots);
        self.entries.insert(host.to_string(), Arc::clone(&robots));
        robots
    }

    pub fn contains(&self, host: &str) -> bool {
        self.entries.contains_key(host)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every cached entry
    pub fn clear(&self) {
        self.entries.clear();
    }
}
