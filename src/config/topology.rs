//! Topology grammar: watch sets and the host → paths subscribe map.
//!
//! # Grammar
//! ```text
//! watch_path     = path ("," path)*
//! server_list    = host ("," host)*
//! subscribe_path = entry ("," entry)*
//! entry          = host ":" path ("|" path)*
//! ```
//!
//! Segments and tokens are whitespace-trimmed and empty ones are skipped,
//! so `""`, `"a,,b"` and trailing delimiters are harmless. Every scan for
//! `:` and `|` is bounded by the entry's comma boundary.
//!
//! A host that shows up in more than one entry accumulates the union of
//! all of its paths; later entries never overwrite earlier ones.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use thiserror::Error;

const ENTRY_SEPARATOR: char = ',';
const HOST_SEPARATOR: char = ':';
const PATH_SEPARATOR: char = '|';

/// Error raised for a subscribe entry that cannot be split into host and paths.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TopologyError {
    #[error("subscribe entry `{entry}` has no `:` between host and paths")]
    MissingHostSeparator { entry: String },

    #[error("subscribe entry `{entry}` has an empty host")]
    EmptyHost { entry: String },
}

/// Deduplicated set of strings with a stable (sorted) enumeration order.
///
/// Used for watched directories and for the server list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct WatchSet(BTreeSet<String>);

impl WatchSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an element. Returns `false` if it was already present.
    pub fn insert(&mut self, value: impl Into<String>) -> bool {
        self.0.insert(value.into())
    }

    /// Check whether `value` is a member.
    pub fn contains(&self, value: &str) -> bool {
        self.0.contains(value)
    }

    /// Number of distinct elements.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when the set holds nothing.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Elements in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl Extend<String> for WatchSet {
    fn extend<I: IntoIterator<Item = String>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl<S: Into<String>> FromIterator<S> for WatchSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Remote host → set of paths that host wants change notifications for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SubscribeMap(BTreeMap<String, WatchSet>);

impl SubscribeMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge `paths` into the set stored under `host`, creating it if absent.
    pub fn merge<I>(&mut self, host: impl Into<String>, paths: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.0.entry(host.into()).or_default().extend(paths);
    }

    /// Paths subscribed by `host`, if it has an entry.
    pub fn get(&self, host: &str) -> Option<&WatchSet> {
        self.0.get(host)
    }

    /// Check whether `host` has an entry, even one with no paths.
    pub fn contains_host(&self, host: &str) -> bool {
        self.0.contains_key(host)
    }

    /// Number of distinct hosts.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no host has an entry.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Host and path-set pairs, sorted by host.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &WatchSet)> {
        self.0.iter().map(|(host, paths)| (host.as_str(), paths))
    }
}

/// Split `raw` on `,` into a deduplicated set of trimmed, non-empty segments.
pub fn build_watch_set(raw: &str) -> WatchSet {
    segments(raw, ENTRY_SEPARATOR).collect()
}

/// Parse `host:path1|path2,...` into a [`SubscribeMap`].
///
/// Fails on the first entry that lacks a `:` or names an empty host.
pub fn build_subscribe_map(raw: &str) -> Result<SubscribeMap, TopologyError> {
    let mut map = SubscribeMap::new();

    for entry in segments(raw, ENTRY_SEPARATOR) {
        let (host, path_list) = split_entry(entry)?;
        let paths = segments(path_list, PATH_SEPARATOR).map(str::to_owned);
        map.merge(host, paths);
    }

    Ok(map)
}

/// Split one comma-bounded entry at its first `:`.
fn split_entry(entry: &str) -> Result<(&str, &str), TopologyError> {
    let Some((host, path_list)) = entry.split_once(HOST_SEPARATOR) else {
        return Err(TopologyError::MissingHostSeparator {
            entry: entry.to_owned(),
        });
    };

    let host = host.trim();
    if host.is_empty() {
        return Err(TopologyError::EmptyHost {
            entry: entry.to_owned(),
        });
    }

    Ok((host, path_list))
}

/// Trimmed, non-empty pieces of `raw` between `delimiter`s.
///
/// The final piece runs to the end of `raw` whether or not a trailing
/// delimiter is present.
fn segments(raw: &str, delimiter: char) -> impl Iterator<Item = &str> {
    raw.split(delimiter)
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
}
