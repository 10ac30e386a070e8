//! Shared replay fixtures, indexed by `fixtures/manifest.json` at the
//! workspace root.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../../../fixtures/manifest.json"))
        .expect("fixtures/manifest.json is valid")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    replays: BTreeMap<String, Entry>,
    #[serde(default)]
    configs: BTreeMap<String, Entry>,
}

/// A manifest value: either a bare relative path or `{ path, description }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Entry {
    Bare(String),
    Described {
        path: String,
        #[serde(default)]
        description: Option<String>,
    },
}

impl Entry {
    fn rel(&self) -> &str {
        match self {
            Entry::Bare(p) | Entry::Described { path: p, .. } => p,
        }
    }
}

/// One named group of manifest entries.
struct Section {
    kind: &'static str,
    entries: &'static BTreeMap<String, Entry>,
}

impl Section {
    fn entry(&self, name: &str) -> Result<&'static Entry> {
        self.entries
            .get(name)
            .ok_or_else(|| anyhow!("unknown {} fixture '{name}'", self.kind))
    }

    fn names(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    fn path(&self, name: &str) -> Result<PathBuf> {
        Ok(root().join(self.entry(name)?.rel()))
    }

    fn text(&self, name: &str) -> Result<String> {
        let path = self.path(name)?;
        fs::read_to_string(&path)
            .with_context(|| format!("reading {} fixture {}", self.kind, path.display()))
    }

    fn parse<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        let text = self.text(name)?;
        serde_json::from_str(&text)
            .with_context(|| format!("{} fixture '{name}' does not match the requested type", self.kind))
    }

    fn description(&self, name: &str) -> Result<Option<&'static str>> {
        Ok(match self.entry(name)? {
            Entry::Bare(_) => None,
            Entry::Described { description, .. } => description.as_deref(),
        })
    }
}

fn root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures")
}

fn replay_section() -> Section {
    Section {
        kind: "replay",
        entries: &MANIFEST.replays,
    }
}

fn config_section() -> Section {
    Section {
        kind: "config",
        entries: &MANIFEST.configs,
    }
}

/// Replay payloads (analysis-result JSON or bare frame arrays).
pub mod replays {
    use super::*;

    pub fn keys() -> Vec<String> {
        replay_section().names()
    }

    /// Raw payload text, for feeding the replay loader.
    pub fn json(name: &str) -> Result<String> {
        replay_section().text(name)
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        replay_section().parse(name)
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        replay_section().path(name)
    }

    pub fn description(name: &str) -> Result<Option<&'static str>> {
        replay_section().description(name)
    }
}

/// Replay configuration objects.
pub mod configs {
    use super::*;

    pub fn keys() -> Vec<String> {
        config_section().names()
    }

    pub fn json(name: &str) -> Result<String> {
        config_section().text(name)
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        config_section().parse(name)
    }
}
