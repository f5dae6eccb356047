// src/survey/inventory.rs

use std::{
    collections::{BTreeMap, BTreeSet},
    path::Path,
    sync::LazyLock,
};

use regex::Regex;
use serde::Serialize;

/// `<promptId>_<modelTag>`, both parts non-empty and free of underscores.
static AUDIO_STEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^_]+)_([^_]+)$").expect("valid audio stem pattern"));

/// Model tags available per prompt id.
pub type PromptTags = BTreeMap<String, BTreeSet<String>>;

/// Audio assets on disk, grouped as subfolder -> prompt id -> model tags.
///
/// Built once at startup and read-only afterwards. A subfolder is present only
/// if it holds at least one recognised file, so absence means "unusable".
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AudioInventory {
    subfolders: BTreeMap<String, PromptTags>,
}

impl AudioInventory {
    /// Walks the immediate subdirectories of `audio_root`.
    ///
    /// A missing or non-directory root yields an empty inventory. Files whose
    /// stem does not split into exactly two parts are skipped, as are hidden
    /// files and nested directories.
    pub fn scan(audio_root: &Path) -> Self {
        let mut inventory = Self::default();

        let entries = match std::fs::read_dir(audio_root) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(
                    "Audio root {} is not readable, inventory is empty: {}",
                    audio_root.display(),
                    e
                );
                return inventory;
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            let Some(subfolder) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };

            let prompts = scan_subfolder(&path);
            if prompts.is_empty() {
                tracing::debug!("Subfolder {} has no recognised audio files", subfolder);
                continue;
            }
            inventory.subfolders.insert(subfolder.to_string(), prompts);
        }

        tracing::info!(
            "Scanned audio root {}: {} subfolder(s)",
            audio_root.display(),
            inventory.subfolders.len()
        );
        inventory
    }

    /// Records one `(prompt, model)` asset. Duplicates are ignored.
    pub fn insert(&mut self, subfolder: &str, prompt_id: &str, model_tag: &str) {
        self.subfolders
            .entry(subfolder.to_string())
            .or_default()
            .entry(prompt_id.to_string())
            .or_default()
            .insert(model_tag.to_string());
    }

    pub fn subfolder(&self, name: &str) -> Option<&PromptTags> {
        self.subfolders.get(name)
    }

    pub fn tags(&self, subfolder: &str, prompt_id: &str) -> Option<&BTreeSet<String>> {
        self.subfolder(subfolder).and_then(|p| p.get(prompt_id))
    }

    pub fn subfolders(&self) -> impl Iterator<Item = (&String, &PromptTags)> {
        self.subfolders.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.subfolders.is_empty()
    }
}

fn scan_subfolder(dir: &Path) -> PromptTags {
    let mut prompts = PromptTags::new();

    let Ok(entries) = std::fs::read_dir(dir) else {
        return prompts;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        if stem.starts_with('.') {
            continue;
        }
        match parse_audio_stem(stem) {
            Some((prompt_id, model_tag)) => {
                prompts
                    .entry(prompt_id.to_string())
                    .or_default()
                    .insert(model_tag.to_string());
            }
            None => tracing::debug!("Skipping file with unexpected name: {}", path.display()),
        }
    }

    prompts
}

/// Splits `001_methodA` into `("001", "methodA")`.
pub fn parse_audio_stem(stem: &str) -> Option<(&str, &str)> {
    let caps = AUDIO_STEM.captures(stem)?;
    Some((caps.get(1)?.as_str(), caps.get(2)?.as_str()))
}
