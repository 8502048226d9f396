//! Core [`RuleLoader`] struct: filesystem-backed document loading with optional hot-reload.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{info, warn};

use crate::catalog::CatalogHandle;
use crate::schema::{RuleDocument, RuleEnvelope};

use super::error::{ConfigError, LoadResult, LoadStatus, Result};
use super::watcher::handle_fs_event;

/// Where a catalog's documents come from.
#[derive(Debug, Clone)]
pub enum CatalogSource {
    /// Directory scanned recursively for `*.yml` / `*.yaml` files.
    Directory(PathBuf),
    /// Named YAML strings held in memory.
    Inline(Vec<InlineDocument>),
}

/// A YAML document that does not live on disk.
#[derive(Debug, Clone)]
pub struct InlineDocument {
    pub name: String,
    pub yaml: String,
}

impl InlineDocument {
    pub fn new(name: impl Into<String>, yaml: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            yaml: yaml.into(),
        }
    }
}

/// A parsed document together with where it came from.
#[derive(Debug, Clone)]
pub struct SourcedDocument {
    pub origin: String,
    pub document: RuleDocument,
}

/// Everything one load pass produced: the documents that parsed and a
/// per-source status report.
#[derive(Debug, Clone, Default)]
pub struct LoadedDocuments {
    pub documents: Vec<SourcedDocument>,
    pub results: Vec<LoadResult>,
}

impl LoadedDocuments {
    pub fn failures(&self) -> impl Iterator<Item = &LoadResult> {
        self.results.iter().filter(|r| r.is_failed())
    }

    /// Display names of the sources that failed to load, in load order.
    pub fn failed_sources(&self) -> Vec<String> {
        self.failures()
            .map(|r| r.path.display().to_string())
            .collect()
    }

    fn push_parsed(&mut self, origin: PathBuf, parsed: Result<RuleDocument>) {
        match parsed {
            Ok(doc) if !doc.metadata().enabled => {
                info!(document_id = %doc.metadata().id, path = %origin.display(), "skipping disabled document");
                self.results.push(LoadResult {
                    path: origin,
                    status: LoadStatus::Skipped {
                        reason: "disabled".to_string(),
                    },
                });
            }
            Ok(doc) => {
                let document_id = doc.metadata().id.clone();
                info!(document_id = %document_id, kind = %doc.kind(), path = %origin.display(), "loaded document");
                self.documents.push(SourcedDocument {
                    origin: origin.display().to_string(),
                    document: doc,
                });
                self.results.push(LoadResult {
                    path: origin,
                    status: LoadStatus::Loaded { document_id },
                });
            }
            Err(e) => {
                warn!(path = %origin.display(), error = %e, "failed to load rule source");
                self.results.push(LoadResult {
                    path: origin,
                    status: LoadStatus::Failed {
                        error: e.to_string(),
                    },
                });
            }
        }
    }
}

impl CatalogSource {
    /// Read every document this source provides.
    pub fn load(&self) -> Result<LoadedDocuments> {
        match self {
            CatalogSource::Directory(dir) => RuleLoader::new(dir.clone()).load_all(),
            CatalogSource::Inline(docs) => {
                let mut loaded = LoadedDocuments::default();
                for doc in docs {
                    loaded.push_parsed(PathBuf::from(&doc.name), parse_document(&doc.yaml, &doc.name));
                }
                Ok(loaded)
            }
        }
    }

    pub fn describe(&self) -> String {
        match self {
            CatalogSource::Directory(dir) => dir.display().to_string(),
            CatalogSource::Inline(docs) => format!("{} inline document(s)", docs.len()),
        }
    }
}

/// Parse one YAML document via two-pass deserialization.
///
/// First pass: deserialize as [`RuleEnvelope`] to read the `kind` field.
/// Second pass: reconstruct and deserialize into the kind-specific type.
pub fn parse_document(yaml: &str, origin: &str) -> Result<RuleDocument> {
    let envelope: RuleEnvelope = serde_yaml::from_str(yaml)?;

    if envelope.metadata.id.is_empty() {
        return Err(ConfigError::Document {
            origin: origin.to_string(),
            message: "metadata.id must not be empty".to_string(),
        });
    }

    envelope.parse_full().map_err(|message| ConfigError::Document {
        origin: origin.to_string(),
        message: format!("failed to parse '{}': {}", envelope.metadata.id, message),
    })
}

/// Filesystem-backed document loader with optional hot-reload.
///
/// Scans a directory (recursively) for `*.yml` / `*.yaml` files in path
/// order, so repeated loads of an unchanged directory are identical.
pub struct RuleLoader {
    /// Root directory containing rule YAML files.
    rules_dir: PathBuf,
    /// Active filesystem watcher (held to keep it alive).
    _watcher: Option<RecommendedWatcher>,
}

impl RuleLoader {
    pub fn new(rules_dir: PathBuf) -> Self {
        Self {
            rules_dir,
            _watcher: None,
        }
    }

    /// Recursively scan the rules directory and load all YAML files.
    ///
    /// Dotfiles (filenames starting with `.`) and non-YAML files are skipped.
    /// Parse errors are reported per-file but do not abort the scan.
    pub fn load_all(&self) -> Result<LoadedDocuments> {
        let mut loaded = LoadedDocuments::default();
        self.scan_dir_recursive(&self.rules_dir, &mut loaded)?;
        Ok(loaded)
    }

    fn scan_dir_recursive(&self, dir: &Path, loaded: &mut LoadedDocuments) -> Result<()> {
        let entries = match fs::read_dir(dir) {
            Ok(e) => e,
            Err(e) => {
                warn!(path = %dir.display(), error = %e, "failed to read directory");
                return Ok(());
            }
        };

        let mut paths = entries
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        paths.sort();

        for path in paths {
            // Skip dotfiles/dotdirs
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if name.starts_with('.') {
                    if path.is_file() {
                        loaded.results.push(LoadResult {
                            path,
                            status: LoadStatus::Skipped {
                                reason: "dotfile".to_string(),
                            },
                        });
                    }
                    continue;
                }
            }

            if path.is_dir() {
                self.scan_dir_recursive(&path, loaded)?;
                continue;
            }

            if !is_yaml(&path) {
                loaded.results.push(LoadResult {
                    path,
                    status: LoadStatus::Skipped {
                        reason: "not a YAML file".to_string(),
                    },
                });
                continue;
            }

            let parsed = self.load_file(&path);
            loaded.push_parsed(path, parsed);
        }

        Ok(())
    }

    /// Parse a single YAML file into a [`RuleDocument`].
    pub fn load_file(&self, path: &Path) -> Result<RuleDocument> {
        let contents = fs::read_to_string(path)?;
        parse_document(&contents, &path.display().to_string())
    }

    /// Start a filesystem watcher with 500ms polling.
    ///
    /// Any YAML create/modify/remove rebuilds the whole catalog from this
    /// directory and swaps it into `handle`. A rebuild that fails is logged
    /// and the previous catalog stays active.
    pub fn watch(&mut self, handle: Arc<CatalogHandle>) -> Result<()> {
        let mut watcher = notify::recommended_watcher(move |res: std::result::Result<notify::Event, notify::Error>| {
            match res {
                Ok(event) => handle_fs_event(&event, &handle),
                Err(e) => warn!(error = %e, "filesystem watcher error"),
            }
        })?;

        watcher.watch(&self.rules_dir, RecursiveMode::Recursive)?;

        let _ = watcher.configure(notify::Config::default().with_poll_interval(Duration::from_millis(500)));

        info!(path = %self.rules_dir.display(), "watching rules directory for changes (recursive)");
        self._watcher = Some(watcher);
        Ok(())
    }

    /// Get the rules directory path.
    pub fn rules_dir(&self) -> &Path {
        &self.rules_dir
    }
}

pub(super) fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "yml" || e == "yaml")
        .unwrap_or(false)
}
