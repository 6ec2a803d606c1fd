//! URL rewriting for exported JSON documents.
//!
//! The export tool leaves absolute file URLs inside the exported JSON
//! documents. When the export directory is served locally (for re-import
//! into another tool), those URLs must point at the local copies instead.
//! This module walks an export directory, maps original attachment names to
//! their extracted on-disk paths, and rewrites every URL field of each file
//! object to the local base URL.
//!
//! The walk over the documents is a generic visitor over dynamically-shaped
//! JSON; it is independent of the typed [`Record`](crate::model::Record)
//! model, because the rewritten documents are the per-channel exports, not
//! the record log.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde_json::Value;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::{LensError, Result};

/// File-object fields that carry rewritable URLs.
pub const URL_KEYS: &[&str] = &[
    "url_private",
    "thumb_64",
    "url_private_download",
    "thumb_80",
    "thumb_160",
    "thumb_360",
    "thumb_360_gif",
    "permalink",
    "permalink_public",
    "thumb_480",
    "thumb_720",
    "thumb_960",
    "thumb_1024",
];

/// Default base URL for the local attachment server.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Counters collected during a rewrite pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct RewriteStats {
    /// File objects whose attachment was found and rewritten.
    pub files_found: u64,
    /// File objects with no matching attachment on disk.
    pub files_not_found: u64,
    /// Individual URL fields replaced.
    pub urls_replaced: u64,
    /// JSON documents written back.
    pub documents_updated: u64,
    /// Distinct attachment names that could not be matched.
    pub missing_names: BTreeSet<String>,
}

/// Rewrites file URLs in exported JSON documents under a directory.
#[derive(Debug, Clone)]
pub struct UrlRewriter {
    base_url: String,
    dry_run: bool,
}

impl UrlRewriter {
    /// Create a rewriter targeting the given base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            dry_run: false,
        }
    }

    /// Report what would change without writing any document back.
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Rewrite every JSON document under `root`, returning the counters.
    ///
    /// Documents that fail to parse as JSON are skipped: the directory may
    /// contain unrelated files, and skipping matches the behavior existing
    /// exports rely on.
    pub fn run(&self, root: impl AsRef<Path>) -> Result<RewriteStats> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(LensError::FileNotFound {
                path: root.to_path_buf(),
            });
        }

        let attachments = attachment_map(root)?;
        debug!(attachments = attachments.len(), "built attachment map");

        let mut stats = RewriteStats::default();
        for entry in WalkDir::new(root).into_iter().filter_map(std::result::Result::ok) {
            let path = entry.path();
            if !entry.file_type().is_file() || path.extension().map_or(true, |e| e != "json") {
                continue;
            }

            let content = std::fs::read_to_string(path)
                .map_err(|e| LensError::io(format!("Failed to read {}", path.display()), e))?;
            let mut doc: Value = match serde_json::from_str(&content) {
                Ok(doc) => doc,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping non-JSON document");
                    continue;
                }
            };

            let replaced_before = stats.urls_replaced;
            self.rewrite_value(&mut doc, &attachments, &mut stats);
            if stats.urls_replaced == replaced_before {
                continue;
            }

            if !self.dry_run {
                let rendered = serde_json::to_string_pretty(&doc).map_err(|e| {
                    LensError::SerializationError {
                        context: format!("Failed to render {}", path.display()),
                        source: e,
                    }
                })?;
                std::fs::write(path, rendered)
                    .map_err(|e| LensError::io(format!("Failed to write {}", path.display()), e))?;
            }
            stats.documents_updated += 1;
            info!(path = %path.display(), "updated document");
        }

        Ok(stats)
    }

    /// Recursive visitor over a JSON document.
    ///
    /// An object carrying both `name` and `url_private` is a file object
    /// and gets its URL fields rewritten; any other object or array is
    /// descended into.
    fn rewrite_value(
        &self,
        value: &mut Value,
        attachments: &BTreeMap<String, String>,
        stats: &mut RewriteStats,
    ) {
        match value {
            Value::Object(map) => {
                let name = map.get("name").and_then(Value::as_str).map(str::to_owned);
                if let (Some(name), true) = (name, map.contains_key("url_private")) {
                    match attachments.get(&name) {
                        Some(rel_path) => {
                            stats.files_found += 1;
                            let new_url = format!("{}/{}", self.base_url, rel_path);
                            for key in URL_KEYS {
                                if let Some(url) = map.get_mut(*key) {
                                    // Only non-empty string URLs are replaced.
                                    if url.as_str().is_some_and(|s| !s.is_empty()) {
                                        *url = Value::String(new_url.clone());
                                        stats.urls_replaced += 1;
                                    }
                                }
                            }
                        }
                        None => {
                            stats.files_not_found += 1;
                            stats.missing_names.insert(name);
                        }
                    }
                } else {
                    for nested in map.values_mut() {
                        if nested.is_object() || nested.is_array() {
                            self.rewrite_value(nested, attachments, stats);
                        }
                    }
                }
            }
            Value::Array(items) => {
                for item in items {
                    self.rewrite_value(item, attachments, stats);
                }
            }
            _ => {}
        }
    }
}

/// Map original attachment names to their paths relative to `root`.
///
/// Extracted attachments are stored as `<id>-<original name>`; both the
/// original name and a sanitized variant map to the same path, because the
/// documents may reference either form.
fn attachment_map(root: &Path) -> Result<BTreeMap<String, String>> {
    let mut map = BTreeMap::new();
    for entry in WalkDir::new(root).into_iter().filter_map(std::result::Result::ok) {
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().is_none() {
            continue;
        }
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some((_, original)) = file_name.split_once('-') else {
            continue;
        };
        let rel_path = path
            .strip_prefix(root)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/");
        map.insert(sanitize(original), rel_path.clone());
        map.insert(original.to_string(), rel_path);
    }
    Ok(map)
}

/// Replace characters outside `[A-Za-z0-9._-]` with underscores.
fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("report v2.pdf"), "report_v2.pdf");
        assert_eq!(sanitize("plain-name_1.png"), "plain-name_1.png");
    }

    #[test]
    fn test_rewrites_file_object_urls() {
        let mut attachments = BTreeMap::new();
        attachments.insert("pic.png".to_string(), "attachments/F1-pic.png".to_string());

        let mut doc = json!({
            "messages": [{
                "files": [{
                    "name": "pic.png",
                    "url_private": "https://example.com/orig",
                    "thumb_64": "https://example.com/thumb",
                    "thumb_80": "",
                }]
            }]
        });

        let rewriter = UrlRewriter::new("http://127.0.0.1:8000/");
        let mut stats = RewriteStats::default();
        rewriter.rewrite_value(&mut doc, &attachments, &mut stats);

        assert_eq!(stats.files_found, 1);
        // Empty thumb_80 stays untouched.
        assert_eq!(stats.urls_replaced, 2);
        let file = &doc["messages"][0]["files"][0];
        assert_eq!(
            file["url_private"],
            "http://127.0.0.1:8000/attachments/F1-pic.png"
        );
        assert_eq!(file["thumb_80"], "");
    }

    #[test]
    fn test_unmatched_file_recorded() {
        let attachments = BTreeMap::new();
        let mut doc = json!({
            "name": "gone.png",
            "url_private": "https://example.com/orig",
        });

        let rewriter = UrlRewriter::new(DEFAULT_BASE_URL);
        let mut stats = RewriteStats::default();
        rewriter.rewrite_value(&mut doc, &attachments, &mut stats);

        assert_eq!(stats.files_found, 0);
        assert_eq!(stats.files_not_found, 1);
        assert!(stats.missing_names.contains("gone.png"));
        assert_eq!(doc["url_private"], "https://example.com/orig");
    }

    #[test]
    fn test_end_to_end_directory() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();

        std::fs::create_dir(root.join("attachments")).unwrap();
        std::fs::write(root.join("attachments/F1-pic.png"), b"png").unwrap();
        std::fs::write(
            root.join("chan.json"),
            serde_json::to_string(&json!([{
                "ts": "1.0",
                "files": [{"name": "pic.png", "url_private": "https://example.com/x"}]
            }]))
            .unwrap(),
        )
        .unwrap();

        let stats = UrlRewriter::new(DEFAULT_BASE_URL).run(root).unwrap();
        assert_eq!(stats.files_found, 1);
        assert_eq!(stats.urls_replaced, 1);
        assert_eq!(stats.documents_updated, 1);

        let updated: Value =
            serde_json::from_str(&std::fs::read_to_string(root.join("chan.json")).unwrap())
                .unwrap();
        assert_eq!(
            updated[0]["files"][0]["url_private"],
            format!("{DEFAULT_BASE_URL}/attachments/F1-pic.png")
        );
    }

    #[test]
    fn test_dry_run_leaves_documents_alone() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();

        std::fs::write(root.join("F1-pic.png"), b"png").unwrap();
        let original = serde_json::to_string(&json!({
            "name": "pic.png",
            "url_private": "https://example.com/x"
        }))
        .unwrap();
        std::fs::write(root.join("chan.json"), &original).unwrap();

        let stats = UrlRewriter::new(DEFAULT_BASE_URL)
            .with_dry_run(true)
            .run(root)
            .unwrap();
        assert_eq!(stats.urls_replaced, 1);
        assert_eq!(stats.documents_updated, 1);
        assert_eq!(
            std::fs::read_to_string(root.join("chan.json")).unwrap(),
            original
        );
    }
}
