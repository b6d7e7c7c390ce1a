//
// config.rs
//
// Copyright (C) 2026 Jonathan Marc Bearak
//
// Engine configuration and its parsing from LSP settings.
//

use std::path::PathBuf;

use crate::reserved_words::default_keywords;

/// Settings that shape how the engine reads the editor's text and what it
/// loads into the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Line comment marker of the expression language
    pub comment_marker: String,
    /// Lines in the trailing window: the cursor line plus this many minus one
    /// preceding lines
    pub context_lines: usize,
    /// Keywords offered by global completion
    pub keywords: Vec<String>,
    /// Catalog files or directories of catalogs for built-in modules
    pub catalog_paths: Vec<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            comment_marker: "//".to_string(),
            context_lines: 5,
            keywords: default_keywords(),
            catalog_paths: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// True if switching to `other` requires rebuilding the built-in part of
    /// the registry.
    pub fn registry_settings_changed(&self, other: &Self) -> bool {
        self.catalog_paths != other.catalog_paths || self.keywords != other.keywords
    }
}

/// Parse engine configuration from LSP settings.
///
/// Reads the top-level `sourceHelp` section. Fields that are absent or
/// invalid keep their defaults; `None` if the section is missing.
///
/// ```
/// use serde_json::json;
/// use sourcehelp::config::parse_engine_config;
///
/// let settings = json!({
///     "sourceHelp": {
///         "commentMarker": "--",
///         "contextLines": 3,
///         "catalogPaths": ["/opt/catalogs"]
///     }
/// });
/// let cfg = parse_engine_config(&settings).unwrap();
/// assert_eq!(cfg.comment_marker, "--");
/// assert_eq!(cfg.context_lines, 3);
/// assert_eq!(cfg.catalog_paths.len(), 1);
/// ```
pub fn parse_engine_config(settings: &serde_json::Value) -> Option<EngineConfig> {
    let section = settings.get("sourceHelp")?;
    let mut config = EngineConfig::default();

    if let Some(marker) = section.get("commentMarker").and_then(|v| v.as_str()) {
        if marker.is_empty() {
            log::warn!(
                "Ignoring empty commentMarker, keeping {:?}",
                config.comment_marker
            );
        } else {
            config.comment_marker = marker.to_string();
        }
    }
    if let Some(v) = section.get("contextLines").and_then(|v| v.as_u64()) {
        config.context_lines = (v as usize).max(1);
    }
    if let Some(words) = section.get("keywords").and_then(|v| v.as_array()) {
        config.keywords = words
            .iter()
            .filter_map(|w| w.as_str())
            .filter(|w| !w.is_empty())
            .map(str::to_string)
            .collect();
    }
    if let Some(paths) = section.get("catalogPaths").and_then(|v| v.as_array()) {
        config.catalog_paths = paths
            .iter()
            .filter_map(|p| p.as_str())
            .filter(|s| !s.is_empty() && !s.contains('\0'))
            .map(PathBuf::from)
            .collect();
    }

    Some(config)
}
