//
// state.rs
//
// Copyright (C) 2026 Jonathan Marc Bearak
//
// Server-side world state: open documents, the registry, the host-supplied
// value lists and the active configuration.
//

use std::collections::{HashMap, HashSet};

use ropey::Rope;
use tower_lsp::lsp_types::{Position, TextDocumentContentChangeEvent, Url};

use crate::catalog::load_catalog_paths;
use crate::config::EngineConfig;
use crate::parameter_resolver::ValueLists;
use crate::source_help::SourceHelp;
use crate::utf16::utf16_column_to_char_offset;

/// An open document
pub struct Document {
    pub contents: Rope,
    pub version: Option<i32>,
}

impl Document {
    pub fn new(text: &str, version: Option<i32>) -> Self {
        Self {
            contents: Rope::from_str(text),
            version,
        }
    }

    pub fn apply_change(&mut self, change: TextDocumentContentChangeEvent) {
        if let Some(range) = change.range {
            let Some(start_idx) = self.char_index(range.start) else {
                log::warn!("Ignoring change with out-of-range start {:?}", range.start);
                return;
            };
            let end_idx = self
                .char_index(range.end)
                .unwrap_or_else(|| self.contents.len_chars())
                .max(start_idx);

            self.contents.remove(start_idx..end_idx);
            self.contents.insert(start_idx, &change.text);
        } else {
            // Full document sync
            self.contents = Rope::from_str(&change.text);
        }
    }

    pub fn text(&self) -> String {
        self.contents.to_string()
    }

    /// Text of `line` without its line terminator.
    fn line_text(&self, line: usize) -> String {
        let text = self.contents.line(line).to_string();
        text.trim_end_matches(|c: char| c == '\n' || c == '\r').to_string()
    }

    /// Char index of an LSP position. A position one line past the last line
    /// maps to the end of the document.
    fn char_index(&self, position: Position) -> Option<usize> {
        let line = position.line as usize;
        if line >= self.contents.len_lines() {
            return (line == self.contents.len_lines()).then(|| self.contents.len_chars());
        }
        let col = utf16_column_to_char_offset(&self.line_text(line), position.character);
        Some(self.contents.line_to_char(line) + col)
    }

    /// The cursor line up to the cursor, preceded by up to `context_lines - 1`
    /// earlier lines, joined with `\n`. `None` if the position is outside the
    /// document.
    pub fn trailing_window(&self, position: Position, context_lines: usize) -> Option<String> {
        let line = position.line as usize;
        if line >= self.contents.len_lines() {
            return None;
        }

        let cursor_line = self.line_text(line);
        let col = utf16_column_to_char_offset(&cursor_line, position.character);
        let prefix: String = cursor_line.chars().take(col).collect();

        let first = line.saturating_sub(context_lines.saturating_sub(1));
        let mut parts: Vec<String> = (first..line).map(|l| self.line_text(l)).collect();
        parts.push(prefix);
        Some(parts.join("\n"))
    }

    /// Like [`Self::trailing_window`], but extended to the end of the word
    /// under the cursor so hovering in the middle of a name sees all of it.
    pub fn window_through_word(&self, position: Position, context_lines: usize) -> Option<String> {
        let mut window = self.trailing_window(position, context_lines)?;
        let cursor_line = self.line_text(position.line as usize);
        let col = utf16_column_to_char_offset(&cursor_line, position.character);
        window.extend(
            cursor_line
                .chars()
                .skip(col)
                .take_while(|c| c.is_ascii_alphanumeric() || *c == '_'),
        );
        Some(window)
    }
}

/// Everything the language server knows.
pub struct WorldState {
    pub documents: HashMap<Url, Document>,
    pub source_help: SourceHelp,
    pub value_lists: ValueLists,
    pub config: EngineConfig,
    /// Origins registered from catalogs, cleared before a catalog reload
    catalog_origins: HashSet<String>,
}

impl WorldState {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            documents: HashMap::new(),
            source_help: SourceHelp::new(config.keywords.clone()),
            value_lists: ValueLists::new(),
            config,
            catalog_origins: HashSet::new(),
        }
    }

    pub fn open_document(&mut self, uri: Url, text: &str, version: Option<i32>) {
        self.documents.insert(uri, Document::new(text, version));
    }

    pub fn apply_change(&mut self, uri: &Url, change: TextDocumentContentChangeEvent) {
        if let Some(doc) = self.documents.get_mut(uri) {
            doc.apply_change(change);
        }
    }

    pub fn close_document(&mut self, uri: &Url) {
        self.documents.remove(uri);
    }

    pub fn get_document(&self, uri: &Url) -> Option<&Document> {
        self.documents.get(uri)
    }

    /// Drop everything previously loaded from catalogs and load the
    /// configured ones again. User modules are untouched.
    pub fn reload_catalogs(&mut self) {
        for origin in self.catalog_origins.drain() {
            self.source_help.clear_by_origin(&origin);
            self.source_help.clear_constants_by_origin(&origin);
        }
        self.source_help.set_keywords(self.config.keywords.clone());

        let loaded = load_catalog_paths(&self.config.catalog_paths, &mut self.source_help);
        self.catalog_origins = loaded.into_iter().map(|s| s.origin).collect();
        log::info!(
            "Registry holds {} functions after catalog load",
            self.source_help.function_count()
        );
    }

    /// Replace the configuration, reloading catalogs if they are affected.
    pub fn apply_config(&mut self, config: EngineConfig) {
        let reload = self.config.registry_settings_changed(&config);
        self.config = config;
        if reload {
            self.reload_catalogs();
        }
    }
}
