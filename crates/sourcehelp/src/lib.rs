// lib.rs
//
// Completion and signature-help engine for a small scripting language.
// The binary in main.rs serves it over LSP; benches/ and tests/ drive the
// engine directly.

pub mod backend;
pub mod catalog;
pub mod completion_context;
pub mod config;
pub mod doc_comment;
pub mod error;
pub mod flatten;
pub mod handlers;
pub mod module_parser;
pub mod parameter_resolver;
pub mod reserved_words;
pub mod source_help;
pub mod state;
pub mod utf16;
