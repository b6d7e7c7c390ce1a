//
// backend.rs
//
// Copyright (C) 2026 Jonathan Marc Bearak
//
// Language server hosting the engine over stdio.
//

use std::sync::Arc;

use serde::Deserialize;
use tokio::sync::RwLock;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::Client;
use tower_lsp::LanguageServer;
use tower_lsp::LspService;
use tower_lsp::Server;

use crate::config::{parse_engine_config, EngineConfig};
use crate::handlers;
use crate::module_parser::{register_user_module, user_origin};
use crate::parameter_resolver::ValueLists;
use crate::source_help::{self, CompletionKind};
use crate::state::WorldState;

/// Parameters for the sourceHelp/valueLists notification
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ValueListsParams {
    lists: ValueLists,
}

/// Parameters for the sourceHelp/moduleSource notification
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModuleSourceParams {
    module_name: String,
    source: String,
}

/// Parameters for the sourceHelp/moduleRemoved notification
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModuleRemovedParams {
    module_name: String,
}

fn completion_item_kind(kind: CompletionKind) -> CompletionItemKind {
    match kind {
        CompletionKind::Function => CompletionItemKind::FUNCTION,
        CompletionKind::Constant => CompletionItemKind::CONSTANT,
        CompletionKind::Module => CompletionItemKind::MODULE,
        CompletionKind::Keyword => CompletionItemKind::KEYWORD,
        CompletionKind::EnumMember => CompletionItemKind::ENUM_MEMBER,
    }
}

fn markdown(value: String) -> Documentation {
    Documentation::MarkupContent(MarkupContent {
        kind: MarkupKind::Markdown,
        value,
    })
}

fn to_lsp_completion(item: source_help::CompletionItem) -> CompletionItem {
    CompletionItem {
        label: item.label,
        kind: Some(completion_item_kind(item.kind)),
        documentation: item.doc.map(markdown),
        insert_text: Some(item.insert_text),
        ..Default::default()
    }
}

/// Map engine signature help to LSP. The active parameter is clamped to the
/// last declared one when more arguments were typed than declared.
fn to_lsp_signature_help(sig: source_help::SignatureHelp) -> SignatureHelp {
    let parameters: Vec<ParameterInformation> = sig
        .params
        .into_iter()
        .map(|(name, doc)| ParameterInformation {
            label: ParameterLabel::Simple(name),
            documentation: if doc.is_empty() {
                None
            } else {
                Some(Documentation::String(doc))
            },
        })
        .collect();

    let active_parameter = if parameters.is_empty() {
        None
    } else {
        Some(sig.active_param_index.min(parameters.len() - 1) as u32)
    };

    SignatureHelp {
        signatures: vec![SignatureInformation {
            label: sig.signature,
            documentation: if sig.func_doc.is_empty() {
                None
            } else {
                Some(markdown(sig.func_doc))
            },
            parameters: Some(parameters),
            active_parameter,
        }],
        active_signature: Some(0),
        active_parameter,
    }
}

pub struct Backend {
    client: Client,
    state: Arc<RwLock<WorldState>>,
}

impl Backend {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            state: Arc::new(RwLock::new(WorldState::new(EngineConfig::default()))),
        }
    }

    /// Handle the sourceHelp/valueLists notification
    async fn handle_value_lists(&self, params: ValueListsParams) {
        log::trace!("Received {} value lists", params.lists.len());
        let mut state = self.state.write().await;
        state.value_lists = params.lists;
    }

    /// Handle the sourceHelp/moduleSource notification
    async fn handle_module_source(&self, params: ModuleSourceParams) {
        let mut state = self.state.write().await;
        let marker = state.config.comment_marker.clone();
        if let Err(e) = register_user_module(
            &mut state.source_help,
            &params.module_name,
            &params.source,
            &marker,
        ) {
            log::warn!("Failed to register module {}: {:#}", params.module_name, e);
        }
    }

    /// Handle the sourceHelp/moduleRemoved notification
    async fn handle_module_removed(&self, params: ModuleRemovedParams) {
        let origin = user_origin(&params.module_name);
        let mut state = self.state.write().await;
        state.source_help.clear_by_origin(&origin);
        state.source_help.clear_constants_by_origin(&origin);
        log::info!("Removed user module {}", params.module_name);
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        log::info!("Initializing sourcehelp");

        if let Some(config) = params
            .initialization_options
            .as_ref()
            .and_then(parse_engine_config)
        {
            self.state.write().await.config = config;
        }

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::INCREMENTAL,
                )),
                completion_provider: Some(CompletionOptions {
                    trigger_characters: Some(vec![
                        String::from("."),
                        String::from("\""),
                        String::from("'"),
                    ]),
                    ..Default::default()
                }),
                hover_provider: Some(HoverProviderCapability::Simple(true)),
                signature_help_provider: Some(SignatureHelpOptions {
                    trigger_characters: Some(vec![String::from("("), String::from(",")]),
                    ..Default::default()
                }),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: String::from("sourcehelp"),
                version: Some(String::from(env!("CARGO_PKG_VERSION"))),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        let count = {
            let mut state = self.state.write().await;
            state.reload_catalogs();
            state.source_help.function_count()
        };
        self.client
            .log_message(
                MessageType::INFO,
                format!("sourcehelp initialized with {} functions", count),
            )
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        log::info!("sourcehelp shutting down");
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let doc = params.text_document;
        let mut state = self.state.write().await;
        state.open_document(doc.uri, &doc.text, Some(doc.version));
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        let mut state = self.state.write().await;
        if let Some(doc) = state.documents.get_mut(&uri) {
            doc.version = Some(params.text_document.version);
        }
        for change in params.content_changes {
            state.apply_change(&uri, change);
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let mut state = self.state.write().await;
        state.close_document(&params.text_document.uri);
    }

    async fn did_change_configuration(&self, params: DidChangeConfigurationParams) {
        log::trace!("Configuration changed");
        match parse_engine_config(&params.settings) {
            Some(config) => self.state.write().await.apply_config(config),
            None => log::warn!("No sourceHelp section in settings, keeping current configuration"),
        }
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let state = self.state.read().await;
        let position = params.text_document_position.position;
        let Some(window) = state
            .get_document(&params.text_document_position.text_document.uri)
            .and_then(|doc| doc.trailing_window(position, state.config.context_lines))
        else {
            return Ok(None);
        };

        match handlers::completion(
            &state.source_help,
            &window,
            &state.config.comment_marker,
            &state.value_lists,
        ) {
            Ok(items) => Ok(Some(CompletionResponse::Array(
                items.into_iter().map(to_lsp_completion).collect(),
            ))),
            Err(e) => {
                log::warn!("Completion failed: {}", e);
                Ok(None)
            }
        }
    }

    async fn signature_help(&self, params: SignatureHelpParams) -> Result<Option<SignatureHelp>> {
        let state = self.state.read().await;
        let position = params.text_document_position_params.position;
        let Some(window) = state
            .get_document(&params.text_document_position_params.text_document.uri)
            .and_then(|doc| doc.trailing_window(position, state.config.context_lines))
        else {
            return Ok(None);
        };

        match handlers::signature_help(
            &state.source_help,
            &window,
            &state.config.comment_marker,
            &state.value_lists,
        ) {
            Ok(sig) => Ok(sig.map(to_lsp_signature_help)),
            Err(e) => {
                log::warn!("Signature help failed: {}", e);
                Ok(None)
            }
        }
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        let state = self.state.read().await;
        let position = params.text_document_position_params.position;
        let Some(window) = state
            .get_document(&params.text_document_position_params.text_document.uri)
            .and_then(|doc| doc.window_through_word(position, state.config.context_lines))
        else {
            return Ok(None);
        };

        match handlers::hover(&state.source_help, &window, &state.config.comment_marker) {
            Ok(text) => Ok(text.map(|value| Hover {
                contents: HoverContents::Markup(MarkupContent {
                    kind: MarkupKind::Markdown,
                    value,
                }),
                range: None,
            })),
            Err(e) => {
                log::warn!("Hover failed: {}", e);
                Ok(None)
            }
        }
    }
}

pub async fn start_lsp() -> anyhow::Result<()> {
    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::build(Backend::new)
        .custom_method("sourceHelp/valueLists", Backend::handle_value_lists)
        .custom_method("sourceHelp/moduleSource", Backend::handle_module_source)
        .custom_method("sourceHelp/moduleRemoved", Backend::handle_module_removed)
        .finish();
    Server::new(stdin, stdout, socket).serve(service).await;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sig(params: &[&str], active: usize) -> source_help::SignatureHelp {
        source_help::SignatureHelp {
            signature: format!("f({})", params.join(", ")),
            func_name: "f".to_string(),
            func_doc: String::new(),
            params: params
                .iter()
                .map(|p| (p.to_string(), String::new()))
                .collect(),
            active_param_index: active,
            active_param_possible_values: Vec::new(),
        }
    }

    #[test]
    fn test_active_parameter_clamped() {
        let lsp = to_lsp_signature_help(sig(&["a", "b"], 5));
        assert_eq!(lsp.active_parameter, Some(1));
        assert_eq!(lsp.signatures[0].label, "f(a, b)");
        assert!(lsp.signatures[0].documentation.is_none());
    }

    #[test]
    fn test_zero_params_has_no_active_parameter() {
        let lsp = to_lsp_signature_help(sig(&[], 0));
        assert_eq!(lsp.active_parameter, None);
        assert_eq!(lsp.signatures[0].parameters.as_ref().map(Vec::len), Some(0));
    }

    #[test]
    fn test_completion_kind_mapping() {
        let item = to_lsp_completion(source_help::CompletionItem {
            label: "%".to_string(),
            doc: None,
            insert_text: "\"%\"".to_string(),
            kind: CompletionKind::EnumMember,
        });
        assert_eq!(item.kind, Some(CompletionItemKind::ENUM_MEMBER));
        assert_eq!(item.insert_text.as_deref(), Some("\"%\""));
        assert!(item.documentation.is_none());
    }
}
