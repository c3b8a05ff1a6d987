use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};

use crate::lsp::document::DocumentState;
use crate::lsp::handlers::{HandleDiagnostics, HandleHover};
use crate::rules::RuleTables;
use crate::Config;

/// The main LSP backend that holds state and implements the Language Server Protocol
pub struct Backend {
    pub client: Client,
    pub rules: Arc<RuleTables>,
    pub documents: Arc<Mutex<HashMap<Url, DocumentState>>>,
    pub config: Config,
}

impl Backend {
    pub fn new(client: Client, config: Config, rules: RuleTables) -> Self {
        Self {
            client,
            rules: Arc::new(rules),
            documents: Arc::new(Mutex::new(HashMap::new())),
            config,
        }
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(
        &self,
        _: InitializeParams,
    ) -> tower_lsp::jsonrpc::Result<InitializeResult> {
        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                hover_provider: Some(HoverProviderCapability::Simple(true)),
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "htmlcheck-ls".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        self.client
            .log_message(
                MessageType::INFO,
                format!("htmlcheck-ls initialized with rule set '{}'", self.rules.name()),
            )
            .await;
    }

    async fn shutdown(&self) -> tower_lsp::jsonrpc::Result<()> {
        Ok(())
    }

    async fn hover(&self, params: HoverParams) -> tower_lsp::jsonrpc::Result<Option<Hover>> {
        self.handle_hover(params).await
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let uri = params.text_document.uri;
        let doc_state = self.create_document_state(params.text_document.text).await;

        let mut docs = self.documents.lock().await;
        docs.insert(uri.clone(), doc_state);
        drop(docs); // Release the lock before calling publish_diagnostics

        self.publish_diagnostics(uri).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        if let Some(change) = params.content_changes.into_iter().last() {
            let doc_state = self.create_document_state(change.text).await;

            let mut docs = self.documents.lock().await;
            docs.insert(uri.clone(), doc_state);
            drop(docs);

            self.publish_diagnostics(uri).await;
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        self.documents.lock().await.remove(&uri);
        self.clear_diagnostics(uri).await;
    }
}
