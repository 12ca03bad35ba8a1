//! The tower-lsp backend: session state and protocol dispatch.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::{
    CodeLens, CodeLensOptions, CodeLensParams, CompletionOptions, CompletionParams,
    CompletionResponse, DidChangeTextDocumentParams, DidCloseTextDocumentParams,
    DidOpenTextDocumentParams, DocumentHighlight, DocumentHighlightParams, DocumentSymbolParams,
    DocumentSymbolResponse, FoldingRange, FoldingRangeParams, FoldingRangeProviderCapability,
    GotoDefinitionParams, GotoDefinitionResponse, InitializeParams, InitializeResult,
    InitializedParams, Location, MessageType, OneOf, ReferenceParams, RenameParams,
    ServerCapabilities, ServerInfo, TextDocumentSyncCapability, TextDocumentSyncKind, Url,
    WorkspaceEdit,
};
use tower_lsp::{Client, LanguageServer};
use tracing::{debug, info, warn};

use crate::document::DocumentStore;
use crate::lsp::features;
use crate::semantic::SemanticProvider;
use crate::workspace;

pub struct VbBackend {
    client: Client,
    documents: Arc<DocumentStore>,
    semantic: Option<Arc<dyn SemanticProvider>>,
    workspace_root: RwLock<Option<PathBuf>>,
    // Keeps concurrent initialize/reload requests from loading the same
    // workspace twice.
    load_gate: Arc<Mutex<()>>,
}

impl VbBackend {
    pub fn new(client: Client, semantic: Option<Arc<dyn SemanticProvider>>) -> Self {
        Self {
            client,
            documents: Arc::new(DocumentStore::new()),
            semantic,
            workspace_root: RwLock::new(None),
            load_gate: Arc::new(Mutex::new(())),
        }
    }

    /// Kick off workspace discovery and loading without blocking the
    /// initialize response; the client would time out waiting on a
    /// large project.
    fn spawn_workspace_load(&self, root: PathBuf) {
        let provider = self.semantic.clone();
        let gate = self.load_gate.clone();
        let client = self.client.clone();
        tokio::spawn(async move {
            let projects = workspace::project_files(&root);
            info!(
                root = %root.display(),
                projects = projects.len(),
                mode = if projects.is_empty() { "single-file" } else { "project" },
                "workspace discovered"
            );
            let Some(provider) = provider else {
                info!("no semantic provider, staying heuristic-only");
                return;
            };
            let _in_flight = gate.lock().await;
            let message = match provider.try_load_workspace(&root).await {
                Ok(true) => format!("Workspace loaded: {}", root.display()),
                Ok(false) => format!(
                    "Workspace unusable, falling back to text analysis: {}",
                    root.display()
                ),
                Err(e) => {
                    warn!(error = %e, "workspace load failed");
                    format!("Workspace load failed, falling back to text analysis: {e}")
                }
            };
            client.log_message(MessageType::INFO, message).await;
        });
    }

    fn spawn_diagnostics(&self, uri: Url, version: Option<i32>) {
        let Some(provider) = self.semantic.clone() else {
            return;
        };
        let documents = self.documents.clone();
        let client = self.client.clone();
        tokio::spawn(async move {
            let Some(text) = documents.text(&uri) else {
                return;
            };
            provider.apply_live_text(&uri, &text).await;
            if let Some(diagnostics) = provider.diagnostics(&uri, &text).await {
                client.publish_diagnostics(uri, diagnostics, version).await;
            }
        });
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for VbBackend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        if let Some(root) = workspace::root_from_initialize(&params) {
            info!(root = %root.display(), "initialize");
            *self.workspace_root.write().await = Some(root.clone());
            self.spawn_workspace_load(root);
        } else {
            info!("initialize without a workspace root, single-file mode");
        }

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                definition_provider: Some(OneOf::Left(true)),
                references_provider: Some(OneOf::Left(true)),
                completion_provider: Some(CompletionOptions {
                    trigger_characters: Some(vec![".".to_string(), " ".to_string()]),
                    ..Default::default()
                }),
                code_lens_provider: Some(CodeLensOptions {
                    resolve_provider: Some(false),
                }),
                rename_provider: Some(OneOf::Left(true)),
                document_symbol_provider: Some(OneOf::Left(true)),
                folding_range_provider: Some(FoldingRangeProviderCapability::Simple(true)),
                document_highlight_provider: Some(OneOf::Left(true)),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _params: InitializedParams) {
        self.client
            .log_message(MessageType::INFO, "VB language server ready")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        info!("shutdown");
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let doc = params.text_document;
        debug!(uri = %doc.uri, version = doc.version, "did_open");
        self.documents.upsert(&doc.uri, &doc.text);
        self.spawn_diagnostics(doc.uri, Some(doc.version));
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        let version = params.text_document.version;
        // Full sync: one change event carrying the whole document.
        match params.content_changes.into_iter().next() {
            Some(change) => {
                debug!(uri = %uri, version, "did_change");
                self.documents.upsert(&uri, &change.text);
                self.spawn_diagnostics(uri, Some(version));
            }
            None => warn!(uri = %uri, version, "did_change without content"),
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        debug!(uri = %uri, "did_close");
        self.documents.remove(&uri);
        self.client.publish_diagnostics(uri, Vec::new(), None).await;
    }

    async fn goto_definition(
        &self,
        params: GotoDefinitionParams,
    ) -> Result<Option<GotoDefinitionResponse>> {
        let root = self.workspace_root.read().await.clone();
        Ok(features::definition::handle(
            &self.documents,
            self.semantic.as_deref(),
            root.as_deref(),
            &params,
        )
        .await)
    }

    async fn references(&self, params: ReferenceParams) -> Result<Option<Vec<Location>>> {
        Ok(Some(
            features::references::handle(&self.documents, self.semantic.as_deref(), &params).await,
        ))
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        Ok(Some(features::completion::handle(&self.documents, &params)))
    }

    async fn code_lens(&self, params: CodeLensParams) -> Result<Option<Vec<CodeLens>>> {
        Ok(Some(features::code_lens::handle(&self.documents, &params)))
    }

    async fn rename(&self, params: RenameParams) -> Result<Option<WorkspaceEdit>> {
        features::rename::handle(&self.documents, &params)
    }

    async fn document_symbol(
        &self,
        params: DocumentSymbolParams,
    ) -> Result<Option<DocumentSymbolResponse>> {
        Ok(features::document_symbols::handle(&self.documents, &params))
    }

    async fn folding_range(&self, params: FoldingRangeParams) -> Result<Option<Vec<FoldingRange>>> {
        Ok(Some(features::folding::handle(&self.documents, &params)))
    }

    async fn document_highlight(
        &self,
        params: DocumentHighlightParams,
    ) -> Result<Option<Vec<DocumentHighlight>>> {
        Ok(Some(features::highlight::handle(&self.documents, &params)))
    }
}
