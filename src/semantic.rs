//! Semantic provider seam.
//!
//! Everything compiler-grade lives behind this trait: project loading,
//! symbol resolution, reference search, diagnostics. The server treats
//! an implementation purely as an optional oracle. It may be absent, it
//! may fail to load, it may return nothing for any query, and every
//! feature handler must degrade to the heuristic engine in all three
//! cases.

use std::path::Path;

use async_trait::async_trait;
use tower_lsp::lsp_types::{Diagnostic, Location, Position, Url};

/// A symbol the semantic provider resolved at a cursor position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemanticSymbol {
    pub name: String,
    /// Where the symbol is declared, when the provider knows.
    pub declaration: Option<Location>,
}

#[async_trait]
pub trait SemanticProvider: Send + Sync {
    /// Load (or reload) the project model under `root`. `Ok(false)`
    /// means the workspace came up unusable; `Err` means loading itself
    /// failed. Must be safe to call repeatedly.
    async fn try_load_workspace(&self, root: &Path) -> anyhow::Result<bool>;

    /// Push the live buffer text for `uri` into the provider's view so
    /// queries see unsaved edits.
    async fn apply_live_text(&self, uri: &Url, text: &str);

    async fn resolve_symbol_at(
        &self,
        uri: &Url,
        position: Position,
        text: &str,
    ) -> Option<SemanticSymbol>;

    async fn find_definition(&self, symbol: &SemanticSymbol) -> Option<Location>;

    async fn find_references(
        &self,
        symbol: &SemanticSymbol,
        include_declaration: bool,
    ) -> Vec<Location>;

    /// `None` means the provider has nothing to say about `uri`, as
    /// opposed to `Some(vec![])` which clears previously published
    /// diagnostics.
    async fn diagnostics(&self, uri: &Url, text: &str) -> Option<Vec<Diagnostic>>;
}
