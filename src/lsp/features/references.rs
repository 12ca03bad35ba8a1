//! `textDocument/references`.
//!
//! Semantic results win outright when the provider returns any; the
//! heuristic scan only runs when they come back empty. The two result
//! sets are never merged for one request.

use tower_lsp::lsp_types::{Location, Position, Range, ReferenceParams, Url};
use tracing::debug;

use crate::document::DocumentStore;
use crate::semantic::SemanticProvider;
use crate::symbols::{
    is_member_access, resolve_reference_context, split_lines, symbol_occurrences, word_at,
    ReferenceScope,
};

pub fn location(uri: &Url, line: usize, start: usize, end: usize) -> Location {
    Location {
        uri: uri.clone(),
        range: Range {
            start: Position::new(line as u32, start as u32),
            end: Position::new(line as u32, end as u32),
        },
    }
}

fn same_document(a: &Url, b: &Url) -> bool {
    a.as_str().eq_ignore_ascii_case(b.as_str())
}

pub async fn handle(
    store: &DocumentStore,
    semantic: Option<&dyn SemanticProvider>,
    params: &ReferenceParams,
) -> Vec<Location> {
    let uri = &params.text_document_position.text_document.uri;
    let position = params.text_document_position.position;
    let include_declaration = params.context.include_declaration;

    if let Some(provider) = semantic {
        if let Some(text) = store.text(uri) {
            provider.apply_live_text(uri, &text).await;
            if let Some(symbol) = provider.resolve_symbol_at(uri, position, &text).await {
                let locations = provider.find_references(&symbol, include_declaration).await;
                if !locations.is_empty() {
                    debug!(
                        symbol = %symbol.name,
                        count = locations.len(),
                        "references resolved semantically"
                    );
                    return locations;
                }
            }
        }
    }

    heuristic_references(store, uri, position, include_declaration)
}

/// Text-based reference search over the open documents.
///
/// The context resolved at the cursor decides reach: a local variable is
/// searched only inside its procedure's line range in the originating
/// document with member-access hits dropped, while a global symbol is
/// searched across every open document with member-access hits kept.
pub fn heuristic_references(
    store: &DocumentStore,
    origin: &Url,
    position: Position,
    include_declaration: bool,
) -> Vec<Location> {
    let Some(text) = store.text(origin) else {
        return Vec::new();
    };
    let lines = split_lines(&text);
    let line_index = position.line as usize;
    let Some(line) = lines.get(line_index) else {
        return Vec::new();
    };
    let Some(symbol) = word_at(line, position.character as usize) else {
        return Vec::new();
    };

    let context = resolve_reference_context(&text, line_index, &symbol);
    let mut locations = Vec::new();

    for document in store.all() {
        let doc_lines = split_lines(&document.text);
        for (doc_line_index, doc_line) in doc_lines.iter().enumerate() {
            if let ReferenceScope::Local(scope) = context.scope {
                if !same_document(&document.uri, origin) || !scope.contains(doc_line_index) {
                    continue;
                }
            }
            for (start, end) in symbol_occurrences(doc_line, &symbol) {
                if context.is_local() && is_member_access(doc_line, start) {
                    continue;
                }
                let is_declaration_site = context.declaration.as_ref().is_some_and(|decl| {
                    same_document(&document.uri, origin)
                        && decl.line == doc_line_index
                        && decl.character == start
                });
                if !include_declaration && is_declaration_site {
                    continue;
                }
                locations.push(location(&document.uri, doc_line_index, start, end));
            }
        }
    }

    locations
}
