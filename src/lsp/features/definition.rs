//! `textDocument/definition`.

use std::path::Path;

use tower_lsp::lsp_types::{
    GotoDefinitionParams, GotoDefinitionResponse, Location, Position, Url,
};
use tracing::debug;

use crate::document::DocumentStore;
use crate::lsp::features::references::location;
use crate::semantic::SemanticProvider;
use crate::symbols::crossfile::{
    find_definition_in_files, inferred_receiver_type, receiver_before,
};
use crate::symbols::{is_member_access, resolve_reference_context, split_lines, word_range_at};
use crate::workspace::source_files;

pub async fn handle(
    store: &DocumentStore,
    semantic: Option<&dyn SemanticProvider>,
    workspace_root: Option<&Path>,
    params: &GotoDefinitionParams,
) -> Option<GotoDefinitionResponse> {
    let uri = &params.text_document_position_params.text_document.uri;
    let position = params.text_document_position_params.position;

    if let Some(provider) = semantic {
        if let Some(text) = store.text(uri) {
            provider.apply_live_text(uri, &text).await;
            if let Some(symbol) = provider.resolve_symbol_at(uri, position, &text).await {
                if let Some(found) = provider.find_definition(&symbol).await {
                    debug!(symbol = %symbol.name, "definition resolved semantically");
                    return Some(GotoDefinitionResponse::Scalar(found));
                }
            }
        }
    }

    heuristic_definition(store, uri, position, workspace_root)
        .map(GotoDefinitionResponse::Scalar)
}

/// Text-based definition lookup.
///
/// A bare identifier resolves against the declarations of its own
/// document first, then against the workspace files with no type
/// filter. A member access (`receiver.Symbol`) skips local resolution
/// and goes straight to the cross-file scan, filtered by the receiver's
/// annotated type, or by the receiver name itself for shared-member
/// calls.
pub fn heuristic_definition(
    store: &DocumentStore,
    uri: &Url,
    position: Position,
    workspace_root: Option<&Path>,
) -> Option<Location> {
    let text = store.text(uri)?;
    let lines = split_lines(&text);
    let line = lines.get(position.line as usize)?;
    let (start, end) = word_range_at(line, position.character as usize)?;
    let symbol: String = line.chars().skip(start).take(end - start).collect();

    let type_filter = if is_member_access(line, start) {
        let receiver = receiver_before(line, start)?;
        Some(inferred_receiver_type(&text, &receiver).unwrap_or(receiver))
    } else {
        let context = resolve_reference_context(&text, position.line as usize, &symbol);
        if let Some(declaration) = context.declaration {
            let name_end = declaration.character + declaration.name.chars().count();
            return Some(location(uri, declaration.line, declaration.character, name_end));
        }
        None
    };

    let candidates = source_files(workspace_root?);
    let found = find_definition_in_files(&symbol, type_filter.as_deref(), &candidates)?;
    let target = Url::from_file_path(&found.path).ok()?;
    Some(location(
        &target,
        found.line,
        found.character,
        found.character + symbol.chars().count(),
    ))
}
