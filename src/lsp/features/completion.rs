//! `textDocument/completion`.
//!
//! Keyword list plus the distinct symbols declared in the current
//! document. No context filtering; the client narrows by the typed
//! prefix.

use tower_lsp::lsp_types::{
    CompletionItem, CompletionItemKind, CompletionList, CompletionParams, CompletionResponse, Url,
};

use crate::document::DocumentStore;
use crate::symbols::find_declarations;

const KEYWORDS: &[&str] = &[
    "Class", "Module", "Namespace", "Sub", "Function", "Property", "Dim", "As", "If", "Then",
    "Else", "End", "Public", "Private", "Friend", "Protected", "Imports", "Return", "ByVal",
    "ByRef", "New",
];

pub fn handle(store: &DocumentStore, params: &CompletionParams) -> CompletionResponse {
    let uri = &params.text_document_position.text_document.uri;
    CompletionResponse::List(CompletionList {
        is_incomplete: false,
        items: items_for(store, uri),
    })
}

fn items_for(store: &DocumentStore, uri: &Url) -> Vec<CompletionItem> {
    let mut items: Vec<CompletionItem> = KEYWORDS
        .iter()
        .map(|keyword| CompletionItem {
            label: (*keyword).to_string(),
            kind: Some(CompletionItemKind::KEYWORD),
            ..Default::default()
        })
        .collect();

    if let Some(text) = store.text(uri) {
        let mut seen: Vec<String> = Vec::new();
        for declaration in find_declarations(&text) {
            if seen.iter().any(|s| s.eq_ignore_ascii_case(&declaration.name)) {
                continue;
            }
            seen.push(declaration.name.clone());
            items.push(CompletionItem {
                label: declaration.name,
                kind: Some(CompletionItemKind::VARIABLE),
                ..Default::default()
            });
        }
    }

    items
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_always_present_symbols_deduplicated_case_insensitively() {
        let store = DocumentStore::new();
        let uri = Url::parse("file:///a.vb").unwrap();
        store.upsert(&uri, "Dim total As Integer\nSub Work()\n    Dim TOTAL As Integer\nEnd Sub\n");

        let items = items_for(&store, &uri);
        let keywords = items
            .iter()
            .filter(|i| i.kind == Some(CompletionItemKind::KEYWORD))
            .count();
        assert_eq!(keywords, KEYWORDS.len());

        let symbols: Vec<&str> = items
            .iter()
            .filter(|i| i.kind == Some(CompletionItemKind::VARIABLE))
            .map(|i| i.label.as_str())
            .collect();
        assert_eq!(symbols, vec!["total", "Work"]);
    }

    #[test]
    fn unknown_document_still_yields_keywords() {
        let store = DocumentStore::new();
        let uri = Url::parse("file:///missing.vb").unwrap();
        assert_eq!(items_for(&store, &uri).len(), KEYWORDS.len());
    }
}
