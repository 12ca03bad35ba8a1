//! `textDocument/documentHighlight`.
//!
//! Same occurrence rules as the reference search, restricted to the
//! requesting document. The declaration site highlights as a write.

use tower_lsp::lsp_types::{
    DocumentHighlight, DocumentHighlightKind, DocumentHighlightParams,
};

use crate::document::DocumentStore;
use crate::lsp::features::references::location;
use crate::symbols::{
    is_member_access, resolve_reference_context, split_lines, symbol_occurrences, word_at,
    ReferenceScope,
};

pub fn handle(store: &DocumentStore, params: &DocumentHighlightParams) -> Vec<DocumentHighlight> {
    let uri = &params.text_document_position_params.text_document.uri;
    let position = params.text_document_position_params.position;
    let Some(text) = store.text(uri) else {
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
    let mut highlights = Vec::new();

    for (doc_line_index, doc_line) in lines.iter().enumerate() {
        if let ReferenceScope::Local(scope) = context.scope {
            if !scope.contains(doc_line_index) {
                continue;
            }
        }
        for (start, end) in symbol_occurrences(doc_line, &symbol) {
            if context.is_local() && is_member_access(doc_line, start) {
                continue;
            }
            let is_declaration_site = context
                .declaration
                .as_ref()
                .is_some_and(|decl| decl.line == doc_line_index && decl.character == start);
            highlights.push(DocumentHighlight {
                range: location(uri, doc_line_index, start, end).range,
                kind: Some(if is_declaration_site {
                    DocumentHighlightKind::WRITE
                } else {
                    DocumentHighlightKind::READ
                }),
            });
        }
    }

    highlights
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use tower_lsp::lsp_types::{
        Position, TextDocumentIdentifier, TextDocumentPositionParams, Url,
    };

    use super::*;

    fn highlight_params(uri: &Url, line: u32, character: u32) -> DocumentHighlightParams {
        DocumentHighlightParams {
            text_document_position_params: TextDocumentPositionParams {
                text_document: TextDocumentIdentifier { uri: uri.clone() },
                position: Position::new(line, character),
            },
            work_done_progress_params: Default::default(),
            partial_result_params: Default::default(),
        }
    }

    #[test]
    fn declaration_is_a_write_uses_are_reads() {
        let store = DocumentStore::new();
        let uri = Url::parse("file:///a.vb").unwrap();
        store.upsert(
            &uri,
            indoc! {"
                Sub Work()
                    Dim count As Integer
                    count = count + 1
                End Sub
            "},
        );
        let highlights = handle(&store, &highlight_params(&uri, 2, 6));
        let kinds: Vec<_> = highlights.iter().filter_map(|h| h.kind).collect();
        assert_eq!(
            kinds,
            vec![
                DocumentHighlightKind::WRITE,
                DocumentHighlightKind::READ,
                DocumentHighlightKind::READ,
            ]
        );
        assert_eq!(highlights[0].range.start.line, 1);
    }

    #[test]
    fn no_word_under_cursor_highlights_nothing() {
        let store = DocumentStore::new();
        let uri = Url::parse("file:///a.vb").unwrap();
        store.upsert(&uri, "( )\n");
        assert!(handle(&store, &highlight_params(&uri, 0, 1)).is_empty());
    }
}
