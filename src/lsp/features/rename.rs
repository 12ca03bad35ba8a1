//! `textDocument/rename`.
//!
//! Builds a workspace edit from the same occurrence set the reference
//! search produces, with the declaration site always included so the
//! symbol does not get orphaned from its own declaration.

use std::collections::HashMap;

use tower_lsp::jsonrpc::{Error, Result};
use tower_lsp::lsp_types::{RenameParams, TextEdit, Url, WorkspaceEdit};

use crate::document::DocumentStore;
use crate::lsp::features::references::heuristic_references;
use crate::symbols::text::is_word_char;

fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && chars.all(is_word_char)
}

pub fn handle(store: &DocumentStore, params: &RenameParams) -> Result<Option<WorkspaceEdit>> {
    let new_name = params.new_name.trim();
    if !is_valid_identifier(new_name) {
        return Err(Error::invalid_params(format!(
            "'{new_name}' is not a valid identifier"
        )));
    }

    let uri = &params.text_document_position.text_document.uri;
    let position = params.text_document_position.position;
    let occurrences = heuristic_references(store, uri, position, true);
    if occurrences.is_empty() {
        return Ok(None);
    }

    let mut changes: HashMap<Url, Vec<TextEdit>> = HashMap::new();
    for occurrence in occurrences {
        changes
            .entry(occurrence.uri)
            .or_default()
            .push(TextEdit {
                range: occurrence.range,
                new_text: new_name.to_string(),
            });
    }

    Ok(Some(WorkspaceEdit {
        changes: Some(changes),
        ..Default::default()
    }))
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use tower_lsp::lsp_types::{
        Position, TextDocumentIdentifier, TextDocumentPositionParams, WorkDoneProgressParams,
    };

    use super::*;

    fn rename_params(uri: &Url, line: u32, character: u32, new_name: &str) -> RenameParams {
        RenameParams {
            text_document_position: TextDocumentPositionParams {
                text_document: TextDocumentIdentifier { uri: uri.clone() },
                position: Position::new(line, character),
            },
            new_name: new_name.to_string(),
            work_done_progress_params: WorkDoneProgressParams::default(),
        }
    }

    #[test]
    fn rename_edits_every_occurrence_including_the_declaration() {
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

        let edit = handle(&store, &rename_params(&uri, 2, 6, "total"))
            .unwrap()
            .unwrap();
        let edits = &edit.changes.unwrap()[&uri];
        assert_eq!(edits.len(), 3);
        assert!(edits.iter().all(|e| e.new_text == "total"));
        assert!(edits.iter().any(|e| e.range.start.line == 1));
    }

    #[test]
    fn invalid_new_name_is_rejected() {
        let store = DocumentStore::new();
        let uri = Url::parse("file:///a.vb").unwrap();
        store.upsert(&uri, "Dim x As Integer\n");
        assert!(handle(&store, &rename_params(&uri, 0, 4, "2fast")).is_err());
        assert!(handle(&store, &rename_params(&uri, 0, 4, "has space")).is_err());
    }

    #[test]
    fn rename_on_nothing_is_a_null_result() {
        let store = DocumentStore::new();
        let uri = Url::parse("file:///a.vb").unwrap();
        store.upsert(&uri, "    \n");
        assert_eq!(handle(&store, &rename_params(&uri, 0, 0, "ok")).unwrap(), None);
    }
}
