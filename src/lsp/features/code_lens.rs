//! `textDocument/codeLens`.
//!
//! One lens per file-level declaration with a reference count. Without
//! type information same-named symbols across files cannot be told
//! apart, so counting stays inside the declaring file to avoid false
//! cross-file matches.

use serde_json::json;
use tower_lsp::lsp_types::{CodeLens, CodeLensParams, Command, Location};

use crate::document::DocumentStore;
use crate::lsp::features::references::location;
use crate::symbols::{find_declarations, is_member_access, split_lines, symbol_occurrences};

pub const SHOW_REFERENCES_COMMAND: &str = "vbCompanion.showReferences";

pub fn handle(store: &DocumentStore, params: &CodeLensParams) -> Vec<CodeLens> {
    let uri = &params.text_document.uri;
    let Some(text) = store.text(uri) else {
        return Vec::new();
    };
    let lines = split_lines(&text);
    let mut lenses = Vec::new();

    for declaration in find_declarations(&text) {
        if declaration.kind.is_local() {
            continue;
        }

        let mut references: Vec<Location> = Vec::new();
        for (line_index, line) in lines.iter().enumerate() {
            for (start, end) in symbol_occurrences(line, &declaration.name) {
                if is_member_access(line, start) {
                    continue;
                }
                if line_index == declaration.line && start == declaration.character {
                    continue;
                }
                references.push(location(uri, line_index, start, end));
            }
        }

        let title = match references.len() {
            1 => "1 reference".to_string(),
            n => format!("{n} references"),
        };
        let name_end = declaration.character + declaration.name.chars().count();
        let range =
            location(uri, declaration.line, declaration.character, name_end).range;
        lenses.push(CodeLens {
            range,
            command: Some(Command {
                title,
                command: SHOW_REFERENCES_COMMAND.to_string(),
                arguments: Some(vec![
                    json!(uri),
                    json!({ "line": declaration.line, "character": declaration.character }),
                    json!(references),
                ]),
            }),
            data: None,
        });
    }

    lenses
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use tower_lsp::lsp_types::{TextDocumentIdentifier, Url};

    use super::*;

    fn lens_params(uri: &Url) -> CodeLensParams {
        CodeLensParams {
            text_document: TextDocumentIdentifier { uri: uri.clone() },
            work_done_progress_params: Default::default(),
            partial_result_params: Default::default(),
        }
    }

    #[test]
    fn lenses_count_in_file_references_and_skip_dims() {
        let store = DocumentStore::new();
        let uri = Url::parse("file:///calc.vb").unwrap();
        store.upsert(
            &uri,
            indoc! {"
                Class Calculator
                    Sub Add()
                        Dim t As Integer
                    End Sub
                End Class
                ' elsewhere in this file
                Dim c As New Calculator
            "},
        );
        // Another open doc mentioning Calculator must not be counted.
        store.upsert(
            &Url::parse("file:///other.vb").unwrap(),
            "Dim x As New Calculator\n",
        );

        let lenses = handle(&store, &lens_params(&uri));
        let titles: Vec<(&str, u32)> = lenses
            .iter()
            .filter_map(|l| l.command.as_ref().map(|c| (c.title.as_str(), l.range.start.line)))
            .collect();
        assert_eq!(titles, vec![("1 reference", 0), ("0 references", 1)]);
        assert_eq!(
            lenses[0].command.as_ref().unwrap().command,
            SHOW_REFERENCES_COMMAND
        );
    }

    #[test]
    fn unknown_document_yields_no_lenses() {
        let store = DocumentStore::new();
        let uri = Url::parse("file:///nope.vb").unwrap();
        assert!(handle(&store, &lens_params(&uri)).is_empty());
    }
}
