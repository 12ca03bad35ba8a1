//! `textDocument/foldingRange`.

use tower_lsp::lsp_types::{FoldingRange, FoldingRangeKind, FoldingRangeParams};

use crate::document::DocumentStore;
use crate::symbols::{container_scopes, procedure_scopes};

/// Folds for every class/module body and procedure body. Regions come
/// from the same balanced scan navigation uses, so a mismatched `End`
/// produces no fold rather than a wrong one.
pub fn handle(store: &DocumentStore, params: &FoldingRangeParams) -> Vec<FoldingRange> {
    let Some(text) = store.text(&params.text_document.uri) else {
        return Vec::new();
    };

    let mut ranges: Vec<FoldingRange> = container_scopes(&text)
        .into_iter()
        .chain(procedure_scopes(&text))
        .map(|scope| FoldingRange {
            start_line: scope.range.start_line as u32,
            end_line: scope.range.end_line as u32,
            kind: Some(FoldingRangeKind::Region),
            ..Default::default()
        })
        .collect();
    ranges.sort_by_key(|r| (r.start_line, r.end_line));
    ranges
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use tower_lsp::lsp_types::{TextDocumentIdentifier, Url};

    use super::*;

    #[test]
    fn disjoint_procedures_fold_separately_under_their_class() {
        let store = DocumentStore::new();
        let uri = Url::parse("file:///a.vb").unwrap();
        store.upsert(
            &uri,
            indoc! {"
                Class Foo
                    Sub A()
                    End Sub
                    Sub B()
                    End Sub
                End Class
            "},
        );
        let params = FoldingRangeParams {
            text_document: TextDocumentIdentifier { uri },
            work_done_progress_params: Default::default(),
            partial_result_params: Default::default(),
        };
        let ranges = handle(&store, &params);
        let spans: Vec<(u32, u32)> = ranges.iter().map(|r| (r.start_line, r.end_line)).collect();
        assert_eq!(spans, vec![(0, 5), (1, 2), (3, 4)]);
    }
}
