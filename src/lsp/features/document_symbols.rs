//! `textDocument/documentSymbol`.
//!
//! Builds a nested outline from the declaration scan: classes and
//! modules span their `End` lines and contain the procedures declared
//! inside them, procedures contain their `Dim`s.

use tower_lsp::lsp_types::{
    DocumentSymbol, DocumentSymbolParams, DocumentSymbolResponse, Position, Range, SymbolKind,
};

use crate::document::DocumentStore;
use crate::symbols::declarations::{ScopeRange, container_scopes, procedure_scopes};
use crate::symbols::{find_declarations, DeclarationKind};

pub fn handle(store: &DocumentStore, params: &DocumentSymbolParams) -> Option<DocumentSymbolResponse> {
    let text = store.text(&params.text_document.uri)?;
    Some(DocumentSymbolResponse::Nested(outline(&text)))
}

fn symbol_kind(kind: DeclarationKind) -> SymbolKind {
    match kind {
        DeclarationKind::Class => SymbolKind::CLASS,
        DeclarationKind::Module => SymbolKind::MODULE,
        DeclarationKind::Sub | DeclarationKind::Function => SymbolKind::FUNCTION,
        DeclarationKind::Property => SymbolKind::PROPERTY,
        DeclarationKind::Dim => SymbolKind::VARIABLE,
    }
}

fn line_range(range: ScopeRange) -> Range {
    Range {
        start: Position::new(range.start_line as u32, 0),
        end: Position::new(range.end_line as u32, u32::MAX),
    }
}

pub fn outline(text: &str) -> Vec<DocumentSymbol> {
    let containers = container_scopes(text);
    let procedures = procedure_scopes(text);

    // (full extent, symbol), in source order. Wider regions sort before
    // anything starting on the same line.
    let mut nodes: Vec<(ScopeRange, DocumentSymbol)> = find_declarations(text)
        .into_iter()
        .map(|decl| {
            let body = match decl.kind {
                DeclarationKind::Class | DeclarationKind::Module => containers
                    .iter()
                    .find(|c| c.range.start_line == decl.line)
                    .map(|c| c.range),
                DeclarationKind::Sub | DeclarationKind::Function => procedures
                    .iter()
                    .find(|p| p.range.start_line == decl.line)
                    .map(|p| p.range),
                _ => None,
            }
            .unwrap_or(ScopeRange {
                start_line: decl.line,
                end_line: decl.line,
            });
            let name_end = decl.character + decl.name.chars().count();
            let selection = Range {
                start: Position::new(decl.line as u32, decl.character as u32),
                end: Position::new(decl.line as u32, name_end as u32),
            };
            #[allow(deprecated)]
            let symbol = DocumentSymbol {
                name: decl.name,
                detail: None,
                kind: symbol_kind(decl.kind),
                tags: None,
                deprecated: None,
                range: line_range(body),
                selection_range: selection,
                children: Some(Vec::new()),
            };
            (body, symbol)
        })
        .collect();
    nodes.sort_by(|(a, _), (b, _)| {
        a.start_line
            .cmp(&b.start_line)
            .then(b.end_line.cmp(&a.end_line))
    });

    nest(nodes)
}

fn nest(nodes: Vec<(ScopeRange, DocumentSymbol)>) -> Vec<DocumentSymbol> {
    let mut roots: Vec<DocumentSymbol> = Vec::new();
    let mut stack: Vec<(ScopeRange, DocumentSymbol)> = Vec::new();

    fn attach(
        stack: &mut Vec<(ScopeRange, DocumentSymbol)>,
        roots: &mut Vec<DocumentSymbol>,
        symbol: DocumentSymbol,
    ) {
        match stack.last_mut() {
            Some((_, parent)) => parent.children.get_or_insert_with(Vec::new).push(symbol),
            None => roots.push(symbol),
        }
    }

    for (range, symbol) in nodes {
        loop {
            match stack.last() {
                Some((top, _)) if range.start_line > top.end_line => {
                    if let Some((_, done)) = stack.pop() {
                        attach(&mut stack, &mut roots, done);
                    }
                }
                _ => break,
            }
        }
        stack.push((range, symbol));
    }
    while let Some((_, done)) = stack.pop() {
        attach(&mut stack, &mut roots, done);
    }

    roots
}
