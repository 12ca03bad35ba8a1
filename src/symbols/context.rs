//! Reference context resolution.
//!
//! Given a cursor position and the symbol under it, classify the symbol
//! as procedure-local or file-global and pin down the declaration the
//! search should anchor on. The precedence order matters: a `Dim` on the
//! cursor line wins over an enclosing `Dim`, which wins over a file-level
//! declaration, which wins over a bare name-only search.

use crate::symbols::declarations::{find_declarations, Declaration, ScopeRange};

/// How far a reference search for a symbol should reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceScope {
    /// Confined to one procedure body in the originating document.
    Local(ScopeRange),
    /// Every open document.
    Global,
}

#[derive(Debug, Clone)]
pub struct ReferenceContext {
    pub scope: ReferenceScope,
    pub declaration: Option<Declaration>,
}

impl ReferenceContext {
    pub fn is_local(&self) -> bool {
        matches!(self.scope, ReferenceScope::Local(_))
    }
}

/// Resolve the context for `symbol` at `line` in `text`.
///
/// Tried in order:
/// 1. a `Dim` for `symbol` on the cursor line itself,
/// 2. the nearest preceding in-scope `Dim` for `symbol`,
/// 3. the first declaration of `symbol`, of any kind, in source order,
/// 4. a name-only global search with no anchoring declaration.
pub fn resolve_reference_context(text: &str, line: usize, symbol: &str) -> ReferenceContext {
    let declarations = find_declarations(text);

    let dim_here = declarations.iter().find(|decl| {
        decl.kind.is_local() && decl.line == line && decl.name.eq_ignore_ascii_case(symbol)
    });
    if let Some(decl) = dim_here {
        return ReferenceContext {
            scope: ReferenceScope::Local(decl.scope),
            declaration: Some(decl.clone()),
        };
    }

    // Most recent Dim whose procedure scope covers the cursor line.
    let dim_in_scope = declarations
        .iter()
        .filter(|decl| {
            decl.kind.is_local()
                && decl.name.eq_ignore_ascii_case(symbol)
                && decl.scope.contains(line)
                && decl.line <= line
        })
        .max_by_key(|decl| decl.line);
    if let Some(decl) = dim_in_scope {
        return ReferenceContext {
            scope: ReferenceScope::Local(decl.scope),
            declaration: Some(decl.clone()),
        };
    }

    // Any kind counts here, including a Dim whose scope does not cover
    // the cursor; navigating to it beats reporting nothing.
    let first_by_source_order = declarations
        .iter()
        .find(|decl| decl.name.eq_ignore_ascii_case(symbol));
    if let Some(decl) = first_by_source_order {
        return ReferenceContext {
            scope: ReferenceScope::Global,
            declaration: Some(decl.clone()),
        };
    }

    ReferenceContext {
        scope: ReferenceScope::Global,
        declaration: None,
    }
}
