//! Text-based symbol analysis for VB.NET-family sources.
//!
//! This is the fallback engine the server leans on whenever the semantic
//! provider is absent or comes back empty. It runs line-oriented regex
//! and character scans over the live document text, recomputing from
//! scratch on every request so it stays correct under rapid edits.

pub mod context;
pub mod crossfile;
pub mod declarations;
pub mod text;

pub use context::{resolve_reference_context, ReferenceContext, ReferenceScope};
pub use declarations::{
    container_scopes, find_declarations, procedure_scopes, Declaration, DeclarationKind,
};
pub use text::{is_member_access, split_lines, symbol_occurrences, word_at, word_range_at};
