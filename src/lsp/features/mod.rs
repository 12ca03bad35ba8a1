//! Feature handlers.
//!
//! Each handler is a plain function over the document store (plus the
//! semantic provider where the feature is semantically navigable), so it
//! can be exercised directly in tests without a client connection.

pub mod code_lens;
pub mod completion;
pub mod definition;
pub mod document_symbols;
pub mod folding;
pub mod highlight;
pub mod references;
pub mod rename;
