pub mod document;
pub mod logging;
pub mod lsp;
pub mod semantic;
pub mod symbols;
pub mod workspace;
