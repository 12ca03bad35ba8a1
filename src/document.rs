//! Open-document store.
//!
//! The single source of truth for live buffer text. Keys are lowercased
//! URI strings, so `file:///C:/Foo.vb` and `file:///c:/foo.vb` address
//! the same entry regardless of how the client cases drive letters and
//! paths. The original URI is kept alongside the text so responses echo
//! the client's own spelling back.

use dashmap::DashMap;
use tower_lsp::lsp_types::Url;

#[derive(Debug, Clone)]
pub struct OpenDocument {
    pub uri: Url,
    pub text: String,
}

#[derive(Debug, Default)]
pub struct DocumentStore {
    documents: DashMap<String, OpenDocument>,
}

fn store_key(uri: &Url) -> String {
    uri.as_str().to_lowercase()
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or fully replace a document's text. Line endings are
    /// normalized to `\n` so line math downstream has one shape to deal
    /// with.
    pub fn upsert(&self, uri: &Url, text: &str) {
        self.documents.insert(
            store_key(uri),
            OpenDocument {
                uri: uri.clone(),
                text: text.replace("\r\n", "\n"),
            },
        );
    }

    pub fn remove(&self, uri: &Url) {
        self.documents.remove(&store_key(uri));
    }

    pub fn text(&self, uri: &Url) -> Option<String> {
        self.documents
            .get(&store_key(uri))
            .map(|doc| doc.text.clone())
    }

    /// Snapshot of every open document, for global searches. Order is
    /// unspecified.
    pub fn all(&self) -> Vec<OpenDocument> {
        self.documents
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn lookup_ignores_uri_case() {
        let store = DocumentStore::new();
        store.upsert(&url("file:///C:/Project/Main.vb"), "Module Main");
        assert_eq!(
            store.text(&url("file:///c:/project/main.vb")).as_deref(),
            Some("Module Main")
        );
    }

    #[test]
    fn upsert_replaces_and_normalizes_line_endings() {
        let store = DocumentStore::new();
        let uri = url("file:///a.vb");
        store.upsert(&uri, "old");
        store.upsert(&uri, "Sub A()\r\nEnd Sub\r\n");
        assert_eq!(store.text(&uri).as_deref(), Some("Sub A()\nEnd Sub\n"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn snapshot_preserves_the_original_uri_spelling() {
        let store = DocumentStore::new();
        store.upsert(&url("file:///C:/Main.vb"), "x");
        let all = store.all();
        assert_eq!(all[0].uri.as_str(), "file:///C:/Main.vb");
    }

    #[test]
    fn remove_forgets_the_document() {
        let store = DocumentStore::new();
        let uri = url("file:///a.vb");
        store.upsert(&uri, "x");
        store.remove(&url("file:///A.VB"));
        assert!(store.is_empty());
        assert!(store.text(&uri).is_none());
    }
}
