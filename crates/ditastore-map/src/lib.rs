//! ditastore Map Documents
//!
//! Loading, scanning and rewriting DITA maps.
//!
//! # Core Operations
//!
//! - **Load**: read a map file and check it is well-formed ([`MapDocument::load`])
//! - **Scan**: list `m2:` topic references in document order ([`ReferenceScanner`])
//! - **Rewrite**: replace `href` values through non-owning [`TopicRef`] handles
//! - **Write**: splice replacements into the original text and write atomically
//!
//! # Example
//!
//! ```rust
//! use ditastore_map::{MapDocument, ReferenceScanner};
//!
//! let mut doc = MapDocument::from_text(
//!     "guide.ditamap",
//!     r#"<map><topicref href="m2:com.acme:guide:1.0:dita"/></map>"#,
//! ).unwrap();
//!
//! let refs = ReferenceScanner::default().scan(&doc).unwrap();
//! doc.set_href(&refs[0], "topics/com.acme/guide.dita").unwrap();
//! assert_eq!(doc.render(), r#"<map><topicref href="topics/com.acme/guide.dita"/></map>"#);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

// Core modules
pub mod document;
pub mod error;
pub mod scanner;

// Re-exports for convenience
pub use document::MapDocument;
pub use error::DocumentError;
pub use scanner::{ReferenceScanner, TopicRef, DEFAULT_ELEMENTS};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn scan_rewrite_render() {
        let text = "<?xml version=\"1.0\"?>\n<map>\n  <topicref href=\"m2:g:a:1:dita\"/>\n  <topicref href=\"m2:g:b:2::zip:doc/b.dita\"/>\n</map>\n";
        let mut doc = MapDocument::from_text("m.ditamap", text).unwrap();

        let refs = ReferenceScanner::default().scan(&doc).unwrap();
        assert_eq!(refs.len(), 2);
        doc.set_href(&refs[1], "/t/doc/b.dita").unwrap();
        doc.set_href(&refs[0], "/t/g/a.dita").unwrap();

        assert_eq!(
            doc.render(),
            "<?xml version=\"1.0\"?>\n<map>\n  <topicref href=\"/t/g/a.dita\"/>\n  <topicref href=\"/t/doc/b.dita\"/>\n</map>\n"
        );
    }
}
