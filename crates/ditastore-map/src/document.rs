//! Map document model
//!
//! [`MapDocument`] owns the original text of a map and a set of pending
//! attribute-value replacements. Rendering splices the replacements into the
//! original text, so every byte outside a replaced value is preserved:
//! declarations, comments, whitespace and entity spelling included.

use crate::error::DocumentError;
use crate::scanner::TopicRef;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Pending replacement of one attribute value
#[derive(Debug, Clone, PartialEq, Eq)]
struct Splice {
    end: usize,
    replacement: String,
}

/// Loaded map document with pending `href` rewrites
#[derive(Debug, Clone)]
pub struct MapDocument {
    name: String,
    source_path: Option<PathBuf>,
    text: String,
    /// Keyed by start offset of the replaced value
    edits: BTreeMap<usize, Splice>,
}

impl MapDocument {
    /// Load and check a map file
    ///
    /// # Errors
    /// - [`DocumentError::Read`] if the file cannot be read as UTF-8
    /// - [`DocumentError::Syntax`] if it is not well-formed XML
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| DocumentError::read_error(path, e))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut document = Self::from_text(name, text)?;
        document.source_path = Some(path.to_path_buf());
        Ok(document)
    }

    /// Create document from in-memory text
    ///
    /// # Errors
    /// Returns [`DocumentError::Syntax`] if `text` is not well-formed XML
    pub fn from_text(name: impl Into<String>, text: impl Into<String>) -> Result<Self, DocumentError> {
        let name = name.into();
        let text = text.into();
        parse(&name, &text)?;
        Ok(Self {
            name,
            source_path: None,
            text,
            edits: BTreeMap::new(),
        })
    }

    /// File name used when writing
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path the document was loaded from
    #[inline]
    #[must_use]
    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    /// Original text
    #[inline]
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of recorded replacements
    #[inline]
    #[must_use]
    pub fn pending_edits(&self) -> usize {
        self.edits.len()
    }

    /// Replace the `href` value a handle points at
    ///
    /// Setting the same handle twice keeps the last value. The value is
    /// escaped for the attribute's quote character.
    ///
    /// # Errors
    /// Returns [`DocumentError::StaleHandle`] if the handle's range does not
    /// delimit a quoted value in this document
    pub fn set_href(&mut self, node: &TopicRef, value: &str) -> Result<(), DocumentError> {
        let range = node.value_range();
        let stale = || DocumentError::StaleHandle {
            index: node.index(),
            start: range.start,
            end: range.end,
        };

        let bytes = self.text.as_bytes();
        let delimited = range.start > 0
            && range.end < bytes.len()
            && self.text.is_char_boundary(range.start)
            && self.text.is_char_boundary(range.end)
            && bytes[range.start - 1] == node.quote() as u8
            && bytes[range.end] == node.quote() as u8;
        if !delimited {
            return Err(stale());
        }

        self.edits.insert(
            range.start,
            Splice {
                end: range.end,
                replacement: escape_attribute(value, node.quote()),
            },
        );
        Ok(())
    }

    /// Text with all replacements applied
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.text.len());
        let mut cursor = 0;
        for (&start, splice) in &self.edits {
            out.push_str(&self.text[cursor..start]);
            out.push_str(&splice.replacement);
            cursor = splice.end;
        }
        out.push_str(&self.text[cursor..]);
        out
    }

    /// Write the rendered document to `directory/<name>`
    ///
    /// The directory is created if needed. Content goes to a temporary file
    /// in the same directory which is then renamed over the target, so the
    /// target is either the old file or the complete new one.
    ///
    /// # Errors
    /// - [`DocumentError::Unnamed`] if the document has no name
    /// - [`DocumentError::Write`] for filesystem failures
    pub fn write_to_dir(&self, directory: &Path) -> Result<PathBuf, DocumentError> {
        if self.name.is_empty() {
            return Err(DocumentError::Unnamed);
        }
        let target = directory.join(&self.name);

        std::fs::create_dir_all(directory).map_err(|e| DocumentError::write_error(directory, e))?;
        let mut temp =
            tempfile::NamedTempFile::new_in(directory).map_err(|e| DocumentError::write_error(directory, e))?;
        if let Err(e) = temp.write_all(self.render().as_bytes()) {
            return Err(DocumentError::write_error(temp.path(), e));
        }
        temp.persist(&target)
            .map_err(|e| DocumentError::write_error(&target, e.error))?;

        tracing::debug!(path = %target.display(), edits = self.edits.len(), "Wrote map document");
        Ok(target)
    }
}

/// Parse text with the options map documents need (DOCTYPE allowed)
pub(crate) fn parse<'a>(name: &str, text: &'a str) -> Result<roxmltree::Document<'a>, DocumentError> {
    let options = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..roxmltree::ParsingOptions::default()
    };
    roxmltree::Document::parse_with_options(text, options).map_err(|e| DocumentError::syntax_error(name, e))
}

fn escape_attribute(value: &str, quote: char) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '"' if quote == '"' => out.push_str("&quot;"),
            '\'' if quote == '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}
