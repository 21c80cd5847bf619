//! Link reference definitions: recognising them at the start of paragraphs
//! and resolving labels against them.

use rustc_hash::FxHashMap;
use tracing::trace;

use crate::parser::inlines::{link_label, manual_scan_link_url};
use crate::scanners;
use crate::strings;

/// The destination and title a reference label resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedReference {
    /// The destination URL, unescaped.
    pub url: String,

    /// The title, unescaped; empty when none was given.
    pub title: String,
}

/// Link reference definitions collected from a document, keyed by
/// normalised label.
#[derive(Debug)]
pub struct RefMap {
    map: FxHashMap<String, ResolvedReference>,
    max_ref_size: usize,
    ref_size: usize,
}

impl Default for RefMap {
    fn default() -> Self {
        Self::new()
    }
}

impl RefMap {
    /// An empty map with no bound on expansion.
    pub fn new() -> Self {
        Self {
            map: FxHashMap::default(),
            max_ref_size: usize::MAX,
            ref_size: 0,
        }
    }

    pub(crate) fn set_max_ref_size(&mut self, size: usize) {
        self.max_ref_size = size;
    }

    /// Records a definition under an already normalised label.  The first
    /// definition of a label wins; returns whether this one was kept.
    pub fn insert(&mut self, label: String, reference: ResolvedReference) -> bool {
        if self.map.contains_key(&label) {
            trace!(label = %label, "ignoring duplicate link reference definition");
            return false;
        }
        trace!(label = %label, url = %reference.url, "registered link reference definition");
        self.map.insert(label, reference);
        true
    }

    /// Resolves a normalised label.
    ///
    /// Every successful lookup counts the size of the reference against the
    /// expansion budget; once that is spent, lookups fail and the reference
    /// stays literal text.
    pub fn lookup(&mut self, label: &str) -> Option<ResolvedReference> {
        let entry = self.map.get(label)?;
        let size = entry.url.len() + entry.title.len();
        if size > self.max_ref_size - self.ref_size {
            return None;
        }
        self.ref_size += size;
        Some(entry.clone())
    }

    /// The number of distinct labels defined.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether no definitions have been recorded.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

struct Scanner<'i> {
    input: &'i str,
    pos: usize,
}

impl<'i> Scanner<'i> {
    fn peek_byte(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    fn skip_spaces(&mut self) {
        while matches!(self.peek_byte(), Some(b' ') | Some(b'\t')) {
            self.pos += 1;
        }
    }

    fn skip_line_end(&mut self) -> bool {
        let old_pos = self.pos;
        if self.peek_byte() == Some(b'\r') {
            self.pos += 1;
        }
        if self.peek_byte() == Some(b'\n') {
            self.pos += 1;
        }
        self.pos > old_pos || self.pos >= self.input.len()
    }

    fn spnl(&mut self) {
        self.skip_spaces();
        if self.skip_line_end() {
            self.skip_spaces();
        }
    }
}

/// Parses one definition from the start of `content`.
///
/// Returns the number of bytes it spans, its normalised label and what the
/// label resolves to.
pub(crate) fn parse_reference_definition(
    content: &str,
) -> Option<(usize, String, ResolvedReference)> {
    let mut scanner = Scanner {
        input: content,
        pos: 0,
    };

    let (label, after_label) = link_label(content, 0)?;
    if label.is_empty() {
        return None;
    }
    scanner.pos = after_label;

    if scanner.peek_byte() != Some(b':') {
        return None;
    }
    scanner.pos += 1;
    scanner.spnl();

    let (url, matchlen) = manual_scan_link_url(&content[scanner.pos..])?;
    if matchlen == 0 {
        return None;
    }
    scanner.pos += matchlen;

    let beforetitle = scanner.pos;
    scanner.spnl();
    let title_search = if scanner.pos == beforetitle {
        None
    } else {
        scanners::link_title(content[scanner.pos..].as_bytes())
    };
    let mut title = match title_search {
        Some(matchlen) => {
            let t = &content[scanner.pos..scanner.pos + matchlen];
            scanner.pos += matchlen;
            t
        }
        None => {
            scanner.pos = beforetitle;
            ""
        }
    };

    scanner.skip_spaces();
    if !scanner.skip_line_end() {
        if title.is_empty() {
            return None;
        }
        // Anything after the title voids it; the destination may still end
        // its line.
        scanner.pos = beforetitle;
        title = "";
        scanner.skip_spaces();
        if !scanner.skip_line_end() {
            return None;
        }
    }

    let label = strings::normalize_label(label);
    if label.is_empty() {
        return None;
    }

    Some((
        scanner.pos,
        label,
        ResolvedReference {
            url: strings::clean_url(url),
            title: strings::clean_title(title),
        },
    ))
}
