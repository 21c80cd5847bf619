//! A [CommonMark](https://spec.commonmark.org/0.31.2/) to HTML converter,
//! with the [GFM](https://github.github.com/gfm/) table, strikethrough, task
//! list and tagfilter extensions.
//!
//! Conversion is total: every input string produces a document, and
//! anything that fails to parse as a construct is kept as literal text.
//!
//! ```
//! use mdhtml::{markdown_to_html, Options};
//! assert_eq!(markdown_to_html("Hello, **世界**!", &Options::default()),
//!            "<p>Hello, <strong>世界</strong>!</p>\n");
//! ```
//!
//! The tree can be inspected between parsing and rendering:
//!
//! ```
//! use mdhtml::{format_html, parse_document, Arena, Options};
//! use mdhtml::nodes::NodeValue;
//!
//! let arena = Arena::new();
//! let options = Options::default();
//! let root = parse_document(&arena, "# Title\n\nSome *text*.\n", &options);
//!
//! let headings = root
//!     .descendants()
//!     .filter(|node| matches!(node.data.borrow().value, NodeValue::Heading(..)))
//!     .count();
//! assert_eq!(headings, 1);
//!
//! let mut html = String::new();
//! format_html(root, &options, &mut html).unwrap();
//! assert_eq!(html, "<h1>Title</h1>\n<p>Some <em>text</em>.</p>\n");
//! ```
//!
//! Parsing emits [`tracing`] events at `debug` and `trace` level; install a
//! subscriber to see them.

#![forbid(unsafe_code)]
#![allow(clippy::too_many_arguments)]

macro_rules! node_matches {
    ($node:expr, $( $pat:pat_param )|+) => {{
        matches!($node.data.borrow().value, $( $pat )|+)
    }};
}

pub mod arena_tree;
mod ctype;
mod entity;
mod error;
pub mod html;
pub mod nodes;
pub mod parser;
mod scanners;
mod strings;

pub use error::{Error, Result};
pub use html::format_html;
pub use parser::{
    parse_document, try_parse_document, Extension, Limits, Options, Parse, RefMap, Render,
    ResolvedReference,
};

/// Convenience type alias for the arena the document tree is allocated in.
pub type Arena<'a> = typed_arena::Arena<nodes::AstNode<'a>>;

/// Render Markdown to HTML.
///
/// See the documentation of the crate root for an example.
pub fn markdown_to_html(md: &str, options: &Options) -> String {
    let arena = Arena::new();
    let root = parse_document(&arena, md, options);
    let mut html = String::with_capacity(md.len() + md.len() / 4);
    format_html(root, options, &mut html).expect("writing to a String cannot fail");
    html
}

/// Render Markdown to HTML, enforcing `options.parse.limits`.
///
/// ```
/// # use mdhtml::{try_markdown_to_html, Error, Options};
/// let mut options = Options::default();
/// options.parse.limits.max_nesting_depth = Some(5);
/// assert_eq!(try_markdown_to_html("- *a*\n", &options).unwrap(),
///            "<ul>\n<li><em>a</em></li>\n</ul>\n");
/// assert!(matches!(try_markdown_to_html("> - *a*\n", &options),
///                  Err(Error::NestingTooDeep { .. })));
/// ```
pub fn try_markdown_to_html(md: &str, options: &Options) -> Result<String> {
    let arena = Arena::new();
    let root = try_parse_document(&arena, md, options)?;
    let mut html = String::with_capacity(md.len() + md.len() / 4);
    format_html(root, options, &mut html).expect("writing to a String cannot fail");
    Ok(html)
}
