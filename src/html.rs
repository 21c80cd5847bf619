//! The HTML renderer.

use std::fmt::{self, Write};

use crate::arena_tree::NodeEdge;
use crate::ctype::isspace;
use crate::nodes::{AstNode, ListType, NodeValue, TableAlignment};
use crate::parser::Options;

/// Formats an AST as HTML, modified by the given options.
///
/// ```rust
/// # use mdhtml::{format_html, parse_document, Arena, Options};
/// let arena = Arena::new();
/// let options = Options::default();
/// let root = parse_document(&arena, "> quoted *text*\n", &options);
///
/// let mut html = String::new();
/// format_html(root, &options, &mut html).unwrap();
/// assert_eq!(html, "<blockquote>\n<p>quoted <em>text</em></p>\n</blockquote>\n");
/// ```
pub fn format_html<'a>(
    root: &'a AstNode<'a>,
    options: &Options,
    output: &mut dyn Write,
) -> fmt::Result {
    let mut f = HtmlFormatter::new(options, output);
    f.format(root)
}

/// Escapes text for use in HTML content or a quoted attribute value.
///
/// ```rust
/// # use mdhtml::html::escape;
/// let mut out = String::new();
/// escape(&mut out, "a < b && \"c\"").unwrap();
/// assert_eq!(out, "a &lt; b &amp;&amp; &quot;c&quot;");
/// ```
pub fn escape(output: &mut dyn Write, buffer: &str) -> fmt::Result {
    let bytes = buffer.as_bytes();
    let mut offset = 0;
    for (i, &byte) in bytes.iter().enumerate() {
        let esc = match byte {
            b'"' => "&quot;",
            b'&' => "&amp;",
            b'<' => "&lt;",
            b'>' => "&gt;",
            _ => continue,
        };
        output.write_str(&buffer[offset..i])?;
        output.write_str(esc)?;
        offset = i + 1;
    }
    output.write_str(&buffer[offset..])
}

const HREF_SAFE: [bool; 256] = {
    let mut a = [false; 256];
    let safe = b"-_.+!*(),%#@?=;:/$~abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
    let mut i = 0;
    while i < safe.len() {
        a[safe[i] as usize] = true;
        i += 1;
    }
    a
};

/// Percent-encodes a URL for an `href` or `src` attribute.  Existing
/// percent escapes are left alone; `&` and `'` become entities.
///
/// ```rust
/// # use mdhtml::html::escape_href;
/// let mut out = String::new();
/// escape_href(&mut out, "/a b?x=1&y='2'").unwrap();
/// assert_eq!(out, "/a%20b?x=1&amp;y=&#x27;2&#x27;");
/// ```
pub fn escape_href(output: &mut dyn Write, buffer: &str) -> fmt::Result {
    let src = buffer.as_bytes();
    let size = src.len();
    let mut i = 0;

    while i < size {
        let org = i;
        while i < size && HREF_SAFE[src[i] as usize] {
            i += 1;
        }

        if i > org {
            output.write_str(&buffer[org..i])?;
        }

        if i >= size {
            break;
        }

        match src[i] {
            b'&' => output.write_str("&amp;")?,
            b'\'' => output.write_str("&#x27;")?,
            b => write!(output, "%{:02X}", b)?,
        }

        i += 1;
    }

    Ok(())
}

const TAGFILTER_BLACKLIST: [&str; 9] = [
    "title",
    "textarea",
    "style",
    "xmp",
    "iframe",
    "noembed",
    "noframes",
    "script",
    "plaintext",
];

/// Whether `literal`, starting at a `<`, opens or closes a tag that the GFM
/// tagfilter disallows.
fn is_filtered_tag(literal: &[u8]) -> bool {
    if literal.len() < 3 || literal[0] != b'<' {
        return false;
    }

    let rest = if literal[1] == b'/' {
        &literal[2..]
    } else {
        &literal[1..]
    };

    TAGFILTER_BLACKLIST.iter().any(|tag| {
        let tag = tag.as_bytes();
        if rest.len() <= tag.len() || !rest[..tag.len()].eq_ignore_ascii_case(tag) {
            return false;
        }
        match rest[tag.len()] {
            b'>' => true,
            b'/' => rest.get(tag.len() + 1) == Some(&b'>'),
            c => isspace(c),
        }
    })
}

struct HtmlFormatter<'o> {
    output: &'o mut dyn Write,
    options: &'o Options,
    last_was_lf: bool,
    cell_index: usize,
}

impl<'o> Write for HtmlFormatter<'o> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if let Some(&last) = s.as_bytes().last() {
            self.last_was_lf = last == b'\n';
        }
        self.output.write_str(s)
    }
}

impl<'o> HtmlFormatter<'o> {
    fn new(options: &'o Options, output: &'o mut dyn Write) -> Self {
        HtmlFormatter {
            output,
            options,
            last_was_lf: true,
            cell_index: 0,
        }
    }

    fn cr(&mut self) -> fmt::Result {
        if !self.last_was_lf {
            self.write_str("\n")?;
        }
        Ok(())
    }

    fn escape(&mut self, buffer: &str) -> fmt::Result {
        escape(self, buffer)
    }

    fn escape_href(&mut self, buffer: &str) -> fmt::Result {
        escape_href(self, buffer)
    }

    // Raw HTML goes out verbatim unless escaping or the tagfilter is on.
    fn write_raw_html(&mut self, literal: &str) -> fmt::Result {
        if self.options.render.escape {
            return self.escape(literal);
        }
        if !self.options.extension.tagfilter {
            return self.write_str(literal);
        }

        let bytes = literal.as_bytes();
        let mut offset = 0;
        for i in 0..bytes.len() {
            if bytes[i] == b'<' && is_filtered_tag(&bytes[i..]) {
                self.write_str(&literal[offset..i])?;
                self.write_str("&lt;")?;
                offset = i + 1;
            }
        }
        self.write_str(&literal[offset..])
    }

    fn render_sourcepos(&mut self, node: &AstNode<'_>) -> fmt::Result {
        if self.options.render.sourcepos {
            let sourcepos = node.data.borrow().sourcepos;
            write!(self, " data-sourcepos=\"{}\"", sourcepos)?;
        }
        Ok(())
    }

    fn format<'a>(&mut self, root: &'a AstNode<'a>) -> fmt::Result {
        // While inside an image, only the plain text of its description is
        // written, into the `alt` attribute.
        let mut plain: Option<&'a AstNode<'a>> = None;

        for edge in root.traverse() {
            match edge {
                NodeEdge::Start(node) => match plain {
                    Some(_) => self.format_plain(node)?,
                    None => {
                        if node_matches!(node, NodeValue::Image(..)) {
                            plain = Some(node);
                        }
                        self.format_node(node, true)?;
                    }
                },
                NodeEdge::End(node) => match plain {
                    Some(image) if !image.same_node(node) => {}
                    _ => {
                        plain = None;
                        self.format_node(node, false)?;
                    }
                },
            }
        }

        Ok(())
    }

    fn format_plain<'a>(&mut self, node: &'a AstNode<'a>) -> fmt::Result {
        match node.data.borrow().value {
            NodeValue::Text(ref literal) | NodeValue::HtmlInline(ref literal) => {
                self.escape(literal)
            }
            NodeValue::Code(ref code) => self.escape(&code.literal),
            NodeValue::LineBreak | NodeValue::SoftBreak => self.write_str(" "),
            _ => Ok(()),
        }
    }

    fn format_node<'a>(&mut self, node: &'a AstNode<'a>, entering: bool) -> fmt::Result {
        match node.data.borrow().value {
            NodeValue::Document => (),
            NodeValue::BlockQuote => {
                if entering {
                    self.cr()?;
                    self.write_str("<blockquote")?;
                    self.render_sourcepos(node)?;
                    self.write_str(">\n")?;
                } else {
                    self.cr()?;
                    self.write_str("</blockquote>\n")?;
                }
            }
            NodeValue::List(ref nl) => {
                if entering {
                    self.cr()?;
                    match nl.list_type {
                        ListType::Bullet => self.write_str("<ul")?,
                        ListType::Ordered => {
                            self.write_str("<ol")?;
                            if nl.start != 1 {
                                write!(self, " start=\"{}\"", nl.start)?;
                            }
                        }
                    }
                    self.render_sourcepos(node)?;
                    self.write_str(">\n")?;
                } else if nl.list_type == ListType::Bullet {
                    self.write_str("</ul>\n")?;
                } else {
                    self.write_str("</ol>\n")?;
                }
            }
            NodeValue::Item(..) => {
                if entering {
                    self.cr()?;
                    self.write_str("<li")?;
                    self.render_sourcepos(node)?;
                    self.write_str(">")?;
                } else {
                    self.write_str("</li>\n")?;
                }
            }
            NodeValue::TaskItem(symbol) => {
                if entering {
                    self.cr()?;
                    self.write_str("<li")?;
                    self.render_sourcepos(node)?;
                    self.write_str(">")?;
                    self.write_str("<input type=\"checkbox\" ")?;
                    if symbol.is_some() {
                        self.write_str("checked=\"\" ")?;
                    }
                    self.write_str("disabled=\"\" /> ")?;
                } else {
                    self.write_str("</li>\n")?;
                }
            }
            NodeValue::Heading(ref nh) => {
                if entering {
                    self.cr()?;
                    write!(self, "<h{}", nh.level)?;
                    self.render_sourcepos(node)?;
                    self.write_str(">")?;
                } else {
                    writeln!(self, "</h{}>", nh.level)?;
                }
            }
            NodeValue::CodeBlock(ref ncb) => {
                if entering {
                    self.cr()?;

                    let lang = ncb.info.split([' ', '\t']).next().unwrap_or_default();
                    if lang.is_empty() {
                        self.write_str("<pre")?;
                        self.render_sourcepos(node)?;
                        self.write_str("><code>")?;
                    } else if self.options.render.github_pre_lang {
                        self.write_str("<pre")?;
                        self.render_sourcepos(node)?;
                        self.write_str(" lang=\"")?;
                        self.escape(lang)?;
                        self.write_str("\"><code>")?;
                    } else {
                        self.write_str("<pre")?;
                        self.render_sourcepos(node)?;
                        self.write_str("><code class=\"language-")?;
                        self.escape(lang)?;
                        self.write_str("\">")?;
                    }

                    self.escape(&ncb.literal)?;
                    self.write_str("</code></pre>\n")?;
                }
            }
            NodeValue::HtmlBlock(ref nhb) => {
                if entering {
                    self.cr()?;
                    self.write_raw_html(&nhb.literal)?;
                    self.cr()?;
                }
            }
            NodeValue::ThematicBreak => {
                if entering {
                    self.cr()?;
                    self.write_str("<hr")?;
                    self.render_sourcepos(node)?;
                    self.write_str(" />\n")?;
                }
            }
            NodeValue::Paragraph => {
                let tight = match node.parent().and_then(|n| n.parent()) {
                    Some(grandparent) => match grandparent.data.borrow().value {
                        NodeValue::List(ref nl) => nl.tight,
                        _ => false,
                    },
                    None => false,
                };

                if !tight {
                    if entering {
                        self.cr()?;
                        self.write_str("<p")?;
                        self.render_sourcepos(node)?;
                        self.write_str(">")?;
                    } else {
                        self.write_str("</p>\n")?;
                    }
                }
            }
            NodeValue::Table(..) => {
                if entering {
                    self.cr()?;
                    self.write_str("<table")?;
                    self.render_sourcepos(node)?;
                    self.write_str(">\n")?;
                } else {
                    if node
                        .last_child()
                        .is_some_and(|row| node_matches!(row, NodeValue::TableRow(false)))
                    {
                        self.cr()?;
                        self.write_str("</tbody>\n")?;
                    }
                    self.cr()?;
                    self.write_str("</table>\n")?;
                }
            }
            NodeValue::TableRow(header) => {
                if entering {
                    self.cr()?;
                    if header {
                        self.write_str("<thead>\n")?;
                    } else if node
                        .previous_sibling()
                        .is_some_and(|row| node_matches!(row, NodeValue::TableRow(true)))
                    {
                        self.write_str("<tbody>\n")?;
                    }
                    self.write_str("<tr")?;
                    self.render_sourcepos(node)?;
                    self.write_str(">")?;
                    self.cell_index = 0;
                } else {
                    self.cr()?;
                    self.write_str("</tr>")?;
                    if header {
                        self.cr()?;
                        self.write_str("</thead>")?;
                    }
                }
            }
            NodeValue::TableCell => {
                let header = node
                    .parent()
                    .is_some_and(|row| node_matches!(row, NodeValue::TableRow(true)));

                if entering {
                    let align = node
                        .parent()
                        .and_then(|row| row.parent())
                        .and_then(|table| match table.data.borrow().value {
                            NodeValue::Table(ref nt) => nt.alignments.get(self.cell_index).copied(),
                            _ => None,
                        })
                        .unwrap_or(TableAlignment::None);

                    self.cr()?;
                    self.write_str(if header { "<th" } else { "<td" })?;
                    if let Some(name) = align.html_name() {
                        write!(self, " align=\"{}\"", name)?;
                    }
                    self.render_sourcepos(node)?;
                    self.write_str(">")?;
                } else {
                    self.write_str(if header { "</th>" } else { "</td>" })?;
                    self.cell_index += 1;
                }
            }
            NodeValue::Text(ref literal) => {
                if entering {
                    self.escape(literal)?;
                }
            }
            NodeValue::LineBreak => {
                if entering {
                    self.write_str("<br />\n")?;
                }
            }
            NodeValue::SoftBreak => {
                if entering {
                    if self.options.render.hardbreaks {
                        self.write_str("<br />\n")?;
                    } else {
                        self.write_str("\n")?;
                    }
                }
            }
            NodeValue::Code(ref code) => {
                if entering {
                    self.write_str("<code>")?;
                    self.escape(&code.literal)?;
                    self.write_str("</code>")?;
                }
            }
            NodeValue::HtmlInline(ref literal) => {
                if entering {
                    self.write_raw_html(literal)?;
                }
            }
            NodeValue::Strong => {
                self.write_str(if entering { "<strong>" } else { "</strong>" })?;
            }
            NodeValue::Emph => {
                self.write_str(if entering { "<em>" } else { "</em>" })?;
            }
            NodeValue::Strikethrough => {
                self.write_str(if entering { "<del>" } else { "</del>" })?;
            }
            NodeValue::Link(ref nl) => {
                if entering {
                    self.write_str("<a href=\"")?;
                    self.escape_href(&nl.url)?;
                    if !nl.title.is_empty() {
                        self.write_str("\" title=\"")?;
                        self.escape(&nl.title)?;
                    }
                    self.write_str("\">")?;
                } else {
                    self.write_str("</a>")?;
                }
            }
            NodeValue::Image(ref nl) => {
                if entering {
                    self.write_str("<img src=\"")?;
                    self.escape_href(&nl.url)?;
                    self.write_str("\" alt=\"")?;
                } else {
                    if !nl.title.is_empty() {
                        self.write_str("\" title=\"")?;
                        self.escape(&nl.title)?;
                    }
                    self.write_str("\" />")?;
                }
            }
        }
        Ok(())
    }
}
