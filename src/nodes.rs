//! The document tree built by the parser and consumed by the renderer.

use crate::arena_tree::Node;
use std::cell::RefCell;
use std::fmt;

/// The value carried by each node of the document tree.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeValue {
    /// The root of every document.  Contains **blocks**.
    Document,

    /// **Block**.  A block quote.  Contains other **blocks**.
    ///
    /// ``` md
    /// > A block quote.
    /// ```
    BlockQuote,

    /// **Block**.  A bullet or ordered list.  Contains list items.
    ///
    /// ``` md
    /// * An unordered list
    /// * Another item
    ///
    /// 1. An ordered list
    /// 2. Another item
    /// ```
    List(NodeList),

    /// **Block**.  A list item.  Contains other **blocks**.
    Item(NodeList),

    /// **Block**.  A list item that starts with a task marker (`[ ]` or `[x]`).
    /// Holds the character between the brackets when the task is checked.
    /// Only produced with `extension.tasklist`.
    TaskItem(Option<char>),

    /// **Block**.  A fenced or indented code block.  Holds raw text which is
    /// escaped but never parsed.
    CodeBlock(NodeCodeBlock),

    /// **Block**.  A raw HTML block.  Holds raw text which is neither parsed
    /// nor escaped.
    HtmlBlock(NodeHtmlBlock),

    /// **Block**.  A paragraph.  Contains **inlines**.
    Paragraph,

    /// **Block**.  An ATX or setext heading.  Contains **inlines**.
    Heading(NodeHeading),

    /// **Block**.  A thematic break.  Has no children.
    ThematicBreak,

    /// **Block**.  A GFM table.  Contains table rows.
    Table(NodeTable),

    /// **Block**.  A table row; `true` for the header row.  Contains table
    /// cells.
    TableRow(bool),

    /// **Block**.  A table cell.  Contains **inlines**.
    TableCell,

    /// **Inline**.  Literal text.
    Text(String),

    /// **Inline**.  A soft line break, rendered as a newline unless
    /// `render.hardbreaks` is set.
    SoftBreak,

    /// **Inline**.  A hard line break.
    LineBreak,

    /// **Inline**.  A code span.
    Code(NodeCode),

    /// **Inline**.  Raw HTML.
    HtmlInline(String),

    /// **Inline**.  Emphasised text.
    Emph,

    /// **Inline**.  Strongly emphasised text.
    Strong,

    /// **Inline**.  GFM strikethrough text.
    Strikethrough,

    /// **Inline**.  A link, including autolinks.
    Link(NodeLink),

    /// **Inline**.  An image.  Its children form the alt text.
    Image(NodeLink),
}

/// Alignment of a table column.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TableAlignment {
    /// No alignment given.
    None,

    /// `:---`
    Left,

    /// `:---:`
    Center,

    /// `---:`
    Right,
}

impl TableAlignment {
    pub(crate) fn html_name(self) -> Option<&'static str> {
        match self {
            TableAlignment::None => None,
            TableAlignment::Left => Some("left"),
            TableAlignment::Center => Some("center"),
            TableAlignment::Right => Some("right"),
        }
    }
}

/// The layout of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeTable {
    /// One alignment per column.
    pub alignments: Vec<TableAlignment>,

    /// Number of rows, header included.
    pub num_rows: usize,
}

/// A code span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeCode {
    /// Length of the backtick run that delimited the span.
    pub num_backticks: usize,

    /// The normalised contents of the span.
    pub literal: String,
}

/// The destination of a link or the source of an image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeLink {
    /// The destination URL, unescaped but not yet percent-encoded.
    pub url: String,

    /// The title; empty when none was given.
    pub title: String,
}

/// The shape of a list and, for items, of their marker.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NodeList {
    /// Bullet or ordered.
    pub list_type: ListType,

    /// Columns of indentation before the marker.
    pub marker_offset: usize,

    /// Columns from the start of the marker to the item's content.
    pub padding: usize,

    /// For ordered lists, the number of the first item.
    pub start: usize,

    /// For ordered lists, the character after each number.
    pub delimiter: ListDelimType,

    /// For bullet lists, the bullet character.
    pub bullet_char: u8,

    /// Whether the list is tight, i.e. its paragraphs render without `<p>`.
    pub tight: bool,
}

/// The kind of list.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ListType {
    /// An unordered list.
    #[default]
    Bullet,

    /// An ordered list.
    Ordered,
}

/// The character after each number of an ordered list.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ListDelimType {
    /// `1.`
    #[default]
    Period,

    /// `1)`
    Paren,
}

/// A fenced or indented code block.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct NodeCodeBlock {
    /// Whether the block is fenced.
    pub fenced: bool,

    /// The fence character, `` ` `` or `~`.
    pub fence_char: u8,

    /// Length of the opening fence.
    pub fence_length: usize,

    /// Indentation of the opening fence, removed from each content line.
    pub fence_offset: usize,

    /// The unescaped info string after the opening fence.
    pub info: String,

    /// The block's contents.
    pub literal: String,
}

/// A heading.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeHeading {
    /// 1 to 6 for ATX headings, 1 or 2 for setext headings.
    pub level: u8,

    /// Whether the heading was underlined (setext) rather than prefixed (ATX).
    pub setext: bool,
}

/// A raw HTML block.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NodeHtmlBlock {
    /// Which of the seven start conditions opened the block.
    pub block_type: u8,

    /// The block's contents.
    pub literal: String,
}

impl NodeValue {
    /// Whether this is a block node, as opposed to an inline one.
    pub fn block(&self) -> bool {
        matches!(
            *self,
            NodeValue::Document
                | NodeValue::BlockQuote
                | NodeValue::List(..)
                | NodeValue::Item(..)
                | NodeValue::TaskItem(..)
                | NodeValue::CodeBlock(..)
                | NodeValue::HtmlBlock(..)
                | NodeValue::Paragraph
                | NodeValue::Heading(..)
                | NodeValue::ThematicBreak
                | NodeValue::Table(..)
                | NodeValue::TableRow(..)
                | NodeValue::TableCell
        )
    }

    /// Whether nodes of this kind hold inline content.
    pub fn contains_inlines(&self) -> bool {
        matches!(
            *self,
            NodeValue::Paragraph | NodeValue::Heading(..) | NodeValue::TableCell
        )
    }

    /// The text of a `Text` node.
    pub fn text(&self) -> Option<&String> {
        match *self {
            NodeValue::Text(ref t) => Some(t),
            _ => None,
        }
    }

    /// The text of a `Text` node, mutably.
    pub fn text_mut(&mut self) -> Option<&mut String> {
        match *self {
            NodeValue::Text(ref mut t) => Some(t),
            _ => None,
        }
    }

    pub(crate) fn accepts_lines(&self) -> bool {
        matches!(
            *self,
            NodeValue::Paragraph | NodeValue::Heading(..) | NodeValue::CodeBlock(..)
        )
    }
}

/// A node of the document tree together with the parser's bookkeeping.
#[derive(Debug, Clone)]
pub struct Ast {
    /// The node value itself.
    pub value: NodeValue,

    /// Where in the input the node came from.
    pub sourcepos: Sourcepos,

    pub(crate) content: String,
    pub(crate) open: bool,
    pub(crate) last_line_blank: bool,
}

impl Ast {
    /// A new, open node starting at `start`.
    pub fn new(value: NodeValue, start: LineColumn) -> Self {
        Ast {
            value,
            sourcepos: (start.line, start.column, start.line, 0).into(),
            content: String::new(),
            open: true,
            last_line_blank: false,
        }
    }
}

/// A node of the document tree, allocated in an `Arena` that lives for `'a`.
pub type AstNode<'a> = Node<'a, RefCell<Ast>>;

/// The start and end of a node in the input, both inclusive.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Sourcepos {
    /// The first character of the node.
    pub start: LineColumn,
    /// The last character of the node.
    pub end: LineColumn,
}

impl fmt::Display for Sourcepos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}-{}:{}",
            self.start.line, self.start.column, self.end.line, self.end.column,
        )
    }
}

impl From<(usize, usize, usize, usize)> for Sourcepos {
    fn from(sp: (usize, usize, usize, usize)) -> Sourcepos {
        Sourcepos {
            start: (sp.0, sp.1).into(),
            end: (sp.2, sp.3).into(),
        }
    }
}

/// A 1-based line and column.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LineColumn {
    /// The line, counting from 1.
    pub line: usize,
    /// The byte column within the line, counting from 1.
    pub column: usize,
}

impl From<(usize, usize)> for LineColumn {
    fn from(lc: (usize, usize)) -> LineColumn {
        LineColumn {
            line: lc.0,
            column: lc.1,
        }
    }
}

/// Whether `node` may hold a child with the value `child`.
pub fn can_contain_type<'a>(node: &'a AstNode<'a>, child: &NodeValue) -> bool {
    if let NodeValue::Document = *child {
        return false;
    }

    match node.data.borrow().value {
        NodeValue::Document
        | NodeValue::BlockQuote
        | NodeValue::Item(..)
        | NodeValue::TaskItem(..) => {
            child.block() && !matches!(*child, NodeValue::Item(..) | NodeValue::TaskItem(..))
        }

        NodeValue::List(..) => matches!(*child, NodeValue::Item(..) | NodeValue::TaskItem(..)),

        NodeValue::Paragraph
        | NodeValue::Heading(..)
        | NodeValue::Emph
        | NodeValue::Strong
        | NodeValue::Strikethrough
        | NodeValue::Link(..)
        | NodeValue::Image(..)
        | NodeValue::TableCell => !child.block(),

        NodeValue::Table(..) => matches!(*child, NodeValue::TableRow(..)),

        NodeValue::TableRow(..) => matches!(*child, NodeValue::TableCell),

        _ => false,
    }
}

pub(crate) fn ends_with_blank_line<'a>(node: &'a AstNode<'a>) -> bool {
    let mut it = Some(node);
    while let Some(cur) = it {
        if cur.data.borrow().last_line_blank {
            return true;
        }
        it = match cur.data.borrow().value {
            NodeValue::List(..) | NodeValue::Item(..) | NodeValue::TaskItem(..) => {
                cur.last_child()
            }
            _ => None,
        };
    }
    false
}

/// The depth of the deepest node below `root`, counting `root` as depth 0.
pub(crate) fn max_depth<'a>(root: &'a AstNode<'a>) -> usize {
    use crate::arena_tree::NodeEdge;

    let mut depth = 0;
    let mut deepest = 0;
    for edge in root.traverse() {
        match edge {
            NodeEdge::Start(_) => {
                deepest = deepest.max(depth);
                depth += 1;
            }
            NodeEdge::End(_) => depth -= 1,
        }
    }
    deepest
}
