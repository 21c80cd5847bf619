//! The block parser, and the entry points that drive a whole parse.

mod inlines;
pub mod lines;
pub mod options;
mod references;
mod table;

use std::cell::RefCell;
use std::cmp::min;
use std::mem;

use tracing::{debug, warn};
use typed_arena::Arena;

use crate::arena_tree::Node;
use crate::ctype::{isdigit, isspace};
use crate::entity;
use crate::error::{Error, Result};
use crate::nodes::{
    self, Ast, AstNode, ListDelimType, ListType, NodeCodeBlock, NodeHeading, NodeHtmlBlock,
    NodeList, NodeValue,
};
use crate::parser::lines::Lines;
use crate::scanners::{self, SetextChar};
use crate::strings;

pub use crate::parser::options::{Extension, Limits, Options, Parse, Render};
pub use crate::parser::references::{RefMap, ResolvedReference};

const TAB_STOP: usize = 4;
const CODE_INDENT: usize = 4;

// Very deeply nested lists can cause quadratic performance issues.
// This constant is used in open_new_blocks() to limit the nesting
// depth. It is unlikely that a non-contrived markdown document will
// be nested this deeply.
const MAX_LIST_DEPTH: usize = 100;

/// Upper bound on the bytes that reference expansion may add to a document.
const MAX_REFERENCE_EXPANSION: usize = 100_000;

/// Parse a Markdown document to an AST.
///
/// See the documentation of the crate root for an example.
pub fn parse_document<'a>(
    arena: &'a Arena<AstNode<'a>>,
    md: &str,
    options: &Options,
) -> &'a AstNode<'a> {
    let root: &'a AstNode<'a> = arena.alloc(Node::new(RefCell::new(Ast::new(
        NodeValue::Document,
        (1, 1).into(),
    ))));
    let parser = Parser::new(arena, root, options);
    parser.parse(md)
}

/// Parse a Markdown document to an AST, enforcing `options.parse.limits`.
///
/// ```rust
/// # use mdhtml::{try_parse_document, Arena, Error, Options};
/// let arena = Arena::new();
/// let mut options = Options::default();
/// options.parse.limits.max_input_size = Some(8);
/// assert!(try_parse_document(&arena, "*small*", &options).is_ok());
/// assert!(matches!(
///     try_parse_document(&arena, "*not so small*", &options),
///     Err(Error::InputTooLarge { .. })
/// ));
/// ```
pub fn try_parse_document<'a>(
    arena: &'a Arena<AstNode<'a>>,
    md: &str,
    options: &Options,
) -> Result<&'a AstNode<'a>> {
    let limits = &options.parse.limits;

    if let Some(limit) = limits.max_input_size {
        if md.len() > limit {
            warn!(size = md.len(), limit, "input exceeds the size limit");
            return Err(Error::InputTooLarge {
                size: md.len(),
                limit,
            });
        }
    }

    let root = parse_document(arena, md, options);

    if let Some(limit) = limits.max_nesting_depth {
        let depth = nodes::max_depth(root);
        if depth > limit {
            warn!(depth, limit, "document exceeds the nesting limit");
            return Err(Error::NestingTooDeep { depth, limit });
        }
    }

    Ok(root)
}

/// Block-level state for parsing one document.
pub struct Parser<'a, 'o> {
    arena: &'a Arena<AstNode<'a>>,
    refmap: RefMap,
    root: &'a AstNode<'a>,
    current: &'a AstNode<'a>,
    line_number: usize,
    offset: usize,
    column: usize,
    thematic_break_kill_pos: usize,
    first_nonspace: usize,
    first_nonspace_column: usize,
    indent: usize,
    blank: bool,
    partially_consumed_tab: bool,
    curline_len: usize,
    curline_end_col: usize,
    last_line_length: usize,
    total_size: usize,
    table_autocompleted_cells: usize,
    options: &'o Options,
}

impl<'a, 'o> Parser<'a, 'o> {
    fn new(arena: &'a Arena<AstNode<'a>>, root: &'a AstNode<'a>, options: &'o Options) -> Self {
        Parser {
            arena,
            refmap: RefMap::new(),
            root,
            current: root,
            line_number: 0,
            offset: 0,
            column: 0,
            thematic_break_kill_pos: 0,
            first_nonspace: 0,
            first_nonspace_column: 0,
            indent: 0,
            blank: false,
            partially_consumed_tab: false,
            curline_len: 0,
            curline_end_col: 0,
            last_line_length: 0,
            total_size: 0,
            table_autocompleted_cells: 0,
            options,
        }
    }

    fn parse(mut self, s: &str) -> &'a AstNode<'a> {
        self.total_size = s.len();
        debug!(bytes = s.len(), "parsing document");

        let mut buf = String::new();
        for line in Lines::new(s) {
            buf.clear();
            if line.content.contains('\0') {
                buf.push_str(&line.content.replace('\0', "\u{fffd}"));
            } else {
                buf.push_str(line.content);
            }
            buf.push('\n');
            self.process_line(&buf);
        }

        self.finalize_document();
        self.postprocess_text_nodes(self.root);

        debug!(
            lines = self.line_number,
            references = self.refmap.len(),
            "parsed document"
        );
        self.root
    }

    fn process_line(&mut self, line: &str) {
        self.curline_len = line.len();
        self.curline_end_col = line.len() - 1;

        self.offset = 0;
        self.column = 0;
        self.first_nonspace = 0;
        self.first_nonspace_column = 0;
        self.indent = 0;
        self.thematic_break_kill_pos = 0;
        self.blank = false;
        self.partially_consumed_tab = false;

        self.line_number += 1;

        if let Some((last_matched_container, all_matched)) = self.check_open_blocks(line) {
            let mut container = last_matched_container;
            let current = self.current;
            self.open_new_blocks(&mut container, line, all_matched);

            if current.same_node(self.current) {
                self.add_text_to_container(container, last_matched_container, line);
            }
        }

        self.last_line_length = self.curline_end_col;

        self.curline_len = 0;
        self.curline_end_col = 0;
    }

    fn check_open_blocks(&mut self, line: &str) -> Option<(&'a AstNode<'a>, bool)> {
        let (all_matched, mut container) = self.check_open_blocks_inner(self.root, line)?;

        if !all_matched {
            if let Some(parent) = container.parent() {
                container = parent;
            }
        }

        Some((container, all_matched))
    }

    fn check_open_blocks_inner(
        &mut self,
        mut container: &'a AstNode<'a>,
        line: &str,
    ) -> Option<(bool, &'a AstNode<'a>)> {
        let mut all_matched = false;

        loop {
            container = match container.last_child() {
                Some(child) if child.data.borrow().open => child,
                _ => {
                    all_matched = true;
                    break;
                }
            };

            self.find_first_nonspace(line);

            let value = container.data.borrow().value.clone();
            match value {
                NodeValue::BlockQuote => {
                    if !self.parse_block_quote_prefix(line) {
                        break;
                    }
                }
                NodeValue::Item(ref nl) => {
                    if !self.parse_node_item_prefix(line, container, nl) {
                        break;
                    }
                }
                NodeValue::CodeBlock(ref ncb) => {
                    if !self.parse_code_block_prefix(line, container, ncb)? {
                        break;
                    }
                }
                NodeValue::HtmlBlock(ref nhb) => {
                    if !self.parse_html_block_prefix(nhb.block_type) {
                        break;
                    }
                }
                NodeValue::Paragraph => {
                    if self.blank {
                        break;
                    }
                }
                NodeValue::Table(..) => {
                    if !table::matches(&line[self.first_nonspace..]) {
                        break;
                    }
                }
                NodeValue::Heading(..) | NodeValue::TableRow(..) | NodeValue::TableCell => {
                    break;
                }
                _ => {}
            }
        }

        Some((all_matched, container))
    }

    fn find_first_nonspace(&mut self, line: &str) {
        let mut chars_to_tab = TAB_STOP - (self.column % TAB_STOP);
        let bytes = line.as_bytes();

        if self.first_nonspace <= self.offset {
            self.first_nonspace = self.offset;
            self.first_nonspace_column = self.column;

            loop {
                match bytes.get(self.first_nonspace) {
                    Some(b' ') => {
                        self.first_nonspace += 1;
                        self.first_nonspace_column += 1;
                        chars_to_tab -= 1;
                        if chars_to_tab == 0 {
                            chars_to_tab = TAB_STOP;
                        }
                    }
                    Some(b'\t') => {
                        self.first_nonspace += 1;
                        self.first_nonspace_column += chars_to_tab;
                        chars_to_tab = TAB_STOP;
                    }
                    _ => break,
                }
            }
        }

        self.indent = self.first_nonspace_column - self.column;
        self.blank = bytes
            .get(self.first_nonspace)
            .map_or(true, |&b| strings::is_line_end_char(b));
    }

    fn parse_block_quote_prefix(&mut self, line: &str) -> bool {
        let indent = self.indent;
        if indent <= 3 && line.as_bytes().get(self.first_nonspace) == Some(&b'>') {
            self.advance_offset(line, indent + 1, true);

            if byte_matches(line, self.offset, strings::is_space_or_tab) {
                self.advance_offset(line, 1, true);
            }

            return true;
        }

        false
    }

    fn parse_node_item_prefix(
        &mut self,
        line: &str,
        container: &'a AstNode<'a>,
        nl: &NodeList,
    ) -> bool {
        if self.indent >= nl.marker_offset + nl.padding {
            self.advance_offset(line, nl.marker_offset + nl.padding, true);
            true
        } else if self.blank && container.first_child().is_some() {
            let offset = self.first_nonspace - self.offset;
            self.advance_offset(line, offset, false);
            true
        } else {
            false
        }
    }

    /// Returns `None` when the line closed the block and nothing more is to
    /// be done with it.
    fn parse_code_block_prefix(
        &mut self,
        line: &str,
        container: &'a AstNode<'a>,
        ncb: &NodeCodeBlock,
    ) -> Option<bool> {
        if !ncb.fenced {
            if self.indent >= CODE_INDENT {
                self.advance_offset(line, CODE_INDENT, true);
                return Some(true);
            } else if self.blank {
                let offset = self.first_nonspace - self.offset;
                self.advance_offset(line, offset, false);
                return Some(true);
            }
            return Some(false);
        }

        let matched = if self.indent <= 3
            && line.as_bytes().get(self.first_nonspace) == Some(&ncb.fence_char)
        {
            scanners::close_code_fence(line[self.first_nonspace..].as_bytes()).unwrap_or(0)
        } else {
            0
        };

        if matched >= ncb.fence_length {
            self.advance_offset(line, matched, false);
            self.current = self.finalize(container).unwrap_or(self.root);
            container.data.borrow_mut().sourcepos.end =
                (self.line_number, self.curline_end_col).into();
            return None;
        }

        let mut i = ncb.fence_offset;
        while i > 0 && byte_matches(line, self.offset, strings::is_space_or_tab) {
            self.advance_offset(line, 1, true);
            i -= 1;
        }
        Some(true)
    }

    fn parse_html_block_prefix(&self, t: u8) -> bool {
        match t {
            1..=5 => true,
            6 | 7 => !self.blank,
            _ => unreachable!("HTML block type {t}"),
        }
    }

    fn open_new_blocks(&mut self, container: &mut &'a AstNode<'a>, line: &str, all_matched: bool) {
        let mut maybe_lazy = node_matches!(self.current, NodeValue::Paragraph);
        let mut depth = 0;

        while !node_matches!(
            container,
            NodeValue::CodeBlock(..) | NodeValue::HtmlBlock(..)
        ) {
            depth += 1;
            self.find_first_nonspace(line);
            let indented = self.indent >= CODE_INDENT;

            if !((!indented
                && (self.handle_setext_heading(container, line)
                    || self.handle_thematic_break(container, line, all_matched)
                    || self.handle_atx_heading(container, line)
                    || self.handle_code_fence(container, line)
                    || self.handle_html_block(container, line)
                    || self.handle_blockquote(container, line)))
                || self.handle_list(container, line, indented, depth)
                || self.handle_code_block(container, line, indented, maybe_lazy)
                || self.handle_table(container, line, indented))
            {
                break;
            }

            if container.data.borrow().value.accepts_lines() {
                break;
            }

            maybe_lazy = false;
        }
    }

    fn handle_setext_heading(&mut self, container: &mut &'a AstNode<'a>, line: &str) -> bool {
        let Some(sc) = self.detect_setext_heading(container, line) else {
            return false;
        };

        let has_content = {
            let mut ast = container.data.borrow_mut();
            self.resolve_reference_link_definitions(&mut ast.content)
        };
        if has_content {
            container.data.borrow_mut().value = NodeValue::Heading(NodeHeading {
                level: match sc {
                    SetextChar::Equals => 1,
                    SetextChar::Hyphen => 2,
                },
                setext: true,
            });
            let adv = self.curline_end_col - self.offset;
            self.advance_offset(line, adv, false);
        }

        true
    }

    fn detect_setext_heading(&self, container: &'a AstNode<'a>, line: &str) -> Option<SetextChar> {
        if node_matches!(container, NodeValue::Paragraph) {
            scanners::setext_heading_line(line[self.first_nonspace..].as_bytes())
        } else {
            None
        }
    }

    fn handle_thematic_break(
        &mut self,
        container: &mut &'a AstNode<'a>,
        line: &str,
        all_matched: bool,
    ) -> bool {
        if !self.detect_thematic_break(container, line, all_matched) {
            return false;
        }

        *container = self.add_child(container, NodeValue::ThematicBreak, self.first_nonspace + 1);
        container.data.borrow_mut().sourcepos.end =
            (self.line_number, self.curline_end_col).into();

        let adv = self.curline_end_col - self.offset;
        self.advance_offset(line, adv, false);

        true
    }

    fn detect_thematic_break(
        &mut self,
        container: &'a AstNode<'a>,
        line: &str,
        all_matched: bool,
    ) -> bool {
        if (all_matched || !node_matches!(container, NodeValue::Paragraph))
            && self.thematic_break_kill_pos <= self.first_nonspace
        {
            let (offset, found) = self.scan_thematic_break_inner(line);
            if !found {
                self.thematic_break_kill_pos = offset;
            }
            found
        } else {
            false
        }
    }

    /// Scans for `***`, `---` or `___`, spaces and tabs allowed between.  On
    /// failure returns the position scanning stopped at, so the same line is
    /// not rescanned by nested containers.
    fn scan_thematic_break_inner(&self, line: &str) -> (usize, bool) {
        let bytes = line.as_bytes();
        let mut i = self.first_nonspace;

        let b = match bytes.get(i) {
            Some(&b) if b == b'*' || b == b'_' || b == b'-' => b,
            _ => return (i, false),
        };

        let mut count = 1;
        let nextb = loop {
            i += 1;
            let Some(&nextb) = bytes.get(i) else {
                break b'\n';
            };

            if nextb == b {
                count += 1;
            } else if nextb != b' ' && nextb != b'\t' {
                break nextb;
            }
        };

        if count >= 3 && strings::is_line_end_char(nextb) {
            (i, true)
        } else {
            (i, false)
        }
    }

    fn handle_atx_heading(&mut self, container: &mut &'a AstNode<'a>, line: &str) -> bool {
        let Some(matched) = scanners::atx_heading_start(line[self.first_nonspace..].as_bytes())
        else {
            return false;
        };

        let heading_startpos = self.first_nonspace;
        let offset = self.offset;
        self.advance_offset(line, heading_startpos + matched - offset, false);

        let level = line.as_bytes()[heading_startpos..]
            .iter()
            .take_while(|&&c| c == b'#')
            .count() as u8;

        *container = self.add_child(
            container,
            NodeValue::Heading(NodeHeading {
                level,
                setext: false,
            }),
            heading_startpos + 1,
        );

        true
    }

    fn handle_code_fence(&mut self, container: &mut &'a AstNode<'a>, line: &str) -> bool {
        let Some(matched) = scanners::open_code_fence(line[self.first_nonspace..].as_bytes())
        else {
            return false;
        };

        let first_nonspace = self.first_nonspace;
        let offset = self.offset;
        let ncb = NodeCodeBlock {
            fenced: true,
            fence_char: line.as_bytes()[first_nonspace],
            fence_length: matched,
            fence_offset: first_nonspace - offset,
            info: String::new(),
            literal: String::new(),
        };
        *container = self.add_child(container, NodeValue::CodeBlock(ncb), first_nonspace + 1);
        self.advance_offset(line, first_nonspace + matched - offset, false);

        true
    }

    fn handle_html_block(&mut self, container: &mut &'a AstNode<'a>, line: &str) -> bool {
        let rest = line[self.first_nonspace..].as_bytes();
        let Some(block_type) = scanners::html_block_start(rest).or_else(|| {
            if node_matches!(container, NodeValue::Paragraph) {
                None
            } else {
                scanners::html_block_start_7(rest)
            }
        }) else {
            return false;
        };

        let nhb = NodeHtmlBlock {
            block_type,
            literal: String::new(),
        };
        *container = self.add_child(container, NodeValue::HtmlBlock(nhb), self.first_nonspace + 1);

        true
    }

    fn handle_blockquote(&mut self, container: &mut &'a AstNode<'a>, line: &str) -> bool {
        if line.as_bytes().get(self.first_nonspace) != Some(&b'>') {
            return false;
        }

        let blockquote_startpos = self.first_nonspace;

        let offset = self.first_nonspace + 1 - self.offset;
        self.advance_offset(line, offset, false);
        if byte_matches(line, self.offset, strings::is_space_or_tab) {
            self.advance_offset(line, 1, true);
        }
        *container = self.add_child(container, NodeValue::BlockQuote, blockquote_startpos + 1);

        true
    }

    fn handle_list(
        &mut self,
        container: &mut &'a AstNode<'a>,
        line: &str,
        indented: bool,
        depth: usize,
    ) -> bool {
        let Some((matched, mut nl)) = self.detect_list(container, line, indented, depth) else {
            return false;
        };

        let offset = self.first_nonspace + matched - self.offset;
        self.advance_offset(line, offset, false);
        let (save_partially_consumed_tab, save_offset, save_column) =
            (self.partially_consumed_tab, self.offset, self.column);

        while self.column - save_column <= 5
            && byte_matches(line, self.offset, strings::is_space_or_tab)
        {
            self.advance_offset(line, 1, true);
        }

        let i = self.column - save_column;
        if !(1..5).contains(&i) || byte_matches(line, self.offset, strings::is_line_end_char) {
            nl.padding = matched + 1;
            self.offset = save_offset;
            self.column = save_column;
            self.partially_consumed_tab = save_partially_consumed_tab;
            if i > 0 {
                self.advance_offset(line, 1, true);
            }
        } else {
            nl.padding = matched + i;
        }

        nl.marker_offset = self.indent;

        let starts_new_list = match container.data.borrow().value {
            NodeValue::List(ref mnl) => !lists_match(&nl, mnl),
            _ => true,
        };
        if starts_new_list {
            *container = self.add_child(container, NodeValue::List(nl), self.first_nonspace + 1);
        }

        *container = self.add_child(container, NodeValue::Item(nl), self.first_nonspace + 1);

        true
    }

    fn detect_list(
        &self,
        container: &'a AstNode<'a>,
        line: &str,
        indented: bool,
        depth: usize,
    ) -> Option<(usize, NodeList)> {
        if (!indented || node_matches!(container, NodeValue::List(..)))
            && self.indent < 4
            && depth < MAX_LIST_DEPTH
        {
            parse_list_marker(
                line,
                self.first_nonspace,
                node_matches!(container, NodeValue::Paragraph),
            )
        } else {
            None
        }
    }

    fn handle_code_block(
        &mut self,
        container: &mut &'a AstNode<'a>,
        line: &str,
        indented: bool,
        maybe_lazy: bool,
    ) -> bool {
        if !indented || maybe_lazy || self.blank {
            return false;
        }

        self.advance_offset(line, CODE_INDENT, true);
        *container = self.add_child(
            container,
            NodeValue::CodeBlock(NodeCodeBlock::default()),
            self.offset + 1,
        );

        true
    }

    fn handle_table(&mut self, container: &mut &'a AstNode<'a>, line: &str, indented: bool) -> bool {
        if indented || !self.options.extension.table {
            return false;
        }

        match table::try_opening_block(self, container, line) {
            Some(new_container) => {
                *container = new_container;
                true
            }
            None => false,
        }
    }

    fn advance_offset(&mut self, line: &str, mut count: usize, columns: bool) {
        let bytes = line.as_bytes();
        while count > 0 {
            match bytes[self.offset] {
                b'\t' => {
                    let chars_to_tab = TAB_STOP - (self.column % TAB_STOP);
                    if columns {
                        self.partially_consumed_tab = chars_to_tab > count;
                        let chars_to_advance = min(count, chars_to_tab);
                        self.column += chars_to_advance;
                        if !self.partially_consumed_tab {
                            self.offset += 1;
                        }
                        count -= chars_to_advance;
                    } else {
                        self.partially_consumed_tab = false;
                        self.column += chars_to_tab;
                        self.offset += 1;
                        count -= 1;
                    }
                }
                _ => {
                    self.partially_consumed_tab = false;
                    self.offset += 1;
                    self.column += 1;
                    count -= 1;
                }
            }
        }
    }

    fn add_child(
        &mut self,
        mut parent: &'a AstNode<'a>,
        value: NodeValue,
        start_column: usize,
    ) -> &'a AstNode<'a> {
        while !nodes::can_contain_type(parent, &value) {
            parent = match self.finalize(parent) {
                Some(grandparent) => grandparent,
                None => break,
            };
        }

        debug_assert!(start_column > 0);

        let child = Ast::new(value, (self.line_number, start_column).into());
        let node = self.arena.alloc(Node::new(RefCell::new(child)));
        parent.append(node);
        node
    }

    fn add_text_to_container(
        &mut self,
        mut container: &'a AstNode<'a>,
        last_matched_container: &'a AstNode<'a>,
        line: &str,
    ) {
        self.find_first_nonspace(line);

        if self.blank {
            if let Some(last_child) = container.last_child() {
                last_child.data.borrow_mut().last_line_blank = true;
            }
        }

        let last_line_blank = self.blank
            && match container.data.borrow().value {
                NodeValue::BlockQuote
                | NodeValue::Heading(..)
                | NodeValue::ThematicBreak
                | NodeValue::Table(..) => false,
                NodeValue::CodeBlock(ref ncb) => !ncb.fenced,
                NodeValue::Item(..) => {
                    container.first_child().is_some()
                        || container.data.borrow().sourcepos.start.line != self.line_number
                }
                _ => true,
            };
        container.data.borrow_mut().last_line_blank = last_line_blank;

        let mut tmp = container;
        while let Some(parent) = tmp.parent() {
            parent.data.borrow_mut().last_line_blank = false;
            tmp = parent;
        }

        if !self.current.same_node(last_matched_container)
            && container.same_node(last_matched_container)
            && !self.blank
            && node_matches!(self.current, NodeValue::Paragraph)
        {
            // Lazy continuation of the innermost open paragraph.
            self.add_line(self.current, line);
            return;
        }

        while !self.current.same_node(last_matched_container) {
            self.current = self.finalize(self.current).unwrap_or(self.root);
        }

        let add_text_result = match container.data.borrow().value {
            NodeValue::CodeBlock(..) => AddTextResult::LiteralText,
            NodeValue::HtmlBlock(ref nhb) => AddTextResult::HtmlBlock(nhb.block_type),
            _ => AddTextResult::Otherwise,
        };

        match add_text_result {
            AddTextResult::LiteralText => self.add_line(container, line),
            AddTextResult::HtmlBlock(block_type) => {
                self.add_line(container, line);

                let rest = line[self.first_nonspace..].as_bytes();
                let matches_end_condition = match block_type {
                    1 => scanners::html_block_end_1(rest),
                    2 => scanners::html_block_end_2(rest),
                    3 => scanners::html_block_end_3(rest),
                    4 => scanners::html_block_end_4(rest),
                    5 => scanners::html_block_end_5(rest),
                    _ => false,
                };

                if matches_end_condition {
                    container = self.finalize(container).unwrap_or(self.root);
                }
            }
            AddTextResult::Otherwise => {
                if self.blank {
                    // do nothing
                } else if container.data.borrow().value.accepts_lines() {
                    let mut line = line;
                    if node_matches!(container, NodeValue::Heading(NodeHeading { setext: false, .. }))
                    {
                        line = strings::chop_trailing_hashes(line);
                    }

                    // Chopping the closing sequence off an otherwise empty
                    // heading (`###   ###`) can leave `first_nonspace` past
                    // the end of what remains.
                    if self.first_nonspace <= line.len() {
                        let count = self.first_nonspace - self.offset;
                        self.advance_offset(line, count, false);
                        self.add_line(container, line);
                    }
                } else {
                    container =
                        self.add_child(container, NodeValue::Paragraph, self.first_nonspace + 1);
                    let count = self.first_nonspace - self.offset;
                    self.advance_offset(line, count, false);
                    self.add_line(container, line);
                }
            }
        }

        self.current = container;
    }

    fn add_line(&mut self, node: &'a AstNode<'a>, line: &str) {
        let mut ast = node.data.borrow_mut();
        debug_assert!(ast.open);
        if self.partially_consumed_tab {
            self.offset += 1;
            let chars_to_tab = TAB_STOP - (self.column % TAB_STOP);
            ast.content.extend(std::iter::repeat(' ').take(chars_to_tab));
        }
        if self.offset < line.len() {
            ast.content.push_str(&line[self.offset..]);
        }
    }

    fn finalize_document(&mut self) {
        while !self.current.same_node(self.root) {
            self.current = self.finalize(self.current).unwrap_or(self.root);
        }

        self.finalize(self.root);

        self.refmap
            .set_max_ref_size(min(self.total_size, MAX_REFERENCE_EXPANSION));

        self.process_inlines();
    }

    fn resolve_reference_link_definitions(&mut self, content: &mut String) -> bool {
        let mut pos = 0;

        while content.as_bytes().get(pos) == Some(&b'[') {
            match references::parse_reference_definition(&content[pos..]) {
                Some((consumed, label, reference)) => {
                    pos += consumed;
                    self.refmap.insert(label, reference);
                }
                None => break,
            }
        }

        if pos != 0 {
            content.drain(..pos);
        }

        !strings::is_blank(content)
    }

    /// Closes `node`, returning its parent.
    fn finalize(&mut self, node: &'a AstNode<'a>) -> Option<&'a AstNode<'a>> {
        let mut borrow = node.data.borrow_mut();
        let ast: &mut Ast = &mut borrow;
        debug_assert!(ast.open);
        ast.open = false;

        let parent = node.parent();

        if self.curline_len == 0 {
            ast.sourcepos.end = (self.line_number, self.last_line_length).into();
        } else if matches!(ast.value, NodeValue::Document) {
            ast.sourcepos.end = (self.line_number, self.curline_end_col).into();
        } else if !matches!(
            ast.value,
            NodeValue::ThematicBreak | NodeValue::TableRow(..) | NodeValue::Table(..)
        ) {
            ast.sourcepos.end = (self.line_number - 1, self.last_line_length).into();
        }

        let content = &mut ast.content;
        match ast.value {
            NodeValue::Paragraph => {
                if !self.resolve_reference_link_definitions(content) {
                    node.detach();
                }
            }
            NodeValue::CodeBlock(ref mut ncb) => {
                if !ncb.fenced {
                    strings::remove_trailing_blank_lines(content);
                    content.push('\n');
                } else {
                    let eol = content
                        .bytes()
                        .position(strings::is_line_end_char)
                        .unwrap_or(content.len());

                    let info = entity::unescape_html(&content[..eol]);
                    let info = strings::unescape(strings::trim(&info));
                    ncb.info = if info.is_empty() {
                        self.options
                            .parse
                            .default_info_string
                            .clone()
                            .unwrap_or_default()
                    } else {
                        info
                    };

                    let mut pos = eol;
                    if content.as_bytes().get(pos) == Some(&b'\r') {
                        pos += 1;
                    }
                    if content.as_bytes().get(pos) == Some(&b'\n') {
                        pos += 1;
                    }
                    content.drain(..pos);
                }
                ncb.literal = mem::take(content);
            }
            NodeValue::HtmlBlock(ref mut nhb) => {
                nhb.literal = mem::take(content);
            }
            NodeValue::List(ref mut nl) => {
                nl.tight = determine_list_tight(node);
            }
            _ => (),
        }

        parent
    }

    fn process_inlines(&mut self) {
        for node in self.root.descendants() {
            if node.data.borrow().value.contains_inlines() {
                self.parse_inlines(node);
            }
        }
    }

    fn parse_inlines(&mut self, node: &'a AstNode<'a>) {
        let (content, start) = {
            let mut ast = node.data.borrow_mut();
            (mem::take(&mut ast.content), ast.sourcepos.start)
        };

        let delimiter_arena = Arena::new();
        let mut subj = inlines::Subject::new(
            self.arena,
            self.options,
            strings::rtrim(&content),
            start,
            &mut self.refmap,
            &delimiter_arena,
        );

        while subj.parse_inline(node) {}
        subj.process_emphasis(0);
        subj.clear_brackets();
    }

    /// Joins adjacent text nodes, drops emptied ones, and recognises task
    /// list markers once the text they live in is whole.
    fn postprocess_text_nodes(&mut self, root: &'a AstNode<'a>) {
        let mut stack = vec![root];

        while let Some(node) = stack.pop() {
            let mut it = node.first_child();
            while let Some(child) = it {
                if node_matches!(child, NodeValue::Text(..)) {
                    while let Some(next) = child.next_sibling() {
                        let merged = match next.data.borrow().value.text() {
                            Some(following) => {
                                if let Some(text) = child.data.borrow_mut().value.text_mut() {
                                    text.push_str(following);
                                }
                                true
                            }
                            None => false,
                        };
                        if !merged {
                            break;
                        }
                        next.detach();
                    }
                }

                it = child.next_sibling();

                let emptied = child
                    .data
                    .borrow()
                    .value
                    .text()
                    .is_some_and(|t| t.is_empty());
                if emptied {
                    child.detach();
                }
            }

            if self.options.extension.tasklist && node_matches!(node, NodeValue::Paragraph) {
                if let Some(item) = node.parent() {
                    let is_first = item.first_child().is_some_and(|f| f.same_node(node));
                    if is_first && node_matches!(item, NodeValue::Item(..)) {
                        process_tasklist(node, item);
                    }
                }
            }

            let first_pushed = stack.len();
            stack.extend(node.children());
            stack[first_pushed..].reverse();
        }
    }
}

enum AddTextResult {
    LiteralText,
    HtmlBlock(u8),
    Otherwise,
}

fn byte_matches<F>(line: &str, offset: usize, predicate: F) -> bool
where
    F: Fn(u8) -> bool,
{
    line.as_bytes().get(offset).is_some_and(|&b| predicate(b))
}

fn determine_list_tight<'a>(node: &'a AstNode<'a>) -> bool {
    let mut ch = node.first_child();

    while let Some(item) = ch {
        if item.data.borrow().last_line_blank && item.next_sibling().is_some() {
            return false;
        }

        let mut subch = item.first_child();
        while let Some(subitem) = subch {
            if (item.next_sibling().is_some() || subitem.next_sibling().is_some())
                && nodes::ends_with_blank_line(subitem)
            {
                return false;
            }
            subch = subitem.next_sibling();
        }

        ch = item.next_sibling();
    }

    true
}

/// Turns `item` into a task item when `paragraph`, its first child, opens
/// with `[ ]`, `[x]` or `[X]` followed by whitespace.
fn process_tasklist<'a>(paragraph: &'a AstNode<'a>, item: &'a AstNode<'a>) {
    let Some(first) = paragraph.first_child() else {
        return;
    };

    let (symbol, emptied) = {
        let mut ast = first.data.borrow_mut();
        let Some(text) = ast.value.text_mut() else {
            return;
        };

        let bytes = text.as_bytes();
        if bytes.len() < 4 || bytes[0] != b'[' {
            return;
        }
        let symbol = match bytes[1] {
            b' ' => None,
            b'x' | b'X' => Some(bytes[1] as char),
            _ => return,
        };
        if bytes[2] != b']' || !strings::is_space_or_tab(bytes[3]) {
            return;
        }

        let rest = text[3..].trim_start_matches([' ', '\t']).len();
        let consumed = text.len() - rest;
        text.drain(..consumed);
        (symbol, text.is_empty())
    };

    if emptied {
        first.detach();
    }
    item.data.borrow_mut().value = NodeValue::TaskItem(symbol);
}

fn parse_list_marker(
    line: &str,
    mut pos: usize,
    interrupts_paragraph: bool,
) -> Option<(usize, NodeList)> {
    let bytes = line.as_bytes();
    let startpos = pos;
    let mut c = *bytes.get(pos)?;

    // An empty list item cannot interrupt a paragraph.
    let rest_is_blank = |from: usize| {
        bytes[from..]
            .iter()
            .find(|&&b| !strings::is_space_or_tab(b))
            .map_or(true, |&b| strings::is_line_end_char(b))
    };

    if c == b'*' || c == b'-' || c == b'+' {
        pos += 1;
        if !bytes.get(pos).map_or(true, |&b| isspace(b)) {
            return None;
        }

        if interrupts_paragraph && rest_is_blank(pos) {
            return None;
        }

        return Some((
            pos - startpos,
            NodeList {
                list_type: ListType::Bullet,
                start: 1,
                bullet_char: c,
                ..NodeList::default()
            },
        ));
    }

    if !isdigit(c) {
        return None;
    }

    let digits = scanners::digits(&bytes[pos..]);
    if digits > 9 {
        return None;
    }
    let start: usize = line[pos..pos + digits].parse().ok()?;
    pos += digits;

    if interrupts_paragraph && start != 1 {
        return None;
    }

    c = *bytes.get(pos)?;
    if c != b'.' && c != b')' {
        return None;
    }
    pos += 1;

    if !bytes.get(pos).is_some_and(|&b| isspace(b)) {
        return None;
    }

    if interrupts_paragraph && rest_is_blank(pos) {
        return None;
    }

    Some((
        pos - startpos,
        NodeList {
            list_type: ListType::Ordered,
            start,
            delimiter: if c == b'.' {
                ListDelimType::Period
            } else {
                ListDelimType::Paren
            },
            ..NodeList::default()
        },
    ))
}

fn lists_match(list_data: &NodeList, item_data: &NodeList) -> bool {
    list_data.list_type == item_data.list_type
        && list_data.delimiter == item_data.delimiter
        && list_data.bullet_char == item_data.bullet_char
}
