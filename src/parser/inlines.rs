use std::cell::{Cell, RefCell};
use std::ptr;

use typed_arena::Arena;
use unicode_categories::UnicodeCategories;

use crate::arena_tree::Node;
use crate::ctype::{isalpha, ispunct, isspace};
use crate::entity;
use crate::nodes::{Ast, AstNode, LineColumn, NodeCode, NodeLink, NodeValue};
use crate::parser::{Options, RefMap};
use crate::scanners;
use crate::strings::{self, AutolinkType};

const MAXBACKTICKS: usize = 80;
pub(crate) const MAX_LINK_LABEL_LENGTH: usize = 1000;
const MAX_LINK_PAREN_DEPTH: usize = 32;

pub struct Subject<'a: 'd, 'r, 'o, 'd, 'i> {
    arena: &'a Arena<AstNode<'a>>,
    options: &'o Options,
    input: &'i str,
    pos: usize,
    start: LineColumn,
    refmap: &'r mut RefMap,
    delimiter_arena: &'d Arena<Delimiter<'a, 'd>>,
    last_delimiter: Option<&'d Delimiter<'a, 'd>>,
    brackets: Vec<Bracket<'a>>,
    backticks: [usize; MAXBACKTICKS + 1],
    scanned_for_backticks: bool,
    flags: Flags,
    special_chars: [bool; 256],
}

/// Constructs with no terminator ahead; once a scan for one fails, later
/// scans in the same block cannot succeed either.
#[derive(Default)]
struct Flags {
    skip_html_cdata: bool,
    skip_html_declaration: bool,
    skip_html_pi: bool,
    skip_html_comment: bool,
}

pub struct Delimiter<'a: 'd, 'd> {
    inl: &'a AstNode<'a>,
    position: usize,
    length: usize,
    delim_char: u8,
    can_open: bool,
    can_close: bool,
    prev: Cell<Option<&'d Delimiter<'a, 'd>>>,
    next: Cell<Option<&'d Delimiter<'a, 'd>>>,
}

struct Bracket<'a> {
    inl_text: &'a AstNode<'a>,
    position: usize,
    image: bool,
    active: bool,
    bracket_after: bool,
}

impl<'a, 'r, 'o, 'd, 'i> Subject<'a, 'r, 'o, 'd, 'i> {
    pub fn new(
        arena: &'a Arena<AstNode<'a>>,
        options: &'o Options,
        input: &'i str,
        start: LineColumn,
        refmap: &'r mut RefMap,
        delimiter_arena: &'d Arena<Delimiter<'a, 'd>>,
    ) -> Self {
        let mut s = Subject {
            arena,
            options,
            input,
            pos: 0,
            start,
            refmap,
            delimiter_arena,
            last_delimiter: None,
            brackets: vec![],
            backticks: [0; MAXBACKTICKS + 1],
            scanned_for_backticks: false,
            flags: Flags::default(),
            special_chars: [false; 256],
        };
        for &c in b"\n\r_*`\\&<[]!" {
            s.special_chars[c as usize] = true;
        }
        if options.extension.strikethrough {
            s.special_chars[b'~' as usize] = true;
        }
        s
    }

    /// Parses the next inline at the current position and appends it to
    /// `node`.  Returns `false` at the end of input.
    pub fn parse_inline(&mut self, node: &'a AstNode<'a>) -> bool {
        let c = match self.peek_byte() {
            None => return false,
            Some(c) => c,
        };

        let new_inl = match c {
            b'\r' | b'\n' => Some(self.handle_newline()),
            b'`' => Some(self.handle_backticks()),
            b'\\' => Some(self.handle_backslash()),
            b'&' => Some(self.handle_entity()),
            b'<' => Some(self.handle_pointy_brace()),
            b'*' | b'_' => Some(self.handle_delim(c)),
            b'~' if self.options.extension.strikethrough => Some(self.handle_delim(c)),
            b'[' => {
                self.pos += 1;
                let inl = self.make_inline(NodeValue::Text("[".to_string()));
                self.push_bracket(false, inl);
                Some(inl)
            }
            b']' => self.handle_close_bracket(),
            b'!' => {
                self.pos += 1;
                if self.peek_byte() == Some(b'[') {
                    self.pos += 1;
                    let inl = self.make_inline(NodeValue::Text("![".to_string()));
                    self.push_bracket(true, inl);
                    Some(inl)
                } else {
                    Some(self.make_inline(NodeValue::Text("!".to_string())))
                }
            }
            _ => {
                let endpos = self.find_special_char();
                let mut contents = &self.input[self.pos..endpos];
                self.pos = endpos;

                if self.peek_byte().is_some_and(strings::is_line_end_char) {
                    contents = strings::rtrim(contents);
                }

                if contents.is_empty() {
                    None
                } else {
                    Some(self.make_inline(NodeValue::Text(contents.to_string())))
                }
            }
        };

        if let Some(inl) = new_inl {
            node.append(inl);
        }

        true
    }

    /// Pairs up the emphasis delimiters above `stack_bottom`, wrapping the
    /// nodes between each matched pair in a new node.  Whatever is left on
    /// the stack afterwards stays literal text.
    pub fn process_emphasis(&mut self, stack_bottom: usize) {
        // Per closer kind, the position below which no opener exists.  `*`
        // and `_` are further split by whether the closer can open and by its
        // length mod 3; `~` by its length.
        let mut openers_bottom = [stack_bottom; 14];

        let mut candidate = self.last_delimiter;
        let mut closer: Option<&'d Delimiter<'a, 'd>> = None;
        while let Some(c) = candidate {
            if c.position < stack_bottom {
                break;
            }
            closer = Some(c);
            candidate = c.prev.get();
        }

        while let Some(c) = closer {
            if !c.can_close {
                closer = c.next.get();
                continue;
            }

            let ix = match c.delim_char {
                b'*' => usize::from(c.can_open) * 3 + c.length % 3,
                b'_' => 6 + usize::from(c.can_open) * 3 + c.length % 3,
                _ => 12 + c.length.min(2) - 1,
            };

            let mut opener = c.prev.get();
            let mut found = None;
            let mut mod_three_rule_invoked = false;

            while let Some(o) = opener {
                if o.position < openers_bottom[ix] {
                    break;
                }
                if o.can_open && o.delim_char == c.delim_char {
                    if c.delim_char == b'~' {
                        if o.length == c.length {
                            found = Some(o);
                            break;
                        }
                    } else {
                        // A delimiter that can both open and close only
                        // pairs when the run lengths don't sum to a multiple
                        // of three, unless both are multiples of three.
                        let odd_match = (c.can_open || o.can_close)
                            && (o.length + c.length) % 3 == 0
                            && !(o.length % 3 == 0 && c.length % 3 == 0);
                        if !odd_match {
                            found = Some(o);
                            break;
                        }
                        mod_three_rule_invoked = true;
                    }
                }
                opener = o.prev.get();
            }

            match found {
                Some(o) => closer = self.insert_emph(o, c),
                None => {
                    closer = c.next.get();
                    if !mod_three_rule_invoked {
                        openers_bottom[ix] = c.position;
                    }
                    if !c.can_open {
                        self.remove_delimiter(c);
                    }
                }
            }
        }

        self.remove_delimiters(stack_bottom);
    }

    /// Forgets any brackets still open at the end of the block; they are
    /// already in the tree as text.
    pub fn clear_brackets(&mut self) {
        self.brackets.clear();
    }

    fn remove_delimiter(&mut self, delimiter: &'d Delimiter<'a, 'd>) {
        match delimiter.next.get() {
            None => self.last_delimiter = delimiter.prev.get(),
            Some(next) => next.prev.set(delimiter.prev.get()),
        }
        if let Some(prev) = delimiter.prev.get() {
            prev.next.set(delimiter.next.get());
        }
    }

    fn remove_delimiters(&mut self, stack_bottom: usize) {
        while let Some(last) = self.last_delimiter {
            if last.position < stack_bottom {
                break;
            }
            self.remove_delimiter(last);
        }
    }

    #[inline]
    fn eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    #[inline]
    fn peek_byte(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    fn find_special_char(&self) -> usize {
        let bytes = self.input.as_bytes();
        (self.pos + 1..bytes.len())
            .find(|&n| self.special_chars[bytes[n] as usize])
            .unwrap_or(bytes.len())
    }

    fn make_inline(&self, value: NodeValue) -> &'a AstNode<'a> {
        let mut ast = Ast::new(value, self.start);
        ast.sourcepos.end = self.start;
        ast.open = false;
        self.arena.alloc(Node::new(RefCell::new(ast)))
    }

    fn make_autolink(&self, url: &str, kind: AutolinkType) -> &'a AstNode<'a> {
        let inl = self.make_inline(NodeValue::Link(NodeLink {
            url: strings::clean_autolink(url, kind),
            title: String::new(),
        }));
        inl.append(self.make_inline(NodeValue::Text(entity::unescape_html(url))));
        inl
    }

    fn handle_newline(&mut self) -> &'a AstNode<'a> {
        let nlpos = self.pos;
        let bytes = self.input.as_bytes();
        if bytes[self.pos] == b'\r' {
            self.pos += 1;
        }
        if self.peek_byte() == Some(b'\n') {
            self.pos += 1;
        }
        let inl = if nlpos > 1 && bytes[nlpos - 1] == b' ' && bytes[nlpos - 2] == b' ' {
            self.make_inline(NodeValue::LineBreak)
        } else {
            self.make_inline(NodeValue::SoftBreak)
        };
        self.skip_spaces();
        inl
    }

    fn skip_spaces(&mut self) -> bool {
        let mut skipped = false;
        while matches!(self.peek_byte(), Some(b' ') | Some(b'\t')) {
            self.pos += 1;
            skipped = true;
        }
        skipped
    }

    fn skip_line_end(&mut self) -> bool {
        let old_pos = self.pos;
        if self.peek_byte() == Some(b'\r') {
            self.pos += 1;
        }
        if self.peek_byte() == Some(b'\n') {
            self.pos += 1;
        }
        self.pos > old_pos || self.eof()
    }

    fn take_while(&mut self, c: u8) -> usize {
        let start_pos = self.pos;
        while self.peek_byte() == Some(c) {
            self.pos += 1;
        }
        self.pos - start_pos
    }

    fn scan_to_closing_backtick(&mut self, openticklength: usize) -> Option<usize> {
        if openticklength > MAXBACKTICKS {
            return None;
        }

        if self.scanned_for_backticks && self.backticks[openticklength] <= self.pos {
            return None;
        }

        loop {
            while self.peek_byte().is_some_and(|c| c != b'`') {
                self.pos += 1;
            }
            if self.eof() {
                self.scanned_for_backticks = true;
                return None;
            }
            let numticks = self.take_while(b'`');
            if numticks <= MAXBACKTICKS {
                self.backticks[numticks] = self.pos - numticks;
            }
            if numticks == openticklength {
                return Some(self.pos);
            }
        }
    }

    fn handle_backticks(&mut self) -> &'a AstNode<'a> {
        let startpos = self.pos;
        let openticks = self.take_while(b'`');
        let endpos = self.scan_to_closing_backtick(openticks);

        match endpos {
            None => {
                self.pos = startpos + openticks;
                self.make_inline(NodeValue::Text("`".repeat(openticks)))
            }
            Some(endpos) => {
                let buf = &self.input[startpos + openticks..endpos - openticks];
                self.make_inline(NodeValue::Code(NodeCode {
                    num_backticks: openticks,
                    literal: strings::normalize_code(buf),
                }))
            }
        }
    }

    fn handle_delim(&mut self, c: u8) -> &'a AstNode<'a> {
        let (numdelims, can_open, can_close) = self.scan_delims(c);

        let contents = &self.input[self.pos - numdelims..self.pos];
        let inl = self.make_inline(NodeValue::Text(contents.to_string()));

        // Runs of three or more tildes are never strikethrough.
        if (can_open || can_close) && (c != b'~' || numdelims <= 2) {
            self.push_delimiter(c, numdelims, can_open, can_close, inl);
        }

        inl
    }

    fn scan_delims(&mut self, c: u8) -> (usize, bool, bool) {
        let before_char = self.input[..self.pos].chars().next_back().unwrap_or('\n');

        let numdelims = self.take_while(c);

        let after_char = self.input[self.pos..].chars().next().unwrap_or('\n');

        let left_flanking = numdelims > 0
            && !after_char.is_whitespace()
            && (!is_punctuation(after_char)
                || before_char.is_whitespace()
                || is_punctuation(before_char));
        let right_flanking = numdelims > 0
            && !before_char.is_whitespace()
            && (!is_punctuation(before_char)
                || after_char.is_whitespace()
                || is_punctuation(after_char));

        if c == b'_' {
            (
                numdelims,
                left_flanking && (!right_flanking || is_punctuation(before_char)),
                right_flanking && (!left_flanking || is_punctuation(after_char)),
            )
        } else {
            (numdelims, left_flanking, right_flanking)
        }
    }

    fn push_delimiter(
        &mut self,
        c: u8,
        length: usize,
        can_open: bool,
        can_close: bool,
        inl: &'a AstNode<'a>,
    ) {
        let d = self.delimiter_arena.alloc(Delimiter {
            prev: Cell::new(self.last_delimiter),
            next: Cell::new(None),
            inl,
            position: self.pos,
            length,
            delim_char: c,
            can_open,
            can_close,
        });
        if let Some(prev) = self.last_delimiter {
            prev.next.set(Some(d));
        }
        self.last_delimiter = Some(d);
    }

    // Wraps everything between `opener` and `closer` in a new emphasis node,
    // consuming one or two characters from each delimiter run.  Returns the
    // closer to continue with: the same one if characters remain in it.
    fn insert_emph(
        &mut self,
        opener: &'d Delimiter<'a, 'd>,
        closer: &'d Delimiter<'a, 'd>,
    ) -> Option<&'d Delimiter<'a, 'd>> {
        let opener_char = opener.delim_char;
        let mut opener_num_chars = text_len(opener.inl);
        let mut closer_num_chars = text_len(closer.inl);
        let use_delims = if closer_num_chars >= 2 && opener_num_chars >= 2 {
            2
        } else {
            1
        };

        opener_num_chars -= use_delims;
        closer_num_chars -= use_delims;
        truncate_text(opener.inl, opener_num_chars);
        truncate_text(closer.inl, closer_num_chars);

        let mut delim = closer.prev.get();
        while let Some(d) = delim {
            if ptr::eq(d, opener) {
                break;
            }
            delim = d.prev.get();
            self.remove_delimiter(d);
        }

        let emph = self.make_inline(if opener_char == b'~' {
            NodeValue::Strikethrough
        } else if use_delims == 1 {
            NodeValue::Emph
        } else {
            NodeValue::Strong
        });

        let mut tmp = opener.inl.next_sibling();
        while let Some(n) = tmp {
            if n.same_node(closer.inl) {
                break;
            }
            tmp = n.next_sibling();
            emph.append(n);
        }
        opener.inl.insert_after(emph);

        if opener_num_chars == 0 {
            opener.inl.detach();
            self.remove_delimiter(opener);
        }

        if closer_num_chars == 0 {
            closer.inl.detach();
            let next = closer.next.get();
            self.remove_delimiter(closer);
            next
        } else {
            Some(closer)
        }
    }

    fn handle_backslash(&mut self) -> &'a AstNode<'a> {
        self.pos += 1;

        match self.peek_byte() {
            Some(c) if ispunct(c) => {
                self.pos += 1;
                self.make_inline(NodeValue::Text((c as char).to_string()))
            }
            Some(_) if self.skip_line_end() => {
                let inl = self.make_inline(NodeValue::LineBreak);
                self.skip_spaces();
                inl
            }
            _ => self.make_inline(NodeValue::Text("\\".to_string())),
        }
    }

    fn handle_entity(&mut self) -> &'a AstNode<'a> {
        self.pos += 1;

        match entity::unescape(&self.input.as_bytes()[self.pos..]) {
            None => self.make_inline(NodeValue::Text("&".to_string())),
            Some((text, len)) => {
                self.pos += len;
                self.make_inline(NodeValue::Text(text))
            }
        }
    }

    fn handle_pointy_brace(&mut self) -> &'a AstNode<'a> {
        self.pos += 1;
        let rest = &self.input.as_bytes()[self.pos..];

        if let Some(matchlen) = scanners::autolink_uri(rest) {
            let url = &self.input[self.pos..self.pos + matchlen - 1];
            self.pos += matchlen;
            return self.make_autolink(url, AutolinkType::Uri);
        }

        if let Some(matchlen) = scanners::autolink_email(rest) {
            let url = &self.input[self.pos..self.pos + matchlen - 1];
            self.pos += matchlen;
            return self.make_autolink(url, AutolinkType::Email);
        }

        let matchlen = match rest.first() {
            Some(b'!') if rest.starts_with(b"!--") => {
                scan_unless_skipped(&mut self.flags.skip_html_comment, rest, scanners::html_comment)
            }
            Some(b'!') if rest.starts_with(b"![CDATA[") => {
                scan_unless_skipped(&mut self.flags.skip_html_cdata, rest, scanners::html_cdata)
            }
            Some(b'!') if rest.get(1).is_some_and(|&b| isalpha(b)) => scan_unless_skipped(
                &mut self.flags.skip_html_declaration,
                rest,
                scanners::html_declaration,
            ),
            Some(b'?') => scan_unless_skipped(
                &mut self.flags.skip_html_pi,
                rest,
                scanners::html_processing_instruction,
            ),
            Some(_) => scanners::html_tag(rest),
            None => None,
        };

        if let Some(matchlen) = matchlen {
            let contents = &self.input[self.pos - 1..self.pos + matchlen];
            self.pos += matchlen;
            return self.make_inline(NodeValue::HtmlInline(contents.to_string()));
        }

        self.make_inline(NodeValue::Text("<".to_string()))
    }

    fn push_bracket(&mut self, image: bool, inl_text: &'a AstNode<'a>) {
        if let Some(last) = self.brackets.last_mut() {
            last.bracket_after = true;
        }
        self.brackets.push(Bracket {
            inl_text,
            position: self.pos,
            image,
            active: true,
            bracket_after: false,
        });
    }

    fn handle_close_bracket(&mut self) -> Option<&'a AstNode<'a>> {
        self.pos += 1;
        let initial_pos = self.pos;

        let (is_image, active, bracket_position, bracket_after) = match self.brackets.last() {
            None => return Some(self.make_inline(NodeValue::Text("]".to_string()))),
            Some(b) => (b.image, b.active, b.position, b.bracket_after),
        };

        if !active {
            self.brackets.pop();
            return Some(self.make_inline(NodeValue::Text("]".to_string())));
        }

        if let Some((url, title, endall)) = self.inline_destination() {
            self.pos = endall;
            self.close_bracket_match(is_image, url, title);
            return None;
        }

        let mut label = match link_label(self.input, self.pos) {
            Some((label, after)) => {
                self.pos = after;
                Some(label)
            }
            None => None,
        };
        if label.map_or(true, str::is_empty) {
            label = if bracket_after {
                None
            } else {
                Some(&self.input[bracket_position..initial_pos - 1])
            };
        }

        let reference = match label {
            Some(label) if label.len() <= MAX_LINK_LABEL_LENGTH && !self.refmap.is_empty() => {
                self.refmap.lookup(&strings::normalize_label(label))
            }
            _ => None,
        };

        if let Some(reference) = reference {
            self.close_bracket_match(is_image, reference.url, reference.title);
            return None;
        }

        self.brackets.pop();
        self.pos = initial_pos;
        Some(self.make_inline(NodeValue::Text("]".to_string())))
    }

    // Scans `(destination "title")` right after a closing bracket, returning
    // the cleaned destination and title and the position past the `)`.
    fn inline_destination(&self) -> Option<(String, String, usize)> {
        let bytes = self.input.as_bytes();
        if self.peek_byte() != Some(b'(') {
            return None;
        }

        let starturl = self.pos + 1 + scanners::spacechars(&bytes[self.pos + 1..]).unwrap_or(0);
        if starturl >= bytes.len() {
            return None;
        }
        let (url, n) = manual_scan_link_url(&self.input[starturl..])?;

        let endurl = starturl + n;
        let starttitle = endurl + scanners::spacechars(&bytes[endurl..]).unwrap_or(0);
        let endtitle = if starttitle == endurl {
            starttitle
        } else {
            starttitle + scanners::link_title(&bytes[starttitle..]).unwrap_or(0)
        };
        let endall = endtitle + scanners::spacechars(&bytes[endtitle..]).unwrap_or(0);

        if bytes.get(endall) != Some(&b')') {
            return None;
        }

        Some((
            strings::clean_url(url),
            strings::clean_title(&self.input[starttitle..endtitle]),
            endall + 1,
        ))
    }

    fn close_bracket_match(&mut self, is_image: bool, url: String, title: String) {
        let Some(bracket) = self.brackets.pop() else {
            return;
        };

        let nl = NodeLink { url, title };
        let inl = self.make_inline(if is_image {
            NodeValue::Image(nl)
        } else {
            NodeValue::Link(nl)
        });

        bracket.inl_text.insert_before(inl);
        let mut tmpch = bracket.inl_text.next_sibling();
        while let Some(tmp) = tmpch {
            tmpch = tmp.next_sibling();
            inl.append(tmp);
        }
        bracket.inl_text.detach();
        self.process_emphasis(bracket.position);

        // Links may not contain other links.
        if !is_image {
            for opener in self.brackets.iter_mut().rev() {
                if !opener.image {
                    if !opener.active {
                        break;
                    }
                    opener.active = false;
                }
            }
        }
    }
}

fn is_punctuation(c: char) -> bool {
    if c.is_ascii() {
        ispunct(c as u8)
    } else {
        c.is_punctuation() || c.is_symbol()
    }
}

fn scan_unless_skipped(
    skip: &mut bool,
    input: &[u8],
    scanner: fn(&[u8]) -> Option<usize>,
) -> Option<usize> {
    if *skip {
        return None;
    }
    let matched = scanner(input);
    if matched.is_none() {
        *skip = true;
    }
    matched
}

fn text_len(node: &AstNode<'_>) -> usize {
    node.data.borrow().value.text().map_or(0, String::len)
}

fn truncate_text(node: &AstNode<'_>, len: usize) {
    if let Some(text) = node.data.borrow_mut().value.text_mut() {
        text.truncate(len);
    }
}

/// Scans a link label starting with the `[` at `pos`.  Returns the label
/// with surrounding whitespace trimmed, and the position after its `]`.
pub(crate) fn link_label(input: &str, pos: usize) -> Option<(&str, usize)> {
    let bytes = input.as_bytes();
    if bytes.get(pos) != Some(&b'[') {
        return None;
    }

    let mut i = pos + 1;
    while let Some(&c) = bytes.get(i) {
        match c {
            b'[' => return None,
            b']' => return Some((strings::trim(&input[pos + 1..i]), i + 1)),
            b'\\' if bytes.get(i + 1).is_some_and(|&n| ispunct(n)) => i += 2,
            _ => i += 1,
        }
        if i - pos - 1 > MAX_LINK_LABEL_LENGTH {
            return None;
        }
    }

    None
}

/// Scans a link destination, either `<…>` or a run of non-space characters
/// with balanced parentheses.  Returns the destination, without any angle
/// brackets, and the length scanned.
pub(crate) fn manual_scan_link_url(input: &str) -> Option<(&str, usize)> {
    let bytes = input.as_bytes();
    let len = bytes.len();

    if bytes.first() != Some(&b'<') {
        return manual_scan_link_url_2(input);
    }

    let mut i = 1;
    while i < len {
        match bytes[i] {
            b'>' => return Some((&input[1..i], i + 1)),
            b'\\' => i += 2,
            b'\n' | b'<' => return None,
            _ => i += 1,
        }
    }

    None
}

fn manual_scan_link_url_2(input: &str) -> Option<(&str, usize)> {
    let bytes = input.as_bytes();
    let len = bytes.len();
    let mut i = 0;
    let mut nb_p = 0;

    while i < len {
        let b = bytes[i];
        if b == b'\\' && i + 1 < len && ispunct(bytes[i + 1]) {
            i += 2;
        } else if b == b'(' {
            nb_p += 1;
            i += 1;
            if nb_p > MAX_LINK_PAREN_DEPTH {
                return None;
            }
        } else if b == b')' {
            if nb_p == 0 {
                break;
            }
            nb_p -= 1;
            i += 1;
        } else if isspace(b) || b.is_ascii_control() {
            if i == 0 {
                return None;
            }
            break;
        } else {
            i += 1;
        }
    }

    if i >= len || nb_p != 0 {
        None
    } else {
        Some((&input[..i], i))
    }
}
