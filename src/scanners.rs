//! Fixed-pattern matchers used by the block and inline parsers.
//!
//! Every scanner looks at the start of the slice it is given and returns the
//! length in bytes of what it matched, or `None`.  None of them allocate.

use crate::ctype::{isalnum, isalpha, isdigit, isspace, ispunct};
use phf::phf_set;

/// Block-level tag names that start an HTML block of type 6.
static BLOCK_TAG_NAMES: phf::Set<&'static str> = phf_set! {
    "address", "article", "aside", "base", "basefont", "blockquote", "body",
    "caption", "center", "col", "colgroup", "dd", "details", "dialog", "dir",
    "div", "dl", "dt", "fieldset", "figcaption", "figure", "footer", "form",
    "frame", "frameset", "h1", "h2", "h3", "h4", "h5", "h6", "head", "header",
    "hr", "html", "iframe", "legend", "li", "link", "main", "menu", "menuitem",
    "nav", "noframes", "ol", "optgroup", "option", "p", "param", "search",
    "section", "summary", "table", "tbody", "td", "tfoot", "th", "thead",
    "title", "tr", "track", "ul",
};

/// Tag names whose blocks run to the matching close tag (type 1).
static RAW_TAG_NAMES: phf::Set<&'static str> = phf_set! {
    "pre", "script", "style", "textarea",
};

const MAX_TAG_NAME: usize = 16;

/// Which character underlines a setext heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetextChar {
    /// `===`, a level 1 heading.
    Equals,
    /// `---`, a level 2 heading.
    Hyphen,
}

fn is_line_end(line: &[u8], i: usize) -> bool {
    i >= line.len() || line[i] == b'\n' || line[i] == b'\r'
}

fn skip_spaces_and_tabs(line: &[u8], mut i: usize) -> usize {
    while i < line.len() && (line[i] == b' ' || line[i] == b'\t') {
        i += 1;
    }
    i
}

fn count_run(line: &[u8], i: usize, c: u8) -> usize {
    line[i.min(line.len())..].iter().take_while(|&&b| b == c).count()
}

/// Lowercases an ASCII tag name into `buf`, if it fits.
fn lowercase_name<'b>(name: &[u8], buf: &'b mut [u8; MAX_TAG_NAME]) -> Option<&'b str> {
    if name.len() > MAX_TAG_NAME {
        return None;
    }
    for (dst, src) in buf.iter_mut().zip(name) {
        *dst = src.to_ascii_lowercase();
    }
    std::str::from_utf8(&buf[..name.len()]).ok()
}

/// An ATX heading opener: one to six `#`s followed by a space, a tab, or the
/// end of the line.  The match covers the `#`s and any following blanks.
pub fn atx_heading_start(line: &[u8]) -> Option<usize> {
    let hashes = count_run(line, 0, b'#');
    if hashes == 0 || hashes > 6 {
        return None;
    }
    match line.get(hashes) {
        Some(b' ') | Some(b'\t') => Some(skip_spaces_and_tabs(line, hashes)),
        None | Some(b'\n') | Some(b'\r') => Some(hashes),
        _ => None,
    }
}

/// An opening code fence.  Returns the length of the fence itself; a
/// backtick fence may not have a backtick in its info string.
pub fn open_code_fence(line: &[u8]) -> Option<usize> {
    let c = *line.first()?;
    if c != b'`' && c != b'~' {
        return None;
    }
    let len = count_run(line, 0, c);
    if len < 3 {
        return None;
    }
    if c == b'`' {
        let mut i = len;
        while !is_line_end(line, i) {
            if line[i] == b'`' {
                return None;
            }
            i += 1;
        }
    }
    Some(len)
}

/// A closing code fence: a fence character run of at least three, then
/// only blanks.  Returns the length of the run.
pub fn close_code_fence(line: &[u8]) -> Option<usize> {
    let c = *line.first()?;
    if c != b'`' && c != b'~' {
        return None;
    }
    let len = count_run(line, 0, c);
    if len < 3 || !is_line_end(line, skip_spaces_and_tabs(line, len)) {
        return None;
    }
    Some(len)
}

/// The start of an HTML block of types 1 through 6.
pub fn html_block_start(line: &[u8]) -> Option<u8> {
    if line.first() != Some(&b'<') {
        return None;
    }
    let rest = &line[1..];

    if starts_with_ci(rest, b"!--") {
        return Some(2);
    }
    if rest.first() == Some(&b'?') {
        return Some(3);
    }
    if rest.first() == Some(&b'!') && rest.get(1).is_some_and(|&b| isalpha(b)) {
        return Some(4);
    }
    if rest.starts_with(b"![CDATA[") {
        return Some(5);
    }

    let (closing, name_start) = if rest.first() == Some(&b'/') {
        (true, 1)
    } else {
        (false, 0)
    };
    let name_len = rest[name_start..]
        .iter()
        .take_while(|&&b| isalnum(b))
        .count();
    if name_len == 0 || !isalpha(rest[name_start]) {
        return None;
    }
    let after = name_start + name_len;

    let mut buf = [0; MAX_TAG_NAME];
    let name = lowercase_name(&rest[name_start..after], &mut buf)?;

    if !closing && RAW_TAG_NAMES.contains(name) {
        let ok = match rest.get(after) {
            None | Some(b'>') => true,
            Some(&b) => isspace(b),
        };
        return if ok { Some(1) } else { None };
    }

    if BLOCK_TAG_NAMES.contains(name) {
        let ok = match rest.get(after) {
            None | Some(b'>') => true,
            Some(b'/') => rest.get(after + 1) == Some(&b'>'),
            Some(&b) => isspace(b),
        };
        if ok {
            return Some(6);
        }
    }

    None
}

/// The start of an HTML block of type 7: a complete open or closing tag
/// alone on its line.
pub fn html_block_start_7(line: &[u8]) -> Option<u8> {
    if line.first() != Some(&b'<') {
        return None;
    }
    let rest = &line[1..];
    let len = if rest.first() == Some(&b'/') {
        closing_tag(rest)?
    } else {
        let len = open_tag(rest)?;
        let name_len = rest.iter().take_while(|&&b| isalnum(b) || b == b'-').count();
        let mut buf = [0; MAX_TAG_NAME];
        if let Some(name) = lowercase_name(&rest[..name_len], &mut buf) {
            if RAW_TAG_NAMES.contains(name) {
                return None;
            }
        }
        len
    };

    if is_line_end(rest, skip_spaces_and_tabs(rest, len)) {
        Some(7)
    } else {
        None
    }
}

fn starts_with_ci(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.len() >= needle.len() && haystack[..needle.len()].eq_ignore_ascii_case(needle)
}

fn contains_ci(haystack: &[u8], needle: &[u8]) -> bool {
    haystack
        .windows(needle.len())
        .any(|w| w.eq_ignore_ascii_case(needle))
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

pub fn html_block_end_1(line: &[u8]) -> bool {
    [&b"</script>"[..], b"</pre>", b"</style>", b"</textarea>"]
        .iter()
        .any(|needle| contains_ci(line, needle))
}

pub fn html_block_end_2(line: &[u8]) -> bool {
    contains(line, b"-->")
}

pub fn html_block_end_3(line: &[u8]) -> bool {
    contains(line, b"?>")
}

pub fn html_block_end_4(line: &[u8]) -> bool {
    line.contains(&b'>')
}

pub fn html_block_end_5(line: &[u8]) -> bool {
    contains(line, b"]]>")
}

/// A setext heading underline: a run of `=` or `-`, then only blanks.
pub fn setext_heading_line(line: &[u8]) -> Option<SetextChar> {
    let c = *line.first()?;
    let kind = match c {
        b'=' => SetextChar::Equals,
        b'-' => SetextChar::Hyphen,
        _ => return None,
    };
    let len = count_run(line, 0, c);
    if is_line_end(line, skip_spaces_and_tabs(line, len)) {
        Some(kind)
    } else {
        None
    }
}

/// An absolute URI autolink, following the `<` that opens it.  The match
/// includes the closing `>`.
pub fn autolink_uri(input: &[u8]) -> Option<usize> {
    if !input.first().is_some_and(|&b| isalpha(b)) {
        return None;
    }
    let scheme_len = 1 + input[1..]
        .iter()
        .take_while(|&&b| isalnum(b) || b == b'+' || b == b'.' || b == b'-')
        .count();
    if !(2..=32).contains(&scheme_len) || input.get(scheme_len) != Some(&b':') {
        return None;
    }

    let mut i = scheme_len + 1;
    while i < input.len() {
        match input[i] {
            b'>' => return Some(i + 1),
            b'<' => return None,
            b if b <= b' ' => return None,
            _ => i += 1,
        }
    }
    None
}

/// An email autolink, following the `<` that opens it.  The match includes
/// the closing `>`.
pub fn autolink_email(input: &[u8]) -> Option<usize> {
    let local = input
        .iter()
        .take_while(|&&b| isalnum(b) || b"!#$%&'*+/=?^_`{|}~.-".contains(&b))
        .count();
    if local == 0 || input.get(local) != Some(&b'@') {
        return None;
    }

    let mut i = local + 1;
    loop {
        let label = input[i..]
            .iter()
            .take_while(|&&b| isalnum(b) || b == b'-')
            .count();
        if label == 0
            || label > 63
            || input[i] == b'-'
            || input[i + label - 1] == b'-'
        {
            return None;
        }
        i += label;
        match input.get(i) {
            Some(b'.') => i += 1,
            Some(b'>') => return Some(i + 1),
            _ => return None,
        }
    }
}

fn tag_name(input: &[u8]) -> Option<usize> {
    if !input.first().is_some_and(|&b| isalpha(b)) {
        return None;
    }
    Some(
        1 + input[1..]
            .iter()
            .take_while(|&&b| isalnum(b) || b == b'-')
            .count(),
    )
}

fn attribute(input: &[u8]) -> Option<usize> {
    let ws = spacechars(input)?;
    let name = &input[ws..];
    let first = *name.first()?;
    if !(isalpha(first) || first == b'_' || first == b':') {
        return None;
    }
    let mut i = ws
        + 1
        + name[1..]
            .iter()
            .take_while(|&&b| isalnum(b) || b"_.:-".contains(&b))
            .count();

    let before_value = i;
    i += spacechars(&input[i..]).unwrap_or(0);
    if input.get(i) != Some(&b'=') {
        return Some(before_value);
    }
    i += 1;
    i += spacechars(&input[i..]).unwrap_or(0);

    match input.get(i) {
        Some(&q) if q == b'"' || q == b'\'' => {
            let close = input[i + 1..].iter().position(|&b| b == q)?;
            Some(i + close + 2)
        }
        Some(_) => {
            let len = input[i..]
                .iter()
                .take_while(|&&b| !isspace(b) && !b"\"'=<>`".contains(&b))
                .count();
            if len == 0 {
                None
            } else {
                Some(i + len)
            }
        }
        None => None,
    }
}

/// An open tag, following its `<`.  The match includes the closing `>`.
pub fn open_tag(input: &[u8]) -> Option<usize> {
    let mut i = tag_name(input)?;
    while let Some(len) = attribute(&input[i..]) {
        i += len;
    }
    i += spacechars(&input[i..]).unwrap_or(0);
    if input.get(i) == Some(&b'/') {
        i += 1;
    }
    if input.get(i) == Some(&b'>') {
        Some(i + 1)
    } else {
        None
    }
}

/// A closing tag, following its `<`.  The match includes the closing `>`.
pub fn closing_tag(input: &[u8]) -> Option<usize> {
    if input.first() != Some(&b'/') {
        return None;
    }
    let mut i = 1 + tag_name(&input[1..])?;
    i += spacechars(&input[i..]).unwrap_or(0);
    if input.get(i) == Some(&b'>') {
        Some(i + 1)
    } else {
        None
    }
}

/// An open or closing tag, following its `<`.
pub fn html_tag(input: &[u8]) -> Option<usize> {
    open_tag(input).or_else(|| closing_tag(input))
}

/// An HTML comment, following its `<`.  `<!-->` and `<!--->` count as
/// complete comments.
pub fn html_comment(input: &[u8]) -> Option<usize> {
    if !input.starts_with(b"!--") {
        return None;
    }
    let body = &input[3..];
    if body.starts_with(b">") {
        return Some(4);
    }
    if body.starts_with(b"->") {
        return Some(5);
    }
    find(body, b"-->").map(|at| 3 + at + 3)
}

/// A processing instruction, following its `<`.
pub fn html_processing_instruction(input: &[u8]) -> Option<usize> {
    if input.first() != Some(&b'?') {
        return None;
    }
    find(&input[1..], b"?>").map(|at| 1 + at + 2)
}

/// A declaration such as `<!DOCTYPE html>`, following its `<`.
pub fn html_declaration(input: &[u8]) -> Option<usize> {
    if input.first() != Some(&b'!') || !input.get(1).is_some_and(|&b| isalpha(b)) {
        return None;
    }
    input.iter().position(|&b| b == b'>').map(|at| at + 1)
}

/// A CDATA section, following its `<`.
pub fn html_cdata(input: &[u8]) -> Option<usize> {
    if !input.starts_with(b"![CDATA[") {
        return None;
    }
    find(&input[8..], b"]]>").map(|at| 8 + at + 3)
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// One or more whitespace characters, line endings included.
pub fn spacechars(input: &[u8]) -> Option<usize> {
    let len = input.iter().take_while(|&&b| isspace(b)).count();
    if len == 0 {
        None
    } else {
        Some(len)
    }
}

/// A link title in `"…"`, `'…'` or `(…)`.  The match includes both
/// delimiters.
pub fn link_title(input: &[u8]) -> Option<usize> {
    let close = match *input.first()? {
        b'"' => b'"',
        b'\'' => b'\'',
        b'(' => b')',
        _ => return None,
    };

    let mut i = 1;
    while i < input.len() {
        let b = input[i];
        if b == b'\\' && i + 1 < input.len() && ispunct(input[i + 1]) {
            i += 2;
        } else if b == close {
            return Some(i + 1);
        } else if close == b')' && b == b'(' {
            return None;
        } else {
            i += 1;
        }
    }
    None
}

/// A table delimiter cell: an optional `:`, at least one `-`, an optional
/// `:`, surrounded by blanks.
pub fn table_delimiter_cell(cell: &[u8]) -> bool {
    let mut i = skip_spaces_and_tabs(cell, 0);
    if cell.get(i) == Some(&b':') {
        i += 1;
    }
    let dashes = count_run(cell, i, b'-');
    if dashes == 0 {
        return false;
    }
    i += dashes;
    if cell.get(i) == Some(&b':') {
        i += 1;
    }
    skip_spaces_and_tabs(cell, i) == cell.len()
}

/// A run of ASCII digits, as used for ordered list numbers.
pub fn digits(input: &[u8]) -> usize {
    input.iter().take_while(|&&b| isdigit(b)).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atx_heading_start_needs_a_separator() {
        assert_eq!(atx_heading_start(b"# foo"), Some(2));
        assert_eq!(atx_heading_start(b"###\t  foo"), Some(6));
        assert_eq!(atx_heading_start(b"#\n"), Some(1));
        assert_eq!(atx_heading_start(b"#foo"), None);
        assert_eq!(atx_heading_start(b"####### foo"), None);
    }

    #[test]
    fn code_fences() {
        assert_eq!(open_code_fence(b"```rust\n"), Some(3));
        assert_eq!(open_code_fence(b"~~~~ a`b\n"), Some(4));
        assert_eq!(open_code_fence(b"``` a`b\n"), None);
        assert_eq!(open_code_fence(b"``\n"), None);
        assert_eq!(close_code_fence(b"````  \n"), Some(4));
        assert_eq!(close_code_fence(b"``` x\n"), None);
    }

    #[test]
    fn html_block_kinds() {
        assert_eq!(html_block_start(b"<script type=x>"), Some(1));
        assert_eq!(html_block_start(b"<TEXTAREA>"), Some(1));
        assert_eq!(html_block_start(b"<!-- hi"), Some(2));
        assert_eq!(html_block_start(b"<?php"), Some(3));
        assert_eq!(html_block_start(b"<!DOCTYPE html>"), Some(4));
        assert_eq!(html_block_start(b"<![CDATA["), Some(5));
        assert_eq!(html_block_start(b"<div class=x>"), Some(6));
        assert_eq!(html_block_start(b"</TABLE>"), Some(6));
        assert_eq!(html_block_start(b"<br/>"), None);
        assert_eq!(html_block_start(b"<divx>"), None);
        assert_eq!(html_block_start_7(b"<a href=\"x\">  \n"), Some(7));
        assert_eq!(html_block_start_7(b"</ins>\n"), Some(7));
        assert_eq!(html_block_start_7(b"<a href=\"x\"> text\n"), None);
        assert_eq!(html_block_start_7(b"<pre>\n"), None);
    }

    #[test]
    fn html_block_ends() {
        assert!(html_block_end_1(b"x </STYLE> y"));
        assert!(html_block_end_2(b"-->"));
        assert!(!html_block_end_3(b"? >"));
        assert!(html_block_end_5(b"]]>"));
    }

    #[test]
    fn autolinks() {
        assert_eq!(autolink_uri(b"http://a.b>"), Some(11));
        assert_eq!(autolink_uri(b"a:b>"), None);
        assert_eq!(autolink_uri(b"http://a b>"), None);
        assert_eq!(autolink_email(b"foo@bar.example.com>"), Some(20));
        assert_eq!(autolink_email(b"foo@-bar.com>"), None);
        assert_eq!(autolink_email(b"foo@bar>"), Some(8));
    }

    #[test]
    fn inline_html() {
        assert_eq!(html_tag(b"a href='x' title=\"y\" data-z=w>"), Some(30));
        assert_eq!(html_tag(b"br/>"), Some(4));
        assert_eq!(html_tag(b"/em >"), Some(5));
        assert_eq!(html_tag(b"a href=>"), None);
        assert_eq!(html_tag(b"33>"), None);
        assert_eq!(html_comment(b"!-->"), Some(4));
        assert_eq!(html_comment(b"!--->"), Some(5));
        assert_eq!(html_comment(b"!-- a -- b -->"), Some(14));
        assert_eq!(html_processing_instruction(b"?x y?>"), Some(6));
        assert_eq!(html_declaration(b"!X y>"), Some(5));
        assert_eq!(html_cdata(b"![CDATA[x]]>"), Some(12));
    }

    #[test]
    fn link_titles() {
        assert_eq!(link_title(b"\"a \\\" b\" rest"), Some(8));
        assert_eq!(link_title(b"(a (b))"), None);
        assert_eq!(link_title(b"'a'"), Some(3));
        assert_eq!(link_title(b"'a"), None);
    }

    #[test]
    fn table_delimiters() {
        assert!(table_delimiter_cell(b" :---: "));
        assert!(table_delimiter_cell(b"-"));
        assert!(!table_delimiter_cell(b" : "));
        assert!(!table_delimiter_cell(b"-x-"));
    }
}
