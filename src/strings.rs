use crate::ctype::{ispunct, isspace};
use crate::entity;

/// The kind of an autolink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutolinkType {
    /// `<scheme:rest>`
    Uri,
    /// `<user@host>`
    Email,
}

/// Removes the backslash from every backslash escape of ASCII punctuation.
pub fn unescape(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = String::with_capacity(s.len());
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'\\' && i + 1 < bytes.len() && ispunct(bytes[i + 1]) {
            out.push_str(&s[start..i]);
            start = i + 1;
            i += 2;
        } else {
            i += 1;
        }
    }
    out.push_str(&s[start..]);
    out
}

pub fn clean_autolink(url: &str, kind: AutolinkType) -> String {
    let url = trim(url);
    if url.is_empty() {
        return String::new();
    }

    let mut buf = String::with_capacity(url.len() + 7);
    if kind == AutolinkType::Email {
        buf.push_str("mailto:");
    }
    buf.push_str(&entity::unescape_html(url));
    buf
}

/// Normalises the contents of a code span: line endings become spaces, and
/// one space is stripped from each end when both ends have one and the
/// content is not all spaces.
pub fn normalize_code(s: &str) -> String {
    let mut r = String::with_capacity(s.len());
    let mut contains_nonspace = false;
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                if chars.peek() != Some(&'\n') {
                    r.push(' ');
                }
            }
            '\n' => r.push(' '),
            c => {
                if c != ' ' {
                    contains_nonspace = true;
                }
                r.push(c);
            }
        }
    }

    if contains_nonspace && r.len() >= 2 && r.starts_with(' ') && r.ends_with(' ') {
        r.pop();
        r.remove(0);
    }

    r
}

/// Drops trailing lines that hold only spaces and tabs, along with the line
/// ending of the last non-blank line.
pub fn remove_trailing_blank_lines(s: &mut String) {
    let bytes = s.as_bytes();
    let mut i = bytes.len();
    while i > 0 && matches!(bytes[i - 1], b' ' | b'\t' | b'\r' | b'\n') {
        i -= 1;
    }
    if i == 0 {
        s.clear();
        return;
    }

    if let Some(eol) = bytes[i..].iter().position(|&c| is_line_end_char(c)) {
        s.truncate(i + eol);
    }
}

pub fn is_line_end_char(ch: u8) -> bool {
    matches!(ch, b'\n' | b'\r')
}

pub fn is_space_or_tab(ch: u8) -> bool {
    matches!(ch, b'\t' | b' ')
}

/// Strips the optional closing sequence of `#`s from an ATX heading's text.
pub fn chop_trailing_hashes(line: &str) -> &str {
    let line = rtrim(line);
    let bytes = line.as_bytes();

    let mut n = bytes.len();
    while n > 0 && bytes[n - 1] == b'#' {
        n -= 1;
    }
    if n == bytes.len() {
        return line;
    }
    if n == 0 {
        return "";
    }
    if is_space_or_tab(bytes[n - 1]) {
        rtrim(&line[..n])
    } else {
        line
    }
}

pub fn ltrim(s: &str) -> &str {
    s.trim_start_matches(|c: char| c.is_ascii() && isspace(c as u8))
}

pub fn rtrim(s: &str) -> &str {
    s.trim_end_matches(|c: char| c.is_ascii() && isspace(c as u8))
}

pub fn trim(s: &str) -> &str {
    rtrim(ltrim(s))
}

pub fn clean_url(url: &str) -> String {
    let url = trim(url);
    if url.is_empty() {
        return String::new();
    }
    unescape(&entity::unescape_html(url))
}

/// Strips a title's delimiters, then decodes entities and backslash escapes.
pub fn clean_title(title: &str) -> String {
    let bytes = title.as_bytes();
    if bytes.is_empty() {
        return String::new();
    }

    let first = bytes[0];
    let last = bytes[bytes.len() - 1];
    let inner = if bytes.len() >= 2
        && ((first == b'\'' && last == b'\'')
            || (first == b'(' && last == b')')
            || (first == b'"' && last == b'"'))
    {
        &title[1..title.len() - 1]
    } else {
        title
    };

    unescape(&entity::unescape_html(inner))
}

/// Whether a line holds only spaces and tabs up to its end.
pub fn is_blank(s: &str) -> bool {
    for &c in s.as_bytes() {
        match c {
            b'\n' | b'\r' => return true,
            b' ' | b'\t' => (),
            _ => return false,
        }
    }
    true
}

/// Normalises a link label for matching: trims it, applies Unicode default
/// case folding and collapses internal whitespace to one space.
pub fn normalize_label(label: &str) -> String {
    let folded = caseless::default_case_fold_str(trim(label));

    let mut v = String::with_capacity(folded.len());
    let mut last_was_whitespace = false;
    for c in folded.chars() {
        if c.is_whitespace() {
            if !last_was_whitespace {
                last_was_whitespace = true;
                v.push(' ');
            }
        } else {
            last_was_whitespace = false;
            v.push(c);
        }
    }
    v
}
