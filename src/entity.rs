use crate::ctype::{isdigit, isxdigit};
use std::char;
use std::cmp::min;

include!(concat!(env!("OUT_DIR"), "/entitydata.rs"));

/// Decodes the character reference at the start of `text`, which follows an
/// `&` that has already been consumed.
///
/// Returns the decoded characters and how many bytes of `text` they replace,
/// including the closing `;`.
pub fn unescape(text: &[u8]) -> Option<(String, usize)> {
    if text.len() >= 3 && text[0] == b'#' {
        let mut codepoint: u32 = 0;
        let mut i;

        let (num_digits, max_digits) = if isdigit(text[1]) {
            i = 1;
            while i < text.len() && isdigit(text[i]) {
                codepoint = codepoint * 10 + (text[i] - b'0') as u32;
                codepoint = min(codepoint, 0x11_0000);
                i += 1;
            }
            (i - 1, 7)
        } else if text[1] == b'x' || text[1] == b'X' {
            i = 2;
            while i < text.len() && isxdigit(text[i]) {
                codepoint = codepoint * 16 + (text[i] as char).to_digit(16).unwrap_or(0);
                codepoint = min(codepoint, 0x11_0000);
                i += 1;
            }
            (i - 2, 6)
        } else {
            return None;
        };

        if (1..=max_digits).contains(&num_digits) && i < text.len() && text[i] == b';' {
            let ch = match codepoint {
                0 => '\u{FFFD}',
                cp => char::from_u32(cp).unwrap_or('\u{FFFD}'),
            };
            return Some((ch.to_string(), i + 1));
        }
        return None;
    }

    let size = min(text.len(), entitydata::MAX_LENGTH + 1);
    for i in 1..size {
        match text[i] {
            b';' => {
                let name = std::str::from_utf8(&text[..i]).ok()?;
                return entitydata::ENTITIES
                    .get(name)
                    .map(|chars| (chars.to_string(), i + 1));
            }
            c if !c.is_ascii_alphanumeric() => return None,
            _ => {}
        }
    }

    None
}

/// Decodes every entity and numeric character reference in `src`; anything
/// that is not a valid reference stays as it was.
pub fn unescape_html(src: &str) -> String {
    let bytes = src.as_bytes();
    let mut v = String::with_capacity(src.len());
    let mut i = 0;

    while i < bytes.len() {
        let org = i;
        while i < bytes.len() && bytes[i] != b'&' {
            i += 1;
        }
        v.push_str(&src[org..i]);
        if i >= bytes.len() {
            break;
        }

        i += 1;
        match unescape(&bytes[i..]) {
            Some((chs, len)) => {
                v.push_str(&chs);
                i += len;
            }
            None => v.push('&'),
        }
    }

    v
}
