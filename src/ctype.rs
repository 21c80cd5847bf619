//! Byte classification in the spirit of C's `<ctype.h>`, restricted to ASCII.

/// Builds a lookup table marking every byte in `members`.
pub(crate) const fn byte_set(members: &[u8]) -> [bool; 256] {
    let mut table = [false; 256];
    let mut i = 0;
    while i < members.len() {
        table[members[i] as usize] = true;
        i += 1;
    }
    table
}

const SPACE: [bool; 256] = byte_set(b"\t\n\x0b\x0c\r ");
const PUNCT: [bool; 256] = byte_set(b"!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~");

#[inline]
pub fn isspace(ch: u8) -> bool {
    SPACE[ch as usize]
}

#[inline]
pub fn ispunct(ch: u8) -> bool {
    PUNCT[ch as usize]
}

#[inline]
pub fn isdigit(ch: u8) -> bool {
    ch.is_ascii_digit()
}

#[inline]
pub fn isalpha(ch: u8) -> bool {
    ch.is_ascii_alphabetic()
}

#[inline]
pub fn isalnum(ch: u8) -> bool {
    ch.is_ascii_alphanumeric()
}

#[inline]
pub fn isxdigit(ch: u8) -> bool {
    ch.is_ascii_hexdigit()
}
