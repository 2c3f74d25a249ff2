//! Harmonized System code helpers.
//!
//! HS codes are opaque strings sliced by fixed prefix lengths: 2 digits for
//! the chapter, 4 for the heading, 6 for the sub-heading. They are never
//! parsed as numbers (leading zeros are significant).

/// Chapter prefix (2 digits).
pub fn chapter(code: &str) -> &str {
    prefix(code, 2)
}

/// Heading prefix (4 digits).
pub fn heading(code: &str) -> &str {
    prefix(code, 4)
}

/// Sub-heading prefix (6 digits).
pub fn subheading(code: &str) -> &str {
    prefix(code, 6)
}

/// True when the two codes fall in different chapters.
pub fn chapter_differs(a: &str, b: &str) -> bool {
    chapter(a) != chapter(b)
}

/// True when the two codes fall under different headings.
pub fn heading_differs(a: &str, b: &str) -> bool {
    heading(a) != heading(b)
}

/// True when the two codes fall under different sub-headings.
pub fn subheading_differs(a: &str, b: &str) -> bool {
    subheading(a) != subheading(b)
}

/// Prefix of at most `len` bytes; shorter codes are returned whole.
fn prefix(code: &str, len: usize) -> &str {
    code.get(..len).unwrap_or(code)
}
