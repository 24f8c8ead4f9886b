//! Segment <-> identifier naming transforms
//!
//! Both functions are pure and allocation-bounded by the input length.

/// Convert a path-style name to upper camel case
///
/// Runs of `-`, `_` and whitespace are dropped and upper-case the next
/// character. A run of digits also upper-cases the next character. Other
/// characters keep their case.
///
/// ```
/// use tollgate_router::upper_camelize;
///
/// assert_eq!(upper_camelize("get_foo_bar"), "GetFooBar");
/// assert_eq!(upper_camelize("get_v2api"), "GetV2Api");
/// ```
pub fn upper_camelize(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut upper_next = true;

    for c in input.trim().chars() {
        if is_delimiter(c) {
            upper_next = true;
            continue;
        }
        if upper_next {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        upper_next = c.is_ascii_digit();
    }
    out
}

/// Convert a camel-cased name to lower snake case
///
/// An upper-case letter that follows a word character starts a new word.
/// Runs of `-`, `_` and whitespace collapse into a single `_`.
///
/// ```
/// use tollgate_router::underscored;
///
/// assert_eq!(underscored("GetFooBar"), "get_foo_bar");
/// ```
pub fn underscored(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 4);
    let mut prev: Option<char> = None;

    for c in input.trim().chars() {
        if is_delimiter(c) {
            push_delimiter(&mut out);
        } else {
            if c.is_uppercase() && matches!(prev, Some(p) if is_word_char(p)) {
                push_delimiter(&mut out);
            }
            out.extend(c.to_lowercase());
        }
        prev = Some(c);
    }
    out
}

#[inline]
fn is_delimiter(c: char) -> bool {
    c == '_' || c == '-' || c.is_whitespace()
}

#[inline]
fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

#[inline]
fn push_delimiter(out: &mut String) {
    if !out.ends_with('_') {
        out.push('_');
    }
}
