//! Declared-name utilities.
//!
//! Names are stored exactly as written (`declared_name`) and in a sanitized
//! form used for every lookup. Unrestricted names are written between single
//! quotes and may contain escapes; the sanitized form strips the quotes and
//! decodes the escapes.

use smol_str::SmolStr;

/// Check if a character may start a basic name.
#[inline]
fn is_name_start(c: char) -> bool {
    c == '_' || unicode_ident::is_xid_start(c)
}

/// Check if a character may continue a basic name.
#[inline]
fn is_name_continue(c: char) -> bool {
    unicode_ident::is_xid_continue(c)
}

/// Returns true if `name` can be written without quotes.
pub fn is_basic_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if is_name_start(c) => chars.all(is_name_continue),
        _ => false,
    }
}

/// Convert a declared name into its lookup form.
///
/// `'my name'` becomes `my name`, `'it\'s'` becomes `it's`. Names that are
/// not quoted are returned unchanged. A lone quote is left alone.
pub fn sanitize_name(declared: &str) -> SmolStr {
    let Some(inner) = declared
        .strip_prefix('\'')
        .and_then(|rest| rest.strip_suffix('\''))
    else {
        return SmolStr::new(declared);
    };

    if !inner.contains('\\') {
        return SmolStr::new(inner);
    }

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('b') => out.push('\u{0008}'),
            Some('f') => out.push('\u{000C}'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    SmolStr::from(out)
}

/// Render a sanitized name back to source form, quoting when needed.
pub fn escape_name(name: &str) -> SmolStr {
    if is_basic_name(name) {
        return SmolStr::new(name);
    }
    let mut out = String::with_capacity(name.len() + 2);
    out.push('\'');
    for c in name.chars() {
        match c {
            '\'' => out.push_str("\\'"),
            '\\' => out.push_str("\\\\"),
            '\u{0008}' => out.push_str("\\b"),
            '\u{000C}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('\'');
    SmolStr::from(out)
}
