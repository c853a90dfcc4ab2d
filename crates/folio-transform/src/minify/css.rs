//! Conservative CSS compaction.
//!
//! Only whitespace and comments are touched. Colons and `+` keep their
//! surrounding spaces since they are significant in selectors and `calc()`.

/// Characters that never need whitespace on either side.
const PUNCTUATION: &[u8] = b"{};,>~";

/// Compact a stylesheet. Comments starting with `/*!` are kept.
pub(super) fn minify(source: &str) -> String {
    let bytes = source.as_bytes();
    let mut out = String::with_capacity(source.len());
    let mut space = false;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            quote @ (b'"' | b'\'') => {
                let end = string_end(bytes, i, quote);
                flush_space(&mut out, &mut space);
                out.push_str(&source[i..end]);
                i = end;
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                let end = source[i + 2..].find("*/").map_or(bytes.len(), |p| i + 2 + p + 2);
                if source[i..].starts_with("/*!") {
                    flush_space(&mut out, &mut space);
                    out.push_str(&source[i..end]);
                } else {
                    space = true;
                }
                i = end;
            }
            b' ' | b'\t' | b'\n' | b'\r' | b'\x0C' => {
                space = true;
                i += 1;
            }
            b if PUNCTUATION.contains(&b) => {
                space = false;
                if b == b'}' {
                    while out.ends_with(';') {
                        out.pop();
                    }
                }
                out.push(char::from(b));
                i += 1;
            }
            _ => {
                let end = bytes[i..]
                    .iter()
                    .position(|&b| is_special(b))
                    .map_or(bytes.len(), |p| i + p)
                    .max(i + 1);
                flush_space(&mut out, &mut space);
                out.push_str(&source[i..end]);
                i = end;
            }
        }
    }

    out
}

fn is_special(b: u8) -> bool {
    matches!(b, b'"' | b'\'' | b'/' | b' ' | b'\t' | b'\n' | b'\r' | b'\x0C') || PUNCTUATION.contains(&b)
}

/// Emit a pending space unless it would sit at the start or after punctuation.
fn flush_space(out: &mut String, space: &mut bool) {
    if *space && !out.is_empty() && !out.bytes().last().is_some_and(|b| PUNCTUATION.contains(&b)) {
        out.push(' ');
    }
    *space = false;
}

/// Index just past the closing quote of the string starting at `start`.
fn string_end(bytes: &[u8], start: usize, quote: u8) -> usize {
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b if b == quote => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}
