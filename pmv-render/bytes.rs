use std::fmt::Write as _;

/// Display token for one literal byte.
///
/// Whitespace that would be invisible or ambiguous in a rendered grammar is
/// escaped or quoted, `|` is quoted because it separates alternatives, and
/// anything outside printable ASCII is shown as two lowercase hex digits.
/// Form feed has no escape token and falls through to hex.
#[must_use]
pub fn render_byte(byte: u8) -> String {
    let mut token = String::with_capacity(3);
    push_byte(&mut token, byte);
    token
}

/// Concatenated tokens of every byte of a literal.
#[must_use]
pub fn render_bytes(bytes: &[u8]) -> String {
    let mut text = String::with_capacity(bytes.len());
    for &byte in bytes {
        push_byte(&mut text, byte);
    }
    text
}

fn push_byte(out: &mut String, byte: u8) {
    match byte {
        b'\t' => out.push_str("\\t"),
        b'\n' => out.push_str("\\n"),
        0x0b => out.push_str("\\v"),
        b'\r' => out.push_str("\\r"),
        b' ' => out.push_str("' '"),
        b'|' => out.push_str("'|'"),
        b if b.is_ascii_graphic() => out.push(char::from(b)),
        b => {
            _ = write!(out, "{b:02x}");
        }
    }
}
