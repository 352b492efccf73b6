//! Self-contained base64 codec behind `atob` / `btoa`.
//!
//! Works on the binary-string convention: every `char` of the text side stands
//! for one byte (code point 0..=255). Nothing here goes through UTF-8
//! conversion of the payload, so raw byte values survive a round trip.
//!
//! Malformed input is reported as `None`, never as an error.

/// RFC 4648 basic alphabet.
pub const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

pub const PAD: char = '=';

/// `btoa`: encodes a binary string. Returns `None` when any character is
/// outside 0..=255.
pub fn encode_binary_string(src: &str) -> Option<String> {
    let mut bytes = Vec::with_capacity(src.len());
    for ch in src.chars() {
        let code = ch as u32;
        if code > 0xFF {
            return None;
        }
        bytes.push(code as u8);
    }
    Some(encode_bytes(&bytes))
}

pub fn encode_bytes(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len().div_ceil(3) * 4);
    let mut chunks = bytes.chunks_exact(3);
    for chunk in &mut chunks {
        let (b0, b1, b2) = (chunk[0], chunk[1], chunk[2]);
        out.push(symbol(b0 >> 2));
        out.push(symbol(((b0 & 0x03) << 4) | (b1 >> 4)));
        out.push(symbol(((b1 & 0x0F) << 2) | (b2 >> 6)));
        out.push(symbol(b2 & 0x3F));
    }

    match *chunks.remainder() {
        [b0] => {
            out.push(symbol(b0 >> 2));
            out.push(symbol((b0 & 0x03) << 4));
            out.push(PAD);
            out.push(PAD);
        }
        [b0, b1] => {
            out.push(symbol(b0 >> 2));
            out.push(symbol(((b0 & 0x03) << 4) | (b1 >> 4)));
            out.push(symbol((b1 & 0x0F) << 2));
            out.push(PAD);
        }
        _ => {}
    }
    out
}

/// `atob`: decodes into a binary string, or `None` for malformed input.
pub fn decode_base64_to_binary_string(src: &str) -> Option<String> {
    decode_to_bytes(src).map(|bytes| bytes.into_iter().map(char::from).collect())
}

/// Forgiving decode.
///
/// ASCII whitespace is dropped first. Only when the remaining length is a
/// multiple of four are up to two trailing `=` stripped; any `=` left after
/// that is an invalid symbol.
pub fn decode_to_bytes(src: &str) -> Option<Vec<u8>> {
    let mut symbols: Vec<u8> = Vec::with_capacity(src.len());
    for ch in src.chars() {
        if ch.is_ascii_whitespace() {
            continue;
        }
        if !ch.is_ascii() {
            return None;
        }
        symbols.push(ch as u8);
    }

    if symbols.len() % 4 == 0 {
        for _ in 0..2 {
            if symbols.last() == Some(&b'=') {
                symbols.pop();
            }
        }
    }
    if symbols.len() % 4 == 1 {
        return None;
    }

    let mut out = Vec::with_capacity(symbols.len() / 4 * 3 + 2);
    let mut buffer: u32 = 0;
    let mut accumulated_bits = 0u32;
    for &symbol in &symbols {
        buffer = (buffer << 6) | u32::from(decode_base64_char(symbol)?);
        accumulated_bits += 6;
        if accumulated_bits == 24 {
            out.push(((buffer >> 16) & 0xFF) as u8);
            out.push(((buffer >> 8) & 0xFF) as u8);
            out.push((buffer & 0xFF) as u8);
            buffer = 0;
            accumulated_bits = 0;
        }
    }

    match accumulated_bits {
        12 => {
            buffer >>= 4;
            out.push((buffer & 0xFF) as u8);
        }
        18 => {
            buffer >>= 2;
            out.push(((buffer >> 8) & 0xFF) as u8);
            out.push((buffer & 0xFF) as u8);
        }
        _ => {}
    }
    Some(out)
}

fn symbol(index: u8) -> char {
    char::from(ALPHABET[usize::from(index & 0x3F)])
}

pub(crate) fn decode_base64_char(ch: u8) -> Option<u8> {
    let value = match ch {
        b'A'..=b'Z' => ch - b'A',
        b'a'..=b'z' => ch - b'a' + 26,
        b'0'..=b'9' => ch - b'0' + 52,
        b'+' => 62,
        b'/' => 63,
        _ => return None,
    };
    Some(value)
}
