//! Base64 text framing for binary blobs embedded in map files.
//!
//! Encoding follows the standard alphabet with `=` padding. Decoding is
//! lenient about framing: any character outside the 64-symbol alphabet
//! (padding, whitespace, line breaks) is skipped rather than rejected, which
//! lets pretty-printed files wrap the image text freely.


use thiserror::Error;

const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

const PAD: char = '=';

/// Reverse lookup from ASCII byte to 6-bit value; `-1` marks bytes that are skipped.
const DECODE_TABLE: [i8; 256] = build_decode_table();

const fn build_decode_table() -> [i8; 256] {
    let mut table = [-1i8; 256];
    let mut i = 0;
    while i < ALPHABET.len() {
        table[ALPHABET[i] as usize] = i as i8;
        i += 1;
    }
    table
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// The decoder produced a different number of bytes than the valid
    /// character count predicts.
    #[error("base64 length check failed: wrote {written} bytes instead of {expected}")]
    LengthMismatch { expected: usize, written: usize },
}

/// Encodes `data` as padded base64. Output length is `ceil(len / 3) * 4`.
pub fn encode(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len().div_ceil(3) * 4);

    for group in data.chunks(3) {
        let mut packed = u32::from(group[0]) << 16;
        if let Some(&b) = group.get(1) {
            packed |= u32::from(b) << 8;
        }
        if let Some(&b) = group.get(2) {
            packed |= u32::from(b);
        }

        out.push(symbol(packed >> 18));
        out.push(symbol(packed >> 12));
        if group.len() > 1 {
            out.push(symbol(packed >> 6));
        } else {
            out.push(PAD);
        }
        if group.len() > 2 {
            out.push(symbol(packed));
        } else {
            out.push(PAD);
        }
    }

    out
}

fn symbol(bits: u32) -> char {
    ALPHABET[(bits & 0x3F) as usize] as char
}

fn value_of(c: char) -> Option<u32> {
    if !c.is_ascii() {
        return None;
    }
    let v = DECODE_TABLE[c as usize];
    (v >= 0).then_some(v as u32)
}

/// Number of bytes `text` decodes to, counting only alphabet characters.
pub fn decoded_len(text: &str) -> usize {
    let valid = text.chars().filter(|&c| value_of(c).is_some()).count();
    let extra = match valid % 4 {
        3 => 2,
        2 => 1,
        _ => 0,
    };
    (valid / 4) * 3 + extra
}

/// Decodes base64 text, skipping every character outside the alphabet.
pub fn decode(text: &str) -> Result<Vec<u8>, CodecError> {
    let expected = decoded_len(text);
    let mut out = Vec::with_capacity(expected);

    let mut buffer: u32 = 0;
    let mut buffered_bits = 0u32;

    for value in text.chars().filter_map(value_of) {
        buffer = (buffer << 6) | value;
        buffered_bits += 6;
        if buffered_bits >= 8 {
            buffered_bits -= 8;
            out.push((buffer >> buffered_bits) as u8);
            // Only the leftover low bits matter from here on.
            buffer &= (1 << buffered_bits) - 1;
        }
    }

    if out.len() != expected {
        return Err(CodecError::LengthMismatch {
            expected,
            written: out.len(),
        });
    }

    Ok(out)
}
