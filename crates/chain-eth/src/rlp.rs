//! Recursive Length Prefix encoding.
//!
//! An [`RlpItem`] is either a byte string or a list of items; nothing else
//! exists on the wire. Integers are carried as minimal big-endian byte
//! strings (zero is the empty string) and converted with the helpers on
//! [`RlpItem`].
//!
//! Decoding is strict: every length must use its canonical form, and a
//! single byte below `0x80` must not be wrapped in a string header.

use crypto_utils::BigInt;

use crate::error::EthError;

/// Deepest list nesting [`decode`] accepts.
pub const MAX_DEPTH: usize = 256;

const STRING_OFFSET: u8 = 0x80;
const LIST_OFFSET: u8 = 0xc0;
const SHORT_LIMIT: usize = 55;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RlpItem {
    Bytes(Vec<u8>),
    List(Vec<RlpItem>),
}

impl RlpItem {
    pub fn empty() -> Self {
        RlpItem::Bytes(Vec::new())
    }

    /// Minimal big-endian encoding of `value`; zero is the empty string.
    pub fn from_u64(value: u64) -> Self {
        let bytes = value.to_be_bytes();
        let first = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
        RlpItem::Bytes(bytes[first..].to_vec())
    }

    /// Minimal big-endian encoding of a non-negative integer of at most
    /// 256 bits.
    pub fn from_bigint(value: &BigInt) -> Result<Self, EthError> {
        if value.is_negative() {
            return Err(EthError::EncodingOverflow(format!(
                "negative integer {value} has no rlp form"
            )));
        }
        if value.bits() > 256 {
            return Err(EthError::EncodingOverflow(format!(
                "integer of {} bits exceeds 256",
                value.bits()
            )));
        }
        Ok(RlpItem::Bytes(value.to_bytes_be()))
    }

    pub fn as_bytes(&self) -> Result<&[u8], EthError> {
        match self {
            RlpItem::Bytes(b) => Ok(b),
            RlpItem::List(_) => Err(EthError::MalformedRlp("expected string, found list".into())),
        }
    }

    pub fn as_list(&self) -> Result<&[RlpItem], EthError> {
        match self {
            RlpItem::List(items) => Ok(items),
            RlpItem::Bytes(_) => Err(EthError::MalformedRlp("expected list, found string".into())),
        }
    }

    pub fn as_u64(&self) -> Result<u64, EthError> {
        let bytes = self.integer_bytes(8)?;
        Ok(bytes.iter().fold(0u64, |acc, &b| (acc << 8) | b as u64))
    }

    /// Decodes an unsigned integer of at most 256 bits.
    pub fn as_bigint(&self) -> Result<BigInt, EthError> {
        Ok(BigInt::from_bytes_be(self.integer_bytes(32)?))
    }

    fn integer_bytes(&self, max_width: usize) -> Result<&[u8], EthError> {
        let bytes = self.as_bytes()?;
        if bytes.first() == Some(&0) {
            return Err(EthError::MalformedRlp("integer has leading zero bytes".into()));
        }
        if bytes.len() > max_width {
            return Err(EthError::EncodingOverflow(format!(
                "integer of {} bytes does not fit in {max_width}",
                bytes.len()
            )));
        }
        Ok(bytes)
    }
}

impl From<Vec<u8>> for RlpItem {
    fn from(bytes: Vec<u8>) -> Self {
        RlpItem::Bytes(bytes)
    }
}

impl From<&[u8]> for RlpItem {
    fn from(bytes: &[u8]) -> Self {
        RlpItem::Bytes(bytes.to_vec())
    }
}

impl From<u64> for RlpItem {
    fn from(value: u64) -> Self {
        RlpItem::from_u64(value)
    }
}

impl From<Vec<RlpItem>> for RlpItem {
    fn from(items: Vec<RlpItem>) -> Self {
        RlpItem::List(items)
    }
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

pub fn encode(item: &RlpItem) -> Vec<u8> {
    let mut out = Vec::new();
    encode_into(item, &mut out);
    out
}

/// Appends the encoding of `item` to `out`.
pub fn encode_into(item: &RlpItem, out: &mut Vec<u8>) {
    match item {
        RlpItem::Bytes(bytes) => {
            if bytes.len() == 1 && bytes[0] < STRING_OFFSET {
                out.push(bytes[0]);
            } else {
                write_header(out, STRING_OFFSET, bytes.len());
                out.extend_from_slice(bytes);
            }
        }
        RlpItem::List(items) => {
            let mut payload = Vec::new();
            for item in items {
                encode_into(item, &mut payload);
            }
            write_header(out, LIST_OFFSET, payload.len());
            out.extend_from_slice(&payload);
        }
    }
}

/// Encodes a list without building an intermediate [`RlpItem::List`].
pub fn encode_list(items: &[RlpItem]) -> Vec<u8> {
    let mut payload = Vec::new();
    for item in items {
        encode_into(item, &mut payload);
    }
    let mut out = Vec::with_capacity(payload.len() + 9);
    write_header(&mut out, LIST_OFFSET, payload.len());
    out.extend_from_slice(&payload);
    out
}

fn write_header(out: &mut Vec<u8>, offset: u8, len: usize) {
    if len <= SHORT_LIMIT {
        out.push(offset + len as u8);
        return;
    }
    let len_bytes = (len as u64).to_be_bytes();
    let first = len_bytes.iter().position(|&b| b != 0).unwrap_or(7);
    let len_bytes = &len_bytes[first..];
    out.push(offset + SHORT_LIMIT as u8 + len_bytes.len() as u8);
    out.extend_from_slice(len_bytes);
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decodes exactly one item; trailing bytes are an error.
pub fn decode(input: &[u8]) -> Result<RlpItem, EthError> {
    let (item, consumed) = decode_prefix(input)?;
    if consumed != input.len() {
        return Err(EthError::MalformedRlp(format!(
            "{} trailing bytes after item",
            input.len() - consumed
        )));
    }
    Ok(item)
}

/// Decodes the first item of `input`, returning it with the number of
/// bytes it occupied.
pub fn decode_prefix(input: &[u8]) -> Result<(RlpItem, usize), EthError> {
    decode_at(input, 0)
}

fn decode_at(input: &[u8], depth: usize) -> Result<(RlpItem, usize), EthError> {
    let Some(&prefix) = input.first() else {
        return Err(EthError::MalformedRlp("unexpected end of input".into()));
    };

    match prefix {
        0x00..=0x7f => Ok((RlpItem::Bytes(vec![prefix]), 1)),
        0x80..=0xb7 => {
            let len = (prefix - STRING_OFFSET) as usize;
            let payload = take(input, 1, len)?;
            if len == 1 && payload[0] < STRING_OFFSET {
                return Err(EthError::MalformedRlp(
                    "single byte below 0x80 must not carry a header".into(),
                ));
            }
            Ok((RlpItem::Bytes(payload.to_vec()), 1 + len))
        }
        0xb8..=0xbf => {
            let len_of_len = (prefix - 0xb7) as usize;
            let len = read_long_length(input, len_of_len)?;
            let payload = take(input, 1 + len_of_len, len)?;
            Ok((RlpItem::Bytes(payload.to_vec()), 1 + len_of_len + len))
        }
        0xc0..=0xf7 => {
            let len = (prefix - LIST_OFFSET) as usize;
            let payload = take(input, 1, len)?;
            let items = decode_list_payload(payload, depth)?;
            Ok((RlpItem::List(items), 1 + len))
        }
        0xf8..=0xff => {
            let len_of_len = (prefix - 0xf7) as usize;
            let len = read_long_length(input, len_of_len)?;
            let payload = take(input, 1 + len_of_len, len)?;
            let items = decode_list_payload(payload, depth)?;
            Ok((RlpItem::List(items), 1 + len_of_len + len))
        }
    }
}

fn decode_list_payload(mut payload: &[u8], depth: usize) -> Result<Vec<RlpItem>, EthError> {
    if depth >= MAX_DEPTH {
        return Err(EthError::MalformedRlp(format!(
            "list nesting exceeds {MAX_DEPTH} levels"
        )));
    }
    let mut items = Vec::new();
    while !payload.is_empty() {
        let (item, consumed) = decode_at(payload, depth + 1)?;
        items.push(item);
        payload = &payload[consumed..];
    }
    Ok(items)
}

/// Reads the big-endian length that follows a long-form prefix.
fn read_long_length(input: &[u8], len_of_len: usize) -> Result<usize, EthError> {
    let len_bytes = take(input, 1, len_of_len)?;
    if len_bytes[0] == 0 {
        return Err(EthError::MalformedRlp("length has leading zero bytes".into()));
    }
    if len_of_len > std::mem::size_of::<usize>() {
        return Err(EthError::MalformedRlp("length does not fit in memory".into()));
    }
    let len = len_bytes
        .iter()
        .fold(0usize, |acc, &b| (acc << 8) | b as usize);
    if len <= SHORT_LIMIT {
        return Err(EthError::MalformedRlp(format!(
            "long form used for {len}-byte payload"
        )));
    }
    Ok(len)
}

fn take(input: &[u8], start: usize, len: usize) -> Result<&[u8], EthError> {
    let end = start
        .checked_add(len)
        .ok_or_else(|| EthError::MalformedRlp("length overflows".into()))?;
    input.get(start..end).ok_or_else(|| {
        EthError::MalformedRlp(format!(
            "truncated: need {end} bytes, have {}",
            input.len()
        ))
    })
}
