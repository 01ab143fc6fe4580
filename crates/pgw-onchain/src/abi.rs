//! # Minimal Solidity ABI Codec
//!
//! Just enough of the contract ABI to talk to the gateway and its adapters:
//! static words (`uint*`, `address`, `bytes32`) and the two dynamic types
//! (`bytes`, `string`). Function selectors and error selectors are the first
//! four bytes of the keccak-256 hash of the canonical signature.

use thiserror::Error;
use tiny_keccak::{Hasher, Keccak};

/// Width of one ABI word.
pub const WORD: usize = 32;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AbiError {
    #[error("ABI data truncated: need {needed} bytes, have {available}")]
    Truncated { needed: usize, available: usize },

    #[error("ABI word {index} does not fit in {bits} bits")]
    Overflow { index: usize, bits: u32 },

    #[error("ABI string is not valid UTF-8")]
    InvalidUtf8,
}

/// keccak-256 of `data`.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    hasher.update(data);
    let mut out = [0u8; 32];
    hasher.finalize(&mut out);
    out
}

/// Four-byte selector of a canonical signature such as `adapters(string,uint8)`.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// An encodable argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Any `uintN` up to 128 bits.
    Uint(u128),
    /// Address bytes (20 for EVM), left-padded into the word.
    Address(Vec<u8>),
    FixedBytes32([u8; 32]),
    Bytes(Vec<u8>),
    String(String),
}

fn uint_word(value: u128) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[16..].copy_from_slice(&value.to_be_bytes());
    word
}

fn left_padded(bytes: &[u8]) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    let take = bytes.len().min(WORD);
    word[WORD - take..].copy_from_slice(&bytes[bytes.len() - take..]);
    word
}

fn padded_len(len: usize) -> usize {
    len.div_ceil(WORD) * WORD
}

fn push_dynamic(head: &mut Vec<u8>, tail: &mut Vec<u8>, head_len: usize, data: &[u8]) {
    head.extend_from_slice(&uint_word((head_len + tail.len()) as u128));
    tail.extend_from_slice(&uint_word(data.len() as u128));
    tail.extend_from_slice(data);
    tail.resize(tail.len() + padded_len(data.len()) - data.len(), 0);
}

/// ABI-encode an argument list (no selector).
pub fn encode(tokens: &[Token]) -> Vec<u8> {
    let head_len = tokens.len() * WORD;
    let mut head = Vec::with_capacity(head_len);
    let mut tail = Vec::new();
    for token in tokens {
        match token {
            Token::Uint(v) => head.extend_from_slice(&uint_word(*v)),
            Token::Address(a) => head.extend_from_slice(&left_padded(a)),
            Token::FixedBytes32(b) => head.extend_from_slice(b),
            Token::Bytes(data) => push_dynamic(&mut head, &mut tail, head_len, data),
            Token::String(text) => push_dynamic(&mut head, &mut tail, head_len, text.as_bytes()),
        }
    }
    head.extend_from_slice(&tail);
    head
}

/// Selector followed by encoded arguments.
pub fn encode_call(signature: &str, tokens: &[Token]) -> Vec<u8> {
    let mut out = selector(signature).to_vec();
    out.extend_from_slice(&encode(tokens));
    out
}

/// Positional reader over ABI-encoded return or error data.
#[derive(Debug, Clone, Copy)]
pub struct AbiReader<'a> {
    data: &'a [u8],
}

impl<'a> AbiReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    fn slice(&self, start: usize, len: usize) -> Result<&'a [u8], AbiError> {
        let end = start.checked_add(len).ok_or(AbiError::Truncated {
            needed: usize::MAX,
            available: self.data.len(),
        })?;
        self.data.get(start..end).ok_or(AbiError::Truncated {
            needed: end,
            available: self.data.len(),
        })
    }

    /// The raw 32-byte word at head position `index`.
    pub fn word(&self, index: usize) -> Result<[u8; WORD], AbiError> {
        let mut out = [0u8; WORD];
        out.copy_from_slice(self.slice(index * WORD, WORD)?);
        Ok(out)
    }

    fn uint_at(&self, offset: usize, index: usize, bits: u32) -> Result<u128, AbiError> {
        let raw = self.slice(offset, WORD)?;
        let (high, low) = raw.split_at(16);
        let mut buf = [0u8; 16];
        buf.copy_from_slice(low);
        let value = u128::from_be_bytes(buf);
        if high.iter().any(|b| *b != 0) || (bits < 128 && value >> bits != 0) {
            return Err(AbiError::Overflow { index, bits });
        }
        Ok(value)
    }

    /// Unsigned integer at `index`, rejecting values wider than `bits`.
    pub fn uint(&self, index: usize, bits: u32) -> Result<u128, AbiError> {
        self.uint_at(index * WORD, index, bits)
    }

    /// The last 20 bytes of the word at `index`.
    pub fn address(&self, index: usize) -> Result<[u8; 20], AbiError> {
        let word = self.word(index)?;
        let mut out = [0u8; 20];
        out.copy_from_slice(&word[12..]);
        Ok(out)
    }

    /// Dynamic `bytes` whose offset is stored at `index`.
    pub fn bytes(&self, index: usize) -> Result<Vec<u8>, AbiError> {
        let offset = self.uint(index, 64)? as usize;
        let len = self.uint_at(offset, index, 64)? as usize;
        Ok(self.slice(offset + WORD, len)?.to_vec())
    }

    /// Dynamic `string` whose offset is stored at `index`.
    pub fn string(&self, index: usize) -> Result<String, AbiError> {
        String::from_utf8(self.bytes(index)?).map_err(|_| AbiError::InvalidUtf8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_known_selectors() {
        assert_eq!(selector("Error(string)"), [0x08, 0xc3, 0x79, 0xa0]);
        assert_eq!(selector("Panic(uint256)"), [0x4e, 0x48, 0x7b, 0x71]);
        assert_eq!(selector("transfer(address,uint256)"), [0xa9, 0x05, 0x9c, 0xbb]);
    }

    #[test]
    fn static_arguments_occupy_one_word_each() {
        let enc = encode(&[Token::Uint(3), Token::Address(vec![0xaa; 20])]);
        assert_eq!(enc.len(), 64);
        assert_eq!(enc[31], 3);
        assert!(enc[32..44].iter().all(|b| *b == 0));
        assert!(enc[44..].iter().all(|b| *b == 0xaa));
    }

    #[test]
    fn dynamic_arguments_use_offsets() {
        let enc = encode(&[Token::String("eip155:42161".into()), Token::Uint(2)]);
        // head: offset, uint; tail: len, padded data
        assert_eq!(enc.len(), 4 * WORD);
        let reader = AbiReader::new(&enc);
        assert_eq!(reader.uint(0, 64).unwrap(), 64);
        assert_eq!(reader.uint(1, 8).unwrap(), 2);
        assert_eq!(reader.string(0).unwrap(), "eip155:42161");
    }

    #[test]
    fn mixed_layout_matches_reader() {
        let enc = encode(&[
            Token::String("dest".into()),
            Token::Uint(30110),
            Token::FixedBytes32([7u8; 32]),
            Token::Bytes(vec![1, 2, 3]),
        ]);
        let r = AbiReader::new(&enc);
        assert_eq!(r.string(0).unwrap(), "dest");
        assert_eq!(r.uint(1, 32).unwrap(), 30110);
        assert_eq!(r.word(2).unwrap(), [7u8; 32]);
        assert_eq!(r.bytes(3).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn empty_bytes_encode_as_zero_length() {
        let enc = encode(&[Token::Bytes(vec![])]);
        assert_eq!(enc.len(), 2 * WORD);
        assert!(AbiReader::new(&enc).bytes(0).unwrap().is_empty());
    }

    #[test]
    fn reader_detects_truncation_and_overflow() {
        let r = AbiReader::new(&[0u8; 16]);
        assert!(matches!(r.word(0), Err(AbiError::Truncated { .. })));

        let enc = encode(&[Token::Uint(300)]);
        assert_eq!(
            AbiReader::new(&enc).uint(0, 8),
            Err(AbiError::Overflow { index: 0, bits: 8 })
        );
    }

    #[test]
    fn call_starts_with_selector() {
        let call = encode_call("defaultBridgeTypes(string)", &[Token::String("x".into())]);
        assert_eq!(&call[..4], &selector("defaultBridgeTypes(string)"));
    }
}
