//! BIP39 mnemonic phrases and seed derivation.
//!
//! The English word list comes from the `bip39` crate; encoding, checksum
//! validation and the PBKDF2 seed stretch are done here on top of
//! `crypto_utils`.

use std::fmt;

use bip39::Language;
use crypto_utils::hash::{pbkdf2_hmac_sha512, sha256};
use crypto_utils::random::random_entropy;
use log::debug;
use unicode_normalization::UnicodeNormalization;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::WalletError;

/// Accepted phrase lengths.
pub const WORD_COUNTS: [usize; 5] = [12, 15, 18, 21, 24];

const SEED_ITERATIONS: u32 = 2048;
const BITS_PER_WORD: usize = 11;

/// A checksummed BIP39 phrase. The phrase and its entropy are wiped on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Mnemonic {
    phrase: String,
    entropy: Vec<u8>,
}

impl Mnemonic {
    /// Encodes 16, 20, 24, 28 or 32 bytes of entropy as 12 to 24 words.
    pub fn from_entropy(entropy: &[u8]) -> Result<Self, WalletError> {
        if !(16..=32).contains(&entropy.len()) || entropy.len() % 4 != 0 {
            return Err(WalletError::InvalidMnemonic(format!(
                "entropy must be 16, 20, 24, 28 or 32 bytes, got {}",
                entropy.len()
            )));
        }

        let list = word_list();
        let checksum = sha256(entropy);
        let entropy_bits = entropy.len() * 8;
        let total_bits = entropy_bits + entropy_bits / 32;

        let mut words = Vec::with_capacity(total_bits / BITS_PER_WORD);
        for word in 0..total_bits / BITS_PER_WORD {
            let mut index = 0usize;
            for bit in 0..BITS_PER_WORD {
                let i = word * BITS_PER_WORD + bit;
                let set = if i < entropy_bits {
                    bit_at(entropy, i)
                } else {
                    bit_at(&checksum, i - entropy_bits)
                };
                index = (index << 1) | set as usize;
            }
            words.push(list[index]);
        }

        Ok(Mnemonic {
            phrase: words.join(" "),
            entropy: entropy.to_vec(),
        })
    }

    /// A fresh phrase of `word_count` words from OS randomness.
    pub fn generate(word_count: usize) -> Result<Self, WalletError> {
        if !WORD_COUNTS.contains(&word_count) {
            return Err(WalletError::InvalidMnemonic(format!(
                "unsupported word count {word_count}"
            )));
        }
        let entropy = random_entropy(word_count * 4 / 3)?;
        debug!("generated {word_count}-word mnemonic");
        Mnemonic::from_entropy(&entropy)
    }

    /// Parses and validates a phrase. Input is NFKD-normalized and any run
    /// of whitespace separates words.
    pub fn parse(phrase: &str) -> Result<Self, WalletError> {
        let normalized = Zeroizing::new(phrase.nfkd().collect::<String>());
        let words: Vec<&str> = normalized.split_whitespace().collect();
        if !WORD_COUNTS.contains(&words.len()) {
            return Err(WalletError::InvalidMnemonic(format!(
                "expected 12, 15, 18, 21 or 24 words, got {}",
                words.len()
            )));
        }

        // 24 words carry 264 bits: 256 of entropy and 8 of checksum.
        let mut bits = Zeroizing::new([0u8; 33]);
        for (position, word) in words.iter().enumerate() {
            let index = Language::English.find_word(word).ok_or_else(|| {
                WalletError::InvalidMnemonic(format!("word {} is not in the word list", position + 1))
            })?;
            for bit in 0..BITS_PER_WORD {
                if (index >> (BITS_PER_WORD - 1 - bit)) & 1 == 1 {
                    let i = position * BITS_PER_WORD + bit;
                    bits[i / 8] |= 0x80 >> (i % 8);
                }
            }
        }

        let entropy_len = words.len() * 4 / 3;
        let checksum_bits = entropy_len / 4;
        let entropy = &bits[..entropy_len];
        let expected = sha256(entropy)[0] >> (8 - checksum_bits);
        let actual = bits[entropy_len] >> (8 - checksum_bits);
        if expected != actual {
            return Err(WalletError::InvalidMnemonic("checksum mismatch".into()));
        }

        Ok(Mnemonic {
            phrase: words.join(" "),
            entropy: entropy.to_vec(),
        })
    }

    pub fn phrase(&self) -> &str {
        &self.phrase
    }

    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.phrase.split(' ')
    }

    pub fn word_count(&self) -> usize {
        self.words().count()
    }

    pub fn entropy(&self) -> &[u8] {
        &self.entropy
    }

    /// PBKDF2-HMAC-SHA512 over the phrase, salted with `"mnemonic"` and the
    /// NFKD-normalized passphrase, 2048 iterations.
    pub fn to_seed(&self, passphrase: &str) -> Seed {
        let mut salt = Zeroizing::new(String::from("mnemonic"));
        salt.extend(passphrase.nfkd());
        Seed(pbkdf2_hmac_sha512(
            self.phrase.as_bytes(),
            salt.as_bytes(),
            SEED_ITERATIONS,
        ))
    }
}

impl fmt::Debug for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Mnemonic(<{} words redacted>)", self.word_count())
    }
}

/// A 64-byte BIP39 seed, wiped on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Seed([u8; 64]);

impl Seed {
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }
}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Seed(<redacted>)")
    }
}

fn bit_at(bytes: &[u8], i: usize) -> bool {
    (bytes[i / 8] >> (7 - i % 8)) & 1 == 1
}

/// Generates a phrase of `word_count` words.
pub fn generate_mnemonic(word_count: usize) -> Result<String, WalletError> {
    Ok(Mnemonic::generate(word_count)?.phrase().to_string())
}

pub fn validate_mnemonic(phrase: &str) -> bool {
    Mnemonic::parse(phrase).is_ok()
}

pub fn mnemonic_to_seed(phrase: &str, passphrase: &str) -> Result<Seed, WalletError> {
    Ok(Mnemonic::parse(phrase)?.to_seed(passphrase))
}

/// Get the word list for autocomplete
pub fn word_list() -> &'static [&'static str; 2048] {
    Language::English.word_list()
}

pub fn is_valid_word(word: &str) -> bool {
    Language::English.find_word(word).is_some()
}
