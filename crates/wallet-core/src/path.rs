use std::fmt;
use std::str::FromStr;

use crate::error::WalletError;

pub const HARDENED_OFFSET: u32 = 0x8000_0000;

/// One step of a derivation path, stored as the raw 32-bit index with the
/// hardened bit included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChildIndex(u32);

impl ChildIndex {
    pub fn normal(index: u32) -> Result<Self, WalletError> {
        check_range(index)?;
        Ok(ChildIndex(index))
    }

    pub fn hardened(index: u32) -> Result<Self, WalletError> {
        check_range(index)?;
        Ok(ChildIndex(index | HARDENED_OFFSET))
    }

    pub fn from_raw(raw: u32) -> Self {
        ChildIndex(raw)
    }

    pub fn raw(self) -> u32 {
        self.0
    }

    pub fn is_hardened(self) -> bool {
        self.0 >= HARDENED_OFFSET
    }

    /// The index without the hardened bit.
    pub fn index(self) -> u32 {
        self.0 & !HARDENED_OFFSET
    }
}

fn check_range(index: u32) -> Result<(), WalletError> {
    if index >= HARDENED_OFFSET {
        return Err(WalletError::InvalidPath(format!(
            "index {index} must be below 2^31"
        )));
    }
    Ok(())
}

impl fmt::Display for ChildIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_hardened() {
            write!(f, "{}'", self.index())
        } else {
            write!(f, "{}", self.index())
        }
    }
}

impl FromStr for ChildIndex {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (digits, hardened) = match s.strip_suffix(['\'', 'h', 'H']) {
            Some(rest) => (rest, true),
            None => (s, false),
        };
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(WalletError::InvalidPath(format!("invalid path component {s:?}")));
        }
        let index: u32 = digits
            .parse()
            .map_err(|_| WalletError::InvalidPath(format!("path component {s:?} is out of range")))?;
        if hardened {
            ChildIndex::hardened(index)
        } else {
            ChildIndex::normal(index)
        }
    }
}

/// A BIP32 path such as `m/44'/60'/0'/0/0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct DerivationPath(Vec<ChildIndex>);

impl DerivationPath {
    pub fn master() -> Self {
        DerivationPath(Vec::new())
    }

    /// `m/44'/coin_type'/account'/change/index`.
    pub fn bip44(coin_type: u32, account: u32, change: u32, index: u32) -> Result<Self, WalletError> {
        Ok(DerivationPath(vec![
            ChildIndex::hardened(44)?,
            ChildIndex::hardened(coin_type)?,
            ChildIndex::hardened(account)?,
            ChildIndex::normal(change)?,
            ChildIndex::normal(index)?,
        ]))
    }

    pub fn child(&self, index: ChildIndex) -> Self {
        let mut steps = self.0.clone();
        steps.push(index);
        DerivationPath(steps)
    }

    pub fn as_slice(&self) -> &[ChildIndex] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = ChildIndex> + '_ {
        self.0.iter().copied()
    }
}

impl From<Vec<ChildIndex>> for DerivationPath {
    fn from(steps: Vec<ChildIndex>) -> Self {
        DerivationPath(steps)
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("m")?;
        for step in &self.0 {
            write!(f, "/{step}")?;
        }
        Ok(())
    }
}

impl FromStr for DerivationPath {
    type Err = WalletError;

    /// Accepts `'`, `h` or `H` as the hardened marker.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().split('/');
        if parts.next() != Some("m") {
            return Err(WalletError::InvalidPath(format!("{s:?} must start with m")));
        }
        parts
            .map(str::parse)
            .collect::<Result<Vec<ChildIndex>, _>>()
            .map(DerivationPath)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display_round_trip() {
        let path: DerivationPath = "m/44'/60'/0'/0/0".parse().unwrap();
        assert_eq!(path.len(), 5);
        assert_eq!(path.to_string(), "m/44'/60'/0'/0/0");
        assert_eq!(path, DerivationPath::bip44(60, 0, 0, 0).unwrap());
    }

    #[test]
    fn hardened_markers_are_equivalent() {
        let a: DerivationPath = "m/0'/1h/2H".parse().unwrap();
        let b: DerivationPath = "m/0'/1'/2'".parse().unwrap();
        assert_eq!(a, b);
        assert!(a.iter().all(ChildIndex::is_hardened));
    }

    #[test]
    fn master_path() {
        let path: DerivationPath = "m".parse().unwrap();
        assert!(path.is_empty());
        assert_eq!(path.to_string(), "m");
        assert_eq!(path, DerivationPath::master());
    }

    #[test]
    fn rejects_malformed_paths() {
        for bad in ["", "44'/60'", "m/", "m//1", "m/x", "m/1''", "m/-1", "m/2147483648", "m/4294967296", "n/0"] {
            assert!(
                matches!(bad.parse::<DerivationPath>(), Err(WalletError::InvalidPath(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn child_index_bits() {
        let hardened = ChildIndex::hardened(5).unwrap();
        assert_eq!(hardened.raw(), 0x8000_0005);
        assert_eq!(hardened.index(), 5);
        assert!(hardened.is_hardened());
        assert_eq!(hardened.to_string(), "5'");

        let normal = ChildIndex::normal(2_147_483_647).unwrap();
        assert!(!normal.is_hardened());
        assert!(ChildIndex::normal(HARDENED_OFFSET).is_err());
        assert_eq!(ChildIndex::from_raw(HARDENED_OFFSET), ChildIndex::hardened(0).unwrap());
    }

    #[test]
    fn child_extends_path() {
        let account: DerivationPath = "m/44'/60'/0'".parse().unwrap();
        let leaf = account
            .child(ChildIndex::normal(0).unwrap())
            .child(ChildIndex::normal(3).unwrap());
        assert_eq!(leaf.to_string(), "m/44'/60'/0'/0/3");
        assert_eq!(account.len(), 3);
    }
}
