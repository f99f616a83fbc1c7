//! Key-value pair
//!
//! The record produced by `get` and `seek`.

use std::fmt;

use bstr::BStr;

/// An ordered pair of byte sequences
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct KeyValue {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
}

impl KeyValue {
    pub fn new(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Renders as `key => value ([b0 b1 ...])`
///
/// Key and value are shown as lossy UTF-8; the bracketed list is the
/// value's raw bytes in decimal.
impl fmt::Display for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} => {} ({})",
            BStr::new(&self.key),
            BStr::new(&self.value),
            ByteList(&self.value)
        )
    }
}

struct ByteList<'a>(&'a [u8]);

impl fmt::Display for ByteList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, byte) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", byte)?;
        }
        f.write_str("]")
    }
}

impl From<(Vec<u8>, Vec<u8>)> for KeyValue {
    fn from((key, value): (Vec<u8>, Vec<u8>)) -> Self {
        Self { key, value }
    }
}
