//! Inclusion proofs and their wire format.
//!
//! A proof is the list of sibling digests met on the way from a leaf to the
//! root, leaf-adjacent sibling first. On the wire it is the bare
//! concatenation of those digests (32-byte stride, no length prefix); as text
//! it is `0x` followed by the hex of the wire bytes, so the empty proof of a
//! single-leaf bunch is just `0x`.

use crate::error::{BunchError, BunchResult};
use crate::types::{decode_hex, Digest};
use bunch_crypto::HASH_LEN;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Ordered sibling path, one digest per tree level.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct InclusionProof(Vec<Digest>);

impl InclusionProof {
    /// Wrap an already ordered sibling list.
    #[inline]
    #[must_use]
    pub const fn new(siblings: Vec<Digest>) -> Self {
        Self(siblings)
    }

    /// Sibling digests, leaf level first.
    #[inline]
    #[must_use]
    pub fn siblings(&self) -> &[Digest] {
        &self.0
    }

    /// Number of levels, i.e. the depth of the bunch this proof belongs to.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `true` for the proof of a single-leaf bunch.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate siblings, leaf level first.
    pub fn iter(&self) -> std::slice::Iter<'_, Digest> {
        self.0.iter()
    }

    /// Consume into the sibling list.
    #[inline]
    #[must_use]
    pub fn into_inner(self) -> Vec<Digest> {
        self.0
    }

    /// Concatenated wire bytes.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.0.len() * HASH_LEN);
        for d in &self.0 {
            out.extend_from_slice(d.as_bytes());
        }
        out
    }

    /// Decode wire bytes; fails with `MalformedProof` unless the length is a
    /// multiple of 32.
    pub fn from_bytes(bytes: &[u8]) -> BunchResult<Self> {
        if bytes.len() % HASH_LEN != 0 {
            return Err(BunchError::MalformedProof { len: bytes.len() });
        }
        bytes
            .chunks_exact(HASH_LEN)
            .map(Digest::from_slice)
            .collect::<BunchResult<Vec<_>>>()
            .map(Self)
    }

    /// `0x`-prefixed hex of the wire bytes.
    #[must_use]
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.to_bytes()))
    }

    /// Parse hex text (prefix optional) into a proof.
    pub fn from_hex(s: &str) -> BunchResult<Self> {
        let raw = decode_hex(s)?;
        Self::from_bytes(&raw)
    }
}

impl From<Vec<Digest>> for InclusionProof {
    fn from(v: Vec<Digest>) -> Self {
        Self(v)
    }
}

impl<'a> IntoIterator for &'a InclusionProof {
    type Item = &'a Digest;
    type IntoIter = std::slice::Iter<'a, Digest>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Debug for InclusionProof {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.iter()).finish()
    }
}

impl fmt::Display for InclusionProof {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for InclusionProof {
    fn serialize<S: Serializer>(&self, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for InclusionProof {
    fn deserialize<D: Deserializer<'de>>(de: D) -> Result<Self, D::Error> {
        let s = String::deserialize(de)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
