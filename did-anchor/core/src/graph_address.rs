/// Content address of a document stored in the transaction graph.  It is the multibase
/// (base64url) encoding of the BLAKE3 digest of the document's canonical (JCS) bytes, so the
/// same bytes always produce the same address.
#[derive(
    Clone,
    Debug,
    serde::Deserialize,
    derive_more::Deref,
    derive_more::Display,
    Eq,
    derive_more::From,
    Hash,
    derive_more::Into,
    Ord,
    PartialEq,
    PartialOrd,
    serde::Serialize,
)]
#[serde(transparent)]
pub struct GraphAddress(String);

impl GraphAddress {
    /// Compute the content address of the given canonical bytes.
    pub fn of_canonical_bytes(canonical_bytes: &[u8]) -> Self {
        let digest = blake3::hash(canonical_bytes);
        Self(multibase::encode(
            multibase::Base::Base64Url,
            digest.as_bytes(),
        ))
    }
    /// Returns true iff this address is the content address of the given bytes.
    pub fn addresses(&self, canonical_bytes: &[u8]) -> bool {
        *self == Self::of_canonical_bytes(canonical_bytes)
    }
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<&str> for GraphAddress {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::borrow::Borrow<str> for GraphAddress {
    fn borrow(&self) -> &str {
        self.0.as_str()
    }
}

impl PartialEq<str> for GraphAddress {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for GraphAddress {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graph_address_is_deterministic() {
        let a = GraphAddress::of_canonical_bytes(b"{\"a\":1}");
        let b = GraphAddress::of_canonical_bytes(b"{\"a\":1}");
        let c = GraphAddress::of_canonical_bytes(b"{\"a\":2}");
        assert_eq!(a, b);
        assert_ne!(a, c);
        // multibase prefix for base64url
        assert!(a.as_str().starts_with('u'));
        assert!(a.addresses(b"{\"a\":1}"));
        assert!(!a.addresses(b"{\"a\":2}"));
    }
}
