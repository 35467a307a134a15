//! The external collaborator interface (§1, §6).
//!
//! Geometry parsing, the FlatGeobuf feature header/body encoding, and the
//! packed Hilbert R-tree index are explicitly out of scope for this crate.
//! The core only ever touches the feature section through this trait's four
//! operations - it must never reimplement R-tree sizing or feature body
//! parsing itself.

use crate::column::Column;

/// Schema/metadata surfaced by decoding a feature section header, without
/// materializing any feature bodies.
///
/// This is also the shape handed to the metadata-probe observer as
/// `features` (§4.10).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FeaturesHeaderMeta {
    pub features_count: u64,
    /// The vertex/feature schema, if the feature header declares one.
    pub columns: Option<Vec<Column>>,
    /// `0` when the feature section carries no spatial index.
    pub index_node_size: u16,
}

/// The feature-section interface consumed by the core (§6).
///
/// An implementation wraps a real FlatGeobuf feature encoder/decoder (for
/// example, the `flatgeobuf` crate). This crate ships only a minimal
/// reference implementation, [`crate::minimal_features`], sufficient to
/// drive its own tests; production use is expected to supply a real one.
pub trait FeatureCodec {
    /// The in-memory representation of a decoded feature collection.
    type Collection;

    /// The collaborator's own error type. The core never inspects it beyond
    /// propagating it via [`crate::error::FeatureError`].
    type Error: std::error::Error + Send + Sync + 'static;

    /// Decodes the feature header found in `header_bytes` (the byte window
    /// between the header-length prefix and its end; see §4.7 step 2).
    fn decode_feature_header(&self, header_bytes: &[u8]) -> Result<FeaturesHeaderMeta, Self::Error>;

    /// The byte size of a packed Hilbert R-tree index for `features_count`
    /// features at `node_size`. The core calls this to skip the index
    /// without parsing it; it never computes this itself.
    fn packed_tree_size(&self, features_count: u64, node_size: u16) -> u64;

    /// Materializes `count` features starting at byte offset `start` in
    /// `bytes`. Used by the batch `deserialize` entry point.
    fn iterate_features(
        &self,
        bytes: &[u8],
        start: usize,
        count: u64,
    ) -> Result<Self::Collection, Self::Error>;

    /// Encodes a feature collection to its on-disk byte representation
    /// (magic-free - just the feature section). Used by `serialize`.
    fn encode_features(&self, collection: &Self::Collection) -> Result<Vec<u8>, Self::Error>;
}
