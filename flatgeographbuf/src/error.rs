//! Error kinds for the codec.
//!
//! Split the same way `GraphTileDecodingError` / `GraphTileBuildError` are
//! split in the reference tile codec: one enum for failures that can only
//! happen while writing, one for failures that can only happen while
//! reading. Nothing here is recovered internally; every variant is surfaced
//! to the caller as-is.

use std::error::Error as StdError;

use thiserror::Error;

/// A type-erased error from the caller-supplied feature codec.
///
/// The core never inspects the concrete error type of its collaborator
/// (see the `FeatureCodec` trait); it only needs to propagate it.
pub type FeatureError = Box<dyn StdError + Send + Sync + 'static>;

/// Errors raised while serializing a graph (`serialize`).
#[derive(Debug, Error)]
pub enum FggWriteError {
    /// `from` or `to` is outside `[0, featureCount)`.
    ///
    /// The message intentionally contains `"Invalid 'from' index"` or
    /// `"Invalid 'to' index"` verbatim so callers that pattern-match on the
    /// message stay compatible with other FlatGeoGraphBuf implementations.
    #[error("Invalid '{which}' index {index} at edge {edge_index}: must be in [0, {feature_count})")]
    InvalidIndex {
        which: &'static str,
        index: i64,
        edge_index: usize,
        feature_count: u64,
    },

    /// `from == to`.
    ///
    /// The message contains `"self-loops are not allowed"` verbatim.
    #[error("edge {edge_index} connects node {node} to itself: self-loops are not allowed")]
    SelfLoop { edge_index: usize, node: u32 },

    /// A property value isn't one of the types the codec knows how to encode.
    #[error("property '{key}' on edge {edge_index} has an unsupported value type")]
    UnknownPropertyType { edge_index: usize, key: String },

    /// The feature codec's own `encode_features` call failed.
    #[error("feature encoding failed: {0}")]
    Feature(#[source] FeatureError),
}

/// Errors raised while reading (`deserialize`, `deserialize_graph_edges`, or
/// any lower-level decode step).
#[derive(Debug, Error)]
pub enum FggReadError {
    /// The first 8 bytes are neither FGG nor FGB magic.
    #[error("bad magic bytes: not a FlatGeoGraphBuf or FlatGeobuf file")]
    BadMagic,

    /// The magic's major version byte is greater than this reader supports.
    #[error("unsupported major version {found} (this reader supports up to {max_supported})")]
    UnsupportedMajor { found: u8, max_supported: u8 },

    /// A read would run past the end of the input buffer.
    #[error("truncated input: needed {needed} more byte(s), only {available} available")]
    Truncated { needed: usize, available: usize },

    /// A column-type byte is outside `{0..14}`.
    #[error("invalid column type byte: {0}")]
    InvalidColumnType(u8),

    /// An edge's declared size is `< 8` or overruns the containing section.
    #[error("invalid edge size: {0}")]
    InvalidEdgeSize(i64),

    /// A `Json`-typed property payload failed to parse as JSON.
    #[error("malformed JSON property payload: {0}")]
    MalformedJson(#[source] serde_json::Error),

    /// The feature codec's own call failed (header decode or feature iteration).
    #[error("feature decoding failed: {0}")]
    Feature(#[source] FeatureError),

    /// The metadata probe observer raised to abort the read.
    #[error("read aborted by observer: {0}")]
    Aborted(#[source] FeatureError),
}
