//! FlatGeoGraphBuf: a binary container format for geospatial graphs.
//!
//! It layers an adjacency-list section on top of an existing
//! FlatGeobuf-compatible feature stream: vertices are carried as features
//! (geometry and properties delegated to an external [`FeatureCodec`]), and
//! directed edges between them are carried as size-prefixed records in a
//! trailing graph section.
//!
//! This crate owns the graph codec: the on-disk layout of the graph
//! section and its relationship to the preceding feature section, the
//! encoding and decoding of edges and their typed properties, the
//! streaming reader, and the metadata-probe path. It does not parse
//! geometry, build a spatial index, or encode the FlatGeobuf feature
//! header/body itself - those are supplied by a [`FeatureCodec`]
//! implementation. [`minimal_features`] ships a small one sufficient for
//! this crate's own tests and for the `fgg-cli` demo.
//!
//! ```
//! use flatgeographbuf::{serialize, deserialize, EdgeInput};
//! use flatgeographbuf::minimal_features::{MinimalFeature, MinimalFeatureCodec};
//!
//! let codec = MinimalFeatureCodec;
//! let features = vec![
//!     MinimalFeature::point(0.0, 0.0, vec![]),
//!     MinimalFeature::point(1.0, 1.0, vec![]),
//! ];
//! let edges = vec![EdgeInput::new(0, 1)];
//!
//! let bytes = serialize(&codec, &features, 2, Some(&edges)).unwrap();
//! let decoded = deserialize(&codec, &bytes, None).unwrap();
//! assert_eq!(decoded.edges.len(), 1);
//! ```

mod column;
mod edge;
mod error;
mod feature_codec;
mod format;
mod graph_section;
mod locator;
mod magic;
pub mod minimal_features;
mod primitive;
mod property;
mod reader;

pub use column::{Column, ColumnType};
pub use edge::{Edge, EdgeInput};
pub use error::{FeatureError, FggReadError, FggWriteError};
pub use feature_codec::{FeatureCodec, FeaturesHeaderMeta};
pub use format::{deserialize, serialize, Deserialized, GraphHeaderMeta, ProbeMeta};
pub use locator::{locate, Located};
pub use magic::{fgg_magic_bytes, parse_magic, MagicKind, MAGIC_LEN, SUPPORTED_MAJOR};
pub use property::{PropertyInputMap, PropertyInputValue, PropertyMap, PropertyValue};
pub use reader::{deserialize_graph_edges, EdgeReader};
