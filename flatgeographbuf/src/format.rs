//! Top-level `serialize`/`deserialize` entry points (§4.8): concatenates
//! the magic bytes, the externally encoded feature section, and the graph
//! section, and splits them back apart on read.

use tracing::trace;

use crate::column::Column;
use crate::edge::{Edge, EdgeInput};
use crate::error::{FeatureError, FggReadError, FggWriteError};
use crate::feature_codec::{FeatureCodec, FeaturesHeaderMeta};
use crate::graph_section::{read_graph_edges, read_graph_header, write_graph_section};
use crate::locator::locate;
use crate::magic::fgg_magic_bytes;

/// The result of a full [`deserialize`] call.
///
/// `edges` is always present, possibly empty - there is no "no adjacency
/// list" case on the read side, only an empty one (§6).
#[derive(Debug, Clone, PartialEq)]
pub struct Deserialized<Features> {
    pub features: Features,
    pub edges: Vec<Edge>,
}

/// Graph-header metadata surfaced by the metadata probe (§4.10).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GraphHeaderMeta {
    pub edge_count: u32,
    /// Absent (not merely empty) when the header declares zero columns.
    pub edge_columns: Option<Vec<Column>>,
}

/// Everything the metadata probe observer sees, before any edge or feature
/// is materialized.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProbeMeta {
    pub features: FeaturesHeaderMeta,
    /// Absent when the file has no graph section.
    pub graph: Option<GraphHeaderMeta>,
}

/// Builds a complete FlatGeoGraphBuf byte buffer from an already-encoded
/// feature collection and an optional adjacency list.
///
/// `feature_count` must match the number of features `codec` encodes from
/// `features`; the writer needs it up front to validate edge indices
/// without decoding the feature bytes back out. Coordinate reference system
/// handling is entirely the feature codec's concern and is not threaded
/// through this API (see `DESIGN.md`).
///
/// When `edges` is `None`, no graph section is appended and the output is
/// byte-identical to what `codec.encode_features` alone would produce,
/// prefixed with the FGG magic (§4.8, §8's backward-compatibility
/// property). `Some(&[])` still appends a graph section, with
/// `edge_count = 0` and no columns (§8's empty-graph-equivalence property).
///
/// # Errors
///
/// Returns [`FggWriteError::Feature`] if the feature codec fails to encode
/// `features`, or [`FggWriteError::InvalidIndex`]/[`FggWriteError::SelfLoop`]
/// if any edge violates the write-side invariants (§4.5).
pub fn serialize<C: FeatureCodec>(
    codec: &C,
    features: &C::Collection,
    feature_count: u64,
    edges: Option<&[EdgeInput]>,
) -> Result<Vec<u8>, FggWriteError> {
    let feature_bytes = codec
        .encode_features(features)
        .map_err(|e| FggWriteError::Feature(Box::new(e)))?;

    let mut out = Vec::with_capacity(8 + feature_bytes.len());
    out.extend_from_slice(&fgg_magic_bytes(0));
    out.extend_from_slice(&feature_bytes);

    if let Some(edges) = edges {
        out.extend_from_slice(&write_graph_section(edges, feature_count)?);
    }

    Ok(out)
}

/// Splits `bytes` into features and the adjacency list (§4.8).
///
/// `observer`, if supplied, is invoked exactly once after both the feature
/// header and (if present) the graph header are parsed, but before any edge
/// or feature is materialized (§4.10). An `Err` returned from it aborts the
/// read with [`FggReadError::Aborted`].
///
/// # Errors
///
/// Returns [`FggReadError::BadMagic`]/[`FggReadError::UnsupportedMajor`] if
/// the magic is invalid, any of the section-level decode errors (§7) if the
/// buffer is malformed, or [`FggReadError::Aborted`] if `observer` raises.
pub fn deserialize<C: FeatureCodec>(
    codec: &C,
    bytes: &[u8],
    mut observer: Option<&mut dyn FnMut(&ProbeMeta) -> Result<(), FeatureError>>,
) -> Result<Deserialized<C::Collection>, FggReadError> {
    let located = locate(codec, bytes)?;
    let has_graph = located.has_graph_section(bytes.len());
    trace!(
        features_count = located.features_meta.features_count,
        "parsed feature header"
    );

    let parsed_header = if has_graph {
        let (header, offset) = read_graph_header(&bytes[located.graph_section_offset..])?;
        trace!(edge_count = header.edge_count, "parsed graph header");
        Some((header, offset))
    } else {
        None
    };

    if let Some(observer) = observer.take() {
        let meta = ProbeMeta {
            features: located.features_meta.clone(),
            graph: parsed_header.as_ref().map(|(header, _)| GraphHeaderMeta {
                edge_count: header.edge_count,
                edge_columns: header.columns.clone(),
            }),
        };
        observer(&meta).map_err(FggReadError::Aborted)?;
    }

    let features = codec
        .iterate_features(bytes, located.features_start, located.features_meta.features_count)
        .map_err(|e| FggReadError::Feature(Box::new(e)))?;

    let edges = match parsed_header {
        Some((header, offset)) => {
            read_graph_edges(&bytes[located.graph_section_offset..], offset, &header)?
        }
        None => Vec::new(),
    };

    Ok(Deserialized { features, edges })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::EdgeInput;
    use crate::minimal_features::{MinimalFeature, MinimalFeatureCodec};
    use crate::property::{PropertyInputMap, PropertyInputValue, PropertyValue};

    fn two_point_features() -> Vec<MinimalFeature> {
        vec![
            MinimalFeature::point(0.0, 0.0, vec![]),
            MinimalFeature::point(1.0, 1.0, vec![]),
        ]
    }

    #[test]
    fn round_trips_a_minimal_graph() {
        let codec = MinimalFeatureCodec;
        let features = two_point_features();
        let mut props = PropertyInputMap::new();
        props.insert("weight".to_string(), PropertyInputValue::Number(1.5));
        let edges = vec![EdgeInput::new(0, 1).with_properties(props)];

        let bytes = serialize(&codec, &features, 2, Some(&edges)).unwrap();
        let result = deserialize(&codec, &bytes, None).unwrap();

        assert_eq!(result.features.len(), 2);
        assert_eq!(result.edges.len(), 1);
        assert_eq!(result.edges[0].from, 0);
        assert_eq!(result.edges[0].to, 1);
        assert_eq!(
            result.edges[0].properties.get("weight"),
            Some(&PropertyValue::Double(1.5))
        );
    }

    #[test]
    fn absent_adjacency_list_yields_empty_edges_on_read() {
        let codec = MinimalFeatureCodec;
        let features = two_point_features();

        let bytes = serialize(&codec, &features, 2, None).unwrap();
        let result = deserialize(&codec, &bytes, None).unwrap();

        assert!(result.edges.is_empty());
    }

    #[test]
    fn empty_adjacency_list_still_appends_a_graph_section() {
        let codec = MinimalFeatureCodec;
        let features = two_point_features();

        let with_none = serialize(&codec, &features, 2, None).unwrap();
        let with_empty = serialize(&codec, &features, 2, Some(&[])).unwrap();
        assert!(with_empty.len() > with_none.len());

        let result = deserialize(&codec, &with_empty, None).unwrap();
        assert!(result.edges.is_empty());
    }

    #[test]
    fn observer_sees_metadata_before_materialization() {
        let codec = MinimalFeatureCodec;
        let features = two_point_features();
        let edges = vec![EdgeInput::new(0, 1)];
        let bytes = serialize(&codec, &features, 2, Some(&edges)).unwrap();

        let mut seen = None;
        let mut observer = |meta: &ProbeMeta| {
            seen = Some(meta.clone());
            Ok(())
        };
        let result = deserialize(&codec, &bytes, Some(&mut observer)).unwrap();

        assert_eq!(result.edges.len(), 1);
        let meta = seen.expect("observer should have run");
        assert_eq!(meta.features.features_count, 2);
        assert_eq!(meta.graph.unwrap().edge_count, 1);
    }

    #[test]
    fn observer_can_abort_the_read() {
        let codec = MinimalFeatureCodec;
        let features = two_point_features();
        let bytes = serialize(&codec, &features, 2, None).unwrap();

        let mut observer = |_: &ProbeMeta| Err("nope".into());
        let err = deserialize(&codec, &bytes, Some(&mut observer)).unwrap_err();
        assert!(matches!(err, FggReadError::Aborted(_)));
    }

    #[test]
    fn rejects_invalid_edge_indices_at_serialize_time() {
        let codec = MinimalFeatureCodec;
        let features = two_point_features();
        let edges = vec![EdgeInput::new(5, 0)];

        let err = serialize(&codec, &features, 2, Some(&edges)).unwrap_err();
        assert!(matches!(err, FggWriteError::InvalidIndex { which: "from", .. }));
    }
}
