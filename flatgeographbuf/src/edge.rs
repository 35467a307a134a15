//! Edge record codec: `[size u32][from u32][to u32][properties]`.
//!
//! The fixed `from`/`to` prefix is parsed with a zerocopy struct the same
//! way `EdgeInfoInner` is parsed out of a tile's edge-info blob in the
//! reference codec - a plain `#[repr(C)]` struct of little-endian integer
//! wrappers, cast directly out of the byte slice with no copying.

use zerocopy::{LE, U32};
use zerocopy_derive::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::column::Column;
use crate::error::{FggReadError, FggWriteError};
use crate::primitive::Cursor;
use crate::property::{decode_properties, encode_properties, PropertyInputMap, PropertyMap};

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
struct EdgeEndpoints {
    from: U32<LE>,
    to: U32<LE>,
}

/// An edge as supplied to `serialize`: a directed pair of vertex indices
/// plus an (unfrozen) property map.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeInput {
    pub from: u32,
    pub to: u32,
    pub properties: PropertyInputMap,
}

impl EdgeInput {
    #[must_use]
    pub fn new(from: u32, to: u32) -> Self {
        Self {
            from,
            to,
            properties: PropertyInputMap::new(),
        }
    }

    #[must_use]
    pub fn with_properties(mut self, properties: PropertyInputMap) -> Self {
        self.properties = properties;
        self
    }
}

/// A decoded edge.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Edge {
    pub from: u32,
    pub to: u32,
    /// Always present; empty when no properties were encoded for this edge.
    pub properties: PropertyMap,
}

/// Validates and serializes one edge record, appending it to `out`.
///
/// # Errors
///
/// Returns [`FggWriteError::InvalidIndex`] if `from` or `to` is outside
/// `[0, feature_count)`, or [`FggWriteError::SelfLoop`] if `from == to`.
pub(crate) fn write_edge(
    out: &mut Vec<u8>,
    edge: &EdgeInput,
    columns: &[Column],
    feature_count: u64,
    edge_index: usize,
) -> Result<(), FggWriteError> {
    if u64::from(edge.from) >= feature_count {
        return Err(FggWriteError::InvalidIndex {
            which: "from",
            index: i64::from(edge.from),
            edge_index,
            feature_count,
        });
    }
    if u64::from(edge.to) >= feature_count {
        return Err(FggWriteError::InvalidIndex {
            which: "to",
            index: i64::from(edge.to),
            edge_index,
            feature_count,
        });
    }
    if edge.from == edge.to {
        return Err(FggWriteError::SelfLoop {
            edge_index,
            node: edge.from,
        });
    }

    let properties = encode_properties(columns, &edge.properties, edge_index)?;
    let size = 8 + properties.len();
    // Property regions realistically stay well under 4 GiB; the format's
    // own size field is a u32 (§4.5), so this narrowing mirrors the wire layout.
    #[allow(clippy::cast_possible_truncation)]
    out.extend_from_slice(&(size as u32).to_le_bytes());
    out.extend_from_slice(&edge.from.to_le_bytes());
    out.extend_from_slice(&edge.to.to_le_bytes());
    out.extend_from_slice(&properties);
    Ok(())
}

/// Reads one edge record from `cur`.
///
/// Does *not* revalidate `from`/`to` against a feature count - that's a
/// writer-side invariant only (§4.5) - but does reject a record whose
/// declared size is too small to hold the fixed `from`/`to` prefix, or that
/// overruns the buffer.
pub(crate) fn read_edge(cur: &mut Cursor<'_>, columns: &[Column]) -> Result<Edge, FggReadError> {
    let size = cur.read_u32()? as i64;
    if size < 8 {
        return Err(FggReadError::InvalidEdgeSize(size));
    }
    // `size >= 8` is checked just above, so this never wraps.
    #[allow(clippy::cast_sign_loss)]
    let properties_len = (size - 8) as usize;
    if cur.remaining() < 8 + properties_len {
        return Err(FggReadError::InvalidEdgeSize(size));
    }

    let endpoints_bytes = cur.read_slice(8)?;
    let endpoints =
        EdgeEndpoints::ref_from_bytes(endpoints_bytes).map_err(|_| FggReadError::InvalidEdgeSize(size))?;
    let from = endpoints.from.get();
    let to = endpoints.to.get();

    let properties_bytes = cur.read_slice(properties_len)?;
    let mut properties_cur = Cursor::new(properties_bytes);
    let properties = decode_properties(columns, &mut properties_cur)?;

    Ok(Edge { from, to, properties })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnType;
    use crate::property::PropertyInputValue;

    #[test]
    fn round_trips_an_edge_with_properties() {
        let columns = vec![Column::new("weight", ColumnType::Double)];
        let mut props = PropertyInputMap::new();
        props.insert("weight".to_string(), PropertyInputValue::Number(1.5));
        let input = EdgeInput::new(0, 1).with_properties(props);

        let mut buf = Vec::new();
        write_edge(&mut buf, &input, &columns, 2, 0).unwrap();

        let mut cur = Cursor::new(&buf);
        let decoded = read_edge(&mut cur, &columns).unwrap();
        assert_eq!(decoded.from, 0);
        assert_eq!(decoded.to, 1);
        assert_eq!(
            decoded.properties.get("weight"),
            Some(&crate::property::PropertyValue::Double(1.5))
        );
    }

    #[test]
    fn rejects_self_loops() {
        let input = EdgeInput::new(0, 0);
        let mut buf = Vec::new();
        let err = write_edge(&mut buf, &input, &[], 2, 0).unwrap_err();
        assert!(matches!(err, FggWriteError::SelfLoop { .. }));
        assert!(err.to_string().contains("self-loops are not allowed"));
    }

    #[test]
    fn rejects_out_of_range_indices() {
        let input = EdgeInput::new(5, 0);
        let mut buf = Vec::new();
        let err = write_edge(&mut buf, &input, &[], 2, 0).unwrap_err();
        assert!(matches!(err, FggWriteError::InvalidIndex { which: "from", .. }));
        assert!(err.to_string().contains("Invalid 'from' index"));
    }

    #[test]
    fn rejects_undersized_edge_record() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&3u32.to_le_bytes());
        let mut cur = Cursor::new(&buf);
        let err = read_edge(&mut cur, &[]).unwrap_err();
        assert!(matches!(err, FggReadError::InvalidEdgeSize(3)));
    }
}
