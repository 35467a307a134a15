//! Graph section codec: `[header-size u32][header][edge₀][edge₁]…[edge_{n-1}]`.
//!
//! The graph header itself is `[edgeCount u32][columnCount u16][columns…]`.
//! The fixed `edgeCount`/`columnCount` prefix is cast with a zerocopy
//! struct, the same technique used for the `from`/`to` pair in
//! [`crate::edge`] and for the mega-structs in the reference tile codec.

use std::mem::size_of;

use zerocopy::{LE, U16, U32};
use zerocopy_derive::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::column::{read_columns, write_columns, Column};
use crate::edge::{read_edge, write_edge, Edge, EdgeInput};
use crate::error::{FggReadError, FggWriteError};
use crate::primitive::Cursor;
use crate::property::infer_schema;

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
struct GraphHeaderCounts {
    edge_count: U32<LE>,
    column_count: U16<LE>,
}

/// The graph section's header: edge count plus, if any edge carries
/// properties, the frozen column schema those properties were encoded
/// against.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphHeader {
    pub edge_count: u32,
    /// Absent (not merely empty) when the column count is zero, per §4.3 /
    /// §4.10.
    pub columns: Option<Vec<Column>>,
}

impl GraphHeader {
    fn write(&self, out: &mut Vec<u8>) {
        // The wire format's column count is a u16 (§4.3); well-formed schemas
        // never approach that many columns.
        #[allow(clippy::cast_possible_truncation)]
        let column_count = self.columns.as_ref().map_or(0, Vec::len) as u16;
        out.extend_from_slice(&self.edge_count.to_le_bytes());
        out.extend_from_slice(&column_count.to_le_bytes());
        if let Some(columns) = &self.columns {
            write_columns(out, columns);
        }
    }

    pub(crate) fn read(bytes: &[u8]) -> Result<Self, FggReadError> {
        let (counts, rest) = GraphHeaderCounts::ref_from_prefix(bytes).map_err(|_| {
            FggReadError::Truncated {
                needed: size_of::<GraphHeaderCounts>(),
                available: bytes.len(),
            }
        })?;
        let column_count = counts.column_count.get();
        let columns = if column_count == 0 {
            None
        } else {
            let mut cur = Cursor::new(rest);
            Some(read_columns(&mut cur, column_count)?)
        };
        Ok(Self {
            edge_count: counts.edge_count.get(),
            columns,
        })
    }
}

/// Builds the complete graph section (header + edge records) for `edges`,
/// ready to be appended after the feature section.
///
/// Performs schema inference (§3/§9) from the first edge with a non-empty
/// property map, then validates and encodes every edge against the frozen
/// schema.
pub(crate) fn write_graph_section(
    edges: &[EdgeInput],
    feature_count: u64,
) -> Result<Vec<u8>, FggWriteError> {
    let columns = infer_schema(edges.iter().map(|e| &e.properties));

    let mut edge_bytes = Vec::new();
    for (edge_index, edge) in edges.iter().enumerate() {
        write_edge(
            &mut edge_bytes,
            edge,
            columns.as_deref().unwrap_or(&[]),
            feature_count,
            edge_index,
        )?;
    }

    // The wire format's edge count and header-size prefix are both u32
    // (§4.3, §4.6); realistic edge lists stay well under that bound.
    #[allow(clippy::cast_possible_truncation)]
    let header = GraphHeader {
        edge_count: edges.len() as u32,
        columns,
    };
    let mut header_bytes = Vec::new();
    header.write(&mut header_bytes);

    let mut out = Vec::with_capacity(4 + header_bytes.len() + edge_bytes.len());
    #[allow(clippy::cast_possible_truncation)]
    out.extend_from_slice(&(header_bytes.len() as u32).to_le_bytes());
    out.extend_from_slice(&header_bytes);
    out.extend_from_slice(&edge_bytes);
    Ok(out)
}

/// Reads just the graph header starting at the beginning of `bytes`,
/// returning it along with the offset (relative to `bytes`) at which the
/// edge records begin.
///
/// Split out from [`read_graph_section`] so the metadata probe (§4.10) can
/// see the header without materializing any edge.
pub(crate) fn read_graph_header(bytes: &[u8]) -> Result<(GraphHeader, usize), FggReadError> {
    let mut cur = Cursor::new(bytes);
    let header_size = cur.read_u32()? as usize;
    let header_bytes = cur.read_slice(header_size)?;
    let header = GraphHeader::read(header_bytes)?;
    Ok((header, cur.position()))
}

/// Reads exactly `header.edge_count` edge records starting at `offset` in
/// `bytes`, against `header`'s column schema.
pub(crate) fn read_graph_edges(
    bytes: &[u8],
    offset: usize,
    header: &GraphHeader,
) -> Result<Vec<Edge>, FggReadError> {
    let columns = header.columns.clone().unwrap_or_default();
    let mut cur = Cursor::new(&bytes[offset..]);
    let mut edges = Vec::with_capacity(header.edge_count as usize);
    for _ in 0..header.edge_count {
        edges.push(read_edge(&mut cur, &columns)?);
    }
    Ok(edges)
}

/// Reads the graph section starting at the beginning of `bytes`.
///
/// Returns the parsed header and every edge it declares. `bytes` must start
/// exactly at the section's offset, as computed by [`crate::locator`].
pub(crate) fn read_graph_section(bytes: &[u8]) -> Result<(GraphHeader, Vec<Edge>), FggReadError> {
    let (header, offset) = read_graph_header(bytes)?;
    let edges = read_graph_edges(bytes, offset, &header)?;
    Ok((header, edges))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::{PropertyInputMap, PropertyInputValue, PropertyValue};

    #[test]
    fn round_trips_an_empty_graph_section() {
        let section = write_graph_section(&[], 0).unwrap();
        let (header, edges) = read_graph_section(&section).unwrap();
        assert_eq!(header.edge_count, 0);
        assert_eq!(header.columns, None);
        assert!(edges.is_empty());
    }

    #[test]
    fn round_trips_bidirectional_edges_with_properties() {
        let mut forward = PropertyInputMap::new();
        forward.insert(
            "direction".to_string(),
            PropertyInputValue::String("forward".to_string()),
        );
        let mut backward = PropertyInputMap::new();
        backward.insert(
            "direction".to_string(),
            PropertyInputValue::String("backward".to_string()),
        );

        let edges = vec![
            EdgeInput::new(0, 1).with_properties(forward),
            EdgeInput::new(1, 0).with_properties(backward),
        ];

        let section = write_graph_section(&edges, 2).unwrap();
        let (header, decoded) = read_graph_section(&section).unwrap();

        assert_eq!(header.edge_count, 2);
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[0].from, 0);
        assert_eq!(decoded[0].to, 1);
        assert_eq!(
            decoded[0].properties.get("direction"),
            Some(&PropertyValue::String("forward".to_string()))
        );
        assert_eq!(decoded[1].from, 1);
        assert_eq!(decoded[1].to, 0);
        assert_eq!(
            decoded[1].properties.get("direction"),
            Some(&PropertyValue::String("backward".to_string()))
        );
    }
}
