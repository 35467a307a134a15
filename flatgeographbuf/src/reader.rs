//! Streaming edge reader (§4.9): yields edges one at a time from a located
//! graph section without materializing the whole adjacency list.

use crate::column::Column;
use crate::edge::{read_edge, Edge};
use crate::error::FggReadError;
use crate::feature_codec::FeatureCodec;
use crate::graph_section::read_graph_header;
use crate::locator::locate;
use crate::primitive::Cursor;

/// A finite, single-pass, insertion-ordered iterator over a graph section's
/// edges.
///
/// Finite: bounded by the header's `edge_count`, never reads past it.
/// Single-pass: consumes its cursor; restart by calling
/// [`deserialize_graph_edges`] again. Dropping it mid-iteration is the only
/// cancellation mechanism (§5) - there is nothing else to clean up.
pub struct EdgeReader<'a> {
    cur: Cursor<'a>,
    remaining: u32,
    columns: Vec<Column>,
}

impl<'a> EdgeReader<'a> {
    fn empty() -> Self {
        Self {
            cur: Cursor::new(&[]),
            remaining: 0,
            columns: Vec::new(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.remaining as usize
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.remaining == 0
    }
}

impl<'a> Iterator for EdgeReader<'a> {
    type Item = Result<Edge, FggReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        Some(read_edge(&mut self.cur, &self.columns))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len(), Some(self.len()))
    }
}

impl<'a> ExactSizeIterator for EdgeReader<'a> {}

/// Locates the graph section in `bytes` and returns a streaming reader over
/// its edges, without materializing any of them up front.
///
/// When `bytes` has no graph section, the returned reader is immediately
/// empty (§4.9).
///
/// # Errors
///
/// Propagates any error from the offset locator (§4.7) or from parsing the
/// graph header itself.
pub fn deserialize_graph_edges<'a, C: FeatureCodec>(
    codec: &C,
    bytes: &'a [u8],
) -> Result<EdgeReader<'a>, FggReadError> {
    let located = locate(codec, bytes)?;
    if !located.has_graph_section(bytes.len()) {
        return Ok(EdgeReader::empty());
    }

    let section = &bytes[located.graph_section_offset..];
    let (header, offset) = read_graph_header(section)?;
    Ok(EdgeReader {
        cur: Cursor::new(&section[offset..]),
        remaining: header.edge_count,
        columns: header.columns.unwrap_or_default(),
    })
}
