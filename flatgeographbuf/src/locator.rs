//! Offset locator (§4.7): finds where the graph section begins by walking
//! the feature section, since neither the magic nor the feature header
//! records that offset anywhere.
//!
//! This is the only way to find the graph section - there is no sentinel to
//! scan for, and a missing spatial index (`index_node_size == 0`) must be
//! tolerated.

use tracing::debug;

use crate::error::FggReadError;
use crate::feature_codec::{FeatureCodec, FeaturesHeaderMeta};
use crate::magic::{parse_magic, MagicKind, MAGIC_LEN};
use crate::primitive::Cursor;

/// The result of walking the feature section to find the graph section.
#[derive(Debug, Clone, PartialEq)]
pub struct Located {
    pub magic: MagicKind,
    pub features_meta: FeaturesHeaderMeta,
    /// Byte offset of the first feature record (after the header and any
    /// spatial index).
    pub features_start: usize,
    /// Byte offset of the graph section. Equal to `bytes.len()` when the
    /// file has no graph section (§4.7 step 5).
    pub graph_section_offset: usize,
}

impl Located {
    #[must_use]
    pub fn has_graph_section(&self, total_len: usize) -> bool {
        self.graph_section_offset < total_len
    }
}

/// Walks `bytes` to locate the graph section, delegating all feature-body
/// knowledge to `codec`.
pub fn locate<C: FeatureCodec>(codec: &C, bytes: &[u8]) -> Result<Located, FggReadError> {
    let magic = parse_magic(bytes)?;

    if let MagicKind::Fgb { .. } = magic {
        debug!(len = bytes.len(), "FlatGeobuf file with no graph section");
        return Ok(Located {
            magic,
            features_meta: FeaturesHeaderMeta {
                features_count: 0,
                columns: None,
                index_node_size: 0,
            },
            features_start: bytes.len(),
            graph_section_offset: bytes.len(),
        });
    }

    let mut cur = Cursor::new(bytes);
    cur_advance_to(&mut cur, MAGIC_LEN)?;

    let header_len = cur.read_u32()? as usize;
    let header_bytes = cur.read_slice(header_len)?;
    let features_meta = codec
        .decode_feature_header(header_bytes)
        .map_err(|e| FggReadError::Feature(Box::new(e)))?;

    if features_meta.index_node_size > 0 {
        let index_size = codec.packed_tree_size(
            features_meta.features_count,
            features_meta.index_node_size,
        );
        advance(&mut cur, index_size as usize)?;
    }

    let features_start = cur.position();

    let mut consumed = 0u64;
    while consumed < features_meta.features_count {
        let feature_len = peek_u32_at(bytes, cur.position())?;
        let total = 4 + feature_len as usize;
        advance(&mut cur, total)?;
        consumed += 1;
    }

    let graph_section_offset = cur.position();
    debug!(
        graph_section_offset,
        features_count = features_meta.features_count,
        "located graph section"
    );

    Ok(Located {
        magic,
        features_meta,
        features_start,
        graph_section_offset,
    })
}

fn cur_advance_to(cur: &mut Cursor<'_>, pos: usize) -> Result<(), FggReadError> {
    let delta = pos.saturating_sub(cur.position());
    advance(cur, delta)
}

fn advance(cur: &mut Cursor<'_>, len: usize) -> Result<(), FggReadError> {
    cur.read_slice(len).map(|_| ())
}

/// Reads the raw `u32` length prefix of one size-prefixed feature record at
/// `at`, without delegating to the feature codec - this is container
/// framing, not feature-body encoding (§1).
fn peek_u32_at(bytes: &[u8], at: usize) -> Result<u32, FggReadError> {
    if bytes.len() < at + 4 {
        return Err(FggReadError::Truncated {
            needed: at + 4 - bytes.len(),
            available: bytes.len().saturating_sub(at),
        });
    }
    let b = &bytes[at..at + 4];
    Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}
