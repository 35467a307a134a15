//! A minimal, intentionally small `FeatureCodec` implementation.
//!
//! The real FlatGeobuf feature header, R-tree index, and feature body
//! encoding are out of scope for this crate (§1) - production callers are
//! expected to plug in a real implementation (e.g. backed by the
//! `flatgeobuf` crate). This module exists only so the crate's own tests
//! and the `fgg-cli` demo have something concrete to round-trip against; it
//! supports `Point` geometry and a flat property map only.

use geo::Point;
use thiserror::Error;

use crate::column::{read_columns, write_columns, Column};
use crate::error::FggReadError;
use crate::feature_codec::{FeatureCodec, FeaturesHeaderMeta};
use crate::primitive::Cursor;
use crate::property::{decode_properties, encode_properties, infer_schema, PropertyInputMap, PropertyMap};

#[derive(Debug, Error)]
pub enum MinimalFeatureError {
    #[error(transparent)]
    Codec(#[from] FggReadError),
    #[error("property encoding failed: {0}")]
    Property(String),
}

/// A single `Point` vertex feature: a coordinate plus a property map.
#[derive(Debug, Clone, PartialEq)]
pub struct MinimalFeature {
    pub geometry: Point<f64>,
    pub properties: PropertyInputMap,
}

impl MinimalFeature {
    #[must_use]
    pub fn point(x: f64, y: f64, properties: Vec<(&str, crate::property::PropertyInputValue)>) -> Self {
        let mut map = PropertyInputMap::new();
        for (key, value) in properties {
            map.insert(key.to_string(), value);
        }
        Self {
            geometry: Point::new(x, y),
            properties: map,
        }
    }
}

/// A decoded `Point` vertex feature.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedMinimalFeature {
    pub geometry: Point<f64>,
    pub properties: PropertyMap,
}

/// Reference `FeatureCodec` for `Point`-only feature collections.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinimalFeatureCodec;

impl FeatureCodec for MinimalFeatureCodec {
    type Collection = Vec<MinimalFeature>;
    type Error = MinimalFeatureError;

    fn decode_feature_header(&self, header_bytes: &[u8]) -> Result<FeaturesHeaderMeta, Self::Error> {
        let mut cur = Cursor::new(header_bytes);
        let features_count = u64::from(cur.read_u32()?);
        let column_count = cur.read_u16()?;
        let columns = if column_count == 0 {
            None
        } else {
            Some(read_columns(&mut cur, column_count)?)
        };
        let index_node_size = cur.read_u16()?;
        Ok(FeaturesHeaderMeta {
            features_count,
            columns,
            index_node_size,
        })
    }

    fn packed_tree_size(&self, features_count: u64, node_size: u16) -> u64 {
        // Not a real Hilbert R-tree size formula - a placeholder big enough
        // to exercise the "skip the index" branch of the offset locator in
        // tests.
        features_count * u64::from(node_size)
    }

    fn iterate_features(
        &self,
        bytes: &[u8],
        start: usize,
        count: u64,
    ) -> Result<Self::Collection, Self::Error> {
        let columns = header_columns_for(bytes)?;
        let mut cur = Cursor::new(&bytes[start..]);
        let mut out = Vec::with_capacity(count as usize);
        for _ in 0..count {
            out.push(read_feature(&mut cur, &columns)?);
        }
        Ok(out.into_iter().map(decoded_to_input).collect())
    }

    fn encode_features(&self, collection: &Self::Collection) -> Result<Vec<u8>, Self::Error> {
        let columns = infer_schema(collection.iter().map(|f| &f.properties)).unwrap_or_default();

        let mut feature_bytes = Vec::new();
        for feature in collection {
            let properties = encode_properties(&columns, &feature.properties, 0)
                .map_err(|e| MinimalFeatureError::Property(e.to_string()))?;
            let body_len = 16 + properties.len();
            feature_bytes.extend_from_slice(&(body_len as u32).to_le_bytes());
            feature_bytes.extend_from_slice(&feature.geometry.x().to_le_bytes());
            feature_bytes.extend_from_slice(&feature.geometry.y().to_le_bytes());
            feature_bytes.extend_from_slice(&properties);
        }

        let mut header = Vec::new();
        header.extend_from_slice(&(collection.len() as u32).to_le_bytes());
        header.extend_from_slice(&(columns.len() as u16).to_le_bytes());
        write_columns(&mut header, &columns);
        header.extend_from_slice(&0u16.to_le_bytes()); // index_node_size: no index

        let mut out = Vec::with_capacity(4 + header.len() + feature_bytes.len());
        out.extend_from_slice(&(header.len() as u32).to_le_bytes());
        out.extend_from_slice(&header);
        out.extend_from_slice(&feature_bytes);
        Ok(out)
    }
}

/// Re-parses just enough of the feature section header to recover the
/// column schema, for use by `iterate_features` (which only receives a
/// `start` offset past the header, not the header itself).
fn header_columns_for(bytes: &[u8]) -> Result<Vec<Column>, MinimalFeatureError> {
    let mut cur = Cursor::new(bytes);
    let _header_len = cur.read_u32()?;
    let _features_count = cur.read_u32()?;
    let column_count = cur.read_u16()?;
    if column_count == 0 {
        Ok(Vec::new())
    } else {
        Ok(read_columns(&mut cur, column_count)?)
    }
}

fn read_feature(
    cur: &mut Cursor<'_>,
    columns: &[Column],
) -> Result<DecodedMinimalFeature, MinimalFeatureError> {
    let body_len = cur.read_u32()? as usize;
    let x = cur.read_f64()?;
    let y = cur.read_f64()?;
    let properties_len = body_len - 16;
    let properties_bytes = cur.read_slice(properties_len)?;
    let mut pcur = Cursor::new(properties_bytes);
    let properties = decode_properties(columns, &mut pcur)?;
    Ok(DecodedMinimalFeature {
        geometry: Point::new(x, y),
        properties,
    })
}

fn decoded_to_input(feature: DecodedMinimalFeature) -> MinimalFeature {
    use crate::property::{PropertyInputValue, PropertyValue};

    let properties = feature
        .properties
        .into_iter()
        .map(|(k, v)| {
            let input = match v {
                PropertyValue::Bool(b) => PropertyInputValue::Bool(b),
                PropertyValue::String(s) | PropertyValue::DateTime(s) => PropertyInputValue::String(s),
                PropertyValue::Json(j) => PropertyInputValue::Json(j),
                PropertyValue::Binary(b) => PropertyInputValue::Binary(b),
                PropertyValue::Byte(n) => PropertyInputValue::Number(f64::from(n)),
                PropertyValue::UByte(n) => PropertyInputValue::Number(f64::from(n)),
                PropertyValue::Short(n) => PropertyInputValue::Number(f64::from(n)),
                PropertyValue::UShort(n) => PropertyInputValue::Number(f64::from(n)),
                PropertyValue::Int(n) => PropertyInputValue::Number(f64::from(n)),
                PropertyValue::UInt(n) => PropertyInputValue::Number(f64::from(n)),
                // This demo codec's `PropertyInputValue::Number` is an f64 (§3's
                // schema inference infers `Double` for all numbers); round-tripping
                // a `Long`/`ULong` through it is inherently lossy above 2^53. A real
                // `FeatureCodec` that needs exact 64-bit round-trips should keep its
                // own wider intermediate representation instead (§4.4).
                #[allow(clippy::cast_precision_loss)]
                PropertyValue::Long(n) => PropertyInputValue::Number(n as f64),
                #[allow(clippy::cast_precision_loss)]
                PropertyValue::ULong(n) => PropertyInputValue::Number(n as f64),
                PropertyValue::Float(n) => PropertyInputValue::Number(f64::from(n)),
                PropertyValue::Double(n) => PropertyInputValue::Number(n),
            };
            (k, input)
        })
        .collect();
    MinimalFeature {
        geometry: feature.geometry,
        properties,
    }
}
