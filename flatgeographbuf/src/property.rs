//! Property codec: encodes/decodes a sparse, schema-driven map of edge
//! property values.
//!
//! The wire shape is `([column-ordinal u16][value])*`, where `value`'s byte
//! layout depends on the column's declared type (§4.4). Decoding stops - not
//! errors - the moment it sees an ordinal at or past the column count; that
//! is this format's only forward-compatibility mechanism (§7).

use indexmap::IndexMap;

use crate::column::{Column, ColumnType};
use crate::error::{FggReadError, FggWriteError};
use crate::primitive::{write_length_prefixed_bytes, write_length_prefixed_str, Cursor};

/// A property value as supplied by the caller before write-time schema
/// inference/encoding.
///
/// This intentionally mirrors the handful of kinds the format's schema
/// inference (§3) dispatches on: booleans, numbers, strings, raw byte
/// arrays, arbitrary JSON, and an explicit null.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyInputValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Binary(Vec<u8>),
    Json(serde_json::Value),
}

impl PropertyInputValue {
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// The column type this value would infer to, per §3's schema inference
    /// rule: booleans infer `Bool`, numbers infer `Double`, strings infer
    /// `String`, byte arrays infer `Binary`, any other JSON value infers
    /// `Json`, and an explicit null infers `String`.
    #[must_use]
    pub fn inferred_column_type(&self) -> ColumnType {
        match self {
            Self::Null | Self::String(_) => ColumnType::String,
            Self::Bool(_) => ColumnType::Bool,
            Self::Number(_) => ColumnType::Double,
            Self::Binary(_) => ColumnType::Binary,
            Self::Json(_) => ColumnType::Json,
        }
    }
}

/// An ordered property map as supplied on the write side.
///
/// Ordered because schema inference (§3, §9) freezes the column list from
/// the *iteration order* of the first edge carrying properties; an
/// unordered map cannot honor that.
pub type PropertyInputMap = IndexMap<String, PropertyInputValue>;

/// A decoded property value, tagged by the column's declared type.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PropertyValue {
    Byte(i8),
    UByte(u8),
    Bool(bool),
    Short(i16),
    UShort(u16),
    Int(i32),
    UInt(u32),
    Long(i64),
    ULong(u64),
    Float(f32),
    Double(f64),
    String(String),
    Json(serde_json::Value),
    DateTime(String),
    Binary(Vec<u8>),
}

/// A decoded edge's property map, keyed by column name.
pub type PropertyMap = IndexMap<String, PropertyValue>;

/// Encodes `values` against `columns` in declared column order.
///
/// Missing or null-valued entries are skipped entirely (the column is
/// simply absent from this edge's record); keys not present in `columns`
/// are silently dropped, matching the frozen-schema behavior described in
/// §3.
pub(crate) fn encode_properties(
    columns: &[Column],
    values: &PropertyInputMap,
    edge_index: usize,
) -> Result<Vec<u8>, FggWriteError> {
    let mut out = Vec::new();
    for (ordinal, column) in columns.iter().enumerate() {
        let Some(value) = values.get(&column.name) else {
            continue;
        };
        if value.is_null() {
            continue;
        }
        out.extend_from_slice(&(ordinal as u16).to_le_bytes());
        write_value(&mut out, column.column_type, value).ok_or_else(|| {
            FggWriteError::UnknownPropertyType {
                edge_index,
                key: column.name.clone(),
            }
        })?;
    }
    Ok(out)
}

/// Writes `value` in `column_type`'s declared binary form, or `None` if the
/// value's runtime kind can't be represented as that column type.
///
/// Narrowing a caller-supplied `f64` down to the column's declared numeric
/// width is the point of this match, not an oversight - the lossy casts are
/// isolated here rather than disabled crate-wide.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn write_value(out: &mut Vec<u8>, column_type: ColumnType, value: &PropertyInputValue) -> Option<()> {
    use PropertyInputValue::{Binary, Bool, Json, Null, Number, String as Str};

    match (column_type, value) {
        (ColumnType::Bool, Bool(b)) => out.push(u8::from(*b)),
        (ColumnType::Bool, Number(n)) => out.push(u8::from(*n != 0.0)),
        (ColumnType::Byte, Number(n)) => out.push((*n as i8).to_le_bytes()[0]),
        (ColumnType::UByte, Number(n)) => out.push(*n as u8),
        (ColumnType::Short, Number(n)) => out.extend_from_slice(&(*n as i16).to_le_bytes()),
        (ColumnType::UShort, Number(n)) => out.extend_from_slice(&(*n as u16).to_le_bytes()),
        (ColumnType::Int, Number(n)) => out.extend_from_slice(&(*n as i32).to_le_bytes()),
        (ColumnType::UInt, Number(n)) => out.extend_from_slice(&(*n as u32).to_le_bytes()),
        (ColumnType::Long, Number(n)) => out.extend_from_slice(&(*n as i64).to_le_bytes()),
        (ColumnType::ULong, Number(n)) => out.extend_from_slice(&(*n as u64).to_le_bytes()),
        (ColumnType::Float, Number(n)) => out.extend_from_slice(&(*n as f32).to_le_bytes()),
        (ColumnType::Double, Number(n)) => out.extend_from_slice(&n.to_le_bytes()),
        (ColumnType::String | ColumnType::DateTime, Str(s)) => write_length_prefixed_str(out, s),
        (ColumnType::Binary, Binary(bytes)) => write_length_prefixed_bytes(out, bytes),
        (ColumnType::Json, Json(v)) => {
            // No pretty-printing: compact JSON text, per §4.4.
            let text = serde_json::to_string(v).ok()?;
            write_length_prefixed_str(out, &text);
        }
        (ColumnType::Json, Str(s)) => write_length_prefixed_str(out, &serde_json::Value::String(s.clone()).to_string()),
        (ColumnType::Json, Number(n)) => write_length_prefixed_str(out, &n.to_string()),
        (ColumnType::Json, Bool(b)) => write_length_prefixed_str(out, if *b { "true" } else { "false" }),
        (_, Null) => return None,
        _ => return None,
    }
    Some(())
}

/// Decodes the property region of an edge record against `columns`.
///
/// Consumes ordinal-tagged values until the cursor is exhausted or an
/// unknown ordinal (`>= columns.len()`) is seen, at which point decoding
/// stops without error (§4.4, §7). Property order within an edge need not
/// match column ordinal order.
pub(crate) fn decode_properties(
    columns: &[Column],
    cur: &mut Cursor<'_>,
) -> Result<PropertyMap, FggReadError> {
    let mut out = PropertyMap::new();
    while cur.remaining() >= 2 {
        let ordinal = cur.read_u16()? as usize;
        // Forward-compatibility stop (§7): an unknown ordinal ends property
        // parsing for this edge rather than failing.
        let Some(column) = columns.get(ordinal) else {
            break;
        };
        let value = read_value(column.column_type, cur)?;
        out.insert(column.name.clone(), value);
    }
    Ok(out)
}

fn read_value(column_type: ColumnType, cur: &mut Cursor<'_>) -> Result<PropertyValue, FggReadError> {
    Ok(match column_type {
        ColumnType::Byte => PropertyValue::Byte(cur.read_i8()?),
        ColumnType::UByte => PropertyValue::UByte(cur.read_u8()?),
        ColumnType::Bool => PropertyValue::Bool(cur.read_bool()?),
        ColumnType::Short => PropertyValue::Short(cur.read_i16()?),
        ColumnType::UShort => PropertyValue::UShort(cur.read_u16()?),
        ColumnType::Int => PropertyValue::Int(cur.read_i32()?),
        ColumnType::UInt => PropertyValue::UInt(cur.read_u32()?),
        ColumnType::Long => PropertyValue::Long(cur.read_i64()?),
        ColumnType::ULong => PropertyValue::ULong(cur.read_u64()?),
        ColumnType::Float => PropertyValue::Float(cur.read_f32()?),
        ColumnType::Double => PropertyValue::Double(cur.read_f64()?),
        ColumnType::String => PropertyValue::String(cur.read_length_prefixed_string()?),
        ColumnType::DateTime => PropertyValue::DateTime(cur.read_length_prefixed_string()?),
        ColumnType::Binary => PropertyValue::Binary(cur.read_length_prefixed_bytes()?),
        ColumnType::Json => {
            let text = cur.read_length_prefixed_string()?;
            let value: serde_json::Value =
                serde_json::from_str(&text).map_err(FggReadError::MalformedJson)?;
            PropertyValue::Json(value)
        }
    })
}

/// Infers a frozen column schema from the first edge (in iteration order)
/// whose property map is non-empty, per §3/§9. Returns `None` if no edge
/// carries any properties.
pub(crate) fn infer_schema<'a>(
    edges: impl IntoIterator<Item = &'a PropertyInputMap>,
) -> Option<Vec<Column>> {
    edges
        .into_iter()
        .find(|props| !props.is_empty())
        .map(|props| {
            props
                .iter()
                .map(|(key, value)| Column::new(key.clone(), value.inferred_column_type()))
                .collect()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_null_and_missing_properties() {
        let columns = vec![
            Column::new("weight", ColumnType::Double),
            Column::new("label", ColumnType::String),
        ];
        let mut values = PropertyInputMap::new();
        values.insert("weight".to_string(), PropertyInputValue::Number(1.5));
        values.insert("label".to_string(), PropertyInputValue::Null);
        values.insert("extra".to_string(), PropertyInputValue::Bool(true));

        let encoded = encode_properties(&columns, &values, 0).unwrap();
        let mut cur = Cursor::new(&encoded);
        let decoded = decode_properties(&columns, &mut cur).unwrap();

        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded.get("weight"), Some(&PropertyValue::Double(1.5)));
    }

    #[test]
    fn stops_at_unknown_ordinal_without_error() {
        let columns = vec![Column::new("a", ColumnType::Double)];
        let mut raw = Vec::new();
        // Ordinal 0 ("a") is valid.
        raw.extend_from_slice(&0u16.to_le_bytes());
        raw.extend_from_slice(&1.0f64.to_le_bytes());
        // Ordinal 5 is out of range; decoding must stop here, not error.
        raw.extend_from_slice(&5u16.to_le_bytes());
        raw.extend_from_slice(&[0xFF, 0xFF, 0xFF, 0xFF]);

        let mut cur = Cursor::new(&raw);
        let decoded = decode_properties(&columns, &mut cur).unwrap();
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded.get("a"), Some(&PropertyValue::Double(1.0)));
    }

    #[test]
    fn binary_and_datetime_columns_round_trip() {
        let columns = vec![
            Column::new("blob", ColumnType::Binary),
            Column::new("when", ColumnType::DateTime),
        ];
        let mut values = PropertyInputMap::new();
        values.insert(
            "blob".to_string(),
            PropertyInputValue::Binary(vec![0xDE, 0xAD, 0xBE, 0xEF]),
        );
        values.insert(
            "when".to_string(),
            PropertyInputValue::String("2026-07-28T00:00:00Z".to_string()),
        );

        let encoded = encode_properties(&columns, &values, 0).unwrap();
        let mut cur = Cursor::new(&encoded);
        let decoded = decode_properties(&columns, &mut cur).unwrap();

        assert_eq!(
            decoded.get("blob"),
            Some(&PropertyValue::Binary(vec![0xDE, 0xAD, 0xBE, 0xEF]))
        );
        assert_eq!(
            decoded.get("when"),
            Some(&PropertyValue::DateTime("2026-07-28T00:00:00Z".to_string()))
        );
    }

    #[test]
    fn malformed_json_payload_is_rejected() {
        let columns = vec![Column::new("data", ColumnType::Json)];
        let mut raw = Vec::new();
        raw.extend_from_slice(&0u16.to_le_bytes());
        write_length_prefixed_str(&mut raw, "{not valid json");

        let mut cur = Cursor::new(&raw);
        let err = decode_properties(&columns, &mut cur).unwrap_err();
        assert!(matches!(err, FggReadError::MalformedJson(_)));
    }

    #[test]
    fn infers_schema_from_first_propertied_edge() {
        let mut empty = PropertyInputMap::new();
        let mut with_props = PropertyInputMap::new();
        with_props.insert("w".to_string(), PropertyInputValue::Number(1.0));
        let edges = vec![&empty, &with_props];
        let schema = infer_schema(edges).unwrap();
        assert_eq!(schema, vec![Column::new("w", ColumnType::Double)]);
        empty.clear();
    }
}
