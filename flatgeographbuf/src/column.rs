//! Column schema codec: the per-column name/type descriptors carried in the
//! graph header.

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::error::FggReadError;
use crate::primitive::{write_short_length_prefixed_str, Cursor};

/// The type tag for a single column, per the format's fixed byte assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum ColumnType {
    Byte = 0,
    UByte = 1,
    Bool = 2,
    Short = 3,
    UShort = 4,
    Int = 5,
    UInt = 6,
    Long = 7,
    ULong = 8,
    Float = 9,
    Double = 10,
    String = 11,
    Json = 12,
    DateTime = 13,
    Binary = 14,
}

impl ColumnType {
    /// Is this type's on-disk width fixed (vs. length-prefixed)?
    #[must_use]
    pub const fn is_fixed_width(self) -> bool {
        !matches!(
            self,
            Self::String | Self::Json | Self::DateTime | Self::Binary
        )
    }
}

/// A named, typed column in a graph header's column list.
///
/// A column's position in the header's column list is its ordinal; edges
/// reference columns by this ordinal, not by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Column {
    pub name: String,
    pub column_type: ColumnType,
}

impl Column {
    #[must_use]
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }

    /// Encodes this column as `[name-length u16][name bytes][type u8]`.
    pub(crate) fn write(&self, out: &mut Vec<u8>) {
        write_short_length_prefixed_str(out, &self.name);
        out.push(self.column_type.into());
    }

    /// Decodes a column, failing with `InvalidColumnType` if the type byte
    /// is outside `{0..14}`.
    pub(crate) fn read(cur: &mut Cursor<'_>) -> Result<Self, FggReadError> {
        let name = cur.read_short_length_prefixed_string()?;
        let type_byte = cur.read_u8()?;
        let column_type =
            ColumnType::try_from(type_byte).map_err(|_| FggReadError::InvalidColumnType(type_byte))?;
        Ok(Self { name, column_type })
    }
}

/// Encodes an ordered column list (without the leading count; that's the
/// graph header's job).
pub(crate) fn write_columns(out: &mut Vec<u8>, columns: &[Column]) {
    for column in columns {
        column.write(out);
    }
}

/// Decodes `count` columns in order. Duplicate names are not rejected - the
/// codec tolerates them, per the format's documented open question; callers
/// that need uniqueness must enforce it themselves.
pub(crate) fn read_columns(cur: &mut Cursor<'_>, count: u16) -> Result<Vec<Column>, FggReadError> {
    let mut columns = Vec::with_capacity(count as usize);
    for _ in 0..count {
        columns.push(Column::read(cur)?);
    }
    Ok(columns)
}
