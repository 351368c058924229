use crate::errors::TypeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use strum::{EnumIter, EnumString};

/// Element type of a tensor, named the way AI.TENSORSET and AI.TENSORGET spell it
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, EnumIter,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(ascii_case_insensitive)]
pub enum DataType {
    #[strum(serialize = "FLOAT", serialize = "FLOAT32")]
    Float,
    #[strum(serialize = "DOUBLE", serialize = "FLOAT64")]
    Double,
    #[strum(serialize = "INT8")]
    Int8,
    #[strum(serialize = "INT16")]
    Int16,
    #[strum(serialize = "INT32")]
    Int32,
    #[strum(serialize = "INT64")]
    Int64,
    #[strum(serialize = "UINT8")]
    Uint8,
    #[strum(serialize = "UINT16")]
    Uint16,
}

impl DataType {
    /// Alias of [`DataType::Float`]
    pub const FLOAT32: DataType = DataType::Float;
    /// Alias of [`DataType::Double`]
    pub const FLOAT64: DataType = DataType::Double;

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Float => "FLOAT",
            Self::Double => "DOUBLE",
            Self::Int8 => "INT8",
            Self::Int16 => "INT16",
            Self::Int32 => "INT32",
            Self::Int64 => "INT64",
            Self::Uint8 => "UINT8",
            Self::Uint16 => "UINT16",
        }
    }

    /// width of a single element when the tensor travels as a BLOB
    pub fn size_in_bytes(&self) -> usize {
        match self {
            Self::Int8 | Self::Uint8 => 1,
            Self::Int16 | Self::Uint16 => 2,
            Self::Float | Self::Int32 => 4,
            Self::Double | Self::Int64 => 8,
        }
    }

    /// Parse a data type as returned by the server
    pub fn from_wire(input: &str) -> Result<Self, TypeError> {
        Self::from_str(input).map_err(|_| TypeError::UnknownDataType(input.to_string()))
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which content AI.TENSORGET should return alongside the tensor metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, EnumIter)]
#[serde(rename_all = "UPPERCASE")]
#[strum(ascii_case_insensitive)]
pub enum TensorContentType {
    #[strum(serialize = "META")]
    Meta,
    #[strum(serialize = "BLOB")]
    Blob,
    #[strum(serialize = "VALUES")]
    Values,
}

impl TensorContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Meta => "META",
            Self::Blob => "BLOB",
            Self::Values => "VALUES",
        }
    }

    pub fn from_wire(input: &str) -> Result<Self, TypeError> {
        Self::from_str(input).map_err(|_| TypeError::UnknownContentType(input.to_string()))
    }
}

impl fmt::Display for TensorContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use strum::IntoEnumIterator;

    #[test]
    fn test_data_type_wire_names_round_trip() {
        for dtype in DataType::iter() {
            assert_eq!(DataType::from_wire(dtype.as_str()), Ok(dtype));
        }
    }

    #[test]
    fn test_float_aliases() {
        assert_eq!(DataType::FLOAT32, DataType::Float);
        assert_eq!(DataType::FLOAT64, DataType::Double);
        assert_eq!(DataType::from_wire("FLOAT32"), Ok(DataType::Float));
        assert_eq!(DataType::from_wire("float64"), Ok(DataType::Double));
        assert_eq!(DataType::Float.to_string(), "FLOAT");
    }

    #[test]
    fn test_unknown_data_type() {
        assert_eq!(
            DataType::from_wire("UINT32"),
            Err(TypeError::UnknownDataType("UINT32".to_string()))
        );
    }

    #[test]
    fn test_element_widths() {
        assert_eq!(DataType::Uint8.size_in_bytes(), 1);
        assert_eq!(DataType::Int16.size_in_bytes(), 2);
        assert_eq!(DataType::Float.size_in_bytes(), 4);
        assert_eq!(DataType::Int64.size_in_bytes(), 8);
    }

    #[test]
    fn test_content_type_parse() {
        assert_eq!(
            TensorContentType::from_wire("values"),
            Ok(TensorContentType::Values)
        );
        assert!(TensorContentType::from_wire("json").is_err());
    }
}
