use crate::datatype::DataType;
use thiserror::Error;

#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum TypeError {
    #[error("Unknown data type {0}")]
    UnknownDataType(String),

    #[error("Unknown backend {0}")]
    UnknownBackend(String),

    #[error("Unknown device {0}")]
    UnknownDevice(String),

    #[error("Unknown tensor content type {0}, expected one of META, BLOB or VALUES")]
    UnknownContentType(String),

    #[error("AI.TENSORSET does not support elements of type {0}")]
    UnsupportedElementType(&'static str),

    #[error("{element} value {value} does not fit in {target}")]
    ElementOutOfRange {
        element: &'static str,
        value: String,
        target: DataType,
    },

    #[error("Tensor data does not hold {expected} elements")]
    ElementTypeMismatch { expected: DataType },

    #[error("Shape error {0}")]
    ShapeError(String),
}
