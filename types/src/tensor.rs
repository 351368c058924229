use crate::datatype::DataType;
use crate::errors::TypeError;
use ndarray::{ArrayD, IxDyn};
use serde::{Deserialize, Serialize};

/// Payload of a tensor.
///
/// Raw bytes travel as a `BLOB` clause and are accepted for any [`DataType`], every other variant
/// travels as a flat `VALUES` list and must agree with the tensor's declared data type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TensorData {
    Blob(Vec<u8>),
    Float(Vec<f32>),
    Double(Vec<f64>),
    Int8(Vec<i8>),
    Int16(Vec<i16>),
    Int32(Vec<i32>),
    Int64(Vec<i64>),
    Uint8(Vec<u8>),
    Uint16(Vec<u16>),
}

impl TensorData {
    /// Data type implied by the element type, None for raw blobs
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Self::Blob(_) => None,
            Self::Float(_) => Some(DataType::Float),
            Self::Double(_) => Some(DataType::Double),
            Self::Int8(_) => Some(DataType::Int8),
            Self::Int16(_) => Some(DataType::Int16),
            Self::Int32(_) => Some(DataType::Int32),
            Self::Int64(_) => Some(DataType::Int64),
            Self::Uint8(_) => Some(DataType::Uint8),
            Self::Uint16(_) => Some(DataType::Uint16),
        }
    }

    /// Number of elements, or number of bytes for a blob
    pub fn len(&self) -> usize {
        match self {
            Self::Blob(v) | Self::Uint8(v) => v.len(),
            Self::Float(v) => v.len(),
            Self::Double(v) => v.len(),
            Self::Int8(v) => v.len(),
            Self::Int16(v) => v.len(),
            Self::Int32(v) => v.len(),
            Self::Int64(v) => v.len(),
            Self::Uint16(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_blob(&self) -> bool {
        matches!(self, Self::Blob(_))
    }

    /// Little endian byte image of the payload, the layout the server expects for `BLOB`
    pub fn to_le_bytes(&self) -> Vec<u8> {
        match self {
            Self::Blob(v) | Self::Uint8(v) => v.clone(),
            Self::Float(v) => v.iter().flat_map(|x| x.to_le_bytes()).collect(),
            Self::Double(v) => v.iter().flat_map(|x| x.to_le_bytes()).collect(),
            Self::Int8(v) => v.iter().flat_map(|x| x.to_le_bytes()).collect(),
            Self::Int16(v) => v.iter().flat_map(|x| x.to_le_bytes()).collect(),
            Self::Int32(v) => v.iter().flat_map(|x| x.to_le_bytes()).collect(),
            Self::Int64(v) => v.iter().flat_map(|x| x.to_le_bytes()).collect(),
            Self::Uint16(v) => v.iter().flat_map(|x| x.to_le_bytes()).collect(),
        }
    }
}

/// Byte vectors are raw blobs. Use [`TensorData::Uint8`] to send UINT8 values instead
impl From<Vec<u8>> for TensorData {
    fn from(value: Vec<u8>) -> Self {
        Self::Blob(value)
    }
}

impl From<&[u8]> for TensorData {
    fn from(value: &[u8]) -> Self {
        Self::Blob(value.to_vec())
    }
}

macro_rules! tensor_data_from_values {
    ($($element:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<Vec<$element>> for TensorData {
                fn from(value: Vec<$element>) -> Self {
                    Self::$variant(value)
                }
            }

            impl From<&[$element]> for TensorData {
                fn from(value: &[$element]) -> Self {
                    Self::$variant(value.to_vec())
                }
            }
        )*
    };
}

tensor_data_from_values!(
    f32 => Float,
    f64 => Double,
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    u16 => Uint16,
);

impl TryFrom<Vec<u32>> for TensorData {
    type Error = TypeError;

    fn try_from(_: Vec<u32>) -> Result<Self, Self::Error> {
        Err(TypeError::UnsupportedElementType("u32"))
    }
}

impl TryFrom<Vec<u64>> for TensorData {
    type Error = TypeError;

    fn try_from(_: Vec<u64>) -> Result<Self, Self::Error> {
        Err(TypeError::UnsupportedElementType("u64"))
    }
}

macro_rules! tensor_data_from_platform_ints {
    ($($element:ty),* $(,)?) => {
        $(
            /// Platform sized integers are sent as INT64
            impl TryFrom<Vec<$element>> for TensorData {
                type Error = TypeError;

                fn try_from(value: Vec<$element>) -> Result<Self, Self::Error> {
                    value
                        .into_iter()
                        .map(|v| {
                            i64::try_from(v).map_err(|_| TypeError::ElementOutOfRange {
                                element: stringify!($element),
                                value: v.to_string(),
                                target: DataType::Int64,
                            })
                        })
                        .collect::<Result<Vec<_>, _>>()
                        .map(Self::Int64)
                }
            }
        )*
    };
}

tensor_data_from_platform_ints!(isize, usize);

/// Product of the dimensions, `None` on overflow
pub fn element_count(shape: &[usize]) -> Option<usize> {
    shape.iter().try_fold(1usize, |acc, dim| acc.checked_mul(*dim))
}

mod private {
    pub trait Sealed {}
}

/// Rust element types that have a tensor data type counterpart
pub trait TensorElement: Copy + private::Sealed {
    const DATA_TYPE: DataType;

    fn wrap(values: Vec<Self>) -> TensorData;

    fn view(data: &TensorData) -> Option<&[Self]>;
}

macro_rules! tensor_element {
    ($($element:ty => $variant:ident),* $(,)?) => {
        $(
            impl private::Sealed for $element {}

            impl TensorElement for $element {
                const DATA_TYPE: DataType = DataType::$variant;

                fn wrap(values: Vec<Self>) -> TensorData {
                    TensorData::$variant(values)
                }

                fn view(data: &TensorData) -> Option<&[Self]> {
                    match data {
                        TensorData::$variant(values) => Some(values),
                        _ => None,
                    }
                }
            }
        )*
    };
}

tensor_element!(
    f32 => Float,
    f64 => Double,
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    u8 => Uint8,
    u16 => Uint16,
);

/// An n-dimensional typed array as stored under a key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tensor {
    pub dtype: DataType,
    pub shape: Vec<usize>,
    /// None for metadata only tensors
    pub data: Option<TensorData>,
}

impl Tensor {
    pub fn new(dtype: DataType, shape: Vec<usize>) -> Self {
        Self {
            dtype,
            shape,
            data: None,
        }
    }

    pub fn with_data(dtype: DataType, shape: Vec<usize>, data: impl Into<TensorData>) -> Self {
        Self {
            dtype,
            shape,
            data: Some(data.into()),
        }
    }

    /// Number of elements implied by the shape. A shapeless tensor is a scalar.
    /// `None` when the product overflows `usize`
    pub fn element_count(&self) -> Option<usize> {
        element_count(&self.shape)
    }

    pub fn num_dims(&self) -> usize {
        self.shape.len()
    }

    pub fn from_array<T: TensorElement>(array: &ArrayD<T>) -> Self {
        Self {
            dtype: T::DATA_TYPE,
            shape: array.shape().to_vec(),
            data: Some(T::wrap(array.iter().copied().collect())),
        }
    }

    pub fn to_array<T: TensorElement>(&self) -> Result<ArrayD<T>, TypeError> {
        let values = self
            .data
            .as_ref()
            .and_then(T::view)
            .ok_or(TypeError::ElementTypeMismatch {
                expected: T::DATA_TYPE,
            })?;
        ArrayD::from_shape_vec(IxDyn(&self.shape), values.to_vec())
            .map_err(|err| TypeError::ShapeError(err.to_string()))
    }
}
