//! Converters from server replies into typed values.
//!
//! Numbers come back either as integer replies or as bulk text. Floats are parsed at double
//! precision and then narrowed, integers are narrowed with a range check so a value that does
//! not fit is reported instead of silently wrapped.
use redisai_types::datatype::DataType;
use redisai_types::reply::Reply;
use redisai_types::tensor::TensorData;

use crate::error::RedisAiError;

/// Scalar that can be read out of a single reply element
pub trait FromReplyValue: Sized {
    const TARGET: &'static str;

    fn from_reply_value(step: &'static str, reply: &Reply) -> Result<Self, RedisAiError>;
}

fn reply_text<'a>(step: &'static str, reply: &'a Reply) -> Result<&'a str, RedisAiError> {
    match reply {
        Reply::Nil => Err(RedisAiError::NilReply(step)),
        Reply::Error(message) => Err(RedisAiError::Server(message.clone())),
        other => other
            .as_text()
            .map(str::trim)
            .ok_or(RedisAiError::UnexpectedReplyType {
                step,
                expected: "bulk string",
                actual: other.kind(),
            }),
    }
}

fn parse_f64(step: &'static str, reply: &Reply) -> Result<f64, RedisAiError> {
    if let Reply::Int(value) = reply {
        return Ok(*value as f64);
    }
    let text = reply_text(step, reply)?;
    text.parse::<f64>().map_err(|_| RedisAiError::ParseValue {
        step,
        value: text.to_string(),
    })
}

fn parse_i64(step: &'static str, reply: &Reply) -> Result<i64, RedisAiError> {
    if let Reply::Int(value) = reply {
        return Ok(*value);
    }
    let text = reply_text(step, reply)?;
    text.parse::<i64>().map_err(|_| RedisAiError::ParseValue {
        step,
        value: text.to_string(),
    })
}

impl FromReplyValue for f64 {
    const TARGET: &'static str = "f64";

    fn from_reply_value(step: &'static str, reply: &Reply) -> Result<Self, RedisAiError> {
        parse_f64(step, reply)
    }
}

impl FromReplyValue for f32 {
    const TARGET: &'static str = "f32";

    fn from_reply_value(step: &'static str, reply: &Reply) -> Result<Self, RedisAiError> {
        Ok(parse_f64(step, reply)? as f32)
    }
}

impl FromReplyValue for i64 {
    const TARGET: &'static str = "i64";

    fn from_reply_value(step: &'static str, reply: &Reply) -> Result<Self, RedisAiError> {
        parse_i64(step, reply)
    }
}

macro_rules! narrowed_integer {
    ($($t:ty),*) => {
        $(
            impl FromReplyValue for $t {
                const TARGET: &'static str = stringify!($t);

                fn from_reply_value(step: &'static str, reply: &Reply) -> Result<Self, RedisAiError> {
                    let value = parse_i64(step, reply)?;
                    <$t>::try_from(value).map_err(|_| RedisAiError::OutOfRange {
                        step,
                        value,
                        target: Self::TARGET,
                    })
                }
            }
        )*
    };
}

narrowed_integer!(i8, i16, i32, u8, u16, u64, usize);

impl FromReplyValue for String {
    const TARGET: &'static str = "string";

    fn from_reply_value(step: &'static str, reply: &Reply) -> Result<Self, RedisAiError> {
        match reply {
            Reply::Int(value) => Ok(value.to_string()),
            other => reply_text(step, other).map(ToString::to_string),
        }
    }
}

fn expect_array(step: &'static str, reply: Reply) -> Result<Vec<Reply>, RedisAiError> {
    match reply {
        Reply::Array(items) => Ok(items),
        Reply::Nil => Err(RedisAiError::NilReply(step)),
        Reply::Error(message) => Err(RedisAiError::Server(message)),
        other => Err(RedisAiError::UnexpectedReplyType {
            step,
            expected: "array",
            actual: other.kind(),
        }),
    }
}

/// Convert an array reply element by element, stopping at the first bad element
pub fn values<T: FromReplyValue>(step: &'static str, reply: Reply) -> Result<Vec<T>, RedisAiError> {
    expect_array(step, reply)?
        .iter()
        .map(|item| T::from_reply_value(step, item))
        .collect()
}

/// Array of names, as in the inputs and outputs of a model
pub fn strings(step: &'static str, reply: Reply) -> Result<Vec<String>, RedisAiError> {
    values(step, reply)
}

/// Decode the `values` entry of an AI.TENSORGET reply according to the tensor's data type
pub fn values_from_reply(dtype: DataType, reply: Reply) -> Result<TensorData, RedisAiError> {
    const STEP: &str = "tensor values";
    Ok(match dtype {
        DataType::Float => TensorData::Float(values(STEP, reply)?),
        DataType::Double => TensorData::Double(values(STEP, reply)?),
        DataType::Int8 => TensorData::Int8(values(STEP, reply)?),
        DataType::Int16 => TensorData::Int16(values(STEP, reply)?),
        DataType::Int32 => TensorData::Int32(values(STEP, reply)?),
        DataType::Int64 => TensorData::Int64(values(STEP, reply)?),
        DataType::Uint8 => TensorData::Uint8(values(STEP, reply)?),
        DataType::Uint16 => TensorData::Uint16(values(STEP, reply)?),
    })
}

macro_rules! decode_le {
    ($bytes:expr, $t:ty) => {{
        const WIDTH: usize = std::mem::size_of::<$t>();
        $bytes
            .chunks_exact(WIDTH)
            .map(|chunk| {
                let mut raw = [0u8; WIDTH];
                raw.copy_from_slice(chunk);
                <$t>::from_le_bytes(raw)
            })
            .collect()
    }};
}

/// Reinterpret a little endian blob as typed elements
pub fn decode_blob(dtype: DataType, bytes: &[u8]) -> Result<TensorData, RedisAiError> {
    let width = dtype.size_in_bytes();
    if bytes.len() % width != 0 {
        return Err(RedisAiError::ReplySize {
            step: "decode blob",
            expected: bytes.len() - bytes.len() % width,
            actual: bytes.len(),
        });
    }
    Ok(match dtype {
        DataType::Float => TensorData::Float(decode_le!(bytes, f32)),
        DataType::Double => TensorData::Double(decode_le!(bytes, f64)),
        DataType::Int8 => TensorData::Int8(decode_le!(bytes, i8)),
        DataType::Int16 => TensorData::Int16(decode_le!(bytes, i16)),
        DataType::Int32 => TensorData::Int32(decode_le!(bytes, i32)),
        DataType::Int64 => TensorData::Int64(decode_le!(bytes, i64)),
        DataType::Uint8 => TensorData::Uint8(bytes.to_vec()),
        DataType::Uint16 => TensorData::Uint16(decode_le!(bytes, u16)),
    })
}

fn parse_all<T, S>(dtype: DataType, items: &[S]) -> Result<Vec<T>, RedisAiError>
where
    T: std::str::FromStr,
    S: AsRef<str>,
{
    items
        .iter()
        .map(|item| {
            let item = item.as_ref().trim();
            item.parse::<T>().map_err(|_| RedisAiError::ParseValue {
                step: dtype.as_str(),
                value: item.to_string(),
            })
        })
        .collect()
}

/// Parse textual values, as typed on a command line, into a payload of the given data type
pub fn values_from_strs<S: AsRef<str>>(
    dtype: DataType,
    items: &[S],
) -> Result<TensorData, RedisAiError> {
    Ok(match dtype {
        DataType::Float => TensorData::Float(parse_all(dtype, items)?),
        DataType::Double => TensorData::Double(parse_all(dtype, items)?),
        DataType::Int8 => TensorData::Int8(parse_all(dtype, items)?),
        DataType::Int16 => TensorData::Int16(parse_all(dtype, items)?),
        DataType::Int32 => TensorData::Int32(parse_all(dtype, items)?),
        DataType::Int64 => TensorData::Int64(parse_all(dtype, items)?),
        DataType::Uint8 => TensorData::Uint8(parse_all(dtype, items)?),
        DataType::Uint16 => TensorData::Uint16(parse_all(dtype, items)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use strum::IntoEnumIterator;

    fn bulk_array(items: &[&str]) -> Reply {
        Reply::Array(items.iter().map(Reply::bulk).collect())
    }

    #[test]
    fn test_floats_from_bulk_text() {
        let decoded = values_from_reply(DataType::Float, bulk_array(&["1.1", "2.2", "3"])).unwrap();
        assert_eq!(decoded, TensorData::Float(vec![1.1, 2.2, 3.0]));
        let decoded = values_from_reply(DataType::Double, bulk_array(&["1.1"])).unwrap();
        assert_eq!(decoded, TensorData::Double(vec![1.1]));
    }

    #[test]
    fn test_integers_from_int_replies() {
        let reply = Reply::Array(vec![Reply::Int(-2), Reply::Int(7)]);
        assert_eq!(
            values_from_reply(DataType::Int16, reply.clone()).unwrap(),
            TensorData::Int16(vec![-2, 7])
        );
        assert_eq!(
            values_from_reply(DataType::Int64, reply).unwrap(),
            TensorData::Int64(vec![-2, 7])
        );
    }

    #[test]
    fn test_narrowing_is_checked() {
        let reply = Reply::Array(vec![Reply::Int(1), Reply::Int(300)]);
        let err = values_from_reply(DataType::Uint8, reply).unwrap_err();
        assert!(matches!(
            err,
            RedisAiError::OutOfRange {
                value: 300,
                target: "u8",
                ..
            }
        ));
        let reply = Reply::Array(vec![Reply::Int(-1)]);
        assert!(values_from_reply(DataType::Uint16, reply).is_err());
    }

    #[test]
    fn test_decoding_fails_fast() {
        assert!(matches!(
            values_from_reply(DataType::Float, Reply::Nil),
            Err(RedisAiError::NilReply(_))
        ));
        assert!(matches!(
            values_from_reply(DataType::Float, Reply::Int(3)),
            Err(RedisAiError::UnexpectedReplyType { .. })
        ));
        assert!(matches!(
            values_from_reply(DataType::Int32, bulk_array(&["1", "x"])),
            Err(RedisAiError::ParseValue { .. })
        ));
    }

    #[test]
    fn test_decode_blob_every_data_type() {
        let floats = TensorData::Float(vec![1.0, -2.5]);
        assert_eq!(
            decode_blob(DataType::Float, &floats.to_le_bytes()).unwrap(),
            floats
        );
        assert_eq!(
            decode_blob(DataType::Int16, &[1, 0, 255, 255]).unwrap(),
            TensorData::Int16(vec![1, -1])
        );
        for dtype in DataType::iter() {
            let bytes = vec![0u8; dtype.size_in_bytes() * 3];
            let decoded = decode_blob(dtype, &bytes).unwrap();
            assert_eq!(decoded.len(), 3, "{dtype}");
            assert_eq!(decoded.data_type(), Some(dtype));
        }
        assert!(decode_blob(DataType::Int32, &[0, 0, 0]).is_err());
    }

    #[test]
    fn test_values_from_strs() {
        assert_eq!(
            values_from_strs(DataType::Int8, &["1", " -3"]).unwrap(),
            TensorData::Int8(vec![1, -3])
        );
        assert!(values_from_strs(DataType::Uint8, &["256"]).is_err());
    }
}
