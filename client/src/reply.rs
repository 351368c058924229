//! Decoders for the reply shapes the server sends back.
//!
//! Tensor, model, script and info replies are all flat arrays of alternating keys and values.
//! Keys may arrive in any order and unknown keys are skipped. Decoding stops at the first field
//! that fails; fields are staged in locals and only assembled into a record once every pair has
//! been read.
use itertools::Itertools;
use redisai_types::datatype::{DataType, TensorContentType};
use redisai_types::device::{Backend, Device};
use redisai_types::model::Model;
use redisai_types::reply::Reply;
use redisai_types::script::Script;
use redisai_types::tensor::{Tensor, TensorData};
use std::collections::HashMap;

use crate::converters::{self, FromReplyValue};
use crate::error::RedisAiError;

fn into_array(step: &'static str, reply: Reply) -> Result<Vec<Reply>, RedisAiError> {
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

/// Split a flat key/value array into owned `(key, value)` pairs
fn into_pairs(step: &'static str, reply: Reply) -> Result<Vec<(String, Reply)>, RedisAiError> {
    let items = into_array(step, reply)?;
    if items.len() % 2 != 0 {
        return Err(RedisAiError::ReplySize {
            step,
            expected: items.len() + 1,
            actual: items.len(),
        });
    }
    items
        .into_iter()
        .tuples()
        .map(|(key, value)| match key.as_text() {
            Some(key) => Ok((key.to_string(), value)),
            None => Err(RedisAiError::UnexpectedReplyType {
                step,
                expected: "bulk string",
                actual: key.kind(),
            }),
        })
        .collect()
}

fn into_bytes(step: &'static str, reply: Reply) -> Result<Vec<u8>, RedisAiError> {
    match reply {
        Reply::Bulk(bytes) => Ok(bytes),
        Reply::Status(text) => Ok(text.into_bytes()),
        Reply::Nil => Err(RedisAiError::NilReply(step)),
        Reply::Error(message) => Err(RedisAiError::Server(message)),
        other => Err(RedisAiError::UnexpectedReplyType {
            step,
            expected: "bulk string",
            actual: other.kind(),
        }),
    }
}

fn into_text(step: &'static str, reply: Reply) -> Result<String, RedisAiError> {
    String::from_reply_value(step, &reply)
}

/// Expect the plain `OK` status returned by set, store, delete and run commands
pub fn parse_status(step: &'static str, reply: Reply) -> Result<(), RedisAiError> {
    match reply {
        Reply::Error(message) => Err(RedisAiError::Server(message)),
        other => match other.as_text() {
            Some("OK") => Ok(()),
            Some(text) => Err(RedisAiError::ParseValue {
                step,
                value: text.to_string(),
            }),
            None => Err(RedisAiError::UnexpectedReplyType {
                step,
                expected: "status",
                actual: other.kind(),
            }),
        },
    }
}

/// Decode an AI.TENSORGET reply issued with `META` plus the given content type
pub fn parse_tensor_reply(
    reply: Reply,
    content_type: TensorContentType,
) -> Result<Tensor, RedisAiError> {
    const STEP: &str = "AI.TENSORGET";
    let pairs = into_pairs(STEP, reply)?;
    let mut dtype: Option<DataType> = None;
    let mut shape: Option<Vec<usize>> = None;
    let mut blob: Option<Vec<u8>> = None;
    let mut values: Option<Reply> = None;
    for (key, value) in pairs {
        match key.as_str() {
            "dtype" => dtype = Some(DataType::from_wire(&into_text(STEP, value)?)?),
            "shape" => shape = Some(converters::values(STEP, value)?),
            "blob" => blob = Some(into_bytes(STEP, value)?),
            // values are decoded once dtype is known, whichever order the keys came in
            "values" => values = Some(value),
            _ => {}
        }
    }
    let populated = [dtype.is_some(), shape.is_some()]
        .iter()
        .filter(|present| **present)
        .count();
    let (Some(dtype), Some(shape)) = (dtype, shape) else {
        return Err(RedisAiError::ReplySize {
            step: STEP,
            expected: 2,
            actual: populated,
        });
    };
    let data = match content_type {
        TensorContentType::Meta => None,
        TensorContentType::Blob => Some(TensorData::Blob(blob.ok_or(
            RedisAiError::ReplySize {
                step: STEP,
                expected: 3,
                actual: 2,
            },
        )?)),
        TensorContentType::Values => {
            let values = values.ok_or(RedisAiError::ReplySize {
                step: STEP,
                expected: 3,
                actual: 2,
            })?;
            Some(converters::values_from_reply(dtype, values)?)
        }
    };
    Ok(Tensor { dtype, shape, data })
}

/// Decode an AI.MODELGET reply
pub fn parse_model_reply(reply: Reply) -> Result<Model, RedisAiError> {
    const STEP: &str = "AI.MODELGET";
    let mut model = Model::default();
    for (key, value) in into_pairs(STEP, reply)? {
        match key.as_str() {
            "backend" => model.backend = Some(Backend::from_wire(&into_text(STEP, value)?)?),
            "device" => model.device = Some(Device::from_wire(&into_text(STEP, value)?)?),
            "tag" => model.tag = Some(into_text(STEP, value)?),
            "blob" => model.blob = Some(into_bytes(STEP, value)?),
            "batchsize" => model.batch_size = Some(u64::from_reply_value(STEP, &value)?),
            "minbatchsize" => model.min_batch_size = Some(u64::from_reply_value(STEP, &value)?),
            "minbatchtimeout" => {
                model.min_batch_timeout = Some(u64::from_reply_value(STEP, &value)?)
            }
            "inputs" => model.inputs = Some(converters::strings(STEP, value)?),
            "outputs" => model.outputs = Some(converters::strings(STEP, value)?),
            _ => {}
        }
    }
    Ok(model)
}

/// Decode an AI.SCRIPTGET reply
pub fn parse_script_reply(reply: Reply) -> Result<Script, RedisAiError> {
    const STEP: &str = "AI.SCRIPTGET";
    let mut script = Script::default();
    for (key, value) in into_pairs(STEP, reply)? {
        match key.as_str() {
            "device" => script.device = Some(Device::from_wire(&into_text(STEP, value)?)?),
            "tag" => script.tag = Some(into_text(STEP, value)?),
            "source" => script.source = Some(into_text(STEP, value)?),
            "Entry Points" => script.entry_points = Some(converters::strings(STEP, value)?),
            _ => {}
        }
    }
    Ok(script)
}

/// Decode an AI.INFO reply into a map of stringified values
pub fn parse_info_reply(reply: Reply) -> Result<HashMap<String, String>, RedisAiError> {
    const STEP: &str = "AI.INFO";
    into_pairs(STEP, reply)?
        .into_iter()
        .map(|(key, value)| match value {
            Reply::Bulk(bytes) => Ok((key, String::from_utf8_lossy(&bytes).into_owned())),
            Reply::Status(text) => Ok((key, text)),
            Reply::Int(number) => Ok((key, number.to_string())),
            other => Err(RedisAiError::UnexpectedReplyType {
                step: STEP,
                expected: "bulk string or integer",
                actual: other.kind(),
            }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pairs(items: Vec<(&str, Reply)>) -> Reply {
        Reply::Array(
            items
                .into_iter()
                .flat_map(|(key, value)| [Reply::bulk(key), value])
                .collect(),
        )
    }

    fn ints(values: &[i64]) -> Reply {
        Reply::Array(values.iter().copied().map(Reply::Int).collect())
    }

    #[test]
    fn test_tensor_values_reply() {
        let reply = pairs(vec![
            ("dtype", Reply::bulk("FLOAT")),
            ("shape", ints(&[2, 2])),
            (
                "values",
                Reply::Array(vec![
                    Reply::bulk("1.1"),
                    Reply::bulk("2.2"),
                    Reply::bulk("3.3"),
                    Reply::bulk("4.4"),
                ]),
            ),
        ]);
        let tensor = parse_tensor_reply(reply, TensorContentType::Values).unwrap();
        assert_eq!(
            tensor,
            Tensor::with_data(DataType::Float, vec![2, 2], vec![1.1f32, 2.2, 3.3, 4.4])
        );
    }

    #[test]
    fn test_tensor_values_before_dtype() {
        let reply = pairs(vec![
            ("values", ints(&[1, -1])),
            ("shape", ints(&[2])),
            ("dtype", Reply::status("INT8")),
        ]);
        let tensor = parse_tensor_reply(reply, TensorContentType::Values).unwrap();
        assert_eq!(tensor.data, Some(TensorData::Int8(vec![1, -1])));
    }

    #[test]
    fn test_tensor_blob_and_meta_replies() {
        let reply = pairs(vec![
            ("dtype", Reply::bulk("UINT8")),
            ("shape", ints(&[3])),
            ("blob", Reply::bulk([1u8, 2, 3])),
        ]);
        let tensor = parse_tensor_reply(reply.clone(), TensorContentType::Blob).unwrap();
        assert_eq!(tensor.data, Some(TensorData::Blob(vec![1, 2, 3])));
        let meta = parse_tensor_reply(reply, TensorContentType::Meta).unwrap();
        assert_eq!(meta, Tensor::new(DataType::Uint8, vec![3]));
    }

    #[test]
    fn test_tensor_reply_sizing_errors() {
        let missing_shape = pairs(vec![("dtype", Reply::bulk("INT32"))]);
        assert!(matches!(
            parse_tensor_reply(missing_shape, TensorContentType::Meta),
            Err(RedisAiError::ReplySize {
                expected: 2,
                actual: 1,
                ..
            })
        ));
        let missing_values = pairs(vec![("dtype", Reply::bulk("INT32")), ("shape", ints(&[1]))]);
        assert!(matches!(
            parse_tensor_reply(missing_values, TensorContentType::Values),
            Err(RedisAiError::ReplySize { expected: 3, .. })
        ));
        let odd = Reply::Array(vec![Reply::bulk("dtype")]);
        assert!(matches!(
            parse_tensor_reply(odd, TensorContentType::Meta),
            Err(RedisAiError::ReplySize { .. })
        ));
    }

    #[test]
    fn test_tensor_reply_unknown_dtype() {
        let reply = pairs(vec![("dtype", Reply::bulk("BOOL")), ("shape", ints(&[1]))]);
        assert!(matches!(
            parse_tensor_reply(reply, TensorContentType::Meta),
            Err(RedisAiError::Type(_))
        ));
    }

    #[test]
    fn test_tensor_reply_server_error() {
        let err = parse_tensor_reply(
            Reply::Error("ERR tensor key is empty".to_string()),
            TensorContentType::Values,
        )
        .unwrap_err();
        assert!(matches!(err, RedisAiError::Server(message) if message.contains("empty")));
    }

    #[test]
    fn test_model_reply_without_tag() {
        let reply = pairs(vec![
            ("backend", Reply::bulk("TF")),
            ("device", Reply::bulk("CPU")),
            ("blob", Reply::bulk([9u8, 8])),
            ("batchsize", Reply::Int(0)),
            ("inputs", Reply::Array(vec![Reply::bulk("a"), Reply::bulk("b")])),
            ("outputs", Reply::Array(vec![Reply::bulk("mul")])),
            ("some_future_key", Reply::Int(7)),
        ]);
        let model = parse_model_reply(reply).unwrap();
        assert_eq!(model.tag, None);
        assert_eq!(model.backend, Some(Backend::TensorFlow));
        assert_eq!(model.device, Some(Device::Cpu));
        assert_eq!(model.blob, Some(vec![9, 8]));
        assert_eq!(model.batch_size, Some(0));
        assert_eq!(model.min_batch_size, None);
        assert_eq!(model.inputs, Some(vec!["a".to_string(), "b".to_string()]));
    }

    #[test]
    fn test_model_reply_fails_fast() {
        let reply = pairs(vec![
            ("backend", Reply::bulk("TORCH")),
            ("inputs", Reply::Int(3)),
            ("tag", Reply::bulk("v1")),
        ]);
        assert!(matches!(
            parse_model_reply(reply),
            Err(RedisAiError::UnexpectedReplyType {
                step: "AI.MODELGET",
                ..
            })
        ));
    }

    #[test]
    fn test_script_reply() {
        let reply = pairs(vec![
            ("device", Reply::bulk("GPU:0")),
            ("source", Reply::bulk("def bar(a): return a")),
            (
                "Entry Points",
                Reply::Array(vec![Reply::bulk("bar"), Reply::bulk("baz")]),
            ),
        ]);
        let script = parse_script_reply(reply).unwrap();
        assert_eq!(
            script,
            Script {
                device: Some(Device::Gpu(Some(0))),
                tag: None,
                source: Some("def bar(a): return a".to_string()),
                entry_points: Some(vec!["bar".to_string(), "baz".to_string()]),
            }
        );
    }

    #[test]
    fn test_info_reply() {
        let reply = pairs(vec![
            ("key", Reply::bulk("m")),
            ("type", Reply::bulk("MODEL")),
            ("calls", Reply::Int(2)),
        ]);
        let info = parse_info_reply(reply).unwrap();
        assert_eq!(info.len(), 3);
        assert_eq!(info["calls"], "2");
        assert_eq!(info["type"], "MODEL");

        let bad = pairs(vec![("key", Reply::Array(vec![]))]);
        assert!(parse_info_reply(bad).is_err());
        let odd = Reply::Array(vec![Reply::bulk("key")]);
        assert!(matches!(
            parse_info_reply(odd),
            Err(RedisAiError::ReplySize { .. })
        ));
    }

    #[test]
    fn test_status_reply() {
        assert!(parse_status("AI.TENSORSET", Reply::status("OK")).is_ok());
        assert!(matches!(
            parse_status("AI.TENSORSET", Reply::Error("ERR wrong type".to_string())),
            Err(RedisAiError::Server(_))
        ));
        assert!(parse_status("AI.TENSORSET", Reply::Int(1)).is_err());
    }
}
