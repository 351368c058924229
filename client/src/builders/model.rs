use redisai_types::device::{Backend, Device};
use redisai_types::model::Model;
use typed_builder::TypedBuilder;

use crate::error::RedisAiError;

/// Arguments of AI.MODELSTORE.
///
/// Zero batching values and empty tags or name lists leave their clause out of the command
#[derive(Debug, Clone, PartialEq, Eq, TypedBuilder)]
pub struct ModelStoreParams {
    #[builder(setter(into))]
    pub key: String,

    pub backend: Backend,

    #[builder(default = Device::Cpu)]
    pub device: Device,

    #[builder(default = None, setter(strip_option, into))]
    pub tag: Option<String>,

    #[builder(default = 0)]
    pub batch_size: u64,

    #[builder(default = 0)]
    pub min_batch_size: u64,

    /// milliseconds
    #[builder(default = 0)]
    pub min_batch_timeout: u64,

    #[builder(default = Vec::new(), setter(transform = |names: &[&str]| names.iter().map(|n| n.to_string()).collect()))]
    pub inputs: Vec<String>,

    #[builder(default = Vec::new(), setter(transform = |names: &[&str]| names.iter().map(|n| n.to_string()).collect()))]
    pub outputs: Vec<String>,

    #[builder(default = Vec::new(), setter(into))]
    pub blob: Vec<u8>,
}

impl ModelStoreParams {
    /// Store parameters from a model record, e.g. one fetched with AI.MODELGET
    pub fn from_model(key: impl Into<String>, model: &Model) -> Result<Self, RedisAiError> {
        Ok(Self {
            key: key.into(),
            backend: model.backend.ok_or(RedisAiError::MissingField("backend"))?,
            device: model.device.ok_or(RedisAiError::MissingField("device"))?,
            tag: model.tag.clone(),
            batch_size: model.batch_size.unwrap_or_default(),
            min_batch_size: model.min_batch_size.unwrap_or_default(),
            min_batch_timeout: model.min_batch_timeout.unwrap_or_default(),
            inputs: model.inputs.clone().unwrap_or_default(),
            outputs: model.outputs.clone().unwrap_or_default(),
            blob: model
                .blob
                .clone()
                .ok_or(RedisAiError::MissingField("blob"))?,
        })
    }
}
