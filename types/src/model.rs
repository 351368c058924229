use crate::device::{Backend, Device};
use serde::{Deserialize, Serialize};

/// A stored model as described by AI.MODELGET.
///
/// Fields are optional so an absent key in a reply stays distinguishable from a zero value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    pub backend: Option<Backend>,
    pub device: Option<Device>,
    pub tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blob: Option<Vec<u8>>,
    pub batch_size: Option<u64>,
    pub min_batch_size: Option<u64>,
    pub min_batch_timeout: Option<u64>,
    pub inputs: Option<Vec<String>>,
    pub outputs: Option<Vec<String>>,
}

impl Model {
    pub fn new(backend: Backend, device: Device) -> Self {
        Self {
            backend: Some(backend),
            device: Some(device),
            ..Default::default()
        }
    }
}
