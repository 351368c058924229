use crate::device::Device;
use serde::{Deserialize, Serialize};

/// A stored script as described by AI.SCRIPTGET
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    pub device: Option<Device>,
    pub tag: Option<String>,
    pub source: Option<String>,
    pub entry_points: Option<Vec<String>>,
}

impl Script {
    pub fn new(device: Device) -> Self {
        Self {
            device: Some(device),
            ..Default::default()
        }
    }
}
