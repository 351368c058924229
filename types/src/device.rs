use crate::errors::TypeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use strum::{EnumIter, EnumString};

/// Execution backend a model is stored against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum Backend {
    #[strum(serialize = "TF")]
    #[serde(rename = "TF")]
    TensorFlow,
    #[strum(serialize = "TFLITE")]
    #[serde(rename = "TFLITE")]
    TensorFlowLite,
    #[strum(serialize = "TORCH")]
    #[serde(rename = "TORCH")]
    Torch,
    // older servers name the onnxruntime backend ORT
    #[strum(serialize = "ONNX", serialize = "ORT")]
    #[serde(rename = "ONNX", alias = "ORT")]
    Onnx,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TensorFlow => "TF",
            Self::TensorFlowLite => "TFLITE",
            Self::Torch => "TORCH",
            Self::Onnx => "ONNX",
        }
    }

    pub fn from_wire(input: &str) -> Result<Self, TypeError> {
        Self::from_str(input).map_err(|_| TypeError::UnknownBackend(input.to_string()))
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Device a model or script runs on. GPUs may be addressed by ordinal as `GPU:1`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Device {
    Cpu,
    Gpu(Option<u32>),
}

impl Device {
    pub fn from_wire(input: &str) -> Result<Self, TypeError> {
        let upper = input.trim().to_ascii_uppercase();
        match upper.as_str() {
            "CPU" => Ok(Self::Cpu),
            "GPU" => Ok(Self::Gpu(None)),
            other => other
                .strip_prefix("GPU:")
                .and_then(|ordinal| ordinal.parse::<u32>().ok())
                .map(|ordinal| Self::Gpu(Some(ordinal)))
                .ok_or_else(|| TypeError::UnknownDevice(input.to_string())),
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cpu => write!(f, "CPU"),
            Self::Gpu(None) => write!(f, "GPU"),
            Self::Gpu(Some(ordinal)) => write!(f, "GPU:{ordinal}"),
        }
    }
}

impl FromStr for Device {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_wire(s)
    }
}

impl From<Device> for String {
    fn from(device: Device) -> String {
        device.to_string()
    }
}

impl TryFrom<String> for Device {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_wire(&value)
    }
}
