use redisai_types::device::Device;
use typed_builder::TypedBuilder;

/// Arguments of AI.SCRIPTSTORE
#[derive(Debug, Clone, PartialEq, Eq, TypedBuilder)]
pub struct ScriptStoreParams {
    #[builder(setter(into))]
    pub key: String,

    #[builder(default = Device::Cpu)]
    pub device: Device,

    #[builder(default = None, setter(strip_option, into))]
    pub tag: Option<String>,

    #[builder(default = Vec::new(), setter(transform = |names: &[&str]| names.iter().map(|n| n.to_string()).collect()))]
    pub entry_points: Vec<String>,

    #[builder(setter(into))]
    pub source: String,
}

/// Arguments of AI.SCRIPTEXECUTE
#[derive(Debug, Clone, PartialEq, Eq, TypedBuilder)]
pub struct ScriptExecuteParams {
    #[builder(setter(into))]
    pub key: String,

    #[builder(setter(into))]
    pub function: String,

    #[builder(default = Vec::new(), setter(transform = |names: &[&str]| names.iter().map(|n| n.to_string()).collect()))]
    pub keys: Vec<String>,

    #[builder(default = Vec::new(), setter(transform = |names: &[&str]| names.iter().map(|n| n.to_string()).collect()))]
    pub inputs: Vec<String>,

    #[builder(default = Vec::new(), setter(transform = |names: &[&str]| names.iter().map(|n| n.to_string()).collect()))]
    pub args: Vec<String>,

    #[builder(default = Vec::new(), setter(transform = |names: &[&str]| names.iter().map(|n| n.to_string()).collect()))]
    pub outputs: Vec<String>,

    /// milliseconds, forwarded to the server as is
    #[builder(default = None, setter(strip_option))]
    pub timeout: Option<u64>,
}
