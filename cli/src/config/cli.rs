use clap::{ArgAction, Args, Parser, Subcommand};
use redisai_client_rs::config::{
    ConnectionConfig, DEFAULT_HOST, DEFAULT_MAX_REPLY_SIZE, DEFAULT_POOL_SIZE, DEFAULT_PORT,
};
use redisai_client_rs::error::RedisAiError;
use redisai_types::datatype::{DataType, TensorContentType};
use redisai_types::device::Backend;
use std::sync::OnceLock;

static DEFAULT_CONFIG: OnceLock<CommandLineConfig> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub config: CommandLineConfig,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Clone)]
pub struct CommandLineConfig {
    /// Host running the RedisAI module
    #[arg(long, default_value_t =
    DEFAULT_CONFIG.get_or_init(CommandLineConfig::default).host.clone())]
    pub host: String,

    /// Port of the server
    #[arg(long, default_value_t =
    DEFAULT_CONFIG.get_or_init(CommandLineConfig::default).port)]
    pub port: u16,

    /// Connection url such as redis://127.0.0.1:6379, takes precedence over host and port
    #[arg(long)]
    pub url: Option<String>,

    /// Maximum number of pooled connections
    #[arg(long, default_value_t =
    DEFAULT_CONFIG.get_or_init(CommandLineConfig::default).pool_size)]
    pub pool_size: usize,

    /// Largest single reply accepted, in bytes
    #[arg(long, default_value_t =
    DEFAULT_CONFIG.get_or_init(CommandLineConfig::default).max_reply_size)]
    pub max_reply_size: usize,

    ///  Log level
    #[arg(long, default_value_t =
    DEFAULT_CONFIG.get_or_init(CommandLineConfig::default).log_level.clone())]
    pub log_level: String,

    /// Allows enables tracing
    #[arg(long, action=ArgAction::SetTrue, default_value_t =
    DEFAULT_CONFIG.get_or_init(CommandLineConfig::default).enable_tracing)]
    pub enable_tracing: bool,

    /// Otel collector url to send traces to
    #[arg(long, requires = "enable_tracing")]
    pub otel_endpoint: Option<String>,
}

impl Default for CommandLineConfig {
    fn default() -> Self {
        Self {
            host: String::from(DEFAULT_HOST),
            port: DEFAULT_PORT,
            url: None,
            pool_size: DEFAULT_POOL_SIZE,
            max_reply_size: DEFAULT_MAX_REPLY_SIZE,
            log_level: String::from("warn"),
            enable_tracing: false,
            otel_endpoint: None,
        }
    }
}

impl CommandLineConfig {
    pub fn connection_config(&self) -> Result<ConnectionConfig, RedisAiError> {
        let mut config = match &self.url {
            Some(url) => ConnectionConfig::from_url(url)?,
            None => ConnectionConfig::new(self.host.clone(), self.port),
        };
        config.max_pool_size = self.pool_size;
        config.max_reply_size = self.max_reply_size;
        Ok(config)
    }

    /// Collector endpoint, only when tracing is switched on
    pub fn otel_endpoint(&self) -> Option<&str> {
        self.otel_endpoint
            .as_deref()
            .filter(|_| self.enable_tracing)
    }
}

fn parse_data_type(input: &str) -> Result<DataType, String> {
    DataType::from_wire(input).map_err(|err| err.to_string())
}

fn parse_content_type(input: &str) -> Result<TensorContentType, String> {
    TensorContentType::from_wire(input).map_err(|err| err.to_string())
}

fn parse_backend(input: &str) -> Result<Backend, String> {
    Backend::from_wire(input).map_err(|err| err.to_string())
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Store a tensor from comma separated values
    TensorSet(TensorSetArgs),
    /// Print a tensor
    TensorGet(TensorGetArgs),
    /// Print a model's metadata
    ModelGet(KeyArgs),
    ModelDel(KeyArgs),
    /// Run a stored model over stored tensors
    ModelExecute(ModelExecuteArgs),
    /// Print a script's metadata and source
    ScriptGet(KeyArgs),
    ScriptDel(KeyArgs),
    /// Print run statistics of a model or script
    Info(InfoArgs),
    /// Load a backend library into the module
    LoadBackend(LoadBackendArgs),
}

#[derive(Args, Debug, Clone)]
pub struct KeyArgs {
    pub key: String,
}

#[derive(Args, Debug, Clone)]
pub struct TensorSetArgs {
    pub key: String,

    #[arg(long, value_parser = parse_data_type)]
    pub dtype: DataType,

    /// Dimensions, e.g. 2,2. Leave empty for a scalar
    #[arg(long, value_delimiter = ',')]
    pub shape: Vec<usize>,

    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub values: Vec<String>,
}

#[derive(Args, Debug, Clone)]
pub struct TensorGetArgs {
    pub key: String,

    /// META, VALUES or BLOB
    #[arg(long, value_parser = parse_content_type, default_value = "VALUES")]
    pub format: TensorContentType,
}

#[derive(Args, Debug, Clone)]
pub struct ModelExecuteArgs {
    pub key: String,

    #[arg(long, value_delimiter = ',', required(true))]
    pub inputs: Vec<String>,

    #[arg(long, value_delimiter = ',', required(true))]
    pub outputs: Vec<String>,

    /// milliseconds
    #[arg(long)]
    pub timeout: Option<u64>,
}

#[derive(Args, Debug, Clone)]
pub struct InfoArgs {
    pub key: String,

    /// Reset the statistics instead of printing them
    #[arg(long, action=ArgAction::SetTrue)]
    pub reset_stat: bool,
}

#[derive(Args, Debug, Clone)]
pub struct LoadBackendArgs {
    #[arg(value_parser = parse_backend)]
    pub backend: Backend,

    /// Path of the backend library, relative to the module's backends path
    pub path: String,
}
