//! Builds the positional argument list of every command the client sends.
//!
//! Everything here is pure: a [`Command`] is assembled in full or an error is returned before any
//! connection is touched.
use redisai_types::datatype::{DataType, TensorContentType};
use redisai_types::device::{Backend, Device};
use redisai_types::tensor::{element_count, TensorData};
use std::fmt;

use crate::builders::{DagExecuteParams, ModelStoreParams, ScriptExecuteParams, ScriptStoreParams};
use crate::dag::Dag;
use crate::error::RedisAiError;

/// Token that introduces every sub-command of a DAG
pub const DAG_SEPARATOR: &str = "|>";

/// A single positional argument, sent as a bulk string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arg(Vec<u8>);

impl Arg {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}

impl From<&str> for Arg {
    fn from(value: &str) -> Self {
        Self(value.as_bytes().to_vec())
    }
}

impl From<String> for Arg {
    fn from(value: String) -> Self {
        Self(value.into_bytes())
    }
}

impl From<&String> for Arg {
    fn from(value: &String) -> Self {
        Self(value.as_bytes().to_vec())
    }
}

impl From<&[u8]> for Arg {
    fn from(value: &[u8]) -> Self {
        Self(value.to_vec())
    }
}

impl From<Vec<u8>> for Arg {
    fn from(value: Vec<u8>) -> Self {
        Self(value)
    }
}

macro_rules! arg_from_display {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Arg {
                fn from(value: $t) -> Self {
                    Self(value.to_string().into_bytes())
                }
            }
        )*
    };
}

arg_from_display!(f32, f64, i8, i16, i32, i64, u8, u16, u64, usize);

/// Ordered positional arguments of a command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Args(Vec<Arg>);

impl Args {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, arg: impl Into<Arg>) -> &mut Self {
        self.0.push(arg.into());
        self
    }

    pub fn extend<T: Into<Arg>>(&mut self, items: impl IntoIterator<Item = T>) -> &mut Self {
        self.0.extend(items.into_iter().map(Into::into));
        self
    }

    /// `KEYWORD count item...`
    pub fn push_counted(&mut self, keyword: &str, items: &[String]) -> &mut Self {
        self.push(keyword).push(items.len()).extend(items)
    }

    /// `KEYWORD count item...` left out entirely when there are no items
    pub fn push_counted_if_any(&mut self, keyword: &str, items: &[String]) -> &mut Self {
        if !items.is_empty() {
            self.push_counted(keyword, items);
        }
        self
    }

    /// `KEYWORD item...` without a count, left out when there are no items
    pub fn push_listed_if_any(&mut self, keyword: &str, items: &[String]) -> &mut Self {
        if !items.is_empty() {
            self.push(keyword).extend(items);
        }
        self
    }

    pub fn append(&mut self, other: &Args) -> &mut Self {
        self.0.extend(other.0.iter().cloned());
        self
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arg> {
        self.0.iter()
    }

    /// Lossy text view, handy for logging and assertions
    pub fn to_strings(&self) -> Vec<String> {
        self.0.iter().map(ToString::to_string).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandName {
    TensorSet,
    TensorGet,
    ModelStore,
    ModelGet,
    ModelDel,
    ModelRun,
    ModelExecute,
    ScriptStore,
    ScriptSet,
    ScriptGet,
    ScriptDel,
    ScriptRun,
    ScriptExecute,
    Config,
    Info,
    DagRun,
    DagRunRo,
    DagExecute,
    DagExecuteRo,
    Ping,
}

impl CommandName {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TensorSet => "AI.TENSORSET",
            Self::TensorGet => "AI.TENSORGET",
            Self::ModelStore => "AI.MODELSTORE",
            Self::ModelGet => "AI.MODELGET",
            Self::ModelDel => "AI.MODELDEL",
            Self::ModelRun => "AI.MODELRUN",
            Self::ModelExecute => "AI.MODELEXECUTE",
            Self::ScriptStore => "AI.SCRIPTSTORE",
            Self::ScriptSet => "AI.SCRIPTSET",
            Self::ScriptGet => "AI.SCRIPTGET",
            Self::ScriptDel => "AI.SCRIPTDEL",
            Self::ScriptRun => "AI.SCRIPTRUN",
            Self::ScriptExecute => "AI.SCRIPTEXECUTE",
            Self::Config => "AI.CONFIG",
            Self::Info => "AI.INFO",
            Self::DagRun => "AI.DAGRUN",
            Self::DagRunRo => "AI.DAGRUN_RO",
            Self::DagExecute => "AI.DAGEXECUTE",
            Self::DagExecuteRo => "AI.DAGEXECUTE_RO",
            Self::Ping => "PING",
        }
    }
}

impl fmt::Display for CommandName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One wire request. Built fresh per call and consumed once
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    name: CommandName,
    args: Args,
}

impl Command {
    pub fn new(name: CommandName, args: Args) -> Self {
        Self { name, args }
    }

    pub fn name(&self) -> CommandName {
        self.name
    }

    pub fn args(&self) -> &Args {
        &self.args
    }

    /// Command name followed by its arguments, the layout used inside a DAG
    pub fn flatten_into(&self, args: &mut Args) {
        args.push(self.name.as_str()).append(&self.args);
    }
}

pub(crate) fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(ToString::to_string).collect()
}

/// Convert caller data into a tensor payload, surfacing unsupported element types as errors
pub fn tensor_data<D, E>(data: D) -> Result<TensorData, RedisAiError>
where
    D: TryInto<TensorData, Error = E>,
    RedisAiError: From<E>,
{
    Ok(data.try_into()?)
}

fn push_values(args: &mut Args, data: &TensorData) {
    match data {
        TensorData::Blob(bytes) | TensorData::Uint8(bytes) => args.extend(bytes.iter().copied()),
        TensorData::Float(values) => args.extend(values.iter().copied()),
        TensorData::Double(values) => args.extend(values.iter().copied()),
        TensorData::Int8(values) => args.extend(values.iter().copied()),
        TensorData::Int16(values) => args.extend(values.iter().copied()),
        TensorData::Int32(values) => args.extend(values.iter().copied()),
        TensorData::Int64(values) => args.extend(values.iter().copied()),
        TensorData::Uint16(values) => args.extend(values.iter().copied()),
    };
}

/// `key dtype dim... [BLOB bytes | VALUES val...]`
///
/// Without data only the metadata prefix is emitted, which allocates the tensor server side
pub fn tensor_set(
    key: &str,
    dtype: DataType,
    shape: &[usize],
    data: Option<&TensorData>,
) -> Result<Command, RedisAiError> {
    let mut args = Args::new();
    args.push(key).push(dtype.as_str()).extend(shape.iter().copied());
    if let Some(data) = data {
        let elements = element_count(shape).ok_or_else(|| {
            RedisAiError::InvalidArgument(format!("tensor shape {shape:?} overflows"))
        })?;
        match data {
            TensorData::Blob(bytes) => {
                let expected = elements.checked_mul(dtype.size_in_bytes()).ok_or_else(|| {
                    RedisAiError::InvalidArgument(format!(
                        "tensor shape {shape:?} of {dtype} overflows in bytes"
                    ))
                })?;
                if bytes.len() != expected {
                    return Err(RedisAiError::ShapeMismatch {
                        expected,
                        actual: bytes.len(),
                        unit: "bytes",
                    });
                }
                args.push("BLOB").push(bytes.as_slice());
            }
            values => {
                if let Some(actual) = values.data_type() {
                    if actual != dtype {
                        return Err(RedisAiError::DataTypeMismatch {
                            declared: dtype,
                            actual,
                        });
                    }
                }
                if values.len() != elements {
                    return Err(RedisAiError::ShapeMismatch {
                        expected: elements,
                        actual: values.len(),
                        unit: "elements",
                    });
                }
                args.push("VALUES");
                push_values(&mut args, values);
            }
        }
    }
    Ok(Command::new(CommandName::TensorSet, args))
}

/// `key META [VALUES|BLOB]`
pub fn tensor_get(key: &str, content_type: TensorContentType) -> Command {
    let mut args = Args::new();
    args.push(key).push(TensorContentType::Meta.as_str());
    if content_type != TensorContentType::Meta {
        args.push(content_type.as_str());
    }
    Command::new(CommandName::TensorGet, args)
}

/// `key backend device [TAG t] [BATCHSIZE n [MINBATCHSIZE m [MINBATCHTIMEOUT ms]]]
/// [INPUTS k name...] [OUTPUTS k name...] BLOB bytes`
pub fn model_store(params: &ModelStoreParams) -> Result<Command, RedisAiError> {
    if params.min_batch_size > 0 && params.batch_size == 0 {
        return Err(RedisAiError::InvalidArgument(
            "MINBATCHSIZE requires BATCHSIZE".to_string(),
        ));
    }
    if params.min_batch_timeout > 0 && params.min_batch_size == 0 {
        return Err(RedisAiError::InvalidArgument(
            "MINBATCHTIMEOUT requires MINBATCHSIZE".to_string(),
        ));
    }
    let mut args = Args::new();
    args.push(&params.key)
        .push(params.backend.as_str())
        .push(params.device.to_string());
    push_tag(&mut args, params.tag.as_deref());
    if params.batch_size > 0 {
        args.push("BATCHSIZE").push(params.batch_size);
        if params.min_batch_size > 0 {
            args.push("MINBATCHSIZE").push(params.min_batch_size);
            if params.min_batch_timeout > 0 {
                args.push("MINBATCHTIMEOUT").push(params.min_batch_timeout);
            }
        }
    }
    args.push_counted_if_any("INPUTS", &params.inputs)
        .push_counted_if_any("OUTPUTS", &params.outputs);
    if !params.blob.is_empty() {
        args.push("BLOB").push(params.blob.as_slice());
    }
    Ok(Command::new(CommandName::ModelStore, args))
}

fn push_tag(args: &mut Args, tag: Option<&str>) {
    if let Some(tag) = tag.filter(|t| !t.is_empty()) {
        args.push("TAG").push(tag);
    }
}

fn single_key(name: CommandName, key: &str) -> Command {
    let mut args = Args::new();
    args.push(key);
    Command::new(name, args)
}

/// `key META BLOB`
pub fn model_get(key: &str) -> Command {
    let mut args = Args::new();
    args.push(key).push("META").push("BLOB");
    Command::new(CommandName::ModelGet, args)
}

pub fn model_del(key: &str) -> Command {
    single_key(CommandName::ModelDel, key)
}

/// `key [INPUTS name...] [OUTPUTS name...]`, the count-less grammar of AI.MODELRUN
pub fn model_run(key: &str, inputs: &[String], outputs: &[String]) -> Command {
    let mut args = Args::new();
    args.push(key)
        .push_listed_if_any("INPUTS", inputs)
        .push_listed_if_any("OUTPUTS", outputs);
    Command::new(CommandName::ModelRun, args)
}

/// `key INPUTS k name... OUTPUTS k name... [TIMEOUT ms]`
pub fn model_execute(
    key: &str,
    inputs: &[String],
    outputs: &[String],
    timeout: Option<u64>,
) -> Command {
    let mut args = Args::new();
    args.push(key)
        .push_counted("INPUTS", inputs)
        .push_counted("OUTPUTS", outputs);
    if let Some(timeout) = timeout {
        args.push("TIMEOUT").push(timeout);
    }
    Command::new(CommandName::ModelExecute, args)
}

/// `key device [TAG t] [ENTRY_POINTS k name...] SOURCE src`
pub fn script_store(params: &ScriptStoreParams) -> Command {
    let mut args = Args::new();
    args.push(&params.key).push(params.device.to_string());
    push_tag(&mut args, params.tag.as_deref());
    args.push_counted_if_any("ENTRY_POINTS", &params.entry_points);
    if !params.source.is_empty() {
        args.push("SOURCE").push(&params.source);
    }
    Command::new(CommandName::ScriptStore, args)
}

/// `key device [TAG t] SOURCE src`
pub fn script_set(key: &str, device: Device, tag: Option<&str>, source: &str) -> Command {
    let mut args = Args::new();
    args.push(key).push(device.to_string());
    push_tag(&mut args, tag);
    if !source.is_empty() {
        args.push("SOURCE").push(source);
    }
    Command::new(CommandName::ScriptSet, args)
}

/// `key META SOURCE`
pub fn script_get(key: &str) -> Command {
    let mut args = Args::new();
    args.push(key).push("META").push("SOURCE");
    Command::new(CommandName::ScriptGet, args)
}

pub fn script_del(key: &str) -> Command {
    single_key(CommandName::ScriptDel, key)
}

/// `key fn [INPUTS name...] [OUTPUTS name...]`
pub fn script_run(key: &str, function: &str, inputs: &[String], outputs: &[String]) -> Command {
    let mut args = Args::new();
    args.push(key)
        .push(function)
        .push_listed_if_any("INPUTS", inputs)
        .push_listed_if_any("OUTPUTS", outputs);
    Command::new(CommandName::ScriptRun, args)
}

/// `key fn [KEYS k key...] INPUTS k name... [ARGS k a...] OUTPUTS k name... [TIMEOUT ms]`
pub fn script_execute(params: &ScriptExecuteParams) -> Command {
    let mut args = Args::new();
    args.push(&params.key)
        .push(&params.function)
        .push_counted_if_any("KEYS", &params.keys)
        .push_counted("INPUTS", &params.inputs)
        .push_counted_if_any("ARGS", &params.args)
        .push_counted("OUTPUTS", &params.outputs);
    if let Some(timeout) = params.timeout {
        args.push("TIMEOUT").push(timeout);
    }
    Command::new(CommandName::ScriptExecute, args)
}

/// `LOADBACKEND id path`
pub fn load_backend(backend: Backend, path: &str) -> Command {
    let mut args = Args::new();
    args.push("LOADBACKEND").push(backend.as_str()).push(path);
    Command::new(CommandName::Config, args)
}

/// `BACKENDSPATH path`
pub fn backends_path(path: &str) -> Command {
    let mut args = Args::new();
    args.push("BACKENDSPATH").push(path);
    Command::new(CommandName::Config, args)
}

pub fn info(key: &str) -> Command {
    single_key(CommandName::Info, key)
}

/// `key RESETSTAT`
pub fn reset_stat(key: &str) -> Command {
    let mut args = Args::new();
    args.push(key).push("RESETSTAT");
    Command::new(CommandName::Info, args)
}

/// `[LOAD n key...] [PERSIST n key...] (|> subcommand)...`
pub fn dag_run(
    load: &[String],
    persist: &[String],
    dag: &Dag,
    read_only: bool,
) -> Result<Command, RedisAiError> {
    if read_only && !persist.is_empty() {
        return Err(RedisAiError::InvalidArgument(
            "AI.DAGRUN_RO cannot PERSIST keys".to_string(),
        ));
    }
    let mut args = Args::new();
    args.push_counted_if_any("LOAD", load)
        .push_counted_if_any("PERSIST", persist)
        .append(&dag.flat_args());
    let name = if read_only {
        CommandName::DagRunRo
    } else {
        CommandName::DagRun
    };
    Ok(Command::new(name, args))
}

/// `[LOAD n key...] [PERSIST n key...] [ROUTING tag] [TIMEOUT ms] (|> subcommand)...`
pub fn dag_execute(
    params: &DagExecuteParams,
    dag: &Dag,
    read_only: bool,
) -> Result<Command, RedisAiError> {
    if read_only && !params.persist.is_empty() {
        return Err(RedisAiError::InvalidArgument(
            "AI.DAGEXECUTE_RO cannot PERSIST keys".to_string(),
        ));
    }
    let mut args = Args::new();
    args.push_counted_if_any("LOAD", &params.load)
        .push_counted_if_any("PERSIST", &params.persist);
    if let Some(routing) = &params.routing {
        args.push("ROUTING").push(routing);
    }
    if let Some(timeout) = params.timeout {
        args.push("TIMEOUT").push(timeout);
    }
    args.append(&dag.flat_args());
    let name = if read_only {
        CommandName::DagExecuteRo
    } else {
        CommandName::DagExecute
    };
    Ok(Command::new(name, args))
}

pub fn ping() -> Command {
    Command::new(CommandName::Ping, Args::new())
}
