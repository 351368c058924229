//! Builder for the sub-commands of AI.DAGRUN and AI.DAGEXECUTE.
//!
//! A [`Dag`] only collects commands. It is sent as a single composite command through
//! [`AiClient::dag_run`](crate::AiClient::dag_run) or
//! [`AiClient::dag_execute`](crate::AiClient::dag_execute) and the server answers with one reply
//! per sub-command, in the order they were added.
use redisai_types::datatype::{DataType, TensorContentType};
use redisai_types::reply::Reply;
use redisai_types::tensor::TensorData;

use crate::args::{self, owned, Args, Command, CommandName, DAG_SEPARATOR};
use crate::builders::ScriptExecuteParams;
use crate::error::RedisAiError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dag {
    commands: Vec<Command>,
}

impl Dag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tensor_set(
        &mut self,
        key: &str,
        dtype: DataType,
        shape: &[usize],
        data: Option<&TensorData>,
    ) -> Result<&mut Self, RedisAiError> {
        self.commands.push(args::tensor_set(key, dtype, shape, data)?);
        Ok(self)
    }

    /// Inside a DAG the format is given on its own, `AI.TENSORGET key VALUES`
    pub fn tensor_get(&mut self, key: &str, content_type: TensorContentType) -> &mut Self {
        let mut args = Args::new();
        args.push(key).push(content_type.as_str());
        self.commands.push(Command::new(CommandName::TensorGet, args));
        self
    }

    pub fn model_run(&mut self, key: &str, inputs: &[&str], outputs: &[&str]) -> &mut Self {
        self.commands.push(args::model_run(key, &owned(inputs), &owned(outputs)));
        self
    }

    pub fn model_execute(
        &mut self,
        key: &str,
        inputs: &[&str],
        outputs: &[&str],
        timeout: Option<u64>,
    ) -> &mut Self {
        self.commands.push(args::model_execute(
            key,
            &owned(inputs),
            &owned(outputs),
            timeout,
        ));
        self
    }

    pub fn script_execute(&mut self, params: &ScriptExecuteParams) -> &mut Self {
        self.commands.push(args::script_execute(params));
        self
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// `|> CMD args... |> CMD args...`
    pub fn flat_args(&self) -> Args {
        let mut args = Args::new();
        for command in &self.commands {
            args.push(DAG_SEPARATOR);
            command.flatten_into(&mut args);
        }
        args
    }

    /// Split the composite reply into one reply per sub-command.
    ///
    /// Error replies of single sub-commands are kept in place so the caller can decode each
    /// position on its own.
    pub fn parse_reply(&self, reply: Reply) -> Result<Vec<Reply>, RedisAiError> {
        const STEP: &str = "AI.DAGRUN";
        match reply {
            Reply::Array(replies) if replies.len() == self.commands.len() => Ok(replies),
            Reply::Array(replies) => Err(RedisAiError::ReplySize {
                step: STEP,
                expected: self.commands.len(),
                actual: replies.len(),
            }),
            Reply::Nil => Err(RedisAiError::NilReply(STEP)),
            Reply::Error(message) => Err(RedisAiError::Server(message)),
            other => Err(RedisAiError::UnexpectedReplyType {
                step: STEP,
                expected: "array",
                actual: other.kind(),
            }),
        }
    }
}
