mod resp;
pub use resp::RedisConn;
pub use resp::{encode_command, read_reply};

use crate::args::{self, Command};
use crate::error::RedisAiError;
use redisai_types::reply::Reply;

/// A byte stream to one server, seen as an ordered queue of commands and replies.
///
/// `send` may buffer, nothing is guaranteed to reach the server before `flush`. Replies come
/// back from `receive` in the order their commands were sent.
#[async_trait::async_trait]
pub trait Connection: Send {
    async fn send(&mut self, command: &Command) -> Result<(), RedisAiError>;

    async fn flush(&mut self) -> Result<(), RedisAiError>;

    async fn receive(&mut self) -> Result<Reply, RedisAiError>;

    /// Round trip of a single command
    async fn exec(&mut self, command: &Command) -> Result<Reply, RedisAiError> {
        self.send(command).await?;
        self.flush().await?;
        self.receive().await
    }

    async fn is_conn_valid(&mut self) -> Result<(), RedisAiError> {
        let reply = self.exec(&args::ping()).await?;
        match reply.as_text() {
            Some("PONG") => Ok(()),
            _ => Err(RedisAiError::Protocol(format!(
                "unexpected reply to PING {reply:?}"
            ))),
        }
    }
}
