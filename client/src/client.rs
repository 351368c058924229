use deadpool::managed::{Manager, Metrics, Object, Pool, RecycleError, RecycleResult};
use redisai_types::reply::Reply;
use std::fmt;

use crate::args::Command;
use crate::config::ConnectionConfig;
use crate::conn::{Connection, RedisConn};
use crate::error::RedisAiError;
use crate::pipeline::PipelineState;

/// TCP connection manager for a server running the RedisAI module
#[derive(Debug, Clone)]
pub struct AiConnManager {
    config: ConnectionConfig,
}

impl AiConnManager {
    pub fn new(config: ConnectionConfig) -> Self {
        Self { config }
    }
}

#[async_trait::async_trait]
impl Manager for AiConnManager {
    type Type = RedisConn;
    type Error = RedisAiError;

    async fn create(&self) -> Result<RedisConn, RedisAiError> {
        RedisConn::connect(&self.config).await
    }

    async fn recycle(
        &self,
        conn: &mut RedisConn,
        _metrics: &Metrics,
    ) -> RecycleResult<RedisAiError> {
        conn.is_conn_valid().await.map_err(RecycleError::Backend)
    }
}

/// Client for the RedisAI module backed by a deadpool pool.
///
/// A client lazily borrows one connection from its pool and keeps it until [`AiClient::close`].
/// Every command goes through the same entry point: in immediate mode the reply is awaited and
/// returned, in pipelined mode the command is only written and its reply has to be collected
/// later with [`AiClient::receive`].
///
/// All methods take `&mut self`, a client serves a single caller at a time. Concurrent callers
/// should each use their own client over a shared pool, see [`AiClient::new_with_pool`].
pub struct AiClient<M = AiConnManager>
where
    M: Manager<Error = RedisAiError>,
    M::Type: Connection,
{
    pool: Pool<M>,
    active: Option<Object<M>>,
    pipeline: PipelineState,
}

impl<M> fmt::Debug for AiClient<M>
where
    M: Manager<Error = RedisAiError>,
    M::Type: Connection,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AiClient")
            .field("pool", &self.pool.status())
            .field("has_active_connection", &self.active.is_some())
            .field("pipeline", &self.pipeline)
            .finish()
    }
}

impl AiClient<AiConnManager> {
    /// create new client with a pool sized from the config
    /// only made async because the pool may only be built within a runtime context like tokio
    pub async fn new(config: ConnectionConfig) -> Result<Self, RedisAiError> {
        let max_size = config.max_pool_size;
        let pool = Pool::builder(AiConnManager::new(config))
            .max_size(max_size)
            .build()
            .map_err(|err| RedisAiError::Pool(err.to_string()))?;
        Ok(Self::new_with_pool(pool))
    }
}

impl<M> AiClient<M>
where
    M: Manager<Error = RedisAiError>,
    M::Type: Connection,
{
    /// create new client over an existing pool, which may be shared with other clients
    pub fn new_with_pool(pool: Pool<M>) -> Self {
        Self {
            pool,
            active: None,
            pipeline: PipelineState::default(),
        }
    }

    async fn connection<'a>(
        active: &'a mut Option<Object<M>>,
        pool: &Pool<M>,
    ) -> Result<&'a mut Object<M>, RedisAiError> {
        let conn = match active.take() {
            Some(conn) => conn,
            None => pool.get().await?,
        };
        Ok(active.insert(conn))
    }

    /// Forget the active connection after a transport failure, it may hold half written
    /// commands or half read replies
    fn discard_on_transport_error<T>(
        &mut self,
        result: Result<T, RedisAiError>,
    ) -> Result<T, RedisAiError> {
        let transport_failure = matches!(
            result,
            Err(RedisAiError::Io(_) | RedisAiError::Protocol(_) | RedisAiError::Allocation(_))
        );
        if transport_failure {
            tracing::warn!("Dropping connection after transport error");
            if let Some(conn) = self.active.take() {
                let _ = Object::take(conn);
            }
            self.pipeline.clear_outstanding();
            self.pipeline.flushed();
        }
        result
    }

    /// Switch to pipelined mode. Commands are buffered and written to the wire every
    /// `auto_flush_threshold` commands, or never automatically when it is 0
    pub fn enable_pipelining(&mut self, auto_flush_threshold: u32) {
        tracing::debug!(auto_flush_threshold, "Enabling pipelining");
        self.pipeline.enable(auto_flush_threshold);
    }

    /// Flush buffered commands then return to immediate mode. Replies still owed can be
    /// collected with [`AiClient::receive`]
    pub async fn disable_pipelining(&mut self) -> Result<(), RedisAiError> {
        let result = self.flush().await;
        self.pipeline.disable();
        result
    }

    pub fn is_pipelining(&self) -> bool {
        self.pipeline.is_active()
    }

    /// Commands written since the last flush
    pub fn pending(&self) -> u32 {
        self.pipeline.pending()
    }

    /// Replies the server owes for pipelined commands
    pub fn outstanding(&self) -> u32 {
        self.pipeline.outstanding()
    }

    /// Push buffered commands to the wire. A no-op outside pipelined mode
    pub async fn flush(&mut self) -> Result<(), RedisAiError> {
        if !self.pipeline.is_active() {
            return Ok(());
        }
        let Some(conn) = self.active.as_mut() else {
            return Ok(());
        };
        let result = conn.flush().await;
        if result.is_ok() {
            tracing::debug!(pending = self.pipeline.pending(), "Flushed pipeline");
            self.pipeline.flushed();
        }
        self.discard_on_transport_error(result)
    }

    /// Next reply of a pipelined command, in the order the commands were issued.
    ///
    /// Buffered commands are flushed first so the reply can actually arrive. Server error
    /// replies are returned as [`RedisAiError::Server`].
    pub async fn receive(&mut self) -> Result<Reply, RedisAiError> {
        if self.pipeline.outstanding() == 0 {
            return Err(RedisAiError::NothingToReceive);
        }
        let Some(conn) = self.active.as_mut() else {
            return Err(RedisAiError::NothingToReceive);
        };
        let mut result = Ok(());
        if self.pipeline.pending() > 0 {
            result = conn.flush().await;
        }
        let result = match result {
            Ok(()) => {
                self.pipeline.flushed();
                conn.receive().await
            }
            Err(err) => Err(err),
        };
        let reply = self.discard_on_transport_error(result)?;
        self.pipeline.record_receive();
        match reply {
            Reply::Error(message) => Err(RedisAiError::Server(message)),
            reply => Ok(reply),
        }
    }

    /// Flush pending commands and hand the active connection back to the pool
    pub async fn close(&mut self) -> Result<(), RedisAiError> {
        if let Some(conn) = self.active.as_mut() {
            let result = conn.flush().await;
            self.pipeline.flushed();
            self.discard_on_transport_error(result)?;
        }
        if self.pipeline.outstanding() > 0 {
            tracing::warn!(
                outstanding = self.pipeline.outstanding(),
                "Closing with unread pipelined replies"
            );
            // the replies are still on the wire, the connection cannot be reused
            if let Some(conn) = self.active.take() {
                let _ = Object::take(conn);
            }
            self.pipeline.clear_outstanding();
        }
        self.active = None;
        Ok(())
    }

    /// Read and discard replies of pipelined commands nobody received
    async fn drain(&mut self) -> Result<(), RedisAiError> {
        let outstanding = self.pipeline.outstanding();
        if outstanding == 0 {
            return Ok(());
        }
        tracing::warn!(outstanding, "Discarding unread pipelined replies");
        let Some(conn) = self.active.as_mut() else {
            self.pipeline.clear_outstanding();
            return Ok(());
        };
        let mut result = conn.flush().await;
        if result.is_ok() {
            for _ in 0..outstanding {
                if let Err(err) = conn.receive().await {
                    result = Err(err);
                    break;
                }
            }
        }
        self.pipeline.flushed();
        self.pipeline.clear_outstanding();
        self.discard_on_transport_error(result)
    }

    /// Send one command. Returns the reply in immediate mode and None once the command is
    /// queued in pipelined mode
    pub(crate) async fn dispatch(
        &mut self,
        command: Command,
    ) -> Result<Option<Reply>, RedisAiError> {
        tracing::debug!(
            command = %command.name(),
            args = command.args().len(),
            pipelined = self.pipeline.is_active(),
            "Dispatching"
        );
        if self.pipeline.is_active() {
            let conn = Self::connection(&mut self.active, &self.pool).await?;
            let mut result = conn.send(&command).await;
            if result.is_ok() && self.pipeline.record_send() {
                result = conn.flush().await;
                tracing::debug!("Auto flushed pipeline");
                self.pipeline.flushed();
            }
            return self.discard_on_transport_error(result).map(|_| None);
        }
        self.drain().await?;
        let conn = Self::connection(&mut self.active, &self.pool).await?;
        let result = conn.exec(&command).await;
        self.discard_on_transport_error(result).map(Some)
    }
}
