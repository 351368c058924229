mod pipeline_test;

use crate::args::Command;
use crate::client::AiClient;
use crate::conn::Connection;
use crate::error::RedisAiError;
use deadpool::managed::{Manager, Metrics, Pool, RecycleResult};
use redisai_types::reply::Reply;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
pub(crate) struct MockState {
    pub sent: Vec<Command>,
    /// number of sent commands that have reached the "server"
    pub flushed: usize,
    pub flushes: usize,
    pub received: usize,
    pub connections: usize,
    pub replies: VecDeque<Reply>,
    pub fail_next_send: bool,
}

/// In-memory stand-in for a server. Replies are served in the order they were scripted, and
/// only for commands that were flushed; anything unscripted is answered with `OK`
#[derive(Debug, Default, Clone)]
pub(crate) struct MockServer {
    state: Arc<Mutex<MockState>>,
}

impl MockServer {
    pub fn reply(&self, reply: Reply) -> &Self {
        self.state.lock().unwrap().replies.push_back(reply);
        self
    }

    pub fn fail_next_send(&self) {
        self.state.lock().unwrap().fail_next_send = true;
    }

    pub fn sent(&self) -> Vec<Vec<String>> {
        self.state
            .lock()
            .unwrap()
            .sent
            .iter()
            .map(|command| {
                let mut line = vec![command.name().as_str().to_string()];
                line.extend(command.args().to_strings());
                line
            })
            .collect()
    }

    pub fn flushes(&self) -> usize {
        self.state.lock().unwrap().flushes
    }

    pub fn received(&self) -> usize {
        self.state.lock().unwrap().received
    }

    pub fn connections(&self) -> usize {
        self.state.lock().unwrap().connections
    }

    pub fn client(&self) -> AiClient<MockManager> {
        let pool = Pool::builder(MockManager {
            server: self.clone(),
        })
        .max_size(2)
        .build()
        .expect("Could not build mock pool");
        AiClient::new_with_pool(pool)
    }
}

#[derive(Debug)]
pub(crate) struct MockConn {
    server: MockServer,
}

#[async_trait::async_trait]
impl Connection for MockConn {
    async fn send(&mut self, command: &Command) -> Result<(), RedisAiError> {
        let mut state = self.server.state.lock().unwrap();
        if state.fail_next_send {
            state.fail_next_send = false;
            return Err(RedisAiError::Io(std::io::Error::from(
                std::io::ErrorKind::BrokenPipe,
            )));
        }
        state.sent.push(command.clone());
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), RedisAiError> {
        let mut state = self.server.state.lock().unwrap();
        let sent = state.sent.len();
        state.flushed = sent;
        state.flushes += 1;
        Ok(())
    }

    async fn receive(&mut self) -> Result<Reply, RedisAiError> {
        let mut state = self.server.state.lock().unwrap();
        if state.received >= state.flushed {
            return Err(RedisAiError::Protocol(
                "receive would block, nothing was flushed".to_string(),
            ));
        }
        state.received += 1;
        Ok(state
            .replies
            .pop_front()
            .unwrap_or_else(|| Reply::status("OK")))
    }
}

#[derive(Debug)]
pub(crate) struct MockManager {
    server: MockServer,
}

#[async_trait::async_trait]
impl Manager for MockManager {
    type Type = MockConn;
    type Error = RedisAiError;

    async fn create(&self) -> Result<MockConn, RedisAiError> {
        self.server.state.lock().unwrap().connections += 1;
        Ok(MockConn {
            server: self.server.clone(),
        })
    }

    async fn recycle(
        &self,
        _conn: &mut MockConn,
        _metrics: &Metrics,
    ) -> RecycleResult<RedisAiError> {
        Ok(())
    }
}
