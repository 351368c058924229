//! A rust client for the RedisAI module
//!
//! Ships the client, the argument encoder and reply decoder it is built on, and the connection
//! pool plumbing
//!
//! ## Pooling
//!
//! AiConnManager implements deadpool::managed::Manager and so can be used to create a pool of
//! connections shared by several clients, one client per concurrent caller.
//!
//! ```ignore
//! use redisai_client_rs::prelude::*;
//! use deadpool::managed::Pool;
//!
//! let manager = AiConnManager::new(ConnectionConfig::new("127.0.0.1", 6379));
//! let pool = Pool::builder(manager).max_size(10).build().unwrap();
//! let mut client = AiClient::new_with_pool(pool.clone());
//! client.tensor_set("foo", DataType::Float, &[2, 2], vec![1.1f32, 2.2, 3.3, 4.4]).await?;
//! let tensor = client.tensor_get_values("foo").await?;
//! ```
//!
//! ## Pipelining
//!
//! Once pipelining is enabled commands are only written to the connection and return `None`.
//! Buffered commands are flushed every `auto_flush_threshold` commands, explicitly with
//! `flush`, or when pipelining is disabled. Replies are read back in issue order with `receive`.
//!
//! ```ignore
//! use redisai_client_rs::prelude::*;
//!
//! let mut client = AiClient::new(ConnectionConfig::default()).await?;
//! client.enable_pipelining(2);
//! client.tensor_set("a", DataType::Int32, &[2], vec![1i32, 2]).await?;
//! client.tensor_set("b", DataType::Int32, &[2], vec![3i32, 4]).await?;
//! client.disable_pipelining().await?;
//! assert_eq!(client.receive().await?, Reply::status("OK"));
//! assert_eq!(client.receive().await?, Reply::status("OK"));
//! ```
//!
//! ## DAG
//!
//! ```ignore
//! use redisai_client_rs::prelude::*;
//!
//! let mut dag = Dag::new();
//! dag.tensor_set("a", DataType::Float, &[2], Some(&TensorData::from(vec![1f32, 2.0])))?
//!     .model_execute("mymodel", &["a"], &["b"], None)
//!     .tensor_get("b", TensorContentType::Values);
//! let replies = client.dag_run(&[], &[], &dag).await?;
//! ```
pub mod args;
pub mod builders;
mod client;
mod commands;
pub mod config;
pub mod conn;
pub mod converters;
pub mod dag;
pub mod error;
pub mod pipeline;
pub mod reply;

#[cfg(test)]
mod tests;

pub use client::{AiClient, AiConnManager};

pub mod prelude {
    pub use crate::builders::{
        DagExecuteParams, ModelStoreParams, ScriptExecuteParams, ScriptStoreParams,
    };
    pub use crate::client::{AiClient, AiConnManager};
    pub use crate::config::ConnectionConfig;
    pub use crate::dag::Dag;
    pub use crate::error::RedisAiError;
    pub use redisai_types::datatype::{DataType, TensorContentType};
    pub use redisai_types::device::{Backend, Device};
    pub use redisai_types::model::Model;
    pub use redisai_types::reply::Reply;
    pub use redisai_types::script::Script;
    pub use redisai_types::tensor::{Tensor, TensorData};
}
