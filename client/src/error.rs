use deadpool::managed::PoolError;
use fallible_collections::TryReserveError;
use redisai_types::datatype::DataType;
use redisai_types::errors::TypeError;
use std::convert::Infallible;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RedisAiError {
    // encoding, raised before anything is written to a connection
    #[error("Tensor declared as {declared} but data holds {actual} elements")]
    DataTypeMismatch {
        declared: DataType,
        actual: DataType,
    },
    #[error("Tensor shape implies {expected} {unit} but payload holds {actual}")]
    ShapeMismatch {
        expected: usize,
        actual: usize,
        unit: &'static str,
    },
    #[error("Missing required field {0}")]
    MissingField(&'static str),
    #[error("Invalid argument {0}")]
    InvalidArgument(String),
    #[error("{0}")]
    Type(#[from] TypeError),

    // transport
    #[error("IO Error {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid URI {0}")]
    InvalidURI(#[from] http::uri::InvalidUri),
    #[error("Pool error {0}")]
    Pool(String),
    #[error("Protocol error {0}")]
    Protocol(String),
    #[error("Could not allocate reply buffer {0:?}")]
    Allocation(TryReserveError),

    // reply shape
    #[error("{step}: reply has incorrect sizing, expected {expected} got {actual}")]
    ReplySize {
        step: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("{step}: unexpected reply type, expected {expected} got {actual}")]
    UnexpectedReplyType {
        step: &'static str,
        expected: &'static str,
        actual: &'static str,
    },
    #[error("{0}: nil returned")]
    NilReply(&'static str),
    #[error("{step}: value {value} does not fit into {target}")]
    OutOfRange {
        step: &'static str,
        value: i64,
        target: &'static str,
    },
    #[error("{step}: could not parse {value:?}")]
    ParseValue { step: &'static str, value: String },

    #[error("Server error {0}")]
    Server(String),

    #[error("No pipelined reply left to receive")]
    NothingToReceive,
}

impl From<PoolError<RedisAiError>> for RedisAiError {
    fn from(input: PoolError<RedisAiError>) -> Self {
        match input {
            PoolError::Backend(err) => err,
            other => Self::Pool(other.to_string()),
        }
    }
}

impl From<TryReserveError> for RedisAiError {
    fn from(input: TryReserveError) -> Self {
        Self::Allocation(input)
    }
}

impl From<Infallible> for RedisAiError {
    fn from(input: Infallible) -> Self {
        match input {}
    }
}
