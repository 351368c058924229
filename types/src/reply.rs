/// A single server reply as delivered by the transport.
///
/// Mirrors the RESP2 value kinds; bulk strings stay raw bytes since tensor blobs travel as bulk
/// strings too
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Nil,
    Status(String),
    Error(String),
    Int(i64),
    Bulk(Vec<u8>),
    Array(Vec<Reply>),
}

impl Reply {
    pub fn status(input: impl Into<String>) -> Self {
        Self::Status(input.into())
    }

    pub fn bulk(input: impl AsRef<[u8]>) -> Self {
        Self::Bulk(input.as_ref().to_vec())
    }

    /// Name of the reply kind, used in decode errors
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Nil => "nil",
            Self::Status(_) => "status",
            Self::Error(_) => "error",
            Self::Int(_) => "integer",
            Self::Bulk(_) => "bulk string",
            Self::Array(_) => "array",
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }

    /// Text of status and bulk replies
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Status(text) => Some(text),
            Self::Bulk(bytes) => std::str::from_utf8(bytes).ok(),
            _ => None,
        }
    }
}
