//! RESP2 framing over a TCP stream
use fallible_collections::FallibleVec;
use futures::future::{BoxFuture, FutureExt};
use redisai_types::reply::Reply;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;

use super::Connection;
use crate::args::Command;
use crate::config::ConnectionConfig;
use crate::error::RedisAiError;

const CRLF: &[u8] = b"\r\n";
// longest status, error or length line we accept
const MAX_LINE_LENGTH: u64 = 64 * 1024;

fn push_bulk(buf: &mut Vec<u8>, bytes: &[u8]) {
    buf.push(b'$');
    buf.extend_from_slice(bytes.len().to_string().as_bytes());
    buf.extend_from_slice(CRLF);
    buf.extend_from_slice(bytes);
    buf.extend_from_slice(CRLF);
}

/// Encode a command as a RESP array of bulk strings
pub fn encode_command(command: &Command) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.push(b'*');
    buf.extend_from_slice((command.args().len() + 1).to_string().as_bytes());
    buf.extend_from_slice(CRLF);
    push_bulk(&mut buf, command.name().as_str().as_bytes());
    for arg in command.args().iter() {
        push_bulk(&mut buf, arg.as_bytes());
    }
    buf
}

async fn read_line<R>(reader: &mut R) -> Result<Vec<u8>, RedisAiError>
where
    R: AsyncBufRead + Unpin + Send,
{
    let mut line = Vec::new();
    let read = (&mut *reader)
        .take(MAX_LINE_LENGTH)
        .read_until(b'\n', &mut line)
        .await?;
    if read == 0 {
        return Err(RedisAiError::Io(std::io::Error::from(
            std::io::ErrorKind::UnexpectedEof,
        )));
    }
    if !line.ends_with(CRLF) {
        return Err(RedisAiError::Protocol(format!(
            "unterminated line {:?}",
            String::from_utf8_lossy(&line)
        )));
    }
    line.truncate(line.len() - CRLF.len());
    Ok(line)
}

fn parse_int(line: &[u8]) -> Result<i64, RedisAiError> {
    std::str::from_utf8(line)
        .ok()
        .and_then(|text| text.parse::<i64>().ok())
        .ok_or_else(|| {
            RedisAiError::Protocol(format!(
                "invalid integer {:?}",
                String::from_utf8_lossy(line)
            ))
        })
}

fn checked_len(len: i64, max_reply_size: usize) -> Result<usize, RedisAiError> {
    let len = usize::try_from(len)
        .map_err(|_| RedisAiError::Protocol(format!("invalid length {len}")))?;
    if len > max_reply_size {
        return Err(RedisAiError::Protocol(format!(
            "reply of length {len} exceeds the configured maximum of {max_reply_size}"
        )));
    }
    Ok(len)
}

/// Read one complete reply, nested arrays included
pub fn read_reply<'a, R>(
    reader: &'a mut R,
    max_reply_size: usize,
) -> BoxFuture<'a, Result<Reply, RedisAiError>>
where
    R: AsyncBufRead + Unpin + Send + 'a,
{
    async move {
        let line = read_line(reader).await?;
        let Some((&kind, rest)) = line.split_first() else {
            return Err(RedisAiError::Protocol("empty reply line".to_string()));
        };
        match kind {
            b'+' => Ok(Reply::Status(String::from_utf8_lossy(rest).into_owned())),
            b'-' => Ok(Reply::Error(String::from_utf8_lossy(rest).into_owned())),
            b':' => Ok(Reply::Int(parse_int(rest)?)),
            b'$' => {
                let len = parse_int(rest)?;
                if len < 0 {
                    return Ok(Reply::Nil);
                }
                let len = checked_len(len, max_reply_size)?;
                let mut data = Vec::new();
                data.try_reserve(len + CRLF.len())
                    .map_err(|err| RedisAiError::Protocol(err.to_string()))?;
                data.resize(len + CRLF.len(), 0u8);
                reader.read_exact(&mut data).await?;
                if !data.ends_with(CRLF) {
                    return Err(RedisAiError::Protocol(
                        "bulk string not terminated by CRLF".to_string(),
                    ));
                }
                data.truncate(len);
                Ok(Reply::Bulk(data))
            }
            b'*' => {
                let len = parse_int(rest)?;
                if len < 0 {
                    return Ok(Reply::Nil);
                }
                let len = checked_len(len, max_reply_size)?;
                let mut items: Vec<Reply> = FallibleVec::try_with_capacity(len)?;
                for _ in 0..len {
                    items.push(read_reply(&mut *reader, max_reply_size).await?);
                }
                Ok(Reply::Array(items))
            }
            other => Err(RedisAiError::Protocol(format!(
                "unknown reply type byte {:?}",
                other as char
            ))),
        }
    }
    .boxed()
}

/// Buffered RESP2 connection to a single server
#[derive(Debug)]
pub struct RedisConn {
    reader: BufReader<OwnedReadHalf>,
    writer: BufWriter<OwnedWriteHalf>,
    max_reply_size: usize,
}

impl RedisConn {
    pub async fn connect(config: &ConnectionConfig) -> Result<Self, RedisAiError> {
        let stream = TcpStream::connect(config.address()).await?;
        stream.set_nodelay(true)?;
        let (read_half, write_half) = stream.into_split();
        Ok(Self {
            reader: BufReader::new(read_half),
            writer: BufWriter::new(write_half),
            max_reply_size: config.max_reply_size,
        })
    }
}

#[async_trait::async_trait]
impl Connection for RedisConn {
    async fn send(&mut self, command: &Command) -> Result<(), RedisAiError> {
        self.writer.write_all(&encode_command(command)).await?;
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), RedisAiError> {
        self.writer.flush().await?;
        Ok(())
    }

    async fn receive(&mut self) -> Result<Reply, RedisAiError> {
        read_reply(&mut self.reader, self.max_reply_size).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::{self, Args, CommandName};
    use pretty_assertions::assert_eq;
    use tokio::net::TcpListener;

    async fn decode(mut input: &[u8]) -> Result<Reply, RedisAiError> {
        read_reply(&mut input, 1024).await
    }

    #[test]
    fn test_encode_command() {
        let mut command_args = Args::new();
        command_args.push("foo").push(vec![0u8, 255]);
        let command = Command::new(CommandName::ModelDel, command_args);
        assert_eq!(
            encode_command(&command),
            b"*3\r\n$11\r\nAI.MODELDEL\r\n$3\r\nfoo\r\n$2\r\n\x00\xff\r\n".to_vec()
        );
    }

    #[tokio::test]
    async fn test_decode_scalars() {
        assert_eq!(decode(b"+OK\r\n").await.unwrap(), Reply::status("OK"));
        assert_eq!(
            decode(b"-ERR no such key\r\n").await.unwrap(),
            Reply::Error("ERR no such key".to_string())
        );
        assert_eq!(decode(b":-42\r\n").await.unwrap(), Reply::Int(-42));
        assert_eq!(decode(b"$-1\r\n").await.unwrap(), Reply::Nil);
        assert_eq!(decode(b"*-1\r\n").await.unwrap(), Reply::Nil);
        assert_eq!(
            decode(b"$4\r\na\r\nb\r\n").await.unwrap(),
            Reply::bulk("a\r\nb")
        );
    }

    #[tokio::test]
    async fn test_decode_nested_array() {
        let reply = decode(b"*4\r\n$5\r\ndtype\r\n$5\r\nFLOAT\r\n$5\r\nshape\r\n*2\r\n:2\r\n:2\r\n")
            .await
            .unwrap();
        assert_eq!(
            reply,
            Reply::Array(vec![
                Reply::bulk("dtype"),
                Reply::bulk("FLOAT"),
                Reply::bulk("shape"),
                Reply::Array(vec![Reply::Int(2), Reply::Int(2)]),
            ])
        );
    }

    #[tokio::test]
    async fn test_decode_rejects_malformed_input() {
        assert!(matches!(
            decode(b"$2048\r\n").await,
            Err(RedisAiError::Protocol(_))
        ));
        assert!(matches!(
            decode(b"?what\r\n").await,
            Err(RedisAiError::Protocol(_))
        ));
        assert!(matches!(
            decode(b"+OK\n").await,
            Err(RedisAiError::Protocol(_))
        ));
        assert!(matches!(decode(b"$3\r\nab").await, Err(RedisAiError::Io(_))));
        assert!(matches!(decode(b"").await, Err(RedisAiError::Io(_))));
    }

    #[tokio::test]
    async fn test_round_trip_over_tcp() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut reader = BufReader::new(stream);
            let first = read_reply(&mut reader, 1024).await.unwrap();
            reader.get_mut().write_all(b"+PONG\r\n").await.unwrap();
            let second = read_reply(&mut reader, 1024).await.unwrap();
            reader.get_mut().write_all(b":1\r\n").await.unwrap();
            (first, second)
        });

        let mut conn = RedisConn::connect(&ConnectionConfig::new("127.0.0.1", port))
            .await
            .unwrap();
        conn.is_conn_valid().await.unwrap();
        conn.send(&args::model_del("m")).await.unwrap();
        conn.flush().await.unwrap();
        assert_eq!(conn.receive().await.unwrap(), Reply::Int(1));

        let (first, second) = server.await.unwrap();
        assert_eq!(first, Reply::Array(vec![Reply::bulk("PING")]));
        assert_eq!(
            second,
            Reply::Array(vec![Reply::bulk("AI.MODELDEL"), Reply::bulk("m")])
        );
    }
}
