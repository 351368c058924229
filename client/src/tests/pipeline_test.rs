use super::MockServer;
use crate::client::AiClient;
use crate::config::ConnectionConfig;
use crate::conn::read_reply;
use crate::error::RedisAiError;
use pretty_assertions::assert_eq;
use redisai_types::datatype::DataType;
use redisai_types::reply::Reply;
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

#[tokio::test]
async fn test_threshold_triggers_exactly_one_flush() {
    let server = MockServer::default();
    let mut client = server.client();
    client.enable_pipelining(3);

    for key in ["a", "b"] {
        let queued = client
            .tensor_set(key, DataType::Int32, &[1], vec![1i32])
            .await
            .expect("Could not queue command");
        assert_eq!(queued, None);
    }
    assert_eq!(server.flushes(), 0);
    assert_eq!(client.pending(), 2);

    client
        .tensor_set("c", DataType::Int32, &[1], vec![1i32])
        .await
        .expect("Could not queue command");
    assert_eq!(server.flushes(), 1);
    assert_eq!(client.pending(), 0);
    assert_eq!(client.outstanding(), 3);
}

#[tokio::test]
async fn test_zero_threshold_only_flushes_on_request() {
    let server = MockServer::default();
    let mut client = server.client();
    client.enable_pipelining(0);
    for _ in 0..10 {
        client.model_del("m").await.expect("Could not queue command");
    }
    assert_eq!(server.flushes(), 0);
    client.flush().await.expect("Could not flush");
    assert_eq!(server.flushes(), 1);
    assert_eq!(client.pending(), 0);
}

#[tokio::test]
async fn test_disable_flushes_pending_commands() {
    let server = MockServer::default();
    let mut client = server.client();
    client.enable_pipelining(10);
    client.model_del("a").await.expect("Could not queue command");
    client.model_del("b").await.expect("Could not queue command");
    assert_eq!(server.flushes(), 0);

    client
        .disable_pipelining()
        .await
        .expect("Could not disable pipelining");
    assert_eq!(server.flushes(), 1);
    assert_eq!(client.pending(), 0);
    assert!(!client.is_pipelining());

    // owed replies can still be collected in immediate mode
    assert_eq!(client.receive().await.unwrap(), Reply::status("OK"));
    assert_eq!(client.receive().await.unwrap(), Reply::status("OK"));
    assert!(matches!(
        client.receive().await,
        Err(RedisAiError::NothingToReceive)
    ));
}

#[tokio::test]
async fn test_receive_in_issue_order() {
    let server = MockServer::default();
    server
        .reply(Reply::Int(1))
        .reply(Reply::Error("ERR model not found".to_string()))
        .reply(Reply::Int(3));
    let mut client = server.client();
    client.enable_pipelining(0);
    for key in ["a", "b", "c"] {
        client.model_del(key).await.expect("Could not queue command");
    }
    // receive pushes buffered commands out first
    assert_eq!(client.receive().await.unwrap(), Reply::Int(1));
    assert_eq!(server.flushes(), 1);
    assert!(matches!(
        client.receive().await,
        Err(RedisAiError::Server(message)) if message == "ERR model not found"
    ));
    assert_eq!(client.receive().await.unwrap(), Reply::Int(3));
    assert_eq!(server.flushes(), 1);
}

#[tokio::test]
async fn test_receive_in_immediate_mode() {
    let server = MockServer::default();
    let mut client = server.client();
    assert!(matches!(
        client.receive().await,
        Err(RedisAiError::NothingToReceive)
    ));
    assert_eq!(client.model_del("m").await.unwrap(), Some(()));
    assert!(matches!(
        client.receive().await,
        Err(RedisAiError::NothingToReceive)
    ));
    // flush outside pipelining touches nothing
    client.flush().await.unwrap();
    assert_eq!(server.flushes(), 1);
}

#[tokio::test]
async fn test_immediate_command_drains_unread_replies() {
    let server = MockServer::default();
    server
        .reply(Reply::status("OK"))
        .reply(Reply::status("OK"))
        .reply(Reply::Int(7));
    let mut client = server.client();
    client.enable_pipelining(0);
    client.model_del("a").await.unwrap();
    client.model_del("b").await.unwrap();
    client.disable_pipelining().await.unwrap();

    let info = client.info("m").await;
    // the third scripted reply answers AI.INFO, the first two were discarded
    assert!(matches!(
        info,
        Err(RedisAiError::UnexpectedReplyType {
            step: "AI.INFO",
            ..
        })
    ));
    assert_eq!(server.received(), 3);
    assert_eq!(client.outstanding(), 0);
}

#[tokio::test]
async fn test_transport_error_discards_connection() {
    let server = MockServer::default();
    let mut client = server.client();
    client.model_del("a").await.unwrap();
    assert_eq!(server.connections(), 1);

    server.fail_next_send();
    assert!(matches!(
        client.model_del("b").await,
        Err(RedisAiError::Io(_))
    ));
    client.model_del("c").await.unwrap();
    assert_eq!(server.connections(), 2);
}

#[tokio::test]
async fn test_unallocatable_reply_discards_connection() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let server = tokio::spawn(async move {
        let mut streams = Vec::new();
        for reply in [&b"*1000000000000000\r\n:5\r\n"[..], &b"+OK\r\n"[..]] {
            let (stream, _) = listener.accept().await.unwrap();
            let mut reader = BufReader::new(stream);
            read_reply(&mut reader, 1024).await.unwrap();
            reader.get_mut().write_all(reply).await.unwrap();
            streams.push(reader);
        }
        streams
    });

    let config = ConnectionConfig {
        max_pool_size: 1,
        max_reply_size: usize::MAX,
        ..ConnectionConfig::new("127.0.0.1", port)
    };
    let mut client = AiClient::new(config).await.unwrap();
    assert!(matches!(
        client.model_del("a").await,
        Err(RedisAiError::Allocation(_))
    ));
    // the leftover `:5` of the first reply must not answer this one
    assert_eq!(client.model_del("b").await.unwrap(), Some(()));
    server.await.unwrap();
}

#[tokio::test]
async fn test_close_flushes_and_forgets_replies() {
    let server = MockServer::default();
    let mut client = server.client();
    client.enable_pipelining(0);
    client.model_del("a").await.unwrap();
    client.close().await.expect("Could not close client");
    assert_eq!(server.flushes(), 1);
    assert_eq!(client.outstanding(), 0);
    assert_eq!(
        server.sent(),
        vec![vec!["AI.MODELDEL".to_string(), "a".to_string()]]
    );
}
