//! Shared helpers for the unit tests
//!
//! Connections are backed by in-memory duplex pipes: the returned stream is
//! the client's end, with the handshake already completed and any scripted
//! reply lines buffered for the server to read.

use crate::net::{PlayerConnection, StreamLineTransport};
use std::future::Future;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncWriteExt, DuplexStream, Lines};

/// A handshaken connection whose client end has `script` queued as replies
pub(crate) async fn scripted_conn(name: &str, script: &[&str]) -> (PlayerConnection, DuplexStream) {
    let (server_side, mut client_side) = tokio::io::duplex(64 * 1024);
    let mut conn = PlayerConnection::new(Box::new(StreamLineTransport::new(server_side)));

    let mut payload = format!("{}\n", name);
    for line in script {
        payload.push_str(line);
        payload.push('\n');
    }
    client_side.write_all(payload.as_bytes()).await.unwrap();

    conn.handshake().await.unwrap();
    assert_eq!(conn.name(), name);
    (conn, client_side)
}

/// A connection whose peer is already gone: it still reports live, and the
/// next I/O attempt marks it dead
pub(crate) async fn doomed_conn(name: &str) -> PlayerConnection {
    let (conn, client_side) = scripted_conn(name, &[]).await;
    drop(client_side);
    conn
}

/// Read lines until one contains `needle`, failing the test after 5 seconds
pub(crate) async fn wait_for_line<R>(lines: &mut Lines<R>, needle: &str) -> String
where
    R: AsyncBufRead + Unpin,
{
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if line.contains(needle) {
                        return line;
                    }
                }
                Ok(None) => panic!("stream ended before a line containing {:?}", needle),
                Err(e) => panic!("read failed while waiting for {:?}: {}", needle, e),
            }
        }
    })
    .await
    .unwrap_or_else(|_| panic!("timed out waiting for a line containing {:?}", needle))
}

/// Poll `cond` until it holds, failing the test after 5 seconds
pub(crate) async fn wait_until<F, Fut>(description: &str, mut cond: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if cond().await {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("timed out waiting until {}", description))
}
