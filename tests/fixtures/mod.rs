//! Test fixtures and helpers for integration testing

use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;

/// One scripted participant talking to a live coordinator over TCP
pub struct TestClient {
    reader: Lines<BufReader<OwnedReadHalf>>,
    writer: Option<OwnedWriteHalf>,
}

impl TestClient {
    /// Connect and submit a display name for the handshake
    pub async fn connect(addr: SocketAddr, name: &str) -> Self {
        let stream = TcpStream::connect(addr).await.expect("connect failed");
        stream.set_nodelay(true).expect("set_nodelay failed");

        let (read_half, write_half) = stream.into_split();
        let mut client = Self {
            reader: BufReader::new(read_half).lines(),
            writer: Some(write_half),
        };
        client.send(name).await;
        client
    }

    /// Send one reply line
    pub async fn send(&mut self, line: &str) {
        let writer = self.writer.as_mut().expect("write side already closed");
        writer
            .write_all(format!("{}\n", line).as_bytes())
            .await
            .expect("send failed");
    }

    /// Read lines until one contains `needle`, failing the test after 5 seconds
    pub async fn expect(&mut self, needle: &str) -> String {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                match self.reader.next_line().await {
                    Ok(Some(line)) => {
                        if line.contains(needle) {
                            return line;
                        }
                    }
                    Ok(None) => panic!("server closed the stream before {:?}", needle),
                    Err(e) => panic!("read failed while waiting for {:?}: {}", needle, e),
                }
            }
        })
        .await
        .unwrap_or_else(|_| panic!("timed out waiting for a line containing {:?}", needle))
    }

    /// Close the client-to-server direction, keeping the reader alive.
    /// The coordinator sees end-of-stream on its next read.
    pub fn hang_up(&mut self) {
        self.writer = None;
    }

    /// Drain lines until the server closes the stream
    pub async fn expect_end_of_stream(&mut self) {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                match self.reader.next_line().await {
                    Ok(Some(_)) => continue,
                    Ok(None) | Err(_) => return,
                }
            }
        })
        .await
        .expect("timed out waiting for the server to close the stream")
    }
}
