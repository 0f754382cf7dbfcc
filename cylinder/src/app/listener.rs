use cylinder_core::DisplayRequest;
use futures::StreamExt;
use log::{debug, info, warn};
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncRead;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::codec::{FramedRead, LinesCodec};

/// Pause before accepting again after a resource error such as EMFILE
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// JSON framing around the message text, in bytes
const LINE_OVERHEAD: usize = 128;

/// Longest line read for a message of `max_message_len` characters.
/// A `\uXXXX` escape takes six bytes per character.
fn max_line_len(max_message_len: usize) -> usize {
    max_message_len.saturating_mul(6).saturating_add(LINE_OVERHEAD)
}

/// Accept TCP connections forever, forwarding every decoded request to `tx`
pub(super) async fn serve_tcp(listener: TcpListener, tx: mpsc::Sender<DisplayRequest>, max_message_len: usize) {
    let listener = Arc::new(listener);
    let accept = move || {
        let listener = Arc::clone(&listener);
        async move { listener.accept().await }
    };
    accept_loop(accept, tx, max_message_len).await
}

/// Accept connections from `accept` until dropped
///
/// Each connection sends newline-delimited JSON objects. Failed accepts are
/// logged and retried. Dropping this future aborts every open connection and
/// with it the last clones of `tx`.
async fn accept_loop<A, F, S>(mut accept: A, tx: mpsc::Sender<DisplayRequest>, max_message_len: usize)
where
    A: FnMut() -> F + Send,
    F: Future<Output = io::Result<(S, SocketAddr)>> + Send,
    S: AsyncRead + Unpin + Send + 'static,
{
    let mut connections = JoinSet::new();

    loop {
        tokio::select! {
            accepted = accept() => match accepted {
                Ok((stream, peer)) => {
                    info!("Accepted message connection from {}", peer);
                    connections.spawn(read_requests(stream, peer, tx.clone(), max_message_len));
                }
                Err(e) if is_connection_error(&e) => {
                    debug!("Connection dropped during accept: {}", e);
                }
                Err(e) => {
                    warn!("Accept failed: {}; retrying in {:?}", e, ACCEPT_BACKOFF);
                    tokio::time::sleep(ACCEPT_BACKOFF).await;
                }
            },
            Some(_) = connections.join_next(), if !connections.is_empty() => {}
        }
    }
}

/// Errors that concern one peer only; the listener itself is fine
fn is_connection_error(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::Interrupted
    )
}

/// Forward requests from one connection until EOF or the queue closes
///
/// An over-long line closes the connection; an over-long message is dropped.
async fn read_requests<R>(stream: R, peer: SocketAddr, tx: mpsc::Sender<DisplayRequest>, max_message_len: usize)
where
    R: AsyncRead + Unpin,
{
    let codec = LinesCodec::new_with_max_length(max_line_len(max_message_len));
    let mut lines = FramedRead::new(stream, codec);

    while let Some(line) = lines.next().await {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!("Closing connection from {}: {}", peer, e);
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let request = match DisplayRequest::from_json(&line) {
            Ok(request) => request,
            Err(e) => {
                warn!("Dropping malformed request from {}: {}", peer, e);
                continue;
            }
        };
        let len = request.message.chars().count();
        if len > max_message_len {
            warn!(
                "Dropping {} character message from {} (limit {})",
                len, peer, max_message_len
            );
            continue;
        }

        debug!("Queued {:?} from {}", request.message, peer);
        if tx.send(request).await.is_err() {
            // Player has shut down
            break;
        }
    }

    info!("Connection from {} closed", peer);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use tokio::io::{AsyncWriteExt, DuplexStream};
    use tokio::net::TcpStream;

    const LIMIT: usize = 256;

    fn peer() -> SocketAddr {
        "127.0.0.1:1".parse().unwrap()
    }

    #[tokio::test]
    async fn test_read_requests_skips_malformed_lines() {
        let input: &[u8] = b"{\"message\":\"HI\",\"color\":\"#f00\"}\n\
                             garbage\n\
                             \n\
                             {\"message\":\"no color\"}\n\
                             {\"message\":\"BYE\",\"color\":\"#00f\"}";
        let (tx, mut rx) = mpsc::channel(8);

        read_requests(input, peer(), tx, LIMIT).await;

        assert_eq!(rx.recv().await, Some(DisplayRequest::new("HI", "#f00")));
        assert_eq!(rx.recv().await, Some(DisplayRequest::new("BYE", "#00f")));
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_read_requests_stops_when_queue_closes() {
        let input: &[u8] = b"{\"message\":\"A\",\"color\":\"#fff\"}\n{\"message\":\"B\",\"color\":\"#fff\"}\n";
        let (tx, rx) = mpsc::channel(1);
        drop(rx);

        // Must return rather than block on the closed queue
        read_requests(input, peer(), tx, LIMIT).await;
    }

    #[tokio::test]
    async fn test_oversized_line_closes_connection() {
        let mut input = b"{\"message\":\"".to_vec();
        input.extend(std::iter::repeat(b'W').take(8 * 1024 * 1024));
        input.extend_from_slice(b"\",\"color\":\"#fff\"}\n{\"message\":\"OK\",\"color\":\"#fff\"}\n");
        let (tx, mut rx) = mpsc::channel(8);

        read_requests(input.as_slice(), peer(), tx, LIMIT).await;

        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_long_message_is_dropped() {
        let long = "W".repeat(LIMIT + 1);
        let exact = "W".repeat(LIMIT);
        let input = format!(
            "{{\"message\":\"{long}\",\"color\":\"#fff\"}}\n\
             {{\"message\":\"{exact}\",\"color\":\"#fff\"}}\n"
        );
        let (tx, mut rx) = mpsc::channel(8);

        read_requests(input.as_bytes(), peer(), tx, LIMIT).await;

        assert_eq!(rx.recv().await, Some(DisplayRequest::new(exact, "#fff")));
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_accept_loop_survives_failed_accepts() {
        let (mut client, server) = tokio::io::duplex(1024);
        let mut script: VecDeque<io::Result<(DuplexStream, SocketAddr)>> = VecDeque::from(vec![
            Err(io::Error::from(io::ErrorKind::ConnectionAborted)),
            Err(io::Error::new(io::ErrorKind::Other, "Too many open files")),
            Ok((server, peer())),
        ]);
        let accept = move || {
            let next = script.pop_front();
            async move {
                match next {
                    Some(result) => result,
                    None => std::future::pending().await,
                }
            }
        };

        let (tx, mut rx) = mpsc::channel(8);
        let server = tokio::spawn(accept_loop(accept, tx, LIMIT));

        client
            .write_all(b"{\"message\":\"STILL HERE\",\"color\":\"#0f0\"}\n")
            .await
            .unwrap();
        assert_eq!(rx.recv().await, Some(DisplayRequest::new("STILL HERE", "#0f0")));

        server.abort();
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_serve_tcp_forwards_requests() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, mut rx) = mpsc::channel(8);
        let server = tokio::spawn(serve_tcp(listener, tx, LIMIT));

        let mut client = TcpStream::connect(addr).await.unwrap();
        client
            .write_all(b"{\"message\":\"Hello\",\"color\":\"#123456\"}\n")
            .await
            .unwrap();

        assert_eq!(rx.recv().await, Some(DisplayRequest::new("Hello", "#123456")));

        server.abort();
        drop(client);
        // Aborting the server drops every sender
        assert_eq!(rx.recv().await, None);
    }

    #[test]
    fn test_line_limit_covers_escaped_message() {
        assert_eq!(max_line_len(256), 256 * 6 + LINE_OVERHEAD);
        assert_eq!(max_line_len(usize::MAX), usize::MAX);
    }
}
