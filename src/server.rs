//! Statistics server
//!
//! TCP front end for [`StatsCommandExecutor`]. Accepts RESP arrays (as sent
//! by redis clients) and inline commands (for telnet/nc), and answers every
//! command with one JSON document followed by `\n`. Pipelined commands are
//! answered in order with a single write per read.

use crate::stats::{render_reply, StatsCommand, StatsCommandExecutor, StatsError};
use bytes::BytesMut;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, warn};

/// Largest bulk string a client may send (Redis `proto-max-bulk-len`)
pub const MAX_BULK_LEN: usize = 512 * 1024 * 1024;

/// Largest number of arguments in one RESP array
pub const MAX_ARRAY_LEN: usize = 1024 * 1024;

#[derive(Debug, PartialEq, Eq)]
pub enum FrameError {
    Incomplete,
    Invalid(String),
}

/// Accept connections forever
pub async fn run_server(
    listener: TcpListener,
    executor: Arc<StatsCommandExecutor>,
) -> std::io::Result<()> {
    info!("Statistics server listening on {}", listener.local_addr()?);

    loop {
        match listener.accept().await {
            Ok((stream, peer_addr)) => {
                let executor = Arc::clone(&executor);
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, executor, peer_addr).await {
                        error!("Connection error from {}: {}", peer_addr, e);
                    }
                });
            }
            Err(e) => {
                error!("Accept error: {}", e);
            }
        }
    }
}

/// Handle a single client connection
async fn handle_connection(
    mut stream: TcpStream,
    executor: Arc<StatsCommandExecutor>,
    peer_addr: SocketAddr,
) -> std::io::Result<()> {
    debug!("Client connected: {}", peer_addr);
    stream.set_nodelay(true)?;

    let mut buffer = BytesMut::with_capacity(8192);
    let mut read_buf = [0u8; 4096];

    loop {
        let n = stream.read(&mut read_buf).await?;
        if n == 0 {
            debug!("Client disconnected: {}", peer_addr);
            break;
        }

        buffer.extend_from_slice(&read_buf[..n]);

        let mut response_buffer = Vec::new();
        let mut commands_processed = 0;

        loop {
            match parse_frame(&buffer) {
                Ok((args, consumed)) => {
                    let _ = buffer.split_to(consumed);
                    if args.is_empty() {
                        continue;
                    }

                    let result = match StatsCommand::parse(&args) {
                        Ok(cmd) => executor.execute(cmd).await,
                        Err(e) => Err(e),
                    };
                    if let Err(StatsError::StoreUnavailable(e)) = &result {
                        warn!("Command from {} failed: {}", peer_addr, e);
                    }

                    response_buffer.extend_from_slice(render_reply(&result).as_bytes());
                    response_buffer.push(b'\n');
                    commands_processed += 1;
                }
                Err(FrameError::Incomplete) => break,
                Err(FrameError::Invalid(msg)) => {
                    warn!("Protocol error from {}: {}", peer_addr, msg);
                    let reply = render_reply(&Err(StatsError::InvalidArgument(msg)));
                    response_buffer.extend_from_slice(reply.as_bytes());
                    response_buffer.push(b'\n');
                    buffer.clear();
                    break;
                }
            }
        }

        if !response_buffer.is_empty() {
            stream.write_all(&response_buffer).await?;
            stream.flush().await?;
            debug!("Processed {} commands from {}", commands_processed, peer_addr);
        }
    }

    Ok(())
}

/// Split one command off the front of the buffer
///
/// Returns the arguments and the number of bytes consumed. A blank inline
/// line yields no arguments.
pub fn parse_frame(buffer: &[u8]) -> Result<(Vec<String>, usize), FrameError> {
    if buffer.starts_with(b"*") {
        return parse_resp_array(buffer);
    }
    parse_inline(buffer)
}

fn parse_resp_array(buffer: &[u8]) -> Result<(Vec<String>, usize), FrameError> {
    let first_crlf = find_crlf(buffer, 0).ok_or(FrameError::Incomplete)?;
    let array_count: usize = parse_decimal(&buffer[1..first_crlf])
        .ok_or_else(|| FrameError::Invalid("Invalid array count".to_string()))?;
    if array_count > MAX_ARRAY_LEN {
        return Err(FrameError::Invalid(format!(
            "Array of {} arguments exceeds limit of {}",
            array_count, MAX_ARRAY_LEN
        )));
    }

    // Declared counts are untrusted until the data arrives
    let mut args = Vec::with_capacity(array_count.min(16));
    let mut pos = first_crlf + 2;

    for _ in 0..array_count {
        if pos >= buffer.len() {
            return Err(FrameError::Incomplete);
        }
        if buffer[pos] != b'$' {
            return Err(FrameError::Invalid("Expected bulk string".to_string()));
        }

        let len_end = find_crlf(buffer, pos).ok_or(FrameError::Incomplete)?;
        let len: usize = parse_decimal(&buffer[pos + 1..len_end])
            .ok_or_else(|| FrameError::Invalid("Invalid bulk string length".to_string()))?;
        if len > MAX_BULK_LEN {
            return Err(FrameError::Invalid(format!(
                "Bulk string of {} bytes exceeds limit of {}",
                len, MAX_BULK_LEN
            )));
        }

        let data_start = len_end + 2;
        let (data_end, frame_end) = data_start
            .checked_add(len)
            .and_then(|end| end.checked_add(2).map(|frame_end| (end, frame_end)))
            .ok_or_else(|| FrameError::Invalid("Invalid bulk string length".to_string()))?;
        if frame_end > buffer.len() {
            return Err(FrameError::Incomplete);
        }
        if &buffer[data_end..frame_end] != b"\r\n" {
            return Err(FrameError::Invalid(
                "Bulk string length does not match its data".to_string(),
            ));
        }

        let arg = std::str::from_utf8(&buffer[data_start..data_end])
            .map_err(|_| FrameError::Invalid("Invalid UTF-8".to_string()))?;
        args.push(arg.to_string());
        pos = frame_end;
    }

    Ok((args, pos))
}

/// Inline command terminated by `\n` (an optional preceding `\r` is dropped)
fn parse_inline(buffer: &[u8]) -> Result<(Vec<String>, usize), FrameError> {
    let newline = buffer
        .iter()
        .position(|&b| b == b'\n')
        .ok_or(FrameError::Incomplete)?;
    let line = std::str::from_utf8(&buffer[..newline])
        .map_err(|_| FrameError::Invalid("Invalid UTF-8".to_string()))?;

    let args = line.split_whitespace().map(String::from).collect();
    Ok((args, newline + 1))
}

fn find_crlf(buffer: &[u8], from: usize) -> Option<usize> {
    buffer[from..]
        .windows(2)
        .position(|w| w == b"\r\n")
        .map(|i| i + from)
}

fn parse_decimal(digits: &[u8]) -> Option<usize> {
    std::str::from_utf8(digits).ok()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_inline() {
        let (args, consumed) = parse_frame(b"REGION CAI\r\nPING\r\n").unwrap();
        assert_eq!(args, vec!["REGION", "CAI"]);
        assert_eq!(consumed, 12);

        let (args, consumed) = parse_frame(b"PING\n").unwrap();
        assert_eq!(args, vec!["PING"]);
        assert_eq!(consumed, 5);
    }

    #[test]
    fn test_parse_inline_incomplete() {
        assert_eq!(parse_frame(b"REGION CA"), Err(FrameError::Incomplete));
    }

    #[test]
    fn test_parse_blank_line() {
        let (args, consumed) = parse_frame(b"\r\n").unwrap();
        assert!(args.is_empty());
        assert_eq!(consumed, 2);
    }

    #[test]
    fn test_parse_resp_with_spaces_in_argument() {
        let frame = b"*2\r\n$3\r\nORG\r\n$13\r\nAl Wafd Party\r\n";
        let (args, consumed) = parse_frame(frame).unwrap();
        assert_eq!(args, vec!["ORG", "Al Wafd Party"]);
        assert_eq!(consumed, frame.len());
    }

    #[test]
    fn test_parse_resp_utf8_argument() {
        let name = "مستقل";
        let frame = format!("*2\r\n$3\r\nORG\r\n${}\r\n{}\r\n", name.len(), name);
        let (args, _) = parse_frame(frame.as_bytes()).unwrap();
        assert_eq!(args[1], name);
    }

    #[test]
    fn test_parse_resp_incomplete() {
        assert_eq!(
            parse_frame(b"*2\r\n$3\r\nORG\r\n$13\r\nAl Wa"),
            Err(FrameError::Incomplete)
        );
        assert_eq!(parse_frame(b"*2\r\n"), Err(FrameError::Incomplete));
    }

    #[test]
    fn test_parse_resp_invalid() {
        assert!(matches!(
            parse_frame(b"*x\r\n"),
            Err(FrameError::Invalid(_))
        ));
        assert!(matches!(
            parse_frame(b"*1\r\n:3\r\n"),
            Err(FrameError::Invalid(_))
        ));
    }

    #[test]
    fn test_parse_resp_oversized_lengths_rejected() {
        // usize::MAX would overflow the end offset
        let frame = b"*1\r\n$18446744073709551615\r\nPING\r\n0123456789";
        assert!(matches!(parse_frame(frame), Err(FrameError::Invalid(_))));

        let frame = format!("*1\r\n${}\r\nPING\r\n", MAX_BULK_LEN + 1);
        assert!(matches!(
            parse_frame(frame.as_bytes()),
            Err(FrameError::Invalid(_))
        ));

        let frame = format!("*{}\r\n$4\r\nPING\r\n", MAX_ARRAY_LEN + 1);
        assert!(matches!(
            parse_frame(frame.as_bytes()),
            Err(FrameError::Invalid(_))
        ));

        // Declared count far above what was sent only waits for more data
        assert_eq!(
            parse_frame(b"*1000000\r\n$4\r\nPING\r\n"),
            Err(FrameError::Incomplete)
        );
    }

    #[test]
    fn test_parse_resp_length_mismatch_rejected() {
        assert!(matches!(
            parse_frame(b"*1\r\n$2\r\nPING\r\n"),
            Err(FrameError::Invalid(_))
        ));
    }
}
