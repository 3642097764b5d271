use log::warn;
use smol::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader as AsyncBufReader};
use smol::net::TcpStream as AsyncTcpStream;
use std::cell::RefCell;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpStream;

/// Longest line accepted from the other end, newline included. Anything longer is treated
/// as a dropped connection.
pub const MAX_LINE_LENGTH: usize = 4096;

/// A read that ran out of room before reaching a newline.
fn overflowed(bytes: &[u8]) -> bool {
    bytes.len() >= MAX_LINE_LENGTH && bytes.last() != Some(&b'\n')
}

/// Trimmed text of a raw line, `None` when blank.
fn decode(bytes: &[u8]) -> Option<String> {
    let line = String::from_utf8_lossy(bytes);
    let line = line.trim();
    (!line.is_empty()).then(|| line.to_string())
}

/// Blocking line transport used by the terminal clients.
pub struct LineStream<'a> {
    inner: &'a TcpStream,
    reader: RefCell<BufReader<&'a TcpStream>>,
}

impl<'a> LineStream<'a> {
    pub fn new(inner: &'a TcpStream) -> Self {
        Self {
            inner,
            reader: RefCell::new(BufReader::new(inner)),
        }
    }

    /// Next non-empty line, trimmed; `None` once the connection is gone or the line is too long.
    pub fn read_line(&self) -> Option<String> {
        let mut reader = self.reader.borrow_mut();
        let mut bytes = Vec::new();
        loop {
            bytes.clear();
            match (&mut *reader).take(MAX_LINE_LENGTH as u64).read_until(b'\n', &mut bytes) {
                Err(_) | Ok(0) => return None,
                Ok(_) if overflowed(&bytes) => {
                    warn!("line longer than {MAX_LINE_LENGTH} bytes, closing");
                    return None;
                }
                Ok(_) => {}
            }

            if let Some(line) = decode(&bytes) {
                return Some(line);
            }
        }
    }

    pub fn write_line(&self, mut line: String) -> Result<(), std::io::Error> {
        let mut inner = self.inner;
        line.push('\n');
        inner.write_all(line.as_bytes())?;
        inner.flush()
    }
}

pub struct AsyncLineStream {
    inner: AsyncTcpStream,
    reader: AsyncBufReader<AsyncTcpStream>,
    pending: Vec<u8>,
}

impl AsyncLineStream {
    pub fn new(inner: AsyncTcpStream) -> Self {
        Self {
            reader: AsyncBufReader::new(inner.clone()),
            inner,
            pending: Vec::new(),
        }
    }

    /// Same contract as [`LineStream::read_line`]. Safe to drop mid-line: bytes already
    /// consumed stay in `pending` for the next call.
    pub async fn read_line(&mut self) -> Option<String> {
        loop {
            let room = MAX_LINE_LENGTH.saturating_sub(self.pending.len()) as u64;
            match (&mut self.reader).take(room).read_until(b'\n', &mut self.pending).await {
                Err(_) | Ok(0) => return None,
                Ok(_) if overflowed(&self.pending) => {
                    warn!("line longer than {MAX_LINE_LENGTH} bytes, closing");
                    return None;
                }
                Ok(_) => {}
            }

            let bytes = std::mem::take(&mut self.pending);
            if let Some(line) = decode(&bytes) {
                return Some(line);
            }
        }
    }

    pub async fn write_line(&mut self, mut line: String) -> Result<(), std::io::Error> {
        line.push('\n');
        self.inner.write_all(line.as_bytes()).await?;
        self.inner.flush().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smol::net::TcpListener;

    async fn connected() -> (AsyncLineStream, AsyncLineStream) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let client = AsyncTcpStream::connect(listener.local_addr().unwrap()).await.unwrap();
        let (server, _) = listener.accept().await.unwrap();
        (AsyncLineStream::new(server), AsyncLineStream::new(client))
    }

    #[test]
    fn blank_lines_are_skipped() {
        smol::block_on(async {
            let (mut server, mut client) = connected().await;
            client.write_line("   ".to_string()).await.unwrap();
            client.write_line(" 2 5 3 4 \r".to_string()).await.unwrap();
            assert_eq!(server.read_line().await.as_deref(), Some("2 5 3 4"));
        });
    }

    #[test]
    fn endless_lines_count_as_a_disconnect() {
        smol::block_on(async {
            let (mut server, mut client) = connected().await;
            client.write_line("x".repeat(MAX_LINE_LENGTH - 1)).await.unwrap();
            assert_eq!(server.read_line().await.map(|line| line.len()), Some(MAX_LINE_LENGTH - 1));

            client.write_line("x".repeat(MAX_LINE_LENGTH * 2)).await.unwrap();
            assert_eq!(server.read_line().await, None);
            assert_eq!(server.read_line().await, None);
        });
    }

    #[test]
    fn blocking_reader_caps_lines_too() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let client = TcpStream::connect(listener.local_addr().unwrap()).unwrap();
        let (server, _) = listener.accept().unwrap();

        let writer = LineStream::new(&client);
        writer.write_line("CHAT hello".to_string()).unwrap();
        writer.write_line("y".repeat(MAX_LINE_LENGTH)).unwrap();

        let reader = LineStream::new(&server);
        assert_eq!(reader.read_line().as_deref(), Some("CHAT hello"));
        assert_eq!(reader.read_line(), None);
    }
}
