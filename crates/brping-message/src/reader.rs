use std::io::{ErrorKind, Read};

use bytes::{Buf, BytesMut};

use crate::error::{CodecError, Result};
use crate::message::Message;
use crate::parser::{ParseStatus, Parser};

const READ_CHUNK_SIZE: usize = 1024;

/// Reads verified messages from any `Read` byte stream.
///
/// Bytes are pushed through a [`Parser`] one at a time; frames that fail to
/// decode or verify are logged and skipped.
pub struct MessageReader<T> {
    inner: T,
    parser: Parser,
    buf: BytesMut,
}

impl<T: Read> MessageReader<T> {
    /// Create a reader over the built-in Ping1D table.
    pub fn new(inner: T) -> Self {
        Self::with_parser(inner, Parser::default())
    }

    /// Create a reader with an explicit parser (registry and limits).
    pub fn with_parser(inner: T, parser: Parser) -> Self {
        Self {
            inner,
            parser,
            buf: BytesMut::with_capacity(READ_CHUNK_SIZE),
        }
    }

    /// Read the next valid message (blocking).
    ///
    /// Returns `Err(CodecError::ConnectionClosed)` when EOF is reached.
    pub fn read_message(&mut self) -> Result<Message> {
        loop {
            while self.buf.has_remaining() {
                let byte = self.buf.get_u8();
                match self.parser.feed(byte) {
                    ParseStatus::NewMessage => {
                        if let Some(message) = self.parser.last_message() {
                            return Ok(message.clone());
                        }
                    }
                    ParseStatus::ParseError => {
                        if let Some(err) = self.parser.last_error() {
                            tracing::warn!(error = %err, errors = self.parser.errors(), "skipping corrupt frame");
                        }
                    }
                    ParseStatus::Pending(_) => {}
                }
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(CodecError::Io(err)),
            };

            if read == 0 {
                return Err(CodecError::ConnectionClosed);
            }

            self.buf.extend_from_slice(&chunk[..read]);
        }
    }

    /// The parser driving this reader, for counters and the last message.
    pub fn parser(&self) -> &Parser {
        &self.parser
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: Read> Iterator for MessageReader<T> {
    type Item = Result<Message>;

    /// Yields messages until EOF.
    fn next(&mut self) -> Option<Self::Item> {
        match self.read_message() {
            Ok(message) => Some(Ok(message)),
            Err(CodecError::ConnectionClosed) => None,
            Err(err) => Some(Err(err)),
        }
    }
}
