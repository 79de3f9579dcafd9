use std::io::{ErrorKind, Write};

use bytes::BytesMut;

use crate::codec::Codec;
use crate::error::{CodecError, Result};
use crate::message::Message;

const INITIAL_BUFFER_CAPACITY: usize = 256;

/// Writes complete message frames to any `Write` stream.
pub struct MessageWriter<T> {
    inner: T,
    codec: Codec,
    buf: BytesMut,
}

impl<T: Write> MessageWriter<T> {
    /// Create a writer over the built-in Ping1D table.
    pub fn new(inner: T) -> Self {
        Self::with_codec(inner, Codec::ping1d())
    }

    /// Create a writer with an explicit codec.
    pub fn with_codec(inner: T, codec: Codec) -> Self {
        Self {
            inner,
            codec,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
        }
    }

    /// Encode and send a message (blocking).
    pub fn send(&mut self, message: &Message) -> Result<()> {
        self.send_as(message, None)
    }

    /// Encode and send a message, optionally under a request id.
    pub fn send_as(&mut self, message: &Message, request_id: Option<u16>) -> Result<()> {
        self.buf.clear();
        self.codec.encode_into(message, request_id, &mut self.buf)?;
        self.write_buffered()
    }

    /// Ask the device to send a message of type `requested_id`.
    pub fn send_request(&mut self, requested_id: u16) -> Result<()> {
        let request = self.codec.request(requested_id)?;
        self.buf.clear();
        self.buf.extend_from_slice(&request);
        self.write_buffered()
    }

    fn write_buffered(&mut self) -> Result<()> {
        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]) {
                Ok(0) => return Err(CodecError::ConnectionClosed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(CodecError::Io(err)),
            }
        }

        self.flush()
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(CodecError::Io(err)),
            }
        }
    }

    pub fn codec(&self) -> &Codec {
        &self.codec
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }
}
