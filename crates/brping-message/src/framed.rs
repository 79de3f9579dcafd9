//! `tokio_util::codec` adapter driving the byte parser.

use bytes::{Buf, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::codec::Codec;
use crate::error::CodecError;
use crate::message::Message;
use crate::parser::{ParseStatus, Parser};

/// Decodes verified messages from, and encodes messages into, a framed async stream.
///
/// Every input byte is consumed by the same [`Parser`] used for blocking
/// streams; rejected frames are logged and skipped.
#[derive(Debug, Default)]
pub struct PingCodec {
    parser: Parser,
}

impl PingCodec {
    pub fn new(parser: Parser) -> Self {
        Self { parser }
    }

    pub fn parser(&self) -> &Parser {
        &self.parser
    }

    fn codec(&self) -> &Codec {
        self.parser.codec()
    }
}

impl Decoder for PingCodec {
    type Item = Message;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Message>, CodecError> {
        let mut consumed = 0usize;
        let mut decoded = None;

        for &byte in src.iter() {
            consumed += 1;
            match self.parser.feed(byte) {
                ParseStatus::NewMessage => {
                    decoded = self.parser.last_message().cloned();
                    break;
                }
                ParseStatus::ParseError => {
                    if let Some(err) = self.parser.last_error() {
                        tracing::warn!(error = %err, "skipping corrupt frame");
                    }
                }
                ParseStatus::Pending(_) => {}
            }
        }

        src.advance(consumed);
        Ok(decoded)
    }
}

impl Encoder<&Message> for PingCodec {
    type Error = CodecError;

    fn encode(&mut self, item: &Message, dst: &mut BytesMut) -> Result<(), CodecError> {
        self.codec().encode_into(item, None, dst)
    }
}
