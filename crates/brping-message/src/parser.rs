use bytes::{BufMut, Bytes, BytesMut};

use crate::codec::Codec;
use crate::error::CodecError;
use crate::header::{CHECKSUM_LENGTH, HEADER_LENGTH, MAGIC};
use crate::message::Message;

/// Position of the parser within the frame currently being rebuilt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    /// Waiting for the first magic byte 'B'.
    WaitStart,
    /// Waiting for the second magic byte 'R'.
    WaitHeader,
    WaitLengthLow,
    WaitLengthHigh,
    WaitIdLow,
    WaitIdHigh,
    WaitSrc,
    WaitDst,
    /// Consuming payload bytes until the declared length is exhausted.
    WaitPayload,
    WaitChecksumLow,
    /// The next byte completes the frame.
    WaitChecksumHigh,
}

/// Outcome of feeding one byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStatus {
    /// The byte completed a checksum-verified message; see [`Parser::last_message`].
    NewMessage,
    /// The byte completed a frame that failed to decode or verify; see [`Parser::last_error`].
    ParseError,
    /// The frame is still incomplete; the parser is now in this state.
    Pending(ParseState),
}

/// Streaming parser configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserConfig {
    /// Declared payload lengths above this are treated as line noise and
    /// dropped without counting an error. Default: no limit.
    pub max_payload_length: u16,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_payload_length: u16::MAX,
        }
    }
}

/// Rebuilds frames from a byte stream, one byte at a time.
///
/// Each byte drives exactly one state transition. A bad second magic byte
/// restarts the search from the next byte. A completed frame is decoded and
/// verified, then the parser returns to [`ParseState::WaitStart`] whatever the
/// outcome, so it never gets stuck on a corrupt frame.
///
/// One parser per byte stream; it holds at most one in-flight frame.
#[derive(Debug)]
pub struct Parser {
    codec: Codec,
    config: ParserConfig,
    state: ParseState,
    buf: BytesMut,
    payload_length: u16,
    payload_remaining: u16,
    message_id: u16,
    last_message: Option<Message>,
    last_frame: Option<Bytes>,
    last_error: Option<CodecError>,
    parsed: u64,
    errors: u64,
}

impl Parser {
    pub fn new(codec: Codec) -> Self {
        Self::with_config(codec, ParserConfig::default())
    }

    pub fn with_config(codec: Codec, config: ParserConfig) -> Self {
        Self {
            codec,
            config,
            state: ParseState::WaitStart,
            buf: BytesMut::with_capacity(HEADER_LENGTH + CHECKSUM_LENGTH),
            payload_length: 0,
            payload_remaining: 0,
            message_id: 0,
            last_message: None,
            last_frame: None,
            last_error: None,
            parsed: 0,
            errors: 0,
        }
    }

    /// Feed one byte from the stream.
    pub fn feed(&mut self, byte: u8) -> ParseStatus {
        use ParseState::*;

        self.state = match self.state {
            WaitStart => {
                self.buf.clear();
                if byte != MAGIC[0] {
                    return ParseStatus::Pending(WaitStart);
                }
                self.buf.put_u8(byte);
                WaitHeader
            }
            WaitHeader => {
                if byte != MAGIC[1] {
                    tracing::trace!(byte, "lost frame sync after start byte");
                    self.buf.clear();
                    WaitStart
                } else {
                    self.buf.put_u8(byte);
                    WaitLengthLow
                }
            }
            WaitLengthLow => {
                self.payload_length = u16::from(byte);
                self.buf.put_u8(byte);
                WaitLengthHigh
            }
            WaitLengthHigh => {
                self.payload_length |= u16::from(byte) << 8;
                if self.payload_length > self.config.max_payload_length {
                    tracing::debug!(
                        payload_length = self.payload_length,
                        max = self.config.max_payload_length,
                        "declared payload too long, resynchronizing"
                    );
                    self.reset();
                    return ParseStatus::Pending(WaitStart);
                }
                self.buf.reserve(usize::from(self.payload_length) + HEADER_LENGTH);
                self.buf.put_u8(byte);
                WaitIdLow
            }
            WaitIdLow => {
                self.message_id = u16::from(byte);
                self.buf.put_u8(byte);
                WaitIdHigh
            }
            WaitIdHigh => {
                self.message_id |= u16::from(byte) << 8;
                self.buf.put_u8(byte);
                WaitSrc
            }
            WaitSrc => {
                self.buf.put_u8(byte);
                WaitDst
            }
            WaitDst => {
                self.buf.put_u8(byte);
                self.payload_remaining = self.payload_length;
                if self.payload_remaining == 0 {
                    WaitChecksumLow
                } else {
                    WaitPayload
                }
            }
            WaitPayload => {
                self.buf.put_u8(byte);
                self.payload_remaining -= 1;
                if self.payload_remaining == 0 {
                    WaitChecksumLow
                } else {
                    WaitPayload
                }
            }
            WaitChecksumLow => {
                self.buf.put_u8(byte);
                WaitChecksumHigh
            }
            WaitChecksumHigh => {
                self.buf.put_u8(byte);
                return self.complete_frame();
            }
        };

        ParseStatus::Pending(self.state)
    }

    /// Feed a run of bytes, returning every valid message they complete.
    pub fn feed_slice(&mut self, bytes: &[u8]) -> Vec<Message> {
        let mut messages = Vec::new();
        for &byte in bytes {
            if self.feed(byte) == ParseStatus::NewMessage {
                if let Some(message) = &self.last_message {
                    messages.push(message.clone());
                }
            }
        }
        messages
    }

    fn complete_frame(&mut self) -> ParseStatus {
        let declared_id = self.message_id;
        let frame = self.buf.split().freeze();
        let result = self.codec.decode(&frame).and_then(|message| {
            let actual = message.calculate_checksum();
            if actual == message.checksum() {
                Ok(message)
            } else {
                Err(CodecError::ChecksumMismatch {
                    message_id: message.message_id(),
                    expected: message.checksum(),
                    actual,
                })
            }
        });
        self.reset();

        match result {
            Ok(message) => {
                self.parsed = self.parsed.saturating_add(1);
                self.last_message = Some(message);
                self.last_frame = Some(frame);
                self.last_error = None;
                ParseStatus::NewMessage
            }
            Err(err) => {
                self.errors = self.errors.saturating_add(1);
                tracing::debug!(message_id = declared_id, error = %err, "discarding frame");
                self.last_error = Some(err);
                ParseStatus::ParseError
            }
        }
    }

    /// Abandon any partially received frame. Counters and the last message are kept.
    pub fn reset(&mut self) {
        self.state = ParseState::WaitStart;
        self.buf.clear();
        self.payload_length = 0;
        self.payload_remaining = 0;
        self.message_id = 0;
    }

    pub fn state(&self) -> ParseState {
        self.state
    }

    /// Most recent checksum-verified message.
    pub fn last_message(&self) -> Option<&Message> {
        self.last_message.as_ref()
    }

    pub fn take_last_message(&mut self) -> Option<Message> {
        self.last_frame = None;
        self.last_message.take()
    }

    /// Wire bytes of [`Parser::last_message`], exactly as received.
    pub fn last_frame(&self) -> Option<&[u8]> {
        self.last_frame.as_deref()
    }

    /// Why the most recent completed frame was rejected, if it was.
    pub fn last_error(&self) -> Option<&CodecError> {
        self.last_error.as_ref()
    }

    /// Count of messages parsed successfully.
    pub fn parsed(&self) -> u64 {
        self.parsed
    }

    /// Count of completed frames rejected by decode or checksum verification.
    pub fn errors(&self) -> u64 {
        self.errors
    }

    pub fn codec(&self) -> &Codec {
        &self.codec
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new(Codec::ping1d())
    }
}

#[cfg(test)]
mod tests {
    use brping_schema::ids;
    use proptest::prelude::*;

    use super::*;
    use crate::value::FieldValue;

    const VOLTAGE_5_FRAME: [u8; 12] = [
        0x42, 0x52, 0x02, 0x00, 0xB2, 0x04, 0x05, 0x06, 0x01, 0x01, 0x59, 0x01,
    ];
    const ASCII_TEXT_FRAME: [u8; 16] = [
        0x42, 0x52, 0x06, 0x00, 0x03, 0x00, 0x05, 0x06, 0x68, 0x65, 0x6c, 0x6c, 0x6f, 0x00, 0xBC,
        0x02,
    ];
    // Well framed profile message whose checksum (0x0AB2) does not match its contents (0x09F0).
    const BAD_PROFILE_FRAME: [u8; 40] = [
        0x42, 0x52, 0x1E, 0x00, 0x14, 0x05, 0x05, 0x06, 0x68, 0x65, 0x6c, 0x6c, 0x6f, 0x00, 0x00,
        0x68, 0x65, 0x6c, 0x6c, 0x6f, 0x00, 0x00, 0x68, 0x65, 0x6c, 0x6c, 0x6f, 0x00, 0x00, 0x68,
        0x65, 0x6c, 0x6c, 0x6f, 0x01, 0x02, 0x63, 0x64, 0xB2, 0x0A,
    ];

    fn feed_all(parser: &mut Parser, bytes: &[u8]) -> Vec<ParseStatus> {
        bytes.iter().map(|&byte| parser.feed(byte)).collect()
    }

    #[test]
    fn walks_every_state_for_fixed_frame() {
        let mut parser = Parser::default();
        let statuses = feed_all(&mut parser, &VOLTAGE_5_FRAME);

        use ParseState::*;
        assert_eq!(
            statuses,
            vec![
                ParseStatus::Pending(WaitHeader),
                ParseStatus::Pending(WaitLengthLow),
                ParseStatus::Pending(WaitLengthHigh),
                ParseStatus::Pending(WaitIdLow),
                ParseStatus::Pending(WaitIdHigh),
                ParseStatus::Pending(WaitSrc),
                ParseStatus::Pending(WaitDst),
                ParseStatus::Pending(WaitPayload),
                ParseStatus::Pending(WaitPayload),
                ParseStatus::Pending(WaitChecksumLow),
                ParseStatus::Pending(WaitChecksumHigh),
                ParseStatus::NewMessage,
            ]
        );
        assert_eq!(parser.state(), WaitStart);
        assert_eq!(parser.parsed(), 1);
        assert_eq!(parser.errors(), 0);

        let message = parser.last_message().unwrap();
        assert_eq!(message.message_id(), 1202);
        assert_eq!(message.get("voltage_5"), Some(&FieldValue::U16(257)));
        assert_eq!(message.checksum(), 0x0159);
    }

    #[test]
    fn zero_length_payload_skips_payload_state() {
        let codec = Codec::ping1d();
        let wire = codec.request(ids::VOLTAGE_5).unwrap();
        let mut parser = Parser::new(codec);

        let statuses = feed_all(&mut parser, &wire);
        assert_eq!(statuses[7], ParseStatus::Pending(ParseState::WaitChecksumLow));
        assert_eq!(statuses[9], ParseStatus::NewMessage);
        assert_eq!(parser.last_message().unwrap().payload_length(), 0);
        assert_eq!(parser.last_frame(), Some(wire.as_ref()));
    }

    #[test]
    fn last_frame_tracks_accepted_frames_only() {
        let mut parser = Parser::default();
        assert!(parser.last_frame().is_none());

        parser.feed_slice(&VOLTAGE_5_FRAME);
        parser.feed_slice(&BAD_PROFILE_FRAME);
        assert_eq!(parser.last_frame(), Some(&VOLTAGE_5_FRAME[..]));

        parser.take_last_message();
        assert!(parser.last_frame().is_none());
    }

    #[test]
    fn variable_length_frame() {
        let mut parser = Parser::default();
        let messages = parser.feed_slice(&ASCII_TEXT_FRAME);

        assert_eq!(messages.len(), 1);
        assert_eq!(
            messages[0].get("ascii_message").and_then(FieldValue::as_bytes),
            Some(&b"hello\0"[..])
        );
    }

    #[test]
    fn stray_byte_before_frame_is_ignored() {
        let mut parser = Parser::default();
        let mut stream = vec![0x00];
        stream.extend_from_slice(&VOLTAGE_5_FRAME);

        let messages = parser.feed_slice(&stream);
        assert_eq!(messages.len(), 1);
        assert_eq!(parser.errors(), 0);
    }

    #[test]
    fn bad_second_magic_resyncs_without_error() {
        let mut parser = Parser::default();
        assert_eq!(parser.feed(b'B'), ParseStatus::Pending(ParseState::WaitHeader));
        assert_eq!(parser.feed(b'X'), ParseStatus::Pending(ParseState::WaitStart));
        assert_eq!(parser.errors(), 0);

        let messages = parser.feed_slice(&VOLTAGE_5_FRAME);
        assert_eq!(messages.len(), 1);
    }

    #[test]
    fn failed_second_magic_byte_is_not_reexamined() {
        let mut parser = Parser::default();
        // "BB" followed by the rest of a frame: the second 'B' is consumed by the
        // failed match, so the trailing 'R' does not start a frame.
        parser.feed(b'B');
        assert_eq!(parser.feed(b'B'), ParseStatus::Pending(ParseState::WaitStart));
        assert_eq!(parser.feed(b'R'), ParseStatus::Pending(ParseState::WaitStart));

        let messages = parser.feed_slice(&VOLTAGE_5_FRAME);
        assert_eq!(messages.len(), 1);
    }

    #[test]
    fn checksum_mismatch_counts_error_and_resets() {
        let mut parser = Parser::default();
        let statuses = feed_all(&mut parser, &BAD_PROFILE_FRAME);

        assert_eq!(statuses.last(), Some(&ParseStatus::ParseError));
        assert_eq!(parser.state(), ParseState::WaitStart);
        assert_eq!(parser.errors(), 1);
        assert_eq!(parser.parsed(), 0);
        assert!(parser.last_message().is_none());
        assert!(matches!(
            parser.last_error(),
            Some(CodecError::ChecksumMismatch {
                message_id: 1300,
                expected: 0x0AB2,
                actual: 0x09F0
            })
        ));

        let messages = parser.feed_slice(&VOLTAGE_5_FRAME);
        assert_eq!(messages.len(), 1);
        assert_eq!(parser.parsed(), 1);
        assert!(parser.last_error().is_none());
    }

    #[test]
    fn unknown_message_id_counts_as_error() {
        let mut frame = VOLTAGE_5_FRAME;
        frame[4] = 0x99;
        let mut parser = Parser::default();

        assert_eq!(feed_all(&mut parser, &frame).last(), Some(&ParseStatus::ParseError));
        assert_eq!(parser.errors(), 1);
        assert!(matches!(
            parser.last_error(),
            Some(CodecError::UnknownMessageType { .. })
        ));
    }

    #[test]
    fn last_message_survives_failed_frame() {
        let mut parser = Parser::default();
        parser.feed_slice(&VOLTAGE_5_FRAME);
        parser.feed_slice(&BAD_PROFILE_FRAME);

        assert_eq!(parser.last_message().unwrap().message_id(), 1202);
        assert_eq!((parser.parsed(), parser.errors()), (1, 1));
    }

    #[test]
    fn oversized_declared_length_resyncs() {
        let config = ParserConfig {
            max_payload_length: 4,
        };
        let mut parser = Parser::with_config(Codec::ping1d(), config);

        let status = feed_all(&mut parser, &[0x42, 0x52, 0x00, 0x01]);
        assert_eq!(status.last(), Some(&ParseStatus::Pending(ParseState::WaitStart)));
        assert_eq!(parser.errors(), 0);

        assert_eq!(parser.feed_slice(&VOLTAGE_5_FRAME).len(), 1);
    }

    #[test]
    fn reset_abandons_partial_frame() {
        let mut parser = Parser::default();
        feed_all(&mut parser, &VOLTAGE_5_FRAME[..6]);
        assert_eq!(parser.state(), ParseState::WaitIdHigh);

        parser.reset();
        assert_eq!(parser.state(), ParseState::WaitStart);
        assert_eq!(parser.feed_slice(&VOLTAGE_5_FRAME).len(), 1);
    }

    #[test]
    fn back_to_back_frames() {
        let mut parser = Parser::default();
        let mut stream = VOLTAGE_5_FRAME.to_vec();
        stream.extend_from_slice(&ASCII_TEXT_FRAME);
        stream.extend_from_slice(&VOLTAGE_5_FRAME);

        let messages = parser.feed_slice(&stream);
        let ids: Vec<u16> = messages.iter().map(Message::message_id).collect();
        assert_eq!(ids, vec![1202, 3, 1202]);
        assert_eq!(parser.parsed(), 3);
    }

    #[test]
    fn take_last_message_clears_it() {
        let mut parser = Parser::default();
        parser.feed_slice(&VOLTAGE_5_FRAME);
        assert!(parser.take_last_message().is_some());
        assert!(parser.last_message().is_none());
    }

    proptest! {
        #[test]
        fn prop_incremental_matches_direct_decode(
            noise in proptest::collection::vec(any::<u8>().prop_filter("not a start byte", |b| *b != b'B'), 0..32),
            payload in proptest::collection::vec(any::<u8>(), 0..128),
            nacked_id in any::<u16>(),
        ) {
            let codec = Codec::ping1d();
            let mut message = codec.message(ids::NACK).unwrap();
            message.set("nacked_id", nacked_id).unwrap();
            message.set("nack_message", payload).unwrap();
            let wire = codec.encode(&message).unwrap();

            let mut stream = noise;
            stream.extend_from_slice(&wire);

            let mut parser = Parser::new(codec.clone());
            let messages = parser.feed_slice(&stream);

            prop_assert_eq!(messages.len(), 1);
            prop_assert_eq!(&messages[0], &codec.decode(&wire).unwrap());
            prop_assert_eq!(parser.errors(), 0);
        }
    }
}
