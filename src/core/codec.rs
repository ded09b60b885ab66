//! Length-prefixed frame codec.
//!
//! Every request and response on the wire is a frame:
//!
//! ```text
//! [Length(4, big-endian)] [Body(Length)]
//! ```
//!
//! The decoder yields one body per call and never consumes bytes past the end
//! of that body, so frames that arrive back-to-back in a single read stay in
//! the `Framed` buffer for the next call.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::config::{LENGTH_PREFIX_SIZE, MAX_FRAME_SIZE};
use crate::error::{ProtocolError, Result};

#[derive(Debug, Clone, Copy)]
pub struct FrameCodec {
    max_frame_size: usize,
}

impl FrameCodec {
    pub fn new(max_frame_size: usize) -> Self {
        Self { max_frame_size }
    }

    /// Peek the declared body length without consuming the prefix.
    fn peek_length(&self, src: &BytesMut) -> Result<Option<usize>> {
        if src.len() < LENGTH_PREFIX_SIZE {
            return Ok(None);
        }

        let mut prefix = &src[..LENGTH_PREFIX_SIZE];
        let declared = prefix.get_i32();
        if declared < 0 {
            return Err(ProtocolError::NegativeFrameLength(declared));
        }

        let len = declared as usize;
        if len > self.max_frame_size {
            return Err(ProtocolError::OversizedFrame(len));
        }

        Ok(Some(len))
    }
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::new(MAX_FRAME_SIZE)
    }
}

impl Decoder for FrameCodec {
    type Item = Bytes;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        let len = match self.peek_length(src)? {
            Some(len) => len,
            None => return Ok(None),
        };

        let total = LENGTH_PREFIX_SIZE + len;
        if src.len() < total {
            src.reserve(total - src.len());
            return Ok(None);
        }

        src.advance(LENGTH_PREFIX_SIZE);
        Ok(Some(src.split_to(len).freeze()))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        if let Some(frame) = self.decode(src)? {
            return Ok(Some(frame));
        }

        if src.is_empty() {
            return Ok(None);
        }

        // Stream ended inside a frame
        let needed = match self.peek_length(src)? {
            Some(len) => LENGTH_PREFIX_SIZE + len,
            None => LENGTH_PREFIX_SIZE,
        };
        Err(ProtocolError::TruncatedFrame {
            needed,
            available: src.len(),
        })
    }
}

impl Encoder<Bytes> for FrameCodec {
    type Error = ProtocolError;

    fn encode(&mut self, body: Bytes, dst: &mut BytesMut) -> Result<()> {
        if body.len() > self.max_frame_size || body.len() > i32::MAX as usize {
            return Err(ProtocolError::OversizedFrame(body.len()));
        }

        dst.reserve(LENGTH_PREFIX_SIZE + body.len());
        dst.put_i32(body.len() as i32);
        dst.extend_from_slice(&body);
        Ok(())
    }
}
