use bytes::{BufMut, Bytes, BytesMut};

use crate::address::{
    is_reply_header, reply_header, Address, BROADCAST, DEVICE_ID_INQUIRY, ERROR_REPLY,
    NETWORK_CHANGE, TERMINATOR,
};
use crate::error::{FrameError, Result};

/// Split a received chunk into candidate messages.
///
/// Each item excludes its terminator. The empty fragment after a final
/// terminator is skipped; an unterminated tail is yielded as-is. Nothing is
/// carried over to the next chunk.
pub fn split_messages(chunk: &[u8]) -> impl Iterator<Item = &[u8]> + '_ {
    let mut parts = chunk.split(|&b| b == TERMINATOR).peekable();
    std::iter::from_fn(move || {
        let part = parts.next()?;
        if part.is_empty() && parts.peek().is_none() {
            return None;
        }
        Some(part)
    })
}

/// A validated incoming message, borrowed from the receive buffer.
#[derive(Debug, Clone, Copy)]
pub struct Message<'a> {
    raw: &'a [u8],
    address: Address,
}

impl<'a> Message<'a> {
    /// Validate length and address byte of a terminator-stripped message.
    pub fn parse(raw: &'a [u8]) -> Result<Self> {
        if raw.len() < 2 {
            return Err(FrameError::TooShort { len: raw.len() });
        }
        let address = Address::classify(raw[0]).ok_or(FrameError::InvalidAddress(raw[0]))?;
        Ok(Self { raw, address })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Bytes after the address byte.
    pub fn payload(&self) -> &'a [u8] {
        &self.raw[1..]
    }

    pub fn raw(&self) -> &'a [u8] {
        self.raw
    }

    /// `88 30 xx`: the broadcast address-set / device-id inquiry.
    pub fn is_device_id_inquiry(&self) -> bool {
        self.address == Address::Broadcast
            && self.raw.len() == 3
            && self.raw[1] == DEVICE_ID_INQUIRY
    }
}

/// What a reply body means to a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKind {
    Ack,
    Completion,
    Inquiry,
    Error(u8),
    DeviceId,
    NetworkChange,
    Other,
}

impl ReplyKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Ack => "ack",
            Self::Completion => "completion",
            Self::Inquiry => "inquiry",
            Self::Error(_) => "error",
            Self::DeviceId => "device-id",
            Self::NetworkChange => "network-change",
            Self::Other => "other",
        }
    }
}

/// An outgoing reply: header byte plus body, terminator added on encode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    header: u8,
    body: Bytes,
}

impl Reply {
    /// Reply from `device` (header `0x90` for device 1).
    pub fn from_device(device: u8, body: impl Into<Bytes>) -> Self {
        Self {
            header: reply_header(device),
            body: body.into(),
        }
    }

    /// Broadcast reply (header `0x88`).
    pub fn broadcast(body: impl Into<Bytes>) -> Self {
        Self {
            header: BROADCAST,
            body: body.into(),
        }
    }

    /// Parse a terminator-stripped reply as read by a controller.
    pub fn parse(raw: &[u8]) -> Result<Self> {
        let (&header, body) = raw
            .split_first()
            .ok_or(FrameError::TooShort { len: raw.len() })?;
        if header != BROADCAST && !is_reply_header(header) {
            return Err(FrameError::InvalidReplyHeader(header));
        }
        Ok(Self {
            header,
            body: Bytes::copy_from_slice(body),
        })
    }

    pub fn header(&self) -> u8 {
        self.header
    }

    pub fn body(&self) -> &[u8] {
        self.body.as_ref()
    }

    pub fn is_broadcast(&self) -> bool {
        self.header == BROADCAST
    }

    pub fn kind(&self) -> ReplyKind {
        let first = self.body.first().copied().unwrap_or(0);
        if self.is_broadcast() {
            return match first {
                DEVICE_ID_INQUIRY => ReplyKind::DeviceId,
                NETWORK_CHANGE => ReplyKind::NetworkChange,
                _ => ReplyKind::Other,
            };
        }
        match first & 0xF0 {
            0x40 => ReplyKind::Ack,
            0x50 if self.body.len() == 1 => ReplyKind::Completion,
            0x50 => ReplyKind::Inquiry,
            ERROR_REPLY => ReplyKind::Error(self.body.get(1).copied().unwrap_or(0)),
            _ => ReplyKind::Other,
        }
    }

    /// Append the wire form to `dst`.
    pub fn encode(&self, dst: &mut BytesMut) {
        encode_reply(self.header, &self.body, dst);
    }

    /// The total wire size of this reply (header + body + terminator).
    pub fn wire_size(&self) -> usize {
        self.body.len() + 2
    }
}

/// Encode a reply into the wire format.
///
/// ```text
/// ┌──────────┬─────────────────┬──────┐
/// │ Header   │ Body            │ 0xFF │
/// │ 0x90/88  │ (all < 0x80)    │      │
/// └──────────┴─────────────────┴──────┘
/// ```
pub fn encode_reply(header: u8, body: &[u8], dst: &mut BytesMut) {
    dst.reserve(body.len() + 2);
    dst.put_u8(header);
    dst.put_slice(body);
    dst.put_u8(TERMINATOR);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::{ACK, SYNTAX_ERROR};

    #[test]
    fn split_single_message() {
        let chunk = [0x81, 0x01, 0x04, 0x07, 0x03, 0xFF];
        let parts: Vec<&[u8]> = split_messages(&chunk).collect();
        assert_eq!(parts, vec![&[0x81, 0x01, 0x04, 0x07, 0x03][..]]);
    }

    #[test]
    fn split_multiple_messages_in_order() {
        let chunk = [0x81, 0x09, 0x04, 0x00, 0xFF, 0x81, 0x09, 0x06, 0x12, 0xFF];
        let parts: Vec<&[u8]> = split_messages(&chunk).collect();
        assert_eq!(
            parts,
            vec![&[0x81, 0x09, 0x04, 0x00][..], &[0x81, 0x09, 0x06, 0x12][..]]
        );
    }

    #[test]
    fn split_keeps_unterminated_tail_and_inner_empties() {
        let chunk = [0x81, 0x01, 0xFF, 0xFF, 0x81, 0x09];
        let parts: Vec<&[u8]> = split_messages(&chunk).collect();
        assert_eq!(parts, vec![&[0x81, 0x01][..], &[][..], &[0x81, 0x09][..]]);
    }

    #[test]
    fn split_empty_chunk_and_bare_terminator() {
        assert_eq!(split_messages(b"").count(), 0);
        let parts: Vec<&[u8]> = split_messages(&[TERMINATOR]).collect();
        assert_eq!(parts, vec![&[][..]]);
    }

    #[test]
    fn parse_validates_length_and_address() {
        assert!(matches!(
            Message::parse(&[0x81]),
            Err(FrameError::TooShort { len: 1 })
        ));
        assert!(matches!(
            Message::parse(&[0x90, 0x41]),
            Err(FrameError::InvalidAddress(0x90))
        ));

        let msg = Message::parse(&[0x81, 0x09, 0x04, 0x00]).unwrap();
        assert_eq!(msg.address(), Address::Device(1));
        assert_eq!(msg.payload(), &[0x09, 0x04, 0x00]);
        assert!(!msg.is_device_id_inquiry());
    }

    #[test]
    fn device_id_inquiry_detection() {
        let msg = Message::parse(&[0x88, 0x30, 0x01]).unwrap();
        assert!(msg.is_device_id_inquiry());

        let longer = Message::parse(&[0x88, 0x30, 0x01, 0x00]).unwrap();
        assert!(!longer.is_device_id_inquiry());
    }

    #[test]
    fn encode_unicast_and_broadcast() {
        let mut buf = BytesMut::new();
        Reply::from_device(1, vec![ACK]).encode(&mut buf);
        Reply::broadcast(vec![DEVICE_ID_INQUIRY, 0x02]).encode(&mut buf);
        assert_eq!(buf.as_ref(), &[0x90, 0x41, 0xFF, 0x88, 0x30, 0x02, 0xFF]);
    }

    #[test]
    fn reply_parse_and_kind() {
        let ack = Reply::parse(&[0x90, 0x41]).unwrap();
        assert_eq!(ack.kind(), ReplyKind::Ack);

        let done = Reply::parse(&[0x90, 0x51]).unwrap();
        assert_eq!(done.kind(), ReplyKind::Completion);

        let inq = Reply::parse(&[0x90, 0x50, 0x02]).unwrap();
        assert_eq!(inq.kind(), ReplyKind::Inquiry);

        let err = Reply::parse(&[0x90, 0x60, SYNTAX_ERROR]).unwrap();
        assert_eq!(err.kind(), ReplyKind::Error(SYNTAX_ERROR));

        let net = Reply::parse(&[0x88, 0x38]).unwrap();
        assert_eq!(net.kind(), ReplyKind::NetworkChange);
        assert!(net.is_broadcast());

        assert!(matches!(
            Reply::parse(&[0x81, 0x41]),
            Err(FrameError::InvalidReplyHeader(0x81))
        ));
        assert!(Reply::parse(&[]).is_err());
    }

    #[test]
    fn reply_wire_size() {
        let reply = Reply::from_device(1, vec![0x60, 0x02]);
        assert_eq!(reply.wire_size(), 4);
        assert_eq!(reply.header(), 0x90);
        assert_eq!(reply.body(), &[0x60, 0x02]);
    }
}
