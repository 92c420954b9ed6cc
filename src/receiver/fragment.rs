use crate::frame::{FrameHead, Opcode, MAX_CONTROL_PAYLOAD_LEN};
use crate::message::MessageKind;
use crate::pool::{PoolKind, PoolView};
use crate::receiver::ReceiverError;
use utf8::Incomplete;

// Per-connection decode state of the frame in progress and the fragmented message it belongs to.
#[derive(Debug)]
pub(crate) struct ReceiverState {
    // Continuation frames resolve to the opcode of the message they continue.
    pub(crate) opcode: Opcode,
    pub(crate) fragmented: bool,
    pub(crate) active_fragmented: Option<MessageKind>,
    pub(crate) last_fragment: bool,
    pub(crate) masked: bool,
    // Captured from the first frame of the message.
    pub(crate) compressed: bool,
    pub(crate) mask_key: [u8; 4],
    pub(crate) payload_len: usize,
}

impl Default for ReceiverState {
    fn default() -> Self {
        Self {
            opcode: Opcode::Continuation,
            fragmented: false,
            active_fragmented: None,
            last_fragment: false,
            masked: false,
            compressed: false,
            mask_key: [0u8; 4],
            payload_len: 0,
        }
    }
}

impl ReceiverState {
    // Validates the opcode sequence and records the new frame. Returns the kind of a message that
    // starts with this frame.
    pub(crate) fn begin_frame(
        &mut self,
        head: &FrameHead,
    ) -> Result<Option<MessageKind>, ReceiverError> {
        let mut started = None;
        match head.opcode {
            Opcode::Continuation => {
                let kind = self
                    .active_fragmented
                    .ok_or(ReceiverError::UnexpectedContinuation)?;
                if head.compressed {
                    return Err(ReceiverError::CompressedContinuation);
                }
                self.opcode = kind.opcode();
                self.fragmented = true;
            }
            Opcode::Text | Opcode::Binary => {
                if let Some(kind) = self.active_fragmented {
                    return Err(ReceiverError::ExpectedContinuation(kind));
                }
                self.opcode = head.opcode;
                self.fragmented = !head.fin;
                self.compressed = head.compressed;
                started = head.opcode.message_kind();
                if !head.fin {
                    self.active_fragmented = started;
                }
            }
            Opcode::Close | Opcode::Ping | Opcode::Pong => {
                if !head.fin {
                    return Err(ReceiverError::FragmentedControl);
                }
                if head.compressed {
                    return Err(ReceiverError::CompressedControl);
                }
                match head.inline_payload_len() {
                    Some(len) if len as usize <= MAX_CONTROL_PAYLOAD_LEN => {}
                    _ => return Err(ReceiverError::ControlPayloadTooLarge),
                }
                self.opcode = head.opcode;
            }
        }
        self.last_fragment = head.fin;
        self.masked = head.masked;
        self.mask_key = [0u8; 4];
        Ok(started)
    }
    pub(crate) fn pool_kind(&self) -> PoolKind {
        match self.fragmented {
            true => PoolKind::Fragmented,
            false => PoolKind::Unfragmented,
        }
    }
    // A data frame with FIN set ends the message.
    pub(crate) fn end_message(&mut self) {
        self.active_fragmented = None;
        self.compressed = false;
        self.fragmented = false;
    }
}

// Payload views of the frames received so far for one message.
#[derive(Debug)]
pub(crate) struct PendingMessage {
    pub(crate) kind: MessageKind,
    pub(crate) views: Vec<PoolView>,
    pub(crate) len: u64,
    // Incremental validation, only for uncompressed text.
    pub(crate) utf8: Option<Incomplete>,
}

impl PendingMessage {
    pub(crate) fn new(kind: MessageKind, compressed: bool) -> Self {
        Self {
            kind,
            views: Vec::new(),
            len: 0,
            utf8: match (kind, compressed) {
                (MessageKind::Text, false) => Some(Incomplete::empty()),
                _ => None,
            },
        }
    }
    pub(crate) fn push(&mut self, view: PoolView) {
        self.len += view.len() as u64;
        self.views.push(view);
    }
}
