use crate::frame::Opcode;
use crate::receiver::ReceiverError;

#[derive(Copy, Clone, Debug, PartialEq, Eq, strum::Display)]
pub enum MessageKind {
    Binary,
    Text,
}

impl MessageKind {
    pub fn opcode(&self) -> Opcode {
        match self {
            MessageKind::Binary => Opcode::Binary,
            MessageKind::Text => Opcode::Text,
        }
    }
}

/// Receives decoded messages in wire order.
///
/// All methods except [`on_error`][`Self::on_error()`] are called through the dispatch queue of
/// the [`Receiver`][`crate::receiver::Receiver`]. Framing errors are reported directly, from
/// within the `add` call that detected them.
pub trait MessageHandler {
    fn on_text(&mut self, text: String);
    fn on_binary(&mut self, data: Vec<u8>);
    fn on_ping(&mut self, _payload: Vec<u8>) {}
    fn on_pong(&mut self, _payload: Vec<u8>) {}
    // `code` is 1005 if the close frame carried no payload.
    fn on_close(&mut self, _code: u16, _reason: Vec<u8>) {}
    fn on_error(&mut self, err: ReceiverError);
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReceiverEvent {
    Text(String),
    Binary(Vec<u8>),
    Ping(Vec<u8>),
    Pong(Vec<u8>),
    Close(u16, Vec<u8>),
    Error(ReceiverError),
}

impl MessageHandler for Vec<ReceiverEvent> {
    fn on_text(&mut self, text: String) {
        self.push(ReceiverEvent::Text(text))
    }
    fn on_binary(&mut self, data: Vec<u8>) {
        self.push(ReceiverEvent::Binary(data))
    }
    fn on_ping(&mut self, payload: Vec<u8>) {
        self.push(ReceiverEvent::Ping(payload))
    }
    fn on_pong(&mut self, payload: Vec<u8>) {
        self.push(ReceiverEvent::Pong(payload))
    }
    fn on_close(&mut self, code: u16, reason: Vec<u8>) {
        self.push(ReceiverEvent::Close(code, reason))
    }
    fn on_error(&mut self, err: ReceiverError) {
        self.push(ReceiverEvent::Error(err))
    }
}
