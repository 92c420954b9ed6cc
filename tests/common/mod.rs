#![allow(dead_code)]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use ws_receiver::frame::mask;
use ws_receiver::message::{MessageHandler, ReceiverEvent};
use ws_receiver::receiver::Receiver;

pub const CONTINUATION: u8 = 0x0;
pub const TEXT: u8 = 0x1;
pub const BINARY: u8 = 0x2;
pub const CLOSE: u8 = 0x8;
pub const PING: u8 = 0x9;
pub const PONG: u8 = 0xA;

pub fn init_logger() {
    simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Trace)
        .init()
        .ok();
}

pub fn receiver() -> Receiver<Vec<ReceiverEvent>> {
    init_logger();
    Receiver::new(Vec::new())
}

// Test-only frame encoder.
#[derive(Clone, Debug)]
pub struct Frame {
    pub fin: bool,
    pub rsv: u8,
    pub opcode: u8,
    pub mask: Option<[u8; 4]>,
    pub payload: Vec<u8>,
}

impl Frame {
    pub fn new(opcode: u8, payload: &[u8]) -> Self {
        Self {
            fin: true,
            rsv: 0,
            opcode,
            mask: None,
            payload: payload.to_vec(),
        }
    }
    pub fn text(text: &str) -> Self {
        Self::new(TEXT, text.as_bytes())
    }
    pub fn binary(data: &[u8]) -> Self {
        Self::new(BINARY, data)
    }
    pub fn continuation(payload: &[u8]) -> Self {
        Self::new(CONTINUATION, payload)
    }
    pub fn fin(mut self, fin: bool) -> Self {
        self.fin = fin;
        self
    }
    pub fn compressed(mut self) -> Self {
        self.rsv |= 0x4;
        self
    }
    pub fn rsv(mut self, rsv: u8) -> Self {
        self.rsv = rsv;
        self
    }
    pub fn masked(mut self, key: [u8; 4]) -> Self {
        self.mask = Some(key);
        self
    }
    pub fn encode(&self) -> Vec<u8> {
        let mut out = vec![(self.fin as u8) << 7 | (self.rsv & 0x7) << 4 | (self.opcode & 0xF)];
        let mask_bit = match self.mask {
            Some(_) => 0x80u8,
            None => 0x00u8,
        };
        let len = self.payload.len();
        if len <= 125 {
            out.push(mask_bit | len as u8);
        } else if len <= 0xFFFF {
            out.push(mask_bit | 126);
            out.extend_from_slice(&(len as u16).to_be_bytes());
        } else {
            out.push(mask_bit | 127);
            out.extend_from_slice(&(len as u64).to_be_bytes());
        }
        let mut payload = self.payload.clone();
        if let Some(key) = self.mask {
            out.extend_from_slice(&key);
            mask(key, 0, &mut payload);
        }
        out.extend_from_slice(&payload);
        out
    }
}

pub fn encode_all(frames: &[Frame]) -> Vec<u8> {
    frames.iter().flat_map(|frame| frame.encode()).collect()
}

pub fn feed_bytewise<H: MessageHandler>(receiver: &mut Receiver<H>, bytes: &[u8]) {
    for byte in bytes {
        receiver.add(vec![*byte]);
    }
}

// Feeds `bytes` in chunks of random length between 1 and `max_chunk`.
pub fn feed_random<H: MessageHandler>(
    receiver: &mut Receiver<H>,
    bytes: &[u8],
    seed: u64,
    max_chunk: usize,
) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut rest = bytes;
    while !rest.is_empty() {
        let n = rng.gen_range(1..=max_chunk).min(rest.len());
        receiver.add(rest[..n].to_vec());
        rest = &rest[n..];
    }
}

pub fn text(text: &str) -> ReceiverEvent {
    ReceiverEvent::Text(text.to_string())
}
