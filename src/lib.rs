//! Streaming decoder for the receiving side of the websocket framing protocol (RFC 6455).
//!
//! ```
//! use ws_receiver::message::ReceiverEvent;
//! use ws_receiver::receiver::Receiver;
//!
//! let mut receiver = Receiver::new(Vec::<ReceiverEvent>::new());
//! receiver.add(&b"\x81\x05Hel"[..]);
//! receiver.add(&b"lo"[..]);
//! assert_eq!(receiver.handler(), &vec![ReceiverEvent::Text("Hello".into())]);
//! ```

pub mod extension;
pub mod frame;
pub mod message;
pub mod pool;
pub mod receiver;
