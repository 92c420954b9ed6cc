mod close;
mod config;
mod dispatch;
mod expectation;
mod fragment;
mod overflow;
mod utf8_validation;

pub use close::NO_STATUS_RECEIVED;
pub use config::{ReceiverConfig, DEFAULT_MAX_PAYLOAD};

use crate::extension::Decompressor;
use crate::frame::{
    copy_bytes, parse_extended_len, unmask, ControlKind, ControlPayload, FrameHead,
    FrameHeadParseError,
};
use crate::message::{MessageHandler, MessageKind, ReceiverEvent};
use crate::pool::{BufferPool, PoolKind, Pools};
use bytes::Bytes;
use close::parse_close_payload;
use dispatch::{message_event, Dispatch, DispatchQueue};
use expectation::{Destination, Expectation, Stage};
use fragment::{PendingMessage, ReceiverState};
use futures::task::noop_waker_ref;
use overflow::Overflow;
use std::convert::TryFrom;
use std::future::Future;
use std::mem::{replace, take};
use std::task::{Context, Poll};
use utf8_validation::process_utf8;

/// Streaming decoder for the receiving half of a websocket connection.
///
/// Bytes are fed in with [`add`][`Self::add()`] in whatever chunks the transport delivers them.
/// Completed messages are handed to the [`MessageHandler`] in the order their last frame arrived.
/// Compressed messages are decompressed asynchronously; while one is pending, later messages wait
/// in the dispatch queue and [`poll_dispatch`][`Self::poll_dispatch()`] must be polled to deliver
/// them.
pub struct Receiver<H: MessageHandler> {
    config: ReceiverConfig,
    handler: H,
    decompressor: Option<Box<dyn Decompressor>>,
    state: ReceiverState,
    message: Option<PendingMessage>,
    expectation: Expectation,
    scratch: [u8; 8],
    overflow: Overflow,
    pools: Pools,
    dispatch: DispatchQueue,
    dead: bool,
}

impl<H: MessageHandler> Receiver<H> {
    pub fn new(handler: H) -> Self {
        Self::with_config(handler, ReceiverConfig::default())
    }
    pub fn with_config(handler: H, config: ReceiverConfig) -> Self {
        Self {
            pools: Pools::new(config.pool_size),
            config,
            handler,
            decompressor: None,
            state: ReceiverState::default(),
            message: None,
            expectation: Expectation::head_start(),
            scratch: [0u8; 8],
            overflow: Overflow::default(),
            dispatch: DispatchQueue::default(),
            dead: false,
        }
    }
    /// Activates the compression extension. Without a decompressor any frame with RSV1 set is a
    /// protocol error.
    pub fn with_decompressor<D: Decompressor + 'static>(mut self, decompressor: D) -> Self {
        self.decompressor = Some(Box::new(decompressor));
        self
    }
    pub fn handler(&self) -> &H {
        &self.handler
    }
    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }
    pub fn into_handler(self) -> H {
        self.handler
    }
    pub fn is_dead(&self) -> bool {
        self.dead
    }
    pub fn pool(&self, kind: PoolKind) -> &BufferPool {
        self.pools.get(kind)
    }
    /// Number of completed messages not yet delivered.
    pub fn queued(&self) -> usize {
        self.dispatch.len()
    }

    /// Consumes the next chunk of the incoming byte stream.
    ///
    /// Framing errors reset the receiver, discard the rest of the chunk and are reported through
    /// [`MessageHandler::on_error`] before this returns.
    pub fn add(&mut self, chunk: impl AsRef<[u8]>) {
        if self.dead {
            return;
        }
        let chunk = chunk.as_ref();
        let n = self.fill(chunk);
        if n < chunk.len() {
            self.overflow.push(Bytes::copy_from_slice(&chunk[n..]));
        }
        while self.expectation.is_complete() {
            let expectation = replace(&mut self.expectation, Expectation::head_start());
            if let Err(err) = self.complete(expectation) {
                self.fail(err);
                return;
            }
            self.drain_overflow();
        }
    }

    /// Clears all frame, fragmentation and buffered input state. Messages already completed stay
    /// queued for dispatch.
    pub fn reset(&mut self) {
        if self.dead {
            return;
        }
        log::debug!("resetting receiver");
        self.state = ReceiverState::default();
        self.message = None;
        self.expectation = Expectation::head_start();
        self.overflow.clear();
        self.pools.cycle_reset(true);
    }

    /// Releases all storage and drops pending decompressions. Every later call is a no-op.
    pub fn cleanup(&mut self) {
        log::debug!("cleaning up receiver");
        self.dead = true;
        self.state = ReceiverState::default();
        self.message = None;
        self.overflow.clear();
        self.dispatch.clear();
        self.pools.release();
    }

    /// Delivers queued messages. Ready once the dispatch queue is empty.
    pub fn poll_dispatch(&mut self, cx: &mut Context<'_>) -> Poll<()> {
        if self.dead {
            return Poll::Ready(());
        }
        self.dispatch.poll_flush(&mut self.handler, cx)
    }

    pub fn dispatched(&mut self) -> impl Future<Output = ()> + '_ {
        futures_lite::future::poll_fn(move |cx| self.poll_dispatch(cx))
    }

    fn fill(&mut self, input: &[u8]) -> usize {
        let window = self.expectation.window(&mut self.scratch, &mut self.pools);
        let n = copy_bytes(input, window);
        self.expectation.filled += n;
        n
    }

    fn drain_overflow(&mut self) {
        if self.overflow.is_empty() {
            return;
        }
        let window = self.expectation.window(&mut self.scratch, &mut self.pools);
        let n = self.overflow.drain_into(window);
        self.expectation.filled += n;
    }

    fn complete(&mut self, expectation: Expectation) -> Result<(), ReceiverError> {
        match expectation.stage {
            Stage::HeadStart => self.on_head_start([self.scratch[0], self.scratch[1]]),
            Stage::ExtendedLen16 => self.on_payload_len(parse_extended_len(&self.scratch[..2])),
            Stage::ExtendedLen64 => self.on_payload_len(parse_extended_len(&self.scratch[..8])),
            Stage::MaskKey => {
                let s = &self.scratch;
                self.state.mask_key = [s[0], s[1], s[2], s[3]];
                self.begin_payload()
            }
            Stage::Payload(destination) => self.finish_frame(destination),
        }
    }

    fn on_head_start(&mut self, bytes: [u8; 2]) -> Result<(), ReceiverError> {
        let head = FrameHead::parse(bytes, self.decompressor.is_some())?;
        log::trace!("frame head {:?}", head);
        if let Some(kind) = self.state.begin_frame(&head)? {
            self.message = Some(PendingMessage::new(kind, self.state.compressed));
        }
        match (head.inline_payload_len(), head.extended_len_bytes()) {
            (Some(len), _) => self.on_payload_len(len),
            (None, bytes) => {
                self.expectation = Expectation::extended_len(bytes);
                Ok(())
            }
        }
    }

    fn on_payload_len(&mut self, len: u64) -> Result<(), ReceiverError> {
        if self.state.opcode.message_kind().is_some() {
            let received = self.message.as_ref().map_or(0, |message| message.len);
            let too_large = match self.config.max_payload {
                Some(max) => received.saturating_add(len) > max,
                None => false,
            };
            if too_large || len >> 63 != 0 {
                return Err(ReceiverError::PayloadTooLarge);
            }
        }
        self.state.payload_len =
            usize::try_from(len).map_err(|_| ReceiverError::PayloadTooLarge)?;
        match self.state.masked {
            true => {
                self.expectation = Expectation::mask_key();
                Ok(())
            }
            false => self.begin_payload(),
        }
    }

    fn begin_payload(&mut self) -> Result<(), ReceiverError> {
        let len = self.state.payload_len;
        let destination = match self.state.opcode.control_kind() {
            Some(kind) => Destination::Control(ControlPayload::new(kind, len)),
            None => {
                let pool = self.state.pool_kind();
                Destination::Pool(pool, self.pools.get_mut(pool).acquire(len))
            }
        };
        match len {
            0 => self.finish_frame(destination),
            _ => {
                self.expectation = Expectation::new(Stage::Payload(destination), len);
                Ok(())
            }
        }
    }

    fn finish_frame(&mut self, destination: Destination) -> Result<(), ReceiverError> {
        self.expectation = Expectation::head_start();
        match destination {
            Destination::Control(mut payload) => {
                unmask(self.state.mask_key, payload.data_mut());
                self.finish_control(payload)
            }
            Destination::Pool(pool, view) => {
                let data = self.pools.get_mut(pool).view_mut(&view);
                unmask(self.state.mask_key, data);
                let message = self
                    .message
                    .as_mut()
                    .ok_or(ReceiverError::UnexpectedContinuation)?;
                if let Some(utf8) = &mut message.utf8 {
                    if !process_utf8(utf8, data) {
                        return Err(ReceiverError::InvalidUtf8);
                    }
                }
                message.push(view);
                match self.state.last_fragment {
                    true => self.finish_message(pool),
                    false => Ok(()),
                }
            }
        }
    }

    fn finish_control(&mut self, payload: ControlPayload) -> Result<(), ReceiverError> {
        let event = match payload.kind {
            ControlKind::Ping => ReceiverEvent::Ping(payload.data().to_vec()),
            ControlKind::Pong => ReceiverEvent::Pong(payload.data().to_vec()),
            ControlKind::Close => {
                let (code, reason) = parse_close_payload(payload.data())?;
                ReceiverEvent::Close(code, reason.to_vec())
            }
        };
        self.enqueue(Dispatch::Ready(event));
        Ok(())
    }

    fn finish_message(&mut self, pool: PoolKind) -> Result<(), ReceiverError> {
        let message = match self.message.take() {
            Some(message) => message,
            None => return Ok(()),
        };
        if let Some(utf8) = message.utf8 {
            if !utf8.is_empty() {
                return Err(ReceiverError::InvalidUtf8);
            }
        }
        let mut data = Vec::with_capacity(message.len as usize);
        for view in message.views.iter() {
            data.extend_from_slice(self.pools.get(pool).view(view));
        }
        self.pools.get_mut(pool).cycle_reset(false);
        let compressed = take(&mut self.state.compressed);
        self.state.end_message();
        log::trace!("{} message of {} bytes complete", message.kind, data.len());
        let dispatch = match (compressed, self.decompressor.as_mut()) {
            (true, Some(decompressor)) => {
                Dispatch::Decompressing(message.kind, decompressor.decompress(data, true))
            }
            _ => Dispatch::Ready(message_event(message.kind, data)),
        };
        self.enqueue(dispatch);
        Ok(())
    }

    // Only an idle queue is flushed. A pending head keeps the waker the owner registered.
    fn enqueue(&mut self, dispatch: Dispatch) {
        let idle = self.dispatch.len() == 0;
        self.dispatch.push(dispatch);
        if idle {
            let mut cx = Context::from_waker(noop_waker_ref());
            let _ = self.dispatch.poll_flush(&mut self.handler, &mut cx);
        }
    }

    fn fail(&mut self, err: ReceiverError) {
        log::warn!("protocol error: {} (close code {})", err, err.close_code());
        self.reset();
        self.handler.on_error(err);
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ReceiverError {
    #[error("invalid frame head: {0}")]
    FrameHead(#[from] FrameHeadParseError),
    #[error("continuation frame without a fragmented message")]
    UnexpectedContinuation,
    #[error("{0} frame while a fragmented message is open")]
    ExpectedContinuation(MessageKind),
    #[error("fragmented control frame")]
    FragmentedControl,
    #[error("compressed control frame")]
    CompressedControl,
    #[error("compressed continuation frame")]
    CompressedContinuation,
    #[error("control frame payload exceeds 125 bytes")]
    ControlPayloadTooLarge,
    #[error("invalid close frame payload")]
    InvalidClosePayload,
    #[error("invalid close code {0}")]
    InvalidCloseCode(u16),
    #[error("invalid utf8 sequence")]
    InvalidUtf8,
    #[error("invalid compressed data: {0}")]
    InvalidCompressedData(String),
    #[error("max payload size exceeded")]
    PayloadTooLarge,
}

impl ReceiverError {
    /// Status code for the close frame the connection should answer this error with.
    pub fn close_code(&self) -> u16 {
        match self {
            ReceiverError::InvalidUtf8 | ReceiverError::InvalidCompressedData(_) => 1007,
            ReceiverError::PayloadTooLarge => 1009,
            _ => 1002,
        }
    }
}
