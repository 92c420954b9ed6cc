use crate::extension::DecompressFuture;
use crate::message::{MessageHandler, MessageKind, ReceiverEvent};
use crate::receiver::ReceiverError;
use futures::FutureExt;
use std::collections::VecDeque;
use std::io;
use std::task::{Context, Poll};

pub(crate) enum Dispatch {
    Ready(ReceiverEvent),
    Decompressing(MessageKind, DecompressFuture),
}

// Completed messages in arrival order. A message waiting for decompression holds back everything
// queued behind it.
#[derive(Default)]
pub(crate) struct DispatchQueue {
    queue: VecDeque<Dispatch>,
}

impl DispatchQueue {
    pub(crate) fn push(&mut self, dispatch: Dispatch) {
        self.queue.push_back(dispatch);
    }
    pub(crate) fn len(&self) -> usize {
        self.queue.len()
    }
    pub(crate) fn clear(&mut self) {
        self.queue.clear();
    }
    // Delivers queued messages until the queue is empty or the head is still decompressing.
    pub(crate) fn poll_flush<H: MessageHandler>(
        &mut self,
        handler: &mut H,
        cx: &mut Context<'_>,
    ) -> Poll<()> {
        while let Some(dispatch) = self.queue.pop_front() {
            let event = match dispatch {
                Dispatch::Ready(event) => event,
                Dispatch::Decompressing(kind, mut future) => match future.poll_unpin(cx) {
                    Poll::Ready(result) => decompressed_event(kind, result),
                    Poll::Pending => {
                        self.queue.push_front(Dispatch::Decompressing(kind, future));
                        return Poll::Pending;
                    }
                },
            };
            deliver(handler, event);
        }
        Poll::Ready(())
    }
}

pub(crate) fn message_event(kind: MessageKind, data: Vec<u8>) -> ReceiverEvent {
    match kind {
        MessageKind::Binary => ReceiverEvent::Binary(data),
        MessageKind::Text => match String::from_utf8(data) {
            Ok(text) => ReceiverEvent::Text(text),
            Err(_) => ReceiverEvent::Error(ReceiverError::InvalidUtf8),
        },
    }
}

fn decompressed_event(kind: MessageKind, result: io::Result<Vec<u8>>) -> ReceiverEvent {
    match result {
        Ok(data) => message_event(kind, data),
        Err(err) => ReceiverEvent::Error(ReceiverError::InvalidCompressedData(err.to_string())),
    }
}

fn deliver<H: MessageHandler>(handler: &mut H, event: ReceiverEvent) {
    match event {
        ReceiverEvent::Text(text) => handler.on_text(text),
        ReceiverEvent::Binary(data) => handler.on_binary(data),
        ReceiverEvent::Ping(payload) => handler.on_ping(payload),
        ReceiverEvent::Pong(payload) => handler.on_pong(payload),
        ReceiverEvent::Close(code, reason) => handler.on_close(code, reason),
        ReceiverEvent::Error(err) => {
            log::warn!("dropping message: {}", err);
            handler.on_error(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Dispatch, DispatchQueue};
    use crate::message::{MessageKind, ReceiverEvent};
    use crate::receiver::ReceiverError;
    use futures::channel::oneshot;
    use futures::task::noop_waker_ref;
    use futures::FutureExt;
    use std::io;
    use std::task::{Context, Poll};

    #[test]
    fn pending_head_blocks_queue() {
        let mut queue = DispatchQueue::default();
        let mut events: Vec<ReceiverEvent> = Vec::new();
        let (tx, rx) = oneshot::channel::<Vec<u8>>();
        let future = async move { rx.await.map_err(|_| io::Error::from(io::ErrorKind::Other)) };
        queue.push(Dispatch::Decompressing(MessageKind::Text, future.boxed()));
        queue.push(Dispatch::Ready(ReceiverEvent::Binary(vec![1])));
        let mut cx = Context::from_waker(noop_waker_ref());
        assert_eq!(queue.poll_flush(&mut events, &mut cx), Poll::Pending);
        assert!(events.is_empty());
        assert_eq!(queue.len(), 2);
        tx.send(b"first".to_vec()).unwrap();
        assert_eq!(queue.poll_flush(&mut events, &mut cx), Poll::Ready(()));
        assert_eq!(
            events,
            vec![
                ReceiverEvent::Text("first".into()),
                ReceiverEvent::Binary(vec![1])
            ]
        );
    }

    #[test]
    fn failed_decompression_is_reported_in_order() {
        let mut queue = DispatchQueue::default();
        let mut events: Vec<ReceiverEvent> = Vec::new();
        let future = async {
            Err::<Vec<u8>, _>(io::Error::new(io::ErrorKind::InvalidData, "corrupt"))
        };
        queue.push(Dispatch::Decompressing(MessageKind::Binary, future.boxed()));
        queue.push(Dispatch::Ready(ReceiverEvent::Pong(vec![])));
        let mut cx = Context::from_waker(noop_waker_ref());
        assert_eq!(queue.poll_flush(&mut events, &mut cx), Poll::Ready(()));
        assert_eq!(
            events,
            vec![
                ReceiverEvent::Error(ReceiverError::InvalidCompressedData("corrupt".into())),
                ReceiverEvent::Pong(vec![])
            ]
        );
    }

    #[test]
    fn invalid_utf8_after_decompression() {
        let mut queue = DispatchQueue::default();
        let mut events: Vec<ReceiverEvent> = Vec::new();
        let future = async { Ok::<_, io::Error>(vec![0xC3, 0x28]) };
        queue.push(Dispatch::Decompressing(MessageKind::Text, future.boxed()));
        let mut cx = Context::from_waker(noop_waker_ref());
        assert_eq!(queue.poll_flush(&mut events, &mut cx), Poll::Ready(()));
        assert_eq!(events, vec![ReceiverEvent::Error(ReceiverError::InvalidUtf8)]);
    }
}
