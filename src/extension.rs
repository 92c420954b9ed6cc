use futures::future::BoxFuture;
use std::io;

pub type DecompressFuture = BoxFuture<'static, io::Result<Vec<u8>>>;

/// Decompresses whole messages whose first frame had RSV1 set.
///
/// Called once per message with the concatenated, unmasked payload of all its frames, so `fin` is
/// always true for this receiver. The returned future may complete on a later turn; messages are
/// still delivered in arrival order.
pub trait Decompressor: Send {
    fn decompress(&mut self, data: Vec<u8>, fin: bool) -> DecompressFuture;
}

impl<F> Decompressor for F
where
    F: FnMut(Vec<u8>, bool) -> DecompressFuture + Send,
{
    fn decompress(&mut self, data: Vec<u8>, fin: bool) -> DecompressFuture {
        self(data, fin)
    }
}
