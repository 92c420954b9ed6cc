use crate::frame::{ControlPayload, FRAME_HEAD_START_LEN, MASK_KEY_LEN};
use crate::pool::{PoolKind, PoolView, Pools};

// What the bytes of an expectation are for.
#[derive(Debug)]
pub(crate) enum Stage {
    HeadStart,
    ExtendedLen16,
    ExtendedLen64,
    MaskKey,
    Payload(Destination),
}

#[derive(Debug)]
pub(crate) enum Destination {
    Control(ControlPayload),
    Pool(PoolKind, PoolView),
}

// Number of bytes the receiver needs before it can advance, and where they go. Head stages are
// collected into a small scratch buffer owned by the receiver.
#[derive(Debug)]
pub(crate) struct Expectation {
    pub(crate) stage: Stage,
    pub(crate) needed: usize,
    pub(crate) filled: usize,
}

impl Expectation {
    pub(crate) fn new(stage: Stage, needed: usize) -> Self {
        Self {
            stage,
            needed,
            filled: 0,
        }
    }
    pub(crate) fn head_start() -> Self {
        Self::new(Stage::HeadStart, FRAME_HEAD_START_LEN)
    }
    pub(crate) fn extended_len(bytes: usize) -> Self {
        match bytes {
            2 => Self::new(Stage::ExtendedLen16, 2),
            _ => Self::new(Stage::ExtendedLen64, 8),
        }
    }
    pub(crate) fn mask_key() -> Self {
        Self::new(Stage::MaskKey, MASK_KEY_LEN)
    }
    pub(crate) fn is_complete(&self) -> bool {
        self.filled == self.needed
    }
    // The part of the destination that is still to be filled.
    pub(crate) fn window<'a>(
        &'a mut self,
        scratch: &'a mut [u8],
        pools: &'a mut Pools,
    ) -> &'a mut [u8] {
        let (filled, needed) = (self.filled, self.needed);
        match &mut self.stage {
            Stage::Payload(Destination::Control(payload)) => &mut payload.data_mut()[filled..],
            Stage::Payload(Destination::Pool(kind, view)) => {
                &mut pools.get_mut(*kind).view_mut(view)[filled..]
            }
            _ => &mut scratch[filled..needed],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Destination, Expectation, Stage};
    use crate::frame::{ControlKind, ControlPayload};
    use crate::pool::{PoolKind, Pools};

    #[test]
    fn head_window_uses_scratch() {
        let mut pools = Pools::new(0);
        let mut scratch = [0u8; 8];
        let mut expectation = Expectation::extended_len(8);
        assert_eq!(expectation.window(&mut scratch, &mut pools).len(), 8);
        expectation.filled = 3;
        assert_eq!(expectation.window(&mut scratch, &mut pools).len(), 5);
        assert!(!expectation.is_complete());
    }

    #[test]
    fn payload_windows() {
        let mut pools = Pools::new(16);
        let mut scratch = [0u8; 8];
        let view = pools.get_mut(PoolKind::Unfragmented).acquire(10);
        let destination = Destination::Pool(PoolKind::Unfragmented, view);
        let mut expectation = Expectation::new(Stage::Payload(destination), 10);
        expectation.filled = 4;
        expectation.window(&mut scratch, &mut pools).copy_from_slice(b"abcdef");
        assert_eq!(&pools.get(PoolKind::Unfragmented).view(&view)[4..], b"abcdef");

        let payload = ControlPayload::new(ControlKind::Ping, 3);
        let mut expectation = Expectation::new(Stage::Payload(Destination::Control(payload)), 3);
        assert_eq!(expectation.window(&mut scratch, &mut pools).len(), 3);
    }
}
