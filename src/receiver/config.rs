/// Default upper bound for the payload of one message, 100 MiB.
pub const DEFAULT_MAX_PAYLOAD: u64 = 100 * 1024 * 1024;

pub struct ReceiverConfig {
    // Upper bound for the payload of one message, summed over its frames. `None` lifts the limit,
    // in which case a peer announcing a huge length makes the pool allocate that much.
    pub max_payload: Option<u64>,
    // Initial size of each of the two buffer pools.
    pub pool_size: usize,
    _private: (),
}

impl ReceiverConfig {
    pub fn new() -> Self {
        Self {
            max_payload: Some(DEFAULT_MAX_PAYLOAD),
            pool_size: 1024,
            _private: (),
        }
    }
    pub fn with_max_payload(max_payload: u64) -> Self {
        Self {
            max_payload: Some(max_payload),
            ..Self::new()
        }
    }
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self::new()
    }
}
