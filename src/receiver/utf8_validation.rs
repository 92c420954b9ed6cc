use utf8::{DecodeError, Incomplete};

// Feeds `input` into an incremental validator. Returns false as soon as an invalid sequence is
// seen. A trailing partial code point is kept in `state` for the next call.
pub(super) fn process_utf8(state: &mut Incomplete, mut input: &[u8]) -> bool {
    if !state.is_empty() {
        match state.try_complete(input) {
            None => return true,
            Some((Err(_), _)) => return false,
            Some((Ok(_), remaining)) => input = remaining,
        }
    }
    match utf8::decode(input) {
        Ok(_) => true,
        Err(DecodeError::Incomplete {
            incomplete_suffix, ..
        }) => {
            *state = incomplete_suffix;
            true
        }
        Err(DecodeError::Invalid { .. }) => false,
    }
}
