use crate::receiver::ReceiverError;

// Reported when a close frame carries no status code.
pub const NO_STATUS_RECEIVED: u16 = 1005;

pub(crate) fn is_valid_close_code(code: u16) -> bool {
    match code {
        1004 | 1005 | 1006 => false,
        1000..=1011 => true,
        3000..=4999 => true,
        _ => false,
    }
}

// Splits a close frame payload into status code and reason.
pub(crate) fn parse_close_payload(payload: &[u8]) -> Result<(u16, &[u8]), ReceiverError> {
    match payload.len() {
        0 => Ok((NO_STATUS_RECEIVED, &[][..])),
        1 => Err(ReceiverError::InvalidClosePayload),
        _ => {
            let code = u16::from_be_bytes([payload[0], payload[1]]);
            if !is_valid_close_code(code) {
                return Err(ReceiverError::InvalidCloseCode(code));
            }
            let reason = &payload[2..];
            if utf8::decode(reason).is_err() {
                return Err(ReceiverError::InvalidUtf8);
            }
            Ok((code, reason))
        }
    }
}
