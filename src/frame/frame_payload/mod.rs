// Copies shorter than this are done byte by byte.
const SHORT_COPY: usize = 16;

// Copies `src` into the start of `dst` and returns the number of bytes copied, which is the
// smaller of the two lengths.
pub fn copy_bytes(src: &[u8], dst: &mut [u8]) -> usize {
    let n = src.len().min(dst.len());
    match n < SHORT_COPY {
        true => {
            for i in 0..n {
                dst[i] = src[i];
            }
        }
        false => dst[..n].copy_from_slice(&src[..n]),
    }
    n
}

// Masks or unmasks a buffer with payload bytes. The offset is the offset of the buffer within the
// frames payload segment. Any multiple of 4 may be added to or subtracted from the offset without
// any effect on the result.
pub fn mask(mask: [u8; 4], mut offset: usize, buffer: &mut [u8]) {
    if mask != [0u8, 0u8, 0u8, 0u8] {
        for byte in buffer.iter_mut() {
            *byte ^= mask[offset & 3];
            offset = offset.wrapping_add(1);
        }
    }
}

// Unmasks a complete frame payload four bytes at a time. Equivalent to `mask(key, 0, buffer)`.
pub fn unmask(key: [u8; 4], buffer: &mut [u8]) {
    if key == [0u8, 0u8, 0u8, 0u8] {
        return;
    }
    let word = u32::from_ne_bytes(key);
    let mut chunks = buffer.chunks_exact_mut(4);
    for chunk in &mut chunks {
        let masked = u32::from_ne_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]) ^ word;
        chunk.copy_from_slice(&masked.to_ne_bytes());
    }
    for (i, byte) in chunks.into_remainder().iter_mut().enumerate() {
        *byte ^= key[i];
    }
}
