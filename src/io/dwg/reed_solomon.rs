//! Reed-Solomon byte de-interleaving for AC21 (R2007) files.
//!
//! The "Reed-Solomon" coding in DWG is plain byte interleaving across a
//! number of tracks; the parity bytes at the end of each 255-byte track are
//! ignored rather than used for correction. The file header uses 3 tracks
//! of 239 data bytes; section pages use 251-byte data blocks.

/// De-interleave an encoded byte array into `output_size` plain bytes.
pub fn decode(encoded: &[u8], output_size: usize, factor: usize, block_size: usize) -> Vec<u8> {
    let mut buffer = vec![0u8; output_size];
    let mut index = 0usize;
    let mut remaining = output_size;

    for track in 0..factor {
        let mut cindex = track;
        let size = remaining.min(block_size);
        remaining -= size;
        let stop = index + size;
        while index < stop {
            if cindex < encoded.len() {
                buffer[index] = encoded[cindex];
            }
            index += 1;
            cindex += factor;
        }
    }

    buffer
}

/// Interleave plain data across `factor` tracks of 255 bytes (inverse of
/// [`decode`], parity bytes left zero).
pub fn encode(data: &[u8], factor: usize, block_size: usize) -> Vec<u8> {
    let mut encoded = vec![0u8; factor * 255];
    let mut index = 0usize;
    let mut remaining = data.len();

    for track in 0..factor {
        let mut cindex = track;
        let size = remaining.min(block_size);
        remaining -= size;
        let stop = index + size;
        while index < stop {
            if cindex < encoded.len() && index < data.len() {
                encoded[cindex] = data[index];
            }
            index += 1;
            cindex += factor;
        }
    }

    encoded
}

/// Compute the number of tracks and the on-disk read size for a page.
pub fn page_params(compressed_size: u64, correction_factor: u64, block_size: usize) -> (usize, usize) {
    let aligned = (compressed_size + 7) & !7u64;
    let total = (aligned * correction_factor.max(1)) as usize;
    let factor = total.div_ceil(block_size);
    (factor, factor * 255)
}
