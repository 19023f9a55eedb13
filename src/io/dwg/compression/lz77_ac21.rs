//! LZ77 decompression, AC21 variant (R2007 only).
//!
//! A different opcode format from the AC18 variant; compressed data arrives
//! here after Reed-Solomon de-interleaving.

use crate::error::{DwgError, Result};

struct State {
    source_offset: u32,
    length: u32,
    source_index: u32,
    op_code: u32,
}

fn byte_at(source: &[u8], index: u32) -> Result<u32> {
    source
        .get(index as usize)
        .map(|b| *b as u32)
        .ok_or_else(|| DwgError::Decompression("unexpected end of AC21 stream".into()))
}

/// Decompress an AC21 stream into `decompressed_size` bytes.
pub fn decompress(source: &[u8], decompressed_size: usize) -> Result<Vec<u8>> {
    let mut buffer = vec![0u8; decompressed_size];
    decompress_into(source, 0, source.len() as u32, &mut buffer)?;
    Ok(buffer)
}

/// Decompress `length` bytes of `source` starting at `initial_offset` into a
/// pre-sized output buffer.
pub fn decompress_into(
    source: &[u8],
    initial_offset: u32,
    length: u32,
    buffer: &mut [u8],
) -> Result<()> {
    let mut state = State {
        source_offset: 0,
        length: 0,
        source_index: initial_offset,
        op_code: byte_at(source, initial_offset)?,
    };

    let mut dest_index: u32 = 0;
    let end_index = initial_offset + length;
    state.source_index += 1;

    if state.source_index >= end_index {
        return Ok(());
    }

    if (state.op_code & 0xF0) == 0x20 {
        state.source_index += 3;
        state.length = byte_at(source, state.source_index - 1)? & 7;
    }

    while state.source_index < end_index {
        copy_literal_run(source, buffer, &mut dest_index, &mut state)?;

        if state.source_index >= end_index {
            break;
        }

        dest_index = copy_match_chunks(source, end_index, buffer, dest_index, &mut state)?;
    }

    Ok(())
}

fn copy_literal_run(
    source: &[u8],
    dest: &mut [u8],
    dest_index: &mut u32,
    state: &mut State,
) -> Result<()> {
    if state.length == 0 {
        read_literal_length(source, state)?;
    }

    let si = state.source_index as usize;
    let di = *dest_index as usize;
    let len = state.length as usize;
    if si + len > source.len() {
        return Err(DwgError::Decompression("literal run exceeds AC21 stream".into()));
    }
    if di + len > dest.len() {
        return Err(DwgError::Decompression("literal run exceeds output".into()));
    }
    dest[di..di + len].copy_from_slice(&source[si..si + len]);

    state.source_index += state.length;
    *dest_index += state.length;
    Ok(())
}

fn copy_match_chunks(
    src: &[u8],
    end_index: u32,
    dst: &mut [u8],
    mut dest_index: u32,
    state: &mut State,
) -> Result<u32> {
    state.length = 0;
    state.op_code = byte_at(src, state.source_index)?;
    state.source_index += 1;

    read_match_instruction(src, state)?;

    loop {
        copy_backwards(dst, dest_index, state.length, state.source_offset)?;
        dest_index += state.length;
        state.length = state.op_code & 0x07;

        if state.length != 0 || state.source_index >= end_index {
            break;
        }

        state.op_code = byte_at(src, state.source_index)?;
        state.source_index += 1;

        if state.op_code >> 4 == 0 {
            break;
        }
        if state.op_code >> 4 == 0x0F {
            state.op_code &= 0x0F;
        }

        read_match_instruction(src, state)?;
    }

    Ok(dest_index)
}

fn read_match_instruction(buffer: &[u8], state: &mut State) -> Result<()> {
    match state.op_code >> 4 {
        0 => {
            state.length = (state.op_code & 0x0F) + 0x13;
            state.source_offset = byte_at(buffer, state.source_index)?;
            state.source_index += 1;
            state.op_code = byte_at(buffer, state.source_index)?;
            state.source_index += 1;
            state.length += (state.op_code >> 3) & 0x10;
            state.source_offset += ((state.op_code & 0x78) << 5) + 1;
        }
        1 => {
            state.length = (state.op_code & 0x0F) + 3;
            state.source_offset = byte_at(buffer, state.source_index)?;
            state.source_index += 1;
            state.op_code = byte_at(buffer, state.source_index)?;
            state.source_index += 1;
            state.source_offset += ((state.op_code & 0xF8) << 5) + 1;
        }
        2 => {
            state.source_offset = byte_at(buffer, state.source_index)?;
            state.source_index += 1;
            state.source_offset |= (byte_at(buffer, state.source_index)? << 8) & 0xFF00;
            state.source_index += 1;
            state.length = state.op_code & 7;
            if (state.op_code & 8) == 0 {
                state.op_code = byte_at(buffer, state.source_index)?;
                state.source_index += 1;
                state.length += state.op_code & 0xF8;
            } else {
                state.source_offset += 1;
                state.length += byte_at(buffer, state.source_index)? << 3;
                state.source_index += 1;
                state.op_code = byte_at(buffer, state.source_index)?;
                state.source_index += 1;
                state.length += ((state.op_code & 0xF8) << 8) + 0x100;
            }
        }
        _ => {
            state.length = state.op_code >> 4;
            state.source_offset = state.op_code & 0x0F;
            state.op_code = byte_at(buffer, state.source_index)?;
            state.source_index += 1;
            state.source_offset += ((state.op_code & 0xF8) << 1) + 1;
        }
    }
    Ok(())
}

fn read_literal_length(buffer: &[u8], state: &mut State) -> Result<()> {
    state.length = state.op_code + 8;
    if state.length == 0x17 {
        let mut n = byte_at(buffer, state.source_index)?;
        state.source_index += 1;
        state.length += n;
        if n == 0xFF {
            loop {
                n = byte_at(buffer, state.source_index)?;
                state.source_index += 1;
                n |= byte_at(buffer, state.source_index)? << 8;
                state.source_index += 1;
                state.length += n;
                if n != 0xFFFF {
                    break;
                }
            }
        }
    }
    Ok(())
}

fn copy_backwards(dst: &mut [u8], dst_index: u32, length: u32, offset: u32) -> Result<()> {
    if offset > dst_index {
        return Err(DwgError::Decompression(
            "AC21 back-reference before start of output".into(),
        ));
    }
    let mut src = (dst_index - offset) as usize;
    let mut di = dst_index as usize;
    let end = src + length as usize;
    if di + length as usize > dst.len() {
        return Err(DwgError::Decompression(
            "AC21 back-reference exceeds output".into(),
        ));
    }
    while src < end {
        dst[di] = dst[src];
        di += 1;
        src += 1;
    }
    Ok(())
}
