use crate::dungeon::error::DecodeError;

fn check_bounds(data: &[u8], offset: usize, width: usize) -> Result<(), DecodeError> {
    match offset.checked_add(width) {
        Some(end) if end <= data.len() => Ok(()),
        _ => Err(DecodeError::OutOfBounds {
            offset,
            width,
            len: data.len(),
        }),
    }
}

pub fn read_u8(data: &[u8], offset: usize) -> Result<u8, DecodeError> {
    check_bounds(data, offset, 1)?;
    Ok(data[offset])
}

pub fn read_u16_le(data: &[u8], offset: usize) -> Result<u16, DecodeError> {
    check_bounds(data, offset, 2)?;
    Ok(u16::from_le_bytes([data[offset], data[offset + 1]]))
}

/// Borrow `length` bytes starting at `offset`.
pub fn read_bytes(data: &[u8], offset: usize, length: usize) -> Result<&[u8], DecodeError> {
    check_bounds(data, offset, length)?;
    Ok(&data[offset..offset + length])
}

/// Offset of entry `index` in a table of `stride`-byte entries starting at `base`.
pub fn entry_offset(base: usize, index: usize, stride: usize) -> Result<usize, DecodeError> {
    index
        .checked_mul(stride)
        .and_then(|rel| base.checked_add(rel))
        .ok_or(DecodeError::OffsetOverflow {
            base,
            index,
            stride,
        })
}

/// Bytes available from `offset` to the end of the buffer (zero past the end).
pub fn remaining(data: &[u8], offset: usize) -> usize {
    data.len().saturating_sub(offset)
}
