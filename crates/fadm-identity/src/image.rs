use crate::error::IdentityError;

/// Bounds-checked little-endian reads over an image.
#[derive(Clone, Copy)]
pub(crate) struct Image<'a> {
  bytes: &'a [u8],
}

impl<'a> Image<'a> {
  pub(crate) fn new(bytes: &'a [u8]) -> Self {
    Self { bytes }
  }

  pub(crate) fn len(&self) -> usize {
    self.bytes.len()
  }

  pub(crate) fn slice(&self, offset: usize, len: usize) -> Result<&'a [u8], IdentityError> {
    offset
      .checked_add(len)
      .and_then(|end| self.bytes.get(offset..end))
      .ok_or(IdentityError::Truncated { offset })
  }

  pub(crate) fn u8(&self, offset: usize) -> Result<u8, IdentityError> {
    Ok(self.slice(offset, 1)?[0])
  }

  pub(crate) fn u16(&self, offset: usize) -> Result<u16, IdentityError> {
    let b = self.slice(offset, 2)?;
    Ok(u16::from_le_bytes([b[0], b[1]]))
  }

  pub(crate) fn u32(&self, offset: usize) -> Result<u32, IdentityError> {
    let b = self.slice(offset, 4)?;
    Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
  }

  pub(crate) fn u64(&self, offset: usize) -> Result<u64, IdentityError> {
    let low = self.u32(offset)? as u64;
    let high = self.u32(offset + 4)? as u64;
    Ok(high << 32 | low)
  }

  /// Heap or table index stored on 2 or 4 bytes.
  pub(crate) fn index(&self, offset: usize, size: usize) -> Result<usize, IdentityError> {
    match size {
      2 => Ok(self.u16(offset)? as usize),
      _ => Ok(self.u32(offset)? as usize),
    }
  }

  /// Null-terminated byte string starting at `offset`, without the terminator.
  pub(crate) fn c_str(&self, offset: usize) -> Result<&'a [u8], IdentityError> {
    let rest = self
      .bytes
      .get(offset..)
      .ok_or(IdentityError::Truncated { offset })?;
    let end = rest
      .iter()
      .position(|&b| b == 0)
      .ok_or(IdentityError::Truncated {
        offset: self.bytes.len(),
      })?;
    Ok(&rest[..end])
  }
}

pub(crate) fn align4(value: usize) -> usize {
  (value + 3) & !3
}
