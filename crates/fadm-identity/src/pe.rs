//! PE/COFF headers, up to the location of the CLI metadata root.

use crate::error::IdentityError;
use crate::image::Image;

const DOS_SIGNATURE: &[u8] = b"MZ";
const PE_SIGNATURE: &[u8] = b"PE\0\0";
const DOS_HEADER_SIZE: usize = 0x40;
const PE_OFFSET_FIELD: usize = 0x3C;
const COFF_HEADER_SIZE: usize = 20;
const SECTION_HEADER_SIZE: usize = 40;

const PE32_MAGIC: u16 = 0x10b;
const PE32_PLUS_MAGIC: u16 = 0x20b;

/// Index of the CLI header in the optional header data directories.
const CLI_HEADER_DIRECTORY: usize = 14;

fn not_pe(message: impl Into<String>) -> IdentityError {
  IdentityError::NotPortableExecutable {
    message: message.into(),
  }
}

fn not_managed(message: impl Into<String>) -> IdentityError {
  IdentityError::NotManagedAssembly {
    message: message.into(),
  }
}

struct Sections {
  table: usize,
  count: usize,
}

impl Sections {
  /// Map a relative virtual address to a file offset.
  fn to_offset(&self, image: &Image<'_>, rva: u32) -> Result<usize, IdentityError> {
    for index in 0..self.count {
      let header = self.table + index * SECTION_HEADER_SIZE;
      let virtual_size = image.u32(header + 8)?;
      let virtual_address = image.u32(header + 12)?;
      let raw_size = image.u32(header + 16)?;
      let raw_pointer = image.u32(header + 20)?;

      let start = virtual_address as u64;
      let end = start + virtual_size.max(raw_size) as u64;
      if (start..end).contains(&(rva as u64)) {
        return Ok(raw_pointer as usize + (rva - virtual_address) as usize);
      }
    }

    Err(IdentityError::invalid(format!(
      "RVA {rva:#x} is outside every section"
    )))
  }
}

/// File offset of the metadata root of a managed image.
pub(crate) fn metadata_root(image: &Image<'_>) -> Result<usize, IdentityError> {
  if image.len() < DOS_HEADER_SIZE || image.slice(0, 2)? != DOS_SIGNATURE {
    return Err(not_pe("missing DOS header"));
  }

  let pe = image.u32(PE_OFFSET_FIELD)? as usize;
  if image.slice(pe, 4).ok() != Some(PE_SIGNATURE) {
    return Err(not_pe("missing PE signature"));
  }

  let coff = pe + 4;
  let section_count = image.u16(coff + 2)? as usize;
  let optional_size = image.u16(coff + 16)? as usize;
  let optional = coff + COFF_HEADER_SIZE;

  let (count_field, directories) = match image.u16(optional)? {
    PE32_MAGIC => (92, 96),
    PE32_PLUS_MAGIC => (108, 112),
    magic => return Err(not_pe(format!("unknown optional header magic {magic:#x}"))),
  };

  let directory_count = image.u32(optional + count_field)? as usize;
  if directory_count <= CLI_HEADER_DIRECTORY {
    return Err(not_managed("no CLI header directory"));
  }

  let cli_rva = image.u32(optional + directories + CLI_HEADER_DIRECTORY * 8)?;
  if cli_rva == 0 {
    return Err(not_managed("CLI header directory is empty"));
  }

  let sections = Sections {
    table: optional + optional_size,
    count: section_count,
  };
  let cli = sections.to_offset(image, cli_rva)?;

  let metadata_rva = image.u32(cli + 8)?;
  if metadata_rva == 0 {
    return Err(not_managed("CLI header has no metadata"));
  }
  sections.to_offset(image, metadata_rva)
}
