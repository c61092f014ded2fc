//! CLI metadata: stream headers, table row sizes and the Assembly row.

use crate::error::IdentityError;
use crate::image::{Image, align4};

const METADATA_SIGNATURE: u32 = 0x424A_5342;

const HEAP_STRINGS_WIDE: u8 = 0x01;
const HEAP_GUID_WIDE: u8 = 0x02;
const HEAP_BLOB_WIDE: u8 = 0x04;
const HEAP_EXTRA_DATA: u8 = 0x40;

const MODULE: usize = 0x00;
const TYPE_REF: usize = 0x01;
const TYPE_DEF: usize = 0x02;
const FIELD: usize = 0x04;
const METHOD_DEF: usize = 0x06;
const PARAM: usize = 0x08;
const INTERFACE_IMPL: usize = 0x09;
const MEMBER_REF: usize = 0x0A;
const DECL_SECURITY: usize = 0x0E;
const STAND_ALONE_SIG: usize = 0x11;
const EVENT: usize = 0x14;
const PROPERTY: usize = 0x17;
const MODULE_REF: usize = 0x1A;
const TYPE_SPEC: usize = 0x1B;
const ASSEMBLY: usize = 0x20;
const ASSEMBLY_REF: usize = 0x23;
const FILE: usize = 0x26;
const EXPORTED_TYPE: usize = 0x27;
const MANIFEST_RESOURCE: usize = 0x28;
const GENERIC_PARAM: usize = 0x2A;
const METHOD_SPEC: usize = 0x2B;
const GENERIC_PARAM_CONSTRAINT: usize = 0x2C;

#[derive(Clone, Copy)]
enum Coded {
  TypeDefOrRef,
  HasConstant,
  HasCustomAttribute,
  HasFieldMarshal,
  HasDeclSecurity,
  MemberRefParent,
  HasSemantics,
  MethodDefOrRef,
  MemberForwarded,
  CustomAttributeType,
  ResolutionScope,
}

impl Coded {
  fn tag_bits(self) -> u32 {
    match self {
      Coded::HasFieldMarshal
      | Coded::HasSemantics
      | Coded::MethodDefOrRef
      | Coded::MemberForwarded => 1,
      Coded::TypeDefOrRef
      | Coded::HasConstant
      | Coded::HasDeclSecurity
      | Coded::ResolutionScope => 2,
      Coded::MemberRefParent | Coded::CustomAttributeType => 3,
      Coded::HasCustomAttribute => 5,
    }
  }

  fn tables(self) -> &'static [usize] {
    match self {
      Coded::TypeDefOrRef => &[TYPE_DEF, TYPE_REF, TYPE_SPEC],
      Coded::HasConstant => &[FIELD, PARAM, PROPERTY],
      Coded::HasCustomAttribute => &[
        METHOD_DEF,
        FIELD,
        TYPE_REF,
        TYPE_DEF,
        PARAM,
        INTERFACE_IMPL,
        MEMBER_REF,
        MODULE,
        DECL_SECURITY,
        PROPERTY,
        EVENT,
        STAND_ALONE_SIG,
        MODULE_REF,
        TYPE_SPEC,
        ASSEMBLY,
        ASSEMBLY_REF,
        FILE,
        EXPORTED_TYPE,
        MANIFEST_RESOURCE,
        GENERIC_PARAM,
        GENERIC_PARAM_CONSTRAINT,
        METHOD_SPEC,
      ],
      Coded::HasFieldMarshal => &[FIELD, PARAM],
      Coded::HasDeclSecurity => &[TYPE_DEF, METHOD_DEF, ASSEMBLY],
      Coded::MemberRefParent => &[TYPE_DEF, TYPE_REF, MODULE_REF, METHOD_DEF, TYPE_SPEC],
      Coded::HasSemantics => &[EVENT, PROPERTY],
      Coded::MethodDefOrRef => &[METHOD_DEF, MEMBER_REF],
      Coded::MemberForwarded => &[FIELD, METHOD_DEF],
      Coded::CustomAttributeType => &[METHOD_DEF, MEMBER_REF],
      Coded::ResolutionScope => &[MODULE, MODULE_REF, ASSEMBLY_REF, TYPE_REF],
    }
  }
}

#[derive(Clone, Copy)]
enum Column {
  Fixed(usize),
  Strings,
  Guid,
  Blob,
  Table(usize),
  Coded(Coded),
}

use Column::{Blob, Fixed, Guid, Strings, Table};

/// Column layout of the tables that precede the Assembly table.
const SCHEMAS: [&[Column]; ASSEMBLY] = [
  // Module
  &[Fixed(2), Strings, Guid, Guid, Guid],
  // TypeRef
  &[Column::Coded(Coded::ResolutionScope), Strings, Strings],
  // TypeDef
  &[
    Fixed(4),
    Strings,
    Strings,
    Column::Coded(Coded::TypeDefOrRef),
    Table(FIELD),
    Table(METHOD_DEF),
  ],
  // FieldPtr
  &[Table(FIELD)],
  // Field
  &[Fixed(2), Strings, Blob],
  // MethodPtr
  &[Table(METHOD_DEF)],
  // MethodDef
  &[Fixed(4), Fixed(2), Fixed(2), Strings, Blob, Table(PARAM)],
  // ParamPtr
  &[Table(PARAM)],
  // Param
  &[Fixed(2), Fixed(2), Strings],
  // InterfaceImpl
  &[Table(TYPE_DEF), Column::Coded(Coded::TypeDefOrRef)],
  // MemberRef
  &[Column::Coded(Coded::MemberRefParent), Strings, Blob],
  // Constant
  &[Fixed(2), Column::Coded(Coded::HasConstant), Blob],
  // CustomAttribute
  &[
    Column::Coded(Coded::HasCustomAttribute),
    Column::Coded(Coded::CustomAttributeType),
    Blob,
  ],
  // FieldMarshal
  &[Column::Coded(Coded::HasFieldMarshal), Blob],
  // DeclSecurity
  &[Fixed(2), Column::Coded(Coded::HasDeclSecurity), Blob],
  // ClassLayout
  &[Fixed(2), Fixed(4), Table(TYPE_DEF)],
  // FieldLayout
  &[Fixed(4), Table(FIELD)],
  // StandAloneSig
  &[Blob],
  // EventMap
  &[Table(TYPE_DEF), Table(EVENT)],
  // EventPtr
  &[Table(EVENT)],
  // Event
  &[Fixed(2), Strings, Column::Coded(Coded::TypeDefOrRef)],
  // PropertyMap
  &[Table(TYPE_DEF), Table(PROPERTY)],
  // PropertyPtr
  &[Table(PROPERTY)],
  // Property
  &[Fixed(2), Strings, Blob],
  // MethodSemantics
  &[Fixed(2), Table(METHOD_DEF), Column::Coded(Coded::HasSemantics)],
  // MethodImpl
  &[
    Table(TYPE_DEF),
    Column::Coded(Coded::MethodDefOrRef),
    Column::Coded(Coded::MethodDefOrRef),
  ],
  // ModuleRef
  &[Strings],
  // TypeSpec
  &[Blob],
  // ImplMap
  &[
    Fixed(2),
    Column::Coded(Coded::MemberForwarded),
    Strings,
    Table(MODULE_REF),
  ],
  // FieldRVA
  &[Fixed(4), Table(FIELD)],
  // EncLog
  &[Fixed(4), Fixed(4)],
  // EncMap
  &[Fixed(4)],
];

struct TableLayout {
  rows: [u32; 64],
  strings: usize,
  guid: usize,
  blob: usize,
}

impl TableLayout {
  fn new(rows: [u32; 64], heap_sizes: u8) -> Self {
    let width = |flag: u8| if heap_sizes & flag != 0 { 4 } else { 2 };
    Self {
      rows,
      strings: width(HEAP_STRINGS_WIDE),
      guid: width(HEAP_GUID_WIDE),
      blob: width(HEAP_BLOB_WIDE),
    }
  }

  fn column_size(&self, column: Column) -> usize {
    match column {
      Fixed(size) => size,
      Strings => self.strings,
      Guid => self.guid,
      Blob => self.blob,
      Table(table) => {
        if self.rows[table] < 1 << 16 {
          2
        } else {
          4
        }
      }
      Column::Coded(coded) => {
        let max_rows = coded
          .tables()
          .iter()
          .map(|&table| self.rows[table])
          .max()
          .unwrap_or(0);
        if max_rows < 1 << (16 - coded.tag_bits()) {
          2
        } else {
          4
        }
      }
    }
  }

  fn row_size(&self, table: usize) -> usize {
    SCHEMAS[table]
      .iter()
      .map(|&column| self.column_size(column))
      .sum()
  }
}

#[derive(Clone, Copy)]
struct Stream {
  offset: usize,
  size: usize,
}

/// Name and version from the first row of the Assembly table.
pub(crate) struct AssemblyRow {
  pub name: String,
  pub version: [u16; 4],
}

pub(crate) fn read_assembly(image: &Image<'_>, root: usize) -> Result<AssemblyRow, IdentityError> {
  if image.u32(root)? != METADATA_SIGNATURE {
    return Err(IdentityError::invalid("missing metadata signature"));
  }

  let version_length = image.u32(root + 12)? as usize;
  let header_end = root + 16 + align4(version_length);
  let stream_count = image.u16(header_end + 2)?;

  let mut tables = None;
  let mut strings = None;
  let mut cursor = header_end + 4;
  for _ in 0..stream_count {
    let stream = Stream {
      offset: root + image.u32(cursor)? as usize,
      size: image.u32(cursor + 4)? as usize,
    };
    let name = image.c_str(cursor + 8)?;
    cursor += 8 + align4(name.len() + 1);

    match name {
      b"#~" | b"#-" => tables = Some(stream),
      b"#Strings" => strings = Some(stream),
      _ => {}
    }
  }

  let tables = tables.ok_or_else(|| IdentityError::invalid("no metadata tables stream"))?;
  let strings = strings.ok_or_else(|| IdentityError::invalid("no strings heap"))?;

  let heap_sizes = image.u8(tables.offset + 6)?;
  let present = image.u64(tables.offset + 8)?;

  let mut rows = [0u32; 64];
  let mut cursor = tables.offset + 24;
  for (table, count) in rows.iter_mut().enumerate() {
    if present & (1 << table) != 0 {
      *count = image.u32(cursor)?;
      cursor += 4;
    }
  }
  if heap_sizes & HEAP_EXTRA_DATA != 0 {
    cursor += 4;
  }

  if rows[ASSEMBLY] == 0 {
    return Err(IdentityError::NoAssembly);
  }

  let layout = TableLayout::new(rows, heap_sizes);
  for table in 0..ASSEMBLY {
    let size = (layout.rows[table] as usize)
      .checked_mul(layout.row_size(table))
      .ok_or_else(|| IdentityError::invalid("metadata tables overflow"))?;
    cursor = cursor
      .checked_add(size)
      .ok_or_else(|| IdentityError::invalid("metadata tables overflow"))?;
  }

  // HashAlgId, MajorVersion, MinorVersion, BuildNumber, RevisionNumber, Flags,
  // PublicKey, Name, Culture
  let version = [
    image.u16(cursor + 4)?,
    image.u16(cursor + 6)?,
    image.u16(cursor + 8)?,
    image.u16(cursor + 10)?,
  ];
  let name_index = image.index(cursor + 16 + layout.blob, layout.strings)?;
  if name_index >= strings.size {
    return Err(IdentityError::invalid(format!(
      "assembly name index {name_index:#x} is outside the strings heap"
    )));
  }

  let name = image.c_str(strings.offset + name_index)?;
  let name = std::str::from_utf8(name).map_err(|_| IdentityError::InvalidName)?;
  if name.is_empty() {
    return Err(IdentityError::invalid("assembly name is empty"));
  }

  Ok(AssemblyRow {
    name: name.to_string(),
    version,
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_small_row_sizes() {
    let layout = TableLayout::new([0; 64], 0);
    assert_eq!(layout.row_size(MODULE), 10);
    assert_eq!(layout.row_size(TYPE_REF), 6);
    assert_eq!(layout.row_size(TYPE_DEF), 14);
    assert_eq!(layout.row_size(METHOD_DEF), 14);
    assert_eq!(layout.row_size(0x0C), 6);
  }

  #[test]
  fn test_wide_heaps() {
    let layout = TableLayout::new([0; 64], HEAP_STRINGS_WIDE | HEAP_GUID_WIDE | HEAP_BLOB_WIDE);
    assert_eq!(layout.row_size(MODULE), 2 + 4 * 4);
    assert_eq!(layout.row_size(FIELD), 2 + 4 + 4);
  }

  #[test]
  fn test_coded_index_widens_with_tag_bits() {
    let mut rows = [0u32; 64];
    // 2^11 rows overflow a 5-bit tag but not a 2-bit one.
    rows[METHOD_DEF] = 1 << 11;
    let layout = TableLayout::new(rows, 0);

    assert_eq!(layout.column_size(Column::Coded(Coded::HasCustomAttribute)), 4);
    assert_eq!(layout.column_size(Column::Coded(Coded::MethodDefOrRef)), 2);
    assert_eq!(layout.column_size(Table(METHOD_DEF)), 2);
  }

  #[test]
  fn test_simple_index_widens_past_u16() {
    let mut rows = [0u32; 64];
    rows[FIELD] = 1 << 16;
    let layout = TableLayout::new(rows, 0);
    assert_eq!(layout.column_size(Table(FIELD)), 4);
  }
}
