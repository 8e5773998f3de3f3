use crate::error::ClassFileError;
use crate::reader::Reader;

/// One slot of the constant pool. `Unusable` occupies the index immediately
/// following a `Long`/`Double` entry (the JVMS "two-slot" rule) and the
/// reserved index 0.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstantPoolEntry {
    Unusable,
    Utf8(Utf8Info),
    Integer(IntegerInfo),
    Float(FloatInfo),
    Long(LongInfo),
    Double(DoubleInfo),
    Class(ClassInfo),
    String(StringInfo),
    Fieldref(RefInfo),
    Methodref(RefInfo),
    InterfaceMethodref(RefInfo),
    NameAndType(NameAndTypeInfo),
    MethodHandle(MethodHandleInfo),
    MethodType(MethodTypeInfo),
    InvokeDynamic(InvokeDynamicInfo),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Utf8Info {
    /// Raw Modified-UTF-8 bytes, preserved losslessly (including the `C0 80`
    /// null encoding and 3-byte surrogate-pair encodings).
    pub bytes: Vec<u8>,
}

impl Utf8Info {
    /// Lossy convenience conversion for diagnostics only; never used
    /// internally for comparisons (attribute-name dispatch compares raw
    /// bytes directly).
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntegerInfo {
    pub bits: u32,
}

impl IntegerInfo {
    pub fn value(&self) -> i32 {
        self.bits as i32
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatInfo {
    pub bits: u32,
}

impl FloatInfo {
    pub fn value(&self) -> f32 {
        f32::from_bits(self.bits)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LongInfo {
    pub bits: u64,
}

impl LongInfo {
    pub fn value(&self) -> i64 {
        self.bits as i64
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DoubleInfo {
    pub bits: u64,
}

impl DoubleInfo {
    pub fn value(&self) -> f64 {
        f64::from_bits(self.bits)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassInfo {
    pub name_index: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StringInfo {
    pub string_index: u16,
}

/// Shared shape for Fieldref, Methodref and InterfaceMethodref.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefInfo {
    pub class_index: u16,
    pub name_and_type_index: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameAndTypeInfo {
    pub name_index: u16,
    pub descriptor_index: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodHandleInfo {
    pub reference_kind: u8,
    pub reference_index: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodTypeInfo {
    pub descriptor_index: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvokeDynamicInfo {
    pub bootstrap_method_attr_index: u16,
    pub name_and_type_index: u16,
}

const TAG_UTF8: u8 = 1;
const TAG_INTEGER: u8 = 3;
const TAG_FLOAT: u8 = 4;
const TAG_LONG: u8 = 5;
const TAG_DOUBLE: u8 = 6;
const TAG_CLASS: u8 = 7;
const TAG_STRING: u8 = 8;
const TAG_FIELDREF: u8 = 9;
const TAG_METHODREF: u8 = 10;
const TAG_INTERFACE_METHODREF: u8 = 11;
const TAG_NAME_AND_TYPE: u8 = 12;
const TAG_METHOD_HANDLE: u8 = 15;
const TAG_METHOD_TYPE: u8 = 16;
const TAG_INVOKE_DYNAMIC: u8 = 18;

/// Decodes `constant_pool_count` (already positioned reader) into a 1-based,
/// flat `count`-length sequence, including the index-0 sentinel and the
/// sentinel that follows every `Long`/`Double` entry.
pub fn decode_pool(reader: &mut Reader) -> Result<Vec<ConstantPoolEntry>, ClassFileError> {
    let count = reader.read_u16()?;
    let mut pool = vec![ConstantPoolEntry::Unusable; count as usize];
    let mut i: usize = 1;
    while i < count as usize {
        let tag = reader.read_u8()?;
        let entry = decode_entry(tag, reader)?;
        let is_wide = matches!(entry, ConstantPoolEntry::Long(_) | ConstantPoolEntry::Double(_));
        pool[i] = entry;
        if is_wide {
            // The JVMS two-slot rule: the index right after a Long/Double is
            // an unusable sentinel, and the next real entry is at i+2.
            i += 2;
        } else {
            i += 1;
        }
    }
    Ok(pool)
}

fn decode_entry(tag: u8, reader: &mut Reader) -> Result<ConstantPoolEntry, ClassFileError> {
    Ok(match tag {
        TAG_UTF8 => {
            let len = reader.read_u16()? as usize;
            ConstantPoolEntry::Utf8(Utf8Info {
                bytes: reader.read_bytes(len)?,
            })
        }
        TAG_INTEGER => ConstantPoolEntry::Integer(IntegerInfo {
            bits: reader.read_u32()?,
        }),
        TAG_FLOAT => ConstantPoolEntry::Float(FloatInfo {
            bits: reader.read_u32()?,
        }),
        TAG_LONG => ConstantPoolEntry::Long(LongInfo {
            bits: reader.read_u64()?,
        }),
        TAG_DOUBLE => ConstantPoolEntry::Double(DoubleInfo {
            bits: reader.read_u64()?,
        }),
        TAG_CLASS => ConstantPoolEntry::Class(ClassInfo {
            name_index: reader.read_u16()?,
        }),
        TAG_STRING => ConstantPoolEntry::String(StringInfo {
            string_index: reader.read_u16()?,
        }),
        TAG_FIELDREF => ConstantPoolEntry::Fieldref(RefInfo {
            class_index: reader.read_u16()?,
            name_and_type_index: reader.read_u16()?,
        }),
        TAG_METHODREF => ConstantPoolEntry::Methodref(RefInfo {
            class_index: reader.read_u16()?,
            name_and_type_index: reader.read_u16()?,
        }),
        TAG_INTERFACE_METHODREF => ConstantPoolEntry::InterfaceMethodref(RefInfo {
            class_index: reader.read_u16()?,
            name_and_type_index: reader.read_u16()?,
        }),
        TAG_NAME_AND_TYPE => ConstantPoolEntry::NameAndType(NameAndTypeInfo {
            name_index: reader.read_u16()?,
            descriptor_index: reader.read_u16()?,
        }),
        TAG_METHOD_HANDLE => {
            let reference_kind = reader.read_u8()?;
            if !(1..=9).contains(&reference_kind) {
                return Err(ClassFileError::InvalidReferenceKind(reference_kind));
            }
            ConstantPoolEntry::MethodHandle(MethodHandleInfo {
                reference_kind,
                reference_index: reader.read_u16()?,
            })
        }
        TAG_METHOD_TYPE => ConstantPoolEntry::MethodType(MethodTypeInfo {
            descriptor_index: reader.read_u16()?,
        }),
        TAG_INVOKE_DYNAMIC => ConstantPoolEntry::InvokeDynamic(InvokeDynamicInfo {
            bootstrap_method_attr_index: reader.read_u16()?,
            name_and_type_index: reader.read_u16()?,
        }),
        other => return Err(ClassFileError::UnknownConstantTag(other)),
    })
}

/// Resolves `index` to a UTF8 entry, or fails with the appropriate error.
pub fn resolve_utf8<'p>(
    pool: &'p [ConstantPoolEntry],
    index: u16,
) -> Result<&'p Utf8Info, ClassFileError> {
    match pool.get(index as usize) {
        Some(ConstantPoolEntry::Utf8(utf8)) => Ok(utf8),
        // Index 0, or the sentinel slot right after a Long/Double, is an
        // out-of-bounds reference in spirit even though it's in range.
        Some(ConstantPoolEntry::Unusable) => Err(ClassFileError::InvalidConstantPoolIndex(index)),
        Some(_) => Err(ClassFileError::InvalidConstantPoolType {
            index,
            expected: "Utf8",
        }),
        None => Err(ClassFileError::InvalidConstantPoolIndex(index)),
    }
}

/// Resolves `index` to a Class entry, or fails with the appropriate error.
pub fn resolve_class<'p>(
    pool: &'p [ConstantPoolEntry],
    index: u16,
) -> Result<&'p ClassInfo, ClassFileError> {
    match pool.get(index as usize) {
        Some(ConstantPoolEntry::Class(class)) => Ok(class),
        Some(ConstantPoolEntry::Unusable) => Err(ClassFileError::InvalidConstantPoolIndex(index)),
        Some(_) => Err(ClassFileError::InvalidConstantPoolType {
            index,
            expected: "Class",
        }),
        None => Err(ClassFileError::InvalidConstantPoolIndex(index)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_pool_has_only_the_sentinel() {
        let bytes = [0x00, 0x01];
        let mut reader = Reader::new(&bytes);
        let pool = decode_pool(&mut reader).unwrap();
        assert_eq!(pool.len(), 1);
        assert_eq!(pool[0], ConstantPoolEntry::Unusable);
    }

    #[test]
    fn long_entry_occupies_two_slots() {
        // count=4, tag=Long(5), value=42, then a trailing Utf8("") at slot 3.
        let mut bytes = vec![0x00, 0x04, 0x05];
        bytes.extend_from_slice(&42u64.to_be_bytes());
        bytes.extend_from_slice(&[0x01, 0x00, 0x00]); // Utf8, length 0
        let mut reader = Reader::new(&bytes);
        let pool = decode_pool(&mut reader).unwrap();
        assert_eq!(pool.len(), 4);
        assert_eq!(pool[1], ConstantPoolEntry::Long(LongInfo { bits: 42 }));
        assert_eq!(pool[2], ConstantPoolEntry::Unusable);
        assert_eq!(
            pool[3],
            ConstantPoolEntry::Utf8(Utf8Info { bytes: vec![] })
        );
    }

    #[test]
    fn unknown_tag_is_an_error() {
        let bytes = [0x00, 0x02, 0x02];
        let mut reader = Reader::new(&bytes);
        let err = decode_pool(&mut reader).unwrap_err();
        assert_eq!(err, ClassFileError::UnknownConstantTag(2));
    }

    #[test]
    fn method_handle_rejects_reference_kind_out_of_range() {
        let bytes = [0x00, 0x02, 0x0F, 0x0A, 0x00, 0x01];
        let mut reader = Reader::new(&bytes);
        let err = decode_pool(&mut reader).unwrap_err();
        assert_eq!(err, ClassFileError::InvalidReferenceKind(10));
    }
}
