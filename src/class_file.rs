use crate::access_flags::ClassAccessFlags;
use crate::attributes::{read_attributes, AttributeInfo};
use crate::constant_pool::{self, resolve_class, ConstantPoolEntry};
use crate::error::ClassFileError;
use crate::reader::Reader;

const MAGIC: u32 = 0xCAFEBABE;

#[derive(Debug, Clone, PartialEq)]
pub struct FieldInfo {
    pub access_flags: Vec<crate::access_flags::FieldAccessFlags>,
    pub name_index: u16,
    pub descriptor_index: u16,
    pub attributes: Vec<AttributeInfo>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodInfo {
    pub access_flags: Vec<crate::access_flags::MethodAccessFlags>,
    pub name_index: u16,
    pub descriptor_index: u16,
    pub attributes: Vec<AttributeInfo>,
}

/// A fully decoded class file (JVMS §4.1), up to and including major
/// version 52 (JDK 8).
#[derive(Debug, Clone, PartialEq)]
pub struct ClassFile {
    pub minor_version: u16,
    pub major_version: u16,
    pub constant_pool: Vec<ConstantPoolEntry>,
    pub access_flags: Vec<ClassAccessFlags>,
    pub this_class: u16,
    /// 0 only for `java.lang.Object`.
    pub super_class: u16,
    pub interfaces: Vec<u16>,
    pub fields: Vec<FieldInfo>,
    pub methods: Vec<MethodInfo>,
    pub attributes: Vec<AttributeInfo>,
}

impl ClassFile {
    /// Decodes a whole class file from `bytes`. Fails on the first error
    /// encountered; nothing partial is returned.
    pub fn parse(bytes: &[u8]) -> Result<ClassFile, ClassFileError> {
        let mut reader = Reader::new(bytes);

        let magic = reader.read_u32()?;
        if magic != MAGIC {
            return Err(ClassFileError::InvalidMagic(magic));
        }

        let minor_version = reader.read_u16()?;
        let major_version = reader.read_u16()?;

        let constant_pool = constant_pool::decode_pool(&mut reader)?;

        let access_flags = ClassAccessFlags::from_u16(reader.read_u16()?);
        // `this_class` is deliberately not cross-referenced here: spec.md's
        // own S1 scenario decodes `this_class = 0` against a pool holding
        // only the null sentinel without error.
        let this_class = reader.read_u16()?;
        let super_class = reader.read_u16()?;
        // 0 means `java.lang.Object`, which has no superclass; only validate
        // when a superclass is actually named.
        if super_class != 0 {
            resolve_class(&constant_pool, super_class)?;
        }

        let interfaces_count = reader.read_u16()?;
        let mut interfaces = Vec::with_capacity(interfaces_count as usize);
        for _ in 0..interfaces_count {
            interfaces.push(reader.read_u16()?);
        }

        let fields_count = reader.read_u16()?;
        let mut fields = Vec::with_capacity(fields_count as usize);
        for _ in 0..fields_count {
            fields.push(decode_field(&constant_pool, &mut reader, major_version)?);
        }

        let methods_count = reader.read_u16()?;
        let mut methods = Vec::with_capacity(methods_count as usize);
        for _ in 0..methods_count {
            methods.push(decode_method(&constant_pool, &mut reader, major_version)?);
        }

        let attributes_count = reader.read_u16()?;
        let attributes = read_attributes(&constant_pool, &mut reader, attributes_count, major_version)?;

        if !reader.is_empty() {
            return Err(ClassFileError::TrailingBytes);
        }

        Ok(ClassFile {
            minor_version,
            major_version,
            constant_pool,
            access_flags,
            this_class,
            super_class,
            interfaces,
            fields,
            methods,
            attributes,
        })
    }
}

fn decode_field(
    pool: &[ConstantPoolEntry],
    reader: &mut Reader,
    major_version: u16,
) -> Result<FieldInfo, ClassFileError> {
    let access_flags = crate::access_flags::FieldAccessFlags::from_u16(reader.read_u16()?);
    let name_index = reader.read_u16()?;
    let descriptor_index = reader.read_u16()?;
    let attributes_count = reader.read_u16()?;
    let attributes = read_attributes(pool, reader, attributes_count, major_version)?;
    Ok(FieldInfo {
        access_flags,
        name_index,
        descriptor_index,
        attributes,
    })
}

fn decode_method(
    pool: &[ConstantPoolEntry],
    reader: &mut Reader,
    major_version: u16,
) -> Result<MethodInfo, ClassFileError> {
    let access_flags = crate::access_flags::MethodAccessFlags::from_u16(reader.read_u16()?);
    let name_index = reader.read_u16()?;
    let descriptor_index = reader.read_u16()?;
    let attributes_count = reader.read_u16()?;
    let attributes = read_attributes(pool, reader, attributes_count, major_version)?;
    Ok(MethodInfo {
        access_flags,
        name_index,
        descriptor_index,
        attributes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `S1`: the smallest legal class file — an empty pool, `this_class` and
    /// `super_class` both zero, no interfaces/fields/methods/attributes.
    fn minimal_class_bytes() -> Vec<u8> {
        let mut bytes = vec![0xCA, 0xFE, 0xBA, 0xBE];
        bytes.extend_from_slice(&[0x00, 0x00]); // minor
        bytes.extend_from_slice(&[0x00, 0x34]); // major = 52
        bytes.extend_from_slice(&[0x00, 0x01]); // constant_pool_count = 1 (empty pool)
        bytes.extend_from_slice(&[0x00, 0x21]); // access_flags: ACC_PUBLIC | ACC_SUPER
        bytes.extend_from_slice(&[0x00, 0x00]); // this_class
        bytes.extend_from_slice(&[0x00, 0x00]); // super_class
        bytes.extend_from_slice(&[0x00, 0x00]); // interfaces_count
        bytes.extend_from_slice(&[0x00, 0x00]); // fields_count
        bytes.extend_from_slice(&[0x00, 0x00]); // methods_count
        bytes.extend_from_slice(&[0x00, 0x00]); // attributes_count
        bytes
    }

    #[test]
    fn minimal_class_parses() {
        let bytes = minimal_class_bytes();
        let class = ClassFile::parse(&bytes).unwrap();
        assert_eq!(class.major_version, 52);
        assert_eq!(class.minor_version, 0);
        assert_eq!(class.constant_pool.len(), 1);
        assert_eq!(class.this_class, 0);
        assert_eq!(class.super_class, 0);
        assert!(class.interfaces.is_empty());
        assert!(class.fields.is_empty());
        assert!(class.methods.is_empty());
        assert!(class.attributes.is_empty());
    }

    /// `S2`: a bad magic number is rejected before anything else is read.
    #[test]
    fn bad_magic_is_rejected() {
        let bytes = [0xDEu8, 0xAD, 0xBE, 0xEF];
        let err = ClassFile::parse(&bytes).unwrap_err();
        assert_eq!(err, ClassFileError::InvalidMagic(0xDEADBEEF));
    }

    #[test]
    fn trailing_bytes_after_class_attributes_are_rejected() {
        let mut bytes = minimal_class_bytes();
        bytes.push(0xFF);
        let err = ClassFile::parse(&bytes).unwrap_err();
        assert_eq!(err, ClassFileError::TrailingBytes);
    }

    #[test]
    fn decoding_the_same_bytes_twice_yields_equal_classes() {
        let bytes = minimal_class_bytes();
        assert_eq!(
            ClassFile::parse(&bytes).unwrap(),
            ClassFile::parse(&bytes).unwrap()
        );
    }
}
