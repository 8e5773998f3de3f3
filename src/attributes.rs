use crate::constant_pool::{resolve_class, resolve_utf8, ConstantPoolEntry};
use crate::element_value::{Annotation, ElementValue};
use crate::error::ClassFileError;
use crate::reader::Reader;
use crate::stack_map::StackMapTable;

/// One exception-table entry inside a `Code` attribute (JVMS §4.7.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exception {
    pub start_pc: u16,
    pub end_pc: u16,
    pub handler_pc: u16,
    /// A Class constant-pool index, or 0 to catch any exception.
    pub catch_type: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Code {
    pub max_stack: u16,
    pub max_locals: u16,
    /// Opaque bytecode; decoding instructions is out of scope here.
    pub code: Vec<u8>,
    pub exception_table: Vec<Exception>,
    pub attributes: Vec<AttributeInfo>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InnerClassInfo {
    pub inner_class_info_index: u16,
    pub outer_class_info_index: u16,
    pub inner_name_index: u16,
    pub inner_class_access_flags: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineNumberEntry {
    pub start_pc: u16,
    pub line_number: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalVariableEntry {
    pub start_pc: u16,
    pub length: u16,
    pub name_index: u16,
    pub descriptor_index: u16,
    pub index: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalVariableTypeEntry {
    pub start_pc: u16,
    pub length: u16,
    pub name_index: u16,
    pub signature_index: u16,
    pub index: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterAnnotations {
    pub annotations: Vec<Annotation>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootstrapMethod {
    pub bootstrap_method_ref: u16,
    /// Index into the sibling `arguments` vec where this method's argument
    /// indices begin; they run until the next method's start (or the end).
    pub bootstrap_arguments_start: u16,
}

/// One name-dispatched attribute per JVMS §4.7. Every variant here is named
/// in the twenty supported attributes; no others are recognised in strict
/// mode.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeInfo {
    ConstantValue { constantvalue_index: u16 },
    Code(Code),
    StackMapTable(StackMapTable),
    Exceptions { exception_index_table: Vec<u16> },
    InnerClasses { classes: Vec<InnerClassInfo> },
    EnclosingMethod { class_index: u16, method_index: u16 },
    Synthetic,
    Signature { signature_index: u16 },
    SourceFile { sourcefile_index: u16 },
    SourceDebugExtension { debug_extension: Vec<u8> },
    LineNumberTable { entries: Vec<LineNumberEntry> },
    LocalVariableTable { entries: Vec<LocalVariableEntry> },
    LocalVariableTypeTable { entries: Vec<LocalVariableTypeEntry> },
    Deprecated,
    RuntimeVisibleAnnotations { annotations: Vec<Annotation> },
    RuntimeInvisibleAnnotations { annotations: Vec<Annotation> },
    RuntimeVisibleParameterAnnotations { parameter_annotations: Vec<ParameterAnnotations> },
    RuntimeInvisibleParameterAnnotations { parameter_annotations: Vec<ParameterAnnotations> },
    AnnotationDefault { default_value: ElementValue },
    BootstrapMethods {
        methods: Vec<BootstrapMethod>,
        /// Flattened argument indices shared across all methods; see
        /// `BootstrapMethod::bootstrap_arguments_start`.
        arguments: Vec<u16>,
    },
}

/// Reads `count` attributes, each name-dispatched against `pool` and
/// length-bounded by a sub-reader so a malformed inner decoder cannot
/// overrun its declared `attribute_length`.
///
/// `major_version` selects Code's implicit-StackMapTable behaviour (JVMS
/// §4.10.1, version 50+).
pub fn read_attributes(
    pool: &[ConstantPoolEntry],
    reader: &mut Reader,
    count: u16,
    major_version: u16,
) -> Result<Vec<AttributeInfo>, ClassFileError> {
    let mut attributes = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let name_index = reader.read_u16()?;
        let length = reader.read_u32()?;
        let name = resolve_utf8(pool, name_index)?;
        let mut body = reader.sub_reader(length as usize)?;
        let attribute = decode_attribute(&name.bytes, pool, &mut body, major_version)?;
        body.finish()?;
        attributes.push(attribute);
    }
    Ok(attributes)
}

fn decode_attribute(
    name: &[u8],
    pool: &[ConstantPoolEntry],
    reader: &mut Reader,
    major_version: u16,
) -> Result<AttributeInfo, ClassFileError> {
    match name {
        b"ConstantValue" => Ok(AttributeInfo::ConstantValue {
            constantvalue_index: reader.read_u16()?,
        }),
        b"Code" => decode_code(pool, reader, major_version),
        b"StackMapTable" => Ok(AttributeInfo::StackMapTable(StackMapTable::decode(reader)?)),
        b"Exceptions" => {
            let count = reader.read_u16()?;
            let mut exception_index_table = Vec::with_capacity(count as usize);
            for _ in 0..count {
                let index = reader.read_u16()?;
                resolve_class(pool, index)?;
                exception_index_table.push(index);
            }
            Ok(AttributeInfo::Exceptions {
                exception_index_table,
            })
        }
        b"InnerClasses" => {
            let count = reader.read_u16()?;
            let mut classes = Vec::with_capacity(count as usize);
            for _ in 0..count {
                let inner_class_info_index = reader.read_u16()?;
                resolve_class(pool, inner_class_info_index)?;
                let outer_class_info_index = reader.read_u16()?;
                // 0 means "not a member of a class or interface" (JVMS §4.7.6).
                if outer_class_info_index != 0 {
                    resolve_class(pool, outer_class_info_index)?;
                }
                let inner_name_index = reader.read_u16()?;
                // 0 means the inner class is anonymous.
                if inner_name_index != 0 {
                    resolve_utf8(pool, inner_name_index)?;
                }
                let inner_class_access_flags = reader.read_u16()?;
                classes.push(InnerClassInfo {
                    inner_class_info_index,
                    outer_class_info_index,
                    inner_name_index,
                    inner_class_access_flags,
                });
            }
            Ok(AttributeInfo::InnerClasses { classes })
        }
        b"EnclosingMethod" => Ok(AttributeInfo::EnclosingMethod {
            class_index: reader.read_u16()?,
            method_index: reader.read_u16()?,
        }),
        b"Synthetic" => Ok(AttributeInfo::Synthetic),
        b"Signature" => Ok(AttributeInfo::Signature {
            signature_index: reader.read_u16()?,
        }),
        b"SourceFile" => Ok(AttributeInfo::SourceFile {
            sourcefile_index: reader.read_u16()?,
        }),
        b"SourceDebugExtension" => {
            let remaining = reader.remaining() as usize;
            Ok(AttributeInfo::SourceDebugExtension {
                debug_extension: reader.read_bytes(remaining)?,
            })
        }
        b"LineNumberTable" => {
            let count = reader.read_u16()?;
            let mut entries = Vec::with_capacity(count as usize);
            for _ in 0..count {
                entries.push(LineNumberEntry {
                    start_pc: reader.read_u16()?,
                    line_number: reader.read_u16()?,
                });
            }
            Ok(AttributeInfo::LineNumberTable { entries })
        }
        b"LocalVariableTable" => {
            let count = reader.read_u16()?;
            let mut entries = Vec::with_capacity(count as usize);
            for _ in 0..count {
                entries.push(LocalVariableEntry {
                    start_pc: reader.read_u16()?,
                    length: reader.read_u16()?,
                    name_index: reader.read_u16()?,
                    descriptor_index: reader.read_u16()?,
                    index: reader.read_u16()?,
                });
            }
            Ok(AttributeInfo::LocalVariableTable { entries })
        }
        b"LocalVariableTypeTable" => {
            let count = reader.read_u16()?;
            let mut entries = Vec::with_capacity(count as usize);
            for _ in 0..count {
                entries.push(LocalVariableTypeEntry {
                    start_pc: reader.read_u16()?,
                    length: reader.read_u16()?,
                    name_index: reader.read_u16()?,
                    signature_index: reader.read_u16()?,
                    index: reader.read_u16()?,
                });
            }
            Ok(AttributeInfo::LocalVariableTypeTable { entries })
        }
        b"Deprecated" => Ok(AttributeInfo::Deprecated),
        b"RuntimeVisibleAnnotations" => Ok(AttributeInfo::RuntimeVisibleAnnotations {
            annotations: decode_annotations(reader)?,
        }),
        b"RuntimeInvisibleAnnotations" => Ok(AttributeInfo::RuntimeInvisibleAnnotations {
            annotations: decode_annotations(reader)?,
        }),
        b"RuntimeVisibleParameterAnnotations" => {
            Ok(AttributeInfo::RuntimeVisibleParameterAnnotations {
                parameter_annotations: decode_parameter_annotations(reader)?,
            })
        }
        b"RuntimeInvisibleParameterAnnotations" => {
            Ok(AttributeInfo::RuntimeInvisibleParameterAnnotations {
                parameter_annotations: decode_parameter_annotations(reader)?,
            })
        }
        b"AnnotationDefault" => Ok(AttributeInfo::AnnotationDefault {
            default_value: ElementValue::decode(reader)?,
        }),
        b"BootstrapMethods" => {
            let count = reader.read_u16()?;
            let mut methods = Vec::with_capacity(count as usize);
            let mut arguments = Vec::new();
            for _ in 0..count {
                let bootstrap_method_ref = reader.read_u16()?;
                let bootstrap_arguments_start = arguments.len() as u16;
                let num_args = reader.read_u16()?;
                for _ in 0..num_args {
                    arguments.push(reader.read_u16()?);
                }
                methods.push(BootstrapMethod {
                    bootstrap_method_ref,
                    bootstrap_arguments_start,
                });
            }
            Ok(AttributeInfo::BootstrapMethods { methods, arguments })
        }
        other => Err(ClassFileError::InvalidAttributeName(
            String::from_utf8_lossy(other).into_owned(),
        )),
    }
}

fn decode_annotations(reader: &mut Reader) -> Result<Vec<Annotation>, ClassFileError> {
    let count = reader.read_u16()?;
    let mut annotations = Vec::with_capacity(count as usize);
    for _ in 0..count {
        annotations.push(Annotation::decode(reader)?);
    }
    Ok(annotations)
}

fn decode_parameter_annotations(
    reader: &mut Reader,
) -> Result<Vec<ParameterAnnotations>, ClassFileError> {
    let num_parameters = reader.read_u8()?;
    let mut parameter_annotations = Vec::with_capacity(num_parameters as usize);
    for _ in 0..num_parameters {
        parameter_annotations.push(ParameterAnnotations {
            annotations: decode_annotations(reader)?,
        });
    }
    Ok(parameter_annotations)
}

fn decode_code(
    pool: &[ConstantPoolEntry],
    reader: &mut Reader,
    major_version: u16,
) -> Result<AttributeInfo, ClassFileError> {
    let max_stack = reader.read_u16()?;
    let max_locals = reader.read_u16()?;
    let code_length = reader.read_u32()?;
    let code = reader.read_bytes(code_length as usize)?;
    let exception_table_length = reader.read_u16()?;
    let mut exception_table = Vec::with_capacity(exception_table_length as usize);
    for _ in 0..exception_table_length {
        exception_table.push(Exception {
            start_pc: reader.read_u16()?,
            end_pc: reader.read_u16()?,
            handler_pc: reader.read_u16()?,
            catch_type: reader.read_u16()?,
        });
    }
    let attributes_count = reader.read_u16()?;
    let mut attributes = read_attributes(pool, reader, attributes_count, major_version)?;
    if major_version >= 50 {
        let has_stack_map = attributes
            .iter()
            .any(|a| matches!(a, AttributeInfo::StackMapTable(_)));
        if !has_stack_map {
            attributes.push(AttributeInfo::StackMapTable(StackMapTable::implicit()));
        }
    }
    Ok(AttributeInfo::Code(Code {
        max_stack,
        max_locals,
        code,
        exception_table,
        attributes,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constant_pool::Utf8Info;

    fn utf8_pool(names: &[&str]) -> Vec<ConstantPoolEntry> {
        let mut pool = vec![ConstantPoolEntry::Unusable];
        for name in names {
            pool.push(ConstantPoolEntry::Utf8(Utf8Info {
                bytes: name.as_bytes().to_vec(),
            }));
        }
        pool
    }

    #[test]
    fn deprecated_has_an_empty_body() {
        let pool = utf8_pool(&["Deprecated"]);
        let bytes: [u8; 6] = [0x00, 0x01, 0x00, 0x00, 0x00, 0x00];
        let mut reader = Reader::new(&bytes);
        let attrs = read_attributes(&pool, &mut reader, 1, 52).unwrap();
        assert_eq!(attrs, vec![AttributeInfo::Deprecated]);
    }

    #[test]
    fn unrecognised_attribute_name_is_an_error_in_strict_mode() {
        let pool = utf8_pool(&["TotallyMadeUp"]);
        let bytes: [u8; 6] = [0x00, 0x01, 0x00, 0x00, 0x00, 0x00];
        let mut reader = Reader::new(&bytes);
        let err = read_attributes(&pool, &mut reader, 1, 52).unwrap_err();
        assert_eq!(
            err,
            ClassFileError::InvalidAttributeName("TotallyMadeUp".into())
        );
    }

    #[test]
    fn code_without_stack_map_table_gets_an_implicit_one_on_modern_versions() {
        let pool = utf8_pool(&["Code"]);
        // max_stack=1, max_locals=1, code_length=1, code=[0xB1 (return)],
        // exception_table_length=0, attributes_count=0
        let body: Vec<u8> = vec![
            0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0xB1, 0x00, 0x00, 0x00, 0x00,
        ];
        let mut bytes = vec![0x00, 0x01];
        bytes.extend_from_slice(&(body.len() as u32).to_be_bytes());
        bytes.extend_from_slice(&body);
        let mut reader = Reader::new(&bytes);
        let attrs = read_attributes(&pool, &mut reader, 1, 52).unwrap();
        match &attrs[0] {
            AttributeInfo::Code(code) => {
                assert_eq!(code.attributes.len(), 1);
                assert!(matches!(
                    code.attributes[0],
                    AttributeInfo::StackMapTable(_)
                ));
            }
            other => panic!("expected Code, got {other:?}"),
        }
    }

    #[test]
    fn truncated_code_attribute_fails_with_eof_not_silent_truncation() {
        let pool = utf8_pool(&["Code"]);
        // declares attribute_length=20 but the inner code_length claims 1000
        // bytes that do not exist in the (20-byte) sub-reader.
        let mut body: Vec<u8> = vec![0x00, 0x01, 0x00, 0x01];
        body.extend_from_slice(&1000u32.to_be_bytes());
        body.resize(20, 0);
        let mut bytes = vec![0x00, 0x01, 0x00, 0x00, 0x00, 20];
        bytes.extend_from_slice(&body);
        let mut reader = Reader::new(&bytes);
        let err = read_attributes(&pool, &mut reader, 1, 52).unwrap_err();
        assert_eq!(err, ClassFileError::UnexpectedEof);
    }

    #[test]
    fn bootstrap_methods_flattens_arguments_across_methods() {
        let pool = utf8_pool(&["BootstrapMethods"]);
        let body: Vec<u8> = vec![
            0x00, 0x02, // num_bootstrap_methods
            0x00, 0x05, 0x00, 0x02, 0x00, 0x0A, 0x00, 0x0B, // method 0: ref=5, args=[10, 11]
            0x00, 0x06, 0x00, 0x01, 0x00, 0x0C, // method 1: ref=6, args=[12]
        ];
        let mut bytes = vec![0x00, 0x01];
        bytes.extend_from_slice(&(body.len() as u32).to_be_bytes());
        bytes.extend_from_slice(&body);
        let mut reader = Reader::new(&bytes);
        let attrs = read_attributes(&pool, &mut reader, 1, 52).unwrap();
        match &attrs[0] {
            AttributeInfo::BootstrapMethods { methods, arguments } => {
                assert_eq!(arguments, &vec![10, 11, 12]);
                assert_eq!(methods.len(), 2);
                assert_eq!(methods[0].bootstrap_method_ref, 5);
                assert_eq!(methods[0].bootstrap_arguments_start, 0);
                assert_eq!(methods[1].bootstrap_method_ref, 6);
                assert_eq!(methods[1].bootstrap_arguments_start, 2);
            }
            other => panic!("expected BootstrapMethods, got {other:?}"),
        }
    }

    #[test]
    fn inner_classes_rejects_an_out_of_range_inner_class_info_index() {
        let pool = utf8_pool(&["InnerClasses"]);
        // one entry: inner_class_info_index=99 (out of bounds), the rest unused
        let body: Vec<u8> = vec![0x00, 0x01, 0x00, 0x63, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];
        let mut bytes = vec![0x00, 0x01];
        bytes.extend_from_slice(&(body.len() as u32).to_be_bytes());
        bytes.extend_from_slice(&body);
        let mut reader = Reader::new(&bytes);
        let err = read_attributes(&pool, &mut reader, 1, 52).unwrap_err();
        assert_eq!(err, ClassFileError::InvalidConstantPoolIndex(99));
    }

    #[test]
    fn inner_classes_allows_zero_outer_class_and_inner_name() {
        use crate::constant_pool::ClassInfo;
        let mut pool = utf8_pool(&["InnerClasses"]);
        pool.push(ConstantPoolEntry::Class(ClassInfo { name_index: 0 }));
        let inner_class_info_index = (pool.len() - 1) as u16;
        // outer_class_info_index=0 ("not a member"), inner_name_index=0
        // (anonymous) — neither should be resolved against the pool.
        let mut body: Vec<u8> = vec![0x00, 0x01];
        body.extend_from_slice(&inner_class_info_index.to_be_bytes());
        body.extend_from_slice(&[0x00, 0x00, 0x00, 0x00, 0x00, 0x00]);
        let mut bytes = vec![0x00, 0x01];
        bytes.extend_from_slice(&(body.len() as u32).to_be_bytes());
        bytes.extend_from_slice(&body);
        let mut reader = Reader::new(&bytes);
        let attrs = read_attributes(&pool, &mut reader, 1, 52).unwrap();
        match &attrs[0] {
            AttributeInfo::InnerClasses { classes } => {
                assert_eq!(classes[0].inner_class_info_index, inner_class_info_index);
                assert_eq!(classes[0].outer_class_info_index, 0);
                assert_eq!(classes[0].inner_name_index, 0);
            }
            other => panic!("expected InnerClasses, got {other:?}"),
        }
    }
}
