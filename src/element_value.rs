use crate::error::ClassFileError;
use crate::reader::Reader;

/// The value half of an annotation's name/value pair. Tagged by a single
/// ASCII character per JVMS Table 4.7.16.1-A.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementValue {
    /// `B C D F I J S Z s`: one constant-pool index. The tag is retained so
    /// consumers know how to interpret the referenced entry.
    Const { tag: char, const_value_index: u16 },
    /// `e`: an enum constant.
    Enum {
        type_name_index: u16,
        const_name_index: u16,
    },
    /// `c`: a class literal.
    Class { class_info_index: u16 },
    /// `@`: a nested annotation.
    Annotation(Annotation),
    /// `[`: an array of element values.
    Array(Vec<ElementValue>),
}

impl ElementValue {
    pub fn decode(reader: &mut Reader) -> Result<ElementValue, ClassFileError> {
        let tag = reader.read_u8()?;
        Self::decode_tagged(tag, reader)
    }

    fn decode_tagged(tag: u8, reader: &mut Reader) -> Result<ElementValue, ClassFileError> {
        Ok(match tag as char {
            'B' | 'C' | 'D' | 'F' | 'I' | 'J' | 'S' | 'Z' | 's' => ElementValue::Const {
                tag: tag as char,
                const_value_index: reader.read_u16()?,
            },
            'e' => ElementValue::Enum {
                type_name_index: reader.read_u16()?,
                const_name_index: reader.read_u16()?,
            },
            'c' => ElementValue::Class {
                class_info_index: reader.read_u16()?,
            },
            '@' => ElementValue::Annotation(Annotation::decode(reader)?),
            '[' => {
                let num_values = reader.read_u16()?;
                let mut values = Vec::with_capacity(num_values as usize);
                for _ in 0..num_values {
                    values.push(ElementValue::decode(reader)?);
                }
                ElementValue::Array(values)
            }
            _ => return Err(ClassFileError::UnknownElementValueTag(tag)),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElementValuePair {
    pub element_name_index: u16,
    pub value: ElementValue,
}

impl ElementValuePair {
    fn decode(reader: &mut Reader) -> Result<ElementValuePair, ClassFileError> {
        Ok(ElementValuePair {
            element_name_index: reader.read_u16()?,
            value: ElementValue::decode(reader)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub type_index: u16,
    pub element_value_pairs: Vec<ElementValuePair>,
}

impl Annotation {
    pub fn decode(reader: &mut Reader) -> Result<Annotation, ClassFileError> {
        let type_index = reader.read_u16()?;
        let num_pairs = reader.read_u16()?;
        let mut element_value_pairs = Vec::with_capacity(num_pairs as usize);
        for _ in 0..num_pairs {
            element_value_pairs.push(ElementValuePair::decode(reader)?);
        }
        Ok(Annotation {
            type_index,
            element_value_pairs,
        })
    }
}
