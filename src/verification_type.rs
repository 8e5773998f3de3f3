use crate::error::ClassFileError;
use crate::reader::Reader;

/// One stack or local-variable slot description used inside a stack-map
/// frame. Tags 7 (`Object`) and 8 (`Uninitialized`) carry an extra u16
/// payload; every other tag is a bare marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationTypeInfo {
    Top,
    Integer,
    Float,
    Double,
    Long,
    Null,
    UninitializedThis,
    /// Constant-pool index of the object's class.
    Object(u16),
    /// Bytecode offset of the `new` instruction that created the object.
    Uninitialized(u16),
}

impl VerificationTypeInfo {
    pub fn decode(reader: &mut Reader) -> Result<VerificationTypeInfo, ClassFileError> {
        let tag = reader.read_u8()?;
        Ok(match tag {
            0 => VerificationTypeInfo::Top,
            1 => VerificationTypeInfo::Integer,
            2 => VerificationTypeInfo::Float,
            3 => VerificationTypeInfo::Double,
            4 => VerificationTypeInfo::Long,
            5 => VerificationTypeInfo::Null,
            6 => VerificationTypeInfo::UninitializedThis,
            7 => VerificationTypeInfo::Object(reader.read_u16()?),
            8 => VerificationTypeInfo::Uninitialized(reader.read_u16()?),
            other => return Err(ClassFileError::UnknownVerificationTypeTag(other)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_tag_carries_a_constant_pool_index() {
        let bytes = [0x07, 0x00, 0x2A];
        let mut reader = Reader::new(&bytes);
        assert_eq!(
            VerificationTypeInfo::decode(&mut reader).unwrap(),
            VerificationTypeInfo::Object(42)
        );
    }

    #[test]
    fn unknown_tag_is_an_error() {
        let bytes = [0x09];
        let mut reader = Reader::new(&bytes);
        let err = VerificationTypeInfo::decode(&mut reader).unwrap_err();
        assert_eq!(err, ClassFileError::UnknownVerificationTypeTag(9));
    }
}
