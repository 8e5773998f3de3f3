use crate::error::ClassFileError;
use crate::reader::Reader;
use crate::verification_type::VerificationTypeInfo;

/// A single stack-map frame, dispatched by `frame_type` range (JVMS
/// §4.7.4). `frame_type` is retained on every variant so the frame can be
/// re-serialised deterministically.
#[derive(Debug, Clone, PartialEq)]
pub enum StackMapFrame {
    /// `0..=63`: offset_delta == frame_type.
    Same { frame_type: u8 },
    /// `64..=127`: offset_delta == frame_type - 64.
    SameLocals1StackItem {
        frame_type: u8,
        stack: VerificationTypeInfo,
    },
    /// `247`.
    SameLocals1StackItemExtended {
        frame_type: u8,
        offset_delta: u16,
        stack: VerificationTypeInfo,
    },
    /// `248..=250`: chop-count == 251 - frame_type.
    Chop { frame_type: u8, offset_delta: u16 },
    /// `251`.
    SameExtended { frame_type: u8, offset_delta: u16 },
    /// `252..=254`: (frame_type - 251) appended locals.
    Append {
        frame_type: u8,
        offset_delta: u16,
        locals: Vec<VerificationTypeInfo>,
    },
    /// `255`.
    Full {
        frame_type: u8,
        offset_delta: u16,
        locals: Vec<VerificationTypeInfo>,
        stack: Vec<VerificationTypeInfo>,
    },
}

impl StackMapFrame {
    pub fn decode(reader: &mut Reader) -> Result<StackMapFrame, ClassFileError> {
        let frame_type = reader.read_u8()?;
        Ok(match frame_type {
            0..=63 => StackMapFrame::Same { frame_type },
            64..=127 => StackMapFrame::SameLocals1StackItem {
                frame_type,
                stack: VerificationTypeInfo::decode(reader)?,
            },
            128..=246 => return Err(ClassFileError::UnknownStackFrameType(frame_type)),
            247 => StackMapFrame::SameLocals1StackItemExtended {
                frame_type,
                offset_delta: reader.read_u16()?,
                stack: VerificationTypeInfo::decode(reader)?,
            },
            248..=250 => StackMapFrame::Chop {
                frame_type,
                offset_delta: reader.read_u16()?,
            },
            251 => StackMapFrame::SameExtended {
                frame_type,
                offset_delta: reader.read_u16()?,
            },
            252..=254 => {
                let offset_delta = reader.read_u16()?;
                let local_count = (frame_type - 251) as usize;
                let mut locals = Vec::with_capacity(local_count);
                for _ in 0..local_count {
                    locals.push(VerificationTypeInfo::decode(reader)?);
                }
                StackMapFrame::Append {
                    frame_type,
                    offset_delta,
                    locals,
                }
            }
            255 => {
                let offset_delta = reader.read_u16()?;
                let number_of_locals = reader.read_u16()? as usize;
                let mut locals = Vec::with_capacity(number_of_locals);
                for _ in 0..number_of_locals {
                    locals.push(VerificationTypeInfo::decode(reader)?);
                }
                let number_of_stack_items = reader.read_u16()? as usize;
                let mut stack = Vec::with_capacity(number_of_stack_items);
                for _ in 0..number_of_stack_items {
                    stack.push(VerificationTypeInfo::decode(reader)?);
                }
                StackMapFrame::Full {
                    frame_type,
                    offset_delta,
                    locals,
                    stack,
                }
            }
        })
    }
}

/// `StackMapTable` attribute body: a count followed by that many frames.
#[derive(Debug, Clone, PartialEq)]
pub struct StackMapTable {
    pub entries: Vec<StackMapFrame>,
}

impl StackMapTable {
    pub fn decode(reader: &mut Reader) -> Result<StackMapTable, ClassFileError> {
        let number_of_entries = reader.read_u16()?;
        let mut entries = Vec::with_capacity(number_of_entries as usize);
        for _ in 0..number_of_entries {
            entries.push(StackMapFrame::decode(reader)?);
        }
        Ok(StackMapTable { entries })
    }

    /// The implicit zero-entry table JVMS §4.10.1 attaches to a Code
    /// attribute in a version-50-or-later class file that carries none.
    pub fn implicit() -> StackMapTable {
        StackMapTable { entries: vec![] }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_frame_carries_no_payload() {
        let bytes = [10u8];
        let mut reader = Reader::new(&bytes);
        assert_eq!(
            StackMapFrame::decode(&mut reader).unwrap(),
            StackMapFrame::Same { frame_type: 10 }
        );
    }

    #[test]
    fn reserved_range_is_an_error() {
        let bytes = [200u8];
        let mut reader = Reader::new(&bytes);
        let err = StackMapFrame::decode(&mut reader).unwrap_err();
        assert_eq!(err, ClassFileError::UnknownStackFrameType(200));
    }

    #[test]
    fn append_frame_reads_the_right_number_of_locals() {
        // frame_type=253 -> 2 appended locals (Integer, Integer)
        let bytes = [253u8, 0x00, 0x05, 1, 1];
        let mut reader = Reader::new(&bytes);
        let frame = StackMapFrame::decode(&mut reader).unwrap();
        match frame {
            StackMapFrame::Append {
                offset_delta,
                locals,
                ..
            } => {
                assert_eq!(offset_delta, 5);
                assert_eq!(locals.len(), 2);
            }
            other => panic!("expected Append, got {other:?}"),
        }
    }
}
