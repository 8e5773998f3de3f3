use std::fmt::Display;

/// Every failure mode the decoder can return. Decoding is all-or-nothing:
/// the first error encountered is returned and nothing partial is surfaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassFileError {
    /// The byte source was exhausted in the middle of a structure.
    UnexpectedEof,
    /// The leading four bytes were not `CA FE BA BE`.
    InvalidMagic(u32),
    /// A constant-pool tag outside the 14 known variants.
    UnknownConstantTag(u8),
    /// An index was zero where forbidden, `>= constant_pool_count`, or
    /// landed on the null sentinel that follows a Long/Double entry.
    InvalidConstantPoolIndex(u16),
    /// An index resolved to a constant-pool entry of the wrong kind.
    InvalidConstantPoolType { index: u16, expected: &'static str },
    /// An attribute name outside the 20 known names, in strict mode.
    InvalidAttributeName(String),
    /// An element-value tag outside `B C D F I J S Z s e c @ [`.
    UnknownElementValueTag(u8),
    /// A verification-type-info tag outside `0..=8`.
    UnknownVerificationTypeTag(u8),
    /// A stack-map frame_type in the reserved `128..=246` range.
    UnknownStackFrameType(u8),
    /// An attribute's declared length did not match the bytes its decoder
    /// consumed.
    AttributeLengthMismatch,
    /// Bytes remained in the input after the class-level attribute table.
    TrailingBytes,
    /// A `CONSTANT_MethodHandle_info`'s `reference_kind` was outside `1..=9`.
    InvalidReferenceKind(u8),
}

impl Display for ClassFileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClassFileError::UnexpectedEof => write!(f, "unexpected end of input"),
            ClassFileError::InvalidMagic(got) => {
                write!(f, "invalid magic number: {got:#010X}")
            }
            ClassFileError::UnknownConstantTag(tag) => {
                write!(f, "unknown constant-pool tag: {tag}")
            }
            ClassFileError::InvalidConstantPoolIndex(index) => {
                write!(f, "invalid constant-pool index: {index}")
            }
            ClassFileError::InvalidConstantPoolType { index, expected } => {
                write!(
                    f,
                    "constant-pool entry {index} was not a {expected} entry"
                )
            }
            ClassFileError::InvalidAttributeName(name) => {
                write!(f, "unrecognised attribute name: {name}")
            }
            ClassFileError::UnknownElementValueTag(tag) => {
                write!(f, "unknown element-value tag: {}", *tag as char)
            }
            ClassFileError::UnknownVerificationTypeTag(tag) => {
                write!(f, "unknown verification-type tag: {tag}")
            }
            ClassFileError::UnknownStackFrameType(frame_type) => {
                write!(f, "reserved stack-map frame_type: {frame_type}")
            }
            ClassFileError::AttributeLengthMismatch => {
                write!(f, "attribute length did not match bytes consumed")
            }
            ClassFileError::TrailingBytes => {
                write!(f, "trailing bytes after the class-level attribute table")
            }
            ClassFileError::InvalidReferenceKind(kind) => {
                write!(f, "invalid method-handle reference_kind: {kind}")
            }
        }
    }
}

impl std::error::Error for ClassFileError {}
