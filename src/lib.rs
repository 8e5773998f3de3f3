//! A structural decoder for the JVM class-file binary format (JVMS §4), up
//! to and including major version 52 (JDK 8).
//!
//! Decoding is a pure function from bytes to a [`class_file::ClassFile`] (or
//! an error): no bytecode execution, no classpath resolution, no descriptor
//! or signature parsing. See [`class_file::ClassFile::parse`] for the entry
//! point.

pub mod access_flags;
pub mod attributes;
pub mod class_file;
pub mod constant_pool;
pub mod element_value;
pub mod error;
pub mod reader;
pub mod stack_map;
pub mod verification_type;

pub use class_file::{ClassFile, FieldInfo, MethodInfo};
pub use error::ClassFileError;
