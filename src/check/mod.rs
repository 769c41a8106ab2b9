//! Run the escape analysis over whole class files
//!
//! The [`EscapedThisChecker`] picks the constructors out of a parsed [`ClassFile`], decodes their
//! bodies, and hands each one to an [`EscapeDetector`]. Anything that goes wrong while reading
//! the class surfaces as an [`Error`]; the analysis itself never fails.
//!
//! [`ClassFile`]: crate::jvm::class_file::ClassFile
//! [`EscapeDetector`]: crate::analysis::EscapeDetector

mod checker;
mod errors;
mod settings;

pub use checker::*;
pub use errors::*;
pub use settings::*;
