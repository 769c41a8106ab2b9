//! Bytecode representation and decoding
//!
//! ### Structure
//!
//! Despite being pushed off into [just another method attribute](crate::jvm::class_file::Code),
//! the bytecode is arguably the most important part of the class file - it contains the actual
//! executable instructions. We decode the [list of bytecode instructions][0] into one flat
//! sequence of [`Instruction`]s, in the order they appear in the code array.
//!
//! Operands that point into the constant pool are resolved while decoding: a `putfield` carries
//! the owner, name, and descriptor of the field it writes, an `invokevirtual` carries the same
//! for the method it calls. Everything downstream can then work on the instructions alone,
//! without needing to hold on to the class file.
//!
//! Branch targets are left as relative byte offsets. Nothing here reconstructs control flow.
//!
//! [0]: https://docs.oracle.com/javase/specs/jvms/se18/html/jvms-6.html#jvms-6.5

mod decode;
mod instruction;

pub use decode::*;
pub use instruction::*;
