//! Read JVM classes
//!
//! Only as much of the class file format is modelled as is needed to get at method bodies: the
//! constant pool, the member tables, and the `Code` attribute. Method bodies are decoded into a
//! flat list of [`code::Instruction`]s whose member operands have already been resolved against
//! the constant pool.
//!
//! ### Simple example
//!
//! ```no_run
//! use escaped_this::jvm::class_file::ClassFile;
//! use escaped_this::jvm::*;
//!
//! # fn read_constructors() -> Result<(), Error> {
//! let class = ClassFile::read_from_path("me/alec/Point.class")?;
//! for method in &class.methods {
//!     if class.constants.utf8(method.name_index)? == UnqualifiedName::INIT.as_str() {
//!         if let Some(code) = method.code(&class.constants)? {
//!             let instructions = code.decode(&class.constants)?;
//!             println!("{} instructions", instructions.len());
//!         }
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod access_flags;
mod binary_format;
pub mod class_file;
pub mod code;
mod descriptors;
mod errors;
mod names;

pub use access_flags::*;
pub use binary_format::*;
pub use descriptors::*;
pub use errors::*;
pub use names::*;
