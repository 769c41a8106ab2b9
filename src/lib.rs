//! Detect constructors that expose `this` before construction completes
//!
//! A constructor that passes `this` to another method, or stores `this` into a field, lets
//! outside code observe a partially-initialized object. This crate reads compiled JVM classes,
//! decodes their constructors, and flags those escapes with a cheap backward scan over each
//! constructor's instructions.
//!
//! ### Example
//!
//! ```
//! use escaped_this::analysis::detect_escapes;
//! use escaped_this::jvm::code::{Instruction::*, InvokeType, MethodRef};
//! use escaped_this::jvm::{BinaryName, Name, UnqualifiedName};
//!
//! let class = BinaryName::from_string(String::from("me/alec/Point")).unwrap();
//! let register = MethodRef {
//!     owner: BinaryName::from_string(String::from("me/alec/Registry")).unwrap(),
//!     name: UnqualifiedName::from_string(String::from("register")).unwrap(),
//!     descriptor: String::from("(Ljava/lang/Object;)V"),
//!     is_interface: false,
//! };
//!
//! let constructor = vec![
//!     ALoad(0),
//!     Invoke(InvokeType::Special, MethodRef::object_init()),
//!     ALoad(0),
//!     Invoke(InvokeType::Static, register),
//!     Return,
//! ];
//!
//! let findings = detect_escapes(&class, &constructor, true);
//! assert_eq!(findings.len(), 1);
//! ```

pub mod analysis;
pub mod check;
pub mod jvm;
