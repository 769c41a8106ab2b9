use crate::jvm::code::Instruction;
use crate::jvm::{BinaryName, MethodDescriptor, ParseDescriptor};

/// Instruction invoking a method (or constructor) with a statically known number of arguments
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct CallSite {
    /// Index of the invoke instruction
    pub index: usize,

    /// Number of arguments, not counting the receiver
    pub argument_count: usize,
}

/// Instruction storing to an instance or static field
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct FieldStoreSite {
    /// Index of the `putfield`/`putstatic` instruction
    pub index: usize,
}

/// Sites of a constructor that might let `this` escape
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct Sites {
    pub calls: Vec<CallSite>,
    pub field_stores: Vec<FieldStoreSite>,
}

/// Collect call and field store sites, in instruction order
///
/// The call to `java/lang/Object.<init>` is skipped since it is inserted by the compiler into
/// every constructor of a class extending `Object` directly.
pub fn collect_sites(instructions: &[Instruction], include_invokedynamic: bool) -> Sites {
    let mut sites = Sites::default();

    for (index, instruction) in instructions.iter().enumerate() {
        match instruction {
            Instruction::Invoke(_, method) => {
                if method.is_object_init() {
                    continue;
                }
                sites.calls.push(CallSite {
                    index,
                    argument_count: argument_count(&method.descriptor),
                });
            }
            Instruction::InvokeDynamic(call_site) if include_invokedynamic => {
                sites.calls.push(CallSite {
                    index,
                    argument_count: argument_count(&call_site.descriptor),
                });
            }
            Instruction::PutField(_) | Instruction::PutStatic(_) => {
                sites.field_stores.push(FieldStoreSite { index });
            }
            _ => (),
        }
    }

    sites
}

/// Number of arguments in a method descriptor
///
/// Each argument counts once, regardless of how many stack slots it takes. An unparseable
/// descriptor is treated as having no arguments.
pub fn argument_count(descriptor: &str) -> usize {
    match MethodDescriptor::<BinaryName>::parse(descriptor) {
        Ok(method_descriptor) => {
            let count = method_descriptor.parameters.len();
            if method_descriptor.parameter_length(false) != count {
                log::trace!(
                    "Descriptor {} has wide arguments, scanning them as one value each",
                    descriptor
                );
            }
            count
        }
        Err(err) => {
            log::warn!("Cannot parse method descriptor {}: {}", descriptor, err);
            0
        }
    }
}
