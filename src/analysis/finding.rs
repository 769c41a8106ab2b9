use crate::jvm::code::Instruction;
use crate::jvm::{BinaryName, Name};
use std::fmt::{Display, Error as FmtError, Formatter};

/// Why a class is considered mutable
///
/// The escape check is one of many independent mutability checks, and each reports findings
/// under its own stable code.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum Reason {
    EscapedThisReference,
}

impl Reason {
    /// Stable code identifying the check
    pub fn code(&self) -> &'static str {
        match self {
            Reason::EscapedThisReference => "ESCAPED_THIS_REFERENCE",
        }
    }
}

/// Where in the constructor `this` escapes
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub enum Site {
    /// `this` is passed as an argument
    CallArgument {
        /// Index of the invoke instruction
        call: usize,

        /// Index of the instruction loading `this`
        load: usize,

        /// Method being called (eg. `me/alec/Registry.register(Ljava/lang/Object;)V`)
        target: String,
    },

    /// `this` is stored into a field
    FieldStore {
        /// Index of the `putfield`/`putstatic` instruction
        store: usize,

        /// Field being written (eg. `me/alec/Registry.last`)
        field: String,
    },
}

impl Site {
    /// Describe the member targeted by the instruction at the site
    pub(crate) fn describe_target(instruction: &Instruction) -> String {
        match instruction {
            Instruction::Invoke(_, method) => format!(
                "{}.{}{}",
                method.owner.as_str(),
                method.name.as_str(),
                method.descriptor
            ),
            Instruction::InvokeDynamic(call_site) => format!(
                "invokedynamic {}{}",
                call_site.name.as_str(),
                call_site.descriptor
            ),
            Instruction::PutField(field) | Instruction::PutStatic(field) => {
                format!("{}.{}", field.owner.as_str(), field.name.as_str())
            }
            other => format!("{:?}", other),
        }
    }
}

impl Display for Site {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        match self {
            Site::CallArgument { call, target, .. } => {
                write!(f, "passed to {} at instruction {}", target, call)
            }
            Site::FieldStore { store, field } => {
                write!(f, "stored into {} at instruction {}", field, store)
            }
        }
    }
}

/// Escape of `this` out of a constructor
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct Finding {
    /// Class whose constructor lets `this` escape
    pub class: BinaryName,
    pub message: &'static str,
    pub reason: Reason,
    pub site: Site,
}

impl Finding {
    pub const MESSAGE: &'static str = "The 'this' reference is exposed outside the constructor";

    pub fn escaped_this(class: &BinaryName, site: Site) -> Finding {
        Finding {
            class: class.clone(),
            message: Finding::MESSAGE,
            reason: Reason::EscapedThisReference,
            site,
        }
    }
}

impl Display for Finding {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        write!(
            f,
            "{}: {} ({}, {})",
            self.class,
            self.message,
            self.site,
            self.reason.code()
        )
    }
}

/// Destination for findings
pub trait Reporter {
    fn report(&mut self, finding: Finding);
}

impl Reporter for Vec<Finding> {
    fn report(&mut self, finding: Finding) {
        self.push(finding)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn display() {
        let class = BinaryName::from_string(String::from("me/alec/Point")).unwrap();

        let call = Finding::escaped_this(
            &class,
            Site::CallArgument {
                call: 3,
                load: 2,
                target: String::from("me/alec/Registry.register(Ljava/lang/Object;)V"),
            },
        );
        assert_eq!(
            call.to_string(),
            "me.alec.Point: The 'this' reference is exposed outside the constructor \
             (passed to me/alec/Registry.register(Ljava/lang/Object;)V at instruction 3, \
             ESCAPED_THIS_REFERENCE)"
        );

        let store = Finding::escaped_this(
            &class,
            Site::FieldStore {
                store: 1,
                field: String::from("me/alec/Point.instance"),
            },
        );
        assert_eq!(
            store.to_string(),
            "me.alec.Point: The 'this' reference is exposed outside the constructor \
             (stored into me/alec/Point.instance at instruction 1, ESCAPED_THIS_REFERENCE)"
        );
    }
}
