use crate::jvm::code::Instruction;

/// Local variable slot holding `this` in every instance method (constructors included)
pub const THIS_SLOT: u16 = 0;

/// What an instruction does, as far as the escape analysis cares
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum InstructionKind {
    /// Pushes the value of a local variable
    LoadsLocal(u16),

    /// `putfield` or `putstatic`
    StoresField,

    /// `dup`
    DuplicatesTop,

    /// `new`
    AllocatesObject,

    /// Any of the `invoke*` instructions
    InvokesMethod,

    /// Leaves a freshly computed value on top of the stack
    PushesValue,

    /// Consumes values without producing one
    PopsValue,

    /// Anything else (including the stack shuffles other than `dup`)
    Neutral,
}

impl InstructionKind {
    /// Is this loading the `this` reference?
    pub fn is_this_load(&self) -> bool {
        *self == InstructionKind::LoadsLocal(THIS_SLOT)
    }

    /// Does this take part in building up a single value across several instructions?
    ///
    /// The canonical case is `new Foo; dup; ...; invokespecial Foo.<init>`, which leaves one
    /// object on the stack despite being several instructions long.
    pub fn is_stack_shuffle(&self) -> bool {
        matches!(
            self,
            InstructionKind::DuplicatesTop | InstructionKind::AllocatesObject
        )
    }

    /// Does this leave something new on the top of the stack?
    pub fn pushes_onto_stack(&self) -> bool {
        matches!(
            self,
            InstructionKind::LoadsLocal(_)
                | InstructionKind::DuplicatesTop
                | InstructionKind::AllocatesObject
                | InstructionKind::PushesValue
        )
    }
}

/// Classify an instruction
pub fn classify(instruction: &Instruction) -> InstructionKind {
    use Instruction::*;

    match instruction {
        ILoad(idx) | LLoad(idx) | FLoad(idx) | DLoad(idx) | ALoad(idx) => {
            InstructionKind::LoadsLocal(*idx)
        }

        PutField(_) | PutStatic(_) => InstructionKind::StoresField,

        Dup => InstructionKind::DuplicatesTop,

        New(_) => InstructionKind::AllocatesObject,

        Invoke(_, _) | InvokeDynamic(_) => InstructionKind::InvokesMethod,

        AConstNull | IConstM1 | IConst0 | IConst1 | IConst2 | IConst3 | IConst4 | IConst5
        | LConst0 | LConst1 | FConst0 | FConst1 | FConst2 | DConst0 | DConst1 | BiPush(_)
        | SiPush(_) | Ldc(_) | Ldc2(_) => InstructionKind::PushesValue,

        IALoad | LALoad | FALoad | DALoad | AALoad | BALoad | CALoad | SALoad => {
            InstructionKind::PushesValue
        }

        IAdd | LAdd | FAdd | DAdd | ISub | LSub | FSub | DSub | IMul | LMul | FMul | DMul
        | IDiv | LDiv | FDiv | DDiv | IRem | LRem | FRem | DRem | INeg | LNeg | FNeg | DNeg
        | ISh(_) | LSh(_) | IAnd | LAnd | IOr | LOr | IXor | LXor => InstructionKind::PushesValue,

        I2L | I2F | I2D | L2I | L2F | L2D | F2I | F2L | F2D | D2I | D2L | D2F | I2B | I2C
        | I2S | LCmp | FCmp(_) | DCmp(_) => InstructionKind::PushesValue,

        GetStatic(_) | GetField(_) | NewArray(_) | ANewArray(_) | MultiANewArray(_, _)
        | ArrayLength | CheckCast(_) | InstanceOf(_) => InstructionKind::PushesValue,

        IStore(_) | LStore(_) | FStore(_) | DStore(_) | AStore(_) => InstructionKind::PopsValue,

        IAStore | LAStore | FAStore | DAStore | AAStore | BAStore | CAStore | SAStore | Pop
        | Pop2 | MonitorEnter | MonitorExit | AThrow => InstructionKind::PopsValue,

        If(_, _) | IfICmp(_, _) | IfACmp(_, _) | IfNull(_, _) => InstructionKind::PopsValue,

        TableSwitch { .. } | LookupSwitch { .. } => InstructionKind::PopsValue,

        IReturn | LReturn | FReturn | DReturn | AReturn => InstructionKind::PopsValue,

        Nop | DupX1 | DupX2 | Dup2 | Dup2X1 | Dup2X2 | Swap | IInc(_, _) | Goto(_) | Jsr(_)
        | Ret(_) | Return => InstructionKind::Neutral,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::jvm::code::{FieldRef, InvokeType, MethodRef};
    use crate::jvm::{BinaryName, Name, UnqualifiedName};
    use Instruction::*;

    #[test]
    fn only_slot_zero_is_this() {
        assert!(classify(&ALoad(0)).is_this_load());
        assert!(classify(&ILoad(0)).is_this_load());
        assert!(!classify(&ALoad(1)).is_this_load());
        assert!(!classify(&AStore(0)).is_this_load());
        assert!(!classify(&IInc(0, 1)).is_this_load());
        assert!(!classify(&Dup).is_this_load());
    }

    #[test]
    fn field_and_call_instructions() {
        let field = FieldRef {
            owner: BinaryName::from_string(String::from("me/alec/Point")).unwrap(),
            name: UnqualifiedName::from_string(String::from("x")).unwrap(),
            descriptor: String::from("I"),
        };
        assert_eq!(
            classify(&PutField(field.clone())),
            InstructionKind::StoresField
        );
        assert_eq!(
            classify(&PutStatic(field.clone())),
            InstructionKind::StoresField
        );
        assert_eq!(classify(&GetField(field)), InstructionKind::PushesValue);
        assert_eq!(
            classify(&Invoke(InvokeType::Special, MethodRef::object_init())),
            InstructionKind::InvokesMethod
        );
    }

    #[test]
    fn shuffles() {
        assert!(classify(&Dup).is_stack_shuffle());
        assert!(classify(&New(BinaryName::OBJECT)).is_stack_shuffle());
        assert!(!classify(&DupX1).is_stack_shuffle());
        assert!(!classify(&Dup2).is_stack_shuffle());
        assert!(!classify(&Swap).is_stack_shuffle());
    }

    #[test]
    fn pushing_instructions() {
        assert!(classify(&ALoad(0)).pushes_onto_stack());
        assert!(classify(&AConstNull).pushes_onto_stack());
        assert!(classify(&IAdd).pushes_onto_stack());
        assert!(!classify(&Pop).pushes_onto_stack());
        assert!(!classify(&Return).pushes_onto_stack());
        assert!(!classify(&Nop).pushes_onto_stack());
    }
}
