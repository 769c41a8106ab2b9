//! This module contains the AST of decoded JVM bytecode. The representation is slightly different
//! from the usual presentation to make it more convenient to inspect. For instance:
//!
//!   - The "wide" instruction doesn't show up at all, but instead gets merged into the
//!     instructions it is allowed to modify
//!
//!   - The short forms of loads and stores (eg. `aload_0`) are merged into the general form
//!     (eg. `aload 0` becomes `ALoad(0)` too)
//!
//!   - Some instructions (like the branches) get abstracted into one instruction with a field.
//!     This helps with repetitive pattern matches.
//!

use crate::jvm::class_file::ConstantIndex;
use crate::jvm::{BaseType, BinaryName, UnqualifiedName};

/// JVM bytecode instruction
#[derive(Clone, Debug, PartialEq)]
pub enum Instruction {
    Nop,
    AConstNull,
    IConstM1,
    IConst0,
    IConst1,
    IConst2,
    IConst3,
    IConst4,
    IConst5,
    LConst0,
    LConst1,
    FConst0,
    FConst1,
    FConst2,
    DConst0,
    DConst1,
    BiPush(i8),
    SiPush(i16),
    Ldc(ConstantIndex), // covers both `ldc` and `ldc_w`
    Ldc2(ConstantIndex),
    ILoad(u16), // covers `iload`, `iload{0,3}`, and `wide iload`
    LLoad(u16),
    FLoad(u16),
    DLoad(u16),
    ALoad(u16),
    IALoad,
    LALoad,
    FALoad,
    DALoad,
    AALoad,
    BALoad,
    CALoad,
    SALoad,
    IStore(u16), // covers `istore`, `istore{0,3}`, and `wide istore`
    LStore(u16),
    FStore(u16),
    DStore(u16),
    AStore(u16),
    IAStore,
    LAStore,
    FAStore,
    DAStore,
    AAStore,
    BAStore,
    CAStore,
    SAStore,
    Pop,
    Pop2,
    Dup,
    DupX1,
    DupX2,
    Dup2,
    Dup2X1,
    Dup2X2,
    Swap,
    IAdd,
    LAdd,
    FAdd,
    DAdd,
    ISub,
    LSub,
    FSub,
    DSub,
    IMul,
    LMul,
    FMul,
    DMul,
    IDiv,
    LDiv,
    FDiv,
    DDiv,
    IRem,
    LRem,
    FRem,
    DRem,
    INeg,
    LNeg,
    FNeg,
    DNeg,
    ISh(ShiftType), // covers `ishr`, `ishl`, and `iushr`
    LSh(ShiftType), // covers `lshr`, `lshl`, and `lushr`
    IAnd,
    LAnd,
    IOr,
    LOr,
    IXor,
    LXor,
    IInc(u16, i16), // covers `iinc` and `wide iinc`
    I2L,
    I2F,
    I2D,
    L2I,
    L2F,
    L2D,
    F2I,
    F2L,
    F2D,
    D2I,
    D2L,
    D2F,
    I2B,
    I2C,
    I2S,
    LCmp,
    FCmp(CompareMode), // covers `fcmpl` and `fcmpg`
    DCmp(CompareMode), // covers `dcmpl` and `dcmpg`
    If(OrdComparison, i32), // covers `ifeq`, `ifne`, `iflt`, `ifge`, `ifgt`, `ifle`
    IfICmp(OrdComparison, i32), // covers `if_icmpeq`, `if_icmpne`, ... `if_icmple`
    IfACmp(EqComparison, i32), // covers `if_acmpeq`, `if_acmpne`
    IfNull(EqComparison, i32), // covers `ifnull`, `ifnonnull`
    Goto(i32),                 // covers `goto` and `goto_w`
    Jsr(i32),                  // covers `jsr` and `jsr_w`
    Ret(u16),                  // covers `ret` and `wide ret`
    TableSwitch {
        /// Jump target if the argument is outside of the table
        default: i32,

        /// Value associated with the first jump target
        low: i32,

        /// Jump targets
        targets: Vec<i32>,
    },
    LookupSwitch {
        /// Jump target if the argument matches none of the keys
        default: i32,

        /// Keys and their jump targets
        targets: Vec<(i32, i32)>,
    },
    IReturn,
    LReturn,
    FReturn,
    DReturn,
    AReturn,
    Return,
    GetStatic(FieldRef),
    PutStatic(FieldRef),
    GetField(FieldRef),
    PutField(FieldRef),
    Invoke(InvokeType, MethodRef),
    InvokeDynamic(DynamicCallSite),
    New(BinaryName),
    NewArray(BaseType),
    ANewArray(BinaryName),
    ArrayLength,
    AThrow,
    CheckCast(BinaryName),
    InstanceOf(BinaryName),
    MonitorEnter,
    MonitorExit,
    MultiANewArray(BinaryName, u8),
}

/// Field referenced by a field instruction
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FieldRef {
    pub owner: BinaryName,
    pub name: UnqualifiedName,
    pub descriptor: String,
}

/// Method referenced by an invoke instruction
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MethodRef {
    pub owner: BinaryName,
    pub name: UnqualifiedName,
    pub descriptor: String,
    pub is_interface: bool,
}

impl MethodRef {
    /// The `java/lang/Object.<init>()V` constructor
    pub fn object_init() -> MethodRef {
        MethodRef {
            owner: BinaryName::OBJECT,
            name: UnqualifiedName::INIT,
            descriptor: String::from("()V"),
            is_interface: false,
        }
    }

    /// Is this the constructor of `java/lang/Object`?
    ///
    /// Every constructor chains to its superclass constructor, so classes extending `Object`
    /// directly always contain this call.
    pub fn is_object_init(&self) -> bool {
        self.owner == BinaryName::OBJECT && self.name == UnqualifiedName::INIT
    }
}

/// Call site of an `invokedynamic` instruction
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DynamicCallSite {
    /// Index into the `BootstrapMethods` attribute
    pub bootstrap_method: u16,
    pub name: UnqualifiedName,
    pub descriptor: String,
}

/// Possible bit shifts
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum ShiftType {
    Left,
    LogicalRight,
    ArithmeticRight,
}

/// Comparison modes for floating point
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum CompareMode {
    /// -1 on NaN
    L,

    /// 1 on NaN
    G,
}

/// Binary comparison operators available for `int` branches
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum OrdComparison {
    EQ,
    GE,
    GT,
    LE,
    LT,
    NE,
}

/// Equality/inequality comparison operators
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum EqComparison {
    EQ,
    NE,
}

/// Type of method to invoke
///
/// Note: `InvokeDynamic` is kept separate because the constant argument it expects is not to a
/// `Constant::MethodRef`.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum InvokeType {
    Virtual,
    Special,
    Static,
    Interface(u8), // `count` is of total arguments, where `long`/`double` count for 2
}
