use super::*;
use crate::jvm::class_file::{ClassConstantIndex, ConstantIndex, ConstantPool};
use crate::jvm::{BaseType, BinaryName, Deserialize, Error};
use std::io::Cursor;

/// Cursor into a method's code array
///
/// Reads past the end of the array are reported as truncation of the instruction currently
/// being decoded.
struct CodeReader<'a> {
    cursor: Cursor<&'a [u8]>,

    /// Offset of the opcode of the instruction being decoded
    instruction_start: usize,
}

impl<'a> CodeReader<'a> {
    fn new(code: &'a [u8]) -> CodeReader<'a> {
        CodeReader {
            cursor: Cursor::new(code),
            instruction_start: 0,
        }
    }

    fn offset(&self) -> usize {
        self.cursor.position() as usize
    }

    fn is_finished(&self) -> bool {
        self.offset() >= self.cursor.get_ref().len()
    }

    fn remaining(&self) -> usize {
        self.cursor.get_ref().len().saturating_sub(self.offset())
    }

    fn read<T: Deserialize>(&mut self) -> Result<T, Error> {
        T::deserialize(&mut self.cursor).map_err(|_| Error::TruncatedCode {
            offset: self.instruction_start,
        })
    }

    /// Skip the padding after a switch opcode, up to the next offset that is a multiple of four
    fn skip_switch_padding(&mut self) -> Result<(), Error> {
        while self.offset() % 4 != 0 {
            self.read::<u8>()?;
        }
        Ok(())
    }

    /// Number of table entries, checked against what is left of the code array
    fn entry_count(&self, count: i64, entry_size: usize) -> Result<usize, Error> {
        let truncated = Error::TruncatedCode {
            offset: self.instruction_start,
        };
        if count < 0 {
            return Err(truncated);
        }
        let count = count as usize;
        if count.saturating_mul(entry_size) > self.remaining() {
            return Err(truncated);
        }
        Ok(count)
    }
}

/// Decode a code array into instructions
///
/// Constant pool operands of field, method, and class instructions are resolved. The result has
/// one entry per instruction, in code array order.
pub fn decode_instructions(
    code: &[u8],
    constants: &ConstantPool,
) -> Result<Vec<Instruction>, Error> {
    let mut reader = CodeReader::new(code);
    let mut instructions = vec![];

    while !reader.is_finished() {
        reader.instruction_start = reader.offset();
        let instruction = decode_instruction(&mut reader, constants)?;
        instructions.push(instruction);
    }

    Ok(instructions)
}

fn decode_instruction(
    reader: &mut CodeReader,
    constants: &ConstantPool,
) -> Result<Instruction, Error> {
    use Instruction::*;

    let opcode: u8 = reader.read()?;
    let instruction = match opcode {
        0x00 => Nop,
        0x01 => AConstNull,
        0x02 => IConstM1,
        0x03 => IConst0,
        0x04 => IConst1,
        0x05 => IConst2,
        0x06 => IConst3,
        0x07 => IConst4,
        0x08 => IConst5,
        0x09 => LConst0,
        0x0a => LConst1,
        0x0b => FConst0,
        0x0c => FConst1,
        0x0d => FConst2,
        0x0e => DConst0,
        0x0f => DConst1,
        0x10 => BiPush(reader.read()?),
        0x11 => SiPush(reader.read()?),
        0x12 => Ldc(ConstantIndex(reader.read::<u8>()? as u16)),
        0x13 => Ldc(reader.read()?),
        0x14 => Ldc2(reader.read()?),

        // Loads and stores with an explicit index
        0x15..=0x19 | 0x36..=0x3a => local_variable(opcode, reader.read::<u8>()? as u16),

        // Loads and stores with the index baked into the opcode
        0x1a..=0x2d => local_variable(0x15 + (opcode - 0x1a) / 4, ((opcode - 0x1a) % 4) as u16),
        0x3b..=0x4e => local_variable(0x36 + (opcode - 0x3b) / 4, ((opcode - 0x3b) % 4) as u16),

        0x2e => IALoad,
        0x2f => LALoad,
        0x30 => FALoad,
        0x31 => DALoad,
        0x32 => AALoad,
        0x33 => BALoad,
        0x34 => CALoad,
        0x35 => SALoad,
        0x4f => IAStore,
        0x50 => LAStore,
        0x51 => FAStore,
        0x52 => DAStore,
        0x53 => AAStore,
        0x54 => BAStore,
        0x55 => CAStore,
        0x56 => SAStore,
        0x57 => Pop,
        0x58 => Pop2,
        0x59 => Dup,
        0x5a => DupX1,
        0x5b => DupX2,
        0x5c => Dup2,
        0x5d => Dup2X1,
        0x5e => Dup2X2,
        0x5f => Swap,
        0x60 => IAdd,
        0x61 => LAdd,
        0x62 => FAdd,
        0x63 => DAdd,
        0x64 => ISub,
        0x65 => LSub,
        0x66 => FSub,
        0x67 => DSub,
        0x68 => IMul,
        0x69 => LMul,
        0x6a => FMul,
        0x6b => DMul,
        0x6c => IDiv,
        0x6d => LDiv,
        0x6e => FDiv,
        0x6f => DDiv,
        0x70 => IRem,
        0x71 => LRem,
        0x72 => FRem,
        0x73 => DRem,
        0x74 => INeg,
        0x75 => LNeg,
        0x76 => FNeg,
        0x77 => DNeg,
        0x78 => ISh(ShiftType::Left),
        0x79 => LSh(ShiftType::Left),
        0x7a => ISh(ShiftType::ArithmeticRight),
        0x7b => LSh(ShiftType::ArithmeticRight),
        0x7c => ISh(ShiftType::LogicalRight),
        0x7d => LSh(ShiftType::LogicalRight),
        0x7e => IAnd,
        0x7f => LAnd,
        0x80 => IOr,
        0x81 => LOr,
        0x82 => IXor,
        0x83 => LXor,
        0x84 => {
            let idx = reader.read::<u8>()? as u16;
            let diff = reader.read::<i8>()? as i16;
            IInc(idx, diff)
        }
        0x85 => I2L,
        0x86 => I2F,
        0x87 => I2D,
        0x88 => L2I,
        0x89 => L2F,
        0x8a => L2D,
        0x8b => F2I,
        0x8c => F2L,
        0x8d => F2D,
        0x8e => D2I,
        0x8f => D2L,
        0x90 => D2F,
        0x91 => I2B,
        0x92 => I2C,
        0x93 => I2S,
        0x94 => LCmp,
        0x95 => FCmp(CompareMode::L),
        0x96 => FCmp(CompareMode::G),
        0x97 => DCmp(CompareMode::L),
        0x98 => DCmp(CompareMode::G),
        0x99..=0x9e => If(ord_comparison(opcode - 0x99), reader.read::<i16>()? as i32),
        0x9f..=0xa4 => IfICmp(ord_comparison(opcode - 0x9f), reader.read::<i16>()? as i32),
        0xa5 => IfACmp(EqComparison::EQ, reader.read::<i16>()? as i32),
        0xa6 => IfACmp(EqComparison::NE, reader.read::<i16>()? as i32),
        0xa7 => Goto(reader.read::<i16>()? as i32),
        0xa8 => Jsr(reader.read::<i16>()? as i32),
        0xa9 => Ret(reader.read::<u8>()? as u16),
        0xaa => {
            reader.skip_switch_padding()?;
            let default: i32 = reader.read()?;
            let low: i32 = reader.read()?;
            let high: i32 = reader.read()?;
            let count = reader.entry_count(high as i64 - low as i64 + 1, 4)?;
            let mut targets = Vec::with_capacity(count);
            for _ in 0..count {
                targets.push(reader.read()?);
            }
            TableSwitch {
                default,
                low,
                targets,
            }
        }
        0xab => {
            reader.skip_switch_padding()?;
            let default: i32 = reader.read()?;
            let npairs: i32 = reader.read()?;
            let count = reader.entry_count(npairs as i64, 8)?;
            let mut targets = Vec::with_capacity(count);
            for _ in 0..count {
                let key: i32 = reader.read()?;
                let target: i32 = reader.read()?;
                targets.push((key, target));
            }
            LookupSwitch { default, targets }
        }
        0xac => IReturn,
        0xad => LReturn,
        0xae => FReturn,
        0xaf => DReturn,
        0xb0 => AReturn,
        0xb1 => Return,
        0xb2 => GetStatic(constants.field_ref(reader.read()?)?),
        0xb3 => PutStatic(constants.field_ref(reader.read()?)?),
        0xb4 => GetField(constants.field_ref(reader.read()?)?),
        0xb5 => PutField(constants.field_ref(reader.read()?)?),
        0xb6 => Invoke(InvokeType::Virtual, constants.method_ref(reader.read()?)?),
        0xb7 => Invoke(InvokeType::Special, constants.method_ref(reader.read()?)?),
        0xb8 => Invoke(InvokeType::Static, constants.method_ref(reader.read()?)?),
        0xb9 => {
            let method = constants.method_ref(reader.read()?)?;
            let count: u8 = reader.read()?;
            let _zero: u8 = reader.read()?;
            Invoke(InvokeType::Interface(count), method)
        }
        0xba => {
            let call_site = constants.dynamic_call_site(reader.read()?)?;
            let _zero: u16 = reader.read()?;
            InvokeDynamic(call_site)
        }
        0xbb => New(class(reader, constants)?),
        0xbc => {
            let atype: u8 = reader.read()?;
            let element_type = match atype {
                4 => BaseType::Boolean,
                5 => BaseType::Char,
                6 => BaseType::Float,
                7 => BaseType::Double,
                8 => BaseType::Byte,
                9 => BaseType::Short,
                10 => BaseType::Int,
                11 => BaseType::Long,
                _ => {
                    return Err(Error::BadArrayType {
                        atype,
                        offset: reader.instruction_start,
                    })
                }
            };
            NewArray(element_type)
        }
        0xbd => ANewArray(class(reader, constants)?),
        0xbe => ArrayLength,
        0xbf => AThrow,
        0xc0 => CheckCast(class(reader, constants)?),
        0xc1 => InstanceOf(class(reader, constants)?),
        0xc2 => MonitorEnter,
        0xc3 => MonitorExit,
        0xc4 => {
            let modified: u8 = reader.read()?;
            match modified {
                0x15..=0x19 | 0x36..=0x3a => local_variable(modified, reader.read()?),
                0x84 => IInc(reader.read()?, reader.read()?),
                0xa9 => Ret(reader.read()?),
                _ => {
                    return Err(Error::BadWideOpcode {
                        opcode: modified,
                        offset: reader.instruction_start,
                    })
                }
            }
        }
        0xc5 => {
            let class = class(reader, constants)?;
            let dimensions: u8 = reader.read()?;
            MultiANewArray(class, dimensions)
        }
        0xc6 => IfNull(EqComparison::EQ, reader.read::<i16>()? as i32),
        0xc7 => IfNull(EqComparison::NE, reader.read::<i16>()? as i32),
        0xc8 => Goto(reader.read()?),
        0xc9 => Jsr(reader.read()?),
        _ => {
            return Err(Error::UnknownOpcode {
                opcode,
                offset: reader.instruction_start,
            })
        }
    };

    Ok(instruction)
}

/// Build a load or store from the opcode of its general form (eg. `aload` for `aload_2`)
fn local_variable(opcode: u8, idx: u16) -> Instruction {
    match opcode {
        0x15 => Instruction::ILoad(idx),
        0x16 => Instruction::LLoad(idx),
        0x17 => Instruction::FLoad(idx),
        0x18 => Instruction::DLoad(idx),
        0x19 => Instruction::ALoad(idx),
        0x36 => Instruction::IStore(idx),
        0x37 => Instruction::LStore(idx),
        0x38 => Instruction::FStore(idx),
        0x39 => Instruction::DStore(idx),
        _ => Instruction::AStore(idx),
    }
}

/// Comparisons in opcode order (`ifeq`, `ifne`, `iflt`, `ifge`, `ifgt`, `ifle`)
fn ord_comparison(n: u8) -> OrdComparison {
    match n {
        0 => OrdComparison::EQ,
        1 => OrdComparison::NE,
        2 => OrdComparison::LT,
        3 => OrdComparison::GE,
        4 => OrdComparison::GT,
        _ => OrdComparison::LE,
    }
}

fn class(reader: &mut CodeReader, constants: &ConstantPool) -> Result<BinaryName, Error> {
    let index: ClassConstantIndex = reader.read()?;
    constants.class_name(index)
}
