#[derive(Debug)]
pub enum Error {
    IoError(std::io::Error),

    /// Class file does not start with `0xCAFEBABE`
    BadMagic(u32),

    UnknownConstantTag {
        tag: u8,
        index: u16,
    },

    /// A constant index is out of range or points at the wrong kind of constant
    BadConstantIndex {
        index: u16,
        expected: &'static str,
    },

    /// A `Utf8` constant is not valid modified UTF-8
    MalformedUtf8(u16),

    UnknownOpcode {
        opcode: u8,
        offset: usize,
    },

    /// `wide` prefix on an instruction it cannot modify
    BadWideOpcode {
        opcode: u8,
        offset: usize,
    },

    /// `newarray` with an element type code outside of 4-11
    BadArrayType {
        atype: u8,
        offset: usize,
    },

    /// Code array ends in the middle of an instruction
    TruncatedCode {
        offset: usize,
    },

    MalformedName(String),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error::IoError(err)
    }
}
