use crate::jvm::code::{DynamicCallSite, FieldRef, MethodRef};
use crate::jvm::{BinaryName, Deserialize, Error, Name, UnqualifiedName};
use byteorder::ReadBytesExt;

/// Index of any constant in the constant pool
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ConstantIndex(pub u16);

/// Index of a `Utf8` constant
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Utf8ConstantIndex(pub u16);

/// Index of a `Class` constant
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ClassConstantIndex(pub u16);

/// Index of a `NameAndType` constant
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct NameAndTypeConstantIndex(pub u16);

macro_rules! deserialize_index {
    ($($index:ident),*) => {
        $(
            impl Deserialize for $index {
                fn deserialize<R: ReadBytesExt>(reader: &mut R) -> std::io::Result<Self> {
                    u16::deserialize(reader).map($index)
                }
            }
        )*
    };
}

deserialize_index!(
    ConstantIndex,
    Utf8ConstantIndex,
    ClassConstantIndex,
    NameAndTypeConstantIndex
);

/// Constants as in the constant pool
///
/// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.4
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    /// Class or an interface
    Class(Utf8ConstantIndex),

    /// Field
    FieldRef(ClassConstantIndex, NameAndTypeConstantIndex),

    /// Method (this combines `Methodref` and `InterfaceMethodref`
    MethodRef {
        class: ClassConstantIndex,
        name_and_type: NameAndTypeConstantIndex,
        is_interface: bool,
    },

    /// Constant object of type `java.lang.String`
    String(Utf8ConstantIndex),

    /// Constant primitive of type `int`
    Integer(i32),

    /// Constant primitive of type `float`
    Float(f32),

    /// Constant primitive of type `long`
    Long(i64),

    /// Constant primitive of type `double`
    Double(f64),

    /// Name and a type (eg. for a field or a method)
    NameAndType {
        name: Utf8ConstantIndex,
        descriptor: Utf8ConstantIndex,
    },

    /// Constant UTF-8 encoded raw string value
    ///
    /// Despite the name, the encoding is not quite UTF-8 (the encoding of the
    /// null character `\u{0000}` and the encoding of supplementary characters
    /// is different). The string here is already decoded.
    Utf8(String),

    /// Constant object of type `java.lang.invoke.MethodHandle`
    MethodHandle { handle_kind: u8, member: ConstantIndex },

    /// Method type
    MethodType { descriptor: Utf8ConstantIndex },

    /// Dynamically-computed constant
    Dynamic {
        bootstrap_method: u16,
        name_and_type: NameAndTypeConstantIndex,
    },

    /// Dynamically-computed call site
    InvokeDynamic {
        /// Index into the `BootstrapMethods` attribute
        bootstrap_method: u16,
        name_and_type: NameAndTypeConstantIndex,
    },

    Module(Utf8ConstantIndex),
    Package(Utf8ConstantIndex),
}

impl Constant {
    /// Number of constant pool slots taken up by the constant
    pub fn width(&self) -> usize {
        match self {
            Constant::Long(_) | Constant::Double(_) => 2,
            _ => 1,
        }
    }

    /// Read a constant, given the index at which it will be placed
    fn read<R: ReadBytesExt>(reader: &mut R, index: u16) -> Result<Constant, Error> {
        let tag = u8::deserialize(reader)?;
        let constant = match tag {
            1 => {
                let len = u16::deserialize(reader)?;
                let bytes = crate::jvm::read_bytes(reader, len as usize)?;
                let string = decode_modified_utf8(&bytes).ok_or(Error::MalformedUtf8(index))?;
                Constant::Utf8(string)
            }
            3 => Constant::Integer(i32::deserialize(reader)?),
            4 => Constant::Float(f32::deserialize(reader)?),
            5 => Constant::Long(i64::deserialize(reader)?),
            6 => Constant::Double(f64::deserialize(reader)?),
            7 => Constant::Class(Utf8ConstantIndex::deserialize(reader)?),
            8 => Constant::String(Utf8ConstantIndex::deserialize(reader)?),
            9 => Constant::FieldRef(
                ClassConstantIndex::deserialize(reader)?,
                NameAndTypeConstantIndex::deserialize(reader)?,
            ),
            10 | 11 => Constant::MethodRef {
                class: ClassConstantIndex::deserialize(reader)?,
                name_and_type: NameAndTypeConstantIndex::deserialize(reader)?,
                is_interface: tag == 11,
            },
            12 => Constant::NameAndType {
                name: Utf8ConstantIndex::deserialize(reader)?,
                descriptor: Utf8ConstantIndex::deserialize(reader)?,
            },
            15 => Constant::MethodHandle {
                handle_kind: u8::deserialize(reader)?,
                member: ConstantIndex::deserialize(reader)?,
            },
            16 => Constant::MethodType {
                descriptor: Utf8ConstantIndex::deserialize(reader)?,
            },
            17 => Constant::Dynamic {
                bootstrap_method: u16::deserialize(reader)?,
                name_and_type: NameAndTypeConstantIndex::deserialize(reader)?,
            },
            18 => Constant::InvokeDynamic {
                bootstrap_method: u16::deserialize(reader)?,
                name_and_type: NameAndTypeConstantIndex::deserialize(reader)?,
            },
            19 => Constant::Module(Utf8ConstantIndex::deserialize(reader)?),
            20 => Constant::Package(Utf8ConstantIndex::deserialize(reader)?),
            _ => return Err(Error::UnknownConstantTag { tag, index }),
        };
        Ok(constant)
    }
}

/// Decode the [modified UTF-8][0] used in class files
///
/// Returns `None` if the bytes are not a valid encoding.
///
/// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.4.7
pub fn decode_modified_utf8(bytes: &[u8]) -> Option<String> {
    let continuation = |i: usize| -> Option<u16> {
        let b = *bytes.get(i)?;
        if b & 0xC0 == 0x80 {
            Some((b & 0x3F) as u16)
        } else {
            None
        }
    };

    // Surrogate pairs are encoded as two separate three-byte sequences, so decoding into UTF-16
    // code units and then recombining handles supplementary characters for free
    let mut units: Vec<u16> = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b & 0x80 == 0 {
            units.push(b as u16);
            i += 1;
        } else if b & 0xE0 == 0xC0 {
            units.push(((b & 0x1F) as u16) << 6 | continuation(i + 1)?);
            i += 2;
        } else if b & 0xF0 == 0xE0 {
            units.push(
                ((b & 0x0F) as u16) << 12 | continuation(i + 1)? << 6 | continuation(i + 2)?,
            );
            i += 3;
        } else {
            return None;
        }
    }

    String::from_utf16(&units).ok()
}

/// Parsed constant pool
///
/// Indexing starts at 1, and `Long`/`Double` constants take up two indices (the second of which
/// is unusable).
#[derive(Debug, Default)]
pub struct ConstantPool {
    /// Entry `i` holds the constant at index `i`
    entries: Vec<Option<Constant>>,
}

impl ConstantPool {
    /// Read the constant pool, including its leading count
    pub fn read<R: ReadBytesExt>(reader: &mut R) -> Result<ConstantPool, Error> {
        let count = u16::deserialize(reader)?;
        let mut entries: Vec<Option<Constant>> = Vec::with_capacity(count as usize);
        entries.push(None);

        while entries.len() < count as usize {
            let index = entries.len() as u16;
            let constant = Constant::read(reader, index)?;
            let width = constant.width();
            entries.push(Some(constant));
            if width == 2 {
                entries.push(None);
            }
        }

        Ok(ConstantPool { entries })
    }

    /// Number of slots in the pool (including the unusable zero-th slot)
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Look up a constant
    pub fn get(&self, index: u16) -> Result<&Constant, Error> {
        match self.entries.get(index as usize) {
            Some(Some(constant)) => Ok(constant),
            _ => Err(Error::BadConstantIndex {
                index,
                expected: "constant",
            }),
        }
    }

    /// Look up a `Utf8` constant
    pub fn utf8(&self, index: Utf8ConstantIndex) -> Result<&str, Error> {
        match self.get(index.0) {
            Ok(Constant::Utf8(string)) => Ok(string),
            _ => Err(Error::BadConstantIndex {
                index: index.0,
                expected: "Utf8",
            }),
        }
    }

    /// Look up the name of a `Class` constant
    pub fn class_name(&self, index: ClassConstantIndex) -> Result<BinaryName, Error> {
        match self.get(index.0) {
            Ok(Constant::Class(name)) => {
                let name = self.utf8(*name)?;
                BinaryName::from_string(name.to_owned()).map_err(Error::MalformedName)
            }
            _ => Err(Error::BadConstantIndex {
                index: index.0,
                expected: "Class",
            }),
        }
    }

    /// Look up the name and descriptor of a `NameAndType` constant
    pub fn name_and_type(
        &self,
        index: NameAndTypeConstantIndex,
    ) -> Result<(UnqualifiedName, String), Error> {
        match self.get(index.0) {
            Ok(Constant::NameAndType { name, descriptor }) => {
                let name = UnqualifiedName::from_string(self.utf8(*name)?.to_owned())
                    .map_err(Error::MalformedName)?;
                let descriptor = self.utf8(*descriptor)?.to_owned();
                Ok((name, descriptor))
            }
            _ => Err(Error::BadConstantIndex {
                index: index.0,
                expected: "NameAndType",
            }),
        }
    }

    /// Resolve a `Fieldref` constant
    pub fn field_ref(&self, index: u16) -> Result<FieldRef, Error> {
        match self.get(index) {
            Ok(Constant::FieldRef(class, name_and_type)) => {
                let (name, descriptor) = self.name_and_type(*name_and_type)?;
                Ok(FieldRef {
                    owner: self.class_name(*class)?,
                    name,
                    descriptor,
                })
            }
            _ => Err(Error::BadConstantIndex {
                index,
                expected: "Fieldref",
            }),
        }
    }

    /// Resolve a `Methodref` or `InterfaceMethodref` constant
    pub fn method_ref(&self, index: u16) -> Result<MethodRef, Error> {
        match self.get(index) {
            Ok(Constant::MethodRef {
                class,
                name_and_type,
                is_interface,
            }) => {
                let (name, descriptor) = self.name_and_type(*name_and_type)?;
                Ok(MethodRef {
                    owner: self.class_name(*class)?,
                    name,
                    descriptor,
                    is_interface: *is_interface,
                })
            }
            _ => Err(Error::BadConstantIndex {
                index,
                expected: "Methodref",
            }),
        }
    }

    /// Resolve an `InvokeDynamic` constant
    pub fn dynamic_call_site(&self, index: u16) -> Result<DynamicCallSite, Error> {
        match self.get(index) {
            Ok(Constant::InvokeDynamic {
                bootstrap_method,
                name_and_type,
            }) => {
                let (name, descriptor) = self.name_and_type(*name_and_type)?;
                Ok(DynamicCallSite {
                    bootstrap_method: *bootstrap_method,
                    name,
                    descriptor,
                })
            }
            _ => Err(Error::BadConstantIndex {
                index,
                expected: "InvokeDynamic",
            }),
        }
    }
}
