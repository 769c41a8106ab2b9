use crate::jvm::class_file::{Attribute, ClassConstantIndex, ConstantPool, Field, Method};
use crate::jvm::{BinaryName, ClassAccessFlags, Deserialize, Error};
use byteorder::ReadBytesExt;
use std::fs;
use std::path::Path;

/// Class file version
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Version {
    pub major: u16,
    pub minor: u16,
}

impl Version {
    pub const JAVA8: Version = Version {
        major: 52,
        minor: 0,
    };
}

/// Representation of the [`class` file format of the JVM][0]
///
/// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html
#[derive(Debug)]
pub struct ClassFile {
    pub version: Version,
    pub constants: ConstantPool,
    pub access_flags: ClassAccessFlags,
    pub this_class: ClassConstantIndex,

    /// Zero only for `java/lang/Object` (and `module-info`)
    pub super_class: ClassConstantIndex,
    pub interfaces: Vec<ClassConstantIndex>,
    pub fields: Vec<Field>,
    pub methods: Vec<Method>,
    pub attributes: Vec<Attribute>,
}

impl ClassFile {
    /// Magic header bytes that go at the front of the serialized class file
    const MAGIC: u32 = 0xCAFEBABE;

    /// Read a class file from disk
    pub fn read_from_path<P: AsRef<Path>>(path: P) -> Result<ClassFile, Error> {
        let bytes = fs::read(path)?;
        ClassFile::parse(&bytes)
    }

    /// Parse a class file from its bytes
    pub fn parse(bytes: &[u8]) -> Result<ClassFile, Error> {
        ClassFile::read(&mut &bytes[..])
    }

    /// Read a class file from a binary input stream
    pub fn read<R: ReadBytesExt>(reader: &mut R) -> Result<ClassFile, Error> {
        let magic = u32::deserialize(reader)?;
        if magic != ClassFile::MAGIC {
            return Err(Error::BadMagic(magic));
        }

        let minor = u16::deserialize(reader)?;
        let major = u16::deserialize(reader)?;
        let constants = ConstantPool::read(reader)?;

        Ok(ClassFile {
            version: Version { major, minor },
            constants,
            access_flags: ClassAccessFlags::deserialize(reader)?,
            this_class: ClassConstantIndex::deserialize(reader)?,
            super_class: ClassConstantIndex::deserialize(reader)?,
            interfaces: Vec::<ClassConstantIndex>::deserialize(reader)?,
            fields: Vec::<Field>::deserialize(reader)?,
            methods: Vec::<Method>::deserialize(reader)?,
            attributes: Vec::<Attribute>::deserialize(reader)?,
        })
    }

    /// Name of the class this file defines
    pub fn name(&self) -> Result<BinaryName, Error> {
        self.constants.class_name(self.this_class)
    }

    /// Instance initialization methods (constructors) of the class
    pub fn constructors(&self) -> Result<Vec<&Method>, Error> {
        let mut constructors = vec![];
        for method in &self.methods {
            if method.is_constructor(&self.constants)? {
                constructors.push(method);
            }
        }
        Ok(constructors)
    }
}
