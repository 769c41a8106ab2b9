use crate::jvm::class_file::{Attribute, Code, ConstantPool, Utf8ConstantIndex};
use crate::jvm::{Deserialize, Error, MethodAccessFlags, Name, UnqualifiedName};
use byteorder::ReadBytesExt;

/// Method declared by a class or interface
///
/// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.6
#[derive(Debug)]
pub struct Method {
    pub access_flags: MethodAccessFlags,
    pub name_index: Utf8ConstantIndex,
    pub descriptor_index: Utf8ConstantIndex,
    pub attributes: Vec<Attribute>,
}

impl Deserialize for Method {
    fn deserialize<R: ReadBytesExt>(reader: &mut R) -> std::io::Result<Self> {
        Ok(Method {
            access_flags: MethodAccessFlags::deserialize(reader)?,
            name_index: Utf8ConstantIndex::deserialize(reader)?,
            descriptor_index: Utf8ConstantIndex::deserialize(reader)?,
            attributes: Vec::<Attribute>::deserialize(reader)?,
        })
    }
}

impl Method {
    pub fn name<'a>(&self, constants: &'a ConstantPool) -> Result<&'a str, Error> {
        constants.utf8(self.name_index)
    }

    pub fn descriptor<'a>(&self, constants: &'a ConstantPool) -> Result<&'a str, Error> {
        constants.utf8(self.descriptor_index)
    }

    /// Is this an instance initialization method?
    pub fn is_constructor(&self, constants: &ConstantPool) -> Result<bool, Error> {
        Ok(self.name(constants)? == UnqualifiedName::INIT.as_str())
    }

    /// Parse the `Code` attribute, if there is one
    ///
    /// Abstract and native methods have no code.
    pub fn code(&self, constants: &ConstantPool) -> Result<Option<Code>, Error> {
        match Attribute::find(&self.attributes, Code::NAME, constants)? {
            None => Ok(None),
            Some(attribute) => {
                let code = Code::deserialize(&mut attribute.info.as_slice())?;
                Ok(Some(code))
            }
        }
    }
}
