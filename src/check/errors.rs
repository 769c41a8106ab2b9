use crate::jvm;

#[derive(Debug)]
pub enum Error {
    /// The class file could not be read or decoded
    ClassFormat(jvm::Error),
}

impl From<jvm::Error> for Error {
    fn from(err: jvm::Error) -> Error {
        Error::ClassFormat(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error::ClassFormat(jvm::Error::IoError(err))
    }
}
