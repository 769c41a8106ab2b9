use super::{Error, Settings};
use crate::analysis::{EscapeDetector, Finding, Reporter};
use crate::jvm::class_file::ClassFile;
use crate::jvm::ClassAccessFlags;

/// Checks every constructor of a class for `this` escaping
pub struct EscapedThisChecker {
    pub settings: Settings,
}

impl EscapedThisChecker {
    pub fn new(settings: Settings) -> EscapedThisChecker {
        EscapedThisChecker { settings }
    }

    /// Check all constructors of the class, sending findings to the reporter
    ///
    /// Constructors without a `Code` attribute are skipped, as are all other methods. Returns the
    /// number of findings reported.
    pub fn check_class<R: Reporter + ?Sized>(
        &self,
        class: &ClassFile,
        reporter: &mut R,
    ) -> Result<usize, Error> {
        let class_name = class.name()?;

        if self.settings.skip_synthetic_classes
            && class.access_flags.contains(ClassAccessFlags::SYNTHETIC)
        {
            log::debug!("Skipping synthetic class {:?}", class_name);
            return Ok(0);
        }

        let detector = EscapeDetector::new(&class_name)
            .include_invokedynamic(self.settings.include_invokedynamic);

        let mut reported = 0;
        for constructor in class.constructors()? {
            let descriptor = constructor.descriptor(&class.constants)?;
            let code = match constructor.code(&class.constants)? {
                Some(code) => code,
                None => {
                    log::debug!("Constructor {:?}{} has no code", class_name, descriptor);
                    continue;
                }
            };

            let instructions = code.decode(&class.constants)?;
            log::debug!(
                "Checking constructor {:?}{} ({} instructions)",
                class_name,
                descriptor,
                instructions.len()
            );
            reported += detector.detect_into(&instructions, reporter);
        }

        Ok(reported)
    }
}

/// Parse a class file and collect every finding in its constructors
pub fn check_class_bytes(bytes: &[u8], settings: &Settings) -> Result<Vec<Finding>, Error> {
    let class = ClassFile::parse(bytes)?;
    let checker = EscapedThisChecker::new(settings.clone());
    let mut findings = vec![];
    checker.check_class(&class, &mut findings)?;
    Ok(findings)
}
