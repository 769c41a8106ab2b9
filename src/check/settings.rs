#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    /// Treat `invokedynamic` as a call site
    ///
    /// Lambdas and method references that capture `this` compile to an `invokedynamic` taking
    /// `this` as an argument, so this catches `this` escaping into a closure.
    pub include_invokedynamic: bool,

    /// Skip classes marked `ACC_SYNTHETIC`
    ///
    /// These are generated by the compiler, so findings in them are rarely actionable.
    pub skip_synthetic_classes: bool,
}

impl Default for Settings {
    fn default() -> Settings {
        Settings {
            include_invokedynamic: true,
            skip_synthetic_classes: false,
        }
    }
}
