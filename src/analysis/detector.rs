use super::{classify, collect_sites, BackwardScan, CallSite, FieldStoreSite, Finding, Reporter, Site};
use crate::jvm::code::Instruction;
use crate::jvm::BinaryName;

/// Indices of the instructions loading `this` as an argument of the call
///
/// Every argument position is inspected, so a call taking `this` twice yields two indices.
pub fn analyze_call_site<'a>(
    instructions: &'a [Instruction],
    call: &CallSite,
) -> impl Iterator<Item = usize> + 'a {
    BackwardScan::new(instructions, call.index, call.argument_count)
        .filter(|step| step.is_this_load())
        .map(|step| step.index)
}

/// Index of the instruction loading `this` as the value being stored, if any
///
/// Only the single instruction before the store is inspected.
pub fn analyze_field_store(instructions: &[Instruction], store: &FieldStoreSite) -> Option<usize> {
    let previous = store.index.checked_sub(1)?;
    let kind = classify(instructions.get(previous)?);
    if kind.pushes_onto_stack() && kind.is_this_load() {
        Some(previous)
    } else {
        None
    }
}

/// Find everywhere a constructor lets `this` escape
///
/// One pass over the constructor collects every call and field store, then each of those is
/// checked independently. Findings for calls come first, then findings for field stores, each in
/// instruction order.
pub struct EscapeDetector<'a> {
    class: &'a BinaryName,
    include_invokedynamic: bool,
}

impl<'a> EscapeDetector<'a> {
    /// Detector for constructors of the given class
    pub fn new(class: &'a BinaryName) -> EscapeDetector<'a> {
        EscapeDetector {
            class,
            include_invokedynamic: true,
        }
    }

    /// Should `invokedynamic` call sites (eg. lambdas capturing `this`) be checked?
    pub fn include_invokedynamic(mut self, include: bool) -> EscapeDetector<'a> {
        self.include_invokedynamic = include;
        self
    }

    /// Check one constructor body, sending findings to the reporter
    ///
    /// Returns how many findings were reported.
    pub fn detect_into<R: Reporter + ?Sized>(
        &self,
        instructions: &[Instruction],
        reporter: &mut R,
    ) -> usize {
        let sites = collect_sites(instructions, self.include_invokedynamic);
        log::trace!(
            "{:?}: {} call sites, {} field stores",
            self.class,
            sites.calls.len(),
            sites.field_stores.len()
        );

        let mut reported = 0;

        for call in &sites.calls {
            let target = Site::describe_target(&instructions[call.index]);
            for load in analyze_call_site(instructions, call) {
                log::trace!(
                    "{:?}: `this` loaded at {} is an argument of call at {}",
                    self.class,
                    load,
                    call.index
                );
                let site = Site::CallArgument {
                    call: call.index,
                    load,
                    target: target.clone(),
                };
                reporter.report(Finding::escaped_this(self.class, site));
                reported += 1;
            }
        }

        for store in &sites.field_stores {
            if analyze_field_store(instructions, store).is_some() {
                log::trace!(
                    "{:?}: `this` stored into a field at {}",
                    self.class,
                    store.index
                );
                let site = Site::FieldStore {
                    store: store.index,
                    field: Site::describe_target(&instructions[store.index]),
                };
                reporter.report(Finding::escaped_this(self.class, site));
                reported += 1;
            }
        }

        reported
    }

    /// Check one constructor body
    pub fn detect(&self, instructions: &[Instruction]) -> Vec<Finding> {
        let mut findings = vec![];
        self.detect_into(instructions, &mut findings);
        findings
    }
}

/// Check one constructor body of `class`
pub fn detect_escapes(
    class: &BinaryName,
    instructions: &[Instruction],
    include_invokedynamic: bool,
) -> Vec<Finding> {
    EscapeDetector::new(class)
        .include_invokedynamic(include_invokedynamic)
        .detect(instructions)
}
