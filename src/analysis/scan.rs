use super::{classify, InstructionKind};
use crate::jvm::code::Instruction;

/// Backward walk over the instructions that produced the values a consumer pops
///
/// Starting just before some consuming instruction, this visits one preceding instruction per
/// value the consumer needs. This is a stand-in for real stack simulation: it assumes every
/// instruction pushes exactly one value, except that a `dup` or `new` is treated as part of
/// building some other value (think `new Foo; dup; invokespecial Foo.<init>`) and so extends the
/// walk by one more instruction. Operand widths are ignored, so `long` and `double` values are
/// not accounted for properly.
///
/// The walk stops early, without complaint, once it reaches the start of the instructions.
pub struct BackwardScan<'a> {
    instructions: &'a [Instruction],

    /// Index just past the next instruction to visit (so `0` means nothing is left)
    cursor: usize,

    /// Values still to account for
    remaining: usize,
}

/// One instruction visited during a [`BackwardScan`]
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct ScanStep {
    pub index: usize,
    pub kind: InstructionKind,
}

impl ScanStep {
    pub fn is_this_load(&self) -> bool {
        self.kind.is_this_load()
    }
}

impl<'a> BackwardScan<'a> {
    /// Scan backwards from the instruction at `consumer`, looking for `values` values
    pub fn new(instructions: &'a [Instruction], consumer: usize, values: usize) -> BackwardScan<'a> {
        BackwardScan {
            instructions,
            cursor: consumer.min(instructions.len()),
            remaining: values,
        }
    }
}

impl<'a> Iterator for BackwardScan<'a> {
    type Item = ScanStep;

    fn next(&mut self) -> Option<ScanStep> {
        if self.remaining == 0 || self.cursor == 0 {
            return None;
        }

        self.cursor -= 1;
        let index = self.cursor;
        let kind = classify(&self.instructions[index]);

        // A shuffle does not stand for a value of its own
        if !kind.is_stack_shuffle() {
            self.remaining -= 1;
        }

        Some(ScanStep { index, kind })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::jvm::code::{InvokeType, MethodRef};
    use crate::jvm::{BinaryName, Name};
    use Instruction::*;

    fn visited(instructions: &[Instruction], consumer: usize, values: usize) -> Vec<usize> {
        BackwardScan::new(instructions, consumer, values)
            .map(|step| step.index)
            .collect()
    }

    fn foo() -> BinaryName {
        BinaryName::from_string(String::from("me/alec/Foo")).unwrap()
    }

    fn foo_init() -> MethodRef {
        MethodRef {
            owner: foo(),
            ..MethodRef::object_init()
        }
    }

    #[test]
    fn no_values_means_no_steps() {
        let code = vec![ALoad(0), ALoad(0), Return];
        assert_eq!(visited(&code, 2, 0), Vec::<usize>::new());
    }

    #[test]
    fn one_step_per_value() {
        let code = vec![ALoad(0), ILoad(1), ILoad(2), Return];
        assert_eq!(visited(&code, 3, 1), vec![2]);
        assert_eq!(visited(&code, 3, 2), vec![2, 1]);
        assert_eq!(visited(&code, 3, 3), vec![2, 1, 0]);
    }

    #[test]
    fn stops_at_the_start() {
        let code = vec![ALoad(0), Return];
        assert_eq!(visited(&code, 1, 5), vec![0]);
        assert_eq!(visited(&code, 0, 5), Vec::<usize>::new());
        assert_eq!(visited(&[], 0, 1), Vec::<usize>::new());

        // Consumers past the end are clamped
        assert_eq!(visited(&code, 10, 1), vec![1]);
    }

    #[test]
    fn shuffles_extend_the_walk() {
        let code = vec![
            ALoad(0),
            New(foo()),
            Dup,
            Invoke(InvokeType::Special, foo_init()),
            Return,
        ];

        // `invokespecial`, then `dup` and `new` each ask for one more step
        assert_eq!(visited(&code, 4, 2), vec![3, 2, 1, 0]);

        let steps: Vec<ScanStep> = BackwardScan::new(&code, 4, 2).collect();
        assert!(steps[3].is_this_load());
        assert!(steps[..3].iter().all(|step| !step.is_this_load()));
    }

    #[test]
    fn chained_shuffles_each_extend_the_walk() {
        let code = vec![
            ALoad(0),
            New(foo()),
            Dup,
            Invoke(InvokeType::Special, foo_init()),
            New(foo()),
            Dup,
            Invoke(InvokeType::Special, foo_init()),
            Return,
        ];

        // Both `new; dup` pairs inflate the walk, so three values reach all the way back
        assert_eq!(visited(&code, 7, 3), vec![6, 5, 4, 3, 2, 1, 0]);

        // Two values stop at the first `invokespecial`
        assert_eq!(visited(&code, 7, 2), vec![6, 5, 4, 3]);
    }

    #[test]
    fn shuffle_as_last_step_still_ends_at_the_start() {
        let code = vec![Dup, Return];
        assert_eq!(visited(&code, 1, 1), vec![0]);
    }
}
