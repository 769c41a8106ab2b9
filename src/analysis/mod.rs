//! Detect `this` escaping from constructors
//!
//! ### Approach
//!
//! Rather than simulating the operand stack, the analysis takes a cheap heuristic route over
//! the flat instruction list of a constructor:
//!
//!   - every call site (other than the call to `java/lang/Object.<init>`) is checked by walking
//!     backwards from the call, one instruction per argument, looking for a load of local 0 (see
//!     [`BackwardScan`] for how `new`/`dup` are counted)
//!
//!   - every field store is checked by looking at the single instruction right before it
//!
//! Control flow is ignored, so a value produced on another branch is never traced, and `long`
//! or `double` arguments are counted as single values. The analysis is best-effort: it never
//! fails, and it neither proves nor guarantees the absence of an escape.

mod classify;
mod detector;
mod finding;
mod scan;
mod sites;

pub use classify::*;
pub use detector::*;
pub use finding::*;
pub use scan::*;
pub use sites::*;
