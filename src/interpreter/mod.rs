pub mod context;
mod indexing;
mod operator;
mod tree;

pub use tree::TreeWalkInterpreter;

/// Remaining stack below which evaluation moves onto a fresh segment.
const RED_ZONE: usize = 100 * 1024;

/// Size of each fresh stack segment.
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Runs `f`, growing the stack first when little of it is left.
#[inline]
pub(crate) fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// Output sink for the `print` native.
pub trait SystemContext {
    fn writeln(&mut self, text: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterpreterConfig {
    /// Iterations a `while` or `for` loop may run before evaluation aborts.
    pub max_loop_iterations: usize,
    /// Nested function calls allowed before evaluation aborts.
    pub max_call_depth: usize,
}

impl InterpreterConfig {
    pub const DEFAULT_MAX_LOOP_ITERATIONS: usize = 5000;
    pub const DEFAULT_MAX_CALL_DEPTH: usize = 10_000;
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            max_loop_iterations: Self::DEFAULT_MAX_LOOP_ITERATIONS,
            max_call_depth: Self::DEFAULT_MAX_CALL_DEPTH,
        }
    }
}
