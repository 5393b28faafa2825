//! Property-based tests for selection guarantees

mod ancestry_bound;
pub mod exclusion_closure;
