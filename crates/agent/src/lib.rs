//! The tool-use conversation loop for datadesk.
//!
//! The agent follows a simple cycle:
//!
//! 1. **Append** the user's message to the transcript
//! 2. **Send** the transcript, tool specs and system prompt to the provider
//! 3. **If tool use**: execute every call in order, append all results as
//!    one user turn, loop back to step 2
//! 4. **If text**: append the answer and return it
//!
//! The loop stops when the model answers in text or the iteration budget
//! is spent.

pub mod budget;
pub mod executor;
pub mod loop_runner;

#[cfg(test)]
mod test_helpers;

pub use budget::IterationBudget;
pub use executor::ToolExecutor;
pub use loop_runner::{AgentLoop, BUDGET_EXCEEDED_MESSAGE, LoopState, Outcome};
