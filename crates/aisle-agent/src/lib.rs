//! Aisle Agent — the assistant's gateway into the panel.
//!
//! Exposes the declarative function table the model is prompted with
//! and the dispatcher that runs a call through the secure facades.

pub mod registry;

pub use registry::{AgentToolbox, FunctionSpec, function_specs};
