//! Workflow core: configuration and wiring.
//!
//! The public API from this module is [`AlertWorkflow`] (built through
//! [`WorkflowBuilder`]) and its [`Config`].
//!
//! Internal modules:
//! - [`builder`]: assembles bus, subscribers, dispatch service and controller;
//! - [`workflow`]: owns the spawned tasks, forwards events to subscribers, shuts down.

mod builder;
mod config;
mod workflow;

pub use builder::WorkflowBuilder;
pub use config::Config;
pub use workflow::AlertWorkflow;
