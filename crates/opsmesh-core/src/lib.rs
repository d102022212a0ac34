//! Opsmesh Core - Multi-Agent Orchestration
//!
//! The orchestration layer over infrastructure operations:
//! - Classify: map a request to one operational domain
//! - Specialist: bounded tool loop binding one instruction set to tools
//! - Pipelines: per-domain execution, including the staged data pipeline
//! - Supervisor: classify once, dispatch once, return the pipeline state
//! - Selector: skill-weighted peer choice for the standalone orchestrator

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod classify;
pub mod config;
pub mod error;
pub mod pipelines;
pub mod selector;
pub mod specialist;
pub mod state;
pub mod supervisor;

#[cfg(test)]
pub(crate) mod test_support;

pub use classify::Domain;
pub use config::AppConfig;
pub use error::{Error, Result};
pub use selector::{Orchestrator, Selection};
pub use specialist::{Specialist, SpecialistBinding};
pub use state::PipelineState;
pub use supervisor::{Supervisor, SupervisorOutcome};
