//! Core domain: descriptor, architecture model, project discovery

pub mod config;
pub mod model;
pub mod project;

pub use config::{Descriptor, TemplatePreferences};
pub use model::{ArchitectureType, Framework, Paradigm, TemplateMode};
pub use project::Project;
