//! Architecture model: the closed set of layouts, paradigms and frameworks
//! a project can be scaffolded with.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Structural organization of the generated codebase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ArchitectureType {
    /// Hexagonal architecture, all layers in one module.
    HexagonalSingle,
    /// Hexagonal architecture split into domain, application and
    /// infrastructure modules.
    HexagonalMulti,
    /// Onion architecture, single module.
    OnionSingle,
    /// Onion architecture, one module per ring.
    OnionMulti,
}

impl ArchitectureType {
    pub fn as_str(self) -> &'static str {
        match self {
            ArchitectureType::HexagonalSingle => "hexagonal-single",
            ArchitectureType::HexagonalMulti => "hexagonal-multi",
            ArchitectureType::OnionSingle => "onion-single",
            ArchitectureType::OnionMulti => "onion-multi",
        }
    }

    pub fn is_multi_module(self) -> bool {
        matches!(
            self,
            ArchitectureType::HexagonalMulti | ArchitectureType::OnionMulti
        )
    }
}

impl std::fmt::Display for ArchitectureType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Programming paradigm of the generated service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Paradigm {
    /// Non-blocking I/O throughout.
    Reactive,
    /// Traditional blocking I/O.
    Imperative,
}

impl Paradigm {
    pub fn as_str(self) -> &'static str {
        match self {
            Paradigm::Reactive => "reactive",
            Paradigm::Imperative => "imperative",
        }
    }
}

impl std::fmt::Display for Paradigm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Target framework for the generated service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Framework {
    Spring,
    Quarkus,
}

impl Framework {
    pub fn as_str(self) -> &'static str {
        match self {
            Framework::Spring => "spring",
            Framework::Quarkus => "quarkus",
        }
    }
}

impl std::fmt::Display for Framework {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where template assets are loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum, Default)]
#[serde(rename_all = "lowercase")]
pub enum TemplateMode {
    /// Fetch templates from the shared remote repository, with caching.
    #[default]
    Production,
    /// Prefer a local working copy or a custom repository/branch.
    Developer,
}

impl TemplateMode {
    pub fn as_str(self) -> &'static str {
        match self {
            TemplateMode::Production => "production",
            TemplateMode::Developer => "developer",
        }
    }
}

impl std::fmt::Display for TemplateMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
