//! YAML error reporting for the project descriptor

pub mod diagnostics;

pub use diagnostics::YamlSyntaxError;
