//! Structural validation of resolved bundles
//!
//! A bundle is complete when every component template a generation task
//! can ask for is present and parses. Project-level templates are
//! recommended but their absence is only a warning.

use crate::templates::bundle::TemplateBundle;

/// Component templates every bundle must carry.
const REQUIRED_TEMPLATES: &[&str] = &[
    "components/entity.tera",
    "components/usecase.tera",
    "components/input_adapter.tera",
    "components/output_adapter.tera",
];

/// Project templates a bundle should carry for `strata init`.
const RECOMMENDED_TEMPLATES: &[&str] = &["project/readme.md.tera", "project/.gitignore.tera"];

/// Outcome of validating one bundle.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Check a resolved bundle for structural completeness. Never touches
/// the cache: a failed validation must not poison a good entry.
pub fn validate_bundle(bundle: &TemplateBundle) -> ValidationReport {
    let mut report = ValidationReport::default();

    if bundle.is_empty() {
        report.errors.push("bundle contains no templates".to_string());
        return report;
    }

    for name in REQUIRED_TEMPLATES {
        if bundle.get(name).is_none() {
            report
                .errors
                .push(format!("missing required template: {name}"));
        }
    }

    for name in RECOMMENDED_TEMPLATES {
        if bundle.get(name).is_none() {
            report
                .warnings
                .push(format!("missing recommended template: {name}"));
        }
    }

    // Every template must at least parse.
    for (name, content) in &bundle.files {
        let mut tera = tera::Tera::default();
        if let Err(e) = tera.add_raw_template(name, content) {
            report.errors.push(format!("template {name} does not parse: {e}"));
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::bundle::SourceCandidate;
    use std::collections::BTreeMap;

    fn bundle_with(names: &[&str]) -> TemplateBundle {
        let mut files = BTreeMap::new();
        for name in names {
            files.insert(name.to_string(), "content {{ name }}".to_string());
        }
        TemplateBundle {
            source: SourceCandidate::Remote {
                repository: "https://github.com/acme/tpl".to_string(),
                reference: "main".to_string(),
            },
            files,
        }
    }

    #[test]
    fn test_complete_bundle_is_valid() {
        let mut names = REQUIRED_TEMPLATES.to_vec();
        names.extend(RECOMMENDED_TEMPLATES);
        let report = validate_bundle(&bundle_with(&names));
        assert!(report.is_valid());
        assert!(!report.has_warnings());
    }

    #[test]
    fn test_missing_component_template_is_an_error() {
        let report = validate_bundle(&bundle_with(&[
            "components/entity.tera",
            "components/usecase.tera",
        ]));
        assert!(!report.is_valid());
        assert!(report
            .errors
            .iter()
            .any(|e| e.contains("components/input_adapter.tera")));
    }

    #[test]
    fn test_missing_project_template_is_a_warning() {
        let report = validate_bundle(&bundle_with(REQUIRED_TEMPLATES));
        assert!(report.is_valid());
        assert!(report.has_warnings());
    }

    #[test]
    fn test_empty_bundle_is_an_error() {
        let report = validate_bundle(&bundle_with(&[]));
        assert!(!report.is_valid());
    }

    #[test]
    fn test_unparseable_template_is_an_error() {
        let mut bundle = bundle_with(REQUIRED_TEMPLATES);
        bundle.files.insert(
            "components/entity.tera".to_string(),
            "{{ unclosed".to_string(),
        );
        let report = validate_bundle(&bundle);
        assert!(!report.is_valid());
        assert!(report.errors.iter().any(|e| e.contains("does not parse")));
    }
}
