//! Tera rendering over a resolved bundle

use miette::Diagnostic;
use tera::Tera;
use thiserror::Error;

use crate::templates::TemplateBundle;

/// Errors raised while rendering templates
#[derive(Debug, Error, Diagnostic)]
pub enum RenderError {
    #[error("template not found in bundle: {0}")]
    #[diagnostic(
        code(strata::render::not_found),
        help("run `strata templates validate` to check the resolved bundle")
    )]
    NotFound(String),

    #[error("template {name} does not parse: {message}")]
    #[diagnostic(code(strata::render::parse))]
    Parse { name: String, message: String },

    #[error("failed to render template {name}: {message}")]
    #[diagnostic(code(strata::render::render))]
    Render { name: String, message: String },
}

/// Renders templates out of one resolved bundle.
#[derive(Debug)]
pub struct Renderer {
    tera: Tera,
}

impl Renderer {
    pub fn from_bundle(bundle: &TemplateBundle) -> Result<Self, RenderError> {
        let mut tera = Tera::default();
        for (name, content) in &bundle.files {
            tera.add_raw_template(name, content)
                .map_err(|e| RenderError::Parse {
                    name: name.clone(),
                    message: e.to_string(),
                })?;
        }
        Ok(Self { tera })
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.tera.get_template_names().any(|n| n == name)
    }

    pub fn render(&self, name: &str, context: &tera::Context) -> Result<String, RenderError> {
        if !self.has_template(name) {
            return Err(RenderError::NotFound(name.to_string()));
        }

        self.tera
            .render(name, context)
            .map_err(|e| RenderError::Render {
                name: name.to_string(),
                message: e.to_string(),
            })
    }

    pub fn template_names(&self) -> impl Iterator<Item = &str> {
        self.tera.get_template_names()
    }
}
