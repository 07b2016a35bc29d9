//! Server-rendered pages
//!
//! Templates are embedded in the binary and compiled once at startup into a
//! shared [`Views`] registry.

use handlebars::{Handlebars, RenderError, TemplateError};
use serde::Serialize;
use thiserror::Error;

use crate::errors::ApiError;

#[cfg(test)]
#[path = "views_tests.rs"]
mod tests;

const PARTIALS: &[(&str, &str)] = &[
    ("header", include_str!("../views/header.hbs")),
    ("footer", include_str!("../views/footer.hbs")),
];

const PAGES: &[(&str, &str)] = &[
    ("base", include_str!("../views/base.hbs")),
    ("overview", include_str!("../views/overview.hbs")),
    ("tour", include_str!("../views/tour.hbs")),
];

#[derive(Error, Debug)]
pub enum ViewError {
    #[error("Failed to compile template '{name}': {source}")]
    Compile {
        name: String,
        #[source]
        source: Box<TemplateError>,
    },

    #[error("Failed to render template '{name}': {source}")]
    Render {
        name: String,
        #[source]
        source: Box<RenderError>,
    },
}

impl From<ViewError> for ApiError {
    fn from(err: ViewError) -> Self {
        ApiError::internal(err.to_string())
    }
}

/// Compiled page templates.
#[derive(Debug)]
pub struct Views {
    registry: Handlebars<'static>,
}

impl Views {
    /// Compile all embedded templates.
    ///
    /// # Errors
    ///
    /// Returns `ViewError::Compile` if a template has invalid syntax.
    pub fn new() -> Result<Self, ViewError> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(false);

        for (name, source) in PARTIALS {
            registry
                .register_partial(name, *source)
                .map_err(|e| compile_error(name, e))?;
        }
        for (name, source) in PAGES {
            registry
                .register_template_string(name, *source)
                .map_err(|e| compile_error(name, e))?;
        }

        Ok(Self { registry })
    }

    /// Names of the pages that can be rendered.
    pub fn pages(&self) -> impl Iterator<Item = &'static str> {
        PAGES.iter().map(|(name, _)| *name)
    }

    /// Render a page with the given context.
    pub fn render<C: Serialize>(&self, name: &str, context: &C) -> Result<String, ViewError> {
        self.registry
            .render(name, context)
            .map_err(|e| ViewError::Render {
                name: name.to_string(),
                source: Box::new(e),
            })
    }
}

fn compile_error(name: &str, err: TemplateError) -> ViewError {
    ViewError::Compile {
        name: name.to_string(),
        source: Box::new(err),
    }
}
