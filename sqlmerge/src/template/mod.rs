//! Template rendering over handlebars.
//!
//! Output is never HTML-escaped: the rendered text is SQL, and quoting is
//! the template author's job (see the `sql_escape` helper).

mod helpers;

pub use helpers::DEFAULT_DATE_FORMAT;

use crate::errors::{MergeError, Result};
use handlebars::Handlebars;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

#[allow(clippy::expect_used)]
static PARTIAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{~?#?>").expect("partial pattern is valid"));

/// Renders script content as a handlebars template.
pub struct TemplateRenderer {
    handlebars: Handlebars<'static>,
    allow_partials: bool,
}

impl TemplateRenderer {
    /// Creates a renderer in strict mode with partials allowed.
    #[must_use]
    pub fn new() -> Self {
        let mut handlebars = Handlebars::new();
        handlebars.register_escape_fn(handlebars::no_escape);
        handlebars.set_strict_mode(true);
        handlebars.register_helper("sql_escape", Box::new(helpers::sql_escape_helper));
        handlebars.register_helper("strftime", Box::new(helpers::strftime_helper));

        Self {
            handlebars,
            allow_partials: true,
        }
    }

    /// Fail on references to missing variables.
    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.handlebars.set_strict_mode(strict);
        self
    }

    /// Whether `{{> partial}}` is accepted.
    #[must_use]
    pub fn with_partials(mut self, allow: bool) -> Self {
        self.allow_partials = allow;
        self
    }

    /// Returns true in strict mode.
    #[must_use]
    pub fn is_strict(&self) -> bool {
        self.handlebars.strict_mode()
    }

    /// Renders `template` against `variables`.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::Template`] on syntax errors, missing variables in
    /// strict mode, helper failures, or a partial when partials are disabled.
    pub fn render(&self, template: &str, variables: &HashMap<String, Value>) -> Result<String> {
        if !self.allow_partials && PARTIAL_RE.is_match(template) {
            return Err(MergeError::Template(
                "template partials ({{> name}}) are disabled while SQL*Plus includes are active; \
                 use @file or @@file instead"
                    .to_string(),
            ));
        }

        self.handlebars
            .render_template(template, variables)
            .map_err(|e| MergeError::Template(e.to_string()))
    }
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TemplateRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateRenderer")
            .field("strict", &self.is_strict())
            .field("allow_partials", &self.allow_partials)
            .finish()
    }
}
