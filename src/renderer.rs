//! Template rendering for abcweb.
//! Template files are rendered with MiniJinja against the run configuration.
use crate::error::{Error, Result};
use minijinja::{Environment, UndefinedBehavior};

/// Trait for template rendering engines.
pub trait TemplateRenderer {
    /// Renders a template string with the given context.
    ///
    /// # Arguments
    /// * `name` - Name of the template, used in error messages
    /// * `template` - Template string to render
    /// * `context` - Context variables for rendering
    ///
    /// # Returns
    /// * `Result<String>` - Rendered template string
    fn render(&self, name: &str, template: &str, context: &serde_json::Value) -> Result<String>;
}

/// MiniJinja-based template rendering engine.
pub struct MiniJinjaRenderer {
    /// MiniJinja environment instance
    env: Environment<'static>,
}

impl MiniJinjaRenderer {
    /// Creates a renderer that rejects undefined variables and keeps the
    /// trailing newline of every template.
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_keep_trailing_newline(true);
        Self { env }
    }
}

impl Default for MiniJinjaRenderer {
    fn default() -> Self {
        MiniJinjaRenderer::new()
    }
}

impl TemplateRenderer for MiniJinjaRenderer {
    /// Renders a template string using MiniJinja.
    ///
    /// # Errors
    /// * `Error::TemplateRenderError` if the template does not parse, or
    ///   references a variable missing from `context`
    fn render(&self, name: &str, template: &str, context: &serde_json::Value) -> Result<String> {
        let to_error = |source| Error::TemplateRenderError { path: name.to_string(), source };

        let mut env = self.env.clone();
        env.add_template_owned(name.to_string(), template.to_string()).map_err(to_error)?;
        let tmpl = env.get_template(name).map_err(to_error)?;

        tmpl.render(context).map_err(to_error)
    }
}
