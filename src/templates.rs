use std::collections::HashMap;

use handlebars::{handlebars_helper, no_escape, Handlebars};
use serde::Serialize;

use crate::errors::{CliError, CliResult};

handlebars_helper!(to_json: |value: Json| serde_json::to_string(value).unwrap_or_default());

/// Renders user-facing output templates (`--format` and the built-in layouts)
#[derive(Debug, Clone)]
pub struct TemplateEngine {
    handlebars: Handlebars<'static>,
}

impl TemplateEngine {
    pub fn new() -> CliResult<Self> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(false);
        // Output goes to a terminal, not a browser.
        handlebars.register_escape_fn(no_escape);
        handlebars.register_helper("json", Box::new(to_json));

        for (name, template) in Self::create_default_templates() {
            handlebars
                .register_template_string(name, template)
                .map_err(|e| {
                    CliError::template_with_source(format!("invalid built-in template {name}"), e)
                })?;
        }

        Ok(Self { handlebars })
    }

    fn create_default_templates() -> HashMap<&'static str, &'static str> {
        let mut templates = HashMap::new();

        templates.insert(
            "version",
            r#"Client version: {{client.version}}
Client API version: {{client.api_version}}
OS/Arch (client): {{client.os}}/{{client.arch}}
{{#if server}}Server version: {{server.Version}}
Server API version: {{server.ApiVersion}}
OS/Arch (server): {{server.Os}}/{{server.Arch}}
{{/if}}"#,
        );

        templates
    }

    /// Render one of the built-in templates
    pub fn render<T: Serialize>(&self, name: &str, data: &T) -> CliResult<String> {
        self.handlebars
            .render(name, data)
            .map_err(|e| CliError::template_with_source(format!("failed to render {name}"), e))
    }

    /// Render a user-supplied template string
    pub fn render_inline<T: Serialize>(&self, template: &str, data: &T) -> CliResult<String> {
        self.handlebars
            .render_template(template, data)
            .map_err(|e| CliError::template_with_source("failed to render format template", e))
    }
}
