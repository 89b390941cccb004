//! HTML rendering of extracted endpoints.
//!
//! Endpoints are merged into a [Tera](https://keats.github.io/tera/) template
//! together with the page heading. The template sees two variables:
//!
//! - `headTitle`: the heading text
//! - `restCalls`: the endpoint list, each with `url`, `method`, `produces`,
//!   `consumes`, `pathVariables`, `requestParams`, `requestBody` and
//!   `description`
//!
//! Templates may use the `html` filter to escape text for HTML.

use crate::error::{Error, Result};
use crate::extractor::RestApiDetails;
use log::{debug, info};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use tera::{Context, Tera, Value};

/// Name of the template shipped with the crate
pub const DEFAULT_TEMPLATE: &str = "rest_api_template.vm";

const BUILTIN_TEMPLATE: &str = include_str!("../templates/rest_api_template.vm");

/// A loaded template ready to render endpoint lists.
pub struct Renderer {
    tera: Tera,
    template_name: String,
}

impl Renderer {
    /// Loads a template by name.
    ///
    /// A name that points at an existing file is loaded from disk. The
    /// default name resolves to the built-in template. Anything else is
    /// [`Error::TemplateNotFound`].
    pub fn load(template: &str) -> Result<Self> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        tera.register_filter("html", html_filter);

        let path = Path::new(template);
        if path.is_file() {
            debug!("Loading template from {}", path.display());
            tera.add_template_file(path, Some(template))?;
        } else if template == DEFAULT_TEMPLATE {
            debug!("Using built-in template {}", DEFAULT_TEMPLATE);
            tera.add_raw_template(DEFAULT_TEMPLATE, BUILTIN_TEMPLATE)?;
        } else {
            return Err(Error::TemplateNotFound(template.to_string()));
        }

        Ok(Self {
            tera,
            template_name: template.to_string(),
        })
    }

    /// Renders the page to a string
    pub fn render(&self, heading: &str, endpoints: &[RestApiDetails]) -> Result<String> {
        let context = template_context(heading, endpoints);
        Ok(self.tera.render(&self.template_name, &context)?)
    }

    /// Renders the page into `path`, creating parent directories as needed.
    ///
    /// The file is written through a buffered writer that is flushed before
    /// returning; it is closed when the writer goes out of scope, on success
    /// and on error alike.
    pub fn render_to_file(&self, heading: &str, endpoints: &[RestApiDetails], path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let context = template_context(heading, endpoints);
        let mut writer = BufWriter::new(File::create(path)?);
        self.tera.render_to(&self.template_name, &context, &mut writer)?;
        writer.flush()?;

        info!("Wrote {} endpoints to {}", endpoints.len(), path.display());
        Ok(())
    }
}

fn template_context(heading: &str, endpoints: &[RestApiDetails]) -> Context {
    let mut context = Context::new();
    context.insert("headTitle", heading);
    context.insert("restCalls", endpoints);
    context
}

/// Escapes `&`, `<`, `>` and `"`. Unlike Tera's `escape`, slashes are left
/// alone so URLs stay readable in the page source.
fn html_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    };

    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    Ok(Value::String(escaped))
}
