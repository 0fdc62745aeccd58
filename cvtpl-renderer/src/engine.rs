//! Processing engine: [`TemplateProcessor`] runs the directive passes,
//! [`CvRenderer`] turns the result into a standalone, oriented document.
//!
//! ```text
//! template + record
//!   └─ TemplateProcessor::process      directive passes
//!        └─ document shell (tera)      only when the output has no <html>
//!             └─ apply_orientation     root class + @page style
//! ```

use serde::Serialize;
use serde_json::Value;
use tera::{Context, Tera};

use cvtpl_core::config::DEFAULT_DATE_FORMAT;
use cvtpl_core::value::{resolve, stringify};
use cvtpl_core::{Config, CvTemplate, Orientation};

use crate::directives::Directives;
use crate::error::RenderError;
use crate::orientation::apply_orientation;

// ---------------------------------------------------------------------------
// Embedded document shell, baked into the binary at compile time
// ---------------------------------------------------------------------------

const SHELL_NAME: &str = "document.html";
const SHELL: &str = include_str!("templates/document.html.tera");

/// Title used when neither the options nor the record provide one.
pub const DEFAULT_TITLE: &str = "Curriculum Vitae";

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "a mapping",
    }
}

// ---------------------------------------------------------------------------
// TemplateProcessor
// ---------------------------------------------------------------------------

/// Applies the directive passes to a template against one data record.
///
/// Immutable after construction; share one instance by reference.
#[derive(Debug, Clone)]
pub struct TemplateProcessor {
    directives: Directives,
    date_format: String,
}

impl TemplateProcessor {
    /// Processor with the default date pattern (`MMM yyyy`).
    pub fn new() -> Result<Self, RenderError> {
        Self::with_date_format(DEFAULT_DATE_FORMAT)
    }

    /// Processor whose date filters fall back to `date_format`.
    pub fn with_date_format(date_format: impl Into<String>) -> Result<Self, RenderError> {
        Ok(TemplateProcessor {
            directives: Directives::new()?,
            date_format: date_format.into(),
        })
    }

    pub fn date_format(&self) -> &str {
        &self.date_format
    }

    /// Run conditionals, equality helpers, loops and variables over `template`.
    ///
    /// Fails only when `data` is not a mapping.
    pub fn process(&self, template: &str, data: &Value) -> Result<String, RenderError> {
        if !data.is_object() {
            return Err(RenderError::InvalidRecord { found: kind_name(data) });
        }
        let output = self.directives.apply(template, data, &self.date_format);
        tracing::debug!(
            template_bytes = template.len(),
            output_bytes = output.len(),
            "processed template"
        );
        Ok(output)
    }

    /// [`process`](Self::process) over any serializable record.
    pub fn process_serialize<T: Serialize>(
        &self,
        template: &str,
        data: &T,
    ) -> Result<String, RenderError> {
        let record = serde_json::to_value(data)?;
        self.process(template, &record)
    }
}

// ---------------------------------------------------------------------------
// DocumentOptions
// ---------------------------------------------------------------------------

/// How [`CvRenderer::render_document`] finishes a processed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentOptions {
    pub orientation: Orientation,
    /// `<title>`; derived from `firstName`/`lastName` when `None`.
    pub title: Option<String>,
    pub lang: String,
}

impl Default for DocumentOptions {
    fn default() -> Self {
        DocumentOptions {
            orientation: Orientation::default(),
            title: None,
            lang: "en".to_string(),
        }
    }
}

impl DocumentOptions {
    pub fn with_orientation(orientation: Orientation) -> Self {
        DocumentOptions { orientation, ..Self::default() }
    }
}

/// `"<firstName> <lastName>"`, whichever parts are present, or [`DEFAULT_TITLE`].
pub fn default_title(data: &Value) -> String {
    let name = ["firstName", "lastName"]
        .iter()
        .map(|key| stringify(resolve(data, key)))
        .filter(|part| !part.trim().is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if name.is_empty() {
        DEFAULT_TITLE.to_string()
    } else {
        name
    }
}

// ---------------------------------------------------------------------------
// CvRenderer
// ---------------------------------------------------------------------------

/// Full rendering pipeline: directive passes, document shell, orientation.
///
/// Create once with [`CvRenderer::new`] or [`CvRenderer::with_config`] and reuse.
#[derive(Debug)]
pub struct CvRenderer {
    processor: TemplateProcessor,
    tera: Tera,
    default_orientation: Orientation,
}

impl CvRenderer {
    pub fn new() -> Result<Self, RenderError> {
        Self::with_config(&Config::default())
    }

    /// Renderer using the config's date pattern and default orientation.
    pub fn with_config(config: &Config) -> Result<Self, RenderError> {
        let mut tera = Tera::default();
        tera.add_raw_template(SHELL_NAME, SHELL)?;
        Ok(CvRenderer {
            processor: TemplateProcessor::with_date_format(config.date_format.clone())?,
            tera,
            default_orientation: config.default_orientation,
        })
    }

    pub fn processor(&self) -> &TemplateProcessor {
        &self.processor
    }

    /// Orientation applied when a caller has no preference of its own.
    pub fn default_orientation(&self) -> Orientation {
        self.default_orientation
    }

    /// Directive passes only; see [`TemplateProcessor::process`].
    pub fn process(&self, template: &str, data: &Value) -> Result<String, RenderError> {
        self.processor.process(template, data)
    }

    /// Process `template`, wrap it into a standalone document unless it already
    /// is one, then apply the orientation styling.
    pub fn render_document(
        &self,
        template: &str,
        data: &Value,
        options: &DocumentOptions,
    ) -> Result<String, RenderError> {
        let body = self.processor.process(template, data)?;

        let document = if body.to_ascii_lowercase().contains("<html") {
            body
        } else {
            let title = options.title.clone().unwrap_or_else(|| default_title(data));
            let mut ctx = Context::new();
            ctx.insert("title", &title);
            ctx.insert("lang", &options.lang);
            ctx.insert("body", &body);
            self.tera.render(SHELL_NAME, &ctx)?
        };

        tracing::debug!(orientation = %options.orientation, "rendered document");
        Ok(apply_orientation(&document, options.orientation))
    }

    /// Render a stored template in its own orientation.
    pub fn render_template(&self, template: &CvTemplate, data: &Value) -> Result<String, RenderError> {
        let options = DocumentOptions::with_orientation(template.orientation);
        self.render_document(&template.html, data, &options)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
