//! Doclet entry point: options, error reporting and the `start` run.
//!
//! A host (the CLI, or any program that already holds a
//! [`DeclarationModel`]) configures a run with [`DocletOptions`] and calls
//! [`start`]. Fatal problems are reported through an [`ErrorReporter`] and
//! turn into a `false` result rather than a panic or an error value.

use crate::description::TypeFilter;
use crate::error::{Error, Result};
use crate::extractor::spring::SpringExtractor;
use crate::extractor::{EndpointExtractor, RestApiDetails};
use crate::model::DeclarationModel;
use crate::renderer::{Renderer, DEFAULT_TEMPLATE};
use log::{debug, error, info, warn};
use std::path::PathBuf;

pub const HEADING_OPTION: &str = "-heading";
pub const TYPES_OPTION: &str = "-types";
pub const OUTPUT_OPTION: &str = "-output";
pub const TEMPLATE_OPTION: &str = "-template";

pub const DEFAULT_HEADING: &str = "JavaDoc API";
pub const DEFAULT_OUTPUT: &str = "index.html";

/// Options of one documentation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocletOptions {
    /// Page heading
    pub heading: String,
    /// Comma separated qualified-name prefixes of the types to describe
    pub types: String,
    pub output: PathBuf,
    /// Template file path, or the name of the built-in template
    pub template: String,
}

impl Default for DocletOptions {
    fn default() -> Self {
        Self {
            heading: DEFAULT_HEADING.to_string(),
            types: String::new(),
            output: PathBuf::from(DEFAULT_OUTPUT),
            template: DEFAULT_TEMPLATE.to_string(),
        }
    }
}

/// Number of host arguments an option occupies, counting the option itself.
/// Unknown options occupy none.
pub fn option_length(option: &str) -> usize {
    match option {
        HEADING_OPTION | TYPES_OPTION | OUTPUT_OPTION | TEMPLATE_OPTION => 2,
        _ => 0,
    }
}

impl DocletOptions {
    /// Builds options from a host option array such as
    /// `[["-heading", "Item API"], ["-d", "docs"]]`.
    ///
    /// Options this doclet does not know are ignored. When an option is given
    /// more than once the last occurrence wins.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] when a known option comes without
    /// its value.
    pub fn from_host_options<S: AsRef<str>>(options: &[Vec<S>]) -> Result<Self> {
        let mut parsed = Self::default();

        for option in options {
            let parts: Vec<&str> = option.iter().map(|part| part.as_ref()).collect();
            let Some(&name) = parts.first() else {
                continue;
            };
            if option_length(name) == 0 {
                debug!("Ignoring host option {}", name);
                continue;
            }
            let value = parts
                .get(1)
                .map(|v| v.to_string())
                .ok_or_else(|| Error::InvalidArgument(format!("{} expects a value", name)))?;

            match name {
                HEADING_OPTION => parsed.heading = value,
                TYPES_OPTION => parsed.types = value,
                OUTPUT_OPTION => parsed.output = PathBuf::from(value),
                TEMPLATE_OPTION => parsed.template = value,
                _ => {}
            }
        }

        Ok(parsed)
    }
}

/// Error channel of the host.
pub trait ErrorReporter {
    fn print_error(&self, message: &str);

    fn print_warning(&self, message: &str) {
        warn!("{}", message);
    }
}

/// Reports through the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl ErrorReporter for LogReporter {
    fn print_error(&self, message: &str) {
        error!("{}", message);
    }
}

/// Runs the doclet: extracts the endpoints of `model` and writes the HTML
/// page.
///
/// Returns `false` after reporting `Failed to write HTML: <cause>` when the
/// template cannot be loaded or the page cannot be written.
pub fn start(model: &DeclarationModel, options: &DocletOptions, reporter: &dyn ErrorReporter) -> bool {
    info!(
        "Documenting {} classes into {}",
        model.len(),
        options.output.display()
    );

    let filter = TypeFilter::from_option(&options.types);
    if filter.prefixes().is_empty() {
        debug!("No type filter, describing every declared type");
    }

    let endpoints = SpringExtractor::new(filter).extract_endpoints(model);
    if endpoints.is_empty() {
        reporter.print_warning("No controller endpoints found");
    }

    match write_html(options, &endpoints) {
        Ok(()) => true,
        Err(e) => {
            reporter.print_error(&format!("Failed to write HTML: {}", e));
            false
        }
    }
}

fn write_html(options: &DocletOptions, endpoints: &[RestApiDetails]) -> Result<()> {
    let renderer = Renderer::load(&options.template)?;
    renderer.render_to_file(&options.heading, endpoints, &options.output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnnotationDecl, ClassDecl, ClassKind, MethodDecl, TypeRef};
    use std::cell::RefCell;
    use std::fs;
    use tempfile::TempDir;

    #[derive(Default)]
    struct RecordingReporter {
        errors: RefCell<Vec<String>>,
        warnings: RefCell<Vec<String>>,
    }

    impl ErrorReporter for RecordingReporter {
        fn print_error(&self, message: &str) {
            self.errors.borrow_mut().push(message.to_string());
        }

        fn print_warning(&self, message: &str) {
            self.warnings.borrow_mut().push(message.to_string());
        }
    }

    fn controller_model() -> DeclarationModel {
        let mut controller = ClassDecl::new("ItemController", "com.acme.ItemController", ClassKind::Class);
        controller.annotations = vec![
            AnnotationDecl::new("Controller"),
            AnnotationDecl::new("RequestMapping").with_attribute("value", "\"/api\""),
        ];
        controller.methods.push(MethodDecl {
            name: "list".to_string(),
            modifiers: vec!["public".to_string()],
            return_type: TypeRef::named("java.util.List"),
            parameters: vec![],
            annotations: vec![AnnotationDecl::new("GetMapping").with_attribute("value", "\"/items\"")],
            comment: "List items.".to_string(),
            param_tags: vec![],
        });
        DeclarationModel::new(vec![controller])
    }

    #[test]
    fn test_option_length() {
        assert_eq!(option_length("-heading"), 2);
        assert_eq!(option_length("-types"), 2);
        assert_eq!(option_length("-output"), 2);
        assert_eq!(option_length("-template"), 2);
        assert_eq!(option_length("-d"), 0);
        assert_eq!(option_length("heading"), 0);
    }

    #[test]
    fn test_default_options() {
        let options = DocletOptions::default();
        assert_eq!(options.heading, "JavaDoc API");
        assert_eq!(options.types, "");
        assert_eq!(options.output, PathBuf::from("index.html"));
        assert_eq!(options.template, "rest_api_template.vm");
    }

    #[test]
    fn test_host_options() {
        let options = DocletOptions::from_host_options(&[
            vec!["-heading", "First"],
            vec!["-d", "docs"],
            vec!["-types", "com.acme"],
            vec!["-heading", "Item API"],
            vec!["-output", "out/api.html"],
        ])
        .unwrap();

        assert_eq!(options.heading, "Item API");
        assert_eq!(options.types, "com.acme");
        assert_eq!(options.output, PathBuf::from("out/api.html"));
        assert_eq!(options.template, DEFAULT_TEMPLATE);
    }

    #[test]
    fn test_host_option_without_value() {
        let result = DocletOptions::from_host_options(&[vec!["-types"]]);
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_start_writes_page() {
        let temp_dir = TempDir::new().unwrap();
        let options = DocletOptions {
            heading: "Item API".to_string(),
            output: temp_dir.path().join("index.html"),
            ..DocletOptions::default()
        };
        let reporter = RecordingReporter::default();

        assert!(start(&controller_model(), &options, &reporter));
        assert!(reporter.errors.borrow().is_empty());

        let html = fs::read_to_string(&options.output).unwrap();
        assert!(html.contains("<h1>Item API</h1>"));
        assert!(html.contains("/api/items"));
        assert!(html.contains("List items."));
    }

    #[test]
    fn test_start_reports_missing_template() {
        let temp_dir = TempDir::new().unwrap();
        let options = DocletOptions {
            output: temp_dir.path().join("index.html"),
            template: "no_such_template.vm".to_string(),
            ..DocletOptions::default()
        };
        let reporter = RecordingReporter::default();

        assert!(!start(&controller_model(), &options, &reporter));
        assert_eq!(
            reporter.errors.borrow().as_slice(),
            ["Failed to write HTML: Template not found: no_such_template.vm".to_string()]
        );
        assert!(!options.output.exists());
    }

    #[test]
    fn test_start_reports_unwritable_output() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("file");
        fs::write(&blocker, "").unwrap();
        let options = DocletOptions {
            output: blocker.join("index.html"),
            ..DocletOptions::default()
        };
        let reporter = RecordingReporter::default();

        assert!(!start(&controller_model(), &options, &reporter));
        assert!(reporter.errors.borrow()[0].starts_with("Failed to write HTML: IO error"));
    }

    #[test]
    fn test_start_warns_without_endpoints() {
        let temp_dir = TempDir::new().unwrap();
        let options = DocletOptions {
            output: temp_dir.path().join("index.html"),
            ..DocletOptions::default()
        };
        let reporter = RecordingReporter::default();

        assert!(start(&DeclarationModel::default(), &options, &reporter));
        assert_eq!(reporter.warnings.borrow().len(), 1);
        assert!(options.output.exists());
    }
}
