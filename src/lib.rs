//! REST doc generator - HTML reference pages for Spring REST controllers.
//!
//! This library reads Java declarations (classes, methods, parameters,
//! annotations and javadoc comments), finds the endpoints of Spring MVC
//! controllers and renders them through a template into an HTML page. Request
//! bodies are documented with a JSON sample of their structure, derived from
//! the bean accessors of the body type.
//!
//! # Architecture
//!
//! The library is organized into several modules that work together:
//!
//! 1. [`scanner`] - Recursively scans source directories for Java files
//! 2. [`parser`] - Parses Java files with tree-sitter into declarations
//! 3. [`type_resolver`] - Qualifies type names and builds the [`model::DeclarationModel`]
//! 4. [`model`] - The declaration model, also loadable from JSON
//! 5. [`description`] - Describes the structure of declared types
//! 6. [`sanitizer`] - Strips inline javadoc markup from comments
//! 7. [`extractor`] - Extracts endpoints from controller classes
//! 8. [`renderer`] - Renders endpoints into an HTML template
//! 9. [`doclet`] - Options, error reporting and the `start` entry point
//!
//! # Example Usage
//!
//! ```no_run
//! use restdoc_from_source::{
//!     doclet::{self, DocletOptions, LogReporter},
//!     parser::JavaParser,
//!     scanner::FileScanner,
//!     type_resolver::TypeResolver,
//! };
//! use std::path::PathBuf;
//!
//! // Scan the source tree
//! let scanner = FileScanner::new(PathBuf::from("./src/main/java"));
//! let scan_result = scanner.scan().unwrap();
//!
//! // Parse files and resolve type names
//! let parsed_files: Vec<_> = JavaParser::parse_files(&scan_result.java_files)
//!     .into_iter()
//!     .filter_map(Result::ok)
//!     .collect();
//! let model = TypeResolver::from_parsed_files(parsed_files).resolve();
//!
//! // Write the HTML page
//! let options = DocletOptions {
//!     types: "com.acme".to_string(),
//!     ..DocletOptions::default()
//! };
//! assert!(doclet::start(&model, &options, &LogReporter));
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module which provides a complete CLI application.

pub mod cli;
pub mod scanner;
pub mod parser;
pub mod type_resolver;
pub mod model;
pub mod description;
pub mod sanitizer;
pub mod extractor;
pub mod renderer;
pub mod doclet;
pub mod error;
