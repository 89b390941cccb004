use crate::doclet::{self, DocletOptions, LogReporter, DEFAULT_HEADING, DEFAULT_OUTPUT};
use crate::model::{load_model, DeclarationModel};
use crate::parser::{JavaParser, ParsedFile};
use crate::renderer::DEFAULT_TEMPLATE;
use crate::scanner::FileScanner;
use crate::type_resolver::TypeResolver;
use anyhow::{bail, Result};
use clap::Parser;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

/// REST doc generator - HTML reference pages for Spring controllers, straight from Java sources
#[derive(Parser, Debug)]
#[command(name = "restdoc")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Java source directory, a single .java file, or a .json declaration model
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Heading of the generated page
    #[arg(long = "heading", default_value = DEFAULT_HEADING)]
    pub heading: String,

    /// Comma separated package prefixes of the types whose structure is described
    #[arg(short = 't', long = "types", value_name = "PREFIXES", default_value = "")]
    pub types: String,

    /// Output HTML file
    #[arg(short = 'o', long = "output", value_name = "FILE", default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Template file, or the name of the built-in template
    #[arg(long = "template", value_name = "TEMPLATE", default_value = DEFAULT_TEMPLATE)]
    pub template: String,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

impl CliArgs {
    /// Doclet options equivalent to these arguments
    pub fn doclet_options(&self) -> DocletOptions {
        DocletOptions {
            heading: self.heading.clone(),
            types: self.types.clone(),
            output: self.output.clone(),
            template: self.template.clone(),
        }
    }
}

/// Parse command line arguments
pub fn parse_args() -> Result<CliArgs> {
    let args = CliArgs::parse();
    parse_args_from_parsed(args)
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if !args.input.exists() {
        bail!("Input path does not exist: {}", args.input.display());
    }

    info!("Input: {}", args.input.display());
    info!("Output file: {}", args.output.display());
    if args.types.trim().is_empty() {
        info!("Types: all declared types");
    } else {
        info!("Types: {}", args.types);
    }

    Ok(args)
}

/// Build the declaration model from the input path.
///
/// A `.json` file is loaded as a serialized model. Anything else is scanned
/// for Java sources, which are parsed and resolved; files that fail to parse
/// are skipped with a warning.
pub fn load_declarations(input: &Path) -> Result<DeclarationModel> {
    if input.is_file() && input.extension().and_then(|s| s.to_str()) == Some("json") {
        info!("Loading declaration model from {}", input.display());
        return load_model(input);
    }

    // Step 1: Scan for Java sources
    info!("Scanning for Java sources...");
    let scan_result = FileScanner::new(input.to_path_buf()).scan()?;
    info!("Found {} Java files", scan_result.java_files.len());

    if scan_result.java_files.is_empty() {
        bail!("No Java files found in {}", input.display());
    }

    // Step 2: Parse every file, keeping the ones that parse
    info!("Parsing Java files...");
    let parsed_files: Vec<ParsedFile> = JavaParser::parse_files(&scan_result.java_files)
        .into_iter()
        .filter_map(|result| match result {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                warn!("Skipping file: {:#}", e);
                None
            }
        })
        .collect();
    info!("Successfully parsed {} files", parsed_files.len());

    if parsed_files.is_empty() {
        bail!("No files could be parsed successfully");
    }

    // Step 3: Qualify type names across the whole project
    let model = TypeResolver::from_parsed_files(parsed_files).resolve();
    info!("Resolved {} classes", model.len());

    Ok(model)
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    info!("Starting REST API documentation...");

    let model = load_declarations(&args.input)?;
    let options = args.doclet_options();

    if !doclet::start(&model, &options, &LogReporter) {
        bail!("Documentation failed, see the errors above");
    }

    info!("Generation complete!");
    info!("Summary:");
    info!("  - Classes: {}", model.len());
    info!("  - Output: {}", options.output.display());

    Ok(())
}
