//! REST doc generator - command-line tool for Spring REST API reference pages.
//!
//! This binary reads the Java sources of a Spring MVC project (or a JSON
//! declaration model exported by another tool), finds the controller
//! endpoints and renders them into a single HTML page.
//!
//! # Usage
//!
//! ```bash
//! restdoc [OPTIONS] <INPUT>
//! ```
//!
//! # Examples
//!
//! Document a Maven project, describing request bodies from `com.acme`:
//! ```bash
//! restdoc ./src/main/java --types com.acme -o target/api.html
//! ```
//!
//! Use a custom template and heading:
//! ```bash
//! restdoc ./src/main/java --template docs/api.vm --heading "Item API"
//! ```
//!
//! Enable verbose logging:
//! ```bash
//! restdoc ./src/main/java -v
//! ```

use anyhow::Result;
use clap::Parser;
use log::info;
use restdoc_from_source::cli;

fn main() -> Result<()> {
    let args = cli::CliArgs::parse();

    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .parse_default_env()
        .init();

    info!("REST doc generator starting...");

    let args = cli::parse_args_from_parsed(args)?;
    cli::run(args)?;

    info!("REST API documentation completed successfully");

    Ok(())
}
