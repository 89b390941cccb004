use anyhow::{bail, Result};
use log::{debug, warn};
use std::path::PathBuf;
use walkdir::WalkDir;

/// Build output and dependency directories that never hold project sources
const SKIPPED_DIRS: &[&str] = &["target", "build", "out", "node_modules"];

/// Source scanner for Java projects.
///
/// The `FileScanner` walks a project directory and collects every `.java`
/// file. Hidden directories (starting with `.`) and build output directories
/// such as `target`, `build` and `out` are skipped. A path to a single
/// `.java` file is accepted too and scans to just that file.
///
/// # Example
///
/// ```no_run
/// use restdoc_from_source::scanner::FileScanner;
/// use std::path::PathBuf;
///
/// let scanner = FileScanner::new(PathBuf::from("./my-service"));
/// let result = scanner.scan().unwrap();
/// println!("Found {} Java files", result.java_files.len());
/// ```
pub struct FileScanner {
    root_path: PathBuf,
}

/// Result of a scan.
pub struct ScanResult {
    /// Discovered `.java` files, sorted by path
    pub java_files: Vec<PathBuf>,
    /// Paths that could not be read; scanning continued past them
    pub warnings: Vec<String>,
}

impl FileScanner {
    pub fn new(root_path: PathBuf) -> Self {
        Self { root_path }
    }

    /// Collects all `.java` files below the root path.
    ///
    /// Files come back sorted so that runs over the same tree document
    /// endpoints in the same order.
    ///
    /// # Errors
    ///
    /// Returns an error if the root path does not exist.
    pub fn scan(&self) -> Result<ScanResult> {
        if !self.root_path.exists() {
            bail!("Source path does not exist: {}", self.root_path.display());
        }

        let mut java_files = Vec::new();
        let mut warnings = Vec::new();

        let walker = WalkDir::new(&self.root_path).into_iter().filter_entry(|e| {
            if e.depth() == 0 || !e.file_type().is_dir() {
                return true;
            }
            let file_name = e.file_name().to_string_lossy();
            !file_name.starts_with('.') && !SKIPPED_DIRS.contains(&&*file_name)
        });

        for entry in walker {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if entry.file_type().is_file()
                        && path.extension().and_then(|s| s.to_str()) == Some("java")
                    {
                        java_files.push(path.to_path_buf());
                    }
                }
                Err(e) => {
                    let warning = format!("Failed to access path: {}", e);
                    warn!("{}", warning);
                    warnings.push(warning);
                }
            }
        }

        java_files.sort();
        debug!(
            "Found {} Java files under {}",
            java_files.len(),
            self.root_path.display()
        );

        Ok(ScanResult {
            java_files,
            warnings,
        })
    }
}
