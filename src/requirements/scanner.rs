//! Module discovery and requirements-file parsing.
//!
//! A module is a directory directly under a module root that contains the
//! marker file. Its declared requirements come from the requirements file
//! next to the marker.

use crate::diagnostics::Diagnostics;
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Default module marker file name.
pub const DEFAULT_MARKER_FILE: &str = "__manifest__.py";

/// Default requirements file name.
pub const DEFAULT_REQUIREMENTS_FILE: &str = "requirements.txt";

/// File names the scanner looks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    pub marker_file: String,
    pub requirements_file: String,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            marker_file: DEFAULT_MARKER_FILE.to_string(),
            requirements_file: DEFAULT_REQUIREMENTS_FILE.to_string(),
        }
    }
}

/// Requirements declared by one module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleRequirementSet {
    /// Module id (the directory name).
    pub module: String,
    /// Module directory.
    pub path: PathBuf,
    /// The requirements file that was read.
    pub requirements_file: PathBuf,
    /// Raw requirement strings in declaration order.
    pub packages: Vec<String>,
}

/// Result of scanning a set of module roots.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanReport {
    /// Modules in scan order.
    pub modules: Vec<ModuleRequirementSet>,
    /// Name of the requirements file that was looked for.
    pub requirements_file: String,
    /// Diagnostics recorded during the scan.
    pub diagnostics: Diagnostics,
}

impl ScanReport {
    /// Look up a module by id.
    pub fn get(&self, module: &str) -> Option<&ModuleRequirementSet> {
        self.modules.iter().find(|m| m.module == module)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

/// Parse requirements-file text into raw requirement strings.
///
/// Blank lines and `#` comment lines are dropped; an inline comment starting
/// with whitespace followed by `#` is stripped.
pub fn parse_requirements(content: &str) -> Vec<String> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    content
        .lines()
        .map(strip_inline_comment)
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

fn strip_inline_comment(line: &str) -> &str {
    let bytes = line.as_bytes();
    for (idx, b) in bytes.iter().enumerate() {
        if *b == b'#' && idx > 0 && bytes[idx - 1].is_ascii_whitespace() {
            return &line[..idx];
        }
    }
    line
}

/// Walks module roots and collects declared requirements.
#[derive(Debug, Clone, Default)]
pub struct RequirementScanner {
    options: ScanOptions,
}

impl RequirementScanner {
    /// Create a scanner with the given file names.
    pub fn new(options: ScanOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// Scan the roots in order.
    ///
    /// Never fails: unusable roots and unreadable files are recorded in the
    /// report's diagnostics and the scan continues.
    pub fn scan(&self, roots: &[PathBuf]) -> ScanReport {
        let mut report = ScanReport {
            requirements_file: self.options.requirements_file.clone(),
            ..Default::default()
        };

        if roots.is_empty() {
            report.diagnostics.warning("No module roots configured.");
            return report;
        }

        let mut seen = HashSet::new();
        for root in roots {
            self.scan_root(root, &mut seen, &mut report);
        }

        tracing::debug!(modules = report.modules.len(), "scan complete");
        report
    }

    fn scan_root(&self, root: &Path, seen: &mut HashSet<String>, report: &mut ScanReport) {
        if !root.is_dir() {
            report.diagnostics.warning(format!(
                "Module root does not exist or is not a directory: {}",
                root.display()
            ));
            return;
        }

        let mut entries: Vec<PathBuf> = match fs::read_dir(root) {
            Ok(read_dir) => read_dir
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .collect(),
            Err(err) => {
                report.diagnostics.warning(format!(
                    "Cannot list module root {}, skipping: {}",
                    root.display(),
                    err
                ));
                return;
            }
        };
        entries.sort();

        for module_path in entries {
            if !module_path.is_dir() || !module_path.join(&self.options.marker_file).exists() {
                continue;
            }
            let Some(module) = module_path.file_name().map(|n| n.to_string_lossy().into_owned())
            else {
                continue;
            };

            let requirements_file = module_path.join(&self.options.requirements_file);
            if !requirements_file.is_file() {
                continue;
            }

            if !seen.insert(module.clone()) {
                report.diagnostics.warning(format!(
                    "Module '{}' at {} is shadowed by an earlier root; skipping.",
                    module,
                    module_path.display()
                ));
                continue;
            }

            let packages = match fs::read(&requirements_file)
                .map_err(|e| e.to_string())
                .and_then(|bytes| String::from_utf8(bytes).map_err(|e| e.to_string()))
            {
                Ok(content) => {
                    let packages = parse_requirements(&content);
                    if packages.is_empty() {
                        report.diagnostics.info(format!(
                            "Module '{}': {} lists no packages.",
                            module,
                            requirements_file.display()
                        ));
                        continue;
                    }
                    packages
                }
                Err(err) => {
                    report.diagnostics.error(format!(
                        "Module '{}': error reading requirements file {}: {}",
                        module,
                        requirements_file.display(),
                        err
                    ));
                    Vec::new()
                }
            };

            tracing::debug!(module = %module, count = packages.len(), "found requirements");
            report.modules.push(ModuleRequirementSet {
                module,
                path: module_path,
                requirements_file,
                packages,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Severity;
    use tempfile::TempDir;

    fn module(root: &Path, name: &str, requirements: Option<&[u8]>) {
        let dir = root.join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(DEFAULT_MARKER_FILE), "{}").unwrap();
        if let Some(content) = requirements {
            fs::write(dir.join(DEFAULT_REQUIREMENTS_FILE), content).unwrap();
        }
    }

    #[test]
    fn parse_requirements_drops_comments_and_blanks() {
        let content = "\u{feff}# header\n\nlibfoo>=1.2  # pinned for api\n  libbar \nurl#frag\n";
        assert_eq!(
            parse_requirements(content),
            vec!["libfoo>=1.2", "libbar", "url#frag"]
        );
    }

    #[test]
    fn finds_modules_with_requirements_in_sorted_order() {
        let temp = TempDir::new().unwrap();
        module(temp.path(), "zeta", Some(b"libz\n"));
        module(temp.path(), "alpha", Some(b"libfoo>=1.2,<2.0\nlibbar\n"));
        module(temp.path(), "no_reqs", None);
        fs::create_dir_all(temp.path().join("not_a_module")).unwrap();
        fs::write(temp.path().join("not_a_module/requirements.txt"), "x").unwrap();

        let report = RequirementScanner::default().scan(&[temp.path().to_path_buf()]);

        let ids: Vec<_> = report.modules.iter().map(|m| m.module.as_str()).collect();
        assert_eq!(ids, vec!["alpha", "zeta"]);
        assert_eq!(
            report.get("alpha").unwrap().packages,
            vec!["libfoo>=1.2,<2.0", "libbar"]
        );
        assert!(report.diagnostics.is_empty());
    }

    #[test]
    fn empty_requirements_file_is_absent() {
        let temp = TempDir::new().unwrap();
        module(temp.path(), "empty", Some(b"# nothing here\n\n"));

        let report = RequirementScanner::default().scan(&[temp.path().to_path_buf()]);

        assert!(report.is_empty());
        assert_eq!(
            report.diagnostics.with_severity(Severity::Info).count(),
            1
        );
    }

    #[test]
    fn bad_encoding_keeps_module_with_no_packages() {
        let temp = TempDir::new().unwrap();
        module(temp.path(), "broken", Some(&[0x66, 0x6f, 0xff, 0xfe, b'\n']));

        let report = RequirementScanner::default().scan(&[temp.path().to_path_buf()]);

        let broken = report.get("broken").unwrap();
        assert!(broken.packages.is_empty());
        assert!(report.diagnostics.has_errors());
        assert!(report.diagnostics.entries()[0].message.contains("broken"));
    }

    #[test]
    fn missing_root_is_warned_and_skipped() {
        let temp = TempDir::new().unwrap();
        module(temp.path(), "alpha", Some(b"libfoo\n"));

        let report = RequirementScanner::default().scan(&[
            temp.path().join("missing"),
            temp.path().to_path_buf(),
        ]);

        assert_eq!(report.len(), 1);
        assert_eq!(
            report.diagnostics.with_severity(Severity::Warning).count(),
            1
        );
    }

    #[cfg(unix)]
    #[test]
    fn unlistable_root_is_warned_and_skipped() {
        use std::os::unix::fs::PermissionsExt;

        let locked = TempDir::new().unwrap();
        let open = TempDir::new().unwrap();
        module(locked.path(), "hidden", Some(b"libhidden\n"));
        module(open.path(), "alpha", Some(b"libfoo\n"));
        fs::set_permissions(locked.path(), fs::Permissions::from_mode(0o000)).unwrap();

        // Root ignores directory permissions, so there is nothing to observe.
        if fs::read_dir(locked.path()).is_ok() {
            fs::set_permissions(locked.path(), fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let report = RequirementScanner::default()
            .scan(&[locked.path().to_path_buf(), open.path().to_path_buf()]);
        fs::set_permissions(locked.path(), fs::Permissions::from_mode(0o755)).unwrap();

        let ids: Vec<_> = report.modules.iter().map(|m| m.module.as_str()).collect();
        assert_eq!(ids, vec!["alpha"]);
        assert!(!report.diagnostics.has_errors());
        let warnings: Vec<_> = report.diagnostics.with_severity(Severity::Warning).collect();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("Cannot list module root"));
    }

    #[test]
    fn first_root_wins_for_duplicate_modules() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        module(first.path(), "shared", Some(b"libfirst\n"));
        module(second.path(), "shared", Some(b"libsecond\n"));

        let report = RequirementScanner::default()
            .scan(&[first.path().to_path_buf(), second.path().to_path_buf()]);

        assert_eq!(report.len(), 1);
        assert_eq!(report.modules[0].packages, vec!["libfirst"]);
        assert!(report.diagnostics.entries()[0].message.contains("shadowed"));
    }

    #[test]
    fn no_roots_warns() {
        let report = RequirementScanner::default().scan(&[]);
        assert!(report.is_empty());
        assert_eq!(report.diagnostics.len(), 1);
    }

    #[test]
    fn custom_file_names() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("pkg");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("module.toml"), "").unwrap();
        fs::write(dir.join("deps.txt"), "libfoo\n").unwrap();

        let scanner = RequirementScanner::new(ScanOptions {
            marker_file: "module.toml".to_string(),
            requirements_file: "deps.txt".to_string(),
        });
        let report = scanner.scan(&[temp.path().to_path_buf()]);

        assert_eq!(report.len(), 1);
        assert_eq!(report.requirements_file, "deps.txt");
    }
}
