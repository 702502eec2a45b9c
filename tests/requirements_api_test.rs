//! Integration tests for the requirements pipeline public API.

use medic::requirements::{
    analyze, InstallationOrchestrator, RequirementScanner, ResolutionOutcome, ResolverMode,
    ScanOptions, StaticRegistry, VersionResolver,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn module(root: &Path, name: &str, requirements: &str) {
    let dir = root.join(name);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("__manifest__.py"), "{'name': 'test'}").unwrap();
    fs::write(dir.join("requirements.txt"), requirements).unwrap();
}

fn installed() -> StaticRegistry {
    [("libfoo", "2.1.0"), ("Lib_Baz", "0.3")].into_iter().collect()
}

#[test]
fn scan_then_analyze_partitions_requirements() {
    let temp = TempDir::new().unwrap();
    module(
        temp.path(),
        "sale",
        "# pinned for the report engine\nlibfoo>=1.2,<2.0\nlibbar\n",
    );
    module(temp.path(), "stock", "lib-baz  # any version\n");

    let scan = RequirementScanner::new(ScanOptions::default()).scan(&[temp.path().to_path_buf()]);
    assert_eq!(scan.len(), 2);
    assert_eq!(scan.get("sale").unwrap().packages.len(), 2);

    let registry = installed();
    let resolver = VersionResolver::new(ResolverMode::ConstraintAware, &registry);
    let analysis = analyze(&scan, &resolver);

    let to_install: Vec<_> = analysis
        .to_install
        .iter()
        .map(|r| r.resolution.spec.as_str())
        .collect();
    assert_eq!(to_install, vec!["libfoo>=1.2,<2.0", "libbar"]);
    assert_eq!(analysis.satisfied.len(), 1);
    assert_eq!(analysis.satisfied[0].module, "stock");
    assert!(analysis.errors.is_empty());
    assert!(!analysis.is_healthy());

    assert!(matches!(
        analysis.to_install[0].resolution.outcome,
        ResolutionOutcome::VersionConflict { .. }
    ));
    assert_eq!(
        analysis.to_install[1].resolution.outcome,
        ResolutionOutcome::Missing
    );
}

#[test]
fn name_only_mode_accepts_any_installed_version() {
    let temp = TempDir::new().unwrap();
    module(temp.path(), "sale", "libfoo>=1.2,<2.0\n");

    let scan = RequirementScanner::default().scan(&[temp.path().to_path_buf()]);
    let registry = installed();
    let resolver = VersionResolver::new(ResolverMode::NameOnly, &registry);
    let analysis = analyze(&scan, &resolver);

    assert!(analysis.is_healthy());
    assert_eq!(
        analysis.summary_lines.last().map(String::as_str),
        Some("All discovered dependencies are satisfied.")
    );
}

#[test]
fn directories_without_marker_are_not_modules() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("scripts");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("requirements.txt"), "libbar\n").unwrap();

    let scan = RequirementScanner::default().scan(&[temp.path().to_path_buf()]);

    assert!(scan.is_empty());
}

#[test]
fn missing_root_is_a_warning_not_a_failure() {
    let temp = TempDir::new().unwrap();
    module(temp.path(), "sale", "libbar\n");

    let roots = vec![temp.path().join("nope"), temp.path().to_path_buf()];
    let scan = RequirementScanner::default().scan(&roots);

    assert_eq!(scan.len(), 1);
    assert!(scan
        .diagnostics
        .entries()
        .iter()
        .any(|d| d.message.contains("nope")));
}

#[test]
fn install_specs_are_deduplicated_across_modules() {
    let temp = TempDir::new().unwrap();
    module(temp.path(), "sale", "libbar\n");
    module(temp.path(), "stock", "libbar\n");

    let scan = RequirementScanner::default().scan(&[temp.path().to_path_buf()]);
    let registry = installed();
    let resolver = VersionResolver::new(ResolverMode::ConstraintAware, &registry);
    let analysis = analyze(&scan, &resolver);

    assert_eq!(analysis.to_install.len(), 2);
    assert_eq!(analysis.install_specs(), vec!["libbar".to_string()]);
}

#[cfg(unix)]
#[test]
fn command_installer_reports_exit_status() {
    use medic::requirements::CommandInstaller;

    let ok = CommandInstaller::new(["true"]);
    let report = InstallationOrchestrator::new(&ok).install_all(&["libbar".to_string()]);
    assert_eq!(report.successes, vec!["libbar".to_string()]);
    assert!(!report.has_failures());

    let failing = CommandInstaller::new(["false"]);
    let report = InstallationOrchestrator::new(&failing).install_all(&["libbar".to_string()]);
    assert!(report.has_failures());
    assert!(report
        .log_lines
        .iter()
        .any(|l| l.contains("Failed to process libbar. Exit code: 1")));
}

#[test]
fn empty_install_batch_is_a_no_op() {
    #[cfg(unix)]
    let installer = medic::requirements::CommandInstaller::new(["true"]);
    #[cfg(not(unix))]
    let installer = medic::requirements::CommandInstaller::new(["cmd", "/C", "exit 0"]);

    let report = InstallationOrchestrator::new(&installer).install_all(&[]);

    assert!(report.successes.is_empty());
    assert_eq!(
        report.log_lines,
        vec!["No packages specified for installation.".to_string()]
    );
}
