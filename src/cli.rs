//! CLI front door.
//!
//! Provides the command implementations behind the `vylint` binary:
//! - `check` - report render methods without a matching companion
//! - `fix` - insert or rewrite companions until the files are clean
//!
//! ## Error Handling
//!
//! All functions return `Result<T, VylintError>`. Rule and file errors are
//! bridged into it so the binary can map them to stable exit codes.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use vylint_core::config::RuleConfig;
use vylint_core::diagnostic::FixMode;
use vylint_core::error::VylintError;
use vylint_core::output::{CheckResponse, DiagnosticInfo, FileReport, FixResponse, FixedFile};
use vylint_php::{check_source, fix_source, ElMethodsRule};

use crate::files::{collect_php_files, CollectedFiles};

/// Check files and report diagnostics.
pub fn run_check(
    workspace_root: &Path,
    paths: &[PathBuf],
    config: RuleConfig,
) -> Result<CheckResponse, VylintError> {
    let rule = ElMethodsRule::new(config);
    let CollectedFiles { files, skipped } = collect_php_files(workspace_root, paths)?;
    let analysed = files.len();

    let mut reports = Vec::with_capacity(files.len());
    for file in files {
        let check = check_source(&rule, &file.content, &FixMode::Off)?;
        debug!(path = %file.rel_path, diagnostics = check.diagnostics.len(), "checked");
        reports.push(FileReport {
            path: file.rel_path,
            diagnostics: check.diagnostics.iter().map(DiagnosticInfo::from).collect(),
        });
    }

    Ok(CheckResponse::new(reports, analysed).with_skipped(skipped))
}

/// Fix files, writing them back unless `dry_run` is set.
pub fn run_fix(
    workspace_root: &Path,
    paths: &[PathBuf],
    config: RuleConfig,
    fix: &FixMode,
    dry_run: bool,
) -> Result<FixResponse, VylintError> {
    let rule = ElMethodsRule::new(config);
    let CollectedFiles { files, skipped } = collect_php_files(workspace_root, paths)?;
    let analysed = files.len();

    let mut fixed = Vec::with_capacity(files.len());
    for file in files {
        let outcome = fix_source(&rule, &file.content, fix)?;
        if outcome.changed() && !dry_run {
            fs::write(&file.path, &outcome.content).map_err(|e| {
                VylintError::apply(e.to_string(), Some(file.rel_path.clone()))
            })?;
            info!(path = %file.rel_path, passes = outcome.passes, "fixed");
        }
        fixed.push(FixedFile {
            path: file.rel_path,
            passes: outcome.passes,
            edits: outcome.edits,
            remaining: outcome.remaining.iter().map(DiagnosticInfo::from).collect(),
        });
    }

    Ok(FixResponse::new(fixed, analysed, dry_run).with_skipped(skipped))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use vylint_core::diagnostic::DiagnosticCode;

    const COMPONENT: &str = "<?php\n\nuse StefanFisk\\Vy\\Attributes\\VyComponent;\n\nclass Foo\n{\n    #[VyComponent]\n    public function render(string $title)\n    {\n        return $title;\n    }\n}\n";

    fn workspace() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/Foo.php"), COMPONENT).unwrap();
        fs::write(dir.path().join("src/Clean.php"), "<?php\nclass Clean {}\n").unwrap();
        dir
    }

    #[test]
    fn check_reports_missing_companion() {
        let dir = workspace();
        let response = run_check(dir.path(), &[], RuleConfig::default()).unwrap();
        assert_eq!(response.status, "violations");
        assert_eq!(response.summary.files, 2);
        assert_eq!(response.files.len(), 1);
        let diagnostic = &response.files[0].diagnostics[0];
        assert_eq!(response.files[0].path, "src/Foo.php");
        assert_eq!(diagnostic.code, DiagnosticCode::RenderWithoutEl);
        assert_eq!((diagnostic.line, diagnostic.col), (8, 12));
        assert!(diagnostic.fixable);
    }

    #[test]
    fn fix_writes_unless_dry_run() {
        let dir = workspace();
        let path = dir.path().join("src/Foo.php");

        let preview = run_fix(dir.path(), &[], RuleConfig::default(), &FixMode::All, true).unwrap();
        assert!(preview.dry_run);
        assert_eq!(preview.files.len(), 1);
        assert_eq!(preview.files[0].passes, 1);
        assert_eq!(fs::read_to_string(&path).unwrap(), COMPONENT);

        let response = run_fix(dir.path(), &[], RuleConfig::default(), &FixMode::All, false).unwrap();
        assert_eq!(response.status, "ok");
        let fixed = fs::read_to_string(&path).unwrap();
        assert!(fixed.contains("    public static function el(string $title): \\StefanFisk\\Vy\\Element {"));

        let after = run_check(dir.path(), &[], RuleConfig::default()).unwrap();
        assert_eq!(after.status, "ok");
    }

    #[test]
    fn undecodable_file_does_not_stop_the_run() {
        let dir = workspace();
        fs::write(dir.path().join("src/Legacy.php"), b"<?php\n// Gr\xfc\xdfe\n").unwrap();

        let response = run_check(dir.path(), &[], RuleConfig::default()).unwrap();
        assert_eq!(response.status, "violations");
        assert_eq!(response.files[0].path, "src/Foo.php");
        assert_eq!(response.summary.files, 2);
        assert_eq!(response.skipped.len(), 1);
        assert_eq!(response.skipped[0].path, "src/Legacy.php");

        let fixed = run_fix(dir.path(), &[], RuleConfig::default(), &FixMode::All, true).unwrap();
        assert_eq!(fixed.skipped.len(), 1);
        assert_eq!(fixed.files[0].passes, 1);
    }

    #[test]
    fn fix_respects_only_codes() {
        let dir = workspace();
        let only = FixMode::Only(vec![DiagnosticCode::RenderElParamsMismatch]);
        let response = run_fix(dir.path(), &[], RuleConfig::default(), &only, false).unwrap();
        assert_eq!(response.status, "violations");
        assert_eq!(response.files[0].passes, 0);
        assert_eq!(response.files[0].remaining.len(), 1);
        assert_eq!(
            fs::read_to_string(dir.path().join("src/Foo.php")).unwrap(),
            COMPONENT
        );
    }
}
