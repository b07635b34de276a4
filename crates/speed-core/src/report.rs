//! Report emitter
//!
//! Console output is one aligned line per case:
//!
//! ```text
//! Chacha20            :       1285 megabytes  per second
//! x25519              :      21874 exchanges  per second
//! ```
//!
//! Lines are formatted independently of each other. A JSON document with the
//! same results plus run metadata can be written alongside.

use std::io::{self, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::calibrate::Calibration;
use crate::case::CaseResult;
use crate::error::Result;

/// Minimum width of the case-name column
pub const NAME_WIDTH: usize = 20;

/// Width of the value column
const VALUE_WIDTH: usize = 10;

/// Writes report lines to any sink
pub struct Reporter<W: Write> {
    out: W,
    name_width: usize,
}

impl Reporter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            name_width: NAME_WIDTH,
        }
    }

    /// Widen the name column so every name in `names` fits
    pub fn fit_names<'n>(mut self, names: impl IntoIterator<Item = &'n str>) -> Self {
        let longest = names.into_iter().map(str::len).max().unwrap_or(0);
        self.name_width = self.name_width.max(longest);
        self
    }

    /// Format one result line (without newline)
    pub fn line(&self, result: &CaseResult) -> String {
        format!(
            "{:<name$}: {:>value$} {}",
            result.name,
            result.rate.rounded(),
            result.rate.unit.label(),
            name = self.name_width,
            value = VALUE_WIDTH,
        )
    }

    pub fn header(&mut self, title: &str) -> io::Result<()> {
        writeln!(self.out, "{title}")?;
        writeln!(self.out, "{}", "-".repeat(title.len()))
    }

    pub fn emit(&mut self, result: &CaseResult) -> io::Result<()> {
        let line = self.line(result);
        writeln!(self.out, "{line}")
    }

    /// Diagnostic line for a case whose verification failed inside the loop
    pub fn diagnostic(&mut self, result: &CaseResult) -> io::Result<()> {
        writeln!(
            self.out,
            "{:<name$}! {} of {} verifications failed",
            result.name,
            result.sample.failures,
            result.sample.iterations,
            name = self.name_width,
        )
    }

    pub fn finish(&mut self) -> io::Result<()> {
        writeln!(self.out)?;
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Results of one backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendReport {
    pub backend: String,
    pub title: String,
    pub results: Vec<CaseResult>,
}

/// Full machine-readable report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeedReport {
    /// Report timestamp
    pub timestamp: String,

    /// Git commit hash (if available)
    pub git_commit: Option<String>,

    pub system_info: SystemInfo,

    /// Policy applied to every case
    pub calibration: Calibration,

    pub backends: Vec<BackendReport>,
}

impl SpeedReport {
    pub fn new(calibration: Calibration) -> Self {
        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            git_commit: std::env::var("GIT_COMMIT").ok(),
            system_info: SystemInfo::collect(),
            calibration,
            backends: Vec::new(),
        }
    }

    pub fn add_backend(&mut self, report: BackendReport) {
        self.backends.push(report);
    }

    /// Save report to file
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// System information for benchmarks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemInfo {
    pub os: String,
    pub arch: String,
    pub cpu_cores: usize,
}

impl SystemInfo {
    pub fn collect() -> Self {
        Self {
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
            cpu_cores: std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibrate::Sample;
    use crate::rate::{Rate, Unit};
    use std::time::Duration;

    fn result(name: &str, unit: Unit, per_second: f64) -> CaseResult {
        CaseResult {
            name: name.to_string(),
            sample: Sample {
                iterations: 100,
                elapsed: Duration::from_millis(100),
                failures: 0,
            },
            rate: Rate { unit, per_second },
        }
    }

    #[test]
    fn test_lines_share_alignment() {
        let reporter = Reporter::new(Vec::new());
        let a = reporter.line(&result("Chacha20", Unit::Megabytes, 1024.0 * 1024.0 * 1285.0));
        let b = reporter.line(&result("EdDSA(check)", Unit::Checks, 9876.4));

        assert_eq!(a, "Chacha20            :       1285 megabytes  per second");
        assert_eq!(b, "EdDSA(check)        :       9876 checks     per second");
        assert_eq!(a.find(':'), b.find(':'));
        assert_eq!(a.len(), b.len());
    }

    #[test]
    fn test_long_names_widen_column() {
        let reporter = Reporter::new(Vec::new()).fit_names(["a name well beyond twenty chars"]);
        let line = reporter.line(&result("short", Unit::Signatures, 1.0));
        assert_eq!(line.find(':'), Some(31));
    }

    #[test]
    fn test_emit_and_diagnostic() {
        let mut reporter = Reporter::new(Vec::new());
        let mut failing = result("EdDSA(check)", Unit::Checks, 10.0);
        failing.sample.failures = 3;

        reporter.header("ring").unwrap();
        reporter.emit(&failing).unwrap();
        reporter.diagnostic(&failing).unwrap();
        reporter.finish().unwrap();

        let text = String::from_utf8(reporter.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "ring");
        assert_eq!(lines[1], "----");
        assert!(lines[2].starts_with("EdDSA(check)"));
        assert_eq!(lines[3], "EdDSA(check)        ! 3 of 100 verifications failed");
        assert_eq!(lines[4], "");
    }

    #[test]
    fn test_json_report_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("speed.json");

        let mut report = SpeedReport::new(Calibration::default());
        report.add_backend(BackendReport {
            backend: "ring".to_string(),
            title: "ring".to_string(),
            results: vec![result("SHA-512", Unit::Megabytes, 5e8)],
        });
        report.save_json(&path).unwrap();

        let loaded: SpeedReport = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded.backends.len(), 1);
        assert_eq!(loaded.backends[0].results[0].name, "SHA-512");
        assert_eq!(loaded.calibration, Calibration::default());
    }
}
