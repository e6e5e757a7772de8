//! Data structures for build results

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::Severity;

/// Summary of one graph build
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// Kustomization nodes in the graph
    pub kustomizations: usize,
    /// Plain file nodes in the graph
    pub files: usize,
    /// Reference entries dropped with error severity
    pub reference_errors: usize,
    /// Reference entries dropped with warning severity
    pub reference_warnings: usize,
    /// Files that were referenced or discovered but could not be parsed
    pub invalid_files: usize,
}

impl BuildStats {
    /// True if any error-level diagnostic was produced
    pub fn has_errors(&self) -> bool {
        self.reference_errors > 0 || self.invalid_files > 0
    }
}

/// Diagnostic counters shared by the build threads
#[derive(Debug, Default)]
pub(crate) struct BuildCounters {
    reference_errors: AtomicUsize,
    reference_warnings: AtomicUsize,
    invalid_files: AtomicUsize,
}

impl BuildCounters {
    pub(crate) fn record_reference(&self, severity: Severity) {
        let counter = match severity {
            Severity::Error => &self.reference_errors,
            Severity::Warning => &self.reference_warnings,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_invalid_file(&self) {
        self.invalid_files.fetch_add(1, Ordering::Relaxed);
    }

    /// Snapshot the counters into stats for a graph of the given size
    pub(crate) fn snapshot(&self, kustomizations: usize, files: usize) -> BuildStats {
        BuildStats {
            kustomizations,
            files,
            reference_errors: self.reference_errors.load(Ordering::Relaxed),
            reference_warnings: self.reference_warnings.load(Ordering::Relaxed),
            invalid_files: self.invalid_files.load(Ordering::Relaxed),
        }
    }
}
