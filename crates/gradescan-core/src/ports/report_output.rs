//! Report output port for writing scan reports.

use crate::domain::ScanReport;

/// Port for outputting scan reports.
pub trait ReportOutput: Send + Sync {
    /// Writes a single scan report.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write(&self, report: &ScanReport) -> anyhow::Result<()>;

    /// Flushes any buffered output.
    ///
    /// # Errors
    ///
    /// Returns an error if flushing fails.
    fn flush(&self) -> anyhow::Result<()>;
}
