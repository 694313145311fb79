//! Status Formatting Helpers
//!
//! Renders a [`ReconcileReport`] into the textual status contract printed on
//! stdout after each run:
//!
//! ```text
//! [STATUS] Temp=45.0°C (from THERMAL_API: SYNO.Core.Hardware.Thermal) | Current mode: coolfan | Desired mode: coolfan | Changed: No
//! [SUCCESS] Fan mode unchanged (coolfan)
//! ```

use crate::data::{FanMode, ModeNames};
use crate::engine::ReconcileReport;

/// Label used when no mode is known
pub const UNKNOWN_MODE: &str = "unknown";

/// Format a temperature with one decimal place
pub fn format_temp(temp_celsius: f32) -> String {
    format!("{:.1}°C", temp_celsius)
}

/// Appliance name for `mode`, or [`UNKNOWN_MODE`]
pub fn mode_label(mode: Option<FanMode>, names: &ModeNames) -> &str {
    match mode {
        Some(mode) => names.name(mode),
        None => UNKNOWN_MODE,
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "Yes"
    } else {
        "No"
    }
}

/// The `[STATUS]` line
pub fn status_line(report: &ReconcileReport, names: &ModeNames) -> String {
    let temp = match report.measured_temp {
        Some(t) => format_temp(t),
        None => "n/a".to_string(),
    };
    let origin = match (report.source, report.source_detail.as_deref()) {
        (Some(source), Some(detail)) => format!("{}: {}", source, detail),
        (Some(source), None) => source.to_string(),
        (None, _) => "none".to_string(),
    };

    format!(
        "[STATUS] Temp={} (from {}) | Current mode: {} | Desired mode: {} | Changed: {}",
        temp,
        origin,
        mode_label(report.current_mode, names),
        report
            .desired_mode
            .map(|m| names.name(m))
            .unwrap_or("n/a"),
        yes_no(report.changed),
    )
}

/// The `[SUCCESS]` or `[ERROR]` line
pub fn outcome_line(report: &ReconcileReport, names: &ModeNames) -> String {
    if !report.is_success() {
        let detail = report
            .error_detail
            .clone()
            .or_else(|| report.error.map(|k| k.to_string()))
            .unwrap_or_default();
        return format!("[ERROR] {}", detail);
    }

    let desired = mode_label(report.desired_mode, names);
    if report.changed {
        format!("[SUCCESS] Fan mode changed to {}", desired)
    } else if report.applied {
        format!("[SUCCESS] Fan mode {} re-applied", desired)
    } else if report.deferred {
        format!(
            "[SUCCESS] Change to {} deferred, keeping {}",
            desired,
            mode_label(report.current_mode, names)
        )
    } else {
        format!("[SUCCESS] Fan mode unchanged ({})", desired)
    }
}

/// One `[WARNING]` line per failed source and per non-fatal warning
pub fn warning_lines(report: &ReconcileReport) -> Vec<String> {
    let mut lines = Vec::new();
    // Failures are already folded into the error line when nothing succeeded.
    if report.measured_temp.is_some() {
        lines.extend(
            report
                .source_failures
                .iter()
                .map(|f| format!("[WARNING] Source {} unavailable: {}", f.source, f.reason)),
        );
    }
    lines.extend(
        report
            .warnings
            .iter()
            .map(|w| format!("[WARNING] {}", w.message)),
    );
    lines
}

/// All output lines for a run, in print order
pub fn render_report(report: &ReconcileReport, names: &ModeNames) -> Vec<String> {
    let mut lines = warning_lines(report);
    lines.push(status_line(report, names));
    lines.push(outcome_line(report, names));
    lines
}
