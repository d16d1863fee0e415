//! Report emitter — renders one audit run as text or JSON.

use chrono::{DateTime, Utc};
use serde::Serialize;

use fleetcheck_audit::{ActivityTally, NextAction, Verdict, VerificationResult};

/// Everything one audit run produced, bundled for rendering.
#[derive(Debug, Serialize)]
pub struct AuditReport {
    pub asg_name: String,
    pub audited_at: DateTime<Utc>,
    pub verification: VerificationResult,
    pub next_action: Option<NextAction>,
    pub daily_activity: ActivityTally,
}

/// Render the human-readable text report.
pub fn format_report(report: &AuditReport) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "\nFleet audit — {} ({} UTC)\n\n",
        report.asg_name,
        report.audited_at.format("%Y-%m-%d %H:%M:%S")
    ));

    match &report.verification.verdict {
        Verdict::Pass => {
            out.push_str("Consistency: ✅ pass\n");
            match &report.verification.longest_running {
                Some(longest) => {
                    out.push_str(&format!(
                        "  Longest running: {} (uptime {})\n",
                        longest.instance_id,
                        format_hms(longest.uptime_secs)
                    ));
                }
                None => out.push_str("  Longest running: no instances\n"),
            }
        }
        Verdict::Fail { reason } => {
            out.push_str("Consistency: ❌ fail\n");
            out.push_str(&format!("  Reason: {reason}\n"));
        }
    }

    out.push('\n');
    match &report.next_action {
        Some(next) => {
            out.push_str(&format!(
                "Next scheduled action: {} at {} UTC\n",
                next.name,
                next.start_time.format("%Y-%m-%d %H:%M:%S")
            ));
            if next.offset_secs >= 0 {
                out.push_str(&format!("  Starts in {}\n", format_hms(next.offset_secs)));
            } else {
                out.push_str(&format!("  Started {} ago\n", format_hms(-next.offset_secs)));
            }
        }
        None => out.push_str("Next scheduled action: none\n"),
    }

    out.push('\n');
    out.push_str("Today's scaling activity:\n");
    out.push_str(&format!("  Launched:   {}\n", report.daily_activity.launched));
    out.push_str(&format!("  Terminated: {}\n", report.daily_activity.terminated));

    out
}

/// Format whole seconds as `hh:mm:ss` (hours grow past two digits
/// rather than wrapping).
fn format_hms(total_secs: i64) -> String {
    let sign = if total_secs < 0 { "-" } else { "" };
    let t = total_secs.abs();
    format!("{sign}{:02}:{:02}:{:02}", t / 3600, (t % 3600) / 60, t % 60)
}
