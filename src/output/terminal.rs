//! Terminal rendering of reports and integrity results.

use super::report::AnalysisReport;
use crate::store::IntegrityIssue;
use colored::*;

const RULE: &str = "---------------------------------------------------";

/// Render a human-readable summary of an analysis report
pub fn render_report_summary(report: &AnalysisReport) -> String {
    let mut out = String::new();

    out.push_str(&render_header(report));
    out.push_str(&render_counts(report));
    out.push_str(&render_call_sites(report));
    out.push_str(&render_contexts(report));

    out
}

fn render_header(report: &AnalysisReport) -> String {
    let mut out = String::new();
    out.push('\n');
    out.push_str(&"Trace Analysis Summary".bold().to_string());
    out.push('\n');
    out.push_str(RULE);
    out.push('\n');
    out.push_str(&format!("Source:    {}\n", report.source_file));
    out.push_str(&format!("Generated: {}\n", report.generated_at));
    out.push_str(RULE);
    out.push_str("\n\n");
    out
}

fn render_counts(report: &AnalysisReport) -> String {
    let counts = &report.counts;
    format!(
        "Static contexts: {}\nStatic traces:   {}\nContexts:        {}\nTraces:          {}\n",
        counts.static_contexts, counts.static_traces, counts.contexts, counts.traces
    )
}

fn render_call_sites(report: &AnalysisReport) -> String {
    let mut out = format!("\nCall sites: {}\n", report.call_ids.len());

    for tree in report.call_trees.iter().take(10) {
        out.push_str(&format!(
            "  #{:<6} {} -> {}\n",
            tree.call_id,
            tree.callers.join(", ").cyan(),
            tree.result_display_name
        ));
    }
    if report.call_trees.len() > 10 {
        out.push_str(&format!("  ... {} more\n", report.call_trees.len() - 10));
    }
    out
}

fn render_contexts(report: &AnalysisReport) -> String {
    let mut out = String::new();
    if report.hot_contexts.is_empty() {
        return out;
    }

    out.push_str("\nHottest contexts:\n");
    for hot in report.hot_contexts.iter().take(5) {
        out.push_str(&format!(
            "  {:>6} traces ({:>5.1}%)  {}\n",
            hot.traces,
            hot.percentage,
            hot.stack.yellow()
        ));
    }
    out
}

/// Render integrity check results, one issue per line
pub fn render_integrity(source: &str, issues: &[IntegrityIssue]) -> String {
    let mut out = String::new();
    out.push_str(&format!("Validating trace: {}\n", source));

    if issues.is_empty() {
        out.push_str(&format!("{} No integrity issues found\n", "✓".green()));
        return out;
    }

    for issue in issues {
        out.push_str(&format!("  {} {}\n", "✗".red(), issue));
    }
    out.push_str(&format!(
        "{}\n",
        format!("{} integrity issue(s) found", issues.len()).red().bold()
    ));
    out
}
