//! Terminal rendering of outcomes and the run summary.

use console::Style;
use modelprobe_core::{ProbeOutcome, ProbeReport, ProbeStatus};

/// Multi-line status block for one outcome.
pub fn status_block(outcome: &ProbeOutcome) -> String {
    let (marker, style) = match &outcome.status {
        ProbeStatus::Success => ("✓", Style::new().green()),
        ProbeStatus::TransientUnavailable { .. } | ProbeStatus::RateLimited => {
            ("…", Style::new().yellow())
        }
        _ => ("✗", Style::new().red()),
    };
    let dim = Style::new().dim();

    let mut detail = format!("{}ms", outcome.latency_ms);
    if let Some(code) = outcome.http_status {
        detail.push_str(&format!(", HTTP {code}"));
    }
    if outcome.formats_tried > 1 {
        detail.push_str(&format!(
            ", format {}/{}",
            outcome.format_index.unwrap_or(0),
            outcome.formats_tried
        ));
    }
    if let Some(total) = outcome.token_usage.as_ref().and_then(|u| u.total()) {
        detail.push_str(&format!(", {total} tokens"));
    }

    let mut block = format!(
        "{} {}  {}  {}",
        style.apply_to(marker),
        Style::new().bold().apply_to(outcome.display_name()),
        style.apply_to(&outcome.status),
        dim.apply_to(format!("({detail})"))
    );
    if let Some(hint) = outcome.status.hint() {
        block.push_str(&format!("\n    {}", dim.apply_to(hint)));
    }
    if !outcome.excerpt.is_empty() {
        let excerpt = outcome.excerpt.replace('\n', " ");
        if outcome.status.is_success() {
            block.push_str(&format!("\n    \"{excerpt}\""));
        } else {
            block.push_str(&format!("\n    {}", dim.apply_to(excerpt)));
        }
    }
    block
}

/// Summary counts, cold-start waits and the cascade recommendation.
pub fn summary(report: &ProbeReport) -> String {
    let s = &report.summary;
    let mut lines = vec![
        String::new(),
        "  ====================================".to_string(),
        "               Summary".to_string(),
        "  ====================================".to_string(),
        format!("    Working:      {:>8}", s.working),
    ];
    if s.loading > 0 {
        lines.push(format!("    Loading:      {:>8}", s.loading));
    }
    if s.failed > 0 {
        lines.push(format!("    Failed:       {:>8}", s.failed));
    }
    lines.push("  ------------------------------------".to_string());
    lines.push(format!("    Total:        {:>8}", s.total));
    lines.push("  ====================================".to_string());

    for outcome in report.loading() {
        lines.push(format!(
            "    {} {} ({})",
            Style::new().yellow().apply_to("retry later:"),
            outcome.display_name(),
            outcome.status
        ));
    }

    lines.push(String::new());
    match &report.recommended {
        Some(name) => lines.push(format!(
            "  {} {}",
            Style::new().green().bold().apply_to("Recommended:"),
            name
        )),
        None => lines.push(format!(
            "  {}",
            Style::new()
                .red()
                .bold()
                .apply_to("No working model found in the cascade.")
        )),
    }
    lines.join("\n")
}
