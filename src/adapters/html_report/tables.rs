//! HTML table formatting for reports: the run parameter panel and the
//! metrics table.

use crate::domain::backtest::{BacktestParams, BacktestResult};

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

pub fn render_params_panel(result: &BacktestResult, params: &BacktestParams) -> String {
    let date_range = match (result.start_time(), result.end_time()) {
        (Some(start), Some(end)) => format!("{start} to {end}"),
        _ => "-".to_string(),
    };

    let mut rows = String::new();
    rows.push_str(&format!(
        "<tr><th>Commission</th><td>{:.4}%</td></tr>\n",
        params.commission * 100.0
    ));
    rows.push_str(&format!(
        "<tr><th>Annual trading days</th><td>{}</td></tr>\n",
        params.annual_trading_days
    ));
    rows.push_str(&format!(
        "<tr><th>Indicators</th><td>{}</td></tr>\n",
        escape(&params.indicators.join(", "))
    ));
    rows.push_str(&format!("<tr><th>Date range</th><td>{date_range}</td></tr>\n"));
    rows.push_str(&format!(
        "<tr><th>Data points</th><td>{}</td></tr>\n",
        result.times.len()
    ));
    if let Some(index) = result.wipeout {
        rows.push_str(&format!(
            "<tr><th>Equity wipeout</th><td>period {index}</td></tr>\n"
        ));
    }

    format!("<table class=\"params\">\n{rows}</table>")
}

pub fn render_metrics_table(result: &BacktestResult) -> String {
    if result.metrics.is_empty() {
        return "<p>No indicators requested.</p>".to_string();
    }

    let mut rows = String::new();
    for entry in &result.metrics {
        rows.push_str(&format!(
            "<tr><td>{}</td><td>{}</td></tr>\n",
            escape(&entry.name),
            escape(&entry.formatted)
        ));
    }

    format!(
        "<table class=\"metrics\">\n<tr><th>Indicator</th><th>Value</th></tr>\n{rows}</table>"
    )
}
