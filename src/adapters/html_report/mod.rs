//! HTML report adapter implementing `ReportPort`.
//!
//! Produces a single self-contained HTML file: a parameter panel, the
//! formatted metrics table and three inline SVG figures (equity curve,
//! drawdown curve, per-period returns).

pub mod chart_svg;
pub mod tables;

use crate::domain::backtest::{BacktestParams, BacktestResult};
use crate::domain::error::PostesterError;
use crate::ports::report_port::ReportPort;
use std::fs;
use std::path::Path;

pub struct HtmlReportAdapter {
    title: String,
}

impl HtmlReportAdapter {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }

    pub fn render(&self, result: &BacktestResult, params: &BacktestParams) -> String {
        let params_panel = tables::render_params_panel(result, params);
        let metrics_table = tables::render_metrics_table(result);
        let equity = chart_svg::equity_chart(&result.curve);
        let drawdown = chart_svg::drawdown_chart(&result.curve);
        let returns = chart_svg::returns_chart(&result.returns);

        format!(
            r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>
body {{ font-family: sans-serif; max-width: 720px; margin: 2em auto; color: #222; }}
table {{ border-collapse: collapse; margin: 1em 0; }}
th, td {{ border: 1px solid #ccc; padding: 4px 10px; text-align: left; }}
th {{ background: #f4f4f4; }}
h2 {{ margin-top: 1.5em; }}
</style>
</head>
<body>
<h1>{title}</h1>
<h2>Parameters</h2>
{params_panel}
<h2>Metrics</h2>
{metrics_table}
<h2>Equity Curve</h2>
{equity}
<h2>Drawdown</h2>
{drawdown}
<h2>Period Returns</h2>
{returns}
</body>
</html>
"#,
            title = self.title,
            params_panel = params_panel,
            metrics_table = metrics_table,
            equity = equity,
            drawdown = drawdown,
            returns = returns,
        )
    }
}

impl ReportPort for HtmlReportAdapter {
    fn write(
        &self,
        result: &BacktestResult,
        params: &BacktestParams,
        output_path: &Path,
    ) -> Result<(), PostesterError> {
        if let Some(parent) = output_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(output_path, self.render(result, params))?;
        Ok(())
    }
}
