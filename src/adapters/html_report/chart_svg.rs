//! SVG chart rendering for reports.
//!
//! Self-contained `<svg>` fragments assembled by string formatting: an
//! equity polyline, a drawdown-depth polyline and a per-period return bar
//! chart. No axes labels beyond min/max, which is enough for a report
//! figure.

const WIDTH: f64 = 640.0;
const HEIGHT: f64 = 240.0;
const PADDING: f64 = 40.0;

fn polyline(values: &[f64], min: f64, max: f64, stroke: &str) -> String {
    let plot_width = WIDTH - 2.0 * PADDING;
    let plot_height = HEIGHT - 2.0 * PADDING;

    let range = max - min;
    let scale_y = if range > 0.0 { plot_height / range } else { 0.0 };
    let scale_x = if values.len() > 1 {
        plot_width / (values.len() - 1) as f64
    } else {
        0.0
    };

    let points: Vec<String> = values
        .iter()
        .enumerate()
        .map(|(i, &value)| {
            let x = PADDING + i as f64 * scale_x;
            let y = HEIGHT - PADDING - (value - min) * scale_y;
            format!("{:.1},{:.1}", x, y)
        })
        .collect();

    format!(
        r#"<polyline fill="none" stroke="{}" stroke-width="1.5" points="{}"/>"#,
        stroke,
        points.join(" ")
    )
}

fn frame(body: &str, min_label: f64, max_label: f64) -> String {
    format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w:.0} {h:.0}" width="{w:.0}" height="{h:.0}">
<rect width="{w:.0}" height="{h:.0}" fill="white"/>
<line x1="{p:.0}" y1="{p:.0}" x2="{p:.0}" y2="{b:.0}" stroke="#444"/>
<line x1="{p:.0}" y1="{b:.0}" x2="{r:.0}" y2="{b:.0}" stroke="#444"/>
<text x="4" y="{p:.0}" font-size="10" fill="#444">{max:.4}</text>
<text x="4" y="{b:.0}" font-size="10" fill="#444">{min:.4}</text>
{body}
</svg>"##,
        w = WIDTH,
        h = HEIGHT,
        p = PADDING,
        b = HEIGHT - PADDING,
        r = WIDTH - PADDING,
        max = max_label,
        min = min_label,
        body = body,
    )
}

pub fn equity_chart(curve: &[f64]) -> String {
    if curve.is_empty() {
        return "<p>No equity data available.</p>".to_string();
    }
    let min = curve.iter().copied().fold(f64::INFINITY, f64::min);
    let max = curve.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    frame(&polyline(curve, min, max, "#1f77b4"), min, max)
}

/// Drawdown depth over time: `1 - curve[i] / running_max(curve[0..=i])`.
pub fn drawdown_chart(curve: &[f64]) -> String {
    if curve.is_empty() {
        return "<p>No drawdown data available.</p>".to_string();
    }

    let mut peak = f64::NEG_INFINITY;
    let drawdowns: Vec<f64> = curve
        .iter()
        .map(|&value| {
            if value > peak {
                peak = value;
            }
            if peak > 0.0 { 1.0 - value / peak } else { 1.0 }
        })
        .collect();

    let max = drawdowns.iter().copied().fold(0.0, f64::max);
    // Inverted axis reads better for drawdowns: 0 at the top.
    let inverted: Vec<f64> = drawdowns.iter().map(|d| -d).collect();
    frame(&polyline(&inverted, -max, 0.0, "#d62728"), max, 0.0)
}

pub fn returns_chart(returns: &[f64]) -> String {
    if returns.is_empty() {
        return "<p>No return data available.</p>".to_string();
    }

    let min = returns.iter().copied().fold(0.0, f64::min);
    let max = returns.iter().copied().fold(0.0, f64::max);
    let range = max - min;

    let plot_width = WIDTH - 2.0 * PADDING;
    let plot_height = HEIGHT - 2.0 * PADDING;
    let scale_y = if range > 0.0 { plot_height / range } else { 0.0 };
    let bar_width = (plot_width / returns.len() as f64).max(0.5);

    let zero_y = HEIGHT - PADDING - (0.0 - min) * scale_y;
    let mut bars = String::new();
    for (i, &value) in returns.iter().enumerate() {
        let x = PADDING + i as f64 * bar_width;
        let y = HEIGHT - PADDING - (value.max(0.0) - min) * scale_y;
        let height = (value * scale_y).abs();
        let fill = if value >= 0.0 { "#2ca02c" } else { "#d62728" };
        bars.push_str(&format!(
            r#"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="{}"/>"#,
            x,
            y.min(zero_y),
            (bar_width * 0.8).max(0.4),
            height,
            fill
        ));
        bars.push('\n');
    }

    frame(&bars, min, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_series_render_placeholders() {
        assert!(equity_chart(&[]).contains("No equity data"));
        assert!(drawdown_chart(&[]).contains("No drawdown data"));
        assert!(returns_chart(&[]).contains("No return data"));
    }

    #[test]
    fn equity_chart_contains_polyline() {
        let svg = equity_chart(&[1.0, 1.1, 1.05, 1.2]);
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("<polyline"));
        assert!(svg.contains("1.2000"));
    }

    #[test]
    fn frame_preserves_hex_color_axes() {
        let svg = equity_chart(&[1.0, 1.1]);
        assert_eq!(svg.matches(r##"stroke="#444""##).count(), 2);
        assert_eq!(svg.matches(r##"fill="#444""##).count(), 2);
    }

    #[test]
    fn drawdown_chart_labels_max_depth() {
        let svg = drawdown_chart(&[1.0, 1.2, 0.9, 1.1, 0.8, 1.0]);
        let expected = 1.0 - 0.8 / 1.2;
        assert!(svg.contains(&format!("{expected:.4}")));
    }

    #[test]
    fn returns_chart_draws_one_bar_per_period() {
        let svg = returns_chart(&[0.01, -0.02, 0.03]);
        assert_eq!(svg.matches("<rect").count(), 4); // background + 3 bars
    }

    #[test]
    fn flat_series_do_not_divide_by_zero() {
        let svg = equity_chart(&[1.0, 1.0, 1.0]);
        assert!(svg.contains("<polyline"));
        assert!(!svg.contains("NaN"));
    }
}
