// GHGcast Dashboard - HTML rendering
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Server-side rendering of the dashboard page.

use crate::state::{ChartSeries, Snapshot};
use ghgcast::{AggregateRow, Record};
use std::fmt::Write;

const REFRESH_SECS: u32 = 2;

const CHART_WIDTH: f64 = 800.0;
const CHART_HEIGHT: f64 = 240.0;
const CHART_PAD: f64 = 30.0;
const CHART_COLORS: [&str; 2] = ["#e67e22", "#2c3e50"];

const STYLE: &str = r#"
        body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; max-width: 960px; margin: 40px auto; padding: 20px; }
        h1 { color: #2c3e50; }
        table { border-collapse: collapse; margin: 10px 0 30px; width: 100%; }
        th, td { padding: 4px 10px; border-bottom: 1px solid #e9ecef; text-align: right; }
        th { background: #f8f9fa; }
        .progress { background: #f8f9fa; padding: 12px 20px; border-radius: 8px; }
        .error { color: #c0392b; }
        code { background: #e9ecef; padding: 2px 6px; border-radius: 4px; }
"#;

/// Render the full dashboard page.
pub fn render_page(snapshot: &Snapshot) -> String {
    let mut html = String::with_capacity(8 * 1024);
    let refresh = if snapshot.finished || snapshot.error.is_some() {
        String::new()
    } else {
        format!(r#"<meta http-equiv="refresh" content="{}">"#, REFRESH_SECS)
    };

    let _ = write!(
        html,
        r#"<!DOCTYPE html>
<html>
<head>
    <title>GHG Emission Forecast</title>
    {refresh}
    <style>{STYLE}</style>
</head>
<body>
    <h1>Live GHG Emission Forecast</h1>
"#
    );

    let status = if let Some(error) = &snapshot.error {
        format!(r#"<span class="error">Run failed: {}</span>"#, escape(error))
    } else if snapshot.finished {
        "Run finished".to_string()
    } else {
        "Running".to_string()
    };
    let _ = write!(
        html,
        r#"    <div class="progress">Iteration {}/{} &middot; {} records &middot; model <code>{}</code> &middot; {}</div>
"#,
        snapshot.iteration,
        snapshot.total,
        snapshot.log_len,
        escape(&snapshot.model),
        status
    );

    html.push_str("    <h2>Latest predictions</h2>\n");
    for record in &snapshot.latest {
        let _ = writeln!(
            html,
            "    <p>Predicted emission ({}): <strong>{:.2}</strong> units</p>",
            record.gas_type().label(),
            record.prediction
        );
    }

    html.push_str("    <h2>Predicted emissions over time</h2>\n");
    render_chart(&mut html, &snapshot.chart);

    html.push_str("    <h2>Mean prediction per timestamp</h2>\n");
    render_aggregates(&mut html, &snapshot.aggregates);

    html.push_str("    <h2>Latest observations</h2>\n");
    render_tail(&mut html, &snapshot.tail);

    html.push_str(
        r#"    <p><a href="/snapshot">/snapshot</a> &middot; <a href="/metrics">/metrics</a> &middot; <a href="/status">/status</a></p>
</body>
</html>
"#,
    );
    html
}

/// One SVG polyline per gas. Gases share the time axis and the value scale.
fn render_chart(html: &mut String, chart: &[ChartSeries]) {
    let mut times: Vec<&str> = Vec::new();
    for point in chart.iter().flat_map(|s| &s.points) {
        if !times.contains(&point.time.as_str()) {
            times.push(&point.time);
        }
    }
    if times.is_empty() {
        html.push_str("    <p>No predictions yet.</p>\n");
        return;
    }

    let values = chart.iter().flat_map(|s| &s.points).map(|p| p.mean_prediction);
    let (mut low, mut high) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if high - low < f64::EPSILON {
        low -= 1.0;
        high += 1.0;
    }

    let x_step = if times.len() > 1 {
        (CHART_WIDTH - 2.0 * CHART_PAD) / (times.len() - 1) as f64
    } else {
        0.0
    };
    let x_of = |time: &str| {
        let index = times.iter().position(|t| *t == time).unwrap_or(0);
        if times.len() > 1 {
            CHART_PAD + index as f64 * x_step
        } else {
            CHART_WIDTH / 2.0
        }
    };
    let y_of = |value: f64| {
        CHART_HEIGHT - CHART_PAD - (value - low) / (high - low) * (CHART_HEIGHT - 2.0 * CHART_PAD)
    };

    let _ = writeln!(
        html,
        r#"    <svg width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = CHART_WIDTH,
        h = CHART_HEIGHT
    );
    let _ = writeln!(
        html,
        r##"        <text x="4" y="{:.1}" font-size="11">{:.2}</text><text x="4" y="{:.1}" font-size="11">{:.2}</text>"##,
        y_of(high),
        high,
        y_of(low),
        low
    );
    for (series, color) in chart.iter().zip(CHART_COLORS.iter().cycle()) {
        if series.points.is_empty() {
            continue;
        }
        let points: Vec<String> = series
            .points
            .iter()
            .map(|p| format!("{:.1},{:.1}", x_of(p.time.as_str()), y_of(p.mean_prediction)))
            .collect();
        let _ = writeln!(
            html,
            r#"        <polyline fill="none" stroke="{}" stroke-width="2" points="{}"><title>{}</title></polyline>"#,
            color,
            points.join(" "),
            escape(&series.gas)
        );
    }
    let _ = writeln!(
        html,
        r#"        <text x="{:.1}" y="{:.1}" font-size="11">{}</text><text x="{:.1}" y="{:.1}" font-size="11" text-anchor="end">{}</text>"#,
        CHART_PAD,
        CHART_HEIGHT - 8.0,
        times[0],
        CHART_WIDTH - CHART_PAD,
        CHART_HEIGHT - 8.0,
        times[times.len() - 1]
    );
    html.push_str("    </svg>\n    <p>");
    for (series, color) in chart.iter().zip(CHART_COLORS.iter().cycle()) {
        let _ = write!(
            html,
            r#"<span style="color: {}">&#9632; {}</span> "#,
            color,
            escape(&series.gas)
        );
    }
    html.push_str("</p>\n");
}

fn render_aggregates(html: &mut String, rows: &[AggregateRow]) {
    html.push_str("    <table>\n        <tr><th>Time</th><th>Gas</th><th>Mean prediction</th><th>Readings</th></tr>\n");
    for row in rows {
        let _ = writeln!(
            html,
            "        <tr><td>{}</td><td>{}</td><td>{:.2}</td><td>{}</td></tr>",
            row.time_label(),
            row.gas_type.label(),
            row.mean_prediction,
            row.count
        );
    }
    html.push_str("    </table>\n");
}

fn render_tail(html: &mut String, records: &[Record]) {
    html.push_str(
        "    <table>\n        <tr><th>Time</th><th>Site</th><th>Temp</th><th>Pressure</th><th>Humidity</th>\
         <th>Load</th><th>Maint.</th><th>Gas</th><th>Hours</th><th>Prediction</th></tr>\n",
    );
    for record in records {
        let r = &record.reading;
        let _ = writeln!(
            html,
            "        <tr><td>{}</td><td>{}</td><td>{:.2}</td><td>{:.2}</td><td>{:.2}</td>\
             <td>{:.2}</td><td>{}</td><td>{}</td><td>{}</td><td>{:.2}</td></tr>",
            record.time_label(),
            r.site_id,
            r.temp,
            r.pressure,
            r.humidity,
            r.load,
            r.maintenance_flag,
            r.gas_type.label(),
            r.operational_hours,
            record.prediction
        );
    }
    html.push_str("    </table>\n");
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
