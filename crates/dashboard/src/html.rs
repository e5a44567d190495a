//! Static HTML snapshot of a rendered dashboard
//!
//! Walks the widget tree into markup and embeds the latest chart options held
//! by a [`MemoryChartBackend`] so ECharts can draw them when the page opens.
//! Buttons are written disabled and clickable widgets lose their actions;
//! the candidate CSV is exported by the host alongside the page.

use serde_json::{Map, Value};

use crate::chart::MemoryChartBackend;
use crate::widget::{Widget, WidgetKind};

const ECHARTS_CDN: &str = "https://cdn.jsdelivr.net/npm/echarts@5/dist/echarts.min.js";

/// Render a complete page for `root`.
pub fn render_page(root: &Widget, charts: &MemoryChartBackend, title: &str) -> String {
    let mut body = String::new();
    render_widget(root, &mut body);

    format!(
        r#"<!DOCTYPE html>
<html lang="ja">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>{css}</style>
    <script src="{cdn}"></script>
</head>
<body>
{body}
<script>window.__dashboardCharts = {charts};</script>
<script>{js}</script>
</body>
</html>"#,
        title = html_escape(title),
        css = inline_css(),
        cdn = ECHARTS_CDN,
        body = body,
        charts = charts_json(charts),
        js = inline_javascript(),
    )
}

/// Container id to ECharts option, safe to embed in a `<script>` element.
fn charts_json(charts: &MemoryChartBackend) -> String {
    let options: Map<String, Value> = charts
        .containers()
        .into_iter()
        .filter_map(|container| {
            let options = charts.options(&container)?;
            Some((container, options.to_echarts()))
        })
        .collect();
    Value::Object(options).to_string().replace("</", "<\\/")
}

fn render_widget(widget: &Widget, out: &mut String) {
    let (tag, extra_class) = match &widget.kind {
        WidgetKind::Panel => ("div", None),
        WidgetKind::Heading => ("h2", None),
        WidgetKind::Text => ("p", None),
        WidgetKind::Label => ("span", None),
        WidgetKind::Badge => ("span", Some("badge")),
        WidgetKind::Button => ("button", None),
        WidgetKind::List => ("ul", None),
        WidgetKind::Item => ("li", None),
        WidgetKind::Table => ("table", None),
        WidgetKind::Row => ("tr", None),
        WidgetKind::HeaderCell => ("th", None),
        WidgetKind::Cell => ("td", None),
        WidgetKind::Meter { .. } => ("div", Some("meter")),
        WidgetKind::Chart { .. } => ("div", None),
    };

    out.push('<');
    out.push_str(tag);

    let classes: Vec<&str> = extra_class
        .into_iter()
        .chain(widget.classes.iter().map(String::as_str))
        .collect();
    if !classes.is_empty() {
        out.push_str(&format!(r#" class="{}""#, html_escape(&classes.join(" "))));
    }
    if let WidgetKind::Chart { container } = &widget.kind {
        out.push_str(&format!(r#" id="{}""#, html_escape(container)));
    }
    // The page is a snapshot with no event loop behind it, so controls are inert.
    if widget.disabled || matches!(widget.kind, WidgetKind::Button) {
        out.push_str(" disabled");
    }
    out.push('>');

    if let WidgetKind::Meter { percent } = widget.kind {
        out.push_str(&format!(r#"<div class="meter-fill" style="width: {:.1}%"></div>"#, percent));
    }
    if let Some(text) = &widget.text {
        out.push_str(&html_escape(text));
    }
    for child in &widget.children {
        render_widget(child, out);
    }

    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

fn inline_css() -> &'static str {
    r#"
body { font-family: -apple-system, "Hiragino Sans", "Noto Sans JP", sans-serif; margin: 0; background: #f5f6f8; color: #222; }
.dashboard { max-width: 1200px; margin: 0 auto; padding: 24px; }
.dashboard > div { background: #fff; border-radius: 8px; padding: 16px 20px; margin-bottom: 20px; box-shadow: 0 1px 3px rgba(0,0,0,0.08); }
h2 { font-size: 1.1rem; margin: 0 0 12px; }
.placeholder { color: #999; font-style: italic; }
.loading.error p { color: #b00020; }
button { border: 1px solid #ccd; background: #fff; color: #222; border-radius: 4px; padding: 4px 10px; margin: 2px; cursor: default; }
button.active { background: #2b6cb0; color: #fff; }
button.inactive { opacity: 0.5; }
.chart { width: 100%; height: 360px; }
table { border-collapse: collapse; width: 100%; }
th, td { border-bottom: 1px solid #eee; padding: 6px 8px; text-align: left; }
tr.removed td { color: #aaa; text-decoration: line-through; }
.badge { display: inline-block; border-radius: 3px; padding: 1px 6px; font-size: 0.8rem; background: #eee; }
.badge-new { background: #c6f6d5; }
.badge-up { color: #2f855a; }
.badge-down { color: #c53030; }
.keyword { display: inline-block; margin: 4px; }
.size-large { font-size: 1.6rem; font-weight: bold; }
.size-medium { font-size: 1.2rem; }
.size-small { font-size: 0.9rem; color: #666; }
.delta-up { color: #2f855a; }
.delta-down { color: #c53030; }
.signals-positive .badge { background: #c6f6d5; }
.signals-cautious .badge { background: #fed7d7; }
.candidate-card { border: 1px solid #eee; border-radius: 6px; padding: 8px 12px; margin: 8px 0; }
.candidate-header { display: flex; gap: 8px; align-items: center; }
.rank-top { background: #f6e05e; }
.meter { background: #edf2f7; height: 8px; border-radius: 4px; overflow: hidden; margin: 4px 0; }
.meter-fill { background: #3182ce; height: 100%; }
.good { color: #2f855a; }
.warn { color: #c05621; }
.highlight { color: #c53030; }
.disclaimer { font-size: 0.8rem; color: #777; }
"#
}

fn inline_javascript() -> &'static str {
    r#"
(function () {
    if (typeof echarts === 'undefined') { return; }
    var charts = [];
    Object.keys(window.__dashboardCharts).forEach(function (id) {
        var el = document.getElementById(id);
        if (!el) { return; }
        var chart = echarts.init(el);
        chart.setOption(window.__dashboardCharts[id], true);
        charts.push(chart);
    });
    window.addEventListener('resize', function () {
        charts.forEach(function (c) { c.resize(); });
    });
})();
"#
}

/// Escape HTML special characters
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
