//! # sweeper-viz
//!
//! Bar chart generation for sweeper.
//!
//! This crate builds chart specifications from a [`Table`] that can be
//! rendered by:
//! - a browser front-end (JSON spec)
//! - a standalone HTML page using Chart.js

use serde::{Deserialize, Serialize};
use sweeper_sheet::{CellValue, Table};

/// Maximum number of numeric columns drawn in one chart.
pub const MAX_SERIES: usize = 2;

/// Chart specification for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub title: String,
    pub data: ChartData,
    pub options: ChartOptions,
}

/// Chart data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

/// A dataset in a chart. Missing cells are `None` and render as gaps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub label: String,
    pub data: Vec<Option<f64>>,
}

/// Chart rendering options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_axis_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_axis_label: Option<String>,
    pub show_legend: bool,
}

/// Escape HTML special characters to prevent XSS.
fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

impl ChartSpec {
    /// Create an empty bar chart.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            data: ChartData::default(),
            options: ChartOptions {
                show_legend: true,
                ..ChartOptions::default()
            },
        }
    }

    /// Build a bar chart from the first two numeric columns of `table`.
    ///
    /// Labels are the 0-based row positions. A table without numeric
    /// columns gives an empty chart.
    #[must_use]
    pub fn bar_from_table(title: impl Into<String>, table: &Table) -> Self {
        let mut chart = Self::new(title);
        let series: Vec<usize> = table.numeric_columns().into_iter().take(MAX_SERIES).collect();
        if series.is_empty() {
            return chart;
        }

        let names = table.column_names();
        chart.data.labels = (0..table.row_count()).map(|i| i.to_string()).collect();
        chart.data.datasets = series
            .iter()
            .map(|&col| Dataset {
                label: names[col].clone(),
                data: table
                    .rows()
                    .map(|row| row.get(col).and_then(CellValue::as_float))
                    .collect(),
            })
            .collect();
        chart.options.x_axis_label = Some("row".to_string());
        chart
    }

    /// Whether the chart has nothing to draw.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.datasets.is_empty()
    }

    /// Convert to JSON string for frontend rendering.
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Generate HTML with embedded Chart.js.
    #[must_use]
    pub fn to_html(&self) -> String {
        // Escape title for HTML context and JSON for script context
        let title = escape_html(&self.title);
        let json = serde_json::to_string(&self)
            .unwrap_or_default()
            .replace("</", "<\\/"); // Prevent script tag breakout

        format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>{title}</title>
    <script src="https://cdn.jsdelivr.net/npm/chart.js"></script>
</head>
<body>
    <canvas id="chart"></canvas>
    <script>
        const spec = {json};
        const ctx = document.getElementById('chart').getContext('2d');
        new Chart(ctx, {{
            type: 'bar',
            data: spec.data,
            options: {{
                responsive: true,
                plugins: {{
                    title: {{
                        display: true,
                        text: spec.title
                    }},
                    legend: {{
                        display: spec.options.show_legend
                    }}
                }}
            }}
        }});
    </script>
</body>
</html>"#,
        )
    }
}
