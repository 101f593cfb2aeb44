//! Tabular rendering of samples for the test log

use ftest_core::MetricSample;
use std::fmt::Write;

const METRIC_HEADER: &str = "Metric";
const VALUE_HEADER: &str = "Value";

/// Two aligned columns, one row per requested metric
///
/// Absent metrics print as `-`.
pub fn render_sample(sample: &MetricSample) -> String {
    let rows: Vec<(&str, String)> = sample
        .iter()
        .map(|(name, value)| {
            let value = value.map_or_else(|| "-".to_string(), |v| v.to_string());
            (name.as_str(), value)
        })
        .collect();

    let name_width = rows
        .iter()
        .map(|(n, _)| n.len())
        .chain(std::iter::once(METRIC_HEADER.len()))
        .max()
        .unwrap_or(0);
    let value_width = rows
        .iter()
        .map(|(_, v)| v.len())
        .chain(std::iter::once(VALUE_HEADER.len()))
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<nw$}  {:>vw$}",
        METRIC_HEADER,
        VALUE_HEADER,
        nw = name_width,
        vw = value_width
    );
    let _ = writeln!(out, "{}  {}", "-".repeat(name_width), "-".repeat(value_width));
    for (name, value) in rows {
        let _ = writeln!(
            out,
            "{:<nw$}  {:>vw$}",
            name,
            value,
            nw = name_width,
            vw = value_width
        );
    }
    out
}
