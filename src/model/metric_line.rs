//! Prometheus exposition-line formatting.
//!
//! Lines look like `name{key="value", key="value"} 12.5`. No `# HELP` or
//! `# TYPE` preamble is produced. Label values are written as given; callers
//! must not pass values containing `"` or `\`.

use std::fmt;

/// A single `key="value"` label.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub key: String,
    pub value: String,
}

impl Label {
    pub fn new(key: impl Into<String>, value: impl ToString) -> Self {
        Self {
            key: key.into(),
            value: value.to_string(),
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}=\"{}\"", self.key, self.value)
    }
}

/// One metric sample. Label keys are unique within a line.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricLine {
    name: String,
    labels: Vec<Label>,
    value: f64,
}

impl MetricLine {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            labels: Vec::new(),
            value,
        }
    }

    /// Adds a label, replacing the value of an existing label with the same key.
    pub fn label(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        let label = Label::new(key, value);
        match self.labels.iter_mut().find(|l| l.key == label.key) {
            Some(existing) => existing.value = label.value,
            None => self.labels.push(label),
        }
        self
    }

    /// Adds every label in order, with the same replacement rule as [`MetricLine::label`].
    pub fn labels<'a>(self, labels: impl IntoIterator<Item = &'a Label>) -> Self {
        labels
            .into_iter()
            .fold(self, |line, l| line.label(l.key.clone(), &l.value))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn render(&self) -> String {
        format_line(&self.name, &self.labels, self.value)
    }
}

impl fmt::Display for MetricLine {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Lower-cases a metric name and turns spaces, dashes and dots into underscores.
pub fn sanitize_metric_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            ' ' | '-' | '.' => '_',
            other => other.to_ascii_lowercase(),
        })
        .collect()
}

pub fn format_line(name: &str, labels: &[Label], value: f64) -> String {
    let labels = labels
        .iter()
        .map(Label::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    format!("{}{{{}}} {}", sanitize_metric_name(name), labels, value)
}

/// Joins rendered lines into a response body.
pub fn render_document(lines: &[MetricLine]) -> String {
    lines
        .iter()
        .map(MetricLine::render)
        .collect::<Vec<_>>()
        .join("\n")
}
