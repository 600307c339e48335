//! Prometheus text rendering of a [`MetricSnapshot`].
//!
//! A fresh registry is built per snapshot, so nothing from an earlier
//! cycle can leak into the current exposition.

use crate::domain::metrics::{FamilySnapshot, MetricKind, MetricSnapshot};
use prometheus::{CounterVec, Gauge, GaugeVec, Opts, Registry, TextEncoder};

/// Content type of the text exposition format
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Renders every family of the snapshot.
///
/// Families without data points still get their `# HELP` and `# TYPE`
/// lines, appended after the populated ones.
pub fn render(snapshot: &MetricSnapshot) -> Result<String, prometheus::Error> {
    let registry = Registry::new();
    let mut empty_families = String::new();

    for family in snapshot.families() {
        if family.samples.is_empty() {
            let def = family.def();
            empty_families.push_str(&format!(
                "# HELP {} {}\n# TYPE {} {}\n",
                def.name,
                escape_help(def.help),
                def.name,
                def.kind.as_str()
            ));
            continue;
        }
        register_family(&registry, family)?;
    }

    let mut output = TextEncoder::new().encode_to_string(&registry.gather())?;
    output.push_str(&empty_families);
    Ok(output)
}

fn register_family(registry: &Registry, family: &FamilySnapshot) -> Result<(), prometheus::Error> {
    let def = family.def();
    let opts = Opts::new(def.name, def.help);

    match def.kind {
        MetricKind::Counter => {
            let counters = CounterVec::new(opts, def.labels)?;
            for sample in &family.samples {
                let labels: Vec<&str> = sample.labels.iter().map(String::as_str).collect();
                counters
                    .with_label_values(labels.as_slice())
                    .inc_by(sample.value.max(0.0));
            }
            registry.register(Box::new(counters))
        }
        MetricKind::Gauge if def.labels.is_empty() => {
            let gauge = Gauge::with_opts(opts)?;
            if let Some(sample) = family.samples.last() {
                gauge.set(sample.value);
            }
            registry.register(Box::new(gauge))
        }
        MetricKind::Gauge => {
            let gauges = GaugeVec::new(opts, def.labels)?;
            for sample in &family.samples {
                let labels: Vec<&str> = sample.labels.iter().map(String::as_str).collect();
                gauges.with_label_values(labels.as_slice()).set(sample.value);
            }
            registry.register(Box::new(gauges))
        }
    }
}

fn escape_help(help: &str) -> String {
    help.replace('\\', "\\\\").replace('\n', "\\n")
}
