//! Rendering of gathered samples in the Prometheus text exposition format.

use crate::{
    descriptor::MetricKind,
    sink::Sample,
};
use prometheus::{
    proto::{
        Counter,
        Gauge,
        LabelPair,
        Metric,
        MetricFamily,
        MetricType,
    },
    Encoder,
    TextEncoder,
};
use std::collections::BTreeMap;

/// Content type of [`encode`] output.
pub fn content_type() -> String {
    TextEncoder::new().format_type().to_string()
}

/// Groups `samples` into metric families, sorted by name, with every
/// family's metrics sorted by label values.
///
/// Labels are ordered variable labels first, then constant labels.
pub fn families<'a>(samples: impl IntoIterator<Item = &'a Sample>) -> Vec<MetricFamily> {
    let mut grouped: BTreeMap<&str, Vec<(Vec<(&str, &str)>, &Sample)>> = BTreeMap::new();
    for sample in samples {
        let descriptor = &sample.descriptor;
        let labels = descriptor
            .variable_labels()
            .iter()
            .copied()
            .zip(sample.label_values.iter().map(String::as_str))
            .chain(
                descriptor
                    .const_labels()
                    .iter()
                    .map(|(name, value)| (name.as_str(), value.as_str())),
            )
            .collect();
        grouped.entry(descriptor.name()).or_default().push((labels, sample));
    }

    grouped
        .into_iter()
        .map(|(name, mut members)| {
            members.sort_by(|(a, _), (b, _)| a.cmp(b));
            let descriptor = &members[0].1.descriptor;

            let mut family = MetricFamily::default();
            family.set_name(name.to_string());
            family.set_help(descriptor.help().to_string());
            family.set_field_type(match descriptor.kind() {
                MetricKind::Gauge => MetricType::GAUGE,
                MetricKind::Counter => MetricType::COUNTER,
            });
            family.set_metric(
                members
                    .iter()
                    .map(|(labels, sample)| metric(labels, sample))
                    .collect(),
            );
            family
        })
        .collect()
}

fn metric(labels: &[(&str, &str)], sample: &Sample) -> Metric {
    let mut m = Metric::default();
    m.set_label(
        labels
            .iter()
            .map(|(name, value)| {
                let mut pair = LabelPair::default();
                pair.set_name(name.to_string());
                pair.set_value(value.to_string());
                pair
            })
            .collect(),
    );
    match sample.descriptor.kind() {
        MetricKind::Gauge => {
            let mut gauge = Gauge::default();
            gauge.set_value(sample.value);
            m.set_gauge(gauge);
        }
        MetricKind::Counter => {
            let mut counter = Counter::default();
            counter.set_value(sample.value);
            m.set_counter(counter);
        }
    }
    m
}

/// Renders `samples` as exposition text.
pub fn encode<'a>(samples: impl IntoIterator<Item = &'a Sample>) -> Result<String, prometheus::Error> {
    let families = families(samples);
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{
        ConstLabels,
        Descriptor,
    };
    use pretty_assertions::assert_eq;

    #[test]
    fn renders_sorted_families_with_const_labels_last() {
        let const_labels = ConstLabels::from([("environment".to_string(), "prod".to_string())]);
        let queued = Descriptor::new(
            "nifi_conn_flow_files_queued",
            "Queued FlowFiles.",
            MetricKind::Gauge,
            &["node_id"],
            &const_labels,
        );
        let total = Descriptor::new(
            "nifi_counter_total",
            "The value of the counter.",
            MetricKind::Counter,
            &["node_id"],
            &const_labels,
        );
        let samples = vec![
            total.sample(42.0, vec!["aggregate".to_string()]),
            queued.sample(12.0, vec!["n2".to_string()]),
            queued.sample(5.0, vec!["n1".to_string()]),
        ];

        let text = encode(&samples).unwrap();
        assert_eq!(
            text,
            "# HELP nifi_conn_flow_files_queued Queued FlowFiles.\n\
             # TYPE nifi_conn_flow_files_queued gauge\n\
             nifi_conn_flow_files_queued{node_id=\"n1\",environment=\"prod\"} 5\n\
             nifi_conn_flow_files_queued{node_id=\"n2\",environment=\"prod\"} 12\n\
             # HELP nifi_counter_total The value of the counter.\n\
             # TYPE nifi_counter_total counter\n\
             nifi_counter_total{node_id=\"aggregate\",environment=\"prod\"} 42\n"
        );
    }

    #[test]
    fn same_metric_from_two_instances_forms_one_family() {
        let instance = |name: &str| ConstLabels::from([("instance".to_string(), name.to_string())]);
        let a = Descriptor::new("nifi_sysdiag_total_threads", "Threads.", MetricKind::Gauge, &["node_id"], &instance("a"));
        let b = Descriptor::new("nifi_sysdiag_total_threads", "Threads.", MetricKind::Gauge, &["node_id"], &instance("b"));
        let samples = vec![
            b.sample(2.0, vec!["aggregate".to_string()]),
            a.sample(1.0, vec!["aggregate".to_string()]),
        ];

        let text = encode(&samples).unwrap();
        assert_eq!(text.matches("# TYPE nifi_sysdiag_total_threads gauge").count(), 1);
        let a = text.find("instance=\"a\"").unwrap();
        let b = text.find("instance=\"b\"").unwrap();
        assert!(a < b);
    }

    #[test]
    fn nothing_to_render() {
        let samples: Vec<Sample> = Vec::new();
        assert!(families(&samples).is_empty());
        assert_eq!(encode(&samples).unwrap(), "");
    }
}
