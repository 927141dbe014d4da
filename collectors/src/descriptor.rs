use crate::sink::{
    Emission,
    Sample,
    Sink,
};
use std::{
    collections::BTreeMap,
    sync::Arc,
};

/// Constant labels attached to every sample of a collector, identifying the
/// scraped NiFi instance.
pub type ConstLabels = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    /// Instantaneous state.
    Gauge,
    /// Monotonically increasing upstream value.
    Counter,
}

impl MetricKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Gauge => "gauge",
            MetricKind::Counter => "counter",
        }
    }
}

/// Immutable identity of a metric: name, help, type and label schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    name: String,
    help: String,
    kind: MetricKind,
    variable_labels: Vec<&'static str>,
    const_labels: ConstLabels,
}

impl Descriptor {
    pub fn new(
        name: impl Into<String>,
        help: impl Into<String>,
        kind: MetricKind,
        variable_labels: &[&'static str],
        const_labels: &ConstLabels,
    ) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            help: help.into(),
            kind,
            variable_labels: variable_labels.to_vec(),
            const_labels: const_labels.clone(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn help(&self) -> &str {
        &self.help
    }

    pub fn kind(&self) -> MetricKind {
        self.kind
    }

    pub fn variable_labels(&self) -> &[&'static str] {
        &self.variable_labels
    }

    pub fn const_labels(&self) -> &ConstLabels {
        &self.const_labels
    }

    /// Whether `other` describes the same metric family (everything but the
    /// constant labels matches).
    pub fn same_schema(&self, other: &Descriptor) -> bool {
        self.name == other.name
            && self.help == other.help
            && self.kind == other.kind
            && self.variable_labels == other.variable_labels
    }

    /// A sample of this metric. `label_values` follow
    /// [`Descriptor::variable_labels`] order.
    pub fn sample(self: &Arc<Self>, value: f64, label_values: Vec<String>) -> Sample {
        debug_assert_eq!(
            label_values.len(),
            self.variable_labels.len(),
            "label values do not match the schema of {}",
            self.name
        );
        Sample {
            descriptor: Arc::clone(self),
            value,
            label_values,
        }
    }
}

/// One numeric field of a snapshot and how it is published.
pub(crate) struct Field<S> {
    pub name: &'static str,
    pub help: &'static str,
    pub kind: MetricKind,
    /// `None` when the snapshot does not carry the field.
    pub value: fn(&S) -> Option<f64>,
}

/// Descriptors for a table of [`Field`]s sharing one label schema.
pub(crate) struct FieldSet<S> {
    primary: Arc<Descriptor>,
    fields: Vec<(Arc<Descriptor>, fn(&S) -> Option<f64>)>,
}

impl<S> FieldSet<S> {
    /// The first entry of `fields` becomes the primary descriptor.
    pub fn new<const N: usize>(
        prefix: &str,
        fields: &[Field<S>; N],
        labels: &[&'static str],
        const_labels: &ConstLabels,
    ) -> Self {
        const { assert!(N > 0, "a field set needs at least one field") };

        let fields: Vec<_> = fields
            .iter()
            .map(|field| {
                let descriptor = Descriptor::new(
                    format!("{prefix}{}", field.name),
                    field.help,
                    field.kind,
                    labels,
                    const_labels,
                );
                (descriptor, field.value)
            })
            .collect();
        let primary = Arc::clone(&fields[0].0);
        Self { primary, fields }
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &Arc<Descriptor>> {
        self.fields.iter().map(|(descriptor, _)| descriptor)
    }

    /// First declared field, which failures are reported against.
    pub fn primary(&self) -> &Arc<Descriptor> {
        &self.primary
    }

    /// Emits one sample per present field of `snapshot`.
    pub fn emit(&self, sink: &dyn Sink, snapshot: &S, label_values: &[String]) {
        for (descriptor, value) in &self.fields {
            if let Some(value) = value(snapshot) {
                sink.emit(Emission::Sample(descriptor.sample(value, label_values.to_vec())));
            }
        }
    }
}
