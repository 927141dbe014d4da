use crate::{
    collector::ScrapeError,
    descriptor::Descriptor,
};
use std::sync::Arc;
use tokio::sync::mpsc::{
    self,
    UnboundedReceiver,
    UnboundedSender,
};

/// A value of a metric, with label values ordered like the descriptor's
/// variable labels.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub descriptor: Arc<Descriptor>,
    pub value: f64,
    pub label_values: Vec<String>,
}

/// A collector could not produce trustworthy data this cycle.
#[derive(Debug)]
pub struct Failure {
    /// Primary descriptor of the failing collector.
    pub descriptor: Arc<Descriptor>,
    pub error: ScrapeError,
}

#[derive(Debug)]
pub enum Emission {
    Sample(Sample),
    Invalid(Failure),
}

/// Append-only destination of emissions.
///
/// Shared by collectors running concurrently; no ordering between emissions
/// of different collectors is implied.
pub trait Sink: Send + Sync {
    fn emit(&self, emission: Emission);
}

impl Sink for UnboundedSender<Emission> {
    fn emit(&self, emission: Emission) {
        if self.send(emission).is_err() {
            trace!("scrape was abandoned, dropping emission");
        }
    }
}

pub fn channel() -> (UnboundedSender<Emission>, UnboundedReceiver<Emission>) {
    mpsc::unbounded_channel()
}

/// Everything emitted during one scrape.
#[derive(Debug, Default)]
pub struct Gathered {
    pub samples: Vec<Sample>,
    pub failures: Vec<Failure>,
}

impl Gathered {
    /// Drains the emissions buffered in `receiver`. Call once every sender is
    /// gone, otherwise later emissions are missed.
    pub fn from_receiver(mut receiver: UnboundedReceiver<Emission>) -> Self {
        let mut gathered = Self::default();
        while let Ok(emission) = receiver.try_recv() {
            match emission {
                Emission::Sample(sample) => gathered.samples.push(sample),
                Emission::Invalid(failure) => gathered.failures.push(failure),
            }
        }
        gathered
    }

    /// Samples of the metric called `name`.
    pub fn named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Sample> + 'a {
        self.samples.iter().filter(move |sample| sample.descriptor.name() == name)
    }
}
