use crate::domain::metrics::catalog::{MetricDef, Series};

#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Values in the order of the family's label names
    pub labels: Vec<String>,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FamilySnapshot {
    pub series: Series,
    pub samples: Vec<Sample>,
}

impl FamilySnapshot {
    pub fn def(&self) -> MetricDef {
        self.series.def()
    }
}

/// Every catalog family with the data points of one poll cycle.
///
/// All families are present even without samples, so consumers always see
/// the full schema. Only the snapshot builder writes to it.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSnapshot {
    families: Vec<FamilySnapshot>,
}

impl MetricSnapshot {
    pub(crate) fn empty() -> Self {
        Self {
            families: Series::ALL
                .iter()
                .map(|&series| FamilySnapshot {
                    series,
                    samples: Vec::new(),
                })
                .collect(),
        }
    }

    pub(crate) fn push<S: AsRef<str>>(&mut self, series: Series, labels: &[S], value: f64) {
        debug_assert_eq!(
            labels.len(),
            series.def().labels.len(),
            "label count mismatch for {}",
            series.def().name
        );
        self.families[series.index()].samples.push(Sample {
            labels: labels.iter().map(|l| l.as_ref().to_string()).collect(),
            value,
        });
    }

    pub fn families(&self) -> &[FamilySnapshot] {
        &self.families
    }

    pub fn samples(&self, series: Series) -> &[Sample] {
        &self.families[series.index()].samples
    }

    /// Value of the sample with exactly these label values
    pub fn value(&self, series: Series, labels: &[&str]) -> Option<f64> {
        self.samples(series)
            .iter()
            .find(|s| s.labels.iter().map(String::as_str).eq(labels.iter().copied()))
            .map(|s| s.value)
    }

    pub fn sample_count(&self) -> usize {
        self.families.iter().map(|f| f.samples.len()).sum()
    }
}
