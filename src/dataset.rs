//! The supervised training set a [`Program`](crate::program::Program) is
//! scored against (spec §3 "Dataset", spec §6 "Dataset format").
//!
//! The teacher has no notion of a dataset at all — `genevo`'s fitness
//! evaluation is a user-supplied closure over the genotype alone — so the
//! `(Sample, Target)` pair and the CSV loader follow spec §3/§6 directly,
//! using the `csv` crate the way `xsa-dev-hyperliquid-backtest` loads its
//! tabular market-data fixtures.

use crate::error::Error;

/// One case's feature vector.
#[derive(Clone, Debug, PartialEq)]
pub struct Sample {
    pub features: Vec<f64>,
}

impl Sample {
    pub fn new(features: Vec<f64>) -> Self {
        Sample { features }
    }
}

/// A case's expected output: either a single scalar or a fixed-length
/// vector, matching the shape of the program's output register list.
#[derive(Clone, Debug, PartialEq)]
pub enum Target {
    Single(f64),
    Multiple(Vec<f64>),
}

impl Target {
    /// The number of scalars this target carries.
    pub fn len(&self) -> usize {
        match self {
            Target::Single(_) => 1,
            Target::Multiple(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_slice(&self) -> &[f64] {
        match self {
            Target::Single(value) => std::slice::from_ref(value),
            Target::Multiple(values) => values,
        }
    }
}

/// An ordered sequence of `(Sample, Target)` cases, all sharing the same
/// feature count and target shape (spec §3 invariant).
#[derive(Clone, Debug, PartialEq)]
pub struct Dataset {
    cases: Vec<(Sample, Target)>,
    num_features: usize,
    target_len: usize,
}

impl Dataset {
    /// Constructs a dataset from `cases`. Fails with `Error::ComponentLoad`
    /// if `cases` is empty or the samples disagree on feature count or
    /// target shape.
    pub fn new(cases: Vec<(Sample, Target)>) -> Result<Self, Error> {
        let (first_sample, first_target) = cases
            .first()
            .ok_or_else(|| Error::ComponentLoad("dataset must have at least one case".to_string()))?;
        let num_features = first_sample.features.len();
        let target_len = first_target.len();

        for (sample, target) in &cases {
            if sample.features.len() != num_features {
                return Err(Error::ComponentLoad(format!(
                    "inconsistent feature count: expected {}, got {}",
                    num_features,
                    sample.features.len()
                )));
            }
            if target.len() != target_len {
                return Err(Error::ComponentLoad(format!(
                    "inconsistent target shape: expected {} value(s), got {}",
                    target_len,
                    target.len()
                )));
            }
        }

        Ok(Dataset {
            cases,
            num_features,
            target_len,
        })
    }

    pub fn num_features(&self) -> usize {
        self.num_features
    }

    pub fn target_len(&self) -> usize {
        self.target_len
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Sample, Target)> {
        self.cases.iter()
    }

    pub fn cases(&self) -> &[(Sample, Target)] {
        &self.cases
    }
}

/// Parses a dataset from CSV (spec §6 "Dataset format"): a header row
/// followed by one row per case, the first `num_features` columns holding
/// features and the remaining columns holding the target. Fails with
/// `Error::ComponentLoad` if the source is empty, has fewer than two rows
/// (header plus at least one data row), or any cell fails to parse as a
/// number.
pub fn load_csv(source: &str, num_features: usize) -> Result<Dataset, Error> {
    if source.trim().is_empty() {
        return Err(Error::ComponentLoad("dataset source is empty".to_string()));
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(source.as_bytes());

    let header_len = reader
        .headers()
        .map_err(|e| Error::ComponentLoad(e.to_string()))?
        .len();
    if header_len <= num_features {
        return Err(Error::ComponentLoad(format!(
            "expected more than {} column(s) (features + at least one target column)",
            num_features
        )));
    }

    let mut cases = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| Error::ComponentLoad(e.to_string()))?;
        let mut values = Vec::with_capacity(record.len());
        for field in record.iter() {
            let value: f64 = field
                .trim()
                .parse()
                .map_err(|_| Error::ComponentLoad(format!("could not parse '{}' as a number", field)))?;
            values.push(value);
        }
        if values.len() < num_features {
            return Err(Error::ComponentLoad(format!(
                "row has {} column(s), expected at least {}",
                values.len(),
                num_features
            )));
        }
        let (features, target_values) = values.split_at(num_features);
        let sample = Sample::new(features.to_vec());
        let target = if target_values.len() == 1 {
            Target::Single(target_values[0])
        } else {
            Target::Multiple(target_values.to_vec())
        };
        cases.push((sample, target));
    }

    if cases.is_empty() {
        return Err(Error::ComponentLoad(
            "dataset must have a header row and at least one data row".to_string(),
        ));
    }

    Dataset::new(cases)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_csv_splits_features_and_single_target() {
        let csv = "x,y\n0,0\n1,1\n2,2\n";
        let dataset = load_csv(csv, 1).unwrap();
        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.num_features(), 1);
        let (sample, target) = &dataset.cases()[1];
        assert_eq!(sample.features, vec![1.0]);
        assert_eq!(*target, Target::Single(1.0));
    }

    #[test]
    fn load_csv_supports_multiple_targets() {
        let csv = "x,y1,y2\n1,2,3\n4,5,6\n";
        let dataset = load_csv(csv, 1).unwrap();
        let (_, target) = &dataset.cases()[0];
        assert_eq!(*target, Target::Multiple(vec![2.0, 3.0]));
    }

    #[test]
    fn load_csv_rejects_empty_source() {
        assert!(matches!(load_csv("", 1), Err(Error::ComponentLoad(_))));
    }

    #[test]
    fn load_csv_rejects_header_only_source() {
        let csv = "x,y\n";
        assert!(matches!(load_csv(csv, 1), Err(Error::ComponentLoad(_))));
    }

    #[test]
    fn load_csv_rejects_unparsable_cell() {
        let csv = "x,y\nnotanumber,1\n";
        assert!(matches!(load_csv(csv, 1), Err(Error::ComponentLoad(_))));
    }

    #[test]
    fn dataset_rejects_inconsistent_feature_counts() {
        let cases = vec![
            (Sample::new(vec![1.0]), Target::Single(1.0)),
            (Sample::new(vec![1.0, 2.0]), Target::Single(1.0)),
        ];
        assert!(matches!(Dataset::new(cases), Err(Error::ComponentLoad(_))));
    }
}
