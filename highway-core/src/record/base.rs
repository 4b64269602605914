//! Record and its values.
use crate::error::HighwayError;
use std::collections::HashMap;

/// Represents possible types of values in a [`Record`].
#[derive(Debug, Clone, PartialEq)]
pub enum RecordValue {
    /// A single floating-point value, typically a metric like loss.
    Scalar(f32),
}

/// A container of key-value pairs.
#[derive(Debug, Clone, Default)]
pub struct Record(HashMap<String, RecordValue>);

impl Record {
    /// Creates an empty record.
    pub fn empty() -> Self {
        Self(HashMap::new())
    }

    /// Creates a record from a slice of key-value pairs.
    pub fn from_slice<K: Into<String> + Clone>(s: &[(K, RecordValue)]) -> Self {
        Self(
            s.iter()
                .map(|(k, v)| (k.clone().into(), v.clone()))
                .collect(),
        )
    }

    /// Inserts a key-value pair.
    pub fn insert(&mut self, k: impl Into<String>, v: RecordValue) {
        self.0.insert(k.into(), v);
    }

    /// Gets a reference to the value associated with the given key.
    pub fn get(&self, k: &str) -> Option<&RecordValue> {
        self.0.get(k)
    }

    /// Gets a scalar value.
    pub fn get_scalar(&self, k: &str) -> Result<f32, HighwayError> {
        match self.0.get(k) {
            Some(RecordValue::Scalar(v)) => Ok(*v),
            None => Err(HighwayError::RecordKeyError(k.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_scalar() {
        let record = Record::from_slice(&[
            ("loss", RecordValue::Scalar(0.5)),
            ("n_opts", RecordValue::Scalar(3.0)),
        ]);
        assert_eq!(record.get_scalar("loss").unwrap(), 0.5);
        assert_eq!(record.get_scalar("n_opts").unwrap(), 3.0);
        assert!(matches!(
            record.get_scalar("epsilon"),
            Err(HighwayError::RecordKeyError(_))
        ));
    }

    #[test]
    fn test_insert_overwrites() {
        let mut record = Record::empty();
        assert!(record.get("loss").is_none());

        record.insert("loss", RecordValue::Scalar(1.0));
        record.insert("loss", RecordValue::Scalar(2.0));
        assert_eq!(record.get("loss"), Some(&RecordValue::Scalar(2.0)));
        assert_eq!(record.get_scalar("loss").unwrap(), 2.0);
    }
}
