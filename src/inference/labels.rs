use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

/// Training tags in `LabelEncoder` order (alphabetical). Index `i` names the
/// model's `i`-th output.
const BUILTIN_LABELS: [&str; 5] = [
    "fake_news",
    "misinformation",
    "propaganda",
    "real_news",
    "satire",
];

#[derive(Debug, Error)]
pub enum LabelTableError {
    #[error("failed to read label table: {0}")]
    Io(#[from] std::io::Error),

    #[error("label table is not a JSON array of strings: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("label table is empty")]
    Empty,

    #[error("duplicate label '{0}'")]
    Duplicate(String),
}

/// Ordered, immutable mapping from class index to label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelTable(Arc<[String]>);

impl LabelTable {
    pub fn new(labels: Vec<String>) -> Result<Self, LabelTableError> {
        if labels.is_empty() {
            return Err(LabelTableError::Empty);
        }
        let mut seen = HashSet::new();
        for label in &labels {
            if !seen.insert(label.as_str()) {
                return Err(LabelTableError::Duplicate(label.clone()));
            }
        }
        Ok(Self(labels.into()))
    }

    pub fn builtin() -> Self {
        Self(BUILTIN_LABELS.iter().map(|l| l.to_string()).collect())
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, LabelTableError> {
        let raw = std::fs::read_to_string(path)?;
        let labels: Vec<String> = serde_json::from_str(&raw)?;
        Self::new(labels)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.iter().any(|l| l == label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builtin_order() {
        let table = LabelTable::builtin();
        assert_eq!(table.len(), 5);
        assert_eq!(table.get(0), Some("fake_news"));
        assert_eq!(table.get(3), Some("real_news"));
        assert_eq!(table.get(5), None);
        assert!(table.contains("satire"));
    }

    #[test]
    fn test_rejects_empty_and_duplicates() {
        assert!(matches!(LabelTable::new(vec![]), Err(LabelTableError::Empty)));
        assert!(matches!(
            LabelTable::new(vec!["a".into(), "b".into(), "a".into()]),
            Err(LabelTableError::Duplicate(l)) if l == "a"
        ));
    }

    #[test]
    fn test_from_json_file() {
        let path = std::env::temp_dir().join(format!("labels-{}.json", uuid::Uuid::new_v4()));
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, r#"["true", "false"]"#).unwrap();

        let table = LabelTable::from_json_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(table.iter().collect::<Vec<_>>(), vec!["true", "false"]);
    }

    #[test]
    fn test_from_json_file_rejects_objects() {
        let path = std::env::temp_dir().join(format!("labels-{}.json", uuid::Uuid::new_v4()));
        std::fs::write(&path, r#"{"0": "fake_news"}"#).unwrap();

        let result = LabelTable::from_json_file(&path);
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(result, Err(LabelTableError::Parse(_))));
    }
}
