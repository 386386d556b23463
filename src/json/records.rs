use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::error;
use serde_json::Value;

use crate::json::flatten::LeafPath;
use crate::json::ValueType;

pub mod errors;
pub mod stats;

use errors::{Errors, IndexedWriteError, WriteError};
use stats::Stats;

/// One flattened output line: two opaque labels, the flat key and the
/// leaf's literal JSON text.
#[derive(Debug, Clone, PartialEq)]
pub struct Record<'a> {
    pub component: &'a str,
    pub property: &'a str,
    pub key: String,
    pub value: &'a Value,
}

impl<'a> Record<'a> {
    pub fn new(component: &'a str, property: &'a str, leaf: &LeafPath<'a>) -> Record<'a> {
        Record {
            component,
            property,
            key: leaf.flat_key(),
            value: leaf.value,
        }
    }

    /// The on-disk form, CRLF terminated. The ` : ` separator and missing
    /// quoting make this not-quite-CSV; it is kept byte-compatible for
    /// existing downstream consumers.
    pub fn line(&self) -> String {
        format!("{self}\r\n")
    }
}

impl fmt::Display for Record<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Value's Display gives the literal JSON encoding, so strings keep
        // their quotes and null renders as `null`
        write!(
            f,
            "{} : {} : {} : {}",
            self.component, self.property, self.key, self.value
        )
    }
}

/// Appends records to the output file, opening it in create/append mode per
/// record so one failed line never poisons a shared handle for the rest.
/// The file is never truncated; repeated runs are purely additive.
#[derive(Debug)]
pub struct RecordSink {
    path: PathBuf,
    pub errors: Errors<IndexedWriteError>,
}

impl RecordSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            errors: Errors::default(),
        }
    }

    fn try_append(&self, record: &Record) -> Result<(), WriteError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(record.line().as_bytes())?;
        Ok(())
    }

    /// Appends one record, reporting success. A failed write is logged and
    /// collected in [`RecordSink::errors`]; callers carry on with the
    /// remaining records.
    pub fn append(&self, record: &Record) -> bool {
        match self.try_append(record) {
            Ok(()) => true,
            Err(e) => {
                error!("failed to write record '{}': {}", record.key, e);
                self.errors.push(IndexedWriteError::new(record.key.clone(), e));
                false
            }
        }
    }
}

/// Flattens `node` into `sink`, one record per leaf value.
///
/// `component` and `property` are copied verbatim into every record;
/// `prefix` seeds the flat key. Write failures do not abort the traversal:
/// they are collected in the sink and listed in the returned [`Stats`].
pub fn convert_with_sink(
    component: &str,
    property: &str,
    prefix: &str,
    node: &Value,
    sink: &RecordSink,
) -> Stats {
    let mut stats = Stats::new();

    for leaf in LeafPath::with_prefix(node, prefix).leaf_paths() {
        let record = Record::new(component, property, &leaf);
        if sink.append(&record) {
            stats.record_count += 1;
            let counter = stats
                .leaf_types_count
                .entry(leaf.value.value_type())
                .or_insert(0);
            *counter += 1;
        } else {
            stats.failed_records.push(record.key);
        }
    }
    stats
}

/// Compatibility entry point: flattens `node` and appends one record per
/// leaf value to the file at `output_path`, creating it if absent.
pub fn convert(
    component: &str,
    property: &str,
    prefix: &str,
    node: &Value,
    output_path: &Path,
) -> Stats {
    let sink = RecordSink::new(output_path);
    convert_with_sink(component, property, prefix, node, &sink)
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;
    use std::fs;

    fn leaf<'a>(key: &str, value: &'a Value) -> LeafPath<'a> {
        LeafPath::new(value, Some(vec![key.to_string()]))
    }

    #[test]
    fn record_line_format() {
        let value = json!(1);
        let record = Record::new("Comp", "Prop", &leaf("a", &value));
        assert_eq!(record.to_string(), "Comp : Prop : a : 1");
        assert_eq!(record.line(), "Comp : Prop : a : 1\r\n");
    }

    #[test]
    fn record_keeps_string_quotes_and_null_literal() {
        let string_value = json!("x");
        let record = Record::new("Comp", "Prop", &leaf("s", &string_value));
        assert_eq!(record.to_string(), r#"Comp : Prop : s : "x""#);

        let null_value = json!(null);
        let record = Record::new("Comp", "Prop", &leaf("n", &null_value));
        assert_eq!(record.to_string(), "Comp : Prop : n : null");
    }

    #[test]
    fn convert_nested_object() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("records.csv");
        let v = json!({"a": 1, "b": {"c": 2}});

        let stats = convert("Comp", "Prop", "", &v, &out);

        assert_eq!(stats.record_count, 2);
        assert!(stats.failed_records.is_empty());
        let content = fs::read_to_string(&out).unwrap();
        assert_eq!(content, "Comp : Prop : a : 1\r\nComp : Prop : b-c : 2\r\n");
    }

    #[test]
    fn convert_array_one_based() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("records.csv");
        let v = json!({"list": [10, 20]});

        convert("Comp", "Prop", "", &v, &out);

        let content = fs::read_to_string(&out).unwrap();
        assert_eq!(
            content,
            "Comp : Prop : list-1 : 10\r\nComp : Prop : list-2 : 20\r\n"
        );
    }

    #[test]
    fn convert_objects_in_array() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("records.csv");
        let v = json!({"x": [{"y": 1}, {"y": 2}]});

        convert("Comp", "Prop", "", &v, &out);

        let content = fs::read_to_string(&out).unwrap();
        assert_eq!(
            content,
            "Comp : Prop : x-1-y : 1\r\nComp : Prop : x-2-y : 2\r\n"
        );
    }

    #[test]
    fn convert_empty_object_emits_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("records.csv");

        let stats = convert("Comp", "Prop", "", &json!({}), &out);

        assert_eq!(stats.record_count, 0);
        // no leaves means the file is never opened
        assert!(!out.exists());
    }

    #[test]
    fn convert_is_append_only() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("records.csv");
        let v = json!({"a": 1});

        convert("Comp", "Prop", "", &v, &out);
        convert("Comp", "Prop", "", &v, &out);

        let content = fs::read_to_string(&out).unwrap();
        assert_eq!(content, "Comp : Prop : a : 1\r\nComp : Prop : a : 1\r\n");
    }

    #[test]
    fn convert_with_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("records.csv");
        let v = json!({"a": 1});

        convert("Comp", "Prop", "root", &v, &out);

        let content = fs::read_to_string(&out).unwrap();
        assert_eq!(content, "Comp : Prop : root-a : 1\r\n");
    }

    #[test]
    fn convert_counts_leaf_types() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("records.csv");
        let v = json!({"a": 1, "b": "x", "c": [true, null]});

        let stats = convert("Comp", "Prop", "", &v, &out);

        assert_eq!(stats.record_count, 4);
        assert_eq!(stats.leaf_types_count.get("Number"), Some(&1));
        assert_eq!(stats.leaf_types_count.get("String"), Some(&1));
        assert_eq!(stats.leaf_types_count.get("Bool"), Some(&1));
        assert_eq!(stats.leaf_types_count.get("Null"), Some(&1));
    }

    #[test]
    fn convert_continues_past_write_failures() {
        let dir = tempfile::tempdir().unwrap();
        // the parent directory does not exist, so every append fails
        let out = dir.path().join("no_such_dir").join("records.csv");
        let v = json!({"a": 1, "b": 2, "c": 3});

        let sink = RecordSink::new(&out);
        let stats = convert_with_sink("Comp", "Prop", "", &v, &sink);

        assert_eq!(stats.record_count, 0);
        assert_eq!(
            stats.failed_records,
            vec!["a".to_string(), "b".to_string(), "c".to_string()]
        );
        assert_eq!(sink.errors.container.borrow().len(), 3);
    }
}
