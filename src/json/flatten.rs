use serde_json::Value;

/// A borrowed leaf value paired with the path segments leading to it from
/// the document root.
#[derive(Debug, Clone, PartialEq)]
pub struct LeafPath<'a> {
    pub value: &'a Value,
    pub path: Vec<String>,
}

impl<'a> LeafPath<'a> {
    pub fn new(value: &'a Value, path: Option<Vec<String>>) -> LeafPath<'a> {
        let path = path.unwrap_or_default();
        LeafPath { value, path }
    }

    /// Seeds the path with a caller-supplied prefix. An empty prefix keeps
    /// the path empty so keys never pick up a leading separator.
    pub fn with_prefix(value: &'a Value, prefix: &str) -> LeafPath<'a> {
        let path = if prefix.is_empty() {
            Vec::new()
        } else {
            vec![prefix.to_string()]
        };
        LeafPath { value, path }
    }

    /// Hyphen-joined key for this path. Hyphens inside original field names
    /// are indistinguishable from the separator in the joined key; that
    /// ambiguity is part of the output contract.
    pub fn flat_key(&self) -> String {
        self.path.join("-")
    }

    pub fn child(&self, segment: impl FlatKeySegment, value: &'a Value) -> LeafPath<'a> {
        let mut child_path = self.path.to_vec();
        child_path.push(segment.flat_segment());
        LeafPath {
            value,
            path: child_path,
        }
    }

    /// Depth-first traversal collecting one [`LeafPath`] per scalar value.
    /// Objects and arrays contribute path segments but no leaves of their
    /// own, so empty containers yield nothing.
    pub fn leaf_paths(self) -> Vec<LeafPath<'a>> {
        let mut leaves = Vec::new();

        match self.value {
            Value::Object(map) => {
                for (k, v) in map {
                    let inner = self.child(k, v).leaf_paths();
                    leaves.extend(inner)
                }
            }
            Value::Array(array) => {
                for (i, v) in array.iter().enumerate() {
                    let inner = self.child(i, v).leaf_paths();
                    leaves.extend(inner)
                }
            }
            Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {
                leaves.push(self)
            }
        }
        leaves
    }
}

/// Rendering of one path segment within a flat key: object field names
/// verbatim, array indices 1-based.
pub trait FlatKeySegment {
    fn flat_segment(&self) -> String;
}

impl FlatKeySegment for usize {
    fn flat_segment(&self) -> String {
        (self + 1).to_string()
    }
}

impl FlatKeySegment for str {
    fn flat_segment(&self) -> String {
        self.to_string()
    }
}

impl FlatKeySegment for String {
    fn flat_segment(&self) -> String {
        self.to_string()
    }
}

impl<'a, T> FlatKeySegment for &'a T
where
    T: ?Sized + FlatKeySegment,
{
    fn flat_segment(&self) -> String {
        (**self).flat_segment()
    }
}

pub trait LeafPaths {
    fn leaf_paths(&self) -> Vec<LeafPath>;
}

impl LeafPaths for Value {
    fn leaf_paths(&self) -> Vec<LeafPath> {
        let base_leafpath = LeafPath::new(self, None);
        base_leafpath.leaf_paths()
    }
}
