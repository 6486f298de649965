use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One changed leaf between two configuration snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigDiff {
    pub path: String,
    pub old: Option<Value>,
    pub new: Option<Value>,
}

/// Flatten a document into `a.b` / `a[0]` leaf paths.
pub fn flatten(document: &Value) -> BTreeMap<String, Value> {
    let mut leaves = BTreeMap::new();
    flatten_into(document, String::new(), &mut leaves);
    leaves
}

fn flatten_into(value: &Value, prefix: String, leaves: &mut BTreeMap<String, Value>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten_into(child, path, leaves);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                flatten_into(child, format!("{prefix}[{index}]"), leaves);
            }
        }
        leaf => {
            leaves.insert(prefix, leaf.clone());
        }
    }
}

/// Path-by-path comparison, sorted by path. A missing side is `None`.
pub fn diff_snapshots(before: Option<&Value>, after: Option<&Value>) -> Vec<ConfigDiff> {
    let old = before.map(flatten).unwrap_or_default();
    let new = after.map(flatten).unwrap_or_default();

    let mut paths: Vec<&String> = old.keys().chain(new.keys()).collect();
    paths.sort();
    paths.dedup();

    paths
        .into_iter()
        .filter_map(|path| {
            let old_value = old.get(path);
            let new_value = new.get(path);
            (!same_leaf(old_value, new_value)).then(|| ConfigDiff {
                path: path.clone(),
                old: old_value.cloned(),
                new: new_value.cloned(),
            })
        })
        .collect()
}

/// Numbers compare by value so `1` and `1.0` are not reported as a change.
fn same_leaf(left: Option<&Value>, right: Option<&Value>) -> bool {
    match (left, right) {
        (Some(Value::Number(a)), Some(Value::Number(b))) => match (a.as_f64(), b.as_f64()) {
            (Some(a), Some(b)) => a == b,
            _ => a == b,
        },
        (left, right) => left == right,
    }
}
