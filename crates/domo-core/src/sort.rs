//! Generic sort utility for table rows
//!
//! Reused across the entity tables: a per-column tri-state toggle plus a
//! comparator over JSON rows. The sort is stable and applies no secondary
//! tie-break key, so equal rows keep their prior relative order.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Sort direction for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Current sort state of a table: at most one active column.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SortState {
    /// Active column key, `None` when unsorted
    pub key: Option<String>,
    /// Direction for the active column
    pub direction: SortDirection,
}

/// Cycle the sort state for a column click:
/// unsorted -> ascending -> descending -> unsorted. Clicking a different
/// column resets to that column ascending.
pub fn toggle_sort(state: &SortState, key: &str) -> SortState {
    match (&state.key, state.direction) {
        (Some(current), SortDirection::Asc) if current == key => SortState {
            key: Some(key.to_string()),
            direction: SortDirection::Desc,
        },
        (Some(current), SortDirection::Desc) if current == key => SortState::default(),
        _ => SortState {
            key: Some(key.to_string()),
            direction: SortDirection::Asc,
        },
    }
}

/// Compare two JSON values: booleans as 0/1, numbers numerically,
/// everything else as case-insensitive strings.
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        _ => {
            let x = stringify(a).to_lowercase();
            let y = stringify(b).to_lowercase();
            x.cmp(&y)
        }
    }
}

fn stringify(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Sort rows in place by the state's active column.
///
/// Missing/null cells always order toward the end, in both directions.
/// No-op when the state has no active column.
pub fn sort_rows(rows: &mut [Value], state: &SortState) {
    let Some(key) = state.key.as_deref() else {
        return;
    };
    let dir = state.direction;
    rows.sort_by(|a, b| {
        let va = a.get(key).filter(|v| !v.is_null());
        let vb = b.get(key).filter(|v| !v.is_null());
        match (va, vb) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(x), Some(y)) => {
                let ord = compare_values(x, y);
                match dir {
                    SortDirection::Asc => ord,
                    SortDirection::Desc => ord.reverse(),
                }
            }
        }
    });
}
