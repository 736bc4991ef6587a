//! Diffing of child lines (invoice lines, declaration lines, accessories) against their
//! persisted state.
//!
//! Editors keep unsaved lines under a temporary client-generated id, usually a string or a
//! timestamp. Only an id that matches a persisted line of the same parent counts as an update;
//! everything else is inserted.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Id carried by an incoming line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LineId {
    Persisted(i32),
    Temporary(serde_json::Value),
}

impl LineId {
    pub fn persisted(&self) -> Option<i32> {
        match self {
            LineId::Persisted(id) => Some(*id),
            LineId::Temporary(_) => None,
        }
    }
}

pub trait PersistedLine {
    fn line_id(&self) -> i32;
}

/// An incoming line that can be compared with the persisted line it targets.
pub trait IncomingLine<P> {
    fn line_id(&self) -> Option<i32>;

    /// True when saving this line over `persisted` would change any stored field.
    fn differs_from(&self, persisted: &P) -> bool;
}

#[derive(Debug)]
pub struct LineDiff<'a, I> {
    pub inserts: Vec<&'a I>,
    pub updates: Vec<(i32, &'a I)>,
    pub deletes: Vec<i32>,
    pub unchanged: Vec<i32>,
}

impl<I> LineDiff<'_, I> {
    pub fn is_noop(&self) -> bool {
        self.inserts.is_empty() && self.updates.is_empty() && self.deletes.is_empty()
    }
}

pub fn diff_lines<'a, P, I>(persisted: &[P], incoming: &'a [I]) -> LineDiff<'a, I>
where
    P: PersistedLine,
    I: IncomingLine<P>,
{
    let by_id: HashMap<i32, &P> = persisted.iter().map(|p| (p.line_id(), p)).collect();
    let mut kept = HashSet::new();
    let mut diff = LineDiff {
        inserts: Vec::new(),
        updates: Vec::new(),
        deletes: Vec::new(),
        unchanged: Vec::new(),
    };

    for line in incoming {
        // A repeated id is only honoured once; later copies become new lines.
        match line
            .line_id()
            .and_then(|id| by_id.get(&id).map(|p| (id, *p)))
            .filter(|(id, _)| !kept.contains(id))
        {
            Some((id, current)) => {
                kept.insert(id);
                if line.differs_from(current) {
                    diff.updates.push((id, line));
                } else {
                    diff.unchanged.push(id);
                }
            }
            None => diff.inserts.push(line),
        }
    }

    diff.deletes = persisted
        .iter()
        .map(PersistedLine::line_id)
        .filter(|id| !kept.contains(id))
        .collect();
    diff
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, PartialEq)]
    struct Stored {
        id: i32,
        qty: i32,
    }

    #[derive(Debug, Deserialize)]
    struct Edit {
        id: Option<LineId>,
        qty: i32,
    }

    impl PersistedLine for Stored {
        fn line_id(&self) -> i32 {
            self.id
        }
    }

    impl IncomingLine<Stored> for Edit {
        fn line_id(&self) -> Option<i32> {
            self.id.as_ref().and_then(LineId::persisted)
        }

        fn differs_from(&self, persisted: &Stored) -> bool {
            self.qty != persisted.qty
        }
    }

    fn edits(value: serde_json::Value) -> Vec<Edit> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn removed_line_is_deleted_and_untouched_lines_stay_unchanged() {
        let stored = vec![Stored { id: 1, qty: 5 }, Stored { id: 2, qty: 7 }];
        let incoming = edits(json!([{ "id": 1, "qty": 5 }]));
        let diff = diff_lines(&stored, &incoming);
        assert_eq!(diff.deletes, vec![2]);
        assert_eq!(diff.unchanged, vec![1]);
        assert!(diff.updates.is_empty());
        assert!(diff.inserts.is_empty());
    }

    #[test]
    fn temporary_and_unknown_ids_are_inserts() {
        let stored = vec![Stored { id: 1, qty: 5 }];
        let incoming = edits(json!([
            { "id": "tmp-1", "qty": 1 },
            { "id": 1718000000000u64, "qty": 2 },
            { "id": 99, "qty": 3 },
            { "qty": 4 },
            { "id": 1, "qty": 6 }
        ]));
        let diff = diff_lines(&stored, &incoming);
        assert_eq!(diff.inserts.len(), 4);
        assert_eq!(diff.updates.len(), 1);
        assert_eq!(diff.updates[0].0, 1);
        assert!(diff.deletes.is_empty());
    }

    #[test]
    fn duplicated_id_updates_once_and_inserts_the_rest() {
        let stored = vec![Stored { id: 3, qty: 1 }];
        let incoming = edits(json!([{ "id": 3, "qty": 1 }, { "id": 3, "qty": 2 }]));
        let diff = diff_lines(&stored, &incoming);
        assert_eq!(diff.unchanged, vec![3]);
        assert_eq!(diff.inserts.len(), 1);
        assert!(!diff.is_noop());
    }
}
