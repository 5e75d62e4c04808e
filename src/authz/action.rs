use serde::{Deserialize, Serialize};
use std::fmt;

/// Entry of the lead-row action menu. Declaration order is display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKey {
    View,
    Edit,
    Duplicate,
    Assign,
    Status,
    Timeline,
    Disbursement,
    Delete,
}

impl ActionKey {
    /// Every action, in display order.
    pub const ALL: [ActionKey; 8] = [
        ActionKey::View,
        ActionKey::Edit,
        ActionKey::Duplicate,
        ActionKey::Assign,
        ActionKey::Status,
        ActionKey::Timeline,
        ActionKey::Disbursement,
        ActionKey::Delete,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ActionKey::View => "view",
            ActionKey::Edit => "edit",
            ActionKey::Duplicate => "duplicate",
            ActionKey::Assign => "assign",
            ActionKey::Status => "status",
            ActionKey::Timeline => "timeline",
            ActionKey::Disbursement => "disbursement",
            ActionKey::Delete => "delete",
        }
    }

    /// Capitalized key, the label of every context-free action.
    pub fn default_label(self) -> &'static str {
        match self {
            ActionKey::View => "View",
            ActionKey::Edit => "Edit",
            ActionKey::Duplicate => "Duplicate",
            ActionKey::Assign => "Assign",
            ActionKey::Status => "Status",
            ActionKey::Timeline => "Timeline",
            ActionKey::Disbursement => "Disbursement",
            ActionKey::Delete => "Delete",
        }
    }

    fn bit(self) -> u8 {
        1 << self as u8
    }
}

impl fmt::Display for ActionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A permitted menu entry with its resolved label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Action {
    pub key: ActionKey,
    pub label: &'static str,
}

/// Set of action keys that always iterates in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActionSet(u8);

impl ActionSet {
    pub fn empty() -> Self {
        ActionSet(0)
    }

    pub fn all() -> Self {
        Self::from_keys(&ActionKey::ALL)
    }

    pub fn from_keys(keys: &[ActionKey]) -> Self {
        let mut set = Self::empty();
        for key in keys {
            set.insert(*key);
        }
        set
    }

    pub fn insert(&mut self, key: ActionKey) {
        self.0 |= key.bit();
    }

    pub fn remove(&mut self, key: ActionKey) {
        self.0 &= !key.bit();
    }

    pub fn remove_all(&mut self, keys: &[ActionKey]) {
        for key in keys {
            self.remove(*key);
        }
    }

    pub fn contains(&self, key: ActionKey) -> bool {
        self.0 & key.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(&self) -> impl Iterator<Item = ActionKey> + '_ {
        ActionKey::ALL.into_iter().filter(|key| self.contains(*key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_contains_every_key_in_order() {
        let keys: Vec<_> = ActionSet::all().iter().collect();
        assert_eq!(keys, ActionKey::ALL.to_vec());
        assert_eq!(ActionSet::all().len(), 8);
    }

    #[test]
    fn insert_order_does_not_affect_iteration() {
        let set = ActionSet::from_keys(&[ActionKey::Delete, ActionKey::View, ActionKey::Status]);
        let keys: Vec<_> = set.iter().collect();
        assert_eq!(keys, vec![ActionKey::View, ActionKey::Status, ActionKey::Delete]);
    }

    #[test]
    fn remove_is_idempotent() {
        let mut set = ActionSet::all();
        set.remove(ActionKey::Edit);
        set.remove(ActionKey::Edit);
        assert!(!set.contains(ActionKey::Edit));
        assert_eq!(set.len(), 7);
    }

    #[test]
    fn remove_all_empties_set() {
        let mut set = ActionSet::all();
        set.remove_all(&ActionKey::ALL);
        assert!(set.is_empty());
        assert_eq!(set, ActionSet::empty());
    }

    #[test]
    fn keys_serialize_as_wire_names() {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        writer.serialize(ActionKey::ALL).unwrap();
        let text = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        let expected: Vec<_> = ActionKey::ALL.iter().map(|k| k.as_str()).collect();
        assert_eq!(text, format!("{}\n", expected.join(",")));
    }

    #[test]
    fn default_labels_capitalize_key() {
        for key in ActionKey::ALL {
            let label = key.default_label();
            assert_eq!(label.to_lowercase(), key.as_str());
            assert!(label.starts_with(|c: char| c.is_ascii_uppercase()));
        }
    }
}
