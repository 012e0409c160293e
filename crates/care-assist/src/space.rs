//! Knowledge space bookkeeping for a single session
//!
//! Spaces are loaded once from a scenario and never created or destroyed
//! afterwards. The only mutation is switching a space on, which is monotonic:
//! nothing in the assistant ever switches one off again.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{Result, SessionError};
use crate::types::{KnowledgeSpace, SpaceKind};

/// Tag carried by the spaces that make up the cardiology pairing.
pub const CARDIOLOGY_TAG: &str = "cardiology";

/// The three categorized space lists of a session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpaceSet {
    personal: Vec<KnowledgeSpace>,
    organization: Vec<KnowledgeSpace>,
    shared: Vec<KnowledgeSpace>,
}

impl SpaceSet {
    pub fn new(
        personal: Vec<KnowledgeSpace>,
        organization: Vec<KnowledgeSpace>,
        shared: Vec<KnowledgeSpace>,
    ) -> Result<Self> {
        let set = Self {
            personal,
            organization,
            shared,
        };

        let mut seen = HashSet::new();
        for space in set.all() {
            if !seen.insert(space.id.as_str()) {
                return Err(SessionError::DuplicateSpace(space.id.clone()));
            }
        }
        Ok(set)
    }

    pub fn is_empty(&self) -> bool {
        self.personal.is_empty() && self.organization.is_empty() && self.shared.is_empty()
    }

    pub fn personal(&self) -> &[KnowledgeSpace] {
        &self.personal
    }

    pub fn organization(&self) -> &[KnowledgeSpace] {
        &self.organization
    }

    pub fn shared(&self) -> &[KnowledgeSpace] {
        &self.shared
    }

    pub fn of_kind(&self, kind: SpaceKind) -> &[KnowledgeSpace] {
        match kind {
            SpaceKind::Personal => &self.personal,
            SpaceKind::Organization => &self.organization,
            SpaceKind::Shared => &self.shared,
        }
    }

    /// Personal, then organization, then shared.
    pub fn all(&self) -> impl Iterator<Item = &KnowledgeSpace> {
        self.personal
            .iter()
            .chain(self.organization.iter())
            .chain(self.shared.iter())
    }

    pub fn get(&self, space_id: &str) -> Option<&KnowledgeSpace> {
        self.all().find(|s| s.id == space_id)
    }

    pub fn contains(&self, space_id: &str) -> bool {
        self.get(space_id).is_some()
    }

    pub fn active(&self, kind: SpaceKind) -> Vec<&KnowledgeSpace> {
        self.of_kind(kind).iter().filter(|s| s.is_active).collect()
    }

    pub fn active_all(&self) -> Vec<&KnowledgeSpace> {
        self.all().filter(|s| s.is_active).collect()
    }

    pub fn any_active(&self, kind: SpaceKind) -> bool {
        self.of_kind(kind).iter().any(|s| s.is_active)
    }

    pub fn ids(&self, kind: SpaceKind) -> Vec<String> {
        self.of_kind(kind).iter().map(|s| s.id.clone()).collect()
    }

    pub fn tagged(&self, tag: &str) -> Vec<&KnowledgeSpace> {
        self.all().filter(|s| s.has_tag(tag)).collect()
    }

    pub fn is_tagged_active(&self, tag: &str) -> bool {
        self.all().any(|s| s.is_active && s.has_tag(tag))
    }

    /// Return a copy of the set with every listed space switched on.
    ///
    /// Every id must exist; on error the original set is left untouched.
    pub fn activated<S: AsRef<str>>(&self, space_ids: &[S]) -> Result<Self> {
        if let Some(missing) = space_ids.iter().find(|id| !self.contains(id.as_ref())) {
            return Err(SessionError::UnknownSpace(missing.as_ref().to_string()));
        }

        let mut next = self.clone();
        for list in [&mut next.personal, &mut next.organization, &mut next.shared] {
            for space in list.iter_mut() {
                if space_ids.iter().any(|id| id.as_ref() == space.id) {
                    space.is_active = true;
                }
            }
        }
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SpaceSet {
        SpaceSet::new(
            vec![
                KnowledgeSpace::new("p1", "My Clinical Notes", SpaceKind::Personal, true, 47, ""),
                KnowledgeSpace::new("p2", "Saved Research", SpaceKind::Personal, false, 23, ""),
            ],
            vec![
                KnowledgeSpace::new(
                    "o1",
                    "Emergency Medicine Protocols",
                    SpaceKind::Organization,
                    false,
                    156,
                    "",
                ),
                KnowledgeSpace::new(
                    "o2",
                    "Critical Care Guidelines",
                    SpaceKind::Organization,
                    false,
                    89,
                    "",
                ),
            ],
            vec![KnowledgeSpace::new("s1", "Cardiology", SpaceKind::Shared, false, 12, "")
                .with_tag(CARDIOLOGY_TAG)],
        )
        .unwrap()
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let result = SpaceSet::new(
            vec![KnowledgeSpace::new("x", "A", SpaceKind::Personal, true, 1, "")],
            vec![KnowledgeSpace::new("x", "B", SpaceKind::Organization, false, 2, "")],
            vec![],
        );
        assert!(matches!(result, Err(SessionError::DuplicateSpace(id)) if id == "x"));
    }

    #[test]
    fn test_activation_preserves_identity() {
        let set = sample();
        let next = set.activated(&["o2"]).unwrap();

        let before = set.get("o2").unwrap();
        let after = next.get("o2").unwrap();
        assert!(!before.is_active);
        assert!(after.is_active);
        assert_eq!(before.id, after.id);
        assert_eq!(before.name, after.name);
        assert_eq!(before.document_count, after.document_count);
        assert!(!next.get("o1").unwrap().is_active);
    }

    #[test]
    fn test_activation_is_idempotent() {
        let set = sample();
        let org = set.ids(SpaceKind::Organization);
        let once = set.activated(org.as_slice()).unwrap();
        let twice = once.activated(org.as_slice()).unwrap();
        assert_eq!(once, twice);
        assert_eq!(twice.active(SpaceKind::Organization).len(), 2);
    }

    #[test]
    fn test_unknown_space_leaves_set_untouched() {
        let set = sample();
        let err = set.activated(&["o1", "nope"]).unwrap_err();
        assert!(matches!(err, SessionError::UnknownSpace(id) if id == "nope"));
        assert!(!set.any_active(SpaceKind::Organization));
    }

    #[test]
    fn test_tag_queries() {
        let set = sample();
        assert!(!set.is_tagged_active(CARDIOLOGY_TAG));
        let next = set.activated(&["s1"]).unwrap();
        assert!(next.is_tagged_active(CARDIOLOGY_TAG));
        assert_eq!(next.tagged(CARDIOLOGY_TAG).len(), 1);
        assert_eq!(next.active_all().len(), 2);
    }
}
