//! Skill value type and the de-duplicating sets that hold it.
//!
//! A [`Skill`] is a pure value: two skills are equal iff their names are
//! equal (exact, case-sensitive match). The same type is used for both
//! "things offered" and "things wanted"; [`SkillKind`] selects which set
//! of a user record an operation touches.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

// ═══════════════════════════════════════════════════════════════════════
//  Skill
// ═══════════════════════════════════════════════════════════════════════

/// A named skill. Serialized as a bare JSON string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Skill {
    name: String,
}

impl Skill {
    /// Create a skill with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The skill's name, which is also its identity.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Consume the skill and return its name.
    pub fn into_name(self) -> String {
        self.name
    }
}

impl fmt::Display for Skill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl From<&str> for Skill {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Skill {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

/// Wire forms accepted for a skill: `"Guitar"` or the older `{"name": "Guitar"}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum SkillRepr {
    Bare(String),
    Object { name: String },
}

impl<'de> Deserialize<'de> for Skill {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = match SkillRepr::deserialize(deserializer)? {
            SkillRepr::Bare(name) | SkillRepr::Object { name } => name,
        };
        Ok(Self { name })
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  SkillKind
// ═══════════════════════════════════════════════════════════════════════

/// Which of a user's two skill sets an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkillKind {
    /// Skills the user can teach (`skills` on the wire).
    Offered,
    /// Skills the user wants to learn (`interests` on the wire).
    Wanted,
}

impl SkillKind {
    /// Short label used in log fields.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Offered => "skill",
            Self::Wanted => "interest",
        }
    }
}

impl fmt::Display for SkillKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  SkillSet
// ═══════════════════════════════════════════════════════════════════════

/// Insertion-ordered set of skills, unique by value.
///
/// Sets are small (a handful of entries per user), so membership is a
/// linear scan over a `Vec`, which also keeps the persisted order stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SkillSet {
    items: Vec<Skill>,
}

impl SkillSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `skill` unless a value-equal skill is present.
    ///
    /// Returns `true` if the set changed.
    pub fn insert(&mut self, skill: Skill) -> bool {
        if self.contains(skill.name()) {
            return false;
        }
        self.items.push(skill);
        true
    }

    /// Remove the skill named `name`.
    ///
    /// Returns `true` if the set changed; removing an absent name is a no-op.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|s| s.name() != name);
        self.items.len() != before
    }

    /// Check whether a skill named `name` is present.
    pub fn contains(&self, name: &str) -> bool {
        self.items.iter().any(|s| s.name() == name)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Skill> {
        self.items.iter()
    }

    /// Names in insertion order.
    pub fn names(&self) -> Vec<&str> {
        self.items.iter().map(Skill::name).collect()
    }
}

impl FromIterator<Skill> for SkillSet {
    fn from_iter<I: IntoIterator<Item = Skill>>(iter: I) -> Self {
        let mut set = Self::new();
        for skill in iter {
            set.insert(skill);
        }
        set
    }
}

impl<'a> IntoIterator for &'a SkillSet {
    type Item = &'a Skill;
    type IntoIter = std::slice::Iter<'a, Skill>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<'de> Deserialize<'de> for SkillSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let items = Vec::<Skill>::deserialize(deserializer)?;
        Ok(items.into_iter().collect())
    }
}

// ── tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skills_compare_by_name() {
        assert_eq!(Skill::new("Guitar"), Skill::from("Guitar"));
        assert_ne!(Skill::new("Guitar"), Skill::new("guitar"));
    }

    #[test]
    fn insert_is_idempotent() {
        let mut set = SkillSet::new();
        assert!(set.insert(Skill::new("Guitar")));
        assert!(!set.insert(Skill::new("Guitar")));
        assert_eq!(set.len(), 1);
        assert_eq!(set.names(), vec!["Guitar"]);
    }

    #[test]
    fn remove_absent_is_noop() {
        let mut set: SkillSet = ["a", "b"].into_iter().map(Skill::from).collect();
        assert!(!set.remove("c"));
        assert_eq!(set.names(), vec!["a", "b"]);

        assert!(set.remove("a"));
        assert_eq!(set.names(), vec!["b"]);
        assert!(!set.contains("a"));
    }

    #[test]
    fn keeps_insertion_order() {
        let set: SkillSet = ["surfing", "chinese", "french"]
            .into_iter()
            .map(Skill::from)
            .collect();
        assert_eq!(set.names(), vec!["surfing", "chinese", "french"]);
    }

    #[test]
    fn serializes_as_plain_names() {
        let set: SkillSet = ["Guitar", "Chess"].into_iter().map(Skill::from).collect();
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"["Guitar","Chess"]"#);
    }

    #[test]
    fn deserializes_legacy_objects_and_collapses_duplicates() {
        let set: SkillSet =
            serde_json::from_str(r#"[{"name":"skilla"},"skillb",{"name":"skilla"}]"#).unwrap();
        assert_eq!(set.names(), vec!["skilla", "skillb"]);
    }

    #[test]
    fn kind_labels() {
        assert_eq!(SkillKind::Offered.to_string(), "skill");
        assert_eq!(SkillKind::Wanted.as_str(), "interest");
    }
}
