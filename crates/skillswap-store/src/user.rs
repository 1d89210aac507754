//! User records: identity, display data, and the two skill sets.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::skill::{Skill, SkillKind, SkillSet};

// ═══════════════════════════════════════════════════════════════════════
//  Types
// ═══════════════════════════════════════════════════════════════════════

/// Opaque user identity (UUID v7, assigned at creation).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Allocate a fresh, time-ordered identity.
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Geographic position, as resolved by the caller's geocoder.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub long: f64,
}

impl Location {
    /// Build a location, or `None` when either coordinate is not finite.
    pub fn new(lat: f64, long: f64) -> Option<Self> {
        (lat.is_finite() && long.is_finite()).then_some(Self { lat, long })
    }
}

/// A registered (or about to be registered) user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Stable identity; documents without one get a fresh id on load.
    #[serde(default = "UserId::generate")]
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// City name as typed by the user.
    #[serde(default)]
    pub location_name: String,
    /// Resolved coordinates, if any.
    #[serde(default)]
    pub location: Option<Location>,
    /// Reference to the file the record originated from (profile photo).
    #[serde(default)]
    pub photo: String,
    /// Offered skills.
    #[serde(default)]
    pub skills: SkillSet,
    /// Wanted skills.
    #[serde(default)]
    pub interests: SkillSet,
}

impl UserRecord {
    /// Create a record with empty skill sets and a fresh identity.
    pub fn new(
        name: impl Into<String>,
        location_name: impl Into<String>,
        location: Option<Location>,
        photo: impl Into<String>,
    ) -> Self {
        Self {
            id: UserId::generate(),
            name: name.into(),
            location_name: location_name.into(),
            location,
            photo: photo.into(),
            skills: SkillSet::new(),
            interests: SkillSet::new(),
        }
    }

    /// Start a structured constructor for `name`.
    pub fn builder(name: impl Into<String>) -> UserRecordBuilder {
        UserRecordBuilder {
            record: Self::new(name, "", None, ""),
        }
    }

    /// The set selected by `kind`.
    pub fn skill_set(&self, kind: SkillKind) -> &SkillSet {
        match kind {
            SkillKind::Offered => &self.skills,
            SkillKind::Wanted => &self.interests,
        }
    }

    /// Mutable access to the set selected by `kind`.
    pub fn skill_set_mut(&mut self, kind: SkillKind) -> &mut SkillSet {
        match kind {
            SkillKind::Offered => &mut self.skills,
            SkillKind::Wanted => &mut self.interests,
        }
    }

    /// Add `skill` to the set selected by `kind`. Returns `true` if it changed.
    pub fn add(&mut self, kind: SkillKind, skill: Skill) -> bool {
        let changed = self.skill_set_mut(kind).insert(skill);
        debug!(user_id = %self.id, %kind, changed, "user.add");
        changed
    }

    /// Remove the skill named `name` from the set selected by `kind`.
    pub fn remove(&mut self, kind: SkillKind, name: &str) -> bool {
        let changed = self.skill_set_mut(kind).remove(name);
        debug!(user_id = %self.id, %kind, changed, "user.remove");
        changed
    }

    pub fn add_skill(&mut self, skill: Skill) -> bool {
        self.add(SkillKind::Offered, skill)
    }

    pub fn add_interest(&mut self, skill: Skill) -> bool {
        self.add(SkillKind::Wanted, skill)
    }

    pub fn remove_skill(&mut self, name: &str) -> bool {
        self.remove(SkillKind::Offered, name)
    }

    pub fn remove_interest(&mut self, name: &str) -> bool {
        self.remove(SkillKind::Wanted, name)
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Builder
// ═══════════════════════════════════════════════════════════════════════

/// Builder for [`UserRecord`] taking well-formed sequences of skill names.
#[derive(Debug, Clone)]
pub struct UserRecordBuilder {
    record: UserRecord,
}

impl UserRecordBuilder {
    pub fn location_name(mut self, location_name: impl Into<String>) -> Self {
        self.record.location_name = location_name.into();
        self
    }

    pub fn location(mut self, location: Option<Location>) -> Self {
        self.record.location = location;
        self
    }

    pub fn photo(mut self, photo: impl Into<String>) -> Self {
        self.record.photo = photo.into();
        self
    }

    /// Offered skills; duplicates collapse.
    pub fn skills<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            self.record.skills.insert(Skill::new(name));
        }
        self
    }

    /// Wanted skills; duplicates collapse.
    pub fn interests<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            self.record.interests.insert(Skill::new(name));
        }
        self
    }

    pub fn build(self) -> UserRecord {
        self.record
    }
}

// ── tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_record_is_empty_with_fresh_id() {
        let a = UserRecord::new("Alex", "Brisbane", Location::new(-27.47, 153.02), "alex.png");
        let b = UserRecord::new("Alex", "Brisbane", None, "");
        assert_ne!(a.id, b.id);
        assert!(a.skills.is_empty());
        assert!(a.interests.is_empty());
        assert_eq!(a.location, Some(Location { lat: -27.47, long: 153.02 }));
    }

    #[test]
    fn non_finite_coordinates_mean_no_location() {
        assert!(Location::new(f64::NAN, 0.0).is_none());
        assert!(Location::new(0.0, f64::INFINITY).is_none());
        assert!(Location::new(0.0, 0.0).is_some());
    }

    #[test]
    fn same_skill_may_be_offered_and_wanted() {
        let mut user = UserRecord::builder("Casey").build();
        assert!(user.add_skill(Skill::new("French")));
        assert!(user.add_interest(Skill::new("French")));
        assert!(user.skills.contains("French"));
        assert!(user.interests.contains("French"));
    }

    #[test]
    fn builder_collapses_duplicate_names() {
        let user = UserRecord::builder("Drew")
            .location_name("Sydney")
            .skills(["French", "French", "Chess"])
            .interests(["Graphic Design"])
            .build();
        assert_eq!(user.skills.names(), vec!["French", "Chess"]);
        assert_eq!(user.interests.names(), vec!["Graphic Design"]);
        assert_eq!(user.location_name, "Sydney");
    }

    #[test]
    fn kind_selects_set() {
        let mut user = UserRecord::builder("Ben").build();
        user.add(SkillKind::Wanted, Skill::new("Chinese"));
        assert!(user.skill_set(SkillKind::Offered).is_empty());
        assert_eq!(user.skill_set(SkillKind::Wanted).len(), 1);
        assert!(user.remove(SkillKind::Wanted, "Chinese"));
        assert!(!user.remove(SkillKind::Wanted, "Chinese"));
    }
}
