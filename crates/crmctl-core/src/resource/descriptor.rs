// ── Resource descriptors ──

use std::fmt;

/// Identifies a CRUD-capable entity class: its URL segment and cache tag type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceDescriptor {
    /// Path segment and registry key, e.g. `lead`.
    pub name: &'static str,
    /// Cache tag type, e.g. `Lead`.
    pub tag_type: &'static str,
}

impl ResourceDescriptor {
    pub const USER: Self = Self::new("user", "User");
    pub const ROLE: Self = Self::new("role", "Role");
    pub const LEAD: Self = Self::new("lead", "Lead");
    pub const CONTACT: Self = Self::new("contact", "Contact");
    pub const PIPELINE: Self = Self::new("pipeline", "Pipeline");
    pub const STAGE: Self = Self::new("stage", "Stage");
    pub const FILTER: Self = Self::new("filter", "Filter");

    /// Every resource the backend exposes, in menu order.
    pub const ALL: [Self; 7] = [
        Self::USER,
        Self::ROLE,
        Self::LEAD,
        Self::CONTACT,
        Self::PIPELINE,
        Self::STAGE,
        Self::FILTER,
    ];

    pub const fn new(name: &'static str, tag_type: &'static str) -> Self {
        Self { name, tag_type }
    }

    pub fn by_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.name == name)
    }
}

impl fmt::Display for ResourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_and_tags_are_unique() {
        for (i, a) in ResourceDescriptor::ALL.iter().enumerate() {
            for b in &ResourceDescriptor::ALL[i + 1..] {
                assert_ne!(a.name, b.name);
                assert_ne!(a.tag_type, b.tag_type);
            }
        }
    }

    #[test]
    fn lookup_by_name() {
        assert_eq!(ResourceDescriptor::by_name("stage"), Some(ResourceDescriptor::STAGE));
        assert_eq!(ResourceDescriptor::by_name("Stage"), None);
    }
}
