use crate::constants::ISIS;
use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::Debug;

bitflags! {
    /// Represents a set of optional capabilities.
    ///
    /// Membership says nothing about the current build; the facade turns its build-time
    /// flags into a set with `asp::capabilities::enabled_set`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct CapabilitySet: u32 {
        const ISIS = 1 << 0;

        const ALL = Self::ISIS.bits();
    }
}

impl CapabilitySet {
    /// Every capability the workspace knows about, in reporting order.
    pub const KNOWN: &'static [(&'static str, Self)] = &[(ISIS, Self::ISIS)];

    /// Names of the capabilities contained in this set.
    #[must_use]
    pub fn names(self) -> Vec<&'static str> {
        Self::KNOWN.iter().filter(|(_, flag)| self.contains(*flag)).map(|(name, _)| *name).collect()
    }
}

impl From<&str> for CapabilitySet {
    fn from(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            ISIS => Self::ISIS,
            "all" | "*" => Self::ALL,
            _ => Self::empty(),
        }
    }
}

impl From<u32> for CapabilitySet {
    fn from(bits: u32) -> Self {
        Self::from_bits_truncate(bits)
    }
}

impl Serialize for CapabilitySet {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u32(self.bits())
    }
}

impl<'de> Deserialize<'de> for CapabilitySet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = u32::deserialize(deserializer)?;
        Ok(Self::from_bits_retain(bits))
    }
}

/// Presence of one capability in a particular build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CapabilityStatus {
    pub name: &'static str,
    pub present: bool,
}

impl CapabilityStatus {
    /// Human readable state (`present` / `absent`).
    #[must_use]
    pub const fn state(&self) -> &'static str {
        if self.present { "present" } else { "absent" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!(CapabilitySet::from("ISIS"), CapabilitySet::ISIS);
        assert_eq!(CapabilitySet::from(" isis "), CapabilitySet::ISIS);
        assert_eq!(CapabilitySet::from("*"), CapabilitySet::ALL);
        assert!(CapabilitySet::from("spice").is_empty());
    }

    #[test]
    fn names_follow_membership() {
        assert_eq!(CapabilitySet::ALL.names(), vec![ISIS]);
        assert!(CapabilitySet::empty().names().is_empty());
    }

    #[test]
    fn unknown_bits_are_truncated() {
        assert_eq!(CapabilitySet::from(0b1011), CapabilitySet::ISIS);
    }

    #[test]
    fn status_state_words() {
        let on = CapabilityStatus { name: ISIS, present: true };
        let off = CapabilityStatus { name: ISIS, present: false };
        assert_eq!(on.state(), "present");
        assert_eq!(off.state(), "absent");
    }
}
