use serde::{Deserialize, Serialize};
use std::fmt;

/// Most door people a single show takes.
pub const MAX_DOOR: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Venue {
    Stowaway,
    Citizen,
}

impl Venue {
    pub const ALL: [Venue; 2] = [Venue::Stowaway, Venue::Citizen];

    pub fn as_str(&self) -> &'static str {
        match self {
            Venue::Stowaway => "Stowaway",
            Venue::Citizen => "Citizen",
        }
    }
}

impl fmt::Display for Venue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One night at one venue. `date` is the availability fragment exactly as
/// it appeared in the table, e.g. "Wed October 2 2025".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Show {
    pub date: String,
    pub venue: Venue,
}

impl Show {
    pub fn new(date: impl Into<String>, venue: Venue) -> Self {
        Self {
            date: date.into(),
            venue,
        }
    }

    pub fn key(&self) -> ShowKey {
        ShowKey(format!("{} | {}", self.date, self.venue))
    }
}

/// `"<date> | <venue>"`, the map key assignments are stored under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShowKey(pub String);

impl ShowKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&Show> for ShowKey {
    fn from(show: &Show) -> Self {
        show.key()
    }
}

impl From<&str> for ShowKey {
    fn from(s: &str) -> Self {
        ShowKey(s.to_string())
    }
}

/// Who runs a show. An empty `host` means nobody yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub door: Vec<String>,
}

impl Assignment {
    pub fn has_host(&self) -> bool {
        !self.host.trim().is_empty()
    }

    pub fn has_door(&self) -> bool {
        !self.door.is_empty()
    }

    pub fn door_full(&self) -> bool {
        self.door.len() >= MAX_DOOR
    }

    /// True when `name` holds either role on this show.
    pub fn involves(&self, name: &str) -> bool {
        (!self.host.is_empty() && self.host == name) || self.door.iter().any(|d| d == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Host,
    Door,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Host => "Host",
            Role::Door => "Door",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn show_key_format() {
        let show = Show::new("Wed October 2 2025", Venue::Stowaway);
        assert_eq!(show.key().as_str(), "Wed October 2 2025 | Stowaway");
        assert_eq!(
            ShowKey::from(&Show::new("Thu October 3 2025", Venue::Citizen)).to_string(),
            "Thu October 3 2025 | Citizen"
        );
    }

    #[test]
    fn assignment_decodes_with_missing_fields() {
        let a: Assignment = serde_json::from_str(r#"{"host":"Alice Smith"}"#).unwrap();
        assert_eq!(a.host, "Alice Smith");
        assert!(a.door.is_empty());
        assert!(!Assignment::default().has_host());
        assert!(!Assignment {
            host: "   ".into(),
            door: vec![]
        }
        .has_host());
    }
}
