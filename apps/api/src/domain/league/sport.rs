use serde::Serialize;
use uuid::Uuid;

use crate::domain::errors::{require_text, DomainResult};

/// A sport offered by the organisation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sport {
    pub id: Uuid,
    pub name: String,
    pub description: String,
}

impl Sport {
    pub fn new(name: &str, description: &str) -> DomainResult<Self> {
        Ok(Self {
            id: Uuid::new_v4(),
            name: require_text(name, "Sport name")?,
            description: description.trim().to_string(),
        })
    }
}

/// A skill or age bracket within a sport, reusable across leagues
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Division {
    pub id: Uuid,
    pub sport_id: Uuid,
    pub name: String,
    pub skill_level: String,
    pub age_group: String,
}

impl Division {
    pub fn new(sport_id: Uuid, name: &str, skill_level: &str, age_group: &str) -> DomainResult<Self> {
        Ok(Self {
            id: Uuid::new_v4(),
            sport_id,
            name: require_text(name, "Division name")?,
            skill_level: skill_level.trim().to_string(),
            age_group: age_group.trim().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sport_requires_name() {
        assert!(Sport::new("", "desc").is_err());
        assert_eq!(Sport::new(" Soccer ", "").unwrap().name, "Soccer");
    }

    #[test]
    fn division_keeps_sport() {
        let sport = Sport::new("Hockey", "").unwrap();
        let division = Division::new(sport.id, "U12", "Beginner", "10-12").unwrap();
        assert_eq!(division.sport_id, sport.id);
        assert_eq!(division.age_group, "10-12");
    }
}
