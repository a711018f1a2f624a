use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::player::PersonalDetails;

/// Everything needed to create the player and registration once paid
///
/// Travels through the payment provider as session metadata, so it must
/// survive a round trip through string key/value pairs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutMetadata {
    pub player: PersonalDetails,
    pub notes: String,
    pub league_id: Uuid,
    pub division_id: Uuid,
    pub is_late_registration: bool,
}

const PLAYER_DATA: &str = "player_data";
const LEAGUE_ID: &str = "league_id";
const DIVISION_ID: &str = "division_id";
const IS_LATE: &str = "is_late_registration";

#[derive(Serialize, Deserialize)]
struct PlayerData {
    #[serde(flatten)]
    player: PersonalDetails,
    #[serde(default)]
    notes: String,
}

/// Longest metadata value the payment provider accepts, in characters
pub const METADATA_VALUE_LIMIT: usize = 500;

fn encode_player_data(player: &PersonalDetails, notes: &str) -> DomainResult<String> {
    serde_json::to_string(&PlayerData {
        player: player.clone(),
        notes: notes.to_string(),
    })
    .map_err(|e| DomainError::validation(format!("Cannot encode player data: {}", e)))
}

impl CheckoutMetadata {
    /// Flattens into provider metadata
    ///
    /// `notes` is shortened until `player_data` fits [`METADATA_VALUE_LIMIT`];
    /// details that do not fit even without notes are rejected.
    pub fn to_metadata(&self) -> DomainResult<HashMap<String, String>> {
        let bare = encode_player_data(&self.player, "")?.chars().count();
        if bare > METADATA_VALUE_LIMIT {
            return Err(DomainError::validation("Player details are too long for checkout"));
        }
        let room = METADATA_VALUE_LIMIT - bare;

        let mut notes: String = self.notes.chars().take(room).collect();
        let mut player_data = encode_player_data(&self.player, &notes)?;
        // Escaping can push the encoded notes past the room left
        while player_data.chars().count() > METADATA_VALUE_LIMIT {
            notes.pop();
            player_data = encode_player_data(&self.player, &notes)?;
        }

        Ok(HashMap::from([
            (PLAYER_DATA.to_string(), player_data),
            (LEAGUE_ID.to_string(), self.league_id.to_string()),
            (DIVISION_ID.to_string(), self.division_id.to_string()),
            (IS_LATE.to_string(), self.is_late_registration.to_string()),
        ]))
    }

    pub fn from_metadata(metadata: &HashMap<String, String>) -> DomainResult<Self> {
        let field = |key: &str| {
            metadata
                .get(key)
                .ok_or_else(|| DomainError::validation(format!("Checkout session is missing {}", key)))
        };
        let parse_id = |key: &str| -> DomainResult<Uuid> {
            Uuid::parse_str(field(key)?)
                .map_err(|_| DomainError::validation(format!("Checkout session has a malformed {}", key)))
        };

        let data: PlayerData = serde_json::from_str(field(PLAYER_DATA)?)
            .map_err(|e| DomainError::validation(format!("Checkout session has bad player data: {}", e)))?;

        Ok(Self {
            player: data.player,
            notes: data.notes,
            league_id: parse_id(LEAGUE_ID)?,
            division_id: parse_id(DIVISION_ID)?,
            is_late_registration: metadata.get(IS_LATE).map(String::as_str) == Some("true"),
        })
    }
}
