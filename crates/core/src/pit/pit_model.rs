//! Change message and PIT payload models.

use serde::{Deserialize, Serialize};

use crate::errors::BuilderError;

/// Entity type discriminator of the messages this crate persists.
pub const PIT_ENTITY_TYPE: &str = "pit";

/// Mutation kind carried by a change message.
///
/// Unknown kinds are kept as [`MessageAction::Other`] so that messages for
/// other entity types still deserialize; building a statement for one fails.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MessageAction {
    Add,
    Update,
    Delete,
    Other(String),
}

impl MessageAction {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Add => "add",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Other(value) => value,
        }
    }
}

impl From<String> for MessageAction {
    fn from(value: String) -> Self {
        match value.as_str() {
            "add" => Self::Add,
            "update" => Self::Update,
            "delete" => Self::Delete,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for MessageAction {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<MessageAction> for String {
    fn from(value: MessageAction) -> Self {
        match value {
            MessageAction::Other(value) => value,
            other => other.as_str().to_string(),
        }
    }
}

/// One message of the change stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeMessage {
    pub action: MessageAction,
    #[serde(rename = "type")]
    pub entity_type: String,
    #[serde(default)]
    pub dataset: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl ChangeMessage {
    pub fn new(
        action: impl Into<MessageAction>,
        entity_type: impl Into<String>,
        dataset: impl Into<String>,
        data: serde_json::Value,
    ) -> Self {
        Self {
            action: action.into(),
            entity_type: entity_type.into(),
            dataset: dataset.into(),
            data,
        }
    }

    pub fn is_pit(&self) -> bool {
        self.entity_type == PIT_ENTITY_TYPE
    }

    /// Decode `data` as a PIT payload.
    pub fn pit_payload(&self) -> Result<PitPayload, BuilderError> {
        if !self.data.is_object() {
            return Err(BuilderError::MalformedPayload {
                entity_type: self.entity_type.clone(),
                message: "payload must be a JSON object".to_string(),
            });
        }
        serde_json::from_value(self.data.clone()).map_err(|err| BuilderError::MalformedPayload {
            entity_type: self.entity_type.clone(),
            message: err.to_string(),
        })
    }
}

/// PIT entity as carried in `ChangeMessage::data`.
///
/// The owning dataset is taken from the enclosing message, never from here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PitPayload {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub pit_type: Option<String>,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
    #[serde(default)]
    pub geometry: Option<serde_json::Value>,
}

impl PitPayload {
    /// `id` when present and non-empty, otherwise `uri`.
    pub fn raw_identifier(&self) -> Option<&str> {
        self.id
            .as_deref()
            .filter(|id| !id.is_empty())
            .or_else(|| self.uri.as_deref().filter(|uri| !uri.is_empty()))
    }
}
