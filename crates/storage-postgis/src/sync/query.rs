//! Turns change messages into self-terminated SQL statements.

use std::sync::Arc;

use histograph_core::errors::{BuilderError, Result};
use histograph_core::pit::{ChangeMessage, IdNormalizer, MessageAction};

use super::literal::encode_text;
use super::row::{to_row, PIT_KEY_COLUMNS};
use crate::config::{DeleteIdPolicy, PostgisConfig};

pub struct QueryBuilder {
    table_name: String,
    delete_ids: DeleteIdPolicy,
    normalizer: Arc<dyn IdNormalizer>,
}

impl QueryBuilder {
    pub fn new(config: &PostgisConfig, normalizer: Arc<dyn IdNormalizer>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            table_name: config.table_name.clone(),
            delete_ids: config.delete_ids,
            normalizer,
        })
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Build the statement for one message. `add` and `update` both upsert.
    pub fn build(&self, message: &ChangeMessage) -> Result<String> {
        match &message.action {
            MessageAction::Add | MessageAction::Update => self.upsert_statement(message),
            MessageAction::Delete => self.delete_statement(message),
            MessageAction::Other(action) => Err(BuilderError::UnsupportedAction {
                action: action.clone(),
                entity_type: message.entity_type.clone(),
            }
            .into()),
        }
    }

    /// Full-column upsert keyed on `(id, dataset)`.
    pub fn upsert_statement(&self, message: &ChangeMessage) -> Result<String> {
        let pit = message.pit_payload()?;
        let row = to_row(&pit, &message.dataset, self.normalizer.as_ref())?;
        let entries = row.entries();

        let columns = entries
            .iter()
            .map(|(column, _)| *column)
            .collect::<Vec<_>>()
            .join(", ");
        let values = entries
            .iter()
            .map(|(_, literal)| *literal)
            .collect::<Vec<_>>()
            .join(", ");
        let updates = entries
            .iter()
            .filter(|(column, _)| !PIT_KEY_COLUMNS.contains(column))
            .map(|(column, _)| format!("{column} = EXCLUDED.{column}"))
            .collect::<Vec<_>>()
            .join(", ");

        Ok(format!(
            "INSERT INTO {} ({columns}) VALUES ({values}) \
             ON CONFLICT ({}) DO UPDATE SET {updates};",
            self.table_name,
            PIT_KEY_COLUMNS.join(", ")
        ))
    }

    /// Delete by `(id, dataset)`. The id is the raw payload id unless the
    /// builder is configured with [`DeleteIdPolicy::Normalized`].
    pub fn delete_statement(&self, message: &ChangeMessage) -> Result<String> {
        let pit = message.pit_payload()?;
        let raw_id = pit
            .raw_identifier()
            .ok_or_else(|| BuilderError::MissingIdentifier {
                entity_type: message.entity_type.clone(),
                dataset: message.dataset.clone(),
            })?;
        let id = match self.delete_ids {
            DeleteIdPolicy::Raw => raw_id.to_string(),
            DeleteIdPolicy::Normalized => self.normalizer.normalize(raw_id, &message.dataset)?,
        };

        Ok(format!(
            "DELETE FROM {} WHERE id = {} AND dataset = {};",
            self.table_name,
            encode_text(&id),
            encode_text(&message.dataset)
        ))
    }
}
