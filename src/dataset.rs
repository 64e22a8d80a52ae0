use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::models::Dataset;

/// Loads and validates the message dataset. Any failure here is fatal:
/// the simulation never starts on a malformed dataset.
pub fn load_dataset(path: &Path) -> Result<Dataset> {
    let contents = fs::read_to_string(path).map_err(|err| {
        Error::DatasetIo(format!(
            "failed to read dataset '{}': {}",
            path.display(),
            err
        ))
    })?;
    let dataset: Dataset = serde_json::from_str(&contents)
        .map_err(|err| Error::DatasetParse(format!("failed to parse dataset JSON: {}", err)))?;
    validate_dataset(&dataset)?;
    Ok(dataset)
}

pub fn validate_dataset(dataset: &Dataset) -> Result<()> {
    if dataset.messages.is_empty() {
        return Err(Error::EmptyDataset);
    }
    let mut ids = HashSet::new();
    for message in &dataset.messages {
        if message.message_id.trim().is_empty() {
            return Err(Error::InvalidMessage(
                message.message_id.clone(),
                "message_id must not be empty".to_string(),
            ));
        }
        if message.message_content.text.trim().is_empty() {
            return Err(Error::InvalidMessage(
                message.message_id.clone(),
                "message_content.text must not be empty".to_string(),
            ));
        }
        if message.draft_response.body.trim().is_empty() {
            return Err(Error::InvalidMessage(
                message.message_id.clone(),
                "draft_response.body must not be empty".to_string(),
            ));
        }
        if message.triage.queue.trim().is_empty() {
            return Err(Error::InvalidMessage(
                message.message_id.clone(),
                "triage.queue must not be empty".to_string(),
            ));
        }
        if !ids.insert(message.message_id.clone()) {
            return Err(Error::DuplicateMessageId(message.message_id.clone()));
        }
    }
    Ok(())
}
