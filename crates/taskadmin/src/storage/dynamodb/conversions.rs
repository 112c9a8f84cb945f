//! DynamoDB attribute conversion functions.
//!
//! Pure functions for converting between DynamoDB AttributeValue maps and
//! artifact rows.

use std::collections::{BTreeMap, HashMap};

use aws_sdk_dynamodb::types::AttributeValue;
use chrono::{DateTime, SecondsFormat, Utc};
use taskadmin_core::storage::RepositoryError;
use taskadmin_core::task::TaskRunArtifact;
use uuid::Uuid;

use super::keys;

pub const ENTITY_TYPE_ARTIFACT: &str = "ARTIFACT";

/// Convert an artifact to a DynamoDB item.
pub fn artifact_to_item(artifact: &TaskRunArtifact) -> HashMap<String, AttributeValue> {
    let mut item = HashMap::new();

    // Keys
    item.insert(
        "PK".to_string(),
        AttributeValue::S(keys::artifact_pk(artifact.execution_id)),
    );
    item.insert(
        "SK".to_string(),
        AttributeValue::S(keys::artifact_sk(&artifact.created_at, artifact.artifact_id)),
    );

    item.insert(
        "entityType".to_string(),
        AttributeValue::S(ENTITY_TYPE_ARTIFACT.to_string()),
    );

    // Data
    item.insert(
        "executionId".to_string(),
        AttributeValue::S(artifact.execution_id.to_string()),
    );
    item.insert(
        "executionTaskId".to_string(),
        AttributeValue::S(artifact.execution_task_id.to_string()),
    );
    item.insert(
        "artifactId".to_string(),
        AttributeValue::S(artifact.artifact_id.to_string()),
    );
    item.insert(
        "createdAt".to_string(),
        AttributeValue::S(
            artifact
                .created_at
                .to_rfc3339_opts(SecondsFormat::Micros, true),
        ),
    );
    item.insert(
        "artifactType".to_string(),
        AttributeValue::S(artifact.artifact_type.clone()),
    );
    item.insert("url".to_string(), AttributeValue::S(artifact.url.clone()));
    item.insert(
        "contentType".to_string(),
        AttributeValue::S(artifact.content_type.clone()),
    );
    item.insert(
        "contentLength".to_string(),
        AttributeValue::N(artifact.content_length.to_string()),
    );
    item.insert(
        "statusCode".to_string(),
        AttributeValue::N(artifact.status_code.to_string()),
    );
    item.insert(
        "storageBucket".to_string(),
        AttributeValue::S(artifact.storage_bucket.clone()),
    );
    item.insert(
        "storageKey".to_string(),
        AttributeValue::S(artifact.storage_key.clone()),
    );
    if !artifact.additional_data.is_empty() {
        let data = artifact
            .additional_data
            .iter()
            .map(|(k, v)| (k.clone(), AttributeValue::S(v.clone())))
            .collect();
        item.insert("additionalData".to_string(), AttributeValue::M(data));
    }

    item
}

/// Convert a DynamoDB item to an artifact.
pub fn item_to_artifact(
    item: &HashMap<String, AttributeValue>,
) -> Result<TaskRunArtifact, RepositoryError> {
    Ok(TaskRunArtifact {
        execution_id: get_uuid(item, "executionId")?,
        execution_task_id: get_uuid(item, "executionTaskId")?,
        artifact_id: get_uuid(item, "artifactId")?,
        created_at: get_datetime(item, "createdAt")?,
        artifact_type: get_string(item, "artifactType")?,
        url: get_string(item, "url")?,
        content_type: get_string(item, "contentType")?,
        content_length: get_number(item, "contentLength")?,
        status_code: get_number(item, "statusCode")?,
        storage_bucket: get_string(item, "storageBucket")?,
        storage_key: get_string(item, "storageKey")?,
        additional_data: get_string_map(item, "additionalData"),
    })
}

fn get_string(
    item: &HashMap<String, AttributeValue>,
    key: &str,
) -> Result<String, RepositoryError> {
    item.get(key)
        .and_then(|v| v.as_s().ok())
        .map(|s| s.to_string())
        .ok_or_else(|| RepositoryError::InvalidData(format!("Missing or invalid field: {}", key)))
}

fn get_number<T: std::str::FromStr>(
    item: &HashMap<String, AttributeValue>,
    key: &str,
) -> Result<T, RepositoryError> {
    item.get(key)
        .and_then(|v| v.as_n().ok())
        .and_then(|n| n.parse().ok())
        .ok_or_else(|| RepositoryError::InvalidData(format!("Missing or invalid number: {}", key)))
}

fn get_uuid(item: &HashMap<String, AttributeValue>, key: &str) -> Result<Uuid, RepositoryError> {
    let s = get_string(item, key)?;
    Uuid::parse_str(&s)
        .map_err(|e| RepositoryError::InvalidData(format!("Invalid UUID {}: {}", key, e)))
}

fn get_datetime(
    item: &HashMap<String, AttributeValue>,
    key: &str,
) -> Result<DateTime<Utc>, RepositoryError> {
    let s = get_string(item, key)?;
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::InvalidData(format!("Invalid datetime {}: {}", key, e)))
}

/// Missing map or non-string values are skipped.
fn get_string_map(item: &HashMap<String, AttributeValue>, key: &str) -> BTreeMap<String, String> {
    item.get(key)
        .and_then(|v| v.as_m().ok())
        .map(|m| {
            m.iter()
                .filter_map(|(k, v)| v.as_s().ok().map(|s| (k.clone(), s.clone())))
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> TaskRunArtifact {
        TaskRunArtifact {
            execution_id: Uuid::from_u128(1),
            execution_task_id: Uuid::from_u128(2),
            artifact_id: Uuid::from_u128(3),
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            artifact_type: "html".to_string(),
            url: "https://example.com".to_string(),
            content_type: "text/html".to_string(),
            content_length: 1024,
            status_code: 200,
            storage_bucket: "artifacts".to_string(),
            storage_key: "1/3.html".to_string(),
            additional_data: BTreeMap::from([("lang".to_string(), "en".to_string())]),
        }
    }

    #[test]
    fn test_artifact_item_has_keys() {
        let item = artifact_to_item(&sample());

        assert_eq!(
            item.get("PK").unwrap().as_s().unwrap(),
            "RUN#00000000-0000-0000-0000-000000000001"
        );
        assert!(item
            .get("SK")
            .unwrap()
            .as_s()
            .unwrap()
            .starts_with("ARTIFACT#2024-05-01T12:00:00.000000Z#"));
        assert_eq!(item.get("contentLength").unwrap().as_n().unwrap(), "1024");
    }

    #[test]
    fn test_item_to_artifact() {
        let artifact = sample();
        assert_eq!(item_to_artifact(&artifact_to_item(&artifact)).unwrap(), artifact);
    }

    #[test]
    fn test_empty_additional_data_is_omitted() {
        let mut artifact = sample();
        artifact.additional_data.clear();

        let item = artifact_to_item(&artifact);

        assert!(!item.contains_key("additionalData"));
        assert!(item_to_artifact(&item).unwrap().additional_data.is_empty());
    }

    #[test]
    fn test_missing_field_is_invalid_data() {
        let mut item = artifact_to_item(&sample());
        item.remove("url");

        let result = item_to_artifact(&item);

        assert!(matches!(result, Err(RepositoryError::InvalidData(msg)) if msg.contains("url")));
    }

    #[test]
    fn test_malformed_number_is_invalid_data() {
        let mut item = artifact_to_item(&sample());
        item.insert("statusCode".to_string(), AttributeValue::N("abc".to_string()));

        assert!(matches!(
            item_to_artifact(&item),
            Err(RepositoryError::InvalidData(_))
        ));
    }
}
