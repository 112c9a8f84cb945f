//! DynamoDB repository implementation for task run artifacts.

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use tracing::debug;
use uuid::Uuid;

use taskadmin_core::storage::{ArtifactRepository, Result};
use taskadmin_core::task::TaskRunArtifact;

use super::conversions::{artifact_to_item, item_to_artifact};
use super::error::{map_put_item_error, map_query_error};
use super::keys;

/// DynamoDB-based artifact store.
///
/// One partition per execution id, sorted by creation time.
pub struct DynamoDbArtifactRepository {
    client: Client,
    table_name: String,
}

impl DynamoDbArtifactRepository {
    /// Creates a new repository with the given DynamoDB client and table name.
    pub fn new(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    /// Creates a new repository using the AWS SDK default credential chain.
    pub async fn from_region(region: &str, table_name: impl Into<String>) -> Self {
        let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(region.to_string()))
            .load()
            .await;
        Self::new(Client::new(&config), table_name)
    }
}

#[async_trait]
impl ArtifactRepository for DynamoDbArtifactRepository {
    async fn insert_artifact(&self, artifact: &TaskRunArtifact) -> Result<()> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(artifact_to_item(artifact)))
            .condition_expression("attribute_not_exists(PK)")
            .send()
            .await
            .map_err(|e| {
                map_put_item_error(e, "TaskRunArtifact", artifact.artifact_id.to_string())
            })?;

        Ok(())
    }

    async fn list_artifacts(
        &self,
        execution_id: Uuid,
        limit: u32,
        offset: u64,
    ) -> Result<Vec<TaskRunArtifact>> {
        let wanted = usize::try_from(offset)
            .unwrap_or(usize::MAX)
            .saturating_add(limit as usize);
        let mut items: Vec<HashMap<String, AttributeValue>> = Vec::new();
        let mut start_key: Option<HashMap<String, AttributeValue>> = None;

        loop {
            let result = self
                .client
                .query()
                .table_name(&self.table_name)
                .key_condition_expression("PK = :pk AND begins_with(SK, :sk)")
                .expression_attribute_values(
                    ":pk",
                    AttributeValue::S(keys::artifact_pk(execution_id)),
                )
                .expression_attribute_values(
                    ":sk",
                    AttributeValue::S(keys::ARTIFACT_PREFIX.to_string()),
                )
                .scan_index_forward(false)
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(map_query_error)?;

            items.extend(result.items.unwrap_or_default());
            start_key = result.last_evaluated_key;

            if items.len() >= wanted || start_key.is_none() {
                break;
            }
        }

        debug!(
            %execution_id,
            fetched = items.len(),
            limit,
            offset,
            "Queried artifact partition"
        );

        items
            .iter()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(limit as usize)
            .map(item_to_artifact)
            .collect()
    }
}
