//! Instance service implementation
//!
//! Lists, creates and deletes gateway instances.

use tracing::{info, debug};

use crate::models::{Instance, NewInstance};
use crate::services::decode::decode_records;
use crate::services::webhook::WebhookClient;
use crate::utils::errors::{ZapError, Result};

#[derive(Clone)]
pub struct InstanceService {
    client: WebhookClient,
}

impl InstanceService {
    pub fn new(client: WebhookClient) -> Self {
        Self { client }
    }

    /// All instances known to the backend; records without an id are dropped
    pub async fn list(&self) -> Result<Vec<Instance>> {
        let body = self.client.list_instances().await?;
        let instances: Vec<Instance> = decode_records::<Instance>(&body, "instances", None)
            .into_iter()
            .filter(|instance| !instance.id.is_empty())
            .collect();

        debug!(count = instances.len(), "Loaded instances");
        Ok(instances)
    }

    pub async fn find(&self, id: &str) -> Result<Instance> {
        self.list()
            .await?
            .into_iter()
            .find(|instance| instance.id == id)
            .ok_or_else(|| ZapError::InstanceNotFound { instance_id: id.to_string() })
    }

    pub async fn save(&self, instance: &NewInstance) -> Result<()> {
        validate_new_instance(instance)?;
        self.client.save_instance(instance).await?;
        info!(name = %instance.name, url = %instance.url, "Instance saved");
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.client.delete_instance(id).await?;
        info!(instance_id = id, "Instance deleted");
        Ok(())
    }
}

fn validate_new_instance(instance: &NewInstance) -> Result<()> {
    if instance.name.trim().is_empty() {
        return Err(ZapError::InvalidInput("Instance name is required".to_string()));
    }
    if instance.api_key.trim().is_empty() {
        return Err(ZapError::InvalidInput("Instance API key is required".to_string()));
    }
    url::Url::parse(&instance.url)
        .map_err(|e| ZapError::InvalidInput(format!("Invalid instance URL '{}': {}", instance.url, e)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_instance() -> NewInstance {
        NewInstance {
            name: "Loja Centro".to_string(),
            url: "https://evolution.example.com".to_string(),
            api_key: "key".to_string(),
        }
    }

    #[test]
    fn test_validate_new_instance() {
        assert!(validate_new_instance(&new_instance()).is_ok());

        let mut instance = new_instance();
        instance.url = "evolution.example.com".to_string();
        assert!(validate_new_instance(&instance).is_err());

        let mut instance = new_instance();
        instance.name = "  ".to_string();
        assert!(validate_new_instance(&instance).is_err());
    }

    #[test]
    fn test_new_instance_wire_shape() {
        let value = serde_json::to_value(new_instance()).unwrap();
        assert_eq!(value["apiKey"], "key");
    }
}
