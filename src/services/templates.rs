//! Template service implementation
//!
//! CRUD over message templates plus the name filter and ordering used when
//! presenting them.

use tracing::{info, debug};

use crate::models::{NewTemplate, Template};
use crate::services::decode::decode_records;
use crate::services::webhook::WebhookClient;
use crate::utils::errors::{ZapError, Result};
use crate::utils::helpers::{compare_names, name_matches};

#[derive(Clone)]
pub struct TemplateService {
    client: WebhookClient,
}

impl TemplateService {
    pub fn new(client: WebhookClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Template>> {
        let body = self.client.list_templates().await?;
        let templates: Vec<Template> = decode_records(&body, "templates", Some("template:"));
        debug!(count = templates.len(), "Loaded templates");
        Ok(templates)
    }

    pub async fn find(&self, id: &str) -> Result<Template> {
        self.list()
            .await?
            .into_iter()
            .find(|template| template.id == id)
            .ok_or_else(|| ZapError::TemplateNotFound { template_id: id.to_string() })
    }

    pub async fn save(&self, template: &NewTemplate) -> Result<()> {
        validate_template(template)?;
        self.client.save_template(template).await?;
        info!(name = %template.name, messages = template.messages.len(), "Template created");
        Ok(())
    }

    pub async fn update(&self, id: &str, template: &NewTemplate) -> Result<()> {
        validate_template(template)?;
        self.client.update_template(id, template).await?;
        info!(template_id = id, messages = template.messages.len(), "Template updated");
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.client.delete_template(id).await?;
        info!(template_id = id, "Template deleted");
        Ok(())
    }
}

/// Templates whose name contains `filter` (case-insensitive), sorted by name
pub fn filter_and_sort(templates: &[Template], filter: &str) -> Vec<Template> {
    let mut matching: Vec<Template> = templates
        .iter()
        .filter(|template| name_matches(&template.name, filter))
        .cloned()
        .collect();
    matching.sort_by(|a, b| compare_names(&a.name, &b.name));
    matching
}

impl From<&Template> for NewTemplate {
    fn from(template: &Template) -> Self {
        Self {
            name: template.name.clone(),
            description: template.description.clone(),
            messages: template.messages.clone(),
        }
    }
}

fn validate_template(template: &NewTemplate) -> Result<()> {
    if template.name.trim().is_empty() {
        return Err(ZapError::InvalidInput("Template name is required".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Message;

    fn template(id: &str, name: &str) -> Template {
        Template {
            id: id.to_string(),
            name: name.to_string(),
            description: String::new(),
            messages: vec![Message::text("oi")],
        }
    }

    #[test]
    fn test_filter_and_sort() {
        let templates = vec![
            template("1", "Promoção"),
            template("2", "boas-vindas"),
            template("3", "Aviso promo"),
        ];

        let names: Vec<_> = filter_and_sort(&templates, "").into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["Aviso promo", "boas-vindas", "Promoção"]);

        let names: Vec<_> = filter_and_sort(&templates, "PROMO").into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["Aviso promo", "Promoção"]);
    }

    #[test]
    fn test_edit_starts_from_existing_template() {
        let existing = template("1", "Promoção");
        let draft = NewTemplate::from(&existing);
        assert_eq!(draft.messages, existing.messages);
    }

    #[test]
    fn test_template_requires_name() {
        assert!(validate_template(&NewTemplate::default()).is_err());
    }
}
