//! Enclosure groups and their configuration scripts.

use std::sync::Arc;

use serde_json::{json, Value};

use crate::connection::Connection;
use crate::error::Result;
use crate::models::{merge_defaults, Resource};
use crate::query::QueryParams;
use crate::resource::{DeleteOutcome, RequestOptions, ResourceClient, ResourceRef};
use crate::task_monitor::TaskMonitor;

/// Enclosure groups and their configuration scripts.
pub struct EnclosureGroups {
    client: ResourceClient,
    defaults: Resource,
}

impl EnclosureGroups {
    /// Collection path.
    pub const URI: &'static str = "/rest/enclosure-groups";

    /// Creates the facade.
    pub fn new(connection: Arc<dyn Connection>, task_monitor: TaskMonitor) -> Self {
        Self {
            client: ResourceClient::with_task_monitor(connection, Self::URI, task_monitor),
            defaults: super::object(json!({"type": "EnclosureGroupV200"})),
        }
    }

    /// Underlying resource client.
    pub fn client(&self) -> &ResourceClient {
        &self.client
    }

    /// Lists enclosure groups.
    pub async fn get_all(&self, params: &QueryParams) -> Result<Vec<Value>> {
        self.client.get_all(params, None).await
    }

    /// Gets one enclosure group by id or URI.
    pub async fn get(&self, id_or_uri: &str) -> Result<Value> {
        self.client.get(id_or_uri).await
    }

    /// Gets the enclosure groups whose `field` equals `value`.
    pub async fn get_by(&self, field: &str, value: &str) -> Result<Vec<Value>> {
        self.client.get_by(field, value, None).await
    }

    /// Gets the configuration script of an enclosure group.
    ///
    /// The appliance answers with the script text as a JSON string.
    pub async fn get_script(&self, id_or_uri: &str) -> Result<Value> {
        let uri = format!("{}/script", self.client.build_uri(id_or_uri)?);
        self.client.get(&uri).await
    }

    /// Creates an enclosure group.
    pub async fn create(&self, resource: &Resource, options: &RequestOptions) -> Result<Value> {
        let data = merge_defaults(&self.defaults, resource);
        self.client.create(&data, options).await
    }

    /// Updates an enclosure group; the representation must carry its `uri`.
    pub async fn update(&self, resource: &Resource, options: &RequestOptions) -> Result<Value> {
        let data = merge_defaults(&self.defaults, resource);
        self.client.update(&data, options).await
    }

    /// Replaces the configuration script of an enclosure group.
    ///
    /// # Arguments
    ///
    /// * `id_or_uri` - Id or URI of the enclosure group
    /// * `script` - Script body to store
    pub async fn update_script(&self, id_or_uri: &str, script: &Resource) -> Result<Value> {
        let uri = format!("{}/script", self.client.build_uri(id_or_uri)?);
        self.client
            .update(script, &RequestOptions::new().with_uri(uri))
            .await
    }

    /// Deletes an enclosure group.
    pub async fn delete<'a>(
        &self,
        resource: impl Into<ResourceRef<'a>>,
        options: &RequestOptions,
    ) -> Result<DeleteOutcome> {
        self.client.delete(resource, options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::Outcome;
    use crate::models::TaskRef;
    use crate::resources::test_support::{resource, setup};
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_create_adds_type() {
        let (mock, monitor) = setup();
        let groups = EnclosureGroups::new(mock.clone(), monitor);

        groups
            .create(&resource(json!({"name": "EG"})), &RequestOptions::new())
            .await
            .unwrap();

        assert_eq!(
            mock.calls()[0].body,
            Some(json!({"type": "EnclosureGroupV200", "name": "EG"}))
        );
    }

    #[tokio::test]
    async fn test_update_waits_for_task() {
        let (mock, monitor) = setup();
        mock.respond_with(Outcome::Task(TaskRef::new("/rest/tasks/eg")))
            .on_get(
                "/rest/tasks/eg",
                json!({"category": "tasks", "uri": "/rest/tasks/eg", "taskState": "Completed"}),
            );
        let groups = EnclosureGroups::new(mock.clone(), monitor);

        let group = resource(json!({"name": "EG", "uri": "/rest/enclosure-groups/1"}));
        let result = groups.update(&group, &RequestOptions::new()).await.unwrap();

        assert_eq!(result["taskState"], "Completed");
        assert_eq!(mock.calls()[0].uri, "/rest/enclosure-groups/1");
    }

    #[tokio::test]
    async fn test_get_script() {
        let (mock, monitor) = setup();
        mock.on_get("/rest/enclosure-groups/1/script", json!("#TEST COMMAND"));
        let groups = EnclosureGroups::new(mock.clone(), monitor);

        let script = groups.get_script("1").await.unwrap();
        assert_eq!(script, json!("#TEST COMMAND"));
    }

    #[tokio::test]
    async fn test_update_script_puts_to_script_address() {
        let (mock, monitor) = setup();
        let groups = EnclosureGroups::new(mock.clone(), monitor);

        let script = resource(json!({"script": "#TEST COMMAND"}));
        groups
            .update_script("/rest/enclosure-groups/1", &script)
            .await
            .unwrap();

        let call = &mock.calls()[0];
        assert_eq!(call.method, "PUT");
        assert_eq!(call.uri, "/rest/enclosure-groups/1/script");
        assert_eq!(call.body, Some(json!({"script": "#TEST COMMAND"})));
    }

    #[tokio::test]
    async fn test_get_script_rejects_foreign_uri() {
        let (mock, monitor) = setup();
        let groups = EnclosureGroups::new(mock.clone(), monitor);

        let err = groups.get_script("/rest/enclosures/1").await.unwrap_err();
        assert!(err.is_argument_error());
        assert!(mock.calls().is_empty());
    }
}
