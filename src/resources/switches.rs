//! Interconnect switches and their port statistics.

use std::sync::Arc;

use serde_json::Value;

use crate::connection::Connection;
use crate::error::Result;
use crate::query::QueryParams;
use crate::resource::{DeleteOutcome, RequestOptions, ResourceClient, ResourceRef};
use crate::task_monitor::TaskMonitor;

/// Interconnect switches.
pub struct Switches {
    client: ResourceClient,
}

impl Switches {
    /// Collection path.
    pub const URI: &'static str = "/rest/switches";

    /// Creates the facade.
    pub fn new(connection: Arc<dyn Connection>, task_monitor: TaskMonitor) -> Self {
        Self {
            client: ResourceClient::with_task_monitor(connection, Self::URI, task_monitor),
        }
    }

    /// Underlying resource client.
    pub fn client(&self) -> &ResourceClient {
        &self.client
    }

    /// Lists switches.
    pub async fn get_all(&self, params: &QueryParams) -> Result<Vec<Value>> {
        self.client.get_all(params, None).await
    }

    /// Gets one switch by id or URI.
    pub async fn get(&self, id_or_uri: &str) -> Result<Value> {
        self.client.get(id_or_uri).await
    }

    /// Gets the switches whose `field` equals `value`.
    pub async fn get_by(&self, field: &str, value: &str) -> Result<Vec<Value>> {
        self.client.get_by(field, value, None).await
    }

    /// Gets switch statistics, for the whole switch or for one port.
    ///
    /// # Arguments
    ///
    /// * `id_or_uri` - Switch id or URI
    /// * `port_name` - Port to restrict the statistics to, e.g. `1.2`
    pub async fn get_statistics(&self, id_or_uri: &str, port_name: Option<&str>) -> Result<Value> {
        let mut uri = format!("{}/statistics", self.client.build_uri(id_or_uri)?);
        if let Some(port) = port_name.filter(|p| !p.is_empty()) {
            uri = format!("{}/{}", uri, port);
        }
        self.client.get(&uri).await
    }

    /// Removes a switch from management.
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
    use crate::resources::test_support::setup;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const SWITCH_ID: &str = "30c04831-169e-4618-86b2-7a46310ebaea";

    #[tokio::test]
    async fn test_statistics_for_switch_and_port() {
        let (mock, monitor) = setup();
        mock.on_get(
            "/rest/switches/30c04831-169e-4618-86b2-7a46310ebaea/statistics",
            json!({"moduleStatistics": []}),
        )
        .on_get(
            "/rest/switches/30c04831-169e-4618-86b2-7a46310ebaea/statistics/1.2",
            json!({"portName": "1.2"}),
        );
        let switches = Switches::new(mock.clone(), monitor);

        assert!(switches.get_statistics(SWITCH_ID, None).await.is_ok());
        let port = switches.get_statistics(SWITCH_ID, Some("1.2")).await.unwrap();
        assert_eq!(port["portName"], "1.2");
    }

    #[tokio::test]
    async fn test_get_and_delete() {
        let (mock, monitor) = setup();
        mock.on_get("/rest/switches/1", json!({"name": "sw1"}));
        let switches = Switches::new(mock.clone(), monitor);

        assert_eq!(switches.get("1").await.unwrap()["name"], "sw1");
        assert_eq!(
            switches.delete("1", &RequestOptions::new()).await.unwrap(),
            DeleteOutcome::Completed
        );
    }

    #[tokio::test]
    async fn test_get_all_and_get_by() {
        let (mock, monitor) = setup();
        mock.on_get("/rest/switches?start=0&count=-1", json!({"members": [{"name": "sw1"}]}))
            .on_get(
                "/rest/switches?start=0&count=-1&filter=%22%27name%27%3D%27sw1%27%22",
                json!({"members": [{"name": "sw1"}]}),
            );
        let switches = Switches::new(mock.clone(), monitor);

        assert_eq!(switches.get_all(&QueryParams::new()).await.unwrap().len(), 1);
        assert_eq!(switches.get_by("name", "sw1").await.unwrap().len(), 1);
    }
}
