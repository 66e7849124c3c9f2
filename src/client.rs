//! Entry point tying configuration, transport and facades together.

use std::sync::Arc;

use crate::config::Config;
use crate::connection::{Connection, HttpConnection};
use crate::error::Result;
use crate::resource::ResourceClient;
use crate::resources::{EnclosureGroups, FcNetworks, SanManagers, ServerProfiles, Switches, Volumes};
use crate::task_monitor::TaskMonitor;

/// Client for a single OneView appliance.
///
/// Facades are cheap to create and share the same connection and task
/// polling schedule.
///
/// # Example
///
/// ```ignore
/// use oneview::{Config, OneViewClient, QueryParams};
///
/// let config = Config::load()?;
/// let client = OneViewClient::new(&config)?;
///
/// let networks = client.fc_networks().get_all(&QueryParams::new()).await?;
/// ```
#[derive(Clone)]
pub struct OneViewClient {
    connection: Arc<dyn Connection>,
    task_monitor: TaskMonitor,
}

impl OneViewClient {
    /// Creates a client talking HTTP to the configured appliance.
    ///
    /// # Errors
    ///
    /// Returns `OneViewError::HttpClient` if the HTTP client fails to initialize.
    pub fn new(config: &Config) -> Result<Self> {
        let connection: Arc<dyn Connection> = Arc::new(HttpConnection::new(config)?);
        let task_monitor = TaskMonitor::from_config(connection.clone(), config);

        tracing::info!(
            base_url = %config.base_url,
            api_version = config.api_version,
            "OneView client ready"
        );

        Ok(Self {
            connection,
            task_monitor,
        })
    }

    /// Creates a client over an existing transport.
    pub fn with_connection(connection: Arc<dyn Connection>, task_monitor: TaskMonitor) -> Self {
        Self {
            connection,
            task_monitor,
        }
    }

    /// Shared transport.
    pub fn connection(&self) -> Arc<dyn Connection> {
        self.connection.clone()
    }

    /// Shared task monitor.
    pub fn task_monitor(&self) -> &TaskMonitor {
        &self.task_monitor
    }

    /// Generic client for a resource type without a dedicated facade.
    pub fn resource(&self, uri: &str) -> ResourceClient {
        ResourceClient::with_task_monitor(self.connection.clone(), uri, self.task_monitor.clone())
    }

    /// Fibre Channel networks.
    pub fn fc_networks(&self) -> FcNetworks {
        FcNetworks::new(self.connection.clone(), self.task_monitor.clone())
    }

    /// Enclosure groups.
    pub fn enclosure_groups(&self) -> EnclosureGroups {
        EnclosureGroups::new(self.connection.clone(), self.task_monitor.clone())
    }

    /// Server profiles.
    pub fn server_profiles(&self) -> ServerProfiles {
        ServerProfiles::new(self.connection.clone(), self.task_monitor.clone())
    }

    /// Storage volumes.
    pub fn volumes(&self) -> Volumes {
        Volumes::new(self.connection.clone(), self.task_monitor.clone())
    }

    /// SAN managers.
    pub fn san_managers(&self) -> SanManagers {
        SanManagers::new(self.connection.clone(), self.task_monitor.clone())
    }

    /// Switches.
    pub fn switches(&self) -> Switches {
        Switches::new(self.connection.clone(), self.task_monitor.clone())
    }
}
