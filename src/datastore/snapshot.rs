//! In-memory data store loaded from a YAML snapshot
//!
//! ```yaml
//! hosts:
//!   - address: 10.0.0.5
//!     os_name: Linux
//! services:
//!   - host: 10.0.0.5
//!     port: 22
//!     name: ssh
//! vulns: []
//! creds: []
//! ```

use crate::datastore::{Collection, DataStore, EntityType, Filter, Record};
use crate::error::{QueryError, QueryResult};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// A list of records answering filter queries
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct Table {
    rows: Vec<Record>,
}

impl Table {
    pub fn new(rows: Vec<Record>) -> Self {
        Table { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl Collection for Table {
    fn select(&self, filter: &str) -> QueryResult<Vec<Record>> {
        let filter = Filter::parse(filter)?;
        Ok(self
            .rows
            .iter()
            .filter(|row| filter.matches(row))
            .cloned()
            .collect())
    }
}

/// Data store backed by four in-memory tables
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SnapshotStore {
    #[serde(default)]
    hosts: Table,
    #[serde(default)]
    services: Table,
    #[serde(default)]
    vulns: Table,
    #[serde(default)]
    creds: Table,
}

impl SnapshotStore {
    /// A store with no records; every condition evaluates to false
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load a snapshot from a YAML file
    pub fn load(path: &Path) -> QueryResult<Self> {
        let contents = fs::read_to_string(path).map_err(|e| QueryError::Load {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let store: Self = serde_yaml::from_str::<Option<Self>>(&contents)
            .map_err(|e| QueryError::Load {
                path: path.to_path_buf(),
                error: e.to_string(),
            })?
            .unwrap_or_default();

        tracing::debug!(
            file = %path.display(),
            hosts = store.hosts.len(),
            services = store.services.len(),
            vulns = store.vulns.len(),
            creds = store.creds.len(),
            "data store snapshot loaded"
        );
        Ok(store)
    }

    /// Parse a snapshot from a YAML string
    pub fn from_yaml(yaml: &str) -> QueryResult<Self> {
        serde_yaml::from_str::<Option<Self>>(yaml)
            .map(Option::unwrap_or_default)
            .map_err(|e| QueryError::Load {
                path: "<inline>".into(),
                error: e.to_string(),
            })
    }

    /// Replace the records of one collection
    pub fn with_table(mut self, entity: EntityType, table: Table) -> Self {
        match entity {
            EntityType::Hosts => self.hosts = table,
            EntityType::Services => self.services = table,
            EntityType::Vulns => self.vulns = table,
            EntityType::Creds => self.creds = table,
        }
        self
    }
}

impl DataStore for SnapshotStore {
    fn hosts(&self) -> &dyn Collection {
        &self.hosts
    }

    fn services(&self) -> &dyn Collection {
        &self.services
    }

    fn vulns(&self) -> &dyn Collection {
        &self.vulns
    }

    fn creds(&self) -> &dyn Collection {
        &self.creds
    }
}
