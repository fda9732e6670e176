//! Data store interface
//!
//! Step guards query a record store holding four entity collections. The
//! engine only needs to know whether a filtered collection is empty, so the
//! interface is narrow: a [`DataStore`] hands out one
//! [`Collection`] per [`EntityType`], and a collection answers filter queries.

pub mod filter;
pub mod snapshot;

pub use filter::Filter;
pub use snapshot::{SnapshotStore, Table};

use crate::error::{ConditionError, QueryResult};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A single record: field name to value
pub type Record = BTreeMap<String, serde_yaml::Value>;

/// A queryable collection of records
pub trait Collection {
    /// Return every record matching `filter`
    fn select(&self, filter: &str) -> QueryResult<Vec<Record>>;
}

/// The external record store queried by step conditions
pub trait DataStore {
    fn hosts(&self) -> &dyn Collection;
    fn services(&self) -> &dyn Collection;
    fn vulns(&self) -> &dyn Collection;
    fn creds(&self) -> &dyn Collection;
}

/// Entity collections a condition may name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityType {
    Hosts,
    Services,
    Vulns,
    Creds,
}

impl EntityType {
    pub const ALL: [EntityType; 4] = [
        EntityType::Hosts,
        EntityType::Services,
        EntityType::Vulns,
        EntityType::Creds,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Hosts => "hosts",
            EntityType::Services => "services",
            EntityType::Vulns => "vulns",
            EntityType::Creds => "creds",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = ConditionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hosts" => Ok(EntityType::Hosts),
            "services" => Ok(EntityType::Services),
            "vulns" => Ok(EntityType::Vulns),
            "creds" => Ok(EntityType::Creds),
            _ => Err(ConditionError::InvalidModel(s.to_string())),
        }
    }
}

/// An entity type bound to its collection on a particular store
#[derive(Clone, Copy)]
pub enum Model<'a> {
    Hosts(&'a dyn Collection),
    Services(&'a dyn Collection),
    Vulns(&'a dyn Collection),
    Creds(&'a dyn Collection),
}

impl<'a> Model<'a> {
    /// Bind `entity` to the matching collection of `store`
    pub fn bind(entity: EntityType, store: &'a dyn DataStore) -> Self {
        match entity {
            EntityType::Hosts => Model::Hosts(store.hosts()),
            EntityType::Services => Model::Services(store.services()),
            EntityType::Vulns => Model::Vulns(store.vulns()),
            EntityType::Creds => Model::Creds(store.creds()),
        }
    }

    pub fn entity(&self) -> EntityType {
        match self {
            Model::Hosts(_) => EntityType::Hosts,
            Model::Services(_) => EntityType::Services,
            Model::Vulns(_) => EntityType::Vulns,
            Model::Creds(_) => EntityType::Creds,
        }
    }

    pub fn collection(&self) -> &'a dyn Collection {
        match *self {
            Model::Hosts(c) | Model::Services(c) | Model::Vulns(c) | Model::Creds(c) => c,
        }
    }

    /// Whether any record matches `filter`
    pub fn any(&self, filter: &str) -> QueryResult<bool> {
        Ok(!self.collection().select(filter)?.is_empty())
    }
}

impl fmt::Debug for Model<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Model({})", self.entity())
    }
}
