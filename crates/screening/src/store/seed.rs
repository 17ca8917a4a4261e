use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::access::User;
use crate::catalog::{Location, LocationMapping, Requirement, Service, ServiceRequirement};
use crate::customers::Customer;
use crate::orders::Order;

/// A full dataset the in-memory store can be built from and written back to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seed {
    #[serde(default)]
    pub locations: Vec<Location>,
    #[serde(default)]
    pub services: Vec<Service>,
    #[serde(default)]
    pub requirements: Vec<Requirement>,
    #[serde(default)]
    pub service_requirements: Vec<ServiceRequirement>,
    #[serde(default)]
    pub location_mappings: Vec<LocationMapping>,
    #[serde(default)]
    pub customers: Vec<Customer>,
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub sessions: Vec<SeedSession>,
    #[serde(default)]
    pub orders: Vec<Order>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedSession {
    pub token: String,
    pub user_id: Uuid,
}

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("failed to read dataset: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid dataset JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("location {location_id} references missing parent {parent_id}")]
    DanglingParent { location_id: Uuid, parent_id: Uuid },
    #[error("location code {0} is used more than once")]
    DuplicateLocationCode(String),
    #[error("session references unknown user {0}")]
    UnknownSessionUser(Uuid),
}

impl Seed {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, SeedError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, SeedError> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn write_to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), SeedError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}
