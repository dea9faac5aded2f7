//! On-disk shape of graft.yaml

use std::collections::BTreeMap;

use serde::Deserialize;

use super::change::RawChange;
use super::command::RawCommand;
use super::dependency::RawDependency;

/// graft.yaml as written by the user; maps may be absent or null
#[derive(Debug, Deserialize)]
pub(crate) struct RawGraftConfig {
    #[serde(rename = "apiVersion", default)]
    pub api_version: Option<String>,
    #[serde(default)]
    pub metadata: Option<BTreeMap<String, serde_yaml::Value>>,
    #[serde(default)]
    pub deps: Option<BTreeMap<String, RawDependency>>,
    #[serde(default)]
    pub changes: Option<BTreeMap<String, RawChange>>,
    #[serde(default)]
    pub commands: Option<BTreeMap<String, RawCommand>>,
}
