//! Polymorphic descriptors for buildables, images, instances, and hosts.
//!
//! A descriptor's shape depends on its `type` tag: each tag selects one
//! variant of a closed discriminated union with its own required-field
//! schema. Parsing reads the tag first, then dispatches to the matching
//! schema; when the tag itself is missing, the fields of the only known
//! schema are still checked so a single response carries every violation.
//!
//! Serde derives handle persistence round-trips; the hand-written `parse`
//! constructors exist because validation must aggregate violations in
//! declaration order instead of stopping at the first bad field.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::id::ModelId;
use crate::validate::{
    FieldPath, Issues, MSG_NOT_DICT, MSG_NOT_INTEGER, MSG_REQUIRED, optional_str, required_str,
    required_u64,
};

fn check_tag(
    map: &Map<String, Value>,
    expected: &str,
    path: &FieldPath,
    issues: &mut Issues,
) -> bool {
    match required_str(map, "type", path, issues) {
        Some(tag) if tag == expected => true,
        Some(tag) => {
            issues.push(&path.child("type"), format!("unknown type '{tag}'"));
            false
        }
        None => false,
    }
}

/// How to produce a deployable image out of registry metadata.
///
/// Today the only buildable source is a trained model packaged behind a
/// registered server adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Buildable {
    /// Package a model behind a server adapter.
    Model {
        /// The model to package.
        model_id: ModelId,
        /// Tag of the server adapter that will serve the model.
        server_type: String,
    },
}

impl Buildable {
    /// Returns the model this buildable references.
    #[must_use]
    pub const fn model_id(&self) -> ModelId {
        match self {
            Self::Model { model_id, .. } => *model_id,
        }
    }

    /// Returns the server adapter tag.
    #[must_use]
    pub fn server_type(&self) -> &str {
        match self {
            Self::Model { server_type, .. } => server_type,
        }
    }

    /// Validates a loose JSON value into a buildable descriptor.
    pub fn parse(value: &Value, path: &FieldPath, issues: &mut Issues) -> Option<Self> {
        let map = match value {
            Value::Object(map) => map,
            _ => {
                issues.push(path, MSG_NOT_DICT);
                return None;
            }
        };
        let tag_ok = check_tag(map, "model", path, issues);
        let model_id = required_u64(map, "model_id", path, issues);
        let server_type = required_str(map, "server_type", path, issues);
        if !tag_ok {
            return None;
        }
        Some(Self::Model {
            model_id: ModelId::from_raw(model_id?),
            server_type: server_type?,
        })
    }
}

/// Registry half of an image descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RegistryParams {
    /// A Docker-compatible registry, local when no host is given.
    DockerRegistry {
        /// Registry host, e.g. `registry.example.com:5000`.
        #[serde(skip_serializing_if = "Option::is_none")]
        host: Option<String>,
    },
}

impl RegistryParams {
    /// Validates a loose JSON value into registry parameters.
    pub fn parse(value: &Value, path: &FieldPath, issues: &mut Issues) -> Option<Self> {
        let map = match value {
            Value::Object(map) => map,
            _ => {
                issues.push(path, MSG_NOT_DICT);
                return None;
            }
        };
        let tag_ok = check_tag(map, "docker_registry", path, issues);
        let host = optional_str(map, "host", path, issues);
        if !tag_ok {
            return None;
        }
        Some(Self::DockerRegistry { host })
    }
}

/// Environment-specific image descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ImageParams {
    /// A Docker image coordinate.
    DockerImage {
        /// Image repository name.
        name: String,
        /// Image tag.
        tag: String,
        /// Registry the image lives in.
        registry: RegistryParams,
    },
}

impl ImageParams {
    /// Validates a loose JSON value into image parameters.
    ///
    /// The nested registry descriptor is validated before this descriptor's
    /// scalar fields are resolved, so `registry.*` issues precede failures
    /// reported on sibling fields further down the payload.
    pub fn parse(value: &Value, path: &FieldPath, issues: &mut Issues) -> Option<Self> {
        let map = match value {
            Value::Object(map) => map,
            _ => {
                issues.push(path, MSG_NOT_DICT);
                return None;
            }
        };
        let tag_ok = check_tag(map, "docker_image", path, issues);
        let name = required_str(map, "name", path, issues);
        let tag = required_str(map, "tag", path, issues);
        let registry = match map.get("registry") {
            None | Some(Value::Null) => {
                issues.push(&path.child("registry"), MSG_REQUIRED);
                None
            }
            Some(value) => RegistryParams::parse(value, &path.child("registry"), issues),
        };
        if !tag_ok {
            return None;
        }
        Some(Self::DockerImage {
            name: name?,
            tag: tag?,
            registry: registry?,
        })
    }
}

/// Environment-specific run descriptor for an instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InstanceParams {
    /// A Docker container launch specification.
    DockerContainer {
        /// Container name.
        name: String,
        /// Runtime container id, once known.
        #[serde(skip_serializing_if = "Option::is_none")]
        container_id: Option<String>,
        /// Host-port to container-port mapping.
        #[serde(default)]
        port_mapping: BTreeMap<u16, u16>,
        /// Free-form runtime parameters handed to the actuator.
        #[serde(default)]
        params: BTreeMap<String, Value>,
    },
}

impl InstanceParams {
    /// Validates a loose JSON value into instance parameters.
    pub fn parse(value: &Value, path: &FieldPath, issues: &mut Issues) -> Option<Self> {
        let map = match value {
            Value::Object(map) => map,
            _ => {
                issues.push(path, MSG_NOT_DICT);
                return None;
            }
        };
        let tag_ok = check_tag(map, "docker_container", path, issues);
        let name = required_str(map, "name", path, issues);
        let container_id = optional_str(map, "container_id", path, issues);
        let port_mapping = parse_port_mapping(map, path, issues);
        let params = match map.get("params") {
            None | Some(Value::Null) => Some(BTreeMap::new()),
            Some(Value::Object(inner)) => {
                Some(inner.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            }
            Some(_) => {
                issues.push(&path.child("params"), MSG_NOT_DICT);
                None
            }
        };
        if !tag_ok {
            return None;
        }
        Some(Self::DockerContainer {
            name: name?,
            container_id,
            port_mapping: port_mapping?,
            params: params?,
        })
    }
}

fn parse_port_mapping(
    map: &Map<String, Value>,
    path: &FieldPath,
    issues: &mut Issues,
) -> Option<BTreeMap<u16, u16>> {
    let field = path.child("port_mapping");
    match map.get("port_mapping") {
        None | Some(Value::Null) => Some(BTreeMap::new()),
        Some(Value::Object(entries)) => {
            let mut mapping = BTreeMap::new();
            let mut ok = true;
            for (host, container) in entries {
                let host_port = host.parse::<u16>().ok();
                let container_port = container.as_u64().and_then(|p| u16::try_from(p).ok());
                match (host_port, container_port) {
                    (Some(h), Some(c)) => {
                        mapping.insert(h, c);
                    }
                    _ => {
                        issues.push(&field.child(host), MSG_NOT_INTEGER);
                        ok = false;
                    }
                }
            }
            ok.then_some(mapping)
        }
        Some(_) => {
            issues.push(&field, MSG_NOT_DICT);
            None
        }
    }
}

/// Host descriptor for a target runtime environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EnvironmentParams {
    /// A Docker daemon reachable over the network.
    DockerHost {
        /// Daemon address, e.g. `localhost:2375`.
        host: String,
    },
}

impl EnvironmentParams {
    /// Validates a loose JSON value into environment parameters.
    pub fn parse(value: &Value, path: &FieldPath, issues: &mut Issues) -> Option<Self> {
        let map = match value {
            Value::Object(map) => map,
            _ => {
                issues.push(path, MSG_NOT_DICT);
                return None;
            }
        };
        let tag_ok = check_tag(map, "docker_host", path, issues);
        let host = required_str(map, "host", path, issues);
        if !tag_ok {
            return None;
        }
        Some(Self::DockerHost { host: host? })
    }
}
