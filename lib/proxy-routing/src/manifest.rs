//! Declarative resource model serialized as a CloudFormation template

use crate::{Result, RoutingError};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{json, Map, Value};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use tracing::debug;

pub const TEMPLATE_FORMAT_VERSION: &str = "2010-09-09";

const MAX_HUMAN_ID_LEN: usize = 240;

/// Handle to a declared resource
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceRef {
    logical_id: String,
    resource_type: String,
}

impl ResourceRef {
    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    /// `{"Ref": id}`
    pub fn reference(&self) -> Value {
        json!({ "Ref": self.logical_id })
    }

    /// `{"Fn::GetAtt": [id, attribute]}`
    pub fn get_att(&self, attribute: &str) -> Value {
        json!({ "Fn::GetAtt": [self.logical_id, attribute] })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Resource {
    #[serde(rename = "Type")]
    pub resource_type: String,

    pub properties: Value,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub deletion_policy: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_replace_policy: Option<String>,
}

impl Resource {
    fn new(resource_type: &str, properties: Value) -> Self {
        Self {
            resource_type: resource_type.to_string(),
            properties,
            depends_on: Vec::new(),
            metadata: None,
            deletion_policy: None,
            update_replace_policy: None,
        }
    }

    /// Append to an array-valued property, creating it when missing
    pub fn push_property(&mut self, key: &str, value: Value) {
        if !self.properties.is_object() {
            self.properties = Value::Object(Map::new());
        }
        let entry = self
            .properties
            .as_object_mut()
            .map(|props| props.entry(key.to_string()).or_insert_with(|| Value::Array(Vec::new())));
        if let Some(Value::Array(items)) = entry {
            items.push(value);
        }
    }

    /// Record a compliance-rule suppression in the resource metadata
    pub fn suppress_rule(&mut self, rule_id: &str, reason: &str) {
        let metadata = self.metadata.get_or_insert_with(|| json!({}));
        let rules = &mut metadata["cdk_nag"]["rules_to_suppress"];
        if !rules.is_array() {
            *rules = Value::Array(Vec::new());
        }
        if let Value::Array(rules) = rules {
            rules.push(json!({ "id": rule_id, "reason": reason }));
        }
    }

    /// Remove the physical resource together with the stack
    pub fn destroy_with_stack(&mut self) {
        self.deletion_policy = Some("Delete".to_string());
        self.update_replace_policy = Some("Delete".to_string());
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Output {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub value: Value,
}

/// A deployment unit collecting resources and outputs
#[derive(Clone, Debug, Default)]
pub struct Stack {
    name: String,
    description: Option<String>,
    resources: Vec<(String, Resource)>,
    outputs: Vec<(String, Output)>,
    construct_paths: HashSet<String>,
}

impl Stack {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declare a resource. The logical id is derived from the construct path,
    /// so the same construct id always maps to the same logical id.
    pub fn add_resource(
        &mut self,
        construct_id: &str,
        resource_type: &str,
        properties: Value,
    ) -> Result<ResourceRef> {
        let path = format!("{}/{}", self.name, construct_id);
        if !self.construct_paths.insert(path.clone()) {
            return Err(RoutingError::DuplicateConstruct(construct_id.to_string()));
        }

        let logical_id = logical_id(&path);
        debug!("Declared {} as {} ({})", construct_id, logical_id, resource_type);

        self.resources
            .push((logical_id.clone(), Resource::new(resource_type, properties)));

        Ok(ResourceRef {
            logical_id,
            resource_type: resource_type.to_string(),
        })
    }

    pub fn resource(&self, handle: &ResourceRef) -> Option<&Resource> {
        self.resources
            .iter()
            .find(|(id, _)| *id == handle.logical_id)
            .map(|(_, resource)| resource)
    }

    pub fn resource_mut(&mut self, handle: &ResourceRef) -> Result<&mut Resource> {
        self.resources
            .iter_mut()
            .find(|(id, _)| *id == handle.logical_id)
            .map(|(_, resource)| resource)
            .ok_or_else(|| RoutingError::UnknownResource(handle.logical_id.clone()))
    }

    pub fn add_dependency(&mut self, resource: &ResourceRef, depends_on: &ResourceRef) -> Result<()> {
        let target = depends_on.logical_id.clone();
        let resource = self.resource_mut(resource)?;
        if !resource.depends_on.contains(&target) {
            resource.depends_on.push(target);
        }
        Ok(())
    }

    pub fn add_output(&mut self, key: &str, value: Value, description: Option<&str>) {
        self.outputs.push((
            key.to_string(),
            Output {
                description: description.map(str::to_string),
                value,
            },
        ));
    }

    /// Resources of the given type, in declaration order
    pub fn resources_of_type<'a>(&'a self, resource_type: &'a str) -> impl Iterator<Item = &'a Resource> + 'a {
        self.resources
            .iter()
            .map(|(_, resource)| resource)
            .filter(move |resource| resource.resource_type == resource_type)
    }

    pub fn resource_count(&self) -> usize {
        self.resources.len()
    }

    pub fn to_template(&self) -> Template<'_> {
        Template {
            format_version: TEMPLATE_FORMAT_VERSION,
            description: self.description.as_deref(),
            resources: Ordered(&self.resources),
            outputs: Ordered(&self.outputs),
        }
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_template())?)
    }
}

/// Serializable view of a [`Stack`]
#[derive(Serialize)]
pub struct Template<'a> {
    #[serde(rename = "AWSTemplateFormatVersion")]
    format_version: &'static str,

    #[serde(rename = "Description", skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,

    #[serde(rename = "Resources")]
    resources: Ordered<'a, Resource>,

    #[serde(rename = "Outputs", skip_serializing_if = "Ordered::is_empty")]
    outputs: Ordered<'a, Output>,
}

struct Ordered<'a, T>(&'a [(String, T)]);

impl<T> Ordered<'_, T> {
    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<T: Serialize> Serialize for Ordered<'_, T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Alphanumeric characters of the path followed by 8 hex digits of its SHA-256
pub fn logical_id(path: &str) -> String {
    let human: String = path
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(MAX_HUMAN_ID_LEN)
        .collect();
    let digest = Sha256::digest(path.as_bytes());
    format!("{}{}", human, hex::encode_upper(&digest[..4]))
}
