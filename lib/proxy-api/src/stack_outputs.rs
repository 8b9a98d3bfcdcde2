use crate::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const OUTPUT_KEY: &str = "OutputKey";
const OUTPUT_VALUE: &str = "OutputValue";

/// A single output of a previous provisioning run, kept field for field in input order
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StackOutput(pub Map<String, Value>);

impl StackOutput {
    pub fn key(&self) -> Option<&str> {
        self.0.get(OUTPUT_KEY).and_then(Value::as_str)
    }

    /// `OutputValue` when it is a string
    pub fn value(&self) -> Option<&str> {
        self.0.get(OUTPUT_VALUE).and_then(Value::as_str)
    }
}

/// Outputs array as returned by `describe-stacks`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StackOutputs(pub Vec<StackOutput>);

impl StackOutputs {
    pub fn from_json(source: &str) -> Result<Self> {
        Ok(serde_json::from_str(source)?)
    }

    /// Value of the first output named `key`
    pub fn find(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|output| output.key() == Some(key))
            .and_then(StackOutput::value)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
