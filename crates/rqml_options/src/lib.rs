//! rqml_options: parser and language-service options.
//!
//! Both option sets deserialize from JSON with camelCase keys and every field
//! defaulted, so `{}` is a valid configuration.

use rqml_scanner::IdentifierRules;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Highest language version the loose grammar accepts.
pub const MAX_LOOSE_ECMA_VERSION: u32 = 5;

/// Options for a single parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParseOptions {
    /// ECMAScript version of embedded JavaScript: 3, 5 or 6+.
    pub ecma_version: u32,
    /// Emit `loc` line/column information on every node.
    pub locations: bool,
    /// Accept reserved words as identifiers.
    pub allow_reserved: bool,
    /// Use the error-tolerant grammar.
    pub loose: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            ecma_version: 5,
            locations: false,
            allow_reserved: false,
            loose: false,
        }
    }
}

impl ParseOptions {
    pub fn loose() -> Self {
        Self {
            loose: true,
            ..Self::default()
        }
    }

    pub fn with_locations(mut self, locations: bool) -> Self {
        self.locations = locations;
        self
    }

    pub fn with_ecma_version(mut self, ecma_version: u32) -> Self {
        self.ecma_version = ecma_version;
        self
    }

    /// Identifier rules implied by these options.
    pub fn identifier_rules(&self) -> IdentifierRules {
        IdentifierRules::new(self.ecma_version, self.allow_reserved)
    }

    pub fn from_json_str(text: &str) -> Result<Self, OptionsError> {
        let options: Self = serde_json::from_str(text)?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<(), OptionsError> {
        match self.ecma_version {
            3 => Ok(()),
            v if v >= 5 => Ok(()),
            other => Err(OptionsError::UnsupportedEcmaVersion(other)),
        }
    }
}

/// A property a component exposes to importing documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDef {
    pub name: String,
    /// One of `number`, `string`, `bool`, or a component name.
    #[serde(rename = "type", default)]
    pub type_name: Option<String>,
}

/// A component a module exports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentDef {
    pub name: String,
    /// Component this one extends, looked up among the importer's imports.
    #[serde(default)]
    pub base: Option<String>,
    #[serde(default)]
    pub properties: Vec<PropertyDef>,
    #[serde(default)]
    pub signals: Vec<SignalDef>,
}

/// A signal a component emits. Handlers receive `params` by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalDef {
    pub name: String,
    #[serde(default)]
    pub params: Vec<PropertyDef>,
}

/// Components exported by a module, e.g. `QtQuick`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleDef {
    #[serde(default)]
    pub components: Vec<ComponentDef>,
}

/// Options for a language-service instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServiceOptions {
    /// Known modules by name.
    pub modules: BTreeMap<String, ModuleDef>,
    /// Defaults for parse requests that carry no options.
    pub parse: ParseOptions,
}

impl ServiceOptions {
    pub fn from_json_str(text: &str) -> Result<Self, OptionsError> {
        let options: Self = serde_json::from_str(text)?;
        options.parse.validate()?;
        Ok(options)
    }

    pub fn module(&self, name: &str) -> Option<&ModuleDef> {
        self.modules.get(name)
    }
}

/// Errors loading options.
#[derive(Debug, thiserror::Error)]
pub enum OptionsError {
    #[error("malformed options: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported ecmaVersion {0}")]
    UnsupportedEcmaVersion(u32),
}
