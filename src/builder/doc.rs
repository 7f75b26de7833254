//! JSON documentation model.
//!
//! These types are written verbatim into the output tree and consumed by
//! the docs site, so field names follow its camelCase schema.

use serde::{Deserialize, Serialize};

/// Documentation for one source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDoc {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub description: String,
    pub source: String,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub children: Vec<String>,
    #[serde(default)]
    pub methods: Vec<MethodDoc>,
    /// Output-relative path of the JSON file, set by the builder
    #[serde(default)]
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodDoc {
    pub id: String,
    pub name: String,
    /// `constructor`, `instance`, `static` or `function`
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub source: String,
    #[serde(default)]
    pub resources: Vec<ResourceDoc>,
    #[serde(default)]
    pub examples: Vec<ExampleDoc>,
    #[serde(default)]
    pub params: Vec<ParamDoc>,
    #[serde(default)]
    pub exceptions: Vec<ReturnDoc>,
    #[serde(default)]
    pub returns: Vec<ReturnDoc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceDoc {
    pub title: String,
    pub link: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExampleDoc {
    #[serde(default)]
    pub caption: Option<String>,
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamDoc {
    pub name: String,
    pub description: String,
    pub types: Vec<String>,
    pub optional: bool,
    pub nullable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnDoc {
    pub types: Vec<String>,
    pub description: String,
}

/// One entry of the type dictionary (`types.json`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeEntry {
    pub id: String,
    pub title: String,
    /// Path of the documented file, relative to the version directory
    pub contents: String,
}

impl TypeEntry {
    /// Re-root the entry under a dependency subfolder of a bundle.
    pub fn prefixed(mut self, dependency: &str) -> Self {
        self.contents = format!("{}/{}", dependency, self.contents);
        self
    }
}

/// Table of contents (`toc.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableOfContents {
    pub tag_name: String,
    #[serde(default)]
    pub guides: Vec<TocGuide>,
    #[serde(default)]
    pub services: Vec<TocService>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocGuide {
    pub id: String,
    pub title: String,
    pub contents: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocService {
    pub title: String,
    #[serde(rename = "type")]
    pub type_id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nav: Vec<TocService>,
}
