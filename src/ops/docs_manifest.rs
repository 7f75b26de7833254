//! Implementation of `gcloud-docs manifest`.

use crate::core::DocsManifest;

/// One line of the manifest listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleSummary {
    pub id: String,
    pub name: String,
    pub latest: Option<String>,
    pub versions: usize,
}

/// Summarize the manifest, umbrella first.
pub fn list_modules(manifest: &DocsManifest) -> Vec<ModuleSummary> {
    manifest
        .modules()
        .iter()
        .map(|m| ModuleSummary {
            id: m.id.clone(),
            name: m.name.clone(),
            latest: m.versions.first().cloned(),
            versions: m.versions.len(),
        })
        .collect()
}

/// Render the listing as aligned text.
pub fn format_modules(modules: &[ModuleSummary]) -> String {
    let width = modules.iter().map(|m| m.name.len()).max().unwrap_or(0);
    let mut out = String::new();

    for m in modules {
        out.push_str(&format!(
            "{:width$}  {:<10} ({} version{})\n",
            m.name,
            m.latest.as_deref().unwrap_or("-"),
            m.versions,
            if m.versions == 1 { "" } else { "s" },
            width = width
        ));
    }

    out
}
