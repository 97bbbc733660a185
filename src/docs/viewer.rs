//! Interactive documentation viewer.
//!
//! Serves a swagger-ui page listing one link per document plus one link per
//! entry, and the `swagger-config.json` the page loads its links from.

use minijinja::{context, Environment};
use serde::{Deserialize, Serialize};

const TEMPLATE_NAME: &str = "viewer.html";
const TEMPLATE: &str = include_str!("viewer.html");
pub const CONFIG_FILE: &str = "swagger-config.json";

/// One selectable document in the viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewerLink {
    pub name: String,
    pub url: String,
}

/// Body of `swagger-config.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewerConfig {
    pub urls: Vec<ViewerLink>,
    #[serde(rename = "deepLinking")]
    pub deep_linking: bool,
}

/// Prefix `path` with `/<ingress>` when an ingress name is configured.
pub fn with_ingress(ingress: Option<&str>, path: &str) -> String {
    match ingress {
        Some(ingress) => format!("/{ingress}{path}"),
        None => path.to_string(),
    }
}

/// Render the viewer page.
pub fn render(title: &str, links: &[ViewerLink], config_url: &str) -> Result<String, minijinja::Error> {
    let mut env = Environment::new();
    env.add_template(TEMPLATE_NAME, TEMPLATE)?;
    let template = env.get_template(TEMPLATE_NAME)?;
    template.render(context! {
        title => title,
        links => links,
        config_url => config_url,
    })
}
