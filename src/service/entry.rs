//! Service entry descriptors.
//!
//! An entry describes one RPC operation exposed by the platform. The gateway
//! never dispatches on entries; it only reads them to publish documentation.

use serde::{Deserialize, Serialize};

/// One exposed RPC operation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ServiceEntry {
    /// Unique entry identifier (e.g. `Acme.Users.IUserService.GetUser_id`).
    pub id: String,

    /// Route path relative to the host root, without a leading slash.
    /// Segments in braces (`{id}`) are path parameters.
    pub route_path: String,

    /// HTTP methods the entry answers to. Empty means POST.
    #[serde(default)]
    pub methods: Vec<String>,

    /// The module (service contract) declaring this entry.
    pub module: ServiceModule,

    /// Short human description.
    #[serde(default)]
    pub summary: Option<String>,

    #[serde(default)]
    pub parameters: Vec<EntryParameter>,

    /// Type name of the returned message, if any.
    #[serde(default)]
    pub return_type: Option<String>,
}

impl ServiceEntry {
    /// Create an entry answering POST on `route_path`.
    pub fn new(id: impl Into<String>, route_path: impl Into<String>, module: ServiceModule) -> Self {
        Self {
            id: id.into(),
            route_path: route_path.into(),
            methods: Vec::new(),
            module,
            summary: None,
            parameters: Vec::new(),
            return_type: None,
        }
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.methods.push(method.into());
        self
    }

    pub fn with_parameter(mut self, parameter: EntryParameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn with_return_type(mut self, type_name: impl Into<String>) -> Self {
        self.return_type = Some(type_name.into());
        self
    }

    /// Methods in upper case, defaulting to POST.
    pub fn effective_methods(&self) -> Vec<String> {
        if self.methods.is_empty() {
            return vec!["POST".to_string()];
        }
        self.methods.iter().map(|m| m.to_ascii_uppercase()).collect()
    }

    /// The entry's path with a single leading slash.
    pub fn http_path(&self) -> String {
        format!("/{}", self.route_path.trim_start_matches('/'))
    }

    /// Names of `{param}` segments in the route path.
    pub fn path_parameter_names(&self) -> Vec<&str> {
        self.route_path
            .split('/')
            .filter_map(|segment| segment.strip_prefix('{')?.strip_suffix('}'))
            .collect()
    }
}

/// The declaring module of an entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ServiceModule {
    /// Fully-qualified module / contract name.
    pub name: String,

    /// Declared title metadata. Entries sharing a title form a document group.
    #[serde(default)]
    pub title: Option<String>,
}

impl ServiceModule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: None,
        }
    }

    pub fn titled(name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: Some(title.into()),
        }
    }
}

/// A single parameter of an entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EntryParameter {
    pub name: String,
    pub type_name: String,
    #[serde(default = "default_required")]
    pub required: bool,
    #[serde(default)]
    pub description: Option<String>,
}

fn default_required() -> bool {
    true
}

impl EntryParameter {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            required: true,
            description: None,
        }
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn methods_default_to_post() {
        let entry = ServiceEntry::new("a", "api/a", ServiceModule::new("m"));
        assert_eq!(entry.effective_methods(), vec!["POST"]);

        let entry = entry.with_method("get");
        assert_eq!(entry.effective_methods(), vec!["GET"]);
    }

    #[test]
    fn path_parameters_are_extracted() {
        let entry = ServiceEntry::new("a", "api/user/{id}/posts/{post}", ServiceModule::new("m"));
        assert_eq!(entry.path_parameter_names(), vec!["id", "post"]);
        assert_eq!(entry.http_path(), "/api/user/{id}/posts/{post}");
    }

    #[test]
    fn entry_deserializes_with_defaults() {
        let entry: ServiceEntry = toml::from_str(
            r#"
            id = "Users.Get"
            route_path = "api/user/get"
            module = { name = "Acme.Users.IUserService", title = "Users" }
            parameters = [{ name = "id", type_name = "i64" }]
            "#,
        )
        .unwrap();

        assert!(entry.methods.is_empty());
        assert_eq!(entry.module.title.as_deref(), Some("Users"));
        assert!(entry.parameters[0].required);
    }
}
