use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub name: String,
    #[serde(default)]
    pub service: String,
    #[serde(default)]
    pub operation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub depends_on: Vec<String>,
}

impl Task {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn depends_on(mut self, deps: &[&str]) -> Self {
        self.depends_on = deps.iter().map(|dep| dep.to_string()).collect();
        self
    }

    pub fn with_service(mut self, service: &str, operation: &str) -> Self {
        self.service = service.to_string();
        self.operation = operation.to_string();
        self
    }
}

/// Task name to index. A repeated name maps to the last task carrying it.
pub fn name_index(tasks: &[Task]) -> HashMap<&str, usize> {
    tasks
        .iter()
        .enumerate()
        .map(|(idx, task)| (task.name.as_str(), idx))
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl Workflow {
    pub fn new(name: &str, tasks: Vec<Task>) -> Self {
        Self {
            name: name.to_string(),
            description: String::new(),
            tasks,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ServiceCategory {
    Compute,
    Network,
    Storage,
    Database,
    Security,
    Monitoring,
    Container,
    Middleware,
    Application,
    Ai,
    BigData,
    Media,
    Migration,
    Management,
    Other(String),
}

impl ServiceCategory {
    pub const KNOWN: [ServiceCategory; 14] = [
        ServiceCategory::Compute,
        ServiceCategory::Network,
        ServiceCategory::Storage,
        ServiceCategory::Database,
        ServiceCategory::Security,
        ServiceCategory::Monitoring,
        ServiceCategory::Container,
        ServiceCategory::Middleware,
        ServiceCategory::Application,
        ServiceCategory::Ai,
        ServiceCategory::BigData,
        ServiceCategory::Media,
        ServiceCategory::Migration,
        ServiceCategory::Management,
    ];

    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "compute" => Self::Compute,
            "network" => Self::Network,
            "storage" => Self::Storage,
            "database" => Self::Database,
            "security" => Self::Security,
            "monitoring" => Self::Monitoring,
            "container" => Self::Container,
            "middleware" => Self::Middleware,
            "application" => Self::Application,
            "ai" => Self::Ai,
            "big_data" => Self::BigData,
            "media" => Self::Media,
            "migration" => Self::Migration,
            "management" => Self::Management,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn tag(&self) -> &str {
        match self {
            Self::Compute => "compute",
            Self::Network => "network",
            Self::Storage => "storage",
            Self::Database => "database",
            Self::Security => "security",
            Self::Monitoring => "monitoring",
            Self::Container => "container",
            Self::Middleware => "middleware",
            Self::Application => "application",
            Self::Ai => "ai",
            Self::BigData => "big_data",
            Self::Media => "media",
            Self::Migration => "migration",
            Self::Management => "management",
            Self::Other(tag) => tag.as_str(),
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Self::Compute => "#0d6efd",
            Self::Network => "#0dcaf0",
            Self::Storage => "#fd7e14",
            Self::Database => "#6f42c1",
            Self::Security => "#dc3545",
            Self::Monitoring => "#198754",
            Self::Container => "#20c997",
            Self::Middleware => "#d63384",
            Self::Application => "#ffc107",
            Self::Ai => "#6610f2",
            Self::BigData => "#0b5ed7",
            Self::Media => "#e83e8c",
            Self::Migration => "#6c757d",
            Self::Management => "#495057",
            Self::Other(_) => "#999",
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Compute => "Compute",
            Self::Network => "Network",
            Self::Storage => "Storage",
            Self::Database => "Database",
            Self::Security => "Security",
            Self::Monitoring => "Monitoring",
            Self::Container => "Container",
            Self::Middleware => "Middleware",
            Self::Application => "Application",
            Self::Ai => "AI",
            Self::BigData => "Big Data",
            Self::Media => "Media",
            Self::Migration => "Migration",
            Self::Management => "Management",
            Self::Other(tag) => tag.as_str(),
        }
    }
}

impl From<String> for ServiceCategory {
    fn from(value: String) -> Self {
        Self::from_tag(value.as_str())
    }
}

impl From<ServiceCategory> for String {
    fn from(value: ServiceCategory) -> Self {
        value.tag().to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DependencyType {
    Requires,
    Optional,
    Monitors,
    Integrates,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeStyle {
    pub color: &'static str,
    pub dash: Option<&'static str>,
    pub width: f32,
}

impl DependencyType {
    pub const ALL: [DependencyType; 4] = [
        DependencyType::Requires,
        DependencyType::Optional,
        DependencyType::Monitors,
        DependencyType::Integrates,
    ];

    /// Unknown tags render as optional dependencies.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "requires" => Self::Requires,
            "monitors" => Self::Monitors,
            "integrates" => Self::Integrates,
            _ => Self::Optional,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Self::Requires => "requires",
            Self::Optional => "optional",
            Self::Monitors => "monitors",
            Self::Integrates => "integrates",
        }
    }

    pub fn style(self) -> EdgeStyle {
        match self {
            Self::Requires => EdgeStyle {
                color: "#0d6efd",
                dash: None,
                width: 1.8,
            },
            Self::Optional => EdgeStyle {
                color: "#6c757d",
                dash: Some("6,3"),
                width: 1.2,
            },
            Self::Monitors => EdgeStyle {
                color: "#198754",
                dash: None,
                width: 1.4,
            },
            Self::Integrates => EdgeStyle {
                color: "#6f42c1",
                dash: Some("2,3"),
                width: 1.4,
            },
        }
    }
}

impl From<String> for DependencyType {
    fn from(value: String) -> Self {
        Self::from_tag(value.as_str())
    }
}

impl From<DependencyType> for String {
    fn from(value: DependencyType) -> Self {
        value.tag().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceNode {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub short: String,
    pub category: ServiceCategory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceEdge {
    pub source: String,
    pub target: String,
    #[serde(rename = "type", default = "default_dependency_type")]
    pub kind: DependencyType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn default_dependency_type() -> DependencyType {
    DependencyType::Optional
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceGraph {
    #[serde(default)]
    pub nodes: Vec<ServiceNode>,
    #[serde(default)]
    pub edges: Vec<ServiceEdge>,
}

impl ServiceGraph {
    pub fn node(&self, id: &str) -> Option<&ServiceNode> {
        self.nodes.iter().find(|node| node.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyEntry {
    pub service: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub short: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<ServiceCategory>,
    #[serde(rename = "type", default = "default_dependency_type")]
    pub kind: DependencyType,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyDetail {
    pub service: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub short: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<ServiceCategory>,
    #[serde(default)]
    pub depends_on: Vec<DependencyEntry>,
    #[serde(default)]
    pub depended_by: Vec<DependencyEntry>,
}
