use crate::ir::{DependencyDetail, DependencyEntry, ServiceEdge, ServiceGraph};
use crate::parser::{ParseError, parse_dependency_detail};

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("unknown service `{0}`")]
    UnknownService(String),
    #[error("dependency detail unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Source of the "depends on / depended by" lists shown for a selected service.
pub trait DependencyProvider {
    fn dependencies(&self, service: &str) -> Result<DependencyDetail, ProviderError>;
}

impl<F> DependencyProvider for F
where
    F: Fn(&str) -> Result<DependencyDetail, ProviderError>,
{
    fn dependencies(&self, service: &str) -> Result<DependencyDetail, ProviderError> {
        self(service)
    }
}

/// Answers lookups from the graph that is being displayed.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProvider {
    graph: ServiceGraph,
}

impl InMemoryProvider {
    pub fn new(graph: ServiceGraph) -> Self {
        Self { graph }
    }

    fn entry(&self, service: &str, edge: &ServiceEdge) -> DependencyEntry {
        let node = self.graph.node(service);
        DependencyEntry {
            service: service.to_string(),
            label: node.map(|n| n.label.clone()).unwrap_or_default(),
            short: node.map(|n| n.short.clone()).unwrap_or_default(),
            category: node.map(|n| n.category.clone()),
            kind: edge.kind,
            description: edge.description.clone().unwrap_or_default(),
        }
    }
}

impl DependencyProvider for InMemoryProvider {
    fn dependencies(&self, service: &str) -> Result<DependencyDetail, ProviderError> {
        let node = self
            .graph
            .node(service)
            .ok_or_else(|| ProviderError::UnknownService(service.to_string()))?;
        let depends_on = self
            .graph
            .edges
            .iter()
            .filter(|edge| edge.source == service)
            .map(|edge| self.entry(&edge.target, edge))
            .collect();
        let depended_by = self
            .graph
            .edges
            .iter()
            .filter(|edge| edge.target == service)
            .map(|edge| self.entry(&edge.source, edge))
            .collect();
        Ok(DependencyDetail {
            service: node.id.clone(),
            label: node.label.clone(),
            short: node.short.clone(),
            category: Some(node.category.clone()),
            depends_on,
            depended_by,
        })
    }
}

/// Decodes detail payloads fetched by `fetch`, such as the body of a
/// `/api/dependencies/{service}` response. Envelopes and `error` replies are
/// handled by [`parse_dependency_detail`].
pub struct JsonProvider<F> {
    fetch: F,
}

impl<F> JsonProvider<F>
where
    F: Fn(&str) -> Result<String, ProviderError>,
{
    pub fn new(fetch: F) -> Self {
        Self { fetch }
    }
}

impl<F> DependencyProvider for JsonProvider<F>
where
    F: Fn(&str) -> Result<String, ProviderError>,
{
    fn dependencies(&self, service: &str) -> Result<DependencyDetail, ProviderError> {
        let body = (self.fetch)(service)?;
        let detail = parse_dependency_detail(&body)?;
        if detail.service != service {
            tracing::debug!(
                requested = service,
                returned = %detail.service,
                "provider answered for another service"
            );
        }
        Ok(detail)
    }
}
