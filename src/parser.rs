use crate::ir::{DependencyDetail, ServiceGraph, Workflow};
use serde::de::DeserializeOwned;
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("payload rejected by provider: {}", .message.as_deref().unwrap_or("no reason given"))]
    Rejected { message: Option<String> },
    #[error("payload is neither a workflow (tasks) nor a service graph (nodes)")]
    UnknownShape,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Workflow(Workflow),
    ServiceGraph(ServiceGraph),
}

/// Strips the `{ "success": .., "data": .. }` envelope used by the workflow API.
fn unwrap_envelope(value: Value) -> Result<Value, ParseError> {
    let Value::Object(mut map) = value else {
        return Ok(value);
    };
    let Some(success) = map.get("success").and_then(Value::as_bool) else {
        return Ok(Value::Object(map));
    };
    if !success {
        let message = map
            .get("error")
            .or_else(|| map.get("message"))
            .and_then(Value::as_str)
            .map(str::to_string);
        return Err(ParseError::Rejected { message });
    }
    Ok(map.remove("data").unwrap_or(Value::Null))
}

fn parse_as<T: DeserializeOwned>(input: &str) -> Result<T, ParseError> {
    let value: Value = serde_json::from_str(input)?;
    let value = unwrap_envelope(value)?;
    Ok(serde_json::from_value(value)?)
}

pub fn parse_workflow(input: &str) -> Result<Workflow, ParseError> {
    parse_as(input)
}

pub fn parse_service_graph(input: &str) -> Result<ServiceGraph, ParseError> {
    parse_as(input)
}

pub fn parse_dependency_detail(input: &str) -> Result<DependencyDetail, ParseError> {
    let value: Value = serde_json::from_str(input)?;
    let value = unwrap_envelope(value)?;
    if let Some(message) = value.get("error").and_then(Value::as_str) {
        return Err(ParseError::Rejected {
            message: Some(message.to_string()),
        });
    }
    Ok(serde_json::from_value(value)?)
}

pub fn detect_payload(input: &str) -> Result<Payload, ParseError> {
    let value: Value = serde_json::from_str(input)?;
    let value = unwrap_envelope(value)?;
    if value.get("tasks").is_some() {
        return Ok(Payload::Workflow(serde_json::from_value(value)?));
    }
    if value.get("nodes").is_some() {
        return Ok(Payload::ServiceGraph(serde_json::from_value(value)?));
    }
    Err(ParseError::UnknownShape)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{DependencyType, ServiceCategory};

    #[test]
    fn parses_bare_workflow() {
        let input = r#"{
            "name": "web tier",
            "tasks": [
                {"name": "vpc", "service": "vpc", "operation": "create_vpc"},
                {"name": "ecs", "service": "ecs", "operation": "create_servers", "depends_on": ["vpc"]}
            ]
        }"#;
        let workflow = parse_workflow(input).unwrap();
        assert_eq!(workflow.tasks.len(), 2);
        assert_eq!(workflow.tasks[1].depends_on, vec!["vpc".to_string()]);
    }

    #[test]
    fn unwraps_api_envelope() {
        let input = r#"{"success": true, "data": {
            "nodes": [{"id": "ecs", "label": "Elastic Cloud Server", "short": "ECS", "category": "compute"}],
            "edges": [{"source": "ecs", "target": "vpc", "type": "requires"}]
        }}"#;
        let graph = parse_service_graph(input).unwrap();
        assert_eq!(graph.nodes[0].category, ServiceCategory::Compute);
        assert_eq!(graph.edges[0].kind, DependencyType::Requires);
    }

    #[test]
    fn failed_envelope_is_rejected() {
        let err = parse_workflow(r#"{"success": false, "error": "boom"}"#).unwrap_err();
        assert!(matches!(err, ParseError::Rejected { message: Some(ref m) } if m == "boom"));
    }

    #[test]
    fn detects_payload_kind() {
        assert!(matches!(
            detect_payload(r#"{"tasks": []}"#).unwrap(),
            Payload::Workflow(_)
        ));
        assert!(matches!(
            detect_payload(r#"{"nodes": [], "edges": []}"#).unwrap(),
            Payload::ServiceGraph(_)
        ));
        assert!(matches!(
            detect_payload(r#"{"rows": []}"#),
            Err(ParseError::UnknownShape)
        ));
    }

    #[test]
    fn dependency_detail_error_field_is_rejected() {
        let err = parse_dependency_detail(r#"{"error": "unknown service: foo"}"#).unwrap_err();
        assert!(matches!(err, ParseError::Rejected { .. }));
    }
}
