use std::fs;

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;

use super::EdgeRecord;

/// Mirror of one backend edge object. Only the endpoint ids are mandatory;
/// counts default to zero and missing display metadata gets a placeholder.
#[derive(Clone, Debug, Deserialize)]
struct RawEdgeRecord {
    id_1: u64,
    id_2: u64,
    #[serde(default)]
    subscribers_1: u64,
    #[serde(default)]
    subscribers_2: u64,
    #[serde(default)]
    common_subscribers: u64,
    #[serde(default)]
    name_1: Option<String>,
    #[serde(default)]
    desc_1: Option<String>,
    #[serde(default)]
    name_2: Option<String>,
    #[serde(default)]
    desc_2: Option<String>,
}

fn placeholder_name(id: u64) -> String {
    format!("Community {id}")
}

impl RawEdgeRecord {
    fn into_edge(self) -> EdgeRecord {
        EdgeRecord {
            source_id: self.id_1,
            target_id: self.id_2,
            subscribers_source: self.subscribers_1,
            subscribers_target: self.subscribers_2,
            common_subscribers: self.common_subscribers,
            name_source: self.name_1.unwrap_or_else(|| placeholder_name(self.id_1)),
            desc_source: self.desc_1.unwrap_or_default(),
            name_target: self.name_2.unwrap_or_else(|| placeholder_name(self.id_2)),
            desc_target: self.desc_2.unwrap_or_default(),
        }
    }
}

fn parse_edge_dataset(raw: &str) -> Result<Vec<EdgeRecord>> {
    let records: Vec<RawEdgeRecord> =
        serde_json::from_str(raw).context("invalid edge dataset JSON")?;

    if records.is_empty() {
        return Err(anyhow!("edge dataset contains no records"));
    }

    Ok(records.into_iter().map(RawEdgeRecord::into_edge).collect())
}

pub fn load_edge_dataset(path: &str) -> Result<Vec<EdgeRecord>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read edge dataset from {path}"))?;
    parse_edge_dataset(&raw).with_context(|| format!("failed to parse edge dataset from {path}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_backend_wire_names() {
        let raw = r#"[
            {
                "id_1": 0, "id_2": 1,
                "subscribers_1": 20, "subscribers_2": 20, "common_subscribers": 20,
                "name_1": "Plotters", "desc_1": "Chart talk",
                "name_2": "Parsers", "desc_2": "Grammar talk"
            }
        ]"#;

        let edges = parse_edge_dataset(raw).unwrap();
        assert_eq!(edges.len(), 1);
        assert_eq!(
            edges[0],
            EdgeRecord {
                source_id: 0,
                target_id: 1,
                subscribers_source: 20,
                subscribers_target: 20,
                common_subscribers: 20,
                name_source: "Plotters".to_string(),
                desc_source: "Chart talk".to_string(),
                name_target: "Parsers".to_string(),
                desc_target: "Grammar talk".to_string(),
            }
        );
    }

    #[test]
    fn missing_metadata_gets_defaults() {
        let raw = r#"[{ "id_1": 5, "id_2": 8 }]"#;
        let edges = parse_edge_dataset(raw).unwrap();

        assert_eq!(edges[0].subscribers_source, 0);
        assert_eq!(edges[0].subscribers_target, 0);
        assert_eq!(edges[0].common_subscribers, 0);
        assert_eq!(edges[0].name_source, "Community 5");
        assert_eq!(edges[0].name_target, "Community 8");
        assert!(edges[0].desc_source.is_empty());
        assert!(edges[0].desc_target.is_empty());
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let raw = r#"[{ "id_1": 1, "id_2": 2, "curvature": 0.5, "weight": 3 }]"#;
        let edges = parse_edge_dataset(raw).unwrap();
        assert_eq!(edges[0].source_id, 1);
        assert_eq!(edges[0].target_id, 2);
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(parse_edge_dataset("not json").is_err());
        assert!(parse_edge_dataset(r#"{"id_1": 1}"#).is_err());
        assert!(parse_edge_dataset(r#"[{"id_2": 1}]"#).is_err());
    }

    #[test]
    fn rejects_empty_dataset() {
        let error = parse_edge_dataset("[]").unwrap_err();
        assert!(error.to_string().contains("no records"));
    }

    #[test]
    fn load_reports_the_path_on_failure() {
        let error = load_edge_dataset("/nonexistent/edges.json").unwrap_err();
        assert!(format!("{error:#}").contains("/nonexistent/edges.json"));
    }
}
