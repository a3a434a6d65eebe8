use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeInfo {
    pub id: String,
    pub label: String,
    /// "To X: ..." / "From X: ..." descriptions, in edge order.
    pub action: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subgraph: Option<String>,
}

impl NodeInfo {
    /// A node seen only by reference: label is the id, no actions.
    pub fn bare(id: &str, subgraph: Option<String>) -> Self {
        NodeInfo {
            id: id.to_string(),
            label: id.to_string(),
            action: Vec::new(),
            subgraph,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
    pub action: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedDiagram {
    pub nodes: IndexMap<String, NodeInfo>,
    pub edges: Vec<Edge>,
    pub subgraphs: IndexMap<String, Vec<String>>,
}

impl ParsedDiagram {
    pub fn node(&self, id: &str) -> Option<&NodeInfo> {
        self.nodes.get(id)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty() && self.subgraphs.is_empty()
    }
}

/// User annotation attached to a node id. Outlives the node itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub content: String,
    pub node_info: NodeInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_content: Option<String>,
}

impl Note {
    pub fn new(node_info: NodeInfo) -> Self {
        Note {
            content: String::new(),
            node_info,
            ai_content: None,
        }
    }
}
