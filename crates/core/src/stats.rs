//! Fleet statistics as returned by `GET /stats`.

use serde::{Deserialize, Serialize};

/// Queue depths per pipeline stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskCounts {
    #[serde(default)]
    pub prepare_pending: u64,
    #[serde(default)]
    pub prepare_running: u64,
    #[serde(default)]
    pub pending: u64,
    #[serde(default)]
    pub running: u64,
    #[serde(default)]
    pub merge_pending: u64,
    #[serde(default)]
    pub merge_running: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyCounts {
    #[serde(default)]
    pub jobs_created: u64,
    #[serde(default)]
    pub jobs_finished: u64,
    #[serde(default)]
    pub dumps_merged: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    Idle,
    Working,
    /// Any status string this client does not know about yet.
    #[serde(untagged)]
    Other(String),
}

impl NodeStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Idle => "idle",
            Self::Working => "working",
            Self::Other(s) => s,
        }
    }
}

impl std::fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderNode {
    pub name: String,
    pub status: NodeStatus,
    #[serde(rename = "threads", alias = "threadCount", default)]
    pub thread_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrepareNode {
    pub name: String,
    pub status: NodeStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateStats {
    #[serde(default)]
    pub tasks: TaskCounts,
    #[serde(default)]
    pub today: DailyCounts,
    #[serde(default)]
    pub render_nodes: Vec<RenderNode>,
    #[serde(default)]
    pub prepare_nodes: Vec<PrepareNode>,
}

impl AggregateStats {
    /// Render threads offered by the whole fleet.
    pub fn total_render_threads(&self) -> u64 {
        self.render_nodes
            .iter()
            .map(|n| u64::from(n.thread_count))
            .sum()
    }

    /// Render threads on nodes that are currently working.
    pub fn working_render_threads(&self) -> u64 {
        self.render_nodes
            .iter()
            .filter(|n| n.status == NodeStatus::Working)
            .map(|n| u64::from(n.thread_count))
            .sum()
    }
}
