// SPDX-License-Identifier: AGPL-3.0-only
// SPDX-FileCopyrightText: 2025 Steve Clarke <stephenlclarke@mac.com> - https://xyzzy.tools

//! Replacement lineage for client order ids.
//!
//! Every ClOrdID seen on a lifecycle message becomes a node in an arena;
//! replace and cancel requests add `OrigClOrdID -> ClOrdID` edges between
//! node indices.  Chains are produced by walking from the roots (ids that are
//! never an edge target).  Input that does not form a clean forest is still
//! walked deterministically, and each irregularity is reported as a
//! [`LineageAnomaly`] rather than resolved behind the caller's back.

use crate::decoder::message::{DecodedMessage, MessageType};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::warn;

const UNKNOWN_STATUS: &str = "Unknown";

/// Indices of `messages` sorted by timestamp.  The sort is stable, so ties
/// keep input order.  A message without a timestamp borrows the timestamp of
/// the closest earlier message that has one, which keeps it next to its
/// neighbours instead of drifting to either end.
pub fn chronological_order(messages: &[DecodedMessage]) -> Vec<usize> {
    let mut carried: Option<NaiveDateTime> = None;
    let mut keyed: Vec<(Option<NaiveDateTime>, usize)> = messages
        .iter()
        .enumerate()
        .map(|(idx, msg)| {
            if msg.timestamp.is_some() {
                carried = msg.timestamp;
            }
            (carried, idx)
        })
        .collect();
    keyed.sort_by_key(|(time, _)| *time);
    keyed.into_iter().map(|(_, idx)| idx).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum LineageAnomaly {
    /// An id replaced by more than one parent.
    MultipleParents { id: String, parents: Vec<String> },
    /// An id replaced more than once; only the earliest child is followed.
    Branch { id: String, children: Vec<String> },
    /// Ids that lead back to themselves.
    Cycle { ids: Vec<String> },
}

#[derive(Debug, Clone, Serialize)]
pub struct ChainStep {
    pub cl_ord_id: String,
    pub order_id: Option<String>,
    pub first_seen: Option<NaiveDateTime>,
    pub last_seen: Option<NaiveDateTime>,
    pub duration_ms: Option<f64>,
    pub events: usize,
    pub terminal_status: String,
}

/// One logical order: the root id followed by each replacement id.
#[derive(Debug, Clone, Serialize)]
pub struct OrderChain {
    pub root: String,
    pub cl_ord_ids: Vec<String>,
    pub order_ids: Vec<Option<String>>,
    pub steps: Vec<ChainStep>,
}

impl OrderChain {
    pub fn contains(&self, cl_ord_id: &str) -> bool {
        self.cl_ord_ids.iter().any(|id| id == cl_ord_id)
    }

    pub fn id_set(&self) -> HashSet<&str> {
        self.cl_ord_ids.iter().map(String::as_str).collect()
    }

    pub fn replacement_steps(&self) -> usize {
        self.cl_ord_ids.len().saturating_sub(1)
    }
}

#[derive(Debug, Clone)]
struct OrderNode {
    cl_ord_id: String,
    order_id: Option<String>,
    first_seen: Option<NaiveDateTime>,
    last_seen: Option<NaiveDateTime>,
    /// Message indices, chronological.
    events: Vec<usize>,
    terminal_status: Option<String>,
    parents: Vec<usize>,
    children: Vec<usize>,
}

impl OrderNode {
    fn new(cl_ord_id: &str) -> Self {
        Self {
            cl_ord_id: cl_ord_id.to_string(),
            order_id: None,
            first_seen: None,
            last_seen: None,
            events: Vec::new(),
            terminal_status: None,
            parents: Vec::new(),
            children: Vec::new(),
        }
    }

    fn step(&self) -> ChainStep {
        let duration_ms = match (self.first_seen, self.last_seen) {
            (Some(first), Some(last)) => {
                Some((last - first).num_microseconds().unwrap_or(0) as f64 / 1000.0)
            }
            _ => None,
        };
        ChainStep {
            cl_ord_id: self.cl_ord_id.clone(),
            order_id: self.order_id.clone(),
            first_seen: self.first_seen,
            last_seen: self.last_seen,
            duration_ms,
            events: self.events.len(),
            terminal_status: self
                .terminal_status
                .clone()
                .unwrap_or_else(|| UNKNOWN_STATUS.to_string()),
        }
    }
}

/// Arena of order ids plus the edges between them.
#[derive(Debug, Default)]
pub struct Lineage {
    nodes: Vec<OrderNode>,
    index: HashMap<String, usize>,
    edges: Vec<(usize, usize)>,
    self_links: Vec<usize>,
}

impl Lineage {
    /// Build the arena from `messages` visited in `order` (normally
    /// [`chronological_order`]).  Only lifecycle messages take part.
    pub fn build(messages: &[DecodedMessage], order: &[usize]) -> Self {
        let mut lineage = Lineage::default();
        for &idx in order {
            let Some(msg) = messages.get(idx) else {
                continue;
            };
            let Some(kind) = msg.msg_type.as_ref().filter(|k| k.is_lifecycle()) else {
                continue;
            };
            let event = msg.order_event();
            let Some(cl_ord_id) = event.cl_ord_id() else {
                continue;
            };

            if kind.links_lineage()
                && let Some(orig) = event.orig_cl_ord_id()
            {
                let parent = lineage.intern(orig);
                let child = lineage.intern(cl_ord_id);
                lineage.link(parent, child);
            }

            let node_idx = lineage.intern(cl_ord_id);
            let node = &mut lineage.nodes[node_idx];
            node.events.push(idx);
            if let Some(ts) = msg.timestamp {
                node.first_seen = Some(node.first_seen.map_or(ts, |first| first.min(ts)));
                node.last_seen = Some(node.last_seen.map_or(ts, |last| last.max(ts)));
            }
            if node.order_id.is_none() {
                node.order_id = event.order_id().map(str::to_string);
            }
            if *kind == MessageType::ExecutionReport {
                node.terminal_status = Some(
                    event
                        .ord_status()
                        .filter(|s| !s.is_empty())
                        .unwrap_or(UNKNOWN_STATUS)
                        .to_string(),
                );
            }
        }
        lineage
    }

    fn intern(&mut self, id: &str) -> usize {
        if let Some(&idx) = self.index.get(id) {
            return idx;
        }
        let idx = self.nodes.len();
        self.nodes.push(OrderNode::new(id));
        self.index.insert(id.to_string(), idx);
        idx
    }

    fn link(&mut self, parent: usize, child: usize) {
        if parent == child {
            if !self.self_links.contains(&parent) {
                self.self_links.push(parent);
            }
            return;
        }
        // Resent requests repeat the same edge; that is not ambiguity.
        if self.edges.contains(&(parent, child)) {
            return;
        }
        self.edges.push((parent, child));
        self.nodes[parent].children.push(child);
        self.nodes[child].parents.push(parent);
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Ids that are never the target of an edge, in order of first appearance.
    pub fn roots(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .filter(|n| n.parents.is_empty())
            .map(|n| n.cl_ord_id.as_str())
            .collect()
    }

    /// Walk every root into a chain.  Nodes left unreached (branches not
    /// followed, members of cycles) start chains of their own so nothing
    /// drops out of the report.
    pub fn chains(&self) -> (Vec<OrderChain>, Vec<LineageAnomaly>) {
        let mut anomalies = self.structural_anomalies();
        let mut reached = vec![false; self.nodes.len()];
        let mut chains = Vec::new();

        let starts: Vec<usize> = (0..self.nodes.len())
            .filter(|&i| self.nodes[i].parents.is_empty())
            .collect();
        for start in starts {
            chains.push(self.walk(start, &mut reached, &mut anomalies));
        }
        while let Some(start) = reached.iter().position(|r| !r) {
            chains.push(self.walk(start, &mut reached, &mut anomalies));
        }

        for anomaly in &anomalies {
            warn!(?anomaly, "ambiguous order lineage");
        }
        (chains, anomalies)
    }

    fn structural_anomalies(&self) -> Vec<LineageAnomaly> {
        let mut anomalies = Vec::new();
        for &idx in &self.self_links {
            anomalies.push(LineageAnomaly::Cycle {
                ids: vec![self.nodes[idx].cl_ord_id.clone()],
            });
        }
        for node in &self.nodes {
            if node.parents.len() > 1 {
                anomalies.push(LineageAnomaly::MultipleParents {
                    id: node.cl_ord_id.clone(),
                    parents: self.ids(&node.parents),
                });
            }
            if node.children.len() > 1 {
                anomalies.push(LineageAnomaly::Branch {
                    id: node.cl_ord_id.clone(),
                    children: self.ids(&node.children),
                });
            }
        }
        anomalies
    }

    fn walk(
        &self,
        start: usize,
        reached: &mut [bool],
        anomalies: &mut Vec<LineageAnomaly>,
    ) -> OrderChain {
        let mut path = vec![start];
        reached[start] = true;
        let mut current = start;
        while let Some(&next) = self.nodes[current].children.first() {
            if let Some(pos) = path.iter().position(|&p| p == next) {
                let cycle = LineageAnomaly::Cycle {
                    ids: self.ids(&path[pos..]),
                };
                if !anomalies.contains(&cycle) {
                    anomalies.push(cycle);
                }
                break;
            }
            path.push(next);
            reached[next] = true;
            current = next;
        }

        let steps: Vec<ChainStep> = path.iter().map(|&i| self.nodes[i].step()).collect();
        OrderChain {
            root: self.nodes[start].cl_ord_id.clone(),
            cl_ord_ids: steps.iter().map(|s| s.cl_ord_id.clone()).collect(),
            order_ids: steps.iter().map(|s| s.order_id.clone()).collect(),
            steps,
        }
    }

    fn ids(&self, indices: &[usize]) -> Vec<String> {
        indices
            .iter()
            .map(|&i| self.nodes[i].cl_ord_id.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::config::AuditConfig;
    use crate::decoder::logline::decode_log;

    fn lineage_for(text: &str) -> (Vec<DecodedMessage>, Lineage) {
        let log = decode_log(text, &AuditConfig::default());
        let order = chronological_order(&log.messages);
        let lineage = Lineage::build(&log.messages, &order);
        (log.messages, lineage)
    }

    #[test]
    fn finds_single_root_for_linear_chain() {
        let (_, lineage) = lineage_for(
            "2024-01-01 10:00:00.000 35=D|11=A|38=100\n\
             2024-01-01 10:00:01.000 35=G|11=B|41=A|38=150\n\
             2024-01-01 10:00:02.000 35=G|11=C|41=B|38=200\n",
        );
        assert_eq!(lineage.roots(), vec!["A"]);
        let (chains, anomalies) = lineage.chains();
        assert!(anomalies.is_empty());
        assert_eq!(chains.len(), 1);
        assert_eq!(chains[0].cl_ord_ids, vec!["A", "B", "C"]);
        assert_eq!(chains[0].replacement_steps(), 2);
    }

    #[test]
    fn lineage_follows_timestamps_not_file_order() {
        let (_, lineage) = lineage_for(
            "2024-01-01 10:00:02.000 35=G|11=C|41=B\n\
             2024-01-01 10:00:00.000 35=D|11=A\n\
             2024-01-01 10:00:01.000 35=G|11=B|41=A\n",
        );
        let (chains, _) = lineage.chains();
        assert_eq!(chains.len(), 1);
        assert_eq!(chains[0].cl_ord_ids, vec!["A", "B", "C"]);
    }

    #[test]
    fn untimestamped_messages_keep_their_neighbourhood() {
        let (messages, _) = lineage_for(
            "2024-01-01 10:00:05.000 35=D|11=X\n\
             35=8|11=X|39=0\n\
             2024-01-01 10:00:01.000 35=D|11=Y\n",
        );
        let order = chronological_order(&messages);
        assert_eq!(order, vec![2, 0, 1]);
    }

    #[test]
    fn steps_carry_timing_broker_ids_and_status() {
        let (_, lineage) = lineage_for(
            "2024-01-01 10:00:00.000 35=D|11=A|38=100\n\
             2024-01-01 10:00:00.250 35=8|11=A|37=OID1|39=0|150=0\n\
             2024-01-01 10:00:01.000 35=8|11=A|37=OID1|39=1|150=1|14=10\n\
             2024-01-01 10:00:02.000 35=G|11=B|41=A|38=150\n",
        );
        let (chains, _) = lineage.chains();
        let chain = &chains[0];
        assert_eq!(chain.order_ids, vec![Some("OID1".to_string()), None]);
        let first = &chain.steps[0];
        assert_eq!(first.events, 3);
        assert_eq!(first.duration_ms, Some(1000.0));
        assert_eq!(first.terminal_status, "Partially Filled");
        assert_eq!(chain.steps[1].terminal_status, "Unknown");
    }

    #[test]
    fn edge_only_ids_have_no_timing() {
        let (_, lineage) = lineage_for("2024-01-01 10:00:00.000 35=F|11=B|41=GHOST\n");
        assert_eq!(lineage.roots(), vec!["GHOST"]);
        let (chains, _) = lineage.chains();
        assert_eq!(chains[0].cl_ord_ids, vec!["GHOST", "B"]);
        assert_eq!(chains[0].steps[0].events, 0);
        assert_eq!(chains[0].steps[0].duration_ms, None);
        assert_eq!(chains[0].steps[0].first_seen, None);
    }

    #[test]
    fn non_lifecycle_messages_are_ignored() {
        let (_, lineage) = lineage_for("35=0|11=A\n35=9|11=B|41=A\n");
        assert!(lineage.is_empty());
        let (chains, anomalies) = lineage.chains();
        assert!(chains.is_empty());
        assert!(anomalies.is_empty());
    }

    #[test]
    fn branches_are_reported_and_split() {
        let (_, lineage) = lineage_for(
            "2024-01-01 10:00:00.000 35=D|11=A\n\
             2024-01-01 10:00:01.000 35=G|11=B|41=A\n\
             2024-01-01 10:00:02.000 35=G|11=C|41=A\n",
        );
        let (chains, anomalies) = lineage.chains();
        assert_eq!(chains.len(), 2);
        assert_eq!(chains[0].cl_ord_ids, vec!["A", "B"]);
        assert_eq!(chains[1].cl_ord_ids, vec!["C"]);
        assert_eq!(
            anomalies,
            vec![LineageAnomaly::Branch {
                id: "A".into(),
                children: vec!["B".into(), "C".into()],
            }]
        );
    }

    #[test]
    fn multiple_parents_are_reported() {
        let (_, lineage) = lineage_for(
            "2024-01-01 10:00:00.000 35=D|11=A\n\
             2024-01-01 10:00:00.500 35=D|11=X\n\
             2024-01-01 10:00:01.000 35=G|11=B|41=A\n\
             2024-01-01 10:00:02.000 35=G|11=B|41=X\n",
        );
        let (chains, anomalies) = lineage.chains();
        assert_eq!(chains.len(), 2);
        assert!(chains.iter().all(|c| c.contains("B")));
        assert!(anomalies.contains(&LineageAnomaly::MultipleParents {
            id: "B".into(),
            parents: vec!["A".into(), "X".into()],
        }));
    }

    #[test]
    fn cycles_terminate_and_are_reported() {
        let (_, lineage) = lineage_for(
            "2024-01-01 10:00:00.000 35=G|11=B|41=A\n\
             2024-01-01 10:00:01.000 35=G|11=A|41=B\n\
             2024-01-01 10:00:02.000 35=G|11=C|41=C\n",
        );
        // A and B only point at each other, so C is the sole root.
        assert_eq!(lineage.roots(), vec!["C"]);
        let (chains, anomalies) = lineage.chains();
        assert_eq!(chains.len(), 2);
        assert_eq!(chains[0].cl_ord_ids, vec!["C"]);
        assert_eq!(chains[1].cl_ord_ids, vec!["A", "B"]);
        assert!(anomalies.contains(&LineageAnomaly::Cycle {
            ids: vec!["A".into(), "B".into()]
        }));
        assert!(anomalies.contains(&LineageAnomaly::Cycle {
            ids: vec!["C".into()]
        }));
    }

    #[test]
    fn repeated_edges_are_not_anomalies() {
        let (_, lineage) = lineage_for(
            "2024-01-01 10:00:00.000 35=D|11=A\n\
             2024-01-01 10:00:01.000 35=G|11=B|41=A\n\
             2024-01-01 10:00:01.100 35=G|11=B|41=A|43=Y\n",
        );
        let (chains, anomalies) = lineage.chains();
        assert!(anomalies.is_empty());
        assert_eq!(chains[0].cl_ord_ids, vec!["A", "B"]);
    }
}
