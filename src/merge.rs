//! Merging of centroids that co-occur in a gene cluster.
//!
//! Every qualifying node either registers its only centroid or links all of its
//! centroids together. The connected components of the resulting graph are the
//! merge groups: centroids that end up in one group are treated as one reference
//! cluster downstream.
use std::collections::{BTreeSet, HashMap};

use log::{debug, info};

use crate::{find_union::FindUnion, graph::SourceNode};

/// Undirected co-occurrence graph over centroid ids.
#[derive(Debug, Clone, Default)]
pub struct CentroidMergeGraph {
    ids: HashMap<String, usize>,
    centroids: Vec<String>,
    components: FindUnion,
}

/// A connected component of the merge graph. Members are in order of first
/// appearance, which carries no meaning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeGroup {
    pub centroids: Vec<String>,
}

impl CentroidMergeGraph {
    pub fn add_node(&mut self, centroid: &str) -> usize {
        if let Some(&index) = self.ids.get(centroid) {
            return index;
        }
        let index = self.components.push();
        self.ids.insert(centroid.to_string(), index);
        self.centroids.push(centroid.to_string());
        index
    }

    pub fn add_edge(&mut self, centroid1: &str, centroid2: &str) {
        let node1 = self.add_node(centroid1);
        let node2 = self.add_node(centroid2);
        let united = self.components.unite(node1, node2);
        debug_assert!(united.is_some(), "add_node hands out in-range indices");
    }

    pub fn node_count(&self) -> usize {
        self.centroids.len()
    }

    /// Partition the nodes into connected components, ordered by their
    /// earliest member.
    pub fn connected_components(mut self) -> Vec<MergeGroup> {
        let mut group_of_root: HashMap<usize, usize> = HashMap::new();
        let mut groups: Vec<MergeGroup> = vec![];
        for (index, centroid) in self.centroids.into_iter().enumerate() {
            let root = self.components.find(index).unwrap_or(index);
            let group = *group_of_root.entry(root).or_insert_with(|| {
                groups.push(MergeGroup { centroids: vec![] });
                groups.len() - 1
            });
            groups[group].centroids.push(centroid);
        }
        groups
    }
}

/// Gene names and description tokens seen for each centroid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CentroidIndex {
    pub genes: HashMap<String, BTreeSet<String>>,
    pub descriptions: HashMap<String, BTreeSet<String>>,
}

impl CentroidIndex {
    fn record(&mut self, centroid: &str, node: &SourceNode) {
        self.genes
            .entry(centroid.to_string())
            .or_default()
            .insert(node.name.clone());
        self.descriptions
            .entry(centroid.to_string())
            .or_default()
            .extend(node.description.iter().cloned());
    }

    pub fn genes_of(&self, centroid: &str) -> impl Iterator<Item = &String> {
        self.genes.get(centroid).into_iter().flatten()
    }

    pub fn descriptions_of(&self, centroid: &str) -> impl Iterator<Item = &String> {
        self.descriptions.get(centroid).into_iter().flatten()
    }
}

#[derive(Debug, Clone)]
pub struct Merged {
    pub index: CentroidIndex,
    pub groups: Vec<MergeGroup>,
}

/// Build the merge groups from every node whose size reaches `min_support`.
///
/// Nodes below the threshold are skipped outright, so they contribute neither
/// edges nor gene names and descriptions to the index.
pub fn merge_centroids(nodes: &[SourceNode], min_support: i64) -> Merged {
    let mut graph = CentroidMergeGraph::default();
    let mut index = CentroidIndex::default();
    let mut qualifying = 0;
    for node in nodes.iter().filter(|node| node.size >= min_support) {
        qualifying += 1;
        match node.centroids.as_slice() {
            [only] => {
                graph.add_node(only);
            }
            centroids => {
                for (i, centroid1) in centroids.iter().enumerate() {
                    for centroid2 in &centroids[i + 1..] {
                        graph.add_edge(centroid1, centroid2);
                    }
                }
            }
        }
        for centroid in &node.centroids {
            index.record(centroid, node);
        }
    }
    debug!(
        "{} of {} nodes reach a support of {}",
        qualifying,
        nodes.len(),
        min_support
    );
    let centroid_count = graph.node_count();
    let groups = graph.connected_components();
    info!(
        "Merged {} centroids into {} groups",
        centroid_count,
        groups.len()
    );
    Merged { index, groups }
}
