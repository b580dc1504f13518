use std::collections::{BTreeSet, HashMap};

use crate::merge::{CentroidIndex, MergeGroup};

/// Joins the gene names of one merge group.
pub const GROUP_SEPARATOR: &str = "~~~";

/// Group name for every centroid that belongs to a merge group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CentroidToGroupName {
    names: HashMap<String, String>,
}

impl CentroidToGroupName {
    pub fn get(&self, centroid: &str) -> Option<&str> {
        self.names.get(centroid).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Union of the gene names of all centroids in `group`, sorted so that the
/// label is the same on every run.
pub fn group_name(group: &MergeGroup, index: &CentroidIndex) -> String {
    let names: BTreeSet<&str> = group
        .centroids
        .iter()
        .flat_map(|centroid| index.genes_of(centroid))
        .map(String::as_str)
        .collect();
    names.into_iter().collect::<Vec<_>>().join(GROUP_SEPARATOR)
}

pub fn name_groups(groups: &[MergeGroup], index: &CentroidIndex) -> CentroidToGroupName {
    let mut names = HashMap::new();
    for group in groups {
        let name = group_name(group, index);
        for centroid in &group.centroids {
            names.insert(centroid.clone(), name.clone());
        }
    }
    CentroidToGroupName { names }
}
