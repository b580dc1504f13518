use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::{
    error::{DbError, Result},
    graph::load_graph,
    merge::merge_centroids,
    naming::name_groups,
    sequences::{self, EmitStats},
};

pub const GENE_DATA_FILE: &str = "gene_data.csv";
pub const GRAPH_FILE: &str = "final_graph.gml";

/// Validated inputs of one database build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub gene_data: PathBuf,
    pub graph: PathBuf,
    pub out_dir: PathBuf,
    pub min_support: u32,
}

impl DbConfig {
    /// Locate the inputs inside a Panaroo output directory. Fails before
    /// anything is read if either of them is missing.
    pub fn from_panaroo_dir(directory: &Path, out_dir: &Path, min_support: u32) -> Result<Self> {
        let gene_data = directory.join(GENE_DATA_FILE);
        let graph = directory.join(GRAPH_FILE);
        for (what, path) in [("gene_data.csv", &gene_data), ("final_graph.gml", &graph)] {
            if !path.is_file() {
                return Err(DbError::MissingInput {
                    what,
                    path: path.clone(),
                });
            }
        }
        Ok(Self {
            gene_data,
            graph,
            out_dir: out_dir.to_path_buf(),
            min_support,
        })
    }
}

/// Load the graph, merge co-occurring centroids and write the ARIBA database.
pub fn generate_db(config: &DbConfig) -> Result<EmitStats> {
    info!("Loading graph from {}", config.graph.display());
    let nodes = load_graph(&config.graph)?;
    let merged = merge_centroids(&nodes, i64::from(config.min_support));
    let names = name_groups(&merged.groups, &merged.index);
    if names.is_empty() {
        warn!(
            "No gene cluster reaches a support of {}; the database will be empty",
            config.min_support
        );
    }
    debug!("{} centroids carry a group name", names.len());
    std::fs::create_dir_all(&config.out_dir)?;
    info!("Extracting sequences from {}", config.gene_data.display());
    sequences::emit(&config.gene_data, &config.out_dir, &names, &merged.index)
}
