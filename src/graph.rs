use std::{collections::HashSet, fs::read_to_string, path::Path};

use log::debug;

use crate::{
    error::{DbError, Result},
    gml::{self, entries_with_key, Entry, Value},
};

/// One gene cluster of the pangenome graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceNode {
    /// The GML label, unique within the graph.
    pub id: String,
    /// Number of genomes supporting the cluster.
    pub size: i64,
    pub centroids: Vec<String>,
    pub name: String,
    pub description: Vec<String>,
}

/// Read the graph file and return its nodes in file order.
pub fn load_graph(path: &Path) -> Result<Vec<SourceNode>> {
    let text = read_to_string(path)?;
    let nodes = parse_graph(&text)?;
    debug!("Read {} nodes from {}", nodes.len(), path.display());
    Ok(nodes)
}

pub fn parse_graph(text: &str) -> Result<Vec<SourceNode>> {
    let document = gml::parse(text)?;
    let mut graphs = entries_with_key(&document, "graph");
    let graph = match (graphs.next(), graphs.next()) {
        (Some(graph), None) => graph,
        (None, _) => return Err(DbError::parse(1, "no 'graph' block found")),
        (Some(_), Some(second)) => {
            return Err(DbError::parse(second.line, "more than one 'graph' block"))
        }
    };
    let attributes = graph
        .value
        .as_list()
        .ok_or_else(|| DbError::parse(graph.line, "'graph' is not a list"))?;
    let mut ids = HashSet::new();
    let mut labels = HashSet::new();
    entries_with_key(attributes, "node")
        .map(|entry| {
            let node = SourceNode::from_entry(entry)?;
            if !ids.insert(node_key(entry, "id")?) {
                return Err(DbError::parse(entry.line, "node id is duplicated"));
            }
            if !labels.insert(node.id.clone()) {
                return Err(DbError::parse(
                    entry.line,
                    format!("node label '{}' is duplicated", node.id),
                ));
            }
            Ok(node)
        })
        .collect()
}

impl SourceNode {
    fn from_entry(entry: &Entry) -> Result<Self> {
        let attributes = entry
            .value
            .as_list()
            .ok_or_else(|| DbError::parse(entry.line, "'node' is not a list"))?;
        let id = node_key(entry, "label")?;
        let size = parse_size(&id, single(&id, attributes, "size")?)?;
        let centroids = split_field(text_attribute(&id, attributes, "centroid")?);
        let name = text_attribute(&id, attributes, "name")?.to_string();
        let description = split_field(text_attribute(&id, attributes, "description")?);
        Ok(Self {
            id,
            size,
            centroids,
            name,
            description,
        })
    }
}

/// The `id` or `label` of a node, both of which networkx requires exactly once.
fn node_key(entry: &Entry, key: &'static str) -> Result<String> {
    let attributes = entry.value.as_list().unwrap_or_default();
    let mut values = entries_with_key(attributes, key);
    let value = match (values.next(), values.next()) {
        (Some(value), None) => &value.value,
        (None, _) => return Err(DbError::parse(entry.line, format!("node has no '{key}'"))),
        (Some(_), Some(repeat)) => {
            return Err(DbError::parse(repeat.line, format!("node has more than one '{key}'")))
        }
    };
    match value {
        Value::Str(text) => Ok(text.clone()),
        Value::Int(number) => Ok(number.to_string()),
        Value::Real(number) => Ok(number.to_string()),
        Value::List(_) => Err(DbError::parse(entry.line, format!("node '{key}' is a list"))),
    }
}

fn single<'a>(node: &str, attributes: &'a [Entry], attribute: &'static str) -> Result<&'a Value> {
    let mut values = entries_with_key(attributes, attribute);
    match (values.next(), values.next()) {
        (Some(entry), None) => Ok(&entry.value),
        (None, _) => Err(DbError::BadAttribute {
            node: node.to_string(),
            attribute,
            problem: "missing",
        }),
        (Some(_), Some(_)) => Err(DbError::BadAttribute {
            node: node.to_string(),
            attribute,
            problem: "repeated",
        }),
    }
}

fn text_attribute<'a>(
    node: &str,
    attributes: &'a [Entry],
    attribute: &'static str,
) -> Result<&'a str> {
    match single(node, attributes, attribute)? {
        Value::Str(text) => Ok(text),
        _ => Err(DbError::BadAttribute {
            node: node.to_string(),
            attribute,
            problem: "non-string",
        }),
    }
}

/// networkx stores the size as a string; plain numbers are accepted too.
fn parse_size(node: &str, value: &Value) -> Result<i64> {
    let invalid = |value: String| DbError::Validation {
        node: node.to_string(),
        attribute: "size",
        value,
    };
    match value {
        Value::Int(size) => Ok(*size),
        Value::Real(size) if size.is_finite() => Ok(size.trunc() as i64),
        Value::Real(size) => Err(invalid(size.to_string())),
        Value::Str(size) => size.trim().parse().map_err(|_| invalid(size.clone())),
        Value::List(_) => Err(invalid("a list".to_string())),
    }
}

fn split_field(field: &str) -> Vec<String> {
    field.split(';').map(String::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: usize, label: &str, body: &str) -> String {
        format!("  node [\n    id {id}\n    label \"{label}\"\n{body}  ]\n")
    }

    fn attributes(size: &str, centroid: &str, name: &str, desc: &str) -> String {
        format!(
            "    size {size}\n    centroid \"{centroid}\"\n    name \"{name}\"\n    description \"{desc}\"\n"
        )
    }

    fn full_node(label: &str, size: &str, centroid: &str, name: &str, desc: &str) -> String {
        let id = label.bytes().map(usize::from).sum();
        node(id, label, &attributes(size, centroid, name, desc))
    }

    #[test]
    fn loads_nodes_in_order() {
        let text = format!(
            "graph [\n{}{}  edge [ source 0 target 1 ]\n]\n",
            full_node("n1", "\"2\"", "A;B", "geneX", "d1;d2"),
            full_node("n2", "1", "C", "geneY", "d3"),
        );
        let nodes = parse_graph(&text).unwrap();
        assert_eq!(
            nodes[0],
            SourceNode {
                id: "n1".to_string(),
                size: 2,
                centroids: vec!["A".to_string(), "B".to_string()],
                name: "geneX".to_string(),
                description: vec!["d1".to_string(), "d2".to_string()],
            }
        );
        assert_eq!(nodes[1].size, 1);
        assert_eq!(nodes[1].centroids, vec!["C".to_string()]);
    }

    #[test]
    fn empty_fields_split_like_strings() {
        let text = format!("graph [\n{}]", full_node("n", "3", "", "", ""));
        let nodes = parse_graph(&text).unwrap();
        assert_eq!(nodes[0].centroids, vec![String::new()]);
        assert_eq!(nodes[0].description, vec![String::new()]);
    }

    #[test]
    fn real_size_is_truncated() {
        let text = format!("graph [\n{}]", full_node("n", "4.0", "A", "g", "d"));
        assert_eq!(parse_graph(&text).unwrap()[0].size, 4);
    }

    #[test]
    fn missing_attribute() {
        let text = format!(
            "graph [\n{}]",
            node(0, "lonely", "    size 1\n    centroid \"A\"\n    name \"g\"\n")
        );
        match parse_graph(&text) {
            Err(DbError::BadAttribute {
                node,
                attribute,
                problem,
            }) => {
                assert_eq!(node, "lonely");
                assert_eq!(attribute, "description");
                assert_eq!(problem, "missing");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn repeated_and_non_string_attributes() {
        let text = format!(
            "graph [\n{}]",
            node(
                0,
                "n",
                "    size 1\n    centroid \"A\"\n    centroid \"B\"\n    name \"g\"\n    description \"d\"\n"
            )
        );
        assert!(matches!(
            parse_graph(&text),
            Err(DbError::BadAttribute { problem: "repeated", .. })
        ));
        let text = format!("graph [\n{}]", full_node("n", "1", "A", "g", "d").replace("\"g\"", "7"));
        assert!(matches!(
            parse_graph(&text),
            Err(DbError::BadAttribute { attribute: "name", problem: "non-string", .. })
        ));
    }

    #[test]
    fn non_numeric_size() {
        let text = format!("graph [\n{}]", full_node("n", "\"many\"", "A", "g", "d"));
        match parse_graph(&text) {
            Err(DbError::Validation { node, value, .. }) => {
                assert_eq!(node, "n");
                assert_eq!(value, "many");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn graph_block_is_required() {
        assert!(matches!(parse_graph("node [ id 1 ]"), Err(DbError::Parse { .. })));
        assert!(matches!(
            parse_graph("graph [ ] graph [ ]"),
            Err(DbError::Parse { .. })
        ));
        assert!(parse_graph("graph [ directed 0 ]").unwrap().is_empty());
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("final_graph.gml");
        let text = format!("graph [\n{}]", full_node("n", "1", "A", "g", "d"));
        std::fs::write(&path, text).unwrap();
        assert_eq!(load_graph(&path).unwrap().len(), 1);
    }

    #[test]
    fn node_without_id() {
        let text = format!(
            "graph [\n  node [\n    label \"n\"\n{}  ]\n]",
            attributes("1", "A", "g", "d")
        );
        match parse_graph(&text) {
            Err(DbError::Parse { line, message }) => {
                assert_eq!(line, 2);
                assert!(message.contains("'id'"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn node_without_label() {
        let text = format!(
            "graph [\n  node [\n    id 3\n{}  ]\n]",
            attributes("1", "A", "g", "d")
        );
        assert!(matches!(parse_graph(&text), Err(DbError::Parse { line: 2, .. })));
    }

    #[test]
    fn duplicated_label() {
        let text = format!(
            "graph [\n{}{}]",
            node(0, "g", &attributes("1", "A", "x", "d")),
            node(1, "g", &attributes("1", "B", "y", "d")),
        );
        match parse_graph(&text) {
            Err(DbError::Parse { line, message }) => {
                assert_eq!(line, 10);
                assert!(message.contains("'g' is duplicated"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn duplicated_id() {
        let text = format!(
            "graph [\n{}{}]",
            node(4, "a", &attributes("1", "A", "x", "d")),
            node(4, "b", &attributes("1", "B", "y", "d")),
        );
        assert!(matches!(parse_graph(&text), Err(DbError::Parse { line: 10, .. })));
    }
}
