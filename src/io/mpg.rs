use super::{fields, open, parse_f64, parse_usize, record_line, semicolon_reader};
use crate::error::{SahgaError, SahgaResult};
use crate::graph::{Edge, Node, ProximityGraph};
use std::io::{Read, Write};
use std::path::Path;
use tracing::debug;

/// Parses the `id;n;nb_1..nb_n;w_1..w_n` prefix of a line.
///
/// Neighbor ids are 1-based in files and come back as row indices. Returns
/// the node and the number of fields consumed.
pub(crate) fn parse_node(fields: &[&str], line: u64) -> SahgaResult<(Node, usize)> {
    if fields.len() < 2 {
        return Err(SahgaError::MalformedInput(format!(
            "line {}: missing node id or neighbor count",
            line
        )));
    }
    let id = parse_usize(fields[0], line, "node id")? as u64;
    let n = parse_usize(fields[1], line, "neighbor count")?;
    let consumed = n
        .checked_mul(2)
        .and_then(|x| x.checked_add(2))
        .filter(|&c| c <= fields.len());
    let Some(consumed) = consumed else {
        return Err(SahgaError::MalformedInput(format!(
            "line {}: node {} declares {} neighbors but the line is too short",
            line, id, n
        )));
    };

    let mut edges = Vec::with_capacity(n);
    for k in 0..n {
        let neighbor_id = parse_usize(fields[2 + k], line, "neighbor id")?;
        if neighbor_id == 0 {
            return Err(SahgaError::MalformedInput(format!(
                "line {}: neighbor ids start at 1",
                line
            )));
        }
        let weight = parse_f64(fields[2 + n + k], line, "edge weight")?;
        edges.push(Edge {
            neighbor: neighbor_id - 1,
            weight,
        });
    }
    Ok((Node { id, edges }, consumed))
}

/// Writes `id;n;nb..;w..;` for one node, without the line break.
pub(crate) fn write_node<W: Write>(node: &Node, w: &mut W) -> SahgaResult<()> {
    write!(w, "{};{};", node.id, node.neighbor_count())?;
    for edge in &node.edges {
        write!(w, "{};", edge.neighbor + 1)?;
    }
    for edge in &node.edges {
        write!(w, "{};", edge.weight)?;
    }
    Ok(())
}

/// Saves the graph in MPG format with a two-line comment header.
pub fn write_mpg<W: Write>(
    graph: &ProximityGraph,
    source_name: &str,
    radius: f64,
    w: &mut W,
) -> SahgaResult<()> {
    writeln!(
        w,
        "// Proximity matrix for file: {} - radius = {} km - policy = {}",
        source_name,
        radius,
        graph.policy.tag()
    )?;
    writeln!(w, "// MPG format --> #id;n;Rel1;Rel2;...;Reln;W1;W2;...;Wn")?;
    for node in &graph.nodes {
        write_node(node, w)?;
        writeln!(w)?;
    }
    Ok(())
}

pub fn read_mpg(path: &Path) -> SahgaResult<ProximityGraph> {
    debug!("Loading MPG from {}", path.display());
    read_mpg_from_reader(open(path)?)
}

/// Reads MPG lines. The weighting policy is not recorded in the data and is
/// left `Undefined`.
pub fn read_mpg_from_reader<R: Read>(reader: R) -> SahgaResult<ProximityGraph> {
    let mut rdr = semicolon_reader(reader);
    let mut graph = ProximityGraph::new();
    for result in rdr.records() {
        let rec = result?;
        let line = record_line(&rec);
        let f = fields(&rec);
        let (node, consumed) = parse_node(&f, line)?;
        if consumed != f.len() {
            return Err(SahgaError::MalformedInput(format!(
                "line {}: {} unexpected trailing fields",
                line,
                f.len() - consumed
            )));
        }
        graph.insert(node);
    }
    debug!("   {} nodes, {} edges", graph.len(), graph.edge_count());
    Ok(graph)
}
