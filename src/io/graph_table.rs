use super::mpg::{parse_node, write_node};
use super::{fields, open, parse_f64, parse_usize, record_line, semicolon_reader};
use crate::error::{SahgaError, SahgaResult};
use crate::graph::{ProximityGraph, COL_CLASS, COL_ID};
use crate::table::ObservationTable;
use std::io::{Read, Write};
use std::path::Path;
use tracing::{debug, info};

/// Loads a combined graph+table file.
pub fn read_graph_table(path: &Path) -> SahgaResult<(ProximityGraph, ObservationTable)> {
    info!("📂 Loading graph and observations: {}", path.display());
    read_graph_table_from_reader(open(path)?)
}

/// Header `rows;cols`, then one `id;n;nb..;w..;col0;..;colN` line per row.
/// Neighbor ids must refer to rows of the same file.
pub fn read_graph_table_from_reader<R: Read>(
    reader: R,
) -> SahgaResult<(ProximityGraph, ObservationTable)> {
    let mut rdr = semicolon_reader(reader);
    let mut records = rdr.records();

    let header = records
        .next()
        .ok_or_else(|| SahgaError::MalformedInput("missing 'rows;cols' header".into()))??;
    let line = record_line(&header);
    let hf = fields(&header);
    if hf.len() != 2 {
        return Err(SahgaError::MalformedInput(format!(
            "line {}: header must be 'rows;cols'",
            line
        )));
    }
    let rows = parse_usize(hf[0], line, "row count")?;
    let cols = parse_usize(hf[1], line, "column count")?;

    let mut table = ObservationTable::with_shape(rows, cols)?;
    let mut graph = ProximityGraph::new();
    let mut values = Vec::with_capacity(cols);

    for result in records {
        let rec = result?;
        let line = record_line(&rec);
        let f = fields(&rec);
        let (node, consumed) = parse_node(&f, line)?;

        let row = graph.len();
        if row >= rows {
            return Err(SahgaError::MalformedInput(format!(
                "line {}: more data lines than the {} declared rows",
                line, rows
            )));
        }
        if f.len() - consumed != cols {
            return Err(SahgaError::MalformedInput(format!(
                "line {}: expected {} values, got {}",
                line,
                cols,
                f.len() - consumed
            )));
        }
        if let Some(edge) = node.edges.iter().find(|e| e.neighbor >= rows) {
            return Err(SahgaError::MalformedInput(format!(
                "line {}: neighbor id {} exceeds row count {}",
                line,
                edge.neighbor + 1,
                rows
            )));
        }

        values.clear();
        for field in &f[consumed..] {
            values.push(parse_f64(field, line, "value")?);
        }
        table.set_row(row, &values)?;
        graph.insert(node);
    }

    if graph.len() != rows {
        return Err(SahgaError::MalformedInput(format!(
            "header declares {} rows, file has {}",
            rows,
            graph.len()
        )));
    }
    debug!("   {}x{} table, {} edges", rows, cols, graph.edge_count());
    Ok((graph, table))
}

/// Writes a file readable by [`read_graph_table_from_reader`].
pub fn write_graph_table<W: Write>(
    graph: &ProximityGraph,
    table: &ObservationTable,
    w: &mut W,
) -> SahgaResult<()> {
    graph.validate_against(table)?;
    writeln!(w, "{};{}", table.rows(), table.cols())?;
    for (i, node) in graph.nodes.iter().enumerate() {
        write_node(node, w)?;
        let row: Vec<String> = table.row(i).iter().map(|v| v.to_string()).collect();
        writeln!(w, "{}", row.join(";"))?;
    }
    Ok(())
}

/// Joins an MPG with sampled layer data `[id, lon, lat, class, x0..]` into
/// the `[class, x0..]` observation table the optimizer scores.
pub fn merge_layer_data(
    graph: &ProximityGraph,
    layer_data: &ObservationTable,
) -> SahgaResult<ObservationTable> {
    if graph.len() != layer_data.rows() {
        return Err(SahgaError::MalformedInput(format!(
            "MPG has {} nodes but layer data has {} rows",
            graph.len(),
            layer_data.rows()
        )));
    }
    if layer_data.cols() <= COL_CLASS + 1 {
        return Err(SahgaError::MalformedInput(
            "layer data holds no layer values".into(),
        ));
    }

    let cols = layer_data.cols() - COL_CLASS;
    let mut table = ObservationTable::with_shape(layer_data.rows(), cols)?;
    for (i, node) in graph.nodes.iter().enumerate() {
        let src = layer_data.row(i);
        if src[COL_ID] as u64 != node.id {
            return Err(SahgaError::MalformedInput(format!(
                "row {}: MPG node {} does not match layer data id {}",
                i + 1,
                node.id,
                src[COL_ID]
            )));
        }
        table.set_row(i, &src[COL_CLASS..])?;
    }
    Ok(table)
}
