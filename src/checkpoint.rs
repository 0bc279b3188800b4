//! Text encoding of tree checkpoints.
//!
//! The point file lists, for every leaf in depth-first NW, NE, SW, SE order, a
//! `#` header with the leaf's depth and bounds followed by one tab-separated
//! `x  y  value` row per point. The node file holds one tab-separated
//! `depth  x_min  x_max  y_min  y_max  value` row per leaf in the same order.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::config::CheckpointPaths;
use crate::error::{Result, TreeError};
use crate::node::{NodeArena, NodeId};
use crate::point::Point;
use crate::statistic::Statistic;

/// Header line of the node file.
pub const NODE_HEADER: &str = "# depth\tx_min\tx_max\ty_min\ty_max\tvalue";

/// Decimal places used for aggregate values in the node file.
pub const VALUE_PRECISION: usize = 3;

/// Writes every leaf's points below `root`.
pub fn write_points<W: Write>(arena: &NodeArena, root: NodeId, writer: &mut W) -> io::Result<()> {
    for leaf in arena.leaves(root) {
        let node = arena.get(leaf);
        let b = node.bounds();
        writeln!(
            writer,
            "# Depth = {}, x = {} - {}, y = {} - {}",
            node.depth(),
            b.x_min(),
            b.x_max(),
            b.y_min(),
            b.y_max()
        )?;
        for p in node.points() {
            writeln!(writer, "{}\t{}\t{}", p.x, p.y, p.value)?;
        }
    }
    Ok(())
}

/// Writes one summary row per leaf below `root`. Computes (and caches) leaf
/// values that have not been read yet.
pub fn write_nodes<W: Write>(
    arena: &mut NodeArena,
    root: NodeId,
    statistic: Statistic,
    writer: &mut W,
) -> io::Result<()> {
    writeln!(writer, "{}", NODE_HEADER)?;
    for leaf in arena.leaves(root) {
        let value = arena.value(leaf, statistic).unwrap_or(f64::NAN);
        let node = arena.get(leaf);
        let b = node.bounds();
        writeln!(
            writer,
            "{}\t{}\t{}\t{}\t{}\t{:.*}",
            node.depth(),
            b.x_min(),
            b.x_max(),
            b.y_min(),
            b.y_max(),
            VALUE_PRECISION,
            value
        )?;
    }
    Ok(())
}

/// Parses a point file. Comment and blank lines are skipped.
pub fn read_points<R: BufRead>(reader: R) -> Result<Vec<Point>> {
    let mut points = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        points.push(parse_point(trimmed, index + 1)?);
    }
    Ok(points)
}

fn parse_point(line: &str, line_number: usize) -> Result<Point> {
    let malformed = |reason: String| TreeError::MalformedCheckpoint { line: line_number, reason };

    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != 3 {
        return Err(malformed(format!("expected 3 fields, found {}", fields.len())));
    }
    let mut values = [0.0; 3];
    for (slot, field) in values.iter_mut().zip(&fields) {
        *slot = field
            .parse::<f64>()
            .map_err(|e| malformed(format!("invalid number {:?}: {}", field, e)))?;
    }
    Ok(Point::new(values[0], values[1], values[2]))
}

/// Rewrites both checkpoint files in full.
pub fn write_files(
    arena: &mut NodeArena,
    root: NodeId,
    statistic: Statistic,
    paths: &CheckpointPaths,
) -> Result<()> {
    let mut writer = BufWriter::new(File::create(&paths.points)?);
    write_points(arena, root, &mut writer)?;
    writer.flush()?;

    let mut writer = BufWriter::new(File::create(&paths.nodes)?);
    write_nodes(arena, root, statistic, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Reads a point file. A missing file yields `Ok(None)`.
pub fn read_points_file(path: &Path) -> Result<Option<Vec<Point>>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    read_points(BufReader::new(file)).map(Some)
}
