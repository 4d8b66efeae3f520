// Formatters for displaying the shard report.
use std::io::Write;

use crate::error::Result;
use crate::report::ShardReport;

/// Column titles of the shard table.
pub const TABLE_HEADER: [&str; 3] = ["Collection", "ShardID", "points_count"];
/// Separator printed under the header.
pub const TABLE_SEPARATOR: &str = "-----------------------------------";
/// Blank cells added on the left of every column.
const CELL_PADDING: usize = 2;

fn table_rows(shards: &[ShardReport]) -> Vec<[String; 3]> {
    shards
        .iter()
        .map(|shard| {
            [
                shard.collection_name.clone(),
                shard.shard_id.to_string(),
                shard.points_count.to_string(),
            ]
        })
        .collect()
}

fn write_row<W: Write>(writer: &mut W, cells: &[&str], widths: &[usize]) -> Result<()> {
    for (cell, width) in cells.iter().zip(widths) {
        write!(writer, "{:>width$}", cell, width = width + CELL_PADDING)?;
    }
    writeln!(writer)?;
    Ok(())
}

/// Writes the shard report as a right-aligned table.
///
/// The header and separator are always written, even when there are no shards.
/// Column widths are derived from the widest cell, so identical input always
/// renders to identical bytes.
pub fn render_table<W: Write>(writer: &mut W, shards: &[ShardReport]) -> Result<()> {
    let rows = table_rows(shards);

    let mut widths = TABLE_HEADER.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    write_row(writer, &TABLE_HEADER, &widths)?;
    writeln!(writer, "{TABLE_SEPARATOR}")?;
    for row in &rows {
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        write_row(writer, &cells, &widths)?;
    }
    Ok(())
}

/// Writes the shard report as a pretty-printed JSON array.
pub fn render_json<W: Write>(writer: &mut W, shards: &[ShardReport]) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, shards)?;
    writeln!(writer)?;
    Ok(())
}
