use csv::WriterBuilder;
use geojson::FeatureCollection;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

use crate::error::Result;

/// File name of the marker membership table.
pub const MARKER_TABLE_FILE: &str = "markers_within_features.csv";

/// Serialize a feature collection, pretty output indented by one space.
pub fn write_collection<W: Write>(writer: W, collection: &FeatureCollection, pretty: bool) -> Result<()> {
    if pretty {
        let formatter = PrettyFormatter::with_indent(b" ");
        let mut serializer = Serializer::with_formatter(writer, formatter);
        collection.serialize(&mut serializer)?;
    } else {
        serde_json::to_writer(writer, collection)?;
    }
    Ok(())
}

/// Write a feature collection to a file.
pub fn write_collection_file(path: &Path, collection: &FeatureCollection, pretty: bool) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_collection(&mut writer, collection, pretty)?;
    writer.flush()?;
    debug!(
        path = %path.display(),
        features = collection.features.len(),
        "Wrote collection"
    );
    Ok(())
}

/// Write headerless `(marker name, label)` rows. Returns the row count.
pub fn write_marker_table<'a, W, I>(writer: W, rows: I) -> Result<usize>
where
    W: Write,
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut csv_writer = WriterBuilder::new().has_headers(false).from_writer(writer);
    let mut count = 0;
    for (name, label) in rows {
        csv_writer.write_record([name, label])?;
        count += 1;
    }
    csv_writer.flush()?;
    Ok(count)
}

/// Write the marker table into `dir`.
pub fn write_marker_table_file<'a, I>(dir: &Path, rows: I) -> Result<usize>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let file = File::create(dir.join(MARKER_TABLE_FILE))?;
    write_marker_table(BufWriter::new(file), rows)
}

/// Create the output directory and any missing parents.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)?;
    Ok(())
}
