//! Exchange formats: GeoJSON and marker CSV in, annotated GeoJSON and the
//! marker table out.

pub mod assembler;
pub mod reader;
pub mod writer;

pub use assembler::{Assembler, CombinedCollection};
pub use reader::{read_features, read_markers, InputCollection};
pub use writer::{write_collection_file, write_marker_table_file, MARKER_TABLE_FILE};
