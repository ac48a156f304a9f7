//! The covering pipeline: read, normalize, cover, guard, classify, emit.
//!
//! Features are guarded, classified and written strictly in input order.
//! Coverings may be computed ahead on the rayon pool in batches; their results
//! are consumed in order, so output is identical to a sequential run.

use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use crate::config::{DegeneratePolicy, PipelineConfig};
use crate::covering::{cover_shapes, FeatureCovering, SizeGuard, SkippedFeature};
use crate::error::Result;
use crate::exchange::assembler::{marker_feature, separate_collection, separate_file_name};
use crate::exchange::reader::{self, input_stem, InputCollection};
use crate::exchange::writer::{ensure_dir, write_collection_file, write_marker_table_file};
use crate::exchange::{Assembler, CombinedCollection};
use crate::geometry::build_shapes;
use crate::markers::{classify, LabelCollector, Marker};
use crate::models::FeatureRecord;

/// Features covered per parallel batch.
const COVERING_BATCH_SIZE: usize = 256;

/// Progress log interval, in features.
const PROGRESS_INTERVAL: usize = 1000;

/// Counts and artifacts of one run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub features_read: usize,
    /// Features classified and given overlays
    pub processed: usize,
    /// Features dropped by the size guard
    pub skipped: Vec<SkippedFeature>,
    /// Features dropped for a degenerate ring
    pub failed: usize,
    pub outer_cells: usize,
    pub hole_cells: usize,
    /// Rows in the marker table, when markers were given
    pub marker_rows: Option<usize>,
    pub output_files: Vec<PathBuf>,
}

/// A configured pipeline.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run over an input file, with an optional marker table.
    pub fn run(&self, input: &Path, markers: Option<&Path>) -> Result<RunSummary> {
        self.run_with_progress(input, markers, |_, _| {})
    }

    /// Like [`Pipeline::run`], calling `progress(done, total)` after each feature.
    pub fn run_with_progress<F>(&self, input: &Path, markers: Option<&Path>, progress: F) -> Result<RunSummary>
    where
        F: FnMut(usize, usize),
    {
        let collection = reader::read_features(input)?;
        let marker_set = match markers {
            Some(path) => Some(reader::read_markers(path)?),
            None => None,
        };

        self.process(collection, marker_set, &input_stem(input), progress)
    }

    /// Process an already parsed collection.
    ///
    /// `markers` of `None` means no marker table was given; the marker table
    /// is only written when it is `Some`, even if empty.
    pub fn process<F>(
        &self,
        input: InputCollection,
        markers: Option<Vec<Marker>>,
        stem: &str,
        mut progress: F,
    ) -> Result<RunSummary>
    where
        F: FnMut(usize, usize),
    {
        let out = &self.config.output;
        ensure_dir(&out.directory)?;

        let total = input.len();
        let has_markers = markers.is_some();
        let markers = markers.unwrap_or_default();

        let guard = SizeGuard::new(self.config.guard.max_cell_features);
        let assembler = Assembler::new(&self.config.style, out.grid_level);
        let mut collector = LabelCollector::new(markers.len());
        let mut combined = CombinedCollection::new(if out.separate {
            Vec::new()
        } else {
            input.features.clone()
        });

        let mut summary = RunSummary {
            features_read: total,
            ..Default::default()
        };

        let mut done = 0;
        for batch in input.records.chunks(self.batch_size()) {
            let coverings = self.cover_batch(batch);

            for (record, covering) in batch.iter().zip(coverings) {
                done += 1;
                if done % PROGRESS_INTERVAL == 0 {
                    info!("Parsed {} Features", done);
                }

                let covering = match covering {
                    Ok(covering) => covering,
                    Err(e) if !e.is_fatal() && self.config.on_degenerate == DegeneratePolicy::Skip => {
                        warn!(path = %record.path, error = %e, "Dropping feature");
                        summary.failed += 1;
                        progress(done, total);
                        continue;
                    }
                    Err(e) => {
                        error!(path = %record.path, error = %e, "Feature conversion failed");
                        return Err(e);
                    }
                };

                if let Some(skipped) = guard.check(&record.path, covering.outer.len(), covering.holes.len()) {
                    summary.skipped.push(skipped);
                    progress(done, total);
                    continue;
                }

                let classification = classify(&covering, record.is_hole(), &record.path, &markers);
                collector.record(&classification);

                summary.processed += 1;
                summary.outer_cells += covering.outer.len();
                summary.hole_cells += covering.holes.len();

                let overlays = assembler.overlays(record, &covering);

                if out.separate {
                    let marker_features = if out.include_markers {
                        classification
                            .members()
                            .into_iter()
                            .map(|(i, status)| marker_feature(&markers[i], collector.labels_for(i), Some(status)))
                            .collect()
                    } else {
                        Vec::new()
                    };
                    let original = input.features[record.index].clone();
                    let path = out.directory.join(separate_file_name(record));
                    write_collection_file(&path, &separate_collection(overlays, original, marker_features), out.pretty)?;
                    summary.output_files.push(path);
                } else {
                    combined.push_overlays(overlays);
                }

                progress(done, total);
            }
        }

        info!("Parsed {} Features", done);

        if !out.separate {
            let marker_features = if out.include_markers {
                markers
                    .iter()
                    .enumerate()
                    .map(|(i, marker)| marker_feature(marker, collector.labels_for(i), None))
                    .collect()
            } else {
                Vec::new()
            };
            let path = out.directory.join(format!("{}.geojson", stem));
            debug!(overlays = combined.overlay_count(), "Writing combined collection");
            write_collection_file(&path, &combined.finish(marker_features), out.pretty)?;
            summary.output_files.push(path);
        }

        if has_markers {
            let rows = write_marker_table_file(&out.directory, collector.rows(&markers))?;
            info!("Wrote {} marker rows", rows);
            summary.marker_rows = Some(rows);
        }

        Ok(summary)
    }

    fn batch_size(&self) -> usize {
        if self.config.parallel_covering {
            COVERING_BATCH_SIZE
        } else {
            1
        }
    }

    fn cover_batch(&self, batch: &[FeatureRecord]) -> Vec<Result<FeatureCovering>> {
        if self.config.parallel_covering {
            batch.par_iter().map(|record| self.cover_feature(record)).collect()
        } else {
            batch.iter().map(|record| self.cover_feature(record)).collect()
        }
    }

    fn cover_feature(&self, record: &FeatureRecord) -> Result<FeatureCovering> {
        let shapes = build_shapes(&record.geometry)?;
        Ok(cover_shapes(&shapes, record.is_hole(), &self.config.covering))
    }
}
