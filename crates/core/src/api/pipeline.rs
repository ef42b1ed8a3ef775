//! Pipeline passes.
//!
//! Provides the passes that turn input files into output files:
//! - [`NeighborhoodPipeline::compute_neighbor_list`] - assemble coordinates
//!   and write the neighbor list
//! - [`NeighborhoodPipeline::compute_section_table`] - 2D summary of one section
//! - [`NeighborhoodPipeline::compute_volume_table`] - 3D summary of all cells
//! - [`NeighborhoodPipeline::run_all`] - all of the above in order

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use rayon::ThreadPool;
use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use rustc_hash::FxHashSet;
use tracing::{debug, info, warn};

use crate::aggregate::{AggregationRow, CellTypeAggregator};
use crate::assemble::assemble_from_dir;
use crate::codec::{
    NeighborListReader, NeighborListWriter, NeighborRecord, create_neighbor_list,
    open_neighbor_list,
};
use crate::config::PipelineConfig;
use crate::error::{HoodError, Result};
use crate::filter::ScopeFilter;
use crate::io::{SummaryTableWriter, create_summary_table, read_metadata};
use crate::model::{Annotations, CellTable, cell_in_section};
use crate::spatial::NeighborFinder;

/// Records between two progress messages of an aggregation pass.
pub const PROGRESS_INTERVAL: usize = 5_000;

pub(crate) fn default_thread_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Build the worker pool used by every pass.
pub fn build_pool(threads: Option<usize>) -> Result<ThreadPool> {
    ThreadPoolBuilder::new()
        .num_threads(threads.unwrap_or_else(default_thread_count))
        .build()
        .map_err(|e| HoodError::InvalidConfig(format!("cannot start worker pool: {e}")))
}

/// Outcome of one pass.
#[derive(Debug, Clone, PartialEq)]
pub struct PassSummary {
    pub pass: String,
    pub output: PathBuf,
    pub records: usize,
    pub elapsed: Duration,
}

/// Which records a summary pass aggregates and how their neighborhoods are
/// restricted first.
#[derive(Debug, Clone)]
pub struct PassScope {
    /// Only records whose source cell belongs to this section are summarized.
    pub source_section: Option<String>,
    pub filter: ScopeFilter,
}

impl PassScope {
    /// Every cell, whole-volume neighborhoods.
    pub fn volume(radius_px: f64) -> Self {
        Self {
            source_section: None,
            filter: ScopeFilter::volume(radius_px),
        }
    }

    /// Cells of `section`, neighborhoods restricted to that section.
    pub fn section(section: &str, radius_px: f64) -> Self {
        Self {
            source_section: Some(section.to_string()),
            filter: ScopeFilter::section(section, radius_px),
        }
    }

    fn selects(&self, record: &NeighborRecord) -> bool {
        self.source_section
            .as_deref()
            .is_none_or(|s| cell_in_section(record.source(), s))
    }
}

/// Stream `records` through `scope` and `aggregator` into `writer`.
///
/// Records are decoded and summarized `chunk_size` at a time on `pool`; rows
/// are written in input order. Every selected source must be annotated and
/// appear only once. The first decode, lookup or source error aborts the
/// pass. Returns the number of rows written.
pub fn summarize_records<R: BufRead, W: Write>(
    records: NeighborListReader<R>,
    scope: &PassScope,
    aggregator: &CellTypeAggregator<'_>,
    writer: &mut SummaryTableWriter<W>,
    pool: &ThreadPool,
    chunk_size: usize,
) -> Result<usize> {
    let chunk_size = chunk_size.max(1);
    let start = Instant::now();
    let mut records = records;
    let mut seen = 0usize;
    let mut written = 0usize;
    let mut chunk: Vec<NeighborRecord> = Vec::with_capacity(chunk_size);
    let mut sources: FxHashSet<String> = FxHashSet::default();

    loop {
        chunk.clear();
        for record in records.by_ref() {
            let record = record?;
            seen += 1;
            if seen % PROGRESS_INTERVAL == 0 {
                info!(
                    records = seen,
                    elapsed_s = start.elapsed().as_secs(),
                    "records processed"
                );
            }
            if scope.selects(&record) {
                check_source(&record, aggregator.annotations(), &mut sources, seen)?;
                chunk.push(record);
                if chunk.len() == chunk_size {
                    break;
                }
            }
        }
        if chunk.is_empty() {
            break;
        }

        let rows: Vec<AggregationRow> = pool.install(|| {
            chunk
                .par_drain(..)
                .map(|mut record| {
                    record.remove_self();
                    scope.filter.apply(&mut record);
                    aggregator.aggregate(&record)
                })
                .collect::<Result<Vec<_>>>()
        })?;
        for row in &rows {
            writer.write_row(row)?;
        }
        written += rows.len();
        debug!(written, "summary chunk written");
    }

    Ok(written)
}

/// A selected source must be a known cell that has not been summarized yet.
fn check_source(
    record: &NeighborRecord,
    annotations: &Annotations,
    sources: &mut FxHashSet<String>,
    line: usize,
) -> Result<()> {
    let source = record.source();
    if annotations.get(source).is_none() {
        return Err(HoodError::DataIntegrity(format!(
            "line {line}: source cell {source} is not present in the metadata"
        )));
    }
    if !sources.insert(source.to_string()) {
        return Err(HoodError::DataIntegrity(format!(
            "line {line}: source cell {source} appears more than once"
        )));
    }
    Ok(())
}

/// Drop the partial output of a failed pass.
fn discard_on_error<T>(result: Result<T>, output: &Path) -> Result<T> {
    if result.is_err()
        && output.exists()
        && let Err(e) = std::fs::remove_file(output)
    {
        warn!(output = %output.display(), error = %e, "cannot remove partial output");
    }
    result
}

/// Runs passes against the files named by a [`PipelineConfig`].
pub struct NeighborhoodPipeline {
    config: PipelineConfig,
    pool: ThreadPool,
}

impl NeighborhoodPipeline {
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        let pool = build_pool(config.threads)?;
        Ok(Self { config, pool })
    }

    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Metadata table with raw coordinates.
    pub fn load_metadata(&self) -> Result<CellTable> {
        read_metadata(&self.config.metadata_path(), &self.config.metadata_columns)
    }

    /// Metadata table moved into the shared 3D pixel space.
    pub fn load_assembled_table(&self) -> Result<CellTable> {
        assemble_from_dir(self.load_metadata()?, &self.config)
    }

    /// Write the neighbor list of `table` to `writer`.
    pub fn write_neighbor_list<W: Write>(
        &self,
        table: &CellTable,
        writer: &mut NeighborListWriter<W>,
    ) -> Result<usize> {
        let radius_px = self.config.microns_to_px(self.config.discovery_radius_um);
        let finder = NeighborFinder::new(table, radius_px, self.config.strategy);
        finder.write_all(&self.pool, self.config.chunk_size, writer)
    }

    /// Assemble coordinates and write the neighbor-list file.
    pub fn compute_neighbor_list(&self) -> Result<PassSummary> {
        let start = Instant::now();
        let table = self.load_assembled_table()?;
        let output = self.config.neighbor_list_path();
        let records = discard_on_error(
            create_neighbor_list(&output).and_then(|mut writer| {
                let records = self.write_neighbor_list(&table, &mut writer)?;
                writer.finish()?;
                Ok(records)
            }),
            &output,
        )?;
        Ok(self.finish_pass("neighbors", output, records, start))
    }

    /// 2D summary table of one section.
    pub fn compute_section_table(&self, section: &str) -> Result<PassSummary> {
        let metadata = self.load_metadata()?;
        self.compute_section_table_with(section, &metadata)
    }

    /// 2D summary table of one section, using an already loaded metadata table.
    pub fn compute_section_table_with(
        &self,
        section: &str,
        metadata: &CellTable,
    ) -> Result<PassSummary> {
        let start = Instant::now();
        let cells = metadata.section_subset(section);
        if cells.is_empty() {
            return Err(HoodError::DataIntegrity(format!(
                "section {section} has no cells in the metadata"
            )));
        }
        info!(section, cells = cells.len(), "computing 2D neighborhoods");

        let radius_px = self.config.microns_to_px(self.config.aggregation_radius_um);
        let output = self.config.section_table_path(section);
        let rows = self.summarize(
            &cells.annotations(),
            &PassScope::section(section, radius_px),
            &output,
        )?;
        Ok(self.finish_pass(&format!("2D {section}"), output, rows, start))
    }

    /// 3D summary table of every cell.
    pub fn compute_volume_table(&self) -> Result<PassSummary> {
        let metadata = self.load_metadata()?;
        self.compute_volume_table_with(&metadata)
    }

    /// 3D summary table, using an already loaded metadata table.
    pub fn compute_volume_table_with(&self, metadata: &CellTable) -> Result<PassSummary> {
        let start = Instant::now();
        info!(cells = metadata.len(), "computing 3D neighborhoods");
        let radius_px = self.config.microns_to_px(self.config.aggregation_radius_um);
        let output = self.config.volume_table_path();
        let rows = self.summarize(
            &metadata.annotations(),
            &PassScope::volume(radius_px),
            &output,
        )?;
        Ok(self.finish_pass("3D", output, rows, start))
    }

    /// Neighbor list, the configured 2D sections, then the 3D table.
    pub fn run_all(&self) -> Result<Vec<PassSummary>> {
        let mut summaries = vec![self.compute_neighbor_list()?];
        let metadata = self.load_metadata()?;
        for section in &self.config.sections {
            summaries.push(self.compute_section_table_with(section, &metadata)?);
        }
        summaries.push(self.compute_volume_table_with(&metadata)?);
        Ok(summaries)
    }

    /// Summarize the neighbor list into `output`. Every annotated cell must get
    /// exactly one row; anything else means the list does not belong to this
    /// metadata, and the partial table is removed.
    fn summarize(
        &self,
        annotations: &Annotations,
        scope: &PassScope,
        output: &Path,
    ) -> Result<usize> {
        let list = self.config.neighbor_list_path();
        let records = open_neighbor_list(&list)?;
        let result = self
            .summarize_into(records, annotations, scope, output)
            .and_then(|rows| {
                if rows == annotations.len() {
                    Ok(rows)
                } else {
                    Err(HoodError::DataIntegrity(format!(
                        "{rows} records for {} cells in the metadata",
                        annotations.len()
                    )))
                }
            })
            .map_err(|e| match e {
                HoodError::DataIntegrity(msg) => {
                    HoodError::DataIntegrity(format!("{}: {msg}", list.display()))
                }
                e => e,
            });
        discard_on_error(result, output)
    }

    fn summarize_into<R: BufRead>(
        &self,
        records: NeighborListReader<R>,
        annotations: &Annotations,
        scope: &PassScope,
        output: &Path,
    ) -> Result<usize> {
        let aggregator = CellTypeAggregator::new(
            annotations,
            scope.filter.radius_px.unwrap_or(f64::INFINITY),
            self.config.min_distance_sentinel,
        );
        let mut writer = create_summary_table(output)?;
        let rows = summarize_records(
            records,
            scope,
            &aggregator,
            &mut writer,
            &self.pool,
            self.config.chunk_size,
        )?;
        writer.finish()?;
        Ok(rows)
    }

    fn finish_pass(&self, pass: &str, output: PathBuf, records: usize, start: Instant) -> PassSummary {
        let elapsed = start.elapsed();
        info!(
            pass,
            records,
            output = %output.display(),
            elapsed_s = elapsed.as_secs_f64(),
            "pass complete"
        );
        PassSummary {
            pass: pass.to_string(),
            output,
            records,
            elapsed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_MIN_DISTANCE_SENTINEL as SENTINEL;
    use crate::model::CellType;

    fn annotations() -> Annotations {
        [
            ("section_10_A1", CellType::Tumor5),
            ("section_10_A2", CellType::CD8TCells3),
            ("section_16_B1", CellType::Macrophages2),
        ]
        .into_iter()
        .map(|(id, t)| (id.to_string(), t))
        .collect()
    }

    const LIST: &str = "section_10_A1,section_10_A1,section_10_A2,section_16_B1,0,5,168\n\
                        section_10_A2,section_10_A1,section_10_A2,5,0\n\
                        section_16_B1,section_10_A1,section_16_B1,168,0\n";

    fn run(scope: &PassScope, chunk_size: usize) -> Result<Vec<String>> {
        let ann = annotations();
        let radius = scope.filter.radius_px.unwrap_or(f64::INFINITY);
        let aggregator = CellTypeAggregator::new(&ann, radius, SENTINEL);
        let mut writer = SummaryTableWriter::new(Vec::new())?;
        let pool = build_pool(Some(2))?;
        summarize_records(
            NeighborListReader::new(LIST.as_bytes()),
            scope,
            &aggregator,
            &mut writer,
            &pool,
            chunk_size,
        )?;
        let out = String::from_utf8(writer.finish()?).unwrap();
        Ok(out.lines().skip(1).map(str::to_string).collect())
    }

    #[test]
    fn volume_pass_summarizes_every_record_in_order() {
        let rows = run(&PassScope::volume(200.0), 1).unwrap();
        assert_eq!(rows.len(), 3);
        assert!(rows[0].starts_with("section_10_A1,"));
        assert!(rows[2].starts_with("section_16_B1,"));
    }

    #[test]
    fn section_pass_selects_sources_and_neighbors() {
        let rows = run(&PassScope::section("section_10", 200.0), 16).unwrap();
        assert_eq!(rows.len(), 2);
        let fields: Vec<&str> = rows[0].split(',').collect();
        let macrophage = 1 + CellType::Macrophages2.column();
        let cd8 = 1 + CellType::CD8TCells3.column();
        // B1 sits in another section, so it is dropped even within the radius
        assert_eq!(fields[macrophage], "0");
        assert_eq!(fields[cd8], "1");
        assert_eq!(fields[cd8 + CellType::COUNT], "5");
    }

    #[test]
    fn malformed_record_aborts_pass() {
        let ann = annotations();
        let aggregator = CellTypeAggregator::new(&ann, 100.0, SENTINEL);
        let mut writer = SummaryTableWriter::new(Vec::new()).unwrap();
        let pool = build_pool(Some(1)).unwrap();
        let err = summarize_records(
            NeighborListReader::new("section_10_A1,section_10_A1,0\nbroken,x\n".as_bytes()),
            &PassScope::volume(100.0),
            &aggregator,
            &mut writer,
            &pool,
            8,
        )
        .unwrap_err();
        assert!(matches!(err, HoodError::Format { line: 2, .. }));
    }

    fn source_error(list: &str) -> String {
        let ann = annotations();
        let aggregator = CellTypeAggregator::new(&ann, 100.0, SENTINEL);
        let mut writer = SummaryTableWriter::new(Vec::new()).unwrap();
        let pool = build_pool(Some(1)).unwrap();
        let err = summarize_records(
            NeighborListReader::new(list.as_bytes()),
            &PassScope::volume(100.0),
            &aggregator,
            &mut writer,
            &pool,
            8,
        )
        .unwrap_err();
        assert!(err.is_data_integrity(), "{err}");
        err.to_string()
    }

    #[test]
    fn unknown_source_aborts_pass() {
        let msg = source_error("section_10_A1,section_10_A1,0\nsection_99_Z,section_99_Z,0\n");
        assert!(msg.contains("line 2") && msg.contains("section_99_Z"), "{msg}");
    }

    #[test]
    fn repeated_source_aborts_pass() {
        let msg = source_error("section_10_A1,section_10_A1,0\nsection_10_A1,section_10_A1,0\n");
        assert!(msg.contains("more than once"), "{msg}");
    }
}
