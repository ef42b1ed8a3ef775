//! Typed neighbor-list record and its line encoding.
//!
//! On disk a record is one comma-separated line:
//!
//! ```text
//! <source>,<id_1>,...,<id_k>,<d_1>,...,<d_k>
//! ```
//!
//! so a well-formed line always has `1 + 2k` fields. In memory the ids and
//! distances are two parallel vectors that only change together.

use crate::error::{HoodError, Result};

/// Field separator of the line encoding.
pub const FIELD_SEPARATOR: char = ',';

/// Neighbors of one source cell with their rounded distances in pixels.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NeighborRecord {
    source: String,
    ids: Vec<String>,
    distances: Vec<u32>,
}

impl NeighborRecord {
    /// Empty record for `source`.
    pub fn new(source: impl Into<String>) -> Self {
        Self::with_capacity(source, 0)
    }

    pub fn with_capacity(source: impl Into<String>, capacity: usize) -> Self {
        Self {
            source: source.into(),
            ids: Vec::with_capacity(capacity),
            distances: Vec::with_capacity(capacity),
        }
    }

    /// Record built from (id, distance) pairs.
    pub fn from_pairs<I, S>(source: impl Into<String>, pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, u32)>,
        S: Into<String>,
    {
        let mut record = Self::new(source);
        for (id, distance) in pairs {
            record.push(id, distance);
        }
        record
    }

    pub fn push(&mut self, id: impl Into<String>, distance: u32) {
        self.ids.push(id.into());
        self.distances.push(distance);
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn distances(&self) -> &[u32] {
        &self.distances
    }

    /// Number of neighbor entries (the source itself counts if present).
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Number of fields in the line encoding.
    pub fn encoded_len(&self) -> usize {
        1 + 2 * self.ids.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> + '_ {
        self.ids
            .iter()
            .map(String::as_str)
            .zip(self.distances.iter().copied())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|n| n == id)
    }

    /// Distance to `id`, if it is a neighbor.
    pub fn distance_to(&self, id: &str) -> Option<u32> {
        self.iter().find(|&(n, _)| n == id).map(|(_, d)| d)
    }

    /// Keep the entries for which `keep(id, distance)` holds, in order.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&str, u32) -> bool,
    {
        let mut write = 0;
        for read in 0..self.ids.len() {
            if keep(&self.ids[read], self.distances[read]) {
                self.ids.swap(write, read);
                self.distances.swap(write, read);
                write += 1;
            }
        }
        self.ids.truncate(write);
        self.distances.truncate(write);
    }

    /// Drop every entry naming the source cell. Returns how many were removed.
    pub fn remove_self(&mut self) -> usize {
        let before = self.len();
        let source = std::mem::take(&mut self.source);
        self.retain(|id, _| id != source);
        self.source = source;
        before - self.len()
    }

    /// Consuming form of [`NeighborRecord::remove_self`].
    pub fn without_self(mut self) -> Self {
        self.remove_self();
        self
    }

    /// Append the line encoding (without newline) to `out`.
    pub fn encode_into(&self, out: &mut String) {
        use std::fmt::Write;

        out.push_str(&self.source);
        for id in &self.ids {
            out.push(FIELD_SEPARATOR);
            out.push_str(id);
        }
        for d in &self.distances {
            out.push(FIELD_SEPARATOR);
            // writing to a String cannot fail
            let _ = write!(out, "{d}");
        }
    }

    /// Line encoding without newline.
    pub fn encode(&self) -> String {
        let mut out = String::with_capacity(self.source.len() + self.ids.len() * 24);
        self.encode_into(&mut out);
        out
    }

    /// Decode one line. `line_no` is 1-based and only used in errors.
    pub fn decode(line: &str, line_no: usize) -> Result<Self> {
        let line = line.trim_end_matches(['\r', '\n']);
        let format_err = |msg: String| HoodError::Format { line: line_no, msg };

        let fields: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
        let source = fields[0];
        if source.is_empty() {
            return Err(format_err("missing source cell id".to_string()));
        }
        if fields.len() % 2 == 0 {
            return Err(format_err(format!(
                "record for {source} has {} fields; expected the source id plus matching id and distance halves",
                fields.len()
            )));
        }

        let k = (fields.len() - 1) / 2;
        let (ids, distances) = fields[1..].split_at(k);

        let mut record = Self::with_capacity(source, k);
        for (pos, (&id, &raw)) in ids.iter().zip(distances).enumerate() {
            if id.is_empty() {
                return Err(format_err(format!(
                    "record for {source} has an empty neighbor id at position {}",
                    pos + 1
                )));
            }
            let distance = raw.trim().parse::<u32>().map_err(|_| {
                format_err(format!(
                    "record for {source} has distance {raw:?} at position {}, expected a non-negative integer",
                    pos + 1
                ))
            })?;
            record.push(id, distance);
        }
        Ok(record)
    }
}
