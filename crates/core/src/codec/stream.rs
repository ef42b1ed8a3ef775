//! Streaming reader and writer for neighbor-list files.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use super::record::NeighborRecord;
use crate::error::{HoodError, Result};

/// Iterator over the decoded records of a neighbor-list file.
///
/// Lines are read one at a time into a reused buffer, so memory use does not
/// grow with the file.
pub struct NeighborListReader<R> {
    reader: R,
    buf: String,
    line_no: usize,
    failed: bool,
}

impl<R: BufRead> NeighborListReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: String::new(),
            line_no: 0,
            failed: false,
        }
    }

    /// Number of lines consumed so far.
    pub const fn lines_read(&self) -> usize {
        self.line_no
    }
}

/// Open the neighbor-list file at `path`.
pub fn open_neighbor_list(path: &Path) -> Result<NeighborListReader<BufReader<File>>> {
    if !path.exists() {
        return Err(HoodError::MissingFile(path.to_path_buf()));
    }
    Ok(NeighborListReader::new(BufReader::new(File::open(path)?)))
}

impl<R: BufRead> Iterator for NeighborListReader<R> {
    type Item = Result<NeighborRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        self.buf.clear();
        match self.reader.read_line(&mut self.buf) {
            Ok(0) => None,
            Ok(_) => {
                self.line_no += 1;
                let item = NeighborRecord::decode(&self.buf, self.line_no);
                self.failed = item.is_err();
                Some(item)
            }
            Err(e) => {
                self.failed = true;
                Some(Err(e.into()))
            }
        }
    }
}

/// Writes records one line each.
pub struct NeighborListWriter<W: Write> {
    writer: W,
    line: String,
    written: usize,
}

impl<W: Write> NeighborListWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            line: String::new(),
            written: 0,
        }
    }

    pub fn write_record(&mut self, record: &NeighborRecord) -> Result<()> {
        self.line.clear();
        record.encode_into(&mut self.line);
        self.line.push('\n');
        self.writer.write_all(self.line.as_bytes())?;
        self.written += 1;
        Ok(())
    }

    pub const fn records_written(&self) -> usize {
        self.written
    }

    /// Flush and hand back the underlying writer.
    pub fn finish(mut self) -> Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

/// Create (or truncate) the neighbor-list file at `path`.
pub fn create_neighbor_list(path: &Path) -> Result<NeighborListWriter<BufWriter<File>>> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    Ok(NeighborListWriter::new(BufWriter::new(File::create(path)?)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reader_yields_records_in_order() {
        let data = "a,a,b,0,3\nb,a,b,3,0\n";
        let records: Vec<_> = NeighborListReader::new(data.as_bytes())
            .collect::<Result<Vec<_>>>()
            .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].source(), "b");
        assert_eq!(records[1].distances(), &[3, 0]);
    }

    #[test]
    fn reader_stops_after_first_error() {
        let data = "a,a,0\nbad,line\nc,c,0\n";
        let mut reader = NeighborListReader::new(data.as_bytes());
        assert!(reader.next().unwrap().is_ok());
        match reader.next().unwrap() {
            Err(HoodError::Format { line, .. }) => assert_eq!(line, 2),
            other => panic!("unexpected item: {other:?}"),
        }
        assert!(reader.next().is_none());
    }

    #[test]
    fn writer_then_reader() {
        let records = vec![
            NeighborRecord::from_pairs("a", [("a", 0), ("b", 12)]),
            NeighborRecord::from_pairs("b", [("a", 12), ("b", 0)]),
        ];
        let mut writer = NeighborListWriter::new(Vec::new());
        for r in &records {
            writer.write_record(r).unwrap();
        }
        assert_eq!(writer.records_written(), 2);
        let bytes = writer.finish().unwrap();
        assert_eq!(
            String::from_utf8(bytes.clone()).unwrap(),
            "a,a,b,0,12\nb,a,b,12,0\n"
        );

        let back: Vec<_> = NeighborListReader::new(bytes.as_slice())
            .collect::<Result<Vec<_>>>()
            .unwrap();
        assert_eq!(back, records);
    }

    #[test]
    fn missing_file_is_reported() {
        let err = open_neighbor_list(Path::new("/nonexistent/neighbors.csv")).err();
        assert!(matches!(err, Some(HoodError::MissingFile(_))));
    }
}
