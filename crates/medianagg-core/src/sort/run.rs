//! Sorted run files: length-prefixed CBOR frames in an anonymous temp file.

use crate::{
    error::InternalError,
    serialize::{deserialize_bounded, serialize},
    value::Value,
};
use std::{
    fs::File,
    io::{self, BufReader, BufWriter, ErrorKind, Read, Seek, SeekFrom, Write},
    path::Path,
};

const FRAME_HEADER_BYTES: usize = 4;

///
/// SpilledRun
///
/// One sorted run written to storage. The backing file has no name on disk
/// and disappears when the run (or its reader) is dropped.
///

#[derive(Debug)]
pub(super) struct SpilledRun {
    file: File,
    rows: u64,
    bytes: u64,
}

impl SpilledRun {
    /// Write an already-sorted batch as one run.
    pub(super) fn write(
        values: &[Value],
        dir: Option<&Path>,
        max_frame_bytes: usize,
    ) -> Result<Self, InternalError> {
        let mut writer = RunWriter::create(dir, max_frame_bytes)?;
        for value in values {
            writer.push(value)?;
        }

        writer.finish()
    }

    pub(super) const fn rows(&self) -> u64 {
        self.rows
    }

    pub(super) const fn bytes(&self) -> u64 {
        self.bytes
    }

    /// Rewind the run and open it for one forward pass.
    pub(super) fn into_reader(mut self, max_frame_bytes: usize) -> Result<RunReader, InternalError> {
        self.file
            .seek(SeekFrom::Start(0))
            .map_err(|e| io_exhausted("rewind run file", &e))?;

        Ok(RunReader {
            reader: BufReader::new(self.file),
            remaining: self.rows,
            max_frame_bytes,
        })
    }
}

///
/// RunWriter
///
/// Streams ascending values into a new run. Used for freshly sorted batches
/// and for intermediate merges.
///

pub(super) struct RunWriter {
    writer: BufWriter<File>,
    rows: u64,
    bytes: u64,
    max_frame_bytes: usize,
}

impl RunWriter {
    pub(super) fn create(dir: Option<&Path>, max_frame_bytes: usize) -> Result<Self, InternalError> {
        let file = match dir {
            Some(dir) => tempfile::tempfile_in(dir),
            None => tempfile::tempfile(),
        }
        .map_err(|e| io_exhausted("create run file", &e))?;

        Ok(Self {
            writer: BufWriter::new(file),
            rows: 0,
            bytes: 0,
            max_frame_bytes,
        })
    }

    pub(super) fn push(&mut self, value: &Value) -> Result<(), InternalError> {
        let frame = serialize(value)?;
        if frame.len() > self.max_frame_bytes {
            return Err(InternalError::sort_exhausted(format!(
                "spilled value of {} bytes exceeds frame limit {}",
                frame.len(),
                self.max_frame_bytes
            )));
        }
        let len = u32::try_from(frame.len())
            .map_err(|_| InternalError::sort_exhausted("spilled value exceeds u32 frame length"))?;

        self.writer
            .write_all(&len.to_le_bytes())
            .and_then(|()| self.writer.write_all(&frame))
            .map_err(|e| io_exhausted("write run frame", &e))?;
        self.rows += 1;
        self.bytes += (FRAME_HEADER_BYTES + frame.len()) as u64;

        Ok(())
    }

    pub(super) fn finish(self) -> Result<SpilledRun, InternalError> {
        let file = self
            .writer
            .into_inner()
            .map_err(|e| io_exhausted("flush run file", e.error()))?;

        Ok(SpilledRun {
            file,
            rows: self.rows,
            bytes: self.bytes,
        })
    }
}

///
/// RunReader
///

#[derive(Debug)]
pub(super) struct RunReader {
    reader: BufReader<File>,
    remaining: u64,
    max_frame_bytes: usize,
}

impl RunReader {
    pub(super) fn next_value(&mut self) -> Result<Option<Value>, InternalError> {
        if self.remaining == 0 {
            return Ok(None);
        }

        let mut header = [0u8; FRAME_HEADER_BYTES];
        self.reader
            .read_exact(&mut header)
            .map_err(|e| read_failure("read run frame header", &e))?;

        let len = u32::from_le_bytes(header) as usize;
        if len > self.max_frame_bytes {
            return Err(InternalError::sort_corruption(format!(
                "run frame of {len} bytes exceeds frame limit {}",
                self.max_frame_bytes
            )));
        }

        let mut frame = vec![0u8; len];
        self.reader
            .read_exact(&mut frame)
            .map_err(|e| read_failure("read run frame", &e))?;

        let value = deserialize_bounded(&frame, self.max_frame_bytes)
            .map_err(|e| InternalError::sort_corruption(e.to_string()))?;
        self.remaining -= 1;

        Ok(Some(value))
    }
}

fn io_exhausted(action: &str, err: &io::Error) -> InternalError {
    InternalError::sort_exhausted(format!("{action}: {err}"))
}

// A run that ends early was truncated underneath us.
fn read_failure(action: &str, err: &io::Error) -> InternalError {
    if err.kind() == ErrorKind::UnexpectedEof {
        InternalError::sort_corruption(format!("{action}: run truncated"))
    } else {
        io_exhausted(action, err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIMIT: usize = 1024;

    fn run_of(values: &[Value]) -> SpilledRun {
        SpilledRun::write(values, None, LIMIT).expect("run written")
    }

    #[test]
    fn written_run_reads_back_in_order() {
        let run = run_of(&[Value::Int64(1), Value::Int64(2)]);
        assert_eq!(run.rows(), 2);

        let mut reader = run.into_reader(LIMIT).unwrap();
        assert_eq!(reader.next_value().unwrap(), Some(Value::Int64(1)));
        assert_eq!(reader.next_value().unwrap(), Some(Value::Int64(2)));
        assert_eq!(reader.next_value().unwrap(), None);
    }

    #[test]
    fn truncated_frame_body_is_corruption() {
        let run = run_of(&[Value::from("a value long enough to cut")]);
        run.file.set_len(run.bytes() - 3).unwrap();

        let err = run
            .into_reader(LIMIT)
            .unwrap()
            .next_value()
            .expect_err("body cut short");
        assert!(err.is_corruption());
    }

    #[test]
    fn truncated_frame_header_is_corruption() {
        let first = run_of(&[Value::Int64(1)]).bytes();
        let run = run_of(&[Value::Int64(1), Value::Int64(2)]);
        run.file.set_len(first + 2).unwrap();

        let mut reader = run.into_reader(LIMIT).unwrap();
        assert_eq!(reader.next_value().unwrap(), Some(Value::Int64(1)));
        assert!(reader.next_value().unwrap_err().is_corruption());
    }

    #[test]
    fn length_prefix_over_limit_is_corruption() {
        let run = run_of(&[Value::from("twelve bytes")]);

        let err = run
            .into_reader(4)
            .unwrap()
            .next_value()
            .expect_err("frame over limit");
        assert!(err.is_corruption());
    }

    #[test]
    fn undecodable_frame_is_corruption() {
        let mut run = run_of(&[Value::Int64(5)]);
        let body_len = usize::try_from(run.bytes()).unwrap() - FRAME_HEADER_BYTES;
        run.file
            .seek(SeekFrom::Start(FRAME_HEADER_BYTES as u64))
            .unwrap();
        run.file.write_all(&vec![0xff; body_len]).unwrap();

        let err = run
            .into_reader(LIMIT)
            .unwrap()
            .next_value()
            .expect_err("garbage frame");
        assert!(err.is_corruption());
    }
}
