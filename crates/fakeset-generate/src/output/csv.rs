use std::fs::{OpenOptions, create_dir_all};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::errors::GenerationError;
use crate::model::SinkSummary;
use crate::rows::RowProducer;

/// Stream every line of `producer` into `writer`, one row at a time.
pub fn write_lines<R: RngCore, W: Write>(
    producer: RowProducer<'_, R>,
    writer: W,
) -> Result<SinkSummary, GenerationError> {
    let mut writer = DigestWriter::new(writer);
    let mut lines = 0_u64;
    for line in producer {
        let line = line?;
        writer.write_all(line.as_bytes())?;
        lines += 1;
    }
    writer.flush()?;
    Ok(writer.finish(lines))
}

/// Write a dataset file so that readers never observe a partial file: rows
/// go to a sibling temp file which is renamed into place on success and
/// removed on failure.
pub fn write_dataset_file<R: RngCore>(
    path: &Path,
    producer: RowProducer<'_, R>,
) -> Result<SinkSummary, GenerationError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            create_dir_all(parent)?;
        }
    }

    let tmp_path = temp_path(path)?;
    let file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(&tmp_path)?;

    let result = write_lines(producer, BufWriter::new(&file)).and_then(|summary| {
        file.sync_all()?;
        Ok(summary)
    });

    match result {
        Ok(summary) => {
            drop(file);
            std::fs::rename(&tmp_path, path)?;
            Ok(summary)
        }
        Err(err) => {
            drop(file);
            let _ = std::fs::remove_file(&tmp_path);
            Err(err)
        }
    }
}

fn temp_path(path: &Path) -> Result<PathBuf, GenerationError> {
    let file_name = path.file_name().ok_or_else(|| {
        GenerationError::Io(io::Error::new(
            io::ErrorKind::InvalidInput,
            "invalid path for dataset file",
        ))
    })?;
    let tmp_name = format!("{}.tmp", file_name.to_string_lossy());
    Ok(path.with_file_name(tmp_name))
}

/// Counts and hashes everything written through it.
pub struct DigestWriter<W: Write> {
    inner: W,
    bytes: u64,
    hasher: Sha256,
}

impl<W: Write> DigestWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            bytes: 0,
            hasher: Sha256::new(),
        }
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes
    }

    fn finish(self, lines: u64) -> SinkSummary {
        SinkSummary {
            lines,
            bytes: self.bytes,
            sha256: hex::encode(self.hasher.finalize()),
        }
    }
}

impl<W: Write> Write for DigestWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let size = self.inner.write(buf)?;
        self.hasher.update(&buf[..size]);
        self.bytes = self.bytes.saturating_add(size as u64);
        Ok(size)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Hex SHA-256 of an in-memory buffer, matching [`SinkSummary::sha256`].
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}
