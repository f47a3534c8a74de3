//! Utilities for working with CSV files.

use std::fs::File;
use std::io;
use std::io::{BufReader, Read};
use std::ops::Index;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("file is empty: {}", .0.display())]
    Empty(PathBuf),

    #[error("error parsing {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ::csv::Error,
    },

    #[error("error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("missing column {0}")]
pub struct MissingColumn(pub String);

#[derive(Debug, Error, PartialEq, Eq)]
#[error("row {row} has {width} cells, but there are {headers} headers")]
pub struct RaggedRow {
    pub row: usize,
    pub width: usize,
    pub headers: usize,
}

/// A table of raw string cells, exactly as read from a CSV file with a header row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}
impl Frame {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self, RaggedRow> {
        if let Some((row, cells)) = rows
            .iter()
            .enumerate()
            .find(|(_, cells)| cells.len() != headers.len())
        {
            return Err(RaggedRow {
                row,
                width: cells.len(),
                headers: headers.len(),
            });
        }
        Ok(Self { headers, rows })
    }

    /// Reads a frame from the CSV file at `path`. The first line is taken to be the header.
    pub fn read(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => LoadError::NotFound(path.to_path_buf()),
            _ => LoadError::Io {
                path: path.to_path_buf(),
                source: err,
            },
        })?;
        Self::parse(BufReader::new(file), path)
    }

    /// Parses a frame from an arbitrary reader; `path` is only used to label errors.
    pub fn parse(reader: impl Read, path: &Path) -> Result<Self, LoadError> {
        let mut reader = ::csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(reader);
        let parse_err = |source: ::csv::Error| match source.kind() {
            ::csv::ErrorKind::Io(_) => LoadError::Io {
                path: path.to_path_buf(),
                source: io::Error::new(io::ErrorKind::Other, source.to_string()),
            },
            _ => LoadError::Parse {
                path: path.to_path_buf(),
                source,
            },
        };

        let headers: Vec<String> = reader
            .headers()
            .map_err(parse_err)?
            .iter()
            .map(ToString::to_string)
            .collect();
        if headers.iter().all(|header| header.trim().is_empty()) {
            return Err(LoadError::Empty(path.to_path_buf()));
        }

        let mut rows = vec![];
        for record in reader.records() {
            let record = record.map_err(parse_err)?;
            rows.push(record.iter().map(ToString::to_string).collect());
        }
        Ok(Self { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn column<'a>(&'a self, name: &str) -> Option<impl Iterator<Item = &'a str> + 'a> {
        let index = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| row[index].as_str()))
    }

    /// Projects the frame onto `columns`, in the given order.
    pub fn select(&self, columns: &[&str]) -> Result<Frame, MissingColumn> {
        let indexes = columns
            .iter()
            .map(|&column| {
                self.column_index(column)
                    .ok_or_else(|| MissingColumn(column.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let headers = columns.iter().map(ToString::to_string).collect();
        let rows = self
            .rows
            .iter()
            .map(|row| indexes.iter().map(|&index| row[index].clone()).collect())
            .collect();
        Ok(Frame { headers, rows })
    }

    /// Renames column `from` to `to`, returning `false` if `from` is absent.
    pub fn rename(&mut self, from: &str, to: &str) -> bool {
        match self.column_index(from) {
            None => false,
            Some(index) => {
                self.headers[index] = to.to_string();
                true
            }
        }
    }

    pub fn head(&self, rows: usize) -> Frame {
        Frame {
            headers: self.headers.clone(),
            rows: self.rows.iter().take(rows).cloned().collect(),
        }
    }
}

impl Index<(usize, usize)> for Frame {
    type Output = str;

    fn index(&self, index: (usize, usize)) -> &Self::Output {
        let (row, col) = index;
        &self.rows[row][col]
    }
}
