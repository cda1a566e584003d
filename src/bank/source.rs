use std::collections::hash_map::DefaultHasher;
use std::fs;
use std::hash::{Hash, Hasher};
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::bank::{BankError, BankFormat};

/// Signal used to decide whether a cached bank is stale.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SourceVersion {
    Modified { time: SystemTime, length: u64 },
    ContentHash(u64),
}

pub trait BankSource {
    fn identity(&self) -> String;
    fn format(&self) -> BankFormat;
    /// `None` when the source does not exist.
    fn version(&self) -> Result<Option<SourceVersion>, BankError>;
    /// `None` when the source does not exist.
    fn read(&self) -> Result<Option<Vec<u8>>, BankError>;
    /// Optional sources count as empty banks when they are missing.
    fn is_optional(&self) -> bool {
        false
    }
}

#[derive(Clone, Debug)]
pub struct FileSource {
    path: PathBuf,
    optional: bool,
}

impl FileSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        FileSource {
            path: path.as_ref().to_path_buf(),
            optional: false,
        }
    }

    pub fn optional<P: AsRef<Path>>(path: P) -> Self {
        FileSource {
            path: path.as_ref().to_path_buf(),
            optional: true,
        }
    }

    fn io_error(&self, error: io::Error) -> BankError {
        BankError::Io {
            name: self.identity(),
            error,
        }
    }
}

impl BankSource for FileSource {
    fn identity(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }

    fn format(&self) -> BankFormat {
        BankFormat::from_path(&self.path)
    }

    fn version(&self) -> Result<Option<SourceVersion>, BankError> {
        let metadata = match fs::metadata(&self.path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };
        let time = metadata.modified().map_err(|e| self.io_error(e))?;
        Ok(Some(SourceVersion::Modified {
            time,
            length: metadata.len(),
        }))
    }

    fn read(&self) -> Result<Option<Vec<u8>>, BankError> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn is_optional(&self) -> bool {
        self.optional
    }
}

#[derive(Clone, Debug)]
pub struct MemorySource {
    name: String,
    format: BankFormat,
    contents: Vec<u8>,
}

impl MemorySource {
    pub fn new<C: Into<Vec<u8>>>(name: &str, format: BankFormat, contents: C) -> Self {
        MemorySource {
            name: name.to_owned(),
            format,
            contents: contents.into(),
        }
    }
}

impl BankSource for MemorySource {
    fn identity(&self) -> String {
        self.name.clone()
    }

    fn format(&self) -> BankFormat {
        self.format
    }

    fn version(&self) -> Result<Option<SourceVersion>, BankError> {
        let mut hasher = DefaultHasher::new();
        self.contents.hash(&mut hasher);
        Ok(Some(SourceVersion::ContentHash(hasher.finish())))
    }

    fn read(&self) -> Result<Option<Vec<u8>>, BankError> {
        Ok(Some(self.contents.clone()))
    }
}
