use std::io::{self, Read};
use std::path::PathBuf;

/// Input source together with its name.
pub struct PathRead {
    pub path: String,
    pub read: Box<dyn Read + Send>,
}

impl PathRead {
    /// Return stdin if no files given, else lazily open and return the files.
    pub fn from_pathbufs(files: &[PathBuf]) -> Box<dyn Iterator<Item = io::Result<Self>> + '_> {
        if files.is_empty() {
            Box::new(std::iter::once(Ok(Self::stdin())))
        } else {
            Box::new(files.iter().map(Self::try_from))
        }
    }

    fn stdin() -> Self {
        let path = "-".to_string();
        let read: Box<dyn Read + Send> = Box::new(io::stdin());
        Self { path, read }
    }
}

impl TryFrom<&PathBuf> for PathRead {
    type Error = io::Error;

    /// Open a file, where "-" stands for standard input.
    fn try_from(pb: &PathBuf) -> Result<Self, Self::Error> {
        if pb.to_str() == Some("-") {
            return Ok(Self::stdin());
        }
        let path = pb.display().to_string();
        let read: Box<dyn Read + Send> = Box::new(std::fs::File::open(pb)?);
        Ok(Self { path, read })
    }
}
