use std::collections::HashMap;
use std::fs;
use std::io;

/// The file-read collaborator consumed by `%include` processing.
///
/// The decoder never touches the filesystem directly; every include goes
/// through this seam, so callers can redirect reads for sandboxing or
/// testing.
pub trait FileLoader {
    fn read(&self, path: &str) -> io::Result<Vec<u8>>;
}

/// The default loader: one-shot whole-file reads from disk, no caching.
/// A file included twice is read and decoded twice.
pub struct FsLoader;

impl FileLoader for FsLoader {
    fn read(&self, path: &str) -> io::Result<Vec<u8>> {
        fs::read(path)
    }
}

/// An in-memory loader backed by a path → bytes map, handy in tests and
/// for embedded documents.
#[derive(Default)]
pub struct MemoryLoader {
    files: HashMap<String, Vec<u8>>,
}

impl MemoryLoader {
    pub fn new() -> MemoryLoader {
        MemoryLoader::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.files.insert(path.into(), bytes.into());
    }
}

impl FileLoader for MemoryLoader {
    fn read(&self, path: &str) -> io::Result<Vec<u8>> {
        self.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no such file: {}", path))
        })
    }
}
