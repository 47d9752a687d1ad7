use std::error;
use std::fmt;
use std::fs;
use std::path::Path;

/// A file used as an input
#[derive(PartialEq, Debug, Clone)]
pub enum File {
    Unknown,
    Name(String),
}

/// A line number in a file
#[derive(PartialEq, Debug, Clone)]
pub struct Line(pub u64);

/// The column index in a line
#[derive(PartialEq, Debug, Clone)]
pub struct Column(pub u64);

/// Fully qualified location
#[derive(PartialEq, Debug, Clone)]
pub struct FileLocation(pub File, pub Line, pub Column);

impl fmt::Display for FileLocation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.0 {
            File::Name(ref name) => write!(f, "{}:{}:{}", name, (self.1).0, (self.2).0),
            File::Unknown => write!(f, "{}:{}", (self.1).0, (self.2).0),
        }
    }
}

/// The raw number of bytes from the start of a stream
#[derive(PartialEq, Eq, PartialOrd, Ord, Debug, Clone, Copy)]
pub struct StreamLocation(pub u64);

/// Maps byte offsets in a source text back to line and column
///
/// Lines and columns are 1-based, columns count bytes.
#[derive(PartialEq, Debug, Clone)]
pub struct LineMap {
    file: File,
    line_starts: Vec<u64>,
    length: u64,
}

impl LineMap {
    pub fn new(file: File, source: &str) -> LineMap {
        let mut line_starts = vec![0];
        for (index, byte) in source.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(index as u64 + 1);
            }
        }
        LineMap {
            file: file,
            line_starts: line_starts,
            length: source.len() as u64,
        }
    }

    pub fn get_file_location(&self, stream_location: &StreamLocation) -> Result<FileLocation, ()> {
        if stream_location.0 > self.length {
            return Err(());
        }
        // Index of the last line starting at or before the location
        let line = self.line_starts.partition_point(|start| *start <= stream_location.0) - 1;
        let column = stream_location.0 - self.line_starts[line];
        Ok(FileLocation(self.file.clone(), Line(line as u64 + 1), Column(column + 1)))
    }
}

#[derive(PartialEq, Debug, Clone)]
pub enum ReadError {
    NotFound(String),
    FailedToRead(String),
}

impl error::Error for ReadError {}

impl fmt::Display for ReadError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ReadError::NotFound(ref path) => write!(f, "could not open file '{}'", path),
            ReadError::FailedToRead(ref path) => write!(f, "failed to read file '{}'", path),
        }
    }
}

/// Trait for loading the text of a source file
pub trait SourceReader: Send {
    fn read(&self, path: &str) -> Result<String, ReadError>;
}

/// A reader that loads files from disk, searching a list of directories for
/// relative paths that do not exist relative to the working directory
pub struct FileSystemReader {
    pub search_paths: Vec<String>,
}

impl FileSystemReader {
    pub fn new() -> FileSystemReader {
        FileSystemReader {
            search_paths: vec![],
        }
    }
}

impl SourceReader for FileSystemReader {
    fn read(&self, path: &str) -> Result<String, ReadError> {
        let file_path = Path::new(path);
        let mut candidates = vec![file_path.to_path_buf()];
        if file_path.is_relative() {
            for search_path in &self.search_paths {
                candidates.push(Path::new(search_path).join(file_path));
            }
        }
        for candidate in candidates {
            if !candidate.is_file() {
                continue;
            }
            log::debug!("reading {}", candidate.display());
            return match fs::read_to_string(&candidate) {
                Ok(text) => Ok(text),
                Err(_) => Err(ReadError::FailedToRead(path.to_string())),
            };
        }
        Err(ReadError::NotFound(path.to_string()))
    }
}

/// A reader that fails to load any files
pub struct NullSourceReader;

impl SourceReader for NullSourceReader {
    fn read(&self, path: &str) -> Result<String, ReadError> {
        Err(ReadError::NotFound(path.to_string()))
    }
}

#[test]
fn test_line_map() {
    let map = LineMap::new(File::Unknown, "ab\ncd\n\nef");
    let loc = |offset| map.get_file_location(&StreamLocation(offset)).unwrap();
    assert_eq!(loc(0), FileLocation(File::Unknown, Line(1), Column(1)));
    assert_eq!(loc(1), FileLocation(File::Unknown, Line(1), Column(2)));
    assert_eq!(loc(3), FileLocation(File::Unknown, Line(2), Column(1)));
    assert_eq!(loc(6), FileLocation(File::Unknown, Line(3), Column(1)));
    assert_eq!(loc(8), FileLocation(File::Unknown, Line(4), Column(2)));
    assert_eq!(loc(9), FileLocation(File::Unknown, Line(4), Column(3)));
    assert!(map.get_file_location(&StreamLocation(10)).is_err());
}

#[test]
fn test_null_reader() {
    assert_eq!(NullSourceReader.read("a.h"), Err(ReadError::NotFound("a.h".to_string())));
}
