//! Text files with an element count header
//!
//! The first token of a file is the number of elements. It is followed by the values of
//! the elements, `width` whitespace separated values per element.
use crate::{
    config::Dataset,
    error::{RedistributeError, Result},
    traits::ChunkSource,
    types::Chunk,
};
use std::{
    fmt::Display,
    fs::{self, File},
    io::{BufRead, BufReader},
    marker::PhantomData,
    path::{Path, PathBuf},
    str::FromStr,
};

fn io_error(path: &Path, source: std::io::Error) -> RedistributeError {
    RedistributeError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn parse_token<T: FromStr>(path: &Path, token: &str) -> Result<T> {
    token.parse().map_err(|_| RedistributeError::Parse {
        path: path.to_path_buf(),
        token: String::from(token),
    })
}

// Whitespace separated tokens of a file, read one line at a time.
struct Tokens<'a> {
    path: &'a Path,
    reader: BufReader<File>,
    line: String,
    pos: usize,
}

impl<'a> Tokens<'a> {
    fn open(path: &'a Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| io_error(path, e))?;
        Ok(Self {
            path,
            reader: BufReader::new(file),
            line: String::new(),
            pos: 0,
        })
    }

    // The next token, or `None` at the end of the file.
    fn next_token(&mut self) -> Result<Option<&str>> {
        loop {
            let rest = &self.line[self.pos..];
            let trimmed = rest.trim_start();
            if !trimmed.is_empty() {
                let start = self.line.len() - trimmed.len();
                let len = trimmed.find(char::is_whitespace).unwrap_or(trimmed.len());
                self.pos = start + len;
                return Ok(Some(&self.line[start..start + len]));
            }
            self.line.clear();
            self.pos = 0;
            let n = self
                .reader
                .read_line(&mut self.line)
                .map_err(|e| io_error(self.path, e))?;
            if n == 0 {
                return Ok(None);
            }
        }
    }

    fn header(&mut self) -> Result<usize> {
        let path = self.path;
        match self.next_token()? {
            Some(token) => parse_token(path, token),
            None => Err(RedistributeError::MissingHeader {
                path: path.to_path_buf(),
            }),
        }
    }
}

/// Read the element count header of a file
///
/// Only the first token of the file is read.
pub fn read_header(path: &Path) -> Result<usize> {
    Tokens::open(path)?.header()
}

/// Read `out.len() / width` elements starting at element `offset`
///
/// The file is read up to the end of the requested elements.
pub fn read_records<T: FromStr>(
    path: &Path,
    offset: usize,
    width: usize,
    out: &mut [T],
) -> Result<()> {
    assert!(width > 0, "Elements need at least one value.");
    assert_eq!(out.len() % width, 0);
    let mut tokens = Tokens::open(path)?;
    tokens.header()?;

    let skip = offset * width;
    let n_values = out.len();
    let truncated = |found| RedistributeError::Truncated {
        path: path.to_path_buf(),
        expected: skip + n_values,
        found,
    };

    // Skip forward to the beginning of the chunk.
    for found in 0..skip {
        if tokens.next_token()?.is_none() {
            return Err(truncated(found));
        }
    }
    for (found, value) in out.iter_mut().enumerate() {
        match tokens.next_token()? {
            Some(token) => *value = parse_token(path, token)?,
            None => return Err(truncated(skip + found)),
        }
    }
    Ok(())
}

/// Write elements of `width` values each, one element per line
pub fn write_records<T: Display>(path: &Path, width: usize, values: &[T]) -> Result<()> {
    assert!(width > 0, "Elements need at least one value.");
    assert_eq!(values.len() % width, 0);
    let mut s = format!("{}\n", values.len() / width);
    for record in values.chunks(width) {
        for (n, v) in record.iter().enumerate() {
            if n != 0 {
                s.push(' ');
            }
            s.push_str(&format!("{v}"));
        }
        s.push('\n');
    }
    fs::write(path, s).map_err(|e| io_error(path, e))
}

/// The files of a dataset, read as text
pub struct TextFiles<T> {
    dataset: Dataset,
    _t: PhantomData<T>,
}

impl<T> TextFiles<T> {
    /// Create new
    pub fn new(dataset: Dataset) -> Self {
        assert!(dataset.width > 0, "Elements need at least one value.");
        Self {
            dataset,
            _t: PhantomData,
        }
    }

    /// The dataset
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Path of file `index`
    pub fn file_path(&self, index: usize) -> PathBuf {
        self.dataset.file_path(index)
    }
}

impl<T: Display> TextFiles<T> {
    /// Write file `index`
    pub fn write_file(&self, index: usize, values: &[T]) -> Result<()> {
        write_records(&self.file_path(index), self.dataset.width, values)
    }
}

impl<T: FromStr> ChunkSource for TextFiles<T> {
    type Item = T;

    fn n_files(&self) -> usize {
        self.dataset.n_files
    }

    fn width(&self) -> usize {
        self.dataset.width
    }

    fn element_count(&mut self, file: usize) -> Result<usize> {
        read_header(&self.file_path(file))
    }

    fn read_chunk(&mut self, chunk: &Chunk, out: &mut [T]) -> Result<()> {
        assert_eq!(out.len(), chunk.len * self.dataset.width);
        read_records(
            &self.file_path(chunk.file),
            chunk.offset,
            self.dataset.width,
            out,
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_write_and_read() {
        let files = TextFiles::<u64>::new(Dataset::new("_test_text_write_and_read", 1));
        files.write_file(0, &[10, 11, 12, 13, 14]).unwrap();

        let path = files.file_path(0);
        assert_eq!(read_header(&path).unwrap(), 5);
        let mut out = [0u64; 3];
        read_records(&path, 1, 1, &mut out).unwrap();
        assert_eq!(out, [11, 12, 13]);
    }

    #[test]
    fn test_pairs() {
        let mut files = TextFiles::<u32>::new(Dataset::new("_test_text_pairs", 1).with_width(2));
        files.write_file(0, &[0, 3, 3, 4, 4, 9]).unwrap();
        assert_eq!(
            fs::read_to_string(files.file_path(0)).unwrap(),
            "3\n0 3\n3 4\n4 9\n"
        );

        assert_eq!(files.element_count(0).unwrap(), 3);
        let mut out = [0u32; 4];
        files.read_chunk(&Chunk::new(0, 1, 2), &mut out).unwrap();
        assert_eq!(out, [3, 4, 4, 9]);
    }

    #[test]
    fn test_errors() {
        let path = PathBuf::from("_test_text_errors.00000");
        assert!(matches!(
            read_header(Path::new("_test_text_does_not_exist.00000")),
            Err(RedistributeError::Io { .. })
        ));

        fs::write(&path, "").unwrap();
        assert!(matches!(
            read_header(&path),
            Err(RedistributeError::MissingHeader { .. })
        ));

        fs::write(&path, "3\n1\nx\n3\n").unwrap();
        let mut out = [0i32; 3];
        assert!(matches!(
            read_records(&path, 0, 1, &mut out),
            Err(RedistributeError::Parse { token, .. }) if token == "x"
        ));

        fs::write(&path, "3\n1\n2\n").unwrap();
        assert!(matches!(
            read_records(&path, 0, 1, &mut out),
            Err(RedistributeError::Truncated {
                expected: 3,
                found: 2,
                ..
            })
        ));
    }

    #[test]
    fn test_read_stops_after_chunk() {
        let path = PathBuf::from("_test_text_stops_after_chunk.00000");
        fs::write(&path, "  6 \n\n10 11\n 12\t13\n14 15 16 17\nnot a number \u{fffd}\n").unwrap();

        // Nothing past the header is parsed.
        assert_eq!(read_header(&path).unwrap(), 6);

        // Neither is anything past the end of the chunk.
        let mut out = [0u64; 4];
        read_records(&path, 1, 1, &mut out).unwrap();
        assert_eq!(out, [11, 12, 13, 14]);

        let mut out = [0u64; 4];
        read_records(&path, 2, 2, &mut out).unwrap();
        assert_eq!(out, [14, 15, 16, 17]);

        let mut out = [0u64; 2];
        assert!(matches!(
            read_records(&path, 4, 2, &mut out),
            Err(RedistributeError::Parse { token, .. }) if token == "not"
        ));
    }

    #[test]
    fn test_truncated_while_skipping() {
        let path = PathBuf::from("_test_text_truncated_while_skipping.00000");
        fs::write(&path, "5\n1 2\n3\n").unwrap();
        let mut out = [0i32; 2];
        assert!(matches!(
            read_records(&path, 4, 1, &mut out),
            Err(RedistributeError::Truncated {
                expected: 6,
                found: 3,
                ..
            })
        ));
    }

    #[test]
    #[should_panic]
    fn test_zero_width() {
        TextFiles::<u32>::new(Dataset {
            prefix: String::from("_test_text_zero_width"),
            n_files: 1,
            width: 0,
        });
    }
}
