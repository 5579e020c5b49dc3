use crate::foundation::error::FramewireResult;
use anyhow::Context as _;
use std::fs::File;
use std::io::{BufReader, Read, Stdin};
use std::path::Path;

/// Iterator yielding bounded text chunks from any [`Read`] source.
///
/// Each item holds at most `block_size` bytes; a read returning zero bytes
/// ends the sequence. Byte sequences that are not valid UTF-8 are replaced
/// lossily: the wire format is ASCII, so replacement characters only appear
/// in input that could never decode anyway.
#[derive(Debug)]
pub struct Blocks<R> {
    reader: R,
    block_size: usize,
    done: bool,
}

impl<R: Read> Blocks<R> {
    /// Wrap a reader, chunking reads at `block_size` bytes.
    pub fn new(reader: R, block_size: usize) -> Self {
        Self {
            reader,
            block_size: block_size.max(1),
            done: false,
        }
    }
}

impl<R: Read> Iterator for Blocks<R> {
    type Item = FramewireResult<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let mut buf = vec![0u8; self.block_size];
        loop {
            match self.reader.read(&mut buf) {
                Ok(0) => {
                    self.done = true;
                    return None;
                }
                Ok(n) => {
                    return Some(Ok(String::from_utf8_lossy(&buf[..n]).into_owned()));
                }
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.done = true;
                    return Some(Err(anyhow::Error::new(e)
                        .context("read block from stream")
                        .into()));
                }
            }
        }
    }
}

/// Open a wire-format file as a block sequence.
pub fn blocks_from_path(
    path: impl AsRef<Path>,
    block_size: usize,
) -> FramewireResult<Blocks<BufReader<File>>> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("open stream file '{}'", path.display()))?;
    Ok(Blocks::new(BufReader::new(file), block_size))
}

/// Read blocks from standard input.
pub fn blocks_from_stdin(block_size: usize) -> Blocks<Stdin> {
    Blocks::new(std::io::stdin(), block_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunks_are_bounded_and_ordered() {
        let data = b"abcdefgh";
        let blocks: Vec<_> = Blocks::new(&data[..], 3)
            .collect::<FramewireResult<Vec<_>>>()
            .unwrap();
        assert_eq!(blocks, vec!["abc", "def", "gh"]);
    }

    #[test]
    fn empty_source_yields_nothing() {
        let mut blocks = Blocks::new(&b""[..], 16);
        assert!(blocks.next().is_none());
        assert!(blocks.next().is_none());
    }

    #[test]
    fn zero_block_size_is_clamped() {
        let data = b"xy";
        let blocks: Vec<_> = Blocks::new(&data[..], 0)
            .collect::<FramewireResult<Vec<_>>>()
            .unwrap();
        assert_eq!(blocks, vec!["x", "y"]);
    }

    #[test]
    fn missing_file_reports_its_path() {
        let err = blocks_from_path("/nonexistent/stream.wif", 16)
            .err()
            .map(|e| e.to_string())
            .unwrap_or_default();
        assert!(err.contains("/nonexistent/stream.wif"));
    }
}
