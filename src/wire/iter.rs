use crate::foundation::error::FramewireResult;
use crate::source::blocks::{Blocks, blocks_from_path};
use crate::wire::frame::{Frame, FrameRgb, decode_payload};
use crate::wire::scanner::PayloadScanner;
use image::RgbImage;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Lazy sequence of data frames decoded from a block iterator.
///
/// Finite, single-pass and not restartable: iteration ends at the stream
/// sentinel (which is never yielded), and after the first error the iterator
/// is exhausted. Blocks are only pulled once the buffered input holds no
/// further complete payload.
#[derive(Debug)]
pub struct Frames<I> {
    blocks: I,
    scanner: PayloadScanner,
    done: bool,
}

impl<I> Frames<I>
where
    I: Iterator<Item = FramewireResult<String>>,
{
    /// Decode frames from an ordered block sequence.
    pub fn new(blocks: I) -> Self {
        Self {
            blocks,
            scanner: PayloadScanner::new(),
            done: false,
        }
    }
}

impl<I> Iterator for Frames<I>
where
    I: Iterator<Item = FramewireResult<String>>,
{
    type Item = FramewireResult<FrameRgb>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            if let Some(payload) = self.scanner.next_payload() {
                match decode_payload(&payload) {
                    Ok(Frame::Sentinel) => {
                        self.done = true;
                        return None;
                    }
                    Ok(Frame::Data(frame)) => return Some(Ok(frame)),
                    Err(e) => {
                        self.done = true;
                        return Some(Err(e));
                    }
                }
            }
            match self.blocks.next() {
                Some(Ok(block)) => self.scanner.push(&block),
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(e));
                }
                None => {
                    self.done = true;
                    return match self.scanner.finish() {
                        Ok(()) => None,
                        Err(e) => Some(Err(e)),
                    };
                }
            }
        }
    }
}

/// Lazy sequence of materialized images decoded from a block iterator.
///
/// Same single-pass contract as [`Frames`].
#[derive(Debug)]
pub struct Images<I> {
    frames: Frames<I>,
    failed: bool,
}

impl<I> Images<I>
where
    I: Iterator<Item = FramewireResult<String>>,
{
    /// Decode images from an ordered block sequence.
    pub fn new(blocks: I) -> Self {
        Self {
            frames: Frames::new(blocks),
            failed: false,
        }
    }
}

impl Images<Blocks<BufReader<File>>> {
    /// Decode images from a wire-format file on disk.
    pub fn from_path(path: impl AsRef<Path>, block_size: usize) -> FramewireResult<Self> {
        Ok(Self::new(blocks_from_path(path, block_size)?))
    }
}

impl<I> Iterator for Images<I>
where
    I: Iterator<Item = FramewireResult<String>>,
{
    type Item = FramewireResult<RgbImage>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.frames.next()? {
            Ok(frame) => match frame.into_image() {
                Ok(img) => Some(Ok(img)),
                Err(e) => {
                    self.failed = true;
                    Some(Err(e))
                }
            },
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}
