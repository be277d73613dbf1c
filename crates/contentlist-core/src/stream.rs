//! Streaming sample capture and SHA-256 digest.
//!
//! Both manifest creation and validation read a file the same way: the
//! first bytes one at a time into a sample, then the rest in large
//! chunks. Every byte feeds one running digest and cancellation is polled
//! once per sample byte and once per chunk.

use std::io::{ErrorKind, Read};

use sha2::{Digest, Sha256};

use crate::cancel::CancelToken;
use crate::entry::Sha256Digest;
use crate::error::StreamError;

/// Size of a bulk read after the sample.
pub const CHUNK_SIZE: usize = 1024 * 1024;

/// A reader that hashes everything pulled through it.
pub struct ContentStream<R> {
    reader: R,
    hasher: Sha256,
    position: u64,
    cancel: CancelToken,
}

impl<R: Read> ContentStream<R> {
    pub fn new(reader: R, cancel: CancelToken) -> Self {
        Self {
            reader,
            hasher: Sha256::new(),
            position: 0,
            cancel,
        }
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Read up to `len` bytes one at a time.
    ///
    /// Returns fewer bytes if the stream ends first. `progress` receives
    /// the running byte count after every byte.
    pub fn read_sample<E, F>(&mut self, len: usize, mut progress: F) -> Result<Vec<u8>, E>
    where
        E: From<StreamError>,
        F: FnMut(u64) -> Result<(), E>,
    {
        let mut sample = Vec::with_capacity(len);
        let mut byte = [0u8; 1];

        while sample.len() < len {
            self.cancel.check().map_err(StreamError::from)?;
            if self.read_some(&mut byte)? == 0 {
                break;
            }
            sample.push(byte[0]);
            self.position += 1;
            progress(self.position)?;
        }

        self.hasher.update(&sample);
        Ok(sample)
    }

    /// Read the rest of the stream in [`CHUNK_SIZE`] chunks.
    pub fn read_remaining<E, F>(&mut self, mut progress: F) -> Result<u64, E>
    where
        E: From<StreamError>,
        F: FnMut(u64) -> Result<(), E>,
    {
        let mut buffer = vec![0u8; CHUNK_SIZE];

        loop {
            self.cancel.check().map_err(StreamError::from)?;
            let read = self.read_some(&mut buffer)?;
            if read == 0 {
                break;
            }
            self.hasher.update(&buffer[..read]);
            self.position += read as u64;
            progress(self.position)?;
        }

        Ok(self.position)
    }

    /// Finish the digest over everything read so far.
    pub fn finish(self) -> Sha256Digest {
        Sha256Digest::new(self.hasher.finalize().into())
    }

    fn read_some(&mut self, buffer: &mut [u8]) -> Result<usize, StreamError> {
        loop {
            match self.reader.read(buffer) {
                Ok(read) => return Ok(read),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(StreamError::Io(err)),
            }
        }
    }
}
