use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use super::lines::BufReadSource;
use super::{LineSource, SourceError};

const READ_BUFFER_BYTES: usize = 64 * 1024;

/// Flow-log file read line by line through a fixed-size buffer.
pub struct FlowLogFileSource {
    inner: BufReadSource<BufReader<File>>,
}

impl FlowLogFileSource {
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let file = File::open(path)?;
        Ok(Self {
            inner: BufReadSource::new(BufReader::with_capacity(READ_BUFFER_BYTES, file)),
        })
    }
}

impl LineSource for FlowLogFileSource {
    fn next_line(&mut self) -> Result<Option<&str>, SourceError> {
        self.inner.next_line()
    }
}
