//! Mock register link for tests and hardware-free runs

use super::RegisterTransport;
use crate::error::TransportError;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// Scripted register link
///
/// Reads are served from a queue of canned frames; once the queue is
/// empty the optional steady frame answers every poll (that is how the
/// hardware-free simulation mode runs forever on one frame). With
/// neither, or with `fail_reads` set, every read times out. Writes are
/// captured for inspection.
#[derive(Clone, Default)]
pub struct MockRegisterLink {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    scripted: VecDeque<Vec<u16>>,
    steady: Option<Vec<u16>>,
    written: Vec<(u8, Vec<u16>)>,
    fail_reads: bool,
    fail_writes: bool,
}

impl MockRegisterLink {
    pub fn new() -> Self {
        MockRegisterLink::default()
    }

    /// Queue one frame to answer the next read
    pub fn inject_frame(&self, frame: Vec<u16>) {
        self.inner.lock().scripted.push_back(frame);
    }

    /// Answer every read after the script runs out with this frame
    pub fn set_steady_frame(&self, frame: Vec<u16>) {
        self.inner.lock().steady = Some(frame);
    }

    /// Make every subsequent read time out
    pub fn set_fail_reads(&self, fail: bool) {
        self.inner.lock().fail_reads = fail;
    }

    /// Make every subsequent write time out
    pub fn set_fail_writes(&self, fail: bool) {
        self.inner.lock().fail_writes = fail;
    }

    /// Every `(base, values)` write so far, in order
    pub fn written(&self) -> Vec<(u8, Vec<u16>)> {
        self.inner.lock().written.clone()
    }

    pub fn clear_written(&self) {
        self.inner.lock().written.clear();
    }
}

impl RegisterTransport for MockRegisterLink {
    fn read_registers(&mut self, _base: u8, count: usize) -> Result<Vec<u16>, TransportError> {
        let mut inner = self.inner.lock();
        if inner.fail_reads {
            return Err(TransportError::Timeout);
        }
        let frame = inner
            .scripted
            .pop_front()
            .or_else(|| inner.steady.clone())
            .ok_or(TransportError::Timeout)?;
        if frame.len() < count {
            return Err(TransportError::ShortRead {
                expected: count * 2,
                actual: frame.len() * 2,
            });
        }
        Ok(frame[..count].to_vec())
    }

    fn write_registers(&mut self, base: u8, values: &[u16]) -> Result<(), TransportError> {
        let mut inner = self.inner.lock();
        if inner.fail_writes {
            return Err(TransportError::Timeout);
        }
        inner.written.push((base, values.to_vec()));
        Ok(())
    }
}
