
//! Accounting of buffered bytes against a configured ceiling.
//!
//! A session owns one `Limiter`. Every buffer that may grow while input is streamed
//! (the tokenizer's partial-token buffer, content queued for a pending end tag) charges
//! the limiter before growing and releases its charge when dropped.

use std::rc;
use std::cell;
use std::fmt;
use std::error;

/// Memory settings of a rewriter session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemorySettings {
    /// Capacity reserved up front for the tokenizer's partial-token buffer.
    pub preallocated_parsing_buffer_size: usize,
    /// Upper bound for all bytes buffered by the session.
    pub max_allowed_memory_usage: usize,
}

impl MemorySettings {

    /// Set the preallocated size of the parsing buffer.
    pub fn preallocated_parsing_buffer_size(mut self, size: usize) -> Self {
        self.preallocated_parsing_buffer_size = size;
        self
    }

    /// Set the memory ceiling.
    pub fn max_allowed_memory_usage(mut self, limit: usize) -> Self {
        self.max_allowed_memory_usage = limit;
        self
    }
}

impl Default for MemorySettings {

    fn default() -> MemorySettings {
        MemorySettings {
            preallocated_parsing_buffer_size: 1024,
            max_allowed_memory_usage: usize::max_value(),
        }
    }
}

/// Buffered bytes would have exceeded the configured ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryLimitExceeded {
    /// The configured ceiling.
    pub limit: usize,
    /// Bytes that were requested on top of current usage.
    pub requested: usize,
}

impl fmt::Display for MemoryLimitExceeded {

    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "The memory limit has been exceeded.")
    }
}

impl error::Error for MemoryLimitExceeded {}

#[derive(Debug)]
struct Usage {
    current: usize,
    max: usize,
}

/// Shared counter of bytes held by one session.
#[derive(Debug, Clone)]
pub(crate) struct Limiter {
    usage: rc::Rc<cell::RefCell<Usage>>,
}

impl Limiter {

    pub fn new(max: usize) -> Limiter {
        Limiter {
            usage: rc::Rc::new(cell::RefCell::new(Usage { current: 0, max })),
        }
    }

    #[cfg(test)]
    pub fn current_usage(&self) -> usize { self.usage.borrow().current }

    pub fn increase(&self, amount: usize) -> Result<(), MemoryLimitExceeded> {
        let mut usage = self.usage.borrow_mut();
        let projected = usage.current.saturating_add(amount);
        if projected > usage.max {
            debug!("memory limit of {} bytes exceeded ({} in use, {} requested)",
                usage.max,
                usage.current,
                amount,
            );
            return Err(MemoryLimitExceeded { limit: usage.max, requested: amount });
        }
        usage.current = projected;
        Ok(())
    }

    pub fn decrease(&self, amount: usize) {
        let mut usage = self.usage.borrow_mut();
        usage.current = usage.current.saturating_sub(amount);
    }

    /// Charge `amount` bytes, released again when the returned guard is dropped.
    pub fn charge(&self, amount: usize) -> Result<Charge, MemoryLimitExceeded> {
        self.increase(amount)?;
        Ok(Charge { limiter: self.clone(), amount })
    }
}

/// Bytes held against a `Limiter` for as long as the guard lives.
#[derive(Debug)]
pub(crate) struct Charge {
    limiter: Limiter,
    amount: usize,
}

impl Drop for Charge {

    fn drop(&mut self) {
        self.limiter.decrease(self.amount);
    }
}

/// A byte buffer whose length is charged against a `Limiter`.
///
/// The preallocated capacity is charged once, at construction. Growth beyond it is
/// charged as it happens.
#[derive(Debug)]
pub(crate) struct Buffer {
    bytes: Vec<u8>,
    charged: usize,
    preallocated: usize,
    limiter: Limiter,
}

impl Buffer {

    pub fn new(limiter: &Limiter, preallocated: usize) -> Result<Buffer, MemoryLimitExceeded> {
        limiter.increase(preallocated)?;
        Ok(Buffer {
            bytes: Vec::with_capacity(preallocated),
            charged: preallocated,
            preallocated,
            limiter: limiter.clone(),
        })
    }

    pub fn is_empty(&self) -> bool { self.bytes.is_empty() }

    pub fn as_slice(&self) -> &[u8] { &self.bytes }

    pub fn extend(&mut self, data: &[u8]) -> Result<(), MemoryLimitExceeded> {
        let new_len = self.bytes.len() + data.len();
        if new_len > self.charged {
            self.limiter.increase(new_len - self.charged)?;
            self.charged = new_len;
        }
        self.bytes.extend_from_slice(data);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.bytes.clear();
        if self.charged > self.preallocated {
            self.limiter.decrease(self.charged - self.preallocated);
            self.charged = self.preallocated;
        }
    }
}

impl Drop for Buffer {

    fn drop(&mut self) {
        self.limiter.decrease(self.charged);
    }
}
