//! The deduplicated string pool (section 15).
//!
//! Every name stored anywhere in the index lives here exactly once, as
//! code-page encoded bytes followed by a NUL terminator. Other sections
//! refer to a string by its byte offset into the pool. Offset 0 is a
//! reserved single NUL so that records can use 0 for "no name".

use std::collections::HashMap;
use encoding_rs::Encoding;
use log::warn;

/// Append-only pool of encoded, NUL-terminated strings.
///
/// `intern` is O(1) amortized via a text → offset map, and offsets are
/// strictly increasing in insertion order.
///
/// Once [`freeze`](StringPool::freeze) has been called the pool length is
/// part of the resolved pointer sizes, so further interning is a caller
/// contract violation rather than a runtime error.
#[derive(Debug)]
pub struct StringPool {
    encoding: &'static Encoding,
    buf: Vec<u8>,
    offsets: HashMap<String, u32>,
    frozen: bool,
}

impl StringPool {
    pub fn new(encoding: &'static Encoding) -> StringPool {
        StringPool {
            encoding,
            // Offset 0 is reserved for the empty/"no name" entry.
            buf: vec![0],
            offsets: HashMap::new(),
            frozen: false,
        }
    }

    /// Return the offset for `text`, appending it first if it is new.
    ///
    /// Must not be called after [`freeze`](StringPool::freeze).
    pub fn intern(&mut self, text: &str) -> u32 {
        debug_assert!(!self.frozen, "intern after freeze: {:?}", text);
        if let Some(&off) = self.offsets.get(text) {
            return off;
        }

        let off = self.buf.len() as u32;
        let (encoded, _, had_errors) = self.encoding.encode(text);
        if had_errors {
            warn!(
                "string {:?} is not representable in {}; storing lossy form",
                text,
                self.encoding.name()
            );
        }
        self.buf.extend_from_slice(&encoded);
        self.buf.push(0);
        self.offsets.insert(text.to_string(), off);
        off
    }

    /// Stop accepting new strings. The pool byte length is final after this.
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Number of distinct strings interned (the reserved entry excluded).
    pub fn num_strings(&self) -> usize {
        self.offsets.len()
    }

    /// Current byte length of the pool, terminators included.
    pub fn len_bytes(&self) -> u64 {
        self.buf.len() as u64
    }

    /// The raw pool bytes, ready to stream as section 15.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }
}
