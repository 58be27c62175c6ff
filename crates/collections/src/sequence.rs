use std::sync::atomic::{AtomicU64, Ordering};

use chrono::NaiveDate;

/// Process-wide receipt numbering.
///
/// Receipts come out as `COL/{collection date}/{counter}` with a shared,
/// zero-padded counter. Numbers are handed out once and never reused, even
/// when the collection is later cancelled.
#[derive(Debug)]
pub struct ReceiptSequence {
    next: AtomicU64,
}

impl ReceiptSequence {
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    pub fn next(&self, date: NaiveDate) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("COL/{}/{:05}", date.format("%Y%m%d"), n)
    }
}

impl Default for ReceiptSequence {
    fn default() -> Self {
        Self::new()
    }
}
