//! Ordered, idempotent, capped signature accumulation.
//!
//! Every chain's approval list obeys the same policy: signers are identified
//! by normalized public key bytes, re-adding a known signer is a no-op,
//! insertion order is kept, and the first genuinely new signer beyond the cap
//! is rejected. Duplicate detection runs before the cap check, so a repeat
//! signer is accepted as a no-op even when the list is full.

use tracing::trace;

use crate::BuilderError;

/// Message used when the signer cap is exceeded.
pub const MAX_SIGNERS_REACHED: &str = "maximum signers reached";

/// Something that identifies the key that produced it.
pub trait SignerEntry {
    /// Normalized public key bytes of the signer.
    ///
    /// Extended keys and alternative encodings of the same key must reduce to
    /// the same bytes.
    fn signer_id(&self) -> Vec<u8>;
}

/// Result of offering an entry to the accumulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accumulated {
    /// The signer was new and the entry was appended.
    Added,
    /// The signer was already present; nothing changed.
    Duplicate,
}

/// An ordered set of signer entries with a maximum size.
#[derive(Debug, Clone)]
pub struct SignatureAccumulator<E> {
    entries: Vec<E>,
    cap: usize,
}

impl<E: SignerEntry> SignatureAccumulator<E> {
    /// Create an empty accumulator holding at most `cap` signers.
    pub fn new(cap: usize) -> Self {
        SignatureAccumulator {
            entries: Vec::new(),
            cap,
        }
    }

    /// Create an accumulator pre-filled with `entries`, applying the same
    /// de-duplication and cap rules as repeated `push` calls.
    ///
    /// # Returns
    /// The accumulator, or `Signing` if more than `cap` distinct signers are
    /// present.
    pub fn with_entries<I>(cap: usize, entries: I) -> Result<Self, BuilderError>
    where
        I: IntoIterator<Item = E>,
    {
        let mut acc = Self::new(cap);
        for entry in entries {
            acc.push(entry)?;
        }
        Ok(acc)
    }

    /// Decide what `push` would do for a signer without modifying anything.
    ///
    /// # Returns
    /// `Duplicate` for a known signer, `Added` when there is room for a new
    /// one, or `Signing(MAX_SIGNERS_REACHED)` when the cap is already met.
    pub fn check(&self, signer_id: &[u8]) -> Result<Accumulated, BuilderError> {
        if self.contains(signer_id) {
            return Ok(Accumulated::Duplicate);
        }
        if self.entries.len() >= self.cap {
            return Err(BuilderError::Signing(MAX_SIGNERS_REACHED.to_string()));
        }
        Ok(Accumulated::Added)
    }

    /// Append an entry unless its signer is already present.
    ///
    /// # Returns
    /// Whether the entry was added or suppressed as a duplicate, or
    /// `Signing(MAX_SIGNERS_REACHED)` for a new signer past the cap.
    pub fn push(&mut self, entry: E) -> Result<Accumulated, BuilderError> {
        let id = entry.signer_id();
        let outcome = self.check(&id)?;
        match outcome {
            Accumulated::Added => self.entries.push(entry),
            Accumulated::Duplicate => trace!(signer = %hex::encode(&id), "duplicate signer ignored"),
        }
        Ok(outcome)
    }

    /// Whether a signer with these normalized bytes is present.
    pub fn contains(&self, signer_id: &[u8]) -> bool {
        self.find(signer_id).is_some()
    }

    /// The entry produced by the given signer, if any.
    pub fn find(&self, signer_id: &[u8]) -> Option<&E> {
        self.entries.iter().find(|e| e.signer_id() == signer_id)
    }

    /// Remove every entry matching `keep == false`, preserving order.
    pub fn retain<F>(&mut self, keep: F)
    where
        F: FnMut(&E) -> bool,
    {
        self.entries.retain(keep);
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> &[E] {
        &self.entries
    }

    /// Consume the accumulator, returning entries in insertion order.
    pub fn into_entries(self) -> Vec<E> {
        self.entries
    }

    /// Maximum number of distinct signers.
    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Number of distinct signers held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no signer has been added.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Entry {
        key: u8,
        sig: &'static str,
    }

    impl SignerEntry for Entry {
        fn signer_id(&self) -> Vec<u8> {
            vec![self.key]
        }
    }

    fn entry(key: u8, sig: &'static str) -> Entry {
        Entry { key, sig }
    }

    #[test]
    fn test_insertion_order_is_preserved() {
        let mut acc = SignatureAccumulator::new(3);
        acc.push(entry(9, "a")).unwrap();
        acc.push(entry(1, "b")).unwrap();
        acc.push(entry(5, "c")).unwrap();
        let keys: Vec<u8> = acc.entries().iter().map(|e| e.key).collect();
        assert_eq!(keys, vec![9, 1, 5]);
    }

    #[test]
    fn test_duplicate_signer_is_a_noop() {
        let mut acc = SignatureAccumulator::new(3);
        assert_eq!(acc.push(entry(1, "first")).unwrap(), Accumulated::Added);
        assert_eq!(acc.push(entry(1, "second")).unwrap(), Accumulated::Duplicate);
        assert_eq!(acc.len(), 1);
        // the first entry wins
        assert_eq!(acc.entries()[0].sig, "first");
    }

    #[test]
    fn test_new_signer_past_cap_is_rejected() {
        let mut acc = SignatureAccumulator::new(3);
        for key in 1..=3 {
            acc.push(entry(key, "s")).unwrap();
        }
        let err = acc.push(entry(4, "s")).unwrap_err();
        assert!(matches!(err, BuilderError::Signing(ref m) if m == MAX_SIGNERS_REACHED));
        assert_eq!(acc.len(), 3);
    }

    #[test]
    fn test_duplicate_past_cap_is_still_a_noop() {
        let mut acc = SignatureAccumulator::new(2);
        acc.push(entry(1, "s")).unwrap();
        acc.push(entry(2, "s")).unwrap();
        assert_eq!(acc.push(entry(2, "again")).unwrap(), Accumulated::Duplicate);
        assert_eq!(acc.check(&[1]).unwrap(), Accumulated::Duplicate);
        assert!(acc.check(&[3]).is_err());
    }

    #[test]
    fn test_with_entries_applies_same_rules() {
        let acc = SignatureAccumulator::with_entries(2, vec![entry(1, "a"), entry(1, "b"), entry(2, "c")]).unwrap();
        assert_eq!(acc.len(), 2);
        assert!(SignatureAccumulator::with_entries(1, vec![entry(1, "a"), entry(2, "b")]).is_err());
    }

    #[test]
    fn test_retain_and_find() {
        let mut acc = SignatureAccumulator::with_entries(3, vec![entry(1, "a"), entry(2, "b")]).unwrap();
        assert_eq!(acc.find(&[2]).map(|e| e.sig), Some("b"));
        acc.retain(|e| e.key != 1);
        assert!(!acc.contains(&[1]));
        assert_eq!(acc.into_entries(), vec![entry(2, "b")]);
    }
}
