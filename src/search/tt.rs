use crate::moves::types::Move;

/// Slot count; a power of two so indexing is a mask, not a modulo.
pub const TT_SIZE: usize = 1 << 18;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// score was inside the (alpha, beta) window
    Exact,
    /// beta cutoff: the true score is at least `score`
    Lower,
    /// fail low: the true score is at most `score`
    Upper,
}

#[derive(Debug, Clone)]
pub struct TtEntry {
    pub hash: u64,
    pub depth: u32,
    pub bound: Bound,
    pub score: i32,
    pub best_move: Option<Move>,
    /// Search cycle this entry was written in; stale generations lose
    /// replacement fights.
    pub age: u32,
}

/// Fixed-size transposition table, one entry per slot, indexed by the
/// low bits of the zobrist hash. Owned by a single engine instance;
/// it never grows.
pub struct TranspositionTable {
    slots: Vec<Option<TtEntry>>,
}

impl TranspositionTable {
    pub fn new() -> Self {
        TranspositionTable {
            slots: vec![None; TT_SIZE],
        }
    }

    #[inline(always)]
    fn index(hash: u64) -> usize {
        hash as usize & (TT_SIZE - 1)
    }

    /// The stored entry for `hash`, if the full hash matches (slot
    /// collisions with a different position return `None`).
    pub fn probe(&self, hash: u64) -> Option<&TtEntry> {
        self.slots[Self::index(hash)]
            .as_ref()
            .filter(|entry| entry.hash == hash)
    }

    /// Replacement policy: empty slots always accept; entries from an
    /// older search cycle are always overwritten; within the current
    /// cycle, deeper-or-equal searches win.
    pub fn store(&mut self, entry: TtEntry) {
        let slot = &mut self.slots[Self::index(entry.hash)];
        let should_write = match slot {
            None => true,
            Some(existing) => existing.age < entry.age || entry.depth >= existing.depth,
        };
        if should_write {
            *slot = Some(entry);
        }
    }
}

impl Default for TranspositionTable {
    fn default() -> Self {
        TranspositionTable::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(hash: u64, depth: u32, score: i32, age: u32) -> TtEntry {
        TtEntry {
            hash,
            depth,
            bound: Bound::Exact,
            score,
            best_move: None,
            age,
        }
    }

    #[test]
    fn probe_rejects_colliding_hashes() {
        let mut tt = TranspositionTable::new();
        tt.store(entry(5, 3, 42, 1));
        assert_eq!(tt.probe(5).unwrap().score, 42);
        // same slot, different full hash
        assert!(tt.probe(5 + TT_SIZE as u64).is_none());
    }

    #[test]
    fn shallower_entry_does_not_displace_deeper_same_cycle() {
        let mut tt = TranspositionTable::new();
        tt.store(entry(9, 6, 10, 1));
        tt.store(entry(9, 2, 99, 1));
        assert_eq!(tt.probe(9).unwrap().score, 10);
    }

    #[test]
    fn newer_cycle_always_wins() {
        let mut tt = TranspositionTable::new();
        tt.store(entry(9, 6, 10, 1));
        tt.store(entry(9, 1, 99, 2));
        assert_eq!(tt.probe(9).unwrap().score, 99);
        assert_eq!(tt.probe(9).unwrap().depth, 1);
    }
}
