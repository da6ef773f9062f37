use once_cell::sync::OnceCell;
use rand::{RngCore, SeedableRng, rngs::StdRng};

/// Fixed seed so hashes are reproducible across runs and hosts. The
/// transposition table, repetition detection and every test depend on
/// positions hashing identically from one process to the next.
const ZOBRIST_SEED: u64 = 0x9E37_79B9_AAAC_5C87;

/// Process-wide zobrist key tables.
///
/// `piece` is indexed `[piece_code][square64]` with piece codes
/// 0..=5 = white P,N,B,R,Q,K and 6..=11 = black p,n,b,r,q,k.
/// `castling` is indexed by the 4-bit rights combination, `ep_file` by
/// file a..h, and `side_to_move` is XORed in while black is to move.
pub struct ZobristKeys {
    pub piece: [[u64; 64]; 12],
    pub castling: [u64; 16],
    pub ep_file: [u64; 8],
    pub side_to_move: u64,
}

/// Global keys, initialized on first use.
pub fn zobrist_keys() -> &'static ZobristKeys {
    static KEYS: OnceCell<ZobristKeys> = OnceCell::new();
    KEYS.get_or_init(|| generate_keys(StdRng::seed_from_u64(ZOBRIST_SEED)))
}

fn generate_keys(mut rng: StdRng) -> ZobristKeys {
    #[inline]
    fn non_zero(r: &mut StdRng) -> u64 {
        // avoid zero keys to reduce degenerate collisions
        let mut v = r.next_u64();
        while v == 0 {
            v = r.next_u64();
        }
        v
    }

    let mut keys = ZobristKeys {
        piece: [[0u64; 64]; 12],
        castling: [0u64; 16],
        ep_file: [0u64; 8],
        side_to_move: 0,
    };

    for code in 0..12 {
        for sq in 0..64 {
            keys.piece[code][sq] = non_zero(&mut rng);
        }
    }
    for combo in 0..16 {
        keys.castling[combo] = non_zero(&mut rng);
    }
    for file in 0..8 {
        keys.ep_file[file] = non_zero(&mut rng);
    }
    keys.side_to_move = non_zero(&mut rng);

    keys
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_stable_and_distinct() {
        let a = zobrist_keys();
        let b = zobrist_keys();
        assert!(std::ptr::eq(a, b));

        // spot-check distinctness across a few slots
        assert_ne!(a.piece[0][0], a.piece[0][1]);
        assert_ne!(a.piece[0][0], a.piece[11][63]);
        assert_ne!(a.castling[1], a.castling[2]);
        assert_ne!(a.ep_file[0], a.ep_file[7]);
        assert_ne!(a.side_to_move, 0);
    }
}
