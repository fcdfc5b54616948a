//! Salsa20 and ChaCha20 block cores
//!
//! Both run `rounds / 2` double-rounds over a copy of the state and add the
//! input back in (feed-forward), so they act as pseudorandom functions of
//! the block rather than keystream generators.

use crate::blocks::Block;
use crate::params::Rounds;

/// Stream-cipher core selector, packed as the high byte of a mix mode
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cipher {
    Salsa,
    ChaCha,
}

impl Cipher {
    #[inline(always)]
    pub fn apply(self, state: &mut Block, rounds: Rounds) {
        match self {
            Cipher::Salsa => salsa_core(state, rounds),
            Cipher::ChaCha => chacha_core(state, rounds),
        }
    }
}

#[inline(always)]
fn salsa_quarter(x: &mut Block, a: usize, b: usize, c: usize, d: usize) {
    x[b] ^= x[a].wrapping_add(x[d]).rotate_left(7);
    x[c] ^= x[b].wrapping_add(x[a]).rotate_left(9);
    x[d] ^= x[c].wrapping_add(x[b]).rotate_left(13);
    x[a] ^= x[d].wrapping_add(x[c]).rotate_left(18);
}

#[inline(always)]
fn chacha_quarter(x: &mut Block, a: usize, b: usize, c: usize, d: usize) {
    x[a] = x[a].wrapping_add(x[b]);
    x[d] = (x[d] ^ x[a]).rotate_left(16);
    x[c] = x[c].wrapping_add(x[d]);
    x[b] = (x[b] ^ x[c]).rotate_left(12);
    x[a] = x[a].wrapping_add(x[b]);
    x[d] = (x[d] ^ x[a]).rotate_left(8);
    x[c] = x[c].wrapping_add(x[d]);
    x[b] = (x[b] ^ x[c]).rotate_left(7);
}

#[inline(always)]
fn feed_forward(state: &mut Block, mixed: &Block) {
    for (s, m) in state.iter_mut().zip(mixed) {
        *s = s.wrapping_add(*m);
    }
}

/// Salsa20/`rounds` core: column then row quarter-rounds
pub fn salsa_core(state: &mut Block, rounds: Rounds) {
    let mut x = *state;

    for _ in 0..rounds.double_rounds() {
        salsa_quarter(&mut x, 0, 4, 8, 12);
        salsa_quarter(&mut x, 5, 9, 13, 1);
        salsa_quarter(&mut x, 10, 14, 2, 6);
        salsa_quarter(&mut x, 15, 3, 7, 11);
        salsa_quarter(&mut x, 0, 1, 2, 3);
        salsa_quarter(&mut x, 5, 6, 7, 4);
        salsa_quarter(&mut x, 10, 11, 8, 9);
        salsa_quarter(&mut x, 15, 12, 13, 14);
    }

    feed_forward(state, &x);
}

/// ChaCha20/`rounds` core: column then diagonal quarter-rounds
pub fn chacha_core(state: &mut Block, rounds: Rounds) {
    let mut x = *state;

    for _ in 0..rounds.double_rounds() {
        chacha_quarter(&mut x, 0, 4, 8, 12);
        chacha_quarter(&mut x, 1, 5, 9, 13);
        chacha_quarter(&mut x, 2, 6, 10, 14);
        chacha_quarter(&mut x, 3, 7, 11, 15);
        chacha_quarter(&mut x, 0, 5, 10, 15);
        chacha_quarter(&mut x, 1, 6, 11, 12);
        chacha_quarter(&mut x, 2, 7, 8, 13);
        chacha_quarter(&mut x, 3, 4, 9, 14);
    }

    feed_forward(state, &x);
}
