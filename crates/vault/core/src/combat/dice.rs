//! Roll counts and the per-side bit stream dice are drawn from.

use crate::config::VaultConfig;
use crate::env::{PcgRng, RandomWord, mix_seed};

const OVERFLOW_DOMAIN: u32 = 0x0f10;

/// Dice rolls for a fighter of `level` in one skill.
///
/// `1 + level / step + extra`, capped at [`VaultConfig::MAX_ROLLS_PER_SIDE`].
pub fn roll_count(level: u16, step: u16, extra_rolls: u8) -> u16 {
    let base = 1 + level / step.max(1);
    base.saturating_add(u16::from(extra_rolls))
        .min(VaultConfig::MAX_ROLLS_PER_SIDE)
}

/// Sequential bit reader over one side's share of the random words.
///
/// Side `parity` owns the words at indices `parity, parity + 2, ...`. Bits are
/// read least-significant first; after 64 bits the next word of the same
/// parity takes over. Once the supplied words of that parity run out, further
/// words are derived from the last supplied one with [`mix_seed`], so a roster
/// of any size still reads a reproducible stream.
#[derive(Clone, Debug)]
pub struct BitStream<'w> {
    words: &'w [RandomWord],
    parity: usize,
    word_index: u64,
    current: RandomWord,
    bit: u32,
}

impl<'w> BitStream<'w> {
    /// Creates the stream for side `parity` (0 = A, 1 = B).
    ///
    /// `words` must hold at least two entries; the resolver checks this.
    pub fn new(words: &'w [RandomWord], parity: usize) -> Self {
        let mut stream = Self {
            words,
            parity,
            word_index: 0,
            current: 0,
            bit: 0,
        };
        stream.current = stream.word(0);
        stream
    }

    /// Next bit of the stream; `true` is a hit.
    pub fn next_bit(&mut self) -> bool {
        if self.bit == RandomWord::BITS {
            self.word_index += 1;
            self.current = self.word(self.word_index);
            self.bit = 0;
        }
        let set = (self.current >> self.bit) & 1 == 1;
        self.bit += 1;
        set
    }

    /// Counts hits over `rolls` draws.
    pub fn hits(&mut self, rolls: u16) -> u16 {
        (0..rolls).filter(|_| self.next_bit()).count() as u16
    }

    fn word(&self, n: u64) -> RandomWord {
        let index = self.parity as u64 + 2 * n;
        if let Some(word) = usize::try_from(index)
            .ok()
            .and_then(|index| self.words.get(index))
        {
            return *word;
        }
        let last_supplied = self.last_supplied_index();
        let base = self.words.get(last_supplied).copied().unwrap_or_default();
        PcgRng::next_u64(mix_seed(base, OVERFLOW_DOMAIN + self.parity as u32, n))
    }

    fn last_supplied_index(&self) -> usize {
        let len = self.words.len();
        if len == 0 {
            return 0;
        }
        let last = len - 1;
        if last % 2 == self.parity % 2 {
            last
        } else {
            last.saturating_sub(1)
        }
    }
}
