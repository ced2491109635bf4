/// Random source seam.
///
/// The round controller never touches a global RNG: every random decision
/// (word pick, spawn column, dictionary shuffle) goes through this trait so a
/// session can be replayed from a seed or driven by a scripted sequence.

pub trait RandomSource {
    /// Uniform index in `0..n`. `n` is always > 0 at call sites.
    fn below(&mut self, n: usize) -> usize;

    /// Fisher-Yates shuffle built on `below`.
    fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.below(i + 1);
            items.swap(i, j);
        }
    }
}

impl RandomSource for fastrand::Rng {
    fn below(&mut self, n: usize) -> usize {
        self.usize(..n)
    }
}

/// Replays a fixed list of draws, cycling when it runs out.
/// Each draw is reduced modulo `n`, so scripts stay valid for any pool size.
#[derive(Clone, Debug)]
pub struct ScriptedRng {
    draws: Vec<usize>,
    pos: usize,
}

impl ScriptedRng {
    pub fn new(draws: &[usize]) -> Self {
        ScriptedRng { draws: draws.to_vec(), pos: 0 }
    }

    /// Number of draws consumed so far.
    pub fn consumed(&self) -> usize {
        self.pos
    }
}

impl RandomSource for ScriptedRng {
    fn below(&mut self, n: usize) -> usize {
        if self.draws.is_empty() {
            return 0;
        }
        let v = self.draws[self.pos % self.draws.len()];
        self.pos += 1;
        v % n
    }
}
