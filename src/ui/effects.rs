/// Cosmetic colour effects: per-word colour drift, sideways sway, the health
/// colour ramp and the title screen's jittered gradient.
///
/// Nothing here feeds back into the rules.

use std::collections::BTreeMap;

use matype::domain::rng::RandomSource;
use matype::domain::word::Word;
use matype::sim::falling::FallingSet;

pub type Rgb = (u8, u8, u8);

/// Colour a freshly spawned word starts with.
const WORD_START: Rgb = (150, 150, 150);
/// Per-frame drift of word colours, and the band they drift in.
const WORD_DRIFT: u8 = 29;
const WORD_MIN: u8 = 100;
const WORD_MAX: u8 = 240;

/// Horizontal sway amplitude in columns.
const SWAY_COLS: f32 = 1.2;

/// Move each channel a random step of at most `changes`, staying in
/// `[min, max]`.
pub fn jitter<R: RandomSource>(color: Rgb, changes: u8, min: u8, max: u8, rng: &mut R) -> Rgb {
    let mut channel = |c: u8| -> u8 {
        let low = c.saturating_sub(changes).max(min);
        let mut high = c.saturating_add(changes).min(max);
        if low >= high {
            high = low.saturating_add(1);
        }
        let span = (high - low) as usize;
        if span == 0 {
            low
        } else {
            low + rng.below(span) as u8
        }
    };
    (channel(color.0), channel(color.1), channel(color.2))
}

/// Column offset of a falling word after `age` seconds.
pub fn sway(age: f32) -> f32 {
    (age * 3.0).cos() * SWAY_COLS
}

/// White at full health, shading to red as health runs out.
pub fn health_color(ratio: f32) -> Rgb {
    let gb = (255.0 * ratio.clamp(0.0, 1.0)) as u8;
    (255, gb, gb)
}

/// Linear mix: `t = 0` gives `a`, `t = 1` gives `b`.
pub fn blend(a: Rgb, b: Rgb, t: f32) -> Rgb {
    let t = t.clamp(0.0, 1.0);
    let mix = |x: u8, y: u8| (x as f32 + (y as f32 - x as f32) * t).round() as u8;
    (mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

/// Title background: one colour per row walking from mid grey, plus a
/// darker walk per column laid faintly over it.
pub struct MenuBackground {
    rows: Vec<Rgb>,
    cols: Vec<Rgb>,
}

impl MenuBackground {
    pub fn generate<R: RandomSource>(width: usize, height: usize, rng: &mut R) -> Self {
        let mut walk = |start: Rgb, n: usize, min: u8, max: u8| -> Vec<Rgb> {
            let mut c = start;
            (0..n)
                .map(|_| {
                    c = jitter(c, 5, min, max, rng);
                    c
                })
                .collect()
        };
        let rows = walk((100, 100, 100), height, 30, 200);
        let cols = walk((10, 10, 10), width, 0, 55);
        MenuBackground { rows, cols }
    }

    pub fn size(&self) -> (usize, usize) {
        (self.cols.len(), self.rows.len())
    }

    pub fn at(&self, x: usize, y: usize) -> Rgb {
        let row = self.rows.get(y).copied().unwrap_or((100, 100, 100));
        let col = self.cols.get(x).copied().unwrap_or((10, 10, 10));
        blend(row, col, 0.2)
    }
}

/// Current colour of every word on screen.
#[derive(Default)]
pub struct WordColors {
    colors: BTreeMap<Word, Rgb>,
}

impl WordColors {
    /// Drift every on-screen word's colour one step, start new words grey and
    /// forget words that left.
    pub fn update<R: RandomSource>(&mut self, falling: &FallingSet, rng: &mut R) {
        self.colors.retain(|w, _| falling.get(w.as_str()).is_some());
        for f in falling.iter() {
            let c = self.colors.entry(f.word.clone()).or_insert(WORD_START);
            *c = jitter(*c, WORD_DRIFT, WORD_MIN, WORD_MAX, rng);
        }
    }

    pub fn get(&self, word: &Word) -> Rgb {
        self.colors.get(word).copied().unwrap_or(WORD_START)
    }

    pub fn clear(&mut self) {
        self.colors.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use matype::domain::rng::ScriptedRng;

    #[test]
    fn jitter_stays_in_band() {
        let mut rng = fastrand::Rng::with_seed(7);
        let mut c = (150, 150, 150);
        for _ in 0..1000 {
            c = jitter(c, WORD_DRIFT, WORD_MIN, WORD_MAX, &mut rng);
            for ch in [c.0, c.1, c.2] {
                assert!((WORD_MIN..=WORD_MAX).contains(&ch));
            }
        }
    }

    #[test]
    fn jitter_uses_scripted_steps() {
        // low = 95, high = 105 → 95 + draw
        let mut rng = ScriptedRng::new(&[0, 5, 9]);
        assert_eq!(jitter((100, 100, 100), 5, 0, 255, &mut rng), (95, 100, 104));
    }

    #[test]
    fn jitter_collapsed_band() {
        let mut rng = ScriptedRng::new(&[3]);
        assert_eq!(jitter((10, 10, 10), 5, 200, 200, &mut rng), (200, 200, 200));
    }

    #[test]
    fn health_ramp() {
        assert_eq!(health_color(1.0), (255, 255, 255));
        assert_eq!(health_color(0.0), (255, 0, 0));
        assert_eq!(health_color(0.5), (255, 127, 127));
    }

    #[test]
    fn blend_endpoints() {
        assert_eq!(blend((0, 0, 0), (200, 100, 50), 0.0), (0, 0, 0));
        assert_eq!(blend((0, 0, 0), (200, 100, 50), 1.0), (200, 100, 50));
        assert_eq!(blend((0, 0, 0), (200, 100, 50), 0.5), (100, 50, 25));
    }

    #[test]
    fn sway_is_bounded() {
        for i in 0..100 {
            assert!(sway(i as f32 * 0.1).abs() <= SWAY_COLS);
        }
        assert!((sway(0.0) - SWAY_COLS).abs() < 1e-6);
    }

    #[test]
    fn word_colors_track_the_falling_set() {
        let mut set = FallingSet::new();
        let cat = Word::parse("cat").unwrap();
        set.insert(cat.clone(), 0);
        let mut colors = WordColors::default();
        let mut rng = fastrand::Rng::with_seed(1);
        colors.update(&set, &mut rng);
        assert_eq!(colors.colors.len(), 1);
        set.clear();
        colors.update(&set, &mut rng);
        assert!(colors.colors.is_empty());
        assert_eq!(colors.get(&cat), WORD_START);
    }

    #[test]
    fn menu_background_covers_screen() {
        let mut rng = fastrand::Rng::with_seed(3);
        let bg = MenuBackground::generate(80, 24, &mut rng);
        assert_eq!(bg.size(), (80, 24));
        let _ = bg.at(79, 23);
        assert_eq!(bg.at(500, 500), blend((100, 100, 100), (10, 10, 10), 0.2));
    }
}
