/// Playfield backdrop: a shuffled rotation of colour themes.
///
/// Every `period` seconds the next theme takes over with a `fade`-second
/// cross-fade. Left/Right on the keyboard browse themes by hand, which
/// switches instantly and restarts the rotation timer.

use matype::domain::rng::RandomSource;

use super::effects::{blend, Rgb};

/// A vertical gradient plus a caption shown in the corner of the field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Theme {
    pub name: &'static str,
    pub top: Rgb,
    pub bottom: Rgb,
}

const THEMES: &[Theme] = &[
    Theme { name: "Midnight", top: (10, 12, 30), bottom: (32, 36, 70) },
    Theme { name: "Dusk", top: (40, 20, 50), bottom: (110, 50, 60) },
    Theme { name: "Forest", top: (8, 30, 18), bottom: (30, 70, 40) },
    Theme { name: "Deep Sea", top: (4, 20, 40), bottom: (10, 60, 90) },
    Theme { name: "Ember", top: (30, 8, 4), bottom: (90, 34, 10) },
    Theme { name: "Slate", top: (28, 30, 34), bottom: (64, 68, 76) },
    Theme { name: "Aurora", top: (6, 24, 30), bottom: (40, 90, 70) },
];

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Browse {
    Forward,
    Backward,
}

pub struct Backdrop {
    themes: Vec<Theme>,
    current: usize,
    previous: usize,
    /// Seconds into the rotation period.
    timer: f32,
    period: f32,
    fade: f32,
    /// Seconds of cross-fade left; 0 when settled.
    fading: f32,
}

impl Backdrop {
    pub fn new<R: RandomSource>(period: f32, fade: f32, rng: &mut R) -> Self {
        let mut themes = THEMES.to_vec();
        rng.shuffle(&mut themes);
        Backdrop {
            themes,
            current: 0,
            previous: 0,
            timer: 0.0,
            period: period.max(f32::EPSILON),
            fade: fade.max(0.0),
            fading: 0.0,
        }
    }

    pub fn update(&mut self, dt: f32) {
        self.fading = (self.fading - dt).max(0.0);

        let old = self.timer;
        self.timer = (self.timer + dt) % self.period;
        if self.timer < old && self.themes.len() > 1 {
            self.previous = self.current;
            self.current = (self.current + 1) % self.themes.len();
            self.fading = self.fade;
        }
    }

    pub fn browse(&mut self, dir: Browse) {
        let n = self.themes.len();
        self.current = match dir {
            Browse::Forward => (self.current + 1) % n,
            Browse::Backward => (self.current + n - 1) % n,
        };
        self.previous = self.current;
        self.fading = 0.0;
        self.timer = 0.0;
    }

    pub fn theme(&self) -> &Theme {
        &self.themes[self.current]
    }

    /// Background colour at `frac` of the field height (0 top, 1 bottom),
    /// cross-faded from the previous theme while a fade is running.
    pub fn color_at(&self, frac: f32) -> Rgb {
        let shade = |t: &Theme| blend(t.top, t.bottom, frac);
        let now = shade(&self.themes[self.current]);
        if self.fading > 0.0 && self.fade > 0.0 {
            let before = shade(&self.themes[self.previous]);
            blend(now, before, self.fading / self.fade)
        } else {
            now
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use matype::domain::rng::ScriptedRng;

    fn backdrop() -> Backdrop {
        // Draws of 0 keep a deterministic shuffle.
        Backdrop::new(25.0, 0.7, &mut ScriptedRng::new(&[0]))
    }

    #[test]
    fn rotates_after_period_with_fade() {
        let mut b = backdrop();
        let first = *b.theme();
        b.update(24.0);
        assert_eq!(*b.theme(), first);
        b.update(1.5);
        assert_ne!(*b.theme(), first);
        assert!(b.fading > 0.0);
        // Mid-fade the colour sits between the two themes.
        assert_ne!(b.color_at(0.0), b.theme().top);
        b.update(0.7);
        assert_eq!(b.fading, 0.0);
        assert_eq!(b.color_at(0.0), b.theme().top);
        assert_eq!(b.color_at(1.0), b.theme().bottom);
    }

    #[test]
    fn browse_wraps_and_resets_timer() {
        let mut b = backdrop();
        let first = *b.theme();
        b.update(20.0);
        b.browse(Browse::Backward);
        assert_ne!(*b.theme(), first);
        b.browse(Browse::Forward);
        assert_eq!(*b.theme(), first);
        assert_eq!(b.fading, 0.0);
        // Timer restarted: 20 more seconds is not a full period.
        b.update(20.0);
        assert_eq!(*b.theme(), first);
    }

    #[test]
    fn shuffle_keeps_every_theme() {
        let b = Backdrop::new(25.0, 0.7, &mut fastrand::Rng::with_seed(11));
        assert_eq!(b.themes.len(), THEMES.len());
        for t in THEMES {
            assert!(b.themes.contains(t));
        }
    }
}
