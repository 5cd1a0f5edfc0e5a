use crate::animation::ease::Ease;

/// How a timeline's progress follows the raw scroll progress of its range.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub enum Scrub {
    /// Progress equals raw progress.
    Immediate,
    /// Progress catches up to raw progress over this many seconds.
    Smooth(f64),
}

impl Scrub {
    /// Seconds-valued smoothing; non-positive values mean `Immediate`.
    pub fn secs(secs: f64) -> Self {
        if secs > 0.0 && secs.is_finite() {
            Self::Smooth(secs)
        } else {
            Self::Immediate
        }
    }
}

/// Smooths a target progress into the rendered progress.
///
/// Each new target restarts an `expo.out` catch-up from wherever the driver currently is.
#[derive(Clone, Debug)]
pub struct ScrubDriver {
    scrub: Scrub,
    current: f64,
    from: f64,
    target: f64,
    elapsed: f64,
}

impl ScrubDriver {
    pub fn new(scrub: Scrub, initial: f64) -> Self {
        Self {
            scrub,
            current: initial,
            from: initial,
            target: initial,
            elapsed: 0.0,
        }
    }

    pub fn scrub(&self) -> Scrub {
        self.scrub
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn is_settled(&self) -> bool {
        self.current == self.target
    }

    pub fn set_target(&mut self, target: f64) {
        if target == self.target {
            return;
        }
        self.target = target;
        match self.scrub {
            Scrub::Immediate => {
                self.current = target;
                self.from = target;
            }
            Scrub::Smooth(_) => {
                self.from = self.current;
                self.elapsed = 0.0;
            }
        }
    }

    /// Jump straight to `progress`.
    pub fn snap(&mut self, progress: f64) {
        self.current = progress;
        self.from = progress;
        self.target = progress;
        self.elapsed = 0.0;
    }

    /// Advance the catch-up by `dt` seconds and return the new progress.
    pub fn tick(&mut self, dt: f64) -> f64 {
        let Scrub::Smooth(secs) = self.scrub else {
            return self.current;
        };
        if self.is_settled() {
            return self.current;
        }
        self.elapsed += dt.max(0.0);
        let t = (self.elapsed / secs).min(1.0);
        self.current = if t >= 1.0 {
            self.target
        } else {
            self.from + (self.target - self.from) * Ease::ExpoOut.apply(t)
        };
        self.current
    }
}
