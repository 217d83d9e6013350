//! Completion reporting for long rendering passes.
//!
//! Passes call [`Progress::report`] with a fraction in `[0, 1]` once per
//! output row (sphere) or per θ step (torus). Reporting never influences the
//! rendered pixels; pass [`NoProgress`] to ignore it.

/// Receives completion fractions in `[0, 1]`.
pub trait Progress {
    fn report(&mut self, fraction: f32);
}

impl<F: FnMut(f32)> Progress for F {
    fn report(&mut self, fraction: f32) {
        self(fraction)
    }
}

/// Discards every report.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn report(&mut self, _fraction: f32) {}
}

/// Forwards only reports that advance by at least one percent.
pub struct Throttled<P> {
    inner: P,
    last_percent: Option<u32>,
}

impl<P: Progress> Throttled<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            last_percent: None,
        }
    }
}

impl<P: Progress> Progress for Throttled<P> {
    fn report(&mut self, fraction: f32) {
        let percent = (fraction.clamp(0.0, 1.0) * 100.0) as u32;
        if self.last_percent != Some(percent) {
            self.last_percent = Some(percent);
            self.inner.report(fraction);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_receive_reports() {
        let mut seen = Vec::new();
        {
            let mut sink = |f: f32| seen.push(f);
            sink.report(0.25);
            sink.report(1.0);
        }
        assert_eq!(seen, vec![0.25, 1.0]);
    }

    #[test]
    fn throttled_skips_small_steps() {
        let mut count = 0;
        {
            let mut throttled = Throttled::new(|_: f32| count += 1);
            for i in 0..=1000 {
                throttled.report(i as f32 / 1000.0);
            }
        }
        assert_eq!(count, 101);
    }
}
