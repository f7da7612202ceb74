/// Source of uniform randomness for the market simulator and the ensemble's
/// placeholder signal.
///
/// Implementations only supply `next_unit`; every other draw is derived from it,
/// so a scripted source fully determines generator output.
pub trait RandomSource: Send {
    /// Uniform draw in `[0, 1)`.
    fn next_unit(&mut self) -> f64;

    /// Uniform draw in `[low, high)`.
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        low + (high - low) * self.next_unit()
    }

    /// Integer draw in `[low, high)`.
    fn int_range(&mut self, low: u64, high: u64) -> u64 {
        if high <= low {
            return low;
        }
        let span = high - low;
        let offset = (self.next_unit() * span as f64).floor() as u64;
        low + offset.min(span - 1)
    }

    /// Symmetric noise in `[-half_width, half_width)`.
    fn jitter(&mut self, half_width: f64) -> f64 {
        (self.next_unit() - 0.5) * 2.0 * half_width
    }

    /// Fair coin: true when the unit draw lands above one half.
    fn coin_flip(&mut self) -> bool {
        self.next_unit() > 0.5
    }
}

impl<R: RandomSource + ?Sized> RandomSource for Box<R> {
    fn next_unit(&mut self) -> f64 {
        (**self).next_unit()
    }
}
