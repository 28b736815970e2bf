//! Streaming sample statistics
//!
//! Welford accumulation in f64 so a constant input yields an exact mean and a
//! zero deviation.

/// Running mean and population standard deviation
#[derive(Debug, Clone, Copy, Default)]
pub struct RunningStats {
    count: usize,
    mean: f64,
    m2: f64,
}

impl RunningStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one sample
    #[inline]
    pub fn push(&mut self, value: f32) {
        let x = value as f64;
        self.count += 1;
        let delta = x - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (x - self.mean);
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn mean(&self) -> f32 {
        self.mean as f32
    }

    /// Population standard deviation (0 for fewer than two samples)
    pub fn stddev(&self) -> f32 {
        if self.count < 2 {
            return 0.0;
        }
        (self.m2 / self.count as f64).max(0.0).sqrt() as f32
    }
}

/// Independent [`RunningStats`] per axis
#[derive(Debug, Clone, Copy, Default)]
pub struct AxisStats {
    axes: [RunningStats; 3],
}

impl AxisStats {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn push(&mut self, sample: [f32; 3]) {
        for (stats, value) in self.axes.iter_mut().zip(sample) {
            stats.push(value);
        }
    }

    /// Samples pushed (identical on every axis)
    pub fn count(&self) -> usize {
        self.axes[0].count()
    }

    pub fn mean(&self) -> [f32; 3] {
        std::array::from_fn(|i| self.axes[i].mean())
    }

    pub fn stddev(&self) -> [f32; 3] {
        std::array::from_fn(|i| self.axes[i].stddev())
    }
}

/// Per-axis extremes over a sweep
#[derive(Debug, Clone, Copy)]
pub struct AxisRange {
    min: [f32; 3],
    max: [f32; 3],
    count: usize,
}

impl AxisRange {
    pub fn new() -> Self {
        Self {
            min: [f32::INFINITY; 3],
            max: [f32::NEG_INFINITY; 3],
            count: 0,
        }
    }

    #[inline]
    pub fn push(&mut self, sample: [f32; 3]) {
        for (i, value) in sample.into_iter().enumerate() {
            self.min[i] = self.min[i].min(value);
            self.max[i] = self.max[i].max(value);
        }
        self.count += 1;
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// (max + min) / 2 per axis
    pub fn midpoint(&self) -> [f32; 3] {
        std::array::from_fn(|i| (self.max[i] + self.min[i]) / 2.0)
    }

    /// (max - min) / 2 per axis
    pub fn half_range(&self) -> [f32; 3] {
        std::array::from_fn(|i| (self.max[i] - self.min[i]) / 2.0)
    }
}

impl Default for AxisRange {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_constant_input_is_exact() {
        let mut stats = RunningStats::new();
        for _ in 0..100 {
            stats.push(0.1);
        }
        assert_eq!(stats.mean(), 0.1);
        assert_eq!(stats.stddev(), 0.0);
    }

    #[test]
    fn test_population_stddev() {
        let mut stats = RunningStats::new();
        for v in [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0] {
            stats.push(v);
        }
        assert_relative_eq!(stats.mean(), 5.0);
        assert_relative_eq!(stats.stddev(), 2.0);
    }

    #[test]
    fn test_axis_range() {
        let mut range = AxisRange::new();
        range.push([1.0, -2.0, 10.0]);
        range.push([3.0, 2.0, 30.0]);
        range.push([2.0, 0.0, 20.0]);

        assert_eq!(range.count(), 3);
        assert_eq!(range.midpoint(), [2.0, 0.0, 20.0]);
        assert_eq!(range.half_range(), [1.0, 2.0, 10.0]);
    }
}
