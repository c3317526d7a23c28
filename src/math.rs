/// Arithmetic mean of a slice, `None` when empty.
pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Straight-line fit `y = intercept + slope · x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearTrend {
    /// Change of `y` per unit of `x` (per year for time series)
    pub slope_per_year: f64,
    /// Value of the fitted line at `x = 0`
    pub intercept: f64,
    /// Standard error of the slope; `0.0` for an exact two-point fit
    pub slope_stderr: f64,
    /// Number of points fitted
    pub points: usize,
}

impl LinearTrend {
    /// Ordinary least-squares fit over `(x, y)` pairs.
    ///
    /// Returns `None` for fewer than two points or when all `x` coincide.
    pub fn fit(points: &[(f64, f64)]) -> Option<Self> {
        let n = points.len();
        if n < 2 {
            return None;
        }
        let nf = n as f64;
        let mean_x = points.iter().map(|p| p.0).sum::<f64>() / nf;
        let mean_y = points.iter().map(|p| p.1).sum::<f64>() / nf;

        let (mut sxx, mut sxy) = (0.0, 0.0);
        for &(x, y) in points {
            let dx = x - mean_x;
            sxx += dx * dx;
            sxy += dx * (y - mean_y);
        }
        if sxx <= 0.0 {
            return None;
        }
        let slope = sxy / sxx;
        let intercept = mean_y - slope * mean_x;

        // Residual variance with n - 2 degrees of freedom
        let slope_stderr = if n > 2 {
            let ssr: f64 = points
                .iter()
                .map(|&(x, y)| {
                    let r = y - (intercept + slope * x);
                    r * r
                })
                .sum();
            (ssr / (nf - 2.0) / sxx).sqrt()
        } else {
            0.0
        };

        Some(Self {
            slope_per_year: slope,
            intercept,
            slope_stderr,
            points: n,
        })
    }

    /// Slope per hundred years.
    pub fn per_century(&self) -> f64 {
        100.0 * self.slope_per_year
    }

    /// Value of the fitted line at `x`.
    pub fn value_at(&self, x: f64) -> f64 {
        self.intercept + self.slope_per_year * x
    }
}
