//! Optimization utilities for parameter estimation.

/// Result of a one-dimensional search.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// The optimal point found.
    pub optimal_point: f64,
    /// The objective function value at the optimal point.
    pub optimal_value: f64,
    /// Number of iterations performed.
    pub iterations: usize,
    /// Whether the bracket shrank below the tolerance.
    pub converged: bool,
}

/// Configuration for golden-section search.
#[derive(Debug, Clone)]
pub struct GoldenSectionConfig {
    /// Maximum number of iterations.
    pub max_iter: usize,
    /// Convergence tolerance on the bracket width.
    pub tolerance: f64,
}

impl Default for GoldenSectionConfig {
    fn default() -> Self {
        Self {
            max_iter: 200,
            tolerance: 1e-10,
        }
    }
}

impl GoldenSectionConfig {
    /// Set the maximum number of iterations.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set the bracket-width tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }
}

/// Maximize a unimodal function on `[lower, upper]` by golden-section search.
///
/// NaN objective values are treated as negative infinity. If the bounds are
/// swapped they are reordered.
///
/// # Example
/// ```
/// use tsprep::utils::optimization::{golden_section_max, GoldenSectionConfig};
///
/// // Maximize -(x - 0.3)^2
/// let result = golden_section_max(
///     |x| -(x - 0.3).powi(2),
///     -2.0,
///     2.0,
///     &GoldenSectionConfig::default(),
/// );
///
/// assert!(result.converged);
/// assert!((result.optimal_point - 0.3).abs() < 1e-6);
/// ```
pub fn golden_section_max<F>(
    objective: F,
    lower: f64,
    upper: f64,
    config: &GoldenSectionConfig,
) -> SearchResult
where
    F: Fn(f64) -> f64,
{
    let eval = |x: f64| {
        let v = objective(x);
        if v.is_nan() {
            f64::NEG_INFINITY
        } else {
            v
        }
    };

    let (mut a, mut b) = if lower <= upper {
        (lower, upper)
    } else {
        (upper, lower)
    };

    // 1 / golden ratio
    let inv_phi = (5.0_f64.sqrt() - 1.0) / 2.0;

    let mut c = b - inv_phi * (b - a);
    let mut d = a + inv_phi * (b - a);
    let mut fc = eval(c);
    let mut fd = eval(d);

    let mut iterations = 0;
    let mut converged = false;

    while iterations < config.max_iter {
        if (b - a).abs() <= config.tolerance {
            converged = true;
            break;
        }
        iterations += 1;

        if fc >= fd {
            b = d;
            d = c;
            fd = fc;
            c = b - inv_phi * (b - a);
            fc = eval(c);
        } else {
            a = c;
            c = d;
            fc = fd;
            d = a + inv_phi * (b - a);
            fd = eval(d);
        }

        log::trace!("golden section iter {iterations}: bracket [{a}, {b}]");
    }

    if !converged && (b - a).abs() <= config.tolerance {
        converged = true;
    }

    let (optimal_point, optimal_value) = if fc >= fd { (c, fc) } else { (d, fd) };

    SearchResult {
        optimal_point,
        optimal_value,
        iterations,
        converged,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn golden_section_quadratic() {
        let result = golden_section_max(
            |x| 5.0 - (x - 1.25).powi(2),
            -2.0,
            2.0,
            &GoldenSectionConfig::default(),
        );

        assert!(result.converged);
        assert_relative_eq!(result.optimal_point, 1.25, epsilon = 1e-6);
        assert_relative_eq!(result.optimal_value, 5.0, epsilon = 1e-10);
    }

    #[test]
    fn golden_section_maximum_at_bound() {
        // Monotone increasing: optimum pinned near the upper bound
        let result = golden_section_max(|x| x, 0.0, 1.0, &GoldenSectionConfig::default());
        assert!(result.optimal_point > 1.0 - 1e-6);
    }

    #[test]
    fn golden_section_swapped_bounds() {
        let result = golden_section_max(
            |x| -(x + 0.5).powi(2),
            1.0,
            -1.0,
            &GoldenSectionConfig::default(),
        );
        assert_relative_eq!(result.optimal_point, -0.5, epsilon = 1e-6);
    }

    #[test]
    fn golden_section_nan_is_avoided() {
        // Undefined on the left half
        let result = golden_section_max(
            |x| if x < 0.0 { f64::NAN } else { -(x - 0.5).powi(2) },
            -1.0,
            1.0,
            &GoldenSectionConfig::default(),
        );
        assert_relative_eq!(result.optimal_point, 0.5, epsilon = 1e-6);
    }

    #[test]
    fn golden_section_respects_max_iter() {
        let config = GoldenSectionConfig::default().with_max_iter(5);
        let result = golden_section_max(|x| -x * x, -1.0, 1.0, &config);
        assert_eq!(result.iterations, 5);
        assert!(!result.converged);
    }
}
