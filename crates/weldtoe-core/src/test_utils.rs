//! Shared synthetic-profile fixtures for unit tests.
//!
//! Consolidated here so every evaluator test builds its profiles the same
//! way: straight lines for degenerate cases, the x² scenario profile, and a
//! tangent-arc fillet that mimics a weld toe (baseline, circular arc,
//! straight flank, C¹ everywhere).

/// Points on the line `y = m·x + b`, sampled at `x0 + i·dx`.
pub(crate) fn line_points(n: usize, x0: f64, dx: f64, m: f64, b: f64) -> Vec<[f64; 2]> {
    (0..n)
        .map(|i| {
            let x = x0 + i as f64 * dx;
            [x, m * x + b]
        })
        .collect()
}

/// The six-point parabola scenario: y = x² on x = 0..5.
pub(crate) fn parabola_points() -> Vec<[f64; 2]> {
    (0..6).map(|i| [i as f64, (i * i) as f64]).collect()
}

/// Weld-toe fillet: flat baseline for x ≤ 0, a circular arc of the given
/// radius tangent to it at the origin, then a straight flank tangent to the
/// arc at `flank_deg`. Baseline and flank each extend one length unit.
/// The generating circle is centered at `(0, radius)`.
pub(crate) fn toe_fillet_points(radius: f64, flank_deg: f64, dx: f64) -> Vec<[f64; 2]> {
    let theta = flank_deg.to_radians();
    let x_t = radius * theta.sin();
    let y_t = radius * (1.0 - theta.cos());
    let slope = theta.tan();

    let x_min = -1.0;
    let x_max = x_t + 1.0;
    let n = ((x_max - x_min) / dx).round() as usize + 1;
    (0..n)
        .map(|i| {
            let x = x_min + i as f64 * dx;
            let y = if x <= 0.0 {
                0.0
            } else if x <= x_t {
                radius - (radius * radius - x * x).sqrt()
            } else {
                y_t + slope * (x - x_t)
            };
            [x, y]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fillet_is_monotone_in_x_and_continuous() {
        let pts = toe_fillet_points(1.0, 30.0, 0.02);
        for w in pts.windows(2) {
            assert!(w[1][0] > w[0][0]);
            assert!((w[1][1] - w[0][1]).abs() < 0.05, "no jumps");
        }
        // Arc points sit on the generating circle.
        for p in pts.iter().filter(|p| p[0] > 0.0 && p[0] < 0.5) {
            let d = (p[0] * p[0] + (p[1] - 1.0) * (p[1] - 1.0)).sqrt();
            assert!((d - 1.0).abs() < 1e-12);
        }
    }
}
