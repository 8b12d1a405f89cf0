//! Evaluate a synthetic weld-toe fillet with all three radius methods and
//! both angle methods.

use weldtoe_core::{
    eval_angle_end, eval_angle_max, eval_curvature_max, eval_iterative, eval_least_squares,
    AngleConfig, CurvatureMaxConfig, IterativeConfig, LeastSquaresConfig, Profile,
};

/// Baseline, tangent arc, then straight flank: the shape a profilometer
/// would digitize at a weld toe.
fn fillet(radius: f64, flank_deg: f64, dx: f64) -> Vec<[f64; 2]> {
    let theta = flank_deg.to_radians();
    let x_t = radius * theta.sin();
    let y_t = radius * (1.0 - theta.cos());
    let n = ((x_t + 2.0) / dx).round() as usize + 1;
    (0..n)
        .map(|i| {
            let x = -1.0 + i as f64 * dx;
            let y = if x <= 0.0 {
                0.0
            } else if x <= x_t {
                radius - (radius * radius - x * x).sqrt()
            } else {
                y_t + theta.tan() * (x - x_t)
            };
            [x, y]
        })
        .collect()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let profile = Profile::new(fillet(1.2, 35.0, 0.02))?;

    let cm = eval_curvature_max(&profile, &CurvatureMaxConfig::default())?;
    let lsm = eval_least_squares(&profile, &LeastSquaresConfig::default())?;
    let im = eval_iterative(&profile, &IterativeConfig::default())?;

    println!("Radius (CM method): {:.3}", cm.radius);
    println!("Radius (LSM method): {:.3}", lsm.radius);
    match &im {
        Some(r) => println!("Radius (IM method): {:.3}", r.radius),
        None => println!("Radius (IM method): not found"),
    }

    let angle_cfg = AngleConfig::default();
    let max = eval_angle_max(&profile, &angle_cfg)?;
    println!(
        "Max angle: {:.3} degrees",
        max.angle_deg.unwrap_or(f64::NAN)
    );

    if let Some(end_idx) = lsm.end_idx {
        let end = eval_angle_end(&profile, &angle_cfg, end_idx)?;
        println!(
            "End angle (LSM): {:.3} degrees",
            end.angle_deg.unwrap_or(f64::NAN)
        );
    }
    if let Some(end_idx) = im.as_ref().and_then(|r| r.end_idx) {
        let end = eval_angle_end(&profile, &angle_cfg, end_idx)?;
        println!(
            "End angle (IM): {:.3} degrees",
            end.angle_deg.unwrap_or(f64::NAN)
        );
    }

    Ok(())
}
