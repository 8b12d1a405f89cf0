//! weldtoe CLI: batch weld-toe radius and flank-angle evaluation.

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use weldtoe_core::{
    eval_angle_end, eval_angle_max, eval_curvature_max, eval_iterative, eval_least_squares,
    AngleConfig, AngleResult, CurvatureMaxConfig, IterativeConfig, LeastSquaresConfig, Profile,
    RadiusResult,
};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "weldtoe")]
#[command(
    about = "Determine weld toe radius and flank angle from digitized cross-section profiles"
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a single profile file.
    Eval(CliEvalArgs),

    /// Evaluate every .asc profile in a folder.
    Batch(CliBatchArgs),
}

#[derive(Debug, Clone, Args)]
struct CliEvalArgs {
    /// Path to the profile file (single header row, two numeric columns).
    #[arg(long)]
    profile: PathBuf,

    /// Path to write the evaluation result (JSON).
    #[arg(long)]
    out: Option<PathBuf>,

    #[command(flatten)]
    options: EvalOptions,
}

#[derive(Debug, Clone, Args)]
struct CliBatchArgs {
    /// Folder containing .asc profile files.
    #[arg(long)]
    folder: PathBuf,

    /// Path to write all evaluation results (JSON array).
    #[arg(long)]
    out: Option<PathBuf>,

    #[command(flatten)]
    options: EvalOptions,
}

#[derive(Debug, Clone, Args)]
struct EvalOptions {
    /// Smoothing parameter for the derivative engine (1.0 disables smoothing).
    #[arg(long, default_value = "1.0")]
    smoothparam: f64,

    /// LSM: curvature window threshold as a fraction of the maximum.
    #[arg(long, default_value = "0.3")]
    lsm_factor: f64,

    /// IM: minimum-rise factor (fraction of the candidate radius).
    #[arg(long, default_value = "0.01")]
    im_min_rise: f64,

    /// IM: maximum radial deviation between profile and circle.
    #[arg(long, default_value = "0.02")]
    im_max_deviation: f64,

    /// IM: minimum number of points between start and end point.
    #[arg(long, default_value = "3")]
    im_min_support: usize,

    /// Arc-length smoothing window for the angle methods (0 disables).
    #[arg(long, default_value = "0.2")]
    angle_smooth_len: f64,

    /// Unit rescale applied to both columns on load (10.0: cm → mm).
    #[arg(long, default_value = "10.0")]
    scale: f64,

    /// Keep the file row order (by default it is flipped, scanner convention).
    #[arg(long)]
    no_flip: bool,
}

impl EvalOptions {
    fn curvature_max(&self) -> CurvatureMaxConfig {
        CurvatureMaxConfig {
            smoothparam: self.smoothparam,
        }
    }

    fn least_squares(&self) -> LeastSquaresConfig {
        LeastSquaresConfig {
            smoothparam: self.smoothparam,
            factor: self.lsm_factor,
        }
    }

    fn iterative(&self) -> IterativeConfig {
        IterativeConfig {
            smoothparam: self.smoothparam,
            min_rise_factor: self.im_min_rise,
            max_deviation: self.im_max_deviation,
            min_support: self.im_min_support,
        }
    }

    fn angle(&self) -> AngleConfig {
        AngleConfig {
            smoothparam: self.smoothparam,
            smooth_len: self.angle_smooth_len,
        }
    }
}

/// Evaluation results for one profile file.
#[derive(Debug, Clone, serde::Serialize)]
struct FileReport {
    file: String,
    radius_cm: RadiusResult,
    radius_lsm: RadiusResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    radius_im: Option<RadiusResult>,
    angle_max: AngleResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    angle_end_lsm: Option<AngleResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    angle_end_im: Option<AngleResult>,
}

/// Read a profile file: one header row, then rows of two whitespace-
/// separated numeric columns. Both columns are rescaled and the row order
/// flipped to the ascending-x convention unless disabled.
fn read_profile(path: &Path, scale: f64, flip: bool) -> CliResult<Profile> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| -> CliError { format!("failed to read {}: {}", path.display(), e).into() })?;

    let mut points = Vec::new();
    for (line_nr, line) in text.lines().enumerate().skip(1) {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let mut cols = trimmed.split_whitespace();
        let (x, y) = match (cols.next(), cols.next()) {
            (Some(x), Some(y)) => (x, y),
            _ => {
                return Err(format!(
                    "{}:{}: expected two numeric columns",
                    path.display(),
                    line_nr + 1
                )
                .into())
            }
        };
        let x: f64 = x.parse().map_err(|e| -> CliError {
            format!("{}:{}: bad x value: {}", path.display(), line_nr + 1, e).into()
        })?;
        let y: f64 = y.parse().map_err(|e| -> CliError {
            format!("{}:{}: bad y value: {}", path.display(), line_nr + 1, e).into()
        })?;
        points.push([x * scale, y * scale]);
    }
    if flip {
        points.reverse();
    }

    Ok(Profile::new(points)?)
}

fn evaluate_file(path: &Path, options: &EvalOptions) -> CliResult<FileReport> {
    let profile = read_profile(path, options.scale, !options.no_flip)?;
    tracing::info!("{}: {} points", path.display(), profile.len());

    let radius_cm = eval_curvature_max(&profile, &options.curvature_max())?;
    let radius_lsm = eval_least_squares(&profile, &options.least_squares())?;
    let radius_im = eval_iterative(&profile, &options.iterative())?;

    let angle_cfg = options.angle();
    let angle_max = eval_angle_max(&profile, &angle_cfg)?;
    let angle_end_lsm = match radius_lsm.end_idx {
        Some(end_idx) => Some(eval_angle_end(&profile, &angle_cfg, end_idx)?),
        None => None,
    };
    let angle_end_im = match radius_im.as_ref().and_then(|r| r.end_idx) {
        Some(end_idx) => Some(eval_angle_end(&profile, &angle_cfg, end_idx)?),
        None => None,
    };

    Ok(FileReport {
        file: path.display().to_string(),
        radius_cm,
        radius_lsm,
        radius_im,
        angle_max,
        angle_end_lsm,
        angle_end_im,
    })
}

fn fmt_radius(radius: f64) -> String {
    if radius.is_finite() {
        format!("{:.3} mm", radius)
    } else {
        "inf".to_owned()
    }
}

fn fmt_angle(angle: Option<&AngleResult>) -> String {
    match angle.and_then(|a| a.angle_deg) {
        Some(deg) => format!("{:.3} degrees", deg),
        None => "n/a".to_owned(),
    }
}

fn print_summary(report: &FileReport) {
    let rule = "-".repeat(53);
    println!("Results for File: {}", report.file);
    println!("{}", rule);
    println!("Radius (CM method): {}", fmt_radius(report.radius_cm.radius));
    println!("Radius (LSM method): {}", fmt_radius(report.radius_lsm.radius));
    match &report.radius_im {
        Some(r) => println!("Radius (IM method): {}", fmt_radius(r.radius)),
        None => println!("Radius (IM method): not found"),
    }
    println!("{}", rule);
    println!("Max Angle: {}", fmt_angle(Some(&report.angle_max)));
    println!(
        "End Angle (LSM method): {}",
        fmt_angle(report.angle_end_lsm.as_ref())
    );
    println!(
        "End Angle (IM method): {}",
        fmt_angle(report.angle_end_im.as_ref())
    );
    println!("{}", rule);
    println!();
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> CliResult<()> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, &json)?;
    tracing::info!("Results written to {}", path.display());
    Ok(())
}

// ── eval ───────────────────────────────────────────────────────────────

fn run_eval(args: &CliEvalArgs) -> CliResult<()> {
    let report = evaluate_file(&args.profile, &args.options)?;
    print_summary(&report);
    if let Some(out) = &args.out {
        write_json(out, &report)?;
    }
    Ok(())
}

// ── batch ──────────────────────────────────────────────────────────────

fn run_batch(args: &CliBatchArgs) -> CliResult<()> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(&args.folder)
        .map_err(|e| -> CliError {
            format!("failed to read {}: {}", args.folder.display(), e).into()
        })?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("asc"))
        })
        .collect();
    files.sort();

    if files.is_empty() {
        return Err(format!("no .asc files in {}", args.folder.display()).into());
    }
    tracing::info!("Evaluating {} profiles from {}", files.len(), args.folder.display());

    // Per-profile failures are reported and the batch continues.
    let mut reports = Vec::with_capacity(files.len());
    for file in &files {
        match evaluate_file(file, &args.options) {
            Ok(report) => {
                print_summary(&report);
                reports.push(report);
            }
            Err(e) => tracing::warn!("{}: evaluation failed: {}", file.display(), e),
        }
    }
    tracing::info!("{}/{} profiles evaluated", reports.len(), files.len());

    if let Some(out) = &args.out {
        write_json(out, &reports)?;
    }
    Ok(())
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Eval(args) => run_eval(&args),
        Commands::Batch(args) => run_batch(&args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_temp(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn reads_header_scale_and_flip() {
        let path = write_temp(
            "weldtoe_read_test.asc",
            "x y\n0.4 0.3\n0.3 0.2\n0.2 0.1\n0.1 0.0\n0.0 -0.1\n",
        );
        let profile = read_profile(&path, 10.0, true).unwrap();
        assert_eq!(profile.len(), 5);
        // Flipped to ascending x, both columns scaled by 10.
        assert_eq!(profile.points()[0], [0.0, -1.0]);
        assert_eq!(profile.points()[4], [4.0, 3.0]);
    }

    #[test]
    fn unordered_rows_surface_as_error() {
        let path = write_temp(
            "weldtoe_unordered_test.asc",
            "x y\n0.1 0.0\n0.3 0.1\n0.2 0.2\n0.4 0.3\n0.5 0.4\n",
        );
        assert!(read_profile(&path, 10.0, false).is_err());
    }

    #[test]
    fn malformed_column_is_reported_with_line() {
        let path = write_temp(
            "weldtoe_malformed_test.asc",
            "x y\n0.1 0.0\n0.2 oops\n0.3 0.2\n0.4 0.3\n0.5 0.4\n",
        );
        let err = read_profile(&path, 1.0, false).unwrap_err().to_string();
        assert!(err.contains(":3"), "line number in {:?}", err);
    }
}
