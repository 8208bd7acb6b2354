use std::{fs, path::Path, str::FromStr};

use anyhow::{bail, Context, Result};
use nalgebra::{Point3, Quaternion, UnitQuaternion};
use signmotion::TrajectorySample;

pub const TRACE_HEADER: &str = "hand_trace,t_s,tracked,x,y,z,qx,qy,qz,qw,pose";

const MIN_COLUMNS: usize = 10;

#[derive(Clone, Debug, PartialEq)]
pub struct TraceFrame {
    pub sample: TrajectorySample,
    pub tracked: bool,
    /// Static pose reported by the recognizer on this frame, if any.
    pub pose: Option<String>,
}

pub fn parse_trace(path: &Path) -> Result<Vec<TraceFrame>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_trace_str(&raw, &path.display().to_string())
}

pub fn parse_trace_str(raw: &str, label: &str) -> Result<Vec<TraceFrame>> {
    let mut out: Vec<TraceFrame> = Vec::new();
    for (line_no, line) in raw.lines().enumerate() {
        let line_no = line_no + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed == TRACE_HEADER {
            continue;
        }

        let parts: Vec<&str> = trimmed.split(',').map(str::trim).collect();
        if parts[0] != "hand_trace" {
            continue;
        }
        if parts.len() < MIN_COLUMNS {
            bail!("{label}:{line_no} invalid trace line, expected at least {MIN_COLUMNS} columns");
        }

        let t_s: f64 = parse_field(parts[1], label, line_no, "t_s")?;
        let tracked = parse_flag(parts[2], label, line_no)?;
        let position = Point3::new(
            parse_field(parts[3], label, line_no, "x")?,
            parse_field(parts[4], label, line_no, "y")?,
            parse_field(parts[5], label, line_no, "z")?,
        );
        let quaternion = Quaternion::new(
            parse_field(parts[9], label, line_no, "qw")?,
            parse_field(parts[6], label, line_no, "qx")?,
            parse_field(parts[7], label, line_no, "qy")?,
            parse_field(parts[8], label, line_no, "qz")?,
        );
        // All-zero rotations come from trackers that do not report orientation.
        let rotation = if quaternion.norm() > f32::EPSILON {
            UnitQuaternion::from_quaternion(quaternion)
        } else {
            UnitQuaternion::identity()
        };
        let pose = parts
            .get(MIN_COLUMNS)
            .filter(|name| !name.is_empty())
            .map(|name| name.to_string());

        if let Some(prev) = out.last() {
            if t_s < prev.sample.timestamp {
                bail!(
                    "{label}:{line_no} timestamp {t_s} is earlier than {}",
                    prev.sample.timestamp
                );
            }
        }

        out.push(TraceFrame {
            sample: TrajectorySample::new(position, rotation, t_s),
            tracked,
            pose,
        });
    }
    Ok(out)
}

/// One event kind per line or comma separated; `#` starts a comment line.
pub fn parse_expected_kinds(path: &Path) -> Result<Vec<String>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(|line| line.split(','))
        .map(str::trim)
        .filter(|kind| !kind.is_empty())
        .map(str::to_string)
        .collect())
}

/// Tracked samples only, for template matching.
pub fn tracked_samples(frames: &[TraceFrame]) -> Vec<TrajectorySample> {
    frames
        .iter()
        .filter(|frame| frame.tracked)
        .map(|frame| frame.sample)
        .collect()
}

fn parse_field<T: FromStr>(value: &str, label: &str, line_no: usize, field: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| anyhow::anyhow!("{label}:{line_no} invalid {field} value `{value}`"))
}

fn parse_flag(value: &str, label: &str, line_no: usize) -> Result<bool> {
    match value {
        "1" | "true" => Ok(true),
        "0" | "false" => Ok(false),
        other => bail!("{label}:{line_no} invalid tracked value `{other}` (use 0|1)"),
    }
}
