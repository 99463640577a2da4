//! Plain-text contour files: one `x y` pair per line.
//!
//! Coordinates may be separated by whitespace or a comma. Blank lines and
//! anything after `#` are ignored.

use std::fmt::Write as _;
use std::path::Path;

use tracing::debug;

use crate::error::{DropletError, Result};
use crate::geometry::Point;

pub fn parse_contour(text: &str) -> Result<Vec<Point>> {
    let mut points = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let line_no = index + 1;
        let content = line.split('#').next().unwrap_or("").trim();
        if content.is_empty() {
            continue;
        }
        let fields: Vec<&str> = content
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|f| !f.is_empty())
            .collect();
        if fields.len() != 2 {
            return Err(DropletError::ContourParse {
                line: line_no,
                reason: format!("expected 2 coordinates, found {}", fields.len()),
            });
        }
        let coord = |field: &str| {
            field
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| DropletError::ContourParse {
                    line: line_no,
                    reason: format!("'{field}' is not a finite number"),
                })
        };
        points.push(Point::new(coord(fields[0])?, coord(fields[1])?));
    }
    Ok(points)
}

pub fn read_contour(path: &Path) -> Result<Vec<Point>> {
    let text = std::fs::read_to_string(path)?;
    let points = parse_contour(&text)?;
    debug!(path = %path.display(), points = points.len(), "Contour read");
    Ok(points)
}

/// Write points one per line as `x y`.
pub fn write_contour(path: &Path, points: &[Point]) -> Result<()> {
    let mut text = String::with_capacity(points.len() * 24);
    for p in points {
        // Writing to a String cannot fail.
        let _ = writeln!(text, "{} {}", p.x, p.y);
    }
    std::fs::write(path, text)?;
    Ok(())
}
