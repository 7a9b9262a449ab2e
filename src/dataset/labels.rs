//! YOLO label files
//!
//! One box per line: `<class_id> <cx> <cy> <w> <h>`, space separated,
//! normalized center format. Extra trailing fields are ignored.

use std::fs;
use std::path::Path;

use crate::error::{AugError, Result};
use crate::geometry::BoundingBox;

fn parse_class_id(field: &str) -> Option<u32> {
    if let Ok(id) = field.parse::<u32>() {
        return Some(id);
    }
    // Some exporters write "3.0"
    let value = field.parse::<f64>().ok()?;
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= u32::MAX as f64 {
        Some(value as u32)
    } else {
        None
    }
}

/// Parse one label line
pub fn parse_label_line(line: &str) -> Result<BoundingBox> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < 5 {
        return Err(AugError::InvalidGeometry {
            reason: format!("expected 5 fields, found {}: '{}'", parts.len(), line.trim()),
        });
    }

    let class_id = parse_class_id(parts[0]).ok_or_else(|| AugError::InvalidGeometry {
        reason: format!("bad class id '{}'", parts[0]),
    })?;
    let mut coords = [0.0f64; 4];
    for (slot, field) in coords.iter_mut().zip(&parts[1..5]) {
        *slot = field.parse().map_err(|_| AugError::InvalidGeometry {
            reason: format!("bad coordinate '{}'", field),
        })?;
    }

    let [cx, cy, w, h] = coords;
    Ok(BoundingBox::new(class_id, cx, cy, w, h))
}

/// Parse a whole label file body, skipping blank and malformed lines
pub fn parse_labels(text: &str) -> Vec<BoundingBox> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .filter_map(|(index, line)| match parse_label_line(line) {
            Ok(bbox) => Some(bbox),
            Err(e) => {
                log::warn!("Skipping label line {}: {}", index + 1, e);
                None
            }
        })
        .collect()
}

/// Render boxes as a label file body (one line per box, six decimals)
pub fn format_labels(boxes: &[BoundingBox]) -> String {
    let mut text = String::new();
    for bbox in boxes {
        text.push_str(&bbox.to_label_line());
        text.push('\n');
    }
    text
}

/// Read a label file; a missing file means no boxes
pub fn read_labels(path: &Path) -> Result<Vec<BoundingBox>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let text = fs::read_to_string(path).map_err(|e| AugError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(parse_labels(&text))
}

pub fn write_labels(path: &Path, boxes: &[BoundingBox]) -> Result<()> {
    fs::write(path, format_labels(boxes)).map_err(|e| AugError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}
