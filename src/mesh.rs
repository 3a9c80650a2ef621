//! Point coordinates from ASCII VTK XML unstructured grids (`.vtu`).
//!
//! Only the `<Points>` array is read. The converter writes ASCII, so
//! binary and appended encodings are rejected rather than decoded.

use std::fs;
use std::path::Path;

use crate::error::{CalibrationError, Result};
use crate::mechanics::distance::Point3;

pub fn read_points(path: &Path) -> Result<Vec<Point3>> {
    let text = fs::read_to_string(path).map_err(|e| CalibrationError::Mesh {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    parse_points(&text).map_err(|reason| CalibrationError::Mesh { path: path.to_path_buf(), reason })
}

/// Parses the `<Points><DataArray ...>` block of a `.vtu` document.
pub fn parse_points(text: &str) -> std::result::Result<Vec<Point3>, String> {
    let points_at = text.find("<Points").ok_or("no <Points> element")?;
    let rest = &text[points_at..];
    let array_at = rest.find("<DataArray").ok_or("<Points> has no <DataArray>")?;
    let rest = &rest[array_at..];
    let tag_end = rest.find('>').ok_or("unterminated <DataArray> tag")?;
    let open_tag = &rest[..tag_end];

    let format = attribute(open_tag, "format").unwrap_or("ascii");
    if format != "ascii" {
        return Err(format!("unsupported DataArray format `{format}`"));
    }
    let components: usize = match attribute(open_tag, "NumberOfComponents") {
        Some(n) => n.parse().map_err(|_| format!("bad NumberOfComponents `{n}`"))?,
        None => 3,
    };
    if components != 3 {
        return Err(format!("points have {components} components, expected 3"));
    }

    let body = &rest[tag_end + 1..];
    let body_end = body.find("</DataArray>").ok_or("unterminated <DataArray>")?;
    let values = body[..body_end]
        .split_whitespace()
        .map(|v| match v.parse::<f64>() {
            Ok(x) if x.is_finite() => Ok(x),
            Ok(_) => Err(format!("non-finite coordinate `{v}`")),
            Err(_) => Err(format!("bad coordinate `{v}`")),
        })
        .collect::<std::result::Result<Vec<_>, _>>()?;

    if values.len() % 3 != 0 {
        return Err(format!("{} coordinates do not form whole points", values.len()));
    }
    Ok(values.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect())
}

fn attribute<'a>(tag: &'a str, name: &str) -> Option<&'a str> {
    let needle = format!(" {name}=\"");
    let start = tag.find(&needle)? + needle.len();
    let len = tag[start..].find('"')?;
    Some(&tag[start..start + len])
}
