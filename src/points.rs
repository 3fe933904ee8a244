//! Loading point samples from CSV.

use serde::Deserialize;
use std::io::Read;

use crate::error::{Error, Result};
use crate::kml::{IconSize, PointRecord};

#[derive(Debug, Deserialize)]
struct Row {
    lon: f64,
    lat: f64,
    value: f64,
    label: String,
    #[serde(default)]
    size: Option<f64>,
}

/// Points read from a CSV file, plus per-point icon sizes when every row
/// has one.
#[derive(Debug, PartialEq)]
pub struct PointSet {
    pub points: Vec<PointRecord>,
    pub sizes: Option<Vec<f64>>,
}

impl PointSet {
    /// Per-point sizes if present, `fallback` for every icon otherwise.
    pub fn icon_size(&self, fallback: f64) -> IconSize {
        match &self.sizes {
            Some(sizes) => IconSize::PerPoint(sizes.clone()),
            None => IconSize::Uniform(fallback),
        }
    }
}

/// Reads headered CSV with the columns `lon`, `lat`, `value`, `label` and
/// an optional `size`.
pub fn read_points<R: Read>(reader: R) -> Result<PointSet> {
    let mut csv = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let mut points = Vec::new();
    let mut sizes = Vec::new();
    for (i, row) in csv.deserialize::<Row>().enumerate() {
        let row =
            row.map_err(|e| Error::config(format!("invalid point on row {}: {}", i + 1, e)))?;
        sizes.push(row.size);
        points.push(PointRecord {
            lon: row.lon,
            lat: row.lat,
            value: row.value,
            label: row.label,
        });
    }

    let sizes = if !sizes.is_empty() && sizes.iter().all(Option::is_some) {
        Some(sizes.into_iter().flatten().collect())
    } else {
        None
    };

    Ok(PointSet { points, sizes })
}
