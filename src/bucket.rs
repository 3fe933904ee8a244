use crate::error::{Error, Result};

/// How values are spread over the color buckets.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Scale {
    Linear,
    /// Equal-width buckets in log10 space. Requires a positive range.
    Log,
}

impl Default for Scale {
    fn default() -> Self {
        Scale::Linear
    }
}

/// The value interval mapped onto the colormap.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ValueRange {
    pub vmin: f64,
    pub vmax: f64,
    pub scale: Scale,
}

impl ValueRange {
    /// Fills in missing bounds from the extrema of `values`.
    pub fn resolve(
        values: &[f64],
        vmin: Option<f64>,
        vmax: Option<f64>,
        scale: Scale,
    ) -> Result<Self> {
        let vmin = vmin
            .or_else(|| extremum(values, f64::min))
            .ok_or_else(|| Error::config("no finite values to derive vmin from"))?;
        let vmax = vmax
            .or_else(|| extremum(values, f64::max))
            .ok_or_else(|| Error::config("no finite values to derive vmax from"))?;

        if !vmin.is_finite() || !vmax.is_finite() || vmin > vmax {
            return Err(Error::config(format!(
                "invalid value range [{}, {}]",
                vmin, vmax
            )));
        }
        if scale == Scale::Log && vmin <= 0.0 {
            return Err(Error::config(format!(
                "log scale needs a positive vmin, got {}",
                vmin
            )));
        }

        Ok(Self { vmin, vmax, scale })
    }

    fn transform(&self, v: f64) -> f64 {
        match self.scale {
            Scale::Linear => v,
            Scale::Log => v.log10(),
        }
    }

    /// Position of `v` inside the range, 0 at vmin and 1 at vmax.
    pub fn normalize(&self, v: f64) -> f64 {
        let (lo, hi) = (self.transform(self.vmin), self.transform(self.vmax));
        (self.transform(v) - lo) / (hi - lo)
    }

    /// Bucket of `value` among `n` equal-width buckets, clamped to
    /// `[0, n - 1]`.
    ///
    /// `vmax` itself lands in the last bucket. NaN and, on a log scale,
    /// non-positive values land in the first one.
    pub fn bucket(&self, value: f64, n: usize) -> usize {
        if n == 0 {
            return 0;
        }

        let (lo, hi) = (self.transform(self.vmin), self.transform(self.vmax));
        let width = (hi - lo) / n as f64;
        if !(width > 0.0) {
            return 0;
        }

        let index = ((self.transform(value) - lo) / width).floor();
        if index.is_nan() || index < 0.0 {
            0
        } else if index > (n - 1) as f64 {
            n - 1
        } else {
            index as usize
        }
    }
}

fn extremum(values: &[f64], pick: fn(f64, f64) -> f64) -> Option<f64> {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| Some(acc.map_or(v, |a| pick(a, v))))
}

/// Assigns every value to one of `n` color buckets.
pub fn bucketize(values: &[f64], range: &ValueRange, n: usize) -> Vec<usize> {
    values.iter().map(|&v| range.bucket(v, n)).collect()
}
