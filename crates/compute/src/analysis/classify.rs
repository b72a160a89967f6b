//! Class breakpoints over a flat series of observations.
//!
//! `N` classes are described by `N + 1` non-decreasing breakpoints where
//! `breaks[0]` is the smallest and `breaks[N]` the largest observation.
//! Class `i` covers `[breaks[i], breaks[i + 1])`, except that the top class
//! also includes the maximum.

use std::fmt;

use formats::ClassificationMethod;

use crate::analysis::statistics::Statistics;

const KMEANS_MAX_ITERATIONS: usize = 100;

#[derive(Debug, Clone, PartialEq)]
pub enum ClassifyError {
    NoClasses,
    NoObservations,
    NonPositiveForLog { min: f64 },
}

impl fmt::Display for ClassifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassifyError::NoClasses => write!(f, "at least one class is required"),
            ClassifyError::NoObservations => write!(f, "no numeric observations to classify"),
            ClassifyError::NonPositiveForLog { min } => {
                write!(f, "logarithmic breaks need positive values (min is {min})")
            }
        }
    }
}

impl std::error::Error for ClassifyError {}

#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub method: ClassificationMethod,
    pub breaks: Vec<f64>,
}

impl Classification {
    /// Computes breakpoints for `classes` classes. Non-finite values are ignored.
    pub fn compute(
        values: &[f64],
        method: ClassificationMethod,
        classes: usize,
    ) -> Result<Self, ClassifyError> {
        if classes == 0 {
            return Err(ClassifyError::NoClasses);
        }
        let sorted = Statistics::sorted_finite(values);
        let (min, max) = match (sorted.first(), sorted.last()) {
            (Some(&min), Some(&max)) => (min, max),
            _ => return Err(ClassifyError::NoObservations),
        };

        let mut breaks = match method {
            ClassificationMethod::Equal => equal_interval(min, max, classes),
            ClassificationMethod::Quantile => quantile(&sorted, classes),
            ClassificationMethod::Logarithmic => {
                if min <= 0.0 {
                    return Err(ClassifyError::NonPositiveForLog { min });
                }
                logarithmic(min, max, classes)
            }
            ClassificationMethod::Kmeans => kmeans(&sorted, min, max, classes),
        };

        // Pin the ends to the observed extremes and keep the sequence monotonic
        // regardless of rounding in the interior.
        breaks[0] = min;
        breaks[classes] = max;
        for i in 1..breaks.len() {
            if breaks[i] < breaks[i - 1] {
                breaks[i] = breaks[i - 1];
            }
        }

        Ok(Self { method, breaks })
    }

    pub fn class_count(&self) -> usize {
        self.breaks.len() - 1
    }

    pub fn min(&self) -> f64 {
        self.breaks[0]
    }

    pub fn max(&self) -> f64 {
        self.breaks[self.class_count()]
    }

    /// Class index for `value`; `None` for non-finite input.
    ///
    /// Values below the minimum clamp to class 0 and values at or above the
    /// maximum land in the top class.
    pub fn classify(&self, value: f64) -> Option<usize> {
        if !value.is_finite() {
            return None;
        }
        let n = self.class_count();
        let mut i = 0;
        while i < n && value >= self.breaks[i] {
            i += 1;
        }
        Some(i.saturating_sub(1))
    }

    /// `[lower, upper]` bounds of class `class`.
    pub fn range(&self, class: usize) -> Option<(f64, f64)> {
        let lower = *self.breaks.get(class)?;
        let upper = *self.breaks.get(class + 1)?;
        Some((lower, upper))
    }

    /// Content hash of the method and the exact bit patterns of the breakpoints.
    pub fn fingerprint(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(method_tag(self.method).as_bytes());
        hasher.update(&(self.breaks.len() as u64).to_le_bytes());
        for b in &self.breaks {
            hasher.update(&b.to_bits().to_le_bytes());
        }
        hasher.finalize().to_hex().to_string()
    }
}

fn method_tag(method: ClassificationMethod) -> &'static str {
    match method {
        ClassificationMethod::Equal => "equal",
        ClassificationMethod::Quantile => "quantile",
        ClassificationMethod::Logarithmic => "logarithmic",
        ClassificationMethod::Kmeans => "kmeans",
    }
}

fn equal_interval(min: f64, max: f64, classes: usize) -> Vec<f64> {
    let step = (max - min) / classes as f64;
    (0..=classes).map(|i| min + step * i as f64).collect()
}

fn logarithmic(min: f64, max: f64, classes: usize) -> Vec<f64> {
    let lmin = min.log10();
    let step = (max.log10() - lmin) / classes as f64;
    (0..=classes)
        .map(|i| 10f64.powf(lmin + step * i as f64))
        .collect()
}

fn quantile(sorted: &[f64], classes: usize) -> Vec<f64> {
    (0..=classes)
        .map(|i| Statistics::quantile_sorted(sorted, i, classes).unwrap_or(sorted[0]))
        .collect()
}

/// Deterministic one-dimensional k-means seeded at equal-interval midpoints.
/// Breakpoints are the smallest member of each cluster.
fn kmeans(sorted: &[f64], min: f64, max: f64, classes: usize) -> Vec<f64> {
    let step = (max - min) / classes as f64;
    let mut centroids: Vec<f64> = (0..classes)
        .map(|i| min + step * (i as f64 + 0.5))
        .collect();
    let mut assignment = vec![0usize; sorted.len()];

    for _ in 0..KMEANS_MAX_ITERATIONS {
        let mut changed = false;
        for (slot, &v) in assignment.iter_mut().zip(sorted) {
            let nearest = nearest_centroid(&centroids, v);
            if *slot != nearest {
                *slot = nearest;
                changed = true;
            }
        }

        let mut sums = vec![0.0; classes];
        let mut counts = vec![0usize; classes];
        for (&c, &v) in assignment.iter().zip(sorted) {
            sums[c] += v;
            counts[c] += 1;
        }
        for c in 0..classes {
            if counts[c] > 0 {
                centroids[c] = sums[c] / counts[c] as f64;
            }
        }
        centroids.sort_by(f64::total_cmp);

        if !changed {
            break;
        }
    }

    // Clusters are contiguous runs of the sorted input.
    let mut breaks = Vec::with_capacity(classes + 1);
    breaks.push(min);
    for c in 1..classes {
        let start = assignment.iter().take_while(|&&a| a < c).count();
        breaks.push(sorted.get(start).copied().unwrap_or(max));
    }
    breaks.push(max);
    breaks
}

fn nearest_centroid(centroids: &[f64], v: f64) -> usize {
    let mut best = 0;
    let mut best_d = f64::INFINITY;
    for (i, &c) in centroids.iter().enumerate() {
        let d = (v - c).abs();
        if d < best_d {
            best = i;
            best_d = d;
        }
    }
    best
}
