/// Count, extremes and mean of the finite values in a sample.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

pub struct Statistics;

impl Statistics {
    /// `None` when no value is finite.
    pub fn summarize(values: &[f64]) -> Option<Summary> {
        let mut finite = values.iter().copied().filter(|v| v.is_finite());
        let first = finite.next()?;
        let mut s = Summary {
            count: 1,
            min: first,
            max: first,
            mean: 0.0,
        };
        let mut sum = first;
        for v in finite {
            s.count += 1;
            s.min = s.min.min(v);
            s.max = s.max.max(v);
            sum += v;
        }
        s.mean = sum / s.count as f64;
        Some(s)
    }

    /// Finite values in ascending order.
    pub fn sorted_finite(values: &[f64]) -> Vec<f64> {
        let mut out: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        out.sort_by(f64::total_cmp);
        out
    }

    /// The `i`-th of `n` quantiles by linear interpolation between order
    /// statistics. The rank is `(len - 1) * i / n`, multiplied before dividing.
    pub fn quantile_sorted(sorted: &[f64], i: usize, n: usize) -> Option<f64> {
        let last = sorted.len().checked_sub(1)?;
        if n == 0 {
            return None;
        }
        let p = (last * i.min(n)) as f64 / n as f64;
        let lo = p.floor() as usize;
        let frac = p - lo as f64;
        if frac == 0.0 || lo >= last {
            return Some(sorted[lo.min(last)]);
        }
        Some(sorted[lo] * (1.0 - frac) + sorted[lo + 1] * frac)
    }
}

#[cfg(test)]
mod tests {
    use super::{Statistics, Summary};

    #[test]
    fn summary_skips_non_finite() {
        let s = Statistics::summarize(&[1.0, f64::NAN, 2.0, 6.0]).unwrap();
        assert_eq!(
            s,
            Summary {
                count: 3,
                min: 1.0,
                max: 6.0,
                mean: 3.0
            }
        );
        assert_eq!(Statistics::summarize(&[f64::NAN]), None);
        assert_eq!(Statistics::summarize(&[]), None);
    }

    #[test]
    fn sorted_finite_drops_nan() {
        let s = Statistics::sorted_finite(&[3.0, f64::NAN, -1.0, f64::INFINITY, 2.0]);
        assert_eq!(s, vec![-1.0, 2.0, 3.0]);
    }

    #[test]
    fn quantiles_interpolate() {
        let s = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(Statistics::quantile_sorted(&s, 0, 2), Some(1.0));
        assert_eq!(Statistics::quantile_sorted(&s, 2, 2), Some(4.0));
        assert_eq!(Statistics::quantile_sorted(&s, 1, 2), Some(2.5));
        assert_eq!(Statistics::quantile_sorted(&s, 1, 0), None);
        assert_eq!(Statistics::quantile_sorted(&[], 1, 2), None);
    }

    #[test]
    fn quantile_rank_multiplies_before_dividing() {
        // 5 * (1 / 3) and 5 * 1 / 3 differ in the last bit.
        let s = [1.0, 2.0, 4.0, 8.0, 16.0, 32.0];
        assert_eq!(Statistics::quantile_sorted(&s, 1, 3), Some(3.3333333333333335));
        assert_eq!(Statistics::quantile_sorted(&s, 2, 3), Some(10.666666666666668));
    }
}
