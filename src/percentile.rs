use rayon::prelude::*;
use tracing::debug;

use crate::dataset::Table;
use crate::error::{RadarError, Result};

/// Average-rank percentile in (0, 100] for every non-null value.
///
/// Ranks are 1-based over the non-null values only; equal values share the
/// mean of the ranks they span. Nulls stay null.
pub fn percentile_ranks(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut present: Vec<(f64, usize)> = values
        .iter()
        .enumerate()
        .filter_map(|(idx, v)| v.filter(|x| !x.is_nan()).map(|x| (x, idx)))
        .collect();
    let n = present.len();
    let mut out = vec![None; values.len()];
    if n == 0 {
        return out;
    }
    present.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut start = 0;
    while start < n {
        let mut end = start + 1;
        while end < n && present[end].0 == present[start].0 {
            end += 1;
        }
        // Positions start..end hold ranks start+1 ..= end.
        let avg_rank = (start + 1 + end) as f64 / 2.0;
        let pct = avg_rank / n as f64 * 100.0;
        for (_, idx) in &present[start..end] {
            out[*idx] = Some(pct);
        }
        start = end;
    }
    out
}

/// Copy of `table` with each requested column replaced by its percentile ranks
/// over the whole table. Unrequested columns are left as they are; the source
/// table is never touched.
pub fn normalize<S: AsRef<str> + Sync>(table: &Table, columns: &[S]) -> Result<Table> {
    let mut keys: Vec<&str> = Vec::with_capacity(columns.len());
    for key in columns.iter().map(AsRef::as_ref) {
        if table.column(key).is_none() {
            return Err(RadarError::UnknownColumn(key.to_string()));
        }
        if table.numeric(key).is_none() {
            return Err(RadarError::NonNumericColumn(key.to_string()));
        }
        if !keys.contains(&key) {
            keys.push(key);
        }
    }

    let ranked: Vec<(&str, Vec<Option<f64>>)> = keys
        .par_iter()
        .filter_map(|key| table.numeric(key).map(|values| (*key, percentile_ranks(values))))
        .collect();

    let mut out = table.clone();
    for (key, values) in ranked {
        out.replace_numeric(key, values)?;
    }
    debug!(columns = keys.len(), rows = out.row_count(), "percentile table built");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Option<f64>, b: f64) -> bool {
        a.is_some_and(|a| (a - b).abs() < 1e-9)
    }

    #[test]
    fn distinct_values_rank_evenly() {
        let out = percentile_ranks(&[Some(10.0), Some(20.0), Some(30.0)]);
        assert!(approx(out[0], 100.0 / 3.0));
        assert!(approx(out[1], 200.0 / 3.0));
        assert!(approx(out[2], 100.0));
    }

    #[test]
    fn ties_share_the_average_rank() {
        let out = percentile_ranks(&[Some(5.0), Some(1.0), Some(5.0), Some(9.0)]);
        // ranks: 1.0 -> 1, 5.0 -> 2.5, 9.0 -> 4
        assert!(approx(out[1], 25.0));
        assert!(approx(out[0], 62.5));
        assert!(approx(out[2], 62.5));
        assert!(approx(out[3], 100.0));
    }

    #[test]
    fn nulls_are_excluded_from_the_denominator() {
        let out = percentile_ranks(&[None, Some(2.0), Some(f64::NAN), Some(4.0)]);
        assert_eq!(out[0], None);
        assert_eq!(out[2], None);
        assert!(approx(out[1], 50.0));
        assert!(approx(out[3], 100.0));
    }

    #[test]
    fn all_null_column_stays_null() {
        assert_eq!(percentile_ranks(&[None, None]), vec![None, None]);
        assert!(percentile_ranks(&[]).is_empty());
    }
}
