//! Common-average re-referencing against a selected electrode subset

use nscope_core::SampleChunk;

/// Common average reference over a chosen channel subset.
///
/// For every sample row, the mean of the selected channels is subtracted from
/// **all** channels, selected or not: this re-references the whole montage
/// against the chosen electrode subset. With fewer than two valid selected
/// channels the operation degrades to a silent no-op rather than an error.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommonAverageReference;

impl CommonAverageReference {
    pub fn new() -> Self {
        Self
    }

    /// Re-reference a chunk in place against `selected` channel indices.
    ///
    /// Indices outside the chunk are ignored; if fewer than two remain the
    /// chunk is left untouched.
    pub fn apply(&self, chunk: &mut SampleChunk, selected: &[usize]) {
        let channels = chunk.channels();
        let valid: Vec<usize> = selected
            .iter()
            .copied()
            .filter(|&ch| ch < channels)
            .collect();
        if valid.len() < 2 {
            return;
        }
        for s in 0..chunk.samples() {
            let mut sum = 0.0;
            for &ch in &valid {
                sum += chunk.value(s, ch);
            }
            let mean = sum / valid.len() as f64;
            for ch in 0..channels {
                *chunk.value_mut(s, ch) -= mean;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subset_mean_subtracted_from_every_channel() {
        let car = CommonAverageReference::new();
        // rows: [1,2,3], [4,5,6], [7,8,9]; selected {0,1} means: 1.5, 4.5, 7.5
        let mut chunk =
            SampleChunk::new((1..=9).map(|i| i as f64).collect(), 3).unwrap();
        car.apply(&mut chunk, &[0, 1]);
        let expected = [
            [-0.5, 0.5, 1.5],
            [-0.5, 0.5, 1.5],
            [-0.5, 0.5, 1.5],
        ];
        for (s, row) in expected.iter().enumerate() {
            for (ch, want) in row.iter().enumerate() {
                assert!(
                    (chunk.value(s, ch) - want).abs() < 1e-12,
                    "row {} ch {}: {} vs {}",
                    s,
                    ch,
                    chunk.value(s, ch),
                    want
                );
            }
        }
    }

    #[test]
    fn test_fewer_than_two_selected_is_a_no_op() {
        let car = CommonAverageReference::new();
        let original = SampleChunk::new((1..=9).map(|i| i as f64).collect(), 3).unwrap();

        let mut one = original.clone();
        car.apply(&mut one, &[1]);
        assert_eq!(one, original);

        let mut none = original.clone();
        car.apply(&mut none, &[]);
        assert_eq!(none, original);
    }

    #[test]
    fn test_out_of_range_indices_ignored() {
        let car = CommonAverageReference::new();
        let original = SampleChunk::new((1..=9).map(|i| i as f64).collect(), 3).unwrap();

        // only one valid index survives -> no-op
        let mut chunk = original.clone();
        car.apply(&mut chunk, &[0, 17]);
        assert_eq!(chunk, original);

        // two valid survive -> same result as selecting them directly
        let mut with_stray = original.clone();
        car.apply(&mut with_stray, &[0, 1, 99]);
        let mut direct = original;
        car.apply(&mut direct, &[0, 1]);
        assert_eq!(with_stray, direct);
    }

    #[test]
    fn test_full_selection_zeroes_the_row_mean() {
        let car = CommonAverageReference::new();
        let mut chunk = SampleChunk::new(vec![2.0, 4.0, 9.0, 1.0, 3.0, 5.0], 3).unwrap();
        car.apply(&mut chunk, &[0, 1, 2]);
        for s in 0..chunk.samples() {
            let sum: f64 = (0..3).map(|ch| chunk.value(s, ch)).sum();
            assert!(sum.abs() < 1e-12);
        }
    }
}
