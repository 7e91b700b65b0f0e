use ndarray::Array1;

/// Index of the largest score; the lowest index wins a tie.
pub(crate) fn argmax(scores: &Array1<f64>) -> usize {
    let mut best = 0;
    let mut best_score = f64::NEG_INFINITY;
    for (i, &score) in scores.iter().enumerate() {
        if score > best_score {
            best = i;
            best_score = score;
        }
    }
    best
}

/// Converts log-scores into probabilities summing to one.
pub(crate) fn softmax(log_scores: &Array1<f64>) -> Array1<f64> {
    let max = log_scores.fold(f64::NEG_INFINITY, |acc, &x| acc.max(x));
    if !max.is_finite() {
        return Array1::from_elem(log_scores.len(), 1.0 / log_scores.len().max(1) as f64);
    }
    let exp = log_scores.mapv(|x| (x - max).exp());
    let sum = exp.sum();
    exp / sum
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_argmax_prefers_lowest_index_on_tie() {
        assert_eq!(argmax(&array![-1.0, -1.0, -2.0]), 0);
        assert_eq!(argmax(&array![-3.0, -1.0, -1.0]), 1);
    }

    #[test]
    fn test_softmax_sums_to_one() {
        let probs = softmax(&array![-1000.0, -1001.0]);
        assert_relative_eq!(probs.sum(), 1.0, epsilon = 1e-12);
        assert!(probs[0] > probs[1]);
    }
}
