/// Statistics used by the R² decomposition demo.
pub struct Metrics;

impl Metrics {
    fn mean(values: &[f64]) -> f64 {
        values.iter().sum::<f64>() / values.len() as f64
    }

    /// Calculate R² (coefficient of determination).
    ///
    /// R² = 1 - (SS_res / SS_tot)
    ///
    /// where:
    /// - SS_res = sum((y_true - y_pred)^2)  (residual sum of squares)
    /// - SS_tot = sum((y_true - mean(y_true))^2)  (total sum of squares)
    ///
    /// Values can be negative if the model is worse than predicting the mean.
    pub fn r_squared(y_true: &[f64], y_pred: &[f64]) -> f64 {
        assert_eq!(
            y_true.len(),
            y_pred.len(),
            "Arrays must have the same length"
        );

        if y_true.is_empty() {
            return 0.0;
        }

        let mean_true = Self::mean(y_true);

        let ss_res: f64 = y_true
            .iter()
            .zip(y_pred.iter())
            .map(|(&t, &p)| (t - p).powi(2))
            .sum();

        let ss_tot: f64 = y_true.iter().map(|&t| (t - mean_true).powi(2)).sum();

        if ss_tot == 0.0 {
            return if ss_res == 0.0 { 1.0 } else { 0.0 };
        }

        1.0 - (ss_res / ss_tot)
    }

    /// Pearson correlation coefficient of two equally long samples.
    ///
    /// Returns 0.0 when either sample is constant.
    pub fn pearson(a: &[f64], b: &[f64]) -> f64 {
        assert_eq!(a.len(), b.len(), "Arrays must have the same length");

        if a.is_empty() {
            return 0.0;
        }

        let (mean_a, mean_b) = (Self::mean(a), Self::mean(b));
        let mut cov = 0.0;
        let mut var_a = 0.0;
        let mut var_b = 0.0;
        for (&x, &y) in a.iter().zip(b) {
            cov += (x - mean_a) * (y - mean_b);
            var_a += (x - mean_a).powi(2);
            var_b += (y - mean_b).powi(2);
        }

        if var_a == 0.0 || var_b == 0.0 {
            return 0.0;
        }
        cov / (var_a * var_b).sqrt()
    }

    /// Z-score a sample with its own mean and population standard deviation.
    /// A constant sample is only centered.
    pub fn standardize(values: &[f64]) -> Vec<f64> {
        if values.is_empty() {
            return Vec::new();
        }

        let mean = Self::mean(values);
        let std = (values.iter().map(|&v| (v - mean).powi(2)).sum::<f64>()
            / values.len() as f64)
            .sqrt();
        let std = if std < 1e-12 { 1.0 } else { std };

        values.iter().map(|&v| (v - mean) / std).collect()
    }
}
