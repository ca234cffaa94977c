use anyhow::{ensure, Result};
use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

/// Parameters of a synthetic classification problem.
///
/// Each class is a Gaussian cluster centered on a distinct vertex of a
/// hypercube of side `2 * class_sep` spanned by the first `n_informative`
/// features. The remaining features are pure noise. By default 90% of the
/// features are informative and the seed is 42.
#[derive(Debug, Clone, Copy)]
pub struct ClassificationConfig {
    pub n_samples: usize,
    pub n_features: usize,
    pub n_informative: usize,
    pub n_classes: usize,
    pub class_sep: f64,
    pub seed: u64,
}

impl ClassificationConfig {
    pub fn new(n_samples: usize, n_features: usize, n_classes: usize) -> Self {
        Self {
            n_samples,
            n_features,
            n_informative: (n_features * 9 / 10).max(1),
            n_classes,
            class_sep: 1.0,
            seed: 42,
        }
    }

    pub fn n_informative(mut self, n_informative: usize) -> Self {
        self.n_informative = n_informative;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    fn validate(&self) -> Result<()> {
        ensure!(self.n_classes >= 2, "need at least 2 classes, got {}", self.n_classes);
        ensure!(
            self.n_informative >= 1 && self.n_informative <= self.n_features,
            "n_informative must be in 1..={}, got {}",
            self.n_features,
            self.n_informative
        );
        ensure!(
            self.n_informative >= 64 || self.n_classes <= 1usize << self.n_informative,
            "{} informative features cannot separate {} classes",
            self.n_informative,
            self.n_classes
        );
        ensure!(
            self.n_samples >= self.n_classes,
            "{} samples cannot cover {} classes",
            self.n_samples,
            self.n_classes
        );
        Ok(())
    }
}

/// Feature matrix and class labels.
#[derive(Debug, Clone)]
pub struct Classification {
    pub x: Array2<f64>,
    pub y: Array1<usize>,
}

impl Classification {
    pub fn n_samples(&self) -> usize {
        self.x.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.x.ncols()
    }
}

/// Generate a seeded classification dataset.
///
/// Labels cycle through the classes (`i % n_classes`), so every prefix of
/// at least `n_classes` rows contains all classes.
pub fn make_classification(config: ClassificationConfig) -> Result<Classification> {
    config.validate()?;
    let ClassificationConfig {
        n_samples,
        n_features,
        n_informative,
        n_classes,
        class_sep,
        seed,
    } = config;

    let mut rng = StdRng::seed_from_u64(seed);
    let y = Array1::from_shape_fn(n_samples, |i| i % n_classes);
    let x = Array2::from_shape_fn((n_samples, n_features), |(i, j)| {
        let noise: f64 = rng.sample(StandardNormal);
        if j < n_informative {
            centroid(y[i], j, class_sep) + noise
        } else {
            noise
        }
    });

    Ok(Classification { x, y })
}

/// Coordinate `j` of the hypercube vertex assigned to `class`.
fn centroid(class: usize, j: usize, class_sep: f64) -> f64 {
    if j < usize::BITS as usize && (class >> j) & 1 == 1 {
        class_sep
    } else {
        -class_sep
    }
}
