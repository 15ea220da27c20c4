use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

/// Functionality to add some Gaussian noise.
#[derive(Clone)]
pub(super) struct GaussianNoise {
    normal: Normal<f64>,
}

impl GaussianNoise {
    /// Creates new distribution from mean and stdev
    pub(super) fn new(mean: f64, stdev: f64) -> Self {
        Self {
            normal: Normal::new(mean, stdev).unwrap(),
        }
    }

    /// Sample from distribution
    fn draw_sample(&self, rng: &mut StdRng) -> f64 {
        self.normal.sample(rng)
    }

    // Adds noise to vector of samples
    pub(super) fn add_noise_vec(&self, rng: &mut StdRng, data: Vec<f64>) -> Vec<f64> {
        let mut result = Vec::with_capacity(data.len());
        for d in data {
            result.push(d + self.draw_sample(rng));
        }
        result
    }
}
