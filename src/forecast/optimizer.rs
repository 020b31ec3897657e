//! Adam optimizer over ndarray parameters.

use ndarray::{Array, Dimension, Zip};

/// First and second moment estimates for one parameter tensor.
#[derive(Debug, Clone)]
pub struct Moments<D: Dimension> {
    m: Array<f64, D>,
    v: Array<f64, D>,
}

impl<D: Dimension> Moments<D> {
    pub fn zeros_like(param: &Array<f64, D>) -> Self {
        Self {
            m: Array::zeros(param.raw_dim()),
            v: Array::zeros(param.raw_dim()),
        }
    }
}

/// Adam (Adaptive Moment Estimation).
#[derive(Debug, Clone)]
pub struct Adam {
    pub learning_rate: f64,
    pub beta1: f64,
    pub beta2: f64,
    pub epsilon: f64,
    t: i32,
}

impl Adam {
    pub fn new(learning_rate: f64) -> Self {
        Self {
            learning_rate,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-8,
            t: 0,
        }
    }

    /// Advance the shared step counter; call once per mini-batch before `update`.
    pub fn next_step(&mut self) {
        self.t += 1;
    }

    /// Apply one bias-corrected Adam update to `param`.
    pub fn update<D: Dimension>(&self, param: &mut Array<f64, D>, grad: &Array<f64, D>, moments: &mut Moments<D>) {
        let (b1, b2) = (self.beta1, self.beta2);
        let correction1 = 1.0 - b1.powi(self.t.max(1));
        let correction2 = 1.0 - b2.powi(self.t.max(1));
        let (lr, eps) = (self.learning_rate, self.epsilon);

        Zip::from(param)
            .and(grad)
            .and(&mut moments.m)
            .and(&mut moments.v)
            .for_each(|p, &g, m, v| {
                *m = b1 * *m + (1.0 - b1) * g;
                *v = b2 * *v + (1.0 - b2) * g * g;
                *p -= lr * (*m / correction1) / ((*v / correction2).sqrt() + eps);
            });
    }
}
