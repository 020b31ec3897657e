//! Single-layer LSTM regressor trained with backpropagation through time.
//!
//! Gates are stacked in one `[4H, I]` input matrix and one `[4H, H]` recurrent
//! matrix, in the order input, forget, candidate, output. The last hidden state
//! feeds a linear head producing one scalar per sequence.

use ndarray::{s, Array1, Array2, Array3, ArrayView2, Axis};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::optimizer::{Adam, Moments};
use crate::core::cancel::CancelFlag;
use crate::core::config::ForecastConfig;
use crate::core::error::AnalyticsError;
use crate::core::Result;

#[inline]
fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn outer(a: &Array1<f64>, b: &Array1<f64>) -> Array2<f64> {
    a.view().insert_axis(Axis(1)).dot(&b.view().insert_axis(Axis(0)))
}

/// Loss reported at the end of each training epoch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpochReport {
    /// 1-based epoch number.
    pub epoch: usize,
    pub epochs: usize,
    /// Mean squared error over the epoch.
    pub loss: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LstmRegressor {
    input_size: usize,
    hidden_size: usize,
    w: Array2<f64>,
    u: Array2<f64>,
    b: Array1<f64>,
    w_out: Array1<f64>,
    b_out: Array1<f64>,
}

struct StepCache {
    x: Array1<f64>,
    h_prev: Array1<f64>,
    c_prev: Array1<f64>,
    i: Array1<f64>,
    f: Array1<f64>,
    g: Array1<f64>,
    o: Array1<f64>,
    tanh_c: Array1<f64>,
}

struct ForwardPass {
    output: f64,
    h_last: Array1<f64>,
    steps: Vec<StepCache>,
}

struct Gradients {
    w: Array2<f64>,
    u: Array2<f64>,
    b: Array1<f64>,
    w_out: Array1<f64>,
    b_out: Array1<f64>,
}

impl Gradients {
    fn zeros(model: &LstmRegressor) -> Self {
        Self {
            w: Array2::zeros(model.w.raw_dim()),
            u: Array2::zeros(model.u.raw_dim()),
            b: Array1::zeros(model.b.raw_dim()),
            w_out: Array1::zeros(model.w_out.raw_dim()),
            b_out: Array1::zeros(1),
        }
    }

    fn clip(&mut self, limit: f64) {
        let clamp = |v: f64| v.clamp(-limit, limit);
        self.w.mapv_inplace(clamp);
        self.u.mapv_inplace(clamp);
        self.b.mapv_inplace(clamp);
        self.w_out.mapv_inplace(clamp);
        self.b_out.mapv_inplace(clamp);
    }
}

struct OptimizerState {
    adam: Adam,
    w: Moments<ndarray::Ix2>,
    u: Moments<ndarray::Ix2>,
    b: Moments<ndarray::Ix1>,
    w_out: Moments<ndarray::Ix1>,
    b_out: Moments<ndarray::Ix1>,
}

impl LstmRegressor {
    /// Uniform initialization in `±1/sqrt(hidden_size)`; forget gate bias starts at 1.
    pub fn new(input_size: usize, hidden_size: usize, seed: u64) -> Result<Self> {
        if input_size == 0 || hidden_size == 0 {
            return Err(AnalyticsError::invalid_parameter(
                "LSTM input and hidden sizes must be > 0",
            ));
        }
        let mut rng = StdRng::seed_from_u64(seed);
        let k = 1.0 / (hidden_size as f64).sqrt();
        let dist = Uniform::new(-k, k);

        let gates = 4 * hidden_size;
        let w = Array2::random_using((gates, input_size), dist, &mut rng);
        let u = Array2::random_using((gates, hidden_size), dist, &mut rng);
        let mut b = Array1::zeros(gates);
        b.slice_mut(s![hidden_size..2 * hidden_size]).fill(1.0);
        let w_out = Array1::random_using(hidden_size, dist, &mut rng);

        Ok(Self {
            input_size,
            hidden_size,
            w,
            u,
            b,
            w_out,
            b_out: Array1::zeros(1),
        })
    }

    pub fn input_size(&self) -> usize {
        self.input_size
    }

    pub fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    fn forward(&self, sequence: ArrayView2<f64>) -> ForwardPass {
        let hs = self.hidden_size;
        let mut h: Array1<f64> = Array1::zeros(hs);
        let mut c: Array1<f64> = Array1::zeros(hs);
        let mut steps = Vec::with_capacity(sequence.nrows());

        for x in sequence.rows() {
            let z = self.w.dot(&x) + self.u.dot(&h) + &self.b;
            let i = z.slice(s![..hs]).mapv(sigmoid);
            let f = z.slice(s![hs..2 * hs]).mapv(sigmoid);
            let g = z.slice(s![2 * hs..3 * hs]).mapv(f64::tanh);
            let o = z.slice(s![3 * hs..]).mapv(sigmoid);

            let c_next = &f * &c + &i * &g;
            let tanh_c = c_next.mapv(f64::tanh);
            let h_next = &o * &tanh_c;

            steps.push(StepCache {
                x: x.to_owned(),
                h_prev: h,
                c_prev: c,
                i,
                f,
                g,
                o,
                tanh_c,
            });
            h = h_next;
            c = c_next;
        }

        ForwardPass {
            output: self.w_out.dot(&h) + self.b_out[0],
            h_last: h,
            steps,
        }
    }

    /// Accumulate parameter gradients for one sequence given `dL/dy`.
    fn backward(&self, pass: &ForwardPass, dy: f64, grads: &mut Gradients) {
        let hs = self.hidden_size;
        grads.w_out.scaled_add(dy, &pass.h_last);
        grads.b_out[0] += dy;

        let mut dh = &self.w_out * dy;
        let mut dc: Array1<f64> = Array1::zeros(hs);

        for step in pass.steps.iter().rev() {
            let d_o = &dh * &step.tanh_c;
            let dc_total = dc + &dh * &step.o * &step.tanh_c.mapv(|t| 1.0 - t * t);
            let di = &dc_total * &step.g;
            let df = &dc_total * &step.c_prev;
            let dg = &dc_total * &step.i;

            let mut dz: Array1<f64> = Array1::zeros(4 * hs);
            dz.slice_mut(s![..hs]).assign(&(di * &step.i.mapv(|v| v * (1.0 - v))));
            dz.slice_mut(s![hs..2 * hs]).assign(&(df * &step.f.mapv(|v| v * (1.0 - v))));
            dz.slice_mut(s![2 * hs..3 * hs]).assign(&(dg * &step.g.mapv(|v| 1.0 - v * v)));
            dz.slice_mut(s![3 * hs..]).assign(&(d_o * &step.o.mapv(|v| v * (1.0 - v))));

            grads.w += &outer(&dz, &step.x);
            grads.u += &outer(&dz, &step.h_prev);
            grads.b += &dz;

            dh = self.u.t().dot(&dz);
            dc = dc_total * &step.f;
        }
    }

    /// Predict for one `[time, features]` sequence.
    pub fn predict(&self, sequence: ArrayView2<f64>) -> f64 {
        self.forward(sequence).output
    }

    /// Predict for every sequence of a `[batch, time, features]` tensor.
    pub fn predict_batch(&self, inputs: &Array3<f64>) -> Array1<f64> {
        inputs
            .axis_iter(Axis(0))
            .map(|seq| self.predict(seq))
            .collect()
    }

    /// Train with mini-batch Adam on mean squared error.
    ///
    /// `on_epoch` runs after every epoch. The cancel flag is polled before each
    /// mini-batch.
    ///
    /// # Returns
    /// Per-epoch loss history.
    pub fn fit<F>(
        &mut self,
        inputs: &Array3<f64>,
        targets: &Array1<f64>,
        config: &ForecastConfig,
        cancel: &CancelFlag,
        mut on_epoch: F,
    ) -> Result<Vec<f64>>
    where
        F: FnMut(&EpochReport),
    {
        config.validate()?;
        let (examples, _, features) = inputs.dim();
        if features != self.input_size {
            return Err(AnalyticsError::length_mismatch(self.input_size, features));
        }
        if examples != targets.len() {
            return Err(AnalyticsError::length_mismatch(examples, targets.len()));
        }
        if examples == 0 {
            return Err(AnalyticsError::insufficient_data("LSTM training", 1, 0));
        }

        let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(1));
        let mut order: Vec<usize> = (0..examples).collect();
        let mut state = OptimizerState {
            adam: Adam::new(config.learning_rate),
            w: Moments::zeros_like(&self.w),
            u: Moments::zeros_like(&self.u),
            b: Moments::zeros_like(&self.b),
            w_out: Moments::zeros_like(&self.w_out),
            b_out: Moments::zeros_like(&self.b_out),
        };
        let mut history = Vec::with_capacity(config.epochs);

        for epoch in 1..=config.epochs {
            if config.shuffle {
                order.shuffle(&mut rng);
            }
            let mut total = 0.0;

            for batch in order.chunks(config.batch_size) {
                if cancel.is_cancelled() {
                    return Err(AnalyticsError::cancelled("LSTM training"));
                }
                let mut grads = Gradients::zeros(self);
                let scale = 2.0 / batch.len() as f64;
                for &idx in batch {
                    let pass = self.forward(inputs.index_axis(Axis(0), idx));
                    let err = pass.output - targets[idx];
                    total += err * err;
                    self.backward(&pass, scale * err, &mut grads);
                }
                if let Some(limit) = config.gradient_clip {
                    grads.clip(limit);
                }
                self.apply(&mut state, &grads);
            }

            let loss = total / examples as f64;
            if !loss.is_finite() {
                return Err(AnalyticsError::degenerate(format!("LSTM training diverged at epoch {}", epoch)));
            }
            debug!(epoch, loss, "lstm epoch complete");
            history.push(loss);
            on_epoch(&EpochReport {
                epoch,
                epochs: config.epochs,
                loss,
            });
        }

        Ok(history)
    }

    fn apply(&mut self, state: &mut OptimizerState, grads: &Gradients) {
        state.adam.next_step();
        let adam = &state.adam;
        adam.update(&mut self.w, &grads.w, &mut state.w);
        adam.update(&mut self.u, &grads.u, &mut state.u);
        adam.update(&mut self.b, &grads.b, &mut state.b);
        adam.update(&mut self.w_out, &grads.w_out, &mut state.w_out);
        adam.update(&mut self.b_out, &grads.b_out, &mut state.b_out);
    }

    /// Sum of absolute input weights per input feature, across all gates.
    pub fn feature_importance(&self) -> Vec<f64> {
        self.w.mapv(f64::abs).sum_axis(Axis(0)).to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array;

    fn toy_sequence() -> Array2<f64> {
        Array::from_shape_fn((4, 2), |(t, f)| ((t + 1) as f64 * 0.3 + f as f64 * 0.1).sin())
    }

    #[test]
    fn test_shapes() {
        let model = LstmRegressor::new(3, 5, 7).unwrap();
        assert_eq!(model.w.dim(), (20, 3));
        assert_eq!(model.u.dim(), (20, 5));
        assert_eq!(model.b[5], 1.0);
        assert_eq!(model.b[0], 0.0);
        assert_eq!(model.feature_importance().len(), 3);

        let batch = Array3::from_elem((2, 4, 3), 0.5);
        let out = model.predict_batch(&batch);
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_same_seed_same_weights() {
        let a = LstmRegressor::new(2, 4, 11).unwrap();
        let b = LstmRegressor::new(2, 4, 11).unwrap();
        assert_eq!(a.w, b.w);
        assert_eq!(a.w_out, b.w_out);
    }

    #[test]
    fn test_gradient_matches_finite_difference() {
        let mut model = LstmRegressor::new(2, 3, 3).unwrap();
        let seq = toy_sequence();
        let target = 0.25;

        let pass = model.forward(seq.view());
        let mut grads = Gradients::zeros(&model);
        model.backward(&pass, 2.0 * (pass.output - target), &mut grads);

        let loss = |m: &LstmRegressor| {
            let y = m.predict(seq.view());
            (y - target) * (y - target)
        };
        let eps = 1e-6;
        for &(r, c) in &[(0, 0), (4, 1), (7, 0), (11, 1)] {
            let orig = model.w[[r, c]];
            model.w[[r, c]] = orig + eps;
            let up = loss(&model);
            model.w[[r, c]] = orig - eps;
            let down = loss(&model);
            model.w[[r, c]] = orig;
            let numeric = (up - down) / (2.0 * eps);
            assert!(
                (numeric - grads.w[[r, c]]).abs() < 1e-6,
                "w[{},{}]: numeric {} analytic {}",
                r,
                c,
                numeric,
                grads.w[[r, c]]
            );
        }
        for &(r, c) in &[(1, 2), (9, 0)] {
            let orig = model.u[[r, c]];
            model.u[[r, c]] = orig + eps;
            let up = loss(&model);
            model.u[[r, c]] = orig - eps;
            let down = loss(&model);
            model.u[[r, c]] = orig;
            let numeric = (up - down) / (2.0 * eps);
            assert!((numeric - grads.u[[r, c]]).abs() < 1e-6);
        }
    }

    #[test]
    fn test_training_reduces_loss() {
        let examples = 24;
        let inputs = Array3::from_shape_fn((examples, 3, 1), |(n, t, _)| ((n + t) as f64 * 0.25).sin() * 0.5 + 0.5);
        let targets = Array1::from_shape_fn(examples, |n| ((n + 3) as f64 * 0.25).sin() * 0.5 + 0.5);

        let mut model = LstmRegressor::new(1, 8, 5).unwrap();
        let config = ForecastConfig::default()
            .with_epochs(40)
            .with_learning_rate(0.01)
            .with_batch_size(4);
        let mut reports = Vec::new();
        let history = model
            .fit(&inputs, &targets, &config, &CancelFlag::new(), |r| reports.push(*r))
            .unwrap();

        assert_eq!(history.len(), 40);
        assert_eq!(reports.last().map(|r| r.epoch), Some(40));
        assert!(history[39] < history[0]);
    }

    #[test]
    fn test_cancelled_before_first_batch() {
        let inputs = Array3::from_elem((4, 2, 1), 0.1);
        let targets = Array1::from_elem(4, 0.2);
        let mut model = LstmRegressor::new(1, 2, 1).unwrap();
        let cancel = CancelFlag::new();
        cancel.cancel();
        let err = model
            .fit(&inputs, &targets, &ForecastConfig::default(), &cancel, |_| {})
            .unwrap_err();
        assert!(matches!(err, AnalyticsError::Cancelled { .. }));
    }
}
