//! End-to-end close price forecasting: features, training, multi-day rollout.

use chrono::NaiveDate;
use ndarray::{s, Array1, Array2, Array3};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::features::{FeatureFrame, CLOSE};
use super::lstm::LstmRegressor;
use super::normalizer::{FeatureScaler, NormalizationBounds};
use super::sequences::build_sequences;
use super::trainer::{TrainedModel, TrainingEvent, TrainingHandle, TrainingTask};
use crate::core::cancel::CancelFlag;
use crate::core::config::ForecastConfig;
use crate::core::error::AnalyticsError;
use crate::core::types::PriceSeries;
use crate::core::Result;

/// Normalized training data and the scaling used to produce it.
#[derive(Debug, Clone)]
pub struct PreparedData {
    pub feature_names: Vec<String>,
    pub scaler: FeatureScaler,
    /// Scaled feature matrix `[time, features]`.
    pub scaled: Array2<f64>,
    pub inputs: Array3<f64>,
    pub targets: Array1<f64>,
    pub last_date: Option<NaiveDate>,
}

impl PreparedData {
    pub fn close_bounds(&self) -> NormalizationBounds {
        *self.scaler.bounds(CLOSE)
    }

    /// The most recent `window` scaled observations.
    pub fn last_window(&self, window: usize) -> Array2<f64> {
        let rows = self.scaled.nrows();
        self.scaled.slice(s![rows - window.min(rows).., ..]).to_owned()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureWeight {
    pub name: String,
    pub importance: f64,
}

/// Result of one forecasting request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub symbol: String,
    /// Date of the last observation the forecast starts from.
    pub last_date: Option<NaiveDate>,
    /// One predicted close per future trading day, nearest first.
    pub predicted_closes: Vec<f64>,
    pub loss_history: Vec<f64>,
    pub feature_importance: Vec<FeatureWeight>,
    pub close_bounds: NormalizationBounds,
}

#[derive(Debug, Clone)]
pub struct Forecaster {
    config: ForecastConfig,
}

impl Forecaster {
    pub fn new(config: ForecastConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// Build features, fit the scaler and cut sliding windows labelled with the next close.
    pub fn prepare(&self, stock: &PriceSeries, companions: &[PriceSeries]) -> Result<PreparedData> {
        let frame = FeatureFrame::from_series(stock, companions)?;
        let window = self.config.window;
        if frame.len() <= window {
            return Err(AnalyticsError::insufficient_data(
                format!("forecast of {}", stock.symbol()),
                window + 1,
                frame.len(),
            ));
        }

        let scaler = FeatureScaler::fit(frame.values(), frame.names())?;
        let scaled = scaler.transform(frame.values());
        let (inputs, targets) = build_sequences(&scaled, window, CLOSE)?;
        debug!(
            symbol = stock.symbol(),
            examples = targets.len(),
            features = frame.num_features(),
            "forecast data prepared"
        );

        Ok(PreparedData {
            feature_names: frame.names().to_vec(),
            scaler,
            scaled,
            inputs,
            targets,
            last_date: stock.last_date(),
        })
    }

    /// Start training a fresh model on a worker thread.
    pub fn spawn_training(&self, prepared: &PreparedData, cancel: CancelFlag) -> Result<TrainingHandle> {
        let model = LstmRegressor::new(prepared.scaler.num_features(), self.config.hidden_size, self.config.seed)?;
        TrainingTask::new(
            model,
            prepared.inputs.clone(),
            prepared.targets.clone(),
            self.config.clone(),
        )
        .spawn_with_cancel(cancel)
    }

    /// Train and roll the model forward `horizon` days.
    ///
    /// `on_progress` is called on the calling thread for every training event.
    pub fn forecast<F>(
        &self,
        stock: &PriceSeries,
        companions: &[PriceSeries],
        horizon: usize,
        on_progress: F,
    ) -> Result<Forecast>
    where
        F: FnMut(&TrainingEvent),
    {
        self.forecast_with_cancel(stock, companions, horizon, &CancelFlag::new(), on_progress)
    }

    pub fn forecast_with_cancel<F>(
        &self,
        stock: &PriceSeries,
        companions: &[PriceSeries],
        horizon: usize,
        cancel: &CancelFlag,
        mut on_progress: F,
    ) -> Result<Forecast>
    where
        F: FnMut(&TrainingEvent),
    {
        if horizon == 0 {
            return Err(AnalyticsError::invalid_parameter("forecast horizon must be > 0"));
        }
        let prepared = self.prepare(stock, companions)?;

        let handle = self.spawn_training(&prepared, cancel.clone())?;
        for event in handle.progress().iter() {
            on_progress(&event);
        }
        let trained = handle.join()?;
        Ok(self.finish(stock.symbol(), &prepared, trained, horizon))
    }

    /// Roll a trained model forward `horizon` days and attach its feature weights.
    pub fn finish(&self, symbol: &str, prepared: &PreparedData, trained: TrainedModel, horizon: usize) -> Forecast {
        let close_bounds = prepared.close_bounds();
        let predicted_closes = roll_forward(
            &trained.model,
            prepared.last_window(self.config.window),
            &close_bounds,
            horizon,
        );
        info!(symbol, horizon, "forecast complete");

        let feature_importance = prepared
            .feature_names
            .iter()
            .zip(trained.model.feature_importance())
            .map(|(name, importance)| FeatureWeight {
                name: name.clone(),
                importance,
            })
            .collect();

        Forecast {
            symbol: symbol.to_string(),
            last_date: prepared.last_date,
            predicted_closes,
            loss_history: trained.loss_history,
            feature_importance,
            close_bounds,
        }
    }
}

/// Iterative multi-day prediction from a scaled `[window, features]` block.
///
/// Each step's prediction becomes the close of a synthetic observation whose
/// other features repeat the last observation; the oldest row drops out.
pub fn roll_forward(
    model: &LstmRegressor,
    mut window: Array2<f64>,
    close_bounds: &NormalizationBounds,
    horizon: usize,
) -> Vec<f64> {
    let mut predictions = Vec::with_capacity(horizon);
    for _ in 0..horizon {
        let price = close_bounds.denormalize(model.predict(window.view()));
        predictions.push(price);
        window = advance_window(&window, close_bounds.normalize(price));
    }
    predictions
}

fn advance_window(window: &Array2<f64>, scaled_close: f64) -> Array2<f64> {
    let rows = window.nrows();
    let mut next = Array2::zeros(window.raw_dim());
    if rows == 0 {
        return next;
    }
    next.slice_mut(s![..rows - 1, ..]).assign(&window.slice(s![1.., ..]));
    let mut carried = window.row(rows - 1).to_owned();
    carried[CLOSE] = scaled_close;
    next.row_mut(rows - 1).assign(&carried);
    next
}
