//! Background LSTM training with progress events and cancellation.

use std::thread::{self, JoinHandle};

use crossbeam_channel::{unbounded, Receiver, Sender};
use ndarray::{Array1, Array3};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::lstm::{EpochReport, LstmRegressor};
use crate::core::cancel::CancelFlag;
use crate::core::config::ForecastConfig;
use crate::core::error::AnalyticsError;
use crate::core::Result;

/// Progress notification emitted by a training worker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingEvent {
    /// Completed epochs; 0 for the event sent before training starts.
    pub epoch: usize,
    pub epochs: usize,
    /// `round(epoch / epochs * 100)`, in 0..=100.
    pub progress_pct: u8,
    /// Mean squared error of the completed epoch.
    pub loss: Option<f64>,
}

impl TrainingEvent {
    fn started(epochs: usize) -> Self {
        Self {
            epoch: 0,
            epochs,
            progress_pct: 0,
            loss: None,
        }
    }

    fn from_report(report: &EpochReport) -> Self {
        let pct = (report.epoch as f64 / report.epochs as f64 * 100.0).round();
        Self {
            epoch: report.epoch,
            epochs: report.epochs,
            progress_pct: pct.clamp(0.0, 100.0) as u8,
            loss: Some(report.loss),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.epoch == self.epochs
    }
}

/// A fitted model together with its per-epoch loss.
#[derive(Debug, Clone)]
pub struct TrainedModel {
    pub model: LstmRegressor,
    pub loss_history: Vec<f64>,
}

/// Training job: an untrained model plus the examples to fit.
pub struct TrainingTask {
    model: LstmRegressor,
    inputs: Array3<f64>,
    targets: Array1<f64>,
    config: ForecastConfig,
}

impl TrainingTask {
    pub fn new(model: LstmRegressor, inputs: Array3<f64>, targets: Array1<f64>, config: ForecastConfig) -> Self {
        Self {
            model,
            inputs,
            targets,
            config,
        }
    }

    /// Start training on a dedicated thread with a fresh cancel flag.
    pub fn spawn(self) -> Result<TrainingHandle> {
        self.spawn_with_cancel(CancelFlag::new())
    }

    /// Start training on a dedicated thread that observes `cancel`.
    pub fn spawn_with_cancel(self, cancel: CancelFlag) -> Result<TrainingHandle> {
        let (tx, rx) = unbounded();
        let worker_cancel = cancel.clone();

        let worker = thread::Builder::new()
            .name("equilens-train".to_string())
            .spawn(move || self.run(&tx, &worker_cancel))
            .map_err(|e| AnalyticsError::WorkerFailed {
                message: format!("failed to spawn training thread: {}", e),
            })?;

        Ok(TrainingHandle {
            progress: rx,
            cancel,
            worker: Some(worker),
        })
    }

    fn run(mut self, tx: &Sender<TrainingEvent>, cancel: &CancelFlag) -> Result<TrainedModel> {
        info!(
            examples = self.targets.len(),
            epochs = self.config.epochs,
            hidden = self.model.hidden_size(),
            "training started"
        );
        // A dropped receiver only means nobody is watching.
        let _ = tx.send(TrainingEvent::started(self.config.epochs));

        let outcome = self.model.fit(&self.inputs, &self.targets, &self.config, cancel, |report| {
            let _ = tx.send(TrainingEvent::from_report(report));
        });

        match outcome {
            Ok(loss_history) => {
                info!(final_loss = loss_history.last().copied(), "training finished");
                Ok(TrainedModel {
                    model: self.model,
                    loss_history,
                })
            }
            Err(e) => {
                warn!(error = %e, "training stopped");
                Err(e)
            }
        }
    }
}

/// Caller-side view of a running training task.
pub struct TrainingHandle {
    progress: Receiver<TrainingEvent>,
    cancel: CancelFlag,
    worker: Option<JoinHandle<Result<TrainedModel>>>,
}

impl TrainingHandle {
    /// Progress events; the channel disconnects when the worker exits.
    pub fn progress(&self) -> &Receiver<TrainingEvent> {
        &self.progress
    }

    /// Ask the worker to stop at the next mini-batch boundary.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.worker.as_ref().map_or(true, |w| w.is_finished())
    }

    /// Block until the worker exits.
    pub fn join(mut self) -> Result<TrainedModel> {
        let worker = self.worker.take().ok_or_else(|| AnalyticsError::WorkerFailed {
            message: "training thread already joined".to_string(),
        })?;
        worker.join().map_err(|_| AnalyticsError::WorkerFailed {
            message: "training thread panicked".to_string(),
        })?
    }
}

impl Drop for TrainingHandle {
    /// An abandoned handle stops its worker; the thread itself is detached.
    fn drop(&mut self) {
        if self.worker.is_some() {
            self.cancel.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(epochs: usize) -> TrainingTask {
        let inputs = Array3::from_shape_fn((6, 2, 1), |(n, t, _)| (n + t) as f64 / 8.0);
        let targets = Array1::from_shape_fn(6, |n| (n + 2) as f64 / 8.0);
        let model = LstmRegressor::new(1, 3, 9).unwrap();
        let config = ForecastConfig::default().with_epochs(epochs).with_batch_size(2);
        TrainingTask::new(model, inputs, targets, config)
    }

    #[test]
    fn test_progress_events_reach_100() {
        let handle = task(4).spawn().unwrap();
        let events: Vec<TrainingEvent> = handle.progress().iter().collect();
        let trained = handle.join().unwrap();

        assert_eq!(events.len(), 5);
        assert_eq!(events[0].progress_pct, 0);
        assert_eq!(events[0].loss, None);
        let pcts: Vec<u8> = events.iter().map(|e| e.progress_pct).collect();
        assert_eq!(pcts, vec![0, 25, 50, 75, 100]);
        assert!(events[4].is_complete());
        assert_eq!(trained.loss_history.len(), 4);
    }

    #[test]
    fn test_cancel_before_start() {
        let cancel = CancelFlag::new();
        cancel.cancel();
        let handle = task(3).spawn_with_cancel(cancel).unwrap();
        let err = handle.join().unwrap_err();
        assert!(matches!(err, AnalyticsError::Cancelled { .. }));
    }

    #[test]
    fn test_dropping_handle_cancels_worker() {
        let handle = task(10_000).spawn().unwrap();
        let flag = handle.cancel_flag();
        drop(handle);
        assert!(flag.is_cancelled());
    }

    #[test]
    fn test_join_does_not_cancel_shared_flag() {
        let cancel = CancelFlag::new();
        let handle = task(2).spawn_with_cancel(cancel.clone()).unwrap();
        handle.join().unwrap();
        assert!(!cancel.is_cancelled());
    }

    #[test]
    fn test_rounding_of_progress() {
        let report = EpochReport {
            epoch: 1,
            epochs: 3,
            loss: 0.5,
        };
        assert_eq!(TrainingEvent::from_report(&report).progress_pct, 33);
        let report = EpochReport {
            epoch: 2,
            epochs: 3,
            loss: 0.5,
        };
        assert_eq!(TrainingEvent::from_report(&report).progress_pct, 67);
    }
}
