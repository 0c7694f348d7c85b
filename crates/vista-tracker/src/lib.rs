//! Head-orientation tracking from heterogeneous motion sensors.
//!
//! A [`SensorBackend`] pushes raw readings through a [`SampleSink`];
//! the [`HeadTracker`] fuses them into a unit quaternion that the render
//! side pulls once per frame.

pub mod fusion;
pub mod types;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use anyhow::Result;
use fusion::{FusionFilter, FusionMode};
use glam::Vec3;
use types::{Orientation, RawSamples, SensorKind};

/// Platform sensor subsystem boundary.
///
/// Implementations register/unregister the platform's per-sample
/// listeners at a game-rate cadence and report which sensors physically
/// exist. `start`/`stop` are driven idempotently by the tracker.
pub trait SensorBackend: Send {
    /// Whether the given sensor kind is present on this device.
    fn is_available(&self, kind: SensorKind) -> bool;
    /// Begin delivering readings into `sink`.
    fn start(&mut self, sink: SampleSink) -> Result<()>;
    /// Stop delivering readings.
    fn stop(&mut self);
}

struct TrackerState {
    samples: RawSamples,
    filter: FusionFilter,
    last_step: Option<Instant>,
}

struct TrackerShared {
    /// Single lock over samples + quaternions + step clock, so a fusion
    /// step never observes a torn vector and steps never interleave.
    state: Mutex<TrackerState>,
    /// Gates magnetometer use; written from outside the update path.
    drift_correction: AtomicBool,
    tracking: AtomicBool,
}

/// Write handle handed to a [`SensorBackend`].
#[derive(Clone)]
pub struct SampleSink {
    shared: Arc<TrackerShared>,
}

impl SampleSink {
    /// Deliver one raw reading in device axes.
    ///
    /// The portrait-to-landscape remap `(x, y, z) -> (-y, x, z)` is
    /// applied here, identically for every kind, so all three vectors
    /// share one inertial frame. Never blocks: if a fusion step holds
    /// the lock the reading is dropped and the next one wins.
    pub fn submit(&self, kind: SensorKind, x: f32, y: f32, z: f32) {
        if !self.shared.tracking.load(Ordering::Relaxed) {
            return;
        }
        let v = Vec3::new(-y, x, z);
        if let Ok(mut state) = self.shared.state.try_lock() {
            match kind {
                SensorKind::Accelerometer => state.samples.accel = v,
                SensorKind::Gyroscope => state.samples.gyro = v,
                SensorKind::Magnetometer => state.samples.mag = v,
            }
        }
    }
}

/// Head orientation tracker.
///
/// Owns the sensor-derived state and the complementary filter. The filter
/// advances lazily: each [`HeadTracker::orientation`] pull runs one fusion
/// step over the latest samples.
pub struct HeadTracker {
    shared: Arc<TrackerShared>,
    backend: Box<dyn SensorBackend>,
    mode: FusionMode,
}

impl HeadTracker {
    /// Query sensor availability, select the fusion mode and start
    /// tracking.
    pub fn new(backend: Box<dyn SensorBackend>) -> Result<Self> {
        let gyro = backend.is_available(SensorKind::Gyroscope);
        let mag = backend.is_available(SensorKind::Magnetometer);
        let mode = FusionMode::select(gyro, mag);
        tracing::info!(?mode, gyro, mag, "Selected fusion mode");

        let shared = Arc::new(TrackerShared {
            state: Mutex::new(TrackerState {
                samples: RawSamples::default(),
                filter: FusionFilter::new(mode),
                last_step: None,
            }),
            drift_correction: AtomicBool::new(false),
            tracking: AtomicBool::new(false),
        });

        let mut tracker = Self {
            shared,
            backend,
            mode,
        };
        tracker.start_tracking()?;
        Ok(tracker)
    }

    /// The fusion mode fixed at construction.
    pub fn mode(&self) -> FusionMode {
        self.mode
    }

    /// Register sensor delivery. Idempotent.
    pub fn start_tracking(&mut self) -> Result<()> {
        if self.shared.tracking.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        let sink = SampleSink {
            shared: self.shared.clone(),
        };
        if let Err(e) = self.backend.start(sink) {
            self.shared.tracking.store(false, Ordering::SeqCst);
            return Err(e);
        }
        tracing::debug!("Sensor delivery started");
        Ok(())
    }

    /// Unregister sensor delivery. Idempotent.
    pub fn stop_tracking(&mut self) {
        if self.shared.tracking.swap(false, Ordering::SeqCst) {
            self.backend.stop();
            tracing::debug!("Sensor delivery stopped");
        }
    }

    /// Toggle magnetometer drift correction without touching sensor
    /// registration.
    pub fn set_drift_correction(&self, enabled: bool) {
        self.shared.drift_correction.store(enabled, Ordering::Relaxed);
        tracing::debug!(enabled, "Drift correction toggled");
    }

    /// Advance the filter one step and return the fused orientation.
    ///
    /// Non-blocking and bounded: one short critical section per call.
    /// Typically called once per rendered frame, but any rate works.
    pub fn orientation(&self) -> Orientation {
        let drift = self.shared.drift_correction.load(Ordering::Relaxed);
        let mut state = self
            .shared
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let now = Instant::now();
        let dt = state
            .last_step
            .map_or(0.0, |prev| (now - prev).as_secs_f32());
        state.last_step = Some(now);

        let samples = state.samples;
        let quaternion = state.filter.step(&samples, dt, drift);
        Orientation { quaternion }
    }
}

impl Drop for HeadTracker {
    fn drop(&mut self) {
        self.stop_tracking();
    }
}
