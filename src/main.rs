use anyhow::Result;
use std::time::Duration;
use tokio::time;
use tracing::{debug, info};
use vista_camera::VrCamera;
use vista_config::AppConfig;
use vista_tracker::types::SensorKind;
use vista_tracker::{HeadTracker, SampleSink, SensorBackend};

/// Simulated sensor rig: a slow head sweep under gravity with a fixed
/// magnetic north. Stands in for the platform sensor subsystem when no
/// device is attached.
struct SimulatedSensors {
    feed: Option<tokio::task::JoinHandle<()>>,
}

impl SimulatedSensors {
    fn new() -> Self {
        Self { feed: None }
    }
}

impl SensorBackend for SimulatedSensors {
    fn is_available(&self, _kind: SensorKind) -> bool {
        true
    }

    fn start(&mut self, sink: SampleSink) -> Result<()> {
        self.feed = Some(tokio::spawn(async move {
            let mut ticker = time::interval(Duration::from_millis(5));
            let mut t = 0.0_f32;
            loop {
                ticker.tick().await;
                t += 0.005;
                // Raw device axes, landscape hold: gravity and yaw rate
                // both sit on the device X axis before the remap.
                let yaw_rate = 0.6 * (0.2 * t).sin();
                sink.submit(SensorKind::Gyroscope, yaw_rate, 0.0, 0.0);
                sink.submit(SensorKind::Accelerometer, 9.81, 0.0, 0.0);
                sink.submit(SensorKind::Magnetometer, 0.0, -25.0, 12.0);
            }
        }));
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(feed) = self.feed.take() {
            feed.abort();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vista_app=info,vista_tracker=info".into()),
        )
        .init();

    info!("Vista head-tracked stereo viewer starting");

    let config = AppConfig::load_or_default();

    let mut tracker = HeadTracker::new(Box::new(SimulatedSensors::new()))?;
    tracker.set_drift_correction(config.tracker.drift_correction);

    let mut camera = VrCamera::new(
        config.camera.fov_y_degrees,
        config.display.eye_aspect(),
        config.camera.parallax,
        config.camera.near,
        config.camera.far,
    );
    camera.set_position(config.camera.position);

    // The renderer would consume camera.left_eye()/right_eye() here;
    // this loop just drives the pull cadence.
    let mut frames = time::interval(Duration::from_micros(16_667));
    let mut frame_count: u64 = 0;

    loop {
        tokio::select! {
            _ = frames.tick() => {
                let orientation = tracker.orientation();
                camera.update(orientation.quaternion);
                frame_count += 1;
                if frame_count % 300 == 0 {
                    let dir = camera.direction();
                    debug!(frame_count, dir_x = dir.x, dir_z = dir.z, "Render heartbeat");
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down");
                break;
            }
        }
    }

    tracker.stop_tracking();
    Ok(())
}
