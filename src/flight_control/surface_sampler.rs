use crate::vehicle::Vehicle;
use crate::{info, warn};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

/// Height above the surface at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceSample {
    pub timestamp: DateTime<Utc>,
    pub distance_cm: i32,
}

/// Samples the time-of-flight sensor between an explicit start and stop.
pub struct SurfaceSampler {
    vehicle: Arc<dyn Vehicle>,
    run: Mutex<SamplingRun>,
}

/// Buffer of the latest collection. Every start gets a fresh one, so a task that
/// outlives its stop can only write into its own.
#[derive(Default)]
struct SamplingRun {
    samples: Arc<Mutex<Vec<SurfaceSample>>>,
    c_tok: Option<CancellationToken>,
}

impl SurfaceSampler {
    pub const PERIOD: Duration = Duration::from_secs(1);

    pub fn new(vehicle: Arc<dyn Vehicle>) -> Self {
        Self { vehicle, run: Mutex::new(SamplingRun::default()) }
    }

    /// Starts a fresh collection. Returns `false` if one is already running.
    pub async fn start(&self) -> bool {
        let mut run = self.run.lock().await;
        if run.c_tok.is_some() {
            return false;
        }
        let samples = Arc::new(Mutex::new(Vec::new()));
        let c_tok = CancellationToken::new();
        *run = SamplingRun { samples: Arc::clone(&samples), c_tok: Some(c_tok.clone()) };

        let vehicle = Arc::clone(&self.vehicle);
        tokio::spawn(async move {
            loop {
                match vehicle.tof_distance().await {
                    Ok(distance_cm) => samples
                        .lock()
                        .await
                        .push(SurfaceSample { timestamp: Utc::now(), distance_cm }),
                    Err(e) => warn!("Skipping surface sample: {e}"),
                }
                tokio::select! {
                    () = tokio::time::sleep(Self::PERIOD) => {}
                    () = c_tok.cancelled() => break,
                }
            }
        });
        info!("Surface data collection started.");
        true
    }

    /// Stops the collection and hands back everything gathered since the last start.
    pub async fn stop(&self) -> Vec<SurfaceSample> {
        let mut run = self.run.lock().await;
        if let Some(c_tok) = run.c_tok.take() {
            c_tok.cancel();
        }
        let samples = run.samples.lock().await.clone();
        if samples.is_empty() {
            info!("No surface data has been collected yet.");
        }
        samples
    }
}
