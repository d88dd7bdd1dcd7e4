use super::ground_event::{EventSink, GroundEvent};
use super::velocity_state::VelocityState;
use crate::vehicle::Vehicle;
use crate::{event, info, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

/// Streams the shared RC vector to the vehicle while it is non-neutral.
///
/// At most one streaming task exists per vehicle. It is started on demand by the
/// command arbiter and ends by itself one tick after the vector returned to
/// neutral, or when the cancellation token fires.
pub struct ControlLoop {
    velocity: Arc<Mutex<VelocityState>>,
    vehicle: Arc<dyn Vehicle>,
    sink: Arc<dyn EventSink>,
    active: AtomicBool,
    c_tok: CancellationToken,
}

impl ControlLoop {
    /// Period between two RC frames.
    pub const TICK: Duration = Duration::from_millis(50);

    pub fn new(
        velocity: Arc<Mutex<VelocityState>>,
        vehicle: Arc<dyn Vehicle>,
        sink: Arc<dyn EventSink>,
        c_tok: CancellationToken,
    ) -> Self {
        Self { velocity, vehicle, sink, active: AtomicBool::new(false), c_tok }
    }

    pub fn is_active(&self) -> bool { self.active.load(Ordering::Acquire) }

    /// Spawns the streaming task unless one is already running.
    ///
    /// Returns `false` when a loop is active; the running loop reads the shared
    /// vector on every tick and picks up the change by itself.
    pub fn ensure_running(self: &Arc<Self>) -> bool {
        if !self.try_acquire() {
            event!("Control loop already active, not starting another one.");
            return false;
        }
        let this = Arc::clone(self);
        tokio::spawn(async move { this.run().await });
        true
    }

    fn try_acquire(&self) -> bool {
        self.active.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire).is_ok()
    }

    async fn run(&self) {
        info!("Control loop started.");
        loop {
            self.stream_until_neutral().await;
            self.active.store(false, Ordering::Release);
            if self.c_tok.is_cancelled() {
                break;
            }
            // a press between our last neutral read and the store above saw the flag
            // still set and relied on us
            let pending = !self.velocity.lock().await.is_neutral();
            if !pending || !self.try_acquire() {
                break;
            }
        }
        info!("Control loop stopped.");
    }

    async fn stream_until_neutral(&self) {
        loop {
            let rc = *self.velocity.lock().await;
            if rc.is_neutral() {
                return;
            }
            if let Err(e) = self.vehicle.send_velocity(rc).await {
                warn!("RC frame {rc} was not sent: {e}");
                self.sink.publish(GroundEvent::failure("control_loop", &e));
            }
            tokio::select! {
                () = tokio::time::sleep(Self::TICK) => {}
                () = self.c_tok.cancelled() => return,
            }
        }
    }
}
