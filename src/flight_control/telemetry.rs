use super::flight_computer::FlightComputer;
use super::ground_event::{EventSink, GroundEvent};
use crate::{event, log, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;

/// Periodically publishes the battery level while the drone is connected.
pub struct TelemetryEmitter {
    f_cont: Arc<FlightComputer>,
    sink: Arc<dyn EventSink>,
    period: Duration,
}

impl TelemetryEmitter {
    pub const DEF_PERIOD: Duration = Duration::from_secs(5);

    pub fn new(f_cont: Arc<FlightComputer>, sink: Arc<dyn EventSink>) -> Self {
        Self { f_cont, sink, period: Self::DEF_PERIOD }
    }

    /// Runs until `c_tok` is cancelled. A tick while disconnected skips the read.
    pub async fn run(&self, c_tok: CancellationToken) {
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = ticker.tick() => self.emit_once().await,
                () = c_tok.cancelled() => break,
            }
        }
        log!("Telemetry emitter stopped.");
    }

    async fn emit_once(&self) {
        if !self.f_cont.is_connected().await {
            log!("Drone not connected, waiting to emit battery level...");
            return;
        }
        match self.f_cont.battery().await {
            Ok(battery_level) => {
                event!("Battery at {battery_level}%");
                self.sink.publish(GroundEvent::BatteryUpdate { battery_level });
            }
            Err(e) => {
                warn!("Battery level unavailable: {e}");
                self.sink.publish(GroundEvent::failure("telemetry", &e));
            }
        }
    }
}
