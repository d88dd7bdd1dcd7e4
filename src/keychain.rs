use crate::config::GroundConfig;
use crate::console_communication::ConsoleMessenger;
use crate::flight_control::{
    CameraController, CommandArbiter, EventSink, FlightComputer, MissionPadNavigator,
    SurfaceSampler, TelemetryEmitter,
};
use crate::rover::RoverController;
use crate::vehicle::Vehicle;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Shared handles to every subsystem of the ground station.
///
/// Cloning is cheap; all clones refer to the same subsystems.
#[derive(Clone)]
pub struct Keychain {
    /// The console messenger, also the sink of every outward event.
    con: Arc<ConsoleMessenger>,
    /// Connection lifecycle and takeoff/landing.
    f_cont: Arc<FlightComputer>,
    /// Key event arbitration and the RC control loop.
    arbiter: Arc<CommandArbiter>,
    nav: Arc<MissionPadNavigator>,
    c_cont: Arc<CameraController>,
    sampler: Arc<SurfaceSampler>,
    telemetry: Arc<TelemetryEmitter>,
    /// Present only if a rover host is configured.
    rover: Option<Arc<RoverController>>,
}

impl Keychain {
    /// Wires all subsystems around `vehicle`, publishing their events through `con`.
    ///
    /// `c_tok` stops the control loop on shutdown.
    pub fn new(
        conf: &GroundConfig,
        vehicle: Arc<dyn Vehicle>,
        con: Arc<ConsoleMessenger>,
        rover: Option<Arc<RoverController>>,
        c_tok: CancellationToken,
    ) -> Self {
        let sink: Arc<dyn EventSink> = Arc::clone(&con) as Arc<dyn EventSink>;
        let f_cont = Arc::new(FlightComputer::new(Arc::clone(&vehicle), conf.speed));
        let arbiter = Arc::new(CommandArbiter::new(
            Arc::clone(&f_cont),
            Arc::clone(&sink),
            conf.release_policy,
            c_tok,
        ));
        let nav = Arc::new(MissionPadNavigator::new(Arc::clone(&f_cont)));
        let c_cont = Arc::new(CameraController::new(
            Arc::clone(&vehicle),
            Arc::clone(&sink),
            conf.tello_video_addr,
        ));
        let sampler = Arc::new(SurfaceSampler::new(vehicle));
        let telemetry = Arc::new(TelemetryEmitter::new(Arc::clone(&f_cont), sink));
        Self { con, f_cont, arbiter, nav, c_cont, sampler, telemetry, rover }
    }

    pub fn con(&self) -> Arc<ConsoleMessenger> { Arc::clone(&self.con) }

    pub fn f_cont(&self) -> Arc<FlightComputer> { Arc::clone(&self.f_cont) }

    pub fn arbiter(&self) -> Arc<CommandArbiter> { Arc::clone(&self.arbiter) }

    pub fn nav(&self) -> Arc<MissionPadNavigator> { Arc::clone(&self.nav) }

    pub fn c_cont(&self) -> Arc<CameraController> { Arc::clone(&self.c_cont) }

    pub fn sampler(&self) -> Arc<SurfaceSampler> { Arc::clone(&self.sampler) }

    pub fn telemetry(&self) -> Arc<TelemetryEmitter> { Arc::clone(&self.telemetry) }

    pub fn rover(&self) -> Option<Arc<RoverController>> { self.rover.clone() }
}
