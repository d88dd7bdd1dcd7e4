#![allow(dead_code, clippy::similar_names)]
#![warn(clippy::shadow_reuse, clippy::shadow_same, clippy::builtin_type_shadow)]
mod config;
mod console_communication;
mod flight_control;
mod keychain;
mod logger;
mod rover;
mod vehicle;

use crate::config::GroundConfig;
use crate::console_communication::ConsoleMessenger;
use crate::keychain::Keychain;
use crate::rover::{RoverController, RoverShell, SshShell};
use crate::vehicle::{TelloLink, Vehicle};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[tokio::main(flavor = "multi_thread", worker_threads = 4)]
async fn main() {
    let conf = GroundConfig::from_env().unwrap_or_else(|e| fatal!("Invalid configuration: {e}"));
    let c_tok = CancellationToken::new();
    let keychain = init(&conf, c_tok.clone()).await;

    let telemetry = keychain.telemetry();
    let telemetry_tok = c_tok.clone();
    let telemetry_handle = tokio::spawn(async move { telemetry.run(telemetry_tok).await });
    keychain.con().serve(keychain.clone(), c_tok.clone());
    info!("Ground station ready. Waiting for console on {}.", keychain.con().local_addr());

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Could not listen for shutdown signal: {e}");
    }
    info!("Shutting down...");
    c_tok.cancel();
    shutdown(&keychain).await;
    let _ = telemetry_handle.await;
    info!("Application closed successfully.");
}

async fn init(conf: &GroundConfig, c_tok: CancellationToken) -> Keychain {
    let vehicle: Arc<dyn Vehicle> = Arc::new(
        TelloLink::bind(conf, c_tok.clone())
            .await
            .unwrap_or_else(|e| fatal!("Could not open vehicle link: {e}")),
    );
    let con = Arc::new(
        ConsoleMessenger::start(conf.console_addr)
            .await
            .unwrap_or_else(|e| fatal!("Could not open console endpoint: {e}")),
    );
    let rover = conf.rover_target.as_deref().and_then(|target| match SshShell::open(target) {
        Ok(shell) => {
            let shell: Arc<dyn RoverShell> = Arc::new(shell);
            Some(Arc::new(RoverController::new(shell)))
        }
        Err(e) => {
            warn!("Rover disabled: {e}");
            None
        }
    });
    Keychain::new(conf, vehicle, con, rover, c_tok)
}

/// Best-effort release of the vehicles: rover stopped, and for a connected drone a
/// neutral RC frame, video off and the drone on the ground.
async fn shutdown(keychain: &Keychain) {
    let rover = keychain.rover();
    let stop_rover = async {
        if let Some(rover) = rover {
            rover.stop().await;
        }
    };
    futures::join!(stop_rover, release_drone(keychain));
}

async fn release_drone(keychain: &Keychain) {
    let f_cont = keychain.f_cont();
    if !f_cont.is_connected().await {
        return;
    }
    if let Err(e) = keychain.arbiter().halt().await {
        warn!("Could not send neutral frame: {e}");
    }
    keychain.c_cont().stop_stream().await;
    if let Err(e) = f_cont.vehicle().stream_off().await {
        warn!("Could not switch off the video stream: {e}");
    }
    if let Err(e) = f_cont.land_if_airborne().await {
        error!("Landing on shutdown failed: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flight_control::VelocityState;
    use crate::rover::ShellError;
    use crate::vehicle::mock::{Call, MockVehicle};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingShell {
        sent: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl RoverShell for RecordingShell {
        async fn send(&self, input: &str) -> Result<(), ShellError> {
            self.sent.lock().unwrap().push(input.to_string());
            Ok(())
        }

        async fn read_available(&self, _max_len: usize) -> Result<String, ShellError> {
            Ok(String::new())
        }
    }

    async fn station(vehicle: &Arc<MockVehicle>, shell: &Arc<RecordingShell>) -> Keychain {
        let conf = GroundConfig::from_lookup(|_| None).unwrap();
        let con = Arc::new(ConsoleMessenger::start("127.0.0.1:0".parse().unwrap()).await.unwrap());
        let rover = RoverController::new(Arc::clone(shell) as Arc<dyn RoverShell>);
        Keychain::new(
            &conf,
            Arc::clone(vehicle) as Arc<dyn Vehicle>,
            con,
            Some(Arc::new(rover)),
            CancellationToken::new(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_stops_rover_without_a_drone() {
        let vehicle = Arc::new(MockVehicle::new());
        let shell = Arc::new(RecordingShell::default());
        let keychain = station(&vehicle, &shell).await;

        shutdown(&keychain).await;
        assert_eq!(shell.sent.lock().unwrap().clone(), vec!["\x03\n".to_string()]);
        assert!(vehicle.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_releases_a_connected_drone() {
        let vehicle = Arc::new(MockVehicle::new());
        let shell = Arc::new(RecordingShell::default());
        let keychain = station(&vehicle, &shell).await;
        keychain.f_cont().connect().await.unwrap();
        keychain.f_cont().takeoff_land().await.unwrap();

        shutdown(&keychain).await;
        assert_eq!(shell.sent.lock().unwrap().len(), 1);
        let calls = vehicle.calls();
        assert_eq!(
            &calls[2..],
            &[Call::Takeoff, Call::Velocity(VelocityState::NEUTRAL), Call::StreamOff, Call::Land]
        );
    }
}
