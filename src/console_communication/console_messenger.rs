use super::console_endpoint::{ConsoleEndpoint, ConsoleEvent};
use super::ground_messages::UpstreamContent;
use crate::flight_control::{EventSink, GroundEvent, MissionPadNavigator, NavOutcome};
use crate::keychain::Keychain;
use crate::rover::RoverAction;
use crate::{event, info, log, warn};
use std::fmt::Display;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;

/// Bridges the console endpoint and the ground station: inbound requests are
/// dispatched to the subsystems of a [`Keychain`], outbound [`GroundEvent`]s are
/// encoded and broadcast to every connected console.
pub struct ConsoleMessenger {
    endpoint: Arc<ConsoleEndpoint>,
}

impl ConsoleMessenger {
    pub(crate) async fn start(addr: SocketAddr) -> Result<Self, std::io::Error> {
        let endpoint = Arc::new(ConsoleEndpoint::bind(addr).await?);
        Ok(Self { endpoint })
    }

    pub(crate) fn local_addr(&self) -> SocketAddr { self.endpoint.local_addr() }

    /// Spawns the dispatch loop. Requests are handled one after another so key events
    /// keep their order; long maneuvers are spawned off and report when done.
    pub(crate) fn serve(&self, keychain: Keychain, c_tok: CancellationToken) {
        let mut receiver = self.endpoint.upstream_event_receiver().resubscribe();
        tokio::spawn(async move {
            loop {
                let event = tokio::select! {
                    ev = receiver.recv() => ev,
                    () = c_tok.cancelled() => break,
                };
                match event {
                    Ok(ConsoleEvent::Message(content)) => Self::dispatch(&keychain, content).await,
                    Ok(ConsoleEvent::Connected) => log!("Client connected"),
                    Ok(ConsoleEvent::Disconnected) => log!("Client disconnected"),
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("Dispatcher lagging, dropped {skipped} console requests.");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            info!("Console dispatcher stopped.");
        });
    }

    #[allow(clippy::too_many_lines)]
    async fn dispatch(keychain: &Keychain, content: UpstreamContent) {
        let con = keychain.con();
        match content {
            UpstreamContent::DroneCommand(cmd) => {
                let res = keychain.arbiter().apply_key(&cmd.command).await;
                con.report(&cmd.command, res.map(|rc| rc.to_string()));
            }
            UpstreamContent::Connect(_) => {
                let res = keychain.f_cont().connect().await;
                if res.is_ok() {
                    keychain.arbiter().reset().await;
                }
                con.report("connect", res.map(|()| "Drone connected successfully".to_string()));
            }
            UpstreamContent::TakeoffLand(_) => {
                let f_cont = keychain.f_cont();
                tokio::spawn(async move {
                    let res = f_cont.takeoff_land().await;
                    con.report("takeoff_land", res.map(|air| format!("Drone is now {air}.")));
                });
            }
            UpstreamContent::StartStream(_) => match keychain.c_cont().start_stream().await {
                Ok(_) => con.publish(GroundEvent::StreamStatus { streaming: true }),
                Err(e) => con.report("start_stream", Err::<String, _>(e)),
            },
            UpstreamContent::StopStream(_) => {
                keychain.c_cont().stop_stream().await;
                con.publish(GroundEvent::StreamStatus { streaming: false });
            }
            UpstreamContent::EnableMissionPads(_) => {
                let res = keychain.nav().enable_detection().await;
                con.report(
                    "enable_mission_pads",
                    res.map(|()| "Mission pad detection enabled.".to_string()),
                );
            }
            UpstreamContent::NavigateMissionPad(_) => {
                let nav = keychain.nav();
                tokio::spawn(async move {
                    let res = nav.navigate().await.map(|outcome| match outcome {
                        NavOutcome::NoPad => "No mission pad detected.".to_string(),
                        NavOutcome::AlreadyRunning => "Navigation already in progress.".to_string(),
                        NavOutcome::Landed { pad_id, .. } => {
                            format!("Aligned with mission pad {pad_id} and landed.")
                        }
                    });
                    con.report("navigate_to_mission_pad", res);
                });
            }
            UpstreamContent::GetMissionPadData(_) => {
                let data = keychain.nav().get_mission_pad_data().await.unwrap_or_else(|e| {
                    warn!("Mission pad data unavailable: {e}");
                    MissionPadNavigator::NO_PAD_DATA
                });
                con.publish(GroundEvent::MissionPadData(data));
            }
            UpstreamContent::ChangeCameraDirection(_) => {
                let res = keychain.c_cont().toggle_direction().await;
                con.report(
                    "change_camera_direction",
                    res.map(|dir| format!("Camera now facing {dir}.")),
                );
            }
            UpstreamContent::StartCollecting(_) => {
                let message = if keychain.sampler().start().await {
                    "Data collection started."
                } else {
                    "Data collection already running."
                };
                con.report("start_collecting", Ok::<_, String>(message.to_string()));
            }
            UpstreamContent::StopCollecting(_) => {
                let samples = keychain.sampler().stop().await;
                con.publish(GroundEvent::SurfaceData(samples));
            }
            UpstreamContent::RoverCommand(rover_cmd) => {
                let command = format!("rover {}", rover_cmd.action);
                let Some(rover) = keychain.rover() else {
                    con.report(&command, Err::<String, _>("no rover configured"));
                    return;
                };
                match rover_cmd.action.parse::<RoverAction>() {
                    Ok(action) => con.report(&command, rover.execute(action).await),
                    Err(e) => con.report(&command, Err::<String, _>(e)),
                }
            }
        }
    }

    /// Publishes the outcome of a console request as a command result.
    fn report<E: Display>(&self, command: &str, res: Result<String, E>) {
        let (success, message) = match res {
            Ok(message) => (true, message),
            Err(e) => {
                warn!("Console request '{command}' failed: {e}");
                (false, e.to_string())
            }
        };
        self.publish(GroundEvent::CommandResult { command: command.to_string(), success, message });
    }
}

impl EventSink for ConsoleMessenger {
    fn publish(&self, event: GroundEvent) {
        if !matches!(event, GroundEvent::VideoFrame(_)) {
            event!("Downstream: {event:?}");
        }
        if !self.endpoint.is_console_connected() {
            return;
        }
        self.endpoint.send_downstream(event.into());
    }
}
