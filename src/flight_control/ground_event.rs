use super::mission_pad::PadData;
use super::surface_sampler::SurfaceSample;

/// Outward notifications of the ground station. Delivery is fire-and-forget.
#[derive(Debug, Clone, PartialEq)]
pub enum GroundEvent {
    BatteryUpdate { battery_level: u8 },
    CommandResult { command: String, success: bool, message: String },
    /// One datagram of the encoded camera stream, relayed as received.
    VideoFrame(Vec<u8>),
    /// Latest pad query result, [`MissionPadNavigator::NO_PAD_DATA`] if no pad is in view.
    ///
    /// [`MissionPadNavigator::NO_PAD_DATA`]: super::MissionPadNavigator::NO_PAD_DATA
    MissionPadData(PadData),
    SurfaceData(Vec<SurfaceSample>),
    StreamStatus { streaming: bool },
    /// A failure swallowed by a handler or background loop.
    Failure { origin: &'static str, message: String },
}

impl GroundEvent {
    pub fn failure(origin: &'static str, err: &impl std::fmt::Display) -> Self {
        GroundEvent::Failure { origin, message: err.to_string() }
    }
}

/// Receiver of [`GroundEvent`]s. Implementations must not block.
pub trait EventSink: Send + Sync {
    fn publish(&self, event: GroundEvent);
}
