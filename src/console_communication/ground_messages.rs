use crate::flight_control::{GroundEvent, PadData, SurfaceSample};

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Upstream {
    #[prost(oneof = "UpstreamContent", tags = "1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12")]
    pub content: Option<UpstreamContent>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Downstream {
    #[prost(oneof = "DownstreamContent", tags = "1, 2, 3, 4, 5, 6, 7")]
    pub content: Option<DownstreamContent>,
}

/// A single console key, e.g. `w` or `release-Left`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DroneCommand {
    #[prost(string, tag = "1")]
    pub command: String,
}

#[derive(Clone, Copy, PartialEq, prost::Message)]
pub struct Connect {}

#[derive(Clone, Copy, PartialEq, prost::Message)]
pub struct TakeoffLand {}

#[derive(Clone, Copy, PartialEq, prost::Message)]
pub struct StartStream {}

#[derive(Clone, Copy, PartialEq, prost::Message)]
pub struct StopStream {}

#[derive(Clone, Copy, PartialEq, prost::Message)]
pub struct EnableMissionPads {}

#[derive(Clone, Copy, PartialEq, prost::Message)]
pub struct NavigateMissionPad {}

#[derive(Clone, Copy, PartialEq, prost::Message)]
pub struct GetMissionPadData {}

#[derive(Clone, Copy, PartialEq, prost::Message)]
pub struct ChangeCameraDirection {}

#[derive(Clone, Copy, PartialEq, prost::Message)]
pub struct StartCollecting {}

#[derive(Clone, Copy, PartialEq, prost::Message)]
pub struct StopCollecting {}

/// Rover action name: `forward`, `backward`, `left`, `right` or `stop`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RoverCommand {
    #[prost(string, tag = "1")]
    pub action: String,
}

#[derive(Clone, Copy, PartialEq, prost::Message)]
pub struct BatteryUpdate {
    #[prost(uint32, tag = "1")]
    pub battery_level: u32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CommandResponse {
    #[prost(string, tag = "1")]
    pub command: String,
    #[prost(bool, tag = "2")]
    pub success: bool,
    #[prost(string, tag = "3")]
    pub message: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct VideoFrame {
    #[prost(bytes = "vec", tag = "1")]
    pub data: Vec<u8>,
}

#[derive(Clone, Copy, PartialEq, prost::Message)]
pub struct MissionPadData {
    #[prost(int32, tag = "1")]
    pub pad_id: i32,
    #[prost(int32, optional, tag = "2")]
    pub offset_x: Option<i32>,
    #[prost(int32, optional, tag = "3")]
    pub offset_y: Option<i32>,
    #[prost(int32, optional, tag = "4")]
    pub offset_z: Option<i32>,
}

impl From<PadData> for MissionPadData {
    fn from((pad_id, offset_x, offset_y, offset_z): PadData) -> Self {
        Self { pad_id, offset_x, offset_y, offset_z }
    }
}

#[derive(Clone, Copy, PartialEq, prost::Message)]
pub struct SurfacePoint {
    /// Milliseconds since the unix epoch.
    #[prost(int64, tag = "1")]
    pub timestamp: i64,
    #[prost(int32, tag = "2")]
    pub distance_cm: i32,
}

impl From<&SurfaceSample> for SurfacePoint {
    fn from(sample: &SurfaceSample) -> Self {
        Self { timestamp: sample.timestamp.timestamp_millis(), distance_cm: sample.distance_cm }
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SurfaceData {
    #[prost(message, repeated, tag = "1")]
    pub points: Vec<SurfacePoint>,
}

#[derive(Clone, Copy, PartialEq, prost::Message)]
pub struct StreamResponse {
    #[prost(bool, tag = "1")]
    pub streaming: bool,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Failure {
    #[prost(string, tag = "1")]
    pub origin: String,
    #[prost(string, tag = "2")]
    pub message: String,
}

#[derive(Clone, PartialEq, prost::Oneof)]
pub enum UpstreamContent {
    #[prost(message, tag = "1")]
    DroneCommand(DroneCommand),
    #[prost(message, tag = "2")]
    Connect(Connect),
    #[prost(message, tag = "3")]
    TakeoffLand(TakeoffLand),
    #[prost(message, tag = "4")]
    StartStream(StartStream),
    #[prost(message, tag = "5")]
    StopStream(StopStream),
    #[prost(message, tag = "6")]
    EnableMissionPads(EnableMissionPads),
    #[prost(message, tag = "7")]
    NavigateMissionPad(NavigateMissionPad),
    #[prost(message, tag = "8")]
    GetMissionPadData(GetMissionPadData),
    #[prost(message, tag = "9")]
    ChangeCameraDirection(ChangeCameraDirection),
    #[prost(message, tag = "10")]
    StartCollecting(StartCollecting),
    #[prost(message, tag = "11")]
    StopCollecting(StopCollecting),
    #[prost(message, tag = "12")]
    RoverCommand(RoverCommand),
}

#[derive(Clone, PartialEq, prost::Oneof)]
pub enum DownstreamContent {
    #[prost(message, tag = "1")]
    BatteryUpdate(BatteryUpdate),
    #[prost(message, tag = "2")]
    CommandResponse(CommandResponse),
    #[prost(message, tag = "3")]
    VideoFrame(VideoFrame),
    #[prost(message, tag = "4")]
    MissionPadData(MissionPadData),
    #[prost(message, tag = "5")]
    SurfaceData(SurfaceData),
    #[prost(message, tag = "6")]
    StreamResponse(StreamResponse),
    #[prost(message, tag = "7")]
    Failure(Failure),
}

impl From<GroundEvent> for DownstreamContent {
    fn from(event: GroundEvent) -> Self {
        match event {
            GroundEvent::BatteryUpdate { battery_level } => {
                DownstreamContent::BatteryUpdate(BatteryUpdate {
                    battery_level: u32::from(battery_level),
                })
            }
            GroundEvent::CommandResult { command, success, message } => {
                DownstreamContent::CommandResponse(CommandResponse { command, success, message })
            }
            GroundEvent::VideoFrame(data) => DownstreamContent::VideoFrame(VideoFrame { data }),
            GroundEvent::MissionPadData(data) => {
                DownstreamContent::MissionPadData(MissionPadData::from(data))
            }
            GroundEvent::SurfaceData(samples) => DownstreamContent::SurfaceData(SurfaceData {
                points: samples.iter().map(SurfacePoint::from).collect(),
            }),
            GroundEvent::StreamStatus { streaming } => {
                DownstreamContent::StreamResponse(StreamResponse { streaming })
            }
            GroundEvent::Failure { origin, message } => {
                DownstreamContent::Failure(Failure { origin: origin.to_string(), message })
            }
        }
    }
}
