use std::collections::VecDeque;

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::engine::core::plugin::TrackingSet;
use crate::engine::session::config::SurfaceTrackingConfig;
use crate::engine::session::events::{CameraPoseEvent, HitTestEvent, SessionEvent, SurfaceEvent};
use crate::engine::session::ingest::{
    HitTestResult, RawPose, normalize_pose, parse_hit_tests, parse_surface,
};
use crate::engine::session::tracking::{TrackingCapabilities, TrackingSession, ViewMode};
use crate::engine::surfaces::lifecycle::SurfaceLifecycleManager;
use crate::engine::surfaces::record::SurfaceId;
use crate::tools::placement::controller::InstanceId;
use crate::tools::placement::systems::{PlaceAtCenterEvent, RemoveInstanceEvent, TapDownEvent};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsValue;

#[cfg(target_arch = "wasm32")]
use web_sys::{MessageEvent, window};

/// JSON-RPC 2.0 request structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 response structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub result: Option<serde_json::Value>,
    pub error: Option<RpcError>,
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 notification structure for one-way communication.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcNotification {
    pub jsonrpc: String,
    pub method: String,
    pub params: serde_json::Value,
}

/// JSON-RPC 2.0 error object.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

/// Resource queuing messages for the host page. Flushed once per frame.
#[derive(Resource, Default)]
pub struct HostRpcInterface {
    outgoing_notifications: Vec<RpcNotification>,
    outgoing_responses: Vec<RpcResponse>,
}

impl HostRpcInterface {
    /// Send notification to the host without expecting a response.
    pub fn send_notification(&mut self, method: &str, params: serde_json::Value) {
        self.outgoing_notifications.push(RpcNotification {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
        });
    }

    fn queue_response(&mut self, response: RpcResponse) {
        self.outgoing_responses.push(response);
    }

    /// Notifications queued this frame and not yet flushed.
    pub fn pending_notifications(&self) -> &[RpcNotification] {
        &self.outgoing_notifications
    }

    pub fn pending_responses(&self) -> &[RpcResponse] {
        &self.outgoing_responses
    }
}

/// Typed form of every message the host may send.
#[derive(Debug, Clone, PartialEq)]
pub enum HostCommand {
    SessionStarted {
        mode: ViewMode,
        capabilities: TrackingCapabilities,
    },
    SessionEnded,
    Surface(SurfaceEvent),
    HitTest(Vec<HitTestResult>),
    CameraPose(Transform),
    TapDown,
    PlaceAtCenter(Option<Transform>),
    RemoveInstance(Option<InstanceId>),
    GetSurfaceStatus,
    ConfigureTracking(SurfaceTrackingConfig),
}

/// Stage that consumes a command's event. Stages run in this order within a
/// frame, whatever order the host delivered the messages in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CommandStage {
    Session,
    Surfaces,
    TapDown,
    HitTest,
    PlaceAtCenter,
    RemoveInstance,
}

/// How a command is sequenced against the rest of the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOrder {
    /// Order-independent, always applied immediately.
    Unordered,
    /// Answered from current state at dispatch, so nothing delivered earlier
    /// may still be waiting for its stage.
    Snapshot,
    Staged(CommandStage),
}

impl HostCommand {
    pub fn order(&self) -> CommandOrder {
        match self {
            HostCommand::SessionStarted { .. } | HostCommand::SessionEnded => {
                CommandOrder::Staged(CommandStage::Session)
            }
            HostCommand::Surface(_) => CommandOrder::Staged(CommandStage::Surfaces),
            HostCommand::TapDown => CommandOrder::Staged(CommandStage::TapDown),
            HostCommand::HitTest(_) => CommandOrder::Staged(CommandStage::HitTest),
            HostCommand::PlaceAtCenter(_) => CommandOrder::Staged(CommandStage::PlaceAtCenter),
            HostCommand::RemoveInstance(_) => CommandOrder::Staged(CommandStage::RemoveInstance),
            HostCommand::CameraPose(_) => CommandOrder::Unordered,
            HostCommand::GetSurfaceStatus | HostCommand::ConfigureTracking(_) => {
                CommandOrder::Snapshot
            }
        }
    }
}

/// Admits commands into one frame only while their stages stay in delivery
/// order. The first command that would overtake an earlier one closes the
/// frame; it and everything after it wait for the next frame.
#[derive(Debug, Default)]
pub struct FrameSequencer {
    latest: Option<CommandStage>,
}

impl FrameSequencer {
    pub fn admit(&mut self, order: CommandOrder) -> bool {
        match order {
            CommandOrder::Unordered => true,
            CommandOrder::Snapshot => self.latest.is_none(),
            CommandOrder::Staged(stage) => {
                if self.latest.is_some_and(|latest| stage < latest) {
                    return false;
                }
                self.latest = Some(stage);
                true
            }
        }
    }
}

/// Validate a request and turn it into a command. Pure: nothing is applied.
pub fn dispatch_host_message(request: &RpcRequest) -> Result<HostCommand, RpcError> {
    if request.jsonrpc != "2.0" {
        return Err(RpcError::invalid_request("Expected jsonrpc \"2.0\""));
    }

    let params = &request.params;
    match request.method.as_str() {
        "session_started" => {
            #[derive(Deserialize)]
            struct SessionStartedParams {
                mode: ViewMode,
                #[serde(default)]
                capabilities: TrackingCapabilities,
            }

            let parsed = serde_json::from_value::<SessionStartedParams>(params.clone())
                .map_err(|_| RpcError::invalid_params("Expected 'mode' parameter"))?;
            Ok(HostCommand::SessionStarted {
                mode: parsed.mode,
                capabilities: parsed.capabilities,
            })
        }
        "session_ended" => Ok(HostCommand::SessionEnded),
        "surface_added" => Ok(HostCommand::Surface(SurfaceEvent::Added(
            parse_surface(params).map_err(|err| RpcError::invalid_params(&err.to_string()))?,
        ))),
        "surface_updated" => Ok(HostCommand::Surface(SurfaceEvent::Updated(
            parse_surface(params).map_err(|err| RpcError::invalid_params(&err.to_string()))?,
        ))),
        "surface_removed" => {
            #[derive(Deserialize)]
            struct SurfaceRemovedParams {
                id: SurfaceId,
            }

            let parsed = serde_json::from_value::<SurfaceRemovedParams>(params.clone())
                .map_err(|_| RpcError::invalid_params("Expected 'id' parameter"))?;
            Ok(HostCommand::Surface(SurfaceEvent::Removed(parsed.id)))
        }
        "hit_test_result" => parse_hit_tests(params)
            .map(HostCommand::HitTest)
            .map_err(|err| RpcError::invalid_params(&err.to_string())),
        "camera_pose" => {
            let pose = serde_json::from_value::<RawPose>(params.clone())
                .map_err(|_| RpcError::invalid_params("Expected pose parameters"))?;
            Ok(HostCommand::CameraPose(normalize_pose(Some(&pose))))
        }
        "tap_down" => Ok(HostCommand::TapDown),
        "place_at_center" => {
            let pose = optional_params::<RawPose>(params)
                .map_err(|_| RpcError::invalid_params("Expected pose parameters"))?;
            let reference = pose
                .filter(|pose| pose.matrix.is_some() || pose.position.is_some())
                .map(|pose| normalize_pose(Some(&pose)));
            Ok(HostCommand::PlaceAtCenter(reference))
        }
        "remove_instance" => {
            #[derive(Deserialize)]
            struct RemoveInstanceParams {
                instance: Option<InstanceId>,
            }

            let parsed = optional_params::<RemoveInstanceParams>(params)
                .map_err(|_| RpcError::invalid_params("Expected 'instance' parameter"))?;
            Ok(HostCommand::RemoveInstance(parsed.and_then(|p| p.instance)))
        }
        "get_surface_status" => Ok(HostCommand::GetSurfaceStatus),
        "configure_tracking" => {
            let config = serde_json::from_value::<SurfaceTrackingConfig>(params.clone())
                .map_err(|err| RpcError::invalid_params(&format!("Invalid config: {}", err)))?;
            config
                .validate()
                .map_err(|err| RpcError::invalid_params(&err.to_string()))?;
            Ok(HostCommand::ConfigureTracking(config))
        }
        _ => Err(RpcError::method_not_found(&request.method)),
    }
}

/// Null or missing params mean "use defaults".
fn optional_params<T: for<'de> Deserialize<'de>>(
    params: &serde_json::Value,
) -> Result<Option<T>, serde_json::Error> {
    if params.is_null() {
        return Ok(None);
    }
    serde_json::from_value::<T>(params.clone()).map(Some)
}

/// Plugin bridging the host page and the tracking pipeline over JSON-RPC 2.0.
pub struct HostRpcPlugin;

impl Plugin for HostRpcPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<HostRpcInterface>()
            .add_event::<IncomingHostMessage>()
            .add_systems(Update, process_incoming_messages.in_set(TrackingSet::Ingest))
            .add_systems(Update, handle_host_messages.in_set(TrackingSet::Dispatch))
            .add_systems(Update, send_outgoing_messages.in_set(TrackingSet::Send));

        #[cfg(target_arch = "wasm32")]
        app.add_systems(Startup, setup_message_listener);
    }
}

#[cfg(target_arch = "wasm32")]
fn setup_message_listener(mut commands: Commands) {
    use std::sync::Arc;
    use std::sync::Mutex;

    // Filled by the JS callback, drained once per frame.
    let message_queue: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let queue_clone = message_queue.clone();

    let closure = Closure::wrap(Box::new(move |event: MessageEvent| {
        if let Ok(data) = event.data().dyn_into::<js_sys::JsString>() {
            let message_str: String = data.into();

            if message_str.contains("jsonrpc") {
                if let Ok(mut queue) = queue_clone.lock() {
                    queue.push(message_str);
                }
            }
        }
    }) as Box<dyn FnMut(MessageEvent)>);

    match window() {
        Some(window) => {
            if let Err(e) = window
                .add_event_listener_with_callback("message", closure.as_ref().unchecked_ref())
            {
                error!("[RPC] Failed to register message listener: {:?}", e);
            }
        }
        None => error!("[RPC] Window object not available"),
    }

    // JS now owns the callback.
    closure.forget();
    commands.insert_resource(MessageQueue(message_queue));
}

#[derive(Resource)]
struct MessageQueue(std::sync::Arc<std::sync::Mutex<Vec<String>>>);

/// Raw JSON-RPC text from the host page or the replay driver.
#[derive(Event, Debug, Clone)]
pub struct IncomingHostMessage {
    pub content: String,
}

fn process_incoming_messages(
    message_queue: Option<Res<MessageQueue>>,
    mut message_events: EventWriter<IncomingHostMessage>,
) {
    let Some(queue_res) = message_queue else {
        return;
    };

    let messages = if let Ok(mut queue) = queue_res.0.lock() {
        std::mem::take(&mut *queue)
    } else {
        Vec::new()
    };

    for message_str in messages {
        message_events.write(IncomingHostMessage {
            content: message_str,
        });
    }
}

/// Event writers a host command may fan out to.
#[derive(SystemParam)]
pub struct HostEventWriters<'w> {
    session: EventWriter<'w, SessionEvent>,
    surfaces: EventWriter<'w, SurfaceEvent>,
    hit_tests: EventWriter<'w, HitTestEvent>,
    camera_poses: EventWriter<'w, CameraPoseEvent>,
    taps: EventWriter<'w, TapDownEvent>,
    centers: EventWriter<'w, PlaceAtCenterEvent>,
    removals: EventWriter<'w, RemoveInstanceEvent>,
}

/// Apply host messages in delivery order. Messages that would be consumed
/// ahead of an earlier one are held back to the next frame.
pub fn handle_host_messages(
    mut events: EventReader<IncomingHostMessage>,
    mut backlog: Local<VecDeque<RpcRequest>>,
    mut rpc_interface: ResMut<HostRpcInterface>,
    mut writers: HostEventWriters,
    mut config: ResMut<SurfaceTrackingConfig>,
    session: Res<TrackingSession>,
    manager: Res<SurfaceLifecycleManager>,
) {
    for event in events.read() {
        match serde_json::from_str::<RpcRequest>(&event.content) {
            Ok(request) => backlog.push_back(request),
            Err(parse_error) => warn!("[RPC] Parse error: {}", parse_error),
        }
    }

    let mut sequencer = FrameSequencer::default();
    while let Some(request) = backlog.pop_front() {
        let result = match dispatch_host_message(&request) {
            Ok(command) => {
                if !sequencer.admit(command.order()) {
                    debug!("[RPC] {} deferred to next frame", request.method);
                    backlog.push_front(request);
                    break;
                }
                apply_host_command(command, &mut writers, &mut config, &session, &manager)
            }
            Err(error) => Err(error),
        };

        if let Err(error) = &result {
            warn!("[RPC] {} rejected: {}", request.method, error.message);
        }

        // Only requests with ids get a response.
        let Some(id) = request.id else {
            continue;
        };
        let response = match result {
            Ok(result_value) => RpcResponse {
                jsonrpc: "2.0".to_string(),
                result: Some(result_value),
                error: None,
                id: Some(id),
            },
            Err(error) => RpcResponse {
                jsonrpc: "2.0".to_string(),
                result: None,
                error: Some(error),
                id: Some(id),
            },
        };
        rpc_interface.queue_response(response);
    }
}

fn apply_host_command(
    command: HostCommand,
    writers: &mut HostEventWriters,
    config: &mut ResMut<SurfaceTrackingConfig>,
    session: &TrackingSession,
    manager: &SurfaceLifecycleManager,
) -> Result<serde_json::Value, RpcError> {
    match command {
        HostCommand::SessionStarted { mode, capabilities } => {
            writers.session.write(SessionEvent::Started { mode, capabilities });
        }
        HostCommand::SessionEnded => {
            writers.session.write(SessionEvent::Ended);
        }
        HostCommand::Surface(event) => {
            writers.surfaces.write(event);
        }
        HostCommand::HitTest(results) => {
            writers.hit_tests.write(HitTestEvent { results });
        }
        HostCommand::CameraPose(transform) => {
            writers.camera_poses.write(CameraPoseEvent { transform });
        }
        HostCommand::TapDown => {
            writers.taps.write(TapDownEvent);
        }
        HostCommand::PlaceAtCenter(reference) => {
            writers.centers.write(PlaceAtCenterEvent { reference });
        }
        HostCommand::RemoveInstance(instance) => {
            writers.removals.write(RemoveInstanceEvent { instance });
        }
        HostCommand::GetSurfaceStatus => {
            return Ok(serde_json::json!({
                "detected": manager.surface_detected(),
                "count": manager.materialized_count(),
            }));
        }
        HostCommand::ConfigureTracking(new_config) => {
            if session.is_active() {
                return Err(RpcError::invalid_request(
                    "Tracking cannot be reconfigured during an active session",
                ));
            }
            **config = new_config;
            info!("[RPC] Tracking configuration replaced");
        }
    }

    Ok(serde_json::json!({ "success": true }))
}

/// Send queued notifications and responses to the host page.
fn send_outgoing_messages(mut rpc_interface: ResMut<HostRpcInterface>) {
    // Notifications first, then responses.
    for notification in rpc_interface.outgoing_notifications.drain(..) {
        send_message_to_parent(&notification);
    }

    for response in rpc_interface.outgoing_responses.drain(..) {
        send_message_to_parent(&response);
    }
}

/// Send serialized message to the parent window.
fn send_message_to_parent<T: Serialize>(message: &T) {
    #[cfg(target_arch = "wasm32")]
    {
        match serde_json::to_string(message) {
            Ok(json) => {
                if let Some(window) = window() {
                    if let Some(parent) = window.parent().ok().flatten() {
                        if let Err(e) = parent.post_message(&JsValue::from_str(&json), "*") {
                            error!("[RPC] Failed to send message to parent: {:?}", e);
                        }
                    } else {
                        warn!("[RPC] No parent window available for message transmission");
                    }
                } else {
                    error!("[RPC] Window object not available");
                }
            }
            Err(e) => {
                error!("[RPC] Failed to serialize message: {}", e);
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Ok(json) = serde_json::to_string(message) {
            debug!("[RPC] -> {}", json);
        }
    }
}

/// Standard RPC error codes and constructors.
impl RpcError {
    pub fn invalid_request(message: &str) -> Self {
        Self {
            code: -32600,
            message: message.to_string(),
            data: None,
        }
    }

    pub fn method_not_found(method: &str) -> Self {
        Self {
            code: -32601,
            message: "Method not found".to_string(),
            data: Some(serde_json::json!({ "method": method })),
        }
    }

    pub fn invalid_params(message: &str) -> Self {
        Self {
            code: -32602,
            message: message.to_string(),
            data: None,
        }
    }
}
