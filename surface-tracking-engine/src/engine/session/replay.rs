use bevy::prelude::*;
use bevy_common_assets::json::JsonAssetPlugin;
use constants::path::REPLAY_PATH;
use serde::{Deserialize, Serialize};

use crate::engine::core::plugin::TrackingSet;
use crate::rpc::host_rpc::IncomingHostMessage;

/// One frame of recorded host traffic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayFrame {
    /// JSON-RPC messages exactly as the host would post them.
    #[serde(default)]
    pub messages: Vec<serde_json::Value>,
    /// Extra frames to wait after this one before the next is played.
    #[serde(default)]
    pub hold_frames: u32,
}

#[derive(Asset, TypePath, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingReplay {
    pub frames: Vec<ReplayFrame>,
}

#[derive(Resource, Default)]
pub struct ReplayLoader {
    handle: Option<Handle<TrackingReplay>>,
    next_frame: usize,
    hold_remaining: u32,
    finished: bool,
}

pub fn start_replay(mut replay_loader: ResMut<ReplayLoader>, asset_server: Res<AssetServer>) {
    replay_loader.handle = Some(asset_server.load(REPLAY_PATH));
    info!("[REPLAY] Loading {}", REPLAY_PATH);
}

/// Feed one recorded frame per tick into the host message stream.
pub fn play_replay_frame(
    mut replay_loader: ResMut<ReplayLoader>,
    replays: Res<Assets<TrackingReplay>>,
    mut messages: EventWriter<IncomingHostMessage>,
) {
    if replay_loader.finished {
        return;
    }
    let Some(replay) = replay_loader.handle.as_ref().and_then(|handle| replays.get(handle)) else {
        return;
    };

    if replay_loader.hold_remaining > 0 {
        replay_loader.hold_remaining -= 1;
        return;
    }

    let Some(frame) = replay.frames.get(replay_loader.next_frame) else {
        replay_loader.finished = true;
        info!("[REPLAY] Finished after {} frames", replay_loader.next_frame);
        return;
    };

    for message in &frame.messages {
        messages.write(IncomingHostMessage {
            content: message.to_string(),
        });
    }
    replay_loader.hold_remaining = frame.hold_frames;
    replay_loader.next_frame += 1;
}

/// Plays a recorded session through the host bridge for desktop development.
pub struct ReplayPlugin;

impl Plugin for ReplayPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(JsonAssetPlugin::<TrackingReplay>::new(&["replay.json"]))
            .init_resource::<ReplayLoader>()
            .add_systems(Startup, start_replay)
            .add_systems(Update, play_replay_frame.in_set(TrackingSet::Ingest));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_replay_parses() {
        let source = include_str!("../../../assets/replays/demo_session.replay.json");
        let replay: TrackingReplay = serde_json::from_str(source).expect("valid replay");
        assert!(!replay.frames.is_empty());
        assert!(replay.frames.iter().flat_map(|frame| &frame.messages).all(|message| {
            message.get("jsonrpc").and_then(|v| v.as_str()) == Some("2.0")
        }));
    }

    #[test]
    fn hold_frames_default_to_zero() {
        let replay: TrackingReplay =
            serde_json::from_str(r#"{"frames":[{"messages":[]}]}"#).expect("valid replay");
        assert_eq!(replay.frames[0].hold_frames, 0);
    }
}
