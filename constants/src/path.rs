/// Recorded host session played back on native builds, relative to `assets/`.
pub const REPLAY_PATH: &str = "replays/demo_session.replay.json";
