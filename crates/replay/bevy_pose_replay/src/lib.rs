use bevy::log::{debug, warn};
use bevy::prelude::*;
use pose_replay_core::{
    FrameStore, JumpEvent, PlaybackEvent, ReplayConfig, ReplaySession, ReplaySource, TickOutcome,
};

mod gizmos;

pub use gizmos::{
    canvas_to_world, draw_replay_gizmos, paint_gizmos, sync_airborne_overlay, AirborneOverlay,
    GizmoSink, PoseReplayGizmosPlugin,
};

/// The replay session, owned by the world.
#[derive(Resource, Default)]
pub struct PoseReplay(pub ReplaySession);

/// Requests from gameplay/UI code. Applied in order before the tick.
#[derive(Event, Clone, Debug)]
pub enum ReplayCommand {
    Load {
        frames: FrameStore,
        event: Option<JumpEvent>,
    },
    Play,
    Pause,
    Toggle,
    Seek(i64),
    Clear,
}

impl From<ReplaySource> for ReplayCommand {
    fn from(source: ReplaySource) -> Self {
        Self::Load {
            frames: source.frames,
            event: source.event,
        }
    }
}

/// Playback events re-published for the rest of the app.
#[derive(Event, Clone, Debug, PartialEq)]
pub struct ReplayEvent(pub PlaybackEvent);

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReplaySet {
    Commands,
    Tick,
    Publish,
}

#[derive(Default)]
pub struct PoseReplayPlugin {
    pub config: ReplayConfig,
}

impl Plugin for PoseReplayPlugin {
    fn build(&self, app: &mut App) {
        let session = match ReplaySession::new(self.config.clone()) {
            Ok(s) => s,
            Err(e) => {
                warn!("pose replay config rejected ({e}); using defaults");
                ReplaySession::default()
            }
        };
        app.insert_resource(PoseReplay(session))
            .add_event::<ReplayCommand>()
            .add_event::<ReplayEvent>()
            .configure_sets(
                Update,
                (ReplaySet::Commands, ReplaySet::Tick, ReplaySet::Publish).chain(),
            )
            .add_systems(Update, apply_replay_commands.in_set(ReplaySet::Commands))
            .add_systems(Update, tick_replay.in_set(ReplaySet::Tick))
            .add_systems(Update, publish_replay_events.in_set(ReplaySet::Publish));
    }
}

pub fn apply_replay_commands(
    mut commands: EventReader<ReplayCommand>,
    mut replay: ResMut<PoseReplay>,
) {
    for cmd in commands.read() {
        let session = &mut replay.0;
        match cmd {
            ReplayCommand::Load { frames, event } => {
                let id = session.load(frames.clone(), event.clone());
                debug!("replay session {} loaded with {} frames", id.0, frames.len());
            }
            ReplayCommand::Play => {
                session.play();
            }
            ReplayCommand::Pause => {
                session.pause();
            }
            ReplayCommand::Toggle => {
                session.toggle();
            }
            ReplayCommand::Seek(index) => {
                session.seek(*index);
            }
            ReplayCommand::Clear => {
                session.clear();
            }
        }
    }
}

/// Drives the playback clock from the app's virtual time.
pub fn tick_replay(time: Res<Time>, mut replay: ResMut<PoseReplay>) {
    if !replay.0.state().is_playing {
        return;
    }
    let now_ms = time.elapsed_seconds_f64() * 1000.0;
    if let TickOutcome::Completed = replay.0.tick(now_ms) {
        debug!("replay completed at {now_ms:.1}ms");
    }
}

pub fn publish_replay_events(mut replay: ResMut<PoseReplay>, mut out: EventWriter<ReplayEvent>) {
    for event in replay.0.drain_events() {
        out.send(ReplayEvent(event));
    }
}
