//! Background music: one looping track at a time, pause/resume across the
//! game-flow pause boundary, persisted mute.

use bevy::audio::Volume;
use bevy::prelude::*;

use crate::core::config::GameConfig;

#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub enum BgmCommand {
    /// Start the track at this index, replacing whatever plays now.
    Play(usize),
    Pause,
    Resume,
    Stop,
    SetMuted(bool),
}

#[derive(Resource, Default)]
pub struct Bgm {
    tracks: Vec<Handle<AudioSource>>,
    sink_entity: Option<Entity>,
    pub current_track: Option<usize>,
    pub muted: bool,
    volume: f32,
}

impl Bgm {
    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.volume
        }
    }
}

pub struct BgmPlugin;

impl Plugin for BgmPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Bgm>()
            .add_event::<BgmCommand>()
            .add_systems(Startup, load_bgm_tracks)
            .add_systems(Update, handle_bgm_commands);
    }
}

fn load_bgm_tracks(
    asset_server: Option<Res<AssetServer>>,
    cfg: Res<GameConfig>,
    mut bgm: ResMut<Bgm>,
) {
    bgm.volume = cfg.audio.bgm_volume;
    let Some(asset_server) = asset_server else {
        return;
    };
    bgm.tracks = cfg
        .audio
        .bgm_tracks
        .iter()
        .map(|p| asset_server.load(p))
        .collect();
    info!(target: "audio", "BGM tracks loaded: {}", bgm.tracks.len());
}

fn handle_bgm_commands(
    mut commands: Commands,
    mut events: EventReader<BgmCommand>,
    mut bgm: ResMut<Bgm>,
    mut sinks: Query<&mut AudioSink>,
) {
    for ev in events.read() {
        match *ev {
            BgmCommand::Play(index) => {
                if index >= bgm.tracks.len() {
                    warn!(target: "audio", "Invalid BGM track index {index}");
                    continue;
                }
                if let Some(entity) = bgm.sink_entity.take() {
                    commands.entity(entity).despawn();
                }
                let entity = commands
                    .spawn((
                        AudioPlayer::new(bgm.tracks[index].clone()),
                        PlaybackSettings::LOOP.with_volume(Volume::Linear(bgm.effective_volume())),
                    ))
                    .id();
                bgm.sink_entity = Some(entity);
                bgm.current_track = Some(index);
                info!(target: "audio", "BGM track {index} playing");
            }
            BgmCommand::Pause => {
                if let Some(sink) = bgm.sink_entity.and_then(|e| sinks.get(e).ok()) {
                    sink.pause();
                }
            }
            BgmCommand::Resume => {
                if let Some(sink) = bgm.sink_entity.and_then(|e| sinks.get(e).ok()) {
                    sink.play();
                }
            }
            BgmCommand::Stop => {
                if let Some(entity) = bgm.sink_entity.take() {
                    commands.entity(entity).despawn();
                }
                bgm.current_track = None;
            }
            BgmCommand::SetMuted(muted) => {
                bgm.muted = muted;
                let volume = bgm.effective_volume();
                if let Some(mut sink) = bgm.sink_entity.and_then(|e| sinks.get_mut(e).ok()) {
                    sink.set_volume(Volume::Linear(volume));
                }
                info!(target: "audio", "BGM muted: {muted}");
            }
        }
    }
}
