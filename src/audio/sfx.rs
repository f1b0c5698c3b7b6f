//! One-shot and looping sound cues. Looping categories are deduplicated so a
//! cue that is already playing only has its parameters updated, never
//! restarted (no audible click on a walk/run pitch change).

use bevy::audio::Volume;
use bevy::prelude::*;
use rand::Rng;
use serde::Deserialize;
use std::collections::HashMap;

use crate::core::config::GameConfig;

/// Sound categories; each maps to one or more clip variants.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundType {
    Jump,
    Land,
    Footstep,
    Push,
    Switch,
    EnergyPickup,
    ChargeOn,
    ElevatorOpen,
    ButtonClick,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopChannel {
    Footstep,
    Push,
}

impl LoopChannel {
    fn index(self) -> usize {
        match self {
            LoopChannel::Footstep => 0,
            LoopChannel::Push => 1,
        }
    }

    fn sound(self) -> SoundType {
        match self {
            LoopChannel::Footstep => SoundType::Footstep,
            LoopChannel::Push => SoundType::Push,
        }
    }
}

/// Fire-and-forget cue, no dedup.
#[derive(Event, Debug, Clone, Copy)]
pub struct PlaySfx(pub SoundType);

#[derive(Event, Debug, Clone, Copy)]
pub struct StartLoopCue {
    pub channel: LoopChannel,
    pub pitch: f32,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct StopLoopCue(pub LoopChannel);

#[derive(Event, Debug, Clone, Copy)]
pub struct SetSfxMuted(pub bool);

/// What a start request should do given the current loop state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoopCommand {
    Start(f32),
    /// Already looping; adjust pitch in place.
    Retune(f32),
    Ignore,
}

const PITCH_EPS: f32 = 1e-3;

/// Tracks "is this category currently looping" to guarantee at most one
/// active loop instance per category.
#[derive(Debug, Default, Clone)]
pub struct LoopGate {
    active: [Option<f32>; 2],
}

impl LoopGate {
    pub fn start(&mut self, channel: LoopChannel, pitch: f32) -> LoopCommand {
        match self.active[channel.index()] {
            None => {
                self.active[channel.index()] = Some(pitch);
                LoopCommand::Start(pitch)
            }
            Some(current) if (current - pitch).abs() > PITCH_EPS => {
                self.active[channel.index()] = Some(pitch);
                LoopCommand::Retune(pitch)
            }
            Some(_) => LoopCommand::Ignore,
        }
    }

    /// Returns true when a loop was actually active; stopping an inactive
    /// channel is a no-op.
    pub fn stop(&mut self, channel: LoopChannel) -> bool {
        self.active[channel.index()].take().is_some()
    }

    pub fn is_active(&self, channel: LoopChannel) -> bool {
        self.active[channel.index()].is_some()
    }

    pub fn pitch(&self, channel: LoopChannel) -> Option<f32> {
        self.active[channel.index()]
    }
}

struct SfxGroup {
    clips: Vec<Handle<AudioSource>>,
    volume: f32,
}

/// Clip handles per category, loaded once at startup.
#[derive(Resource, Default)]
pub struct SfxLibrary {
    groups: HashMap<SoundType, SfxGroup>,
}

#[derive(Resource, Debug, Default)]
pub struct SfxSettings {
    pub muted: bool,
}

/// Entities of the currently looping cue sinks, one slot per channel.
#[derive(Resource, Debug, Default)]
pub struct LoopSinks {
    entities: [Option<Entity>; 2],
    pub gate: LoopGate,
}

#[derive(Component, Debug)]
struct LoopCueSink(LoopChannel);

pub struct SfxPlugin;

impl Plugin for SfxPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SfxLibrary>()
            .init_resource::<SfxSettings>()
            .init_resource::<LoopSinks>()
            .add_event::<PlaySfx>()
            .add_event::<StartLoopCue>()
            .add_event::<StopLoopCue>()
            .add_event::<SetSfxMuted>()
            .add_systems(Startup, load_sfx_library)
            .add_systems(
                Update,
                (handle_mute_toggle, handle_one_shots, handle_loop_cues, apply_loop_pitch),
            );
    }
}

fn load_sfx_library(
    asset_server: Option<Res<AssetServer>>,
    cfg: Res<GameConfig>,
    mut library: ResMut<SfxLibrary>,
) {
    let Some(asset_server) = asset_server else {
        // Headless runs simply skip playback.
        return;
    };
    for group in &cfg.audio.sfx {
        let clips = group.clips.iter().map(|p| asset_server.load(p)).collect();
        library.groups.insert(
            group.category,
            SfxGroup {
                clips,
                volume: group.volume,
            },
        );
    }
    info!(target: "audio", "SFX library: {} categories", library.groups.len());
}

fn handle_mute_toggle(mut events: EventReader<SetSfxMuted>, mut settings: ResMut<SfxSettings>) {
    for ev in events.read() {
        settings.muted = ev.0;
        info!(target: "audio", "SFX muted: {}", ev.0);
    }
}

fn handle_one_shots(
    mut commands: Commands,
    mut events: EventReader<PlaySfx>,
    library: Res<SfxLibrary>,
    settings: Res<SfxSettings>,
) {
    for PlaySfx(sound) in events.read() {
        if settings.muted {
            continue;
        }
        let Some(group) = library.groups.get(sound) else {
            warn!(target: "audio", "No clips registered for {sound:?}");
            continue;
        };
        if group.clips.is_empty() {
            continue;
        }
        let clip = group.clips[rand::thread_rng().gen_range(0..group.clips.len())].clone();
        commands.spawn((
            AudioPlayer::new(clip),
            PlaybackSettings::DESPAWN.with_volume(Volume::Linear(group.volume)),
        ));
    }
}

fn handle_loop_cues(
    mut commands: Commands,
    mut starts: EventReader<StartLoopCue>,
    mut stops: EventReader<StopLoopCue>,
    library: Res<SfxLibrary>,
    settings: Res<SfxSettings>,
    mut sinks: ResMut<LoopSinks>,
) {
    for ev in starts.read() {
        match sinks.gate.start(ev.channel, ev.pitch) {
            LoopCommand::Start(pitch) => {
                let Some(group) = library.groups.get(&ev.channel.sound()) else {
                    continue;
                };
                let Some(clip) = group.clips.first().cloned() else {
                    continue;
                };
                let volume = if settings.muted { 0.0 } else { group.volume };
                let entity = commands
                    .spawn((
                        LoopCueSink(ev.channel),
                        AudioPlayer::new(clip),
                        PlaybackSettings::LOOP
                            .with_volume(Volume::Linear(volume))
                            .with_speed(pitch),
                    ))
                    .id();
                sinks.entities[ev.channel.index()] = Some(entity);
            }
            // Retune is applied by apply_loop_pitch; the gate already holds
            // the new pitch, so starting again is idempotent.
            LoopCommand::Retune(_) | LoopCommand::Ignore => {}
        }
    }
    for StopLoopCue(channel) in stops.read() {
        if sinks.gate.stop(*channel) {
            if let Some(entity) = sinks.entities[channel.index()].take() {
                commands.entity(entity).despawn();
            }
        }
    }
}

/// Converges the live sink speed to the gate's desired pitch; covers both
/// retunes and sinks that appear a frame after spawn.
fn apply_loop_pitch(sinks: Res<LoopSinks>, sink_q: Query<(&AudioSink, &LoopCueSink)>) {
    for (sink, cue) in &sink_q {
        if let Some(pitch) = sinks.gate.pitch(cue.0) {
            if (sink.speed() - pitch).abs() > PITCH_EPS {
                sink.set_speed(pitch);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starting_active_loop_is_deduplicated() {
        let mut gate = LoopGate::default();
        assert_eq!(
            gate.start(LoopChannel::Footstep, 1.0),
            LoopCommand::Start(1.0)
        );
        assert_eq!(gate.start(LoopChannel::Footstep, 1.0), LoopCommand::Ignore);
        assert!(gate.is_active(LoopChannel::Footstep));
    }

    #[test]
    fn pitch_change_retunes_without_restart() {
        let mut gate = LoopGate::default();
        gate.start(LoopChannel::Footstep, 1.0);
        // run -> walk
        assert_eq!(
            gate.start(LoopChannel::Footstep, 0.7),
            LoopCommand::Retune(0.7)
        );
        assert_eq!(gate.pitch(LoopChannel::Footstep), Some(0.7));
        // back to run
        assert_eq!(
            gate.start(LoopChannel::Footstep, 1.0),
            LoopCommand::Retune(1.0)
        );
    }

    #[test]
    fn stopping_inactive_loop_is_noop() {
        let mut gate = LoopGate::default();
        assert!(!gate.stop(LoopChannel::Push));
        gate.start(LoopChannel::Push, 1.0);
        assert!(gate.stop(LoopChannel::Push));
        assert!(!gate.stop(LoopChannel::Push));
    }

    #[test]
    fn channels_are_independent() {
        let mut gate = LoopGate::default();
        gate.start(LoopChannel::Footstep, 0.7);
        gate.start(LoopChannel::Push, 1.0);
        gate.stop(LoopChannel::Footstep);
        assert!(!gate.is_active(LoopChannel::Footstep));
        assert!(gate.is_active(LoopChannel::Push));
    }
}
