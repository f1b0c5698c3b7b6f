//! Scene transition sequencing: fade-out, load at full black, one settle
//! frame, optional BGM switch, fade-in. At most one sequence is ever in
//! flight; re-entrant requests are rejected while one runs.

use bevy::prelude::*;

use crate::audio::bgm::BgmCommand;

/// Request to load a level through the full fade sequence.
#[derive(Event, Debug, Clone)]
pub struct LoadLevelRequest {
    pub level: String,
    pub bgm_track: Option<usize>,
}

/// Consumed by the level spawner once the screen is fully black.
#[derive(Event, Debug, Clone)]
pub struct SpawnLevel {
    pub id: String,
}

/// Which level is currently instantiated, if any.
#[derive(Resource, Debug, Default, Clone, PartialEq)]
pub struct ActiveScene(pub Option<String>);

/// Overlay opacity mirrored by the fader UI.
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct FadeAlpha(pub f32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TransitionStep {
    FadeOut,
    /// Full black for exactly one frame after the load step.
    AwaitFrame,
    SwitchBgm,
    FadeIn,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransitionAction {
    None,
    /// Swap level content now; the screen is fully covered.
    LoadNow,
    SwitchBgm(Option<usize>),
    Finished,
}

#[derive(Debug, Clone)]
pub struct TransitionSequence {
    pub level: String,
    pub bgm_track: Option<usize>,
    step: TransitionStep,
    elapsed: f32,
    fade_duration: f32,
}

impl TransitionSequence {
    pub fn new(level: impl Into<String>, bgm_track: Option<usize>, fade_duration: f32) -> Self {
        Self {
            level: level.into(),
            bgm_track,
            step: TransitionStep::FadeOut,
            elapsed: 0.0,
            fade_duration: fade_duration.max(0.0),
        }
    }

    /// Advance one frame; suspension points are only at frame boundaries.
    pub fn advance(&mut self, dt: f32) -> TransitionAction {
        match self.step {
            TransitionStep::FadeOut => {
                self.elapsed += dt;
                if self.elapsed >= self.fade_duration {
                    self.step = TransitionStep::AwaitFrame;
                    TransitionAction::LoadNow
                } else {
                    TransitionAction::None
                }
            }
            TransitionStep::AwaitFrame => {
                self.step = TransitionStep::SwitchBgm;
                TransitionAction::None
            }
            TransitionStep::SwitchBgm => {
                self.step = TransitionStep::FadeIn;
                self.elapsed = 0.0;
                TransitionAction::SwitchBgm(self.bgm_track)
            }
            TransitionStep::FadeIn => {
                self.elapsed += dt;
                if self.elapsed >= self.fade_duration {
                    TransitionAction::Finished
                } else {
                    TransitionAction::None
                }
            }
        }
    }

    pub fn alpha(&self) -> f32 {
        let progress = if self.fade_duration > 0.0 {
            (self.elapsed / self.fade_duration).clamp(0.0, 1.0)
        } else {
            1.0
        };
        match self.step {
            TransitionStep::FadeOut => progress,
            TransitionStep::AwaitFrame | TransitionStep::SwitchBgm => 1.0,
            TransitionStep::FadeIn => 1.0 - progress,
        }
    }
}

/// Owner of the (at most one) in-flight sequence.
#[derive(Resource, Debug, Default)]
pub struct SceneTransition {
    active: Option<TransitionSequence>,
}

impl SceneTransition {
    pub fn in_flight(&self) -> bool {
        self.active.is_some()
    }

    /// Returns false (and leaves the running sequence intact) when busy.
    pub fn begin(&mut self, seq: TransitionSequence) -> bool {
        if self.active.is_some() {
            return false;
        }
        self.active = Some(seq);
        true
    }
}

pub struct SceneTransitionPlugin;

impl Plugin for SceneTransitionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SceneTransition>()
            .init_resource::<ActiveScene>()
            .init_resource::<FadeAlpha>()
            .add_event::<LoadLevelRequest>()
            .add_event::<SpawnLevel>()
            .add_systems(Update, (start_requested_transitions, tick_transition).chain());
    }
}

fn start_requested_transitions(
    mut requests: EventReader<LoadLevelRequest>,
    mut transition: ResMut<SceneTransition>,
    cfg: Res<crate::core::config::GameConfig>,
) {
    for req in requests.read() {
        let seq = TransitionSequence::new(
            req.level.clone(),
            req.bgm_track,
            cfg.scene.fade_duration,
        );
        if transition.begin(seq) {
            info!(target: "scene", "Transition started: -> '{}'", req.level);
        } else {
            warn!(
                target: "scene",
                "Transition to '{}' rejected: another sequence is in flight", req.level
            );
        }
    }
}

// Runs on real time so the fade progresses while virtual time is paused.
fn tick_transition(
    time: Res<Time<Real>>,
    mut transition: ResMut<SceneTransition>,
    mut alpha: ResMut<FadeAlpha>,
    mut active_scene: ResMut<ActiveScene>,
    mut spawn_ev: EventWriter<SpawnLevel>,
    mut bgm_ev: EventWriter<BgmCommand>,
) {
    let Some(seq) = transition.active.as_mut() else {
        if alpha.0 != 0.0 {
            alpha.0 = 0.0;
        }
        return;
    };
    match seq.advance(time.delta_secs()) {
        TransitionAction::None => {}
        TransitionAction::LoadNow => {
            let id = seq.level.clone();
            info!(target: "scene", "Loading level '{id}'");
            active_scene.0 = Some(id.clone());
            spawn_ev.write(SpawnLevel { id });
        }
        TransitionAction::SwitchBgm(track) => {
            if let Some(track) = track {
                bgm_ev.write(BgmCommand::Play(track));
            }
        }
        TransitionAction::Finished => {
            info!(target: "scene", "Transition into '{}' complete", seq.level);
            alpha.0 = 0.0;
            transition.active = None;
            return;
        }
    }
    alpha.0 = seq.alpha();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_orders_load_bgm_fade() {
        let mut seq = TransitionSequence::new("level_2", Some(1), 0.2);
        assert_eq!(seq.advance(0.1), TransitionAction::None);
        assert_eq!(seq.advance(0.1), TransitionAction::LoadNow);
        assert_eq!(seq.alpha(), 1.0);
        // settle frame stays black
        assert_eq!(seq.advance(0.1), TransitionAction::None);
        assert_eq!(seq.alpha(), 1.0);
        assert_eq!(seq.advance(0.1), TransitionAction::SwitchBgm(Some(1)));
        assert_eq!(seq.advance(0.1), TransitionAction::None);
        assert_eq!(seq.advance(0.1), TransitionAction::Finished);
    }

    #[test]
    fn alpha_monotonic_over_fade_out_then_fade_in() {
        let mut seq = TransitionSequence::new("x", None, 1.0);
        let mut last = 0.0;
        loop {
            let action = seq.advance(0.25);
            if action == TransitionAction::LoadNow {
                break;
            }
            assert!(seq.alpha() >= last);
            last = seq.alpha();
        }
        // through settle + bgm
        seq.advance(0.0);
        seq.advance(0.0);
        let mut last = 1.0;
        loop {
            let action = seq.advance(0.25);
            assert!(seq.alpha() <= last);
            last = seq.alpha();
            if action == TransitionAction::Finished {
                break;
            }
        }
    }

    #[test]
    fn zero_duration_fades_are_instant() {
        let mut seq = TransitionSequence::new("x", None, 0.0);
        assert_eq!(seq.advance(0.0), TransitionAction::LoadNow);
        seq.advance(0.0);
        assert_eq!(seq.advance(0.0), TransitionAction::SwitchBgm(None));
        assert_eq!(seq.advance(0.0), TransitionAction::Finished);
    }

    #[test]
    fn second_begin_is_rejected_while_in_flight() {
        let mut st = SceneTransition::default();
        assert!(st.begin(TransitionSequence::new("a", None, 1.0)));
        assert!(!st.begin(TransitionSequence::new("b", None, 1.0)));
        assert!(st.in_flight());
        assert_eq!(st.active.as_ref().unwrap().level, "a");
    }
}
