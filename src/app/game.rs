use bevy::prelude::*;

use crate::app::menu::MenuPlugin;
use crate::app::pause::PausePlugin;
use crate::app::state::GameFlowPlugin;
use crate::audio::bgm::BgmPlugin;
use crate::audio::sfx::SfxPlugin;
use crate::core::scene::transition::SceneTransitionPlugin;
use crate::core::system_order::{FeedbackSet, MovementSet, ProtocolSet};
use crate::feedback::FeedbackPlugin;
use crate::gameplay::charge_floor::ChargeFloorPlugin;
use crate::gameplay::energy::EnergyPlugin;
use crate::gameplay::level_exit::LevelExitPlugin;
use crate::gameplay::movement::MovementPlugin;
use crate::gameplay::push::PushProtocolPlugin;
use crate::gameplay::spawn::LevelSpawnPlugin;
use crate::interaction::input::plugin::InputActionsPlugin;
use crate::rendering::camera::CameraPlugin;
use crate::ui::energy_bar::EnergyBarPlugin;
use crate::ui::fader::FaderPlugin;
use crate::ui::prompt::PromptPlugin;

/// Everything above the engine: inputs, game flow, gameplay, feedback, UI.
/// Expects `GameConfig`, `LevelRegistry`, and `Prefs` resources to be
/// inserted before this plugin is added.
pub struct GamePlugin;

impl Plugin for GamePlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(
            Update,
            (
                ProtocolSet,
                MovementSet.after(ProtocolSet),
                FeedbackSet.after(MovementSet),
            ),
        )
        .add_plugins((
            InputActionsPlugin,
            GameFlowPlugin,
            SceneTransitionPlugin,
            MenuPlugin,
            PausePlugin,
            EnergyPlugin,
            LevelSpawnPlugin,
            PushProtocolPlugin,
            MovementPlugin,
            ChargeFloorPlugin,
            LevelExitPlugin,
            FeedbackPlugin,
        ))
        .add_plugins((BgmPlugin, SfxPlugin, CameraPlugin))
        .add_plugins((EnergyBarPlugin, FaderPlugin, PromptPlugin));
    }
}
