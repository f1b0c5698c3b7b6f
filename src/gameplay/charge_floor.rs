//! Charge plates: parking an energy cube on a plate starts a charge, and
//! after a short delay the linked elevator opens and the level exit arms.

use bevy::prelude::*;

use crate::app::state::GameState;
use crate::audio::sfx::{PlaySfx, SoundType};
use crate::core::components::EnergyCube;
use crate::core::config::GameConfig;
use crate::core::system_order::ProtocolSet;
use crate::feedback::{clips, PlayClip};
use crate::gameplay::level_exit::LevelExit;

#[derive(Component, Debug, Default)]
pub struct ChargePlate {
    pub occupied: bool,
    pub elapsed: f32,
    pub activated: bool,
    pub elevator: Option<Entity>,
}

/// Horizontal distance only; the cube sits on the plate, height differs.
pub fn on_plate(plate_pos: Vec3, cube_pos: Vec3, radius: f32) -> bool {
    plate_pos.xz().distance(cube_pos.xz()) < radius
}

pub struct ChargeFloorPlugin;

impl Plugin for ChargeFloorPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            charge_plates
                .in_set(ProtocolSet)
                .run_if(in_state(GameState::Playing)),
        );
    }
}

fn charge_plates(
    time: Res<Time>,
    cfg: Res<GameConfig>,
    mut plates: Query<(&Transform, &mut ChargePlate)>,
    cubes: Query<(&Transform, &EnergyCube)>,
    mut exits: Query<&mut LevelExit>,
    mut sfx: EventWriter<PlaySfx>,
    mut clips_ev: EventWriter<PlayClip>,
) {
    let dt = time.delta_secs();
    for (plate_tf, mut plate) in &mut plates {
        let occupied = cubes.iter().any(|(cube_tf, cube)| {
            !cube.held && on_plate(plate_tf.translation, cube_tf.translation, cfg.charge_plate.radius)
        });

        if occupied && !plate.occupied {
            plate.elapsed = 0.0;
            sfx.write(PlaySfx(SoundType::ChargeOn));
            sfx.write(PlaySfx(SoundType::ElevatorOpen));
        }
        plate.occupied = occupied;

        if !occupied {
            plate.elapsed = 0.0;
            // Vacating an opened plate closes the elevator and disarms the
            // exit; one close cue per overlap episode.
            if plate.activated {
                plate.activated = false;
                if let Some(elevator) = plate.elevator {
                    clips_ev.write(PlayClip::on(elevator, clips::CLOSE_ELEVATOR));
                }
                for mut exit in &mut exits {
                    exit.enabled = false;
                }
            }
            continue;
        }

        if plate.activated {
            continue;
        }
        plate.elapsed += dt;
        if plate.elapsed >= cfg.charge_plate.open_delay {
            plate.activated = true;
            if let Some(elevator) = plate.elevator {
                clips_ev.write(PlayClip::on(elevator, clips::OPEN_ELEVATOR));
            }
            for mut exit in &mut exits {
                exit.enabled = true;
            }
        }
    }
}
