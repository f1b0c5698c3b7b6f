//! Bounded energy resource: drained while pushing, replenished by battery
//! pickups, mirrored to the HUD bar through change events.

use bevy::prelude::*;

use crate::audio::sfx::{PlaySfx, SoundType};
use crate::core::components::{LevelEntity, Player};
use crate::core::config::GameConfig;
use crate::core::system_order::ProtocolSet;
use crate::app::state::GameState;

/// Normalized (0..=1) value for UI subscribers.
#[derive(Event, Debug, Clone, Copy)]
pub struct EnergyChanged(pub f32);

#[derive(Resource, Debug, Clone, PartialEq)]
pub struct Energy {
    current: f32,
    max: f32,
}

impl Default for Energy {
    fn default() -> Self {
        Self::full(1.0)
    }
}

impl Energy {
    pub fn full(max: f32) -> Self {
        let max = max.max(f32::EPSILON);
        Self { current: max, max }
    }

    pub fn drain(&mut self, rate: f32, dt: f32) {
        self.current = (self.current - rate * dt).max(0.0);
    }

    pub fn add(&mut self, amount: f32) {
        self.current = (self.current + amount).clamp(0.0, self.max);
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn normalized(&self) -> f32 {
        self.current / self.max
    }

    pub fn is_empty(&self) -> bool {
        self.current <= 0.0
    }
}

/// Proximity pickup restoring a fixed amount.
#[derive(Component, Debug)]
pub struct Battery {
    pub amount: f32,
    pub pickup_radius: f32,
}

pub struct EnergyPlugin;

impl Plugin for EnergyPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Energy>()
            .add_event::<EnergyChanged>()
            .add_systems(Startup, init_energy_from_config)
            .add_systems(
                Update,
                collect_batteries
                    .in_set(ProtocolSet)
                    .run_if(in_state(GameState::Playing)),
            );
    }
}

fn init_energy_from_config(cfg: Res<GameConfig>, mut energy: ResMut<Energy>) {
    *energy = Energy::full(cfg.energy.max);
}

fn collect_batteries(
    mut commands: Commands,
    mut energy: ResMut<Energy>,
    player_q: Query<&Transform, With<Player>>,
    batteries: Query<(Entity, &Transform, &Battery), With<LevelEntity>>,
    mut sfx: EventWriter<PlaySfx>,
    mut changed: EventWriter<EnergyChanged>,
) {
    let Ok(player_tf) = player_q.single() else {
        return;
    };
    for (entity, tf, battery) in &batteries {
        if tf.translation.distance(player_tf.translation) < battery.pickup_radius {
            energy.add(battery.amount);
            sfx.write(PlaySfx(SoundType::EnergyPickup));
            changed.write(EnergyChanged(energy.normalized()));
            commands.entity(entity).despawn();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_never_goes_negative() {
        let mut e = Energy::full(1.0);
        for _ in 0..100 {
            e.drain(0.5, 0.1);
            assert!(e.current() >= 0.0);
            assert!(e.current() <= 1.0);
        }
        assert!(e.is_empty());
    }

    #[test]
    fn add_clamps_to_max() {
        let mut e = Energy::full(1.0);
        e.drain(1.0, 0.25);
        e.add(10.0);
        assert_eq!(e.current(), 1.0);
        e.add(-100.0);
        assert_eq!(e.current(), 0.0);
    }

    #[test]
    fn continuous_push_drains_to_zero_within_five_seconds() {
        // maxEnergy = 1, drainRate = 0.2/s, 5 s at 60 fps
        let mut e = Energy::full(1.0);
        let dt = 1.0 / 60.0;
        let mut t = 0.0;
        while !e.is_empty() {
            e.drain(0.2, dt);
            t += dt;
            assert!(t <= 5.0 + dt, "drain took longer than 5s");
        }
        assert!(e.is_empty());
    }

    #[test]
    fn normalized_tracks_fraction_of_max() {
        let mut e = Energy::full(2.0);
        e.drain(1.0, 1.0);
        assert!((e.normalized() - 0.5).abs() < 1e-6);
    }
}
