//! Level construction from the registry: tears down the previous level's
//! entities and builds the player, cubes, batteries, charge plates,
//! elevators, and the exit trigger for the requested entry.
//!
//! Mesh and material assets are optional so the same systems run headless.

use bevy::prelude::*;
use bevy_rapier3d::prelude::{Collider, KinematicCharacterController, RigidBody};

use crate::core::components::{ActiveClip, EnergyCube, LevelEntity, Player, PushState};
use crate::core::config::GameConfig;
use crate::core::cooldown::Cooldown;
use crate::core::scene::registry::{vec3, LevelRegistry};
use crate::core::scene::transition::{ActiveScene, SpawnLevel};
use crate::gameplay::charge_floor::ChargePlate;
use crate::gameplay::energy::{Battery, Energy, EnergyChanged};
use crate::gameplay::level_exit::LevelExit;

#[derive(Component)]
pub struct Elevator;

pub struct LevelSpawnPlugin;

impl Plugin for LevelSpawnPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, spawn_level);
    }
}

struct LevelAssets {
    player: (Handle<Mesh>, Handle<StandardMaterial>),
    cube: (Handle<Mesh>, Handle<StandardMaterial>),
    battery: (Handle<Mesh>, Handle<StandardMaterial>),
    plate: (Handle<Mesh>, Handle<StandardMaterial>),
    elevator: (Handle<Mesh>, Handle<StandardMaterial>),
    floor: (Handle<Mesh>, Handle<StandardMaterial>),
}

#[allow(clippy::too_many_arguments)]
fn spawn_level(
    mut events: EventReader<SpawnLevel>,
    mut commands: Commands,
    cfg: Res<GameConfig>,
    registry: Res<LevelRegistry>,
    mut active: ResMut<ActiveScene>,
    mut energy: ResMut<Energy>,
    mut energy_changed: EventWriter<EnergyChanged>,
    old: Query<Entity, With<LevelEntity>>,
    meshes: Option<ResMut<Assets<Mesh>>>,
    materials: Option<ResMut<Assets<StandardMaterial>>>,
) {
    let Some(request) = events.read().last() else {
        return;
    };
    let entry = registry.select(Some(&request.id)).clone();

    for entity in &old {
        commands.entity(entity).despawn();
    }

    *energy = Energy::full(cfg.energy.max);
    energy_changed.write(EnergyChanged(energy.normalized()));
    active.0 = Some(entry.id.clone());

    let assets = match (meshes, materials) {
        (Some(mut meshes), Some(mut materials)) => Some(make_assets(
            &cfg,
            &mut meshes,
            &mut materials,
        )),
        _ => None,
    };

    // Floor.
    let mut floor = commands.spawn((
        LevelEntity,
        Transform::from_xyz(0.0, -0.5, 0.0),
        RigidBody::Fixed,
        Collider::cuboid(50.0, 0.5, 50.0),
    ));
    if let Some(a) = &assets {
        floor.insert((Mesh3d(a.floor.0.clone()), MeshMaterial3d(a.floor.1.clone())));
    }

    // Player.
    let half_height = cfg.player.height * 0.5 - cfg.player.radius;
    let mut player = commands.spawn((
        LevelEntity,
        Player::new(cfg.player.radius, cfg.player.height),
        PushState::Idle,
        ActiveClip::default(),
        Transform::from_translation(vec3(entry.player_start)),
        RigidBody::KinematicPositionBased,
        Collider::capsule_y(half_height, cfg.player.radius),
        KinematicCharacterController::default(),
    ));
    if let Some(a) = &assets {
        player.insert((Mesh3d(a.player.0.clone()), MeshMaterial3d(a.player.1.clone())));
    }

    for spec in &entry.cubes {
        let mut cube = commands.spawn((
            LevelEntity,
            EnergyCube::new(spec.half_extent, spec.half_height),
            Transform::from_translation(vec3(spec.pos))
                .with_rotation(Quat::from_rotation_y(spec.yaw_deg.to_radians()))
                .with_scale(Vec3::new(
                    spec.half_extent * 2.0,
                    spec.half_height * 2.0,
                    spec.half_extent * 2.0,
                )),
            RigidBody::KinematicPositionBased,
            // Unit half extents; rapier picks up the transform scale.
            Collider::cuboid(0.5, 0.5, 0.5),
        ));
        if let Some(a) = &assets {
            cube.insert((Mesh3d(a.cube.0.clone()), MeshMaterial3d(a.cube.1.clone())));
        }
    }

    for spec in &entry.batteries {
        let mut battery = commands.spawn((
            LevelEntity,
            Battery {
                amount: spec.amount,
                pickup_radius: 1.0,
            },
            Transform::from_translation(vec3(spec.pos)),
        ));
        if let Some(a) = &assets {
            battery.insert((
                Mesh3d(a.battery.0.clone()),
                MeshMaterial3d(a.battery.1.clone()),
            ));
        }
    }

    let mut first_elevator = None;
    for spec in &entry.plates {
        let mut elevator = commands.spawn((
            Elevator,
            LevelEntity,
            ActiveClip::default(),
            Transform::from_translation(vec3(spec.elevator)),
        ));
        if let Some(a) = &assets {
            elevator.insert((
                Mesh3d(a.elevator.0.clone()),
                MeshMaterial3d(a.elevator.1.clone()),
            ));
        }
        let elevator_id = elevator.id();
        first_elevator.get_or_insert(elevator_id);

        let mut plate = commands.spawn((
            LevelEntity,
            ChargePlate {
                elevator: Some(elevator_id),
                ..default()
            },
            Transform::from_translation(vec3(spec.pos)),
        ));
        if let Some(a) = &assets {
            plate.insert((Mesh3d(a.plate.0.clone()), MeshMaterial3d(a.plate.1.clone())));
        }
    }

    if let Some(spec) = &entry.exit {
        commands.spawn((
            LevelEntity,
            LevelExit {
                enabled: spec.starts_enabled,
                cooldown: Cooldown::armed(cfg.exit.cooldown),
                next: entry.next.clone(),
                elevator: first_elevator,
            },
            Transform::from_translation(vec3(spec.pos)),
        ));
    }
}

fn make_assets(
    cfg: &GameConfig,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
) -> LevelAssets {
    let half_height = cfg.player.height * 0.5 - cfg.player.radius;
    let mut color = |c: Color| materials.add(StandardMaterial::from(c));
    LevelAssets {
        player: (
            meshes.add(Capsule3d::new(cfg.player.radius, half_height * 2.0)),
            color(Color::srgb(0.8, 0.7, 0.2)),
        ),
        cube: (
            meshes.add(Cuboid::new(1.0, 1.0, 1.0)),
            color(Color::srgb(0.2, 0.6, 0.9)),
        ),
        battery: (
            meshes.add(Cylinder::new(0.15, 0.4)),
            color(Color::srgb(0.3, 0.9, 0.3)),
        ),
        plate: (
            meshes.add(Cylinder::new(cfg.charge_plate.radius, 0.05)),
            color(Color::srgb(0.9, 0.5, 0.1)),
        ),
        elevator: (
            meshes.add(Cuboid::new(2.0, 3.0, 0.3)),
            color(Color::srgb(0.5, 0.5, 0.55)),
        ),
        floor: (
            meshes.add(Cuboid::new(100.0, 1.0, 100.0)),
            color(Color::srgb(0.35, 0.35, 0.4)),
        ),
    }
}
