//! Per-frame input evaluation: raw device state folded into named actions.
use bevy::input::mouse::MouseMotion;
use bevy::prelude::*;

use super::types::*;

pub fn system_collect_inputs(
    mut motion_evr: EventReader<MouseMotion>,
    mut input_map: ResMut<InputMap>,
) {
    input_map.frame_counter += 1;

    // Binary transitions are one frame wide.
    for st in &mut input_map.dynamic_states {
        if let ActionDynamicState::Binary(b) = st {
            b.clear_transitions();
        }
    }

    let mut mouse_delta = Vec2::ZERO;
    for ev in motion_evr.read() {
        mouse_delta += ev.delta;
    }

    // Axis2 actions bound to MouseMove carry the per-frame pointer delta.
    let mouse_actions: Vec<ActionId> = input_map
        .bindings
        .iter()
        .filter(|b| b.tokens.contains(&RawBindingToken::MouseMove))
        .map(|b| b.action)
        .collect();
    for aid in mouse_actions {
        if !input_map.is_enabled_id(aid) {
            continue;
        }
        if let Some(ActionDynamicState::Axis2(a)) =
            input_map.dynamic_states.get_mut(aid.0 as usize)
        {
            a.delta = mouse_delta;
            a.value = mouse_delta;
            a.active = mouse_delta.length_squared() > 0.0;
        }
    }
}

pub fn system_evaluate_bindings(
    keyboard: Res<ButtonInput<KeyCode>>,
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    mut input_map: ResMut<InputMap>,
) {
    for rt in &mut input_map.bindings_runtime {
        rt.just_pressed = false;
        rt.just_released = false;
    }

    // Snapshot lightweight metadata to avoid simultaneous borrows.
    let bindings = input_map.bindings.clone();
    for binding in &bindings {
        let all_active = binding.tokens.iter().all(|t| match t {
            RawBindingToken::Key(k) => keyboard.pressed(*k),
            RawBindingToken::MouseBtn(b) => mouse_buttons.pressed(*b),
            RawBindingToken::MouseMove => false,
        });
        let rt = &mut input_map.bindings_runtime[binding.id as usize];
        if all_active {
            if !rt.active {
                rt.active = true;
                rt.just_pressed = true;
            }
        } else if rt.active {
            rt.active = false;
            rt.just_released = true;
        }
    }

    // Fold binding runtimes into per-action accumulators.
    let n = input_map.actions.len();
    let mut acc_active = vec![false; n];
    let mut acc_jp = vec![false; n];
    let mut acc_jr = vec![false; n];
    for binding in &bindings {
        let rt = &input_map.bindings_runtime[binding.id as usize];
        let i = binding.action.0 as usize;
        acc_active[i] |= rt.active;
        acc_jp[i] |= rt.just_pressed;
        acc_jr[i] |= rt.just_released;
    }

    let metas = input_map.actions.clone();
    for meta in &metas {
        let i = meta.id.0 as usize;
        if !input_map.is_enabled_id(meta.id) {
            continue;
        }
        match (meta.kind, input_map.dynamic_states.get_mut(i)) {
            (ActionKind::Binary, Some(ActionDynamicState::Binary(b))) => {
                b.pressed = acc_active[i];
                b.just_pressed |= acc_jp[i];
                b.just_released |= acc_jr[i];
            }
            (ActionKind::Axis1, Some(ActionDynamicState::Axis1(a))) => {
                a.value = if acc_active[i] { 1.0 } else { 0.0 };
                a.active = acc_active[i];
            }
            _ => {}
        }
    }

    // WASD planes overwrite their Axis2 action every frame.
    let planes = input_map.virtual_planes.clone();
    for plane in &planes {
        if !input_map.is_enabled_id(plane.action) {
            continue;
        }
        let pressed = |t: &RawBindingToken| match t {
            RawBindingToken::Key(k) => keyboard.pressed(*k),
            RawBindingToken::MouseBtn(b) => mouse_buttons.pressed(*b),
            RawBindingToken::MouseMove => false,
        };
        let mut v = Vec2::ZERO;
        if pressed(&plane.up) {
            v.y += 1.0;
        }
        if pressed(&plane.down) {
            v.y -= 1.0;
        }
        if pressed(&plane.right) {
            v.x += 1.0;
        }
        if pressed(&plane.left) {
            v.x -= 1.0;
        }
        v = (v * plane.scale).clamp(Vec2::splat(-1.0), Vec2::splat(1.0));
        if let Some(ActionDynamicState::Axis2(a)) =
            input_map.dynamic_states.get_mut(plane.action.0 as usize)
        {
            a.delta = v - a.value;
            a.value = v;
            a.active = v.length_squared() > 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::parse::default_input_map;
    use bevy::prelude::*;

    #[test]
    fn disabled_action_reports_nothing() {
        let mut map = default_input_map();
        map.set_binary("Push", true, true);
        assert!(map.just_pressed("Push"));
        map.set_enabled("Push", false);
        assert!(!map.pressed("Push"));
        assert!(!map.just_pressed("Push"));
    }

    #[test]
    fn mass_disable_clears_all_state() {
        let mut map = default_input_map();
        map.set_binary("Jump", true, true);
        map.set_axis2("Move", Vec2::new(0.0, 1.0));
        map.set_all_enabled(false);
        assert!(!map.pressed("Jump"));
        assert_eq!(map.axis2("Move"), Vec2::ZERO);
        // re-enable starts from a clean slate
        map.set_all_enabled(true);
        assert!(!map.pressed("Jump"));
    }

    #[test]
    fn injection_respects_disable_gate() {
        let mut map = default_input_map();
        map.set_enabled("Move", false);
        map.set_axis2("Move", Vec2::ONE);
        assert_eq!(map.axis2("Move"), Vec2::ZERO);
    }
}
