use bevy::prelude::*;
use smallvec::SmallVec;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Binary,
    Axis1,
    Axis2,
}

/// Internal index (array position).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActionId(pub u16);

#[derive(Debug, Clone)]
pub struct ActionMeta {
    pub id: ActionId,
    pub name: String,
    pub description: String,
    pub kind: ActionKind,
}

#[derive(Default, Debug, Clone, Copy)]
pub struct ActionStateBinary {
    pub pressed: bool,
    pub just_pressed: bool,
    pub just_released: bool,
}
impl ActionStateBinary {
    pub fn clear_transitions(&mut self) {
        self.just_pressed = false;
        self.just_released = false;
    }
}

#[derive(Default, Debug, Clone, Copy)]
pub struct ActionStateAxis1 {
    pub value: f32,
    pub active: bool,
}

#[derive(Default, Debug, Clone, Copy)]
pub struct ActionStateAxis2 {
    pub value: Vec2,
    pub delta: Vec2,
    pub active: bool,
}

#[derive(Debug, Clone)]
pub enum ActionDynamicState {
    Binary(ActionStateBinary),
    Axis1(ActionStateAxis1),
    Axis2(ActionStateAxis2),
}
impl ActionDynamicState {
    pub fn as_binary_mut(&mut self) -> Option<&mut ActionStateBinary> {
        match self {
            Self::Binary(b) => Some(b),
            _ => None,
        }
    }
    pub fn reset(&mut self) {
        match self {
            Self::Binary(b) => *b = ActionStateBinary::default(),
            Self::Axis1(a) => *a = ActionStateAxis1::default(),
            Self::Axis2(a) => *a = ActionStateAxis2::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RawBindingToken {
    Key(KeyCode),
    MouseBtn(MouseButton),
    MouseMove,
}

#[derive(Debug, Clone)]
pub struct Binding {
    pub id: u32,
    pub action: ActionId,
    pub tokens: SmallVec<[RawBindingToken; 2]>,
}

#[derive(Debug, Default, Clone)]
pub struct BindingRuntime {
    pub active: bool,
    pub just_pressed: bool,
    pub just_released: bool,
}

/// WASD-style key quad feeding an Axis2 action.
#[derive(Debug, Clone)]
pub struct VirtualPlane {
    pub action: ActionId,
    pub up: RawBindingToken,
    pub down: RawBindingToken,
    pub left: RawBindingToken,
    pub right: RawBindingToken,
    pub scale: f32,
}

#[derive(Resource, Debug, Default)]
pub struct InputMap {
    pub actions: Vec<ActionMeta>,
    pub name_to_id: HashMap<String, ActionId>,
    pub bindings: Vec<Binding>,
    pub bindings_runtime: Vec<BindingRuntime>,
    pub virtual_planes: Vec<VirtualPlane>,
    pub dynamic_states: Vec<ActionDynamicState>,
    /// Per-action gate; a disabled action reports nothing and holds no state.
    pub enabled: Vec<bool>,
    pub frame_counter: u64,
}

impl InputMap {
    pub fn get_state(&self, name: &str) -> Option<&ActionDynamicState> {
        let id = self.name_to_id.get(name)?;
        if !self.is_enabled_id(*id) {
            return None;
        }
        self.dynamic_states.get(id.0 as usize)
    }

    fn get_state_mut(&mut self, name: &str) -> Option<&mut ActionDynamicState> {
        let id = *self.name_to_id.get(name)?;
        self.dynamic_states.get_mut(id.0 as usize)
    }

    pub fn is_enabled_id(&self, id: ActionId) -> bool {
        self.enabled.get(id.0 as usize).copied().unwrap_or(false)
    }

    pub fn pressed(&self, name: &str) -> bool {
        match self.get_state(name) {
            Some(ActionDynamicState::Binary(b)) => b.pressed,
            Some(ActionDynamicState::Axis1(a)) => a.active,
            Some(ActionDynamicState::Axis2(a)) => a.active,
            None => false,
        }
    }

    pub fn just_pressed(&self, name: &str) -> bool {
        matches!(
            self.get_state(name),
            Some(ActionDynamicState::Binary(b)) if b.just_pressed
        )
    }

    pub fn axis1(&self, name: &str) -> f32 {
        match self.get_state(name) {
            Some(ActionDynamicState::Axis1(a)) => a.value,
            _ => 0.0,
        }
    }

    pub fn axis2(&self, name: &str) -> Vec2 {
        match self.get_state(name) {
            Some(ActionDynamicState::Axis2(a)) => a.value,
            _ => Vec2::ZERO,
        }
    }

    /// Disabling clears the action's dynamic state in the same frame.
    pub fn set_enabled(&mut self, name: &str, enabled: bool) {
        let Some(id) = self.name_to_id.get(name).copied() else {
            warn!(target: "input", "set_enabled: unknown action '{name}'");
            return;
        };
        if let Some(slot) = self.enabled.get_mut(id.0 as usize) {
            *slot = enabled;
        }
        if !enabled {
            if let Some(st) = self.dynamic_states.get_mut(id.0 as usize) {
                st.reset();
            }
        }
    }

    pub fn set_all_enabled(&mut self, enabled: bool) {
        for slot in &mut self.enabled {
            *slot = enabled;
        }
        if !enabled {
            for st in &mut self.dynamic_states {
                st.reset();
            }
        }
    }

    /// Direct state injection; used by the evaluation systems and by tests
    /// driving the map without a window.
    pub fn set_binary(&mut self, name: &str, pressed: bool, just_pressed: bool) {
        if !self
            .name_to_id
            .get(name)
            .is_some_and(|id| self.enabled.get(id.0 as usize).copied().unwrap_or(false))
        {
            return;
        }
        if let Some(b) = self.get_state_mut(name).and_then(|s| s.as_binary_mut()) {
            b.just_released = b.pressed && !pressed;
            b.pressed = pressed;
            b.just_pressed = just_pressed;
        }
    }

    pub fn set_axis1(&mut self, name: &str, value: f32) {
        if !self
            .name_to_id
            .get(name)
            .is_some_and(|id| self.enabled.get(id.0 as usize).copied().unwrap_or(false))
        {
            return;
        }
        if let Some(ActionDynamicState::Axis1(a)) = self.get_state_mut(name) {
            a.value = value;
            a.active = value.abs() > f32::EPSILON;
        }
    }

    pub fn set_axis2(&mut self, name: &str, value: Vec2) {
        if !self
            .name_to_id
            .get(name)
            .is_some_and(|id| self.enabled.get(id.0 as usize).copied().unwrap_or(false))
        {
            return;
        }
        if let Some(ActionDynamicState::Axis2(a)) = self.get_state_mut(name) {
            a.delta = value - a.value;
            a.value = value;
            a.active = value.length_squared() > 0.0;
        }
    }
}
