use super::types::*;
use bevy::prelude::*;
use smallvec::SmallVec;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct ParsedInputConfig {
    pub input_map: InputMap,
    pub errors: Vec<String>,
}

#[derive(Debug, serde::Deserialize)]
struct ActionDecl {
    description: Option<String>,
    kind: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
struct VirtualPlaneToml {
    action: String,
    up: String,
    down: String,
    left: String,
    right: String,
    scale: Option<f32>,
}

#[derive(Debug, serde::Deserialize)]
struct RootToml {
    actions: Option<HashMap<String, ActionDecl>>,
    bindings: Option<HashMap<String, Vec<String>>>,
    #[serde(rename = "debug.bindings")]
    debug_bindings: Option<HashMap<String, Vec<String>>>,
    virtual_planes: Option<Vec<VirtualPlaneToml>>,
}

pub fn parse_input_toml(raw: &str, debug_layer: bool) -> ParsedInputConfig {
    let mut result = ParsedInputConfig::default();
    let root: RootToml = match toml::from_str(raw) {
        Ok(r) => r,
        Err(e) => {
            result.errors.push(format!("Top-level parse: {e}"));
            return result;
        }
    };

    let mut actions: Vec<ActionMeta> = Vec::new();
    let mut name_to_id = HashMap::new();
    if let Some(map) = root.actions {
        // BTreeMap-like determinism for stable ids
        let mut entries: Vec<_> = map.into_iter().collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        for (name, decl) in entries {
            if !validate_action_name(&name) {
                result
                    .errors
                    .push(format!("Invalid action name '{name}': must be PascalCase"));
                continue;
            }
            let kind = match decl.kind.as_deref().unwrap_or("Binary") {
                "Binary" => ActionKind::Binary,
                "Axis1" => ActionKind::Axis1,
                "Axis2" => ActionKind::Axis2,
                other => {
                    result.errors.push(format!(
                        "Action {name} unknown kind '{other}': expected Binary|Axis1|Axis2"
                    ));
                    ActionKind::Binary
                }
            };
            let id = ActionId(actions.len() as u16);
            actions.push(ActionMeta {
                id,
                name: name.clone(),
                description: decl.description.unwrap_or_default(),
                kind,
            });
            name_to_id.insert(name, id);
        }
    }

    let mut dynamic_states = Vec::with_capacity(actions.len());
    for meta in &actions {
        dynamic_states.push(match meta.kind {
            ActionKind::Binary => ActionDynamicState::Binary(Default::default()),
            ActionKind::Axis1 => ActionDynamicState::Axis1(Default::default()),
            ActionKind::Axis2 => ActionDynamicState::Axis2(Default::default()),
        });
    }
    let enabled = vec![true; actions.len()];

    let mut input_map = InputMap {
        actions,
        name_to_id,
        dynamic_states,
        enabled,
        ..Default::default()
    };

    let mut all_bindings: HashMap<String, Vec<String>> = HashMap::new();
    if let Some(b) = root.bindings {
        for (k, v) in b {
            all_bindings.entry(k).or_default().extend(v);
        }
    }
    if debug_layer {
        if let Some(db) = root.debug_bindings {
            for (k, v) in db {
                all_bindings.entry(k).or_default().extend(v);
            }
        }
    }

    let mut binding_id: u32 = 0;
    let mut sorted: Vec<_> = all_bindings.into_iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));
    for (action_name, list) in sorted {
        let Some(aid) = input_map.name_to_id.get(&action_name).copied() else {
            result
                .errors
                .push(format!("Binding references unknown action '{action_name}'"));
            continue;
        };
        for spec in &list {
            match parse_binding(spec) {
                Ok(tokens) => {
                    input_map.bindings.push(Binding {
                        id: binding_id,
                        action: aid,
                        tokens,
                    });
                    input_map.bindings_runtime.push(BindingRuntime::default());
                    binding_id += 1;
                }
                Err(err) => result
                    .errors
                    .push(format!("[binding {action_name} '{spec}'] {err}")),
            }
        }
    }

    if let Some(planes) = root.virtual_planes {
        for plane in planes {
            let Some(aid) = input_map.name_to_id.get(&plane.action).copied() else {
                result
                    .errors
                    .push(format!("VirtualPlane references unknown action '{}'", plane.action));
                continue;
            };
            let tokens = [
                parse_token(&plane.up),
                parse_token(&plane.down),
                parse_token(&plane.left),
                parse_token(&plane.right),
            ];
            match tokens {
                [Ok(up), Ok(down), Ok(left), Ok(right)] => {
                    input_map.virtual_planes.push(VirtualPlane {
                        action: aid,
                        up,
                        down,
                        left,
                        right,
                        scale: plane.scale.unwrap_or(1.0),
                    });
                }
                _ => {
                    for t in tokens.into_iter().filter_map(|t| t.err()) {
                        result
                            .errors
                            .push(format!("VirtualPlane '{}': {t}", plane.action));
                    }
                }
            }
        }
    }

    result.input_map = input_map;
    result
}

fn validate_action_name(name: &str) -> bool {
    let bytes = name.as_bytes();
    if bytes.is_empty() || !bytes[0].is_ascii_uppercase() {
        return false;
    }
    name.chars().all(|c| c.is_ascii_alphanumeric())
}

fn parse_binding(spec: &str) -> Result<SmallVec<[RawBindingToken; 2]>, String> {
    let mut tokens: SmallVec<[RawBindingToken; 2]> = SmallVec::new();
    for part in spec.split('+') {
        let p = part.trim();
        if p.is_empty() {
            continue;
        }
        let token = parse_token(p)?;
        if tokens.contains(&token) {
            return Err(format!("Duplicate token in chord: {token:?}"));
        }
        tokens.push(token);
    }
    if tokens.is_empty() {
        return Err("Empty binding".into());
    }
    Ok(tokens)
}

fn parse_token(s: &str) -> Result<RawBindingToken, String> {
    if let Some(rest) = s.strip_prefix("Key:") {
        return parse_keycode(rest);
    }
    if let Some(rest) = s.strip_prefix("Mouse:") {
        return match rest {
            "Left" => Ok(RawBindingToken::MouseBtn(MouseButton::Left)),
            "Right" => Ok(RawBindingToken::MouseBtn(MouseButton::Right)),
            "Middle" => Ok(RawBindingToken::MouseBtn(MouseButton::Middle)),
            other => Err(format!("Unknown mouse button '{other}'")),
        };
    }
    if s == "MouseMove" {
        return Ok(RawBindingToken::MouseMove);
    }
    Err(format!("Unrecognized token '{s}'"))
}

fn parse_keycode(name: &str) -> Result<RawBindingToken, String> {
    use bevy::input::keyboard::KeyCode;
    let kc = match name {
        "Space" => KeyCode::Space,
        "Escape" => KeyCode::Escape,
        "ShiftLeft" => KeyCode::ShiftLeft,
        "ShiftRight" => KeyCode::ShiftRight,
        "ControlLeft" => KeyCode::ControlLeft,
        "W" | "KeyW" => KeyCode::KeyW,
        "A" | "KeyA" => KeyCode::KeyA,
        "S" | "KeyS" => KeyCode::KeyS,
        "D" | "KeyD" => KeyCode::KeyD,
        "E" | "KeyE" => KeyCode::KeyE,
        "F" | "KeyF" => KeyCode::KeyF,
        "R" | "KeyR" => KeyCode::KeyR,
        "Digit1" => KeyCode::Digit1,
        "Digit2" => KeyCode::Digit2,
        "F1" => KeyCode::F1,
        other => return Err(format!("Unsupported KeyCode '{other}' (extend parser)")),
    };
    Ok(RawBindingToken::Key(kc))
}

/// Built-in fallback used when input.toml is missing or unparseable, and by
/// headless tests. Mirrors the shipped assets/config/input.toml.
pub fn default_input_map() -> InputMap {
    let raw = r#"
        [actions]
        Move = { kind = "Axis2", description = "Planar locomotion" }
        Look = { kind = "Axis2", description = "Camera orbit" }
        Jump = { kind = "Binary" }
        Push = { kind = "Binary", description = "Attach/detach the energy cube" }
        Interact = { kind = "Binary" }
        Walk = { kind = "Axis1", description = "Walk modifier (>= 0.5 walks)" }
        Pause = { kind = "Binary" }

        [bindings]
        Jump = ["Key:Space"]
        Push = ["Key:F"]
        Interact = ["Key:E"]
        Walk = ["Key:ShiftLeft"]
        Pause = ["Key:Escape"]
        Look = ["MouseMove"]

        [[virtual_planes]]
        action = "Move"
        up = "Key:W"
        down = "Key:S"
        left = "Key:A"
        right = "Key:D"
    "#;
    let parsed = parse_input_toml(raw, false);
    debug_assert!(parsed.errors.is_empty(), "{:?}", parsed.errors);
    parsed.input_map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_map_declares_gameplay_actions() {
        let map = default_input_map();
        for name in ["Move", "Look", "Jump", "Push", "Interact", "Walk", "Pause"] {
            assert!(map.name_to_id.contains_key(name), "missing action {name}");
        }
        assert!(!map.bindings.is_empty());
        assert_eq!(map.virtual_planes.len(), 1);
    }

    #[test]
    fn unknown_binding_action_is_reported() {
        let parsed = parse_input_toml(
            "[actions]\nJump = { kind = \"Binary\" }\n[bindings]\nFly = [\"Key:Space\"]\n",
            false,
        );
        assert_eq!(parsed.errors.len(), 1);
        assert!(parsed.errors[0].contains("unknown action 'Fly'"));
    }

    #[test]
    fn bad_token_is_reported_not_fatal() {
        let parsed = parse_input_toml(
            "[actions]\nJump = { kind = \"Binary\" }\n[bindings]\nJump = [\"Key:Q\"]\n",
            false,
        );
        assert_eq!(parsed.errors.len(), 1);
        assert!(parsed.input_map.bindings.is_empty());
    }
}
