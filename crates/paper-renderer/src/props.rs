//! Property application: turns a props bag into engine mutations.
//!
//! Geometry keys are deltas against the previously applied bag. `point` and
//! `center` translate, `radius`, `size` and `scaling` scale, and `rotation`
//! rotates by the difference. Everything else is a plain field write that is
//! skipped when the value did not change.

use paper_scene::kurbo::{Size, Vec2};
use paper_scene::{ItemKind, Props, Scope, Value};

use crate::{Instance, RendererError};

/// What a handler is applied to.
#[derive(Clone, Copy, Debug)]
pub struct Target<'a> {
    pub instance: Instance,
    pub ty: &'a str,
}

type PropHandler =
    fn(&mut Scope, Target<'_>, &str, &Value, Option<&Value>) -> Result<(), RendererError>;

/// Keys that are identity or structure, never drawable state.
const SKIPPED: &[&str] = &["id", "children"];

fn handler_for(key: &str) -> PropHandler {
    match key {
        "data" => apply_data,
        "active" => apply_active,
        "point" | "center" => apply_translation,
        "radius" => apply_radius,
        "rotation" => apply_rotation,
        "size" => apply_size,
        "scaling" => apply_scaling,
        "onLoad" => apply_on_load,
        _ => apply_field,
    }
}

/// Applies `props` onto `target`, using `previous` as the baseline for deltas.
///
/// Keys are visited in the bag's insertion order. Handlers never read each
/// other's effects.
pub fn apply_props(
    scope: &mut Scope,
    target: Target<'_>,
    props: &Props,
    previous: &Props,
) -> Result<(), RendererError> {
    for (key, value) in props.iter() {
        if SKIPPED.contains(&key) {
            continue;
        }
        let prior = previous.get(key);
        if prior == Some(value) {
            continue;
        }
        log::trace!("{}: apply `{key}` on {:?}", target.ty, target.instance);
        handler_for(key)(scope, target, key, value, prior)?;
    }
    Ok(())
}

fn apply_field(
    scope: &mut Scope,
    target: Target<'_>,
    key: &str,
    value: &Value,
    _previous: Option<&Value>,
) -> Result<(), RendererError> {
    match target.instance {
        Instance::View => scope.set_view_field(key, value.clone())?,
        Instance::Tool(id) => scope.set_tool_field(id, key, value.clone())?,
        Instance::Item(id) => scope.set_field(id, key, value.clone())?,
    }
    Ok(())
}

fn apply_data(
    scope: &mut Scope,
    target: Target<'_>,
    key: &str,
    value: &Value,
    _previous: Option<&Value>,
) -> Result<(), RendererError> {
    let Some(id) = target.instance.item() else {
        return Ok(());
    };
    let mut data = match value {
        Value::Null => Props::new(),
        Value::Map(map) => Props::from(map.clone()),
        other => {
            return Err(RendererError::invalid(
                key,
                format!("expected a map, got {}", other.kind_name()),
            ))
        }
    };
    data.insert("type", target.ty);
    scope.merge_data(id, data.as_map())?;
    Ok(())
}

fn apply_active(
    scope: &mut Scope,
    target: Target<'_>,
    _key: &str,
    value: &Value,
    _previous: Option<&Value>,
) -> Result<(), RendererError> {
    if !value.is_truthy() {
        return Ok(());
    }
    match target.instance {
        Instance::Tool(id) => scope.activate_tool(id)?,
        Instance::Item(id) if matches!(scope.item(id).map(|item| item.kind()), Some(ItemKind::Layer)) => {
            scope.activate_layer(id)?
        }
        _ => log::trace!("`active` ignored on {}", target.ty),
    }
    Ok(())
}

fn point_of(key: &str, value: &Value) -> Result<Vec2, RendererError> {
    value
        .as_vec2()
        .ok_or_else(|| RendererError::invalid(key, format!("expected a point, got {}", value.kind_name())))
}

fn apply_translation(
    scope: &mut Scope,
    target: Target<'_>,
    key: &str,
    value: &Value,
    previous: Option<&Value>,
) -> Result<(), RendererError> {
    let Some(id) = target.instance.item() else {
        return Ok(());
    };
    let previous = match previous {
        Some(previous) if !previous.is_null() => point_of(key, previous)?,
        _ => return Ok(()),
    };
    if value.is_null() {
        return Ok(());
    }
    let next = point_of(key, value)?;
    scope.translate(id, next - previous)?;
    Ok(())
}

fn number_of(key: &str, value: &Value) -> Result<f64, RendererError> {
    value
        .as_f64()
        .ok_or_else(|| RendererError::invalid(key, format!("expected a number, got {}", value.kind_name())))
}

fn apply_radius(
    scope: &mut Scope,
    target: Target<'_>,
    key: &str,
    value: &Value,
    previous: Option<&Value>,
) -> Result<(), RendererError> {
    let Some(id) = target.instance.item() else {
        return Ok(());
    };
    let next = number_of(key, value)?;
    let previous = match previous.filter(|value| !value.is_null()) {
        None => {
            return Err(RendererError::MissingBaseline {
                key: key.to_owned(),
                reason: "there is no previous value to scale from",
            })
        }
        Some(previous) => number_of(key, previous)?,
    };
    if previous == 0.0 {
        return Err(RendererError::MissingBaseline {
            key: key.to_owned(),
            reason: "the previous value is zero",
        });
    }
    let factor = next / previous;
    scope.scale(id, factor, factor)?;
    Ok(())
}

fn apply_rotation(
    scope: &mut Scope,
    target: Target<'_>,
    key: &str,
    value: &Value,
    previous: Option<&Value>,
) -> Result<(), RendererError> {
    let Some(id) = target.instance.item() else {
        return Ok(());
    };
    let next = if value.is_null() {
        None
    } else {
        Some(number_of(key, value)?)
    };
    let previous = previous.and_then(Value::as_f64);
    match (previous, next) {
        (Some(previous), Some(next)) if previous != 0.0 && next != 0.0 => {
            scope.rotate(id, next - previous)?
        }
        (_, next) => scope.set_rotation(id, next.unwrap_or(0.0))?,
    }
    Ok(())
}

fn size_of(key: &str, value: &Value) -> Result<Size, RendererError> {
    value
        .as_size()
        .ok_or_else(|| RendererError::invalid(key, format!("expected a size, got {}", value.kind_name())))
}

fn apply_size(
    scope: &mut Scope,
    target: Target<'_>,
    key: &str,
    value: &Value,
    previous: Option<&Value>,
) -> Result<(), RendererError> {
    let Some(id) = target.instance.item() else {
        return Ok(());
    };
    let next = size_of(key, value)?;
    let previous = match previous.filter(|value| !value.is_null()) {
        None => {
            return Err(RendererError::MissingBaseline {
                key: key.to_owned(),
                reason: "there is no previous size to scale from",
            })
        }
        Some(previous) => size_of(key, previous)?,
    };
    if previous.width == 0.0 || previous.height == 0.0 {
        return Err(RendererError::MissingBaseline {
            key: key.to_owned(),
            reason: "the previous size is empty",
        });
    }
    scope.scale(id, next.width / previous.width, next.height / previous.height)?;
    Ok(())
}

/// A uniform number or an `[sx, sy]` pair; absent means 1.
fn scaling_of(key: &str, value: Option<&Value>) -> Result<Vec2, RendererError> {
    match value {
        None | Some(Value::Null) => Ok(Vec2::new(1.0, 1.0)),
        Some(Value::Number(factor)) => Ok(Vec2::new(*factor, *factor)),
        Some(other) => other.as_vec2().ok_or_else(|| {
            RendererError::invalid(key, format!("expected a scale factor, got {}", other.kind_name()))
        }),
    }
}

fn apply_scaling(
    scope: &mut Scope,
    target: Target<'_>,
    key: &str,
    value: &Value,
    previous: Option<&Value>,
) -> Result<(), RendererError> {
    let Some(id) = target.instance.item() else {
        return Ok(());
    };
    let next = scaling_of(key, Some(value))?;
    if !scope.settings().apply_matrix {
        scope.set_scaling(id, next)?;
        return Ok(());
    }
    let previous = scaling_of(key, previous)?;
    if previous.x == 0.0 || previous.y == 0.0 {
        return Err(RendererError::MissingBaseline {
            key: key.to_owned(),
            reason: "the previous scaling is zero",
        });
    }
    scope.scale(id, next.x / previous.x, next.y / previous.y)?;
    Ok(())
}

/// A replaced `onLoad` on a raster subscribes to the next load; elsewhere it is a field.
fn apply_on_load(
    scope: &mut Scope,
    target: Target<'_>,
    key: &str,
    value: &Value,
    previous: Option<&Value>,
) -> Result<(), RendererError> {
    let raster = target
        .instance
        .item()
        .filter(|id| matches!(scope.item(*id).map(|item| item.kind()), Some(ItemKind::Raster(_))));
    match (raster, value.as_handler()) {
        (Some(id), Some(handler)) => {
            scope.on_load(id, handler.clone())?;
            Ok(())
        }
        (Some(_), None) => Ok(()),
        (None, _) => apply_field(scope, target, key, value, previous),
    }
}
