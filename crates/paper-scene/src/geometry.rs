//! Config readers and path builders for the primitive shapes.

use std::f64::consts::{FRAC_PI_2, TAU};

use kurbo::{Arc, BezPath, Circle, Ellipse, Point, Rect, RoundedRect, Shape, Size, Vec2};

use crate::{Props, SceneError, ShapeKind, Value};

/// Flattening tolerance used when shapes are converted to paths.
pub(crate) const TOLERANCE: f64 = 0.01;

pub(crate) const DEFAULT_FONT_SIZE: f64 = 10.0;

/// Rough advance width of one glyph, relative to the font size.
const GLYPH_ADVANCE: f64 = 0.6;

const MAX_POLYGON_SIDES: f64 = 4096.0;

fn present<'a>(config: &'a Props, key: &str) -> Option<&'a Value> {
    config.get(key).filter(|value| !value.is_null())
}

pub(crate) fn read_point(
    config: &Props,
    kind: &'static str,
    key: &str,
) -> Result<Option<Point>, SceneError> {
    present(config, key)
        .map(|value| {
            value.as_point().ok_or_else(|| {
                SceneError::invalid(kind, key, format!("expected a point, got {}", value.kind_name()))
            })
        })
        .transpose()
}

pub(crate) fn read_size(
    config: &Props,
    kind: &'static str,
    key: &str,
) -> Result<Option<Size>, SceneError> {
    present(config, key)
        .map(|value| {
            value.as_size().ok_or_else(|| {
                SceneError::invalid(kind, key, format!("expected a size, got {}", value.kind_name()))
            })
        })
        .transpose()
}

pub(crate) fn read_number(
    config: &Props,
    kind: &'static str,
    key: &str,
) -> Result<Option<f64>, SceneError> {
    present(config, key)
        .map(|value| {
            value.as_f64().ok_or_else(|| {
                SceneError::invalid(kind, key, format!("expected a number, got {}", value.kind_name()))
            })
        })
        .transpose()
}

pub(crate) fn read_text(
    config: &Props,
    kind: &'static str,
    key: &str,
) -> Result<Option<String>, SceneError> {
    present(config, key)
        .map(|value| match value {
            Value::Text(text) => Ok(text.clone()),
            Value::Number(n) => Ok(n.to_string()),
            other => Err(SceneError::invalid(
                kind,
                key,
                format!("expected text, got {}", other.kind_name()),
            )),
        })
        .transpose()
}

/// Either a single radius or an `[rx, ry]` pair.
fn read_radii(config: &Props, kind: &'static str, key: &str) -> Result<Option<Vec2>, SceneError> {
    match present(config, key) {
        None => Ok(None),
        Some(Value::Number(r)) => Ok(Some(Vec2::new(*r, *r))),
        Some(value) => value.as_vec2().map(Some).ok_or_else(|| {
            SceneError::invalid(kind, key, format!("expected a radius, got {}", value.kind_name()))
        }),
    }
}

pub(crate) fn path(config: &Props) -> Result<BezPath, SceneError> {
    let mut path = BezPath::new();
    if let Some(segments) = present(config, "segments") {
        let segments = segments.as_list().ok_or_else(|| {
            SceneError::invalid("Path", "segments", "expected a list of points")
        })?;
        for (index, segment) in segments.iter().enumerate() {
            let point = segment.as_point().ok_or_else(|| {
                SceneError::invalid("Path", "segments", format!("segment {index} is not a point"))
            })?;
            if index == 0 {
                path.move_to(point);
            } else {
                path.line_to(point);
            }
        }
    }
    let closed = present(config, "closed").is_some_and(Value::is_truthy);
    if closed && !path.elements().is_empty() {
        path.close_path();
    }
    Ok(path)
}

pub(crate) fn line(config: &Props) -> Result<BezPath, SceneError> {
    let from = read_point(config, "Line", "from")?.unwrap_or(Point::ZERO);
    let to = read_point(config, "Line", "to")?.unwrap_or(from);
    let mut path = BezPath::new();
    path.move_to(from);
    path.line_to(to);
    Ok(path)
}

pub(crate) fn circle(config: &Props) -> Result<BezPath, SceneError> {
    let center = read_point(config, "Circle", "center")?.unwrap_or(Point::ZERO);
    let radius = read_number(config, "Circle", "radius")?.unwrap_or(0.0);
    Ok(Circle::new(center, radius).to_path(TOLERANCE))
}

pub(crate) fn ellipse(config: &Props) -> Result<BezPath, SceneError> {
    let center = read_point(config, "Ellipse", "center")?;
    let point = read_point(config, "Ellipse", "point")?;
    let size = read_size(config, "Ellipse", "size")?;
    let radii = read_radii(config, "Ellipse", "radius")?;
    let ellipse = match (center, point, size, radii) {
        (Some(center), _, _, Some(radii)) => Ellipse::new(center, radii, 0.0),
        (Some(center), _, Some(size), None) => {
            Ellipse::from_rect(Rect::from_center_size(center, size))
        }
        (None, Some(point), Some(size), _) => Ellipse::from_rect(Rect::from_origin_size(point, size)),
        (center, _, _, _) => Ellipse::new(center.unwrap_or(Point::ZERO), Vec2::ZERO, 0.0),
    };
    Ok(ellipse.to_path(TOLERANCE))
}

/// Circular arc passing through `from`, `through` and `to`.
pub(crate) fn arc(config: &Props) -> Result<BezPath, SceneError> {
    let from = read_point(config, "Arc", "from")?.unwrap_or(Point::ZERO);
    let through = read_point(config, "Arc", "through")?.unwrap_or(from);
    let to = read_point(config, "Arc", "to")?.unwrap_or(through);

    let Some(center) = circumcenter(from, through, to) else {
        let mut path = BezPath::new();
        path.move_to(from);
        if through != from && through != to {
            path.line_to(through);
        }
        path.line_to(to);
        return Ok(path);
    };

    let radius = (from - center).hypot();
    let angle = |p: Point| (p - center).atan2();
    let start = angle(from);
    let normalize = |a: f64| a.rem_euclid(TAU);
    let to_end = normalize(angle(to) - start);
    let to_through = normalize(angle(through) - start);
    let sweep = if to_through <= to_end {
        to_end
    } else {
        to_end - TAU
    };
    let arc = Arc {
        center,
        radii: Vec2::new(radius, radius),
        start_angle: start,
        sweep_angle: sweep,
        x_rotation: 0.0,
    };
    Ok(arc.to_path(TOLERANCE))
}

fn circumcenter(a: Point, b: Point, c: Point) -> Option<Point> {
    let d = 2.0 * (a.x * (b.y - c.y) + b.x * (c.y - a.y) + c.x * (a.y - b.y));
    if d.abs() < 1e-9 {
        return None;
    }
    let a2 = a.to_vec2().hypot2();
    let b2 = b.to_vec2().hypot2();
    let c2 = c.to_vec2().hypot2();
    let x = (a2 * (b.y - c.y) + b2 * (c.y - a.y) + c2 * (a.y - b.y)) / d;
    let y = (a2 * (c.x - b.x) + b2 * (a.x - c.x) + c2 * (b.x - a.x)) / d;
    Some(Point::new(x, y))
}

pub(crate) fn rectangle(config: &Props) -> Result<BezPath, SceneError> {
    let size = read_size(config, "Rectangle", "size")?;
    let rect = if let (Some(from), Some(to)) = (
        read_point(config, "Rectangle", "from")?,
        read_point(config, "Rectangle", "to")?,
    ) {
        Rect::from_points(from, to)
    } else if let (Some(center), Some(size)) = (read_point(config, "Rectangle", "center")?, size) {
        Rect::from_center_size(center, size)
    } else {
        let point = read_point(config, "Rectangle", "point")?.unwrap_or(Point::ZERO);
        Rect::from_origin_size(point, size.unwrap_or(Size::ZERO))
    };
    let corner = read_radii(config, "Rectangle", "radius")?;
    Ok(match corner {
        Some(radii) if radii.x > 0.0 || radii.y > 0.0 => {
            RoundedRect::from_rect(rect, radii.x.max(radii.y)).to_path(TOLERANCE)
        }
        _ => rect.to_path(TOLERANCE),
    })
}

pub(crate) fn regular_polygon(config: &Props) -> Result<BezPath, SceneError> {
    let center = read_point(config, "RegularPolygon", "center")?.unwrap_or(Point::ZERO);
    let radius = read_number(config, "RegularPolygon", "radius")?.unwrap_or(0.0);
    let sides = read_number(config, "RegularPolygon", "sides")?.unwrap_or(3.0);
    if !(3.0..=MAX_POLYGON_SIDES).contains(&sides) || sides.fract() != 0.0 {
        return Err(SceneError::invalid(
            "RegularPolygon",
            "sides",
            format!("expected a whole number from 3 to {MAX_POLYGON_SIDES}, got {sides}"),
        ));
    }
    let count = sides as usize;
    let step = TAU / sides;
    let mut path = BezPath::new();
    for index in 0..count {
        let theta = -FRAC_PI_2 + step * index as f64;
        let vertex = center + Vec2::from_angle(theta) * radius;
        if index == 0 {
            path.move_to(vertex);
        } else {
            path.line_to(vertex);
        }
    }
    path.close_path();
    Ok(path)
}

/// Local box of a text run whose baseline starts at `origin`.
pub(crate) fn text_box(origin: Point, content: &str, font_size: f64) -> Rect {
    let width = content.chars().count() as f64 * font_size * GLYPH_ADVANCE;
    Rect::new(origin.x, origin.y - font_size, origin.x + width, origin.y)
}

/// Reads a `width="…"` or `height="…"` attribute from the root of an SVG document.
pub(crate) fn svg_dimension(svg: &str, attribute: &str) -> Option<f64> {
    let root = svg.find("<svg").map(|start| &svg[start..])?;
    let root = &root[..root.find('>')?];
    let needle = format!(" {attribute}=");
    let rest = &root[root.find(&needle)? + needle.len()..];
    let quote = rest.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let rest = &rest[1..];
    let raw = &rest[..rest.find(quote)?];
    raw.trim_end_matches("px").trim().parse().ok()
}

/// Config keys a path constructor turns into geometry.
pub(crate) fn consumed_keys(shape: Option<ShapeKind>) -> &'static [&'static str] {
    match shape {
        None => &["segments", "closed"],
        Some(ShapeKind::Line) => &["from", "to"],
        Some(ShapeKind::Circle) => &["center", "radius"],
        Some(ShapeKind::Ellipse) => &["center", "point", "size", "radius"],
        Some(ShapeKind::Arc) => &["from", "through", "to"],
        Some(ShapeKind::Rectangle) => &["point", "center", "size", "from", "to", "radius"],
        Some(ShapeKind::RegularPolygon) => &["center", "sides", "radius"],
    }
}
