//! Dynamic property values and ordered property bags.

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use kurbo::{Point, Size, Vec2};

use crate::{ItemId, ToolId};

/// Event delivered to a [`Handler`].
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Pointer or key event routed to the active tool.
    Tool(crate::ToolEvent),
    /// A raster finished loading its source.
    Load { item: ItemId },
    /// A raster failed to load its source.
    Error { item: ItemId, message: String },
}

impl Event {
    /// Item the event concerns, if any.
    pub fn item(&self) -> Option<ItemId> {
        match self {
            Event::Tool(_) => None,
            Event::Load { item } | Event::Error { item, .. } => Some(*item),
        }
    }

    pub fn tool(&self) -> Option<ToolId> {
        match self {
            Event::Tool(event) => Some(event.tool),
            _ => None,
        }
    }
}

/// Shared callback stored in a property bag.
///
/// Two handlers are equal only when they are the same allocation, so
/// re-rendering with a fresh closure counts as a change.
#[derive(Clone)]
pub struct Handler(Rc<dyn Fn(&Event)>);

impl Handler {
    pub fn new(f: impl Fn(&Event) + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn call(&self, event: &Event) {
        (self.0)(event);
    }
}

impl PartialEq for Handler {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handler({:p})", Rc::as_ptr(&self.0).cast::<()>())
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<Value>),
    Map(IndexMap<String, Value>),
    Handler(Handler),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// JavaScript-style truthiness: `null`, `false`, `0`, `NaN` and `""` are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Text(s) => !s.is_empty(),
            Value::List(_) | Value::Map(_) | Value::Handler(_) => true,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_handler(&self) -> Option<&Handler> {
        match self {
            Value::Handler(handler) => Some(handler),
            _ => None,
        }
    }

    /// Reads a pair of numbers from `[a, b]` or from a map with the given keys.
    fn as_pair(&self, first: &str, second: &str) -> Option<(f64, f64)> {
        match self {
            Value::List(items) if items.len() == 2 => {
                Some((items[0].as_f64()?, items[1].as_f64()?))
            }
            Value::Map(map) => Some((map.get(first)?.as_f64()?, map.get(second)?.as_f64()?)),
            _ => None,
        }
    }

    /// `[x, y]` or `{x, y}`.
    pub fn as_point(&self) -> Option<Point> {
        self.as_pair("x", "y").map(|(x, y)| Point::new(x, y))
    }

    pub fn as_vec2(&self) -> Option<Vec2> {
        self.as_point().map(Point::to_vec2)
    }

    /// `[width, height]` or `{width, height}`.
    pub fn as_size(&self) -> Option<Size> {
        self.as_pair("width", "height")
            .map(|(width, height)| Size::new(width, height))
    }

    /// Short type description used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::Text(_) => "text",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Handler(_) => "handler",
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(f64::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Number(f64::from(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<[f64; 2]> for Value {
    fn from([a, b]: [f64; 2]) -> Self {
        Value::List(vec![Value::Number(a), Value::Number(b)])
    }
}

impl From<Point> for Value {
    fn from(point: Point) -> Self {
        Value::from([point.x, point.y])
    }
}

impl From<Size> for Value {
    fn from(size: Size) -> Self {
        Value::from([size.width, size.height])
    }
}

impl From<Handler> for Value {
    fn from(handler: Handler) -> Self {
        Value::Handler(handler)
    }
}

impl From<Props> for Value {
    fn from(props: Props) -> Self {
        Value::Map(props.0)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// Insertion-ordered property bag.
///
/// Iteration order is the order keys were first inserted; overwriting a key
/// keeps its original position.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Props(IndexMap<String, Value>);

impl Props {
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Removes a key without disturbing the order of the remaining ones.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.shift_remove(key)
    }

    /// Returns a copy without the listed keys.
    #[must_use]
    pub fn without(&self, keys: &[&str]) -> Self {
        Self(
            self.0
                .iter()
                .filter(|(key, _)| !keys.contains(&key.as_str()))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        )
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &IndexMap<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> IndexMap<String, Value> {
        self.0
    }
}

impl From<IndexMap<String, Value>> for Props {
    fn from(map: IndexMap<String, Value>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Props {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

impl<'a> IntoIterator for &'a Props {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
