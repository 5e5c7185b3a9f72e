use hashbrown::HashMap;
use paper_scene::{ItemId, Props, Scope, ShapeKind, Value};

use crate::{Instance, ItemType, RendererError, SymbolCache};

/// Renderer state a kind may touch while constructing an instance.
pub struct BuildContext<'a> {
    pub scope: &'a mut Scope,
    pub symbols: &'a mut SymbolCache,
    pub(crate) first_layer: &'a mut FirstLayer,
}

/// Tracks the layer the engine creates with every project.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum FirstLayer {
    #[default]
    Pending,
    Reused(ItemId),
    Mounted,
}

/// One element kind: how to build its engine object.
pub trait NodeKind {
    fn construct(
        &self,
        cx: &mut BuildContext<'_>,
        tag: &str,
        props: &Props,
    ) -> Result<Instance, RendererError>;

    /// Whether the whole props bag is applied once children are attached.
    fn applies_props_on_finalize(&self) -> bool {
        false
    }
}

/// Lookup table from element tag to kind.
pub struct KindRegistry {
    kinds: HashMap<String, Box<dyn NodeKind>>,
}

impl Default for KindRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        for ty in ItemType::ALL {
            registry.kinds.insert(ty.as_str().to_owned(), builtin(ty));
        }
        registry
    }
}

impl KindRegistry {
    pub fn empty() -> Self {
        Self {
            kinds: HashMap::new(),
        }
    }

    /// Registers `kind` under `tag`, returning the kind it replaced.
    pub fn register(
        &mut self,
        tag: impl Into<String>,
        kind: impl NodeKind + 'static,
    ) -> Option<Box<dyn NodeKind>> {
        self.kinds.insert(tag.into(), Box::new(kind))
    }

    pub fn get(&self, tag: &str) -> Option<&dyn NodeKind> {
        self.kinds.get(tag).map(|kind| kind.as_ref())
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.kinds.contains_key(tag)
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.kinds.keys().map(String::as_str)
    }
}

fn builtin(ty: ItemType) -> Box<dyn NodeKind> {
    match ty {
        ItemType::View => Box::new(ViewKind),
        ItemType::Tool => Box::new(ToolKind),
        ItemType::Layer => Box::new(LayerKind),
        ItemType::Group => Box::new(GroupKind),
        ItemType::PointText => Box::new(PointTextKind),
        ItemType::Raster => Box::new(RasterKind),
        ItemType::SymbolItem => Box::new(SymbolItemKind),
        ItemType::Path
        | ItemType::Line
        | ItemType::Circle
        | ItemType::Ellipse
        | ItemType::Arc
        | ItemType::Rectangle
        | ItemType::RegularPolygon => Box::new(PathKind(ty.path_shape().flatten())),
    }
}

struct ViewKind;

impl NodeKind for ViewKind {
    fn construct(
        &self,
        _cx: &mut BuildContext<'_>,
        _tag: &str,
        _props: &Props,
    ) -> Result<Instance, RendererError> {
        Ok(Instance::View)
    }

    fn applies_props_on_finalize(&self) -> bool {
        true
    }
}

struct ToolKind;

impl NodeKind for ToolKind {
    fn construct(
        &self,
        cx: &mut BuildContext<'_>,
        _tag: &str,
        _props: &Props,
    ) -> Result<Instance, RendererError> {
        Ok(Instance::Tool(cx.scope.create_tool()))
    }

    fn applies_props_on_finalize(&self) -> bool {
        true
    }
}

/// The first layer reuses the project's default layer instead of adding a second one.
/// Its props, like every container's, are applied once its children are attached.
struct LayerKind;

impl NodeKind for LayerKind {
    fn construct(
        &self,
        cx: &mut BuildContext<'_>,
        _tag: &str,
        _props: &Props,
    ) -> Result<Instance, RendererError> {
        let default_layer = cx.scope.project().layers().first().copied();
        match (*cx.first_layer, default_layer) {
            (FirstLayer::Pending, Some(layer)) => {
                *cx.first_layer = FirstLayer::Reused(layer);
                log::debug!("reusing default layer {layer:?}");
                Ok(Instance::Item(layer))
            }
            _ => {
                let layer = cx.scope.create_layer(&Props::new())?;
                if *cx.first_layer == FirstLayer::Pending {
                    *cx.first_layer = FirstLayer::Mounted;
                }
                Ok(Instance::Item(layer))
            }
        }
    }

    fn applies_props_on_finalize(&self) -> bool {
        true
    }
}

struct GroupKind;

impl NodeKind for GroupKind {
    fn construct(
        &self,
        cx: &mut BuildContext<'_>,
        _tag: &str,
        _props: &Props,
    ) -> Result<Instance, RendererError> {
        Ok(Instance::Item(cx.scope.create_group(&Props::new())?))
    }

    fn applies_props_on_finalize(&self) -> bool {
        true
    }
}

struct PathKind(Option<ShapeKind>);

impl NodeKind for PathKind {
    fn construct(
        &self,
        cx: &mut BuildContext<'_>,
        _tag: &str,
        props: &Props,
    ) -> Result<Instance, RendererError> {
        Ok(Instance::Item(cx.scope.create_path(self.0, props)?))
    }
}

struct PointTextKind;

impl NodeKind for PointTextKind {
    fn construct(
        &self,
        cx: &mut BuildContext<'_>,
        _tag: &str,
        props: &Props,
    ) -> Result<Instance, RendererError> {
        Ok(Instance::Item(cx.scope.create_point_text(props)?))
    }
}

/// `onLoad` is not a constructor argument; it is subscribed to the load event.
struct RasterKind;

impl NodeKind for RasterKind {
    fn construct(
        &self,
        cx: &mut BuildContext<'_>,
        _tag: &str,
        props: &Props,
    ) -> Result<Instance, RendererError> {
        let on_load = props.get("onLoad").and_then(Value::as_handler).cloned();
        let raster = cx.scope.create_raster(&props.without(&["onLoad"]))?;
        if let Some(handler) = on_load {
            cx.scope.on_load(raster, handler)?;
        }
        Ok(Instance::Item(raster))
    }
}

struct SymbolItemKind;

impl NodeKind for SymbolItemKind {
    fn construct(
        &self,
        cx: &mut BuildContext<'_>,
        _tag: &str,
        props: &Props,
    ) -> Result<Instance, RendererError> {
        let key = ["id", "name"]
            .into_iter()
            .filter_map(|key| props.get(key))
            .find_map(|value| match value {
                Value::Text(text) if !text.is_empty() => Some(text.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .ok_or(RendererError::MissingSymbolKey)?;
        let svg = props
            .get("svg")
            .and_then(Value::as_str)
            .filter(|svg| !svg.is_empty())
            .ok_or_else(|| RendererError::MissingSymbolSource(key.clone()))?;
        let definition = cx.symbols.resolve(cx.scope, &key, svg);
        let item = cx
            .scope
            .create_symbol_item(definition, &props.without(&["id", "svg"]))?;
        Ok(Instance::Item(item))
    }
}
