use std::fmt::Write as _;
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;
use kurbo::{Affine, Point, Rect, Size, Vec2};
use slotmap::{SecondaryMap, SlotMap};

use crate::geometry::{self, read_number, read_point, read_text, DEFAULT_FONT_SIZE};
use crate::item::{Body, RasterState};
use crate::{
    Event, Handler, Item, ItemId, ItemKind, Props, SceneError, Settings, SettingsPatch, ShapeKind,
    SymbolDefinition, SymbolId, Tool, ToolEvent, ToolEventKind, ToolId, Value, View,
};

static NEXT_SCOPE_ID: AtomicU64 = AtomicU64::new(1);

/// Keys the engine owns; config and field writes to them are ignored.
const READ_ONLY_KEYS: &[&str] = &["id", "className", "parent", "children"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ScopeId(u64);

/// Ordered layers of a scope. Insertion order is paint order.
#[derive(Clone, Debug, Default)]
pub struct Project {
    layers: Vec<ItemId>,
    active_layer: Option<ItemId>,
}

impl Project {
    pub fn layers(&self) -> &[ItemId] {
        &self.layers
    }

    pub fn active_layer(&self) -> Option<ItemId> {
        self.active_layer
    }
}

/// Asset fetch the host must perform for a raster.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadRequest {
    pub item: ItemId,
    pub source: String,
    token: u64,
}

/// Root context owning one project, one view and the scope's tools.
pub struct Scope {
    id: ScopeId,
    settings: Settings,
    bound: bool,
    items: SlotMap<ItemId, Item>,
    project: Project,
    view: View,
    tools: SlotMap<ToolId, Tool>,
    tool_order: Vec<ToolId>,
    active_tool: Option<ToolId>,
    last_pointer: Option<Point>,
    symbols: SlotMap<SymbolId, SymbolDefinition>,
    load_listeners: SecondaryMap<ItemId, Handler>,
    load_requests: Vec<LoadRequest>,
    next_load_token: u64,
    revision: u64,
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

impl Scope {
    /// Creates a scope whose project holds a single, active default layer.
    pub fn new() -> Self {
        let mut scope = Self {
            id: ScopeId(NEXT_SCOPE_ID.fetch_add(1, Ordering::Relaxed)),
            settings: Settings::default(),
            bound: false,
            items: SlotMap::with_key(),
            project: Project::default(),
            view: View::default(),
            tools: SlotMap::with_key(),
            tool_order: Vec::new(),
            active_tool: None,
            last_pointer: None,
            symbols: SlotMap::with_key(),
            load_listeners: SecondaryMap::new(),
            load_requests: Vec::new(),
            next_load_token: 1,
            revision: 0,
        };
        let layer = scope.items.insert(Item::new(ItemKind::Layer, Body::Container));
        scope.project.layers.push(layer);
        scope.project.active_layer = Some(layer);
        log::debug!("scope {:?} created", scope.id);
        scope
    }

    pub fn id(&self) -> ScopeId {
        self.id
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn apply_settings(&mut self, patch: &SettingsPatch) {
        patch.apply_to(&mut self.settings);
    }

    /// Binds the scope to a drawable surface of the given size.
    pub fn setup(&mut self, surface_size: Size) {
        self.bound = true;
        self.view.size = surface_size;
        self.bump();
        log::debug!("scope {:?} bound to {}x{} surface", self.id, surface_size.width, surface_size.height);
    }

    pub fn is_bound(&self) -> bool {
        self.bound
    }

    /// Monotonic counter bumped by every mutation of the scene.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn bump(&mut self) {
        self.revision += 1;
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    // ---- items ----

    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.get(id)
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.items.contains_key(id)
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    fn item_ref(&self, id: ItemId) -> Result<&Item, SceneError> {
        self.items.get(id).ok_or(SceneError::MissingItem(id))
    }

    fn item_mut(&mut self, id: ItemId) -> Result<&mut Item, SceneError> {
        self.items.get_mut(id).ok_or(SceneError::MissingItem(id))
    }

    /// Appends a new layer to the project and makes it the active one.
    pub fn create_layer(&mut self, config: &Props) -> Result<ItemId, SceneError> {
        let id = self.items.insert(Item::new(ItemKind::Layer, Body::Container));
        self.project.layers.push(id);
        self.project.active_layer = Some(id);
        self.bump();
        self.configure_or_discard(id, config, &[])?;
        Ok(id)
    }

    pub fn create_group(&mut self, config: &Props) -> Result<ItemId, SceneError> {
        self.insert_item(Item::new(ItemKind::Group, Body::Container), config, &[])
    }

    /// Builds a path item; `shape` selects the primitive constructor.
    pub fn create_path(
        &mut self,
        shape: Option<ShapeKind>,
        config: &Props,
    ) -> Result<ItemId, SceneError> {
        let path = match shape {
            None => geometry::path(config)?,
            Some(ShapeKind::Line) => geometry::line(config)?,
            Some(ShapeKind::Circle) => geometry::circle(config)?,
            Some(ShapeKind::Ellipse) => geometry::ellipse(config)?,
            Some(ShapeKind::Arc) => geometry::arc(config)?,
            Some(ShapeKind::Rectangle) => geometry::rectangle(config)?,
            Some(ShapeKind::RegularPolygon) => geometry::regular_polygon(config)?,
        };
        let consumed = geometry::consumed_keys(shape);
        self.insert_item(
            Item::new(ItemKind::Path(shape), Body::Path(path)),
            config,
            consumed,
        )
    }

    pub fn create_point_text(&mut self, config: &Props) -> Result<ItemId, SceneError> {
        let origin = read_point(config, "PointText", "point")?.unwrap_or(Point::ZERO);
        let content = read_text(config, "PointText", "content")?.unwrap_or_default();
        let font_size = read_number(config, "PointText", "fontSize")?.unwrap_or(DEFAULT_FONT_SIZE);
        let mut item = Item::new(
            ItemKind::PointText,
            Body::Placed {
                local: geometry::text_box(origin, &content, font_size),
                transform: Affine::IDENTITY,
            },
        );
        item.fields.insert("content", content);
        item.fields.insert("fontSize", font_size);
        self.insert_item(item, config, &["point", "content", "fontSize"])
    }

    /// Creates a raster and queues a load request when a source is given.
    pub fn create_raster(&mut self, config: &Props) -> Result<ItemId, SceneError> {
        let position = read_point(config, "Raster", "position")?.unwrap_or(Point::ZERO);
        let source = read_text(config, "Raster", "source")?;
        let item = Item::new(
            ItemKind::Raster(RasterState {
                source: None,
                token: 0,
                loaded: false,
            }),
            Body::Placed {
                local: Rect::from_center_size(position, Size::ZERO),
                transform: Affine::IDENTITY,
            },
        );
        let id = self.insert_item(item, config, &["position", "source"])?;
        if let Some(source) = source {
            self.request_load(id, source)?;
        }
        Ok(id)
    }

    pub fn create_symbol_item(
        &mut self,
        definition: SymbolId,
        config: &Props,
    ) -> Result<ItemId, SceneError> {
        let size = self
            .symbols
            .get(definition)
            .ok_or(SceneError::MissingSymbol(definition))?
            .size();
        let position = match read_point(config, "SymbolItem", "position")? {
            Some(position) => position,
            None => read_point(config, "SymbolItem", "center")?.unwrap_or(Point::ZERO),
        };
        let item = Item::new(
            ItemKind::SymbolItem(definition),
            Body::Placed {
                local: Rect::from_center_size(position, size),
                transform: Affine::IDENTITY,
            },
        );
        self.insert_item(item, config, &["position", "center"])
    }

    fn insert_item(
        &mut self,
        item: Item,
        config: &Props,
        consumed: &[&str],
    ) -> Result<ItemId, SceneError> {
        let id = self.items.insert(item);
        if self.settings.insert_items {
            if let Some(layer) = self.project.active_layer {
                self.attach(id, layer);
            }
        }
        self.bump();
        self.configure_or_discard(id, config, consumed)?;
        Ok(id)
    }

    /// A construction failure must not leave a half-built item behind.
    fn configure_or_discard(
        &mut self,
        id: ItemId,
        config: &Props,
        consumed: &[&str],
    ) -> Result<(), SceneError> {
        let result = config
            .iter()
            .filter(|(key, _)| !consumed.contains(key))
            .try_for_each(|(key, value)| self.set_field(id, key, value.clone()));
        if result.is_err() {
            self.remove(id);
        }
        result
    }

    /// Assigns every entry of `config` as a field, like a bulk `set`.
    pub fn configure(&mut self, id: ItemId, config: &Props) -> Result<(), SceneError> {
        self.item_ref(id)?;
        config
            .iter()
            .try_for_each(|(key, value)| self.set_field(id, key, value.clone()))
    }

    /// Writes one field. A few keys have engine semantics; the rest are stored.
    pub fn set_field(&mut self, id: ItemId, key: &str, value: Value) -> Result<(), SceneError> {
        if READ_ONLY_KEYS.contains(&key) {
            log::trace!("ignoring write to read-only `{key}` on {id:?}");
            return Ok(());
        }
        match key {
            "rotation" => {
                let degrees = value.as_f64().unwrap_or(0.0);
                return self.set_rotation(id, degrees);
            }
            "scaling" => {
                let scaling = match &value {
                    Value::Null => Vec2::new(1.0, 1.0),
                    Value::Number(factor) => Vec2::new(*factor, *factor),
                    other => match other.as_vec2() {
                        Some(scaling) => scaling,
                        None => {
                            return Err(SceneError::invalid(
                                self.item_ref(id)?.kind.class_name(),
                                key,
                                "expected a scale factor",
                            ))
                        }
                    },
                };
                return self.set_scaling(id, scaling);
            }
            "position" => {
                let Some(target) = value.as_point() else {
                    return Err(SceneError::invalid(
                        self.item_ref(id)?.kind.class_name(),
                        key,
                        "expected a point",
                    ));
                };
                let current = self.bounds(id)?.center();
                return self.translate(id, target - current);
            }
            "data" => {
                let data = match value {
                    Value::Map(map) => map,
                    Value::Null => IndexMap::new(),
                    other => {
                        return Err(SceneError::invalid(
                            self.item_ref(id)?.kind.class_name(),
                            key,
                            format!("expected a map, got {}", other.kind_name()),
                        ))
                    }
                };
                let item = self.item_mut(id)?;
                item.data = data;
                self.bump();
                return Ok(());
            }
            "source" if matches!(self.item_ref(id)?.kind, ItemKind::Raster(_)) => {
                let Some(source) = value.as_str() else {
                    return Err(SceneError::invalid("Raster", key, "expected text"));
                };
                let source = source.to_owned();
                self.item_mut(id)?.fields.insert(key, source.clone());
                return self.request_load(id, source);
            }
            _ => {}
        }

        let item = self.item_mut(id)?;
        if key == "name" {
            item.name = value.as_str().map(str::to_owned);
        }
        if matches!(item.kind, ItemKind::PointText) && (key == "content" || key == "fontSize") {
            item.fields.insert(key, value);
            relayout_text(item);
        } else {
            item.fields.insert(key, value);
        }
        self.bump();
        Ok(())
    }

    /// Shallow-merges `data` into the item's data bag.
    pub fn merge_data(
        &mut self,
        id: ItemId,
        data: &IndexMap<String, Value>,
    ) -> Result<(), SceneError> {
        let item = self.item_mut(id)?;
        for (key, value) in data {
            item.data.insert(key.clone(), value.clone());
        }
        self.bump();
        Ok(())
    }

    /// Bounds in project coordinates; empty containers report a zero rect.
    pub fn bounds(&self, id: ItemId) -> Result<Rect, SceneError> {
        self.item_ref(id)?;
        Ok(self.deep_bounds(id).unwrap_or(Rect::ZERO))
    }

    fn deep_bounds(&self, id: ItemId) -> Option<Rect> {
        let item = self.items.get(id)?;
        if let Some(bounds) = item.own_bounds() {
            return Some(bounds);
        }
        item.children
            .iter()
            .filter_map(|child| self.deep_bounds(*child))
            .reduce(|acc, rect| acc.union(rect))
    }

    fn transform_deep(&mut self, id: ItemId, affine: Affine) {
        let Some(item) = self.items.get_mut(id) else {
            return;
        };
        item.apply_affine(affine);
        let children = item.children.clone();
        for child in children {
            self.transform_deep(child, affine);
        }
    }

    fn transform_about_center(&mut self, id: ItemId, linear: Affine) -> Result<(), SceneError> {
        let center = self.bounds(id)?.center().to_vec2();
        let affine = Affine::translate(center) * linear * Affine::translate(-center);
        self.transform_deep(id, affine);
        self.bump();
        Ok(())
    }

    pub fn translate(&mut self, id: ItemId, delta: Vec2) -> Result<(), SceneError> {
        self.item_ref(id)?;
        self.transform_deep(id, Affine::translate(delta));
        self.bump();
        Ok(())
    }

    /// Scales about the item's bounds centre.
    pub fn scale(&mut self, id: ItemId, sx: f64, sy: f64) -> Result<(), SceneError> {
        self.transform_about_center(id, Affine::scale_non_uniform(sx, sy))
    }

    /// Rotates by `degrees` about the item's bounds centre.
    pub fn rotate(&mut self, id: ItemId, degrees: f64) -> Result<(), SceneError> {
        self.transform_about_center(id, Affine::rotate(degrees.to_radians()))?;
        self.item_mut(id)?.rotation += degrees;
        Ok(())
    }

    /// Sets the absolute rotation, rotating by the difference from the current one.
    pub fn set_rotation(&mut self, id: ItemId, degrees: f64) -> Result<(), SceneError> {
        let current = self.item_ref(id)?.rotation;
        let delta = degrees - current;
        if delta != 0.0 {
            self.transform_about_center(id, Affine::rotate(delta.to_radians()))?;
        }
        self.item_mut(id)?.rotation = degrees;
        self.bump();
        Ok(())
    }

    /// Sets the absolute scale factors, scaling by the ratio to the current ones.
    pub fn set_scaling(&mut self, id: ItemId, scaling: Vec2) -> Result<(), SceneError> {
        let item = self.item_ref(id)?;
        let current = item.scaling;
        if current.x == 0.0 || current.y == 0.0 {
            return Err(SceneError::invalid(
                item.kind.class_name(),
                "scaling",
                "cannot rescale from a zero scale",
            ));
        }
        if current != scaling {
            self.transform_about_center(
                id,
                Affine::scale_non_uniform(scaling.x / current.x, scaling.y / current.y),
            )?;
        }
        self.item_mut(id)?.scaling = scaling;
        Ok(())
    }

    fn is_ancestor(&self, ancestor: ItemId, mut id: ItemId) -> bool {
        loop {
            if id == ancestor {
                return true;
            }
            match self.items.get(id).and_then(|item| item.parent) {
                Some(parent) => id = parent,
                None => return false,
            }
        }
    }

    fn detach(&mut self, id: ItemId) {
        let parent = self.items.get_mut(id).and_then(|item| item.parent.take());
        match parent {
            Some(parent) => {
                if let Some(parent) = self.items.get_mut(parent) {
                    parent.children.retain(|child| *child != id);
                }
            }
            None => self.project.layers.retain(|layer| *layer != id),
        }
    }

    fn attach(&mut self, id: ItemId, parent: ItemId) {
        if let Some(item) = self.items.get_mut(id) {
            item.parent = Some(parent);
        }
        if let Some(parent) = self.items.get_mut(parent) {
            parent.children.push(id);
        }
    }

    /// Moves `child` to the end of `parent`'s children.
    pub fn add_to(&mut self, child: ItemId, parent: ItemId) -> Result<(), SceneError> {
        self.item_ref(child)?;
        if !self.item_ref(parent)?.kind.is_container() {
            return Err(SceneError::NotContainer(parent));
        }
        if self.is_ancestor(child, parent) {
            return Err(SceneError::Cycle { child, parent });
        }
        self.detach(child);
        self.attach(child, parent);
        self.refresh_active_layer();
        self.bump();
        Ok(())
    }

    /// Moves `child` so it paints immediately above `target`.
    pub fn insert_above(&mut self, child: ItemId, target: ItemId) -> Result<(), SceneError> {
        self.item_ref(child)?;
        if child == target {
            return Ok(());
        }
        let parent = self.item_ref(target)?.parent;
        match parent {
            Some(parent) => {
                if self.is_ancestor(child, parent) {
                    return Err(SceneError::Cycle { child, parent });
                }
                self.detach(child);
                let siblings = &mut self.items[parent].children;
                let index = siblings
                    .iter()
                    .position(|sibling| *sibling == target)
                    .ok_or(SceneError::Detached(target))?;
                siblings.insert(index + 1, child);
                self.items[child].parent = Some(parent);
            }
            None => {
                if !self.project.layers.contains(&target) {
                    return Err(SceneError::Detached(target));
                }
                if !matches!(self.items[child].kind, ItemKind::Layer) {
                    return Err(SceneError::NotLayer(child));
                }
                self.detach(child);
                let index = self
                    .project
                    .layers
                    .iter()
                    .position(|layer| *layer == target)
                    .ok_or(SceneError::Detached(target))?;
                self.project.layers.insert(index + 1, child);
            }
        }
        self.refresh_active_layer();
        self.bump();
        Ok(())
    }

    /// Removes an item and its whole subtree. Returns `false` if it was already gone.
    pub fn remove(&mut self, id: ItemId) -> bool {
        if !self.items.contains_key(id) {
            return false;
        }
        self.detach(id);
        self.discard(id);
        self.refresh_active_layer();
        self.bump();
        true
    }

    fn discard(&mut self, id: ItemId) {
        if let Some(item) = self.items.remove(id) {
            self.load_listeners.remove(id);
            for child in item.children {
                self.discard(child);
            }
        }
    }

    /// Keeps the active layer pointing at a layer that is still in the project.
    fn refresh_active_layer(&mut self) {
        let still_valid = self
            .project
            .active_layer
            .is_some_and(|layer| self.project.layers.contains(&layer));
        if !still_valid {
            self.project.active_layer = self.project.layers.last().copied();
        }
    }

    /// Makes `id` the project's only active layer.
    pub fn activate_layer(&mut self, id: ItemId) -> Result<(), SceneError> {
        if !matches!(self.item_ref(id)?.kind, ItemKind::Layer) {
            return Err(SceneError::NotLayer(id));
        }
        self.project.active_layer = Some(id);
        self.bump();
        Ok(())
    }

    // ---- tools ----

    /// Creates a tool; the first tool of a scope becomes active.
    pub fn create_tool(&mut self) -> ToolId {
        let id = self.tools.insert(Tool::default());
        self.tool_order.push(id);
        if self.active_tool.is_none() {
            self.active_tool = Some(id);
        }
        self.bump();
        id
    }

    pub fn tool(&self, id: ToolId) -> Option<&Tool> {
        self.tools.get(id)
    }

    pub fn tools(&self) -> &[ToolId] {
        &self.tool_order
    }

    pub fn active_tool(&self) -> Option<ToolId> {
        self.active_tool
    }

    /// Activates `id`, deactivating every other tool of the scope.
    pub fn activate_tool(&mut self, id: ToolId) -> Result<(), SceneError> {
        if !self.tools.contains_key(id) {
            return Err(SceneError::MissingTool(id));
        }
        self.active_tool = Some(id);
        self.bump();
        Ok(())
    }

    pub fn set_tool_field(&mut self, id: ToolId, key: &str, value: Value) -> Result<(), SceneError> {
        let tool = self.tools.get_mut(id).ok_or(SceneError::MissingTool(id))?;
        tool.fields.insert(key, value);
        self.bump();
        Ok(())
    }

    pub fn remove_tool(&mut self, id: ToolId) -> bool {
        if self.tools.remove(id).is_none() {
            return false;
        }
        self.tool_order.retain(|tool| *tool != id);
        if self.active_tool == Some(id) {
            self.active_tool = None;
        }
        self.bump();
        true
    }

    /// Routes an input event to the active tool's handler. Returns whether a handler ran.
    pub fn dispatch_tool_event(
        &mut self,
        kind: ToolEventKind,
        point: Point,
        key: Option<&str>,
    ) -> bool {
        let delta = match kind {
            ToolEventKind::KeyDown | ToolEventKind::KeyUp => Vec2::ZERO,
            _ => {
                let previous = self.last_pointer.replace(point).unwrap_or(point);
                point - previous
            }
        };
        let Some(tool_id) = self.active_tool else {
            return false;
        };
        let handler = self
            .tools
            .get(tool_id)
            .and_then(|tool| tool.fields.get(kind.handler_name()))
            .and_then(Value::as_handler)
            .cloned();
        let Some(handler) = handler else {
            return false;
        };
        handler.call(&Event::Tool(ToolEvent {
            tool: tool_id,
            kind,
            point,
            delta,
            key: key.map(str::to_owned),
        }));
        true
    }

    // ---- view ----

    pub fn set_view_size(&mut self, size: Size) {
        self.view.size = size;
        self.bump();
    }

    pub fn translate_view(&mut self, delta: Vec2) {
        self.view.translate(delta);
        self.bump();
    }

    pub fn scale_view(&mut self, sx: f64, sy: f64) {
        self.view.scale_about_center(sx, sy);
        self.bump();
    }

    /// Writes a view field; `zoom` rescales the view about its centre.
    pub fn set_view_field(&mut self, key: &str, value: Value) -> Result<(), SceneError> {
        if key == "zoom" {
            let zoom = value
                .as_f64()
                .filter(|zoom| *zoom > 0.0)
                .ok_or_else(|| SceneError::invalid("View", key, "expected a positive number"))?;
            let factor = zoom / self.view.zoom;
            self.view.scale_about_center(factor, factor);
            self.view.zoom = zoom;
        }
        self.view.fields.insert(key, value);
        self.bump();
        Ok(())
    }

    // ---- symbols ----

    pub fn define_symbol(&mut self, svg: &str) -> SymbolId {
        self.symbols.insert(SymbolDefinition::from_svg(svg))
    }

    pub fn symbol(&self, id: SymbolId) -> Option<&SymbolDefinition> {
        self.symbols.get(id)
    }

    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    // ---- raster loading ----

    fn request_load(&mut self, id: ItemId, source: String) -> Result<(), SceneError> {
        let token = self.next_load_token;
        self.next_load_token += 1;
        let item = self.item_mut(id)?;
        let ItemKind::Raster(state) = &mut item.kind else {
            return Ok(());
        };
        state.source = Some(source.clone());
        state.token = token;
        state.loaded = false;
        log::debug!("queued load of `{source}` for {id:?}");
        self.load_requests.push(LoadRequest {
            item: id,
            source,
            token,
        });
        Ok(())
    }

    /// Subscribes a one-shot listener to the raster's next successful load,
    /// replacing any listener still waiting.
    pub fn on_load(&mut self, id: ItemId, handler: Handler) -> Result<(), SceneError> {
        if !matches!(self.item_ref(id)?.kind, ItemKind::Raster(_)) {
            return Err(SceneError::invalid(
                self.items[id].kind.class_name(),
                "onLoad",
                "only rasters load assets",
            ));
        }
        self.load_listeners.insert(id, handler);
        Ok(())
    }

    /// Drains the loads the host still has to perform.
    pub fn take_load_requests(&mut self) -> Vec<LoadRequest> {
        std::mem::take(&mut self.load_requests)
    }

    pub fn pending_load_count(&self) -> usize {
        self.load_requests.len()
    }

    /// Completes a load. Stale requests (removed item, replaced source) are ignored
    /// and return `false`.
    pub fn complete_load(&mut self, request: &LoadRequest, outcome: Result<Size, String>) -> bool {
        let Some(item) = self.items.get_mut(request.item) else {
            log::debug!("dropping load of `{}`: item is gone", request.source);
            return false;
        };
        let ItemKind::Raster(state) = &mut item.kind else {
            return false;
        };
        if state.token != request.token {
            log::debug!("dropping load of `{}`: source changed", request.source);
            return false;
        }
        let event = match outcome {
            Ok(size) => {
                state.loaded = true;
                if let Body::Placed { local, .. } = &mut item.body {
                    *local = Rect::from_center_size(local.center(), size);
                }
                Event::Load { item: request.item }
            }
            Err(message) => {
                log::warn!("load of `{}` failed: {message}", request.source);
                Event::Error {
                    item: request.item,
                    message,
                }
            }
        };
        let field = match event {
            Event::Load { .. } => "onLoad",
            _ => "onError",
        };
        let mut handlers: Vec<Handler> = item
            .fields
            .get(field)
            .and_then(Value::as_handler)
            .cloned()
            .into_iter()
            .collect();
        if matches!(event, Event::Load { .. }) {
            handlers.extend(self.load_listeners.remove(request.item));
        }
        self.bump();
        for handler in handlers {
            handler.call(&event);
        }
        true
    }

    // ---- debugging ----

    /// Indented text rendering of the project, one line per item.
    pub fn dump_tree(&self) -> String {
        let mut output = String::new();
        let _ = writeln!(output, "Project ({} layers)", self.project.layers.len());
        for layer in &self.project.layers {
            self.dump_item(&mut output, *layer, 1);
        }
        for tool in &self.tool_order {
            let marker = if self.active_tool == Some(*tool) { " (active)" } else { "" };
            let _ = writeln!(output, "  Tool {tool:?}{marker}");
        }
        output
    }

    fn dump_item(&self, output: &mut String, id: ItemId, depth: usize) {
        let indent = "  ".repeat(depth);
        let Some(item) = self.items.get(id) else {
            let _ = writeln!(output, "{indent}{id:?} (missing)");
            return;
        };
        let shape = match item.kind {
            ItemKind::Path(Some(shape)) => format!(" ({})", shape.name()),
            _ => String::new(),
        };
        let name = item
            .name
            .as_deref()
            .map(|name| format!(" \"{name}\""))
            .unwrap_or_default();
        let bounds = self.deep_bounds(id).unwrap_or(Rect::ZERO);
        let _ = writeln!(
            output,
            "{indent}{}{shape}{name} [{:.1}, {:.1}, {:.1}, {:.1}]",
            item.kind.class_name(),
            bounds.x0,
            bounds.y0,
            bounds.x1,
            bounds.y1
        );
        for child in &item.children {
            self.dump_item(output, *child, depth + 1);
        }
    }
}

fn relayout_text(item: &mut Item) {
    let content = item
        .fields
        .get("content")
        .and_then(|value| match value {
            Value::Text(text) => Some(text.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .unwrap_or_default();
    let font_size = item
        .fields
        .get("fontSize")
        .and_then(Value::as_f64)
        .unwrap_or(DEFAULT_FONT_SIZE);
    if let Body::Placed { local, .. } = &mut item.body {
        let origin = Point::new(local.x0, local.y1);
        *local = geometry::text_box(origin, &content, font_size);
    }
}
