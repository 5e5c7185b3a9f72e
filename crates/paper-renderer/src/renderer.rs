use std::convert::Infallible;

use hashbrown::HashMap;
use paper_reconciler::{HostConfig, HostNode};
use paper_scene::{ItemKind, Props, Scope};

use crate::kinds::{BuildContext, FirstLayer};
use crate::props::{apply_props, Target};
use crate::{Instance, KindRegistry, RendererError, SymbolCache};

type Node = HostNode<Instance, Infallible>;

fn instance_of(node: &Node) -> Instance {
    match node {
        HostNode::Instance(instance) => *instance,
        HostNode::Text(never) => match *never {},
    }
}

/// What the renderer remembers about a live instance.
#[derive(Clone, Debug)]
struct Record {
    ty: String,
    props: Props,
}

/// Host config that maps element operations onto one [`Scope`].
///
/// A renderer belongs to a single scope for that scope's whole lifetime; it
/// holds the symbol cache, the first-layer flag and the last props applied to
/// every instance.
pub struct PaperRenderer {
    kinds: KindRegistry,
    symbols: SymbolCache,
    first_layer: FirstLayer,
    records: HashMap<Instance, Record>,
}

impl Default for PaperRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl PaperRenderer {
    pub fn new() -> Self {
        Self::with_kinds(KindRegistry::default())
    }

    pub fn with_kinds(kinds: KindRegistry) -> Self {
        Self {
            kinds,
            symbols: SymbolCache::new(),
            first_layer: FirstLayer::default(),
            records: HashMap::new(),
        }
    }

    pub fn kinds(&self) -> &KindRegistry {
        &self.kinds
    }

    pub fn kinds_mut(&mut self) -> &mut KindRegistry {
        &mut self.kinds
    }

    pub fn symbol_cache(&self) -> &SymbolCache {
        &self.symbols
    }

    /// Whether the project's default layer has been claimed by a `Layer` element.
    pub fn layer_mounted(&self) -> bool {
        self.first_layer != FirstLayer::Pending
    }

    /// Tag the instance was created with.
    pub fn instance_type(&self, instance: &Instance) -> Option<&str> {
        self.records.get(instance).map(|record| record.ty.as_str())
    }

    /// Props most recently applied to the instance.
    pub fn last_props(&self, instance: &Instance) -> Option<&Props> {
        self.records.get(instance).map(|record| &record.props)
    }

    pub fn instance_count(&self) -> usize {
        self.records.len()
    }

    fn record_props(&mut self, instance: Instance, props: &Props) {
        if let Some(record) = self.records.get_mut(&instance) {
            record.props = props.clone();
        }
    }

    fn destroy(&mut self, scope: &mut Scope, instance: Instance) {
        match instance {
            Instance::Item(id) => {
                if !scope.remove(id) {
                    log::trace!("{id:?} was already removed with its parent");
                }
            }
            Instance::Tool(id) => {
                scope.remove_tool(id);
            }
            Instance::View => log::trace!("the view has no remove capability"),
        }
    }
}

impl HostConfig for PaperRenderer {
    type Type = String;
    type Props = Props;
    type Container = Scope;
    type Instance = Instance;
    type TextInstance = Infallible;
    type PublicInstance = Instance;
    type HostContext = ();
    type Error = RendererError;

    fn get_root_host_context(&self, _scope: &Scope) {}

    fn get_child_host_context(&self, _parent: &(), _ty: &String) {}

    fn create_instance(
        &mut self,
        ty: &String,
        props: &Props,
        scope: &mut Scope,
        _context: &(),
    ) -> Result<Instance, RendererError> {
        let kind = self
            .kinds
            .get(ty)
            .ok_or_else(|| RendererError::UnsupportedType(ty.clone()))?;
        let props = props.without(&["children"]);
        let mut cx = BuildContext {
            scope: &mut *scope,
            symbols: &mut self.symbols,
            first_layer: &mut self.first_layer,
        };
        let instance = kind.construct(&mut cx, ty, &props)?;
        let applied = if kind.applies_props_on_finalize() {
            Props::new()
        } else {
            props
        };
        if let Instance::Item(id) = instance {
            scope.merge_data(id, Props::new().with("type", ty.as_str()).as_map())?;
        }
        log::debug!("create {ty} -> {instance:?}");
        self.records.insert(
            instance,
            Record {
                ty: ty.clone(),
                props: applied,
            },
        );
        Ok(instance)
    }

    fn create_text_instance(
        &mut self,
        text: &str,
        _scope: &mut Scope,
        _context: &(),
    ) -> Result<Infallible, RendererError> {
        Err(RendererError::TextNotSupported(text.to_owned()))
    }

    fn append_initial_child(
        &mut self,
        scope: &mut Scope,
        parent: &Instance,
        child: &Node,
    ) -> Result<(), RendererError> {
        self.append_child(scope, parent, child)
    }

    fn finalize_initial_children(
        &mut self,
        scope: &mut Scope,
        instance: &Instance,
        ty: &String,
        props: &Props,
    ) -> Result<bool, RendererError> {
        let applies = self
            .kinds
            .get(ty)
            .is_some_and(|kind| kind.applies_props_on_finalize());
        if applies {
            let target = Target {
                instance: *instance,
                ty,
            };
            apply_props(scope, target, props, &Props::new())?;
            self.record_props(*instance, props);
        }
        Ok(false)
    }

    fn commit_update(
        &mut self,
        scope: &mut Scope,
        instance: &Instance,
        ty: &String,
        old_props: &Props,
        new_props: &Props,
    ) -> Result<(), RendererError> {
        let target = Target {
            instance: *instance,
            ty,
        };
        apply_props(scope, target, new_props, old_props)?;
        self.record_props(*instance, new_props);
        Ok(())
    }

    fn commit_text_update(
        &mut self,
        _scope: &mut Scope,
        text: &Infallible,
        _old_text: &str,
        _new_text: &str,
    ) -> Result<(), RendererError> {
        match *text {}
    }

    fn append_child(
        &mut self,
        scope: &mut Scope,
        parent: &Instance,
        child: &Node,
    ) -> Result<(), RendererError> {
        let child = instance_of(child);
        let container = parent
            .item()
            .filter(|id| scope.item(*id).is_some_and(|item| item.kind().is_container()));
        match (container, child) {
            (Some(parent), Instance::Item(child)) => {
                scope.add_to(child, parent)?;
                log::trace!("append {child:?} to {parent:?}");
            }
            // Layers already live in the project; appending one under the view
            // only moves it to the top of the paint order.
            (None, Instance::Item(layer)) if *parent == Instance::View && is_layer(scope, child) => {
                let top = scope.project().layers().last().copied();
                if let Some(top) = top.filter(|top| *top != layer) {
                    scope.insert_above(layer, top)?;
                }
            }
            _ => log::warn!("append of {child:?} under {parent:?} ignored"),
        }
        Ok(())
    }

    fn append_child_to_container(
        &mut self,
        _scope: &mut Scope,
        child: &Node,
    ) -> Result<(), RendererError> {
        let child = instance_of(child);
        if child.attaches_to_scope() {
            Ok(())
        } else {
            Err(self.illegal_container_child(child))
        }
    }

    fn insert_before(
        &mut self,
        scope: &mut Scope,
        parent: &Instance,
        child: &Node,
        before: &Node,
    ) -> Result<(), RendererError> {
        let (child, before) = (instance_of(child), instance_of(before));
        if child == before {
            return Err(RendererError::SelfInsertion);
        }
        let in_container = match parent {
            Instance::Item(id) => scope.item(*id).is_some_and(|item| item.kind().is_container()),
            Instance::View => is_layer(scope, child) && is_layer(scope, before),
            Instance::Tool(_) => false,
        };
        match (child, before) {
            (Instance::Item(child), Instance::Item(before)) if in_container => {
                scope.insert_above(child, before)?;
                log::trace!("insert {child:?} above {before:?}");
            }
            _ => log::warn!("insert of {child:?} under {parent:?} ignored"),
        }
        Ok(())
    }

    fn insert_in_container_before(
        &mut self,
        _scope: &mut Scope,
        child: &Node,
        before: &Node,
    ) -> Result<(), RendererError> {
        let (child, before) = (instance_of(child), instance_of(before));
        if child == before {
            return Err(RendererError::SelfInsertion);
        }
        if child.attaches_to_scope() {
            Ok(())
        } else {
            Err(self.illegal_container_child(child))
        }
    }

    fn remove_child(
        &mut self,
        scope: &mut Scope,
        _parent: &Instance,
        child: &Node,
    ) -> Result<(), RendererError> {
        self.destroy(scope, instance_of(child));
        Ok(())
    }

    fn remove_child_from_container(
        &mut self,
        scope: &mut Scope,
        child: &Node,
    ) -> Result<(), RendererError> {
        self.destroy(scope, instance_of(child));
        Ok(())
    }

    fn prepare_for_commit(&mut self, scope: &mut Scope) {
        log::trace!("prepare commit at revision {}", scope.revision());
    }

    fn reset_after_commit(&mut self, scope: &mut Scope) {
        log::trace!("commit done at revision {}", scope.revision());
    }

    fn get_public_instance(&self, instance: &Instance) -> Instance {
        *instance
    }

    fn detach_deleted_instance(&mut self, instance: &Instance) {
        self.records.remove(instance);
    }

    fn discard_instance(&mut self, scope: &mut Scope, node: &Node) {
        let instance = instance_of(node);
        self.records.remove(&instance);
        match (instance, self.first_layer) {
            (Instance::Item(id), FirstLayer::Reused(layer)) if id == layer => {
                self.first_layer = FirstLayer::Pending;
                log::debug!("released default layer {layer:?}");
            }
            _ => self.destroy(scope, instance),
        }
    }
}

impl PaperRenderer {
    fn illegal_container_child(&self, child: Instance) -> RendererError {
        let ty = self
            .instance_type(&child)
            .map(str::to_owned)
            .unwrap_or_else(|| format!("{child:?}"));
        RendererError::IllegalContainerChild(ty)
    }
}

/// Whether `instance` is a layer living in `scope`.
pub fn is_layer(scope: &Scope, instance: Instance) -> bool {
    instance
        .item()
        .and_then(|id| scope.item(id))
        .is_some_and(|item| matches!(item.kind(), ItemKind::Layer))
}
