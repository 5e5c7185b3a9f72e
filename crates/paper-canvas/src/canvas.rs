use std::fmt;

use paper_reconciler::Root;
use paper_renderer::{PaperElement, PaperRenderer};
use paper_scene::kurbo::{Point, Size};
use paper_scene::{LoadRequest, Scope, SettingsPatch, ToolEventKind};

use crate::{CanvasError, Surface};

pub type ScopeReady = Box<dyn FnOnce(&mut Scope)>;

/// Caller-supplied configuration for a [`Canvas`].
#[derive(Default)]
pub struct CanvasProps {
    /// Engine settings applied onto the fresh scope before anything is built.
    pub settings: SettingsPatch,
    /// Called once, synchronously, when the scope is ready.
    pub on_scope_ready: Option<ScopeReady>,
    /// Overrides the surface size when set.
    pub size: Option<Size>,
}

impl CanvasProps {
    pub fn with_settings(mut self, settings: SettingsPatch) -> Self {
        self.settings = settings;
        self
    }

    pub fn on_scope_ready(mut self, ready: impl FnOnce(&mut Scope) + 'static) -> Self {
        self.on_scope_ready = Some(Box::new(ready));
        self
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.size = Some(Size::new(width, height));
        self
    }
}

impl fmt::Debug for CanvasProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CanvasProps")
            .field("settings", &self.settings)
            .field("on_scope_ready", &self.on_scope_ready.is_some())
            .field("size", &self.size)
            .finish()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CanvasState {
    Unmounted,
    Mounted,
    TornDown,
}

struct Mounted {
    scope: Scope,
    root: Root<PaperRenderer>,
}

/// Owns one scope for the lifetime of one surface mount.
///
/// `Unmounted -> Mounted -> TornDown`. Trees and sizes handed over before the
/// surface is available are kept and applied while mounting. A torn-down
/// canvas never mounts again.
pub struct Canvas {
    props: CanvasProps,
    mounted: Option<Mounted>,
    state: CanvasState,
    pending_tree: Option<Vec<PaperElement>>,
    pending_size: Option<Size>,
}

impl Canvas {
    pub fn new(props: CanvasProps) -> Self {
        Self {
            props,
            mounted: None,
            state: CanvasState::Unmounted,
            pending_tree: None,
            pending_size: None,
        }
    }

    pub fn state(&self) -> CanvasState {
        self.state
    }

    /// Creates the scope, binds it to `surface` and pushes any pending tree.
    pub fn mount(&mut self, surface: &dyn Surface) -> Result<(), CanvasError> {
        match self.state {
            CanvasState::Unmounted => {}
            CanvasState::Mounted => return Err(CanvasError::AlreadyMounted),
            CanvasState::TornDown => return Err(CanvasError::TornDown),
        }
        let mut scope = Scope::new();
        scope.apply_settings(&self.props.settings);
        let size = self
            .pending_size
            .take()
            .or(self.props.size)
            .unwrap_or_else(|| surface.size());
        scope.setup(size);
        let root = Root::new(PaperRenderer::new());
        if let Some(ready) = self.props.on_scope_ready.take() {
            ready(&mut scope);
        }
        self.mounted = Some(Mounted { scope, root });
        self.state = CanvasState::Mounted;
        log::debug!("canvas mounted at {}x{}", size.width, size.height);

        match self.pending_tree.take() {
            Some(tree) => self.render(tree),
            None => Ok(()),
        }
    }

    /// Pushes a new element tree. Before mount the tree is kept for later.
    pub fn render(&mut self, tree: Vec<PaperElement>) -> Result<(), CanvasError> {
        match (self.state, self.mounted.as_mut()) {
            (CanvasState::Mounted, Some(Mounted { scope, root })) => {
                root.update_container(tree, scope).map_err(|err| {
                    log::error!("canvas render failed: {err}");
                    CanvasError::from(err)
                })
            }
            (CanvasState::TornDown, _) => Err(CanvasError::TornDown),
            _ => {
                self.pending_tree = Some(tree);
                Ok(())
            }
        }
    }

    /// Resizes the view directly; the element tree is not involved.
    pub fn resize(&mut self, width: f64, height: f64) -> Result<(), CanvasError> {
        let size = Size::new(width, height);
        match (self.state, self.mounted.as_mut()) {
            (CanvasState::Mounted, Some(mounted)) => {
                mounted.scope.set_view_size(size);
                log::debug!("canvas resized to {width}x{height}");
                Ok(())
            }
            (CanvasState::TornDown, _) => Err(CanvasError::TornDown),
            _ => {
                self.pending_size = Some(size);
                Ok(())
            }
        }
    }

    /// Removes every instance, then drops the root and the scope.
    ///
    /// The canvas is torn down even when the final removal fails; that error
    /// is returned after the fact.
    pub fn unmount(&mut self) -> Result<(), CanvasError> {
        match self.state {
            CanvasState::Mounted => {}
            CanvasState::Unmounted => return Err(CanvasError::NotMounted),
            CanvasState::TornDown => return Err(CanvasError::TornDown),
        }
        self.state = CanvasState::TornDown;
        self.pending_tree = None;
        let Some(Mounted { mut scope, mut root }) = self.mounted.take() else {
            return Ok(());
        };
        let result = root.update_container(Vec::new(), &mut scope);
        log::debug!(
            "canvas torn down after {} commits, {} items left",
            root.commit_count(),
            scope.item_count()
        );
        result.map_err(|err| {
            log::error!("canvas teardown failed: {err}");
            CanvasError::from(err)
        })
    }

    pub fn scope(&self) -> Option<&Scope> {
        self.mounted.as_ref().map(|mounted| &mounted.scope)
    }

    /// Direct scope access. Mutating the scene graph behind the renderer's
    /// back desynchronises the props it diffs against.
    pub fn scope_mut(&mut self) -> Option<&mut Scope> {
        self.mounted.as_mut().map(|mounted| &mut mounted.scope)
    }

    pub fn renderer(&self) -> Option<&PaperRenderer> {
        self.mounted.as_ref().map(|mounted| mounted.root.host())
    }

    pub fn root(&self) -> Option<&Root<PaperRenderer>> {
        self.mounted.as_ref().map(|mounted| &mounted.root)
    }

    fn dispatch(&mut self, kind: ToolEventKind, point: Point, key: Option<&str>) -> bool {
        match self.mounted.as_mut() {
            Some(mounted) => mounted.scope.dispatch_tool_event(kind, point, key),
            None => false,
        }
    }

    /// Forwards a press to the active tool. Returns whether a handler ran.
    pub fn pointer_down(&mut self, x: f64, y: f64) -> bool {
        self.dispatch(ToolEventKind::MouseDown, Point::new(x, y), None)
    }

    pub fn pointer_drag(&mut self, x: f64, y: f64) -> bool {
        self.dispatch(ToolEventKind::MouseDrag, Point::new(x, y), None)
    }

    pub fn pointer_up(&mut self, x: f64, y: f64) -> bool {
        self.dispatch(ToolEventKind::MouseUp, Point::new(x, y), None)
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) -> bool {
        self.dispatch(ToolEventKind::MouseMove, Point::new(x, y), None)
    }

    pub fn key_down(&mut self, key: &str) -> bool {
        self.dispatch(ToolEventKind::KeyDown, Point::ZERO, Some(key))
    }

    pub fn key_up(&mut self, key: &str) -> bool {
        self.dispatch(ToolEventKind::KeyUp, Point::ZERO, Some(key))
    }

    /// Raster loads the host still has to perform.
    pub fn take_load_requests(&mut self) -> Vec<LoadRequest> {
        self.mounted
            .as_mut()
            .map(|mounted| mounted.scope.take_load_requests())
            .unwrap_or_default()
    }

    /// Completes a raster load. After teardown, or for a raster that is
    /// gone, this does nothing and returns `false`.
    pub fn complete_raster_load(
        &mut self,
        request: &LoadRequest,
        outcome: Result<Size, String>,
    ) -> bool {
        match self.mounted.as_mut() {
            Some(mounted) => mounted.scope.complete_load(request, outcome),
            None => {
                log::debug!("dropping load of `{}`: canvas is not mounted", request.source);
                false
            }
        }
    }
}

impl Drop for Canvas {
    fn drop(&mut self) {
        if self.state == CanvasState::Mounted {
            let _ = self.unmount();
        }
    }
}
