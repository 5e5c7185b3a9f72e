use std::cell::RefCell;
use std::rc::Rc;

use paper_canvas::{Canvas, CanvasError, CanvasProps, CanvasState, HeadlessSurface};
use paper_renderer::{PaperElement, RendererError, CIRCLE, LAYER, RASTER, TOOL, VIEW};
use paper_scene::kurbo::Size;
use paper_scene::{Event, Handler, Props};

fn scene(log: &Rc<RefCell<Vec<String>>>, radius: f64) -> Vec<PaperElement> {
    let drag_log = log.clone();
    let load_log = log.clone();
    vec![
        PaperElement::new(VIEW, Props::new()).child(
            PaperElement::new(LAYER, Props::new().with("id", "main")).children([
                PaperElement::new(
                    CIRCLE,
                    Props::new()
                        .with("id", "dot")
                        .with("center", [10.0, 10.0])
                        .with("radius", radius),
                ),
                PaperElement::new(
                    RASTER,
                    Props::new()
                        .with("id", "logo")
                        .with("source", "logo.png")
                        .with(
                            "onLoad",
                            Handler::new(move |event| {
                                if let Event::Load { .. } = event {
                                    load_log.borrow_mut().push("loaded".into());
                                }
                            }),
                        ),
                ),
            ]),
        ),
        PaperElement::new(
            TOOL,
            Props::new().with("id", "pen").with("active", true).with(
                "onMouseDrag",
                Handler::new(move |event| {
                    if let Event::Tool(tool) = event {
                        drag_log
                            .borrow_mut()
                            .push(format!("drag {} {}", tool.delta.x, tool.delta.y));
                    }
                }),
            ),
        ),
    ]
}

#[test]
fn full_mount_cycle() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let ready = log.clone();
    let mut canvas = Canvas::new(CanvasProps::default().on_scope_ready(move |scope| {
        ready
            .borrow_mut()
            .push(format!("ready with {} layer", scope.project().layers().len()));
    }));

    canvas.mount(&HeadlessSurface::new(400.0, 300.0)).unwrap();
    canvas.render(scene(&log, 5.0)).unwrap();
    assert_eq!(canvas.scope().unwrap().project().layers().len(), 1);

    assert!(!canvas.pointer_down(0.0, 0.0));
    assert!(canvas.pointer_drag(3.0, 4.0));

    let requests = canvas.take_load_requests();
    assert_eq!(requests.len(), 1);
    assert!(canvas.complete_raster_load(&requests[0], Ok(Size::new(16.0, 16.0))));

    canvas.unmount().unwrap();
    assert_eq!(canvas.state(), CanvasState::TornDown);
    assert!(canvas.scope().is_none());

    assert_eq!(
        *log.borrow(),
        ["ready with 1 layer", "drag 3 4", "loaded"]
    );
}

#[test]
fn teardown_leaves_nothing_behind() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut canvas = Canvas::new(CanvasProps::default());
    canvas.mount(&HeadlessSurface::default()).unwrap();
    canvas.render(scene(&log, 5.0)).unwrap();
    canvas.render(scene(&log, 8.0)).unwrap();
    let requests = canvas.take_load_requests();

    // the empty push runs through the same root, so check it before the scope is dropped
    canvas.render(Vec::new()).unwrap();
    let scope = canvas.scope().unwrap();
    assert!(scope.project().layers().is_empty());
    assert_eq!(scope.item_count(), 0);
    assert!(scope.tools().is_empty());
    assert_eq!(canvas.renderer().unwrap().instance_count(), 0);

    canvas.unmount().unwrap();
    assert!(!canvas.complete_raster_load(&requests[0], Ok(Size::new(1.0, 1.0))));
    assert!(log.borrow().is_empty());
}

#[test]
fn render_errors_surface_and_keep_the_canvas_mounted() {
    let mut canvas = Canvas::new(CanvasProps::default());
    canvas.mount(&HeadlessSurface::default()).unwrap();

    let err = canvas
        .render(vec![PaperElement::new("Hexagon", Props::new())])
        .unwrap_err();
    assert!(matches!(err, CanvasError::Render(_)));
    assert_eq!(
        err.renderer_error(),
        Some(&RendererError::UnsupportedType("Hexagon".into()))
    );
    assert_eq!(canvas.state(), CanvasState::Mounted);

    canvas
        .render(vec![PaperElement::new(VIEW, Props::new().with("zoom", 2.0))])
        .unwrap();
    assert_eq!(canvas.scope().unwrap().view().zoom(), 2.0);
}

#[test]
fn dropping_a_mounted_canvas_releases_every_handler() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut canvas = Canvas::new(CanvasProps::default());
    canvas.mount(&HeadlessSurface::default()).unwrap();
    canvas.render(scene(&log, 2.0)).unwrap();
    assert!(Rc::strong_count(&log) > 1);

    drop(canvas);

    assert_eq!(Rc::strong_count(&log), 1);
}
