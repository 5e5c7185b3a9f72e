use std::cell::RefCell;
use std::rc::Rc;

use paper_canvas::{Canvas, CanvasProps, HeadlessSurface};
use paper_renderer::{
    PaperElement, CIRCLE, GROUP, LAYER, PATH, POINT_TEXT, RASTER, RECTANGLE, SYMBOL_ITEM, TOOL,
    VIEW,
};
use paper_scene::kurbo::Size;
use paper_scene::{Event, Handler, Props, SettingsPatch, Value};

const BADGE: &str = r#"<svg width="24" height="24"><circle cx="12" cy="12" r="10"/></svg>"#;

/// Document state a real app would keep in its store.
#[derive(Default)]
struct Document {
    strokes: Vec<Vec<[f64; 2]>>,
    zoom: f64,
    sun_radius: f64,
}

fn element(ty: &str, props: Props) -> PaperElement {
    PaperElement::new(ty, props)
}

fn view(doc: &Document, pen: Handler) -> Vec<PaperElement> {
    let strokes = doc.strokes.iter().enumerate().map(|(index, points)| {
        let segments = points.iter().map(|point| Value::from(*point)).collect();
        element(
            PATH,
            Props::new()
                .with("id", format!("stroke-{index}"))
                .with("segments", Value::List(segments))
                .with("strokeColor", "black")
                .with("strokeWidth", 2.0),
        )
        .key(format!("stroke-{index}"))
    });
    vec![
        element(VIEW, Props::new().with("zoom", doc.zoom)).children([
            element(LAYER, Props::new().with("id", "background")).children([
                element(
                    RECTANGLE,
                    Props::new()
                        .with("id", "sky")
                        .with("point", [0.0, 0.0])
                        .with("size", [800.0, 600.0])
                        .with("fillColor", "#def"),
                ),
                element(
                    CIRCLE,
                    Props::new()
                        .with("id", "sun")
                        .with("center", [650.0, 120.0])
                        .with("radius", doc.sun_radius)
                        .with("fillColor", "gold"),
                ),
                element(
                    RASTER,
                    Props::new()
                        .with("id", "photo")
                        .with("source", "photo.png")
                        .with("position", [200.0, 200.0])
                        .with(
                            "onLoad",
                            Handler::new(|event| log::info!("raster ready: {event:?}")),
                        ),
                ),
            ]),
            element(LAYER, Props::new().with("id", "ink").with("active", true)).children(
                [element(GROUP, Props::new().with("id", "badges")).children([
                    element(
                        SYMBOL_ITEM,
                        Props::new()
                            .with("id", "badge")
                            .with("svg", BADGE)
                            .with("position", [40.0, 40.0]),
                    )
                    .key("badge-1"),
                    element(
                        SYMBOL_ITEM,
                        Props::new()
                            .with("id", "badge")
                            .with("svg", BADGE)
                            .with("position", [80.0, 40.0]),
                    )
                    .key("badge-2"),
                ])]
                .into_iter()
                .chain(strokes)
                .chain([element(
                    POINT_TEXT,
                    Props::new()
                        .with("id", "caption")
                        .with("point", [20.0, 580.0])
                        .with("content", format!("{} strokes", doc.strokes.len())),
                )]),
            ),
        ]),
        element(
            TOOL,
            Props::new()
                .with("id", "pen")
                .with("active", true)
                .with("onMouseDrag", pen),
        ),
    ]
}

fn main() {
    env_logger::init();

    let props = CanvasProps::default()
        .with_settings(SettingsPatch {
            hit_tolerance: Some(2.0),
            ..SettingsPatch::default()
        })
        .on_scope_ready(|scope| log::info!("scope ready: {:?}", scope.id()));
    let mut canvas = Canvas::new(props);
    let mut doc = Document {
        zoom: 1.0,
        sun_radius: 40.0,
        ..Document::default()
    };

    // drags collected by the tool, folded into the document after each gesture
    let drag = Rc::new(RefCell::new(Vec::new()));
    let sink = drag.clone();
    let pen = Handler::new(move |event| {
        if let Event::Tool(tool) = event {
            sink.borrow_mut().push([tool.point.x, tool.point.y]);
        }
    });

    canvas
        .render(view(&doc, pen.clone()))
        .expect("initial tree");
    canvas
        .mount(&HeadlessSurface::new(800.0, 600.0))
        .expect("mount");

    for (x, y) in [(100.0, 100.0), (120.0, 110.0), (140.0, 130.0)] {
        canvas.pointer_drag(x, y);
    }
    doc.strokes.push(drag.borrow_mut().drain(..).collect());
    doc.sun_radius = 60.0;
    doc.zoom = 1.5;
    canvas.render(view(&doc, pen.clone())).expect("update");

    for request in canvas.take_load_requests() {
        canvas.complete_raster_load(&request, Ok(Size::new(128.0, 96.0)));
    }
    canvas.resize(1024.0, 768.0).expect("resize");

    if let Some(scope) = canvas.scope() {
        println!("{}", scope.dump_tree());
    }

    canvas.unmount().expect("teardown");
    log::info!("canvas is {:?}", canvas.state());
}
