use paper_reconciler::Root;
use paper_renderer::{Instance, PaperElement, PaperRenderer, CIRCLE, LAYER, PATH, TOOL, VIEW};
use paper_scene::kurbo::Size;
use paper_scene::{ItemId, Props, Scope, Value};

#[derive(Clone)]
struct Stroke {
    id: &'static str,
    points: Vec<[f64; 2]>,
    color: &'static str,
}

fn stroke(id: &'static str, x: f64, color: &'static str) -> Stroke {
    Stroke {
        id,
        points: vec![[x, 0.0], [x + 10.0, 10.0]],
        color,
    }
}

fn drawing(strokes: &[Stroke]) -> Vec<PaperElement> {
    let paths: Vec<PaperElement> = strokes
        .iter()
        .map(|stroke| {
            let segments: Vec<Value> = stroke.points.iter().map(|p| Value::from(*p)).collect();
            PaperElement::new(
                PATH,
                Props::new()
                    .with("id", stroke.id)
                    .with("segments", Value::List(segments))
                    .with("strokeColor", stroke.color),
            )
            .key(stroke.id)
        })
        .collect();
    vec![
        PaperElement::new(VIEW, Props::new()).children([
            PaperElement::new(LAYER, Props::new().with("id", "background")).child(
                PaperElement::new(
                    CIRCLE,
                    Props::new()
                        .with("id", "sun")
                        .with("center", [100.0, 100.0])
                        .with("radius", 20.0),
                ),
            ),
            PaperElement::new(LAYER, Props::new().with("id", "strokes")).children(paths),
        ]),
        PaperElement::new(TOOL, Props::new().with("id", "pen").with("active", true)),
    ]
}

fn stroke_layer(root: &Root<PaperRenderer>) -> ItemId {
    root.instances()
        .filter(|instance| root.host().instance_type(instance) == Some(LAYER))
        .filter_map(|instance| instance.item())
        .nth(1)
        .expect("strokes layer")
}

fn stroke_colors(root: &Root<PaperRenderer>, scope: &Scope) -> Vec<String> {
    scope
        .item(stroke_layer(root))
        .expect("layer is live")
        .children()
        .iter()
        .map(|id| {
            let item = scope.item(*id).expect("stroke is live");
            item.field("strokeColor")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_owned()
        })
        .collect()
}

#[test]
fn strokes_follow_the_document() {
    let mut scope = Scope::new();
    scope.setup(Size::new(640.0, 480.0));
    let mut root = Root::new(PaperRenderer::new());

    let mut strokes = vec![stroke("s1", 0.0, "red"), stroke("s2", 20.0, "green")];
    root.update_container(drawing(&strokes), &mut scope)
        .expect("first draw");
    assert_eq!(scope.project().layers().len(), 2);
    assert_eq!(stroke_colors(&root, &scope), ["red", "green"]);

    strokes.push(stroke("s3", 40.0, "blue"));
    root.update_container(drawing(&strokes), &mut scope)
        .expect("append");
    assert_eq!(stroke_colors(&root, &scope), ["red", "green", "blue"]);

    strokes[1].color = "yellow";
    let before = scope.item_count();
    root.update_container(drawing(&strokes), &mut scope)
        .expect("recolor");
    assert_eq!(scope.item_count(), before);
    assert_eq!(stroke_colors(&root, &scope), ["red", "yellow", "blue"]);

    let first = strokes.remove(0);
    strokes.push(first);
    root.update_container(drawing(&strokes), &mut scope)
        .expect("bring to front");
    assert_eq!(stroke_colors(&root, &scope), ["yellow", "blue", "red"]);

    strokes.remove(1);
    root.update_container(drawing(&strokes), &mut scope)
        .expect("erase");
    assert_eq!(stroke_colors(&root, &scope), ["yellow", "red"]);
    // two layers, the sun and two strokes
    assert_eq!(scope.item_count(), 5);
}

#[test]
fn tool_stays_exclusive_across_updates() {
    let mut scope = Scope::new();
    scope.setup(Size::new(640.0, 480.0));
    let mut root = Root::new(PaperRenderer::new());
    root.update_container(drawing(&[]), &mut scope)
        .expect("draw");

    let tools: Vec<_> = root.instances().filter_map(|instance| instance.tool()).collect();
    assert_eq!(tools.len(), 1);
    assert_eq!(scope.active_tool(), Some(tools[0]));
    assert_eq!(
        root.public_instances().last(),
        Some(&Instance::Tool(tools[0]))
    );

    root.update_container(Vec::new(), &mut scope)
        .expect("teardown");
    assert_eq!(scope.active_tool(), None);
    assert!(scope.project().layers().is_empty());
}
