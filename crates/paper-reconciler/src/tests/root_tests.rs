use super::*;
use std::collections::{HashMap, HashSet};

#[derive(Clone, Debug, Default, PartialEq)]
struct TestProps {
    id: Option<&'static str>,
    value: i32,
}

#[derive(Debug, thiserror::Error)]
#[error("cannot create `{0}`")]
struct TestError(String);

type Node = HostNode<u32, u32>;

fn id_of(node: &Node) -> u32 {
    match node {
        HostNode::Instance(id) | HostNode::Text(id) => *id,
    }
}

/// Host that records every operation and keeps a parent/child map.
#[derive(Default)]
struct RecordingHost {
    next_id: u32,
    log: Vec<String>,
    children: HashMap<u32, Vec<u32>>,
    live: HashSet<u32>,
    depth: HashMap<u32, usize>,
}

impl RecordingHost {
    fn take_log(&mut self) -> Vec<String> {
        std::mem::take(&mut self.log)
    }

    fn alloc(&mut self) -> u32 {
        self.next_id += 1;
        self.live.insert(self.next_id);
        self.next_id
    }

    fn detach(&mut self, child: u32) {
        for list in self.children.values_mut() {
            list.retain(|id| *id != child);
        }
    }

    fn children_of(&self, parent: u32) -> Vec<u32> {
        self.children.get(&parent).cloned().unwrap_or_default()
    }
}

impl HostConfig for RecordingHost {
    type Type = String;
    type Props = TestProps;
    type Container = Vec<u32>;
    type Instance = u32;
    type TextInstance = u32;
    type PublicInstance = u32;
    type HostContext = usize;
    type Error = TestError;

    fn key_of(props: &TestProps) -> Option<String> {
        props.id.map(str::to_owned)
    }

    fn get_root_host_context(&self, _container: &Vec<u32>) -> usize {
        0
    }

    fn get_child_host_context(&self, parent: &usize, _ty: &String) -> usize {
        parent + 1
    }

    fn create_instance(
        &mut self,
        ty: &String,
        _props: &TestProps,
        _container: &mut Vec<u32>,
        context: &usize,
    ) -> Result<u32, TestError> {
        if ty == "broken" {
            return Err(TestError(ty.clone()));
        }
        let id = self.alloc();
        self.children.insert(id, Vec::new());
        self.depth.insert(id, *context);
        self.log.push(format!("create {ty} {id}"));
        Ok(id)
    }

    fn create_text_instance(
        &mut self,
        text: &str,
        _container: &mut Vec<u32>,
        _context: &usize,
    ) -> Result<u32, TestError> {
        let id = self.alloc();
        self.log.push(format!("text {id} {text}"));
        Ok(id)
    }

    fn should_set_text_content(&self, ty: &String, _props: &TestProps) -> bool {
        ty == "label"
    }

    fn append_initial_child(
        &mut self,
        _container: &mut Vec<u32>,
        parent: &u32,
        child: &Node,
    ) -> Result<(), TestError> {
        self.children.entry(*parent).or_default().push(id_of(child));
        self.log.push(format!("init {parent} {}", id_of(child)));
        Ok(())
    }

    fn finalize_initial_children(
        &mut self,
        _container: &mut Vec<u32>,
        _instance: &u32,
        ty: &String,
        _props: &TestProps,
    ) -> Result<bool, TestError> {
        Ok(ty == "focus")
    }

    fn commit_update(
        &mut self,
        _container: &mut Vec<u32>,
        instance: &u32,
        _ty: &String,
        old_props: &TestProps,
        new_props: &TestProps,
    ) -> Result<(), TestError> {
        self.log.push(format!(
            "update {instance} {}->{}",
            old_props.value, new_props.value
        ));
        Ok(())
    }

    fn commit_mount(
        &mut self,
        _container: &mut Vec<u32>,
        instance: &u32,
        _ty: &String,
        _props: &TestProps,
    ) -> Result<(), TestError> {
        self.log.push(format!("mount {instance}"));
        Ok(())
    }

    fn commit_text_update(
        &mut self,
        _container: &mut Vec<u32>,
        text: &u32,
        _old_text: &str,
        new_text: &str,
    ) -> Result<(), TestError> {
        self.log.push(format!("retext {text} {new_text}"));
        Ok(())
    }

    fn append_child(
        &mut self,
        _container: &mut Vec<u32>,
        parent: &u32,
        child: &Node,
    ) -> Result<(), TestError> {
        let child = id_of(child);
        self.detach(child);
        self.children.entry(*parent).or_default().push(child);
        self.log.push(format!("append {parent} {child}"));
        Ok(())
    }

    fn append_child_to_container(
        &mut self,
        container: &mut Vec<u32>,
        child: &Node,
    ) -> Result<(), TestError> {
        let child = id_of(child);
        container.retain(|id| *id != child);
        container.push(child);
        self.log.push(format!("append root {child}"));
        Ok(())
    }

    fn insert_before(
        &mut self,
        _container: &mut Vec<u32>,
        parent: &u32,
        child: &Node,
        before: &Node,
    ) -> Result<(), TestError> {
        let (child, before) = (id_of(child), id_of(before));
        self.detach(child);
        let list = self.children.entry(*parent).or_default();
        let index = list.iter().position(|id| *id == before).unwrap_or(list.len());
        list.insert(index, child);
        self.log.push(format!("insert {parent} {child} before {before}"));
        Ok(())
    }

    fn insert_in_container_before(
        &mut self,
        container: &mut Vec<u32>,
        child: &Node,
        before: &Node,
    ) -> Result<(), TestError> {
        let (child, before) = (id_of(child), id_of(before));
        container.retain(|id| *id != child);
        let index = container
            .iter()
            .position(|id| *id == before)
            .unwrap_or(container.len());
        container.insert(index, child);
        self.log.push(format!("insert root {child} before {before}"));
        Ok(())
    }

    fn remove_child(
        &mut self,
        _container: &mut Vec<u32>,
        parent: &u32,
        child: &Node,
    ) -> Result<(), TestError> {
        let child = id_of(child);
        if let Some(list) = self.children.get_mut(parent) {
            list.retain(|id| *id != child);
        }
        self.live.remove(&child);
        self.log.push(format!("remove {parent} {child}"));
        Ok(())
    }

    fn remove_child_from_container(
        &mut self,
        container: &mut Vec<u32>,
        child: &Node,
    ) -> Result<(), TestError> {
        let child = id_of(child);
        container.retain(|id| *id != child);
        self.live.remove(&child);
        self.log.push(format!("remove root {child}"));
        Ok(())
    }

    fn get_public_instance(&self, instance: &u32) -> u32 {
        *instance
    }

    fn discard_instance(&mut self, _container: &mut Vec<u32>, node: &Node) {
        let id = id_of(node);
        self.live.remove(&id);
        self.log.push(format!("discard {id}"));
    }
}

fn el(ty: &str, value: i32) -> Element<String, TestProps> {
    Element::new(ty, TestProps { id: None, value })
}

fn keyed(ty: &str, id: &'static str) -> Element<String, TestProps> {
    Element::new(ty, TestProps { id: Some(id), value: 0 })
}

fn list(keys: &[&'static str]) -> Vec<Element<String, TestProps>> {
    vec![el("list", 0).children(keys.iter().map(|key| keyed("item", *key)))]
}

fn setup() -> (Root<RecordingHost>, Vec<u32>) {
    (Root::new(RecordingHost::default()), Vec::new())
}

#[test]
fn initial_render_creates_bottom_up_and_places_root_once() {
    let (mut root, mut container) = setup();
    root.update_container(
        vec![el("group", 0).child(el("a", 1)).child(el("b", 2))],
        &mut container,
    )
    .unwrap();

    assert_eq!(
        root.host_mut().take_log(),
        vec![
            "create a 1",
            "create b 2",
            "create group 3",
            "init 3 1",
            "init 3 2",
            "append root 3",
        ]
    );
    assert_eq!(container, vec![3]);
    assert_eq!(root.instances().copied().collect::<Vec<_>>(), vec![3, 1, 2]);
    assert_eq!(root.public_instances(), vec![3]);
    assert_eq!(root.host().depth[&3], 0);
    assert_eq!(root.host().depth[&1], 1);
}

#[test]
fn identical_tree_commits_nothing() {
    let (mut root, mut container) = setup();
    let tree = || vec![el("group", 0).child(el("a", 1))];
    root.update_container(tree(), &mut container).unwrap();
    root.host_mut().take_log();

    root.update_container(tree(), &mut container).unwrap();
    assert!(root.host_mut().take_log().is_empty());
    assert_eq!(root.commit_count(), 2);
}

#[test]
fn changed_props_issue_one_update() {
    let (mut root, mut container) = setup();
    root.update_container(
        vec![el("group", 0).child(el("a", 1)).child(el("b", 2))],
        &mut container,
    )
    .unwrap();
    root.host_mut().take_log();

    root.update_container(
        vec![el("group", 0).child(el("a", 1)).child(el("b", 5))],
        &mut container,
    )
    .unwrap();
    assert_eq!(root.host_mut().take_log(), vec!["update 2 2->5"]);
}

#[test]
fn keyed_children_move_instead_of_being_recreated() {
    let (mut root, mut container) = setup();
    root.update_container(list(&["x", "y", "z"]), &mut container)
        .unwrap();
    root.host_mut().take_log();

    root.update_container(list(&["z", "x", "y"]), &mut container)
        .unwrap();
    assert_eq!(root.host_mut().take_log(), vec!["append 4 1", "append 4 2"]);
    assert_eq!(root.host().children_of(4), vec![3, 1, 2]);
}

#[test]
fn new_keyed_child_is_inserted_before_its_stable_sibling() {
    let (mut root, mut container) = setup();
    root.update_container(list(&["x", "y", "z"]), &mut container)
        .unwrap();
    root.host_mut().take_log();

    root.update_container(list(&["x", "w", "y", "z"]), &mut container)
        .unwrap();
    assert_eq!(
        root.host_mut().take_log(),
        vec!["create item 5", "insert 4 5 before 2"]
    );
    assert_eq!(root.host().children_of(4), vec![1, 5, 2, 3]);
}

#[test]
fn explicit_key_wins_over_id_prop() {
    let (mut root, mut container) = setup();
    let tree = |first: &'static str, second: &'static str| {
        vec![el("list", 0)
            .child(keyed("item", "same").key(first))
            .child(keyed("item", "same").key(second))]
    };
    root.update_container(tree("a", "b"), &mut container).unwrap();
    root.host_mut().take_log();

    root.update_container(tree("b", "a"), &mut container).unwrap();
    assert_eq!(root.host_mut().take_log(), vec!["append 3 1"]);
}

#[test]
fn type_change_replaces_the_instance() {
    let (mut root, mut container) = setup();
    root.update_container(vec![el("group", 0).child(el("a", 1))], &mut container)
        .unwrap();
    root.host_mut().take_log();

    root.update_container(vec![el("group", 0).child(el("c", 1))], &mut container)
        .unwrap();
    assert_eq!(
        root.host_mut().take_log(),
        vec!["create c 3", "remove 2 1", "append 2 3"]
    );
}

#[test]
fn removal_visits_children_before_parents() {
    let (mut root, mut container) = setup();
    root.update_container(
        vec![el("outer", 0).child(el("inner", 0).child(el("leaf", 0)))],
        &mut container,
    )
    .unwrap();
    root.host_mut().take_log();

    root.update_container(Vec::new(), &mut container).unwrap();
    assert_eq!(
        root.host_mut().take_log(),
        vec!["remove 2 1", "remove 3 2", "remove root 3"]
    );
    assert!(root.is_empty());
    assert!(container.is_empty());
    assert!(root.host().live.is_empty());
}

#[test]
fn failed_render_discards_new_instances_and_keeps_previous_tree() {
    let (mut root, mut container) = setup();
    root.update_container(vec![el("group", 0).child(el("a", 1))], &mut container)
        .unwrap();
    root.host_mut().take_log();

    let err = root
        .update_container(
            vec![el("group", 0)
                .child(el("a", 1))
                .child(el("b", 2))
                .child(el("broken", 3))],
            &mut container,
        )
        .unwrap_err();
    assert!(matches!(err, ReconcileError::Host(TestError(ref ty)) if ty == "broken"));
    assert_eq!(root.host_mut().take_log(), vec!["create b 3", "discard 3"]);
    assert_eq!(root.instances().copied().collect::<Vec<_>>(), vec![2, 1]);
    assert_eq!(root.host().children_of(2), vec![1]);

    root.update_container(
        vec![el("group", 0).child(el("a", 1)).child(el("b", 2))],
        &mut container,
    )
    .unwrap();
    assert_eq!(
        root.host_mut().take_log(),
        vec!["create b 4", "append 2 4"]
    );
}

#[test]
fn failed_first_render_leaves_nothing_alive() {
    let (mut root, mut container) = setup();
    let err = root.update_container(
        vec![
            el("box", 0).child(el("x", 0)).child(el("y", 0)),
            el("broken", 0),
        ],
        &mut container,
    );
    assert!(err.is_err());
    let log = root.host_mut().take_log();
    assert_eq!(&log[log.len() - 3..], ["discard 3", "discard 2", "discard 1"]);
    assert!(root.is_empty());
    assert!(container.is_empty());
    assert!(root.host().live.is_empty());
}

#[test]
fn duplicate_keys_are_rejected_before_anything_is_created() {
    let (mut root, mut container) = setup();
    let err = root
        .update_container(
            vec![el("list", 0)
                .child(keyed("item", "k"))
                .child(keyed("item", "k"))],
            &mut container,
        )
        .unwrap_err();
    assert!(matches!(err, ReconcileError::DuplicateKey(ref key) if key == "k"));
    assert!(root.host_mut().take_log().is_empty());
}

#[test]
fn text_children_are_created_updated_and_removed() {
    let (mut root, mut container) = setup();
    root.update_container(vec![el("p", 0).child("hello")], &mut container)
        .unwrap();
    assert_eq!(
        root.host_mut().take_log(),
        vec!["text 1 hello", "create p 2", "init 2 1", "append root 2"]
    );

    root.update_container(vec![el("p", 0).child("bye")], &mut container)
        .unwrap();
    assert_eq!(root.host_mut().take_log(), vec!["retext 1 bye"]);

    root.update_container(vec![el("p", 0).child("")], &mut container)
        .unwrap();
    assert_eq!(root.host_mut().take_log(), vec!["remove 2 1"]);
}

#[test]
fn text_content_hosts_get_no_text_instances() {
    let (mut root, mut container) = setup();
    root.update_container(vec![el("label", 0).child("caption")], &mut container)
        .unwrap();
    assert_eq!(
        root.host_mut().take_log(),
        vec!["create label 1", "append root 1"]
    );
}

#[test]
fn commit_mount_runs_after_placement() {
    let (mut root, mut container) = setup();
    root.update_container(vec![el("focus", 0)], &mut container)
        .unwrap();
    assert_eq!(
        root.host_mut().take_log(),
        vec!["create focus 1", "append root 1", "mount 1"]
    );
}

#[test]
fn mutation_is_the_only_supported_mode() {
    assert!(RecordingHost::SUPPORTS_MUTATION);
    assert!(!RecordingHost::SUPPORTS_PERSISTENCE);
    assert!(!RecordingHost::SUPPORTS_HYDRATION);
    assert_eq!(
        RecordingHost::default().current_event_priority(),
        EventPriority::Default
    );
}
