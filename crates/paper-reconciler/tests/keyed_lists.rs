use std::collections::HashMap;
use std::convert::Infallible;

use paper_reconciler::{Element, HostConfig, HostNode, Root};

/// Host that mirrors the committed tree so its shape can be compared with the
/// element tree after every update.
#[derive(Default)]
struct MirrorHost {
    next_id: u32,
    names: HashMap<u32, String>,
    children: HashMap<u32, Vec<u32>>,
    created: usize,
}

type Node = HostNode<u32, Infallible>;

fn id_of(node: &Node) -> u32 {
    match node {
        HostNode::Instance(id) => *id,
        HostNode::Text(never) => match *never {},
    }
}

impl MirrorHost {
    fn detach(&mut self, child: u32) {
        for list in self.children.values_mut() {
            list.retain(|id| *id != child);
        }
    }

    fn names_under(&self, parent: u32) -> Vec<String> {
        self.children[&parent]
            .iter()
            .map(|id| self.names[id].clone())
            .collect()
    }
}

impl HostConfig for MirrorHost {
    type Type = &'static str;
    type Props = String;
    type Container = Vec<u32>;
    type Instance = u32;
    type TextInstance = Infallible;
    type PublicInstance = u32;
    type HostContext = ();
    type Error = Infallible;

    fn key_of(props: &String) -> Option<String> {
        Some(props.clone()).filter(|name| !name.is_empty())
    }

    fn get_root_host_context(&self, _container: &Vec<u32>) {}

    fn get_child_host_context(&self, _parent: &(), _ty: &&'static str) {}

    fn create_instance(
        &mut self,
        _ty: &&'static str,
        props: &String,
        _container: &mut Vec<u32>,
        _context: &(),
    ) -> Result<u32, Infallible> {
        self.next_id += 1;
        self.created += 1;
        self.names.insert(self.next_id, props.clone());
        self.children.insert(self.next_id, Vec::new());
        Ok(self.next_id)
    }

    fn create_text_instance(
        &mut self,
        _text: &str,
        _container: &mut Vec<u32>,
        _context: &(),
    ) -> Result<Infallible, Infallible> {
        unreachable!("no text in these trees")
    }

    fn append_initial_child(
        &mut self,
        _container: &mut Vec<u32>,
        parent: &u32,
        child: &Node,
    ) -> Result<(), Infallible> {
        self.children.entry(*parent).or_default().push(id_of(child));
        Ok(())
    }

    fn finalize_initial_children(
        &mut self,
        _container: &mut Vec<u32>,
        _instance: &u32,
        _ty: &&'static str,
        _props: &String,
    ) -> Result<bool, Infallible> {
        Ok(false)
    }

    fn commit_update(
        &mut self,
        _container: &mut Vec<u32>,
        instance: &u32,
        _ty: &&'static str,
        _old_props: &String,
        new_props: &String,
    ) -> Result<(), Infallible> {
        self.names.insert(*instance, new_props.clone());
        Ok(())
    }

    fn commit_text_update(
        &mut self,
        _container: &mut Vec<u32>,
        text: &Infallible,
        _old_text: &str,
        _new_text: &str,
    ) -> Result<(), Infallible> {
        match *text {}
    }

    fn append_child(
        &mut self,
        _container: &mut Vec<u32>,
        parent: &u32,
        child: &Node,
    ) -> Result<(), Infallible> {
        let child = id_of(child);
        self.detach(child);
        self.children.entry(*parent).or_default().push(child);
        Ok(())
    }

    fn append_child_to_container(
        &mut self,
        container: &mut Vec<u32>,
        child: &Node,
    ) -> Result<(), Infallible> {
        let child = id_of(child);
        container.retain(|id| *id != child);
        container.push(child);
        Ok(())
    }

    fn insert_before(
        &mut self,
        _container: &mut Vec<u32>,
        parent: &u32,
        child: &Node,
        before: &Node,
    ) -> Result<(), Infallible> {
        let (child, before) = (id_of(child), id_of(before));
        self.detach(child);
        let list = self.children.entry(*parent).or_default();
        let index = list.iter().position(|id| *id == before).unwrap_or(list.len());
        list.insert(index, child);
        Ok(())
    }

    fn insert_in_container_before(
        &mut self,
        container: &mut Vec<u32>,
        child: &Node,
        before: &Node,
    ) -> Result<(), Infallible> {
        let (child, before) = (id_of(child), id_of(before));
        container.retain(|id| *id != child);
        let index = container
            .iter()
            .position(|id| *id == before)
            .unwrap_or(container.len());
        container.insert(index, child);
        Ok(())
    }

    fn remove_child(
        &mut self,
        _container: &mut Vec<u32>,
        parent: &u32,
        child: &Node,
    ) -> Result<(), Infallible> {
        let child = id_of(child);
        if let Some(list) = self.children.get_mut(parent) {
            list.retain(|id| *id != child);
        }
        self.names.remove(&child);
        Ok(())
    }

    fn remove_child_from_container(
        &mut self,
        container: &mut Vec<u32>,
        child: &Node,
    ) -> Result<(), Infallible> {
        let child = id_of(child);
        container.retain(|id| *id != child);
        self.names.remove(&child);
        Ok(())
    }

    fn get_public_instance(&self, instance: &u32) -> u32 {
        *instance
    }
}

fn list(keys: &[&str]) -> Vec<Element<&'static str, String>> {
    vec![Element::new("list", String::new())
        .children(keys.iter().map(|key| Element::new("item", key.to_string())))]
}

#[test]
fn host_order_tracks_every_permutation_step() {
    let steps: &[&[&str]] = &[
        &["a", "b", "c", "d", "e"],
        &["e", "d", "c", "b", "a"],
        &["b", "a", "e", "c"],
        &["c", "x", "b", "y", "a"],
        &["y"],
        &["a", "y", "b", "c", "d", "e", "f"],
        &["f", "a", "y", "e", "b", "d", "c"],
        &[],
        &["z", "a"],
    ];
    let mut root = Root::new(MirrorHost::default());
    let mut container = Vec::new();
    for step in steps {
        root.update_container(list(step), &mut container).unwrap();
        assert_eq!(container.len(), 1);
        let names = root.host().names_under(container[0]);
        assert_eq!(names, step.iter().map(|s| s.to_string()).collect::<Vec<_>>());
    }
    // list + its current children
    assert_eq!(root.host().names.len(), 3);
}

#[test]
fn stable_keys_never_recreate_instances() {
    let mut root = Root::new(MirrorHost::default());
    let mut container = Vec::new();
    root.update_container(list(&["a", "b", "c"]), &mut container)
        .unwrap();
    let before = root.host().created;
    root.update_container(list(&["c", "a", "b"]), &mut container)
        .unwrap();
    root.update_container(list(&["b", "c", "a"]), &mut container)
        .unwrap();
    assert_eq!(root.host().created, before);
    assert_eq!(root.instances().count(), 4);
}

#[test]
fn top_level_siblings_are_reordered_in_the_container() {
    let mut root = Root::new(MirrorHost::default());
    let mut container = Vec::new();
    let top = |keys: &[&str]| {
        keys.iter()
            .map(|key| Element::<&'static str, String>::new("item", key.to_string()))
            .collect::<Vec<_>>()
    };
    root.update_container(top(&["a", "b", "c"]), &mut container)
        .unwrap();
    root.update_container(top(&["c", "b", "a"]), &mut container)
        .unwrap();
    let names: Vec<_> = container
        .iter()
        .map(|id| root.host().names[id].clone())
        .collect();
    assert_eq!(names, ["c", "b", "a"]);
}
