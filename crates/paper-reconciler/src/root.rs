use hashbrown::{HashMap, HashSet};

use crate::{Child, Element, HostConfig, HostNode, ReconcileError};

pub type HostElement<H> = Element<<H as HostConfig>::Type, <H as HostConfig>::Props>;
type HostChild<H> = Child<<H as HostConfig>::Type, <H as HostConfig>::Props>;
type Node<H> = HostNode<<H as HostConfig>::Instance, <H as HostConfig>::TextInstance>;
type Outcome<T, H> = Result<T, ReconcileError<<H as HostConfig>::Error>>;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum MatchKey {
    Explicit(String),
    Index(usize),
}

enum FiberKind<H: HostConfig> {
    Host {
        ty: H::Type,
        props: H::Props,
        instance: H::Instance,
        children: Vec<Fiber<H>>,
    },
    Text {
        text: String,
        instance: H::TextInstance,
    },
}

struct Fiber<H: HostConfig> {
    key: MatchKey,
    kind: FiberKind<H>,
}

impl<H: HostConfig> Fiber<H> {
    fn node(&self) -> Node<H> {
        match &self.kind {
            FiberKind::Host { instance, .. } => HostNode::Instance(instance.clone()),
            FiberKind::Text { instance, .. } => HostNode::Text(instance.clone()),
        }
    }

    fn matches(&self, child: &HostChild<H>) -> bool {
        match (&self.kind, child) {
            (FiberKind::Host { ty, .. }, Child::Element(element)) => *ty == element.ty,
            (FiberKind::Text { .. }, Child::Text(_)) => true,
            _ => false,
        }
    }
}

enum Effect<H: HostConfig> {
    Place {
        parent: Option<H::Instance>,
        node: Node<H>,
        before: Option<Node<H>>,
    },
    Update {
        instance: H::Instance,
        ty: H::Type,
        old_props: H::Props,
        new_props: H::Props,
    },
    UpdateText {
        instance: H::TextInstance,
        old_text: String,
        new_text: String,
    },
}

struct Deletion<H: HostConfig> {
    parent: Option<H::Instance>,
    node: Node<H>,
}

struct Mount<H: HostConfig> {
    instance: H::Instance,
    ty: H::Type,
    props: H::Props,
}

/// One reconciled child before its placement is decided.
struct Slot<H: HostConfig> {
    fiber: Fiber<H>,
    old_index: Option<usize>,
    placed: bool,
    effects: Vec<Effect<H>>,
}

/// State of a single render phase. Nothing here is visible to the host as
/// attached until the commit phase runs.
struct RenderPass<'a, H: HostConfig> {
    host: &'a mut H,
    container: &'a mut H::Container,
    created: Vec<Node<H>>,
    deletions: Vec<Deletion<H>>,
    mounts: Vec<Mount<H>>,
}

impl<'a, H: HostConfig> RenderPass<'a, H> {
    fn keyed(
        &self,
        children: Vec<HostChild<H>>,
        text_as_content: bool,
    ) -> Outcome<Vec<(MatchKey, HostChild<H>)>, H> {
        let mut seen = HashSet::new();
        let mut keyed = Vec::with_capacity(children.len());
        for child in children {
            if let Child::Text(text) = &child {
                if text.is_empty() || text_as_content {
                    continue;
                }
            }
            let explicit = match &child {
                Child::Element(element) => element
                    .key
                    .clone()
                    .or_else(|| H::key_of(&element.props)),
                Child::Text(_) => None,
            };
            let key = match explicit {
                Some(key) => {
                    if !seen.insert(key.clone()) {
                        return Err(ReconcileError::DuplicateKey(key));
                    }
                    MatchKey::Explicit(key)
                }
                None => MatchKey::Index(keyed.len()),
            };
            keyed.push((key, child));
        }
        Ok(keyed)
    }

    fn reconcile_children(
        &mut self,
        parent: Option<&H::Instance>,
        context: &H::HostContext,
        old: &[Fiber<H>],
        children: Vec<HostChild<H>>,
        text_as_content: bool,
    ) -> Outcome<(Vec<Fiber<H>>, Vec<Effect<H>>), H> {
        let keyed = self.keyed(children, text_as_content)?;
        let by_key: HashMap<&MatchKey, usize> = old
            .iter()
            .enumerate()
            .map(|(index, fiber)| (&fiber.key, index))
            .collect();
        let mut reused = vec![false; old.len()];
        let mut slots: Vec<Slot<H>> = Vec::with_capacity(keyed.len());

        for (key, child) in keyed {
            let previous = by_key
                .get(&key)
                .copied()
                .filter(|index| !reused[*index] && old[*index].matches(&child));
            let slot = match previous {
                Some(index) => {
                    reused[index] = true;
                    self.reuse(&old[index], key, child, index, context)?
                }
                None => Slot {
                    fiber: self.create(key, child, context)?,
                    old_index: None,
                    placed: true,
                    effects: Vec::new(),
                },
            };
            slots.push(slot);
        }

        for (index, fiber) in old.iter().enumerate() {
            if !reused[index] {
                self.delete(parent, fiber);
            }
        }

        let mut last_placed = 0;
        for slot in &mut slots {
            if let Some(old_index) = slot.old_index {
                if old_index < last_placed {
                    slot.placed = true;
                } else {
                    last_placed = old_index;
                }
            }
        }

        let anchors: Vec<Option<Node<H>>> = (0..slots.len())
            .map(|index| {
                slots[index + 1..]
                    .iter()
                    .find(|slot| !slot.placed)
                    .map(|slot| slot.fiber.node())
            })
            .collect();

        let mut fibers = Vec::with_capacity(slots.len());
        let mut effects = Vec::new();
        for (slot, before) in slots.into_iter().zip(anchors) {
            if slot.placed {
                effects.push(Effect::Place {
                    parent: parent.cloned(),
                    node: slot.fiber.node(),
                    before,
                });
            }
            effects.extend(slot.effects);
            fibers.push(slot.fiber);
        }
        Ok((fibers, effects))
    }

    fn reuse(
        &mut self,
        old: &Fiber<H>,
        key: MatchKey,
        child: HostChild<H>,
        old_index: usize,
        context: &H::HostContext,
    ) -> Outcome<Slot<H>, H> {
        let mut effects = Vec::new();
        let kind = match (&old.kind, child) {
            (
                FiberKind::Host {
                    ty,
                    props: old_props,
                    instance,
                    children: old_children,
                },
                Child::Element(element),
            ) => {
                let child_context = self.host.get_child_host_context(context, ty);
                let text_as_content = self.host.should_set_text_content(ty, &element.props);
                if self
                    .host
                    .prepare_update(instance, ty, old_props, &element.props)
                {
                    effects.push(Effect::Update {
                        instance: instance.clone(),
                        ty: ty.clone(),
                        old_props: old_props.clone(),
                        new_props: element.props.clone(),
                    });
                }
                let (children, child_effects) = self.reconcile_children(
                    Some(instance),
                    &child_context,
                    old_children,
                    element.children,
                    text_as_content,
                )?;
                effects.extend(child_effects);
                FiberKind::Host {
                    ty: ty.clone(),
                    props: element.props,
                    instance: instance.clone(),
                    children,
                }
            }
            (FiberKind::Text { text, instance }, Child::Text(new_text)) => {
                if *text != new_text {
                    effects.push(Effect::UpdateText {
                        instance: instance.clone(),
                        old_text: text.clone(),
                        new_text: new_text.clone(),
                    });
                }
                FiberKind::Text {
                    text: new_text,
                    instance: instance.clone(),
                }
            }
            (_, child) => {
                return Ok(Slot {
                    fiber: self.create(key, child, context)?,
                    old_index: None,
                    placed: true,
                    effects,
                })
            }
        };
        Ok(Slot {
            fiber: Fiber { key, kind },
            old_index: Some(old_index),
            placed: false,
            effects,
        })
    }

    /// Creates a detached subtree bottom-up: children first, then the
    /// instance, then initial attachment and finalization.
    fn create(
        &mut self,
        key: MatchKey,
        child: HostChild<H>,
        context: &H::HostContext,
    ) -> Outcome<Fiber<H>, H> {
        let element = match child {
            Child::Text(text) => {
                let instance = self
                    .host
                    .create_text_instance(&text, self.container, context)?;
                self.created.push(HostNode::Text(instance.clone()));
                return Ok(Fiber {
                    key,
                    kind: FiberKind::Text { text, instance },
                });
            }
            Child::Element(element) => element,
        };
        let Element {
            ty,
            props,
            children,
            ..
        } = element;

        let child_context = self.host.get_child_host_context(context, &ty);
        let text_as_content = self.host.should_set_text_content(&ty, &props);
        let keyed = self.keyed(children, text_as_content)?;
        let mut fibers = Vec::with_capacity(keyed.len());
        for (child_key, child) in keyed {
            fibers.push(self.create(child_key, child, &child_context)?);
        }

        let instance = self
            .host
            .create_instance(&ty, &props, self.container, context)?;
        self.created.push(HostNode::Instance(instance.clone()));
        log::trace!("created {ty:?} as {instance:?}");

        for fiber in &fibers {
            self.host
                .append_initial_child(self.container, &instance, &fiber.node())?;
        }
        if self
            .host
            .finalize_initial_children(self.container, &instance, &ty, &props)?
        {
            self.mounts.push(Mount {
                instance: instance.clone(),
                ty: ty.clone(),
                props: props.clone(),
            });
        }
        Ok(Fiber {
            key,
            kind: FiberKind::Host {
                ty,
                props,
                instance,
                children: fibers,
            },
        })
    }

    /// Schedules removal of a whole subtree, children before their parent.
    fn delete(&mut self, parent: Option<&H::Instance>, fiber: &Fiber<H>) {
        if let FiberKind::Host {
            instance, children, ..
        } = &fiber.kind
        {
            for child in children {
                self.delete(Some(instance), child);
            }
        }
        self.deletions.push(Deletion {
            parent: parent.cloned(),
            node: fiber.node(),
        });
    }

    fn rollback(mut self) {
        let created = std::mem::take(&mut self.created);
        log::debug!("rolling back {} instance(s) from an aborted render", created.len());
        for node in created.iter().rev() {
            self.host.discard_instance(self.container, node);
        }
    }
}

/// A diffing root: keeps the last committed tree and turns each new tree into
/// host operations.
pub struct Root<H: HostConfig> {
    host: H,
    children: Vec<Fiber<H>>,
    commits: u64,
}

impl<H: HostConfig> Root<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            children: Vec::new(),
            commits: 0,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    /// Number of commits that ran, successful or not.
    pub fn commit_count(&self) -> u64 {
        self.commits
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Live element instances in tree order, parents before children.
    pub fn instances(&self) -> impl Iterator<Item = &H::Instance> + '_ {
        fn walk<'f, H: HostConfig>(fibers: &'f [Fiber<H>], out: &mut Vec<&'f H::Instance>) {
            for fiber in fibers {
                if let FiberKind::Host {
                    instance, children, ..
                } = &fiber.kind
                {
                    out.push(instance);
                    walk(children, out);
                }
            }
        }
        let mut out = Vec::new();
        walk(&self.children, &mut out);
        out.into_iter()
    }

    /// Public handles of the top-level instances.
    pub fn public_instances(&self) -> Vec<H::PublicInstance> {
        self.children
            .iter()
            .filter_map(|fiber| match &fiber.kind {
                FiberKind::Host { instance, .. } => Some(self.host.get_public_instance(instance)),
                FiberKind::Text { .. } => None,
            })
            .collect()
    }

    /// Reconciles `elements` against the committed tree and commits the result.
    ///
    /// A render-phase failure discards everything created during the pass and
    /// keeps the previous tree. A commit-phase failure stops the commit; the
    /// new tree is kept so that a later update can still remove it.
    pub fn update_container(
        &mut self,
        elements: Vec<HostElement<H>>,
        container: &mut H::Container,
    ) -> Result<(), ReconcileError<H::Error>> {
        let context = self.host.get_root_host_context(container);
        let children = elements.into_iter().map(Child::Element).collect();
        let mut pass = RenderPass {
            host: &mut self.host,
            container,
            created: Vec::new(),
            deletions: Vec::new(),
            mounts: Vec::new(),
        };
        let (fibers, effects) =
            match pass.reconcile_children(None, &context, &self.children, children, false) {
                Ok(rendered) => rendered,
                Err(err) => {
                    log::error!("render failed: {err}");
                    pass.rollback();
                    return Err(err);
                }
            };
        let RenderPass {
            host,
            container,
            deletions,
            mounts,
            created,
        } = pass;
        log::debug!(
            "commit: {} created, {} removed, {} effects",
            created.len(),
            deletions.len(),
            effects.len()
        );

        host.prepare_for_commit(container);
        let result = commit(host, container, deletions, effects, mounts);
        host.reset_after_commit(container);
        self.children = fibers;
        self.commits += 1;
        if let Err(err) = &result {
            log::error!("commit failed: {err}");
        }
        result.map_err(ReconcileError::Host)
    }
}

fn commit<H: HostConfig>(
    host: &mut H,
    container: &mut H::Container,
    deletions: Vec<Deletion<H>>,
    effects: Vec<Effect<H>>,
    mounts: Vec<Mount<H>>,
) -> Result<(), H::Error> {
    for Deletion { parent, node } in deletions {
        match &parent {
            Some(parent) => host.remove_child(container, parent, &node)?,
            None => host.remove_child_from_container(container, &node)?,
        }
        if let HostNode::Instance(instance) = &node {
            host.detach_deleted_instance(instance);
        }
    }
    for effect in effects {
        match effect {
            Effect::Place {
                parent,
                node,
                before,
            } => match (&parent, &before) {
                (Some(parent), Some(before)) => host.insert_before(container, parent, &node, before)?,
                (Some(parent), None) => host.append_child(container, parent, &node)?,
                (None, Some(before)) => host.insert_in_container_before(container, &node, before)?,
                (None, None) => host.append_child_to_container(container, &node)?,
            },
            Effect::Update {
                instance,
                ty,
                old_props,
                new_props,
            } => host.commit_update(container, &instance, &ty, &old_props, &new_props)?,
            Effect::UpdateText {
                instance,
                old_text,
                new_text,
            } => host.commit_text_update(container, &instance, &old_text, &new_text)?,
        }
    }
    for Mount {
        instance,
        ty,
        props,
    } in mounts
    {
        host.commit_mount(container, &instance, &ty, &props)?;
    }
    Ok(())
}
