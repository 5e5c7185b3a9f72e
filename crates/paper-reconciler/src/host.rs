use std::fmt;

/// Scheduling priority reported to the scheduler for the event being handled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum EventPriority {
    Discrete,
    Continuous,
    #[default]
    Default,
    Idle,
}

/// A child as seen by the host: either an element instance or a text instance.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum HostNode<I, T> {
    Instance(I),
    Text(T),
}

impl<I, T> HostNode<I, T> {
    pub fn as_instance(&self) -> Option<&I> {
        match self {
            HostNode::Instance(instance) => Some(instance),
            HostNode::Text(_) => None,
        }
    }
}

/// The mutation-mode host contract driven by [`Root`](crate::Root).
///
/// Instances are handles; every operation that may touch the host's object
/// graph receives the container explicitly. Operations a host does not care
/// about have no-op defaults.
pub trait HostConfig {
    /// Element tag.
    type Type: Clone + PartialEq + fmt::Debug;
    type Props: Clone + PartialEq;
    /// Mutation target owned by the caller of [`Root::update_container`](crate::Root::update_container).
    type Container;
    type Instance: Clone + fmt::Debug;
    type TextInstance: Clone + fmt::Debug;
    type PublicInstance;
    type HostContext;
    type Error: std::error::Error + 'static;

    const SUPPORTS_MUTATION: bool = true;
    const SUPPORTS_PERSISTENCE: bool = false;
    const SUPPORTS_HYDRATION: bool = false;
    const IS_PRIMARY_RENDERER: bool = false;

    /// Reconciliation key derived from props when an element has no explicit key.
    fn key_of(_props: &Self::Props) -> Option<String> {
        None
    }

    fn get_root_host_context(&self, container: &Self::Container) -> Self::HostContext;

    fn get_child_host_context(
        &self,
        parent: &Self::HostContext,
        ty: &Self::Type,
    ) -> Self::HostContext;

    fn create_instance(
        &mut self,
        ty: &Self::Type,
        props: &Self::Props,
        container: &mut Self::Container,
        context: &Self::HostContext,
    ) -> Result<Self::Instance, Self::Error>;

    fn create_text_instance(
        &mut self,
        text: &str,
        container: &mut Self::Container,
        context: &Self::HostContext,
    ) -> Result<Self::TextInstance, Self::Error>;

    /// When `true`, text children of this element are not turned into text instances.
    fn should_set_text_content(&self, _ty: &Self::Type, _props: &Self::Props) -> bool {
        false
    }

    fn append_initial_child(
        &mut self,
        container: &mut Self::Container,
        parent: &Self::Instance,
        child: &HostNode<Self::Instance, Self::TextInstance>,
    ) -> Result<(), Self::Error>;

    /// Runs after the instance's children are attached. Returning `true`
    /// schedules [`HostConfig::commit_mount`] for the commit.
    fn finalize_initial_children(
        &mut self,
        container: &mut Self::Container,
        instance: &Self::Instance,
        ty: &Self::Type,
        props: &Self::Props,
    ) -> Result<bool, Self::Error>;

    /// Whether a commit update is needed for a prop change.
    fn prepare_update(
        &self,
        _instance: &Self::Instance,
        _ty: &Self::Type,
        old_props: &Self::Props,
        new_props: &Self::Props,
    ) -> bool {
        old_props != new_props
    }

    fn commit_update(
        &mut self,
        container: &mut Self::Container,
        instance: &Self::Instance,
        ty: &Self::Type,
        old_props: &Self::Props,
        new_props: &Self::Props,
    ) -> Result<(), Self::Error>;

    fn commit_mount(
        &mut self,
        _container: &mut Self::Container,
        _instance: &Self::Instance,
        _ty: &Self::Type,
        _props: &Self::Props,
    ) -> Result<(), Self::Error> {
        Ok(())
    }

    fn commit_text_update(
        &mut self,
        container: &mut Self::Container,
        text: &Self::TextInstance,
        old_text: &str,
        new_text: &str,
    ) -> Result<(), Self::Error>;

    fn append_child(
        &mut self,
        container: &mut Self::Container,
        parent: &Self::Instance,
        child: &HostNode<Self::Instance, Self::TextInstance>,
    ) -> Result<(), Self::Error>;

    fn append_child_to_container(
        &mut self,
        container: &mut Self::Container,
        child: &HostNode<Self::Instance, Self::TextInstance>,
    ) -> Result<(), Self::Error>;

    fn insert_before(
        &mut self,
        container: &mut Self::Container,
        parent: &Self::Instance,
        child: &HostNode<Self::Instance, Self::TextInstance>,
        before: &HostNode<Self::Instance, Self::TextInstance>,
    ) -> Result<(), Self::Error>;

    fn insert_in_container_before(
        &mut self,
        container: &mut Self::Container,
        child: &HostNode<Self::Instance, Self::TextInstance>,
        before: &HostNode<Self::Instance, Self::TextInstance>,
    ) -> Result<(), Self::Error>;

    fn remove_child(
        &mut self,
        container: &mut Self::Container,
        parent: &Self::Instance,
        child: &HostNode<Self::Instance, Self::TextInstance>,
    ) -> Result<(), Self::Error>;

    fn remove_child_from_container(
        &mut self,
        container: &mut Self::Container,
        child: &HostNode<Self::Instance, Self::TextInstance>,
    ) -> Result<(), Self::Error>;

    fn reset_text_content(
        &mut self,
        _container: &mut Self::Container,
        _instance: &Self::Instance,
    ) -> Result<(), Self::Error> {
        Ok(())
    }

    fn prepare_for_commit(&mut self, _container: &mut Self::Container) {}

    fn reset_after_commit(&mut self, _container: &mut Self::Container) {}

    fn get_public_instance(&self, instance: &Self::Instance) -> Self::PublicInstance;

    fn current_event_priority(&self) -> EventPriority {
        EventPriority::Default
    }

    fn clear_container(&mut self, _container: &mut Self::Container) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Called once for every instance after its removal was committed.
    fn detach_deleted_instance(&mut self, _instance: &Self::Instance) {}

    /// Destroys a node created during a render pass that was abandoned before commit.
    fn discard_instance(
        &mut self,
        _container: &mut Self::Container,
        _node: &HostNode<Self::Instance, Self::TextInstance>,
    ) {
    }
}
