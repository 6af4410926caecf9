//! The operation set a reconciliation driver invokes to realise tree edits.

mod adapter;
mod factory;

pub use adapter::EaselHost;
pub use factory::create_instance;

use crate::error::Result;
use crate::props::Props;
use crate::scheduler::{CallbackId, IdleCallback};

/// Opaque per-fiber handle passed to instance creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InternalHandle(pub u64);

/// Either a host instance or a bare text instance.
#[derive(Debug, Clone, PartialEq)]
pub enum HostChild<I, T> {
    Instance(I),
    Text(T),
}

/// Whether a commit may be split across idle callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitMode {
    /// Every mutation of a commit is applied before control returns.
    Synchronous,
    /// Mutations may be applied across several idle callbacks.
    Sliced,
}

/// Host context carrying no state; root and child contexts are the same.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoContext;

/// Non-null update marker. Carries no diff; the diff is recomputed on
/// commit from the old and new props.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateSignal;

pub trait HostConfig: Clone + 'static {
    type Instance: Copy + PartialEq + std::fmt::Debug;
    type TextInstance: Clone + std::fmt::Debug;
    type Container: Copy + PartialEq + std::fmt::Debug;
    type HostContext: Clone;
    type UpdatePayload;
    type PublicInstance;

    fn get_root_host_context(&self, root: &Self::Container) -> Self::HostContext;

    fn get_child_host_context(&self, parent: &Self::HostContext, ty: &str) -> Self::HostContext;

    fn get_public_instance(&self, instance: &Self::Instance) -> Self::PublicInstance;

    fn create_instance(
        &self,
        ty: &str,
        props: &Props,
        root: &Self::Container,
        context: &Self::HostContext,
        handle: InternalHandle,
    ) -> Result<Self::Instance>;

    fn create_text_instance(
        &self,
        text: &str,
        root: &Self::Container,
        context: &Self::HostContext,
        handle: InternalHandle,
    ) -> Self::TextInstance;

    fn append_initial_child(
        &self,
        parent: &Self::Instance,
        child: &HostChild<Self::Instance, Self::TextInstance>,
    ) -> Result<()>;

    /// True asks the driver to call [`commit_mount`](Self::commit_mount)
    /// once the instance is attached.
    fn finalize_initial_children(&self, instance: &Self::Instance, ty: &str, props: &Props) -> bool;

    fn should_set_text_content(&self, props: &Props) -> bool;

    fn should_deprioritize_subtree(&self, ty: &str, props: &Props) -> bool;

    fn prepare_update(
        &self,
        instance: &Self::Instance,
        ty: &str,
        old_props: &Props,
        new_props: &Props,
    ) -> Option<Self::UpdatePayload>;

    fn prepare_for_commit(&self);

    fn reset_after_commit(&self);

    fn commit_mount(&self, instance: &Self::Instance, ty: &str, props: &Props);

    fn commit_update(
        &self,
        instance: &Self::Instance,
        payload: &Self::UpdatePayload,
        ty: &str,
        old_props: &Props,
        new_props: &Props,
    ) -> Result<()>;

    fn commit_text_update(&self, text: &Self::TextInstance, old_text: &str, new_text: &str);

    fn reset_text_content(&self, instance: &Self::Instance);

    fn append_child(
        &self,
        parent: &Self::Instance,
        child: &HostChild<Self::Instance, Self::TextInstance>,
    ) -> Result<()>;

    fn append_child_to_container(
        &self,
        container: &Self::Container,
        child: &HostChild<Self::Instance, Self::TextInstance>,
    ) -> Result<()>;

    fn insert_before(
        &self,
        parent: &Self::Instance,
        child: &HostChild<Self::Instance, Self::TextInstance>,
        before: &HostChild<Self::Instance, Self::TextInstance>,
    ) -> Result<()>;

    fn insert_in_container_before(
        &self,
        container: &Self::Container,
        child: &HostChild<Self::Instance, Self::TextInstance>,
        before: &HostChild<Self::Instance, Self::TextInstance>,
    ) -> Result<()>;

    fn remove_child(
        &self,
        parent: &Self::Instance,
        child: &HostChild<Self::Instance, Self::TextInstance>,
    ) -> Result<()>;

    fn remove_child_from_container(
        &self,
        container: &Self::Container,
        child: &HostChild<Self::Instance, Self::TextInstance>,
    ) -> Result<()>;

    /// Reclaims a detached instance created by a render that never
    /// committed. Instances already reclaimed with an ancestor are skipped.
    fn discard_instance(&self, instance: &Self::Instance);

    /// Removes and reclaims every child of `container`.
    fn clear_container(&self, container: &Self::Container) -> Result<()>;

    fn schedule_deferred_callback(&self, callback: IdleCallback) -> CallbackId;

    fn commit_mode(&self) -> CommitMode;
}
