//! Minimal reconciliation driver.
//!
//! Keeps the committed fiber tree of each root, diffs a new element tree
//! against it and replays the result through a [`HostConfig`]. Rendering
//! never touches attached instances; only the commit phase does.

mod commit;
mod element;
mod fiber;
#[cfg(test)]
pub(crate) mod test_utils;
mod work;

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{debug, error, warn};

pub use element::{bitmap_text, text, Element, Node};

use crate::error::{Error, Result};
use crate::host::{CommitMode, HostConfig};
use crate::scheduler::{CallbackId, Deadline};
use commit::{commit, CommitQueue, ParentRef};
use fiber::Fiber;
use work::{discard_all, RenderPass};

/// A rendered tree whose mutations are not fully applied yet.
struct InFlight<H: HostConfig> {
    queue: CommitQueue<H>,
    finished: Vec<Fiber<H>>,
    created: Vec<H::Instance>,
}

struct RootState<H: HostConfig> {
    container: H::Container,
    current: Vec<Fiber<H>>,
    next_handle: u64,
    in_flight: Option<InFlight<H>>,
    /// Latest tree passed to `schedule_update`; `Some(None)` unmounts.
    pending_tree: Option<Option<Element>>,
    callback: Option<CallbackId>,
    last_error: Option<Error>,
}

/// Reconciliation root bound to one host container.
pub struct Root<H: HostConfig> {
    state: Rc<RefCell<RootState<H>>>,
}

impl<H: HostConfig> Clone for Root<H> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
        }
    }
}

impl<H: HostConfig> Root<H> {
    pub fn container(&self) -> H::Container {
        self.state.borrow().container
    }

    /// Top-level instances in committed order.
    pub fn instances(&self) -> Vec<H::Instance> {
        self.state
            .borrow()
            .current
            .iter()
            .filter_map(|fiber| match fiber {
                Fiber::Host(fiber) => Some(fiber.instance),
                Fiber::Text(_) => None,
            })
            .collect()
    }

    /// A sliced commit has been started and not finished.
    pub fn is_committing(&self) -> bool {
        self.state.borrow().in_flight.is_some()
    }

    /// Deferred work is queued with the host scheduler.
    pub fn has_scheduled_work(&self) -> bool {
        self.state.borrow().callback.is_some()
    }

    /// Error from the last failed deferred render or commit.
    pub fn take_error(&self) -> Option<Error> {
        self.state.borrow_mut().last_error.take()
    }
}

impl<H: HostConfig> fmt::Debug for Root<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("Root")
            .field("container", &state.container)
            .field("children", &state.current.len())
            .field("committing", &state.in_flight.is_some())
            .finish()
    }
}

/// Drives a [`HostConfig`] from declarative trees.
#[derive(Debug, Clone)]
pub struct Reconciler<H> {
    host: H,
}

impl<H: HostConfig> Reconciler<H> {
    pub fn new(host: H) -> Self {
        Self { host }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn create_container(&self, container: H::Container) -> Root<H> {
        Root {
            state: Rc::new(RefCell::new(RootState {
                container,
                current: Vec::new(),
                next_handle: 0,
                in_flight: None,
                pending_tree: None,
                callback: None,
                last_error: None,
            })),
        }
    }

    /// Renders `element` (or nothing) into `root` and commits it before
    /// returning. An unfinished sliced commit is completed first and a
    /// pending scheduled tree is superseded.
    pub fn update_container(&self, element: Option<Element>, root: &Root<H>) -> Result<()> {
        let mut state = root.state.borrow_mut();
        state.pending_tree = None;
        let mode = self.host.commit_mode();
        let deadline = Deadline::unbounded();
        if state.in_flight.is_some() {
            run_commit(&self.host, &mut state, mode, &deadline)?;
        }
        let in_flight = render(&self.host, &mut state, element)?;
        state.in_flight = Some(in_flight);
        run_commit(&self.host, &mut state, mode, &deadline)?;
        Ok(())
    }

    /// Defers render and commit to the host's idle scheduler. Only the
    /// latest tree is rendered when several updates are scheduled.
    pub fn schedule_update(&self, element: Option<Element>, root: &Root<H>) {
        let mut state = root.state.borrow_mut();
        state.pending_tree = Some(element);
        if state.callback.is_none() {
            state.callback = Some(schedule(&self.host, &root.state));
        }
    }
}

fn schedule<H: HostConfig>(host: &H, state: &Rc<RefCell<RootState<H>>>) -> CallbackId {
    let root: Weak<RefCell<RootState<H>>> = Rc::downgrade(state);
    let worker = host.clone();
    host.schedule_deferred_callback(Box::new(move |deadline| {
        if let Some(state) = root.upgrade() {
            perform_deferred(&worker, &state, deadline);
        }
    }))
}

fn perform_deferred<H: HostConfig>(host: &H, state_rc: &Rc<RefCell<RootState<H>>>, deadline: &Deadline) {
    let mut state = state_rc.borrow_mut();
    state.callback = None;
    match work_on_root(host, &mut state, deadline) {
        Ok(true) => {}
        Ok(false) => {
            debug!("commit yielded, rescheduling");
            state.callback = Some(schedule(host, state_rc));
        }
        Err(err) => {
            error!(%err, "deferred render failed");
            state.last_error = Some(err);
        }
    }
}

/// Continues an in-flight commit, then renders any pending tree. Returns
/// false when a commit yielded before finishing.
fn work_on_root<H: HostConfig>(host: &H, state: &mut RootState<H>, deadline: &Deadline) -> Result<bool> {
    let mode = host.commit_mode();
    if state.in_flight.is_some() && !run_commit(host, state, mode, deadline)? {
        return Ok(false);
    }
    let Some(element) = state.pending_tree.take() else {
        return Ok(true);
    };
    let in_flight = render(host, state, element)?;
    state.in_flight = Some(in_flight);
    run_commit(host, state, mode, deadline)
}

fn render<H: HostConfig>(host: &H, state: &mut RootState<H>, element: Option<Element>) -> Result<InFlight<H>> {
    let context = host.get_root_host_context(&state.container);
    let container = state.container;
    let mut pass = RenderPass::new(host, container, &mut state.next_handle);
    let children = element.into_iter().map(Node::Element).collect();
    let finished = match pass.reconcile_children(ParentRef::Container(container), &state.current, children, &context) {
        Ok(finished) => finished,
        Err(err) => {
            pass.abort();
            return Err(err);
        }
    };
    let (queue, created) = pass.finish();
    debug!(mutations = queue.mutations.len(), "render");
    Ok(InFlight {
        queue,
        finished,
        created,
    })
}

/// Empties the container after a partial commit so the next render mounts
/// from scratch. Uncommitted instances are reclaimed too.
fn reset_root<H: HostConfig>(host: &H, state: &mut RootState<H>, failed: InFlight<H>) {
    warn!(container = ?state.container, "commit failed, clearing root");
    if let Err(err) = host.clear_container(&state.container) {
        error!(%err, "clearing root failed");
    }
    discard_all(host, &failed.created);
    state.current.clear();
}

/// Returns true once the in-flight tree is fully committed and current.
/// A failed commit clears the root.
fn run_commit<H: HostConfig>(host: &H, state: &mut RootState<H>, mode: CommitMode, deadline: &Deadline) -> Result<bool> {
    let Some(in_flight) = state.in_flight.as_mut() else {
        return Ok(true);
    };
    match commit(host, &mut in_flight.queue, mode, deadline) {
        Ok(true) => {
            if let Some(done) = state.in_flight.take() {
                state.current = done.finished;
            }
            Ok(true)
        }
        Ok(false) => Ok(false),
        Err(err) => {
            if let Some(failed) = state.in_flight.take() {
                reset_root(host, state, failed);
            }
            Err(err)
        }
    }
}
