//! Root lifecycle: binds a canvas surface, a frame ticker and a
//! reconciliation root, and sequences mount, update and unmount.

mod canvas;
mod surface;
mod ticker;

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, info};

pub use canvas::{Canvas, DetachedCanvas, Frames, RecordingCanvas};
pub use surface::StageSurface;
pub use ticker::{Ticker, TickerRegistration};

use crate::config::{init_tracing, CanvasElement, StageProps};
use crate::error::{Error, Result};
use crate::host::EaselHost;
use crate::reconciler::{Element, Reconciler, Root};
use crate::scene::{NodeId, SceneGraph, SharedScene};

struct MountedStage {
    surface: Rc<RefCell<StageSurface>>,
    reconciler: Reconciler<EaselHost>,
    root: Root<EaselHost>,
    registration: TickerRegistration,
}

enum StageState {
    Unmounted,
    Mounted(Box<MountedStage>),
}

/// The root component: one canvas, one scene, one reconciliation root.
pub struct Stage {
    props: StageProps,
    state: StageState,
}

impl Stage {
    pub fn new(props: StageProps) -> Self {
        Self {
            props,
            state: StageState::Unmounted,
        }
    }

    pub fn props(&self) -> &StageProps {
        &self.props
    }

    /// Attributes for the hosted canvas element.
    pub fn canvas_element(&self) -> CanvasElement {
        self.props.canvas_element()
    }

    pub fn is_mounted(&self) -> bool {
        matches!(self.state, StageState::Mounted(_))
    }

    pub fn surface(&self) -> Option<Rc<RefCell<StageSurface>>> {
        self.mounted().map(|m| m.surface.clone())
    }

    pub fn scene(&self) -> Option<SharedScene> {
        self.mounted().map(|m| m.surface.borrow().scene().clone())
    }

    /// The surface's root container.
    pub fn root_node(&self) -> Option<NodeId> {
        self.mounted().map(|m| m.surface.borrow().root())
    }

    pub fn root(&self) -> Option<&Root<EaselHost>> {
        self.mounted().map(|m| &m.root)
    }

    fn mounted(&self) -> Option<&MountedStage> {
        match &self.state {
            StageState::Mounted(mounted) => Some(mounted),
            StageState::Unmounted => None,
        }
    }

    /// Creates the surface on `canvas`, enables touch input, registers with
    /// `ticker`, creates the reconciliation root and renders `tree`.
    pub fn mount(&mut self, canvas: Box<dyn Canvas>, ticker: &Rc<Ticker>, tree: Option<Element>) -> Result<()> {
        if self.is_mounted() {
            return Err(Error::AlreadyMounted);
        }
        if let Some(level) = &self.props.log_level {
            init_tracing(level);
        }

        let scene: SharedScene = Rc::new(RefCell::new(SceneGraph::new()));
        let mut surface = StageSurface::new(scene.clone(), canvas);
        surface.enable_touch();
        if let Some(mouse_over) = self.props.enable_mouse_over {
            surface.enable_mouse_over(mouse_over.frequency());
        }
        let container = surface.root();
        let surface = Rc::new(RefCell::new(surface));
        let registration = ticker.add_listener(&surface);

        let reconciler = Reconciler::new(EaselHost::new(scene, ticker.clone()));
        let root = reconciler.create_container(container);
        reconciler.update_container(tree, &root)?;

        info!(width = self.props.width, height = self.props.height, "stage mounted");
        self.state = StageState::Mounted(Box::new(MountedStage {
            surface,
            reconciler,
            root,
            registration,
        }));
        Ok(())
    }

    /// Applies new stage props, re-renders `tree` and redraws when the
    /// canvas supports it.
    pub fn update(&mut self, props: StageProps, tree: Option<Element>) -> Result<()> {
        let StageState::Mounted(mounted) = &self.state else {
            return Err(Error::NotMounted);
        };
        self.props = props;
        if let Some(mouse_over) = self.props.enable_mouse_over {
            mounted.surface.borrow_mut().enable_mouse_over(mouse_over.frequency());
        }
        mounted.reconciler.update_container(tree, &mounted.root)?;
        let drew = mounted.surface.borrow_mut().update();
        debug!(drew, "stage updated");
        Ok(())
    }

    /// Queues `tree` to render on the ticker's idle time.
    pub fn schedule_render(&self, tree: Option<Element>) -> Result<()> {
        let mounted = self.mounted().ok_or(Error::NotMounted)?;
        mounted.reconciler.schedule_update(tree, &mounted.root);
        Ok(())
    }

    /// Renders an empty tree, disables touch and leaves the ticker. The
    /// stage is unmounted even when the final render fails.
    pub fn unmount(&mut self) -> Result<()> {
        let StageState::Mounted(mounted) = std::mem::replace(&mut self.state, StageState::Unmounted) else {
            return Err(Error::NotMounted);
        };
        let MountedStage {
            surface,
            reconciler,
            root,
            registration,
        } = *mounted;

        let rendered = reconciler.update_container(None, &root);
        surface.borrow_mut().disable_touch();
        drop(registration);
        info!("stage unmounted");
        rendered
    }
}

impl Default for Stage {
    fn default() -> Self {
        Self::new(StageProps::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EnableMouseOver, TickerConfig};
    use crate::props::Props;
    use crate::scene::NodeKind;

    fn tree() -> Element {
        Element::new(NodeKind::Container, Props::new().with("x", 1.0))
    }

    #[test]
    fn test_lifecycle_transitions() {
        let ticker = Ticker::new(TickerConfig::default());
        let mut stage = Stage::default();
        let resized = StageProps {
            width: 640,
            ..StageProps::default()
        };
        assert_eq!(stage.update(resized, None), Err(Error::NotMounted));
        assert_eq!(stage.props().width, 300);

        stage
            .mount(Box::new(RecordingCanvas::new(300, 150)), &ticker, Some(tree()))
            .unwrap();
        assert!(stage.is_mounted());
        assert_eq!(ticker.listener_count(), 1);
        assert_eq!(
            stage.mount(Box::new(RecordingCanvas::new(1, 1)), &ticker, None),
            Err(Error::AlreadyMounted)
        );

        stage.unmount().unwrap();
        assert!(!stage.is_mounted());
        assert_eq!(ticker.listener_count(), 0);
        assert_eq!(stage.unmount(), Err(Error::NotMounted));
    }

    #[test]
    fn test_mouse_over_resolution() {
        let ticker = Ticker::new(TickerConfig::default());
        let props = StageProps {
            enable_mouse_over: Some(EnableMouseOver::Frequency(12)),
            ..StageProps::default()
        };
        let mut stage = Stage::new(props);
        stage.mount(Box::new(RecordingCanvas::new(1, 1)), &ticker, None).unwrap();
        let surface = stage.surface().unwrap();
        assert_eq!(surface.borrow().mouse_over_frequency(), 12);

        let toggled = |on| StageProps {
            enable_mouse_over: Some(EnableMouseOver::Toggle(on)),
            ..StageProps::default()
        };
        stage.update(toggled(true), None).unwrap();
        assert_eq!(surface.borrow().mouse_over_frequency(), 20);
        stage.update(toggled(false), None).unwrap();
        assert_eq!(surface.borrow().mouse_over_frequency(), 0);
    }

    #[test]
    fn test_update_redraws_only_capable_canvas() {
        let ticker = Ticker::new(TickerConfig::default());
        let canvas = RecordingCanvas::new(10, 10);
        let frames = canvas.frames();
        let mut stage = Stage::default();
        stage.mount(Box::new(canvas), &ticker, Some(tree())).unwrap();
        stage.update(StageProps::default(), Some(tree())).unwrap();
        assert_eq!(frames.borrow().len(), 1);

        let mut detached = Stage::default();
        detached
            .mount(Box::new(DetachedCanvas { width: 1, height: 1 }), &ticker, Some(tree()))
            .unwrap();
        detached.update(StageProps::default(), Some(tree())).unwrap();
        assert_eq!(detached.surface().unwrap().borrow().frames_drawn(), 0);
    }

    #[test]
    fn test_scheduled_render_runs_on_tick() {
        let ticker = Ticker::new(TickerConfig::default());
        let mut stage = Stage::default();
        stage.mount(Box::new(RecordingCanvas::new(1, 1)), &ticker, None).unwrap();

        stage.schedule_render(Some(tree())).unwrap();
        assert!(stage.root().unwrap().instances().is_empty());

        ticker.tick();
        assert_eq!(stage.root().unwrap().instances().len(), 1);
    }
}
