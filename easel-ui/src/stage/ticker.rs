use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Instant;

use tracing::trace;

use super::surface::StageSurface;
use crate::config::TickerConfig;
use crate::scene::dispatch;
use crate::scheduler::{CallbackId, Deadline, IdleCallback, IdleQueue, IdleScheduler};

/// Frame ticker shared by every mounted stage. Each tick dispatches queued
/// input, redraws registered surfaces and then spends what is left of the
/// frame on idle callbacks.
pub struct Ticker {
    config: TickerConfig,
    listeners: RefCell<Vec<(u64, Weak<RefCell<StageSurface>>)>>,
    next_listener: Cell<u64>,
    idle: IdleQueue,
    last_tick: Cell<Option<Instant>>,
    ticks: Cell<u64>,
}

impl Ticker {
    pub fn new(config: TickerConfig) -> Rc<Self> {
        Rc::new(Self {
            config,
            listeners: RefCell::new(Vec::new()),
            next_listener: Cell::new(0),
            idle: IdleQueue::new(),
            last_tick: Cell::new(None),
            ticks: Cell::new(0),
        })
    }

    pub fn config(&self) -> &TickerConfig {
        &self.config
    }

    /// Registers `surface` for redraws until the returned handle is dropped.
    pub fn add_listener(self: &Rc<Self>, surface: &Rc<RefCell<StageSurface>>) -> TickerRegistration {
        let id = self.next_listener.get();
        self.next_listener.set(id + 1);
        self.listeners.borrow_mut().push((id, Rc::downgrade(surface)));
        trace!(id, "ticker listener added");
        TickerRegistration {
            ticker: Rc::downgrade(self),
            id,
        }
    }

    fn remove_listener(&self, id: u64) {
        self.listeners.borrow_mut().retain(|(listener, _)| *listener != id);
        trace!(id, "ticker listener removed");
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks.get()
    }

    pub fn idle(&self) -> &IdleQueue {
        &self.idle
    }

    /// Runs one frame. Returns the number of surfaces redrawn.
    pub fn tick(&self) -> usize {
        let deadline = Deadline::within(self.config.interval());
        let surfaces: Vec<Rc<RefCell<StageSurface>>> = self
            .listeners
            .borrow()
            .iter()
            .filter_map(|(_, surface)| surface.upgrade())
            .collect();

        let mut redrawn = 0;
        for surface in &surfaces {
            // Handlers may touch the surface or its scene; hold no borrow
            let (scene, events) = {
                let mut surface = surface.borrow_mut();
                (surface.scene().clone(), surface.take_input())
            };
            for event in &events {
                dispatch(&scene, event);
            }
            if surface.borrow_mut().update() {
                redrawn += 1;
            }
        }

        let ran = self.idle.run(&deadline);
        self.ticks.set(self.ticks.get() + 1);
        trace!(surfaces = surfaces.len(), redrawn, idle = ran, "tick");
        redrawn
    }

    /// Ticks when a frame interval has passed since the previous tick.
    pub fn advance(&self, now: Instant) -> bool {
        let due = match self.last_tick.get() {
            Some(last) => now.saturating_duration_since(last) >= self.config.interval(),
            None => true,
        };
        if due {
            self.last_tick.set(Some(now));
            self.tick();
        }
        due
    }
}

impl IdleScheduler for Ticker {
    fn request_idle_callback(&self, callback: IdleCallback) -> CallbackId {
        self.idle.request_idle_callback(callback)
    }

    fn cancel_idle_callback(&self, id: CallbackId) -> bool {
        self.idle.cancel_idle_callback(id)
    }
}

impl fmt::Debug for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ticker")
            .field("config", &self.config)
            .field("listeners", &self.listener_count())
            .field("ticks", &self.ticks.get())
            .finish()
    }
}

/// Keeps a surface registered with a [`Ticker`]; dropping it deregisters.
#[derive(Debug)]
pub struct TickerRegistration {
    ticker: Weak<Ticker>,
    id: u64,
}

impl Drop for TickerRegistration {
    fn drop(&mut self) {
        if let Some(ticker) = self.ticker.upgrade() {
            ticker.remove_listener(self.id);
        }
    }
}
