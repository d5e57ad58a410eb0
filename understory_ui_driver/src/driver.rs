// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The driver: one owner for routing, controllers, scene and tick queues.

use core::time::Duration;

use kurbo::{Affine, Rect};
use understory_controller::tree::ControllerTree;
use understory_controller::types::ControllerId;
use understory_frame::{FrameScheduler, TickPhase, Ticker};
use understory_gesture::dispatcher::{self, Dispatch};
use understory_gesture::handlers::HoldHandlers;
use understory_gesture::resolve::HitTest;
use understory_gesture::router::InputRouter;
use understory_gesture::stack::HitStack;

use crate::config::DriverConfig;
use crate::element::{ElementId, ElementIds};
use crate::error::DriverError;
use crate::event::InputEvent;

/// The hit-testable scene the driver resolves pointers against.
pub trait Scene: HitTest<ElementId> {
    /// Forget `element`; called after its controller closes.
    fn remove_element(&mut self, element: ElementId);
}

impl Scene for HitStack<ElementId> {
    fn remove_element(&mut self, element: ElementId) {
        self.remove(element);
    }
}

/// Counts from one tick.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TickStats {
    /// Gesture handlers invoked.
    pub dispatched: usize,
    /// Scheduler jobs run across all phases.
    pub jobs: usize,
    /// Views written by deferred refresh.
    pub refreshed: usize,
}

/// Controller tree type used by the driver; templates are instantiated under
/// a transform scope.
pub type Controllers = ControllerTree<ElementId, Affine>;

/// The callback context handlers and scheduled jobs receive.
///
/// Owns the [`InputRouter`], the [`Controllers`] tree, the hit-testable scene
/// `B`, the [`FrameScheduler`] with its [`Ticker`], and the application state
/// `S`. Handlers get `&mut UiDriver`, so they can change the model of a
/// controller, register more handlers, or close controllers directly.
///
/// ## Tick order
///
/// 1. [`UiDriver::begin_tick`]: periodic tickables fire, then the pre-physics queue runs.
/// 2. [`UiDriver::fixed_tick`]: the physics queue runs.
/// 3. [`UiDriver::end_tick`]: the hold session advances and dispatches, the
///    post-render queue runs, then deferred refreshes are flushed.
pub struct UiDriver<S, B> {
    router: InputRouter<ElementId, Self>,
    controllers: Controllers,
    scene: B,
    scheduler: FrameScheduler<Self>,
    ticker: Ticker<Self>,
    ids: ElementIds,
    bounds: Rect,
    hold_threshold: Duration,
    state: S,
}

impl<S: core::fmt::Debug, B> core::fmt::Debug for UiDriver<S, B> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("UiDriver")
            .field("router", &self.router)
            .field("controllers", &self.controllers)
            .field("scheduler", &self.scheduler)
            .field("ticker", &self.ticker)
            .field("bounds", &self.bounds)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl<S: 'static, B: Scene + 'static> UiDriver<S, B> {
    /// Create a driver over `scene` with the given state and configuration.
    pub fn new(state: S, scene: B, config: &DriverConfig) -> Result<Self, DriverError> {
        config.validate()?;
        let scheduler = FrameScheduler::new();
        let mut router = InputRouter::new();
        router.set_mode(config.mode);
        router.set_navigate_step(config.navigate_step);
        tracing::debug!(?config, "driver created");
        Ok(Self {
            router,
            controllers: ControllerTree::with_root_scope(Affine::IDENTITY),
            scene,
            ticker: Ticker::new(scheduler.clone()),
            scheduler,
            ids: ElementIds::new(),
            bounds: config.screen_bounds(),
            hold_threshold: config.hold_threshold()?,
            state,
        })
    }

    /// Application state.
    pub fn state(&self) -> &S {
        &self.state
    }

    /// Application state, mutably.
    pub fn state_mut(&mut self) -> &mut S {
        &mut self.state
    }

    /// The input router.
    pub fn router(&self) -> &InputRouter<ElementId, Self> {
        &self.router
    }

    /// The input router, mutably; used to register handlers.
    pub fn router_mut(&mut self) -> &mut InputRouter<ElementId, Self> {
        &mut self.router
    }

    /// The controller tree.
    pub fn controllers(&self) -> &Controllers {
        &self.controllers
    }

    /// The controller tree, mutably.
    pub fn controllers_mut(&mut self) -> &mut Controllers {
        &mut self.controllers
    }

    /// The scene.
    pub fn scene(&self) -> &B {
        &self.scene
    }

    /// The scene, mutably.
    pub fn scene_mut(&mut self) -> &mut B {
        &mut self.scene
    }

    /// A handle to the tick queues; clone it into other threads to enqueue work.
    pub fn scheduler(&self) -> &FrameScheduler<Self> {
        &self.scheduler
    }

    /// Periodic tickables.
    pub fn ticker_mut(&mut self) -> &mut Ticker<Self> {
        &mut self.ticker
    }

    /// Allocate a fresh element id.
    pub fn next_element(&mut self) -> ElementId {
        self.ids.next_id()
    }

    /// Hold handlers with the configured threshold and no callbacks.
    pub fn hold_handlers(&self) -> HoldHandlers<Self> {
        HoldHandlers::with_threshold(self.hold_threshold)
    }

    /// Screen rectangle used for navigation.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Resize the navigation bounds.
    pub fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = bounds;
    }

    /// Run a dispatch sequence against this driver.
    pub fn dispatch(&mut self, seq: &[Dispatch<ElementId, Self>]) -> usize {
        dispatcher::run(seq, self, |d| &d.router)
    }

    /// Route one input event and run its handlers. Returns handlers invoked.
    pub fn handle(&mut self, event: InputEvent) -> usize {
        let seq = match event {
            InputEvent::PointerMoved(at) => self.router.pointer_moved(&self.scene, at),
            InputEvent::Tap => self.router.tap(),
            InputEvent::AltTap => self.router.alt_tap(),
            InputEvent::Back => self.router.back(),
            InputEvent::Hold => self.router.toggle_hold(),
            InputEvent::Scroll(delta) => self.router.scroll(delta),
            InputEvent::Navigate(direction) => {
                self.router.navigate(&self.scene, direction, self.bounds)
            }
            InputEvent::ControlsChanged(scheme) => {
                tracing::debug!(?scheme, mode = ?scheme.mode(), "control scheme changed");
                self.router.set_mode(scheme.mode());
                Vec::new()
            }
        };
        self.dispatch(&seq)
    }

    fn run_phase(&mut self, phase: TickPhase) -> usize {
        let scheduler = self.scheduler.clone();
        scheduler.run(phase, self)
    }

    /// Start a tick of length `dt`.
    pub fn begin_tick(&mut self, dt: Duration) -> TickStats {
        self.ticker.advance(dt);
        TickStats {
            jobs: self.run_phase(TickPhase::PrePhysics),
            ..TickStats::default()
        }
    }

    /// Run the fixed-step physics phase.
    pub fn fixed_tick(&mut self) -> TickStats {
        TickStats {
            jobs: self.run_phase(TickPhase::Physics),
            ..TickStats::default()
        }
    }

    /// Finish a tick of length `dt`.
    pub fn end_tick(&mut self, dt: Duration) -> TickStats {
        let seq = self.router.advance(dt);
        let dispatched = self.dispatch(&seq);
        let jobs = self.run_phase(TickPhase::PostRender);
        let refreshed = self.controllers.flush_refreshes();
        TickStats {
            dispatched,
            jobs,
            refreshed,
        }
    }

    /// One whole tick: begin, physics, end.
    pub fn frame(&mut self, dt: Duration) -> TickStats {
        let begin = self.begin_tick(dt);
        let physics = self.fixed_tick();
        let end = self.end_tick(dt);
        TickStats {
            dispatched: end.dispatched,
            jobs: begin.jobs + physics.jobs + end.jobs,
            refreshed: end.refreshed,
        }
    }

    /// Close controller `id` and everything it owns.
    ///
    /// Each closed element leaves every gesture registry and the scene.
    pub fn close_controller(&mut self, id: ControllerId) -> Result<Vec<ControllerId>, DriverError> {
        let mut elements = Vec::new();
        let mut stack = vec![id];
        while let Some(c) = stack.pop() {
            elements.extend(self.controllers.element_of(c));
            stack.extend_from_slice(self.controllers.children_of(c));
        }
        let closed = self.controllers.close(id, &mut self.router)?;
        for element in elements {
            self.scene.remove_element(element);
        }
        tracing::info!(?id, closed = closed.len(), "closed controller subtree");
        Ok(closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::ControlScheme;
    use kurbo::{Point, Vec2};
    use std::cell::Cell;
    use std::rc::Rc;
    use tracing_test::traced_test;
    use understory_controller::view::{ModelView, View};
    use understory_gesture::handlers::FocusHandlers;
    use understory_gesture::types::{GestureKinds, InputMode, Priority};

    #[derive(Debug, Default)]
    struct App {
        taps: Vec<ElementId>,
        backs: u32,
        holds: Vec<&'static str>,
        focused: Vec<(ElementId, bool)>,
    }

    type Driver = UiDriver<App, HitStack<ElementId>>;

    fn driver() -> Driver {
        UiDriver::new(App::default(), HitStack::new(), &DriverConfig::default()).unwrap()
    }

    fn place(d: &mut Driver, rect: Rect, priority: Priority) -> ElementId {
        let id = d.next_element();
        d.scene_mut().push_back(id, rect, priority);
        id
    }

    struct Counter {
        element: ElementId,
        shown: Rc<Cell<u32>>,
        writes: Rc<Cell<u32>>,
    }

    impl View<ElementId> for Counter {
        fn element(&self) -> ElementId {
            self.element
        }
    }

    impl ModelView<ElementId> for Counter {
        type Model = u32;

        fn apply_model(&mut self, model: &u32) {
            self.shown.set(*model);
            self.writes.set(self.writes.get() + 1);
        }
    }

    const TICK: Duration = Duration::from_millis(16);

    #[test]
    fn pointer_then_tap_reaches_the_high_priority_element() {
        let mut d = driver();
        let shared = Rect::new(0.0, 0.0, 100.0, 100.0);
        let low = place(&mut d, shared, Priority::Default);
        let high = place(&mut d, shared, Priority::High);
        for id in [low, high] {
            d.router_mut()
                .register_tap(id, move |d: &mut Driver| d.state_mut().taps.push(id))
                .unwrap();
        }

        d.handle(InputEvent::PointerMoved(Point::new(10.0, 10.0)));
        assert_eq!(d.handle(InputEvent::Tap), 1);
        assert_eq!(d.state().taps, [high]);

        d.router_mut().set_mode(InputMode::Global);
        assert_eq!(d.handle(InputEvent::Tap), 2);
    }

    #[test]
    fn model_updates_from_handlers_are_batched_to_the_tick_end() {
        let mut d = driver();
        let element = place(&mut d, Rect::new(0.0, 0.0, 10.0, 10.0), Priority::Default);
        let shown = Rc::new(Cell::new(0));
        let writes = Rc::new(Cell::new(0));
        let ctl = d.controllers_mut().insert_bound(
            Counter {
                element,
                shown: shown.clone(),
                writes: writes.clone(),
            },
            0,
        );
        assert_eq!(writes.get(), 1);
        d.router_mut()
            .register_tap(element, move |d: &mut Driver| {
                let _ = d.controllers_mut().update_model(ctl, |n: &mut u32| *n += 1);
            })
            .unwrap();

        d.handle(InputEvent::PointerMoved(Point::new(5.0, 5.0)));
        for _ in 0..3 {
            d.handle(InputEvent::Tap);
        }
        assert_eq!(shown.get(), 0);
        let stats = d.frame(TICK);
        assert_eq!(stats.refreshed, 1);
        assert_eq!((shown.get(), writes.get()), (3, 2));
    }

    #[test]
    fn hold_spans_ticks() {
        let mut d = driver();
        let element = place(&mut d, Rect::new(0.0, 0.0, 10.0, 10.0), Priority::Default);
        let handlers = HoldHandlers::with_threshold(TICK * 2)
            .on_start(|d: &mut Driver| d.state_mut().holds.push("start"))
            .on_frame(|d: &mut Driver| d.state_mut().holds.push("frame"))
            .on_release(|d: &mut Driver| d.state_mut().holds.push("release"));
        d.router_mut().register_hold(element, handlers).unwrap();

        d.handle(InputEvent::PointerMoved(Point::new(5.0, 5.0)));
        d.handle(InputEvent::Hold);
        for _ in 0..4 {
            d.frame(TICK);
        }
        d.handle(InputEvent::Hold);
        assert_eq!(d.state().holds, ["start", "frame", "frame", "release"]);
    }

    #[test]
    fn gamepad_navigation_moves_focus() {
        let mut d = driver();
        let left = place(&mut d, Rect::new(0.0, 0.0, 10.0, 10.0), Priority::Default);
        let right = place(&mut d, Rect::new(50.0, 0.0, 60.0, 10.0), Priority::Default);
        for id in [left, right] {
            d.router_mut()
                .register_focus(
                    id,
                    FocusHandlers::new(
                        move |d: &mut Driver| d.state_mut().focused.push((id, true)),
                        move |d: &mut Driver| d.state_mut().focused.push((id, false)),
                    ),
                )
                .unwrap();
        }

        d.handle(InputEvent::PointerMoved(Point::new(5.0, 5.0)));
        d.handle(InputEvent::ControlsChanged(ControlScheme::Gamepad));
        assert_eq!(d.router().mode(), InputMode::Direct);
        d.handle(InputEvent::Navigate(Vec2::new(1.0, 0.0)));
        assert_eq!(d.router().active(), Some(right));
        assert_eq!(
            d.state().focused,
            [(left, true), (left, false), (right, true)]
        );

        // Pointer moves are ignored for targeting while in direct mode.
        d.handle(InputEvent::PointerMoved(Point::new(5.0, 5.0)));
        assert_eq!(d.router().active(), Some(right));
        d.handle(InputEvent::ControlsChanged(ControlScheme::Pointer));
        assert_eq!(d.router().mode(), InputMode::Targeted);
    }

    #[test]
    fn jobs_enqueued_elsewhere_run_on_the_owning_loop() {
        let mut d = driver();
        let remote = d.scheduler().clone();
        std::thread::spawn(move || {
            remote.enqueue(TickPhase::PostRender, |d: &mut Driver| d.state_mut().backs += 10);
        })
        .join()
        .unwrap();
        d.ticker_mut()
            .add(TICK, TickPhase::PrePhysics, |d: &mut Driver| d.state_mut().backs += 1);

        let stats = d.frame(TICK);
        assert_eq!(stats.jobs, 2);
        assert_eq!(d.state().backs, 11);
    }

    #[test]
    #[traced_test]
    fn back_closes_the_panel_and_its_registrations() {
        let mut d = driver();
        let panel_el = place(&mut d, Rect::new(0.0, 0.0, 100.0, 100.0), Priority::Default);
        let button_el = place(&mut d, Rect::new(10.0, 10.0, 20.0, 20.0), Priority::High);
        let template = |scope: &Affine| Counter {
            element: if *scope == Affine::IDENTITY { panel_el } else { button_el },
            shown: Rc::default(),
            writes: Rc::default(),
        };
        let panel = d
            .controllers_mut()
            .instantiate_bound(&template, None, 0)
            .unwrap();
        let button = d
            .controllers_mut()
            .instantiate_bound(&template, Some(&Affine::translate((10.0, 10.0))), 0)
            .unwrap();
        d.controllers_mut().add_child(panel, button).unwrap();

        d.router_mut()
            .register_tap(button_el, |d: &mut Driver| d.state_mut().backs += 100)
            .unwrap();
        d.router_mut()
            .register_back(panel_el, move |d: &mut Driver| {
                d.state_mut().backs += 1;
                let _ = d.close_controller(panel);
            })
            .unwrap();

        let press = d.hold_handlers();
        d.router_mut().register_hold(button_el, press).unwrap();
        d.router_mut()
            .register_focus(panel_el, FocusHandlers::default())
            .unwrap();
        assert_eq!(
            d.router().registrations_of(&button_el),
            GestureKinds::TAP | GestureKinds::HOLD
        );
        assert_eq!(
            d.router().registrations_of(&panel_el),
            GestureKinds::BACK | GestureKinds::FOCUS
        );

        d.handle(InputEvent::PointerMoved(Point::new(15.0, 15.0)));
        assert_eq!(d.router().active(), Some(button_el));
        assert_eq!(d.handle(InputEvent::Back), 1);

        assert!(d.controllers().is_empty());
        assert!(d.router().registrations_of(&button_el).is_empty());
        assert!(d.router().registrations_of(&panel_el).is_empty());
        assert_eq!(d.router().active(), None);
        assert!(d.scene().is_empty());
        assert_eq!(d.handle(InputEvent::Back), 0);
        // A global tap would reach any entry the close left behind.
        d.router_mut().set_mode(InputMode::Global);
        assert_eq!(d.handle(InputEvent::Tap), 0);
        assert_eq!(d.state().backs, 1);
        assert!(logs_contain("closed controller subtree"));
    }

    #[test]
    fn closing_a_stale_controller_fails() {
        let mut d = driver();
        let element = d.next_element();
        let id = d.controllers_mut().insert(Counter {
            element,
            shown: Rc::default(),
            writes: Rc::default(),
        });
        d.close_controller(id).unwrap();
        assert!(matches!(
            d.close_controller(id),
            Err(DriverError::Controller(_))
        ));
    }

    #[test]
    #[traced_test]
    fn control_scheme_changes_are_logged() {
        let mut d = driver();
        d.handle(InputEvent::ControlsChanged(ControlScheme::Gamepad));
        assert!(logs_contain("control scheme changed"));
    }
}
