// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mission board: controllers, gestures and batched redraws driven by a script.
//!
//! This example shows how to combine:
//! - `understory_ui_driver` to feed input events and ticks,
//! - `understory_gesture` registrations (hold, alt-tap, focus, scroll, back),
//! - `understory_controller` for the selector panel that owns buttons and missions.
//!
//! A "new mission" button spawns draggable mission cards. Scrolling over a card
//! cycles its colour, alt-tap toggles its radial menu, hovering shows its
//! details, back closes every card, and the close button closes the panel with
//! everything it owns.
//!
//! Run:
//! - `cargo run -p understory_demos --example mission_board`
//! - `RUST_LOG=debug cargo run -p understory_demos --example mission_board` to see routing decisions.

use std::time::Duration;

use kurbo::{Affine, Point, Rect, Size, Vec2};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use understory_controller::types::ControllerId;
use understory_controller::view::{ModelView, View};
use understory_gesture::handlers::{FocusHandlers, HoldHandlers, ScrollHandlers};
use understory_gesture::stack::HitStack;
use understory_gesture::types::Priority;
use understory_ui_driver::config::DriverConfig;
use understory_ui_driver::driver::{TickStats, UiDriver};
use understory_ui_driver::element::ElementId;
use understory_ui_driver::error::DriverError;
use understory_ui_driver::event::{ControlScheme, InputEvent};

const CONFIG: &str = r#"
mode = "targeted"
hold_threshold_secs = 0.0
navigate_step = 2.0
screen_width = 800.0
screen_height = 600.0
"#;

const CARD: Size = Size::new(80.0, 40.0);
const COLORS: [&str; 4] = ["white", "blue", "green", "red"];

type Driver = UiDriver<Board, HitStack<ElementId>>;

/// Application state reachable from every handler.
#[derive(Debug, Default)]
struct Board {
    selector: Option<ControllerId>,
    drag_offset: Vec2,
    created: u32,
}

#[derive(Clone, Debug)]
struct MissionModel {
    color: usize,
    pos: Point,
    radial: bool,
    details: bool,
}

struct MissionView {
    element: ElementId,
    name: String,
}

impl View<ElementId> for MissionView {
    fn element(&self) -> ElementId {
        self.element
    }

    fn destroy(&mut self) {
        info!(mission = %self.name, "mission card removed");
    }
}

impl ModelView<ElementId> for MissionView {
    type Model = MissionModel;

    fn apply_model(&mut self, m: &MissionModel) {
        info!(
            mission = %self.name,
            color = COLORS[m.color],
            x = m.pos.x,
            y = m.pos.y,
            radial = m.radial,
            details = m.details,
            "mission card drawn"
        );
    }
}

#[derive(Clone, Debug, Default)]
struct ButtonModel {
    held: bool,
}

struct ButtonView {
    element: ElementId,
    label: &'static str,
}

impl View<ElementId> for ButtonView {
    fn element(&self) -> ElementId {
        self.element
    }
}

impl ModelView<ElementId> for ButtonView {
    type Model = ButtonModel;

    fn apply_model(&mut self, m: &ButtonModel) {
        info!(button = self.label, held = m.held, "button drawn");
    }
}

struct PanelView {
    element: ElementId,
}

impl View<ElementId> for PanelView {
    fn element(&self) -> ElementId {
        self.element
    }

    fn set_visible(&mut self, visible: bool) {
        info!(visible, "selector panel visibility");
    }

    fn destroy(&mut self) {
        info!("selector panel closed");
    }
}

/// A button that shows "held" while pressed and clicks on release.
fn button(
    d: &mut Driver,
    parent: ControllerId,
    label: &'static str,
    rect: Rect,
    on_click: fn(&mut Driver),
) -> Result<ControllerId, DriverError> {
    let element = d.next_element();
    d.scene_mut().push_front(element, rect, Priority::High);
    let ctl = d.controllers_mut().instantiate_bound(
        &|_: &Affine| ButtonView { element, label },
        Some(&Affine::translate(rect.origin().to_vec2())),
        ButtonModel::default(),
    )?;
    d.controllers_mut().add_child(parent, ctl)?;

    let handlers = d
        .hold_handlers()
        .on_start(move |d: &mut Driver| {
            let _ = d
                .controllers_mut()
                .update_model(ctl, |m: &mut ButtonModel| m.held = true);
        })
        .on_release(move |d: &mut Driver| {
            let _ = d
                .controllers_mut()
                .update_model(ctl, |m: &mut ButtonModel| m.held = false);
            on_click(d);
        });
    d.router_mut().register_hold(element, handlers)?;
    Ok(ctl)
}

fn open_selector(d: &mut Driver) -> Result<ControllerId, DriverError> {
    let element = d.next_element();
    let selector = d
        .controllers_mut()
        .instantiate(&|_: &Affine| PanelView { element }, None)?;
    d.controllers_mut().acquire_activity(selector);
    d.controllers_mut().show(selector);
    d.state_mut().selector = Some(selector);

    button(
        d,
        selector,
        "new mission",
        Rect::new(20.0, 20.0, 140.0, 60.0),
        |d| {
            if let Err(err) = create_mission(d) {
                warn!(%err, "could not create mission");
            }
        },
    )?;
    button(
        d,
        selector,
        "close",
        Rect::new(160.0, 20.0, 280.0, 60.0),
        |d| {
            if let Some(selector) = d.state_mut().selector.take()
                && let Err(err) = d.close_controller(selector)
            {
                warn!(%err, "could not close selector");
            }
        },
    )?;
    Ok(selector)
}

fn create_mission(d: &mut Driver) -> Result<(), DriverError> {
    let Some(selector) = d.state().selector else {
        return Ok(());
    };
    d.state_mut().created += 1;
    let n = d.state().created;
    let name = format!("mission-{n}");
    let origin = Point::new(40.0 + 30.0 * f64::from(n), 120.0);

    let element = d.next_element();
    d.scene_mut()
        .push_front(element, Rect::from_origin_size(origin, CARD), Priority::Default);
    let mission = d.controllers_mut().instantiate_bound(
        &move |_: &Affine| MissionView {
            element,
            name: name.clone(),
        },
        Some(&Affine::translate(origin.to_vec2())),
        MissionModel {
            color: 0,
            pos: origin,
            radial: false,
            details: false,
        },
    )?;
    d.controllers_mut().add_child(selector, mission)?;

    let update = move |d: &mut Driver, f: &dyn Fn(&mut MissionModel)| {
        let _ = d.controllers_mut().update_model(mission, |m: &mut MissionModel| f(m));
    };

    let drag = HoldHandlers::with_threshold(Duration::ZERO)
        .on_start(move |d: &mut Driver| {
            let pos = d.controllers().model::<MissionModel>(mission).map(|m| m.pos);
            if let Some(pos) = pos {
                d.state_mut().drag_offset = pos - d.router().pointer();
            }
        })
        .on_frame(move |d: &mut Driver| {
            let to = d.router().pointer() + d.state().drag_offset;
            update(d, &|m| {
                m.radial = false;
                m.pos = to;
            });
            d.scene_mut()
                .set_bounds(element, Rect::from_origin_size(to, CARD));
        });

    let router = d.router_mut();
    router.register_hold(element, drag)?;
    router.register_alt_tap(element, move |d: &mut Driver| {
        update(d, &|m| m.radial = !m.radial);
    })?;
    router.register_focus(
        element,
        FocusHandlers::new(
            move |d: &mut Driver| update(d, &|m| m.details = true),
            move |d: &mut Driver| update(d, &|m| m.details = false),
        ),
    )?;
    router.register_scroll(
        element,
        ScrollHandlers::new(
            move |d: &mut Driver| update(d, &|m| m.color = (m.color + 1) % COLORS.len()),
            move |d: &mut Driver| {
                update(d, &|m| m.color = (m.color + COLORS.len() - 1) % COLORS.len());
            },
        ),
    )?;
    router.register_back(element, move |d: &mut Driver| {
        if let Err(err) = d.close_controller(mission) {
            warn!(%err, "could not close mission");
        }
    })?;
    info!(%n, "mission created");
    Ok(())
}

enum Step {
    Input(InputEvent),
    Frame,
}

fn script() -> Vec<Step> {
    use InputEvent::*;
    use Step::{Frame, Input};
    vec![
        // Two clicks on "new mission".
        Input(PointerMoved(Point::new(30.0, 30.0))),
        Input(Hold),
        Frame,
        Input(Hold),
        Frame,
        Input(Hold),
        Frame,
        Input(Hold),
        Frame,
        // Hover the front card and cycle its colour: three scrolls, one redraw.
        Input(PointerMoved(Point::new(110.0, 130.0))),
        Frame,
        Input(Scroll(1.0)),
        Input(Scroll(1.0)),
        Input(Scroll(-1.0)),
        Frame,
        Input(AltTap),
        Frame,
        // Drag it away.
        Input(Hold),
        Frame,
        Input(PointerMoved(Point::new(300.0, 300.0))),
        Frame,
        Input(PointerMoved(Point::new(400.0, 350.0))),
        Frame,
        Input(Hold),
        Frame,
        // Gamepad: step left onto the other card.
        Input(ControlsChanged(ControlScheme::Gamepad)),
        Input(PointerMoved(Point::new(400.0, 140.0))),
        Input(Navigate(Vec2::new(-1.0, 0.0))),
        Frame,
        Input(ControlsChanged(ControlScheme::Pointer)),
        // Back closes every card.
        Input(Back),
        Frame,
        // Close the panel.
        Input(PointerMoved(Point::new(200.0, 40.0))),
        Input(Hold),
        Frame,
        Input(Hold),
        Frame,
    ]
}

fn main() -> Result<(), DriverError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = DriverConfig::from_toml_str(CONFIG)?;
    let mut driver: Driver = UiDriver::new(Board::default(), HitStack::new(), &config)?;
    open_selector(&mut driver)?;

    let tick = Duration::from_millis(16);
    for step in script() {
        match step {
            Step::Input(event) => {
                let handled = driver.handle(event);
                info!(?event, handled, "input");
            }
            Step::Frame => {
                let stats = driver.frame(tick);
                if stats != TickStats::default() {
                    info!(?stats, "frame");
                }
            }
        }
    }

    info!(
        controllers = driver.controllers().len(),
        scene = driver.scene().len(),
        "board finished"
    );
    Ok(())
}
