#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod logger;
mod meter;
mod style;

use meter::MeterDisplay;
use meter::registry::Registry;

use data::{DisplayId, ScaleFactor};
use exchange::adapter::replay::{self, ReplayConfig};
use exchange::adapter::simulated::{self, FeedConfig};

use iced::widget::{button, column, container, row, space, text};
use iced::{Alignment, Element, Length, Subscription, Task, keyboard, window};
use std::path::PathBuf;
use std::time::Duration;

const FEED_INTERVAL: Duration = Duration::from_millis(250);
const REPLAY_ENV: &str = "DAYRANGE_REPLAY";

fn main() {
    logger::setup(cfg!(debug_assertions)).expect("Failed to initialize logger");

    std::panic::set_hook(Box::new(|info| {
        let location = info.location().map_or_else(
            || "unknown location".to_string(),
            |loc| format!("{}:{}:{}", loc.file(), loc.line(), loc.column()),
        );
        let msg = if let Some(s) = info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic".to_string()
        };
        log::error!("PANIC at {location}: {msg}");
        eprintln!("PANIC at {location}: {msg}");
    }));

    let _ = iced::application(DayRange::new, DayRange::update, DayRange::view)
        .title(DayRange::title)
        .scale_factor(DayRange::scale_factor)
        .subscription(DayRange::subscription)
        .window(window::Settings {
            exit_on_close_request: false,
            ..Default::default()
        })
        .antialiasing(true)
        .run();
}

enum Feed {
    Simulated(FeedConfig),
    Replay(ReplayConfig),
}

impl Feed {
    fn from_env(symbols: Vec<String>) -> Self {
        match std::env::var_os(REPLAY_ENV) {
            Some(path) => {
                log::info!("Replay requested via {REPLAY_ENV}");
                Feed::Replay(ReplayConfig {
                    path: PathBuf::from(path),
                    interval: FEED_INTERVAL,
                })
            }
            None => Feed::Simulated(FeedConfig {
                symbols,
                interval: FEED_INTERVAL,
            }),
        }
    }

    fn subscription(&self) -> Subscription<exchange::Event> {
        match self {
            Feed::Simulated(config) => {
                let builder = |cfg: &FeedConfig| simulated::connect(cfg.clone());
                Subscription::run_with(config.clone(), builder)
            }
            Feed::Replay(config) => {
                let builder = |cfg: &ReplayConfig| replay::connect(cfg.clone());
                Subscription::run_with(config.clone(), builder)
            }
        }
    }
}

struct DayRange {
    state: data::State,
    displays: Vec<MeterDisplay>,
    feed: Feed,
    feed_notice: Option<String>,
}

#[derive(Debug, Clone)]
enum Message {
    Feed(exchange::Event),
    Display(DisplayId, meter::Message),
    ToggleLadder,
    ToggleBoundaries,
    ScaleFactorChanged(ScaleFactor),
    WindowRescaled(f32),
    CloseRequested(window::Id),
}

impl DayRange {
    fn new() -> (Self, Task<Message>) {
        let state = data::load_state();
        let registry = Registry::with_builtin();

        let displays: Vec<MeterDisplay> = state
            .displays
            .iter()
            .filter_map(|spec| {
                MeterDisplay::new(
                    spec,
                    &registry,
                    state.render.clone(),
                    state.interaction,
                    state.scale_factor,
                )
                .inspect_err(|e| log::error!("Skipping display {}: {e}", spec.symbol))
                .ok()
            })
            .collect();

        let symbols = displays.iter().map(|d| d.symbol().to_string()).collect();

        let app = Self {
            feed: Feed::from_env(symbols),
            state,
            displays,
            feed_notice: None,
        };
        let window_factor = window::latest()
            .and_then(window::scale_factor)
            .map(Message::WindowRescaled);

        (app, window_factor)
    }

    fn title(&self) -> String {
        let symbols: Vec<&str> = self.displays.iter().map(MeterDisplay::symbol).collect();
        format!("Day Range - {}", symbols.join(" · "))
    }

    fn scale_factor(&self) -> f32 {
        self.state.scale_factor.into()
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Feed(event) => match event {
                exchange::Event::Connected(source) => {
                    log::info!("{source} feed connected");
                    self.feed_notice = None;
                }
                exchange::Event::Disconnected(source, reason) => {
                    log::warn!("{source} feed disconnected: {reason}");
                    self.feed_notice = Some(format!("{source}: {reason}"));
                }
                exchange::Event::SnapshotReceived(raw) => {
                    for display in &mut self.displays {
                        display.on_snapshot(&raw);
                    }
                }
            },
            Message::Display(id, message) => {
                let Some(display) = self.displays.iter_mut().find(|d| d.id() == id) else {
                    log::warn!("Message for unknown display {:?}", id.0);
                    return Task::none();
                };

                if let Some(meter::Action::MarkerChanged(change)) = display.update(message) {
                    self.state.apply_marker_change(&change);
                }
            }
            Message::ToggleLadder => {
                let features = &mut self.state.render.features;
                features.percentage_ladder = !features.percentage_ladder;
                self.push_render_config();
            }
            Message::ToggleBoundaries => {
                let features = &mut self.state.render.features;
                features.boundaries = !features.boundaries;
                features.reference_lines = features.boundaries;
                self.push_render_config();
            }
            Message::ScaleFactorChanged(value) => {
                self.state.scale_factor = value;
                for display in &mut self.displays {
                    display.set_scale_factor(value);
                }
            }
            Message::WindowRescaled(factor) => {
                log::debug!("Window scale factor: {factor}");
                for display in &mut self.displays {
                    display.set_window_factor(factor);
                }
            }
            Message::CloseRequested(window) => {
                if let Err(e) = data::save_state(&self.state) {
                    log::error!("Failed to save state on exit: {e}");
                }
                return window::close(window);
            }
        }

        Task::none()
    }

    fn push_render_config(&mut self) {
        for display in &mut self.displays {
            display.set_config(self.state.render.clone());
        }
    }

    fn view(&self) -> Element<'_, Message> {
        let features = &self.state.render.features;

        let scale_factor = {
            let current_value: f32 = self.state.scale_factor.into();

            let decrease_btn = if current_value > data::config::MIN_SCALE {
                button(text("-"))
                    .on_press(Message::ScaleFactorChanged((current_value - 0.1).into()))
            } else {
                button(text("-"))
            };

            let increase_btn = if current_value < data::config::MAX_SCALE {
                button(text("+"))
                    .on_press(Message::ScaleFactorChanged((current_value + 0.1).into()))
            } else {
                button(text("+"))
            };

            row![
                decrease_btn,
                text(format!("{:.0}%", current_value * 100.0)).size(style::TOOLBAR_TEXT_SIZE),
                increase_btn,
            ]
            .align_y(Alignment::Center)
            .spacing(6)
        };

        let toggle = |label: &'static str, active: bool, message: Message| {
            button(text(label).size(style::TOOLBAR_TEXT_SIZE))
                .style(move |theme, status| style::toggle_button(theme, status, active))
                .on_press(message)
        };

        let notice = self.feed_notice.as_deref().map(|notice| {
            text(notice.to_string())
                .size(style::TOOLBAR_TEXT_SIZE)
                .font(style::MONO)
        });

        let mut controls = row![
            toggle("Ladder", features.percentage_ladder, Message::ToggleLadder),
            toggle("Boundaries", features.boundaries, Message::ToggleBoundaries),
            space::horizontal(),
        ]
        .spacing(8)
        .align_y(Alignment::Center);

        if let Some(notice) = notice {
            controls = controls.push(notice);
        }

        let toolbar = container(controls.push(scale_factor))
            .padding(4)
            .style(style::toolbar);

        let meters = row(self.displays.iter().map(|display| {
            let id = display.id();

            column![
                text(display.symbol().to_string())
                    .size(style::TOOLBAR_TEXT_SIZE + 2.0)
                    .font(style::MONO),
                display
                    .view()
                    .map(move |message| Message::Display(id, message)),
            ]
            .spacing(4)
            .width(Length::Fill)
            .into()
        }))
        .spacing(8)
        .height(Length::Fill);

        column![toolbar, meters].spacing(8).padding(8).into()
    }

    fn subscription(&self) -> Subscription<Message> {
        let feed = self.feed.subscription().map(Message::Feed);
        let close_requests = window::close_requests().map(Message::CloseRequested);
        let rescaled = window::events().filter_map(|(_, event)| match event {
            window::Event::Rescaled(factor) => Some(Message::WindowRescaled(factor)),
            _ => None,
        });

        let hotkeys = keyboard::listen().filter_map(|event| {
            let keyboard::Event::KeyPressed { key, modifiers, .. } = event else {
                return None;
            };
            if modifiers.command() || modifiers.alt() {
                return None;
            }

            match key.as_ref() {
                keyboard::Key::Character("l") => Some(Message::ToggleLadder),
                keyboard::Key::Character("b") => Some(Message::ToggleBoundaries),
                _ => None,
            }
        });

        Subscription::batch(vec![feed, close_requests, rescaled, hotkeys])
    }
}
