use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::{Arc, mpsc};
use std::time::Duration;

use chrono::Local;
use gtk4 as gtk;
use gtk4::glib;
use gtk4::prelude::*;
use libadwaita as adw;
use tokio::runtime::Runtime;
use tracing::{debug, info, warn};

use calwidget_core::theme::stylesheet;
use calwidget_core::{NormalizedEvent, Theme, ViewState, WidgetConfig};
use calwidget_providers::{CalendarProvider, load_month};

use crate::error::AppError;
use crate::widgets::window::{UiWidgets, build as build_window};
use crate::widgets::{event_row, header_icon};

const APP_ID: &str = "io.github.calwidget.Agenda";
const DRAIN_INTERVAL: Duration = Duration::from_millis(100);

/// The agenda widget: one window at a time, rebuilt on theme changes.
pub struct CalendarApp {
    config: WidgetConfig,
    runtime: Arc<Runtime>,
    provider: Arc<dyn CalendarProvider>,
    http: reqwest::Client,
}

#[derive(Debug)]
enum UiEvent {
    EventsLoaded(Vec<NormalizedEvent>),
    FetchFailed(String),
    IconLoaded(Vec<u8>),
    IconFailed(String),
}

/// State shared by every window of the process.
struct Session {
    config: WidgetConfig,
    runtime: Arc<Runtime>,
    provider: Arc<dyn CalendarProvider>,
    http: reqwest::Client,
    theme: Cell<Theme>,
    icon: RefCell<Option<glib::Bytes>>,
    css: gtk::CssProvider,
}

impl CalendarApp {
    pub fn new(
        config: WidgetConfig,
        runtime: Arc<Runtime>,
        provider: Arc<dyn CalendarProvider>,
    ) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            config,
            runtime,
            provider,
            http,
        })
    }

    pub fn run(self) -> glib::ExitCode {
        if let Err(e) = adw::init() {
            tracing::error!(error = %e, "failed to initialise libadwaita");
            return glib::ExitCode::FAILURE;
        }

        let app = adw::Application::builder().application_id(APP_ID).build();

        let pending = RefCell::new(Some(self));
        app.connect_activate(move |app| {
            if let Some(window) = app.active_window() {
                window.present();
                return;
            }
            let Some(this) = pending.borrow_mut().take() else {
                return;
            };
            let session = Rc::new(Session::new(this));
            open_window(app, &session);
        });

        // No command-line handling: GApplication would reject unknown flags
        app.run_with_args::<&str>(&[])
    }
}

impl Session {
    fn new(app: CalendarApp) -> Self {
        let css = gtk::CssProvider::new();
        if let Some(display) = gtk::gdk::Display::default() {
            gtk::style_context_add_provider_for_display(
                &display,
                &css,
                gtk::STYLE_PROVIDER_PRIORITY_APPLICATION,
            );
        }

        Self {
            theme: Cell::new(Theme::from_dark(app.config.dark_mode)),
            config: app.config,
            runtime: app.runtime,
            provider: app.provider,
            http: app.http,
            icon: RefCell::new(None),
            css,
        }
    }

    fn apply_theme(&self, theme: Theme) {
        let scheme = if theme.is_dark() {
            adw::ColorScheme::ForceDark
        } else {
            adw::ColorScheme::ForceLight
        };
        adw::StyleManager::default().set_color_scheme(scheme);
        self.css.load_from_string(&stylesheet(theme.palette()));
    }
}

fn open_window(app: &adw::Application, session: &Rc<Session>) {
    let theme = session.theme.get();
    session.apply_theme(theme);

    let widgets = Rc::new(build_window(app, theme, Local::now().date_naive()));
    render_state(&widgets, &ViewState::Loading);

    let (ui_tx, ui_rx) = mpsc::channel::<UiEvent>();
    let mut timers = Vec::with_capacity(2);

    {
        let widgets = widgets.clone();
        let session = session.clone();
        timers.push(glib::timeout_add_local(DRAIN_INTERVAL, move || {
            while let Ok(event) = ui_rx.try_recv() {
                handle_event(&session, &widgets, event);
            }
            glib::ControlFlow::Continue
        }));
    }

    {
        let widgets = widgets.clone();
        let session = session.clone();
        let ui_tx = ui_tx.clone();
        timers.push(glib::timeout_add_local(
            session.config.refresh_interval(),
            move || {
                trigger_refresh(&session, &widgets, &ui_tx);
                glib::ControlFlow::Continue
            },
        ));
    }

    {
        let weak_widgets = Rc::downgrade(&widgets);
        let session = session.clone();
        let ui_tx = ui_tx.clone();
        glib::timeout_add_local_once(session.config.initial_delay(), move || {
            if let Some(widgets) = weak_widgets.upgrade() {
                trigger_refresh(&session, &widgets, &ui_tx);
            }
        });
    }

    load_icon(session, &widgets, ui_tx);
    connect_actions(app, session, &widgets);

    let timers = RefCell::new(timers);
    widgets.window.connect_destroy(move |_| {
        for id in timers.borrow_mut().drain(..) {
            id.remove();
        }
        debug!("window destroyed, timers removed");
    });

    widgets.window.present();
}

fn connect_actions(app: &adw::Application, session: &Rc<Session>, widgets: &UiWidgets) {
    {
        let window = widgets.window.downgrade();
        widgets.close_button.connect_clicked(move |_| {
            if let Some(window) = window.upgrade() {
                window.close();
            }
        });
    }

    {
        let app = app.downgrade();
        let window = widgets.window.downgrade();
        let session = session.clone();
        widgets.dark_switch.connect_state_set(move |_, active| {
            let app = app.clone();
            let window = window.clone();
            let session = session.clone();
            // Rebuild outside the signal handler that belongs to the old window
            glib::idle_add_local_once(move || {
                let (Some(app), Some(old)) = (app.upgrade(), window.upgrade()) else {
                    return;
                };
                let theme = Theme::from_dark(active);
                if theme == session.theme.get() {
                    return;
                }
                info!(dark = active, "switching theme");
                session.theme.set(theme);

                let _hold = app.hold();
                open_window(&app, &session);
                old.destroy();
            });
            glib::Propagation::Proceed
        });
    }
}

fn trigger_refresh(session: &Session, widgets: &UiWidgets, ui_tx: &mpsc::Sender<UiEvent>) {
    render_state(widgets, &ViewState::Loading);

    let provider = session.provider.clone();
    let max_results = session.config.max_results;
    let calendar_id = session.config.calendar_id.clone();
    let ui_tx = ui_tx.clone();

    session.runtime.spawn(async move {
        let event = match load_month(provider.as_ref(), max_results, &calendar_id, Local::now()).await
        {
            Ok(events) => UiEvent::EventsLoaded(events),
            Err(e) => {
                warn!(error = %e, "refresh failed");
                UiEvent::FetchFailed(e.to_string())
            }
        };
        // The window may be gone by now
        let _ = ui_tx.send(event);
    });
}

fn load_icon(session: &Session, widgets: &UiWidgets, ui_tx: mpsc::Sender<UiEvent>) {
    if let Some(bytes) = session.icon.borrow().as_ref() {
        show_icon(widgets, bytes);
        return;
    }

    let client = session.http.clone();
    let url = session.config.icon_url.clone();
    session.runtime.spawn(async move {
        let event = match header_icon::fetch(&client, &url).await {
            Ok(bytes) => UiEvent::IconLoaded(bytes),
            Err(e) => UiEvent::IconFailed(e.to_string()),
        };
        let _ = ui_tx.send(event);
    });
}

/// Returns false when the bytes could not be decoded.
fn show_icon(widgets: &UiWidgets, bytes: &glib::Bytes) -> bool {
    match header_icon::image_from_bytes(bytes) {
        Ok(image) => {
            header_icon::show(&widgets.icon_slot, &image);
            true
        }
        Err(e) => {
            warn!(error = %e, "failed to decode header icon");
            false
        }
    }
}

fn handle_event(session: &Session, widgets: &UiWidgets, event: UiEvent) {
    match event {
        UiEvent::EventsLoaded(events) => {
            let state = ViewState::loaded(&events, Local::now().date_naive());
            render_state(widgets, &state);
        }
        UiEvent::FetchFailed(message) => {
            render_state(widgets, &ViewState::failed(message));
        }
        UiEvent::IconLoaded(bytes) => {
            let bytes = glib::Bytes::from_owned(bytes);
            if show_icon(widgets, &bytes) {
                *session.icon.borrow_mut() = Some(bytes);
            }
        }
        UiEvent::IconFailed(err) => {
            warn!(error = %err, "failed to download header icon");
        }
    }
}

fn render_state(widgets: &UiWidgets, state: &ViewState) {
    if let Some(count) = state.count_label() {
        widgets.count_label.set_label(&count);
    }
    event_row::render(&widgets.event_list, &state.rows());
}
