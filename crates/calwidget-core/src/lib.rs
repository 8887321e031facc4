//! Core types: events, day grouping, palettes, view state, config

pub mod agenda;
pub mod config;
pub mod event;
pub mod locale;
pub mod theme;
pub mod time;
pub mod tracing;
pub mod view;

pub use agenda::{AgendaRow, DayGroup, PlaceholderKind, group_by_day, render_agenda};
pub use config::{ConfigError, WidgetConfig};
pub use event::NormalizedEvent;
pub use theme::{Theme, ThemePalette};
pub use time::TimeWindow;
pub use crate::tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
pub use view::ViewState;
