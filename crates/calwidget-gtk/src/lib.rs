pub mod application;
pub mod error;
pub mod widgets;

pub use application::CalendarApp;
pub use error::AppError;
