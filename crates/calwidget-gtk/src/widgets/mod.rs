pub mod event_row;
pub mod header_icon;
pub mod window;
