use chrono::NaiveDate;
use gtk4 as gtk;
use gtk4::prelude::*;
use libadwaita as adw;
use libadwaita::prelude::*;

use calwidget_core::{Theme, locale};

use crate::widgets::header_icon;

pub const LIST_WIDTH: i32 = 320;
pub const LIST_HEIGHT: i32 = 400;
pub const CLOSE_GLYPH: &str = "✕";

#[derive(Clone)]
pub struct UiWidgets {
    pub window: adw::ApplicationWindow,
    pub icon_slot: gtk::Box,
    pub title_label: gtk::Label,
    pub count_label: gtk::Label,
    pub dark_switch: gtk::Switch,
    pub close_button: gtk::Button,
    pub event_list: gtk::Box,
}

pub fn build(app: &adw::Application, theme: Theme, today: NaiveDate) -> UiWidgets {
    let window = adw::ApplicationWindow::builder()
        .application(app)
        .title("Agenda")
        .decorated(false)
        .resizable(false)
        .build();
    window.add_css_class("agenda-window");

    let card = gtk::Box::new(gtk::Orientation::Vertical, 6);
    card.add_css_class("agenda-card");

    // Header doubles as the drag handle
    let header = gtk::Box::new(gtk::Orientation::Horizontal, 6);

    let icon_slot = gtk::Box::new(gtk::Orientation::Horizontal, 0);
    icon_slot.set_valign(gtk::Align::Center);
    icon_slot.append(&header_icon::placeholder());
    header.append(&icon_slot);

    let title_label = gtk::Label::builder()
        .label(locale::agenda_title(today))
        .xalign(0.0)
        .css_classes(["agenda-title"])
        .build();
    header.append(&title_label);

    let count_label = gtk::Label::builder()
        .label("")
        .xalign(0.0)
        .hexpand(true)
        .css_classes(["agenda-count"])
        .build();
    header.append(&count_label);

    let dark_label = gtk::Label::builder()
        .label(locale::DARK_MODE)
        .css_classes(["agenda-dark-label"])
        .build();
    header.append(&dark_label);

    let dark_switch = gtk::Switch::builder()
        .active(theme.is_dark())
        .valign(gtk::Align::Center)
        .build();
    header.append(&dark_switch);

    let close_button = gtk::Button::builder()
        .label(CLOSE_GLYPH)
        .css_classes(["flat", "agenda-close"])
        .build();
    header.append(&close_button);

    let handle = gtk::WindowHandle::builder().child(&header).build();
    card.append(&handle);

    let separator = gtk::Separator::new(gtk::Orientation::Horizontal);
    separator.add_css_class("agenda-separator");
    card.append(&separator);

    let event_list = gtk::Box::new(gtk::Orientation::Vertical, 4);

    // External keeps wheel scrolling but never draws the bar
    let scroller = gtk::ScrolledWindow::builder()
        .hscrollbar_policy(gtk::PolicyType::Never)
        .vscrollbar_policy(gtk::PolicyType::External)
        .min_content_width(LIST_WIDTH)
        .max_content_width(LIST_WIDTH)
        .min_content_height(LIST_HEIGHT)
        .max_content_height(LIST_HEIGHT)
        .child(&event_list)
        .build();
    scroller.set_size_request(LIST_WIDTH, LIST_HEIGHT);
    card.append(&scroller);

    window.set_content(Some(&card));

    UiWidgets {
        window,
        icon_slot,
        title_label,
        count_label,
        dark_switch,
        close_button,
        event_list,
    }
}
