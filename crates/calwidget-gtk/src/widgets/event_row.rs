//! Maps [`AgendaRow`]s to widgets.

use gtk4 as gtk;
use gtk4::prelude::*;

use calwidget_core::theme::event_color_class;
use calwidget_core::{AgendaRow, PlaceholderKind};

const COLOR_BAR_WIDTH: i32 = 4;

/// Replaces the content of `list` with `rows`.
pub fn render(list: &gtk::Box, rows: &[AgendaRow]) {
    while let Some(child) = list.first_child() {
        list.remove(&child);
    }
    for row in rows {
        list.append(&build(row));
    }
}

/// Builds the widget for a single row.
pub fn build(row: &AgendaRow) -> gtk::Widget {
    match row {
        AgendaRow::Placeholder { text, kind } => {
            let class = match kind {
                PlaceholderKind::Info => "agenda-placeholder",
                PlaceholderKind::Error => "agenda-error",
            };
            gtk::Label::builder()
                .label(text.as_str())
                .wrap(true)
                .wrap_mode(gtk::pango::WrapMode::WordChar)
                .margin_top(10)
                .margin_bottom(10)
                .css_classes([class])
                .build()
                .upcast()
        }
        AgendaRow::Separator => {
            let separator = gtk::Separator::new(gtk::Orientation::Horizontal);
            separator.add_css_class("agenda-separator");
            separator.set_margin_top(6);
            separator.set_margin_bottom(6);
            separator.upcast()
        }
        AgendaRow::DayHeader(label) => gtk::Label::builder()
            .label(label.as_str())
            .xalign(0.0)
            .margin_top(4)
            .css_classes(["day-header"])
            .build()
            .upcast(),
        AgendaRow::Event {
            title,
            detail,
            color_id,
        } => event_widget(title, detail, color_id),
    }
}

fn event_widget(title: &str, detail: &str, color_id: &str) -> gtk::Widget {
    let hbox = gtk::Box::new(gtk::Orientation::Horizontal, 8);
    hbox.set_margin_start(4);

    let color_bar = gtk::Box::new(gtk::Orientation::Vertical, 0);
    color_bar.set_width_request(COLOR_BAR_WIDTH);
    color_bar.add_css_class("event-color");
    color_bar.add_css_class(&event_color_class(color_id));
    hbox.append(&color_bar);

    let text_box = gtk::Box::new(gtk::Orientation::Vertical, 2);
    text_box.set_hexpand(true);

    let title_label = gtk::Label::builder()
        .label(title)
        .xalign(0.0)
        .wrap(true)
        .wrap_mode(gtk::pango::WrapMode::WordChar)
        .css_classes(["event-title"])
        .build();
    text_box.append(&title_label);

    let time_label = gtk::Label::builder()
        .label(detail)
        .xalign(0.0)
        .css_classes(["event-time"])
        .build();
    text_box.append(&time_label);

    hbox.append(&text_box);
    hbox.upcast()
}
