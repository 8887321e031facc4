//! Brazilian Portuguese labels shown by the widget.

use chrono::{Datelike, NaiveDate, Weekday};

pub const TODAY: &str = "Hoje";
pub const TOMORROW: &str = "Amanhã";
pub const ALL_DAY: &str = "Dia inteiro";
pub const NO_EVENTS: &str = "Sem eventos para este mês.";
pub const LOADING: &str = "Carregando eventos...";
pub const DARK_MODE: &str = "Dark";

/// Short weekday name, e.g. `Segunda` for Monday.
pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Segunda",
        Weekday::Tue => "Terça",
        Weekday::Wed => "Quarta",
        Weekday::Thu => "Quinta",
        Weekday::Fri => "Sexta",
        Weekday::Sat => "Sábado",
        Weekday::Sun => "Domingo",
    }
}

/// Month name for a 1-based month number.
pub fn month_name(month: u32) -> &'static str {
    match month {
        1 => "Janeiro",
        2 => "Fevereiro",
        3 => "Março",
        4 => "Abril",
        5 => "Maio",
        6 => "Junho",
        7 => "Julho",
        8 => "Agosto",
        9 => "Setembro",
        10 => "Outubro",
        11 => "Novembro",
        12 => "Dezembro",
        _ => "",
    }
}

/// Window title for the month containing `date`: `Agenda - Março 2024`.
pub fn agenda_title(date: NaiveDate) -> String {
    format!("Agenda - {} {}", month_name(date.month()), date.year())
}

/// Header counter: `(3 eventos)`.
pub fn event_count(count: usize) -> String {
    format!("({count} eventos)")
}

/// Inline message for a failed refresh.
pub fn refresh_failed(message: &str) -> String {
    format!("Erro ao atualizar: {message}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_uses_portuguese_month() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        assert_eq!(agenda_title(date), "Agenda - Março 2024");
    }

    #[test]
    fn every_month_has_a_name() {
        for month in 1..=12 {
            assert!(!month_name(month).is_empty());
        }
        assert_eq!(month_name(13), "");
    }

    #[test]
    fn weekday_names() {
        assert_eq!(weekday_name(Weekday::Tue), "Terça");
        assert_eq!(weekday_name(Weekday::Sat), "Sábado");
    }

    #[test]
    fn counters_and_messages() {
        assert_eq!(event_count(0), "(0 eventos)");
        assert_eq!(refresh_failed("timeout"), "Erro ao atualizar: timeout");
    }
}
