//! Plain-text drawing of the dashboard view model.

use dashboard_core::{App, Card, render::EffectKind};
use std::fmt;

/// The whole dashboard: header, backdrop, favorites strip and cards.
pub struct DashboardView<'a>(pub &'a App);

impl fmt::Display for DashboardView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let app = self.0;

        write!(f, "Weather Dashboard")?;
        if let Some(day_night) = app.day_night() {
            write!(f, " {}", day_night.symbol())?;
        }
        writeln!(f, "   [theme: {}] [{}]", app.theme(), app.unit().toggle_caption())?;

        if let Some(backdrop) = app.renderer().backdrop() {
            write!(f, "Backdrop: {}", backdrop.gradient)?;
            if backdrop.effect.kind != EffectKind::None {
                write!(
                    f,
                    " with {:?} ({} particles)",
                    backdrop.effect.kind,
                    backdrop.effect.particles.len()
                )?;
            }
            writeln!(f)?;
        }

        write!(f, "{}", StripView(app))?;

        for card in app.renderer().cards() {
            writeln!(f)?;
            write!(f, "{}", CardView(card))?;
        }
        Ok(())
    }
}

/// The favorites strip, one tag per saved city.
pub struct StripView<'a>(pub &'a App);

impl fmt::Display for StripView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let strip = self.0.state().favorites().strip();
        if strip.is_empty() {
            return writeln!(f, "Saved cities: (none)");
        }

        write!(f, "Saved cities:")?;
        for tag in strip {
            write!(f, " [{} ✖]", tag.city)?;
        }
        writeln!(f)?;

        for tag in strip {
            if let Some(tooltip) = &tag.tooltip {
                writeln!(f, "  {}: {}", tag.city, tooltip)?;
            }
        }
        Ok(())
    }
}

pub struct CardView<'a>(pub &'a Card);

impl fmt::Display for CardView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let card = self.0;

        writeln!(f, "== {} ==", card.city)?;
        writeln!(f, "  {}  {}", card.temperature.text(), card.description)?;
        writeln!(f, "  {}", card.humidity_label())?;
        writeln!(f, "  icon: {}", card.icon.path())?;

        if !card.forecast.is_empty() {
            let tiles: Vec<String> = card
                .forecast
                .iter()
                .map(|tile| format!("{} {}", tile.weekday, tile.temperature.text()))
                .collect();
            writeln!(f, "  {}", tiles.join(" | "))?;
        }
        Ok(())
    }
}
