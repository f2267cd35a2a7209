use dayplan_core::Priority;
use ratatui::style::Color;

use crate::config::ThemeName;

pub struct Theme {
    pub name: ThemeName,
    pub primary: Color,
    pub muted: Color,
    pub text: Color,
    pub selection: Color,
    pub done: Color,
    pub running: Color,
    pub error: Color,
    pub high: Color,
    pub medium: Color,
    pub low: Color,
}

const DARK: Theme = Theme {
    name: ThemeName::Dark,
    primary: Color::Cyan,
    muted: Color::DarkGray,
    text: Color::White,
    selection: Color::DarkGray,
    done: Color::Green,
    running: Color::LightYellow,
    error: Color::LightRed,
    high: Color::Red,
    medium: Color::Yellow,
    low: Color::Green,
};

const LIGHT: Theme = Theme {
    name: ThemeName::Light,
    primary: Color::Blue,
    muted: Color::Gray,
    text: Color::Black,
    selection: Color::Gray,
    done: Color::Green,
    running: Color::Magenta,
    error: Color::Red,
    high: Color::Red,
    medium: Color::Rgb(176, 120, 0),
    low: Color::Green,
};

impl Theme {
    pub fn get(name: ThemeName) -> &'static Theme {
        match name {
            ThemeName::Dark => &DARK,
            ThemeName::Light => &LIGHT,
        }
    }

    pub fn toggled(&self) -> &'static Theme {
        match self.name {
            ThemeName::Dark => &LIGHT,
            ThemeName::Light => &DARK,
        }
    }

    pub fn priority(&self, priority: Priority) -> Color {
        match priority {
            Priority::High => self.high,
            Priority::Medium => self.medium,
            Priority::Low => self.low,
        }
    }
}
