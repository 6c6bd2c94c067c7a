//! Color themes for the queue dashboard.
//!
//! Selected by name in configuration and cycled at runtime with `t`.

use std::str::FromStr;

use desk_core::Priority;
use ratatui::style::Color;

/// Theme name identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeName {
    #[default]
    Default,
    /// Enhanced contrast
    Dark,
    /// For bright environments
    Light,
}

impl ThemeName {
    /// All available themes in cycle order.
    pub fn all() -> &'static [ThemeName] {
        &[ThemeName::Default, ThemeName::Dark, ThemeName::Light]
    }

    /// Get the next theme in the cycle.
    pub fn next(&self) -> ThemeName {
        let themes = Self::all();
        let current_idx = themes.iter().position(|t| t == self).unwrap_or(0);
        themes[(current_idx + 1) % themes.len()]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ThemeName::Default => "Default",
            ThemeName::Dark => "Dark",
            ThemeName::Light => "Light",
        }
    }
}

impl FromStr for ThemeName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "default" => Ok(ThemeName::Default),
            "dark" => Ok(ThemeName::Dark),
            "light" => Ok(ThemeName::Light),
            other => Err(format!("unknown theme '{other}'")),
        }
    }
}

/// Color palette for a theme.
#[derive(Debug, Clone)]
pub struct ThemeColors {
    /// Title and table header
    pub header: Color,
    /// Hotkey hints
    pub hotkey: Color,
    pub text: Color,
    /// Timestamps and secondary info
    pub text_dim: Color,
    pub border: Color,
    pub status_healthy: Color,
    pub status_warning: Color,
    pub status_error: Color,
    /// Background of the unassigned badge while flashing
    pub flash_bg: Color,
    pub flash_fg: Color,
    pub priority_critical: Color,
    pub priority_high: Color,
    pub priority_medium: Color,
    pub priority_low: Color,
}

/// Complete theme definition.
#[derive(Debug, Clone)]
pub struct Theme {
    pub name: ThemeName,
    pub colors: ThemeColors,
}

impl Theme {
    pub fn default_theme() -> Self {
        Self {
            name: ThemeName::Default,
            colors: ThemeColors {
                header: Color::Cyan,
                hotkey: Color::Yellow,
                text: Color::White,
                text_dim: Color::Gray,
                border: Color::DarkGray,
                status_healthy: Color::Green,
                status_warning: Color::Yellow,
                status_error: Color::Red,
                flash_bg: Color::Red,
                flash_fg: Color::White,
                priority_critical: Color::Magenta,
                priority_high: Color::Red,
                priority_medium: Color::Yellow,
                priority_low: Color::Gray,
            },
        }
    }

    pub fn dark_theme() -> Self {
        Self {
            name: ThemeName::Dark,
            colors: ThemeColors {
                header: Color::LightBlue,
                hotkey: Color::LightYellow,
                text: Color::White,
                text_dim: Color::DarkGray,
                border: Color::Rgb(60, 60, 60),
                status_healthy: Color::LightGreen,
                status_warning: Color::LightYellow,
                status_error: Color::LightRed,
                flash_bg: Color::LightRed,
                flash_fg: Color::Black,
                priority_critical: Color::LightMagenta,
                priority_high: Color::LightRed,
                priority_medium: Color::LightYellow,
                priority_low: Color::DarkGray,
            },
        }
    }

    pub fn light_theme() -> Self {
        Self {
            name: ThemeName::Light,
            colors: ThemeColors {
                header: Color::Blue,
                hotkey: Color::DarkGray,
                text: Color::Black,
                text_dim: Color::DarkGray,
                border: Color::Gray,
                status_healthy: Color::Green,
                status_warning: Color::Rgb(180, 120, 0),
                status_error: Color::Red,
                flash_bg: Color::Red,
                flash_fg: Color::White,
                priority_critical: Color::Magenta,
                priority_high: Color::Red,
                priority_medium: Color::Rgb(180, 120, 0),
                priority_low: Color::Gray,
            },
        }
    }

    pub fn by_name(name: ThemeName) -> Self {
        match name {
            ThemeName::Default => Self::default_theme(),
            ThemeName::Dark => Self::dark_theme(),
            ThemeName::Light => Self::light_theme(),
        }
    }

    /// Resolve a configured theme name, falling back to the default.
    pub fn from_config(name: &str) -> Self {
        match name.parse::<ThemeName>() {
            Ok(name) => Self::by_name(name),
            Err(e) => {
                tracing::warn!("{e}, using default theme");
                Self::default_theme()
            }
        }
    }

    pub fn priority_color(&self, priority: Priority) -> Color {
        match priority {
            Priority::Critical => self.colors.priority_critical,
            Priority::High => self.colors.priority_high,
            Priority::Medium => self.colors.priority_medium,
            Priority::Low => self.colors.priority_low,
        }
    }

    /// SLA color: breached, closing within 30 minutes, or comfortable.
    pub fn sla_color(&self, sla_minutes: i64) -> Color {
        if sla_minutes < 0 {
            self.colors.status_error
        } else if sla_minutes < 30 {
            self.colors.status_warning
        } else {
            self.colors.status_healthy
        }
    }

    /// Switch to the next theme in the cycle.
    pub fn cycle(&mut self) -> ThemeName {
        let next = self.name.next();
        *self = Self::by_name(next);
        next
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::default_theme()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_name_cycle() {
        assert_eq!(ThemeName::Default.next(), ThemeName::Dark);
        assert_eq!(ThemeName::Dark.next(), ThemeName::Light);
        assert_eq!(ThemeName::Light.next(), ThemeName::Default);
    }

    #[test]
    fn test_theme_name_parse() {
        assert_eq!("default".parse::<ThemeName>(), Ok(ThemeName::Default));
        assert_eq!("DARK".parse::<ThemeName>(), Ok(ThemeName::Dark));
        assert_eq!("light".parse::<ThemeName>(), Ok(ThemeName::Light));
        assert!("cyberpunk".parse::<ThemeName>().is_err());
    }

    #[test]
    fn test_from_config_falls_back() {
        assert_eq!(Theme::from_config("dark").name, ThemeName::Dark);
        assert_eq!(Theme::from_config("nope").name, ThemeName::Default);
    }

    #[test]
    fn test_sla_colors() {
        let theme = Theme::default_theme();
        assert_eq!(theme.sla_color(-5), Color::Red);
        assert_eq!(theme.sla_color(10), Color::Yellow);
        assert_eq!(theme.sla_color(120), Color::Green);
    }

    #[test]
    fn test_priority_colors_distinct() {
        let theme = Theme::default_theme();
        let colors: Vec<Color> = Priority::ALL.iter().map(|p| theme.priority_color(*p)).collect();
        for (i, a) in colors.iter().enumerate() {
            for b in colors.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_cycle() {
        let mut theme = Theme::default();
        assert_eq!(theme.cycle(), ThemeName::Dark);
        assert_eq!(theme.colors.header, Color::LightBlue);
    }
}
