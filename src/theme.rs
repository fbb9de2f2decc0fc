//! Color themes (`--theme`) and per-type tag colors.

use ratatui::style::Color;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Nord,
    DosBlue,
    AmberCrt,
    GreenPhosphor,
}

impl Theme {
    pub const ALL: [Theme; 4] = [Theme::Nord, Theme::DosBlue, Theme::AmberCrt, Theme::GreenPhosphor];

    pub fn name(self) -> &'static str {
        match self {
            Theme::Nord => "nord",
            Theme::DosBlue => "dos-blue",
            Theme::AmberCrt => "amber-crt",
            Theme::GreenPhosphor => "green-phosphor",
        }
    }

    pub fn colors(self) -> ColorScheme {
        match self {
            Theme::Nord => NORD,
            Theme::DosBlue => DOS_BLUE,
            Theme::AmberCrt => AMBER_CRT,
            Theme::GreenPhosphor => GREEN_PHOSPHOR,
        }
    }
}

impl FromStr for Theme {
    type Err = String;

    /// Accepts the canonical name, the name without dashes, or its first word.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Theme::ALL
            .into_iter()
            .find(|t| {
                let name = t.name();
                wanted == name
                    || wanted == name.replace('-', "")
                    || name.split('-').next() == Some(wanted.as_str())
            })
            .ok_or_else(|| {
                let names: Vec<&str> = Theme::ALL.iter().map(|t| t.name()).collect();
                format!("Unknown theme '{s}'. Available: {}", names.join(", "))
            })
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Semantic colors the UI draws with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorScheme {
    /// Overlay background; also the text color of the highlighted row
    pub bg: Color,
    pub fg: Color,
    /// Ids, placeholders, hints
    pub dim: Color,
    /// Title, focused borders, key hints
    pub accent: Color,
    /// Column headers and totals
    pub heading: Color,
    pub border: Color,
    /// Highlighted table row
    pub highlight: Color,
    /// Stat bars and success toasts
    pub good: Color,
    pub bad: Color,
}

const NORD: ColorScheme = ColorScheme {
    bg: Color::Black,
    fg: Color::White,
    dim: Color::Gray,
    accent: Color::Yellow,
    heading: Color::Cyan,
    border: Color::Gray,
    highlight: Color::Yellow,
    good: Color::Green,
    bad: Color::Red,
};

const DOS_BLUE: ColorScheme = ColorScheme {
    bg: Color::Blue,
    fg: Color::White,
    dim: Color::LightBlue,
    accent: Color::Yellow,
    heading: Color::LightCyan,
    border: Color::Cyan,
    highlight: Color::Cyan,
    good: Color::LightGreen,
    bad: Color::LightRed,
};

const AMBER_CRT: ColorScheme = ColorScheme {
    bg: Color::Black,
    fg: Color::Rgb(255, 176, 0),
    dim: Color::Rgb(180, 120, 0),
    accent: Color::Rgb(255, 200, 100),
    heading: Color::Rgb(255, 200, 100),
    border: Color::Rgb(180, 120, 0),
    highlight: Color::Rgb(255, 176, 0),
    good: Color::Rgb(255, 176, 0),
    bad: Color::Red,
};

const GREEN_PHOSPHOR: ColorScheme = ColorScheme {
    bg: Color::Black,
    fg: Color::Rgb(0, 255, 0),
    dim: Color::Rgb(0, 180, 0),
    accent: Color::Rgb(100, 255, 100),
    heading: Color::Rgb(100, 255, 100),
    border: Color::Rgb(0, 180, 0),
    highlight: Color::Rgb(0, 255, 0),
    good: Color::Rgb(100, 255, 100),
    bad: Color::Red,
};

impl Default for ColorScheme {
    fn default() -> Self {
        NORD
    }
}

/// Tag color for a Pokemon type. Unknown names get a neutral gray.
pub fn type_color(name: &str) -> Color {
    match name.to_lowercase().as_str() {
        "normal" => Color::Rgb(168, 167, 122),
        "fire" => Color::Rgb(238, 129, 48),
        "water" => Color::Rgb(99, 144, 240),
        "electric" => Color::Rgb(247, 208, 44),
        "grass" => Color::Rgb(122, 199, 76),
        "ice" => Color::Rgb(150, 217, 214),
        "fighting" => Color::Rgb(194, 46, 40),
        "poison" => Color::Rgb(163, 62, 161),
        "ground" => Color::Rgb(226, 191, 101),
        "flying" => Color::Rgb(169, 143, 243),
        "psychic" => Color::Rgb(249, 85, 135),
        "bug" => Color::Rgb(166, 185, 26),
        "rock" => Color::Rgb(182, 161, 54),
        "ghost" => Color::Rgb(115, 87, 151),
        "dragon" => Color::Rgb(111, 53, 252),
        "dark" => Color::Rgb(112, 87, 70),
        "steel" => Color::Rgb(183, 183, 206),
        "fairy" => Color::Rgb(214, 133, 173),
        "shadow" => Color::Rgb(60, 60, 70),
        _ => Color::Gray,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_names_and_aliases_parse() {
        assert_eq!("nord".parse::<Theme>().unwrap(), Theme::Nord);
        assert_eq!("NORD".parse::<Theme>().unwrap(), Theme::Nord);
        assert_eq!("dos".parse::<Theme>().unwrap(), Theme::DosBlue);
        assert_eq!("dosblue".parse::<Theme>().unwrap(), Theme::DosBlue);
        assert_eq!("amber".parse::<Theme>().unwrap(), Theme::AmberCrt);
        assert_eq!("green-phosphor".parse::<Theme>().unwrap(), Theme::GreenPhosphor);

        let err = "solarized".parse::<Theme>().unwrap_err();
        assert!(err.contains("nord, dos-blue, amber-crt, green-phosphor"), "{err}");
    }

    #[test]
    fn display_round_trips_through_parse() {
        for theme in Theme::ALL {
            assert_eq!(theme.to_string().parse::<Theme>().unwrap(), theme);
        }
    }

    #[test]
    fn highlight_differs_from_text_on_it() {
        for theme in Theme::ALL {
            let c = theme.colors();
            assert_ne!(c.highlight, c.bg, "{theme}");
        }
    }

    #[test]
    fn type_colors() {
        assert_eq!(type_color("FIRE"), type_color("fire"));
        assert_ne!(type_color("fire"), type_color("water"));
        assert_eq!(type_color("unknown"), Color::Gray);
    }
}
