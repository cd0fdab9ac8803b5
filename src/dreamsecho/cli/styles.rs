use console::Style;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Style names used by the templates.
pub mod names {
    pub const ID: &str = "id";
    pub const TITLE: &str = "title";
    pub const TIME: &str = "time";
    pub const LABEL: &str = "label";
    pub const STYLE_TAG: &str = "style_tag";
    pub const EMOTION: &str = "emotion";
    pub const BAR: &str = "bar";
    pub const DIM: &str = "dim";
    pub const INFO: &str = "info";
    pub const SUCCESS: &str = "success";
    pub const WARNING: &str = "warning";
    pub const ERROR: &str = "error";
}

/// Converts an RGB triplet to the nearest ANSI 256-color palette index.
fn rgb_to_ansi256((r, g, b): (u8, u8, u8)) -> u8 {
    if r == g && g == b {
        if r < 8 {
            16
        } else if r > 248 {
            231
        } else {
            232 + ((r as u16 - 8) * 24 / 247) as u8
        }
    } else {
        let red = (r as u16 * 5 / 255) as u8;
        let green = (g as u16 * 5 / 255) as u8;
        let blue = (b as u16 * 5 / 255) as u8;
        16 + 36 * red + 6 * green + blue
    }
}

pub static DREAMS_THEME: Lazy<HashMap<&'static str, Style>> = Lazy::new(|| {
    let grey = Style::new().color256(rgb_to_ansi256((154, 154, 154)));
    HashMap::from([
        (names::ID, Style::new().yellow()),
        (names::TITLE, Style::new().bold()),
        (names::TIME, grey.clone().italic()),
        (names::LABEL, grey.clone()),
        (names::STYLE_TAG, Style::new().magenta()),
        (names::EMOTION, Style::new().cyan()),
        (names::BAR, Style::new().color256(rgb_to_ansi256((120, 110, 220)))),
        (names::DIM, grey),
        (names::INFO, Style::new()),
        (names::SUCCESS, Style::new().green()),
        (names::WARNING, Style::new().yellow()),
        (names::ERROR, Style::new().red().bold()),
    ])
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greys_map_to_the_grey_ramp() {
        assert_eq!(rgb_to_ansi256((0, 0, 0)), 16);
        assert_eq!(rgb_to_ansi256((255, 255, 255)), 231);
        assert!((232..=255).contains(&rgb_to_ansi256((154, 154, 154))));
    }
}
