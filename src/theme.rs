use ratatui::style::Color;

use crate::prefs::{BackgroundStyle, ThemeMode};

#[derive(Debug, Clone)]
pub struct Theme {
    pub fg: Color,
    pub bg: Color,
    pub panel_bg: Color,
    pub dim: Color,
    pub border: Color,
    pub highlight_bg: Color,
    pub highlight_fg: Color,
    pub positive: Color,
    pub negative: Color,
    pub accent: Color,
    pub input_accent: Color,
    pub favorite: Color,
    pub title: Color,
    pub error: Color,
}

/// Palette for the active mode. The backdrop style only applies in light mode.
pub fn for_prefs(mode: ThemeMode, background: BackgroundStyle) -> Theme {
    match mode {
        ThemeMode::Light => light(background),
        ThemeMode::Dark => dark(),
    }
}

pub fn light(background: BackgroundStyle) -> Theme {
    let bg = match background {
        BackgroundStyle::Soft => Color::Rgb(241, 245, 249),  // slate-100
        BackgroundStyle::Mesh => Color::Rgb(238, 242, 255),  // indigo-50
        BackgroundStyle::Paper => Color::Rgb(250, 247, 240), // warm paper
    };
    Theme {
        fg: Color::Rgb(15, 23, 42),     // slate-900
        bg,
        panel_bg: Color::Rgb(255, 255, 255),
        dim: Color::Rgb(100, 116, 139), // slate-500
        border: Color::Rgb(226, 232, 240),
        highlight_bg: Color::Rgb(15, 23, 42),
        highlight_fg: Color::Rgb(255, 255, 255),
        positive: Color::Rgb(5, 150, 105),  // emerald-600
        negative: Color::Rgb(239, 68, 68),  // red-500
        accent: Color::Rgb(51, 65, 85),
        input_accent: Color::Rgb(180, 83, 9),
        favorite: Color::Rgb(180, 83, 9),   // amber-700
        title: Color::Rgb(15, 23, 42),
        error: Color::Rgb(220, 38, 38),
    }
}

pub fn dark() -> Theme {
    Theme {
        fg: Color::Rgb(241, 245, 249),
        bg: Color::Rgb(2, 6, 23),        // slate-950
        panel_bg: Color::Rgb(15, 23, 42),
        dim: Color::Rgb(148, 163, 184),  // slate-400
        border: Color::Rgb(30, 41, 59),
        highlight_bg: Color::Rgb(30, 41, 59), // slate-800
        highlight_fg: Color::Rgb(255, 255, 255),
        positive: Color::Rgb(52, 211, 153),
        negative: Color::Rgb(248, 113, 113),
        accent: Color::Rgb(203, 213, 225),
        input_accent: Color::Rgb(252, 211, 77),
        favorite: Color::Rgb(252, 211, 77),
        title: Color::Rgb(255, 255, 255),
        error: Color::Rgb(254, 202, 202),
    }
}

/// Selected-row background. Light mode tints by coin, dark mode uses one slate.
pub fn selected_row_bg(t: &Theme, mode: ThemeMode, symbol: &str) -> Color {
    if mode == ThemeMode::Dark {
        return t.highlight_bg;
    }
    match symbol.to_lowercase().as_str() {
        "btc" => Color::Rgb(180, 83, 9),
        "eth" => Color::Rgb(79, 70, 229),
        "usdt" | "bsc-usd" => Color::Rgb(20, 184, 166),
        "bnb" => Color::Rgb(161, 98, 7),
        "xrp" => Color::Rgb(51, 65, 85),
        "usdc" => Color::Rgb(29, 78, 216),
        "sol" => Color::Rgb(124, 58, 237),
        "ada" => Color::Rgb(15, 118, 110),
        "doge" => Color::Rgb(212, 160, 23),
        "ldo" | "steth" => Color::Rgb(147, 197, 253),
        "figr_heloc" => Color::Rgb(196, 181, 253),
        "bch" => Color::Rgb(34, 197, 94),
        "wsteth" => Color::Rgb(59, 130, 246),
        "usds" => Color::Rgb(249, 115, 22),
        "wbeth" => Color::Rgb(250, 204, 21),
        _ => t.highlight_bg,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn background_only_changes_light_palette() {
        let soft = for_prefs(ThemeMode::Light, BackgroundStyle::Soft);
        let paper = for_prefs(ThemeMode::Light, BackgroundStyle::Paper);
        assert_ne!(soft.bg, paper.bg);
        let dark_soft = for_prefs(ThemeMode::Dark, BackgroundStyle::Soft);
        let dark_paper = for_prefs(ThemeMode::Dark, BackgroundStyle::Paper);
        assert_eq!(dark_soft.bg, dark_paper.bg);
    }

    #[test]
    fn selected_row_tint() {
        let t = light(BackgroundStyle::Soft);
        assert_eq!(selected_row_bg(&t, ThemeMode::Light, "BTC"), Color::Rgb(180, 83, 9));
        assert_eq!(selected_row_bg(&t, ThemeMode::Light, "unknown"), t.highlight_bg);
        let d = dark();
        assert_eq!(selected_row_bg(&d, ThemeMode::Dark, "btc"), d.highlight_bg);
    }
}
