//! Chart colors.

use crate::surface::Color;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Theme {
    pub background: Color,
    pub panel_border: Color,
    pub grid: Color,
    pub axis_text: Color,
    pub bullish: Color,
    pub bearish: Color,
    pub ema_fast: Color,
    pub ema_slow: Color,
    pub trend_bullish: Color,
    pub trend_bearish: Color,
    pub fibonacci: Color,
    pub support: Color,
    pub resistance: Color,
    pub buy_marker: Color,
    pub sell_marker: Color,
    pub osc_k: Color,
    pub osc_d: Color,
    pub osc_guide: Color,
    pub crosshair: Color,
    pub tooltip_background: Color,
    pub tooltip_text: Color,
    pub price_neutral: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: Color::rgb(0.06, 0.07, 0.09),
            panel_border: Color::rgb(0.18, 0.19, 0.23),
            grid: Color::rgb(0.3, 0.3, 0.35).with_alpha(0.35),
            axis_text: Color::rgb(0.62, 0.64, 0.7),
            bullish: Color::rgb(0.15, 0.75, 0.55),
            bearish: Color::rgb(0.92, 0.3, 0.33),
            ema_fast: Color::rgb(0.2, 0.6, 1.0),
            ema_slow: Color::rgb(1.0, 0.6, 0.2),
            trend_bullish: Color::rgb(0.15, 0.75, 0.55),
            trend_bearish: Color::rgb(0.92, 0.3, 0.33),
            fibonacci: Color::rgb(0.75, 0.6, 0.95),
            support: Color::rgb(0.2, 0.8, 0.4),
            resistance: Color::rgb(0.9, 0.35, 0.35),
            buy_marker: Color::rgb(0.1, 0.85, 0.45),
            sell_marker: Color::rgb(0.95, 0.25, 0.3),
            osc_k: Color::rgb(0.3, 0.7, 1.0),
            osc_d: Color::rgb(1.0, 0.55, 0.25),
            osc_guide: Color::rgb(0.5, 0.5, 0.55).with_alpha(0.5),
            crosshair: Color::rgb(0.75, 0.75, 0.8).with_alpha(0.6),
            tooltip_background: Color::rgba(0.1, 0.11, 0.14, 0.92),
            tooltip_text: Color::rgb(0.9, 0.9, 0.92),
            price_neutral: Color::rgb(0.35, 0.55, 0.95),
        }
    }
}
