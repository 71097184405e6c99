/// Player colours: a hue with fixed 100% saturation and 50% lightness.

use crate::domain::player::Hue;

pub type Rgb = (u8, u8, u8);

/// HSL → RGB. `s` and `l` are percentages.
pub fn hsl_to_rgb(h: f64, s: f64, l: f64) -> Rgb {
    let s = s / 100.0;
    let l = l / 100.0;
    let k = |n: f64| (n + h / 30.0) % 12.0;
    let a = s * l.min(1.0 - l);
    let f = |n: f64| {
        let k = k(n);
        l - a * (k - 3.0).min(9.0 - k).min(1.0).max(-1.0)
    };
    let channel = |v: f64| (255.0 * v).round().clamp(0.0, 255.0) as u8;
    (channel(f(0.0)), channel(f(8.0)), channel(f(4.0)))
}

/// Display colour of a player hue.
pub fn hue_to_rgb(hue: Hue) -> Rgb {
    hsl_to_rgb(f64::from(hue % 360), 100.0, 50.0)
}
