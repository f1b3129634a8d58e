//! Hex color parsing and foreground contrast.
//!
//! Element background tokens are hex strings chosen by users; the only
//! thing the board derives from them is a readable foreground color.

#[cfg(test)]
#[path = "color_test.rs"]
mod color_test;

/// Foreground used on light backgrounds.
pub const DARK_FOREGROUND: &str = "#1e293b";

/// Foreground used on dark backgrounds.
pub const LIGHT_FOREGROUND: &str = "#f8fafc";

/// YIQ luma above which a background counts as light.
const LIGHT_LUMA: u32 = 128;

/// Parse `#RGB` or `#RRGGBB` into channels. Shorthand digits expand by
/// repetition (`#abc` is `#aabbcc`).
#[must_use]
pub fn parse_hex_rgb(raw: &str) -> Option<(u8, u8, u8)> {
    let hex = raw.trim().strip_prefix('#')?;
    // the digit slicing below is byte-wise
    if !hex.is_ascii() {
        return None;
    }
    match hex.len() {
        3 => {
            let r = channel(&hex[0..1])?;
            let g = channel(&hex[1..2])?;
            let b = channel(&hex[2..3])?;
            Some((r * 17, g * 17, b * 17))
        }
        6 => {
            let r = channel(&hex[0..2])?;
            let g = channel(&hex[2..4])?;
            let b = channel(&hex[4..6])?;
            Some((r, g, b))
        }
        _ => None,
    }
}

fn channel(digits: &str) -> Option<u8> {
    let Ok(value) = u8::from_str_radix(digits, 16) else {
        return None;
    };
    Some(value)
}

/// Pick a readable foreground for the given background token using YIQ
/// luma `(r*299 + g*587 + b*114) / 1000`. Tokens that do not parse fall
/// back to the dark foreground (board palettes are light).
#[must_use]
pub fn contrast_color(background: &str) -> &'static str {
    let Some((r, g, b)) = parse_hex_rgb(background) else {
        return DARK_FOREGROUND;
    };
    let luma = (u32::from(r) * 299 + u32::from(g) * 587 + u32::from(b) * 114) / 1000;
    if luma >= LIGHT_LUMA {
        DARK_FOREGROUND
    } else {
        LIGHT_FOREGROUND
    }
}
