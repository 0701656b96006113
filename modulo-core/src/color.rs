//! Color normalization.
//!
//! Every stored or compared color is lowercase `#rrggbb`. Hex shorthand,
//! `rgb()`/`rgba()` notation and CSS named colors are converted; alpha is
//! dropped. Anything unreadable becomes [`DEFAULT_COLOR`].

/// Card background used when no usable color is present.
pub const DEFAULT_COLOR: &str = "#ffffff";

const NAMED_COLORS: &[(&str, &str)] = &[
    ("aqua", "#00ffff"),
    ("beige", "#f5f5dc"),
    ("black", "#000000"),
    ("blue", "#0000ff"),
    ("brown", "#a52a2a"),
    ("coral", "#ff7f50"),
    ("cyan", "#00ffff"),
    ("fuchsia", "#ff00ff"),
    ("gold", "#ffd700"),
    ("gray", "#808080"),
    ("green", "#008000"),
    ("grey", "#808080"),
    ("ivory", "#fffff0"),
    ("lavender", "#e6e6fa"),
    ("lime", "#00ff00"),
    ("magenta", "#ff00ff"),
    ("maroon", "#800000"),
    ("navy", "#000080"),
    ("olive", "#808000"),
    ("orange", "#ffa500"),
    ("pink", "#ffc0cb"),
    ("purple", "#800080"),
    ("red", "#ff0000"),
    ("salmon", "#fa8072"),
    ("silver", "#c0c0c0"),
    ("teal", "#008080"),
    ("white", "#ffffff"),
    ("yellow", "#ffff00"),
];

/// Normalize any supported color notation to lowercase `#rrggbb`.
pub fn normalize_color(raw: &str) -> String {
    let value = raw.trim().to_ascii_lowercase();
    if value.is_empty() {
        return DEFAULT_COLOR.to_string();
    }

    let parsed = if let Some(hex) = value.strip_prefix('#') {
        parse_hex(hex)
    } else if value.starts_with("rgb") {
        parse_rgb(&value)
    } else {
        NAMED_COLORS
            .iter()
            .find(|(name, _)| *name == value)
            .map(|(_, hex)| (*hex).to_string())
    };

    parsed.unwrap_or_else(|| DEFAULT_COLOR.to_string())
}

fn parse_hex(hex: &str) -> Option<String> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        // #rgb / #rgba
        3 | 4 => {
            let expanded: String = hex[..3].chars().flat_map(|c| [c, c]).collect();
            Some(format!("#{expanded}"))
        }
        // #rrggbb / #rrggbbaa
        6 | 8 => Some(format!("#{}", &hex[..6])),
        _ => None,
    }
}

fn parse_rgb(value: &str) -> Option<String> {
    let open = value.find('(')?;
    let close = value.rfind(')')?;
    if close <= open {
        return None;
    }
    let channels: Vec<u8> = value[open + 1..close]
        .split(',')
        .take(3)
        .map(|part| part.trim().parse::<f64>().ok().map(|v| v.round().clamp(0.0, 255.0) as u8))
        .collect::<Option<Vec<_>>>()?;
    if channels.len() != 3 {
        return None;
    }
    Some(format!("#{:02x}{:02x}{:02x}", channels[0], channels[1], channels[2]))
}
