//! Line naming and colours.
//!
//! GTFS route long names arrive as `"YELLOW_Qutab Minar to Huda City Centre"`
//! and similar; the leading token is the line identity the rest of the system
//! uses.

/// Derive the display line name from a GTFS `route_long_name`.
///
/// The Airport Express and Rapid Metro feeds use composite prefixes
/// (`ORANGE/AIRPORT`, `RAPID`), so those are mapped explicitly; everything
/// else is the title-cased colour token.
pub fn line_name(route_long_name: &str) -> String {
    if route_long_name.is_empty() {
        return "Unknown".to_string();
    }

    let prefix = route_long_name.split('_').next().unwrap_or(route_long_name);

    if prefix.contains("ORANGE") || prefix.contains("AIRPORT") {
        return "Airport Express".to_string();
    }
    if prefix.contains("RAPID") {
        return "Rapid Metro".to_string();
    }

    title_case(prefix)
}

/// Display colour for a line, as a hex string. Black for unknown lines.
pub fn line_color(name: &str) -> &'static str {
    match name {
        "Red" => "#FF0000",
        "Yellow" => "#FFC300",
        "Blue" => "#0000FF",
        "Green" => "#008000",
        "Violet" => "#EE82EE",
        "Pink" => "#FFC0CB",
        "Magenta" => "#FF00FF",
        "Gray" => "#808080",
        "Orange" => "#FFA500",
        "Airport Express" => "#FFA500",
        "Aqua" => "#00FFFF",
        "Rapid Metro" => "#ADD8E6",
        _ => "#000000",
    }
}

fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}
