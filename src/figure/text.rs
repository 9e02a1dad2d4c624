//! Text measurement and truncation used by the layout code.
//!
//! Widths are estimated from the character count so layout does not depend on which
//! font the output ends up using.

/// Heuristic: estimate pixel width of text (0.6 em per character, rounded up).
pub fn estimate_text_width_px(text: &str, font_px: u32) -> u32 {
    let chars = text.chars().count() as u64;
    (chars * font_px as u64 * 3).div_ceil(5) as u32
}

/// Truncate to fit `max_px` and add a single ellipsis if needed.
pub fn truncate_to_width(text: &str, font_px: u32, max_px: u32) -> String {
    if estimate_text_width_px(text, font_px) <= max_px {
        return text.to_string();
    }
    let mut out = String::new();
    for ch in text.chars() {
        out.push(ch);
        if estimate_text_width_px(&out, font_px) + estimate_text_width_px("…", font_px) > max_px {
            out.pop();
            break;
        }
    }
    out.push('…');
    out
}

/// General-purpose tick label: fewer decimals as magnitude grows.
pub fn format_tick(v: f64) -> String {
    let a = v.abs();
    if a >= 100.0 || (v - v.round()).abs() < 1e-9 {
        return format!("{:.0}", v);
    }
    let prec = if a >= 10.0 { 1 } else { 2 };
    format!("{:.*}", prec, v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_scales_with_length_and_size() {
        assert_eq!(estimate_text_width_px("", 10), 0);
        assert_eq!(estimate_text_width_px("abcde", 10), 30);
        assert_eq!(estimate_text_width_px("ab", 12), 15);
        assert!(estimate_text_width_px("abcde", 20) > estimate_text_width_px("abcde", 10));
    }

    #[test]
    fn truncation_adds_single_ellipsis() {
        assert_eq!(truncate_to_width("short", 10, 200), "short");
        let t = truncate_to_width("a rather long category name", 10, 60);
        assert!(t.ends_with('…'));
        assert_eq!(t.matches('…').count(), 1);
        assert!(estimate_text_width_px(&t, 10) <= 60);
    }

    #[test]
    fn tick_precision_follows_magnitude() {
        assert_eq!(format_tick(250.4), "250");
        assert_eq!(format_tick(12.345), "12.3");
        assert_eq!(format_tick(0.126), "0.13");
        assert_eq!(format_tick(3.0), "3");
    }
}
