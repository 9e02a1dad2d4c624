//! Font registration for the `ab_glyph` text path.
//!
//! `ab_glyph` does not discover system fonts, so every family a figure names is backed
//! by the bundled DejaVu Sans. SVG output still carries the requested family name.

use std::collections::HashSet;
use std::sync::{Mutex, OnceLock};

use plotters::style::{FontStyle, register_font};

static DEJAVU_SANS: &[u8] = include_bytes!("../../assets/DejaVuSans.ttf");

static REGISTERED: OnceLock<Mutex<HashSet<String>>> = OnceLock::new();

/// Make `family` resolvable for text layout and bitmap drawing. Cheap after the first call.
pub fn ensure_registered(family: &str) {
    let set = REGISTERED.get_or_init(|| {
        let mut names = HashSet::new();
        // plotters falls back to this family for unstyled labels
        if register_font("sans-serif", FontStyle::Normal, DEJAVU_SANS).is_ok() {
            names.insert("sans-serif".to_string());
        }
        Mutex::new(names)
    });
    let mut set = match set.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    if set.contains(family) {
        return;
    }
    if register_font(family, FontStyle::Normal, DEJAVU_SANS).is_err() {
        log::warn!("bundled font could not be registered for '{}'", family);
        return;
    }
    set.insert(family.to_string());
}

#[cfg(test)]
mod tests {
    use super::*;
    use plotters::style::{FontDesc, FontFamily};

    #[test]
    fn registered_families_lay_out_text() {
        ensure_registered("Some Custom Face");
        ensure_registered("Some Custom Face");
        let font = FontDesc::new(FontFamily::Name("Some Custom Face"), 12.0, FontStyle::Bold);
        let (w, h) = font.box_size("Revenue").unwrap();
        assert!(w > 0 && h > 0);
    }
}
