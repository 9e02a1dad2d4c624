use std::sync::{Mutex, MutexGuard};
use vizcraft::color::Rgb;
use vizcraft::theme::{DEFAULT_THEME, RenderDefaults, Theme, apply_style, current_defaults};
use vizcraft::{Figure, FigureConfig};

// The render defaults are process-wide; tests touching them take turns.
static LOCK: Mutex<()> = Mutex::new(());

fn serial() -> MutexGuard<'static, ()> {
    LOCK.lock().unwrap_or_else(|p| p.into_inner())
}

fn dark() -> Theme {
    Theme {
        background: Rgb::from_hex(0x111827),
        grid: Rgb::from_hex(0x374151),
        ..Theme::default()
    }
}

#[test]
fn applying_twice_is_idempotent() {
    let _g = serial();
    let once = {
        let _s = apply_style(&DEFAULT_THEME);
        current_defaults()
    };
    let twice = {
        let _a = apply_style(&DEFAULT_THEME);
        let _b = apply_style(&DEFAULT_THEME);
        current_defaults()
    };
    assert_eq!(once, twice);
    assert_eq!(once, RenderDefaults::from_theme(&DEFAULT_THEME));
}

#[test]
fn scope_restores_previous_defaults() {
    let _g = serial();
    let before = current_defaults();
    {
        let scope = apply_style(&dark());
        assert_eq!(current_defaults().figure_facecolor, Rgb::from_hex(0x111827));
        assert_eq!(scope.defaults(), &current_defaults());
    }
    assert_eq!(current_defaults(), before);
}

#[test]
fn nested_scopes_unwind_in_order() {
    let _g = serial();
    let before = current_defaults();
    {
        let _outer = apply_style(&DEFAULT_THEME);
        {
            let _inner = apply_style(&dark());
            assert_eq!(current_defaults().grid_color, Rgb::from_hex(0x374151));
        }
        assert_eq!(current_defaults().grid_color, DEFAULT_THEME.grid);
    }
    assert_eq!(current_defaults(), before);
}

#[test]
fn persisted_scope_keeps_theme_for_new_figures() {
    let _g = serial();
    apply_style(&dark()).persist();
    let fig = Figure::new(FigureConfig::default());
    assert_eq!(fig.defaults().axes_facecolor, Rgb::from_hex(0x111827));
    assert!(fig.defaults().grid_visible);
    apply_style(&DEFAULT_THEME).persist();
}
