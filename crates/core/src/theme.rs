//! Applying a [`ThemeSpec`] to a raw status item

use m2bar_types::{StatusItem, ThemeSpec};

/// Decorate `item` with the theme's color and glyph.
///
/// The glyph is prepended unconditionally on non-empty text, so callers
/// must apply a theme once per delivered item and never to a themed item.
pub fn apply_theme(mut item: StatusItem, theme: &ThemeSpec) -> StatusItem {
    if let Some(color) = theme.color_for(item.status) {
        item.color = Some(color.clone());
    }

    if let Some(glyph) = theme.glyph() {
        if !item.full_text.is_empty() {
            item.full_text = format!("{}  {}", glyph, item.full_text);
        }
    }

    item
}

#[cfg(test)]
mod tests {
    use super::*;
    use m2bar_types::Status;

    fn palette() -> ThemeSpec {
        ThemeSpec::parse(&["#00ff00", "#ffff00", "#ff0000"], None).unwrap()
    }

    #[test]
    fn test_warn_picks_second_color() {
        let item = StatusItem::new("battery", "10%").with_status(Status::Warn);
        let themed = apply_theme(item, &palette());
        assert_eq!(themed.color.unwrap().as_str(), "#ffff00");
    }

    #[test]
    fn test_each_status_maps_to_its_color() {
        for (status, expected) in [
            (Status::Normal, "#00ff00"),
            (Status::Warn, "#ffff00"),
            (Status::Error, "#ff0000"),
        ] {
            let item = StatusItem::new("wifi", "home").with_status(status);
            assert_eq!(apply_theme(item, &palette()).color.unwrap().as_str(), expected);
        }
    }

    #[test]
    fn test_flat_color_ignores_status() {
        let theme = ThemeSpec::parse(&["#123456"], None).unwrap();
        let item = StatusItem::new("mpd", "error").with_status(Status::Error);
        assert_eq!(apply_theme(item, &theme).color.unwrap().as_str(), "#123456");
    }

    #[test]
    fn test_empty_palette_keeps_host_default() {
        let item = StatusItem::new("clock", "12:00").with_status(Status::Warn);
        assert!(apply_theme(item, &ThemeSpec::default()).color.is_none());
    }

    #[test]
    fn test_glyph_prefix() {
        let theme = ThemeSpec::parse::<&str>(&[], Some("\u{f240}".to_string())).unwrap();
        let themed = apply_theme(StatusItem::new("battery", "42%"), &theme);
        assert_eq!(themed.full_text, "\u{f240}  42%");
    }

    #[test]
    fn test_glyph_skipped_for_empty_text() {
        let theme = ThemeSpec::parse::<&str>(&[], Some("M".to_string())).unwrap();
        let themed = apply_theme(StatusItem::empty("mpd", "localhost:6600"), &theme);
        assert_eq!(themed.full_text, "");
    }

    #[test]
    fn test_short_text_untouched() {
        let theme = ThemeSpec::parse::<&str>(&[], Some("C".to_string())).unwrap();
        let item = StatusItem::new("clock", "Mon 2 Jan 15:04").with_short_text("15:04");
        let themed = apply_theme(item, &theme);
        assert_eq!(themed.short_text, "15:04");
        assert_eq!(themed.full_text, "C  Mon 2 Jan 15:04");
    }
}
