//! Colours distinguishing lock groups on the canvas.

use peniko::Color;

/// Border colours cycled through by successive lock groups.
pub const PALETTE: [Color; 8] = [
    Color::from_rgba8(230, 25, 75, 255),
    Color::from_rgba8(60, 180, 75, 255),
    Color::from_rgba8(0, 130, 200, 255),
    Color::from_rgba8(245, 130, 48, 255),
    Color::from_rgba8(145, 30, 180, 255),
    Color::from_rgba8(70, 240, 240, 255),
    Color::from_rgba8(240, 50, 230, 255),
    Color::from_rgba8(128, 128, 0, 255),
];

/// Palette entry for a group colour index.
pub fn palette_colour(index: usize) -> Color {
    PALETTE[index % PALETTE.len()]
}

/// Fill used to shade the border of a locked ravel: the group colour at half
/// intensity, more opaque while the pointer is over the border.
pub fn border_shade(index: usize, on_border: bool) -> Color {
    let rgba = palette_colour(index).to_rgba8();
    let alpha = if on_border { 128 } else { 77 };
    Color::from_rgba8(rgba.r / 2, rgba.g / 2, rgba.b / 2, alpha)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_wraps() {
        assert_eq!(palette_colour(1), palette_colour(1 + PALETTE.len()));
    }

    #[test]
    fn test_border_shade() {
        let shade = border_shade(0, true).to_rgba8();
        assert_eq!((shade.r, shade.g, shade.b, shade.a), (115, 12, 37, 128));
        assert_eq!(border_shade(0, false).to_rgba8().a, 77);
    }
}
