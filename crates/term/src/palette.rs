//! Colors of the classic 2048 look.

use crate::fb::{CellStyle, Rgb};

pub const BOARD_BG: Rgb = Rgb::hex(0x303030);
pub const BOARD_BORDER: Rgb = Rgb::hex(0x5a5a5a);
pub const EMPTY_TILE: Rgb = Rgb::hex(0x4a4a4a);
pub const DARK_TEXT: Rgb = Rgb::hex(0x776e65);
pub const LIGHT_TEXT: Rgb = Rgb::hex(0xf9f6f2);
pub const SCORE_LABEL: Rgb = Rgb::hex(0xeee4da);
pub const GAME_OVER: Rgb = Rgb::hex(0xf65e3b);
pub const WIN: Rgb = Rgb::hex(0xedc22e);
pub const SCREEN_BG: Rgb = Rgb::new(0, 0, 0);

/// Background of a tile; values past 2048 reuse the 2048 color.
pub fn tile_bg(value: u32) -> Rgb {
    match value {
        0 => EMPTY_TILE,
        2 => Rgb::hex(0xeee4da),
        4 => Rgb::hex(0xede0c8),
        8 => Rgb::hex(0xf2b179),
        16 => Rgb::hex(0xf59563),
        32 => Rgb::hex(0xf67c5f),
        64 => Rgb::hex(0xf65e3b),
        128 => Rgb::hex(0xedcf72),
        256 => Rgb::hex(0xedcc61),
        512 => Rgb::hex(0xedc850),
        1024 => Rgb::hex(0xedc53f),
        _ => Rgb::hex(0xedc22e),
    }
}

/// Style of a tile's face: dark digits on 2 and 4, light digits above.
pub fn tile_style(value: u32) -> CellStyle {
    let fg = if value >= 8 { LIGHT_TEXT } else { DARK_TEXT };
    let style = CellStyle::new(fg, tile_bg(value));
    if value == 0 {
        style
    } else {
        style.bold()
    }
}
