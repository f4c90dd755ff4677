//! Scene colours.

pub const fn hex(rgb: u32) -> [f32; 4] {
    [
        ((rgb >> 16) & 0xff) as f32 / 255.0,
        ((rgb >> 8) & 0xff) as f32 / 255.0,
        (rgb & 0xff) as f32 / 255.0,
        1.0,
    ]
}

pub const SELECTED: [f32; 4] = hex(0xf97316);
pub const PARTICLE: [f32; 4] = hex(0x4338ca);
pub const BOB_1: [f32; 4] = hex(0xc026d3);
pub const BOB_2: [f32; 4] = hex(0x4338ca);
pub const ANCHOR: [f32; 4] = hex(0xffffff);
pub const ROD: [f32; 4] = hex(0x808080);
pub const FORCE_ARROW: [f32; 4] = hex(0xffff00);
pub const GROUND: [f32; 4] = hex(0x1f2937);
pub const GRID_CELL: [f32; 4] = hex(0x6f6f6f);
pub const GRID_SECTION: [f32; 4] = hex(0x9d4b4b);
pub const BACKGROUND: [f32; 4] = hex(0x111827);

pub const KINETIC: [f32; 4] = hex(0xf97316);
pub const POTENTIAL: [f32; 4] = hex(0x22c55e);
pub const TOTAL: [f32; 4] = hex(0xeab308);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_unpacks_channels() {
        assert_eq!(hex(0xff0000), [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(hex(0x00ff00), [0.0, 1.0, 0.0, 1.0]);
        assert_eq!(hex(0x0000ff)[2], 1.0);
    }
}
