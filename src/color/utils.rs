use crate::{
    color::Rgb,
    math8::{scale8, scale8_video},
};

/// Divide every channel by `divisor`
///
/// Used for the trailing pixel of a running segment (`/ 10`) and the
/// residue left in a draining pipe (`/ 20`).
#[inline]
pub const fn dim(color: Rgb, divisor: u8) -> Rgb {
    if divisor == 0 {
        return color;
    }
    Rgb {
        r: color.r / divisor,
        g: color.g / divisor,
        b: color.b / divisor,
    }
}

/// Scale every channel by `scale` (0-255 = 0.0-1.0)
#[inline]
pub const fn scale_color(color: Rgb, scale: u8) -> Rgb {
    Rgb {
        r: scale8(color.r, scale),
        g: scale8(color.g, scale),
        b: scale8(color.b, scale),
    }
}

/// Create an RGB color from a u32 value (0xRRGGBB format)
pub const fn rgb_from_u32(color: u32) -> Rgb {
    Rgb {
        r: ((color >> 16) & 0xFF) as u8,
        g: ((color >> 8) & 0xFF) as u8,
        b: (color & 0xFF) as u8,
    }
}

/// Black body heat palette (ported from `FastLED` `HeatColor`)
///
/// Temperatures ramp through black, red, yellow and white.
pub const fn heat_color(temperature: u8) -> Rgb {
    let t192 = scale8_video(temperature, 191);
    let heatramp = (t192 & 0x3F) << 2;

    if t192 & 0x80 != 0 {
        Rgb {
            r: 255,
            g: 255,
            b: heatramp,
        }
    } else if t192 & 0x40 != 0 {
        Rgb {
            r: 255,
            g: heatramp,
            b: 0,
        }
    } else {
        Rgb {
            r: heatramp,
            g: 0,
            b: 0,
        }
    }
}
