//! Color lookup for the TrueColor default visual
//!
//! Pixels are packed 0xRRGGBB. Channel values on the Xlib side are 16 bit;
//! 8-bit channels are widened by repetition so that a pixel always decodes
//! back to the exact channels it came from.

use crate::protocol::*;

/// `XColor`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct XColor {
    pub pixel: u32,
    pub red: u16,
    pub green: u16,
    pub blue: u16,
    pub flags: u8,
}

pub mod color_flags {
    pub const DO_RED: u8 = 1 << 0;
    pub const DO_GREEN: u8 = 1 << 1;
    pub const DO_BLUE: u8 = 1 << 2;
    pub const DO_ALL: u8 = DO_RED | DO_GREEN | DO_BLUE;
}

/// The default colormap's ID
pub const DEFAULT_COLORMAP: Colormap = Colormap(XID(0x20));

// Subset of the X11 rgb.txt database, keys lowercase without spaces
const NAMED_COLORS: &[(&str, (u8, u8, u8))] = &[
    ("aliceblue", (240, 248, 255)),
    ("antiquewhite", (250, 235, 215)),
    ("aquamarine", (127, 255, 212)),
    ("azure", (240, 255, 255)),
    ("beige", (245, 245, 220)),
    ("bisque", (255, 228, 196)),
    ("black", (0, 0, 0)),
    ("blanchedalmond", (255, 235, 205)),
    ("blue", (0, 0, 255)),
    ("blueviolet", (138, 43, 226)),
    ("brown", (165, 42, 42)),
    ("burlywood", (222, 184, 135)),
    ("cadetblue", (95, 158, 160)),
    ("chartreuse", (127, 255, 0)),
    ("chocolate", (210, 105, 30)),
    ("coral", (255, 127, 80)),
    ("cornflowerblue", (100, 149, 237)),
    ("cornsilk", (255, 248, 220)),
    ("cyan", (0, 255, 255)),
    ("darkblue", (0, 0, 139)),
    ("darkcyan", (0, 139, 139)),
    ("darkgoldenrod", (184, 134, 11)),
    ("darkgray", (169, 169, 169)),
    ("darkgreen", (0, 100, 0)),
    ("darkgrey", (169, 169, 169)),
    ("darkkhaki", (189, 183, 107)),
    ("darkmagenta", (139, 0, 139)),
    ("darkolivegreen", (85, 107, 47)),
    ("darkorange", (255, 140, 0)),
    ("darkorchid", (153, 50, 204)),
    ("darkred", (139, 0, 0)),
    ("darksalmon", (233, 150, 122)),
    ("darkseagreen", (143, 188, 143)),
    ("darkslateblue", (72, 61, 139)),
    ("darkslategray", (47, 79, 79)),
    ("darkslategrey", (47, 79, 79)),
    ("darkturquoise", (0, 206, 209)),
    ("darkviolet", (148, 0, 211)),
    ("deeppink", (255, 20, 147)),
    ("deepskyblue", (0, 191, 255)),
    ("dimgray", (105, 105, 105)),
    ("dimgrey", (105, 105, 105)),
    ("dodgerblue", (30, 144, 255)),
    ("firebrick", (178, 34, 34)),
    ("floralwhite", (255, 250, 240)),
    ("forestgreen", (34, 139, 34)),
    ("gainsboro", (220, 220, 220)),
    ("ghostwhite", (248, 248, 255)),
    ("gold", (255, 215, 0)),
    ("goldenrod", (218, 165, 32)),
    ("gray", (190, 190, 190)),
    ("green", (0, 255, 0)),
    ("greenyellow", (173, 255, 47)),
    ("grey", (190, 190, 190)),
    ("honeydew", (240, 255, 240)),
    ("hotpink", (255, 105, 180)),
    ("indianred", (205, 92, 92)),
    ("ivory", (255, 255, 240)),
    ("khaki", (240, 230, 140)),
    ("lavender", (230, 230, 250)),
    ("lavenderblush", (255, 240, 245)),
    ("lawngreen", (124, 252, 0)),
    ("lemonchiffon", (255, 250, 205)),
    ("lightblue", (173, 216, 230)),
    ("lightcoral", (240, 128, 128)),
    ("lightcyan", (224, 255, 255)),
    ("lightgoldenrod", (238, 221, 130)),
    ("lightgray", (211, 211, 211)),
    ("lightgreen", (144, 238, 144)),
    ("lightgrey", (211, 211, 211)),
    ("lightpink", (255, 182, 193)),
    ("lightsalmon", (255, 160, 122)),
    ("lightseagreen", (32, 178, 170)),
    ("lightskyblue", (135, 206, 250)),
    ("lightslateblue", (132, 112, 255)),
    ("lightslategray", (119, 136, 153)),
    ("lightsteelblue", (176, 196, 222)),
    ("lightyellow", (255, 255, 224)),
    ("limegreen", (50, 205, 50)),
    ("linen", (250, 240, 230)),
    ("magenta", (255, 0, 255)),
    ("maroon", (176, 48, 96)),
    ("mediumaquamarine", (102, 205, 170)),
    ("mediumblue", (0, 0, 205)),
    ("mediumorchid", (186, 85, 211)),
    ("mediumpurple", (147, 112, 219)),
    ("mediumseagreen", (60, 179, 113)),
    ("mediumslateblue", (123, 104, 238)),
    ("mediumspringgreen", (0, 250, 154)),
    ("mediumturquoise", (72, 209, 204)),
    ("mediumvioletred", (199, 21, 133)),
    ("midnightblue", (25, 25, 112)),
    ("mintcream", (245, 255, 250)),
    ("mistyrose", (255, 228, 225)),
    ("moccasin", (255, 228, 181)),
    ("navajowhite", (255, 222, 173)),
    ("navy", (0, 0, 128)),
    ("navyblue", (0, 0, 128)),
    ("oldlace", (253, 245, 230)),
    ("olivedrab", (107, 142, 35)),
    ("orange", (255, 165, 0)),
    ("orangered", (255, 69, 0)),
    ("orchid", (218, 112, 214)),
    ("palegoldenrod", (238, 232, 170)),
    ("palegreen", (152, 251, 152)),
    ("paleturquoise", (175, 238, 238)),
    ("palevioletred", (219, 112, 147)),
    ("papayawhip", (255, 239, 213)),
    ("peachpuff", (255, 218, 185)),
    ("peru", (205, 133, 63)),
    ("pink", (255, 192, 203)),
    ("plum", (221, 160, 221)),
    ("powderblue", (176, 224, 230)),
    ("purple", (160, 32, 240)),
    ("red", (255, 0, 0)),
    ("rosybrown", (188, 143, 143)),
    ("royalblue", (65, 105, 225)),
    ("saddlebrown", (139, 69, 19)),
    ("salmon", (250, 128, 114)),
    ("sandybrown", (244, 164, 96)),
    ("seagreen", (46, 139, 87)),
    ("seashell", (255, 245, 238)),
    ("sienna", (160, 82, 45)),
    ("skyblue", (135, 206, 235)),
    ("slateblue", (106, 90, 205)),
    ("slategray", (112, 128, 144)),
    ("slategrey", (112, 128, 144)),
    ("snow", (255, 250, 250)),
    ("springgreen", (0, 255, 127)),
    ("steelblue", (70, 130, 180)),
    ("tan", (210, 180, 140)),
    ("thistle", (216, 191, 216)),
    ("tomato", (255, 99, 71)),
    ("turquoise", (64, 224, 208)),
    ("violet", (238, 130, 238)),
    ("violetred", (208, 32, 144)),
    ("wheat", (245, 222, 179)),
    ("white", (255, 255, 255)),
    ("whitesmoke", (245, 245, 245)),
    ("yellow", (255, 255, 0)),
    ("yellowgreen", (154, 205, 50)),
];

fn widen(channel: u8) -> u16 {
    (channel as u16) << 8 | channel as u16
}

/// Pack 16-bit channels into a TrueColor pixel
pub fn rgb_to_pixel(red: u16, green: u16, blue: u16) -> u32 {
    ((red >> 8) as u32) << 16 | ((green >> 8) as u32) << 8 | (blue >> 8) as u32
}

/// Channels represented by a TrueColor pixel
pub fn pixel_to_color(pixel: u32) -> XColor {
    XColor {
        pixel: pixel & 0xff_ffff,
        red: widen((pixel >> 16) as u8),
        green: widen((pixel >> 8) as u8),
        blue: widen(pixel as u8),
        flags: color_flags::DO_ALL,
    }
}

fn lookup_name(name: &str) -> Option<(u8, u8, u8)> {
    let key: String = name
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase();
    if let Some((_, rgb)) = NAMED_COLORS.iter().find(|(n, _)| *n == key) {
        return Some(*rgb);
    }
    // grayN / greyN, N in 0..=100
    let level = key
        .strip_prefix("gray")
        .or_else(|| key.strip_prefix("grey"))?
        .parse::<u32>()
        .ok()
        .filter(|n| *n <= 100)?;
    let v = ((level * 255 + 50) / 100) as u8;
    Some((v, v, v))
}

/// Scale an n-digit hex channel to 16 bits
fn scale_hex(digits: &str) -> Option<u16> {
    if digits.is_empty() || digits.len() > 4 {
        return None;
    }
    let value = u32::from_str_radix(digits, 16).ok()?;
    let max = (1u32 << (4 * digits.len())) - 1;
    Some((value * 0xffff / max) as u16)
}

/// Parse a color specification: a database name, `#rgb` in 1 to 4 hex
/// digits per channel, or `rgb:r/g/b`.
pub fn parse_color(spec: &str) -> X11Result<XColor> {
    let spec = spec.trim();
    let (red, green, blue) = if let Some(hex) = spec.strip_prefix('#') {
        let n = hex.len();
        if n == 0 || n % 3 != 0 || n > 12 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(X11Error::bad_name("XParseColor"));
        }
        let w = n / 3;
        // "#rgb" forms are left-aligned: #f00 is 0xf000, not 0xffff
        let channel = |i: usize| -> u16 {
            let v = u32::from_str_radix(&hex[i * w..(i + 1) * w], 16).unwrap_or(0);
            (v << (16 - 4 * w as u32)) as u16
        };
        (channel(0), channel(1), channel(2))
    } else if let Some(rest) = spec.strip_prefix("rgb:") {
        let parts: Vec<&str> = rest.split('/').collect();
        if parts.len() != 3 {
            return Err(X11Error::bad_name("XParseColor"));
        }
        let r = scale_hex(parts[0]).ok_or_else(|| X11Error::bad_name("XParseColor"))?;
        let g = scale_hex(parts[1]).ok_or_else(|| X11Error::bad_name("XParseColor"))?;
        let b = scale_hex(parts[2]).ok_or_else(|| X11Error::bad_name("XParseColor"))?;
        (r, g, b)
    } else {
        let (r, g, b) = lookup_name(spec).ok_or_else(|| X11Error::bad_name("XParseColor"))?;
        (widen(r), widen(g), widen(b))
    };
    Ok(XColor {
        pixel: 0,
        red,
        green,
        blue,
        flags: color_flags::DO_ALL,
    })
}

/// Allocate the closest TrueColor pixel; `color.pixel` and the channels are
/// rewritten to what the visual actually represents
pub fn alloc_color(color: &mut XColor) {
    let pixel = rgb_to_pixel(color.red, color.green, color.blue);
    *color = pixel_to_color(pixel);
}

/// `(exact, screen)` for a color name
pub fn lookup_color(name: &str) -> X11Result<(XColor, XColor)> {
    let exact = parse_color(name).map_err(|_| X11Error::bad_name("XLookupColor"))?;
    let mut screen = exact;
    alloc_color(&mut screen);
    Ok((exact, screen))
}

/// Allocate a named color, returning `(screen, exact)` as Xlib does
pub fn alloc_named_color(name: &str) -> X11Result<(XColor, XColor)> {
    let (exact, screen) = lookup_color(name).map_err(|_| X11Error::bad_name("XAllocNamedColor"))?;
    Ok((screen, exact))
}

pub fn query_color(pixel: u32) -> XColor {
    pixel_to_color(pixel)
}
