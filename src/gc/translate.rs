//! X11 enumerants to host drawing state
//!
//! Both enumerations are fixed, so a value the host cannot express is an
//! internal inconsistency rather than client error: it is logged and aborts.

use crate::backend::{DrawingMode, FillPattern, HostColor, HostFillRule, LineCap, LineJoin, StrokePattern};
use crate::protocol::*;

pub fn drawing_mode(function: GCFunction) -> DrawingMode {
    match function {
        GCFunction::Copy => DrawingMode::Copy,
        GCFunction::Xor | GCFunction::Invert => DrawingMode::Invert,
        GCFunction::Clear => DrawingMode::Erase,
        GCFunction::And => DrawingMode::Min,
        GCFunction::Or => DrawingMode::Max,
        GCFunction::Set => DrawingMode::Add,
        GCFunction::CopyInverted => DrawingMode::Subtract,
        GCFunction::NoOp => DrawingMode::Over,
        other => {
            log::error!("GC function {:?} has no host drawing mode", other);
            panic!("unsupported GC function {:?}", other);
        }
    }
}

/// TrueColor pixels carry their channels directly
pub fn color(pixel: u32) -> HostColor {
    HostColor::from_pixel(pixel)
}

/// Width 0 means the thinnest line the device can draw
pub fn pen_size(line_width: u16) -> f32 {
    line_width.max(1) as f32
}

pub fn line_cap(cap: CapStyle) -> LineCap {
    match cap {
        CapStyle::NotLast | CapStyle::Butt => LineCap::Butt,
        CapStyle::Round => LineCap::Round,
        CapStyle::Projecting => LineCap::Square,
    }
}

pub fn line_join(join: JoinStyle) -> LineJoin {
    match join {
        JoinStyle::Miter => LineJoin::Miter,
        JoinStyle::Round => LineJoin::Round,
        JoinStyle::Bevel => LineJoin::Bevel,
    }
}

pub fn stroke_pattern(style: LineStyle, offset: u16, dashes: &[u8]) -> StrokePattern {
    match style {
        LineStyle::Solid => StrokePattern::Solid,
        LineStyle::OnOffDash => StrokePattern::Dashed {
            offset,
            dashes: dashes.to_vec(),
        },
        LineStyle::DoubleDash => StrokePattern::DoubleDashed {
            offset,
            dashes: dashes.to_vec(),
        },
    }
}

pub fn fill_pattern(style: FillStyle) -> FillPattern {
    match style {
        FillStyle::Solid => FillPattern::SolidHigh,
        FillStyle::Tiled => FillPattern::Tiled,
        FillStyle::Stippled => FillPattern::Stippled,
        FillStyle::OpaqueStippled => FillPattern::OpaqueStippled,
    }
}

pub fn fill_rule(rule: FillRule) -> HostFillRule {
    match rule {
        FillRule::EvenOdd => HostFillRule::EvenOdd,
        FillRule::Winding => HostFillRule::NonZero,
    }
}

/// X11 arc angles are 1/64 degree
pub fn arc_degrees(angle: i16) -> f32 {
    angle as f32 / 64.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_functions() {
        assert_eq!(drawing_mode(GCFunction::Copy), DrawingMode::Copy);
        assert_eq!(drawing_mode(GCFunction::Xor), DrawingMode::Invert);
        assert_eq!(drawing_mode(GCFunction::Clear), DrawingMode::Erase);
    }

    #[test]
    #[should_panic(expected = "unsupported GC function")]
    fn test_unsupported_function_aborts() {
        drawing_mode(GCFunction::Nand);
    }

    #[test]
    fn test_line_and_fill_mapping() {
        assert_eq!(pen_size(0), 1.0);
        assert_eq!(pen_size(5), 5.0);
        assert_eq!(line_cap(CapStyle::Projecting), LineCap::Square);
        assert_eq!(fill_rule(FillRule::Winding), HostFillRule::NonZero);
        assert_eq!(
            stroke_pattern(LineStyle::OnOffDash, 2, &[3, 1]),
            StrokePattern::Dashed {
                offset: 2,
                dashes: vec![3, 1]
            }
        );
        assert_eq!(arc_degrees(90 * 64), 90.0);
    }
}
