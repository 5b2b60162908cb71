//! Clip regions
//!
//! A region is kept as a set of non-overlapping rectangles. Every operation
//! preserves that invariant, which keeps equality, containment and area
//! questions exact without a scanline representation.

use crate::protocol::Rectangle;

/// Result of `Region::rect_in`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RectIn {
    Out = 0,
    In = 1,
    Part = 2,
}

#[derive(Debug, Clone, Default)]
pub struct Region {
    rects: Vec<Rectangle>,
}

impl Region {
    pub fn new() -> Self {
        Region { rects: Vec::new() }
    }

    pub fn from_rectangles(rects: &[Rectangle]) -> Self {
        let mut region = Region::new();
        for rect in rects {
            region.union_rect(rect);
        }
        region
    }

    pub fn rectangles(&self) -> &[Rectangle] {
        &self.rects
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    /// Add `rect` to the region
    pub fn union_rect(&mut self, rect: &Rectangle) {
        if rect.is_empty() {
            return;
        }
        let mut pieces = vec![*rect];
        for existing in &self.rects {
            pieces = pieces
                .iter()
                .flat_map(|piece| subtract_rect(piece, existing))
                .collect();
            if pieces.is_empty() {
                return;
            }
        }
        self.rects.extend(pieces);
    }

    pub fn union(&self, other: &Region) -> Region {
        let mut result = self.clone();
        for rect in &other.rects {
            result.union_rect(rect);
        }
        result
    }

    pub fn intersect(&self, other: &Region) -> Region {
        let mut rects = Vec::new();
        for a in &self.rects {
            for b in &other.rects {
                if let Some(r) = a.intersection(b) {
                    rects.push(r);
                }
            }
        }
        Region { rects }
    }

    pub fn subtract(&self, other: &Region) -> Region {
        let mut rects = self.rects.clone();
        for cut in &other.rects {
            rects = rects
                .iter()
                .flat_map(|piece| subtract_rect(piece, cut))
                .collect();
        }
        Region { rects }
    }

    pub fn xor(&self, other: &Region) -> Region {
        let mut result = self.subtract(other);
        result.rects.extend(other.subtract(self).rects);
        result
    }

    pub fn offset(&mut self, dx: i16, dy: i16) {
        for rect in &mut self.rects {
            *rect = rect.offset(dx, dy);
        }
    }

    /// Smallest rectangle enclosing the region
    pub fn clip_box(&self) -> Rectangle {
        self.rects
            .iter()
            .fold(Rectangle::default(), |acc, r| acc.union(r))
    }

    pub fn contains_point(&self, x: i32, y: i32) -> bool {
        self.rects.iter().any(|r| r.contains_point(x, y))
    }

    pub fn rect_in(&self, rect: &Rectangle) -> RectIn {
        if !self.rects.iter().any(|r| r.intersection(rect).is_some()) {
            return RectIn::Out;
        }
        let uncovered = Region::from_rectangles(&[*rect]).subtract(self);
        if uncovered.is_empty() {
            RectIn::In
        } else {
            RectIn::Part
        }
    }

    pub fn area(&self) -> u64 {
        self.rects
            .iter()
            .map(|r| r.width as u64 * r.height as u64)
            .sum()
    }
}

/// Regions are equal when they cover the same pixels
impl PartialEq for Region {
    fn eq(&self, other: &Self) -> bool {
        self.subtract(other).is_empty() && other.subtract(self).is_empty()
    }
}

/// `a` minus `b`, as up to four disjoint bands
fn subtract_rect(a: &Rectangle, b: &Rectangle) -> Vec<Rectangle> {
    let Some(overlap) = a.intersection(b) else {
        return vec![*a];
    };
    let mut out = Vec::with_capacity(4);
    let (ax1, ay1, ax2, ay2) = (a.x as i32, a.y as i32, a.right(), a.bottom());
    let (ox1, oy1, ox2, oy2) = (
        overlap.x as i32,
        overlap.y as i32,
        overlap.right(),
        overlap.bottom(),
    );
    if oy1 > ay1 {
        out.push(Rectangle::from_edges(ax1, ay1, ax2, oy1));
    }
    if oy2 < ay2 {
        out.push(Rectangle::from_edges(ax1, oy2, ax2, ay2));
    }
    if ox1 > ax1 {
        out.push(Rectangle::from_edges(ax1, oy1, ox1, oy2));
    }
    if ox2 < ax2 {
        out.push(Rectangle::from_edges(ox2, oy1, ax2, oy2));
    }
    out
}
