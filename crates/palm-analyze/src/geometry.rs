//! Normalised boxes and their mapping onto a display surface.

use serde::{Deserialize, Serialize};

/// Normalised rectangle, origin at the **top-left** of the image.
///
/// All four fields are fractions of the image size and are expected in
/// `[0, 1]`; nothing here enforces it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x:      f64,
    pub y:      f64,
    pub width:  f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Convert a box whose origin is the lower-left corner (mobile vision
    /// frameworks report boxes this way) into the top-left convention.
    pub fn from_lower_left(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y: 1.0 - y - height, width, height }
    }

    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    /// Corners as `[x1, y1, x2, y2]`.
    pub fn corners(&self) -> [f64; 4] {
        [self.x, self.y, self.x + self.width, self.y + self.height]
    }

    /// Intersection over union; `0.0` for disjoint or degenerate boxes.
    pub fn iou(&self, other: &BoundingBox) -> f64 {
        let a = self.corners();
        let b = other.corners();
        let iw = (a[2].min(b[2]) - a[0].max(b[0])).max(0.0);
        let ih = (a[3].min(b[3]) - a[1].max(b[1])).max(0.0);
        let inter = iw * ih;
        let union = self.area() + other.area() - inter;
        if union <= 0.0 { 0.0 } else { inter / union }
    }

    /// Scale onto a `width`×`height` surface (pixels or points).
    pub fn to_display_rect(&self, width: f64, height: f64) -> DisplayRect {
        DisplayRect {
            x:      self.x * width,
            y:      self.y * height,
            width:  self.width * width,
            height: self.height * height,
        }
    }
}

/// Rectangle in surface coordinates, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DisplayRect {
    pub x:      f64,
    pub y:      f64,
    pub width:  f64,
    pub height: f64,
}

impl DisplayRect {
    /// Shift by the origin of an enclosing rect, e.g. a letterboxed image area.
    pub fn offset(&self, by: &DisplayRect) -> DisplayRect {
        DisplayRect { x: self.x + by.x, y: self.y + by.y, ..*self }
    }
}

/// Area that `content` occupies when fitted, aspect preserved and centred,
/// into `surface`. Both are `(width, height)`.
///
/// Degenerate content sizes get the whole surface.
pub fn fit_rect(surface: (f64, f64), content: (f64, f64)) -> DisplayRect {
    let (sw, sh) = surface;
    let (cw, ch) = content;
    if cw <= 0.0 || ch <= 0.0 {
        return DisplayRect { x: 0.0, y: 0.0, width: sw, height: sh };
    }

    let scaled_w = cw * (sh / ch);
    let scaled_h = ch * (sw / cw);

    if scaled_h < sh {
        DisplayRect { x: 0.0, y: (sh - scaled_h) / 2.0, width: sw, height: scaled_h }
    } else {
        DisplayRect { x: (sw - scaled_w) / 2.0, y: 0.0, width: scaled_w, height: sh }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn lower_left_boxes_are_flipped() {
        let b = BoundingBox::from_lower_left(0.1, 0.2, 0.3, 0.4);
        assert!(close(b.y, 0.4));
        assert!(close(b.x, 0.1));
    }

    #[test]
    fn iou_of_identical_and_disjoint_boxes() {
        let a = BoundingBox::new(0.1, 0.1, 0.2, 0.2);
        let b = BoundingBox::new(0.6, 0.6, 0.2, 0.2);
        assert!(close(a.iou(&a), 1.0));
        assert!(close(a.iou(&b), 0.0));
    }

    #[test]
    fn iou_of_half_overlap() {
        let a = BoundingBox::new(0.0, 0.0, 0.2, 0.2);
        let b = BoundingBox::new(0.1, 0.0, 0.2, 0.2);
        // inter 0.02, union 0.06
        assert!(close(a.iou(&b), 1.0 / 3.0));
    }

    #[test]
    fn zero_area_boxes_do_not_divide_by_zero() {
        let z = BoundingBox::default();
        assert_eq!(z.iou(&z), 0.0);
    }

    #[test]
    fn display_rect_scales_each_axis() {
        let r = BoundingBox::new(0.25, 0.5, 0.5, 0.25).to_display_rect(400.0, 200.0);
        assert_eq!(r, DisplayRect { x: 100.0, y: 100.0, width: 200.0, height: 50.0 });
    }

    #[test]
    fn wide_content_is_letterboxed_vertically() {
        let r = fit_rect((100.0, 100.0), (200.0, 100.0));
        assert_eq!(r, DisplayRect { x: 0.0, y: 25.0, width: 100.0, height: 50.0 });
    }

    #[test]
    fn tall_content_is_pillarboxed() {
        let r = fit_rect((100.0, 100.0), (50.0, 100.0));
        assert_eq!(r, DisplayRect { x: 25.0, y: 0.0, width: 50.0, height: 100.0 });
    }

    #[test]
    fn degenerate_content_takes_whole_surface() {
        let r = fit_rect((320.0, 240.0), (0.0, 0.0));
        assert_eq!(r.width, 320.0);
        assert_eq!(r.height, 240.0);
    }
}
