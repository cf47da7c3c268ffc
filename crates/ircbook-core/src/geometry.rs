//! Small geometric and statistical helpers shared across the pipeline.
//!
//! These are deliberately free functions rather than methods on
//! `pdfplumber_core::geometry::BBox` — they encode this crate's own
//! tolerance-driven decisions (median/percentile over point sets, rotated
//! bbox frames), not general PDF geometry.

use pdfplumber_core::geometry::BBox;

/// Median of a slice of `f64`. `None` on an empty slice.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted: Vec<f64> = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// `p`-th percentile (0.0..=1.0) of a slice of `f64`, using nearest-rank
/// interpolation between adjacent order statistics. `None` on an empty slice.
pub fn percentile(values: &[f64], p: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted: Vec<f64> = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
    if sorted.len() == 1 {
        return Some(sorted[0]);
    }
    let rank = p.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        Some(sorted[lo])
    } else {
        let frac = rank - lo as f64;
        Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
    }
}

/// Rotate a bbox given in the page's native (0°) frame into the frame of
/// rotation `r` (one of 0, 90, 180, 270), where `page_width`/`page_height`
/// are the native page dimensions.
///
/// Matches the rotation convention used for table-rotation disambiguation
/// in the ruled-table detector (§4.2): `r` is the rotation applied to bring
/// the page's *content* upright, so a bbox is rotated by `r` about the page
/// center and re-expressed in the rotated page's own width/height frame.
pub fn rotate_bbox(bbox: BBox, r: i32, page_width: f64, page_height: f64) -> BBox {
    match r.rem_euclid(360) {
        0 => bbox,
        90 => BBox::new(
            bbox.top,
            page_width - bbox.x1,
            bbox.bottom,
            page_width - bbox.x0,
        ),
        180 => BBox::new(
            page_width - bbox.x1,
            page_height - bbox.bottom,
            page_width - bbox.x0,
            page_height - bbox.top,
        ),
        270 => BBox::new(
            page_height - bbox.bottom,
            bbox.x0,
            page_height - bbox.top,
            bbox.x1,
        ),
        _ => bbox,
    }
}

/// Dimensions of the page after rotating its content by `r` degrees.
pub fn rotated_dimensions(r: i32, page_width: f64, page_height: f64) -> (f64, f64) {
    match r.rem_euclid(360) {
        90 | 270 => (page_height, page_width),
        _ => (page_width, page_height),
    }
}

/// Inverse of [`rotate_bbox`]: given a bbox already expressed in rotation
/// `r`'s frame, recover its bbox in the page's native (0°) frame.
pub fn native_bbox(bbox: BBox, r: i32, page_width: f64, page_height: f64) -> BBox {
    match r.rem_euclid(360) {
        0 => bbox,
        other => {
            let (rw, rh) = rotated_dimensions(other, page_width, page_height);
            rotate_bbox(bbox, (360 - other).rem_euclid(360), rw, rh)
        }
    }
}

/// The horizontal center of a bbox.
pub fn center_x(bbox: &BBox) -> f64 {
    (bbox.x0 + bbox.x1) / 2.0
}

/// The vertical center of a bbox.
pub fn center_y(bbox: &BBox) -> f64 {
    (bbox.top + bbox.bottom) / 2.0
}

/// True if `bbox` lies entirely within `[x0, x1]` horizontally.
pub fn horizontally_inside(bbox: &BBox, x0: f64, x1: f64) -> bool {
    bbox.x0 >= x0 - 1e-6 && bbox.x1 <= x1 + 1e-6
}

/// True if the horizontal extents of two bboxes overlap at all.
pub fn x_ranges_overlap(a: &BBox, b: &BBox) -> bool {
    a.x0 <= b.x1 && b.x0 <= a.x1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn median_odd_and_even() {
        assert_eq!(median(&[1.0, 3.0, 2.0]), Some(2.0));
        assert_eq!(median(&[1.0, 2.0, 3.0, 4.0]), Some(2.5));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn percentile_bounds() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(percentile(&values, 0.0), Some(1.0));
        assert_eq!(percentile(&values, 1.0), Some(5.0));
        assert_eq!(percentile(&values, 0.5), Some(3.0));
    }

    #[test]
    fn rotate_bbox_90_round_trips_dimensions() {
        let bbox = BBox::new(10.0, 20.0, 30.0, 40.0);
        let rotated = rotate_bbox(bbox, 90, 200.0, 400.0);
        let (w, h) = rotated_dimensions(90, 200.0, 400.0);
        assert_eq!((w, h), (400.0, 200.0));
        assert!(rotated.x0 >= 0.0 && rotated.x1 <= w);
        assert!(rotated.top >= 0.0 && rotated.bottom <= h);
    }

    #[test]
    fn rotate_bbox_0_is_identity() {
        let bbox = BBox::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(rotate_bbox(bbox, 0, 100.0, 100.0), bbox);
    }

    #[test]
    fn native_bbox_round_trips_through_rotation() {
        let bbox = BBox::new(10.0, 20.0, 30.0, 40.0);
        let (page_width, page_height) = (200.0, 400.0);
        for r in [90, 180, 270] {
            let (rw, rh) = rotated_dimensions(r, page_width, page_height);
            let rotated = rotate_bbox(bbox, r, page_width, page_height);
            let back = native_bbox(rotated, r, page_width, page_height);
            assert!((back.x0 - bbox.x0).abs() < 1e-6, "r={r} rw={rw} rh={rh}");
            assert!((back.x1 - bbox.x1).abs() < 1e-6);
            assert!((back.top - bbox.top).abs() < 1e-6);
            assert!((back.bottom - bbox.bottom).abs() < 1e-6);
        }
    }
}
