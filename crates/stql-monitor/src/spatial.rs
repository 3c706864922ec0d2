//! Rectangle-cover spatial algebra. A spatial value is a cover: a list of
//! axis-aligned rectangles whose union is the region. Covers may overlap;
//! the only queries the evaluator needs are "is the region non-empty" and
//! "does the region equal the universe", both of which tolerate overlap.

use stql_frames::BoundingBox;

pub type Rect = BoundingBox;

fn is_positive_area(r: &Rect) -> bool {
    r.width() > 0.0 && r.height() > 0.0
}

pub fn intersect(a: &Rect, b: &Rect) -> Option<Rect> {
    let xmin = a.xmin.max(b.xmin);
    let xmax = a.xmax.min(b.xmax);
    let ymin = a.ymin.max(b.ymin);
    let ymax = a.ymax.min(b.ymax);
    if xmin < xmax && ymin < ymax {
        Some(Rect::new(xmin, xmax, ymin, ymax))
    } else {
        None
    }
}

/// `a - b`: up to four axis-aligned rectangles covering `a \ b`.
pub fn subtract(a: &Rect, b: &Rect) -> Vec<Rect> {
    let Some(ov) = intersect(a, b) else {
        return vec![*a];
    };
    let mut pieces = Vec::with_capacity(4);
    if ov.ymin > a.ymin {
        pieces.push(Rect::new(a.xmin, a.xmax, a.ymin, ov.ymin));
    }
    if ov.ymax < a.ymax {
        pieces.push(Rect::new(a.xmin, a.xmax, ov.ymax, a.ymax));
    }
    if ov.xmin > a.xmin {
        pieces.push(Rect::new(a.xmin, ov.xmin, ov.ymin, ov.ymax));
    }
    if ov.xmax < a.xmax {
        pieces.push(Rect::new(ov.xmax, a.xmax, ov.ymin, ov.ymax));
    }
    pieces.into_iter().filter(is_positive_area).collect()
}

pub fn union(mut a: Vec<Rect>, b: Vec<Rect>) -> Vec<Rect> {
    a.extend(b);
    a.retain(is_positive_area);
    a
}

pub fn intersect_covers(a: &[Rect], b: &[Rect]) -> Vec<Rect> {
    let mut out = Vec::new();
    for ra in a {
        for rb in b {
            if let Some(r) = intersect(ra, rb) {
                out.push(r);
            }
        }
    }
    out
}

/// `universe - union(cover)`, computed by iteratively subtracting every
/// rectangle in `cover` from the running remainder.
pub fn complement(cover: &[Rect], universe: &Rect) -> Vec<Rect> {
    let mut remainder = vec![*universe];
    for r in cover {
        let mut next = Vec::new();
        for piece in &remainder {
            next.extend(subtract(piece, r));
        }
        remainder = next;
    }
    remainder
}

pub fn is_nonempty(cover: &[Rect]) -> bool {
    cover.iter().any(is_positive_area)
}

/// The cover equals `universe` iff nothing is left outside it.
pub fn covers_universe(cover: &[Rect], universe: &Rect) -> bool {
    complement(cover, universe).is_empty()
}
