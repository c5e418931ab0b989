//! Rectangle editing: handles, hit testing and resize math.

use annotrace_vision::Point;

use crate::model::BoundingBox;

/// One of the eight resize handles around an active rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handle {
    NorthWest,
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
}

impl Handle {
    /// All handles, corners and sides interleaved clockwise from the top-left.
    pub const ALL: [Handle; 8] = [
        Handle::NorthWest,
        Handle::North,
        Handle::NorthEast,
        Handle::East,
        Handle::SouthEast,
        Handle::South,
        Handle::SouthWest,
        Handle::West,
    ];

    /// Position of this handle on `rect`.
    pub fn position(&self, rect: &BoundingBox) -> Point {
        let cx = rect.x + rect.width / 2.0;
        let cy = rect.y + rect.height / 2.0;
        match self {
            Handle::NorthWest => Point::new(rect.x, rect.y),
            Handle::North => Point::new(cx, rect.y),
            Handle::NorthEast => Point::new(rect.right(), rect.y),
            Handle::East => Point::new(rect.right(), cy),
            Handle::SouthEast => Point::new(rect.right(), rect.bottom()),
            Handle::South => Point::new(cx, rect.bottom()),
            Handle::SouthWest => Point::new(rect.x, rect.bottom()),
            Handle::West => Point::new(rect.x, cy),
        }
    }

    fn moves_left(&self) -> bool {
        matches!(self, Handle::NorthWest | Handle::West | Handle::SouthWest)
    }

    fn moves_right(&self) -> bool {
        matches!(self, Handle::NorthEast | Handle::East | Handle::SouthEast)
    }

    fn moves_top(&self) -> bool {
        matches!(self, Handle::NorthWest | Handle::North | Handle::NorthEast)
    }

    fn moves_bottom(&self) -> bool {
        matches!(self, Handle::SouthWest | Handle::South | Handle::SouthEast)
    }
}

/// First handle within `radius` of `p`, if any.
pub fn hit_handle(rect: &BoundingBox, p: Point, radius: f32) -> Option<Handle> {
    Handle::ALL
        .into_iter()
        .find(|h| h.position(rect).distance_to(&p) <= radius)
}

/// Move the edges owned by `handle` to the pointer.
///
/// Width and height never drop below `min_size`; when a left or top edge
/// is dragged the origin follows it and the opposite edge stays put.
pub fn resize(rect: &BoundingBox, handle: Handle, p: Point, min_size: f32) -> BoundingBox {
    let mut left = rect.x;
    let mut top = rect.y;
    let mut right = rect.right();
    let mut bottom = rect.bottom();

    if handle.moves_left() {
        left = p.x.min(right - min_size);
    }
    if handle.moves_right() {
        right = p.x.max(left + min_size);
    }
    if handle.moves_top() {
        top = p.y.min(bottom - min_size);
    }
    if handle.moves_bottom() {
        bottom = p.y.max(top + min_size);
    }

    BoundingBox::new(left, top, right - left, bottom - top)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect() -> BoundingBox {
        BoundingBox::new(100.0, 100.0, 80.0, 60.0)
    }

    #[test]
    fn test_handle_positions() {
        let r = rect();
        assert_eq!(Handle::NorthWest.position(&r), Point::new(100.0, 100.0));
        assert_eq!(Handle::North.position(&r), Point::new(140.0, 100.0));
        assert_eq!(Handle::East.position(&r), Point::new(180.0, 130.0));
        assert_eq!(Handle::SouthEast.position(&r), Point::new(180.0, 160.0));
        assert_eq!(Handle::West.position(&r), Point::new(100.0, 130.0));
    }

    #[test]
    fn test_hit_handle_radius() {
        let r = rect();
        assert_eq!(hit_handle(&r, Point::new(105.0, 104.0), 8.0), Some(Handle::NorthWest));
        assert_eq!(hit_handle(&r, Point::new(186.0, 130.0), 8.0), Some(Handle::East));
        assert_eq!(hit_handle(&r, Point::new(140.0, 130.0), 8.0), None);
        assert_eq!(hit_handle(&r, Point::new(109.0, 100.0), 8.0), None);
    }

    #[test]
    fn test_corner_moves_two_edges() {
        let resized = resize(&rect(), Handle::SouthEast, Point::new(220.0, 200.0), 10.0);
        assert_eq!(resized, BoundingBox::new(100.0, 100.0, 120.0, 100.0));
    }

    #[test]
    fn test_left_edge_reanchors_origin() {
        let resized = resize(&rect(), Handle::West, Point::new(60.0, 999.0), 10.0);
        assert_eq!(resized, BoundingBox::new(60.0, 100.0, 120.0, 60.0));
    }

    #[test]
    fn test_top_edge_reanchors_origin() {
        let resized = resize(&rect(), Handle::North, Point::new(0.0, 130.0), 10.0);
        assert_eq!(resized, BoundingBox::new(100.0, 130.0, 80.0, 30.0));
    }

    #[test]
    fn test_resize_clamps_to_minimum() {
        let past_right = resize(&rect(), Handle::West, Point::new(500.0, 0.0), 10.0);
        assert_eq!(past_right, BoundingBox::new(170.0, 100.0, 10.0, 60.0));

        let collapsed = resize(&rect(), Handle::NorthEast, Point::new(0.0, 400.0), 10.0);
        assert_eq!(collapsed, BoundingBox::new(100.0, 150.0, 10.0, 10.0));
    }
}
