use rand::Rng;

/// Axis-aligned rectangle anchored at its minimum corner.
///
/// Overlap is half-open: edges that only touch do not overlap, and a
/// rectangle with zero width or height overlaps nothing, itself included.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Rectangle {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rectangle {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y
    }

    pub fn top(&self) -> f32 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width * 0.5
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.height * 0.5
    }

    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// Both dimensions finite and non-negative.
    pub fn is_valid(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.width >= 0.0
            && self.height >= 0.0
    }

    #[inline(always)]
    pub fn overlaps(&self, other: &Rectangle) -> bool {
        self.width > 0.0
            && self.height > 0.0
            && other.width > 0.0
            && other.height > 0.0
            && self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }

    /// Closed containment: `inner` may share edges with `self`.
    pub fn contains_rectangle(&self, inner: &Rectangle) -> bool {
        self.x <= inner.x
            && self.right() >= inner.right()
            && self.y <= inner.y
            && self.top() >= inner.top()
    }

    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.top()
    }

    /// Splits into north-west, north-east, south-west, south-east, with y
    /// growing north. The far edges come from the parent so the four
    /// quadrants tile it without gaps.
    pub fn quadrants(&self) -> [Rectangle; 4] {
        let mid_x = self.center_x();
        let mid_y = self.center_y();
        let west = mid_x - self.x;
        let east = self.right() - mid_x;
        let south = mid_y - self.y;
        let north = self.top() - mid_y;
        [
            Rectangle::new(self.x, mid_y, west, north),
            Rectangle::new(mid_x, mid_y, east, north),
            Rectangle::new(self.x, self.y, west, south),
            Rectangle::new(mid_x, self.y, east, south),
        ]
    }

    pub fn expand_to_include(&mut self, other: &Rectangle) {
        let left = f32::min(self.left(), other.left());
        let right = f32::max(self.right(), other.right());
        let bottom = f32::min(self.bottom(), other.bottom());
        let top = f32::max(self.top(), other.top());
        self.x = left;
        self.y = bottom;
        self.width = right - left;
        self.height = top - bottom;
    }

    /// Random rectangle of the given size lying fully inside `self`. Sizes
    /// larger than `self` are clamped to it.
    pub fn random_rect_inside<R: Rng>(&self, width: f32, height: f32, rng: &mut R) -> Rectangle {
        let width = width.min(self.width);
        let height = height.min(self.height);
        Rectangle::new(
            self._safe_randf32(rng, self.left(), self.right() - width),
            self._safe_randf32(rng, self.bottom(), self.top() - height),
            width,
            height,
        )
    }

    fn _safe_randf32<R: Rng>(&self, rng: &mut R, min: f32, max: f32) -> f32 {
        if min >= max {
            return min;
        }
        rng.gen_range(min..=max)
    }
}
