use serde::{Deserialize, Serialize};

const DEG_TO_RAD: f64 = std::f64::consts::PI / 180.0;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rectangle {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rectangle {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x < self.x + self.width
            && point.y >= self.y
            && point.y < self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Smallest rectangle covering both.
    pub fn union(&self, other: &Rectangle) -> Rectangle {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = (self.x + self.width).max(other.x + other.width);
        let bottom = (self.y + self.height).max(other.y + other.height);
        Rectangle::new(x, y, right - x, bottom - y)
    }
}

/// Affine transform in the `a b c d tx ty` layout used by 2D canvases.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Matrix2D {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub tx: f64,
    pub ty: f64,
}

impl Default for Matrix2D {
    fn default() -> Self {
        Self::identity()
    }
}

impl Matrix2D {
    pub const fn new(a: f64, b: f64, c: f64, d: f64, tx: f64, ty: f64) -> Self {
        Self { a, b, c, d, tx, ty }
    }

    pub const fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }

    /// Post-multiplies `self` by the given matrix.
    pub fn append(&mut self, a: f64, b: f64, c: f64, d: f64, tx: f64, ty: f64) -> &mut Self {
        let (a1, b1, c1, d1) = (self.a, self.b, self.c, self.d);
        if a != 1.0 || b != 0.0 || c != 0.0 || d != 1.0 {
            self.a = a1 * a + c1 * b;
            self.b = b1 * a + d1 * b;
            self.c = a1 * c + c1 * d;
            self.d = b1 * c + d1 * d;
        }
        self.tx = a1 * tx + c1 * ty + self.tx;
        self.ty = b1 * tx + d1 * ty + self.ty;
        self
    }

    pub fn append_matrix(&mut self, m: &Matrix2D) -> &mut Self {
        self.append(m.a, m.b, m.c, m.d, m.tx, m.ty)
    }

    /// Appends a display-object transform. Angles are in degrees.
    #[allow(clippy::too_many_arguments)]
    pub fn append_transform(
        &mut self,
        x: f64,
        y: f64,
        scale_x: f64,
        scale_y: f64,
        rotation: f64,
        skew_x: f64,
        skew_y: f64,
        reg_x: f64,
        reg_y: f64,
    ) -> &mut Self {
        let (cos, sin) = if rotation % 360.0 != 0.0 {
            let r = rotation * DEG_TO_RAD;
            (r.cos(), r.sin())
        } else {
            (1.0, 0.0)
        };

        if skew_x != 0.0 || skew_y != 0.0 {
            let sx = skew_x * DEG_TO_RAD;
            let sy = skew_y * DEG_TO_RAD;
            self.append(sy.cos(), sy.sin(), -sx.sin(), sx.cos(), x, y);
            self.append(cos * scale_x, sin * scale_x, -sin * scale_y, cos * scale_y, 0.0, 0.0);
        } else {
            self.append(cos * scale_x, sin * scale_x, -sin * scale_y, cos * scale_y, x, y);
        }

        if reg_x != 0.0 || reg_y != 0.0 {
            self.tx -= reg_x * self.a + reg_y * self.c;
            self.ty -= reg_x * self.b + reg_y * self.d;
        }
        self
    }

    pub fn transform_point(&self, x: f64, y: f64) -> Point {
        Point::new(
            x * self.a + y * self.c + self.tx,
            x * self.b + y * self.d + self.ty,
        )
    }

    /// Returns `None` for a singular matrix.
    pub fn invert(&self) -> Option<Matrix2D> {
        let n = self.a * self.d - self.b * self.c;
        if n == 0.0 {
            return None;
        }
        Some(Matrix2D::new(
            self.d / n,
            -self.b / n,
            -self.c / n,
            self.a / n,
            (self.c * self.ty - self.d * self.tx) / n,
            -(self.a * self.ty - self.b * self.tx) / n,
        ))
    }
}
