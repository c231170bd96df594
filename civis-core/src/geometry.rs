//! Contour polygons and point containment.

/// Closed polygon outlining one neuron's spatial footprint.
///
/// Points are in display coordinates (origin bottom-left); the closing edge
/// from the last point back to the first is implicit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Contour {
    points: Vec<[f64; 2]>,
}

impl Contour {
    /// Creates a contour from `[x, y]` vertices.
    #[must_use]
    pub fn new(points: Vec<[f64; 2]>) -> Self {
        Self { points }
    }

    /// Vertices in drawing order.
    #[must_use]
    pub fn points(&self) -> &[[f64; 2]] {
        &self.points
    }

    /// Number of vertices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true if the contour has no vertices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// X coordinates of all vertices.
    #[must_use]
    pub fn xs(&self) -> Vec<f64> {
        self.points.iter().map(|p| p[0]).collect()
    }

    /// Y coordinates of all vertices.
    #[must_use]
    pub fn ys(&self) -> Vec<f64> {
        self.points.iter().map(|p| p[1]).collect()
    }

    /// Vertices with the first point repeated at the end (for outlines).
    #[must_use]
    pub fn closed_points(&self) -> Vec<[f64; 2]> {
        let mut pts = self.points.clone();
        if let Some(&first) = self.points.first() {
            pts.push(first);
        }
        pts
    }

    /// Axis-aligned bounds as `([min_x, min_y], [max_x, max_y])`.
    #[must_use]
    pub fn bounds(&self) -> Option<([f64; 2], [f64; 2])> {
        let first = *self.points.first()?;
        let mut min = first;
        let mut max = first;
        for p in &self.points[1..] {
            min[0] = min[0].min(p[0]);
            min[1] = min[1].min(p[1]);
            max[0] = max[0].max(p[0]);
            max[1] = max[1].max(p[1]);
        }
        Some((min, max))
    }

    /// Even-odd containment test.
    #[must_use]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        let n = self.points.len();
        if n < 3 {
            return false;
        }
        if let Some((min, max)) = self.bounds() {
            if x < min[0] || x > max[0] || y < min[1] || y > max[1] {
                return false;
            }
        }
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let [xi, yi] = self.points[i];
            let [xj, yj] = self.points[j];
            let crosses = ((yi > y) != (yj > y))
                && (x < (xj - xi) * (y - yi) / (yj - yi + f64::EPSILON) + xi);
            if crosses {
                inside = !inside;
            }
            j = i;
        }
        inside
    }

    /// Twice the signed area; positive for counter-clockwise winding.
    #[must_use]
    pub fn signed_area2(&self) -> f64 {
        let n = self.points.len();
        (0..n)
            .map(|i| {
                let [x1, y1] = self.points[i];
                let [x2, y2] = self.points[(i + 1) % n];
                x1 * y2 - x2 * y1
            })
            .sum()
    }

    /// Returns true if every turn has the same orientation.
    #[must_use]
    pub fn is_convex(&self) -> bool {
        let n = self.points.len();
        if n < 3 {
            return false;
        }
        let mut sign: i8 = 0;
        for i in 0..n {
            let turn = cross(
                self.points[i],
                self.points[(i + 1) % n],
                self.points[(i + 2) % n],
            );
            if turn.abs() <= f64::EPSILON {
                continue;
            }
            let turn_sign = if turn > 0.0 { 1 } else { -1 };
            if sign == 0 {
                sign = turn_sign;
            } else if turn_sign != sign {
                return false;
            }
        }
        sign != 0
    }

    /// Ear-clipping triangulation for filling non-convex outlines.
    ///
    /// Returns an empty vector for degenerate polygons.
    #[must_use]
    pub fn triangulate(&self) -> Vec<[[f64; 2]; 3]> {
        let pts = &self.points;
        let n = pts.len();
        if n < 3 {
            return Vec::new();
        }
        let area = self.signed_area2();
        if area.abs() <= f64::EPSILON {
            return Vec::new();
        }
        let ccw = area > 0.0;
        let mut remaining: Vec<usize> = (0..n).collect();
        let mut triangles = Vec::with_capacity(n - 2);

        while remaining.len() > 2 {
            let m = remaining.len();
            let ear = (0..m).find(|&i| {
                let a = pts[remaining[(i + m - 1) % m]];
                let b = pts[remaining[i]];
                let c = pts[remaining[(i + 1) % m]];
                let turn = cross(a, b, c);
                let convex = if ccw {
                    turn > f64::EPSILON
                } else {
                    turn < -f64::EPSILON
                };
                convex
                    && !remaining.iter().any(|&k| {
                        let p = pts[k];
                        p != a && p != b && p != c && in_triangle(p, a, b, c)
                    })
            });
            let Some(i) = ear else {
                break;
            };
            triangles.push([
                pts[remaining[(i + m - 1) % m]],
                pts[remaining[i]],
                pts[remaining[(i + 1) % m]],
            ]);
            remaining.remove(i);
        }
        triangles
    }
}

fn cross(a: [f64; 2], b: [f64; 2], c: [f64; 2]) -> f64 {
    (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0])
}

fn in_triangle(p: [f64; 2], a: [f64; 2], b: [f64; 2], c: [f64; 2]) -> bool {
    let d1 = cross(p, a, b);
    let d2 = cross(p, b, c);
    let d3 = cross(p, c, a);
    let has_neg = d1 < -f64::EPSILON || d2 < -f64::EPSILON || d3 < -f64::EPSILON;
    let has_pos = d1 > f64::EPSILON || d2 > f64::EPSILON || d3 > f64::EPSILON;
    !(has_neg && has_pos)
}
