use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::{PhysicsError, Result};

/// Number of segments used to draw a circle collider.
pub const CIRCLE_SEGMENTS: usize = 16;

/// Largest polygon a 16-bit debug index buffer can address.
pub const MAX_POLYGON_VERTICES: usize = u16::MAX as usize + 1;

/// Geometry of a collider in body-local simulation units.
/// Fixed at construction; to change a shape, dispose the collider and add a new one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColliderShape {
    Box { center: Vec2, size: Vec2 },
    Circle { center: Vec2, radius: f32 },
    /// Convex polygon. Vertices are already offset by the placement position.
    Polygon { vertices: Vec<Vec2> },
    Edge { start: Vec2, end: Vec2 },
}

/// Outline of a shape in body-local space.
#[derive(Debug, Clone, PartialEq)]
pub struct Outline {
    pub points: Vec<Vec2>,
    /// Whether the last point connects back to the first.
    pub closed: bool,
}

impl ColliderShape {
    pub fn rect(center: Vec2, size: Vec2) -> Result<Self> {
        check_finite(&[center, size])?;
        if size.x <= 0.0 || size.y <= 0.0 {
            return Err(PhysicsError::InvalidShape(format!(
                "box size must be positive, got {size}"
            )));
        }
        Ok(Self::Box { center, size })
    }

    pub fn circle(center: Vec2, radius: f32) -> Result<Self> {
        check_finite(&[center])?;
        if !radius.is_finite() || radius <= 0.0 {
            return Err(PhysicsError::InvalidShape(format!(
                "circle radius must be positive, got {radius}"
            )));
        }
        Ok(Self::Circle { center, radius })
    }

    /// `points` are relative to `position`.
    pub fn polygon(position: Vec2, points: &[Vec2]) -> Result<Self> {
        check_finite(&[position])?;
        check_finite(points)?;
        if points.len() < 3 {
            return Err(PhysicsError::InvalidShape(format!(
                "polygon needs at least 3 points, got {}",
                points.len()
            )));
        }
        if points.len() > MAX_POLYGON_VERTICES {
            return Err(PhysicsError::InvalidShape(format!(
                "polygon has {} points, at most {} supported",
                points.len(),
                MAX_POLYGON_VERTICES
            )));
        }
        // The backend collides against the hull, so that is what must have area.
        if signed_area(&convex_hull(points)).abs() <= f32::EPSILON {
            return Err(PhysicsError::InvalidShape("polygon has no area".into()));
        }
        Ok(Self::Polygon {
            vertices: points.iter().map(|p| position + *p).collect(),
        })
    }

    pub fn edge(start: Vec2, end: Vec2) -> Result<Self> {
        check_finite(&[start, end])?;
        if start == end {
            return Err(PhysicsError::InvalidShape("edge has zero length".into()));
        }
        Ok(Self::Edge { start, end })
    }

    /// Short variant name, for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Box { .. } => "box",
            Self::Circle { .. } => "circle",
            Self::Polygon { .. } => "polygon",
            Self::Edge { .. } => "edge",
        }
    }

    /// Wireframe outline in body-local coordinates.
    ///
    /// Circles use the engine's sin/cos axis convention: the first point sits
    /// on +Y and the loop runs clockwise in a Y-up frame.
    pub fn outline(&self) -> Outline {
        match self {
            Self::Box { center, size } => {
                let h = *size * 0.5;
                Outline {
                    points: vec![
                        *center - h,
                        Vec2::new(center.x + h.x, center.y - h.y),
                        *center + h,
                        Vec2::new(center.x - h.x, center.y + h.y),
                    ],
                    closed: true,
                }
            }
            Self::Circle { center, radius } => {
                let points = (0..CIRCLE_SEGMENTS)
                    .map(|i| {
                        let angle = i as f32 / CIRCLE_SEGMENTS as f32 * std::f32::consts::TAU;
                        *center + Vec2::new(angle.sin() * radius, angle.cos() * radius)
                    })
                    .collect();
                Outline { points, closed: true }
            }
            Self::Polygon { vertices } => Outline {
                points: vertices.clone(),
                closed: true,
            },
            Self::Edge { start, end } => Outline {
                points: vec![*start, *end],
                closed: false,
            },
        }
    }
}

/// Shoelace area; positive for counter-clockwise winding.
fn signed_area(points: &[Vec2]) -> f32 {
    let n = points.len();
    (0..n)
        .map(|i| points[i].perp_dot(points[(i + 1) % n]))
        .sum::<f32>()
        * 0.5
}

/// Counter-clockwise convex hull (monotone chain). Collinear points are dropped.
fn convex_hull(points: &[Vec2]) -> Vec<Vec2> {
    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    sorted.dedup();
    if sorted.len() < 3 {
        return sorted;
    }

    let reversed: Vec<Vec2> = sorted.iter().rev().copied().collect();
    let mut hull: Vec<Vec2> = Vec::with_capacity(sorted.len() + 1);
    for pass in [&sorted[..], &reversed[..]] {
        let start = hull.len();
        for &p in pass {
            while hull.len() >= start + 2 {
                let a = hull[hull.len() - 2];
                let b = hull[hull.len() - 1];
                if (b - a).perp_dot(p - a) > 0.0 {
                    break;
                }
                hull.pop();
            }
            hull.push(p);
        }
        hull.pop();
    }
    hull
}

fn check_finite(points: &[Vec2]) -> Result<()> {
    match points.iter().find(|p| !p.is_finite()) {
        Some(p) => Err(PhysicsError::InvalidShape(format!("non-finite coordinate {p}"))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_outline_order() {
        let shape = ColliderShape::rect(Vec2::new(1.0, 1.0), Vec2::new(2.0, 4.0)).unwrap();
        let outline = shape.outline();
        assert!(outline.closed);
        assert_eq!(
            outline.points,
            vec![
                Vec2::new(0.0, -1.0),
                Vec2::new(2.0, -1.0),
                Vec2::new(2.0, 3.0),
                Vec2::new(0.0, 3.0),
            ]
        );
    }

    #[test]
    fn circle_outline_uses_sin_for_x() {
        let shape = ColliderShape::circle(Vec2::ZERO, 2.0).unwrap();
        let outline = shape.outline();
        assert_eq!(outline.points.len(), CIRCLE_SEGMENTS);
        // angle 0 → (sin 0, cos 0) * r = (0, r)
        assert!((outline.points[0] - Vec2::new(0.0, 2.0)).length() < 1e-5);
        // quarter turn → (r, 0)
        assert!((outline.points[4] - Vec2::new(2.0, 0.0)).length() < 1e-5);
        for p in &outline.points {
            assert!((p.length() - 2.0).abs() < 1e-5);
        }
    }

    #[test]
    fn polygon_is_offset_by_position() {
        let shape = ColliderShape::polygon(
            Vec2::new(10.0, 0.0),
            &[Vec2::ZERO, Vec2::X, Vec2::Y],
        )
        .unwrap();
        let outline = shape.outline();
        assert_eq!(
            outline.points,
            vec![Vec2::new(10.0, 0.0), Vec2::new(11.0, 0.0), Vec2::new(10.0, 1.0)]
        );
    }

    #[test]
    fn edge_is_open() {
        let outline = ColliderShape::edge(Vec2::ZERO, Vec2::X).unwrap().outline();
        assert!(!outline.closed);
        assert_eq!(outline.points.len(), 2);
    }

    #[test]
    fn rejects_malformed_shapes() {
        assert!(ColliderShape::circle(Vec2::ZERO, 0.0).is_err());
        assert!(ColliderShape::circle(Vec2::ZERO, f32::NAN).is_err());
        assert!(ColliderShape::rect(Vec2::ZERO, Vec2::new(1.0, -1.0)).is_err());
        assert!(ColliderShape::polygon(Vec2::ZERO, &[Vec2::ZERO, Vec2::X]).is_err());
        assert!(ColliderShape::polygon(Vec2::ZERO, &[Vec2::ZERO, Vec2::X, Vec2::new(2.0, 0.0)]).is_err());
        assert!(ColliderShape::edge(Vec2::ONE, Vec2::ONE).is_err());
        assert!(ColliderShape::edge(Vec2::ZERO, Vec2::new(f32::INFINITY, 0.0)).is_err());
    }

    #[test]
    fn self_crossing_polygon_is_judged_by_hull() {
        // Bow-tie: signed area of the input order cancels out, the hull is a unit square.
        let bow_tie = [Vec2::ZERO, Vec2::ONE, Vec2::X, Vec2::Y];
        assert!(ColliderShape::polygon(Vec2::ZERO, &bow_tie).is_ok());
        assert!((signed_area(&convex_hull(&bow_tie)) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn convex_hull_drops_interior_and_collinear_points() {
        let points = [
            Vec2::ZERO,
            Vec2::new(1.0, 0.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(2.0, 2.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 2.0),
        ];
        let hull = convex_hull(&points);
        assert_eq!(hull.len(), 4);
        assert!(signed_area(&hull) > 0.0);
        assert!(convex_hull(&[Vec2::ZERO, Vec2::X, Vec2::new(2.0, 0.0)]).len() <= 2);
    }

    #[test]
    fn rejects_polygon_beyond_index_range() {
        let points: Vec<Vec2> = (0..=MAX_POLYGON_VERTICES)
            .map(|i| {
                let angle = i as f32 / (MAX_POLYGON_VERTICES + 1) as f32 * std::f32::consts::TAU;
                Vec2::new(angle.cos(), angle.sin()) * 100.0
            })
            .collect();
        assert!(matches!(
            ColliderShape::polygon(Vec2::ZERO, &points),
            Err(PhysicsError::InvalidShape(_))
        ));
    }

    #[test]
    fn shape_names() {
        assert_eq!(ColliderShape::circle(Vec2::ZERO, 1.0).unwrap().name(), "circle");
        assert_eq!(ColliderShape::edge(Vec2::ZERO, Vec2::Y).unwrap().name(), "edge");
    }
}
