//! Region validation: polygon validity and UV bounds

use geo::line_intersection::{line_intersection, LineIntersection};
use geo::{Line, Polygon};

use super::{uv_polygon, BodyPartRegion, UvShape};
use crate::core::types::UvRect;

/// Validation error types
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    InsufficientVertices { count: usize, minimum: usize },
    SelfIntersecting { description: String },
    OutOfBounds { coordinate: [f32; 2] },
    DegenerateRect { rect: UvRect },
    NonFinite,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::InsufficientVertices { count, minimum } => {
                write!(f, "polygon has {} vertices, needs at least {}", count, minimum)
            }
            ValidationError::SelfIntersecting { description } => write!(f, "{}", description),
            ValidationError::OutOfBounds { coordinate } => {
                write!(f, "vertex {:?} lies outside UV space", coordinate)
            }
            ValidationError::DegenerateRect { rect } => {
                write!(f, "rect {:?} has no area", rect)
            }
            ValidationError::NonFinite => write!(f, "shape contains non-finite coordinates"),
        }
    }
}

pub struct RegionValidator;

impl RegionValidator {
    /// Validate every shape of a region
    pub fn validate_region(region: &BodyPartRegion) -> Vec<ValidationError> {
        region
            .shapes
            .iter()
            .flat_map(|shape| match shape {
                UvShape::Rect(rect) => Self::validate_rect(rect),
                UvShape::Polygon { vertices } => {
                    let mut errors = Self::validate_polygon(vertices);
                    errors.extend(Self::validate_bounds(vertices));
                    errors
                }
            })
            .collect()
    }

    pub fn validate_rect(rect: &UvRect) -> Vec<ValidationError> {
        let values = [rect.x, rect.y, rect.width, rect.height];
        if values.iter().any(|v| !v.is_finite()) {
            return vec![ValidationError::NonFinite];
        }

        let mut errors = Vec::new();
        if rect.width <= 0.0 || rect.height <= 0.0 {
            errors.push(ValidationError::DegenerateRect { rect: *rect });
        }
        errors.extend(Self::validate_bounds(&rect.corners()));
        errors
    }

    /// Validate a polygon represented as a list of [u, v] vertices
    pub fn validate_polygon(vertices: &[[f32; 2]]) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if vertices.len() < 3 {
            errors.push(ValidationError::InsufficientVertices {
                count: vertices.len(),
                minimum: 3,
            });
            return errors;
        }

        if vertices.iter().flatten().any(|v| !v.is_finite()) {
            errors.push(ValidationError::NonFinite);
            return errors;
        }

        if let Some((first, second)) = Self::first_crossing(&uv_polygon(vertices)) {
            errors.push(ValidationError::SelfIntersecting {
                description: format!("edges {} and {} cross each other", first, second),
            });
        }

        errors
    }

    /// Validate that all vertices lie within the unit UV square
    pub fn validate_bounds(vertices: &[[f32; 2]]) -> Vec<ValidationError> {
        vertices
            .iter()
            .filter(|[u, v]| !(0.0..=1.0).contains(u) || !(0.0..=1.0).contains(v))
            .map(|vertex| ValidationError::OutOfBounds { coordinate: *vertex })
            .collect()
    }

    /// Indices of the first pair of non-adjacent ring edges that cross or overlap
    ///
    /// Edges meeting only at an endpoint do not count.
    fn first_crossing(polygon: &Polygon<f64>) -> Option<(usize, usize)> {
        let edges: Vec<Line<f64>> = polygon.exterior().lines().collect();
        let count = edges.len();

        for (i, a) in edges.iter().enumerate() {
            // The first and last edges share the closing vertex
            let last = if i == 0 { count.saturating_sub(1) } else { count };
            for (j, b) in edges.iter().enumerate().take(last).skip(i + 2) {
                match line_intersection(*a, *b) {
                    Some(LineIntersection::SinglePoint { is_proper: true, .. })
                    | Some(LineIntersection::Collinear { .. }) => return Some((i, j)),
                    _ => {}
                }
            }
        }
        None
    }
}
