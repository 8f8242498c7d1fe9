//! Solid angle of a sensor bucket seen from a point.
//!
//! The bucket opening is a disc of the bucket radius centred on the sensor
//! position, facing along the sensor normal. Order 0 approximates the disc
//! by its projected ellipse. Higher orders inscribe a regular polygon in the
//! disc rim and sum the solid angles of the triangles it splits into.

use std::f64::consts::PI;

use crate::{Point, Vector};

use super::error::PathError;
use super::result::SolidAngle;

/// Smallest polygon order accepted by the polygon method.
pub const MIN_POLYGON_ORDER: usize = 5;

/// Solid angle of the triangle (a, b, c) seen from `viewpoint`.
///
/// Van Oosterom and Strackee:
/// tan(omega / 2) = |a . (b x c)| / (|a||b||c| + (a.b)|c| + (a.c)|b| + (b.c)|a|)
pub fn triangle_solid_angle(viewpoint: Point, a: Point, b: Point, c: Point) -> f64 {
    let ra = a - viewpoint;
    let rb = b - viewpoint;
    let rc = c - viewpoint;
    let (la, lb, lc) = (ra.length(), rb.length(), rc.length());
    let numerator = ra.dot(rb.cross(rc)).abs();
    let denominator = la * lb * lc + ra.dot(rb) * lc + ra.dot(rc) * lb + rb.dot(rc) * la;
    2.0 * numerator.atan2(denominator)
}

/// Solid angle of the bucket at `centre` seen from `viewpoint`.
pub fn bucket_solid_angle(
    viewpoint: Point,
    centre: Point,
    sensor_normal: Vector,
    radius: f64,
    polygon_order: usize,
) -> Result<SolidAngle, PathError> {
    if (1..MIN_POLYGON_ORDER).contains(&polygon_order) {
        return Err(PathError::InvalidParameter(format!(
            "polygon order must be 0 or at least {MIN_POLYGON_ORDER}, got {polygon_order}"
        )));
    }
    let normal = sensor_normal.normalize().ok_or_else(|| {
        PathError::DegenerateGeometry("sensor normal has zero length".to_string())
    })?;
    // Cosine of incidence of light arriving from the viewpoint
    let incidence = |point: Point| -> f64 {
        (point - viewpoint)
            .normalize()
            .map_or(0.0, |d| (-d.dot(normal)).clamp(0.0, 1.0))
    };

    if polygon_order == 0 {
        let distance = viewpoint.distance(&centre);
        if distance < f64::EPSILON {
            return Err(PathError::DegenerateGeometry(
                "viewpoint lies on the sensor".to_string(),
            ));
        }
        let cos_theta = incidence(centre);
        let value = 2.0
            * PI
            * (1.0 - distance / (distance * distance + radius * radius * cos_theta).sqrt());
        return Ok(SolidAngle {
            value,
            cos_theta_avg: cos_theta,
            polygon_order,
        });
    }

    // Axes spanning the bucket face
    let u = normal.any_perpendicular().ok_or_else(|| {
        PathError::DegenerateGeometry("sensor normal has zero length".to_string())
    })?;
    let w = normal.cross(u);
    let vertices: Vec<Point> = (0..polygon_order)
        .map(|i| {
            let phi = 2.0 * PI * i as f64 / polygon_order as f64;
            centre + (u * phi.cos() + w * phi.sin()) * radius
        })
        .collect();

    let value = (0..polygon_order)
        .map(|i| {
            let next = (i + 1) % polygon_order;
            triangle_solid_angle(viewpoint, centre, vertices[i], vertices[next])
        })
        .sum();
    let cos_theta_avg =
        vertices.iter().map(|&v| incidence(v)).sum::<f64>() / polygon_order as f64;

    Ok(SolidAngle {
        value,
        cos_theta_avg,
        polygon_order,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_octant() {
        // One eighth of the sphere
        let omega = triangle_solid_angle(
            Point::origin(),
            Point::new(1.0, 0.0, 0.0),
            Point::new(0.0, 2.0, 0.0),
            Point::new(0.0, 0.0, 3.0),
        );
        assert_relative_eq!(omega, PI / 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_ellipse_on_axis_is_exact_disc() {
        let (d, a) = (2350.0, 137.0);
        let omega = bucket_solid_angle(
            Point::new(6050.0, 0.0, 0.0),
            Point::new(6050.0 + d, 0.0, 0.0),
            Vector::new(-1.0, 0.0, 0.0),
            a,
            0,
        )
        .unwrap();
        let exact = 2.0 * PI * (1.0 - d / (d * d + a * a).sqrt());
        assert_relative_eq!(omega.value, exact, max_relative = 1e-12);
        assert_eq!(omega.cos_theta_avg, 1.0);
    }

    #[test]
    fn test_polygon_converges_to_disc() {
        let viewpoint = Point::origin();
        let centre = Point::new(500.0, 0.0, 0.0);
        let normal = Vector::new(-1.0, 0.0, 0.0);
        let ellipse = bucket_solid_angle(viewpoint, centre, normal, 137.0, 0).unwrap();
        let coarse = bucket_solid_angle(viewpoint, centre, normal, 137.0, 12).unwrap();
        let fine = bucket_solid_angle(viewpoint, centre, normal, 137.0, 64).unwrap();
        let error = |omega: f64| (omega - ellipse.value).abs() / ellipse.value;
        assert!(error(coarse.value) < 0.05);
        assert!(error(fine.value) < 0.005);
        assert!(error(fine.value) < error(coarse.value));
        // The inscribed polygon is smaller than the disc
        assert!(coarse.value < ellipse.value);
        assert!(fine.cos_theta_avg > 0.95 && fine.cos_theta_avg <= 1.0);
    }

    #[test]
    fn test_tilted_sensor_sees_less() {
        let viewpoint = Point::origin();
        let centre = Point::new(1000.0, 0.0, 0.0);
        let facing = bucket_solid_angle(viewpoint, centre, Vector::new(-1.0, 0.0, 0.0), 100.0, 24)
            .unwrap();
        let tilted = bucket_solid_angle(viewpoint, centre, Vector::new(-1.0, 1.0, 0.0), 100.0, 24)
            .unwrap();
        assert!(tilted.value < facing.value);
        assert!(tilted.cos_theta_avg < facing.cos_theta_avg);
    }

    #[test]
    fn test_invalid_orders() {
        for order in 1..=4 {
            let result = bucket_solid_angle(
                Point::origin(),
                Point::new(100.0, 0.0, 0.0),
                Vector::new(-1.0, 0.0, 0.0),
                10.0,
                order,
            );
            assert!(matches!(result, Err(PathError::InvalidParameter(_))));
        }
        let result = bucket_solid_angle(
            Point::origin(),
            Point::new(100.0, 0.0, 0.0),
            Vector::new(0.0, 0.0, 0.0),
            10.0,
            0,
        );
        assert!(matches!(result, Err(PathError::DegenerateGeometry(_))));
    }
}
