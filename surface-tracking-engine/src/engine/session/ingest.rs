use bevy::prelude::*;
use serde::Deserialize;

use crate::engine::error::SurfaceTrackingError;
use crate::engine::surfaces::record::{SurfaceId, SurfaceObservation, SurfaceOrientation};

/// A boundary point as the host sends it: `[x, y, z]` or `{ "x", "y", "z" }`.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(untagged)]
pub enum RawPoint {
    Array([f32; 3]),
    Object { x: f32, y: f32, z: f32 },
}

impl RawPoint {
    pub fn to_vec3(self) -> Vec3 {
        match self {
            RawPoint::Array([x, y, z]) | RawPoint::Object { x, y, z } => Vec3::new(x, y, z),
        }
    }
}

/// Surface pose. A column-major `matrix` wins over `position`/`rotation`.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct RawPose {
    pub matrix: Option<[f32; 16]>,
    pub position: Option<[f32; 3]>,
    /// Quaternion as `[x, y, z, w]`.
    pub rotation: Option<[f32; 4]>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct RawSurfacePayload {
    pub id: u64,
    #[serde(default)]
    pub polygon: Vec<RawPoint>,
    pub orientation: Option<String>,
    pub pose: Option<RawPose>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct RawHitTestPayload {
    #[serde(default)]
    pub results: Vec<RawPose>,
}

/// Hit-test pose on a detected surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitTestResult {
    pub position: Vec3,
    pub rotation: Quat,
}

impl HitTestResult {
    pub fn transform(&self) -> Transform {
        Transform::from_translation(self.position).with_rotation(self.rotation)
    }
}

/// Resolve a pose to a transform. Missing or unusable parts fall back to identity.
pub fn normalize_pose(pose: Option<&RawPose>) -> Transform {
    let Some(pose) = pose else {
        return Transform::IDENTITY;
    };

    if let Some(matrix) = pose.matrix {
        if matrix.iter().all(|value| value.is_finite()) {
            let (scale, rotation, translation) =
                Mat4::from_cols_array(&matrix).to_scale_rotation_translation();
            if scale.is_finite() && rotation.is_finite() && translation.is_finite() {
                return Transform {
                    translation,
                    rotation: rotation.normalize(),
                    scale,
                };
            }
        }
    }

    Transform {
        translation: pose
            .position
            .map(Vec3::from_array)
            .filter(|position| position.is_finite())
            .unwrap_or(Vec3::ZERO),
        rotation: normalize_rotation(pose.rotation),
        scale: Vec3::ONE,
    }
}

fn normalize_rotation(rotation: Option<[f32; 4]>) -> Quat {
    rotation
        .map(Quat::from_array)
        .filter(|quat| quat.is_finite() && quat.length_squared() > f32::EPSILON)
        .map(Quat::normalize)
        .unwrap_or(Quat::IDENTITY)
}

pub fn normalize_orientation(label: Option<&str>) -> SurfaceOrientation {
    label
        .map(SurfaceOrientation::from_label)
        .unwrap_or(SurfaceOrientation::Unknown)
}

pub fn normalize_surface(payload: RawSurfacePayload) -> Result<SurfaceObservation, SurfaceTrackingError> {
    let boundary: Vec<Vec3> = payload.polygon.into_iter().map(RawPoint::to_vec3).collect();
    if boundary.iter().any(|point| !point.is_finite()) {
        return Err(SurfaceTrackingError::Payload(format!(
            "surface {} has non-finite boundary points",
            payload.id
        )));
    }

    Ok(SurfaceObservation {
        id: SurfaceId(payload.id),
        boundary,
        orientation: normalize_orientation(payload.orientation.as_deref()),
        transform: normalize_pose(payload.pose.as_ref()),
    })
}

pub fn normalize_hit_tests(payload: RawHitTestPayload) -> Vec<HitTestResult> {
    payload
        .results
        .iter()
        .map(|pose| {
            let transform = normalize_pose(Some(pose));
            HitTestResult {
                position: transform.translation,
                rotation: transform.rotation,
            }
        })
        .collect()
}

/// Parse a surface payload straight from message params.
pub fn parse_surface(params: &serde_json::Value) -> Result<SurfaceObservation, SurfaceTrackingError> {
    let payload = serde_json::from_value::<RawSurfacePayload>(params.clone())
        .map_err(|err| SurfaceTrackingError::Payload(err.to_string()))?;
    normalize_surface(payload)
}

pub fn parse_hit_tests(params: &serde_json::Value) -> Result<Vec<HitTestResult>, SurfaceTrackingError> {
    let payload = serde_json::from_value::<RawHitTestPayload>(params.clone())
        .map_err(|err| SurfaceTrackingError::Payload(err.to_string()))?;
    Ok(normalize_hit_tests(payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn mixed_point_forms() {
        let observation = parse_surface(&json!({
            "id": 4,
            "polygon": [[0.0, 0.0, 0.0], {"x": 1.0, "y": 0.0, "z": 0.0}, [1.0, 0.0, 1.0]],
            "orientation": "Vertical"
        }))
        .expect("valid");

        assert_eq!(observation.id, SurfaceId(4));
        assert_eq!(observation.boundary[1], Vec3::X);
        assert_eq!(observation.orientation, SurfaceOrientation::Vertical);
        assert_eq!(observation.transform, Transform::IDENTITY);
    }

    #[test]
    fn unknown_or_missing_orientation() {
        assert_eq!(normalize_orientation(None), SurfaceOrientation::Unknown);
        assert_eq!(normalize_orientation(Some("diagonal")), SurfaceOrientation::Unknown);
    }

    #[test]
    fn matrix_pose_is_decomposed() {
        let rotation = Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);
        let matrix = Mat4::from_scale_rotation_translation(
            Vec3::splat(2.0),
            rotation,
            Vec3::new(1.0, 2.0, 3.0),
        );
        let pose = RawPose {
            matrix: Some(matrix.to_cols_array()),
            position: Some([9.0, 9.0, 9.0]),
            rotation: None,
        };

        let transform = normalize_pose(Some(&pose));
        assert!(transform.translation.abs_diff_eq(Vec3::new(1.0, 2.0, 3.0), 1e-5));
        assert!(transform.scale.abs_diff_eq(Vec3::splat(2.0), 1e-5));
        assert!(transform.rotation.angle_between(rotation) < 1e-4);
    }

    #[test]
    fn non_finite_matrix_falls_back_to_parts() {
        let mut matrix = Mat4::IDENTITY.to_cols_array();
        matrix[0] = f32::NAN;
        let pose = RawPose {
            matrix: Some(matrix),
            position: Some([1.0, 0.0, 0.0]),
            rotation: Some([0.0, 0.0, 0.0, 0.0]),
        };

        let transform = normalize_pose(Some(&pose));
        assert_eq!(transform.translation, Vec3::X);
        assert_eq!(transform.rotation, Quat::IDENTITY);
    }

    #[test]
    fn hit_test_rotation_defaults_to_identity() {
        let results = parse_hit_tests(&json!({
            "results": [{"position": [0.5, 0.0, -1.0]}]
        }))
        .expect("valid");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].position, Vec3::new(0.5, 0.0, -1.0));
        assert_eq!(results[0].rotation, Quat::IDENTITY);
    }

    #[test]
    fn empty_hit_test_delivery() {
        assert!(parse_hit_tests(&json!({})).expect("valid").is_empty());
    }

    #[test]
    fn missing_id_is_a_payload_error() {
        let result = parse_surface(&json!({"polygon": []}));
        assert!(matches!(result, Err(SurfaceTrackingError::Payload(_))));
    }
}
