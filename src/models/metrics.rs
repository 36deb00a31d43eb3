use serde::{Deserialize, Serialize};

/// Posture analysis for one frame, as returned by the metrics service.
/// Field names follow the service's wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostureMetrics {
    /// 1 = good posture; the scorer emits 0 for slouching.
    pub posture: i64,
    pub eye_strain: f64,
    pub neck_strain: f64,
    pub face_pitch: f64,
}

impl PostureMetrics {
    /// Anything other than an explicit 1 counts as bad posture.
    pub fn is_slouching(&self) -> bool {
        self.posture != 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_service_payload() {
        let metrics: PostureMetrics = serde_json::from_str(
            r#"{"posture": 0, "eye_strain": 6.2, "neck_strain": 0.81, "face_pitch": -12.5}"#,
        )
        .unwrap();

        assert!(metrics.is_slouching());
        assert_eq!(metrics.eye_strain, 6.2);
        assert_eq!(metrics.face_pitch, -12.5);
    }

    #[test]
    fn only_one_means_good_posture() {
        let good = PostureMetrics {
            posture: 1,
            eye_strain: 0.0,
            neck_strain: 0.0,
            face_pitch: 0.0,
        };
        let bad = PostureMetrics { posture: 0, ..good.clone() };

        assert!(!good.is_slouching());
        assert!(bad.is_slouching());
    }
}
