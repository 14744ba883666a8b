//! Particle record schema for bowerick generator messages

use serde::Deserialize;

/// Multiplier turning a record's `scale_y` into a display size (a marker
/// area, matching the upstream generator's plotting convention).
pub const SIZE_SCALE: f64 = 500.0;

/// One particle as it appears in a message payload.
///
/// `x`/`y`/`z` are required; `scale_y` and the color triple are optional.
/// Color components only count as present when all three exist. Unknown
/// keys are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ParticleRecord {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub scale_y: Option<f64>,
    pub color_r: Option<f64>,
    pub color_g: Option<f64>,
    pub color_b: Option<f64>,
}

impl ParticleRecord {
    /// Display size derived from `scale_y`, if the record carries one.
    pub fn display_size(&self) -> Option<f64> {
        self.scale_y.map(|s| s * SIZE_SCALE)
    }

    /// Display color in (r, g, b) order, if all three components exist.
    pub fn color(&self) -> Option<[f64; 3]> {
        match (self.color_r, self.color_g, self.color_b) {
            (Some(r), Some(g), Some(b)) => Some([r, g, b]),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_fields_only() {
        let record: ParticleRecord = serde_json::from_str(r#"{"x":1.0,"y":2.0,"z":3.0}"#).unwrap();
        assert_eq!(record.x, 1.0);
        assert_eq!(record.y, 2.0);
        assert_eq!(record.z, 3.0);
        assert_eq!(record.display_size(), None);
        assert_eq!(record.color(), None);
    }

    #[test]
    fn test_display_size_uses_fixed_multiplier() {
        let record: ParticleRecord =
            serde_json::from_str(r#"{"x":0,"y":0,"z":0,"scale_y":2.0}"#).unwrap();
        assert_eq!(record.display_size(), Some(1000.0));
    }

    #[test]
    fn test_color_requires_all_three_components() {
        let record: ParticleRecord =
            serde_json::from_str(r#"{"x":0,"y":0,"z":0,"color_r":1.0,"color_g":0.5}"#).unwrap();
        assert_eq!(record.color(), None);

        let record: ParticleRecord = serde_json::from_str(
            r#"{"x":0,"y":0,"z":0,"color_r":1.0,"color_g":0.5,"color_b":0.25}"#,
        )
        .unwrap();
        assert_eq!(record.color(), Some([1.0, 0.5, 0.25]));
    }

    #[test]
    fn test_missing_required_field_fails() {
        let result: Result<ParticleRecord, _> = serde_json::from_str(r#"{"x":1.0,"z":3.0}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let record: ParticleRecord =
            serde_json::from_str(r#"{"x":1,"y":2,"z":3,"velocity":9.9}"#).unwrap();
        assert_eq!(record.x, 1.0);
    }
}
