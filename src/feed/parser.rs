//! Batch decoding for particle messages
//!
//! Each message body is a JSON array of particle records. Decoding is
//! schema-validating: malformed JSON or a missing required field fails the
//! whole batch, as does a record missing an optional field that the first
//! record promised for the batch. A failed batch produces no frame; the
//! caller logs and moves on to the next message.

use std::fmt;

use super::frame::ScatterFrame;
use super::particle::ParticleRecord;

/// Failure to turn a message body into a [`ScatterFrame`].
#[derive(Debug)]
pub enum DecodeError {
    /// Body was not a valid JSON array of records.
    Json(serde_json::Error),
    /// Record `index` lacks `field` although the batch's first record had it.
    RaggedBatch { index: usize, field: &'static str },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::Json(e) => write!(f, "invalid particle batch: {}", e),
            DecodeError::RaggedBatch { index, field } => {
                write!(f, "record {} is missing '{}' promised by the first record", index, field)
            }
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DecodeError::Json(e) => Some(e),
            DecodeError::RaggedBatch { .. } => None,
        }
    }
}

impl From<serde_json::Error> for DecodeError {
    fn from(e: serde_json::Error) -> Self {
        DecodeError::Json(e)
    }
}

/// Decode one message body into a compact frame.
pub fn parse_batch(body: &[u8]) -> Result<ScatterFrame, DecodeError> {
    let records: Vec<ParticleRecord> = serde_json::from_slice(body)?;
    frame_from_records(&records)
}

/// Assemble the columnar frame from decoded records.
///
/// The first record decides which optional arrays the frame carries; every
/// later record must then supply the same fields.
pub fn frame_from_records(records: &[ParticleRecord]) -> Result<ScatterFrame, DecodeError> {
    let n = records.len();
    let mut xs = Vec::with_capacity(n);
    let mut ys = Vec::with_capacity(n);
    let mut zs = Vec::with_capacity(n);
    for record in records {
        xs.push(record.x);
        ys.push(record.y);
        zs.push(record.z);
    }

    let first = records.first();

    let sizes = if first.is_some_and(|r| r.scale_y.is_some()) {
        let mut sizes = Vec::with_capacity(n);
        for (index, record) in records.iter().enumerate() {
            match record.display_size() {
                Some(size) => sizes.push(size),
                None => return Err(DecodeError::RaggedBatch { index, field: "scale_y" }),
            }
        }
        Some(sizes)
    } else {
        None
    };

    let colors = if first.is_some_and(|r| r.color().is_some()) {
        let mut colors = Vec::with_capacity(n);
        for (index, record) in records.iter().enumerate() {
            match record.color() {
                Some(color) => colors.push(color),
                None => return Err(DecodeError::RaggedBatch { index, field: "color" }),
            }
        }
        Some(colors)
    } else {
        None
    };

    Ok(ScatterFrame { coords: [xs, ys, zs], sizes, colors })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_fields_only_yields_bare_frame() {
        let frame = parse_batch(br#"[{"x":1,"y":2,"z":3}]"#).unwrap();
        assert_eq!(frame.coords, [vec![1.0], vec![2.0], vec![3.0]]);
        assert!(frame.sizes.is_none());
        assert!(frame.colors.is_none());
    }

    #[test]
    fn test_full_record_yields_sizes_and_colors() {
        let frame = parse_batch(
            br#"[{"x":0,"y":0,"z":0,"scale_y":2,"color_r":1,"color_g":0,"color_b":0}]"#,
        )
        .unwrap();
        assert_eq!(frame.sizes, Some(vec![1000.0]));
        assert_eq!(frame.colors, Some(vec![[1.0, 0.0, 0.0]]));
    }

    #[test]
    fn test_coordinate_block_is_columnar() {
        let frame = parse_batch(
            br#"[
                {"x": 0.1, "y": 0.2, "z": 0.3},
                {"x": -0.1, "y": -0.2, "z": -0.3},
                {"x": 1.0, "y": 1.1, "z": 1.2}
            ]"#,
        )
        .unwrap();
        assert_eq!(frame.len(), 3);
        assert_eq!(frame.coords[0], vec![0.1, -0.1, 1.0]);
        assert_eq!(frame.coords[1], vec![0.2, -0.2, 1.1]);
        assert_eq!(frame.coords[2], vec![0.3, -0.3, 1.2]);
    }

    #[test]
    fn test_sizes_scaled_elementwise() {
        let frame = parse_batch(
            br#"[
                {"x": 0, "y": 0, "z": 0, "scale_y": 1.0},
                {"x": 0, "y": 0, "z": 0, "scale_y": 0.5},
                {"x": 0, "y": 0, "z": 0, "scale_y": 0.25}
            ]"#,
        )
        .unwrap();
        assert_eq!(frame.sizes, Some(vec![500.0, 250.0, 125.0]));
        assert!(frame.colors.is_none());
    }

    #[test]
    fn test_colors_in_rgb_order() {
        let frame = parse_batch(
            br#"[
                {"x": 0, "y": 0, "z": 0, "color_r": 0.1, "color_g": 0.2, "color_b": 0.3},
                {"x": 0, "y": 0, "z": 0, "color_r": 0.4, "color_g": 0.5, "color_b": 0.6}
            ]"#,
        )
        .unwrap();
        assert_eq!(frame.colors, Some(vec![[0.1, 0.2, 0.3], [0.4, 0.5, 0.6]]));
        assert!(frame.sizes.is_none());
    }

    #[test]
    fn test_first_record_decides_presence() {
        // Later records may carry extras the first one lacks; they are ignored.
        let frame = parse_batch(
            br#"[
                {"x": 0, "y": 0, "z": 0},
                {"x": 1, "y": 1, "z": 1, "scale_y": 2.0}
            ]"#,
        )
        .unwrap();
        assert!(frame.sizes.is_none());
    }

    #[test]
    fn test_ragged_scale_fails_batch() {
        let err = parse_batch(
            br#"[
                {"x": 0, "y": 0, "z": 0, "scale_y": 2.0},
                {"x": 1, "y": 1, "z": 1}
            ]"#,
        )
        .unwrap_err();
        match err {
            DecodeError::RaggedBatch { index, field } => {
                assert_eq!(index, 1);
                assert_eq!(field, "scale_y");
            }
            other => panic!("expected RaggedBatch, got {:?}", other),
        }
    }

    #[test]
    fn test_partial_color_triple_on_first_record_disables_colors() {
        let frame = parse_batch(
            br#"[{"x": 0, "y": 0, "z": 0, "color_r": 1.0, "color_g": 0.0}]"#,
        )
        .unwrap();
        assert!(frame.colors.is_none());
    }

    #[test]
    fn test_malformed_json_fails() {
        assert!(matches!(parse_batch(b"not json"), Err(DecodeError::Json(_))));
        // A bare object is not a batch either.
        assert!(matches!(parse_batch(br#"{"x":1,"y":2,"z":3}"#), Err(DecodeError::Json(_))));
    }

    #[test]
    fn test_missing_required_field_fails() {
        assert!(matches!(parse_batch(br#"[{"x":1,"z":3}]"#), Err(DecodeError::Json(_))));
    }

    #[test]
    fn test_empty_batch_yields_empty_frame() {
        let frame = parse_batch(b"[]").unwrap();
        assert!(frame.is_empty());
        assert!(frame.sizes.is_none());
        assert!(frame.colors.is_none());
    }
}
