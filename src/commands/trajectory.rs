use serde_json::{Map, Value};
use std::path::Path;

use crate::error::{HandtraceError, Result};

/// One captured instant, as saved through the store.
pub type SampleRecord = Map<String, Value>;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn as_tuple(&self) -> (f64, f64, f64) {
        (self.x, self.y, self.z)
    }
}

/// The path one field traces across every record, in record order.
#[derive(Clone, Debug, PartialEq)]
pub struct Trajectory {
    pub field: String,
    pub points: Vec<Point3>,
}

impl Trajectory {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Per-axis (min, max) over all points, or `None` when empty.
    pub fn bounds(&self) -> Option<[(f64, f64); 3]> {
        let first = self.points.first()?;
        let mut b = [(first.x, first.x), (first.y, first.y), (first.z, first.z)];
        for p in &self.points[1..] {
            for (axis, v) in [p.x, p.y, p.z].into_iter().enumerate() {
                b[axis].0 = b[axis].0.min(v);
                b[axis].1 = b[axis].1.max(v);
            }
        }
        Some(b)
    }
}

/// Read a whole capture file: a JSON array of objects.
pub fn load_records(path: &Path) -> Result<Vec<SampleRecord>> {
    let content = std::fs::read_to_string(path)?;
    parse_records(&content)
}

pub fn parse_records(content: &str) -> Result<Vec<SampleRecord>> {
    let value: Value = serde_json::from_str(content)?;
    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(HandtraceError::Format(format!(
                "expected a JSON array of records, found {}",
                type_name(&other)
            )))
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(record) => Ok(record),
            other => Err(HandtraceError::Format(format!(
                "record {index} is {}, expected an object",
                type_name(&other)
            ))),
        })
        .collect()
}

/// Pull `field` out of every record. Any bad record fails the whole extraction.
pub fn extract(records: &[SampleRecord], field: &str) -> Result<Trajectory> {
    let points = records
        .iter()
        .enumerate()
        .map(|(index, record)| point_at(record, index, field))
        .collect::<Result<Vec<_>>>()?;

    Ok(Trajectory {
        field: field.to_string(),
        points,
    })
}

pub fn extract_pair(
    records: &[SampleRecord],
    fields: [&str; 2],
) -> Result<(Trajectory, Trajectory)> {
    Ok((extract(records, fields[0])?, extract(records, fields[1])?))
}

fn point_at(record: &SampleRecord, index: usize, field: &str) -> Result<Point3> {
    let bad = |reason: String| HandtraceError::Record {
        index,
        field: field.to_string(),
        reason,
    };

    let components = match record.get(field) {
        None => return Err(bad("is missing".into())),
        Some(Value::Array(c)) => c,
        Some(other) => return Err(bad(format!("is {}, expected an array", type_name(other)))),
    };
    if components.len() < 3 {
        return Err(bad(format!("has {} components, expected 3", components.len())));
    }

    // Anything past z is ignored.
    let mut xyz = [0.0; 3];
    for (axis, slot) in xyz.iter_mut().enumerate() {
        *slot = components[axis]
            .as_f64()
            .ok_or_else(|| bad(format!("component {axis} is not a number")))?;
    }

    Ok(Point3::new(xyz[0], xyz[1], xyz[2]))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_RECORDS: &str = r#"[{"a":[0,0,0],"b":[1,1,1]},{"a":[1,0,0],"b":[2,2,2]}]"#;

    #[test]
    fn test_two_record_extraction() {
        let records = parse_records(TWO_RECORDS).unwrap();
        let (a, b) = extract_pair(&records, ["a", "b"]).unwrap();

        let a: Vec<_> = a.points.iter().map(Point3::as_tuple).collect();
        let b: Vec<_> = b.points.iter().map(Point3::as_tuple).collect();
        assert_eq!(a, vec![(0.0, 0.0, 0.0), (1.0, 0.0, 0.0)]);
        assert_eq!(b, vec![(1.0, 1.0, 1.0), (2.0, 2.0, 2.0)]);
    }

    #[test]
    fn test_extraction_is_repeatable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("capture.json");
        std::fs::write(&path, TWO_RECORDS).unwrap();

        let first = extract_pair(&load_records(&path).unwrap(), ["a", "b"]).unwrap();
        let second = extract_pair(&load_records(&path).unwrap(), ["a", "b"]).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_capture_with_extra_fields() {
        let content = r#"[
            {"palmNormal":[0.1,-0.9,0.2],
             "stabilizedPalmPosition":[12.5,180.0,-3.25],"timestamp":1001},
            {"palmNormal":[0.2,-0.8,0.1],
             "stabilizedPalmPosition":[13.0,181.5,-3.0],"pointer":[0,0,1],"timestamp":1017}
        ]"#;
        let records = parse_records(content).unwrap();
        let (normal, position) =
            extract_pair(&records, ["palmNormal", "stabilizedPalmPosition"]).unwrap();
        assert_eq!(normal.points[1], Point3::new(0.2, -0.8, 0.1));
        assert_eq!(position.points[0], Point3::new(12.5, 180.0, -3.25));
    }

    #[test]
    fn test_extra_components_ignored() {
        let records = parse_records(r#"[{"q":[1,2,3,4]}]"#).unwrap();
        assert_eq!(extract(&records, "q").unwrap().points, vec![Point3::new(1.0, 2.0, 3.0)]);
    }

    #[test]
    fn test_missing_field_names_record() {
        let records = parse_records(r#"[{"a":[0,0,0]},{"b":[1,1,1]}]"#).unwrap();
        match extract(&records, "a") {
            Err(HandtraceError::Record { index, field, .. }) => {
                assert_eq!(index, 1);
                assert_eq!(field, "a");
            }
            other => panic!("expected record error, got {other:?}"),
        }
    }

    #[test]
    fn test_short_and_non_numeric_vectors_fail() {
        let short = parse_records(r#"[{"a":[0,0]}]"#).unwrap();
        assert!(matches!(extract(&short, "a"), Err(HandtraceError::Record { index: 0, .. })));

        let text = parse_records(r#"[{"a":[0,"1",0]}]"#).unwrap();
        assert!(matches!(extract(&text, "a"), Err(HandtraceError::Record { index: 0, .. })));

        let scalar = parse_records(r#"[{"a":7}]"#).unwrap();
        assert!(extract(&scalar, "a").is_err());
    }

    #[test]
    fn test_top_level_must_be_array_of_objects() {
        assert!(matches!(parse_records(r#"{"a":[0,0,0]}"#), Err(HandtraceError::Format(_))));
        assert!(matches!(parse_records("[[0,0,0]]"), Err(HandtraceError::Format(_))));
        assert!(matches!(parse_records("[{"), Err(HandtraceError::Json(_))));
    }

    #[test]
    fn test_empty_capture() {
        let records = parse_records("[]").unwrap();
        let t = extract(&records, "a").unwrap();
        assert!(t.is_empty());
        assert_eq!(t.bounds(), None);
    }

    #[test]
    fn test_bounds() {
        let t = Trajectory {
            field: "a".into(),
            points: vec![Point3::new(1.0, -2.0, 3.0), Point3::new(-1.0, 4.0, 3.0)],
        };
        assert_eq!(t.bounds(), Some([(-1.0, 1.0), (-2.0, 4.0), (3.0, 3.0)]));
    }
}
