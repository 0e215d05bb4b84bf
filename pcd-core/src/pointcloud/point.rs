use crate::classes::{ObjectClass, NUM_CLASSES};
use crate::error::PointCloudError;

/// A point as read from a LAS/LAZ or CSV source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub intensity: Option<u16>,
    // ASPRS classification code
    pub classification: Option<u8>,
}

impl Point {
    pub fn object_class(&self) -> ObjectClass {
        self.classification
            .map(ObjectClass::from_asprs)
            .unwrap_or(ObjectClass::Other)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoundingVolume {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

/// Per-class point counts of a labeled tile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassCounts {
    pub counts: [usize; NUM_CLASSES],
    // labels outside the class registry
    pub unknown: usize,
}

impl ClassCounts {
    pub fn get(&self, class: ObjectClass) -> usize {
        self.counts[class.label() as usize]
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum::<usize>() + self.unknown
    }
}

/// The in-memory form of one tile: `xyzni` rows of x, y, z, intensity and
/// one label per row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabeledPointCloud {
    xyzni: Vec<[f32; 4]>,
    labels: Vec<u8>,
}

impl LabeledPointCloud {
    pub fn new(xyzni: Vec<[f32; 4]>, labels: Vec<u8>) -> Result<Self, PointCloudError> {
        if xyzni.len() != labels.len() {
            return Err(PointCloudError::LengthMismatch {
                points: xyzni.len(),
                labels: labels.len(),
            });
        }
        Ok(Self { xyzni, labels })
    }

    pub fn from_points(points: &[Point]) -> Self {
        let mut xyzni = Vec::with_capacity(points.len());
        let mut labels = Vec::with_capacity(points.len());

        for point in points {
            xyzni.push([
                point.x as f32,
                point.y as f32,
                point.z as f32,
                point.intensity.unwrap_or(0) as f32,
            ]);
            labels.push(point.object_class().label());
        }

        Self { xyzni, labels }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn xyzni(&self) -> &[[f32; 4]] {
        &self.xyzni
    }

    pub fn labels(&self) -> &[u8] {
        &self.labels
    }

    pub fn extend(&mut self, other: LabeledPointCloud) {
        self.xyzni.extend(other.xyzni);
        self.labels.extend(other.labels);
    }

    pub fn class_counts(&self) -> ClassCounts {
        let mut counts = ClassCounts::default();
        for &label in &self.labels {
            match ObjectClass::from_label(label) {
                Some(class) => counts.counts[class.label() as usize] += 1,
                None => counts.unknown += 1,
            }
        }
        counts
    }

    pub fn bounds(&self) -> Option<BoundingVolume> {
        if self.xyzni.is_empty() {
            return None;
        }

        let mut bounding_volume = BoundingVolume {
            min: [f64::MAX, f64::MAX, f64::MAX],
            max: [f64::MIN, f64::MIN, f64::MIN],
        };
        for row in &self.xyzni {
            for axis in 0..3 {
                let value = row[axis] as f64;
                bounding_volume.min[axis] = bounding_volume.min[axis].min(value);
                bounding_volume.max[axis] = bounding_volume.max[axis].max(value);
            }
        }
        Some(bounding_volume)
    }
}
