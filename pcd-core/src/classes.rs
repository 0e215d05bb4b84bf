use std::collections::HashMap;

/// Number of semantic classes the airborne lidar model predicts.
pub const NUM_CLASSES: usize = 4;

/// Semantic classes of the airborne lidar dataset.
///
/// The discriminant is the integer label stored in the `labels` dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum ObjectClass {
    Other = 0,
    Building = 1,
    Water = 2,
    Ground = 3,
}

impl ObjectClass {
    /// All classes in label order.
    pub const ALL: [ObjectClass; NUM_CLASSES] = [
        ObjectClass::Other,
        ObjectClass::Building,
        ObjectClass::Water,
        ObjectClass::Ground,
    ];

    pub fn label(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            ObjectClass::Other => "other",
            ObjectClass::Building => "building",
            ObjectClass::Water => "water",
            ObjectClass::Ground => "ground",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ObjectClass::Other => "Other",
            ObjectClass::Building => "Building",
            ObjectClass::Water => "Water",
            ObjectClass::Ground => "Ground",
        }
    }

    pub fn from_label(label: u8) -> Option<Self> {
        Self::ALL.get(label as usize).copied()
    }

    /// Maps an ASPRS LAS classification code onto the dataset classes.
    ///
    /// 2 (ground), 6 (building) and 9 (water) keep their meaning, every other
    /// code, including unclassified and vegetation, falls into `Other`.
    pub fn from_asprs(code: u8) -> Self {
        match code {
            2 => ObjectClass::Ground,
            6 => ObjectClass::Building,
            9 => ObjectClass::Water,
            _ => ObjectClass::Other,
        }
    }
}

/// Returns the class name to label mapping used throughout the pipeline.
pub fn get_airborne_lidar_info() -> HashMap<&'static str, u8> {
    ObjectClass::ALL
        .iter()
        .map(|class| (class.name(), class.label()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_is_fixed() {
        let expected: HashMap<&str, u8> =
            [("other", 0), ("building", 1), ("water", 2), ("ground", 3)]
                .into_iter()
                .collect();

        for _ in 0..3 {
            assert_eq!(get_airborne_lidar_info(), expected);
        }
    }

    #[test]
    fn labels_round_trip_through_enum() {
        for class in ObjectClass::ALL {
            assert_eq!(ObjectClass::from_label(class.label()), Some(class));
        }
        assert_eq!(ObjectClass::from_label(4), None);
    }

    #[test]
    fn asprs_codes() {
        assert_eq!(ObjectClass::from_asprs(2), ObjectClass::Ground);
        assert_eq!(ObjectClass::from_asprs(6), ObjectClass::Building);
        assert_eq!(ObjectClass::from_asprs(9), ObjectClass::Water);
        assert_eq!(ObjectClass::from_asprs(1), ObjectClass::Other);
        assert_eq!(ObjectClass::from_asprs(5), ObjectClass::Other);
        assert_eq!(ObjectClass::from_asprs(255), ObjectClass::Other);
    }
}
