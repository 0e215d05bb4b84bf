use pcd_core::classes::{ObjectClass, NUM_CLASSES};

/// Formats an overall score and its per-class breakdown, rounded to three
/// decimals. Classes are in label order: other, building, water, ground.
pub fn format_metric(mode: &str, metric: &str, values: (f64, [f64; NUM_CLASSES])) -> String {
    let (overall, classwise) = values;

    let mut block = format!("\n{} {}:\n  Overall: {:.3}", mode, metric, overall);
    for (class, value) in ObjectClass::ALL.iter().zip(classwise) {
        block.push_str(&format!("\n  {}: {:.3}", class.display_name(), value));
    }
    block
}

pub fn print_metric(mode: &str, metric: &str, values: (f64, [f64; NUM_CLASSES])) {
    println!("{}", format_metric(mode, metric, values));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_summary_block() {
        let block = format_metric("train", "iou", (0.8123, [0.9, 0.7, 0.6, 0.85]));
        assert_eq!(
            block,
            "\ntrain iou:\n  Overall: 0.812\n  Other: 0.900\n  Building: 0.700\n  Water: 0.600\n  Ground: 0.850"
        );
        assert_eq!(block.lines().count(), 7);
    }

    #[test]
    fn rounds_to_three_decimals() {
        let block = format_metric("val", "acc", (0.99951, [0.0, 1.0, 0.12345, 0.5556]));
        assert!(block.contains("Overall: 1.000"));
        assert!(block.contains("Other: 0.000"));
        assert!(block.contains("Water: 0.123"));
        assert!(block.contains("Ground: 0.556"));
    }
}
