use std::{collections::HashMap, error::Error, fs::File, io, path::PathBuf};

use csv::ReaderBuilder;
use pcd_core::pointcloud::point::Point;

use super::PointReader;

const ATTRIBUTE_NAMES: [&str; 5] = ["x", "y", "z", "intensity", "classification"];

fn normalize(name: &str) -> String {
    name.trim().to_lowercase().replace(['_', '-'], "")
}

fn create_field_mapping(
    headers: &csv::StringRecord,
) -> Result<HashMap<&'static str, usize>, Box<dyn Error + Send + Sync>> {
    let mut mapping = HashMap::new();

    for (index, header) in headers.iter().enumerate() {
        let normalized_header = normalize(header);
        if let Some(attr_name) = ATTRIBUTE_NAMES
            .iter()
            .find(|attr_name| normalize(attr_name) == normalized_header)
        {
            mapping.entry(*attr_name).or_insert(index);
        }
    }

    for attr_name in &["x", "y", "z"] {
        if !mapping.contains_key(*attr_name) {
            return Err(format!(
                "Required attribute '{}' is missing in CSV headers.",
                attr_name
            )
            .into());
        }
    }

    Ok(mapping)
}

fn get_field_value<'a>(
    record: &'a csv::StringRecord,
    field_mapping: &HashMap<&'static str, usize>,
    field_name: &str,
) -> Option<&'a str> {
    field_mapping
        .get(field_name)
        .and_then(|&index| record.get(index))
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Streams points from CSV/TXT files with a header row.
///
/// `x`, `y` and `z` columns are required, `intensity` and `classification`
/// are picked up when present.
pub struct CsvPointReader {
    pub files: Vec<PathBuf>,
    pub current_file_index: usize,
    pub current_reader: Option<csv::Reader<File>>,
    pub field_mapping: HashMap<&'static str, usize>,
}

impl CsvPointReader {
    pub fn new(files: Vec<PathBuf>) -> io::Result<Self> {
        let mut reader = CsvPointReader {
            files,
            current_file_index: 0,
            current_reader: None,
            field_mapping: HashMap::new(),
        };

        reader.open_next_file()?;
        Ok(reader)
    }

    fn open_next_file(&mut self) -> io::Result<()> {
        if self.current_file_index < self.files.len() {
            let path = &self.files[self.current_file_index];
            self.current_file_index += 1;

            let mut rdr = ReaderBuilder::new()
                .has_headers(true)
                .trim(csv::Trim::All)
                .from_path(path)?;

            let headers = rdr.headers()?.clone();
            self.field_mapping = create_field_mapping(&headers).map_err(io::Error::other)?;
            self.current_reader = Some(rdr);
        } else {
            self.current_reader = None;
        }
        Ok(())
    }

    fn parse_point(&self, record: &csv::StringRecord) -> Result<Point, Box<dyn Error>> {
        let x_str = get_field_value(record, &self.field_mapping, "x").ok_or("Missing 'x' field")?;
        let y_str = get_field_value(record, &self.field_mapping, "y").ok_or("Missing 'y' field")?;
        let z_str = get_field_value(record, &self.field_mapping, "z").ok_or("Missing 'z' field")?;

        let intensity = get_field_value(record, &self.field_mapping, "intensity")
            .map(|v| v.parse::<f64>())
            .transpose()?
            .map(|v| v.floor().clamp(0.0, u16::MAX as f64) as u16);

        let classification = get_field_value(record, &self.field_mapping, "classification")
            .map(|v| v.parse::<u8>())
            .transpose()?;

        Ok(Point {
            x: x_str.parse()?,
            y: y_str.parse()?,
            z: z_str.parse()?,
            intensity,
            classification,
        })
    }
}

impl PointReader for CsvPointReader {
    fn next_point(&mut self) -> io::Result<Option<Point>> {
        loop {
            if self.current_reader.is_none() {
                self.open_next_file()?;
            }
            let Some(reader) = self.current_reader.as_mut() else {
                return Ok(None);
            };

            let mut record = csv::StringRecord::new();
            match reader.read_record(&mut record) {
                Ok(true) => {
                    return self
                        .parse_point(&record)
                        .map(Some)
                        .map_err(|e| io::Error::other(format!("{}", e)));
                }
                Ok(false) => {
                    self.current_reader = None;
                }
                Err(e) => {
                    log::error!("Error reading CSV record: {}", e);
                    return Err(io::Error::other(e));
                }
            }
        }
    }
}
