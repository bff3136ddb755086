//! Load segment catalogs from SegmentLibrary-style CSV files

use super::Segment;
use crate::error::Result;
use csv::Reader;
use std::collections::BTreeMap;
use std::path::Path;

/// Segments grouped by country key, in file order within each country
pub type SegmentLibrary = BTreeMap<String, Vec<Segment>>;

/// Raw CSV row matching the SegmentLibrary columns
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(rename = "Country")]
    country: String,
    #[serde(rename = "SegmentName")]
    name: String,
    #[serde(rename = "Category", default)]
    category: String,
    #[serde(rename = "Market", default)]
    market: String,
    #[serde(rename = "PricePerTransaction")]
    price: f64,
    #[serde(rename = "CostPerTransaction")]
    cost: f64,
    #[serde(rename = "MonthlyVolume")]
    volume: f64,
    #[serde(rename = "VolumeGrowth")]
    growth: f64,
    #[serde(rename = "Description", default)]
    description: String,
}

impl CsvRow {
    fn into_segment(self) -> Result<Segment> {
        let segment = Segment {
            country: self.country.trim().to_lowercase(),
            name: self.name,
            category: self.category,
            market: self.market,
            price_per_transaction: self.price,
            cost_per_transaction: self.cost,
            monthly_volume: self.volume,
            volume_growth: self.growth,
            description: self.description,
        };
        segment.validate()?;
        Ok(segment)
    }
}

/// Load a segment library from a CSV file
pub fn load_segments<P: AsRef<Path>>(path: P) -> Result<SegmentLibrary> {
    let reader = Reader::from_path(path)?;
    collect_segments(reader)
}

/// Load a segment library from any reader (e.g., string buffer, request body)
pub fn load_segments_from_reader<R: std::io::Read>(reader: R) -> Result<SegmentLibrary> {
    collect_segments(Reader::from_reader(reader))
}

fn collect_segments<R: std::io::Read>(mut reader: Reader<R>) -> Result<SegmentLibrary> {
    let mut library = SegmentLibrary::new();

    for result in reader.deserialize() {
        let row: CsvRow = result?;
        let segment = row.into_segment()?;
        library
            .entry(segment.country.clone())
            .or_default()
            .push(segment);
    }

    log::debug!(
        "Loaded {} segments across {} countries",
        library.values().map(Vec::len).sum::<usize>(),
        library.len()
    );

    Ok(library)
}
