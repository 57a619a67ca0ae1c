//! Zip code to location resolution.
//!
//! [`LookupService`] is the seam; [`ZipCodeTable`] is the in-memory
//! implementation loaded from a CSV file with the columns
//! `zip_code, latitude, longitude, province, region`.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use crate::attributes::{AttributeValue, PropertyAttributes};
use crate::error::LookupError;

/// Request field carrying the zip code.
pub const ZIP_CODE_FIELD: &str = "zip_code";

/// Where a zip code lies.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub province: String,
    pub region: String,
}

/// Resolves a zip code to a location.
pub trait LookupService: Send + Sync {
    fn resolve(&self, zip_code: u32) -> Result<Location, LookupError>;
}

#[derive(Debug, Deserialize)]
struct ZipCodeRecord {
    zip_code: u32,
    latitude: f64,
    longitude: f64,
    province: String,
    region: String,
}

impl ZipCodeRecord {
    fn into_entry(self) -> (u32, Location) {
        (
            self.zip_code,
            Location {
                latitude: self.latitude,
                longitude: self.longitude,
                province: self.province,
                region: self.region,
            },
        )
    }
}

/// Zip code table held in memory. The first row for a zip code wins.
#[derive(Clone, Debug, Default)]
pub struct ZipCodeTable {
    entries: HashMap<u32, Location>,
}

impl ZipCodeTable {
    pub fn from_records(records: impl IntoIterator<Item = (u32, Location)>) -> Self {
        let mut entries = HashMap::new();
        for (zip, location) in records {
            entries.entry(zip).or_insert(location);
        }
        Self { entries }
    }

    /// Parse a CSV with a header row. Extra columns are ignored.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, LookupError> {
        let mut csv = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut entries = HashMap::new();
        let mut rows = 0usize;
        for record in csv.deserialize::<ZipCodeRecord>() {
            let (zip, location) = record?.into_entry();
            rows += 1;
            entries.entry(zip).or_insert(location);
        }
        tracing::debug!(rows, zip_codes = entries.len(), "parsed zip code table");
        Ok(Self { entries })
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, LookupError> {
        let file = std::fs::File::open(path.as_ref())?;
        let table = Self::from_reader(file)?;
        tracing::info!(
            path = %path.as_ref().display(),
            zip_codes = table.len(),
            "loaded zip code table"
        );
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl LookupService for ZipCodeTable {
    fn resolve(&self, zip_code: u32) -> Result<Location, LookupError> {
        self.entries
            .get(&zip_code)
            .cloned()
            .ok_or(LookupError::UnknownZipCode(zip_code))
    }
}

/// Read the zip code field, if the request carries one.
///
/// Accepts an integral number or a numeric string.
pub fn zip_code_of(attributes: &PropertyAttributes) -> Result<Option<u32>, LookupError> {
    match attributes.get(ZIP_CODE_FIELD) {
        None | Some(AttributeValue::Absent) => Ok(None),
        Some(AttributeValue::Number(n)) => {
            if n.fract() == 0.0 && *n >= 0.0 && *n <= u32::MAX as f64 {
                Ok(Some(*n as u32))
            } else {
                Err(LookupError::InvalidZipCode(n.to_string()))
            }
        }
        Some(AttributeValue::Text(s)) => s
            .trim()
            .parse::<u32>()
            .map(Some)
            .map_err(|_| LookupError::InvalidZipCode(s.clone())),
        Some(other) => Err(LookupError::InvalidZipCode(format!("{other:?}"))),
    }
}

/// Fill location fields the request leaves missing. Explicit values win.
///
/// Returns the number of fields filled in.
pub fn enrich(
    attributes: &mut PropertyAttributes,
    lookup: &dyn LookupService,
) -> Result<usize, LookupError> {
    let Some(zip_code) = zip_code_of(attributes)? else {
        return Ok(0);
    };
    let location = lookup.resolve(zip_code)?;

    let mut filled = 0;
    let candidates: [(&str, AttributeValue); 4] = [
        ("latitude", location.latitude.into()),
        ("longitude", location.longitude.into()),
        ("province", location.province.into()),
        ("region", location.region.into()),
    ];
    for (field, value) in candidates {
        if attributes.is_missing(field) {
            attributes.insert(field, value);
            filled += 1;
        }
    }
    tracing::debug!(zip_code, filled, "resolved location from zip code");
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
zip_code,locality,latitude,longitude,province,region
1000,Brussels,50.8466,4.3528,Brussels,Brussels-Capital
9000,Gent,51.0543,3.7174,East Flanders,Flanders
9000,Gent Duplicate,0.0,0.0,Nowhere,Nowhere
";

    fn table() -> ZipCodeTable {
        ZipCodeTable::from_reader(CSV.as_bytes()).unwrap()
    }

    #[test]
    fn test_parse_and_resolve() {
        let table = table();
        assert_eq!(table.len(), 2);
        let loc = table.resolve(1000).unwrap();
        assert_eq!(loc.province, "Brussels");
        assert_eq!(loc.region, "Brussels-Capital");
        assert!((loc.latitude - 50.8466).abs() < 1e-9);
    }

    #[test]
    fn test_first_duplicate_wins() {
        assert_eq!(table().resolve(9000).unwrap().province, "East Flanders");
    }

    #[test]
    fn test_unknown_zip_code() {
        let err = table().resolve(1234).unwrap_err();
        assert!(matches!(err, LookupError::UnknownZipCode(1234)));
    }

    #[test]
    fn test_malformed_csv() {
        let bad = "zip_code,latitude,longitude,province,region\nabc,1,2,P,R\n";
        let err = ZipCodeTable::from_reader(bad.as_bytes()).unwrap_err();
        assert!(matches!(err, LookupError::Csv(_)));
    }

    #[test]
    fn test_enrich_fills_only_missing_fields() {
        let mut attrs = PropertyAttributes::new();
        attrs.insert("zip_code", 9000.0);
        attrs.insert("latitude", AttributeValue::Absent);
        attrs.insert("region", "Explicit");

        let filled = enrich(&mut attrs, &table()).unwrap();
        assert_eq!(filled, 3);
        assert_eq!(attrs.get("region"), Some(&AttributeValue::Text("Explicit".into())));
        assert_eq!(
            attrs.get("province"),
            Some(&AttributeValue::Text("East Flanders".into()))
        );
        assert_eq!(attrs.get("latitude"), Some(&AttributeValue::Number(51.0543)));
    }

    #[test]
    fn test_enrich_without_zip_code_is_noop() {
        let mut attrs = PropertyAttributes::new();
        attrs.insert("province", "Liège");
        assert_eq!(enrich(&mut attrs, &table()).unwrap(), 0);
        assert_eq!(attrs.len(), 1);
    }

    #[test]
    fn test_zip_code_as_text() {
        let mut attrs = PropertyAttributes::new();
        attrs.insert("zip_code", " 1000 ");
        assert_eq!(zip_code_of(&attrs).unwrap(), Some(1000));

        attrs.insert("zip_code", "B-1000");
        assert!(matches!(
            zip_code_of(&attrs),
            Err(LookupError::InvalidZipCode(_))
        ));

        attrs.insert("zip_code", 1000.5);
        assert!(zip_code_of(&attrs).is_err());
    }

    #[test]
    fn test_unknown_zip_fails_enrichment() {
        let mut attrs = PropertyAttributes::new();
        attrs.insert("zip_code", 4242.0);
        let err = enrich(&mut attrs, &table()).unwrap_err();
        assert!(err.to_string().contains("4242"));
    }
}
