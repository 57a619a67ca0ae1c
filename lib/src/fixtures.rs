//! Shared test fixtures: a small artifact over the standard schema, a matching
//! request, a zip code table and stub models.
//!
//! Compiled for tests and with the `test-fixtures` feature.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use ndarray::ArrayView1;
use serde_json::{json, Value};

use crate::artifact::{ArtifactBundle, LoadedArtifact};
use crate::attributes::PropertyAttributes;
use crate::lookup::{Location, ZipCodeTable};
use crate::model::{LinearParams, ModelParams, PriceModel};
use crate::preprocessing::{
    FittedOneHotEncoder, FittedSimpleImputer, FittedStep, HandleUnknown, ImputeStrategy,
    OneHotEncoderParams, SimpleImputerParams,
};
use crate::schema::FeatureSchema;

/// Width of the fixture feature vector: 8 numeric, 3 flags, 32 one-hot.
pub const WIDTH: usize = 43;

/// Training mean of `total_area_sqm` in the fixture imputer.
pub const TOTAL_AREA_MEAN: f64 = 145.0;

pub fn schema() -> FeatureSchema {
    FeatureSchema::standard()
}

pub fn imputer_params() -> SimpleImputerParams {
    SimpleImputerParams {
        strategy: ImputeStrategy::Mean,
        columns: schema().numeric().to_vec(),
        statistics: vec![2.8, 2.9, 50.9, 4.4, TOTAL_AREA_MEAN, 520.0, 18.0, 310.0],
    }
}

fn vocab(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

pub fn encoder_params() -> OneHotEncoderParams {
    OneHotEncoderParams {
        columns: schema().categorical().to_vec(),
        categories: vec![
            vocab(&["Antwerp", "Brussels", "East Flanders", "Liège", "West Flanders"]),
            vocab(&["ELECTRIC", "FUELOIL", "GAS", "MISSING"]),
            vocab(&["AS_NEW", "GOOD", "MISSING", "TO_RENOVATE"]),
            vocab(&["APARTMENT", "HOUSE"]),
            vocab(&["A", "B", "C", "D", "E", "F", "MISSING"]),
            vocab(&["Antwerp", "Brussels", "Gent", "Liège"]),
            vocab(&["APARTMENT", "HOUSE", "VILLA"]),
            vocab(&["Brussels-Capital", "Flanders", "Wallonia"]),
        ],
        handle_unknown: HandleUnknown::Ignore,
    }
}

/// A linear model priced on area, bedrooms and a few categories.
pub fn model_params() -> ModelParams {
    let mut weights = vec![0.0; WIDTH];
    weights[1] = 15_000.0; // nbr_bedrooms
    weights[4] = 1_500.0; // total_area_sqm
    weights[7] = 20.0; // garden_sqm
    weights[10] = 25_000.0; // fl_swimming_pool
    weights[12] = 60_000.0; // province_Brussels
    weights[42] = -20_000.0; // region_Wallonia
    ModelParams::Linear(LinearParams {
        weights,
        bias: 40_000.0,
    })
}

pub fn feature_names() -> Vec<String> {
    let schema = schema();
    let encoder = encoder_params();
    schema
        .numeric()
        .iter()
        .chain(schema.flags())
        .cloned()
        .chain(
            encoder
                .columns
                .iter()
                .zip(&encoder.categories)
                .flat_map(|(c, cats)| cats.iter().map(move |cat| format!("{c}_{cat}"))),
        )
        .collect()
}

pub fn bundle() -> ArtifactBundle {
    ArtifactBundle {
        schema: schema(),
        imputer: imputer_params(),
        encoder: encoder_params(),
        model: model_params(),
        feature_names: Some(feature_names()),
        scaler: None,
    }
}

pub fn loaded() -> LoadedArtifact {
    bundle()
        .into_loaded()
        .expect("fixture artifact is consistent")
}

/// The fixture preprocessing steps around an arbitrary model.
pub fn loaded_with_model(model: Arc<dyn PriceModel>) -> LoadedArtifact {
    let imputer = FittedSimpleImputer::from_params(imputer_params())
        .expect("fixture imputer is valid");
    let encoder = FittedOneHotEncoder::from_params(encoder_params())
        .expect("fixture encoder is valid");
    LoadedArtifact::with_model(schema(), imputer, encoder, model)
        .expect("fixture model has the fixture width")
}

/// A complete request for a Brussels apartment.
pub fn request_json() -> Value {
    json!({
        "nbr_frontages": 2,
        "nbr_bedrooms": 3,
        "latitude": 50.8466,
        "longitude": 4.3528,
        "total_area_sqm": 150.0,
        "surface_land_sqm": null,
        "terrace_sqm": 12.0,
        "garden_sqm": 0.0,
        "fl_terrace": 1,
        "fl_garden": 0,
        "fl_swimming_pool": 0,
        "province": "Brussels",
        "heating_type": "GAS",
        "state_building": "GOOD",
        "property_type": "APARTMENT",
        "epc": "C",
        "locality": "Brussels",
        "subproperty_type": "APARTMENT",
        "region": "Brussels-Capital"
    })
}

pub fn request() -> PropertyAttributes {
    serde_json::from_value(request_json()).expect("fixture request is a JSON object")
}

/// Linear fixture estimate for [`request`]: 40000 + 3·15000 + 150·1500 + 60000.
pub const REQUEST_ESTIMATE: f64 = 370_000.0;

pub fn zip_table() -> ZipCodeTable {
    ZipCodeTable::from_records([
        (
            1000,
            Location {
                latitude: 50.8466,
                longitude: 4.3528,
                province: "Brussels".into(),
                region: "Brussels-Capital".into(),
            },
        ),
        (
            9000,
            Location {
                latitude: 51.0543,
                longitude: 3.7174,
                province: "East Flanders".into(),
                region: "Flanders".into(),
            },
        ),
    ])
}

/// Model returning a fixed value and counting its invocations.
#[derive(Debug)]
pub struct ConstantModel {
    value: f64,
    width: usize,
    calls: AtomicUsize,
}

impl ConstantModel {
    pub fn new(value: f64, width: usize) -> Self {
        Self {
            value,
            width,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PriceModel for ConstantModel {
    fn name(&self) -> &'static str {
        "constant"
    }

    fn n_features_in(&self) -> usize {
        self.width
    }

    fn predict_unchecked(&self, _x: ArrayView1<'_, f64>) -> f64 {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.value
    }
}
