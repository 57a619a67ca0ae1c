use std::sync::Arc;

use immo_price::PredictionService;

#[derive(Clone)]
pub struct ApiContext {
    pub service: Arc<PredictionService>,
}

impl ApiContext {
    pub fn new(service: PredictionService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}
