use std::sync::Arc;

use crate::store::OrderStore;

#[derive(Clone)]
pub struct AppState {
    pub orders: Arc<dyn OrderStore>,
}

impl AppState {
    pub fn new(orders: Arc<dyn OrderStore>) -> Self {
        Self { orders }
    }
}
