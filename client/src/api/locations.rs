use shared::models::Location;

use super::ApiClient;
use crate::error::ClientResult;

impl ApiClient {
    /// `GET /Locations`
    pub async fn list_locations(&self) -> ClientResult<Vec<Location>> {
        self.get("/Locations").await
    }
}
