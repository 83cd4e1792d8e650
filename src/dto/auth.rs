use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Claims of the bearer tokens issued by the external auth service.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    pub exp: usize,
}
