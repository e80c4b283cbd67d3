pub mod chart;
pub mod common_de;
pub mod quote;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body of every non-success response from the proxy.
///
/// ```json
/// { "error": "Missing symbols parameter" }
/// ```
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}
