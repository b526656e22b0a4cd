use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Intake form body accepted by `POST /data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CaseData {
    #[schema(example = "Jane")]
    pub first_name: String,
    #[schema(example = "Doe")]
    pub last_name: String,
    #[schema(example = "+4912345678")]
    pub phone_number: String,
    #[schema(example = "jane@example.com")]
    pub email: String,
    #[schema(example = "Investment fraud")]
    pub type_of_issue: String,
    #[schema(example = "Crypto")]
    pub scam_type: String,
    #[serde(default)]
    #[schema(example = 2500.0)]
    pub amount_lost: Option<f64>,
    pub description: String,
}

/// Row written to the cases table: the payload plus its correlation id.
#[derive(Debug, Clone, Serialize)]
pub struct CaseRecord {
    #[serde(flatten)]
    pub data: CaseData,
    pub case_id: Uuid,
}

impl CaseRecord {
    pub fn new(data: CaseData) -> Self {
        Self {
            data,
            case_id: Uuid::new_v4(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CaseCreatedResponse {
    #[schema(example = "3f1c2a9e-6a1b-4f6d-9a43-0c5d1e7b8f21")]
    pub case_id: Uuid,
}
