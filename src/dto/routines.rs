use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Routine;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateRoutineRequest {
    pub name: String,
    pub kind: Option<String>,
    #[serde(default)]
    pub steps: Vec<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateRoutineRequest {
    pub name: Option<String>,
    pub kind: Option<String>,
    pub steps: Option<Vec<String>>,
}

#[derive(Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct RoutineList {
    #[schema(value_type = Vec<Routine>)]
    pub items: Vec<Routine>,
}
