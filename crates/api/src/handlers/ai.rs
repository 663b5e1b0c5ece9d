//! Rule-based recommendation endpoint
//!
//! One endpoint serves two request shapes: the interactive tasting
//! questionnaire and the single-shot brew-goal adjustment. The shapes are
//! disjoint, so an untagged union sorts them out.

use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::extract::ApiJson;
use crate::recommend::{
    brew_adjustment, next_question, tasting_recommendation, Answer, Question, Recommendation,
    TastingContext,
};

/// The slice of a draft brew log the rules care about.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrewLogDraft {
    #[serde(default)]
    brew_method: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RecommendationRequest {
    Tasting {
        answers: Vec<Answer>,
        #[serde(default)]
        context: Option<TastingContext>,
    },
    BrewGoal {
        #[serde(rename = "brewLog")]
        brew_log: BrewLogDraft,
        goal: String,
    },
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum RecommendationResponse {
    Question(Question),
    Recommendation(Recommendation),
}

/// POST /api/v1/ai/recommendation
pub async fn recommendation(
    ApiJson(body): ApiJson<RecommendationRequest>,
) -> ApiResult<Json<RecommendationResponse>> {
    match body {
        RecommendationRequest::Tasting { answers, context } => {
            let response = match next_question(&answers) {
                Some(question) => RecommendationResponse::Question(question),
                None => RecommendationResponse::Recommendation(tasting_recommendation(
                    &answers,
                    context.as_ref(),
                )),
            };
            Ok(Json(response))
        }
        RecommendationRequest::BrewGoal { brew_log, goal } => {
            let goal = goal.trim();
            if goal.is_empty() {
                return Err(ApiError::validation("goal is required"));
            }
            Ok(Json(RecommendationResponse::Recommendation(
                brew_adjustment(goal, brew_log.brew_method.as_deref()),
            )))
        }
    }
}

/// POST /api/v1/ai/extract-coffee
///
/// Reserved endpoint; extraction from free text is not implemented.
pub async fn extract_coffee() -> ApiResult<()> {
    Err(ApiError::NotImplemented)
}
