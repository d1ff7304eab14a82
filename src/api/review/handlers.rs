use crate::api::models::*;
use crate::sentiment;
use crate::storage::Review;
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    Json,
};
use chrono::{SecondsFormat, Utc};
use tracing::info;

pub async fn create_review_handler(
    State(state): State<AppState>,
    payload: Result<Json<CreateReviewRequest>, JsonRejection>,
) -> Result<Json<Review>, AppError> {
    let Json(request) = payload?;
    let text = request.text.into_inner();

    // Classify
    let sentiment = sentiment::classify(&text);
    let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);

    // Store
    let id = state
        .store
        .insert(&text, sentiment, &created_at)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to save review: {}", e)))?;

    info!(id, %sentiment, "Review added");

    Ok(Json(Review {
        id,
        text,
        sentiment,
        created_at,
    }))
}

pub async fn list_reviews_handler(
    State(state): State<AppState>,
    Query(query): Query<ListReviewsQuery>,
) -> Result<Json<Vec<Review>>, AppError> {
    let filter = query.sentiment_filter().map_err(AppError::BadRequest)?;

    let reviews = match filter {
        Some(sentiment) => state.store.list_by_sentiment(sentiment).await,
        None => state.store.list_all().await,
    }
    .map_err(|e| AppError::Internal(format!("Failed to fetch reviews: {}", e)))?;

    info!(
        filter = filter.map(|s| s.as_str()).unwrap_or("none"),
        found = reviews.len(),
        "Listed reviews"
    );

    Ok(Json(reviews))
}
