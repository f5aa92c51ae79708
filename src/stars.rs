use worker::{console_log, D1Database};

use crate::db;
use crate::error::ApiError;
use crate::models;

pub const STARS_FAILED: &str = "Failed to update stars";

/// Largest magnitude accepted for a single relative adjustment.
pub const MAX_STAR_DELTA: i64 = 100;

pub fn clamp_stars(stars: i64) -> i64 {
    stars.max(0)
}

pub fn validate_delta(delta: i64) -> Result<i64, ApiError> {
    if delta == 0 || !(-MAX_STAR_DELTA..=MAX_STAR_DELTA).contains(&delta) {
        return Err(ApiError::Validation(format!(
            "delta must be non-zero and within ±{MAX_STAR_DELTA}"
        )));
    }
    Ok(delta)
}

/// Overwrite the star count. Last writer wins.
pub async fn set_stars(
    d1: &D1Database,
    req: &models::UpdateStars,
) -> Result<models::StarsUpdated, ApiError> {
    let (id, stars) = req.validate()?;
    let updated = db::set_stars(d1, id, stars)
        .await
        .map_err(ApiError::internal(STARS_FAILED))?
        .ok_or_else(ApiError::not_found)?;
    console_log!("stars set id={id} stars={updated}");
    Ok(models::StarsUpdated {
        id: id.to_string(),
        stars: updated,
    })
}

/// Apply `delta` in a single statement so concurrent adjustments never lose updates.
pub async fn adjust_stars(
    d1: &D1Database,
    id: i64,
    req: &models::AdjustStars,
) -> Result<models::StarsUpdated, ApiError> {
    let delta = validate_delta(req.delta)?;
    let updated = db::adjust_stars(d1, id, delta)
        .await
        .map_err(ApiError::internal(STARS_FAILED))?
        .ok_or_else(ApiError::not_found)?;
    console_log!("stars adjusted id={id} delta={delta} stars={updated}");
    Ok(models::StarsUpdated {
        id: id.to_string(),
        stars: updated,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_stars_clamp_to_zero() {
        assert_eq!(clamp_stars(-5), 0);
        assert_eq!(clamp_stars(i64::MIN), 0);
        assert_eq!(clamp_stars(0), 0);
        assert_eq!(clamp_stars(7), 7);
    }

    #[test]
    fn unit_deltas_accepted() {
        assert_eq!(validate_delta(1).unwrap(), 1);
        assert_eq!(validate_delta(-1).unwrap(), -1);
        assert_eq!(validate_delta(MAX_STAR_DELTA).unwrap(), MAX_STAR_DELTA);
    }

    #[test]
    fn zero_or_oversized_delta_rejected() {
        assert!(matches!(validate_delta(0), Err(ApiError::Validation(_))));
        assert!(validate_delta(MAX_STAR_DELTA + 1).is_err());
        assert!(validate_delta(i64::MIN).is_err());
    }

    #[test]
    fn store_failure_reports_stars_context() {
        let err = ApiError::internal(STARS_FAILED)(worker::Error::RustError("D1_ERROR".into()));
        assert_eq!(err.body("id").error, "Failed to update stars");
    }
}
