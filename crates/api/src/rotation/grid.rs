//! Provisioning of the active rotation template and its slot grid.

use galley_core::grid::plan_provisioning;
use galley_core::rotation::{DEFAULT_TEMPLATE_NAME, DEFAULT_WEEK_COUNT};
use galley_db::models::rotation::{CreateRotationTemplate, LocationSlotCount, RotationTemplate};
use galley_db::repositories::{RotationSlotRepo, RotationTemplateRepo};
use serde::Serialize;
use sqlx::PgPool;

use crate::error::{AppError, AppResult};

/// The active template together with its slot counts.
#[derive(Debug, Serialize)]
pub struct TemplateOverview {
    pub template: RotationTemplate,
    pub slot_count: i64,
    /// Slots inserted by this call (zero once the grid is complete).
    pub inserted: u64,
    pub locations: Vec<LocationSlotCount>,
}

/// Make sure an active template exists and its grid is provisioned.
///
/// Creates the default template if none is active, fills an empty grid and
/// backfills a location that has no cells at all. Existing cells are never
/// duplicated, so repeated calls are idempotent.
pub async fn ensure_default_template(pool: &PgPool) -> AppResult<TemplateOverview> {
    let template = match RotationTemplateRepo::find_active(pool).await? {
        Some(t) => t,
        None => create_default(pool).await?,
    };

    let existing: Vec<_> = RotationSlotRepo::list_by_template(pool, template.id, None)
        .await?
        .iter()
        .map(|s| s.key())
        .collect();

    let missing = plan_provisioning(template.week_count, &existing);
    let inserted = RotationSlotRepo::insert_missing(pool, template.id, &missing).await?;
    if inserted > 0 {
        tracing::info!(
            template_id = template.id,
            inserted,
            existing = existing.len(),
            "Rotation grid provisioned"
        );
    }

    let slot_count = RotationSlotRepo::count_by_template(pool, template.id).await?;
    let locations = RotationSlotRepo::count_by_location(pool, template.id).await?;

    Ok(TemplateOverview {
        template,
        slot_count,
        inserted,
        locations,
    })
}

/// Create the default template. A concurrent request may win the race for
/// the single active slot, in which case its template is used.
async fn create_default(pool: &PgPool) -> AppResult<RotationTemplate> {
    let input = CreateRotationTemplate {
        name: DEFAULT_TEMPLATE_NAME.to_string(),
        week_count: DEFAULT_WEEK_COUNT,
    };

    match RotationTemplateRepo::create(pool, &input).await {
        Ok(template) => {
            tracing::info!(
                template_id = template.id,
                week_count = template.week_count,
                "Default rotation template created"
            );
            Ok(template)
        }
        Err(sqlx::Error::Database(db_err))
            if db_err.constraint() == Some("uq_rotation_templates_active") =>
        {
            RotationTemplateRepo::find_active(pool).await?.ok_or_else(|| {
                AppError::InternalError("Active template vanished after conflict".into())
            })
        }
        Err(e) => Err(e.into()),
    }
}
