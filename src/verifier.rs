//! Survey context verification and quality scoring.
//!
//! Quality is data, not exceptions: missing calibration fields are reported
//! as flags so the pipeline always produces a best-effort answer. This
//! module never errors on absent or partial context data.

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::types::{Quality, QualityFlag, SurveyContext};

/// Verify a well's active context and return quality flags plus a coarse
/// quality score.
///
/// Pure and deterministic for a fixed `now`. Rules run in order and every
/// applicable flag is emitted:
///
/// 1. No context: `UNVERIFIED` + `CONTEXT_FALLBACK`, quality Suspect.
/// 2. Magnetic model date absent/unparsable: `MAG_MODEL_MISSING`; older
///    than `max_age_days`: `MAG_MODEL_STALE`.
/// 3. Grid present without a convergence angle: `GRID_INCOMPLETE`.
/// 4. No "KB" datum: `DATUM_INCOMPLETE`.
///
/// Quality is Good with no flags, Suspect otherwise. Bad (0) is reserved
/// for future fatal conditions.
pub fn verify(
    context: Option<&SurveyContext>,
    max_age_days: i64,
    now: DateTime<Utc>,
) -> (Vec<QualityFlag>, Quality) {
    let ctx = match context {
        Some(ctx) => ctx,
        None => {
            return (
                vec![QualityFlag::Unverified, QualityFlag::ContextFallback],
                Quality::Suspect,
            );
        }
    };

    let mut flags = Vec::new();

    // Magnetic reference model
    match ctx.mag_field.model_date.as_deref() {
        None => flags.push(QualityFlag::MagModelMissing),
        Some(raw) => match parse_model_date(raw) {
            None => flags.push(QualityFlag::MagModelMissing),
            Some(model_date) => {
                if now - model_date > Duration::days(max_age_days) {
                    flags.push(QualityFlag::MagModelStale);
                }
            }
        },
    }

    // Grid configuration
    if let Some(grid) = &ctx.grid {
        if grid.convergence_deg.is_none() {
            flags.push(QualityFlag::GridIncomplete);
        }
    }

    // Depth datums
    if !ctx.has_kb_datum() {
        flags.push(QualityFlag::DatumIncomplete);
    }

    let quality = if flags.is_empty() {
        Quality::Good
    } else {
        Quality::Suspect
    };
    (flags, quality)
}

/// Parse a magnetic model date as RFC 3339 or a bare `YYYY-MM-DD`.
fn parse_model_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ndt| ndt.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{GridConfig, MagField};
    use std::collections::BTreeMap;
    use uuid::Uuid;

    fn complete_context(now: DateTime<Utc>) -> SurveyContext {
        let mut datums = BTreeMap::new();
        datums.insert("KB".to_string(), 10.5);
        SurveyContext {
            id: Uuid::new_v4(),
            well_id: "W1".to_string(),
            mwd_tool_family: "Tensor".to_string(),
            grid: Some(GridConfig {
                name: Some("UTM31N".to_string()),
                convergence_deg: Some(1.2),
            }),
            datums,
            formation: None,
            mag_field: MagField {
                model: Some("IGRF-13".to_string()),
                model_date: Some((now - Duration::days(10)).to_rfc3339()),
                declination_deg: Some(2.3),
            },
            tool_cal: None,
            quality_tags: Vec::new(),
            provenance: serde_json::Value::Null,
            active_from: now,
        }
    }

    #[test]
    fn test_no_context_is_suspect_fallback() {
        let now = Utc::now();
        let (flags, quality) = verify(None, 30, now);
        assert_eq!(
            flags,
            vec![QualityFlag::Unverified, QualityFlag::ContextFallback]
        );
        assert_eq!(quality, Quality::Suspect);
    }

    #[test]
    fn test_complete_context_is_good() {
        let now = Utc::now();
        let (flags, quality) = verify(Some(&complete_context(now)), 30, now);
        assert!(flags.is_empty(), "unexpected flags: {flags:?}");
        assert_eq!(quality, Quality::Good);
    }

    #[test]
    fn test_stale_mag_model() {
        let now = Utc::now();
        let mut ctx = complete_context(now);
        ctx.mag_field.model_date = Some((now - Duration::days(400)).to_rfc3339());

        let (flags, quality) = verify(Some(&ctx), 30, now);
        assert!(flags.contains(&QualityFlag::MagModelStale));
        assert!(!flags.contains(&QualityFlag::MagModelMissing));
        assert_eq!(quality, Quality::Suspect);
    }

    #[test]
    fn test_fresh_mag_model_not_stale() {
        let now = Utc::now();
        let (flags, _) = verify(Some(&complete_context(now)), 30, now);
        assert!(!flags.contains(&QualityFlag::MagModelStale));
    }

    #[test]
    fn test_missing_and_unparsable_model_dates() {
        let now = Utc::now();
        let mut ctx = complete_context(now);
        ctx.mag_field.model_date = None;
        let (flags, _) = verify(Some(&ctx), 30, now);
        assert!(flags.contains(&QualityFlag::MagModelMissing));

        ctx.mag_field.model_date = Some("not-a-date".to_string());
        let (flags, _) = verify(Some(&ctx), 30, now);
        assert!(flags.contains(&QualityFlag::MagModelMissing));
    }

    #[test]
    fn test_bare_date_parses() {
        let now = Utc::now();
        let mut ctx = complete_context(now);
        ctx.mag_field.model_date = Some("2020-01-15".to_string());
        let (flags, _) = verify(Some(&ctx), 30, now);
        // Old bare date: stale, not missing
        assert!(flags.contains(&QualityFlag::MagModelStale));
        assert!(!flags.contains(&QualityFlag::MagModelMissing));
    }

    #[test]
    fn test_grid_without_convergence() {
        let now = Utc::now();
        let mut ctx = complete_context(now);
        ctx.grid = Some(GridConfig {
            name: Some("UTM31N".to_string()),
            convergence_deg: None,
        });
        let (flags, _) = verify(Some(&ctx), 30, now);
        assert!(flags.contains(&QualityFlag::GridIncomplete));

        // No grid at all is not incomplete
        ctx.grid = None;
        let (flags, _) = verify(Some(&ctx), 30, now);
        assert!(!flags.contains(&QualityFlag::GridIncomplete));
    }

    #[test]
    fn test_missing_kb_datum() {
        let now = Utc::now();
        let mut ctx = complete_context(now);
        ctx.datums.clear();
        let (flags, quality) = verify(Some(&ctx), 30, now);
        assert!(flags.contains(&QualityFlag::DatumIncomplete));
        assert_eq!(quality, Quality::Suspect);

        ctx.datums.insert("KB".to_string(), 10.5);
        let (flags, _) = verify(Some(&ctx), 30, now);
        assert!(!flags.contains(&QualityFlag::DatumIncomplete));
    }

    #[test]
    fn test_all_applicable_flags_emitted_in_order() {
        let now = Utc::now();
        let mut ctx = complete_context(now);
        ctx.mag_field.model_date = None;
        ctx.grid = Some(GridConfig {
            name: None,
            convergence_deg: None,
        });
        ctx.datums.clear();

        let (flags, _) = verify(Some(&ctx), 30, now);
        assert_eq!(
            flags,
            vec![
                QualityFlag::MagModelMissing,
                QualityFlag::GridIncomplete,
                QualityFlag::DatumIncomplete,
            ]
        );
    }

    #[test]
    fn test_verify_is_idempotent() {
        let now = Utc::now();
        let ctx = complete_context(now);
        let first = verify(Some(&ctx), 30, now);
        let second = verify(Some(&ctx), 30, now);
        assert_eq!(first, second);
    }
}
