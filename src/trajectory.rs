//! Minimum-curvature trajectory stepping.
//!
//! Deterministic calculations for directional-drilling trajectories. All
//! math here is pure geometry — no I/O, no state.
//!
//! The method assumes the wellbore follows a circular arc between two
//! surveyed stations. Dogleg severity is normalized to the industry-standard
//! 30 m course length; depths and positions are in meters.

/// Directional measurements at one station.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Station {
    pub md_m: f64,
    pub inc_deg: f64,
    pub azi_deg: f64,
}

/// Local-frame position of a station.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub northing_m: f64,
    pub easting_m: f64,
    pub tvd_m: f64,
}

/// Result of stepping from one station to the next.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectoryStep {
    /// Dogleg severity, degrees per 30 m.
    pub dogleg_deg30m: f64,
    /// Minimum-curvature ratio factor (0.0 for a degenerate step).
    pub ratio_factor: f64,
    pub position: Position,
}

/// Ratio factor is 1.0 below this dogleg angle — avoids dividing by a
/// near-zero angle in the straight-hole case.
const STRAIGHT_HOLE_DOGLEG_RAD: f64 = 1e-6;

/// Compute dogleg severity (deg/30m) and ratio factor between two stations.
///
/// Returns `(0.0, 0.0)` for a non-increasing measured depth.
pub fn min_curvature(prev: &Station, curr: &Station) -> (f64, f64) {
    let dmd = curr.md_m - prev.md_m;
    if dmd <= 0.0 {
        return (0.0, 0.0);
    }

    let inc1 = prev.inc_deg.to_radians();
    let inc2 = curr.inc_deg.to_radians();
    let azi1 = prev.azi_deg.to_radians();
    let azi2 = curr.azi_deg.to_radians();

    // Clamp guards against floating-point drift pushing the cosine
    // fractionally outside [-1, 1] and acos returning NaN.
    let cos_dogleg = ((inc2 - inc1).cos() - inc1.sin() * inc2.sin() * (1.0 - (azi2 - azi1).cos()))
        .clamp(-1.0, 1.0);

    let dogleg = cos_dogleg.acos();
    let rf = if dogleg < STRAIGHT_HOLE_DOGLEG_RAD {
        1.0
    } else {
        (2.0 / dogleg) * (dogleg / 2.0).tan()
    };
    let dls = dogleg.to_degrees() * (30.0 / dmd);

    (dls, rf)
}

/// Step the trajectory from `prev` (with its already-computed position) to
/// `curr` using the average-direction-vector form of minimum curvature.
///
/// The first station of a well (`prev = None`) anchors the chain at
/// N=E=TVD=0 with zero dogleg. A non-increasing measured depth produces a
/// zero-length step at the previous position rather than an error — callers
/// treat out-of-order or duplicate depths as a documented degenerate case.
pub fn compute_step(prev: Option<(&Station, Position)>, curr: &Station) -> TrajectoryStep {
    let (prev_station, prev_pos) = match prev {
        Some(p) => p,
        None => {
            return TrajectoryStep {
                dogleg_deg30m: 0.0,
                ratio_factor: 0.0,
                position: Position::default(),
            };
        }
    };

    let dmd = curr.md_m - prev_station.md_m;
    if dmd <= 0.0 {
        return TrajectoryStep {
            dogleg_deg30m: 0.0,
            ratio_factor: 0.0,
            position: prev_pos,
        };
    }

    let (dls, rf) = min_curvature(prev_station, curr);

    let inc1 = prev_station.inc_deg.to_radians();
    let inc2 = curr.inc_deg.to_radians();
    let azi1 = prev_station.azi_deg.to_radians();
    let azi2 = curr.azi_deg.to_radians();

    let northing_m =
        prev_pos.northing_m + 0.5 * dmd * (inc1.sin() * azi1.cos() + inc2.sin() * azi2.cos()) * rf;
    let easting_m =
        prev_pos.easting_m + 0.5 * dmd * (inc1.sin() * azi1.sin() + inc2.sin() * azi2.sin()) * rf;
    let tvd_m = prev_pos.tvd_m + 0.5 * dmd * (inc1.cos() + inc2.cos()) * rf;

    TrajectoryStep {
        dogleg_deg30m: dls,
        ratio_factor: rf,
        position: Position {
            northing_m,
            easting_m,
            tvd_m,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn station(md_m: f64, inc_deg: f64, azi_deg: f64) -> Station {
        Station {
            md_m,
            inc_deg,
            azi_deg,
        }
    }

    #[test]
    fn test_first_station_anchors_at_origin() {
        let step = compute_step(None, &station(1500.0, 12.0, 275.0));
        assert_eq!(step.dogleg_deg30m, 0.0);
        assert_eq!(step.ratio_factor, 0.0);
        assert_eq!(step.position, Position::default());
    }

    #[test]
    fn test_non_increasing_depth_is_zero_length_step() {
        let prev_pos = Position {
            northing_m: 10.0,
            easting_m: -4.0,
            tvd_m: 95.0,
        };
        let prev = station(100.0, 5.0, 30.0);

        // Duplicate depth
        let step = compute_step(Some((&prev, prev_pos)), &station(100.0, 6.0, 30.0));
        assert_eq!(step.dogleg_deg30m, 0.0);
        assert_eq!(step.ratio_factor, 0.0);
        assert_eq!(step.position, prev_pos);

        // Out-of-order depth
        let step = compute_step(Some((&prev, prev_pos)), &station(90.0, 6.0, 30.0));
        assert_eq!(step.position, prev_pos);
    }

    #[test]
    fn test_unchanged_angles_give_zero_dogleg_unit_rf() {
        let (dls, rf) = min_curvature(&station(100.0, 35.0, 210.0), &station(160.0, 35.0, 210.0));
        assert!(dls.abs() < EPS);
        assert_eq!(rf, 1.0);
    }

    #[test]
    fn test_straight_inclined_hole_position() {
        // Constant 30 deg inclination due north for 60 m of course length.
        let prev = station(0.0, 30.0, 0.0);
        let step = compute_step(Some((&prev, Position::default())), &station(60.0, 30.0, 0.0));

        assert!((step.position.tvd_m - 60.0 * 30f64.to_radians().cos()).abs() < 1e-9);
        assert!((step.position.northing_m - 60.0 * 30f64.to_radians().sin()).abs() < 1e-9);
        assert!(step.position.easting_m.abs() < EPS);
        assert_eq!(step.ratio_factor, 1.0);
    }

    #[test]
    fn test_vertical_to_horizontal_quarter_circle() {
        // A build from vertical to horizontal over a quarter circle of
        // radius R lands exactly R deeper and R north of the kickoff.
        let r = 100.0;
        let arc = std::f64::consts::FRAC_PI_2 * r;
        let prev = station(0.0, 0.0, 0.0);
        let step = compute_step(Some((&prev, Position::default())), &station(arc, 90.0, 0.0));

        assert!((step.position.tvd_m - r).abs() < 1e-6);
        assert!((step.position.northing_m - r).abs() < 1e-6);
        assert!(step.position.easting_m.abs() < 1e-6);
        // 90 deg over the arc length, normalized per 30 m
        assert!((step.dogleg_deg30m - 90.0 * 30.0 / arc).abs() < 1e-9);
        assert!((step.ratio_factor - 4.0 / std::f64::consts::PI).abs() < 1e-9);
    }

    #[test]
    fn test_horizontal_quarter_turn() {
        // Horizontal hole turning 90 deg of azimuth over a quarter circle of
        // radius R moves R north and R east with no TVD change.
        let r = 250.0;
        let arc = std::f64::consts::FRAC_PI_2 * r;
        let prev = station(1000.0, 90.0, 0.0);
        let step = compute_step(
            Some((&prev, Position::default())),
            &station(1000.0 + arc, 90.0, 90.0),
        );

        assert!((step.position.northing_m - r).abs() < 1e-6);
        assert!((step.position.easting_m - r).abs() < 1e-6);
        assert!(step.position.tvd_m.abs() < 1e-6);
    }

    #[test]
    fn test_clamped_cosine_never_produces_nan() {
        // Identical angles can push the cosine to 1 + ulp without the clamp.
        let (dls, rf) = min_curvature(
            &station(0.0, 89.999999, 179.999999),
            &station(30.0, 89.999999, 179.999999),
        );
        assert!(dls.is_finite());
        assert!(rf.is_finite());

        // Opposed directions drive the cosine toward -1.
        let (dls, _) = min_curvature(&station(0.0, 90.0, 0.0), &station(30.0, 90.0, 180.0));
        assert!(dls.is_finite());
        assert!((dls - 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_small_build_reference_values() {
        // md 100 -> 130, inc 0 -> 5, azi 0 -> 10: dogleg equals the 5 deg
        // inclination change (vertical start makes azimuth irrelevant).
        let prev = station(100.0, 0.0, 0.0);
        let curr = station(130.0, 5.0, 10.0);

        let (dls, rf) = min_curvature(&prev, &curr);
        assert!((dls - 5.0).abs() < 1e-9);
        assert!(rf > 1.0 && rf < 1.001);

        let step = compute_step(Some((&prev, Position::default())), &curr);
        assert!(step.dogleg_deg30m > 0.0);
        // Small-angle sanity bound from the mid-angle approximation.
        let expected_tvd = 30.0 * 2.5f64.to_radians().cos();
        assert!((step.position.tvd_m - expected_tvd).abs() < 0.05);
    }
}
