//! Threshold classification.
//!
//! A pure function of (rollup, thresholds). Each flag is computed from
//! its own metric, so a group can trip several overload alerts at once
//! and, for mixed horizons, be idle and overloaded at the same time.

use crate::models::{AlertFlag, ClassifiedRollup, GroupRollup, IdleCriterion, Thresholds};

/// Classify one rollup against the configured limits.
pub fn classify(rollup: GroupRollup, thresholds: &Thresholds) -> ClassifiedRollup {
    let alert_daily = AlertFlag::when(
        rollup.daily_avg > thresholds.limit_daily,
        format!("Above daily limit ({}h)", thresholds.limit_daily),
    );
    let alert_weekly = AlertFlag::when(
        rollup.weekly_hours > thresholds.limit_weekly,
        format!("Above weekly limit ({}h)", thresholds.limit_weekly),
    );
    let alert_monthly = AlertFlag::when(
        rollup.monthly_hours > thresholds.limit_monthly,
        format!("Above monthly limit ({}h)", thresholds.limit_monthly),
    );
    let alert_annual = AlertFlag::when(
        rollup.annual_hours > thresholds.limit_annual,
        format!("Above annual limit ({}h)", thresholds.limit_annual),
    );

    let idle_hours = match thresholds.idle_criterion {
        IdleCriterion::Monthly => rollup.monthly_hours,
        IdleCriterion::Weekly => rollup.weekly_hours,
    };
    let idle = AlertFlag::when(
        idle_hours < thresholds.idle_limit() * thresholds.idle_fraction,
        format!(
            "Below {:.0}% of the {} limit",
            thresholds.idle_fraction * 100.0,
            thresholds.idle_criterion
        ),
    );

    let headroom_hours = thresholds.limit_monthly - rollup.monthly_hours;
    let monthly_load_ratio = rollup.monthly_hours / thresholds.limit_monthly;

    ClassifiedRollup {
        rollup,
        alert_daily,
        alert_weekly,
        alert_monthly,
        alert_annual,
        idle,
        headroom_hours,
        monthly_load_ratio,
    }
}

/// Classify every rollup, preserving order.
pub fn classify_all(rollups: Vec<GroupRollup>, thresholds: &Thresholds) -> Vec<ClassifiedRollup> {
    rollups
        .into_iter()
        .map(|r| classify(r, thresholds))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn with_monthly(monthly_hours: f64) -> GroupRollup {
        let weekly_hours = monthly_hours / 4.0;
        GroupRollup {
            group: "G".to_string(),
            weekly_hours,
            monthly_hours,
            annual_hours: monthly_hours * 12.0,
            task_count: 1,
            daily_avg: weekly_hours / 5.0,
        }
    }

    #[test]
    fn test_monthly_alert_flips_with_limit() {
        let mut t = Thresholds {
            limit_monthly: 176.0,
            ..Thresholds::default()
        };
        let c = classify(with_monthly(200.0), &t);
        assert!(c.alert_monthly.active);
        assert!(c.alert_monthly.message.is_some());

        t.limit_monthly = 250.0;
        let c = classify(with_monthly(200.0), &t);
        assert!(!c.alert_monthly.active);
        assert!(c.alert_monthly.message.is_none());
    }

    #[test]
    fn test_idle_monthly_scenario() {
        let t = Thresholds {
            limit_monthly: 176.0,
            idle_criterion: IdleCriterion::Monthly,
            idle_fraction: 0.8,
            ..Thresholds::default()
        };
        let c = classify(with_monthly(100.0), &t);
        assert!(c.idle.active);
        assert_eq!(c.idle.message.as_deref(), Some("Below 80% of the monthly limit"));

        let c = classify(with_monthly(150.0), &t);
        assert!(!c.idle.active);
    }

    #[test]
    fn test_idle_weekly_criterion() {
        let t = Thresholds {
            limit_weekly: 44.0,
            idle_criterion: IdleCriterion::Weekly,
            idle_fraction: 0.5,
            ..Thresholds::default()
        };
        // weekly = 84 / 4 = 21 < 22
        assert!(classify(with_monthly(84.0), &t).idle.active);
        // weekly = 22, not strictly below
        assert!(!classify(with_monthly(88.0), &t).idle.active);
    }

    #[test]
    fn test_alerts_are_independent() {
        let t = Thresholds {
            limit_daily: 1.0,
            limit_weekly: 1000.0,
            limit_monthly: 1.0,
            limit_annual: 100_000.0,
            ..Thresholds::default()
        };
        let c = classify(with_monthly(40.0), &t);
        assert!(c.alert_daily.active);
        assert!(!c.alert_weekly.active);
        assert!(c.alert_monthly.active);
        assert!(!c.alert_annual.active);
        assert!(c.any_alert());
    }

    #[test]
    fn test_idle_and_overload_can_coexist() {
        // monthly below 0.8 * 1000 while weekly above 10
        let t = Thresholds {
            limit_weekly: 10.0,
            limit_monthly: 1000.0,
            idle_criterion: IdleCriterion::Monthly,
            idle_fraction: 0.8,
            ..Thresholds::default()
        };
        let c = classify(with_monthly(100.0), &t);
        assert!(c.idle.active);
        assert!(c.alert_weekly.active);
    }

    #[test]
    fn test_zero_rollup_is_idle_and_has_full_headroom() {
        let c = classify(GroupRollup::empty("X"), &Thresholds::default());
        assert!(c.idle.active);
        assert!(!c.any_alert());
        assert_eq!(c.headroom_hours, 176.0);
        assert_eq!(c.monthly_load_ratio, 0.0);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn prop_raising_monthly_limit_never_raises_alert(
            monthly in 0.0f64..1000.0,
            low in 1.0f64..500.0,
            bump in 0.0f64..500.0,
        ) {
            let r = with_monthly(monthly);
            let before = classify(r.clone(), &Thresholds { limit_monthly: low, ..Thresholds::default() });
            let after = classify(r, &Thresholds { limit_monthly: low + bump, ..Thresholds::default() });
            prop_assert!(!after.alert_monthly.active || before.alert_monthly.active);
        }

        #[test]
        fn prop_classification_is_deterministic(monthly in 0.0f64..1000.0) {
            let t = Thresholds::default();
            prop_assert_eq!(classify(with_monthly(monthly), &t), classify(with_monthly(monthly), &t));
        }
    }
}
