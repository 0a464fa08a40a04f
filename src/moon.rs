use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;

const LUNAR_CYCLE_DAYS: f64 = 29.530588853;
const MS_PER_DAY: f64 = 86_400_000.0;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum MoonPhase {
    NewMoon,
    WaxingCrescent,
    FirstQuarter,
    WaxingGibbous,
    FullMoon,
    WaningGibbous,
    LastQuarter,
    WaningCrescent,
}

impl MoonPhase {
    pub fn name(&self) -> &'static str {
        match self {
            MoonPhase::NewMoon => "New Moon",
            MoonPhase::WaxingCrescent => "Waxing Crescent",
            MoonPhase::FirstQuarter => "First Quarter",
            MoonPhase::WaxingGibbous => "Waxing Gibbous",
            MoonPhase::FullMoon => "Full Moon",
            MoonPhase::WaningGibbous => "Waning Gibbous",
            MoonPhase::LastQuarter => "Last Quarter",
            MoonPhase::WaningCrescent => "Waning Crescent",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            MoonPhase::NewMoon => "🌑",
            MoonPhase::WaxingCrescent => "🌒",
            MoonPhase::FirstQuarter => "🌓",
            MoonPhase::WaxingGibbous => "🌔",
            MoonPhase::FullMoon => "🌕",
            MoonPhase::WaningGibbous => "🌖",
            MoonPhase::LastQuarter => "🌗",
            MoonPhase::WaningCrescent => "🌘",
        }
    }

    pub fn at(date: DateTime<Utc>) -> Self {
        Self::from_fraction(cycle_fraction(date))
    }

    /// Map a position in the cycle (0 = new, 0.5 = full) to a phase.
    pub fn from_fraction(phase: f64) -> Self {
        if !(0.03..=0.97).contains(&phase) {
            MoonPhase::NewMoon
        } else if phase < 0.23 {
            MoonPhase::WaxingCrescent
        } else if phase < 0.27 {
            MoonPhase::FirstQuarter
        } else if phase < 0.48 {
            MoonPhase::WaxingGibbous
        } else if phase < 0.52 {
            MoonPhase::FullMoon
        } else if phase < 0.73 {
            MoonPhase::WaningGibbous
        } else if phase < 0.77 {
            MoonPhase::LastQuarter
        } else {
            MoonPhase::WaningCrescent
        }
    }
}

/// Reference new moon: 2023-01-21 20:53 UTC.
fn reference_new_moon() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 1, 21, 20, 53, 0)
        .single()
        .unwrap_or_default()
}

/// Fraction of the lunar cycle elapsed at `date`, in `[0, 1)`.
pub fn cycle_fraction(date: DateTime<Utc>) -> f64 {
    let elapsed_ms = (date - reference_new_moon()).num_milliseconds() as f64;
    let days = elapsed_ms / MS_PER_DAY;
    days.rem_euclid(LUNAR_CYCLE_DAYS) / LUNAR_CYCLE_DAYS
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn reference_date_is_new_moon() {
        assert_eq!(MoonPhase::at(reference_new_moon()), MoonPhase::NewMoon);
    }

    #[test]
    fn half_a_cycle_later_is_full_moon() {
        let half = Duration::milliseconds((LUNAR_CYCLE_DAYS / 2.0 * MS_PER_DAY) as i64);
        assert_eq!(MoonPhase::at(reference_new_moon() + half), MoonPhase::FullMoon);
    }

    #[test]
    fn dates_before_reference_wrap_around() {
        let three_days = Duration::days(3);
        let fraction = cycle_fraction(reference_new_moon() - three_days);
        assert!((0.85..0.95).contains(&fraction), "{fraction}");
        assert_eq!(
            MoonPhase::at(reference_new_moon() - three_days),
            MoonPhase::WaningCrescent
        );
    }

    #[test]
    fn phase_boundaries() {
        assert_eq!(MoonPhase::from_fraction(0.02), MoonPhase::NewMoon);
        assert_eq!(MoonPhase::from_fraction(0.98), MoonPhase::NewMoon);
        assert_eq!(MoonPhase::from_fraction(0.10), MoonPhase::WaxingCrescent);
        assert_eq!(MoonPhase::from_fraction(0.25), MoonPhase::FirstQuarter);
        assert_eq!(MoonPhase::from_fraction(0.40), MoonPhase::WaxingGibbous);
        assert_eq!(MoonPhase::from_fraction(0.50), MoonPhase::FullMoon);
        assert_eq!(MoonPhase::from_fraction(0.60), MoonPhase::WaningGibbous);
        assert_eq!(MoonPhase::from_fraction(0.75), MoonPhase::LastQuarter);
        assert_eq!(MoonPhase::from_fraction(0.90), MoonPhase::WaningCrescent);
    }
}
