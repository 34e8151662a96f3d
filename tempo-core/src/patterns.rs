//! Time-of-day and day-of-week completion patterns.

use serde::{Deserialize, Serialize};

use crate::analytics::AnalyticsConfig;
use crate::task::Task;
use crate::time::{hour_label, local_hour, weekday_index, WEEKDAY_NAMES};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeakBucket {
    pub index: usize,
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayPeriod {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl DayPeriod {
    /// Morning 6-12, afternoon 12-18, evening 18-22, night 22-6.
    pub fn from_hour(hour: usize) -> Self {
        match hour {
            6..=11 => DayPeriod::Morning,
            12..=17 => DayPeriod::Afternoon,
            18..=21 => DayPeriod::Evening,
            _ => DayPeriod::Night,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DayPeriod::Morning => "morning",
            DayPeriod::Afternoon => "afternoon",
            DayPeriod::Evening => "evening",
            DayPeriod::Night => "night",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeOfDayBreakdown {
    pub morning: usize,
    pub afternoon: usize,
    pub evening: usize,
    pub night: usize,
}

impl TimeOfDayBreakdown {
    pub fn from_hourly(hourly: &[usize]) -> Self {
        let mut out = Self::default();
        for (hour, &count) in hourly.iter().enumerate() {
            match DayPeriod::from_hour(hour) {
                DayPeriod::Morning => out.morning += count,
                DayPeriod::Afternoon => out.afternoon += count,
                DayPeriod::Evening => out.evening += count,
                DayPeriod::Night => out.night += count,
            }
        }
        out
    }

    /// Busiest period; ties go to the earlier period of the day.
    pub fn peak(&self) -> Option<DayPeriod> {
        let ordered = [
            (DayPeriod::Morning, self.morning),
            (DayPeriod::Afternoon, self.afternoon),
            (DayPeriod::Evening, self.evening),
            (DayPeriod::Night, self.night),
        ];
        let counts: Vec<usize> = ordered.iter().map(|(_, c)| *c).collect();
        peak_index(&counts).map(|i| ordered[i].0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimePatterns {
    /// Completions per local hour, 0-23.
    pub hourly: Vec<usize>,
    /// Completions per weekday, Sunday first.
    pub daily: Vec<usize>,
    pub most_productive_hour: Option<PeakBucket>,
    pub most_productive_day: Option<PeakBucket>,
    pub time_of_day: TimeOfDayBreakdown,
    pub peak_period: Option<DayPeriod>,
    pub interpretation: String,
}

pub fn time_patterns(tasks: &[Task], config: &AnalyticsConfig) -> TimePatterns {
    let tz = config.timezone;
    let mut hourly = vec![0usize; 24];
    let mut daily = vec![0usize; 7];

    for t in tasks.iter().filter(|t| t.completed) {
        let Some(done) = t.completed_at else { continue };
        hourly[local_hour(done, tz)] += 1;
        daily[weekday_index(done, tz)] += 1;
    }

    let most_productive_hour = peak_index(&hourly).map(|i| PeakBucket {
        index: i,
        label: hour_label(i),
        count: hourly[i],
    });
    let most_productive_day = peak_index(&daily).map(|i| PeakBucket {
        index: i,
        label: WEEKDAY_NAMES[i].to_string(),
        count: daily[i],
    });
    let time_of_day = TimeOfDayBreakdown::from_hourly(&hourly);
    let peak_period = time_of_day.peak();

    let interpretation = match (&most_productive_hour, &most_productive_day, peak_period) {
        (Some(h), Some(d), Some(p)) => format!(
            "You get the most done around {} and on {}s. Your {} hours are your strongest; schedule demanding work there.",
            h.label,
            d.label,
            p.label()
        ),
        _ => "Not enough completed tasks yet to find your productive hours.".to_string(),
    };

    TimePatterns {
        hourly,
        daily,
        most_productive_hour,
        most_productive_day,
        time_of_day,
        peak_period,
        interpretation,
    }
}

/// Index of the largest non-zero bucket; ties go to the lowest index.
pub fn peak_index(counts: &[usize]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, &c) in counts.iter().enumerate() {
        if c == 0 {
            continue;
        }
        match best {
            Some(b) if counts[b] >= c => {}
            _ => best = Some(i),
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peak_prefers_earliest_on_tie() {
        assert_eq!(peak_index(&[0, 2, 5, 5, 1]), Some(2));
        assert_eq!(peak_index(&[0, 0, 0]), None);
        assert_eq!(peak_index(&[]), None);
    }

    #[test]
    fn day_period_boundaries() {
        assert_eq!(DayPeriod::from_hour(5), DayPeriod::Night);
        assert_eq!(DayPeriod::from_hour(6), DayPeriod::Morning);
        assert_eq!(DayPeriod::from_hour(12), DayPeriod::Afternoon);
        assert_eq!(DayPeriod::from_hour(18), DayPeriod::Evening);
        assert_eq!(DayPeriod::from_hour(22), DayPeriod::Night);
        assert_eq!(DayPeriod::from_hour(23), DayPeriod::Night);
    }

    #[test]
    fn breakdown_sums_hourly_histogram() {
        let mut hourly = vec![0usize; 24];
        hourly[7] = 2;
        hourly[13] = 1;
        hourly[20] = 4;
        hourly[2] = 1;
        let b = TimeOfDayBreakdown::from_hourly(&hourly);
        assert_eq!(b, TimeOfDayBreakdown { morning: 2, afternoon: 1, evening: 4, night: 1 });
        assert_eq!(b.peak(), Some(DayPeriod::Evening));
    }

    #[test]
    fn no_completions_means_no_peaks() {
        let p = time_patterns(&[], &AnalyticsConfig::default());
        assert!(p.most_productive_hour.is_none());
        assert!(p.most_productive_day.is_none());
        assert!(p.peak_period.is_none());
        assert_eq!(p.hourly.len(), 24);
        assert_eq!(p.daily.len(), 7);
    }
}
