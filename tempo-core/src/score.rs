//! Weighted productivity score and letter grade.
//!
//! `P = 0.30*completion + 0.25*on_time + 0.20*focus + 0.25*anti_procrastination`
//!
//! Every component is normalized to 0-100 on its own before weighting, so the
//! result is always a finite 0-100 value, including for an empty snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::analytics::{pct, AnalyticsConfig};
use crate::completion::{completion_metrics, CompletionMetrics};
use crate::focus::{focus_analysis, FocusAnalysis};
use crate::task::Task;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreWeights {
    pub completion: f64,
    pub on_time: f64,
    pub focus: f64,
    pub anti_procrastination: f64,
}

impl ScoreWeights {
    /// The only weighting the engine uses.
    pub const STANDARD: ScoreWeights = ScoreWeights {
        completion: 0.30,
        on_time: 0.25,
        focus: 0.20,
        anti_procrastination: 0.25,
    };

    pub fn sum(&self) -> f64 {
        self.completion + self.on_time + self.focus + self.anti_procrastination
    }
}

/// Letter grade. Variants are declared worst-first so `Ord` follows quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    F,
    D,
    C,
    B,
    A,
}

impl Grade {
    pub fn from_score(score: u8) -> Self {
        match score {
            90..=u8::MAX => Grade::A,
            75..=89 => Grade::B,
            60..=74 => Grade::C,
            40..=59 => Grade::D,
            _ => Grade::F,
        }
    }

    pub fn summary(&self) -> &'static str {
        match self {
            Grade::A => "Outstanding productivity. Keep the momentum going.",
            Grade::B => "Strong productivity with a little room to tighten deadlines or focus.",
            Grade::C => "Steady productivity. Closing overdue tasks would lift your score the most.",
            Grade::D => "Productivity is slipping. Pick a few small tasks and finish them today.",
            Grade::F => "Very few tasks are getting done. Start with one tiny, concrete task.",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreComponents {
    pub completion: f64,
    pub on_time: f64,
    pub focus: f64,
    pub anti_procrastination: f64,
}

impl ScoreComponents {
    pub fn weighted(&self, w: &ScoreWeights) -> f64 {
        w.completion * self.completion
            + w.on_time * self.on_time
            + w.focus * self.focus
            + w.anti_procrastination * self.anti_procrastination
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductivityScore {
    pub score: u8,
    pub grade: Grade,
    pub on_time_rate: f64,
    pub components: ScoreComponents,
    pub weights: ScoreWeights,
    pub interpretation: String,
}

/// Share of completed, dated tasks finished on or before their due date.
/// 100 when there is no such task: nothing could have been late.
pub fn on_time_rate(tasks: &[Task]) -> f64 {
    let mut dated = 0;
    let mut on_time = 0;
    for t in tasks.iter().filter(|t| t.completed) {
        let (Some(due), Some(done)) = (t.due_date, t.completed_at) else {
            continue;
        };
        dated += 1;
        if done <= due {
            on_time += 1;
        }
    }
    if dated == 0 { 100.0 } else { pct(on_time, dated) }
}

/// Round a raw 0-100 value to the integer score.
pub fn round_score(raw: f64) -> u8 {
    if !raw.is_finite() {
        return 0;
    }
    raw.clamp(0.0, 100.0).round() as u8
}

/// Score from already-computed completion and focus sections.
pub fn combine_score(tasks: &[Task], completion: &CompletionMetrics, focus: &FocusAnalysis) -> ProductivityScore {
    let on_time = on_time_rate(tasks);
    let components = ScoreComponents {
        completion: completion.completion_rate,
        on_time,
        focus: focus.focus_score,
        anti_procrastination: (100.0 - completion.overdue_percentage).clamp(0.0, 100.0),
    };
    let weights = ScoreWeights::STANDARD;
    let score = round_score(components.weighted(&weights));
    let grade = Grade::from_score(score);

    ProductivityScore {
        score,
        grade,
        on_time_rate: on_time,
        components,
        weights,
        interpretation: interpret(score, grade, &components),
    }
}

pub fn productivity_score(tasks: &[Task], now: DateTime<Utc>, config: &AnalyticsConfig) -> ProductivityScore {
    let completion = completion_metrics(tasks, now, config);
    let focus = focus_analysis(tasks, now, config);
    combine_score(tasks, &completion, &focus)
}

fn interpret(score: u8, grade: Grade, c: &ScoreComponents) -> String {
    let weakest = [
        ("completing tasks", c.completion),
        ("meeting deadlines", c.on_time),
        ("staying focused on one area", c.focus),
        ("keeping on top of overdue work", c.anti_procrastination),
    ]
    .into_iter()
    .fold(None::<(&str, f64)>, |acc, (name, v)| match acc {
        Some((_, best)) if best <= v => acc,
        _ => Some((name, v)),
    });

    let mut s = format!("Productivity score {score}/100 (grade {grade}). {}", grade.summary());
    if let Some((name, v)) = weakest {
        if v < 100.0 {
            s.push_str(&format!(" Biggest opportunity: {name} ({v:.0}/100)."));
        }
    }
    s
}
