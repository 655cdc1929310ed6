//! CO attainment scoring and cohort classification.
//!
//! Each component's raw mark becomes a percentage of the component's row
//! total, and that percentage is spread over the COs in proportion to the
//! component's weights:
//!
//! attainment\[co\] += percentage_scored * weight\[component\]\[co\] / 100
//!
//! The cohort summary compares every student against a target of 75% of the
//! CO's total possible attainment and classifies the share of students above
//! it into a level from 0 to 3.

use serde::{Deserialize, Serialize};

use crate::model::{CoVector, CourseOutcome, MarkMatrix, ParsedMark, WeightTable};

/// Target ratio and level cut-offs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttainmentPolicy {
    /// Fraction of the total possible attainment a student must exceed.
    #[serde(default = "default_target_ratio")]
    pub target_ratio: f64,
    /// Minimum percent of students above target for level 3.
    #[serde(default = "default_level_3")]
    pub level_3_min_percent: f64,
    /// Minimum percent of students above target for level 2.
    #[serde(default = "default_level_2")]
    pub level_2_min_percent: f64,
    /// Minimum percent of students above target for level 1.
    #[serde(default = "default_level_1")]
    pub level_1_min_percent: f64,
}

fn default_target_ratio() -> f64 {
    0.75
}
fn default_level_3() -> f64 {
    80.0
}
fn default_level_2() -> f64 {
    70.0
}
fn default_level_1() -> f64 {
    60.0
}

impl Default for AttainmentPolicy {
    fn default() -> Self {
        Self {
            target_ratio: default_target_ratio(),
            level_3_min_percent: default_level_3(),
            level_2_min_percent: default_level_2(),
            level_1_min_percent: default_level_1(),
        }
    }
}

impl AttainmentPolicy {
    /// Classify a percent-above-target value.
    pub fn classify(&self, percent_above_target: f64) -> AttainmentLevel {
        if percent_above_target >= self.level_3_min_percent {
            AttainmentLevel::Three
        } else if percent_above_target >= self.level_2_min_percent {
            AttainmentLevel::Two
        } else if percent_above_target >= self.level_1_min_percent {
            AttainmentLevel::One
        } else {
            AttainmentLevel::Zero
        }
    }

    /// Legend text describing the level cut-offs.
    pub fn legend(&self) -> String {
        format!(
            "%>={l3} -- 3   {l2}<=%<{l3} -- 2   {l1}<=%<{l2} -- 1   %<{l1} -- 0",
            l3 = self.level_3_min_percent,
            l2 = self.level_2_min_percent,
            l1 = self.level_1_min_percent,
        )
    }
}

/// Discrete cohort attainment level for one CO.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum AttainmentLevel {
    Zero,
    One,
    Two,
    Three,
}

impl AttainmentLevel {
    pub fn value(self) -> u8 {
        self as u8
    }
}

impl From<AttainmentLevel> for u8 {
    fn from(level: AttainmentLevel) -> u8 {
        level.value()
    }
}

impl TryFrom<u8> for AttainmentLevel {
    type Error = String;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(AttainmentLevel::Zero),
            1 => Ok(AttainmentLevel::One),
            2 => Ok(AttainmentLevel::Two),
            3 => Ok(AttainmentLevel::Three),
            other => Err(format!("attainment level out of range: {other}")),
        }
    }
}

impl std::fmt::Display for AttainmentLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// One student's accumulated attainment per CO.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentAttainment {
    pub student: String,
    pub attainment: CoVector,
}

/// Cohort figures for a single CO.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoSummary {
    pub co: CourseOutcome,
    /// Sum of this CO's weights over all components.
    pub total_possible: f64,
    pub target: f64,
    /// Students whose attainment is strictly above the target.
    pub count_above_target: usize,
    pub percent_above_target: f64,
    pub level: AttainmentLevel,
}

/// Cohort figures for all six COs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortSummary {
    pub student_count: usize,
    pub per_co: Vec<CoSummary>,
    /// Arithmetic mean of the six levels.
    pub average_level: f64,
}

impl CohortSummary {
    pub fn get(&self, co: CourseOutcome) -> Option<&CoSummary> {
        self.per_co.iter().find(|s| s.co == co)
    }
}

/// Full output of the attainment engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttainmentOutcome {
    pub students: Vec<StudentAttainment>,
    pub cohort: CohortSummary,
}

/// Percentage of the component's maximum mark a student scored.
///
/// Unparseable marks, non-positive row totals, and results that overflow
/// score 0.
pub fn percentage_scored(mark: ParsedMark, row_total: f64) -> f64 {
    match mark {
        ParsedMark::Value(value) if row_total > 0.0 => {
            let pct = value / row_total * 100.0;
            if pct.is_finite() {
                pct
            } else {
                tracing::debug!("mark {value} overflows against row total {row_total}; scoring 0");
                0.0
            }
        }
        _ => 0.0,
    }
}

/// Accumulate per-student attainment across every component that appears in
/// both the mark matrix and the weight table.
pub fn compute_student_attainment(
    matrix: &MarkMatrix,
    weights: &WeightTable,
) -> Vec<StudentAttainment> {
    let columns: Vec<_> = matrix
        .components()
        .iter()
        .enumerate()
        .filter_map(|(col, name)| match weights.get(name) {
            Some(row) => Some((col, row)),
            None => {
                tracing::warn!("component '{name}' has no weight row; it does not count");
                None
            }
        })
        .collect();

    matrix
        .rows()
        .map(|(student, marks)| {
            let mut attainment = CoVector::zero();
            for &(col, row) in &columns {
                let pct = marks
                    .get(col)
                    .map_or(0.0, |mark| percentage_scored(mark.parse(), row.row_total()));
                for co in CourseOutcome::ALL {
                    let contribution = pct * row.weights[co] / 100.0;
                    if contribution.is_finite() {
                        attainment[co] += contribution;
                    }
                }
            }
            StudentAttainment {
                student: student.to_string(),
                attainment,
            }
        })
        .collect()
}

/// Totals, targets, counts above target and levels per CO.
pub fn summarize_cohort(
    students: &[StudentAttainment],
    weights: &WeightTable,
    policy: &AttainmentPolicy,
) -> CohortSummary {
    let total_possible = weights.column_totals();
    let student_count = students.len();

    let per_co: Vec<CoSummary> = CourseOutcome::ALL
        .iter()
        .map(|&co| {
            let target = policy.target_ratio * total_possible[co];
            let count_above_target = students
                .iter()
                .filter(|s| s.attainment[co] > target)
                .count();
            let percent_above_target = if student_count == 0 {
                0.0
            } else {
                count_above_target as f64 / student_count as f64 * 100.0
            };
            CoSummary {
                co,
                total_possible: total_possible[co],
                target,
                count_above_target,
                percent_above_target,
                level: policy.classify(percent_above_target),
            }
        })
        .collect();

    let average_level =
        per_co.iter().map(|s| s.level.value() as f64).sum::<f64>() / per_co.len() as f64;

    CohortSummary {
        student_count,
        per_co,
        average_level,
    }
}

/// Run the attainment engine over a mark matrix.
pub fn compute_attainment(
    matrix: &MarkMatrix,
    weights: &WeightTable,
    policy: &AttainmentPolicy,
) -> AttainmentOutcome {
    let students = compute_student_attainment(matrix, weights);
    let cohort = summarize_cohort(&students, weights, policy);
    AttainmentOutcome { students, cohort }
}
