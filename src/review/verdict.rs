//! Reviewer verdicts.
//!
//! A verdict has exactly one entry per form section. Each value is the
//! literal `合法` when the section passes, otherwise free text explaining the
//! problem and suggesting a correction.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Value marking a passing section.
pub const PASS: &str = "合法";

/// Verdict keys in the order the reviewer emits them.
pub const VERDICT_KEYS: [&str; 7] = [
    "委托表",
    "免责声明",
    "补课年级",
    "补课时间",
    "举报途径",
    "收费情况",
    "违规行为",
];

/// Outcome for one section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldVerdict {
    Pass,
    /// Explanation plus suggested correction.
    Fail(String),
}

impl FieldVerdict {
    pub fn is_pass(&self) -> bool {
        matches!(self, FieldVerdict::Pass)
    }
}

impl From<String> for FieldVerdict {
    fn from(value: String) -> Self {
        if value.trim() == PASS {
            FieldVerdict::Pass
        } else {
            FieldVerdict::Fail(value)
        }
    }
}

impl From<FieldVerdict> for String {
    fn from(value: FieldVerdict) -> Self {
        match value {
            FieldVerdict::Pass => PASS.to_string(),
            FieldVerdict::Fail(reason) => reason,
        }
    }
}

impl fmt::Display for FieldVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldVerdict::Pass => f.write_str(PASS),
            FieldVerdict::Fail(reason) => f.write_str(reason),
        }
    }
}

/// Structured review result keyed by form section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    #[serde(rename = "委托表")]
    pub form: FieldVerdict,
    #[serde(rename = "免责声明")]
    pub disclaimer: FieldVerdict,
    #[serde(rename = "补课年级")]
    pub grade: FieldVerdict,
    #[serde(rename = "补课时间")]
    pub schedule: FieldVerdict,
    #[serde(rename = "举报途径")]
    pub channel: FieldVerdict,
    #[serde(rename = "收费情况")]
    pub fees: FieldVerdict,
    #[serde(rename = "违规行为")]
    pub violation: FieldVerdict,
}

impl Verdict {
    /// Sections paired with their keys, in `VERDICT_KEYS` order.
    pub fn entries(&self) -> [(&'static str, &FieldVerdict); 7] {
        [
            (VERDICT_KEYS[0], &self.form),
            (VERDICT_KEYS[1], &self.disclaimer),
            (VERDICT_KEYS[2], &self.grade),
            (VERDICT_KEYS[3], &self.schedule),
            (VERDICT_KEYS[4], &self.channel),
            (VERDICT_KEYS[5], &self.fees),
            (VERDICT_KEYS[6], &self.violation),
        ]
    }

    pub fn is_pass(&self) -> bool {
        self.entries().iter().all(|(_, v)| v.is_pass())
    }

    /// Failing sections with their explanations.
    pub fn failures(&self) -> Vec<(&'static str, &str)> {
        self.entries()
            .into_iter()
            .filter_map(|(key, v)| match v {
                FieldVerdict::Fail(reason) => Some((key, reason.as_str())),
                FieldVerdict::Pass => None,
            })
            .collect()
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in self.entries() {
            writeln!(f, "{}: {}", key, value)?;
        }
        Ok(())
    }
}
