//! The 委托表 (report form) text layout.
//!
//! A form is a disclaimer line followed by `label：value` lines. The
//! reviewer reads it as free text, so rendering is the only contract.

use serde::{Deserialize, Serialize};

/// Disclaimer sentence the reviewer looks for.
pub const DISCLAIMER: &str = "本人承诺下列信息均为本人自愿自主提供，且确保信息真实";

/// Field labels in display order.
pub const FIELD_LABELS: [&str; 13] = [
    "委托截止时间",
    "互助截止时间",
    "学校名称",
    "学校性质",
    "学校地址",
    "补课年级",
    "补课时间",
    "电话举报",
    "网信举报",
    "收费情况",
    "违规行为",
    "诉求",
    "补充",
];

/// A filled or blank report form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportForm {
    pub include_disclaimer: bool,
    pub fields: Vec<(String, String)>,
}

impl ReportForm {
    /// Blank form with every standard label.
    pub fn template() -> Self {
        Self {
            include_disclaimer: true,
            fields: FIELD_LABELS
                .iter()
                .map(|label| (label.to_string(), String::new()))
                .collect(),
        }
    }

    /// Set a field, appending it when the label is not part of the form.
    pub fn set(&mut self, label: &str, value: impl Into<String>) {
        let value = value.into();
        match self.fields.iter_mut().find(|(l, _)| l == label) {
            Some((_, v)) => *v = value,
            None => self.fields.push((label.to_string(), value)),
        }
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, v)| v.as_str())
    }

    /// Parse `label：value` lines (full-width or ASCII colon).
    pub fn parse(text: &str) -> Self {
        let mut form = Self {
            include_disclaimer: text.contains(DISCLAIMER),
            fields: Vec::new(),
        };
        for line in text.lines() {
            let split = line.split_once('：').or_else(|| line.split_once(':'));
            if let Some((label, value)) = split {
                let label = label.trim();
                if !label.is_empty() {
                    form.set(label, value.trim());
                }
            }
        }
        form
    }

    /// Text submitted to the reviewer.
    pub fn render(&self) -> String {
        let mut out = String::new();
        if self.include_disclaimer {
            out.push_str(DISCLAIMER);
            out.push('\n');
        }
        for (label, value) in &self.fields {
            out.push_str(label);
            out.push('：');
            out.push_str(value);
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_renders_all_labels() {
        let text = ReportForm::template().render();
        assert!(text.starts_with(DISCLAIMER));
        for label in FIELD_LABELS {
            assert!(text.contains(&format!("{}：", label)));
        }
    }

    #[test]
    fn test_parse_filled_form() {
        let form = ReportForm::parse(
            "学校名称：安徽省亳州市第二中学\n补课年级: 高二\n电话举报：亳州市长热线055812345\n",
        );
        assert!(!form.include_disclaimer);
        assert_eq!(form.get("学校名称"), Some("安徽省亳州市第二中学"));
        assert_eq!(form.get("补课年级"), Some("高二"));
        assert_eq!(form.get("电话举报"), Some("亳州市长热线055812345"));
    }
}
