//! Report editor for one uploaded recording.

use crate::review::form::ReportForm;
use crate::views::{View, ViewContext, ViewId, ViewMountError};

/// Route parameter naming the recording being reported.
pub const OBJECT_NAME: &str = "object_name";

#[derive(Debug)]
pub struct EditReportView {
    object_name: String,
    form: ReportForm,
}

impl EditReportView {
    pub fn new(object_name: impl Into<String>) -> Self {
        Self {
            object_name: object_name.into(),
            form: ReportForm::template(),
        }
    }

    /// Build from forwarded route parameters; the object name is required.
    pub fn from_context(context: &ViewContext) -> Result<Self, ViewMountError> {
        context
            .param(OBJECT_NAME)
            .filter(|name| !name.is_empty())
            .map(Self::new)
            .ok_or_else(|| ViewMountError::new(ViewId::EditReport, "missing object_name parameter"))
    }

    pub fn object_name(&self) -> &str {
        &self.object_name
    }
}

impl View for EditReportView {
    fn id(&self) -> ViewId {
        ViewId::EditReport
    }

    fn render(&self) -> Result<String, ViewMountError> {
        Ok(format!(
            "编辑报告\n录音: {}\n\n{}",
            self.object_name,
            self.form.render()
        ))
    }
}
