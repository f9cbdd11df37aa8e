//! Recording upload page.
//!
//! Accepts an optional `object_name` query value naming a recording that was
//! already uploaded; the page then links straight to its report editor.

use crate::views::{View, ViewContext, ViewId, ViewMountError};

/// Audio formats the upload endpoint stores.
pub const ACCEPTED_FORMATS: [&str; 4] = ["mp3", "wav", "ogg", "aac"];

#[derive(Debug, Default)]
pub struct UploadView {
    object_name: Option<String>,
}

impl UploadView {
    pub fn from_context(context: &ViewContext) -> Self {
        Self {
            object_name: context
                .query_value("object_name")
                .filter(|v| !v.is_empty())
                .map(str::to_string),
        }
    }

    pub fn object_name(&self) -> Option<&str> {
        self.object_name.as_deref()
    }
}

impl View for UploadView {
    fn id(&self) -> ViewId {
        ViewId::Upload
    }

    fn render(&self) -> Result<String, ViewMountError> {
        let mut out = String::from("上传录音\n\n");
        out.push_str(&format!("支持格式: {}\n", ACCEPTED_FORMATS.join(", ")));
        match &self.object_name {
            Some(name) => out.push_str(&format!("已上传: {}\n继续: /edit/{}\n", name, name)),
            None => out.push_str("尚未选择录音文件\n"),
        }
        Ok(out)
    }
}
