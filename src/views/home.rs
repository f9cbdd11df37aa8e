//! Landing page.

use crate::views::{View, ViewId, ViewMountError};

const LINKS: [(&str, &str); 3] = [
    ("/upload", "上传录音"),
    ("/test", "LLM审核答疑测试"),
    ("/edit/<object_name>", "编辑报告"),
];

#[derive(Debug, Default)]
pub struct HomeView;

impl HomeView {
    pub fn new() -> Self {
        Self
    }
}

impl View for HomeView {
    fn id(&self) -> ViewId {
        ViewId::Home
    }

    fn render(&self) -> Result<String, ViewMountError> {
        let mut out = String::from("主页\n\n可用页面:\n");
        for (path, label) in LINKS {
            out.push_str(&format!("  {:<22}{}\n", path, label));
        }
        Ok(out)
    }
}
