//! Review playground: paste a 委托表 and see the reviewer's verdict.

use crate::review::form::ReportForm;
use crate::review::verdict::VERDICT_KEYS;
use crate::views::{View, ViewId, ViewMountError};

#[derive(Debug, Default)]
pub struct TestView {
    review_model: Option<String>,
}

impl TestView {
    pub fn new(review_model: Option<String>) -> Self {
        Self { review_model }
    }
}

impl View for TestView {
    fn id(&self) -> ViewId {
        ViewId::Test
    }

    fn render(&self) -> Result<String, ViewMountError> {
        let mut out = String::from("LLM审核答疑测试\n\n");
        if let Some(model) = &self.review_model {
            out.push_str(&format!("审核模型: {}\n", model));
        }
        out.push_str(&format!("审核项: {}\n\n", VERDICT_KEYS.join("、")));
        out.push_str(&ReportForm::template().render());
        Ok(out)
    }
}
