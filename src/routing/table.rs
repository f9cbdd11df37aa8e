//! Production route table.

use crate::routing::registry::{RegistryError, ViewRegistry};
use crate::views::ViewId;

/// Builds the application's routes; unmatched paths land on the upload view.
pub fn production() -> Result<ViewRegistry, RegistryError> {
    let mut registry = ViewRegistry::new(ViewId::Upload);
    registry
        .register("/", ViewId::Home, Some("主页"), false)?
        .register("/edit/:object_name", ViewId::EditReport, Some("编辑报告"), true)?
        .register("/test", ViewId::Test, Some("LLM审核答疑测试"), false)?
        .register("/upload", ViewId::Upload, Some("上传录音"), false)?;
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_production_table_has_no_collisions() {
        let registry = production().unwrap();
        assert_eq!(registry.len(), 4);
        assert!(registry.ambiguities().is_empty());
        assert_eq!(registry.fallback(), ViewId::Upload);
    }
}
