//! Views subsystem.
//!
//! # Data Flow
//! ```text
//! Dispatcher resolves a route
//!     → ViewLoader::load(view_id, context)   (may await)
//!     → View::render()                        (fallible, synchronous)
//!     → markup written into the root surface
//!
//! Next navigation:
//!     → View::unmount() on the outgoing view
//! ```
//!
//! # Design Decisions
//! - Views are identified by `ViewId`; the registry only references them
//! - A view never writes NavigationState; it asks the navigator instead
//! - Render errors are the view's own; the dispatcher only propagates them

pub mod edit_report;
pub mod home;
pub mod test_form;
pub mod upload;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::routing::history::Navigator;
use crate::routing::matcher::Params;

pub use edit_report::EditReportView;
pub use home::HomeView;
pub use test_form::TestView;
pub use upload::UploadView;

/// Identifier of a mountable view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ViewId {
    Home,
    EditReport,
    Test,
    Upload,
}

impl ViewId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewId::Home => "home",
            ViewId::EditReport => "edit_report",
            ViewId::Test => "test",
            ViewId::Upload => "upload",
        }
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A view failed to initialize.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("view '{view}' failed to mount: {reason}")]
pub struct ViewMountError {
    pub view: ViewId,
    pub reason: String,
}

impl ViewMountError {
    pub fn new(view: ViewId, reason: impl Into<String>) -> Self {
        Self {
            view,
            reason: reason.into(),
        }
    }
}

/// Input handed to a view when it is loaded.
#[derive(Debug, Clone)]
pub struct ViewContext {
    /// Bound route parameters, present only for routes that forward them.
    pub params: Option<Params>,
    /// Raw query string of the navigation path.
    pub query: Option<String>,
    /// For programmatic navigation.
    pub navigator: Navigator,
}

impl ViewContext {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.as_ref()?.get(name).map(String::as_str)
    }

    /// Look up `key` in the query string (`a=1&b=2`).
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .as_deref()?
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v)
    }
}

/// A mountable, renderable unit bound to a route.
pub trait View: Send {
    fn id(&self) -> ViewId;

    /// Produce the markup written into the root container.
    fn render(&self) -> Result<String, ViewMountError>;

    /// Called when another view replaces this one.
    fn unmount(&mut self) {}
}

/// Creates views on demand; loading may be asynchronous.
pub trait ViewLoader: Send + Sync {
    fn load(
        &self,
        id: ViewId,
        context: ViewContext,
    ) -> BoxFuture<'static, Result<Box<dyn View>, ViewMountError>>;
}

/// Loader for the application's own views.
#[derive(Debug, Clone, Default)]
pub struct StandardViews {
    /// Model name shown by the test view.
    pub review_model: Option<String>,
}

impl StandardViews {
    pub fn new(review_model: Option<String>) -> Self {
        Self { review_model }
    }
}

impl ViewLoader for StandardViews {
    fn load(
        &self,
        id: ViewId,
        context: ViewContext,
    ) -> BoxFuture<'static, Result<Box<dyn View>, ViewMountError>> {
        let review_model = self.review_model.clone();
        async move {
            let view: Box<dyn View> = match id {
                ViewId::Home => Box::new(HomeView::new()),
                ViewId::EditReport => Box::new(EditReportView::from_context(&context)?),
                ViewId::Test => Box::new(TestView::new(review_model)),
                ViewId::Upload => Box::new(UploadView::from_context(&context)),
            };
            Ok(view)
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(params: Option<Params>, query: Option<&str>) -> ViewContext {
        let (navigator, _rx) = Navigator::channel();
        ViewContext {
            params,
            query: query.map(str::to_string),
            navigator,
        }
    }

    #[test]
    fn test_query_value() {
        let ctx = context(None, Some("object_name=a1.mp3&x=1"));
        assert_eq!(ctx.query_value("object_name"), Some("a1.mp3"));
        assert_eq!(ctx.query_value("x"), Some("1"));
        assert_eq!(ctx.query_value("missing"), None);
    }

    #[test]
    fn test_upload_takes_object_name_from_query() {
        let upload = UploadView::from_context(&context(None, Some("x=1&object_name=a1.mp3")));
        assert_eq!(upload.object_name(), Some("a1.mp3"));

        let empty = UploadView::from_context(&context(None, Some("object_name=")));
        assert_eq!(empty.object_name(), None);
        assert!(empty.render().unwrap().contains("尚未选择录音文件"));
    }

    #[test]
    fn test_edit_report_requires_object_name() {
        let mut params = Params::new();
        params.insert(edit_report::OBJECT_NAME.into(), "abc123".into());
        let edit = EditReportView::from_context(&context(Some(params), None)).unwrap();
        assert_eq!(edit.object_name(), "abc123");

        let mut blank = Params::new();
        blank.insert(edit_report::OBJECT_NAME.into(), String::new());
        assert!(EditReportView::from_context(&context(Some(blank), None)).is_err());
    }

    #[tokio::test]
    async fn test_standard_views_load() {
        let views = StandardViews::new(Some("qwen".into()));

        let home = views.load(ViewId::Home, context(None, None)).await.unwrap();
        assert_eq!(home.id(), ViewId::Home);

        let mut params = Params::new();
        params.insert("object_name".into(), "abc123".into());
        let edit = views
            .load(ViewId::EditReport, context(Some(params), None))
            .await
            .unwrap();
        assert!(edit.render().unwrap().contains("abc123"));

        let err = views
            .load(ViewId::EditReport, context(None, None))
            .await
            .err()
            .unwrap();
        assert_eq!(err.view, ViewId::EditReport);
    }
}
