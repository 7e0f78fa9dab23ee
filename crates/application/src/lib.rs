//! Application services and ports for the evaluation console.

#![forbid(unsafe_code)]

mod activity_service;
mod editor_service;
mod gateway_ports;
mod reference_service;
mod session_service;

pub use activity_service::{AuditTrailViewer, HistoryView};
pub use editor_service::{EditorStatus, EntityEditor};
pub use gateway_ports::{
    ActivityGateway, CurrentUserGateway, EditorObserver, EntityWriteGateway, Notice,
    NoticeSeverity, Notifier, ReferenceDataGateway, SessionTokenStore, StoredEntity,
};
pub use reference_service::{OptionSetState, ReferenceDataCache};
pub use session_service::SessionService;
