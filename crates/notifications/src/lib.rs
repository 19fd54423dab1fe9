//! Administrator notifications: recipient resolution, message formatting,
//! fan-out delivery and the low-stock workflow that ties them together.
//!
//! IO lives behind the [`RecipientDirectory`], [`MessageTransport`] and
//! [`ActivityLog`] traits; concrete adapters are in `uniasia-infra`.

pub mod activity;
pub mod error;
pub mod message;
pub mod notifier;
pub mod recipient;
pub mod transport;
pub mod workflow;

pub use activity::{ActivityLog, ActivityLogError, ActivityRecord, InMemoryActivityLog};
pub use error::{NotifyError, NotifyFailure};
pub use message::{ExpiringLine, LowStockLine, OutboundMessage};
pub use notifier::{AdminNotifier, NotifyReport};
pub use recipient::{
    DirectoryError, EmptyDirectory, NotificationRecipient, RecipientDirectory, RecipientResolver,
    RecipientSource, ResolvedRecipients, StaticRecipients,
};
pub use transport::{MessageTransport, TransportError};
pub use workflow::{DigestEvent, LowStockWorkflow, NotificationEvent, NotificationKind, Outcome};
