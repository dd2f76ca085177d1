// Service exports
pub mod email;
pub mod memory;
pub mod notifier;
pub mod oracle;
pub mod postgres;
pub mod store;

pub use email::{DisabledEmail, EmailError, EmailSender, OutgoingEmail, ResendClient};
pub use memory::MemoryStore;
pub use notifier::{HttpNotifier, NotificationService, Notifier, NotifyError};
pub use oracle::OracleScorer;
pub use postgres::PostgresClient;
pub use store::{ItemStore, MatchStore, NotificationStore, StoreError};
