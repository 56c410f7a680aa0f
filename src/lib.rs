pub use crate::chain::abi::{DirectoryEntry, TipStats, UserActivity};
pub use crate::chain::publisher::TransactionOutcome;
pub use crate::chain::ChainNetwork;
pub use crate::error::{FriendFiError, Result};
pub use crate::friendfi::access::AccessStatus;
pub use crate::friendfi::accounts::Account;
pub use crate::friendfi::analytics::{
    ActivityEntry, AnalyticsSummary, DashboardSummary, TopFriend,
};
pub use crate::friendfi::app_settings::{AppSettings, ThemeMode};
pub use crate::friendfi::conversation::{
    BuilderConfig, ContentState, FriendListing, FriendSummary, ProcessingError, SuggestedUser,
    ThreadMessage,
};
pub use crate::friendfi::messages::MessageBody;
pub use crate::friendfi::operations::{NotificationEvent, Operation, OperationOutcome};
pub use crate::friendfi::signers::SignerKind;
pub use crate::friendfi::{FriendFi, FriendFiConfig};
pub use crate::types::{Message, MessageDirection};

use std::sync::{Mutex, OnceLock};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{filter::EnvFilter, fmt::Layer, prelude::*, registry::Registry};

pub mod chain;
mod error;
pub mod friendfi;
mod types;

#[cfg(feature = "integration-tests")]
pub mod integration_tests;

static TRACING_GUARDS: OnceLock<Mutex<Option<(WorkerGuard, WorkerGuard)>>> = OnceLock::new();
static TRACING_INIT: OnceLock<()> = OnceLock::new();

fn init_tracing(logs_dir: &std::path::Path) {
    let logs_dir = logs_dir.to_path_buf();
    TRACING_INIT.get_or_init(|| {
        let file_appender = tracing_appender::rolling::RollingFileAppender::builder()
            .rotation(tracing_appender::rolling::Rotation::DAILY)
            .filename_prefix("friendfi")
            .filename_suffix("log")
            .build(&logs_dir)
            .expect("Failed to create file appender");

        let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);
        let (non_blocking_stdout, stdout_guard) = tracing_appender::non_blocking(std::io::stdout());

        TRACING_GUARDS
            .set(Mutex::new(Some((file_guard, stdout_guard))))
            .ok();

        let stdout_layer = Layer::new()
            .with_writer(non_blocking_stdout)
            .with_ansi(true)
            .with_target(true);

        let file_layer = Layer::new()
            .with_writer(non_blocking_file)
            .with_ansi(false)
            .with_target(true);

        Registry::default()
            .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
            .with(stdout_layer)
            .with(file_layer)
            .init();
    });
}
