pub mod book;
pub mod error;
pub mod output;
pub mod provider;
pub mod resolver;
pub mod watch;

// Re-export main types
pub use book::{BookConfig, BOOK_CONFIG_FILE};
pub use error::*;
pub use output::{OutputType, BUILD_DIR, ENTRY_FILE, PDF_FILE};
pub use watch::*;

// Re-export providers and resolution
pub use provider::{DefaultProvider, FileProvider, WatchConfigProvider};
pub use resolver::{ConfigSource, FallbackReason, ResolvedWatchConfig, WatchConfigResolver};
