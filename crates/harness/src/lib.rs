pub mod editor;
pub mod workflow;

pub use editor::{TestEditor, record};
pub use workflow::TestWorkflow;

use tracing_subscriber::EnvFilter;

/// Install a test-friendly subscriber once; honours `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
