use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_tree::HierarchicalLayer;

/// Installs the global subscriber. Frames go to stdout, so all diagnostics
/// are kept on stderr.
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("spacegrid=info"));

    let layer = HierarchicalLayer::default()
        .with_writer(std::io::stderr)
        .with_targets(true)
        .with_indent_lines(true);

    tracing_subscriber::registry().with(filter).with(layer).init();
}
