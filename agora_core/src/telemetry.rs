use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "agora_core=info,agora_cli=info";

/// Installs the stderr log subscriber for the `agora` binary. `RUST_LOG`
/// overrides [`DEFAULT_FILTER`]. Only the first call installs anything.
pub fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        tracing::debug!("log subscriber already installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_install_is_harmless() {
        init_tracing();
        init_tracing();
        tracing::info!("still logging");
    }
}
