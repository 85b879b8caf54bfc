//! Helpers shared by the integration suites.

use tracing_subscriber::EnvFilter;

/// Route client logs to the test harness. `RUST_LOG` overrides the level.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_test_writer()
        .try_init();
}

/// Start a fresh mock server on a random port and return its base URL.
///
/// The listener is bound before the server thread starts, so requests sent
/// right away queue instead of being refused.
pub fn spawn_mock_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener, mock_server::API_PREFIX).await
        })
        .unwrap();
    });

    format!("http://{addr}{}", mock_server::API_PREFIX)
}
