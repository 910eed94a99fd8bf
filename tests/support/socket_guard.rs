//! Guard for crawl tests that need a local wiremock server.
//!
//! Sandboxed CI runners sometimes forbid binding loopback sockets. Those
//! tests then skip with a note on stderr, unless
//! `DOI_SPIDER_REQUIRE_SOCKET_TESTS` is set, in which case they fail.

use std::net::{Ipv4Addr, TcpListener};
use std::panic::Location;

use wiremock::MockServer;

const REQUIRE_ENV: &str = "DOI_SPIDER_REQUIRE_SOCKET_TESTS";

fn skipping_forbidden() -> bool {
    std::env::var(REQUIRE_ENV)
        .is_ok_and(|value| matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
}

fn loopback_bindable() -> bool {
    TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).is_ok()
}

/// Starts a mock publisher site, or returns `None` when loopback sockets are
/// unavailable and skipping is allowed.
#[track_caller]
pub fn start_mock_server_or_skip() -> impl std::future::Future<Output = Option<MockServer>> {
    let caller = Location::caller();
    let available = loopback_bindable();
    async move {
        if available {
            return Some(MockServer::start().await);
        }
        let note = format!(
            "{}:{}: no loopback socket for the mock publisher site",
            caller.file(),
            caller.line()
        );
        assert!(!skipping_forbidden(), "{note} ({REQUIRE_ENV} is set)");
        eprintln!("skipping {note}; set {REQUIRE_ENV}=1 to make this a failure");
        None
    }
}
