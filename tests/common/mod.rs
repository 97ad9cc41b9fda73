//! Shared utilities for integration tests.
#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use bff_gateway::config::{FrontendConfig, FrontendDefinition, GatewayConfig};
use bff_gateway::lifecycle::{init_subsystems, Subsystems};
use bff_gateway::{Frontend, FrontendRegistry, RequestTarget};

pub fn frontend(name: &str) -> Frontend {
    Frontend::named(name).unwrap()
}

pub fn host_frontend(name: &str, host: &str) -> Frontend {
    frontend(name).with_host(host).unwrap()
}

pub fn path_frontend(name: &str, path: &str) -> Frontend {
    frontend(name).with_path(path).unwrap()
}

pub fn host_path_frontend(name: &str, host: &str, path: &str) -> Frontend {
    host_frontend(name, host).with_path(path).unwrap()
}

/// Parse `https://host[:port]/path` into a request target. The port is
/// only set when written out and not the scheme's default.
pub fn target(uri: &str) -> RequestTarget {
    let url = url::Url::parse(uri).unwrap();
    RequestTarget::new(
        url.scheme(),
        url.host_str().unwrap_or_default(),
        url.port(),
        url.path(),
    )
}

pub fn registry_of(frontends: Vec<Frontend>) -> FrontendRegistry {
    frontends.into_iter().collect()
}

/// Name of the frontend a registry picks for `uri`, if any.
pub fn resolved_name(registry: &FrontendRegistry, uri: &str) -> Option<String> {
    bff_gateway::FrontendResolver::new(registry.clone())
        .resolve(&target(uri))
        .map(|f| f.name().to_string())
}

/// All permutations of `items`, for order-independence checks.
pub fn permutations<T: Clone>(items: &[T]) -> Vec<Vec<T>> {
    if items.len() <= 1 {
        return vec![items.to_vec()];
    }
    let mut out = Vec::new();
    for i in 0..items.len() {
        let mut rest = items.to_vec();
        let head = rest.remove(i);
        for mut tail in permutations(&rest) {
            tail.insert(0, head.clone());
            out.push(tail);
        }
    }
    out
}

pub fn frontend_config(name: &str, definition: FrontendDefinition) -> FrontendConfig {
    FrontendConfig {
        name: name.to_string(),
        definition,
    }
}

pub fn subsystems(frontends: Vec<FrontendConfig>) -> Subsystems {
    let config = GatewayConfig {
        frontends,
        ..Default::default()
    };
    init_subsystems(&config)
}

/// Write `contents` to a fresh file under the temp dir.
pub fn temp_file(prefix: &str, contents: &str) -> PathBuf {
    static COUNTER: AtomicUsize = AtomicUsize::new(0);
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    let path = std::env::temp_dir().join(format!("{prefix}-{}-{n}.html", std::process::id()));
    std::fs::write(&path, contents).unwrap();
    path
}

pub fn file_uri(path: &PathBuf) -> String {
    url::Url::from_file_path(path).unwrap().to_string()
}

pub fn shared(frontend: Frontend) -> Arc<Frontend> {
    Arc::new(frontend)
}
