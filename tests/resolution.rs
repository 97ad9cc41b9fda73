//! Frontend selection against a live registry.

use std::sync::Arc;
use std::thread;

use axum::http::{HeaderMap, HeaderValue, Uri};

use bff_gateway::config::ListenerConfig;
use bff_gateway::frontend::{FrontendError, SelectionCriteria};
use bff_gateway::routing::{ContextError, RequestFrontendContext};
use bff_gateway::{Frontend, FrontendName, FrontendRegistry, FrontendResolver, RequestTarget};

mod common;
use common::*;

#[test]
fn test_host_and_path_beats_host_only() {
    let registry = registry_of(vec![
        host_frontend("f1", "https://a.example.com"),
        host_path_frontend("f2", "https://a.example.com", "/app"),
    ]);

    assert_eq!(resolved_name(&registry, "https://a.example.com/app/page").as_deref(), Some("f2"));
    assert_eq!(resolved_name(&registry, "https://a.example.com/other").as_deref(), Some("f1"));
}

#[test]
fn test_non_default_port_matches_request_without_port() {
    let registry = registry_of(vec![host_frontend("f8443", "https://a.example.com:8443")]);
    let resolver = FrontendResolver::new(registry);
    let listener = ListenerConfig {
        default_scheme: "https".into(),
        ..Default::default()
    };
    let uri: Uri = "/app".parse().unwrap();

    let mut headers = HeaderMap::new();
    headers.insert("host", HeaderValue::from_static("a.example.com"));
    let request = RequestTarget::from_request_parts(&uri, &headers, &listener);
    assert_eq!(request.port, None);
    assert_eq!(resolver.resolve(&request).unwrap().name().as_str(), "f8443");

    headers.insert("host", HeaderValue::from_static("a.example.com:8443"));
    let request = RequestTarget::from_request_parts(&uri, &headers, &listener);
    assert_eq!(resolver.resolve(&request).unwrap().name().as_str(), "f8443");

    headers.insert("host", HeaderValue::from_static("a.example.com:443"));
    let request = RequestTarget::from_request_parts(&uri, &headers, &listener);
    assert!(resolver.resolve(&request).is_none());
}

#[test]
fn test_lone_default_matches_everything() {
    let registry = registry_of(vec![frontend("default")]);

    for uri in [
        "https://a.example.com/",
        "http://b.example.org:8080/deep/path?q=1",
        "https://127.0.0.1/x",
    ] {
        assert_eq!(resolved_name(&registry, uri).as_deref(), Some("default"), "{uri}");
    }
}

#[test]
fn test_path_match_is_case_sensitive() {
    let registry = registry_of(vec![path_frontend("f1", "/App")]);

    assert_eq!(resolved_name(&registry, "https://a.example.com/app/x"), None);
    assert_eq!(resolved_name(&registry, "https://a.example.com/App/x").as_deref(), Some("f1"));
}

#[test]
fn test_removal_falls_back() {
    let registry = registry_of(vec![
        host_frontend("f1", "https://a.example.com"),
        host_path_frontend("f2", "https://a.example.com", "/app"),
    ]);
    registry.remove(&FrontendName::parse("f2").unwrap());

    assert_eq!(resolved_name(&registry, "https://a.example.com/app/page").as_deref(), Some("f1"));

    let path_only = registry_of(vec![
        path_frontend("f1", "/shop"),
        host_path_frontend("f2", "https://a.example.com", "/app"),
    ]);
    path_only.remove(&FrontendName::parse("f2").unwrap());
    assert_eq!(resolved_name(&path_only, "https://a.example.com/app/page"), None);
}

#[test]
fn test_root_path_rejected() {
    assert_eq!(
        SelectionCriteria::new(Some("/"), None).unwrap_err(),
        FrontendError::RootPath
    );
    assert!(frontend("x").with_path("/").is_err());
}

#[test]
fn test_specificity_independent_of_registration_order() {
    let candidates = vec![
        frontend("none"),
        path_frontend("path", "/app"),
        host_frontend("host", "https://a.example.com"),
        host_path_frontend("both", "https://a.example.com", "/app"),
    ];

    for order in permutations(&candidates) {
        let names: Vec<String> = order.iter().map(|f| f.name().to_string()).collect();
        let registry = registry_of(order);

        assert_eq!(
            resolved_name(&registry, "https://a.example.com/app/x").as_deref(),
            Some("both"),
            "order {names:?}"
        );
        assert_eq!(
            resolved_name(&registry, "https://a.example.com/elsewhere").as_deref(),
            Some("host"),
            "order {names:?}"
        );
        assert_eq!(
            resolved_name(&registry, "https://b.example.com/app").as_deref(),
            Some("path"),
            "order {names:?}"
        );
        assert_eq!(
            resolved_name(&registry, "https://b.example.com/").as_deref(),
            Some("none"),
            "order {names:?}"
        );
    }
}

#[test]
fn test_longer_path_wins_within_tier() {
    for order in permutations(&[path_frontend("short", "/app"), path_frontend("long", "/app/admin")]) {
        let registry = registry_of(order);
        assert_eq!(resolved_name(&registry, "https://x.test/app/admin/users").as_deref(), Some("long"));
        assert_eq!(resolved_name(&registry, "https://x.test/app/home").as_deref(), Some("short"));
    }
}

#[test]
fn test_identical_criteria_first_registered_wins() {
    let registry = registry_of(vec![path_frontend("first", "/app"), path_frontend("second", "/app")]);
    assert_eq!(resolved_name(&registry, "https://x.test/app").as_deref(), Some("first"));

    // An update keeps the original registration position.
    registry.add_or_update(path_frontend("first", "/app"));
    assert_eq!(resolved_name(&registry, "https://x.test/app").as_deref(), Some("first"));
}

#[test]
fn test_resolution_is_deterministic() {
    let registry = registry_of(
        (0..50)
            .map(|i| path_frontend(&format!("f{i}"), &format!("/tenant{}", i % 10)))
            .collect(),
    );
    let resolver = FrontendResolver::new(registry);
    let request = target("https://x.test/tenant3/page");

    let first = resolver.resolve(&request).unwrap();
    for _ in 0..100 {
        assert!(Arc::ptr_eq(&first, &resolver.resolve(&request).unwrap()));
    }
    assert_eq!(first.name().as_str(), "f3");
}

#[test]
fn test_only_first_default_is_active() {
    let registry = FrontendRegistry::new();
    let first = registry.add_or_update(frontend("first"));
    let second = registry.add_or_update(frontend("second"));

    assert_eq!(first.shadowed_by, None);
    assert_eq!(second.shadowed_by, Some(FrontendName::parse("first").unwrap()));
    assert_eq!(registry.len(), 2);

    let snapshot = registry.get_all();
    assert_eq!(snapshot.default_frontend().unwrap().name().as_str(), "first");
    assert_eq!(resolved_name(&registry, "https://any.test/").as_deref(), Some("first"));

    registry.remove(&FrontendName::parse("first").unwrap());
    assert_eq!(resolved_name(&registry, "https://any.test/").as_deref(), Some("second"));
}

#[test]
fn test_derived_scheme_names_are_stable() {
    for raw in ["shop", "tenant-42", "a.b_c~d"] {
        let name = FrontendName::parse(raw).unwrap();
        let frontend = Frontend::new(name.clone());
        for _ in 0..3 {
            assert_eq!(frontend.cookie_scheme(), format!("cookie_{raw}"));
            assert_eq!(frontend.oidc_scheme(), format!("oidc_{raw}"));
        }
        assert_eq!(Frontend::new(name).cookie_scheme(), frontend.cookie_scheme());
    }
}

#[test]
fn test_context_written_once() {
    let registry = registry_of(vec![path_frontend("app", "/app")]);
    let resolver = FrontendResolver::new(registry);
    let context = RequestFrontendContext::new();

    assert_eq!(context.selected().unwrap_err(), ContextError::NotResolved);

    let selected = resolver.resolve_into(&target("https://x.test/app"), &context).unwrap();
    assert_eq!(selected.unwrap().name().as_str(), "app");
    assert_eq!(
        resolver.resolve_into(&target("https://x.test/other"), &context).unwrap_err(),
        ContextError::AlreadyResolved
    );
    assert_eq!(context.selected().unwrap().unwrap().name().as_str(), "app");
}

#[test]
fn test_no_match_is_recorded_as_none() {
    let resolver = FrontendResolver::new(registry_of(vec![path_frontend("app", "/app")]));
    let context = RequestFrontendContext::new();

    assert!(resolver.resolve_into(&target("https://x.test/"), &context).unwrap().is_none());
    assert!(context.selected().unwrap().is_none());
}

#[test]
fn test_concurrent_writers_and_readers() {
    let registry = registry_of(
        (0..1000)
            .map(|i| path_frontend(&format!("base{i}"), &format!("/base{i}")))
            .collect(),
    );
    let resolver = FrontendResolver::new(registry.clone());

    let writers: Vec<_> = (0..4)
        .map(|w| {
            let registry = registry.clone();
            thread::spawn(move || {
                for i in 0..200 {
                    let name = format!("w{w}-{i}");
                    registry.add_or_update(path_frontend(&name, &format!("/{name}")));
                    if i % 2 == 0 {
                        registry.remove(&FrontendName::parse(name).unwrap());
                    }
                }
            })
        })
        .collect();

    let readers: Vec<_> = (0..4)
        .map(|r| {
            let resolver = resolver.clone();
            let registry = registry.clone();
            thread::spawn(move || {
                for i in 0..500 {
                    let snapshot = registry.get_all();
                    let counted = snapshot.iter().count();
                    assert_eq!(counted, snapshot.len());
                    assert!(counted >= 1000);

                    let n = (i * 7 + r) % 1000;
                    let picked = resolver.resolve(&target(&format!("https://x.test/base{n}/p"))).unwrap();
                    assert_eq!(picked.name().to_string(), format!("base{n}"));
                }
            })
        })
        .collect();

    for handle in writers.into_iter().chain(readers) {
        handle.join().unwrap();
    }

    // Odd iterations survive.
    assert_eq!(registry.len(), 1000 + 4 * 100);
}
