//! Contract tests that drive [`ChromiumSurface`] against a real Chromium
//! binary. Ignored by default because they need a browser on the host.

use std::env;
use std::time::Duration;

use cdp_adapter::{AdapterErrorKind, CdpConfig, ChromiumSurface, Selector, Surface};

fn contract_enabled() -> bool {
    env::var("CHATRELAY_CDP_CONTRACT")
        .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}

async fn launch() -> ChromiumSurface {
    let profile = tempfile::tempdir().expect("profile dir");
    let cfg = CdpConfig {
        user_data_dir: profile.into_path(),
        headless: true,
        debug_port: None,
        navigation_timeout_ms: 10_000,
        ..CdpConfig::default()
    };
    ChromiumSurface::connect(cfg).await.expect("launch chromium")
}

#[tokio::test]
#[ignore = "requires Chrome/Chromium; set CHATRELAY_CDP_CONTRACT=1"]
async fn contract_type_and_read_back() {
    if !contract_enabled() {
        eprintln!("skipping CDP contract test (CHATRELAY_CDP_CONTRACT not enabled)");
        return;
    }

    let surface = launch().await;
    let page = "data:text/html,<textarea id=\"prompt\"></textarea><div class=\"out\">one</div><div class=\"out\">two</div>";
    surface.navigate(page).await.expect("navigate");

    let input = surface
        .find(&Selector::xpath("//*[@id=\"prompt\"]"), Duration::from_secs(5))
        .await
        .expect("find textarea");
    surface
        .type_text(&input, "line one\nline two")
        .await
        .expect("type text");

    let last = surface
        .find(&Selector::css("div.out"), Duration::from_secs(5))
        .await
        .expect("find output");
    assert_eq!(last.index, 1);
    assert_eq!(surface.text(&last).await.expect("text"), "two");
}

#[tokio::test]
#[ignore = "requires Chrome/Chromium; set CHATRELAY_CDP_CONTRACT=1"]
async fn contract_missing_selector_times_out() {
    if !contract_enabled() {
        eprintln!("skipping CDP contract test (CHATRELAY_CDP_CONTRACT not enabled)");
        return;
    }

    let surface = launch().await;
    surface.navigate("about:blank").await.ok();
    assert!(!surface
        .exists(&Selector::css("#nothing-here"))
        .await
        .expect("exists check"));
    let err = surface
        .find(&Selector::css("#nothing-here"), Duration::from_millis(300))
        .await
        .expect_err("lookup should time out");
    assert_eq!(err.kind, AdapterErrorKind::TargetNotFound);
}

#[tokio::test]
#[ignore = "requires Chrome/Chromium; set CHATRELAY_CDP_CONTRACT=1"]
async fn contract_affordance_scoped_to_last_anchor() {
    if !contract_enabled() {
        eprintln!("skipping CDP contract test (CHATRELAY_CDP_CONTRACT not enabled)");
        return;
    }

    let surface = launch().await;
    let page = "data:text/html,<div class=\"turn\"><p class=\"reply\">done</p><button class=\"copy\">c</button></div><div class=\"turn\"><p class=\"reply\">stream</p></div>";
    surface.navigate(page).await.expect("navigate");

    let reply = Selector::css("p.reply");
    let copy = Selector::css("button.copy");
    assert!(surface.exists(&copy).await.expect("exists check"));
    assert!(!surface
        .exists_after_last(&reply, &copy)
        .await
        .expect("scoped check"));
}
