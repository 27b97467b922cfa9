mod common;

use anyhow::Result;
use common::{dir_is_empty, font_bytes, CountingFactory};
use font_registrar::{
    ByteSourceResolver, ErrorKind, FileDisplayNameResolver, FontBridge, FontInstaller,
    RegistrarConfig, TypefaceRegistry,
};
use httpmock::prelude::*;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::TempDir;

struct Harness {
    root: TempDir,
    temp: TempDir,
    factory: CountingFactory,
    installer: Arc<FontInstaller<CountingFactory>>,
}

fn harness(factory: CountingFactory) -> Result<Harness> {
    let root = TempDir::new()?;
    let temp = TempDir::new()?;
    let config = RegistrarConfig::with_storage_root(root.path()).with_temp_dir(temp.path());

    let installer = Arc::new(FontInstaller::new(
        ByteSourceResolver::new(&config)?,
        Arc::new(TypefaceRegistry::new()),
        factory.clone(),
    ));

    Ok(Harness {
        root,
        temp,
        factory,
        installer,
    })
}

#[tokio::test]
async fn test_same_font_from_remote_and_local_installs_once() -> Result<()> {
    let h = harness(CountingFactory::default())?;
    let padding = 12_345 - font_bytes("Acme Sans", 0).len();
    let font = font_bytes("Acme Sans", padding);
    assert_eq!(font.len(), 12_345);

    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/font.ttf");
            then.status(200)
                .header("Content-Type", "font/ttf")
                .body(font.clone());
        })
        .await;

    let identity = h.installer.install_from_url(&server.url("/font.ttf")).await?;
    assert_eq!(identity.as_str(), "Acme Sans");
    mock.assert_async().await;

    std::fs::create_dir_all(h.root.path().join("fonts"))?;
    std::fs::write(h.root.path().join("fonts/acme-sans-copy.ttf"), &font)?;
    let identity = h
        .installer
        .install_from_local_path("/fonts/acme-sans-copy.ttf")
        .await?;
    assert_eq!(identity.as_str(), "Acme Sans");

    assert_eq!(h.factory.calls(), 1);
    let entry = h.installer.registry().lookup("Acme Sans").unwrap();
    assert_eq!(entry.handle.size, 12_345);
    assert!(dir_is_empty(h.temp.path()));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_remote_installs_share_one_entry() -> Result<()> {
    let h = harness(CountingFactory::with_delay(Duration::from_millis(100)))?;
    let font = font_bytes("Acme Sans", 4096);

    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/acme.ttf");
            then.status(200).body(font.clone());
        })
        .await;
    let url = server.url("/acme.ttf");

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let installer = Arc::clone(&h.installer);
        let url = url.clone();
        tasks.push(tokio::spawn(async move {
            installer.install_from_url(&url).await
        }));
    }

    for task in tasks {
        assert_eq!(task.await??.as_str(), "Acme Sans");
    }

    // every call downloads, but only one materializes
    mock.assert_hits_async(8).await;
    assert_eq!(h.factory.calls(), 1);
    assert_eq!(h.installer.registry().len(), 1);
    assert!(dir_is_empty(h.temp.path()));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_distinct_fonts_install_in_parallel() -> Result<()> {
    let h = harness(CountingFactory::with_delay(Duration::from_millis(300)))?;

    let server = MockServer::start_async().await;
    for name in ["Alpha", "Beta", "Gamma"] {
        let font = font_bytes(name, 128);
        server
            .mock_async(move |when, then| {
                when.method(GET).path(format!("/{}.ttf", name));
                then.status(200).body(font);
            })
            .await;
    }

    let started = Instant::now();
    let mut tasks = Vec::new();
    for name in ["Alpha", "Beta", "Gamma"] {
        let installer = Arc::clone(&h.installer);
        let url = server.url(format!("/{}.ttf", name));
        tasks.push(tokio::spawn(async move {
            installer.install_from_url(&url).await
        }));
    }
    for task in tasks {
        task.await??;
    }

    // three serialized installs would take at least 900ms
    assert!(started.elapsed() < Duration::from_millis(800));
    assert_eq!(h.factory.calls(), 3);
    assert_eq!(
        h.installer.registry().families(),
        vec!["Alpha".to_string(), "Beta".to_string(), "Gamma".to_string()]
    );
    Ok(())
}

#[tokio::test]
async fn test_failed_install_does_not_poison_identity() -> Result<()> {
    let h = harness(CountingFactory::failing_once())?;
    std::fs::write(h.root.path().join("acme.ttf"), font_bytes("Acme Sans", 64))?;

    let err = h
        .installer
        .install_from_local_path("acme.ttf")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InstallFailed);
    assert!(h.installer.registry().lookup("Acme Sans").is_none());

    let identity = h.installer.install_from_local_path("acme.ttf").await?;
    assert_eq!(identity.as_str(), "Acme Sans");
    assert_eq!(h.factory.calls(), 2);
    Ok(())
}

#[tokio::test]
async fn test_remote_install_failure_leaves_no_temp_file() -> Result<()> {
    let h = harness(CountingFactory::failing_once())?;
    let font = font_bytes("Acme Sans", 256);

    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/acme.ttf");
            then.status(200).body(font.clone());
        })
        .await;
    let url = server.url("/acme.ttf");

    let err = h.installer.install_from_url(&url).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InstallFailed);
    assert!(dir_is_empty(h.temp.path()));
    assert!(h.installer.registry().lookup("Acme Sans").is_none());

    let identity = h.installer.install_from_url(&url).await?;
    assert_eq!(identity.as_str(), "Acme Sans");
    mock.assert_hits_async(2).await;
    assert_eq!(h.factory.calls(), 2);
    assert!(dir_is_empty(h.temp.path()));
    Ok(())
}

#[tokio::test]
async fn test_malformed_download_never_reaches_registry() -> Result<()> {
    let h = harness(CountingFactory::default())?;

    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/garbage.ttf");
            then.status(200).body("<html>not a font</html>");
        })
        .await;

    let err = h
        .installer
        .install_from_url(&server.url("/garbage.ttf"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::MalformedFont);
    assert_eq!(h.factory.calls(), 0);
    assert!(h.installer.registry().is_empty());
    assert!(dir_is_empty(h.temp.path()));
    Ok(())
}

#[tokio::test]
async fn test_fetch_failure_leaves_no_temp_file() -> Result<()> {
    let h = harness(CountingFactory::default())?;

    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/broken.ttf");
            then.status(500);
        })
        .await;

    let err = h
        .installer
        .install_from_url(&server.url("/broken.ttf"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::FetchFailed);
    assert!(dir_is_empty(h.temp.path()));
    assert!(h.installer.registry().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_bridge_commands_resolve_strings() -> Result<()> {
    let h = harness(CountingFactory::default())?;
    std::fs::write(h.root.path().join("local.otf"), font_bytes("Local Serif", 32))?;
    let bridge = FontBridge::new(Arc::clone(&h.installer), Arc::new(FileDisplayNameResolver));

    let family = bridge.create_font_with_local_file("local.otf").await?;
    assert_eq!(family, "Local Serif");

    let err = bridge
        .create_font_with_local_file("missing.otf")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let name = bridge
        .get_file_path("file:///sdcard/Download/Local%20Serif.otf")
        .await?;
    assert_eq!(name, "Local Serif.otf");
    Ok(())
}
