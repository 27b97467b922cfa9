use clap::Parser;
use font_registrar::domain::ports::ConfigProvider;
use font_registrar::utils::{logger, validation::Validate};
use font_registrar::{
    BridgeReply, ByteSourceResolver, CliConfig, Command, ErrorKind, FileDisplayNameResolver,
    FontBridge, FontInstaller, FontSource, InMemoryTypefaceFactory, TypefaceRegistry,
};
use std::sync::Arc;
use tokio::task::JoinSet;

fn exit_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::NotFound | ErrorKind::MalformedFont => 1,
        // 可重試的錯誤
        ErrorKind::FetchFailed | ErrorKind::InstallFailed => 2,
        ErrorKind::Io | ErrorKind::Config => 3,
    }
}

fn report(reply: &BridgeReply, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string(reply)?);
        return Ok(());
    }
    match reply {
        BridgeReply::Resolved {
            argument, value, ..
        } => println!("✅ {} -> {}", argument, value),
        BridgeReply::Rejected {
            argument,
            kind,
            message,
            ..
        } => eprintln!("❌ {} ({:?}): {}", argument, kind, message),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let config = match cli.load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e);
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(exit_code(e.kind()));
        }
    };

    // 初始化日誌
    if config.json_logging() {
        logger::init_json_logger(&config.logging.level);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(exit_code(e.kind()));
    }
    tracing::debug!("Config: {:?}", config);

    let resolver = ByteSourceResolver::new(&config)?;
    let registry = Arc::new(TypefaceRegistry::new());
    let factory = InMemoryTypefaceFactory::new(config.buffer_size());
    let installer = Arc::new(FontInstaller::new(resolver, Arc::clone(&registry), factory));
    let bridge = FontBridge::new(installer, Arc::new(FileDisplayNameResolver));

    let mut worst: Option<ErrorKind> = None;

    match &cli.command {
        Command::Install { sources } => {
            tracing::info!("🚀 Installing {} font(s)", sources.len());

            let mut tasks = JoinSet::new();
            for source in sources.iter().cloned() {
                let bridge = bridge.clone();
                tasks.spawn(async move {
                    let (command, result) = match FontSource::parse(&source) {
                        FontSource::Remote { url } => {
                            ("createFontWithUrl", bridge.create_font_with_url(&url).await)
                        }
                        FontSource::Local { path } => (
                            "createFontWithLocalFile",
                            bridge.create_font_with_local_file(&path).await,
                        ),
                    };
                    BridgeReply::from_result(command, &source, result)
                });
            }

            while let Some(joined) = tasks.join_next().await {
                let reply = joined?;
                if let BridgeReply::Rejected { kind, .. } = &reply {
                    worst = Some(worst.map_or(*kind, |w| {
                        if exit_code(*kind) > exit_code(w) { *kind } else { w }
                    }));
                }
                report(&reply, cli.json)?;
            }

            tracing::info!("📁 Installed typefaces: {:?}", registry.families());
        }
        Command::DisplayName { uri } => {
            let result = bridge.get_file_path(uri).await;
            let reply = BridgeReply::from_result("getFilePath", uri, result);
            if let BridgeReply::Rejected { kind, .. } = &reply {
                worst = Some(*kind);
            }
            report(&reply, cli.json)?;
        }
    }

    if let Some(kind) = worst {
        std::process::exit(exit_code(kind));
    }
    Ok(())
}
