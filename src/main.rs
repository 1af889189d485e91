use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{Result, eyre};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use locapp_photos::application::{ImageRequest, PhotoCacheManager, RemoteImage};
use locapp_photos::domain::entities::{ImageState, PhotoKind};
use locapp_photos::domain::ports::CacheObserverPort;
use locapp_photos::infrastructure::{
    AppConfig, CliArgs, Command, ConfigLoader, DiskPhotoStore, HttpPhotoSource, LocAppClient,
    MemoryImageCache, TracingCacheObserver,
};

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string()));

    if let Some(log_path) = &config.log_path {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();

        info!(path = %log_path.display(), "Logging initialized");
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    Ok(())
}

struct Services {
    manager: PhotoCacheManager,
    images: Arc<RemoteImage>,
}

async fn build_services(config: &AppConfig) -> Result<Services> {
    let resolver = config.photo_url_resolver()?;
    let observer: Arc<dyn CacheObserverPort> = Arc::new(TracingCacheObserver);

    let root = config
        .effective_cache_dir()
        .ok_or_else(|| eyre!("could not determine a photo store directory"))?;
    let store = Arc::new(DiskPhotoStore::new(root, observer.clone()).await);

    let source = Arc::new(HttpPhotoSource::new(config.request_timeout())?);

    let mut client = LocAppClient::new(
        resolver.clone(),
        config.api_path.clone(),
        config.request_timeout(),
    )?;
    if let Some(token) = &config.auth_token {
        client = client.with_auth_token(token.clone());
    }

    let manager = PhotoCacheManager::new(
        Arc::new(client),
        source.clone(),
        store.clone(),
        resolver.clone(),
        observer.clone(),
    );
    let memory = Arc::new(MemoryImageCache::new(config.memory_cache_size));
    let images = Arc::new(RemoteImage::new(store, memory, source, resolver, observer));

    Ok(Services { manager, images })
}

async fn run(command: Command, services: Services) {
    let Services { manager, images } = services;

    match command {
        Command::Prefetch {
            reservation,
            property,
        } => {
            let mut updates = manager.subscribe();
            let progress = tokio::spawn(async move {
                while updates.changed().await.is_ok() {
                    let session = updates.borrow_and_update().clone();
                    info!(
                        progress = session.progress,
                        downloading = session.is_downloading,
                        "Download progress"
                    );
                }
            });

            let report = manager
                .download_photos_for_property(reservation, &property)
                .await;
            drop(manager);
            let _ = progress.await;
            println!("{property}: {report}");
        }
        Command::Size => {
            println!("{}", manager.formatted_cache_size().await);
        }
        Command::Clear { property: Some(property) } => {
            manager.delete_photos_for_property(&property).await;
            println!("Deleted cached photos for {property}");
        }
        Command::Clear { property: None } => {
            manager.delete_all_photos().await;
            println!("Deleted all cached photos");
        }
        Command::Show {
            property,
            filename,
            access,
        } => {
            let kind = if access {
                PhotoKind::AccessRestricted
            } else {
                PhotoKind::Standard
            };
            let request = ImageRequest::photo(&property, &filename, kind);
            match images.mount(request).wait_for(|s| !s.is_loading()).await {
                Ok(state) => match &*state {
                    ImageState::Loaded(loaded) => println!(
                        "{filename}: {}x{} from {}",
                        loaded.image.width(),
                        loaded.image.height(),
                        loaded.source
                    ),
                    _ => println!("{filename}: fallback"),
                },
                Err(_) => println!("{filename}: fallback"),
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    color_eyre::install()?;

    let args = CliArgs::parse();
    let config = ConfigLoader::new()?.load(&args)?;
    init_logging(&config)?;

    info!(version = locapp_photos::VERSION, "Starting {}", locapp_photos::NAME);

    let services = build_services(&config).await?;
    run(args.command, services).await;

    Ok(())
}
