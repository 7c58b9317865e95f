use engine::{resolve_app_paths, LoopConfig, Scene, StartupError};
use keepsake::level::{load_level, LevelError, LEVEL_FILE_NAME};
use keepsake::save::SaveSystem;
use keepsake::scene::GameplayScene;
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

const LEVEL_DIR_NAME: &str = "base";

#[derive(Debug, Error)]
pub(crate) enum BootstrapError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error("failed to load level layout: {0}")]
    Level(#[from] LevelError),
}

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) scene: Box<dyn Scene>,
}

pub(crate) fn build_app() -> Result<AppWiring, BootstrapError> {
    init_tracing();
    info!("=== Keepsake Startup ===");

    let paths = resolve_app_paths()?;
    info!(
        root = %paths.root.display(),
        saves_dir = %paths.saves_dir.display(),
        "app_paths_resolved"
    );

    let level_path = paths.assets_dir.join(LEVEL_DIR_NAME).join(LEVEL_FILE_NAME);
    let level = load_level(&level_path)?;
    info!(
        path = %level_path.display(),
        objects = level.objects.len(),
        lanterns = level.lanterns.len(),
        "level_loaded"
    );

    let saves = SaveSystem::in_dir(&paths.saves_dir);
    Ok(AppWiring {
        config: LoopConfig::default(),
        scene: Box::new(GameplayScene::new(level, saves)),
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}
