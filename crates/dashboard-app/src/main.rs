//! dashboard-app: load the fund-report analysis document and write a static
//! HTML snapshot of the dashboard, plus the candidate CSV next to it.
//!
//! Settings come from an optional `dashboard.json` in the working directory.

mod config;

use anyhow::Context;
use dashboard::{render_page, Dashboard, DashboardEvent, Effect, MemoryChartBackend};
use report_loader::DataLoader;
use std::path::{Path, PathBuf};

use crate::config::{AppConfig, CONFIG_FILE};

const DEFAULT_TITLE: &str = "Fund Report Dashboard";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dashboard_app=info,dashboard=info,report_loader=info".into()),
        )
        .init();

    let config = AppConfig::load(Path::new(CONFIG_FILE)).await?;
    let loader = DataLoader::from_location(&config.source, &config.resource_path);
    tracing::info!("Loading analysis document from {}", loader.location());

    let charts = MemoryChartBackend::new();
    let mut dashboard = Dashboard::new(Box::new(charts.clone()), config.dashboard.clone());

    let result = loader.load().await;
    let title = match &result {
        Ok(doc) if !doc.fund_name.trim().is_empty() => doc.fund_name.clone(),
        _ => DEFAULT_TITLE.to_string(),
    };
    dashboard.on_load(result);

    let page = render_page(&dashboard.root(), &charts, &title);
    tokio::fs::write(&config.output_path, page)
        .await
        .with_context(|| format!("Failed to write {}", config.output_path))?;
    tracing::info!("Wrote {}", config.output_path);

    if let Some(path) = export_candidates(&mut dashboard, Path::new(&config.output_path)).await? {
        tracing::info!("Wrote {}", path.display());
    }

    if let Some(message) = dashboard.state().error() {
        anyhow::bail!("{}", message);
    }
    Ok(())
}

/// Run the candidate export and write the CSV beside `page`. Nothing is
/// written when the dashboard never loaded.
async fn export_candidates(dashboard: &mut Dashboard, page: &Path) -> anyhow::Result<Option<PathBuf>> {
    if !dashboard.state().is_loaded() {
        return Ok(None);
    }

    let Some(Effect::Download(export)) = dashboard.handle(DashboardEvent::ExportCandidates)? else {
        return Ok(None);
    };
    let path = page.with_file_name(&export.filename);
    tokio::fs::write(&path, &export.content)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(Some(path))
}
