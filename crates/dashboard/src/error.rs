use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("CSV export failed: {0}")]
    Export(#[from] csv::Error),

    #[error("Analysis data is not loaded")]
    NotReady,
}

pub type DashboardResult<T> = Result<T, DashboardError>;
