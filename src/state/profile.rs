use tracing::{error, warn};

use crate::adapters::ProfileCard;
use crate::data::Dataset;
use crate::error::LoadError;

pub const MISSING_ID_MESSAGE: &str = "Kayıt bulunamadı (ID eksik).";
pub const NOT_FOUND_MESSAGE: &str = "Kayıt bulunamadı.";
pub const LOAD_FAILED_MESSAGE: &str = "Veri yüklenirken bir hata oluştu.";

/// Outcome of resolving a profile deep link
#[derive(Debug, Clone, PartialEq)]
pub enum ProfileState {
    Found(Box<ProfileCard>),
    MissingId,
    NotFound,
    LoadFailed,
}

impl ProfileState {
    /// Resolve `id` against the loaded dataset. A missing id is reported
    /// before the load outcome is considered.
    pub fn resolve(dataset: Result<&Dataset, &LoadError>, id: Option<&str>) -> Self {
        let Some(id) = id.filter(|id| !id.is_empty()) else {
            warn!("profile requested without an id");
            return ProfileState::MissingId;
        };
        let dataset = match dataset {
            Ok(dataset) => dataset,
            Err(err) => {
                error!(error = %err, "profile data failed to load");
                return ProfileState::LoadFailed;
            }
        };
        match dataset.find(id) {
            Some(record) => ProfileState::Found(Box::new(ProfileCard::from_record(record))),
            None => {
                warn!(id, "profile id not in dataset");
                ProfileState::NotFound
            }
        }
    }

    /// User-visible text for the unresolved states
    pub fn message(&self) -> Option<&'static str> {
        match self {
            ProfileState::Found(_) => None,
            ProfileState::MissingId => Some(MISSING_ID_MESSAGE),
            ProfileState::NotFound => Some(NOT_FOUND_MESSAGE),
            ProfileState::LoadFailed => Some(LOAD_FAILED_MESSAGE),
        }
    }
}
