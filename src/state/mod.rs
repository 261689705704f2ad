//! Page controllers. Each owns its criteria and derived data; the UI writes
//! through action methods and reads through queries.

pub mod analytics;
pub mod explorer;
pub mod form;
pub mod navigation;
pub mod profile;

pub use analytics::{AnalyticsState, Widget};
pub use explorer::{ExplorerOptions, ExplorerState};
pub use form::{Control, Field, FilterForm, GENDER_OPTIONS};
pub use navigation::{Navigation, View};
pub use profile::ProfileState;
