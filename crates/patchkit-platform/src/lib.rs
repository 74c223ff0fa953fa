mod environment;
mod executable;
mod paths;

pub use environment::{EnvironmentProvider, SystemEnvironment};
pub use executable::{current_executable, strip_deleted_suffix};
pub use paths::{AppPaths, AppPathsError};
