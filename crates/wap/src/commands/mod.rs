mod build;
mod init;
mod publish;
mod validate;

pub use build::{build_package, BuildPackageArgs};
pub use init::{init_project, InitProjectArgs};
pub use publish::{publish_package, PublishPackageArgs, ReleaseTypeArg};
pub use validate::{validate_config, ValidateConfigArgs};
