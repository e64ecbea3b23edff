use camino::Utf8PathBuf;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    #[error("Could not find \"wap.json\" or \"wap.toml\" in {search_path} or any parent directory")]
    #[diagnostic(
        code(config::not_found),
        help("Pass --config-path, or create a project with `wap init`")
    )]
    ConfigNotFound { search_path: Utf8PathBuf },

    #[error("Config file {path} does not exist")]
    #[diagnostic(code(config::not_found))]
    ConfigPathMissing { path: Utf8PathBuf },

    #[error(transparent)]
    #[diagnostic(
        code(config::invalid),
        help("Check your wap.json or wap.toml file, `wap validate` reports the first problem")
    )]
    Config(#[from] wap_project::Error),

    #[error("{source}")]
    #[diagnostic(code(build::failed))]
    Build {
        source: wap_core::Error,
        #[help]
        help: Option<String>,
    },

    #[error("A \"publish.curseforge\" config section should be present to publish")]
    #[diagnostic(
        code(publish::no_config),
        help("Add a publish.curseforge section with at least a projectId and try again")
    )]
    MissingPublishConfig,

    #[error("Build path {path} should be a directory")]
    #[diagnostic(code(publish::not_built), help("Have you run `wap build` yet?"))]
    BuildPathMissing { path: Utf8PathBuf },

    #[error(transparent)]
    #[diagnostic(code(publish::failed))]
    Publish(#[from] wap_curseforge::Error),

    #[error("Invalid project name: {name}")]
    #[diagnostic(
        code(project::invalid_name),
        help("Project names must be alphanumeric and contain no spaces or special characters")
    )]
    InvalidProjectName { name: String },

    #[error("Project directory {path} already exists")]
    #[diagnostic(
        code(project::exists),
        help("Choose a different name or output directory")
    )]
    ProjectExists { path: Utf8PathBuf },

    #[error("IO operation failed at {path}")]
    #[diagnostic(code(io::operation_failed))]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Current directory is not valid UTF-8")]
    #[diagnostic(code(io::non_utf8_path))]
    NonUtf8CurrentDir,
}

impl CliError {
    pub fn config_not_found(search_path: Utf8PathBuf) -> Self {
        Self::ConfigNotFound { search_path }
    }

    pub fn io(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<wap_core::Error> for CliError {
    fn from(source: wap_core::Error) -> Self {
        match source {
            wap_core::Error::Project(err) => CliError::Config(err),
            source => {
                let help = source.hint();
                CliError::Build { source, help }
            }
        }
    }
}
