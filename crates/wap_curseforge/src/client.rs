use camino::Utf8Path;
use reqwest::blocking::{multipart, Client, Response};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use wap_project::{ChangelogType, Flavor, ReleaseType};

use crate::changelog::Changelog;
use crate::error::{Error, Result};

const TOKEN_HEADER_NAME: &str = "X-Api-Token";
const DEFAULT_BASE_URL: &str = "https://wow.curseforge.com";

/// One entry of `GET /api/game/versions`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct GameVersion {
    pub id: u64,
    pub name: String,
}

/// Maps version names to ids. CurseForge lists some names more than once, the
/// highest id is the current one.
pub fn version_map(versions: impl IntoIterator<Item = GameVersion>) -> BTreeMap<String, u64> {
    let mut map = BTreeMap::new();
    for version in versions {
        map.entry(version.name)
            .and_modify(|id: &mut u64| *id = (*id).max(version.id))
            .or_insert(version.id);
    }
    map
}

/// Looks up the id of every configured flavor version.
pub fn game_version_ids(
    wow_versions: &BTreeMap<Flavor, String>,
    version_map: &BTreeMap<String, u64>,
) -> Result<Vec<u64>> {
    wow_versions
        .iter()
        .map(|(flavor, version)| {
            version_map
                .get(version)
                .copied()
                .ok_or_else(|| Error::UnknownGameVersion {
                    flavor: flavor.to_string(),
                    version: version.clone(),
                })
        })
        .collect()
}

/// The JSON `metadata` field of an upload.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UploadMetadata {
    pub changelog: String,
    pub changelog_type: ChangelogType,
    /// Name shown on the project page, e.g. `MyAddon-1.2.3`.
    pub display_name: String,
    pub game_versions: Vec<u64>,
    pub release_type: ReleaseType,
}

impl UploadMetadata {
    pub fn new(
        changelog: Changelog,
        display_name: impl Into<String>,
        game_versions: Vec<u64>,
        release_type: ReleaseType,
    ) -> Self {
        Self {
            changelog: changelog.text,
            changelog_type: changelog.kind,
            display_name: display_name.into(),
            game_versions,
            release_type,
        }
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    id: u64,
}

pub fn uploaded_file_url(slug: &str, file_id: u64) -> String {
    format!("https://www.curseforge.com/wow/addons/{slug}/files/{file_id}")
}

fn check_status(response: Response, activity: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    Err(Error::Api {
        activity: activity.to_string(),
        status,
        body: response.text().unwrap_or_default(),
    })
}

/// Blocking client for the CurseForge upload API.
pub struct CurseForgeApi {
    client: Client,
    token: String,
    base_url: String,
}

impl CurseForgeApi {
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(format!(
                "wap/{} (+https://github.com/t-mart/wap)",
                env!("CARGO_PKG_VERSION")
            ))
            .timeout(Duration::from_secs(300))
            .build()?;

        Ok(Self {
            client,
            token: token.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Known game versions, name to id.
    pub fn game_versions(&self) -> Result<BTreeMap<String, u64>> {
        let response = self
            .client
            .get(format!("{}/api/game/versions", self.base_url))
            .header(TOKEN_HEADER_NAME, &self.token)
            .send()?;
        let versions: Vec<GameVersion> =
            check_status(response, "game version lookup")?.json()?;
        Ok(version_map(versions))
    }

    /// Uploads `archive` to the project and returns the new file's id.
    pub fn upload(
        &self,
        project_id: &str,
        archive: &Utf8Path,
        metadata: &UploadMetadata,
    ) -> Result<u64> {
        let file_part = multipart::Part::file(archive)
            .map_err(|source| Error::Io {
                path: archive.to_owned(),
                source,
            })?
            .mime_str("application/zip")?;
        let form = multipart::Form::new()
            .text("metadata", serde_json::to_string(metadata)?)
            .part("file", file_part);

        tracing::debug!(%archive, project_id, "uploading archive");
        let response = self
            .client
            .post(format!("{}/api/projects/{project_id}/upload-file", self.base_url))
            .header(TOKEN_HEADER_NAME, &self.token)
            .multipart(form)
            .send()?;

        let uploaded: UploadResponse = check_status(response, "upload")?.json()?;
        Ok(uploaded.id)
    }
}
