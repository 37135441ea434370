// src/github.rs

use crate::adapter::Adapter;
use crate::error::{Error, Result};
use crate::features::FeatureSet;
use crate::model::*;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

/// Page size used for every listing request
const PER_PAGE: usize = 100;

pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Reads history of a GitHub project through the REST API.
///
/// GitHub delivers neither line counts nor file lists with its commit
/// listing, so no optional feature is supported.
pub struct GitHubAdapter {
    slug: String,
    api_url: String,
    token: Option<String>,
    agent: ureq::Agent,
}

#[derive(Debug, Deserialize)]
struct ApiCommit {
    sha: String,
    commit: ApiCommitDetails,
    author: Option<ApiUser>,
    committer: Option<ApiUser>,
    #[serde(default)]
    parents: Vec<ApiParent>,
}

#[derive(Debug, Deserialize)]
struct ApiCommitDetails {
    author: ApiSignature,
    committer: ApiSignature,
    message: String,
}

#[derive(Debug, Deserialize)]
struct ApiSignature {
    name: String,
    email: Option<String>,
    date: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct ApiUser {
    login: String,
}

#[derive(Debug, Deserialize)]
struct ApiParent {
    sha: String,
}

/// A branch or a tag
#[derive(Debug, Deserialize)]
struct ApiRef {
    name: String,
    commit: ApiParent,
}

#[derive(Debug, Deserialize)]
struct ApiRepository {
    name: String,
    description: Option<String>,
    default_branch: String,
}

impl ApiCommit {
    fn into_raw(self) -> RawCommit {
        RawCommit {
            author: raw_actor(self.author, &self.commit.author),
            committer: raw_actor(self.committer, &self.commit.committer),
            authored_date: self.commit.author.date,
            committed_date: self.commit.committer.date,
            id: self.sha,
            parents: self.parents.into_iter().map(|parent| parent.sha).collect(),
            message: self.commit.message,
            file_changes: None,
            line_stats: None,
        }
    }
}

/// GitHub actors are identified by their login, unlinked ones by their email
fn raw_actor(user: Option<ApiUser>, signature: &ApiSignature) -> RawActor {
    let id = user
        .map(|user| user.login)
        .or_else(|| signature.email.clone())
        .unwrap_or_else(|| signature.name.clone());
    RawActor {
        id,
        name: signature.name.clone(),
        email: signature.email.clone(),
    }
}

/// Splits a page of commits at the base commit, if the page contains it
fn split_at_base(mut page: Vec<ApiCommit>, base: Option<&str>) -> (Vec<ApiCommit>, Option<ApiCommit>) {
    let index = base.and_then(|base| page.iter().position(|commit| commit.sha == base));
    match index {
        Some(index) => {
            let rest = page.split_off(index);
            (page, rest.into_iter().next())
        }
        None => (page, None),
    }
}

impl GitHubAdapter {
    pub const VCS: &'static str = "github";

    /// Creates an adapter for `owner/project`
    pub fn new(slug: &str, api_url: &str, token: Option<String>) -> Result<Self> {
        let valid = matches!(slug.split('/').collect::<Vec<_>>().as_slice(), [owner, project] if !owner.is_empty() && !project.is_empty());
        if !valid {
            return Err(Error::InvalidLocation {
                location: slug.to_string(),
                vcs: Self::VCS,
            });
        }

        let agent = ureq::config::Config::builder()
            .http_status_as_error(false)
            .timeout_global(Some(Duration::from_secs(60)))
            .build()
            .new_agent();

        Ok(Self {
            slug: slug.to_string(),
            api_url: api_url.trim_end_matches('/').to_string(),
            token,
            agent,
        })
    }

    fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let url = format!("{}/repos/{}{}", self.api_url, self.slug, path);
        debug!("GET {url} {query:?}");

        let mut request = self
            .agent
            .get(&url)
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", concat!("git-census/", env!("CARGO_PKG_VERSION")));
        if let Some(token) = &self.token {
            request = request.header("Authorization", &format!("Bearer {token}"));
        }
        for (key, value) in query {
            request = request.query(*key, *value);
        }

        let response = request.call()?;
        let status = response.status().as_u16();
        if status >= 400 {
            let message = response.into_body().read_to_string().unwrap_or_default();
            return Err(Error::Api { url, status, message });
        }
        Ok(response.into_body().read_json()?)
    }

    /// Fetches every page of a listing
    fn get_all<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        let per_page = PER_PAGE.to_string();
        let mut items = Vec::new();
        for page in 1.. {
            let page = page.to_string();
            let batch: Vec<T> = self.get(path, &[("per_page", per_page.as_str()), ("page", page.as_str())])?;
            let done = batch.len() < PER_PAGE;
            items.extend(batch);
            if done {
                break;
            }
        }
        Ok(items)
    }

    fn get_refs(&self, path: &str) -> Result<RefMap> {
        Ok(self
            .get_all::<ApiRef>(path)?
            .into_iter()
            .map(|r| (r.name, r.commit.sha))
            .collect())
    }

    fn repository(&self) -> Result<ApiRepository> {
        self.get("", &[])
    }
}

impl Adapter for GitHubAdapter {
    fn vcs(&self) -> &'static str {
        Self::VCS
    }

    fn supported_features(&self) -> FeatureSet {
        FeatureSet::empty()
    }

    fn resolve_ref(&self, name: &str) -> Result<CommitId> {
        match self.get::<ApiCommit>(&format!("/commits/{name}"), &[]) {
            Ok(commit) => Ok(commit.sha),
            Err(Error::Api { status: 404 | 422, .. }) => Err(Error::RefNotFound(name.to_string())),
            Err(e) => Err(e),
        }
    }

    /// Pages through the history of `to` until the base commit shows up or the history ends
    fn fetch_commits(&self, from: Option<&str>, to: &str) -> Result<CommitBatch> {
        let per_page = PER_PAGE.to_string();
        let mut batch = CommitBatch::default();

        for page in 1.. {
            let page_number = page.to_string();
            let commits: Vec<ApiCommit> = self.get(
                "/commits",
                &[("sha", to), ("per_page", per_page.as_str()), ("page", page_number.as_str())],
            )?;
            let last_page = commits.len() < PER_PAGE;

            let (commits, base) = split_at_base(commits, from);
            batch.commits.extend(commits.into_iter().map(ApiCommit::into_raw));
            if let Some(base) = base {
                batch.base = Some(base.into_raw());
                break;
            }
            if last_page {
                break;
            }
        }

        info!("loaded {} commits from {}", batch.commits.len(), self.slug);
        Ok(batch)
    }

    fn current_branch(&self) -> Result<String> {
        Ok(self.repository()?.default_branch)
    }

    fn list_branches(&self) -> Result<RefMap> {
        self.get_refs("/branches")
    }

    fn list_tags(&self) -> Result<RefMap> {
        self.get_refs("/tags")
    }

    fn project_metadata(&self) -> Result<ProjectMetadata> {
        let repository = self.repository()?;
        Ok(ProjectMetadata {
            name: repository.name,
            description: repository.description.unwrap_or_default(),
        })
    }
}
