//! Common test utilities and helpers for reflectory integration tests

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use tempfile::TempDir;
use wiremock::MockServer;

use reflectory::config::DestinationConfig;
use reflectory::git_config::config_path;
use reflectory::RepositoryDescriptor;

/// A mocked Gitea API plus a temporary data root for mirror configs
pub struct GiteaFixture {
    pub server: MockServer,
    pub data_root: TempDir,
}

impl GiteaFixture {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
            data_root: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    pub fn destination_config(&self) -> DestinationConfig {
        DestinationConfig {
            url: self.server.uri(),
            api_key: "gitea-token".to_string(),
            data_path: self.data_root.path().to_string_lossy().into_owned(),
            timeout: 5,
        }
    }

    /// Write the config file Gitea keeps for a pull mirror
    pub fn write_mirror_config(&self, owner: &str, name: &str, origin_url: &str) -> PathBuf {
        let path = config_path(self.data_root.path(), owner, name);
        std::fs::create_dir_all(path.parent().unwrap()).expect("Failed to create repo dir");
        std::fs::write(&path, mirror_config(origin_url)).expect("Failed to write mirror config");
        path
    }

    pub fn read_mirror_config(&self, owner: &str, name: &str) -> String {
        read(&config_path(self.data_root.path(), owner, name))
    }
}

/// The shape of a bare mirror config as Gitea writes it
pub fn mirror_config(origin_url: &str) -> String {
    format!(
        "[core]\n\trepositoryformatversion = 0\n\tfilemode = true\n\tbare = true\n[remote \"origin\"]\n\turl = {}\n\tfetch = +refs/*:refs/*\n\tmirror = true\n",
        origin_url
    )
}

pub fn descriptor(owner: &str, name: &str, user: &str, password: &str) -> RepositoryDescriptor {
    RepositoryDescriptor {
        name: name.to_string(),
        clone_url: format!("https://github.com/{}/{}.git", owner, name),
        clone_username: user.to_string(),
        clone_password: password.to_string(),
        destination_owner: owner.to_string(),
        destination_name: name.to_string(),
    }
}

fn read(path: &Path) -> String {
    std::fs::read_to_string(path).expect("Failed to read mirror config")
}
