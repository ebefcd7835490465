// SPDX-License-Identifier: MIT

//! Upload/download sequences for declared caches (spec.md §4.9).

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, SystemTime};

use cirun_container::{ContainerEngine, ContainerRunner};

use crate::error::CacheError;
use crate::key::{archive_stem, compute_cache_key, expand_key_files, CacheKey};

const ARCHIVE_REFRESH_AGE: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// A resolved cache declaration: its container-side path and, if it has
/// a custom key, the glob patterns that derive it.
#[derive(Debug, Clone)]
pub struct CacheDef {
    pub name: String,
    pub container_path: String,
    pub key: Option<CacheKey>,
}

/// Rewrites a leading `~` in a container path to `$HOME`, the form the
/// in-container restore/save scripts actually use.
pub fn rewrite_home(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        format!("$HOME/{rest}")
    } else if path == "~" {
        "$HOME".to_string()
    } else {
        path.to_string()
    }
}

fn is_older_than(path: &Path, age: Duration) -> Result<bool, CacheError> {
    let modified = std::fs::metadata(path)?.modified()?;
    Ok(SystemTime::now().duration_since(modified).unwrap_or_default() > age)
}

/// Resolves and performs the upload/download lifecycle for every
/// declared cache in a single step run, against the host's project cache
/// directory (`<project_cache>`).
pub struct CacheManager {
    project_root: PathBuf,
    project_cache_dir: PathBuf,
    archive_paths: Mutex<HashMap<String, Option<PathBuf>>>,
    refresh_flags: Mutex<HashSet<String>>,
}

impl CacheManager {
    pub fn new(project_root: PathBuf, project_cache_dir: PathBuf) -> Self {
        Self {
            project_root,
            project_cache_dir,
            archive_paths: Mutex::new(HashMap::new()),
            refresh_flags: Mutex::new(HashSet::new()),
        }
    }

    /// Process-cached (memoized) archive path for `def`. Returns `None`
    /// when the cache has a key block whose files can't be found on the
    /// host (`InvalidCacheKey`: the cache is skipped, not an error).
    pub fn archive_path(&self, def: &CacheDef) -> Result<Option<PathBuf>, CacheError> {
        if let Some(cached) = self.archive_paths.lock().unwrap_or_else(|e| e.into_inner()).get(&def.name) {
            return Ok(cached.clone());
        }

        let resolved = match &def.key {
            Some(key) => {
                let matched = expand_key_files(&self.project_root, key)?;
                if matched.is_empty() {
                    tracing::warn!(cache = %def.name, "InvalidCacheKey: key files not found, skipping cache");
                    None
                } else {
                    let hash = compute_cache_key(&matched)?;
                    let stem = archive_stem(&def.name, Some(&hash));
                    Some(self.project_cache_dir.join(format!("{stem}.tar")))
                }
            }
            None => Some(self.project_cache_dir.join(format!("{}.tar", archive_stem(&def.name, None)))),
        };

        self.archive_paths
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(def.name.clone(), resolved.clone());
        Ok(resolved)
    }

    pub async fn upload_before_step<E: ContainerEngine>(
        &self,
        runner: &ContainerRunner<E>,
        def: &CacheDef,
        remote_caches_dir: &str,
    ) -> Result<(), CacheError> {
        let Some(archive) = self.archive_path(def)? else {
            return Ok(());
        };
        if !archive.exists() {
            tracing::info!("Cache '{}': Not found: Skipping", def.name);
            return Ok(());
        }
        if is_older_than(&archive, ARCHIVE_REFRESH_AGE)? {
            self.refresh_flags.lock().unwrap_or_else(|e| e.into_inner()).insert(def.name.clone());
        }

        let tar_bytes = std::fs::read(&archive)?;
        runner.put_archive(remote_caches_dir, tar_bytes).await?;

        let target_dir = rewrite_home(&def.container_path);
        let script = format!(
            "if [ -e \"{target_dir}\" ]; then rm -rf \"{target_dir}\"; fi\n\
             mkdir -p \"$(dirname \"{target_dir}\")\"\n\
             mv \"{remote_caches_dir}/{name}\" \"{target_dir}\"\n",
            name = def.name,
        );
        let mut discard = |_: &[u8]| {};
        runner.run_command(&cirun_shell::wrap_command(&script), None, &mut discard).await?;
        Ok(())
    }

    pub async fn download_after_step<E: ContainerEngine>(
        &self,
        runner: &ContainerRunner<E>,
        def: &CacheDef,
        remote_caches_dir: &str,
        step_exit_code: i32,
    ) -> Result<(), CacheError> {
        if step_exit_code != 0 {
            return Ok(());
        }
        let Some(archive) = self.archive_path(def)? else {
            return Ok(());
        };

        let refresh = self.refresh_flags.lock().unwrap_or_else(|e| e.into_inner()).contains(&def.name);
        if archive.exists() && !refresh && !is_older_than(&archive, ARCHIVE_REFRESH_AGE)? {
            tracing::info!("You already have a '{}' cache", def.name);
            return Ok(());
        }

        let target_dir = rewrite_home(&def.container_path);
        let remote_path = format!("{remote_caches_dir}/{}", def.name);
        let move_script = format!(
            "if [ -e \"{target_dir}\" ]; then mv \"{target_dir}\" \"{remote_path}\"; fi\n"
        );
        let mut discard = |_: &[u8]| {};
        runner.run_command(&cirun_shell::wrap_command(&move_script), None, &mut discard).await?;

        if !runner.path_exists(&remote_path).await? {
            return Ok(());
        }

        let tar_bytes = runner.get_archive(&remote_path).await?;
        let tmp_path = archive.with_extension("tar.tmp");
        std::fs::write(&tmp_path, &tar_bytes)?;
        std::fs::rename(&tmp_path, &archive)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
