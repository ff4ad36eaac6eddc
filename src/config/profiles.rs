//! Scan profile management.
//!
//! Profiles allow users to save and reuse analysis configurations.

use crate::engine::AnalysisDepth;
use crate::error::{ConfigError, ProfileError, ProfileResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use super::settings::Paths;

/// A saved scan profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// Profile name (used as identifier).
    pub name: String,
    /// Description of this profile.
    #[serde(default)]
    pub description: String,
    /// Analysis depth (quick, standard, deep).
    #[serde(default = "default_depth")]
    pub depth: String,
    /// Concurrency level.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Run the library inference tables.
    #[serde(default = "default_true")]
    pub infer_libraries: bool,
    /// Read manifest permissions and package name.
    #[serde(default = "default_true")]
    pub read_permissions: bool,
    /// Maximum package files expanded from one input.
    #[serde(default = "default_max_files")]
    pub max_files: usize,
    /// Abort the batch on the first failed package.
    #[serde(default)]
    pub fail_fast: bool,
}

fn default_depth() -> String {
    "standard".to_string()
}

fn default_concurrency() -> usize {
    8
}

fn default_true() -> bool {
    true
}

fn default_max_files() -> usize {
    10_000
}

impl Profile {
    /// Create a new profile with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            depth: default_depth(),
            concurrency: default_concurrency(),
            infer_libraries: true,
            read_permissions: true,
            max_files: default_max_files(),
            fail_fast: false,
        }
    }

    /// Parse the analysis depth.
    pub fn analysis_depth(&self) -> Result<AnalysisDepth, ProfileError> {
        self.depth
            .parse()
            .map_err(|e: String| ProfileError::InvalidProfile(e))
    }

    /// Validate the profile configuration.
    pub fn validate(&self) -> ProfileResult<()> {
        if self.name.is_empty() {
            return Err(ProfileError::InvalidProfile(
                "name cannot be empty".to_string(),
            ));
        }

        if !self
            .name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ProfileError::InvalidProfile(
                "name can only contain alphanumeric characters, hyphens, and underscores"
                    .to_string(),
            ));
        }

        // Validate the depth parses correctly
        self.analysis_depth()?;

        if self.concurrency == 0 {
            return Err(ProfileError::InvalidProfile(
                "concurrency must be positive".to_string(),
            ));
        }

        if self.max_files == 0 {
            return Err(ProfileError::InvalidProfile(
                "max_files must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

/// Built-in profile presets.
impl Profile {
    /// Quick classification: entry names only, high concurrency.
    pub fn quick() -> Self {
        Self {
            name: "quick".to_string(),
            description: "Fast classification from entry names only".to_string(),
            depth: "quick".to_string(),
            concurrency: 16,
            infer_libraries: false,
            read_permissions: false,
            max_files: default_max_files(),
            fail_fast: false,
        }
    }

    /// Standard analysis: classification plus manifest extraction.
    pub fn standard() -> Self {
        Self {
            name: "standard".to_string(),
            description: "Classification with library inference and manifest strings".to_string(),
            depth: "standard".to_string(),
            concurrency: 8,
            infer_libraries: true,
            read_permissions: true,
            max_files: default_max_files(),
            fail_fast: false,
        }
    }

    /// Deep analysis: everything, plus content digests.
    pub fn deep() -> Self {
        Self {
            name: "deep".to_string(),
            description: "Full analysis with content digests and entry statistics".to_string(),
            depth: "deep".to_string(),
            concurrency: 4,
            infer_libraries: true,
            read_permissions: true,
            max_files: default_max_files(),
            fail_fast: false,
        }
    }

    /// Audit profile: deep with permissions, gentle on disk.
    pub fn audit() -> Self {
        Self {
            name: "audit".to_string(),
            description: "Deep analysis with permission extraction, low concurrency".to_string(),
            depth: "deep".to_string(),
            concurrency: 2,
            infer_libraries: true,
            read_permissions: true,
            max_files: default_max_files(),
            fail_fast: false,
        }
    }

    /// Get all built-in profiles.
    pub fn builtins() -> Vec<Profile> {
        vec![Self::quick(), Self::standard(), Self::deep(), Self::audit()]
    }
}

/// Manages profile storage and retrieval.
pub struct ProfileManager {
    profiles_dir: PathBuf,
    cache: HashMap<String, Profile>,
}

impl ProfileManager {
    /// Create a new profile manager.
    pub fn new() -> ProfileResult<Self> {
        let paths = Paths::get();
        Self::with_dir(paths.profiles_dir())
    }

    /// Create a profile manager over a specific directory.
    pub fn with_dir(profiles_dir: PathBuf) -> ProfileResult<Self> {
        fs::create_dir_all(&profiles_dir).map_err(|e| {
            ProfileError::Config(ConfigError::WriteFailed {
                path: profiles_dir.clone(),
                reason: e.to_string(),
            })
        })?;

        let mut manager = Self {
            profiles_dir,
            cache: HashMap::new(),
        };

        // Load all profiles into cache
        manager.load_all()?;

        Ok(manager)
    }

    /// Get a profile by name.
    pub fn get(&self, name: &str) -> Option<&Profile> {
        self.cache.get(name)
    }

    /// List all available profiles, built-ins included, sorted by name.
    pub fn list(&self) -> Vec<&Profile> {
        let mut profiles: Vec<&Profile> = self.cache.values().collect();
        profiles.sort_by(|a, b| a.name.cmp(&b.name));
        profiles
    }

    /// Create a new profile.
    pub fn create(&mut self, profile: Profile) -> ProfileResult<()> {
        profile.validate()?;

        if self.cache.contains_key(&profile.name) {
            return Err(ProfileError::AlreadyExists(profile.name.clone()));
        }

        self.save_profile(&profile)?;
        self.cache.insert(profile.name.clone(), profile);

        Ok(())
    }

    /// Delete a profile.
    pub fn delete(&mut self, name: &str) -> ProfileResult<()> {
        // Can't delete built-in profiles
        if Profile::builtins().iter().any(|p| p.name == name) {
            return Err(ProfileError::InvalidProfile(
                "cannot delete built-in profile".to_string(),
            ));
        }

        if !self.cache.contains_key(name) {
            return Err(ProfileError::NotFound(name.to_string()));
        }

        let file = self.profile_file(name);
        if file.exists() {
            fs::remove_file(&file).map_err(|e| ProfileError::SaveFailed(e.to_string()))?;
        }

        self.cache.remove(name);

        Ok(())
    }

    /// Load all profiles from disk.
    fn load_all(&mut self) -> ProfileResult<()> {
        // Add built-in profiles to cache
        for profile in Profile::builtins() {
            self.cache.insert(profile.name.clone(), profile);
        }

        // Load user profiles (will override built-ins with same name)
        if self.profiles_dir.exists() {
            for entry in fs::read_dir(&self.profiles_dir)
                .map_err(|e| ProfileError::SaveFailed(e.to_string()))?
            {
                let entry = entry.map_err(|e| ProfileError::SaveFailed(e.to_string()))?;
                let path = entry.path();

                if path.extension().map_or(false, |ext| ext == "json") {
                    if let Ok(content) = fs::read_to_string(&path) {
                        if let Ok(profile) = serde_json::from_str::<Profile>(&content) {
                            self.cache.insert(profile.name.clone(), profile);
                        }
                    }
                }
            }
        }

        Ok(())
    }

    /// Save a profile to disk.
    fn save_profile(&self, profile: &Profile) -> ProfileResult<()> {
        let file = self.profile_file(&profile.name);
        let content = serde_json::to_string_pretty(profile)
            .map_err(|e| ProfileError::SaveFailed(e.to_string()))?;

        fs::write(&file, content).map_err(|e| ProfileError::SaveFailed(e.to_string()))
    }

    /// Get the file path for a profile.
    fn profile_file(&self, name: &str) -> PathBuf {
        self.profiles_dir.join(format!("{}.json", name))
    }
}
