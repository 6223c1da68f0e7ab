use std::collections::HashMap;
use std::sync::Arc;

use explorer_core::{Msg, NodeId};
use explorer_logging::{explorer_info, explorer_warn};

use crate::{ExplorerSettings, JesApi, JesError, JesResult, ProfileConfig, ZosmfJesApi};

/// A JES API bound to one profile.
#[derive(Clone)]
pub struct RegisteredProfile {
    pub api: Arc<dyn JesApi>,
    pub user: Option<String>,
    /// The profile carries credentials to log in with.
    pub authenticated: bool,
}

/// Profile name to JES API map, built once and shared by the provider,
/// the job file system and polling tasks.
#[derive(Clone, Default)]
pub struct ApiRegistry {
    profiles: HashMap<String, RegisteredProfile>,
}

impl ApiRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds z/OSMF clients for every configured profile.
    pub fn from_profiles(
        profiles: &[ProfileConfig],
        settings: &ExplorerSettings,
    ) -> JesResult<Self> {
        let mut registry = Self::new();
        for profile in profiles {
            let api = ZosmfJesApi::new(profile, settings)?;
            registry.register(
                &profile.name,
                Arc::new(api),
                profile.user.clone(),
                profile.is_authenticated(),
            );
        }
        explorer_info!("Registered {} JES profiles", registry.profiles.len());
        Ok(registry)
    }

    pub fn register(
        &mut self,
        profile: &str,
        api: Arc<dyn JesApi>,
        user: Option<String>,
        authenticated: bool,
    ) {
        if self
            .profiles
            .insert(
                profile.to_string(),
                RegisteredProfile {
                    api,
                    user,
                    authenticated,
                },
            )
            .is_some()
        {
            explorer_warn!("Profile {} registered twice; keeping the latest", profile);
        }
    }

    pub fn contains(&self, profile: &str) -> bool {
        self.profiles.contains_key(profile)
    }

    pub fn api(&self, profile: &str) -> JesResult<Arc<dyn JesApi>> {
        self.profiles
            .get(profile)
            .map(|p| Arc::clone(&p.api))
            .ok_or_else(|| JesError::ProfileNotFound(profile.to_string()))
    }

    pub fn user(&self, profile: &str) -> Option<String> {
        self.profiles.get(profile).and_then(|p| p.user.clone())
    }

    /// Sorted profile names.
    pub fn profile_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.profiles.keys().cloned().collect();
        names.sort();
        names
    }

    /// Message answering a favorites group's request to load its profile.
    pub fn resolve(&self, node: NodeId, profile: &str) -> Msg {
        match self.profiles.get(profile) {
            None => Msg::ProfileMissing { node },
            Some(p) if !p.authenticated => Msg::ProfileUnauthenticated { node },
            Some(p) => Msg::ProfileResolved {
                node,
                user: p.user.clone(),
            },
        }
    }
}
