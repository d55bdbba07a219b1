use log::{debug, warn};

use crate::model::profile::{Profile, ProfilePatch};

/// In-memory holder of the signed-in user's profile.
///
/// The mirror never talks to a store; callers fetch and save around it.
#[derive(Debug, Default)]
pub struct ProfileMirror {
    profile: Option<Profile>,
}

impl ProfileMirror {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace whatever is held with `profile`
    pub fn load(&mut self, profile: Profile) {
        debug!(
            "event=profile_load module=mirror lists={} shared_lists={}",
            profile.lists.len(),
            profile.shared_lists.len()
        );
        self.profile = Some(profile);
    }

    /// Drop the profile (sign-out)
    pub fn clear(&mut self) {
        self.profile = None;
    }

    pub fn current(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    /// Shallow-merge `patch` into the held profile.
    /// Returns false (and changes nothing) when no profile is loaded.
    pub fn apply(&mut self, patch: ProfilePatch) -> bool {
        match self.profile.as_mut() {
            Some(profile) => {
                profile.merge(patch);
                true
            }
            None => {
                warn!("event=profile_apply module=mirror status=skipped reason=no_profile");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::list::List;

    fn profile() -> Profile {
        let mut p = Profile::new("u1".into(), "Lucia".into(), "lucia@example.com".into());
        p.lists.push(List::new("l1".into(), "Home".into()));
        p
    }

    #[test]
    fn apply_without_profile_is_refused() {
        let mut mirror = ProfileMirror::new();
        assert!(!mirror.apply(ProfilePatch::lists(Vec::new())));
        assert!(mirror.current().is_none());
    }

    #[test]
    fn apply_replaces_collection_wholesale() {
        let mut mirror = ProfileMirror::new();
        mirror.load(profile());
        let applied = mirror.apply(ProfilePatch::lists(vec![List::new("l2".into(), "Work".into())]));
        assert!(applied);
        let lists = &mirror.current().unwrap().lists;
        assert_eq!(lists.len(), 1);
        assert_eq!(lists[0].id, "l2");
    }

    #[test]
    fn clear_drops_profile() {
        let mut mirror = ProfileMirror::new();
        mirror.load(profile());
        mirror.clear();
        assert!(mirror.current().is_none());
    }
}
