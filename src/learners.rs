//! Learners enrolled on the platform

use crate::client::Access;
use crate::payload::BodyKind;
use crate::resource::{Entity, Resource, ResourceStore};

/// Learner routes. Registration may upload a profile picture; later edits
/// are plain JSON.
#[derive(Debug)]
pub struct Learner;

impl Resource for Learner {
    const PATH: &'static str = "/api/learners";
    const PLURAL: &'static str = "learners";
    const SINGULAR: &'static str = "learner";
    const LABEL: &'static str = "Learner";
    const ACCESS: Access = Access::Bearer;
    const CREATE_BODY: BodyKind = BodyKind::Form;
    const UPDATE_BODY: BodyKind = BodyKind::Json;

    /// `firstName lastName`, else the email address, else `Untitled Learner`
    fn display_name(entity: &Entity) -> String {
        let parts: Vec<String> = ["firstName", "lastName"]
            .iter()
            .filter_map(|key| entity.text(key))
            .collect();
        if !parts.is_empty() {
            return parts.join(" ");
        }
        entity
            .text("email")
            .unwrap_or_else(|| entity.display_name(Self::LABEL))
    }
}

/// Store holding the learner directory
pub type LearnersStore = ResourceStore<Learner>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_display_name() {
        let named = Entity::try_from(json!({ "firstName": "Grace", "lastName": "Hopper" })).unwrap();
        assert_eq!(Learner::display_name(&named), "Grace Hopper");

        let email_only = Entity::try_from(json!({ "email": "g@example.com" })).unwrap();
        assert_eq!(Learner::display_name(&email_only), "g@example.com");

        assert_eq!(Learner::display_name(&Entity::default()), "Untitled Learner");
    }
}
