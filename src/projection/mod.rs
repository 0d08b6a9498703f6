//! Named read views over entities.

pub mod enhanced_user;

pub use enhanced_user::{enhance, EnhancedUser};

/// Projections available on the users collection (`?projection=`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserProjection {
    Default,
    Enhanced,
}

impl UserProjection {
    pub const ENHANCED: &'static str = "enhanced";

    /// Unknown names fall back to the default view
    pub fn from_query(name: Option<&str>) -> Self {
        match name.map(str::trim) {
            None | Some("") => UserProjection::Default,
            Some(Self::ENHANCED) => UserProjection::Enhanced,
            Some(other) => {
                tracing::debug!("unknown user projection '{}', using default view", other);
                UserProjection::Default
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_projection_names() {
        assert_eq!(UserProjection::from_query(None), UserProjection::Default);
        assert_eq!(UserProjection::from_query(Some("enhanced")), UserProjection::Enhanced);
        assert_eq!(UserProjection::from_query(Some("inlineRoles")), UserProjection::Default);
    }
}
