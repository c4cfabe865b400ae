//! Choosing which login credentials to keep for a new node.

use tracing::warn;

use crate::credentials::{CredentialOverride, LoginCredentials};
use crate::types::Template;

/// Decides the effective credentials of a newly created node.
///
/// `None` means there is nothing to persist.
pub trait PrioritizeCredentials: Send + Sync {
    fn prioritize(
        &self,
        template: &Template,
        from_node: Option<LoginCredentials>,
    ) -> Option<LoginCredentials>;
}

/// Lets the template win over the provider.
///
/// The explicit login override in the template options is used when set,
/// otherwise the image's default credentials. Fields present in the winner
/// replace those issued by the provider; absent fields are kept.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrioritizeCredentialsFromTemplate;

impl PrioritizeCredentialsFromTemplate {
    fn from_image_or_override(template: &Template) -> Option<CredentialOverride> {
        if let Some(login) = &template.options.login_override {
            if !login.is_empty() {
                return Some(login.clone());
            }
        }
        template
            .image
            .default_credentials
            .clone()
            .map(CredentialOverride::from)
    }
}

impl PrioritizeCredentials for PrioritizeCredentialsFromTemplate {
    fn prioritize(
        &self,
        template: &Template,
        from_node: Option<LoginCredentials>,
    ) -> Option<LoginCredentials> {
        let Some(overlay) = Self::from_image_or_override(template) else {
            return from_node;
        };

        let mut creds = match (from_node, overlay.user.clone()) {
            (Some(mut base), user) => {
                if let Some(user) = user {
                    base.user = user;
                }
                base
            }
            (None, Some(user)) => LoginCredentials::new(user),
            (None, None) => {
                warn!("Template overrides login credentials without a user and the provider issued none");
                return None;
            }
        };

        if overlay.password.is_some() {
            creds.password = overlay.password;
        }
        if overlay.private_key.is_some() {
            creds.private_key = overlay.private_key;
        }
        if overlay.authenticate_sudo {
            creds.authenticate_sudo = true;
        }
        Some(creds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Hardware, Image, Location, LocationScope, TemplateOptions};

    fn template() -> Template {
        Template::new(
            Image::new("ubuntu-22.04"),
            Hardware::new("small", 1, 1024),
            Location::new("zone-a", LocationScope::Zone),
        )
    }

    #[test]
    fn test_provider_credentials_kept_without_override() {
        let from_node = LoginCredentials::new("root").with_private_key("K");
        let creds = PrioritizeCredentialsFromTemplate
            .prioritize(&template(), Some(from_node.clone()));
        assert_eq!(creds, Some(from_node));

        assert_eq!(PrioritizeCredentialsFromTemplate.prioritize(&template(), None), None);
    }

    #[test]
    fn test_override_fields_replace_provider_fields() {
        let template = template().with_options(
            TemplateOptions::default()
                .override_login(CredentialOverride::default().user("deploy").authenticate_sudo(true)),
        );
        let from_node = LoginCredentials::new("root").with_password("generated");

        let creds = PrioritizeCredentialsFromTemplate
            .prioritize(&template, Some(from_node))
            .unwrap();

        assert_eq!(creds.user, "deploy");
        assert_eq!(creds.password.as_deref(), Some("generated"));
        assert!(creds.authenticate_sudo);
    }

    #[test]
    fn test_image_defaults_used_when_no_override() {
        let mut template = template();
        template.image = Image::new("centos")
            .with_default_credentials(LoginCredentials::new("centos").with_password("centos"));

        let creds = PrioritizeCredentialsFromTemplate
            .prioritize(&template, None)
            .unwrap();

        assert_eq!(creds.user, "centos");
        assert_eq!(creds.password.as_deref(), Some("centos"));
    }

    #[test]
    fn test_explicit_override_beats_image_defaults() {
        let mut template = template().with_options(
            TemplateOptions::default()
                .override_login(CredentialOverride::default().user("ops").private_key("OPS")),
        );
        template.image = Image::new("centos")
            .with_default_credentials(LoginCredentials::new("centos").with_password("centos"));

        let creds = PrioritizeCredentialsFromTemplate
            .prioritize(&template, None)
            .unwrap();

        assert_eq!(creds.user, "ops");
        assert_eq!(creds.private_key.as_deref(), Some("OPS"));
        assert_eq!(creds.password, None);
    }

    #[test]
    fn test_override_without_user_and_no_base_yields_nothing() {
        let template = template().with_options(
            TemplateOptions::default().override_login(CredentialOverride::default().password("pw")),
        );

        assert_eq!(PrioritizeCredentialsFromTemplate.prioritize(&template, None), None);
    }
}
