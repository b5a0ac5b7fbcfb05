use serde::{Deserialize, Serialize};

use crate::auth::{AUTHENTICATION_FIELD, AuthMode, RestAuth};
use crate::form::field_list::FieldList;
use crate::form::schema::{Discriminator, FieldSpec, FormSchema};

use super::ResourceType;

/// Longest value the editor accepts for `Name` and `BaseURL`.
pub const TEXT_MAX_LEN: usize = 200;

/// Connection settings of a REST API resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestApiConfig {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "BaseURL", default)]
    pub base_url: String,
    #[serde(rename = "URLParameters", default)]
    pub url_parameters: FieldList,
    #[serde(rename = "Headers", default)]
    pub headers: FieldList,
    /// Not sent for GET or HEAD requests.
    #[serde(rename = "ExtraBodyValues", default)]
    pub extra_body_values: FieldList,
    #[serde(rename = "CookiesToForward", default)]
    pub cookies_to_forward: Vec<String>,
    #[serde(rename = "ForwardAllCookies", default)]
    pub forward_all_cookies: bool,
    #[serde(flatten)]
    pub authentication: RestAuth,
}

pub static REST_API_SCHEMA: FormSchema = FormSchema {
    resource_type: ResourceType::RestApi,
    fields: &[
        FieldSpec::text("Name").required().max_len(TEXT_MAX_LEN),
        FieldSpec::text("BaseURL").max_len(TEXT_MAX_LEN),
        FieldSpec::list("URLParameters"),
        FieldSpec::list("Headers"),
        FieldSpec::list("ExtraBodyValues"),
        FieldSpec::tags("CookiesToForward"),
        FieldSpec::toggle("ForwardAllCookies"),
        FieldSpec::text(AUTHENTICATION_FIELD),
        FieldSpec::text("BasicAuthUsername").branch("basic"),
        FieldSpec::text("BasicAuthPassword").branch("basic"),
        FieldSpec::toggle("UseClientCredentialsAuth").branch("OAuth2"),
        FieldSpec::text("OAuth2AuthorizationURL").branch("OAuth2"),
        FieldSpec::text("OAuth2AccessTokenURL").branch("OAuth2"),
        FieldSpec::text("OAuth2ClientID").branch("OAuth2"),
        FieldSpec::text("OAuth2ClientSecret").branch("OAuth2"),
        FieldSpec::text("OAuth2Scopes").branch("OAuth2"),
        FieldSpec::text("OAuth2Audience").branch("OAuth2"),
        FieldSpec::text("OAuth2AccessToken").branch("OAuth2"),
        FieldSpec::text("OAuth2RefreshToken").branch("OAuth2"),
        FieldSpec::text("OAuth2AccessTokenLifespanSeconds").branch("OAuth2"),
        FieldSpec::toggle("ShareOAuth2CredentialsBetweenUsers").branch("OAuth2"),
        FieldSpec::toggle("EnableAuthVerificationEndpoint").branch("OAuth2"),
    ],
    discriminator: Some(Discriminator {
        field: AUTHENTICATION_FIELD,
        options: &AuthMode::OPTIONS,
        default: "none",
    }),
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{BasicAuth, OAuth2Auth};
    use crate::form::field_list::Param;
    use serde_json::json;

    fn serialized_keys(config: &RestApiConfig) -> Vec<String> {
        let value = serde_json::to_value(config).unwrap();
        value.as_object().unwrap().keys().cloned().collect()
    }

    #[test]
    fn schema_covers_every_serialized_key_for_each_mode() {
        let modes = [
            RestAuth::None,
            RestAuth::Basic(BasicAuth::default()),
            RestAuth::OAuth2(OAuth2Auth::default()),
        ];
        for auth in modes {
            let branch = auth.mode().as_str();
            let config = RestApiConfig {
                authentication: auth,
                ..Default::default()
            };
            let mut keys = serialized_keys(&config);
            keys.sort();
            let mut active: Vec<String> = REST_API_SCHEMA
                .active_fields(Some(branch))
                .map(|spec| spec.name.to_string())
                .collect();
            active.sort();
            assert_eq!(keys, active, "mode {branch}");
        }
    }

    #[test]
    fn default_config_matches_editor_defaults() {
        let value = serde_json::to_value(RestApiConfig::default()).unwrap();
        assert_eq!(value["URLParameters"], json!([{"key": "", "value": ""}]));
        assert_eq!(value["Headers"], json!([{"key": "", "value": ""}]));
        assert_eq!(value["ExtraBodyValues"], json!([{"key": "", "value": ""}]));
        assert_eq!(value["ForwardAllCookies"], json!(false));
        assert_eq!(value["Authentication"], json!("none"));
    }

    #[test]
    fn deserializes_stored_basic_auth_config() {
        let stored = json!({
            "Name": "Users API",
            "BaseURL": "https://example.com",
            "URLParameters": [{"key": "page", "value": "1"}],
            "Headers": [],
            "ExtraBodyValues": [{"key": "", "value": ""}],
            "CookiesToForward": ["session"],
            "ForwardAllCookies": true,
            "Authentication": "basic",
            "BasicAuthUsername": "admin",
            "BasicAuthPassword": "secret"
        });
        let config: RestApiConfig = serde_json::from_value(stored).unwrap();

        assert_eq!(config.name, "Users API");
        assert_eq!(config.url_parameters.entries(), [Param::new("page", "1")]);
        assert_eq!(config.headers, FieldList::new());
        assert!(config.forward_all_cookies);
        assert_eq!(
            config.authentication,
            RestAuth::Basic(BasicAuth {
                username: "admin".into(),
                password: "secret".into(),
            })
        );
    }

    #[test]
    fn empty_name_fails_schema_validation() {
        let value = serde_json::to_value(RestApiConfig::default()).unwrap();
        let errors = REST_API_SCHEMA.validate_object(value.as_object().unwrap());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "Name");
    }
}
