use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::Error;
use crate::http::{ApiClient, ApiRequest, FormPart, Transport, segment};
use crate::types::{Role, UserId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientProfile {
    pub user_id: UserId,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, with = "crate::timestamp::option")]
    pub date_of_birth: Option<OffsetDateTime>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub emergency_contact: Option<String>,
    #[serde(default)]
    pub profile_picture_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PsychologistProfile {
    pub user_id: UserId,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub license_number: Option<String>,
    #[serde(default)]
    pub specialization: Option<String>,
    #[serde(default)]
    pub years_of_experience: Option<u32>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub profile_picture_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstitutionProfile {
    pub user_id: UserId,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub profile_picture_url: Option<String>,
}

/// Role-specific profile. The variant is chosen by the endpoint it came from.
#[derive(Debug, Clone, PartialEq)]
pub enum Profile {
    Patient(PatientProfile),
    Psychologist(PsychologistProfile),
    Institution(InstitutionProfile),
}

impl Profile {
    #[must_use]
    pub fn role(&self) -> Role {
        match self {
            Self::Patient(_) => Role::Patient,
            Self::Psychologist(_) => Role::Psychologist,
            Self::Institution(_) => Role::Institution,
        }
    }

    #[must_use]
    pub fn user_id(&self) -> &UserId {
        match self {
            Self::Patient(p) => &p.user_id,
            Self::Psychologist(p) => &p.user_id,
            Self::Institution(p) => &p.user_id,
        }
    }

    #[must_use]
    pub fn picture_url(&self) -> Option<&str> {
        match self {
            Self::Patient(p) => p.profile_picture_url.as_deref(),
            Self::Psychologist(p) => p.profile_picture_url.as_deref(),
            Self::Institution(p) => p.profile_picture_url.as_deref(),
        }
    }

    pub(crate) fn set_picture_url(&mut self, url: String) {
        let slot = match self {
            Self::Patient(p) => &mut p.profile_picture_url,
            Self::Psychologist(p) => &mut p.profile_picture_url,
            Self::Institution(p) => &mut p.profile_picture_url,
        };
        *slot = Some(url);
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PictureUpload {
    profile_picture_url: String,
}

fn unsupported(role: Role) -> Error {
    Error::Unsupported(format!("{role} accounts have no profile"))
}

fn profile_path(role: Role, user_id: &UserId) -> Result<String, Error> {
    let segment_name = role.profile_segment().ok_or_else(|| unsupported(role))?;
    Ok(format!("/Profiles/{segment_name}/{}", segment(user_id)))
}

/// `GET /Profiles/{role}/{userId}`.
///
/// # Errors
///
/// Returns [`Error::Unsupported`] for [`Role::Admin`].
pub async fn get<T: Transport>(
    client: &ApiClient<T>,
    role: Role,
    user_id: &UserId,
) -> Result<Profile, Error> {
    let request = ApiRequest::get(profile_path(role, user_id)?);
    match role {
        Role::Patient => Ok(Profile::Patient(client.call(request).await?)),
        Role::Psychologist => Ok(Profile::Psychologist(client.call(request).await?)),
        Role::Institution => Ok(Profile::Institution(client.call(request).await?)),
        Role::Admin => Err(unsupported(role)),
    }
}

/// `PUT /Profiles/{role}/{userId}` with the full profile.
///
/// Returns the profile as stored by the server.
pub async fn update<T: Transport>(client: &ApiClient<T>, profile: &Profile) -> Result<Profile, Error> {
    let path = profile_path(profile.role(), profile.user_id())?;
    Ok(match profile {
        Profile::Patient(p) => Profile::Patient(client.call(ApiRequest::put(path).json(p)?).await?),
        Profile::Psychologist(p) => {
            Profile::Psychologist(client.call(ApiRequest::put(path).json(p)?).await?)
        }
        Profile::Institution(p) => {
            Profile::Institution(client.call(ApiRequest::put(path).json(p)?).await?)
        }
    })
}

/// `PUT /Profiles/{role}/{userId}/Picture` as `multipart/form-data`.
///
/// Returns the new picture URL.
pub async fn upload_picture<T: Transport>(
    client: &ApiClient<T>,
    role: Role,
    user_id: &UserId,
    file_name: &str,
    mime_type: &str,
    bytes: Vec<u8>,
) -> Result<String, Error> {
    let path = format!("{}/Picture", profile_path(role, user_id)?);
    let request =
        ApiRequest::put(path).multipart(vec![FormPart::file("file", file_name, mime_type, bytes)]);
    let upload: PictureUpload = client.call(request).await?;
    Ok(upload.profile_picture_url)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::http::{PartContent, RequestBody};
    use crate::testing::{Harness, envelope_ok};

    #[test]
    fn admin_profile_is_unsupported() {
        let err = profile_path(Role::Admin, &UserId::from("u-1")).unwrap_err();
        assert!(matches!(err, Error::Unsupported(_)));
    }

    #[test]
    fn user_id_is_encoded_in_path() {
        let path = profile_path(Role::Patient, &UserId::from("a/b")).unwrap();
        assert_eq!(path, "/Profiles/Patient/a%2Fb");
    }

    #[tokio::test]
    async fn get_decodes_role_specific_profile() {
        let harness = Harness::new(|_| {
            envelope_ok(json!({
                "userId": "u-7",
                "firstName": "Lu",
                "lastName": "Ortiz",
                "licenseNumber": "PSI-123",
                "yearsOfExperience": 8
            }))
        });

        let profile = get(&harness.client, Role::Psychologist, &UserId::from("u-7")).await.unwrap();

        let Profile::Psychologist(p) = &profile else {
            panic!("expected psychologist profile");
        };
        assert_eq!(p.license_number.as_deref(), Some("PSI-123"));
        assert_eq!(profile.role(), Role::Psychologist);
        assert_eq!(harness.requests()[0].path, "/Profiles/Psychologist/u-7");
    }

    #[tokio::test]
    async fn update_puts_profile_json() {
        let harness = Harness::new(|req| {
            let RequestBody::Json(body) = &req.body else {
                panic!("expected JSON body");
            };
            envelope_ok(body.clone())
        });
        let profile = Profile::Institution(InstitutionProfile {
            user_id: UserId::from("inst-1"),
            name: "Clinica Sol".into(),
            address: None,
            phone_number: None,
            website: Some("https://sol.example".into()),
            description: None,
            profile_picture_url: None,
        });

        let updated = update(&harness.client, &profile).await.unwrap();

        assert_eq!(updated, profile);
        let sent = &harness.requests()[0];
        assert_eq!(sent.method, reqwest::Method::PUT);
        assert_eq!(sent.path, "/Profiles/Institution/inst-1");
    }

    #[tokio::test]
    async fn upload_sends_multipart_file() {
        let harness = Harness::new(|_| envelope_ok(json!({ "profilePictureUrl": "https://cdn/p.png" })));

        let url = upload_picture(
            &harness.client,
            Role::Patient,
            &UserId::from("u-1"),
            "me.png",
            "image/png",
            vec![1, 2, 3],
        )
        .await
        .unwrap();

        assert_eq!(url, "https://cdn/p.png");
        let sent = &harness.requests()[0];
        assert_eq!(sent.path, "/Profiles/Patient/u-1/Picture");
        let RequestBody::Multipart(parts) = &sent.body else {
            panic!("expected multipart body");
        };
        assert_eq!(parts[0].name, "file");
        assert!(matches!(&parts[0].content, PartContent::File { bytes, .. } if bytes == &[1, 2, 3]));
    }
}
