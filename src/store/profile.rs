use super::AsyncStatus;
use crate::api::profile::{self, Profile};
use crate::error::Error;
use crate::http::{ApiClient, Transport};
use crate::types::{Role, UserId};

const FETCH_FAILED: &str = "Could not load the profile.";
const UPDATE_FAILED: &str = "Could not save the profile.";
const UPLOAD_FAILED: &str = "Could not upload the picture.";

#[derive(Debug, Clone, Default)]
pub struct ProfileSlice {
    pub status: AsyncStatus,
    profile: Option<Profile>,
}

impl ProfileSlice {
    #[must_use]
    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    pub async fn fetch<T: Transport>(
        &mut self,
        client: &ApiClient<T>,
        role: Role,
        user_id: &UserId,
    ) -> Result<(), Error> {
        self.status.pending();
        let result = profile::get(client, role, user_id).await;
        self.profile = Some(self.status.settle(result, FETCH_FAILED)?);
        Ok(())
    }

    pub async fn update<T: Transport>(
        &mut self,
        client: &ApiClient<T>,
        changed: &Profile,
    ) -> Result<(), Error> {
        self.status.pending();
        let result = profile::update(client, changed).await;
        self.profile = Some(self.status.settle(result, UPDATE_FAILED)?);
        Ok(())
    }

    /// Upload a new picture for the loaded profile.
    pub async fn upload_picture<T: Transport>(
        &mut self,
        client: &ApiClient<T>,
        file_name: &str,
        mime_type: &str,
        bytes: Vec<u8>,
    ) -> Result<(), Error> {
        self.status.pending();
        let Some((role, user_id)) = self.profile.as_ref().map(|p| (p.role(), p.user_id().clone()))
        else {
            let err = Error::Unsupported("no profile loaded".into());
            self.status.rejected(&err, UPLOAD_FAILED);
            return Err(err);
        };
        let result =
            profile::upload_picture(client, role, &user_id, file_name, mime_type, bytes).await;
        let url = self.status.settle(result, UPLOAD_FAILED)?;
        if let Some(profile) = self.profile.as_mut() {
            profile.set_picture_url(url);
        }
        Ok(())
    }
}
