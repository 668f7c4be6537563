use crate::forms::{optional_image, optional_text, FormData, FormErrors};
use crate::media::Upload;

#[derive(Debug, Clone)]
pub struct ProfileChanges {
    pub phone_number: Option<String>,
    pub bio: String,
    pub is_landlord: bool,
    /// `None` keeps the current picture.
    pub profile_picture: Option<Upload>,
}

pub struct ProfileForm;

impl ProfileForm {
    pub fn clean(data: &FormData) -> Result<ProfileChanges, FormErrors> {
        let mut errors = FormErrors::default();
        let phone = optional_text(data, "phone_number", Some(15), &mut errors);
        let bio = optional_text(data, "bio", Some(500), &mut errors);
        let is_landlord = data.checkbox("is_landlord");
        let profile_picture = optional_image(data, "profile_picture", &mut errors);

        errors.into_result(ProfileChanges {
            phone_number: (!phone.is_empty()).then_some(phone),
            bio,
            is_landlord,
            profile_picture,
        })
    }
}
