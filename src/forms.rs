//! Form payloads and their field rules.
//!
//! Every field is `#[serde(default)]` so a missing field reaches validation
//! as an empty string instead of failing extraction.

use image::ImageFormat;
use serde::Deserialize;

pub const NAME_MAX: usize = 200;
pub const USERNAME_MAX: usize = 150;
pub const EMAIL_MAX: usize = 254;
pub const PASSWORD_MIN: usize = 8;

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("{0} is required")]
    Required(&'static str),
    #[error("{0} must be at most {1} characters")]
    TooLong(&'static str, usize),
    #[error("usernames may only contain letters, digits and @/./+/-/_")]
    InvalidUsername,
    #[error("enter a valid email address")]
    InvalidEmail,
    #[error("the two password fields didn't match")]
    PasswordMismatch,
    #[error("passwords must be at least {} characters", PASSWORD_MIN)]
    PasswordTooShort,
    #[error("passwords can't be entirely numeric")]
    PasswordNumeric,
    #[error("a user with that username already exists")]
    UsernameTaken,
    #[error("a user with that email already exists")]
    EmailTaken,
    #[error("avatars must be png, jpeg, gif or webp images")]
    InvalidAvatar,
}

#[derive(Debug, Default, Deserialize)]
pub struct RoomForm {
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, PartialEq, Eq)]
pub struct ValidRoom<'a> {
    pub topic: &'a str,
    pub name: &'a str,
    pub description: Option<&'a str>,
}

impl RoomForm {
    pub fn validate(&self) -> Result<ValidRoom<'_>, FormError> {
        let topic = required("topic", &self.topic, NAME_MAX)?;
        let name = required("name", &self.name, NAME_MAX)?;
        let description = Some(self.description.trim()).filter(|d| !d.is_empty());
        Ok(ValidRoom { topic, name, description })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct MessageForm {
    #[serde(default)]
    pub body: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password1: String,
    #[serde(default)]
    pub password2: String,
}

#[derive(Debug, PartialEq, Eq)]
pub struct Registration<'a> {
    pub name: Option<&'a str>,
    /// Lowercased.
    pub username: String,
    /// Lowercased.
    pub email: String,
    pub password: &'a str,
}

impl RegisterForm {
    pub fn validate(&self) -> Result<Registration<'_>, FormError> {
        let name = optional("name", &self.name, NAME_MAX)?;
        let username = username(&self.username)?;
        let email = email(&self.email)?;

        if self.password1 != self.password2 {
            return Err(FormError::PasswordMismatch);
        }
        password(&self.password1)?;

        Ok(Registration {
            name,
            username,
            email,
            password: &self.password1,
        })
    }
}

/// Text fields of the profile form. The avatar arrives beside it as a file.
#[derive(Debug, Default)]
pub struct ProfileForm {
    pub name: String,
    pub username: String,
    pub email: String,
    pub bio: String,
}

#[derive(Debug, PartialEq, Eq)]
pub struct ValidProfile<'a> {
    pub name: Option<&'a str>,
    pub username: String,
    pub email: String,
    pub bio: Option<&'a str>,
}

impl ProfileForm {
    pub fn validate(&self) -> Result<ValidProfile<'_>, FormError> {
        Ok(ValidProfile {
            name: optional("name", &self.name, NAME_MAX)?,
            username: username(&self.username)?,
            email: email(&self.email)?,
            bio: Some(self.bio.trim()).filter(|b| !b.is_empty()),
        })
    }
}

/// File extension for an uploaded avatar. The contents must decode as a
/// png, jpeg, gif or webp image; the client's file name is not trusted.
pub fn avatar_extension(data: &[u8]) -> Result<&'static str, FormError> {
    let format = image::guess_format(data).map_err(|_| FormError::InvalidAvatar)?;
    if !matches!(
        format,
        ImageFormat::Png | ImageFormat::Jpeg | ImageFormat::Gif | ImageFormat::WebP
    ) {
        return Err(FormError::InvalidAvatar);
    }

    image::load_from_memory_with_format(data, format).map_err(|_| FormError::InvalidAvatar)?;
    format
        .extensions_str()
        .first()
        .copied()
        .ok_or(FormError::InvalidAvatar)
}

fn required<'a>(field: &'static str, value: &'a str, max: usize) -> Result<&'a str, FormError> {
    optional(field, value, max)?.ok_or(FormError::Required(field))
}

fn optional<'a>(field: &'static str, value: &'a str, max: usize) -> Result<Option<&'a str>, FormError> {
    let value = value.trim();
    if value.chars().count() > max {
        return Err(FormError::TooLong(field, max));
    }
    Ok(Some(value).filter(|v| !v.is_empty()))
}

fn username(value: &str) -> Result<String, FormError> {
    let value = required("username", value, USERNAME_MAX)?;
    if !value
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
    {
        return Err(FormError::InvalidUsername);
    }
    Ok(value.to_lowercase())
}

fn email(value: &str) -> Result<String, FormError> {
    let value = required("email", value, EMAIL_MAX)?;
    let Some((local, domain)) = value.split_once('@') else {
        return Err(FormError::InvalidEmail);
    };

    let valid = !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !value.chars().any(char::is_whitespace);
    if !valid {
        return Err(FormError::InvalidEmail);
    }
    Ok(value.to_lowercase())
}

fn password(value: &str) -> Result<(), FormError> {
    if value.chars().count() < PASSWORD_MIN {
        return Err(FormError::PasswordTooShort);
    }
    if value.chars().all(|c| c.is_ascii_digit()) {
        return Err(FormError::PasswordNumeric);
    }
    Ok(())
}
