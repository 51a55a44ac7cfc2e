//! The login form.

use portico_protocol::Credentials;

use crate::PorticoError;

/// What the member typed into the login page.
///
/// The mobile number is usually the local part only (`900000001`); the
/// portal's country code is added by [`into_credentials`](Self::into_credentials).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub mobile_number: String,
    pub password: String,
}

impl LoginForm {
    pub fn new(mobile_number: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            mobile_number: mobile_number.into(),
            password: password.into(),
        }
    }

    /// Checks both fields are filled in.
    ///
    /// # Errors
    /// [`PorticoError::MissingFields`] if either is blank.
    pub fn validate(&self) -> Result<(), PorticoError> {
        if self.mobile_number.trim().is_empty() || self.password.is_empty() {
            return Err(PorticoError::MissingFields);
        }
        Ok(())
    }

    /// Validates the form and turns it into [`Credentials`].
    ///
    /// `country_code` is prepended to the mobile number unless the member
    /// already typed a full international number starting with `+`.
    pub fn into_credentials(self, country_code: &str) -> Result<Credentials, PorticoError> {
        self.validate()?;

        let local = self.mobile_number.trim();
        let mobile_number = if local.starts_with('+') {
            local.to_string()
        } else {
            format!("{country_code}{local}")
        };
        Ok(Credentials::new(mobile_number, self.password))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_credentials_prepends_country_code() {
        let creds = LoginForm::new("900000001", "admin123")
            .into_credentials("+249")
            .unwrap();
        assert_eq!(creds.mobile_number, "+249900000001");
        assert_eq!(creds.password, "admin123");
    }

    #[test]
    fn test_into_credentials_keeps_international_number() {
        let creds = LoginForm::new(" +201000000000 ", "pw")
            .into_credentials("+249")
            .unwrap();
        assert_eq!(creds.mobile_number, "+201000000000");
    }

    #[test]
    fn test_into_credentials_missing_fields_errors() {
        for form in [
            LoginForm::new("", "pw"),
            LoginForm::new("900000001", ""),
            LoginForm::new("   ", "pw"),
            LoginForm::default(),
        ] {
            assert!(matches!(
                form.into_credentials("+249"),
                Err(PorticoError::MissingFields)
            ));
        }
    }
}
