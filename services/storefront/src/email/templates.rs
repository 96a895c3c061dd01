//! Verification and password reset emails

use chrono::{Datelike, Utc};

use super::EmailMessage;

const STYLE: &str = r#"
      body { font-family: Arial, sans-serif; line-height: 1.6; color: #333; }
      .container { max-width: 600px; margin: 0 auto; padding: 20px; }
      .header { color: white; padding: 20px; text-align: center; }
      .content { padding: 20px; background: #f9f9f9; }
      .button { display: inline-block; padding: 12px 24px; color: white; text-decoration: none; border-radius: 5px; margin: 20px 0; }
      .footer { text-align: center; padding: 20px; font-size: 12px; color: #666; }
      .warning { background: #fff3cd; border: 1px solid #ffeaa7; padding: 15px; border-radius: 5px; margin: 15px 0; }"#;

/// Renders the account emails for one application
#[derive(Debug, Clone)]
pub struct EmailTemplates {
    app_name: String,
    frontend_url: String,
}

impl EmailTemplates {
    pub fn new(app_name: impl Into<String>, frontend_url: impl Into<String>) -> Self {
        let frontend_url: String = frontend_url.into();

        Self {
            app_name: app_name.into(),
            frontend_url: frontend_url.trim_end_matches('/').to_string(),
        }
    }

    /// Link a user follows to verify their email address
    pub fn verification_url(&self, token: &str) -> String {
        format!("{}/verify-email?token={}", self.frontend_url, token)
    }

    /// Link a user follows to choose a new password
    pub fn reset_url(&self, token: &str) -> String {
        format!("{}/reset-password?token={}", self.frontend_url, token)
    }

    pub fn verification_email(
        &self,
        to: &str,
        username: &str,
        token: &str,
        valid_for: &str,
    ) -> EmailMessage {
        let url = self.verification_url(token);
        let app = &self.app_name;

        let html = self.page(
            "Email Verification",
            "#007bff",
            &format!("Welcome to {app}!"),
            &format!(
                r#"<h2>Hello {username},</h2>
        <p>Thank you for registering with us! To complete your registration, please verify your email address by clicking the button below:</p>
        <a href="{url}" class="button" style="background: #007bff;">Verify Email Address</a>
        <p>If the button doesn't work, you can also copy and paste the following link into your browser:</p>
        <p><a href="{url}">{url}</a></p>
        <p><strong>This link will expire in {valid_for}.</strong></p>
        <p>If you didn't create an account with us, please ignore this email.</p>"#
            ),
        );

        let text = format!(
            "Hello {username},\n\n\
             Thank you for registering with {app}. Verify your email address by opening this link:\n\n\
             {url}\n\n\
             This link will expire in {valid_for}.\n\
             If you didn't create an account with us, please ignore this email.\n"
        );

        EmailMessage {
            to: to.to_string(),
            subject: "Please verify your email address".to_string(),
            html,
            text,
        }
    }

    pub fn password_reset_email(
        &self,
        to: &str,
        username: &str,
        token: &str,
        valid_for: &str,
    ) -> EmailMessage {
        let url = self.reset_url(token);
        let app = &self.app_name;

        let html = self.page(
            "Password Reset Request",
            "#dc3545",
            "Password Reset Request",
            &format!(
                r#"<h2>Hello {username},</h2>
        <p>We received a request to reset your password for your {app} account.</p>
        <p>If you requested this password reset, please click the button below to set a new password:</p>
        <a href="{url}" class="button" style="background: #dc3545;">Reset Password</a>
        <p>If the button doesn't work, you can also copy and paste the following link into your browser:</p>
        <p><a href="{url}">{url}</a></p>
        <div class="warning">
          <p><strong>Important:</strong></p>
          <ul>
            <li>This link will expire in {valid_for}</li>
            <li>If you didn't request this password reset, please ignore this email</li>
            <li>Your password will remain unchanged until you use this link</li>
          </ul>
        </div>"#
            ),
        );

        let text = format!(
            "Hello {username},\n\n\
             We received a request to reset the password of your {app} account. \
             Choose a new password here:\n\n\
             {url}\n\n\
             This link will expire in {valid_for}. \
             If you didn't request this, ignore this email and your password stays unchanged.\n"
        );

        EmailMessage {
            to: to.to_string(),
            subject: "Password Reset Request".to_string(),
            html,
            text,
        }
    }

    fn page(&self, title: &str, accent: &str, heading: &str, content: &str) -> String {
        format!(
            r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <title>{title}</title>
  <style>{STYLE}
  </style>
</head>
<body>
  <div class="container">
    <div class="header" style="background: {accent};">
      <h1>{heading}</h1>
    </div>
    <div class="content">
        {content}
    </div>
    <div class="footer">
      <p>&copy; {year} {app}. All rights reserved.</p>
    </div>
  </div>
</body>
</html>
"#,
            year = Utc::now().year(),
            app = self.app_name,
        )
    }
}

/// Human wording for a token lifetime, e.g. "2 hours" or "30 minutes"
pub fn describe_minutes(minutes: i64) -> String {
    match minutes {
        1 => "1 minute".to_string(),
        60 => "1 hour".to_string(),
        m if m > 60 && m % 60 == 0 => format!("{} hours", m / 60),
        m => format!("{} minutes", m),
    }
}
