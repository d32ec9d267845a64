//! Shared email content
//!
//! Invitation bodies used by both the SES and mock services.

/// Subject line of every team invitation
pub const INVITATION_SUBJECT: &str = "You've been invited to a Team on Crewdesk!";

/// Plain-text body for a team invitation.
pub fn invitation_text(link: &str) -> String {
    format!("You've been invited to a Team on Crewdesk! {} ", link)
}

/// HTML body for a team invitation.
pub fn invitation_html(link: &str) -> String {
    format!(
        "<strong>Join Crewdesk</strong><br/>\
         <p>To accept your invitation, <a href=\"{}\">create an account</a>.</p>",
        link
    )
}
