use crate::{mail::OutgoingEmail, payloads::SendConfirmation};

pub const CONFIRMATION_SUBJECT: &str = "Confirmation of Your Inquiry";

/// Acknowledgement sent back to whoever submitted the contact form. Values
/// are embedded verbatim.
pub fn confirmation_email(inquiry: &SendConfirmation) -> OutgoingEmail {
    let body = format!(
        "Hello {},\n\n\
         Thank you for reaching out to us with your inquiry. Here are the details:\n\n\
         Inquiry Type: {}\n\
         Message: {}\n\n\
         We will get back to you as soon as possible.\n\n\
         Best regards,\nThe Support Team",
        inquiry.full_name, inquiry.inquiry_type, inquiry.message
    );

    OutgoingEmail {
        subject: CONFIRMATION_SUBJECT.to_string(),
        body,
        recipients: vec![inquiry.email.clone()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirmation_email() {
        let inquiry = SendConfirmation {
            email: "visitor@example.com".to_string(),
            full_name: "Sam Rivers".to_string(),
            inquiry_type: "Natural burial".to_string(),
            message: "Is there a waiting list?".to_string(),
        };

        let email = confirmation_email(&inquiry);

        assert_eq!(email.subject, "Confirmation of Your Inquiry");
        assert_eq!(email.recipients, vec!["visitor@example.com"]);
        assert_eq!(
            email.body,
            "Hello Sam Rivers,\n\n\
             Thank you for reaching out to us with your inquiry. Here are the details:\n\n\
             Inquiry Type: Natural burial\n\
             Message: Is there a waiting list?\n\n\
             We will get back to you as soon as possible.\n\n\
             Best regards,\n\
             The Support Team"
        );
    }
}
