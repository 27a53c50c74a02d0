//! Outbound email subjects and HTML bodies.

pub const VERIFICATION_SUBJECT: &str = "Verify Your Email - Site Manager";
pub const PASSWORD_RESET_SUBJECT: &str =
    "Your Password Reset Code - Site Manager";

pub fn verification_body(first_name: &str, code: &str) -> String {
    format!(
        "<h2>Welcome, {first_name}!</h2>\
         <p>Use the code below to verify your email address. It expires \
         shortly, so don't wait too long.</p>\
         <p style=\"font-size:24px;letter-spacing:4px\"><strong>{code}\
         </strong></p>\
         <p>If you didn't create an account, you can ignore this email.</p>"
    )
}

pub fn password_reset_body(first_name: &str, code: &str) -> String {
    format!(
        "<h2>Hi {first_name},</h2>\
         <p>We received a request to reset your password. Enter the code \
         below to continue.</p>\
         <p style=\"font-size:24px;letter-spacing:4px\"><strong>{code}\
         </strong></p>\
         <p>If you didn't request a reset, no action is needed; your \
         password is unchanged.</p>"
    )
}
