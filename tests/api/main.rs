mod change_password;
mod google;
mod helpers;
mod login;
mod register;
mod verify_email;
