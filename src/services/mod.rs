pub mod linked_account_service;
pub mod otp_service;
pub mod whatsapp;
