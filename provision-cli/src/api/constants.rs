//! Endpoint paths and fixed request values

/// Saves a form record (customer/partner catalogue)
pub const SAVE_RECORD_PATH: &str = "System/Save";

/// Creates a lookup-portal user
pub const CREATE_LOOKUP_USER_PATH: &str = "Invoice/CreateUser_tracuu";

/// `editmode` value for inserting a new record
pub const EDIT_MODE_CREATE: u8 = 1;

/// Position of the single bank-account row sent with every record
pub const FIRST_DETAIL_INDEX: u32 = 1;

pub const ACCEPT_ALL: &str = "*/*";
