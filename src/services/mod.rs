mod credentials;
mod uploads;

pub use credentials::CredentialStore;
pub use uploads::{UPLOAD_URL_PREFIX, UploadStore};
