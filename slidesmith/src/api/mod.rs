mod form;
mod frontend;
mod handlers;
mod routes;
mod state;

pub use form::{GenerateForm, GenerateRequest, TemplateUpload};
pub use handlers::{HealthData, PPTX_CONTENT_TYPE};
pub use routes::create_router;
pub use state::AppState;
