pub mod assessments;
pub mod auth;
pub mod classes;
pub mod notifications;
pub mod students;
pub mod subjects;
pub mod users;

pub use assessments::configure_assessments_routes;
pub use auth::configure_auth_routes;
pub use classes::configure_classes_routes;
pub use notifications::configure_notifications_routes;
pub use students::configure_students_routes;
pub use subjects::configure_subjects_routes;
pub use users::configure_user_routes;
